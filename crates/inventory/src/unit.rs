use serde::{Deserialize, Serialize};

use druggist_core::{DomainError, DomainResult, Entity, UnitId};

/// Unit of measure an item's stock is counted in (vials, tablets, ml, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementUnit {
    pub id: UnitId,
    pub name: String,
}

impl MeasurementUnit {
    pub fn new(id: UnitId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("unit name cannot be empty"));
        }
        Ok(Self { id, name })
    }
}

impl Entity for MeasurementUnit {
    type Id = UnitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
