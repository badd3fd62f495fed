//! The user on whose behalf a ledger action runs.

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Acting user, stored by value on every ledger row.
///
/// Authentication happens outside the ledger; by the time an `Actor` reaches
/// the core it is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub username: String,
}

impl Actor {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}
