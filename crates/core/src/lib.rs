//! `druggist-core`: shared building blocks for the stock ledger.
//!
//! This crate contains **pure domain** primitives (no locking, storage or clock).

pub mod actor;
pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod quantity;
pub mod text;
pub mod value_object;

pub use actor::Actor;
pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, MovementId, ReservationId, SaleId, UnitId, UserId};
pub use quantity::Quantity;
pub use value_object::ValueObject;
