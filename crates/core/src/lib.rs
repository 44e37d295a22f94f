//! Domain primitives shared by every stockroom crate: item ids, the entity trait, domain errors.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::ItemId;
