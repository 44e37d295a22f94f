//! Infrastructure layer: item storage, the item service, configuration.

pub mod config;
pub mod item_service;
pub mod store;

pub use config::{AppConfig, LogFormat, StoreBackend};
pub use item_service::{ItemService, ServiceError};
pub use store::{AdjustOutcome, InMemoryItemStore, ItemStore, PostgresItemStore, StoreError};
