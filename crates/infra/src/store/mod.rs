//! Item store boundary.
//!
//! The store is the durable record of items keyed by id. It knows nothing about
//! HTTP and very little about business rules; the one exception is
//! `adjust_quantity`, which must apply the non-negative rule atomically with the
//! write so concurrent deltas cannot race each other below zero.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::{DomainError, ItemId};
use stockroom_inventory::{Item, StockLevel};

pub use in_memory::InMemoryItemStore;
pub use postgres::PostgresItemStore;

/// Store operation error (infrastructure failures, as opposed to domain errors).
#[derive(Debug, Error)]
pub enum StoreError {
    /// An item with this id already exists.
    #[error("item already exists: {0}")]
    Duplicate(ItemId),

    /// The backend failed (connection, query, corrupt row, poisoned lock).
    #[error("storage error: {0}")]
    Backend(String),
}

/// Result of an atomic quantity adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustOutcome {
    /// The delta was applied; carries the updated record.
    Adjusted(Item),
    /// No record with this id.
    Missing,
    /// The delta was rejected by the quantity rule; the record is unchanged.
    Rejected(DomainError),
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    /// First item (lowest id) whose name matches exactly.
    async fn find_by_name(&self, name: &str) -> Result<Option<Item>, StoreError>;

    async fn list(&self) -> Result<Vec<Item>, StoreError>;

    async fn list_by_category(&self, category: &str) -> Result<Vec<Item>, StoreError>;

    async fn list_by_stock_level(&self, level: StockLevel) -> Result<Vec<Item>, StoreError>;

    /// Distinct non-null categories, sorted.
    async fn categories(&self) -> Result<Vec<String>, StoreError>;

    /// Insert a new record. Fails with `StoreError::Duplicate` if the id is taken.
    async fn insert(&self, item: Item) -> Result<Item, StoreError>;

    /// Overwrite an existing record. Returns `None` if the id is absent.
    async fn replace(&self, item: Item) -> Result<Option<Item>, StoreError>;

    async fn adjust_quantity(&self, id: ItemId, delta: i32) -> Result<AdjustOutcome, StoreError>;

    /// Remove a record. Returns whether it existed.
    async fn delete(&self, id: ItemId) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get(id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Item>, StoreError> {
        (**self).find_by_name(name).await
    }

    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        (**self).list().await
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Item>, StoreError> {
        (**self).list_by_category(category).await
    }

    async fn list_by_stock_level(&self, level: StockLevel) -> Result<Vec<Item>, StoreError> {
        (**self).list_by_stock_level(level).await
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        (**self).categories().await
    }

    async fn insert(&self, item: Item) -> Result<Item, StoreError> {
        (**self).insert(item).await
    }

    async fn replace(&self, item: Item) -> Result<Option<Item>, StoreError> {
        (**self).replace(item).await
    }

    async fn adjust_quantity(&self, id: ItemId, delta: i32) -> Result<AdjustOutcome, StoreError> {
        (**self).adjust_quantity(id, delta).await
    }

    async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }
}
