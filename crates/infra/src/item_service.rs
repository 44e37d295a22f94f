//! Item service: the business layer between the HTTP boundary and the store.
//!
//! ```text
//! request
//!   ↓
//! 1. Validate field set (domain rules: name, non-negative quantity/threshold)
//!   ↓
//! 2. Single store call (insert / replace / conditional quantity update / query)
//!   ↓
//! 3. Map record → `ItemView` (derives `is_low_stock` on the way out)
//! ```
//!
//! The store handle is injected at construction; the service holds no other state.

use chrono::Utc;
use thiserror::Error;

use stockroom_core::{DomainError, Entity, ItemId};
use stockroom_inventory::{Item, ItemFields, ItemView, ReportKind, StockLevel, StockReport};

use crate::store::{AdjustOutcome, ItemStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    /// No item with the requested id or name.
    #[error("item not found")]
    NotFound,
    /// The operation would break a stock rule (e.g. quantity below zero).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// Duplicate id on create.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Malformed field set.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The store failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidOperation(msg) => ServiceError::InvalidOperation(msg),
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                ServiceError::Validation(msg)
            }
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(id) => {
                ServiceError::Conflict(format!("item with id {id} already exists"))
            }
            other => ServiceError::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone)]
pub struct ItemService<S> {
    store: S,
}

impl<S> ItemService<S>
where
    S: ItemStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list_items(&self) -> ServiceResult<Vec<ItemView>> {
        Ok(to_views(self.store.list().await?))
    }

    pub async fn get_item(&self, id: ItemId) -> ServiceResult<ItemView> {
        self.store
            .get(id)
            .await?
            .map(ItemView::from)
            .ok_or(ServiceError::NotFound)
    }

    /// Exact, case-sensitive match; the lowest id wins when names repeat.
    pub async fn get_item_by_name(&self, name: &str) -> ServiceResult<ItemView> {
        self.store
            .find_by_name(name)
            .await?
            .map(ItemView::from)
            .ok_or(ServiceError::NotFound)
    }

    /// Insert a new item under a caller-supplied id.
    ///
    /// Duplicate ids are detected by the store's insert, not by a prior lookup.
    pub async fn create_item(&self, id: ItemId, fields: ItemFields) -> ServiceResult<ItemView> {
        let item = Item::new(id, fields)?;
        let created = self.store.insert(item).await?;
        tracing::info!(item_id = %id, quantity = created.quantity(), "item created");
        Ok(ItemView::from(created))
    }

    /// Full overwrite of every writable field.
    pub async fn update_item(&self, id: ItemId, fields: ItemFields) -> ServiceResult<ItemView> {
        let item = Item::new(id, fields)?;
        let updated = self
            .store
            .replace(item)
            .await?
            .ok_or(ServiceError::NotFound)?;
        tracing::info!(item_id = %id, "item updated");
        Ok(ItemView::from(updated))
    }

    /// Apply a signed delta to an item's quantity.
    ///
    /// Rejected (store unchanged) when the item is missing or the result would be
    /// negative.
    pub async fn adjust_quantity(&self, id: ItemId, delta: i32) -> ServiceResult<ItemView> {
        match self.store.adjust_quantity(id, delta).await? {
            AdjustOutcome::Adjusted(item) => {
                tracing::info!(
                    item_id = %item.id(),
                    delta,
                    quantity = item.quantity(),
                    "item quantity adjusted"
                );
                Ok(ItemView::from(item))
            }
            AdjustOutcome::Missing => {
                tracing::debug!(item_id = %id, delta, "quantity adjustment on missing item");
                Err(ServiceError::NotFound)
            }
            AdjustOutcome::Rejected(reason) => {
                tracing::debug!(item_id = %id, delta, %reason, "quantity adjustment rejected");
                Err(reason.into())
            }
        }
    }

    pub async fn low_stock_items(&self) -> ServiceResult<Vec<ItemView>> {
        Ok(to_views(self.store.list_by_stock_level(StockLevel::Low).await?))
    }

    pub async fn high_stock_items(&self) -> ServiceResult<Vec<ItemView>> {
        Ok(to_views(self.store.list_by_stock_level(StockLevel::High).await?))
    }

    /// Items in `category`; a missing or empty filter returns every item.
    pub async fn items_by_category(&self, category: Option<&str>) -> ServiceResult<Vec<ItemView>> {
        let items = match category {
            Some(c) if !c.is_empty() => self.store.list_by_category(c).await?,
            _ => self.store.list().await?,
        };
        Ok(to_views(items))
    }

    pub async fn categories(&self) -> ServiceResult<Vec<String>> {
        Ok(self.store.categories().await?)
    }

    /// Returns whether an item was removed.
    pub async fn delete_item(&self, id: ItemId) -> ServiceResult<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            tracing::info!(item_id = %id, "item deleted");
        }
        Ok(deleted)
    }

    /// One full listing; `StockReport::build` picks the rows `kind` selects.
    pub async fn stock_report(&self, kind: ReportKind) -> ServiceResult<StockReport> {
        let views = self.list_items().await?;
        Ok(StockReport::build(kind, views, Utc::now()))
    }
}

fn to_views(items: Vec<Item>) -> Vec<ItemView> {
    items.into_iter().map(ItemView::from).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::store::InMemoryItemStore;

    fn fields(name: &str, quantity: i32, category: &str, threshold: i32) -> ItemFields {
        ItemFields {
            name: name.to_string(),
            description: None,
            quantity,
            category: Some(category.to_string()),
            minimum_stock_threshold: threshold,
        }
    }

    /// Five items: laptop(10/5), Mouse(3/5, low), Office Chair(5/3), pens(100/10), Notebook(20/5).
    async fn seeded() -> ItemService<Arc<InMemoryItemStore>> {
        let service = ItemService::new(Arc::new(InMemoryItemStore::new()));
        let seed = [
            (1, fields("laptop", 10, "Electronics", 5)),
            (2, fields("Mouse", 3, "Electronics", 5)),
            (3, fields("Office Chair", 5, "Furniture", 3)),
            (4, fields("pens", 100, "Stationery", 10)),
            (5, fields("Notebook", 20, "Stationery", 5)),
        ];
        for (id, f) in seed {
            service.create_item(ItemId::new(id), f).await.unwrap();
        }
        service
    }

    #[tokio::test]
    async fn create_then_get_returns_view_with_derived_flag() {
        let service = ItemService::new(InMemoryItemStore::new());
        service
            .create_item(ItemId::new(7), fields("widget", 10, "Tools", 5))
            .await
            .unwrap();

        let view = service.get_item(ItemId::new(7)).await.unwrap();
        assert_eq!(view.quantity, 10);
        assert!(!view.is_low_stock);
    }

    #[tokio::test]
    async fn create_with_existing_id_is_a_conflict() {
        let service = seeded().await;
        let err = service
            .create_item(ItemId::new(1), fields("dup", 1, "X", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(service.get_item(ItemId::new(1)).await.unwrap().name, "laptop");
    }

    #[tokio::test]
    async fn create_rejects_negative_quantity() {
        let service = ItemService::new(InMemoryItemStore::new());
        let err = service
            .create_item(ItemId::new(1), fields("x", -1, "X", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(_)));
        assert!(service.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_missing_item_is_not_found() {
        let service = seeded().await;
        assert!(matches!(
            service.get_item(ItemId::new(999)).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn get_by_name_is_case_sensitive() {
        let service = seeded().await;
        assert_eq!(service.get_item_by_name("Mouse").await.unwrap().item_id, ItemId::new(2));
        assert!(matches!(
            service.get_item_by_name("mouse").await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_overwrites_all_fields() {
        let service = seeded().await;
        let updated = service
            .update_item(
                ItemId::new(1),
                ItemFields {
                    name: "Updated Laptop".to_string(),
                    description: Some("Updated Description".to_string()),
                    quantity: 15,
                    category: Some("Electronics".to_string()),
                    minimum_stock_threshold: 7,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Updated Laptop");
        assert_eq!(updated.quantity, 15);
        assert_eq!(service.get_item(ItemId::new(1)).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_missing_item_is_not_found() {
        let service = seeded().await;
        let err = service
            .update_item(ItemId::new(42), fields("ghost", 1, "X", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
        assert!(service.get_item(ItemId::new(42)).await.is_err());
    }

    #[tokio::test]
    async fn negative_delta_within_stock_is_persisted() {
        let service = seeded().await;
        let view = service.adjust_quantity(ItemId::new(1), -3).await.unwrap();
        assert_eq!(view.quantity, 7);
        assert_eq!(service.get_item(ItemId::new(1)).await.unwrap().quantity, 7);
    }

    #[tokio::test]
    async fn delta_below_zero_is_rejected_and_store_unchanged() {
        let service = seeded().await;
        let err = service.adjust_quantity(ItemId::new(1), -20).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(_)));
        assert_eq!(service.get_item(ItemId::new(1)).await.unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn delta_on_missing_item_is_not_found() {
        let service = seeded().await;
        assert!(matches!(
            service.adjust_quantity(ItemId::new(99), 1).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delta_can_flip_low_stock_flag() {
        let service = seeded().await;
        let view = service.adjust_quantity(ItemId::new(2), 2).await.unwrap();
        assert_eq!(view.quantity, 5);
        assert!(!view.is_low_stock);
    }

    #[tokio::test]
    async fn low_and_high_stock_partition_all_items() {
        let service = seeded().await;
        let all: HashSet<ItemId> = service
            .list_items()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.item_id)
            .collect();
        let low = service.low_stock_items().await.unwrap();
        let high = service.high_stock_items().await.unwrap();

        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Mouse");
        assert!(low.iter().all(|v| v.is_low_stock));
        assert!(high.iter().all(|v| !v.is_low_stock));

        let low_ids: HashSet<ItemId> = low.iter().map(|v| v.item_id).collect();
        let high_ids: HashSet<ItemId> = high.iter().map(|v| v.item_id).collect();
        assert!(low_ids.is_disjoint(&high_ids));
        assert_eq!(&low_ids | &high_ids, all);
    }

    #[tokio::test]
    async fn category_filter_is_exact_and_optional() {
        let service = seeded().await;

        let electronics = service.items_by_category(Some("Electronics")).await.unwrap();
        assert_eq!(electronics.len(), 2);
        assert!(electronics.iter().any(|v| v.name == "laptop"));
        assert!(electronics.iter().any(|v| v.name == "Mouse"));

        assert!(service.items_by_category(Some("electronics")).await.unwrap().is_empty());
        assert_eq!(service.items_by_category(None).await.unwrap().len(), 5);
        assert_eq!(service.items_by_category(Some("")).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn categories_are_distinct() {
        let service = ItemService::new(InMemoryItemStore::new());
        for (id, category) in [(1, "A"), (2, "B"), (3, "A"), (4, "C")] {
            service
                .create_item(ItemId::new(id), fields("x", 1, category, 0))
                .await
                .unwrap();
        }

        let categories: HashSet<String> = service.categories().await.unwrap().into_iter().collect();
        let expected: HashSet<String> = ["A", "B", "C"].into_iter().map(String::from).collect();
        assert_eq!(categories, expected);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let service = seeded().await;
        assert!(service.delete_item(ItemId::new(5)).await.unwrap());
        assert!(matches!(
            service.get_item(ItemId::new(5)).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deleting_missing_item_returns_false() {
        let service = seeded().await;
        assert!(!service.delete_item(ItemId::new(999)).await.unwrap());
    }

    #[tokio::test]
    async fn stock_report_matches_classification() {
        let service = seeded().await;
        let report = service.stock_report(ReportKind::High).await.unwrap();
        assert_eq!(report.title, "High Stock Items");
        assert_eq!(report.item_count, 4);
        assert!(report.items.iter().all(|v| !v.is_low_stock));
    }

    #[tokio::test]
    async fn stock_report_kinds_agree_with_stock_listings() {
        let service = seeded().await;
        let ids = |views: &[ItemView]| views.iter().map(|v| v.item_id).collect::<Vec<_>>();

        let all = service.stock_report(ReportKind::All).await.unwrap();
        let low = service.stock_report(ReportKind::Low).await.unwrap();
        let high = service.stock_report(ReportKind::High).await.unwrap();

        assert_eq!(ids(&all.items), ids(&service.list_items().await.unwrap()));
        assert_eq!(ids(&low.items), ids(&service.low_stock_items().await.unwrap()));
        assert_eq!(ids(&high.items), ids(&service.high_stock_items().await.unwrap()));
        assert_eq!(low.item_count + high.item_count, all.item_count);
    }
}
