use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use stockroom_core::{Entity, ItemId};
use stockroom_inventory::{Item, StockLevel};

use super::{AdjustOutcome, ItemStore, StoreError};

/// In-memory item store for tests/dev.
///
/// Records are kept ordered by id, so listings come back in id order.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    items: RwLock<BTreeMap<ItemId, Item>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `items` (later duplicates win).
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let map = items.into_iter().map(|item| (item.id(), item)).collect();
        Self {
            items: RwLock::new(map),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<ItemId, Item>>, StoreError> {
        self.items
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<ItemId, Item>>, StoreError> {
        self.items
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn collect_where(&self, pred: impl Fn(&Item) -> bool) -> Result<Vec<Item>, StoreError> {
        let items = self.read()?;
        Ok(items.values().filter(|item| pred(item)).cloned().collect())
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Item>, StoreError> {
        let items = self.read()?;
        Ok(items.values().find(|item| item.name() == name).cloned())
    }

    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.collect_where(|_| true)
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Item>, StoreError> {
        self.collect_where(|item| item.in_category(category))
    }

    async fn list_by_stock_level(&self, level: StockLevel) -> Result<Vec<Item>, StoreError> {
        self.collect_where(|item| item.stock_level() == level)
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let items = self.read()?;
        let distinct: BTreeSet<&str> = items.values().filter_map(|item| item.category()).collect();
        Ok(distinct.into_iter().map(str::to_string).collect())
    }

    async fn insert(&self, item: Item) -> Result<Item, StoreError> {
        let mut items = self.write()?;
        let id = item.id();
        if items.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        items.insert(id, item.clone());
        Ok(item)
    }

    async fn replace(&self, item: Item) -> Result<Option<Item>, StoreError> {
        let mut items = self.write()?;
        match items.get_mut(&item.id()) {
            Some(slot) => {
                *slot = item.clone();
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    async fn adjust_quantity(&self, id: ItemId, delta: i32) -> Result<AdjustOutcome, StoreError> {
        // Check and write under the same lock.
        let mut items = self.write()?;
        let Some(item) = items.get_mut(&id) else {
            return Ok(AdjustOutcome::Missing);
        };

        match item.adjust_quantity(delta) {
            Ok(_) => Ok(AdjustOutcome::Adjusted(item.clone())),
            Err(e) => Ok(AdjustOutcome::Rejected(e)),
        }
    }

    async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(&id).is_some())
    }
}
