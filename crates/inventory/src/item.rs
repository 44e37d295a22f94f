use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ItemId};

/// Stock classification of an item relative to its minimum threshold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    /// `quantity < minimum_stock_threshold`.
    Low,
    /// `quantity >= minimum_stock_threshold` (the complement of `Low`).
    High,
}

impl StockLevel {
    pub fn classify(quantity: i32, minimum_stock_threshold: i32) -> Self {
        if quantity < minimum_stock_threshold {
            StockLevel::Low
        } else {
            StockLevel::High
        }
    }
}

/// Apply a signed delta to a quantity.
///
/// Rejects results below zero (and arithmetic overflow) with
/// `DomainError::InvalidOperation`; this is the only rule that guards stock
/// from going negative.
pub fn apply_quantity_delta(quantity: i32, delta: i32) -> DomainResult<i32> {
    let new_quantity = quantity
        .checked_add(delta)
        .ok_or_else(|| DomainError::invalid_operation("quantity out of range"))?;

    if new_quantity < 0 {
        return Err(DomainError::invalid_operation(
            "quantity cannot be reduced below zero",
        ));
    }

    Ok(new_quantity)
}

/// Full, writable field set of an item (everything except the id).
///
/// Used for both create and full-overwrite update; there are no partial-field
/// semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub category: Option<String>,
    pub minimum_stock_threshold: i32,
}

impl ItemFields {
    /// Check the field-level invariants shared by create and update.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(DomainError::invalid_operation("quantity cannot be negative"));
        }
        if self.minimum_stock_threshold < 0 {
            return Err(DomainError::invalid_operation(
                "minimum stock threshold cannot be negative",
            ));
        }
        Ok(())
    }
}

/// A persisted inventory item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    name: String,
    description: Option<String>,
    quantity: i32,
    category: Option<String>,
    minimum_stock_threshold: i32,
}

impl Item {
    /// Build an item from an id and a validated field set.
    pub fn new(id: ItemId, fields: ItemFields) -> DomainResult<Self> {
        fields.validate()?;
        Ok(Self {
            id,
            name: fields.name,
            description: fields.description,
            quantity: fields.quantity,
            category: fields.category,
            minimum_stock_threshold: fields.minimum_stock_threshold,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn minimum_stock_threshold(&self) -> i32 {
        self.minimum_stock_threshold
    }

    /// Derived on every call; never stored.
    pub fn is_low_stock(&self) -> bool {
        self.stock_level() == StockLevel::Low
    }

    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.quantity, self.minimum_stock_threshold)
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category)
    }

    /// Apply a quantity delta in place. On rejection the item is left unchanged.
    pub fn adjust_quantity(&mut self, delta: i32) -> DomainResult<i32> {
        let new_quantity = apply_quantity_delta(self.quantity, delta)?;
        self.quantity = new_quantity;
        Ok(new_quantity)
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

/// Transfer representation of an item, with the derived low-stock flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub item_id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub category: Option<String>,
    pub minimum_stock_threshold: i32,
    pub is_low_stock: bool,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        Self {
            item_id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            category: item.category.clone(),
            minimum_stock_threshold: item.minimum_stock_threshold,
            is_low_stock: item.is_low_stock(),
        }
    }
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        let is_low_stock = item.is_low_stock();
        Self {
            item_id: item.id,
            name: item.name,
            description: item.description,
            quantity: item.quantity,
            category: item.category,
            minimum_stock_threshold: item.minimum_stock_threshold,
            is_low_stock,
        }
    }
}
