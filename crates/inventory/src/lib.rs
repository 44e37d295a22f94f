//! Inventory domain module.
//!
//! This crate contains the business rules for stock items, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage): the item record,
//! its transfer view, low/high-stock classification and the quantity-delta rule.

pub mod item;
pub mod report;

pub use item::{apply_quantity_delta, Item, ItemFields, ItemView, StockLevel};
pub use report::{ReportKind, StockReport};
