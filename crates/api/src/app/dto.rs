use serde::Deserialize;

use stockroom_core::DomainResult;
use stockroom_inventory::{ItemFields, ReportKind};

// -------------------------
// Request DTOs
// -------------------------

/// `POST /items` body. The caller assigns the id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub item_id: i32,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: i32,
    pub category: Option<String>,
    #[serde(default)]
    pub minimum_stock_threshold: i32,
}

impl CreateItemRequest {
    pub fn into_fields(self) -> ItemFields {
        ItemFields {
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            category: self.category,
            minimum_stock_threshold: self.minimum_stock_threshold,
        }
    }
}

/// `PUT /items/{id}` body. Name and category are required here; the id in
/// the body, if any, is ignored in favour of the path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: i32,
    pub category: Option<String>,
    #[serde(default)]
    pub minimum_stock_threshold: i32,
}

impl UpdateItemRequest {
    /// Check required fields, returning the missing field's name on failure.
    pub fn into_fields(self) -> Result<ItemFields, &'static str> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or("name")?;
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .ok_or("category")?;

        Ok(ItemFields {
            name,
            description: self.description,
            quantity: self.quantity,
            category: Some(category),
            minimum_stock_threshold: self.minimum_stock_threshold,
        })
    }
}

/// `PATCH /items/{id}/quantity` body: `quantity` is a signed delta.
#[derive(Debug, Deserialize)]
pub struct AdjustQuantityRequest {
    pub quantity: i32,
}

// -------------------------
// Query strings
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub kind: Option<String>,
}

impl ReportQuery {
    /// A missing or blank `kind` selects every item, like an empty category filter.
    pub fn kind(&self) -> DomainResult<ReportKind> {
        match self.kind.as_deref().map(str::trim) {
            None | Some("") => Ok(ReportKind::All),
            Some(raw) => raw.parse(),
        }
    }
}
