//! Postgres-backed item store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` (insert only) |
//! | Database (check violation) | `23514` | `Backend` |
//! | Anything else | N/A | `Backend` |
//!
//! ## Quantity updates
//!
//! `adjust_quantity` is a single conditional `UPDATE`: the non-negative check
//! and the write happen in one statement, so two concurrent deltas against the
//! same row are serialized by the row lock instead of racing on a stale read.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use stockroom_core::{Entity, ItemId};
use stockroom_inventory::{apply_quantity_delta, Item, ItemFields, StockLevel};

use super::{AdjustOutcome, ItemStore, StoreError};

const ITEM_COLUMNS: &str =
    "item_id, name, description, quantity, category, minimum_stock_threshold";

/// Postgres-backed item store.
///
/// Uses the SQLx connection pool (thread-safe, cheap to clone); every method
/// runs as its own implicit transaction.
#[derive(Debug, Clone)]
pub struct PostgresItemStore {
    pool: Arc<PgPool>,
}

impl PostgresItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the `items` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                item_id                 INTEGER PRIMARY KEY,
                name                    TEXT NOT NULL,
                description             TEXT NULL,
                quantity                INTEGER NOT NULL CHECK (quantity >= 0),
                category                TEXT NULL,
                minimum_stock_threshold INTEGER NOT NULL CHECK (minimum_stock_threshold >= 0)
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        Ok(())
    }

    async fn fetch_items(&self, operation: &str, sql: &str) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query(sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        rows_to_items(rows)
    }
}

#[async_trait]
impl ItemStore for PostgresItemStore {
    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_item", e))?;

        row.map(row_to_item).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_name(&self, name: &str) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE name = $1 ORDER BY item_id LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_item_by_name", e))?;

        row.map(row_to_item).transpose()
    }

    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.fetch_items(
            "list_items",
            &format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY item_id"),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn list_by_category(&self, category: &str) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE category = $1 ORDER BY item_id"
        ))
        .bind(category)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items_by_category", e))?;

        rows_to_items(rows)
    }

    async fn list_by_stock_level(&self, level: StockLevel) -> Result<Vec<Item>, StoreError> {
        let predicate = match level {
            StockLevel::Low => "quantity < minimum_stock_threshold",
            StockLevel::High => "quantity >= minimum_stock_threshold",
        };
        self.fetch_items(
            "list_items_by_stock_level",
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE {predicate} ORDER BY item_id"),
        )
        .await
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT category FROM items WHERE category IS NOT NULL ORDER BY category",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_categories", e))?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("category"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_categories", e))
    }

    #[instrument(skip(self, item), fields(item_id = %item.id()), err)]
    async fn insert(&self, item: Item) -> Result<Item, StoreError> {
        let id = item.id();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO items ({ITEM_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(item.name())
        .bind(item.description())
        .bind(item.quantity())
        .bind(item.category())
        .bind(item.minimum_stock_threshold())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(id)
            } else {
                map_sqlx_error("insert_item", e)
            }
        })?;

        row_to_item(row)
    }

    #[instrument(skip(self, item), fields(item_id = %item.id()), err)]
    async fn replace(&self, item: Item) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE items SET
                name = $2,
                description = $3,
                quantity = $4,
                category = $5,
                minimum_stock_threshold = $6
            WHERE item_id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.id().get())
        .bind(item.name())
        .bind(item.description())
        .bind(item.quantity())
        .bind(item.category())
        .bind(item.minimum_stock_threshold())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("replace_item", e))?;

        row.map(row_to_item).transpose()
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn adjust_quantity(&self, id: ItemId, delta: i32) -> Result<AdjustOutcome, StoreError> {
        // Range check in bigint so the guard itself cannot overflow.
        let row = sqlx::query(&format!(
            r#"
            UPDATE items SET quantity = quantity + $2
            WHERE item_id = $1
              AND quantity::bigint + $2::bigint BETWEEN 0 AND 2147483647
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(delta)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("adjust_quantity", e))?;

        if let Some(row) = row {
            return Ok(AdjustOutcome::Adjusted(row_to_item(row)?));
        }

        // Nothing updated: either the row is missing or the guard rejected the delta.
        let current = sqlx::query("SELECT quantity FROM items WHERE item_id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("adjust_quantity", e))?;

        let Some(current) = current else {
            return Ok(AdjustOutcome::Missing);
        };
        let quantity: i32 = current
            .try_get("quantity")
            .map_err(|e| map_sqlx_error("adjust_quantity", e))?;

        let reason = match apply_quantity_delta(quantity, delta) {
            Err(e) => e,
            // The row moved between the two statements; report the delta as rejected.
            Ok(_) => stockroom_core::DomainError::invalid_operation(
                "quantity changed concurrently; retry the adjustment",
            ),
        };
        Ok(AdjustOutcome::Rejected(reason))
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM items WHERE item_id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;

        Ok(result.rows_affected() > 0)
    }
}

// SQLx row types

#[derive(Debug)]
struct ItemRow {
    item_id: i32,
    name: String,
    description: Option<String>,
    quantity: i32,
    category: Option<String>,
    minimum_stock_threshold: i32,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for ItemRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow {
            item_id: row.try_get("item_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            quantity: row.try_get("quantity")?,
            category: row.try_get("category")?,
            minimum_stock_threshold: row.try_get("minimum_stock_threshold")?,
        })
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let id = ItemId::new(row.item_id);
        Item::new(
            id,
            ItemFields {
                name: row.name,
                description: row.description,
                quantity: row.quantity,
                category: row.category,
                minimum_stock_threshold: row.minimum_stock_threshold,
            },
        )
        .map_err(|e| StoreError::Backend(format!("corrupt item row {id}: {e}")))
    }
}

fn row_to_item(row: sqlx::postgres::PgRow) -> Result<Item, StoreError> {
    let parsed = ItemRow::from_row(&row)
        .map_err(|e| StoreError::Backend(format!("failed to deserialize item row: {e}")))?;
    Item::try_from(parsed)
}

fn rows_to_items(rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<Item>, StoreError> {
    rows.into_iter().map(row_to_item).collect()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.to_string()).unwrap_or_default();
            StoreError::Backend(format!(
                "database error in {operation} (code {code}): {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Backend(format!("{operation} failed: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::DomainError;

    // Needs a reachable database:
    //   DATABASE_URL=postgres://... cargo test -p stockroom-infra -- --ignored
    async fn store_from_env() -> PostgresItemStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        PostgresItemStore::connect(&url).await.expect("failed to connect")
    }

    fn item(id: ItemId, quantity: i32) -> Item {
        Item::new(
            id,
            ItemFields {
                name: format!("pg-item-{id}"),
                description: None,
                quantity,
                category: Some("Test".to_string()),
                minimum_stock_threshold: 5,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn adjust_quantity_tells_missing_from_rejected() {
        let store = store_from_env().await;
        let id = ItemId::new(900_001);
        let missing = ItemId::new(900_002);
        store.delete(id).await.unwrap();
        store.delete(missing).await.unwrap();
        store.insert(item(id, 10)).await.unwrap();

        assert_eq!(
            store.adjust_quantity(missing, 1).await.unwrap(),
            AdjustOutcome::Missing
        );

        match store.adjust_quantity(id, -20).await.unwrap() {
            AdjustOutcome::Rejected(DomainError::InvalidOperation(_)) => {}
            other => panic!("Expected rejection below zero, got {other:?}"),
        }

        match store.adjust_quantity(id, i32::MAX).await.unwrap() {
            AdjustOutcome::Rejected(DomainError::InvalidOperation(_)) => {}
            other => panic!("Expected rejection on overflow, got {other:?}"),
        }
        assert_eq!(store.get(id).await.unwrap().unwrap().quantity(), 10);

        match store.adjust_quantity(id, -3).await.unwrap() {
            AdjustOutcome::Adjusted(updated) => assert_eq!(updated.quantity(), 7),
            other => panic!("Expected adjustment, got {other:?}"),
        }

        assert!(store.delete(id).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn insert_maps_unique_violation_to_duplicate() {
        let store = store_from_env().await;
        let id = ItemId::new(900_003);
        store.delete(id).await.unwrap();
        store.insert(item(id, 1)).await.unwrap();

        let err = store.insert(item(id, 2)).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(dup) if dup == id));

        assert!(store.delete(id).await.unwrap());
    }
}
