use std::sync::Arc;

use anyhow::Context;

use stockroom_infra::{
    AppConfig, InMemoryItemStore, ItemService, ItemStore, PostgresItemStore, StoreBackend,
};

/// Store handle shared by every request, whichever backend is configured.
pub type SharedStore = Arc<dyn ItemStore>;

/// Services available to HTTP handlers (injected as an `Extension`).
#[derive(Clone)]
pub struct AppServices {
    pub items: ItemService<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore) -> Self {
        Self {
            items: ItemService::new(store),
        }
    }

    /// In-memory services, used for dev and tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryItemStore::new()))
    }
}

/// Wire services for the configured store backend.
///
/// `USE_PERSISTENT_STORES=true` selects Postgres (schema created on startup);
/// otherwise everything lives in memory and is lost on restart.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match &config.store {
        StoreBackend::InMemory => {
            tracing::info!("using in-memory item store");
            Ok(AppServices::in_memory())
        }
        StoreBackend::Postgres { database_url } => {
            let store = PostgresItemStore::connect(database_url)
                .await
                .context("failed to connect to postgres item store")?;
            tracing::info!("using postgres item store");
            Ok(AppServices::new(Arc::new(store)))
        }
    }
}
