//! Definición del Contexto de Aplicación (Shared State).
//!
//! El `AppContext` agrupa los recursos que deben ser accesibles por múltiples tareas
//! concurrentes: el almacén elegido por configuración y la configuración misma.


use std::sync::Arc;
use tracing::info;
use crate::database::repository::Repository;
use crate::store::domain::Store;
use crate::store::memory::MemoryStore;
use crate::system::domain::{StoreBackend, System};


#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn Store>,
    pub system: Arc<System>,
}


impl AppContext {
    pub async fn new(system: System) -> Self {
        let store: Arc<dyn Store> = match (system.store_backend, system.database_url.as_deref()) {
            (StoreBackend::Postgres, Some(url)) => {
                info!("Info: usando almacén PostgreSQL");
                Arc::new(Repository::create_repository(url, system.db_pool_size).await)
            }
            _ => {
                info!("Info: usando almacén en memoria");
                Arc::new(MemoryStore::new())
            }
        };
        Self::with_store(store, system)
    }

    pub fn with_store(store: Arc<dyn Store>, system: System) -> Self {
        Self { store, system: Arc::new(system) }
    }
}
