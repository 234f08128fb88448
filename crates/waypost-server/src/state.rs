use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::spawn_blocking;
use waypost_core::{AddressStore, StoreResult};

use crate::error::ApiError;

/// Shared handler state
///
/// Handlers hold the store lock for the whole operation, so creates and
/// deletes run one at a time.
pub struct AppState {
    store: Mutex<AddressStore>,
}

impl AppState {
    pub fn new(store: AddressStore) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
        })
    }

    /// Run one store operation on the blocking pool
    ///
    /// SQLite calls block, so they stay off the async workers.
    pub async fn with_store<T, F>(self: &Arc<Self>, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut AddressStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        let result = spawn_blocking(move || {
            // The counter only moves after a successful insert, so the store
            // is consistent even if an earlier operation panicked
            let mut store = state.store.lock().unwrap_or_else(PoisonError::into_inner);
            op(&mut store)
        })
        .await?;

        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypost_core::NewAddress;

    #[tokio::test]
    async fn test_with_store_runs_operations_in_order() {
        let state = AppState::new(AddressStore::in_memory());

        let first = state
            .with_store(|store| store.create(NewAddress::new("Home", "a")))
            .await
            .unwrap();
        let second = state
            .with_store(|store| store.create(NewAddress::new("Office", "b")))
            .await
            .unwrap();

        assert_eq!(first.id().get(), 1);
        assert_eq!(second.id().get(), 2);
        assert_eq!(state.with_store(|store| store.len()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_panicking_operation_is_an_internal_error() {
        let state = AppState::new(AddressStore::in_memory());
        state
            .with_store(|store| store.create(NewAddress::new("Home", "a")))
            .await
            .unwrap();

        let err = state
            .with_store(|_| -> StoreResult<()> { panic!("store operation panicked") })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Task(_)));
        assert!(err.status().is_server_error());

        // The store stays usable after the panic
        let records = state.with_store(|store| store.list()).await.unwrap();
        assert_eq!(records.len(), 1);
    }
}
