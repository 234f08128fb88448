//! Address store
//!
//! The `AddressStore` is the only owner of the id → record mapping. It
//! validates input, hands out ids, and delegates keeping the records to an
//! [`AddressBackend`].
//!
//! ## Ids
//!
//! Ids come from a monotonic counter: the next id is the number of records
//! ever created plus one. Deleting a record, even the newest one, never
//! makes its id available again. With the SQLite backend the counter
//! survives restarts.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = AddressStore::in_memory();
//!
//! let home = store.create(NewAddress::new("Home", "Lat: 12.34, Lng: 56.78"))?;
//! assert_eq!(home.id().get(), 1);
//!
//! store.delete(home.id())?;
//! ```

use tracing::debug;

use crate::config::{BackendKind, Config};
use crate::error::{StoreError, StoreResult};
use crate::models::{AddressId, AddressRecord, Marker, NewAddress};
use crate::storage::{AddressBackend, MemoryBackend, SqliteBackend};

/// Authoritative set of saved addresses
pub struct AddressStore {
    backend: Box<dyn AddressBackend>,
    /// Number of ids handed out so far
    issued: u64,
}

impl AddressStore {
    /// A fresh store that keeps records in memory
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            issued: 0,
        }
    }

    /// Open a store over an existing backend, resuming its id counter
    pub fn open(backend: impl AddressBackend + 'static) -> StoreResult<Self> {
        let issued = backend.issued_ids()?;
        Ok(Self {
            backend: Box::new(backend),
            issued,
        })
    }

    /// Open the store the configuration asks for
    pub fn open_with_config(config: &Config) -> StoreResult<Self> {
        match config.backend {
            BackendKind::Memory => Ok(Self::in_memory()),
            BackendKind::Sqlite => Self::open(SqliteBackend::open(&config.sqlite_path())?),
        }
    }

    /// Create a record from validated input
    pub fn create(&mut self, new: NewAddress) -> StoreResult<AddressRecord> {
        new.validate()?;

        let id = AddressId::new(self.issued + 1);
        let record = AddressRecord::new(id, new.label, new.details);
        self.backend.insert(&record)?;
        self.issued = id.get();

        debug!(id = %id, label = record.label(), "created address");
        Ok(record)
    }

    /// All live records in creation order
    pub fn list(&self) -> StoreResult<Vec<AddressRecord>> {
        Ok(self.backend.load_all()?)
    }

    /// A single live record
    pub fn get(&self, id: AddressId) -> StoreResult<Option<AddressRecord>> {
        Ok(self.backend.get(id)?)
    }

    /// Records whose details carry coordinates, in creation order
    pub fn markers(&self) -> StoreResult<Vec<Marker>> {
        Ok(self
            .list()?
            .iter()
            .filter_map(AddressRecord::marker)
            .collect())
    }

    /// Remove a record
    ///
    /// Returns `Ok(true)` when removed; a missing id is
    /// [`StoreError::NotFound`] and leaves the store unchanged.
    pub fn delete(&mut self, id: AddressId) -> StoreResult<bool> {
        if !self.backend.remove(id)? {
            return Err(StoreError::NotFound(id));
        }

        debug!(id = %id, "deleted address");
        Ok(true)
    }

    /// Parse `raw` as an id, then [`delete`](Self::delete) it
    pub fn delete_by_raw(&mut self, raw: &str) -> StoreResult<bool> {
        let id: AddressId = raw.parse()?;
        self.delete(id)
    }

    /// Number of live records
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.list()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
