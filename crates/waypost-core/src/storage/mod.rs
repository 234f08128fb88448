//! Storage layer
//!
//! The [`AddressStore`](crate::store::AddressStore) owns id assignment and
//! validation; a backend only keeps records and remembers the highest id
//! ever issued so ids are not reused across restarts.
//!
//! ## Backends
//!
//! - [`MemoryBackend`]: process lifetime, lost on restart
//! - [`SqliteBackend`]: single-file SQLite database

pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryBackend;
pub use schema::SCHEMA_VERSION;
pub use sqlite::SqliteBackend;

use crate::models::{AddressId, AddressRecord};

/// Where address records live
///
/// Implementations are driven sequentially by the store; they do not need
/// their own locking.
pub trait AddressBackend: Send {
    /// All records in ascending id order
    fn load_all(&self) -> StorageResult<Vec<AddressRecord>>;

    /// A single record
    fn get(&self, id: AddressId) -> StorageResult<Option<AddressRecord>>;

    /// Persist a new record and raise the issued-id mark to its id
    fn insert(&mut self, record: &AddressRecord) -> StorageResult<()>;

    /// Remove a record, reporting whether it existed
    fn remove(&mut self, id: AddressId) -> StorageResult<bool>;

    /// Highest id ever issued (0 when none)
    fn issued_ids(&self) -> StorageResult<u64>;
}
