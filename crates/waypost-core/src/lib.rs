//! Waypost Core Library
//!
//! This crate provides the core functionality for Waypost, a small service
//! that keeps a list of labeled addresses. An address's free-text `details`
//! may embed a coordinate pair as `Lat: <float>, Lng: <float>`.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = AddressStore::in_memory();
//!
//! // Save the current location
//! let here = Coordinates::new(12.34, 56.78);
//! let record = store.create(NewAddress::at("Current Location", here))?;
//!
//! // Read coordinates back out of the details string
//! assert_eq!(record.coordinates(), Some(here));
//! ```
//!
//! # Modules
//!
//! - `store`: id assignment and the record lifecycle (main entry point)
//! - `models`: records, ids, and create input
//! - `codec`: the `Lat: x, Lng: y` details format
//! - `storage`: in-memory and SQLite backends
//! - `config`: Application configuration
//! - `error`: validation / not-found / storage errors

pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod store;

pub use codec::Coordinates;
pub use config::{BackendKind, Config};
pub use error::{Field, StoreError, StoreResult, ValidationError};
pub use models::{AddressId, AddressRecord, Marker, NewAddress};
pub use storage::{AddressBackend, MemoryBackend, SqliteBackend, StorageError};
pub use store::AddressStore;
