//! In-memory backend

use std::collections::BTreeMap;

use super::{AddressBackend, StorageResult};
use crate::models::{AddressId, AddressRecord};

/// Keeps records in a map for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: BTreeMap<AddressId, AddressRecord>,
    issued: u64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AddressBackend for MemoryBackend {
    fn load_all(&self) -> StorageResult<Vec<AddressRecord>> {
        Ok(self.records.values().cloned().collect())
    }

    fn get(&self, id: AddressId) -> StorageResult<Option<AddressRecord>> {
        Ok(self.records.get(&id).cloned())
    }

    fn insert(&mut self, record: &AddressRecord) -> StorageResult<()> {
        self.records.insert(record.id(), record.clone());
        self.issued = self.issued.max(record.id().get());
        Ok(())
    }

    fn remove(&mut self, id: AddressId) -> StorageResult<bool> {
        Ok(self.records.remove(&id).is_some())
    }

    fn issued_ids(&self) -> StorageResult<u64> {
        Ok(self.issued)
    }
}
