//! # State Store Port
//!
//! The durable ledger state lives outside this workspace. Validators and the
//! orchestrator only read from it through [`StateStore`].
//!
//! [`InMemoryStateStore`] is a map-backed implementation used by the runtime
//! in development mode and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::address::Address;
use crate::entities::{AdminEntry, NodeEntry};
use crate::errors::StateError;
use crate::indexer_entry;

/// Read access to the external ordered key-value state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Raw entry under `key`. Transaction confirmations are keyed by the raw
    /// transaction hash bytes.
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError>;

    /// The registered admin, if any.
    async fn get_admin_entry(&self) -> Result<Option<AdminEntry>, StateError>;

    /// The directory entry for `address`, if any.
    async fn get_node_entry(&self, address: &Address) -> Result<Option<NodeEntry>, StateError>;

    /// The encoded indexer membership list, if the store tracks one.
    async fn get_indexer_entry(&self) -> Result<Option<Vec<u8>>, StateError> {
        Ok(None)
    }
}

/// Map-backed state store.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    entries: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
    admin: RwLock<Option<AdminEntry>>,
    nodes: RwLock<HashMap<Address, NodeEntry>>,
    indexers: RwLock<Option<Vec<u8>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &[u8], value: &[u8]) {
        self.entries.write().insert(key.to_vec(), value.to_vec());
    }

    pub fn set_admin_entry(&self, entry: AdminEntry) {
        *self.admin.write() = Some(entry);
    }

    pub fn put_node_entry(&self, entry: NodeEntry) {
        self.nodes.write().insert(entry.address.clone(), entry);
    }

    /// Add an indexer. Returns `false` when the codec rejected the update.
    pub fn add_indexer(&self, address: &Address) -> bool {
        let mut guard = self.indexers.write();
        let updated = indexer_entry::append(address.as_bytes(), guard.as_deref());
        if indexer_entry::is_sentinel(&updated) {
            return false;
        }
        *guard = Some(updated);
        true
    }

    /// Remove an indexer. Returns `false` when it was not present.
    pub fn remove_indexer(&self, address: &Address) -> bool {
        let mut guard = self.indexers.write();
        let Some(current) = guard.as_deref() else {
            return false;
        };
        let updated = indexer_entry::remove(address.as_bytes(), current);
        if indexer_entry::is_sentinel(&updated) {
            return false;
        }
        *guard = Some(updated);
        true
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn get_admin_entry(&self) -> Result<Option<AdminEntry>, StateError> {
        Ok(self.admin.read().clone())
    }

    async fn get_node_entry(&self, address: &Address) -> Result<Option<NodeEntry>, StateError> {
        Ok(self.nodes.read().get(address).cloned())
    }

    async fn get_indexer_entry(&self) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.indexers.read().clone())
    }
}
