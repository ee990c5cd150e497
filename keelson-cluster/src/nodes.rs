//! Data-plane store handles
//!
//! Maps node ids to their replica stores. The registry is the engine's
//! route to the data plane; lookup failures surface as `NodeUnavailable`.

use crate::error::{ClusterError, Result};
use keelson::NodeStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Handles to every node's replica store.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    stores: RwLock<HashMap<u32, Arc<NodeStore>>>,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node's store. Replaces any previous handle for the same id.
    pub fn insert(&self, store: Arc<NodeStore>) {
        self.stores.write().insert(store.node_id(), store);
    }

    /// Store handle for a node, or `NodeUnavailable`.
    pub fn get(&self, node_id: u32) -> Result<Arc<NodeStore>> {
        self.stores
            .read()
            .get(&node_id)
            .cloned()
            .ok_or(ClusterError::NodeUnavailable(node_id))
    }

    /// Store handle for a node, if present.
    pub fn try_get(&self, node_id: u32) -> Option<Arc<NodeStore>> {
        self.stores.read().get(&node_id).cloned()
    }

    /// Handles to every registered store, sorted by node id.
    pub fn all(&self) -> Vec<Arc<NodeStore>> {
        let mut stores: Vec<Arc<NodeStore>> = self.stores.read().values().cloned().collect();
        stores.sort_by_key(|s| s.node_id());
        stores
    }

    /// Number of registered stores.
    pub fn len(&self) -> usize {
        self.stores.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.read().is_empty()
    }
}
