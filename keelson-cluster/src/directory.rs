//! Broker directory
//!
//! Tracks registered brokers and their reachability. The directory is
//! injected as an explicit dependency wherever a broker snapshot is needed,
//! never consumed as ambient global state; callers get an immutable copy
//! per query.

use crate::error::{ClusterError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// A broker eligible to host partition replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    pub node_id: u32,
    pub num_cores: u32,
}

#[derive(Debug, Clone)]
struct BrokerState {
    broker: Broker,
    reachable: bool,
}

/// Registry of cluster brokers, consumed as read-only snapshots.
#[derive(Debug, Default)]
pub struct BrokerDirectory {
    brokers: RwLock<BTreeMap<u32, BrokerState>>,
}

impl BrokerDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a broker. Registration is external cluster-membership
    /// input; duplicate node ids are rejected.
    pub fn register(&self, broker: Broker) -> Result<()> {
        let mut brokers = self.brokers.write();
        if brokers.contains_key(&broker.node_id) {
            return Err(ClusterError::BrokerExists(broker.node_id));
        }
        info!(
            node_id = broker.node_id,
            num_cores = broker.num_cores,
            "registered broker"
        );
        brokers.insert(
            broker.node_id,
            BrokerState {
                broker,
                reachable: true,
            },
        );
        Ok(())
    }

    /// Snapshot of every registered broker.
    pub fn brokers(&self) -> Vec<Broker> {
        self.brokers.read().values().map(|s| s.broker).collect()
    }

    /// Look up a single broker.
    pub fn get(&self, node_id: u32) -> Option<Broker> {
        self.brokers.read().get(&node_id).map(|s| s.broker)
    }

    /// Mark a broker unreachable. Transfers touching it will stall until
    /// it is marked reachable again.
    pub fn mark_unreachable(&self, node_id: u32) {
        if let Some(state) = self.brokers.write().get_mut(&node_id) {
            warn!(node_id, "broker marked unreachable");
            state.reachable = false;
        }
    }

    /// Mark a broker reachable again.
    pub fn mark_reachable(&self, node_id: u32) {
        if let Some(state) = self.brokers.write().get_mut(&node_id) {
            info!(node_id, "broker marked reachable");
            state.reachable = true;
        }
    }

    /// Whether a broker is registered and currently reachable.
    pub fn is_reachable(&self, node_id: u32) -> bool {
        self.brokers
            .read()
            .get(&node_id)
            .map(|s| s.reachable)
            .unwrap_or(false)
    }

    /// Number of registered brokers.
    pub fn len(&self) -> usize {
        self.brokers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.brokers.read().is_empty()
    }
}
