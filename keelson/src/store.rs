//! Per-node replica store
//!
//! One `NodeStore` exists per broker and owns every partition replica the
//! node hosts. The controller manipulates stores through create/delete/
//! move_core; verification reads go through [`NodeStore::local_partitions`],
//! which enumerates what the node actually hosts rather than what any
//! bookkeeping claims.

use crate::error::{Result, StoreError};
use crate::log::PartitionLog;
use crate::ntp::Ntp;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A partition replica hosted on a node, as reported by ground-truth
/// enumeration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalPartition {
    #[serde(flatten)]
    pub ntp: Ntp,
    pub core: u32,
}

#[derive(Debug)]
struct HostedReplica {
    core: u32,
    log: Arc<PartitionLog>,
}

/// All partition replicas hosted by a single node.
#[derive(Debug)]
pub struct NodeStore {
    node_id: u32,
    num_cores: u32,
    replicas: RwLock<HashMap<Ntp, HostedReplica>>,
}

impl NodeStore {
    /// Create an empty store for a node with `num_cores` cores.
    pub fn new(node_id: u32, num_cores: u32) -> Self {
        Self {
            node_id,
            num_cores,
            replicas: RwLock::new(HashMap::new()),
        }
    }

    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    pub fn num_cores(&self) -> u32 {
        self.num_cores
    }

    /// Host a new replica on the given core, returning its empty log.
    pub fn create_replica(&self, ntp: Ntp, core: u32) -> Result<Arc<PartitionLog>> {
        if core >= self.num_cores {
            return Err(StoreError::InvalidCore {
                node_id: self.node_id,
                core,
                num_cores: self.num_cores,
            });
        }

        let mut replicas = self.replicas.write();
        if replicas.contains_key(&ntp) {
            return Err(StoreError::ReplicaExists {
                ntp,
                node_id: self.node_id,
            });
        }

        let log = Arc::new(PartitionLog::new());
        debug!(node_id = self.node_id, %ntp, core, "hosting replica");
        replicas.insert(
            ntp,
            HostedReplica {
                core,
                log: Arc::clone(&log),
            },
        );
        Ok(log)
    }

    /// Drop a hosted replica and its log.
    pub fn delete_replica(&self, ntp: &Ntp) -> Result<()> {
        let removed = self.replicas.write().remove(ntp);
        match removed {
            Some(_) => {
                debug!(node_id = self.node_id, %ntp, "deleted replica");
                Ok(())
            }
            None => Err(StoreError::ReplicaNotFound {
                ntp: ntp.clone(),
                node_id: self.node_id,
            }),
        }
    }

    /// Rebind a hosted replica to a different core on this node.
    ///
    /// Cross-core moves keep the log in place; only the core binding
    /// changes.
    pub fn move_core(&self, ntp: &Ntp, core: u32) -> Result<()> {
        if core >= self.num_cores {
            return Err(StoreError::InvalidCore {
                node_id: self.node_id,
                core,
                num_cores: self.num_cores,
            });
        }

        let mut replicas = self.replicas.write();
        match replicas.get_mut(ntp) {
            Some(replica) => {
                debug!(
                    node_id = self.node_id,
                    %ntp,
                    from_core = replica.core,
                    to_core = core,
                    "moving replica between cores"
                );
                replica.core = core;
                Ok(())
            }
            None => Err(StoreError::ReplicaNotFound {
                ntp: ntp.clone(),
                node_id: self.node_id,
            }),
        }
    }

    /// Log handle for a hosted replica, if present.
    pub fn log(&self, ntp: &Ntp) -> Option<Arc<PartitionLog>> {
        self.replicas.read().get(ntp).map(|r| Arc::clone(&r.log))
    }

    /// Whether this node hosts a replica of the partition.
    pub fn hosts(&self, ntp: &Ntp) -> bool {
        self.replicas.read().contains_key(ntp)
    }

    /// Core the replica is bound to, if hosted.
    pub fn replica_core(&self, ntp: &Ntp) -> Option<u32> {
        self.replicas.read().get(ntp).map(|r| r.core)
    }

    /// Ground-truth enumeration of every replica hosted on this node,
    /// sorted by partition identity for stable output.
    pub fn local_partitions(&self) -> Vec<LocalPartition> {
        let mut partitions: Vec<LocalPartition> = self
            .replicas
            .read()
            .iter()
            .map(|(ntp, replica)| LocalPartition {
                ntp: ntp.clone(),
                core: replica.core,
            })
            .collect();
        partitions.sort();
        partitions
    }

    /// Number of replicas hosted on this node.
    pub fn replica_count(&self) -> usize {
        self.replicas.read().len()
    }
}
