//! Read-only placement reporting
//!
//! Two independent views of where a partition lives: the controller's own
//! bookkeeping (movement tracker), and ground truth enumerated from the
//! node stores themselves. Tests and operators compare the two to confirm
//! that recorded convergence matches physical reality.

use crate::error::Result;
use crate::nodes::NodeRegistry;
use crate::placement::{PartitionStatus, ReplicaAssignment, ReplicaSet};
use crate::tracker::MovementTracker;
use keelson::{LocalPartition, Ntp};
use std::sync::Arc;

/// Read API over controller state and per-node ground truth.
pub struct StatusReporter {
    registry: Arc<NodeRegistry>,
    tracker: Arc<MovementTracker>,
}

impl StatusReporter {
    pub fn new(registry: Arc<NodeRegistry>, tracker: Arc<MovementTracker>) -> Self {
        Self { registry, tracker }
    }

    /// Controller-reported status for one partition.
    pub fn partition_status(&self, ntp: &Ntp) -> Result<PartitionStatus> {
        self.tracker.status(ntp)
    }

    /// Partitions actually hosted on a node, independent of tracker
    /// bookkeeping.
    pub fn list_local_partitions(&self, node_id: u32) -> Result<Vec<LocalPartition>> {
        Ok(self.registry.get(node_id)?.local_partitions())
    }

    /// Ground-truth replica set for one partition, derived by asking every
    /// node what it hosts.
    pub fn derived_replicas(&self, ntp: &Ntp) -> ReplicaSet {
        self.registry
            .all()
            .iter()
            .filter_map(|store| {
                store
                    .replica_core(ntp)
                    .map(|core| ReplicaAssignment::new(store.node_id(), core))
            })
            .collect()
    }
}
