//! In-process cluster facade
//!
//! Wires the broker directory, node stores, movement tracker, engine, and
//! reporter into one handle. Topic creation builds the initial placement
//! implicitly; reassignment, status, and data-plane access all go through
//! this facade in the same shapes external callers consume.

use crate::config::ControllerConfig;
use crate::directory::{Broker, BrokerDirectory};
use crate::engine::ReassignmentEngine;
use crate::error::{ClusterError, Result};
use crate::nodes::NodeRegistry;
use crate::placement::{assign_initial, PartitionStatus, ReplicaSet};
use crate::report::StatusReporter;
use crate::tracker::MovementTracker;
use keelson::{LocalPartition, NodeStore, Ntp, Record};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::info;

/// Topic metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMetadata {
    pub topic: String,
    pub partitions: u32,
}

/// An in-process keelson cluster: brokers, their stores, and the
/// reassignment controller.
pub struct Cluster {
    directory: Arc<BrokerDirectory>,
    registry: Arc<NodeRegistry>,
    tracker: Arc<MovementTracker>,
    engine: ReassignmentEngine,
    reporter: StatusReporter,
    topics: RwLock<BTreeMap<String, u32>>,
}

impl Cluster {
    /// Create an empty cluster with the given controller tuning.
    pub fn new(config: ControllerConfig) -> Self {
        let directory = Arc::new(BrokerDirectory::new());
        let registry = Arc::new(NodeRegistry::new());
        let tracker = Arc::new(MovementTracker::new());
        let engine = ReassignmentEngine::new(
            config,
            Arc::clone(&directory),
            Arc::clone(&registry),
            Arc::clone(&tracker),
        );
        let reporter = StatusReporter::new(Arc::clone(&registry), Arc::clone(&tracker));
        Self {
            directory,
            registry,
            tracker,
            engine,
            reporter,
            topics: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a broker and create its data-plane store.
    pub fn add_broker(&self, node_id: u32, num_cores: u32) -> Result<()> {
        self.directory.register(Broker { node_id, num_cores })?;
        self.registry.insert(Arc::new(NodeStore::new(node_id, num_cores)));
        info!(node_id, num_cores, "broker joined");
        Ok(())
    }

    /// Snapshot of all registered brokers.
    pub fn brokers(&self) -> Vec<Broker> {
        self.directory.brokers()
    }

    /// Broker directory handle (reachability control).
    pub fn directory(&self) -> &BrokerDirectory {
        &self.directory
    }

    /// Status reporter handle.
    pub fn reporter(&self) -> &StatusReporter {
        &self.reporter
    }

    /// Create a topic. Every partition gets an initial placement with
    /// `current == target`, and its replicas are created on the assigned
    /// node stores.
    pub fn create_topic(
        &self,
        topic: &str,
        partitions: u32,
        replication_factor: usize,
    ) -> Result<()> {
        let mut topics = self.topics.write();
        if topics.contains_key(topic) {
            return Err(ClusterError::TopicExists(topic.to_string()));
        }

        let brokers = self.directory.brokers();
        let sets = assign_initial(&brokers, partitions, replication_factor)?;
        for (partition, replicas) in sets.into_iter().enumerate() {
            let ntp = Ntp::from_topic(topic, partition as u32);
            for assignment in replicas.iter() {
                let store = self.registry.get(assignment.node_id)?;
                store.create_replica(ntp.clone(), assignment.core)?;
            }
            self.tracker.insert(ntp, replicas)?;
        }

        topics.insert(topic.to_string(), partitions);
        info!(topic, partitions, replication_factor, "topic created");
        Ok(())
    }

    /// Topic metadata: every topic with its partition count.
    pub fn topics(&self) -> Vec<TopicMetadata> {
        self.topics
            .read()
            .iter()
            .map(|(topic, partitions)| TopicMetadata {
                topic: topic.clone(),
                partitions: *partitions,
            })
            .collect()
    }

    /// Propose a new replica set for a partition.
    pub fn set_partition_replicas(
        &self,
        topic: &str,
        partition: u32,
        target: ReplicaSet,
    ) -> Result<()> {
        self.engine.propose(&Ntp::from_topic(topic, partition), target)
    }

    /// Controller-reported status for a partition.
    pub fn partition_status(&self, topic: &str, partition: u32) -> Result<PartitionStatus> {
        self.reporter
            .partition_status(&Ntp::from_topic(topic, partition))
    }

    /// Partitions actually hosted on a node.
    pub fn local_partitions(&self, node_id: u32) -> Result<Vec<LocalPartition>> {
        self.reporter.list_local_partitions(node_id)
    }

    /// Ground-truth replica set for a partition, derived across all nodes.
    pub fn derived_replicas(&self, topic: &str, partition: u32) -> ReplicaSet {
        self.reporter
            .derived_replicas(&Ntp::from_topic(topic, partition))
    }

    /// Append records to every live replica of a partition.
    ///
    /// Writes go to the union of current replicas and any target replicas
    /// that already exist, so a move in flight does not lose writes made
    /// behind it. Returns the number of replicas written.
    pub fn append(&self, topic: &str, partition: u32, records: Vec<Record>) -> Result<usize> {
        let ntp = Ntp::from_topic(topic, partition);
        let placement = self.tracker.placement(&ntp)?;

        let mut nodes: BTreeSet<u32> = placement.current.node_ids();
        nodes.extend(placement.target.node_ids());

        let mut written = 0;
        for node_id in nodes {
            let store = self.registry.get(node_id)?;
            if let Some(log) = store.log(&ntp) {
                log.append_batch(records.clone());
                written += 1;
            }
        }
        Ok(written)
    }

    /// Read the full log from any current replica.
    pub fn read(&self, topic: &str, partition: u32) -> Result<Vec<Record>> {
        let ntp = Ntp::from_topic(topic, partition);
        let placement = self.tracker.placement(&ntp)?;

        for assignment in placement.current.iter() {
            if let Some(store) = self.registry.try_get(assignment.node_id) {
                if let Some(log) = store.log(&ntp) {
                    return Ok(log.read_all());
                }
            }
        }
        Err(ClusterError::PartitionNotFound(ntp))
    }

    /// Read the full log from one node's replica of a partition.
    pub fn read_replica(&self, node_id: u32, topic: &str, partition: u32) -> Result<Vec<Record>> {
        let ntp = Ntp::from_topic(topic, partition);
        let store = self.registry.get(node_id)?;
        let log = store
            .log(&ntp)
            .ok_or_else(|| ClusterError::PartitionNotFound(ntp))?;
        Ok(log.read_all())
    }
}
