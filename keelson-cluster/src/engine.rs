//! Reassignment engine
//!
//! Admits replica-set changes and drives the data movement they imply.
//! `propose` returns as soon as the proposal is validated and recorded;
//! the movement runs on a spawned task and converges in the background
//! while callers poll partition status.
//!
//! Movement ordering: added replicas are copied first, cross-core moves
//! are rebound next, and removed replicas are deleted only after every
//! addition is confirmed durable, so a partition never drops below its
//! replication factor mid-move. A failed transfer leaves the partition
//! in progress; there is no automatic retry.

use crate::config::ControllerConfig;
use crate::directory::BrokerDirectory;
use crate::error::{ClusterError, Result};
use crate::metrics;
use crate::nodes::NodeRegistry;
use crate::placement::{validate, ReplicaAssignment, ReplicaSet};
use crate::tracker::{MoveDecision, MovePlan, MovementTracker};
use futures::stream::{self, StreamExt};
use keelson::Ntp;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Drives partition reassignment: admission, transfer, cleanup.
pub struct ReassignmentEngine {
    config: ControllerConfig,
    directory: Arc<BrokerDirectory>,
    registry: Arc<NodeRegistry>,
    tracker: Arc<MovementTracker>,
}

impl ReassignmentEngine {
    /// Create an engine over the given directory, stores, and tracker.
    pub fn new(
        config: ControllerConfig,
        directory: Arc<BrokerDirectory>,
        registry: Arc<NodeRegistry>,
        tracker: Arc<MovementTracker>,
    ) -> Self {
        Self {
            config,
            directory,
            registry,
            tracker,
        }
    }

    /// Propose a new replica set for a partition.
    ///
    /// Validation and the placement transition happen synchronously under
    /// the tracker's per-partition guard; at most one move can be in
    /// flight per partition. A target identical to the current set
    /// succeeds immediately with no data movement. Must be called from
    /// within a Tokio runtime.
    pub fn propose(&self, ntp: &Ntp, target: ReplicaSet) -> Result<()> {
        let brokers = self.directory.brokers();
        let decision = self.tracker.begin(ntp, |placement| {
            validate(&placement.current, &target, &brokers)?;
            Ok(target.clone())
        })?;

        match decision {
            MoveDecision::Noop => {
                metrics::record_move_noop();
                debug!(%ntp, "no-op reassignment");
                Ok(())
            }
            MoveDecision::Move(plan) => {
                metrics::record_move_accepted();
                self.spawn_move(plan);
                Ok(())
            }
        }
    }

    fn spawn_move(&self, plan: MovePlan) {
        let config = self.config.clone();
        let directory = Arc::clone(&self.directory);
        let registry = Arc::clone(&self.registry);
        let tracker = Arc::clone(&self.tracker);

        tokio::spawn(async move {
            let started = Instant::now();
            let ntp = plan.ntp.clone();
            let epoch = plan.epoch;

            match execute_move(&config, &directory, &registry, plan).await {
                Ok(()) => {
                    if let Err(err) = tracker.finish(&ntp) {
                        warn!(%ntp, %err, "failed to finalize reassignment");
                        return;
                    }
                    metrics::record_move_completed(started.elapsed());
                    info!(
                        %ntp,
                        epoch,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "reassignment converged"
                    );
                }
                Err(err) => {
                    // The partition stays in progress and is observable
                    // through status queries; retry is an operator concern.
                    metrics::record_transfer_failure(err.error_type());
                    warn!(%ntp, epoch, %err, "reassignment stalled");
                }
            }
        });
    }
}

/// Copy, rebind, and delete replicas for one admitted move.
async fn execute_move(
    config: &ControllerConfig,
    directory: &BrokerDirectory,
    registry: &NodeRegistry,
    plan: MovePlan,
) -> Result<()> {
    // Phase 1: materialize added replicas before anything is torn down.
    if !plan.diff.added.is_empty() {
        let source = transfer_source(&plan)?;

        let mut transfers = stream::iter(plan.diff.added.iter().copied())
            .map(|destination| {
                copy_replica(config, directory, registry, &plan.ntp, source, destination)
            })
            .buffer_unordered(config.max_concurrent_transfers.max(1));

        while let Some(result) = transfers.next().await {
            result?;
        }
    }

    // Phase 2: rebind cross-core moves on nodes kept in the set.
    for core_move in &plan.diff.core_moves {
        let store = registry.get(core_move.node_id)?;
        store.move_core(&plan.ntp, core_move.to_core)?;
        debug!(
            ntp = %plan.ntp,
            node_id = core_move.node_id,
            from_core = core_move.from_core,
            to_core = core_move.to_core,
            "rebound replica core"
        );
    }

    // Phase 3: tear down replicas leaving the set. Every addition is
    // durable at this point, so removal cannot under-replicate.
    for assignment in &plan.diff.removed {
        let store = registry.get(assignment.node_id)?;
        store.delete_replica(&plan.ntp)?;
        debug!(ntp = %plan.ntp, node_id = assignment.node_id, "removed replica");
    }

    Ok(())
}

/// Pick the replica the new copies are read from: an unchanged replica
/// when one exists, otherwise any current replica (replicas being removed
/// still host the log until phase 3).
fn transfer_source(plan: &MovePlan) -> Result<ReplicaAssignment> {
    plan.diff
        .unchanged
        .first()
        .copied()
        .or_else(|| plan.current.iter().next().copied())
        .ok_or_else(|| {
            ClusterError::Internal(format!("partition {} has no source replica", plan.ntp))
        })
}

/// Copy one partition log to a new replica, chunk by chunk.
async fn copy_replica(
    config: &ControllerConfig,
    directory: &BrokerDirectory,
    registry: &NodeRegistry,
    ntp: &Ntp,
    source: ReplicaAssignment,
    destination: ReplicaAssignment,
) -> Result<usize> {
    if !directory.is_reachable(source.node_id) {
        return Err(ClusterError::NodeUnavailable(source.node_id));
    }
    if !directory.is_reachable(destination.node_id) {
        return Err(ClusterError::NodeUnavailable(destination.node_id));
    }

    let source_store = registry.get(source.node_id)?;
    let source_log = source_store.log(ntp).ok_or_else(|| {
        ClusterError::Internal(format!(
            "source replica for {ntp} missing on node {}",
            source.node_id
        ))
    })?;

    let destination_store = registry.get(destination.node_id)?;
    let destination_log = destination_store.create_replica(ntp.clone(), destination.core)?;

    let chunk_records = config.transfer_chunk_records.max(1);
    let mut copied = 0;
    loop {
        // A node lost mid-transfer stalls the move rather than finishing
        // with a partial copy.
        if !directory.is_reachable(destination.node_id) {
            return Err(ClusterError::NodeUnavailable(destination.node_id));
        }

        let chunk = source_log.read_from(copied, chunk_records);
        if chunk.is_empty() {
            break;
        }
        let chunk_len = chunk.len();
        copied += chunk_len;
        destination_log.append_batch(chunk);

        match config.transfer_rate_limit {
            Some(rate) if rate > 0 => {
                tokio::time::sleep(Duration::from_secs_f64(chunk_len as f64 / rate as f64)).await;
            }
            _ => tokio::task::yield_now().await,
        }
    }

    metrics::record_records_transferred(copied as u64);
    debug!(
        %ntp,
        from_node = source.node_id,
        to_node = destination.node_id,
        to_core = destination.core,
        records = copied,
        "replica transfer complete"
    );
    Ok(copied)
}
