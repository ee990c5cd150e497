//! Per-partition movement tracking
//!
//! The tracker owns every [`PartitionPlacement`] record and all `status`
//! transitions. Admission runs in a single write-lock critical section:
//! the in-flight guard, validation, diff, and state transition happen
//! atomically, so concurrent proposals for one partition can never both
//! pass the guard.
//!
//! Status queries report the **target** set while a move is in flight, so
//! callers can confirm the accepted intent before convergence; once done,
//! current equals target.

use crate::error::{ClusterError, Result};
use crate::placement::{MoveStatus, PartitionPlacement, PartitionStatus, ReplicaDiff, ReplicaSet};
use keelson::Ntp;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Outcome of an admitted proposal.
#[derive(Debug, Clone)]
pub enum MoveDecision {
    /// Target already matches the current set; nothing to do.
    Noop,
    /// A move was admitted and recorded.
    Move(MovePlan),
}

/// Everything the engine needs to execute an admitted move.
#[derive(Debug, Clone)]
pub struct MovePlan {
    pub ntp: Ntp,
    pub current: ReplicaSet,
    pub target: ReplicaSet,
    pub diff: ReplicaDiff,
    pub epoch: u64,
}

/// Tracks placement records and serializes moves per partition.
#[derive(Debug, Default)]
pub struct MovementTracker {
    placements: RwLock<HashMap<Ntp, PartitionPlacement>>,
}

/// Serializable copy of every placement record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementSnapshot {
    pub placements: Vec<PartitionPlacement>,
}

impl MovementTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the placement created at topic creation
    /// (`current == target`, done).
    pub fn insert(&self, ntp: Ntp, replicas: ReplicaSet) -> Result<()> {
        let mut placements = self.placements.write();
        if placements.contains_key(&ntp) {
            return Err(ClusterError::PartitionExists(ntp));
        }
        placements.insert(ntp.clone(), PartitionPlacement::new(ntp, replicas));
        Ok(())
    }

    /// Admit a reassignment.
    ///
    /// `prepare` receives the placement under the lock and returns the
    /// validated target set; any error it returns rejects the proposal
    /// with no state change. On admission the placement flips to
    /// in-progress with its epoch bumped, and the returned plan carries
    /// the node-keyed diff to execute. At most one move can be in flight
    /// per partition; a second proposal is rejected with
    /// `MoveInProgress`.
    pub fn begin<F>(&self, ntp: &Ntp, prepare: F) -> Result<MoveDecision>
    where
        F: FnOnce(&PartitionPlacement) -> Result<ReplicaSet>,
    {
        let mut placements = self.placements.write();
        let placement = placements
            .get_mut(ntp)
            .ok_or_else(|| ClusterError::PartitionNotFound(ntp.clone()))?;

        if placement.status == MoveStatus::InProgress {
            return Err(ClusterError::MoveInProgress(ntp.clone()));
        }

        let target = prepare(placement)?;
        let diff = ReplicaDiff::between(&placement.current, &target);
        if diff.is_noop() {
            debug!(%ntp, "proposed target matches current replica set");
            return Ok(MoveDecision::Noop);
        }

        placement.target = target.clone();
        placement.status = MoveStatus::InProgress;
        placement.epoch += 1;
        info!(
            %ntp,
            epoch = placement.epoch,
            added = diff.added.len(),
            removed = diff.removed.len(),
            core_moves = diff.core_moves.len(),
            "reassignment admitted"
        );

        Ok(MoveDecision::Move(MovePlan {
            ntp: ntp.clone(),
            current: placement.current.clone(),
            target,
            diff,
            epoch: placement.epoch,
        }))
    }

    /// Converge an in-flight move: atomically set `current = target` and
    /// flip the status to done. Finishing an already-done partition is a
    /// no-op.
    pub fn finish(&self, ntp: &Ntp) -> Result<()> {
        let mut placements = self.placements.write();
        let placement = placements
            .get_mut(ntp)
            .ok_or_else(|| ClusterError::PartitionNotFound(ntp.clone()))?;

        if placement.status == MoveStatus::Done {
            debug!(%ntp, "finish on a partition that is already done");
            return Ok(());
        }

        placement.current = placement.target.clone();
        placement.status = MoveStatus::Done;
        Ok(())
    }

    /// Controller-reported status for a partition.
    pub fn status(&self, ntp: &Ntp) -> Result<PartitionStatus> {
        let placements = self.placements.read();
        let placement = placements
            .get(ntp)
            .ok_or_else(|| ClusterError::PartitionNotFound(ntp.clone()))?;

        let replicas = match placement.status {
            MoveStatus::InProgress => placement.target.clone(),
            MoveStatus::Done => placement.current.clone(),
        };
        Ok(PartitionStatus {
            replicas,
            status: placement.status,
        })
    }

    /// Full placement record for a partition.
    pub fn placement(&self, ntp: &Ntp) -> Result<PartitionPlacement> {
        self.placements
            .read()
            .get(ntp)
            .cloned()
            .ok_or_else(|| ClusterError::PartitionNotFound(ntp.clone()))
    }

    /// Every tracked partition, sorted.
    pub fn partitions(&self) -> Vec<Ntp> {
        let mut partitions: Vec<Ntp> = self.placements.read().keys().cloned().collect();
        partitions.sort();
        partitions
    }

    /// Whether any partition of the topic is tracked.
    pub fn contains_topic(&self, ns: &str, topic: &str) -> bool {
        self.placements
            .read()
            .keys()
            .any(|ntp| ntp.ns == ns && ntp.topic == topic)
    }

    /// Number of tracked partitions.
    pub fn len(&self) -> usize {
        self.placements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.read().is_empty()
    }

    /// Export every placement record, sorted by partition identity.
    pub fn snapshot(&self) -> PlacementSnapshot {
        let mut placements: Vec<PartitionPlacement> =
            self.placements.read().values().cloned().collect();
        placements.sort_by(|a, b| a.ntp.cmp(&b.ntp));
        PlacementSnapshot { placements }
    }

    /// Replace all placement records with a snapshot.
    pub fn restore(&self, snapshot: PlacementSnapshot) {
        let mut placements = self.placements.write();
        placements.clear();
        for placement in snapshot.placements {
            placements.insert(placement.ntp.clone(), placement);
        }
    }
}
