//! Partition placement types
//!
//! A partition's placement is a replica set: one `(node, core)` assignment
//! per replica, with at most one replica per node. Ordering inside a set
//! carries no meaning; equality is over the set of assignments.
//!
//! Reassignment diffs are keyed by node. A node entering the set is an
//! addition (data transfer required), a node leaving is a removal, and a
//! node kept on a different core is a core move (a local rebind with no
//! cross-node transfer).

mod assign;
mod replacement;
mod validate;

pub use assign::{assign_initial, PlacementError};
pub use replacement::{choose_replacement, ReplacementPlan};
pub use validate::{validate, ValidationError};

use keelson::Ntp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Placement of one replica: a node and a core within it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ReplicaAssignment {
    pub node_id: u32,
    pub core: u32,
}

impl ReplicaAssignment {
    pub fn new(node_id: u32, core: u32) -> Self {
        Self { node_id, core }
    }
}

/// The full replica set of a partition.
///
/// Equality compares `(node_id, core)` pairs as a set, so two sets with
/// the same assignments in different order are equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicaSet {
    assignments: Vec<ReplicaAssignment>,
}

impl ReplicaSet {
    pub fn new(assignments: Vec<ReplicaAssignment>) -> Self {
        Self { assignments }
    }

    /// Replication factor of this set.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplicaAssignment> {
        self.assignments.iter()
    }

    pub fn as_slice(&self) -> &[ReplicaAssignment] {
        &self.assignments
    }

    /// Node ids present in the set.
    pub fn node_ids(&self) -> BTreeSet<u32> {
        self.assignments.iter().map(|a| a.node_id).collect()
    }

    /// Whether a node hosts a replica in this set.
    pub fn contains_node(&self, node_id: u32) -> bool {
        self.assignments.iter().any(|a| a.node_id == node_id)
    }

    /// Assignment for a node, if present.
    pub fn find(&self, node_id: u32) -> Option<ReplicaAssignment> {
        self.assignments.iter().copied().find(|a| a.node_id == node_id)
    }

    /// Assignments sorted by `(node_id, core)` for stable output.
    pub fn to_sorted(&self) -> Vec<ReplicaAssignment> {
        let mut sorted = self.assignments.clone();
        sorted.sort();
        sorted
    }
}

impl PartialEq for ReplicaSet {
    fn eq(&self, other: &Self) -> bool {
        let left: BTreeSet<ReplicaAssignment> = self.assignments.iter().copied().collect();
        let right: BTreeSet<ReplicaAssignment> = other.assignments.iter().copied().collect();
        left == right
    }
}

impl Eq for ReplicaSet {}

impl From<Vec<ReplicaAssignment>> for ReplicaSet {
    fn from(assignments: Vec<ReplicaAssignment>) -> Self {
        Self::new(assignments)
    }
}

impl FromIterator<ReplicaAssignment> for ReplicaSet {
    fn from_iter<I: IntoIterator<Item = ReplicaAssignment>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// One node's replica moving between cores without changing nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreMove {
    pub node_id: u32,
    pub from_core: u32,
    pub to_core: u32,
}

/// Difference between a current and a target replica set, keyed by node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaDiff {
    /// Assignments on nodes absent from the current set.
    pub added: Vec<ReplicaAssignment>,
    /// Assignments on nodes absent from the target set.
    pub removed: Vec<ReplicaAssignment>,
    /// Assignments identical in both sets.
    pub unchanged: Vec<ReplicaAssignment>,
    /// Nodes kept in both sets but bound to a different core.
    pub core_moves: Vec<CoreMove>,
}

impl ReplicaDiff {
    /// Compute the node-keyed difference from `current` to `target`.
    pub fn between(current: &ReplicaSet, target: &ReplicaSet) -> Self {
        let mut diff = ReplicaDiff::default();

        for assignment in target.iter() {
            match current.find(assignment.node_id) {
                Some(existing) if existing.core == assignment.core => {
                    diff.unchanged.push(*assignment);
                }
                Some(existing) => diff.core_moves.push(CoreMove {
                    node_id: assignment.node_id,
                    from_core: existing.core,
                    to_core: assignment.core,
                }),
                None => diff.added.push(*assignment),
            }
        }

        for assignment in current.iter() {
            if !target.contains_node(assignment.node_id) {
                diff.removed.push(*assignment);
            }
        }

        diff
    }

    /// Whether the target is identical to the current set.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.core_moves.is_empty()
    }

    /// Whether the move needs cross-node data transfer.
    pub fn requires_transfer(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Whether a partition's replica set matches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    /// A reassignment was admitted and has not yet converged.
    InProgress,
    /// Current placement matches the target.
    Done,
}

impl MoveStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, MoveStatus::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveStatus::InProgress => "in_progress",
            MoveStatus::Done => "done",
        }
    }
}

/// Controller record for one partition's placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionPlacement {
    pub ntp: Ntp,
    pub current: ReplicaSet,
    pub target: ReplicaSet,
    pub status: MoveStatus,
    /// Bumped each time a reassignment is admitted.
    pub epoch: u64,
}

impl PartitionPlacement {
    /// Placement created at topic creation: current equals target.
    pub fn new(ntp: Ntp, replicas: ReplicaSet) -> Self {
        Self {
            ntp,
            current: replicas.clone(),
            target: replicas,
            status: MoveStatus::Done,
            epoch: 0,
        }
    }
}

/// Result of a partition status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionStatus {
    pub replicas: ReplicaSet,
    pub status: MoveStatus,
}
