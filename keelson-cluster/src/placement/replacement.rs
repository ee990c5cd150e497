//! Replacement selection for replica sets
//!
//! Pure plan generator, kept separate from the controller: given a current
//! replica set and a broker snapshot, remove some assignments and refill
//! with legal node/core picks. Randomness is injected through the `pick`
//! callback, so property-based drivers fully control and replay the
//! choices.

use super::{ReplicaAssignment, ReplicaSet};
use crate::directory::Broker;

/// A replacement produced by [`choose_replacement`].
#[derive(Debug, Clone)]
pub struct ReplacementPlan {
    /// Assignments dropped from the current set.
    pub removed: Vec<ReplicaAssignment>,
    /// Assignments chosen to refill the set.
    pub added: Vec<ReplicaAssignment>,
    /// The resulting target set, same replication factor as the input.
    pub target: ReplicaSet,
}

/// Remove `num_replacements` assignments from `current` and refill the set
/// with valid picks that never duplicate a node.
///
/// `num_replacements` is clamped to the replication factor; zero removals
/// produce a no-op plan. `pick(n)` must return an index in `0..n`. Brokers
/// without cores are skipped; the caller must supply at least
/// replication-factor many distinct usable nodes.
pub fn choose_replacement(
    current: &ReplicaSet,
    brokers: &[Broker],
    num_replacements: usize,
    pick: &mut dyn FnMut(usize) -> usize,
) -> ReplacementPlan {
    let replication_factor = current.len();
    let num_replacements = num_replacements.min(replication_factor);

    let mut kept: Vec<ReplicaAssignment> = current.iter().copied().collect();
    let mut removed = Vec::with_capacity(num_replacements);
    for _ in 0..num_replacements {
        let index = pick(kept.len());
        removed.push(kept.remove(index));
    }

    let mut added = Vec::with_capacity(num_replacements);
    while kept.len() < replication_factor {
        let eligible: Vec<Broker> = brokers
            .iter()
            .copied()
            .filter(|b| b.num_cores > 0 && !kept.iter().any(|a| a.node_id == b.node_id))
            .collect();
        debug_assert!(
            !eligible.is_empty(),
            "brokers must supply at least replication-factor distinct nodes"
        );

        let broker = eligible[pick(eligible.len())];
        let core = pick(broker.num_cores as usize) as u32;
        let assignment = ReplicaAssignment::new(broker.node_id, core);
        kept.push(assignment);
        added.push(assignment);
    }

    ReplacementPlan {
        removed,
        added,
        target: ReplicaSet::new(kept),
    }
}
