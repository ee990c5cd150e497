//! Initial replica placement for new topics
//!
//! Spreads replicas round-robin across brokers by node id, balancing core
//! load within each node as assignments accumulate.

use super::{ReplicaAssignment, ReplicaSet};
use crate::directory::Broker;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during initial placement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("not enough brokers: need {needed}, have {available}")]
    InsufficientBrokers { needed: usize, available: usize },
}

/// Choose replica sets for every partition of a new topic.
///
/// Brokers without cores are ineligible. Each partition's replicas land on
/// `replication_factor` distinct nodes; within a node the least-loaded core
/// is picked.
pub fn assign_initial(
    brokers: &[Broker],
    partitions: u32,
    replication_factor: usize,
) -> Result<Vec<ReplicaSet>, PlacementError> {
    let mut eligible: Vec<Broker> = brokers.iter().copied().filter(|b| b.num_cores > 0).collect();
    eligible.sort_by_key(|b| b.node_id);

    if replication_factor == 0 || eligible.len() < replication_factor {
        return Err(PlacementError::InsufficientBrokers {
            needed: replication_factor.max(1),
            available: eligible.len(),
        });
    }

    let mut core_loads: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut sets = Vec::with_capacity(partitions as usize);

    for partition in 0..partitions as usize {
        let mut assignments = Vec::with_capacity(replication_factor);
        for replica in 0..replication_factor {
            let broker = eligible[(partition + replica) % eligible.len()];
            let loads = core_loads
                .entry(broker.node_id)
                .or_insert_with(|| vec![0; broker.num_cores as usize]);

            let core = loads
                .iter()
                .enumerate()
                .min_by_key(|(_, load)| **load)
                .map(|(core, _)| core as u32)
                .unwrap_or(0);
            loads[core as usize] += 1;

            assignments.push(ReplicaAssignment::new(broker.node_id, core));
        }
        sets.push(ReplicaSet::new(assignments));
    }

    Ok(sets)
}
