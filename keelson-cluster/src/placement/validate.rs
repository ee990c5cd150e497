//! Structural validation of proposed replica sets
//!
//! Validation is purely structural: it checks the proposed set against the
//! broker snapshot and the current replication factor, and mutates nothing.
//! A target identical to the current set is valid; the no-op path is
//! handled downstream, not rejected here.

use super::ReplicaSet;
use crate::directory::Broker;
use std::collections::BTreeSet;
use thiserror::Error;

/// Rejection reasons for a proposed replica set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("node {node_id} appears more than once in the proposed replica set")]
    DuplicateNode { node_id: u32 },

    #[error("node {node_id} is not a registered broker")]
    UnknownNode { node_id: u32 },

    #[error("core {core} out of range for node {node_id} with {num_cores} cores")]
    InvalidCore {
        node_id: u32,
        core: u32,
        num_cores: u32,
    },

    #[error("proposed replica set has {proposed} replicas, current has {current}")]
    ReplicationFactorMismatch { current: usize, proposed: usize },
}

/// Check a proposed replica set for structural legality.
pub fn validate(
    current: &ReplicaSet,
    target: &ReplicaSet,
    brokers: &[Broker],
) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for assignment in target.iter() {
        if !seen.insert(assignment.node_id) {
            return Err(ValidationError::DuplicateNode {
                node_id: assignment.node_id,
            });
        }

        let broker = brokers
            .iter()
            .find(|b| b.node_id == assignment.node_id)
            .ok_or(ValidationError::UnknownNode {
                node_id: assignment.node_id,
            })?;

        if assignment.core >= broker.num_cores {
            return Err(ValidationError::InvalidCore {
                node_id: assignment.node_id,
                core: assignment.core,
                num_cores: broker.num_cores,
            });
        }
    }

    if target.len() != current.len() {
        return Err(ValidationError::ReplicationFactorMismatch {
            current: current.len(),
            proposed: target.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::ReplicaAssignment;

    fn brokers() -> Vec<Broker> {
        vec![
            Broker { node_id: 1, num_cores: 2 },
            Broker { node_id: 2, num_cores: 2 },
            Broker { node_id: 3, num_cores: 4 },
        ]
    }

    fn set(assignments: &[(u32, u32)]) -> ReplicaSet {
        assignments
            .iter()
            .map(|&(node_id, core)| ReplicaAssignment::new(node_id, core))
            .collect()
    }

    #[test]
    fn test_valid_target() {
        let current = set(&[(1, 0), (2, 0)]);
        let target = set(&[(1, 1), (3, 3)]);
        assert!(validate(&current, &target, &brokers()).is_ok());
    }

    #[test]
    fn test_noop_target_is_valid() {
        let current = set(&[(1, 0), (2, 0)]);
        assert!(validate(&current, &current.clone(), &brokers()).is_ok());
    }

    #[test]
    fn test_duplicate_node() {
        let current = set(&[(1, 0), (2, 0)]);
        let target = set(&[(1, 0), (1, 1)]);
        assert_eq!(
            validate(&current, &target, &brokers()),
            Err(ValidationError::DuplicateNode { node_id: 1 })
        );
    }

    #[test]
    fn test_unknown_node() {
        let current = set(&[(1, 0), (2, 0)]);
        let target = set(&[(1, 0), (9, 0)]);
        assert_eq!(
            validate(&current, &target, &brokers()),
            Err(ValidationError::UnknownNode { node_id: 9 })
        );
    }

    #[test]
    fn test_invalid_core() {
        let current = set(&[(1, 0), (2, 0)]);
        let target = set(&[(1, 0), (2, 2)]);
        assert_eq!(
            validate(&current, &target, &brokers()),
            Err(ValidationError::InvalidCore {
                node_id: 2,
                core: 2,
                num_cores: 2
            })
        );
    }

    #[test]
    fn test_replication_factor_mismatch() {
        let current = set(&[(1, 0), (2, 0)]);
        let target = set(&[(1, 0), (2, 1), (3, 0)]);
        assert_eq!(
            validate(&current, &target, &brokers()),
            Err(ValidationError::ReplicationFactorMismatch {
                current: 2,
                proposed: 3
            })
        );
    }
}
