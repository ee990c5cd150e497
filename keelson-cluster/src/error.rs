//! Control-plane error types
//!
//! Validation failures and the in-flight guard reject synchronously and
//! mutate nothing. Transfer failures never surface through `propose`; they
//! leave the partition in progress and are observed through status queries.

use crate::placement::{PlacementError, ValidationError};
use keelson::{Ntp, StoreError};
use thiserror::Error;

/// Errors produced by the reassignment controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("reassignment already in progress for {0}")]
    MoveInProgress(Ntp),

    #[error("partition {0} does not exist")]
    PartitionNotFound(Ntp),

    #[error("partition {0} already exists")]
    PartitionExists(Ntp),

    #[error("topic {0} already exists")]
    TopicExists(String),

    #[error("broker {0} is already registered")]
    BrokerExists(u32),

    #[error("node {0} is unavailable")]
    NodeUnavailable(u32),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ClusterError {
    /// Get the error type as a string for metrics labeling.
    pub fn error_type(&self) -> &'static str {
        match self {
            ClusterError::Validation(_) => "validation",
            ClusterError::Placement(_) => "placement",
            ClusterError::MoveInProgress(_) => "move_in_progress",
            ClusterError::PartitionNotFound(_) => "partition_not_found",
            ClusterError::PartitionExists(_) => "partition_exists",
            ClusterError::TopicExists(_) => "topic_exists",
            ClusterError::BrokerExists(_) => "broker_exists",
            ClusterError::NodeUnavailable(_) => "node_unavailable",
            ClusterError::Storage(_) => "storage",
            ClusterError::Internal(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;
