//! Data-plane error types

use crate::ntp::Ntp;
use thiserror::Error;

/// Errors raised by a node's replica store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("core {core} out of range for node {node_id} with {num_cores} cores")]
    InvalidCore {
        node_id: u32,
        core: u32,
        num_cores: u32,
    },

    #[error("replica {ntp} already hosted on node {node_id}")]
    ReplicaExists { ntp: Ntp, node_id: u32 },

    #[error("replica {ntp} not hosted on node {node_id}")]
    ReplicaNotFound { ntp: Ntp, node_id: u32 },
}

pub type Result<T> = std::result::Result<T, StoreError>;
