//! Controller configuration

use serde::{Deserialize, Serialize};

/// Tuning for the reassignment engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerConfig {
    /// Maximum replica transfers running at once for a single move.
    #[serde(default = "default_max_concurrent_transfers")]
    pub max_concurrent_transfers: usize,

    /// Records copied per transfer chunk.
    #[serde(default = "default_transfer_chunk_records")]
    pub transfer_chunk_records: usize,

    /// Optional transfer throttle in records per second. Unset means
    /// unthrottled.
    #[serde(default)]
    pub transfer_rate_limit: Option<u64>,
}

fn default_max_concurrent_transfers() -> usize {
    4
}

fn default_transfer_chunk_records() -> usize {
    512
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_transfers: default_max_concurrent_transfers(),
            transfer_chunk_records: default_transfer_chunk_records(),
            transfer_rate_limit: None,
        }
    }
}
