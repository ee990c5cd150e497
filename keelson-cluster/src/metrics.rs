//! Controller metrics
//!
//! Counters and histograms for reassignment activity, recorded through the
//! `metrics` facade:
//! - Admitted and no-op proposals
//! - Completed moves and their duration
//! - Transfer failures by error type
//! - Records copied between replicas

use std::time::Duration;

/// Record an admitted reassignment.
pub fn record_move_accepted() {
    metrics::counter!("keelson_moves_total", "outcome" => "accepted").increment(1);
}

/// Record a proposal whose target matched the current replica set.
pub fn record_move_noop() {
    metrics::counter!("keelson_moves_total", "outcome" => "noop").increment(1);
}

/// Record a converged reassignment and its duration.
pub fn record_move_completed(duration: Duration) {
    metrics::counter!("keelson_moves_completed_total").increment(1);
    metrics::histogram!("keelson_move_duration_seconds").record(duration.as_secs_f64());
}

/// Record a failed replica transfer.
pub fn record_transfer_failure(error_type: &str) {
    metrics::counter!(
        "keelson_transfer_failures_total",
        "error_type" => error_type.to_string(),
    )
    .increment(1);
}

/// Record records copied to a new replica.
pub fn record_records_transferred(count: u64) {
    metrics::counter!("keelson_records_transferred_total").increment(count);
}
