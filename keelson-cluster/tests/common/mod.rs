//! Shared helpers for the movement integration tests
#![allow(dead_code)] // not every test binary uses every helper

use keelson::Record;
use keelson_cluster::{Cluster, ControllerConfig, ReplicaAssignment, ReplicaSet};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a cluster with brokers `1..=nodes`, each with `cores` cores.
pub fn setup_cluster(nodes: u32, cores: u32) -> Arc<Cluster> {
    setup_cluster_with(nodes, cores, ControllerConfig::default())
}

/// Build a cluster with custom controller tuning.
pub fn setup_cluster_with(nodes: u32, cores: u32, config: ControllerConfig) -> Arc<Cluster> {
    init_tracing();
    let cluster = Arc::new(Cluster::new(config));
    for node_id in 1..=nodes {
        cluster.add_broker(node_id, cores).expect("register broker");
    }
    cluster
}

/// Poll `check` with backoff until it returns true or the timeout elapses.
///
/// Convergence waiting lives here, at the caller boundary: the controller
/// only exposes pollable status, never blocking calls.
pub async fn wait_until<F>(mut check: F, timeout: Duration, backoff: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(backoff).await;
    }
}

/// Wait until the controller reports the partition done with the expected
/// replica set.
pub async fn wait_converged(
    cluster: &Cluster,
    topic: &str,
    partition: u32,
    target: &ReplicaSet,
) -> bool {
    wait_until(
        || {
            let status = cluster
                .partition_status(topic, partition)
                .expect("partition status");
            status.status.is_done() && status.replicas == *target
        },
        Duration::from_secs(10),
        Duration::from_millis(5),
    )
    .await
}

/// Build a replica set from `(node_id, core)` pairs.
pub fn replica_set(pairs: &[(u32, u32)]) -> ReplicaSet {
    pairs
        .iter()
        .map(|&(node_id, core)| ReplicaAssignment::new(node_id, core))
        .collect()
}

/// Keyed records `key-0..key-n` with matching values.
pub fn make_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record::new(format!("key-{i}"), format!("value-{i}")))
        .collect()
}

/// Records as a set of key/value byte pairs, mirroring how consumers
/// verify produced data.
pub fn as_kv_set(records: &[Record]) -> BTreeSet<(Option<Vec<u8>>, Vec<u8>)> {
    records
        .iter()
        .map(|r| (r.key.as_ref().map(|k| k.to_vec()), r.value.to_vec()))
        .collect()
}
