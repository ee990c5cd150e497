//! End-to-end partition movement tests
//!
//! Each test builds an in-process cluster, performs replica set changes,
//! and verifies both the controller-reported status and the ground truth
//! derived from per-node enumeration.

mod common;

use common::{as_kv_set, make_records, replica_set, setup_cluster, setup_cluster_with, wait_converged, wait_until};
use keelson_cluster::{ClusterError, ControllerConfig, MoveStatus, ReplicaSet};
use std::time::Duration;

#[tokio::test]
async fn test_replace_single_node() -> anyhow::Result<()> {
    let cluster = setup_cluster(4, 2);
    cluster.create_topic("events", 1, 3)?;

    let current = cluster.partition_status("events", 0)?.replicas;
    assert_eq!(current, replica_set(&[(1, 0), (2, 0), (3, 0)]));

    let produced = make_records(100);
    cluster.append("events", 0, produced.clone())?;

    // Replace node 3 with node 4
    let target = replica_set(&[(1, 0), (2, 0), (4, 1)]);
    cluster.set_partition_replicas("events", 0, target.clone())?;

    // The transition to in-progress is synchronous; the spawned move has
    // not run yet, so the reported replicas are the recorded intent.
    let status = cluster.partition_status("events", 0)?;
    assert_eq!(status.status, MoveStatus::InProgress);
    assert_eq!(status.replicas, target);

    assert!(wait_converged(&cluster, "events", 0, &target).await);

    // Ground truth across nodes matches the target exactly
    assert_eq!(cluster.derived_replicas("events", 0), target);

    // Node 3 no longer lists the partition; node 4 does, on core 1
    assert!(cluster.local_partitions(3)?.is_empty());
    let node4 = cluster.local_partitions(4)?;
    assert_eq!(node4.len(), 1);
    assert_eq!(node4[0].core, 1);

    // Data survived the move on every replica
    for node_id in [1, 2, 4] {
        let records = cluster.read_replica(node_id, "events", 0)?;
        assert_eq!(as_kv_set(&records), as_kv_set(&produced));
    }
    Ok(())
}

#[tokio::test]
async fn test_noop_reassignment_is_idempotent() -> anyhow::Result<()> {
    let cluster = setup_cluster(3, 2);
    cluster.create_topic("events", 1, 3)?;

    let current = cluster.partition_status("events", 0)?.replicas;
    let produced = make_records(10);
    cluster.append("events", 0, produced.clone())?;

    // Proposing the current set succeeds immediately, repeatedly
    for _ in 0..3 {
        cluster.set_partition_replicas("events", 0, current.clone())?;
        let status = cluster.partition_status("events", 0)?;
        assert_eq!(status.status, MoveStatus::Done);
        assert_eq!(status.replicas, current);
    }

    // No data movement happened; the placement and data are untouched
    assert_eq!(cluster.derived_replicas("events", 0), current);
    assert_eq!(as_kv_set(&cluster.read("events", 0)?), as_kv_set(&produced));
    Ok(())
}

#[tokio::test]
async fn test_invalid_proposals_rejected_without_state_change() -> anyhow::Result<()> {
    let cluster = setup_cluster(3, 2);
    cluster.create_topic("events", 1, 3)?;
    let current = cluster.partition_status("events", 0)?.replicas;

    // Duplicate node
    let err = cluster
        .set_partition_replicas("events", 0, replica_set(&[(1, 0), (1, 1), (2, 0)]))
        .unwrap_err();
    assert!(matches!(err, ClusterError::Validation(_)));

    // Unknown node
    assert!(cluster
        .set_partition_replicas("events", 0, replica_set(&[(1, 0), (2, 0), (9, 0)]))
        .is_err());

    // Core out of range
    assert!(cluster
        .set_partition_replicas("events", 0, replica_set(&[(1, 0), (2, 0), (3, 2)]))
        .is_err());

    // Replication factor change
    assert!(cluster
        .set_partition_replicas("events", 0, replica_set(&[(1, 0), (2, 0)]))
        .is_err());

    // Nothing moved: still done, same replicas, same ground truth
    let status = cluster.partition_status("events", 0)?;
    assert_eq!(status.status, MoveStatus::Done);
    assert_eq!(status.replicas, current);
    assert_eq!(cluster.derived_replicas("events", 0), current);
    Ok(())
}

#[tokio::test]
async fn test_second_proposal_rejected_while_in_progress() -> anyhow::Result<()> {
    let cluster = setup_cluster(5, 2);
    cluster.create_topic("events", 1, 3)?;
    cluster.append("events", 0, make_records(50))?;

    let accepted = replica_set(&[(1, 0), (2, 0), (4, 0)]);
    cluster.set_partition_replicas("events", 0, accepted.clone())?;

    // The guard holds until the move converges
    let err = cluster
        .set_partition_replicas("events", 0, replica_set(&[(1, 0), (2, 0), (5, 0)]))
        .unwrap_err();
    assert!(matches!(err, ClusterError::MoveInProgress(_)));

    assert!(wait_converged(&cluster, "events", 0, &accepted).await);
    assert_eq!(cluster.derived_replicas("events", 0), accepted);

    // Once done, a follow-up reassignment is admitted again
    let next = replica_set(&[(1, 0), (2, 0), (5, 0)]);
    cluster.set_partition_replicas("events", 0, next.clone())?;
    assert!(wait_converged(&cluster, "events", 0, &next).await);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_proposals_admit_exactly_one() {
    // Throttle transfers so the first admitted move is still in flight
    // while the competing proposal arrives.
    let config = ControllerConfig {
        transfer_chunk_records: 50,
        transfer_rate_limit: Some(2000),
        ..Default::default()
    };
    let cluster = setup_cluster_with(5, 2, config);
    cluster.create_topic("events", 1, 3).unwrap();
    cluster.append("events", 0, make_records(1000)).unwrap();

    let target_a = replica_set(&[(1, 0), (2, 0), (4, 0)]);
    let target_b = replica_set(&[(1, 0), (2, 0), (5, 0)]);

    let a = {
        let cluster = cluster.clone();
        let target = target_a.clone();
        tokio::spawn(async move { cluster.set_partition_replicas("events", 0, target) })
    };
    let b = {
        let cluster = cluster.clone();
        let target = target_b.clone();
        tokio::spawn(async move { cluster.set_partition_replicas("events", 0, target) })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let accepted: Vec<bool> = results.iter().map(|r| r.is_ok()).collect();
    assert_eq!(accepted.iter().filter(|ok| **ok).count(), 1);
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(err, ClusterError::MoveInProgress(_)));
        }
    }

    // The accepted target is the one the partition converges to
    let winner = if accepted[0] { target_a } else { target_b };
    assert!(wait_converged(&cluster, "events", 0, &winner).await);
    assert_eq!(cluster.derived_replicas("events", 0), winner);
}

#[tokio::test]
async fn test_full_replacement_preserves_data() -> anyhow::Result<()> {
    let cluster = setup_cluster(6, 2);
    cluster.create_topic("events", 1, 3)?;
    assert_eq!(
        cluster.partition_status("events", 0)?.replicas.node_ids().len(),
        3
    );

    let produced = make_records(500);
    cluster.append("events", 0, produced.clone())?;

    // Move to a replica set sharing no node with the original, then back
    let rounds = [
        replica_set(&[(4, 0), (5, 1), (6, 0)]),
        replica_set(&[(1, 1), (2, 0), (3, 1)]),
        replica_set(&[(4, 1), (2, 0), (6, 1)]),
    ];

    for target in &rounds {
        cluster.set_partition_replicas("events", 0, target.clone())?;
        assert!(wait_converged(&cluster, "events", 0, target).await);
        assert_eq!(cluster.derived_replicas("events", 0), *target);

        // Every surviving replica holds exactly the produced records
        for assignment in target.iter() {
            let records = cluster.read_replica(assignment.node_id, "events", 0)?;
            assert_eq!(as_kv_set(&records), as_kv_set(&produced));
        }

        // Nodes outside the set host nothing for this partition
        for node_id in 1..=6 {
            if !target.contains_node(node_id) {
                assert!(cluster.local_partitions(node_id)?.is_empty());
            }
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_cross_core_move_converges() -> anyhow::Result<()> {
    let cluster = setup_cluster(3, 4);
    cluster.create_topic("events", 1, 3)?;
    let produced = make_records(50);
    cluster.append("events", 0, produced.clone())?;

    let current = cluster.partition_status("events", 0)?.replicas;
    // Keep all nodes, move node 1's replica to core 3
    let target: ReplicaSet = current
        .iter()
        .map(|a| {
            if a.node_id == 1 {
                keelson_cluster::ReplicaAssignment::new(1, 3)
            } else {
                *a
            }
        })
        .collect();

    cluster.set_partition_replicas("events", 0, target.clone())?;
    assert!(wait_converged(&cluster, "events", 0, &target).await);

    assert_eq!(cluster.derived_replicas("events", 0), target);
    let node1 = cluster.local_partitions(1)?;
    assert_eq!(node1.len(), 1);
    assert_eq!(node1[0].core, 3);
    assert_eq!(
        as_kv_set(&cluster.read_replica(1, "events", 0)?),
        as_kv_set(&produced)
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_destination_leaves_move_in_progress() -> anyhow::Result<()> {
    let cluster = setup_cluster(4, 2);
    cluster.create_topic("events", 1, 3)?;
    cluster.append("events", 0, make_records(50))?;

    cluster.directory().mark_unreachable(4);
    let target = replica_set(&[(1, 0), (2, 0), (4, 0)]);
    cluster.set_partition_replicas("events", 0, target.clone())?;

    // The move never converges; it stays observable as in-progress
    let converged = wait_until(
        || {
            cluster
                .partition_status("events", 0)
                .unwrap()
                .status
                .is_done()
        },
        Duration::from_millis(200),
        Duration::from_millis(10),
    )
    .await;
    assert!(!converged);

    let status = cluster.partition_status("events", 0)?;
    assert_eq!(status.status, MoveStatus::InProgress);
    assert_eq!(status.replicas, target);

    // Ground truth is untouched: node 3 still hosts, node 4 never did
    assert_eq!(cluster.local_partitions(3)?.len(), 1);
    assert!(cluster.local_partitions(4)?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_partitions_move_independently() -> anyhow::Result<()> {
    let cluster = setup_cluster(4, 2);
    cluster.create_topic("events", 3, 2)?;
    for partition in 0..3 {
        cluster.append("events", partition, make_records(50))?;
    }

    // Propose a move for every partition before any of them converges
    let mut targets = Vec::new();
    for partition in 0..3 {
        let current = cluster.partition_status("events", partition)?.replicas;
        let fresh = (1..=4)
            .find(|n| !current.contains_node(*n))
            .expect("a node outside the set");
        let target: ReplicaSet = current
            .iter()
            .enumerate()
            .map(|(i, a)| {
                if i == 0 {
                    keelson_cluster::ReplicaAssignment::new(fresh, 0)
                } else {
                    *a
                }
            })
            .collect();
        cluster.set_partition_replicas("events", partition, target.clone())?;
        targets.push(target);
    }

    for (partition, target) in targets.iter().enumerate() {
        assert!(wait_converged(&cluster, "events", partition as u32, target).await);
        assert_eq!(cluster.derived_replicas("events", partition as u32), *target);
    }
    Ok(())
}

#[tokio::test]
async fn test_topic_metadata_lists_partitions() -> anyhow::Result<()> {
    let cluster = setup_cluster(3, 2);
    cluster.create_topic("alpha", 2, 3)?;
    cluster.create_topic("beta", 4, 2)?;

    let topics = cluster.topics();
    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0].topic, "alpha");
    assert_eq!(topics[0].partitions, 2);
    assert_eq!(topics[1].topic, "beta");
    assert_eq!(topics[1].partitions, 4);
    Ok(())
}
