//! Keelson cluster controller - partition placement and replica movement
//!
//! This crate decides where partition replicas live and moves them there.
//! A reassignment is admitted synchronously (structural validation plus an
//! atomic placement transition), then converges in the background while
//! callers poll partition status.
//!
//! # Architecture
//!
//! - **Directory**: registered brokers and their reachability, consumed as
//!   read-only snapshots by validation and replacement selection
//! - **Placement**: replica-set types, structural validation, initial
//!   assignment, and replacement-plan generation
//! - **Tracker**: per-partition placement records and the move state
//!   machine, including the one-move-per-partition guard
//! - **Engine**: admission and asynchronous data movement - copy to added
//!   nodes, rebind cross-core moves, delete removed replicas, converge
//! - **Reporter**: controller-reported status plus per-node ground truth
//! - **Cluster**: in-process facade wiring brokers, stores, and the
//!   controller together
//!
//! # Key operations
//!
//! - Broker registration and topic creation with implicit initial placement
//! - Replica-set proposals: validated, guarded, executed asynchronously
//! - Status queries: controller view and ground-truth enumeration per node
//! - Data-plane append/read against the replicas a partition currently has

pub mod cluster;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod nodes;
pub mod placement;
pub mod report;
pub mod tracker;

pub use cluster::{Cluster, TopicMetadata};
pub use config::ControllerConfig;
pub use directory::{Broker, BrokerDirectory};
pub use engine::ReassignmentEngine;
pub use error::{ClusterError, Result};
pub use nodes::NodeRegistry;
pub use placement::{
    assign_initial, choose_replacement, validate, CoreMove, MoveStatus, PartitionPlacement,
    PartitionStatus, PlacementError, ReplacementPlan, ReplicaAssignment, ReplicaDiff, ReplicaSet,
    ValidationError,
};
pub use report::StatusReporter;
pub use tracker::{MoveDecision, MovePlan, MovementTracker, PlacementSnapshot};
