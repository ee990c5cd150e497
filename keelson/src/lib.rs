//! Keelson data plane - records, partition logs, and per-node replica stores
//!
//! This crate holds the storage side of a keelson cluster. Each broker owns
//! a [`NodeStore`] that binds partition identities ([`Ntp`]) to a core index
//! and an append-only [`PartitionLog`]. The control plane (keelson-cluster)
//! moves replicas between stores; everything here is local to one node and
//! knows nothing about placement decisions.
//!
//! The store enumeration API ([`NodeStore::local_partitions`]) is the ground
//! truth the controller's bookkeeping is verified against.

pub mod error;
pub mod log;
pub mod ntp;
pub mod record;
pub mod store;

pub use error::StoreError;
pub use log::PartitionLog;
pub use ntp::{Ntp, DEFAULT_NAMESPACE};
pub use record::Record;
pub use store::{LocalPartition, NodeStore};
