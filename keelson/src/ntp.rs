//! Namespaced topic/partition identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace assigned to topics created without an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "log";

/// Identity of a single partition: namespace, topic, and partition index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ntp {
    pub ns: String,
    pub topic: String,
    pub partition: u32,
}

impl Ntp {
    /// Create a fully qualified partition identity.
    pub fn new(ns: impl Into<String>, topic: impl Into<String>, partition: u32) -> Self {
        Self {
            ns: ns.into(),
            topic: topic.into(),
            partition,
        }
    }

    /// Identity in the default namespace.
    pub fn from_topic(topic: impl Into<String>, partition: u32) -> Self {
        Self::new(DEFAULT_NAMESPACE, topic, partition)
    }
}

impl fmt::Display for Ntp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.ns, self.topic, self.partition)
    }
}
