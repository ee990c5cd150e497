//! Log records
//!
//! Records are opaque key/value byte pairs. The data-plane contract for
//! replica movement is exact byte equality: every record appended before a
//! move is readable after it, with no loss and no duplication.

use bytes::Bytes;

/// A single key/value record stored in a partition log.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Record {
    pub key: Option<Bytes>,
    pub value: Bytes,
}

impl Record {
    /// Create a keyed record.
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }

    /// Create a record without a key.
    pub fn value_only(value: impl Into<Bytes>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }
}
