//! In-memory partition log
//!
//! Append-only record sequence backing one hosted replica. Reads return
//! clones of the stored records; `Bytes` payloads make that cheap.

use crate::record::Record;
use parking_lot::RwLock;

/// Append-only record sequence for a single hosted replica.
#[derive(Debug, Default)]
pub struct PartitionLog {
    records: RwLock<Vec<Record>>,
}

impl PartitionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single record.
    pub fn append(&self, record: Record) {
        self.records.write().push(record);
    }

    /// Append a batch of records in order.
    pub fn append_batch(&self, records: Vec<Record>) {
        self.records.write().extend(records);
    }

    /// Read the full record sequence.
    pub fn read_all(&self) -> Vec<Record> {
        self.records.read().clone()
    }

    /// Read up to `max` records starting at `offset`.
    ///
    /// Returns an empty vector once `offset` reaches the end of the log;
    /// transfer loops use that as their termination condition.
    pub fn read_from(&self, offset: usize, max: usize) -> Vec<Record> {
        let records = self.records.read();
        records
            .iter()
            .skip(offset)
            .take(max)
            .cloned()
            .collect()
    }

    /// Number of records in the log.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
