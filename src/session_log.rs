//! In-memory session log
//!
//! An append-only, newest-first list of session records. The log is owned by
//! the composing application and lent to producers through [`SessionSink`].
//! Nothing here is persisted.

use crate::error::MotionLogError;
use crate::types::SessionRecord;
use serde::{Deserialize, Serialize};
use std::collections::vec_deque;
use std::collections::VecDeque;

/// Anything a producer can hand finished records to
pub trait SessionSink {
    fn append(&mut self, record: SessionRecord);
}

/// Newest-first list of session records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionLog {
    records: VecDeque<SessionRecord>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a record
    pub fn append(&mut self, record: SessionRecord) {
        tracing::info!(
            name = %record.name,
            activity_type = record.activity_type.as_str(),
            total = self.records.len() + 1,
            "session logged"
        );
        self.records.push_front(record);
    }

    /// Records in current order, newest first.
    ///
    /// The iterator is `Clone`, so a view can walk it more than once.
    pub fn all(&self) -> vec_deque::Iter<'_, SessionRecord> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&SessionRecord> {
        self.records.get(index)
    }

    /// Most recently appended record
    pub fn latest(&self) -> Option<&SessionRecord> {
        self.records.front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Snapshot of the records as a JSON array, newest first
    pub fn to_json(&self) -> Result<String, MotionLogError> {
        serde_json::to_string(&self.records)
            .map_err(|e| MotionLogError::EncodingError(e.to_string()))
    }
}

impl SessionSink for SessionLog {
    fn append(&mut self, record: SessionRecord) {
        SessionLog::append(self, record);
    }
}

impl<'a> IntoIterator for &'a SessionLog {
    type Item = &'a SessionRecord;
    type IntoIter = vec_deque::Iter<'a, SessionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.all()
    }
}
