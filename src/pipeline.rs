//! Pipeline orchestration
//!
//! This module provides the batch API for motion-log: scripted session
//! events in, a newest-first session log out.

use crate::error::MotionLogError;
use crate::producer::ManualEntry;
use crate::schema::{SessionEvent, SessionEventAdapter};
use crate::session_log::SessionLog;
use crate::types::SessionRecord;

/// Replay NDJSON session events into a fresh log and return it as JSON.
///
/// # Arguments
/// * `ndjson` - One motionlog.session_event.v1 object per line
///
/// # Returns
/// JSON array of session records, newest first
///
/// # Example
/// ```ignore
/// let log_json = replay_to_log_json(
///     r#"{"kind":"manual","name":"Run","duration":"30"}"#.to_string()
/// )?;
/// ```
pub fn replay_to_log_json(ndjson: String) -> Result<String, MotionLogError> {
    let mut processor = MotionLogProcessor::new();
    processor.process_ndjson(&ndjson)?;
    processor.log_json()
}

/// Stateful processor that owns a session log across calls.
///
/// Use this when events arrive in several batches, or when manual entries
/// and recorded sessions are mixed from different sources.
#[derive(Debug, Default)]
pub struct MotionLogProcessor {
    log: SessionLog,
}

impl MotionLogProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one event and return the record it produced
    pub fn process_event(&mut self, event: &SessionEvent) -> Result<&SessionRecord, MotionLogError> {
        let record = SessionEventAdapter::to_record(event)?;
        self.log.append(record);
        self.log
            .latest()
            .ok_or_else(|| MotionLogError::EncodingError("log empty after append".to_string()))
    }

    /// Process a batch of events in order. Stops at the first invalid event;
    /// records already appended stay in the log.
    pub fn process_events(&mut self, events: &[SessionEvent]) -> Result<usize, MotionLogError> {
        for event in events {
            self.process_event(event)?;
        }
        Ok(events.len())
    }

    /// Parse and process NDJSON events
    pub fn process_ndjson(&mut self, ndjson: &str) -> Result<usize, MotionLogError> {
        let events = SessionEventAdapter::parse_ndjson(ndjson)?;
        self.process_events(&events)
    }

    /// Parse and process a JSON array of events
    pub fn process_array(&mut self, json: &str) -> Result<usize, MotionLogError> {
        let events = SessionEventAdapter::parse_array(json)?;
        self.process_events(&events)
    }

    /// Validate and log a manual entry
    pub fn add_manual(&mut self, name: &str, duration: &str) -> Result<&SessionRecord, MotionLogError> {
        ManualEntry::new(name, duration)?.submit(&mut self.log);
        self.log
            .latest()
            .ok_or_else(|| MotionLogError::EncodingError("log empty after append".to_string()))
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut SessionLog {
        &mut self.log
    }

    /// Current log as a JSON array, newest first
    pub fn log_json(&self) -> Result<String, MotionLogError> {
        self.log.to_json()
    }
}
