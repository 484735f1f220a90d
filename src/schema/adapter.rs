//! Adapter for turning motionlog.session_event.v1 input into session records
//!
//! Manual events go through the same validation as typed input. Sensor
//! events are replayed through a real sensor session so recorded input is
//! classified exactly like live input.

use crate::error::MotionLogError;
use crate::producer::{ManualEntry, SensorSession};
use crate::schema::session_event::*;
use crate::sensor::ReplaySensor;
use crate::types::SessionRecord;
use chrono::Utc;

/// Adapter for converting session events to records
pub struct SessionEventAdapter;

impl SessionEventAdapter {
    /// Parse a JSON string containing an array of SessionEvents
    pub fn parse_array(json: &str) -> Result<Vec<SessionEvent>, MotionLogError> {
        let events: Vec<SessionEvent> = serde_json::from_str(json)?;
        Ok(events)
    }

    /// Parse NDJSON (newline-delimited JSON) containing SessionEvents
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<SessionEvent>, MotionLogError> {
        let mut events = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<SessionEvent>(trimmed) {
                Ok(event) => events.push(event),
                Err(e) => {
                    return Err(MotionLogError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(events)
    }

    /// Convert one event into a record
    pub fn to_record(event: &SessionEvent) -> Result<SessionRecord, MotionLogError> {
        event
            .validate()
            .map_err(|e| MotionLogError::InvalidEvent(e.to_string()))?;

        let ended_at = event.timestamp.unwrap_or_else(Utc::now);

        match &event.payload {
            EventPayload::Manual { name, duration } => {
                let entry = ManualEntry::new(name.clone(), duration.clone())?;
                Ok(entry.into_record_at(ended_at))
            }
            EventPayload::Sensor {
                elapsed_ms,
                samples,
            } => {
                let mut sensor = ReplaySensor::with_samples(samples.iter().copied());
                let mut session = SensorSession::new();
                session.resume(&mut sensor);
                sensor.deliver_all();
                Ok(session.finish_with_elapsed(&mut sensor, *elapsed_ms, ended_at))
            }
        }
    }

    /// Validate a batch of events
    pub fn validate_events(events: &[SessionEvent]) -> Vec<ValidationResult> {
        events
            .iter()
            .enumerate()
            .map(|(idx, event)| ValidationResult {
                index: idx,
                event_id: event.event_id.clone(),
                result: event.validate().err(),
            })
            .filter(|r| r.result.is_some())
            .collect()
    }
}

/// Result of event validation
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub event_id: Option<String>,
    pub result: Option<ValidationError>,
}
