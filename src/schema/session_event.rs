//! motionlog.session_event.v1 schema definition
//!
//! Scripted session input for hosts that do not drive the sampler live:
//! - Manual entries (name + typed duration)
//! - Recorded sensor sessions (raw samples + elapsed time)

use crate::types::Sample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version
pub const SCHEMA_VERSION: &str = "motionlog.session_event.v1";

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// Event payload, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// A session typed in by the user
    Manual {
        name: String,
        /// Free-text duration in minutes, " min" is appended on logging
        duration: String,
    },
    /// A recorded accelerometer session
    Sensor {
        /// Wall-clock length of the session (milliseconds)
        elapsed_ms: i64,
        /// Raw samples in arrival order
        #[serde(default)]
        samples: Vec<Sample>,
    },
}

/// One entry of scripted session input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// Schema version identifier
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Caller-supplied identifier, echoed in validation reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// When the session ended. Defaults to processing time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl SessionEvent {
    /// Create a manual entry event
    pub fn manual(name: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            event_id: Some(uuid::Uuid::new_v4().to_string()),
            timestamp: None,
            payload: EventPayload::Manual {
                name: name.into(),
                duration: duration.into(),
            },
        }
    }

    /// Create a recorded sensor session event
    pub fn sensor(elapsed_ms: i64, samples: Vec<Sample>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            event_id: Some(uuid::Uuid::new_v4().to_string()),
            timestamp: None,
            payload: EventPayload::Sensor {
                elapsed_ms,
                samples,
            },
        }
    }

    /// Pin the session end time
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Validate the event schema
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ValidationError::InvalidSchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        match &self.payload {
            EventPayload::Manual { name, duration } => {
                if name.trim().is_empty() {
                    return Err(ValidationError::BlankField("name"));
                }
                if duration.trim().is_empty() {
                    return Err(ValidationError::BlankField("duration"));
                }
                Ok(())
            }
            EventPayload::Sensor {
                elapsed_ms,
                samples,
            } => {
                if *elapsed_ms < 0 {
                    return Err(ValidationError::NegativeElapsed(*elapsed_ms));
                }
                let bad = samples
                    .iter()
                    .position(|s| !(s.x.is_finite() && s.y.is_finite() && s.z.is_finite()));
                match bad {
                    Some(index) => Err(ValidationError::NonFiniteSample { index }),
                    None => Ok(()),
                }
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.payload {
            EventPayload::Manual { .. } => "manual",
            EventPayload::Sensor { .. } => "sensor",
        }
    }
}

/// Validation errors for session events
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Manual entry field must not be blank: {0}")]
    BlankField(&'static str),

    #[error("Sensor session has negative elapsed time: {0} ms")]
    NegativeElapsed(i64),

    #[error("Sample {index} is not a finite vector")]
    NonFiniteSample { index: usize },
}
