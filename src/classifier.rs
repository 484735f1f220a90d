//! Session classification
//!
//! Reduces a finished session's net motion buffer to a mean, maps it to a
//! session intensity, and formats the elapsed time. These thresholds are
//! coarser than the live ones in `sampler` and the two sets stay separate.

use crate::types::{ActivityType, SessionIntensity, SessionRecord};
use chrono::{DateTime, Utc};

/// Below this mean a session is resting
pub const MODERATE_ACTIVITY_THRESHOLD: f64 = 0.5;

/// At or above this mean a session is intense
pub const INTENSE_ACTIVITY_THRESHOLD: f64 = 3.0;

/// Suffix appended to every duration string
pub const DURATION_SUFFIX: &str = " min";

/// Name prefix for sensor-derived records
pub const SENSOR_SESSION_PREFIX: &str = "Live session: ";

/// Arithmetic mean of the buffer, 0.0 when empty
pub fn mean(buffer: &[f64]) -> f64 {
    if buffer.is_empty() {
        return 0.0;
    }
    buffer.iter().sum::<f64>() / buffer.len() as f64
}

/// Map a session mean to its intensity
pub fn classify_session(mean: f64) -> SessionIntensity {
    if mean < MODERATE_ACTIVITY_THRESHOLD {
        SessionIntensity::Resting
    } else if mean < INTENSE_ACTIVITY_THRESHOLD {
        SessionIntensity::ModerateActivity
    } else {
        SessionIntensity::IntenseActivity
    }
}

/// Format elapsed milliseconds as "MM:SS min"
///
/// Sub-second remainders are truncated. Negative input (a clock that went
/// backwards) formats as zero.
pub fn format_duration(elapsed_millis: i64) -> String {
    let total_seconds = elapsed_millis.max(0) / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}{}", minutes, seconds, DURATION_SUFFIX)
}

/// Summary of a classified session before it becomes a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub mean: f64,
    pub intensity: SessionIntensity,
    pub samples: usize,
}

/// Compute the mean and intensity of a buffer
pub fn summarize(buffer: &[f64]) -> SessionSummary {
    let mean = mean(buffer);
    SessionSummary {
        mean,
        intensity: classify_session(mean),
        samples: buffer.len(),
    }
}

/// Produce the sensor record for a finished session, stamped now
pub fn finalize(buffer: &[f64], elapsed_millis: i64) -> SessionRecord {
    finalize_at(buffer, elapsed_millis, Utc::now())
}

/// Produce the sensor record for a finished session with an explicit timestamp
pub fn finalize_at(buffer: &[f64], elapsed_millis: i64, timestamp: DateTime<Utc>) -> SessionRecord {
    let summary = summarize(buffer);
    let duration = format_duration(elapsed_millis);

    tracing::info!(
        mean = summary.mean,
        samples = summary.samples,
        intensity = summary.intensity.label(),
        duration = %duration,
        "session finalized"
    );

    SessionRecord::new(
        format!("{}{}", SENSOR_SESSION_PREFIX, summary.intensity.label()),
        duration,
        timestamp,
        ActivityType::Sensor,
    )
}
