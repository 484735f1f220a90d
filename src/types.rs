//! Core types for the motion-log pipeline
//!
//! This module defines the data structures that flow through each stage:
//! raw samples, instant readings, session intensities, and the session
//! records that end up in the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display format used for record timestamps in list rows (dd/MM/yy HH:mm)
pub const RECORD_DATE_FORMAT: &str = "%d/%m/%y %H:%M";

/// One tri-axial accelerometer reading (m/s²)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the acceleration vector
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl From<[f64; 3]> for Sample {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Per-sample movement tier used for live feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityTier {
    NoMovement,
    LightMovement,
    IntenseMovement,
}

impl IntensityTier {
    pub fn label(&self) -> &'static str {
        match self {
            IntensityTier::NoMovement => "No movement",
            IntensityTier::LightMovement => "Light movement",
            IntensityTier::IntenseMovement => "Intense movement!",
        }
    }

    /// Stable numeric code (0, 1, 2) for hosts that pick a background color
    pub fn code(&self) -> i32 {
        match self {
            IntensityTier::NoMovement => 0,
            IntensityTier::LightMovement => 1,
            IntensityTier::IntenseMovement => 2,
        }
    }
}

/// Advisory classification of a single net motion value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstantReading {
    /// Net motion value (m/s², gravity removed)
    pub value: f64,
    pub tier: IntensityTier,
}

impl InstantReading {
    pub fn label(&self) -> &'static str {
        self.tier.label()
    }
}

/// Session-level intensity derived from the mean net motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionIntensity {
    Resting,
    ModerateActivity,
    IntenseActivity,
}

impl SessionIntensity {
    pub fn label(&self) -> &'static str {
        match self {
            SessionIntensity::Resting => "Resting",
            SessionIntensity::ModerateActivity => "Moderate Activity",
            SessionIntensity::IntenseActivity => "Intense Activity",
        }
    }
}

/// Which producer created a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    Manual,
    Sensor,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Manual => "Manual",
            ActivityType::Sensor => "Sensor",
        }
    }
}

/// A finished activity session as shown in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Stable key for list views
    pub id: Uuid,
    /// Activity name
    pub name: String,
    /// Human-readable duration, always ending in " min"
    pub duration: String,
    /// When the record was created (UTC)
    pub timestamp: DateTime<Utc>,
    /// Producer tag
    pub activity_type: ActivityType,
}

impl SessionRecord {
    pub fn new(
        name: impl Into<String>,
        duration: impl Into<String>,
        timestamp: DateTime<Utc>,
        activity_type: ActivityType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            duration: duration.into(),
            timestamp,
            activity_type,
        }
    }

    /// Timestamp rendered for a list row
    pub fn formatted_date(&self) -> String {
        self.timestamp.format(RECORD_DATE_FORMAT).to_string()
    }
}
