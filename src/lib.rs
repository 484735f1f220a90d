//! motion-log - Activity session log with accelerometer intensity classification
//!
//! Sessions are either typed in by hand or timed from an accelerometer
//! stream. Sensor sessions run through a small deterministic pipeline:
//! raw samples → net motion (gravity removed) → session mean → intensity label.
//!
//! ## Modules
//!
//! - **Sampling**: `sampler` buffers net motion and gives live feedback tiers
//! - **Classification**: `classifier` summarizes a finished session
//! - **Log**: `session_log` keeps records newest first, in memory only
//! - **Producers**: `producer` holds manual entry and the sensor session lifecycle

pub mod classifier;
pub mod error;
pub mod pipeline;
pub mod producer;
pub mod sampler;
pub mod schema;
pub mod sensor;
pub mod session_log;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use classifier::{classify_session, finalize, format_duration, mean};
pub use error::MotionLogError;
pub use pipeline::{replay_to_log_json, MotionLogProcessor};
pub use producer::{ManualEntry, SensorSession};
pub use sampler::{classify_instant, net_motion, MotionSampler, GRAVITY};
pub use sensor::{DeliveryRate, NoSensor, ReplaySensor, SensorService, SubscriptionHandle};
pub use session_log::{SessionLog, SessionSink};
pub use types::{
    ActivityType, InstantReading, IntensityTier, Sample, SessionIntensity, SessionRecord,
};

// Schema exports
pub use schema::{SessionEvent, SessionEventAdapter, SCHEMA_VERSION};

/// motion-log version
pub const MOTION_LOG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "motion-log";
