//! motionlog.session_event.v1 input schema
//!
//! Scripted session input used by the CLI and the C ABI. Supports manual
//! entries and recorded sensor sessions, one JSON object per event.

mod adapter;
mod session_event;

pub use adapter::*;
pub use session_event::*;
