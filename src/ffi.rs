//! FFI bindings for motion-log
//!
//! This module provides C-compatible functions so a mobile host can push
//! accelerometer samples from its own sensor callback and read the session
//! log back as JSON. All strings are null-terminated; returned strings are
//! allocated here and must be released with `motionlog_free_string`.
//!
//! Handles are not thread-safe. Call them from the thread that created them.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::Utc;

use crate::pipeline::{replay_to_log_json, MotionLogProcessor};
use crate::producer::SensorSession;
use crate::types::Sample;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Replay NDJSON session events and return the resulting log as a JSON array.
///
/// # Safety
/// - `ndjson` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `motionlog_free_string`.
/// - Returns NULL on error; call `motionlog_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn motionlog_replay_to_log_json(ndjson: *const c_char) -> *mut c_char {
    clear_last_error();

    let input = match cstr_to_string(ndjson) {
        Some(s) => s,
        None => {
            set_last_error("Invalid NDJSON string pointer");
            return ptr::null_mut();
        }
    };

    match replay_to_log_json(input) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Session Log API
// ============================================================================

/// Opaque handle to a session log
pub struct SessionLogHandle {
    processor: MotionLogProcessor,
}

/// Create an empty session log.
///
/// # Safety
/// - Must be freed with `motionlog_log_free`.
#[no_mangle]
pub unsafe extern "C" fn motionlog_log_new() -> *mut SessionLogHandle {
    clear_last_error();
    Box::into_raw(Box::new(SessionLogHandle {
        processor: MotionLogProcessor::new(),
    }))
}

/// Free a session log.
///
/// # Safety
/// - `log` must be a valid pointer returned by `motionlog_log_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn motionlog_log_free(log: *mut SessionLogHandle) {
    if !log.is_null() {
        drop(Box::from_raw(log));
    }
}

/// Validate and prepend a manual entry.
///
/// # Safety
/// - `log` must be a valid pointer returned by `motionlog_log_new`.
/// - `name` and `duration` must be valid null-terminated C strings.
/// - Returns 0 on success, -1 on error (blank field or bad pointer).
#[no_mangle]
pub unsafe extern "C" fn motionlog_log_add_manual(
    log: *mut SessionLogHandle,
    name: *const c_char,
    duration: *const c_char,
) -> i32 {
    clear_last_error();

    if log.is_null() {
        set_last_error("Null log pointer");
        return -1;
    }

    let handle = &mut *log;

    let name_str = match cstr_to_string(name) {
        Some(s) => s,
        None => {
            set_last_error("Invalid name string pointer");
            return -1;
        }
    };

    let duration_str = match cstr_to_string(duration) {
        Some(s) => s,
        None => {
            set_last_error("Invalid duration string pointer");
            return -1;
        }
    };

    match handle.processor.add_manual(&name_str, &duration_str) {
        Ok(_) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Number of records in the log, or -1 for a null pointer.
///
/// # Safety
/// - `log` must be a valid pointer returned by `motionlog_log_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn motionlog_log_len(log: *const SessionLogHandle) -> i64 {
    if log.is_null() {
        return -1;
    }
    (*log).processor.log().len() as i64
}

/// Return the log as a JSON array, newest first.
///
/// # Safety
/// - `log` must be a valid pointer returned by `motionlog_log_new`.
/// - Returns a newly allocated string that must be freed with `motionlog_free_string`.
/// - Returns NULL on error; call `motionlog_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn motionlog_log_to_json(log: *const SessionLogHandle) -> *mut c_char {
    clear_last_error();

    if log.is_null() {
        set_last_error("Null log pointer");
        return ptr::null_mut();
    }

    match (*log).processor.log_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Sensor Session API
// ============================================================================

/// Opaque handle to a live sensor session
pub struct SensorSessionHandle {
    session: SensorSession,
}

/// Start a sensor session now.
///
/// # Safety
/// - Must be finished with `motionlog_session_finish` or freed with
///   `motionlog_session_free`.
#[no_mangle]
pub unsafe extern "C" fn motionlog_session_new() -> *mut SensorSessionHandle {
    clear_last_error();
    Box::into_raw(Box::new(SensorSessionHandle {
        session: SensorSession::new(),
    }))
}

/// Push one accelerometer sample (m/s²) from the host's sensor callback.
///
/// # Safety
/// - `session` must be a valid pointer returned by `motionlog_session_new`.
/// - Returns the live tier code (0 no movement, 1 light, 2 intense), or -1
///   for a null pointer.
#[no_mangle]
pub unsafe extern "C" fn motionlog_session_push_sample(
    session: *mut SensorSessionHandle,
    x: f64,
    y: f64,
    z: f64,
) -> i32 {
    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }

    let handle = &mut *session;
    handle.session.push_sample(Sample::new(x, y, z)).tier.code()
}

/// End a session, prepend its record to `log`, and return the record as JSON.
///
/// # Safety
/// - `session` must be a valid pointer returned by `motionlog_session_new`.
///   It is consumed: the pointer is invalid after this call, even on error.
/// - `log` must be a valid pointer returned by `motionlog_log_new`, or NULL
///   to only classify.
/// - Returns a newly allocated string that must be freed with `motionlog_free_string`.
/// - Returns NULL on error; call `motionlog_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn motionlog_session_finish(
    session: *mut SensorSessionHandle,
    log: *mut SessionLogHandle,
) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }

    let handle = *Box::from_raw(session);
    let record = handle.session.into_record_at(Utc::now());

    let json = match serde_json::to_string(&record) {
        Ok(json) => json,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    if !log.is_null() {
        (*log).processor.log_mut().append(record);
    }

    string_to_cstr(&json)
}

/// Discard a session without producing a record.
///
/// # Safety
/// - `session` must be a valid pointer returned by `motionlog_session_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn motionlog_session_free(session: *mut SensorSessionHandle) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by motion-log functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a motion-log function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn motionlog_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next motion-log call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn motionlog_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn motionlog_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        motionlog_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_log_lifecycle() {
        unsafe {
            let log = motionlog_log_new();
            assert!(!log.is_null());

            let name = CString::new("Tennis").unwrap();
            let duration = CString::new("60").unwrap();
            assert_eq!(motionlog_log_add_manual(log, name.as_ptr(), duration.as_ptr()), 0);
            assert_eq!(motionlog_log_len(log), 1);

            let json = take_string(motionlog_log_to_json(log));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value[0]["name"], "Tennis");
            assert_eq!(value[0]["duration"], "60 min");

            motionlog_log_free(log);
        }
    }

    #[test]
    fn test_ffi_session_into_log() {
        unsafe {
            let log = motionlog_log_new();
            let session = motionlog_session_new();

            assert_eq!(motionlog_session_push_sample(session, 0.0, 0.0, 9.8), 0);
            assert_eq!(motionlog_session_push_sample(session, 0.0, 0.0, 12.8), 1);
            assert_eq!(motionlog_session_push_sample(session, 0.0, 0.0, 20.0), 2);

            let record = take_string(motionlog_session_finish(session, log));
            let value: serde_json::Value = serde_json::from_str(&record).unwrap();
            // mean of 0.0, 3.0, 10.2
            assert_eq!(value["name"], "Live session: Intense Activity");
            assert_eq!(value["activity_type"], "Sensor");
            assert_eq!(motionlog_log_len(log), 1);

            motionlog_log_free(log);
        }
    }

    #[test]
    fn test_ffi_blank_manual_sets_error() {
        unsafe {
            let log = motionlog_log_new();
            let name = CString::new("  ").unwrap();
            let duration = CString::new("10").unwrap();

            assert_eq!(motionlog_log_add_manual(log, name.as_ptr(), duration.as_ptr()), -1);
            let error = motionlog_last_error();
            assert!(!error.is_null());
            assert!(CStr::from_ptr(error).to_str().unwrap().contains("name"));
            assert_eq!(motionlog_log_len(log), 0);

            motionlog_log_free(log);
        }
    }

    #[test]
    fn test_ffi_replay() {
        unsafe {
            let input = CString::new(r#"{"kind": "manual", "name": "Hike", "duration": "90"}"#).unwrap();
            let json = take_string(motionlog_replay_to_log_json(input.as_ptr()));
            assert!(json.contains("Hike"));

            let invalid = CString::new("not json").unwrap();
            assert!(motionlog_replay_to_log_json(invalid.as_ptr()).is_null());
            assert!(!motionlog_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_replay_max_elapsed() {
        unsafe {
            let input = CString::new(
                r#"{"kind": "sensor", "elapsed_ms": 9223372036854775807, "samples": []}"#,
            )
            .unwrap();
            let json = take_string(motionlog_replay_to_log_json(input.as_ptr()));
            assert!(json.contains("Live session: Resting"));
        }
    }

    #[test]
    fn test_ffi_null_pointers() {
        unsafe {
            assert_eq!(motionlog_log_len(ptr::null()), -1);
            assert_eq!(motionlog_session_push_sample(ptr::null_mut(), 0.0, 0.0, 0.0), -1);
            assert!(motionlog_session_finish(ptr::null_mut(), ptr::null_mut()).is_null());
            motionlog_session_free(ptr::null_mut());
            motionlog_log_free(ptr::null_mut());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = motionlog_version();
            assert!(!version.is_null());
            assert!(!CStr::from_ptr(version).to_str().unwrap().is_empty());
        }
    }
}
