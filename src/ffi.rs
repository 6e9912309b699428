//! FFI bindings for Wellness Insight
//!
//! This module provides C-compatible functions for calling the engine from a
//! dashboard front end. All functions use C strings (null-terminated) and
//! return allocated memory that must be freed by the caller using
//! `insight_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::ComputeError;
use crate::pipeline::{snapshot_to_report, InsightProcessor};
use crate::screener::{parse_responses_json, score_responses, screener_risk_level};
use crate::types::ScreenerKind;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
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

/// Return the result as a C string, or NULL with the error recorded
fn result_to_cstr(result: Result<String, ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze a user snapshot JSON and return report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `insight_free_string`.
/// - Returns NULL on error; call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_snapshot_to_report(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    result_to_cstr(snapshot_to_report(json_str))
}

/// Score questionnaire responses.
///
/// `responses_json` is either an array of answers in question order or an
/// object keyed by question index. Returns `{"kind", "score", "risk_level"}`.
///
/// # Safety
/// - `kind` and `responses_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `insight_free_string`.
/// - Returns NULL on error; call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_score_screener(
    kind: *const c_char,
    responses_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let kind_str = match cstr_to_string(kind) {
        Some(s) => s,
        None => {
            set_last_error("Invalid screener kind pointer");
            return ptr::null_mut();
        }
    };

    let responses_str = match cstr_to_string(responses_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    result_to_cstr(score_screener_json(&kind_str, &responses_str))
}

fn score_screener_json(kind: &str, responses_json: &str) -> Result<String, ComputeError> {
    let kind: ScreenerKind = kind.parse().map_err(ComputeError::InvalidScreenerResponse)?;
    let responses = parse_responses_json(responses_json)?;
    let score = score_responses(kind, &responses)?;

    let body = serde_json::json!({
        "kind": kind,
        "score": score,
        "risk_level": screener_risk_level(score),
    });
    serde_json::to_string(&body).map_err(|e| ComputeError::EncodingError(e.to_string()))
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to an InsightProcessor
pub struct InsightProcessorHandle {
    processor: InsightProcessor,
}

/// Create a new InsightProcessor.
///
/// # Safety
/// - `config_json` may be NULL for the default configuration, otherwise it
///   must be a valid null-terminated C string holding an engine config.
/// - Returns a pointer to a newly allocated InsightProcessor.
/// - Must be freed with `insight_processor_free`.
/// - Returns NULL on error; call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_processor_new(
    config_json: *const c_char,
) -> *mut InsightProcessorHandle {
    clear_last_error();

    let processor = if config_json.is_null() {
        InsightProcessor::new()
    } else {
        let json_str = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match InsightProcessor::from_config_json(&json_str) {
            Ok(p) => p,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    Box::into_raw(Box::new(InsightProcessorHandle { processor }))
}

/// Free an InsightProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `insight_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn insight_processor_free(processor: *mut InsightProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Analyze a user snapshot JSON with a configured processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `insight_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `insight_free_string`.
/// - Returns NULL on error; call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_processor_analyze(
    processor: *const InsightProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    result_to_cstr(handle.processor.analyze_json(&json_str))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Insight functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an Insight function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn insight_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Insight function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn insight_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the engine version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn insight_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_snapshot_json() -> CString {
        CString::new(
            r#"{
            "owner_id": "user-1",
            "reference_time": "2024-01-15T12:00:00Z",
            "samples": [
                {"id": "s1", "owner_id": "user-1", "metric": "sleep", "value": 6.5, "recorded_at": "2024-01-14T07:00:00Z", "source": "wearable"},
                {"id": "m1", "owner_id": "user-1", "metric": "mood", "value": 5.0, "recorded_at": "2024-01-14T21:30:00Z", "source": "manual"}
            ]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_snapshot_to_report() {
        let json = sample_snapshot_json();

        unsafe {
            let result = insight_snapshot_to_report(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("\"owner_id\":\"user-1\""));
            assert!(result_str.contains("engine_version"));

            insight_free_string(result);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        let config = CString::new(r#"{"utc_offset": "+05:30", "chart_window_days": 7}"#).unwrap();
        let json = sample_snapshot_json();

        unsafe {
            let processor = insight_processor_new(config.as_ptr());
            assert!(!processor.is_null());

            let result = insight_processor_analyze(processor, json.as_ptr());
            assert!(!result.is_null());

            // 21:30 UTC on Jan 14 lands on Jan 15 at +05:30
            let report: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            let mood = report["series"]
                .as_array()
                .unwrap()
                .iter()
                .find(|s| s["metric"] == "mood")
                .unwrap();
            let points = mood["points"].as_array().unwrap();
            assert_eq!(points.len(), 8);
            assert_eq!(points[7]["day"], "2024-01-15");
            assert_eq!(points[7]["sample_count"], 1);

            insight_free_string(result);
            insight_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_processor_default_config() {
        unsafe {
            let processor = insight_processor_new(ptr::null());
            assert!(!processor.is_null());
            insight_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_processor_invalid_config() {
        let config = CString::new(r#"{"utc_offset": "Mars/Olympus"}"#).unwrap();
        unsafe {
            let processor = insight_processor_new(config.as_ptr());
            assert!(processor.is_null());
            assert!(!insight_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_score_screener() {
        let kind = CString::new("gad7").unwrap();
        let responses = CString::new("[3, 3, 3, 2, 2, 2, 1]").unwrap();

        unsafe {
            let result = insight_score_screener(kind.as_ptr(), responses.as_ptr());
            assert!(!result.is_null());

            let body: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(body["score"], 16);
            assert_eq!(body["risk_level"], "high");

            insight_free_string(result);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let invalid_json = CString::new("not json").unwrap();

        unsafe {
            let result = insight_snapshot_to_report(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = insight_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            // A successful call clears the slot
            let ok = insight_snapshot_to_report(sample_snapshot_json().as_ptr());
            assert!(insight_last_error().is_null());
            insight_free_string(ok);
        }
    }

    #[test]
    fn test_ffi_null_pointers() {
        unsafe {
            assert!(insight_snapshot_to_report(ptr::null()).is_null());
            assert!(insight_processor_analyze(ptr::null(), ptr::null()).is_null());
            insight_free_string(ptr::null_mut());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = insight_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, crate::ENGINE_VERSION);
        }
    }
}
