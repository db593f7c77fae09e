//! FFI bindings for Attrition Insight
//!
//! This module provides C-compatible functions so a dashboard written in
//! another language can request report JSON. All functions use C strings
//! (null-terminated) and return allocated memory that must be freed by the
//! caller using `attrition_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;

use crate::filter::FilterSelection;
use crate::pipeline::{report_from_path, Dataset};

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

// ============================================================================
// Report API
// ============================================================================

/// Load a CSV file and return the full dashboard report as JSON.
///
/// `filter_json` is an object of dropdown strings such as
/// `{"department": "Sales", "overtime": "All"}`; NULL means no filter.
///
/// # Safety
/// - `csv_path` must be a valid null-terminated C string.
/// - `filter_json` must be NULL or a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `attrition_free_string`.
/// - Returns NULL on error; call `attrition_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn attrition_report_json(
    csv_path: *const c_char,
    filter_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let path = match cstr_to_string(csv_path) {
        Some(s) => s,
        None => {
            set_last_error("Invalid csv_path string pointer");
            return ptr::null_mut();
        }
    };

    let selection = if filter_json.is_null() {
        FilterSelection::default()
    } else {
        let json = match cstr_to_string(filter_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid filter_json string pointer");
                return ptr::null_mut();
            }
        };
        match FilterSelection::from_json(&json) {
            Ok(selection) => selection,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match report_from_path(Path::new(&path), &selection) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Load a CSV file and return the filter dropdown options as JSON.
///
/// # Safety
/// - `csv_path` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `attrition_free_string`.
/// - Returns NULL on error; call `attrition_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn attrition_filter_options_json(csv_path: *const c_char) -> *mut c_char {
    clear_last_error();

    let path = match cstr_to_string(csv_path) {
        Some(s) => s,
        None => {
            set_last_error("Invalid csv_path string pointer");
            return ptr::null_mut();
        }
    };

    let result = Dataset::load(Path::new(&path))
        .and_then(|dataset| Ok(serde_json::to_string(&dataset.filter_options())?));

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Attrition Insight functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an `attrition_*` function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn attrition_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next `attrition_*` call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn attrition_last_error() -> *const c_char {
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
pub unsafe extern "C" fn attrition_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
