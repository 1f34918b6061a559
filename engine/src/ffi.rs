//! FFI layer for non-Rust presentation layers.
//!
//! This module provides C-compatible functions that drive the inventory and
//! the carousel from another language. All data crosses the boundary as JSON
//! strings.
//!
//! # Memory Management
//!
//! - Strings returned by `vitrina_*` functions are allocated by Rust
//! - Caller must free them with `vitrina_string_free`
//! - Inventory pointers must be freed with `vitrina_inventory_free`
//! - Carousel pointers must be freed with `vitrina_carousel_free`
//!
//! # Timers
//!
//! The carousel uses a [`ManualScheduler`]. After every carousel call the host
//! reads `vitrina_carousel_timer` and keeps exactly one native timer running
//! for the returned token, delivering each firing with
//! `vitrina_carousel_tick`.
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::{
    CarouselConfig, CarouselController, CarouselEvent, Command, FileStore, Inventory,
    ManualScheduler, TimerToken, ViewportClass,
};
use serde::Serialize;
use std::ffi::{c_char, CStr, CString};
use std::ptr;

/// Inventory handle exposed over the C ABI.
pub type FfiInventory = Inventory<FileStore>;

/// Carousel handle exposed over the C ABI.
pub type FfiCarousel = CarouselController<ManualScheduler>;

/// Result wrapper for FFI responses.
#[derive(Serialize)]
#[serde(untagged)]
enum FfiResult<T: Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn err(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

/// Live autoplay timer the host must run.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimerInfo {
    token: TimerToken,
    interval_ms: u64,
}

fn error_json(message: impl Into<String>) -> *mut c_char {
    to_c_string(FfiResult::<()>::err(message).to_json())
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `vitrina_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => {
            // String contained null bytes - return error JSON
            c"{\"error\":\"string contained null bytes\"}".to_owned().into_raw()
        }
    }
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

// ============================================================================
// Inventory
// ============================================================================

/// Open an inventory persisted in `dir`.
///
/// Missing or unreadable data yields an empty inventory.
///
/// # Returns
/// Pointer to the inventory, or null if `dir` is null or not UTF-8.
///
/// # Safety
/// - `dir` must be a valid null-terminated C string or null
/// - Caller must free the returned pointer with `vitrina_inventory_free`
#[no_mangle]
pub unsafe extern "C" fn vitrina_inventory_open(dir: *const c_char) -> *mut FfiInventory {
    let dir = match from_c_string(dir) {
        Some(d) => d,
        None => return ptr::null_mut(),
    };

    let inventory = Inventory::open(FileStore::new(dir));
    Box::into_raw(Box::new(inventory))
}

/// Free an inventory.
///
/// # Safety
/// - `inventory` must be a valid pointer from `vitrina_inventory_open`
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn vitrina_inventory_free(inventory: *mut FfiInventory) {
    if !inventory.is_null() {
        drop(Box::from_raw(inventory));
    }
}

/// Apply a command.
///
/// # Arguments
/// - `command_json`: JSON string of Command
///
/// # Returns
/// JSON string: `{"ok": Transition}` or `{"error": "message"}`
///
/// # Safety
/// - `inventory` must be a valid pointer from `vitrina_inventory_open` or null
/// - `command_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `vitrina_string_free`
#[no_mangle]
pub unsafe extern "C" fn vitrina_inventory_dispatch(
    inventory: *mut FfiInventory,
    command_json: *const c_char,
) -> *mut c_char {
    let inventory = match inventory.as_mut() {
        Some(i) => i,
        None => return error_json("null inventory pointer"),
    };

    let command_str = match from_c_string(command_json) {
        Some(s) => s,
        None => return error_json("invalid command JSON"),
    };

    let command: Command = match serde_json::from_str(&command_str) {
        Ok(c) => c,
        Err(e) => return error_json(format!("parse error: {}", e)),
    };

    match inventory.dispatch(command) {
        Ok(transition) => to_c_string(FfiResult::ok(transition).to_json()),
        Err(e) => error_json(e.to_string()),
    }
}

/// Current inventory state.
///
/// # Returns
/// JSON string: `{"ok": InventoryState}` or `{"error": "message"}`
///
/// # Safety
/// - `inventory` must be a valid pointer from `vitrina_inventory_open` or null
/// - Caller must free the returned string with `vitrina_string_free`
#[no_mangle]
pub unsafe extern "C" fn vitrina_inventory_state(inventory: *const FfiInventory) -> *mut c_char {
    match inventory.as_ref() {
        Some(i) => to_c_string(FfiResult::ok(i.state()).to_json()),
        None => error_json("null inventory pointer"),
    }
}

// ============================================================================
// Carousel
// ============================================================================

/// Create a carousel.
///
/// # Arguments
/// - `config_json`: JSON string of CarouselConfig; null uses the defaults
/// - `viewport_width`: viewport width in pixels
///
/// # Returns
/// Pointer to the carousel, or null if the configuration does not parse.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string or null
/// - Caller must free the returned pointer with `vitrina_carousel_free`
#[no_mangle]
pub unsafe extern "C" fn vitrina_carousel_new(
    config_json: *const c_char,
    viewport_width: u32,
) -> *mut FfiCarousel {
    let config = if config_json.is_null() {
        CarouselConfig::default()
    } else {
        let config_str = match from_c_string(config_json) {
            Some(s) => s,
            None => return ptr::null_mut(),
        };
        match serde_json::from_str(&config_str) {
            Ok(c) => c,
            Err(_) => return ptr::null_mut(),
        }
    };

    let carousel = CarouselController::new(
        config,
        ViewportClass::from_width(viewport_width),
        ManualScheduler::new(),
    );
    Box::into_raw(Box::new(carousel))
}

/// Free a carousel, cancelling its timer.
///
/// # Safety
/// - `carousel` must be a valid pointer from `vitrina_carousel_new`
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn vitrina_carousel_free(carousel: *mut FfiCarousel) {
    if !carousel.is_null() {
        drop(Box::from_raw(carousel));
    }
}

/// Apply a carousel event.
///
/// # Arguments
/// - `event_json`: JSON string of CarouselEvent
///
/// # Returns
/// JSON string: `{"ok": CarouselState}` or `{"error": "message"}`
///
/// # Safety
/// - `carousel` must be a valid pointer from `vitrina_carousel_new` or null
/// - `event_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `vitrina_string_free`
#[no_mangle]
pub unsafe extern "C" fn vitrina_carousel_event(
    carousel: *mut FfiCarousel,
    event_json: *const c_char,
) -> *mut c_char {
    let carousel = match carousel.as_mut() {
        Some(c) => c,
        None => return error_json("null carousel pointer"),
    };

    let event_str = match from_c_string(event_json) {
        Some(s) => s,
        None => return error_json("invalid event JSON"),
    };

    let event: CarouselEvent = match serde_json::from_str(&event_str) {
        Ok(e) => e,
        Err(e) => return error_json(format!("parse error: {}", e)),
    };

    carousel.handle(event);
    to_c_string(FfiResult::ok(carousel.state()).to_json())
}

/// Current carousel state.
///
/// # Returns
/// JSON string: `{"ok": CarouselState}` or `{"error": "message"}`
///
/// # Safety
/// - `carousel` must be a valid pointer from `vitrina_carousel_new` or null
/// - Caller must free the returned string with `vitrina_string_free`
#[no_mangle]
pub unsafe extern "C" fn vitrina_carousel_state(carousel: *const FfiCarousel) -> *mut c_char {
    match carousel.as_ref() {
        Some(c) => to_c_string(FfiResult::ok(c.state()).to_json()),
        None => error_json("null carousel pointer"),
    }
}

/// The autoplay timer the host should be running.
///
/// # Returns
/// JSON string: `{"ok": {"token": n, "intervalMs": ms}}`, `{"ok": null}` when
/// no timer should run, or `{"error": "message"}`
///
/// # Safety
/// - `carousel` must be a valid pointer from `vitrina_carousel_new` or null
/// - Caller must free the returned string with `vitrina_string_free`
#[no_mangle]
pub unsafe extern "C" fn vitrina_carousel_timer(carousel: *const FfiCarousel) -> *mut c_char {
    let carousel = match carousel.as_ref() {
        Some(c) => c,
        None => return error_json("null carousel pointer"),
    };

    let info = carousel.timer_token().and_then(|token| {
        carousel
            .scheduler()
            .interval_of(token)
            .map(|interval| TimerInfo {
                token,
                interval_ms: interval.as_millis() as u64,
            })
    });
    to_c_string(FfiResult::ok(info).to_json())
}

/// Deliver a timer firing.
///
/// # Returns
/// 1 if the window moved, 0 if the token was stale, -1 on a null pointer.
///
/// # Safety
/// - `carousel` must be a valid pointer from `vitrina_carousel_new` or null
#[no_mangle]
pub unsafe extern "C" fn vitrina_carousel_tick(carousel: *mut FfiCarousel, token: u64) -> i32 {
    match carousel.as_mut() {
        Some(c) => c.on_timer(TimerToken::from_raw(token)) as i32,
        None => -1,
    }
}

// ============================================================================
// Utility
// ============================================================================

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `vitrina_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn vitrina_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the engine version.
///
/// # Returns
/// Static string pointer (do not free)
#[no_mangle]
pub extern "C" fn vitrina_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

/// Get the persisted storage format version.
#[no_mangle]
pub extern "C" fn vitrina_storage_format_version() -> u32 {
    crate::STORAGE_FORMAT_VERSION
}
