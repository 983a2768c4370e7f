//! `web-sys` implementations of the client seams, plus the page bootstrap.
//!
//! Only compiled for `wasm32-unknown-unknown`.

mod boot;
mod channel;
mod host;
mod meta;
mod surface;

pub use boot::*;
pub use channel::*;
pub use host::*;
pub use meta::*;
pub use surface::*;

use wasm_bindgen::JsValue;

use crate::LiveDebuggerError;

impl From<JsValue> for LiveDebuggerError {
    fn from(value: JsValue) -> Self {
        LiveDebuggerError::Platform(describe(&value))
    }
}

impl From<LiveDebuggerError> for JsValue {
    fn from(error: LiveDebuggerError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

/// Best-effort text for a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }

    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|text| text.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}
