use web_sys::{Document, Window};

use crate::LiveDebuggerError;
use crate::config::{CONFIG_META_NAME, ClientConfig};

/// Session storage key holding this window's id.
pub const WINDOW_ID_KEY: &str = "lvdbg-window-id";

/// Read the client configuration from the page's meta tag.
pub fn read_config(document: &Document) -> Result<ClientConfig, LiveDebuggerError> {
    let meta = document
        .query_selector(&format!("meta[name=\"{CONFIG_META_NAME}\"]"))?
        .ok_or(LiveDebuggerError::MissingConfig)?;

    ClientConfig::from_attributes(|name| meta.get_attribute(name))
}

/// This window's id: stable across reloads of the same tab, distinct
/// between tabs. Falls back to a fresh id when session storage is
/// unavailable.
pub fn window_id(window: &Window) -> String {
    let storage = window.session_storage().ok().flatten();

    if let Some(existing) = storage
        .as_ref()
        .and_then(|storage| storage.get_item(WINDOW_ID_KEY).ok().flatten())
        .filter(|id| !id.is_empty())
    {
        return existing;
    }

    let id = fresh_id();

    match storage {
        Some(storage) => {
            if let Err(error) = storage.set_item(WINDOW_ID_KEY, &id) {
                tracing::warn!("Unable to persist window id: {}", super::describe(&error));
            }
        }
        None => tracing::warn!("Session storage unavailable; window id will not survive reloads"),
    }

    id
}

/// `Ulid::new` reads the system clock, which panics on
/// `wasm32-unknown-unknown`; take the time from `Date.now()` instead.
fn fresh_id() -> String {
    let mut random = [0u8; 16];
    if let Err(error) = getrandom::getrandom(&mut random) {
        tracing::warn!("No entropy for window id: {error}");
    }

    ulid::Ulid::from_parts(js_sys::Date::now() as u64, u128::from_le_bytes(random)).to_string()
}
