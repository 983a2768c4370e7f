#![warn(missing_docs)]

//! Browser-side client for the LiveView debugger.
//!
//! `live-debugger-client` runs inside the inspected page. It correlates DOM
//! elements with the server-side views and components that rendered them
//! (highlight overlays, tooltips, a one-shot pulse), drives a page-wide
//! inspect mode, and keeps the debugger informed of which sessions are
//! mounted, all over a single per-window channel.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────── inspected page ─────────────────────────────────┐
//! │                                                                                  │
//! │  DOM events ──▸ InspectController ──┐                                            │
//! │                                     ├──▸ IntentBus ──▸ Debugger::flush ──┬──▸ HighlightRenderer ──▸ TooltipRenderer
//! │  channel ──▸ Debugger::receive ─────┘                                    ├──▸ PulseAnimator
//! │                                                                          └──▸ outbox ──▸ Transport ──▸ debugger
//! │  MutationObserver ──▸ MutationWatcher ──────────────────────────────────────────▸ Transport
//! └──────────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything above the [`Surface`], [`InspectHost`], [`Transport`] and
//! [`MenuHooks`] seams is target independent and tested natively against
//! the in-memory doubles in `helpers`. The [`web`] module (only on
//! `wasm32-unknown-unknown`) implements the seams with `web-sys` and the
//! Phoenix channel client.
//!
//! # Entry points
//!
//! - **`client`** binary: loaded into the inspected page; reads the config
//!   meta tag, connects, and exposes a handle on `window.liveDebugger` for
//!   the debug menu.
//! - `web::start`: the same bootstrap, callable from JS.

mod error;
pub use error::*;

pub mod config;
pub mod fingerprint;
pub mod geometry;
pub mod highlight;
pub mod inspect;
pub mod intent;
pub mod protocol;
pub mod pulse;
pub mod runtime;
pub mod surface;
pub mod tooltip;
pub mod transport;
pub mod watcher;

pub use config::ClientConfig;
pub use fingerprint::compute_fingerprint;
pub use inspect::{Ancestry, InspectHost};
pub use runtime::{Debugger, MenuHooks};
pub use surface::Surface;
pub use transport::Transport;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub mod web;

#[cfg(any(test, feature = "helpers"))]
pub mod helpers;
