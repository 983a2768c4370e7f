//! Page script entry point for the debugger client.
//!
//! Compiled to WASM and loaded into the inspected page after `phoenix.js`.
//! It reads the `live-debugger-config` meta tag, joins the per-window
//! channel and publishes a handle on `window.liveDebugger` that the debug
//! menu uses to toggle inspect mode.

fn main() {
    // Nothing to do off the web: the client only makes sense inside a page.
    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();

        wasm_bindgen_futures::spawn_local(async {
            // Failures are logged by `start` and leave the page untouched.
            let _ = live_debugger_client::web::start().await;
        });
    }
}
