#![warn(missing_docs)]

//! Light weight helpers shared by the debugger client crates. The client
//! runs on the browser main thread when compiled to `wasm32-unknown-unknown`
//! and inside a multi-threaded test runtime natively; the types here let the
//! same code be written once for both.

mod sync;
pub use sync::*;
