//! The channel to the debugger, seen from the client.
//!
//! The client never speaks the socket protocol itself. A [`Transport`] is
//! anything that can push an [`Outbound`] event and report whether the
//! debugger acknowledged it. Inbound events arrive through whatever
//! subscription mechanism the implementation has and are handed to
//! [`Debugger::receive`](crate::Debugger::receive).
//!
//! On the web the implementation wraps the pre-built Phoenix channel
//! client (see `web::channel`); tests use an in-memory recorder.

use std::sync::Arc;

use async_trait::async_trait;
use live_debugger_common::ConditionalSync;

use crate::error::LiveDebuggerError;
use crate::protocol::Outbound;

/// Push events to the debugger.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Transport: ConditionalSync {
    /// Push `event` and resolve once the debugger replies. An `error`
    /// reply, a timeout reported by the channel, or a closed channel all
    /// surface as [`LiveDebuggerError::Transport`].
    async fn push(&self, event: Outbound) -> Result<(), LiveDebuggerError>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn push(&self, event: Outbound) -> Result<(), LiveDebuggerError> {
        (**self).push(event).await
    }
}
