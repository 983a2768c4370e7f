//! [`Transport`] over the Phoenix channel client.
//!
//! The page loads `phoenix.js`, which exposes `window.Phoenix.Socket`. One
//! socket and one `client:<window id>` channel are opened per window.

use async_trait::async_trait;
use futures::channel::oneshot;
use js_sys::{Object, Reflect};
use live_debugger_common::SharedCell;
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use crate::LiveDebuggerError;
use crate::config::ClientConfig;
use crate::protocol::Outbound;
use crate::transport::Transport;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Phoenix, js_name = "Socket")]
    type PhoenixSocket;

    #[wasm_bindgen(constructor, js_namespace = Phoenix, js_class = "Socket", catch)]
    fn new(endpoint: &str, options: &JsValue) -> Result<PhoenixSocket, JsValue>;

    #[wasm_bindgen(method)]
    fn connect(this: &PhoenixSocket);

    #[wasm_bindgen(method)]
    fn disconnect(this: &PhoenixSocket);

    #[wasm_bindgen(method)]
    fn channel(this: &PhoenixSocket, topic: &str, params: &JsValue) -> PhoenixTopic;

    type PhoenixTopic;

    #[wasm_bindgen(method)]
    fn join(this: &PhoenixTopic) -> PhoenixPush;

    #[wasm_bindgen(method)]
    fn push(this: &PhoenixTopic, event: &str, payload: &JsValue) -> PhoenixPush;

    #[wasm_bindgen(method)]
    fn on(this: &PhoenixTopic, event: &str, callback: &js_sys::Function) -> f64;

    type PhoenixPush;

    #[wasm_bindgen(method)]
    fn receive(this: &PhoenixPush, status: &str, callback: &js_sys::Function) -> PhoenixPush;
}

/// Replies a Phoenix push can resolve with.
const REPLY_STATUSES: [&str; 3] = ["ok", "error", "timeout"];

/// The per-window channel to the debugger.
pub struct PhoenixChannel {
    socket: PhoenixSocket,
    topic: PhoenixTopic,
}

impl std::fmt::Debug for PhoenixChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhoenixChannel").finish_non_exhaustive()
    }
}

impl PhoenixChannel {
    /// Open the socket and join `client:<window_id>`, advertising the
    /// session fingerprint the page was loaded with.
    pub async fn connect(
        config: &ClientConfig,
        window_id: &str,
        fingerprint: &str,
    ) -> Result<Self, LiveDebuggerError> {
        let endpoint = config.socket_url()?;
        let socket = PhoenixSocket::new(endpoint.as_str(), &Object::new())
            .map_err(|error| LiveDebuggerError::Transport(super::describe(&error)))?;
        socket.connect();

        let params = Object::new();
        Reflect::set(&params, &"fingerprint".into(), &fingerprint.into())?;
        let topic = socket.channel(&format!("client:{window_id}"), &params);

        settle(&topic.join()).await.map_err(|error| {
            LiveDebuggerError::Transport(format!("join of client:{window_id} failed: {error}"))
        })?;

        tracing::info!("Joined client:{window_id}");

        Ok(Self { socket, topic })
    }

    /// Call `handler` with the payload of every `event` the debugger sends.
    pub fn subscribe<F>(&self, event: &'static str, handler: F)
    where
        F: Fn(Value) + 'static,
    {
        let callback = Closure::wrap(Box::new(move |payload: JsValue| {
            match from_js(&payload) {
                Ok(payload) => handler(payload),
                Err(error) => tracing::warn!("Unreadable '{event}' payload: {error}"),
            }
        }) as Box<dyn FnMut(JsValue)>);

        self.topic.on(event, callback.as_ref().unchecked_ref());

        // Subscriptions live as long as the page
        callback.forget();
    }

    /// Close the socket.
    pub fn close(&self) {
        self.socket.disconnect();
    }
}

#[async_trait(?Send)]
impl Transport for PhoenixChannel {
    async fn push(&self, event: Outbound) -> Result<(), LiveDebuggerError> {
        let name = event.event_name();
        let payload = to_js(&event.payload())?;

        settle(&self.topic.push(name, &payload))
            .await
            .map_err(|error| LiveDebuggerError::Transport(format!("'{name}': {error}")))
    }
}

/// Wait for the first reply to `push`. `ok` resolves; `error` and
/// `timeout` reject with a description of the reply.
async fn settle(push: &PhoenixPush) -> Result<(), String> {
    let (sender, receiver) = oneshot::channel::<Result<(), String>>();
    let sender = Rc::new(SharedCell::new(Some(sender)));

    for status in REPLY_STATUSES {
        let sender = sender.clone();
        let callback = Closure::once_into_js(move |reply: JsValue| {
            let outcome = match status {
                "ok" => Ok(()),
                _ => Err(format!("{status}: {}", super::describe(&reply))),
            };
            if let Some(sender) = sender.take() {
                let _ = sender.send(outcome);
            }
        });
        push.receive(status, callback.unchecked_ref());
    }

    receiver
        .await
        .map_err(|_| "channel dropped the reply".to_string())?
}

fn to_js(value: &Value) -> Result<JsValue, LiveDebuggerError> {
    let text = serde_json::to_string(value)?;
    js_sys::JSON::parse(&text).map_err(LiveDebuggerError::from)
}

fn from_js(value: &JsValue) -> Result<Value, LiveDebuggerError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }

    let text = js_sys::JSON::stringify(value)?
        .as_string()
        .ok_or_else(|| LiveDebuggerError::Protocol("payload is not JSON".into()))?;

    Ok(serde_json::from_str(&text)?)
}
