//! Events exchanged with the debugger over the per-window channel.
//!
//! The channel carries `(event name, JSON payload)` pairs. [`Inbound`]
//! covers what the debugger sends to the page, [`Outbound`] what the page
//! sends back. Both are plain serde types so they can be exercised without
//! a socket.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::error::LiveDebuggerError;
use crate::intent::{COMPONENT_ATTRIBUTE, HighlightDescriptor, IdentityKind, Selector};

/// Wire shape of `highlight` and `pulse` payloads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighlightPayload {
    /// Attribute to match
    #[serde(default)]
    pub attr: String,
    /// Attribute value to match
    #[serde(default)]
    pub val: String,
    /// View or component; inferred from `attr` when absent or unrecognized
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<IdentityKind>,
    /// Module name for the tooltip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Id label for the tooltip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_key: Option<String>,
    /// Id value for the tooltip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_value: Option<String>,
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<Option<IdentityKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match serde_json::from_value::<IdentityKind>(value.clone()) {
        Ok(kind) => Ok(Some(kind)),
        Err(_) => {
            tracing::debug!("Unrecognized identity kind {value}; inferring from the attribute");
            Ok(None)
        }
    }
}

impl From<HighlightPayload> for HighlightDescriptor {
    fn from(payload: HighlightPayload) -> Self {
        if !payload.attr.is_empty() && !Selector::is_valid_attribute(&payload.attr) {
            tracing::debug!(
                "Ignoring highlight for invalid attribute name '{}'",
                payload.attr
            );
            return HighlightDescriptor::new(Selector::new("", ""), IdentityKind::View);
        }

        let kind = payload.kind.unwrap_or(if payload.attr == COMPONENT_ATTRIBUTE {
            IdentityKind::Component
        } else {
            IdentityKind::View
        });

        HighlightDescriptor {
            selector: Selector::new(payload.attr, payload.val),
            kind,
            module: payload.module,
            id_key: payload.id_key,
            id_value: payload.id_value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InspectModePayload {
    inspect_mode: bool,
}

/// An event sent by the debugger to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Highlight (or toggle off) an element
    Highlight(HighlightDescriptor),
    /// Flash an element
    Pulse(HighlightDescriptor),
    /// The debugger lost its session and wants the page's primary one
    FindSuccessor,
    /// Inspect mode was toggled from the debugger side
    InspectModeChanged {
        /// Whether inspect mode should now be on
        inspect_mode: bool,
    },
    /// Show or hide the floating debug button
    ToggleDebugButton,
}

impl Inbound {
    /// Every inbound event name the client subscribes to.
    pub const EVENTS: [&'static str; 5] = [
        "highlight",
        "pulse",
        "find-successor",
        "inspect-mode-changed",
        "toggle-debug-button",
    ];

    /// Decode an inbound event from its name and payload.
    pub fn decode(event: &str, payload: Value) -> Result<Self, LiveDebuggerError> {
        match event {
            "highlight" => Ok(Inbound::Highlight(
                serde_json::from_value::<HighlightPayload>(payload)?.into(),
            )),
            "pulse" => Ok(Inbound::Pulse(
                serde_json::from_value::<HighlightPayload>(payload)?.into(),
            )),
            "find-successor" => Ok(Inbound::FindSuccessor),
            "inspect-mode-changed" => {
                let InspectModePayload { inspect_mode } = serde_json::from_value(payload)?;
                Ok(Inbound::InspectModeChanged { inspect_mode })
            }
            "toggle-debug-button" => Ok(Inbound::ToggleDebugButton),
            other => Err(LiveDebuggerError::Protocol(format!(
                "unknown event '{other}'"
            ))),
        }
    }
}

/// An event sent by the page to the debugger.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Reply to [`Inbound::FindSuccessor`]
    FoundSuccessor {
        /// The primary session id
        socket_id: String,
    },
    /// The page's session set changed
    UpdateFingerprint {
        /// Fingerprint of the current session set
        fingerprint: String,
        /// The last fingerprint the debugger acknowledged
        previous_fingerprint: String,
    },
    /// Something happened in the page UI
    ClientEvent {
        /// Event name
        event: String,
        /// Event-specific payload
        payload: Value,
    },
    /// The window joined its channel
    WindowInitialized {
        /// Stable id of this browser window
        window_id: String,
        /// Primary session id, if the page has one
        socket_id: Option<String>,
    },
}

impl Outbound {
    /// Channel event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Outbound::FoundSuccessor { .. } => "found-successor",
            Outbound::UpdateFingerprint { .. } => "update_fingerprint",
            Outbound::ClientEvent { .. } => "client_event",
            Outbound::WindowInitialized { .. } => "window-initialized",
        }
    }

    /// Channel payload.
    pub fn payload(&self) -> Value {
        match self {
            Outbound::FoundSuccessor { socket_id } => json!({ "socket_id": socket_id }),
            Outbound::UpdateFingerprint {
                fingerprint,
                previous_fingerprint,
            } => json!({
                "fingerprint": fingerprint,
                "previous_fingerprint": previous_fingerprint,
            }),
            Outbound::ClientEvent { event, payload } => {
                json!({ "event": event, "payload": payload })
            }
            Outbound::WindowInitialized {
                window_id,
                socket_id,
            } => json!({ "window_id": window_id, "socket_id": socket_id }),
        }
    }

    /// `client_event` announcing an inspect mode change.
    pub fn inspect_mode_changed(inspect_mode: bool) -> Self {
        Outbound::ClientEvent {
            event: "inspect-mode-changed".into(),
            payload: json!({ "inspect_mode": inspect_mode }),
        }
    }

    /// `client_event` announcing that an element was picked in inspect mode.
    pub fn element_inspected(descriptor: &HighlightDescriptor) -> Self {
        Outbound::ClientEvent {
            event: "element-inspected".into(),
            payload: json!({
                "type": descriptor.kind,
                "id": descriptor.selector.value,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_decodes_a_full_highlight() {
        let inbound = Inbound::decode(
            "highlight",
            json!({
                "attr": "data-phx-component",
                "val": "42",
                "type": "LiveComponent",
                "module": "MyAppWeb.Counter",
                "id_key": "CID",
                "id_value": "42"
            }),
        )
        .unwrap();

        assert_eq!(
            inbound,
            Inbound::Highlight(
                HighlightDescriptor::component("42").with_metadata("MyAppWeb.Counter", "CID", "42")
            )
        );
    }

    #[test]
    fn it_infers_the_kind_and_tolerates_missing_fields() {
        let Inbound::Pulse(descriptor) =
            Inbound::decode("pulse", json!({ "attr": "id", "val": "phx-F1" })).unwrap()
        else {
            panic!("expected a pulse");
        };
        assert_eq!(descriptor, HighlightDescriptor::view("phx-F1"));

        let Inbound::Highlight(clear) = Inbound::decode("highlight", json!({})).unwrap() else {
            panic!("expected a highlight");
        };
        assert!(clear.is_clear());
    }

    #[test]
    fn it_infers_the_kind_when_the_type_is_unrecognized() {
        let Inbound::Highlight(descriptor) = Inbound::decode(
            "highlight",
            json!({ "attr": "data-phx-component", "val": "42", "type": "live_component" }),
        )
        .unwrap() else {
            panic!("expected a highlight");
        };
        assert_eq!(descriptor, HighlightDescriptor::component("42"));

        let Inbound::Pulse(descriptor) = Inbound::decode(
            "pulse",
            json!({ "attr": "id", "val": "phx-F1", "type": 7 }),
        )
        .unwrap() else {
            panic!("expected a pulse");
        };
        assert_eq!(descriptor, HighlightDescriptor::view("phx-F1"));
    }

    #[test]
    fn it_clears_instead_of_matching_an_invalid_attribute_name() {
        for attr in ["foo]", "x=\"1\"] [y", "9lives", "-1x", "a b"] {
            let Inbound::Highlight(descriptor) =
                Inbound::decode("highlight", json!({ "attr": attr, "val": "42" })).unwrap()
            else {
                panic!("expected a highlight");
            };
            assert!(descriptor.is_clear(), "{attr} should not be matched");
        }
    }

    #[test]
    fn it_decodes_inspect_mode_and_rejects_unknown_events() {
        assert_eq!(
            Inbound::decode("inspect-mode-changed", json!({ "inspect_mode": true })).unwrap(),
            Inbound::InspectModeChanged { inspect_mode: true }
        );
        assert!(matches!(
            Inbound::decode("inspect-mode-changed", json!({})),
            Err(LiveDebuggerError::Protocol(_))
        ));
        assert!(matches!(
            Inbound::decode("reload", Value::Null),
            Err(LiveDebuggerError::Protocol(_))
        ));
    }

    #[test]
    fn it_shapes_outbound_payloads() {
        let update = Outbound::UpdateFingerprint {
            fingerprint: "a;b".into(),
            previous_fingerprint: "a".into(),
        };
        assert_eq!(update.event_name(), "update_fingerprint");
        assert_eq!(
            update.payload(),
            json!({ "fingerprint": "a;b", "previous_fingerprint": "a" })
        );

        let inspected = Outbound::element_inspected(&HighlightDescriptor::component("7"));
        assert_eq!(inspected.event_name(), "client_event");
        assert_eq!(
            inspected.payload(),
            json!({
                "event": "element-inspected",
                "payload": { "type": "LiveComponent", "id": "7" }
            })
        );
    }
}
