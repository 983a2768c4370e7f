//! Highlight descriptors and the intents that flow between components.
//!
//! Local interaction (the inspect controller), inbound channel events and
//! the mutation watcher never call into the renderers directly. They emit
//! [`Intent`]s onto an [`IntentBus`]; the [`Debugger`](crate::Debugger)
//! drains the bus in arrival order and applies each one.

use std::collections::VecDeque;
use std::fmt;

use live_debugger_common::SharedCell;
use serde::{Deserialize, Serialize};

use crate::protocol::Outbound;

/// Attribute carried by every rendered sub-component root.
pub const COMPONENT_ATTRIBUTE: &str = "data-phx-component";

/// Attribute carried by every mounted view container.
pub const SESSION_ATTRIBUTE: &str = "data-phx-session";

/// Attribute marking the primary view of the page.
pub const MAIN_ATTRIBUTE: &str = "data-phx-main";

/// Views are addressed by their element id.
pub const VIEW_ATTRIBUTE: &str = "id";

/// Whether an identity names a whole view or a component inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityKind {
    /// A mounted top-level or nested view
    #[serde(rename = "LiveView", alias = "view")]
    View,
    /// A stateful component rendered inside a view
    #[serde(rename = "LiveComponent", alias = "component")]
    Component,
}

impl IdentityKind {
    /// Label shown in the tooltip.
    pub fn label(&self) -> &'static str {
        match self {
            IdentityKind::View => "LiveView",
            IdentityKind::Component => "LiveComponent",
        }
    }
}

/// An attribute/value pair that locates one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Attribute name, e.g. `data-phx-component`
    pub attribute: String,
    /// Attribute value, e.g. `42`
    pub value: String,
}

impl Selector {
    /// Build a selector.
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// A selector missing either half identifies nothing.
    pub fn is_empty(&self) -> bool {
        self.attribute.is_empty() || self.value.is_empty()
    }

    /// Whether `name` can stand unquoted as the attribute in a CSS attribute
    /// selector: identifier characters only, not starting with a digit or a
    /// hyphen followed by a digit.
    pub fn is_valid_attribute(name: &str) -> bool {
        let mut characters = name.chars();
        let leading = match characters.next() {
            Some('-') => characters.next(),
            first => first,
        };

        match leading {
            Some(character) if character.is_ascii_digit() => return false,
            None => return false,
            _ => (),
        }

        name.chars().all(|character| {
            character.is_ascii_alphanumeric()
                || character == '-'
                || character == '_'
                || !character.is_ascii()
        })
    }

    /// Render as a CSS attribute selector: `[attribute="value"]`.
    pub fn to_css(&self) -> String {
        let mut escaped = String::with_capacity(self.value.len());
        for character in self.value.chars() {
            if character == '"' || character == '\\' {
                escaped.push('\\');
            }
            escaped.push(character);
        }
        format!("[{}=\"{}\"]", self.attribute, escaped)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

/// What the tooltip renders. Only exists when every field is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipMetadata {
    /// Module implementing the view or component
    pub module: String,
    /// View or component
    pub kind: IdentityKind,
    /// Label for the id, e.g. `CID` or `PID`
    pub id_key: String,
    /// The id itself
    pub id_value: String,
}

/// Identifies the element to highlight and what to say about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightDescriptor {
    /// Where the element is
    pub selector: Selector,
    /// What it is
    pub kind: IdentityKind,
    /// Module name, when known
    pub module: Option<String>,
    /// Id label, when known
    pub id_key: Option<String>,
    /// Id value, when known
    pub id_value: Option<String>,
}

impl HighlightDescriptor {
    /// A descriptor with no tooltip metadata.
    pub fn new(selector: Selector, kind: IdentityKind) -> Self {
        Self {
            selector,
            kind,
            module: None,
            id_key: None,
            id_value: None,
        }
    }

    /// Identity of a sub-component by its cid.
    pub fn component(cid: impl Into<String>) -> Self {
        Self::new(
            Selector::new(COMPONENT_ATTRIBUTE, cid),
            IdentityKind::Component,
        )
    }

    /// Identity of a view by its element id.
    pub fn view(element_id: impl Into<String>) -> Self {
        Self::new(Selector::new(VIEW_ATTRIBUTE, element_id), IdentityKind::View)
    }

    /// Attach tooltip metadata.
    pub fn with_metadata(
        mut self,
        module: impl Into<String>,
        id_key: impl Into<String>,
        id_value: impl Into<String>,
    ) -> Self {
        self.module = Some(module.into());
        self.id_key = Some(id_key.into());
        self.id_value = Some(id_value.into());
        self
    }

    /// A descriptor that identifies nothing acts as "clear".
    pub fn is_clear(&self) -> bool {
        self.selector.is_empty()
    }

    /// Tooltip metadata, or `None` if any field is missing.
    pub fn tooltip(&self) -> Option<TooltipMetadata> {
        match (&self.module, &self.id_key, &self.id_value) {
            (Some(module), Some(id_key), Some(id_value)) => Some(TooltipMetadata {
                module: module.clone(),
                kind: self.kind,
                id_key: id_key.clone(),
                id_value: id_value.clone(),
            }),
            _ => None,
        }
    }
}

/// A request for some component to act.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Draw (or toggle off) the overlay for a target
    ShowHighlight(HighlightDescriptor),
    /// Remove whatever overlay and tooltip are shown
    ClearHighlight,
    /// Play the one-shot pulse over a target
    Pulse(HighlightDescriptor),
    /// The session fingerprint moved and the debugger confirmed it
    FingerprintChanged {
        /// The new baseline
        fingerprint: String,
        /// The baseline it replaced
        previous: String,
    },
    /// Tell the debugger something happened locally
    Notify(Outbound),
    /// Ask the debug-button UI to toggle itself
    ToggleDebugButton,
}

/// An ordered queue of [`Intent`]s.
///
/// Producers push during a callback; the owner drains at the end of it.
#[derive(Debug, Default)]
pub struct IntentBus {
    queue: SharedCell<VecDeque<Intent>>,
}

impl IntentBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an intent behind any already pending.
    pub fn emit(&self, intent: Intent) {
        self.queue.write().push_back(intent);
    }

    /// Remove and return every pending intent, oldest first.
    pub fn drain(&self) -> Vec<Intent> {
        self.queue.write().drain(..).collect()
    }

    /// Number of pending intents.
    pub fn len(&self) -> usize {
        self.queue.read().len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_escapes_quotes_in_css_selectors() {
        let selector = Selector::new("id", r#"phx-"odd"\id"#);

        assert_eq!(selector.to_css(), r#"[id="phx-\"odd\"\\id"]"#);
        assert_eq!(
            Selector::new(COMPONENT_ATTRIBUTE, "42").to_css(),
            r#"[data-phx-component="42"]"#
        );
    }

    #[test]
    fn it_accepts_only_identifier_attribute_names() {
        for valid in ["id", COMPONENT_ATTRIBUTE, "data-phx-session", "_x", "-x", "dátum"] {
            assert!(Selector::is_valid_attribute(valid), "{valid}");
        }
        for invalid in ["", "-", "1d", "-1d", "a]", "a=b", "a b", "a\"b"] {
            assert!(!Selector::is_valid_attribute(invalid), "{invalid}");
        }
    }

    #[test]
    fn it_only_yields_tooltip_metadata_when_complete() {
        let partial = HighlightDescriptor {
            module: Some("MyAppWeb.Counter".into()),
            id_key: Some("CID".into()),
            ..HighlightDescriptor::component("42")
        };
        assert_eq!(partial.tooltip(), None);

        let complete = HighlightDescriptor::component("42").with_metadata(
            "MyAppWeb.Counter",
            "CID",
            "42",
        );
        let metadata = complete.tooltip().unwrap();
        assert_eq!(metadata.module, "MyAppWeb.Counter");
        assert_eq!(metadata.kind, IdentityKind::Component);
    }

    #[test]
    fn it_treats_an_empty_selector_as_clear() {
        assert!(HighlightDescriptor::component("").is_clear());
        assert!(!HighlightDescriptor::view("phx-F1").is_clear());
    }

    #[test]
    fn it_drains_intents_in_arrival_order() {
        let bus = IntentBus::new();
        bus.emit(Intent::ShowHighlight(HighlightDescriptor::component("1")));
        bus.emit(Intent::ClearHighlight);

        assert_eq!(bus.len(), 2);
        assert_eq!(
            bus.drain(),
            vec![
                Intent::ShowHighlight(HighlightDescriptor::component("1")),
                Intent::ClearHighlight
            ]
        );
        assert!(bus.is_empty());
    }
}
