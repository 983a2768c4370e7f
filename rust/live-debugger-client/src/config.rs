//! Client configuration, read from the page's config meta tag.
//!
//! ```html
//! <meta name="live-debugger-config"
//!       url="http://localhost:4007/transport_pid/0.123.0"
//!       debug-button highlighting version="0.4.0">
//! ```
//!
//! `url` is required. `debug-button` and `highlighting` are presence flags.

use url::Url;

use crate::error::LiveDebuggerError;

/// `name` of the meta tag carrying the configuration.
pub const CONFIG_META_NAME: &str = "live-debugger-config";

/// Path of the debugger's client socket, relative to its origin.
pub const SOCKET_PATH: &str = "/client";

/// Everything the client needs to know about the debugger it talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Where the debugger UI for this page lives
    pub base_url: Url,
    /// Whether the floating debug button is enabled
    pub debug_button: bool,
    /// Whether highlight and pulse requests are rendered
    pub highlighting: bool,
    /// Debugger version, when advertised
    pub version: Option<String>,
}

impl ClientConfig {
    /// Parse from the meta tag's attributes. `attribute` returns an
    /// attribute's value, or `None` if the attribute is absent.
    pub fn from_attributes<F>(attribute: F) -> Result<Self, LiveDebuggerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = attribute("url")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| LiveDebuggerError::InvalidConfig("missing 'url'".into()))?;

        let base_url = Url::parse(&url)
            .map_err(|error| LiveDebuggerError::InvalidConfig(format!("'{url}': {error}")))?;

        Ok(Self {
            base_url,
            debug_button: attribute("debug-button").is_some(),
            highlighting: attribute("highlighting").is_some(),
            version: attribute("version").filter(|version| !version.is_empty()),
        })
    }

    /// WebSocket endpoint for the client channel.
    pub fn socket_url(&self) -> Result<Url, LiveDebuggerError> {
        let mut url = self.base_url.clone();

        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };

        url.set_scheme(scheme).map_err(|_| {
            LiveDebuggerError::InvalidConfig(format!("cannot derive a socket url from '{url}'"))
        })?;
        url.set_path(SOCKET_PATH);
        url.set_query(None);
        url.set_fragment(None);

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let attributes: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| attributes.get(name).cloned()
    }

    #[test]
    fn it_reads_url_and_flags() {
        let config = ClientConfig::from_attributes(lookup(&[
            ("url", "https://debugger.test/transport_pid/0.1.0"),
            ("highlighting", ""),
            ("version", "0.4.0"),
        ]))
        .unwrap();

        assert_eq!(
            config.base_url.as_str(),
            "https://debugger.test/transport_pid/0.1.0"
        );
        assert!(config.highlighting);
        assert!(!config.debug_button);
        assert_eq!(config.version.as_deref(), Some("0.4.0"));
    }

    #[test]
    fn it_rejects_a_missing_or_malformed_url() {
        assert!(matches!(
            ClientConfig::from_attributes(lookup(&[("debug-button", "")])),
            Err(LiveDebuggerError::InvalidConfig(_))
        ));
        assert!(matches!(
            ClientConfig::from_attributes(lookup(&[("url", "not a url")])),
            Err(LiveDebuggerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn it_derives_the_socket_url() {
        let plain =
            ClientConfig::from_attributes(lookup(&[("url", "http://localhost:4007/pid/1?x=1")]))
                .unwrap();
        assert_eq!(
            plain.socket_url().unwrap().as_str(),
            "ws://localhost:4007/client"
        );

        let secure =
            ClientConfig::from_attributes(lookup(&[("url", "https://debugger.test/pid/1")]))
                .unwrap();
        assert_eq!(
            secure.socket_url().unwrap().as_str(),
            "wss://debugger.test/client"
        );
    }
}
