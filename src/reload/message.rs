//! Live Reload Message Protocol
//!
//! JSON text frames sent from the reload server to browser clients.
//!
//! # Message Types
//!
//! - `connected`: sent once after the WebSocket handshake
//! - `reload`: full page reload (optional changed path)
//! - `css`: swap stylesheets without reloading the page

use serde::{Deserialize, Serialize};

/// Message sent over the reload WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Full page reload
    Reload {
        /// Destination-relative URL of the changed file, if known
        #[serde(skip_serializing_if = "Option::is_none", default)]
        path: Option<String>,
    },

    /// Stylesheet refresh (no page reload)
    Css {
        /// Destination-relative URL of the rebuilt stylesheet
        path: String,
    },
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn reload(path: Option<String>) -> Self {
        Self::Reload { path }
    }

    pub fn css(path: impl Into<String>) -> Self {
        Self::Css { path: path.into() }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    /// Parse from JSON string
    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_message() {
        let json = ReloadMessage::reload(Some("/index.html".into())).to_json();
        assert_eq!(json, r#"{"type":"reload","path":"/index.html"}"#);
    }

    #[test]
    fn test_reload_without_path() {
        assert_eq!(ReloadMessage::reload(None).to_json(), r#"{"type":"reload"}"#);
        assert_eq!(
            ReloadMessage::from_json(r#"{"type":"reload"}"#),
            Some(ReloadMessage::Reload { path: None })
        );
    }

    #[test]
    fn test_css_message() {
        let json = ReloadMessage::css("/css/style.min.css").to_json();
        assert_eq!(json, r#"{"type":"css","path":"/css/style.min.css"}"#);
    }

    #[test]
    fn test_connected_message() {
        let json = ReloadMessage::connected().to_json();
        assert!(json.starts_with(r#"{"type":"connected","version":""#));

        match ReloadMessage::from_json(&json) {
            Some(ReloadMessage::Connected { version }) => {
                assert_eq!(version, env!("CARGO_PKG_VERSION"));
            }
            other => panic!("Expected Connected message, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type() {
        assert!(ReloadMessage::from_json(r#"{"type":"patch"}"#).is_none());
    }
}
