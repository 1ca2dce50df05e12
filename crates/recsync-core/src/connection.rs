//! Connection status observed by consumers.

use serde::{Deserialize, Serialize};

/// State of the push channel, exactly one of which holds at any time.
///
/// Published by the connection manager through a watch channel; consumers
/// render it as a connectivity indicator. Transport failures never surface
/// as errors, only as transitions of this enum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No channel is open and none is being opened.
    #[default]
    Disconnected,
    /// A channel is being opened (initial connect or backoff reconnect).
    Connecting,
    /// The channel is open and frames are flowing.
    Connected,
    /// The channel failed; a reconnect will be scheduled while a bearer
    /// token is still available.
    Error,
}

impl ConnectionStatus {
    /// String representation for logs and wire-friendly status payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }

    /// Whether frames are currently flowing.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disconnected() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Disconnected);
        assert!(!ConnectionStatus::default().is_connected());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&ConnectionStatus::Connecting).unwrap();
        assert_eq!(json, "\"connecting\"");
    }
}
