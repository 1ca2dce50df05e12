//! Bearer token port.
//!
//! The sync client never issues or refreshes tokens; it only asks this
//! port for the current one. Answering `None` is the "logged out" signal:
//! connects become no-ops and reconnect scheduling stops.

/// Port for looking up the session's current bearer token.
pub trait BearerTokenProvider: Send + Sync {
    /// The current token, or `None` when the session is not authenticated.
    ///
    /// Implementations should never return an empty string; return `None`
    /// instead.
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed-token provider for tests and simple embeddings.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Create a provider that always answers with `token`.
    ///
    /// An empty token behaves as "not authenticated".
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl BearerTokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        if self.token.is_empty() {
            None
        } else {
            Some(self.token.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider() {
        let provider = StaticTokenProvider::new("jwt-123");
        assert_eq!(provider.bearer_token().as_deref(), Some("jwt-123"));
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        let provider = StaticTokenProvider::new("");
        assert!(provider.bearer_token().is_none());
    }
}
