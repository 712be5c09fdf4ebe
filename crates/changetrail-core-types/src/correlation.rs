//! Correlation types for request-scoped audit tracking
//!
//! A `RequestToken` identifies one logical user request. Every mutation
//! observed while serving that request carries the same token, which is how
//! the cascade tracker tells the originating mutation apart from its
//! side effects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for one logical request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestToken(String);

impl RequestToken {
    /// Generate a new random RequestToken using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a token supplied by the host platform
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl Default for RequestToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RequestToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_token_generation() {
        let t1 = RequestToken::new();
        let t2 = RequestToken::new();

        assert_ne!(t1, t2);
        assert!(!t1.as_str().is_empty());
    }

    #[test]
    fn test_request_token_from_host_string() {
        let token = RequestToken::from_string("req-42");
        assert_eq!(token.as_str(), "req-42");
        assert_eq!(token, RequestToken::from("req-42"));
        assert_eq!(format!("{}", token), "req-42");
    }

    #[test]
    fn test_serialization_is_transparent_string() {
        let token = RequestToken::from_string("abc");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: RequestToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
