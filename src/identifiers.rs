//! Type-safe identifiers.
//!
//! Newtype wrappers keep connection-attempt tokens, provider session tokens
//! and service components from being mixed up.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ConnectionToken`] | Identity of one connection attempt |
//! | [`SessionToken`] | Opaque session handle issued by the provider |
//! | [`ServiceComponent`] | Name of the provider service to bind |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// ============================================================================
// ConnectionToken
// ============================================================================

/// Identity of a single connection attempt.
///
/// A fresh token is generated every time the session enters
/// `Connecting`. Events tagged with any other token are stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionToken(Uuid);

impl ConnectionToken {
    /// Generates a new random token.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SessionToken
// ============================================================================

/// Opaque media session handle returned by the provider on connect.
///
/// Serialized as a plain string; deserializing an empty string fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(String);

impl SessionToken {
    /// Creates a session token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `token` is empty.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::invalid_argument("session token must not be empty"));
        }
        Ok(Self(token))
    }

    /// Returns the token as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionToken {
    type Error = Error;

    fn try_from(token: String) -> Result<Self> {
        Self::new(token)
    }
}

impl From<SessionToken> for String {
    #[inline]
    fn from(token: SessionToken) -> Self {
        token.0
    }
}

// ============================================================================
// ServiceComponent
// ============================================================================

/// Names the provider service the browser binds to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawServiceComponent")]
pub struct ServiceComponent {
    package: String,
    class: String,
}

impl ServiceComponent {
    /// Creates a service component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if either part is empty.
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Result<Self> {
        let package = package.into();
        let class = class.into();
        if package.is_empty() || class.is_empty() {
            return Err(Error::invalid_argument(
                "service component needs a package and a class",
            ));
        }
        Ok(Self { package, class })
    }

    /// Returns the package that hosts the service.
    #[inline]
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Returns the service class name.
    #[inline]
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }
}

impl fmt::Display for ServiceComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

/// Wire shape of [`ServiceComponent`] before validation.
#[derive(Deserialize)]
struct RawServiceComponent {
    package: String,
    class: String,
}

impl TryFrom<RawServiceComponent> for ServiceComponent {
    type Error = Error;

    fn try_from(raw: RawServiceComponent) -> Result<Self> {
        Self::new(raw.package, raw.class)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let a = ConnectionToken::generate();
        let b = ConnectionToken::generate();
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn test_session_token_rejects_empty() {
        assert!(SessionToken::new("").is_err());
        let token = SessionToken::new("session-1").expect("token");
        assert_eq!(token.as_str(), "session-1");
        assert_eq!(token.to_string(), "session-1");
    }

    #[test]
    fn test_session_token_serde_validates() {
        assert!(serde_json::from_str::<SessionToken>(r#""""#).is_err());

        let token: SessionToken = serde_json::from_str(r#""session-1""#).expect("token");
        assert_eq!(token.as_str(), "session-1");
        assert_eq!(serde_json::to_string(&token).expect("json"), r#""session-1""#);
    }

    #[test]
    fn test_service_component_serde_validates() {
        let json = r#"{"package":"com.example.music","class":"BrowserService"}"#;
        let component: ServiceComponent = serde_json::from_str(json).expect("component");
        assert_eq!(component.to_string(), "com.example.music/BrowserService");

        assert!(serde_json::from_str::<ServiceComponent>(r#"{"package":"","class":"S"}"#).is_err());
    }

    #[test]
    fn test_service_component_display() {
        let component = ServiceComponent::new("com.example.music", "BrowserService")
            .expect("component");
        assert_eq!(component.to_string(), "com.example.music/BrowserService");
        assert_eq!(component.package(), "com.example.music");
        assert_eq!(component.class(), "BrowserService");
    }

    #[test]
    fn test_service_component_rejects_empty_parts() {
        assert!(ServiceComponent::new("", "Service").is_err());
        assert!(ServiceComponent::new("pkg", "").is_err());
    }
}
