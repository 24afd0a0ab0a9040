//! Error types for the media browser.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! Synchronous precondition failures are returned as [`Result<T>`]:
//!
//! ```ignore
//! use media_browser::{MediaBrowser, Result};
//!
//! fn example(browser: &MediaBrowser) -> Result<()> {
//!     browser.connect()?;
//!     browser.subscribe("root", None, callback)?;
//!     Ok(())
//! }
//! ```
//!
//! Provider-originated failures ([`RemoteError`]) never escape the public
//! browser API. They are recovered into an error callback or a connection
//! state transition.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Caller | [`Error::InvalidArgument`], [`Error::InvalidState`] |
//! | Remote | [`Error::Remote`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::session::ConnectionState;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

/// Result type returned by transport collaborators.
pub type RemoteResult<T> = StdResult<T, RemoteError>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when the browser builder is missing a required field.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Caller Errors
    // ========================================================================
    /// Malformed input, such as an empty node or media id.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Operation not allowed in the current connection state.
    #[error("{operation}() called while {state}")]
    InvalidState {
        /// Name of the rejected operation.
        operation: &'static str,
        /// State the session was in.
        state: ConnectionState,
    },

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// Transport or provider failure.
    ///
    /// The browser itself never returns this variant; it recovers every
    /// [`RemoteError`] into a callback or a state transition. It exists so
    /// transport implementations can use `?` on [`RemoteResult`] inside
    /// functions returning [`Result`].
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

// ============================================================================
// RemoteError
// ============================================================================

/// Failure reported by a [`RemoteService`](crate::transport::RemoteService)
/// or [`TransportBinder`](crate::transport::TransportBinder) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The channel to the provider failed.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The provider refused the request.
    #[error("rejected by provider: {message}")]
    Rejected {
        /// Reason given by the provider.
        message: String,
    },

    /// The provider is no longer reachable.
    #[error("provider disconnected")]
    Disconnected,
}

impl RemoteError {
    /// Creates a transport failure.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a rejection.
    #[inline]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Returns `true` if the failure means the channel itself is gone.
    ///
    /// A rejection leaves the connection usable; the other variants do not.
    #[inline]
    #[must_use]
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Disconnected)
    }
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid state error.
    #[inline]
    pub fn invalid_state(operation: &'static str, state: ConnectionState) -> Self {
        Self::InvalidState { operation, state }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the caller passed malformed input.
    #[inline]
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns `true` if the operation was rejected because of the connection state.
    #[inline]
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Remote(e) if e.is_connection_lost())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_argument("node id is empty");
        assert_eq!(err.to_string(), "Invalid argument: node id is empty");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("missing transport binder");
        assert_eq!(err.to_string(), "Configuration error: missing transport binder");
    }

    #[test]
    fn test_invalid_state_display() {
        let err = Error::invalid_state("connect", ConnectionState::Connected);
        assert_eq!(
            err.to_string(),
            "connect() called while CONNECT_STATE_CONNECTED"
        );
        assert!(err.is_invalid_state());
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_is_connection_error() {
        let lost: Error = RemoteError::transport("pipe closed").into();
        let gone: Error = RemoteError::Disconnected.into();
        let rejected: Error = RemoteError::rejected("no browsing").into();

        assert!(lost.is_connection_error());
        assert!(gone.is_connection_error());
        assert!(!rejected.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_remote_result_propagates_with_question_mark() {
        fn fetch() -> RemoteResult<()> {
            Err(RemoteError::Disconnected)
        }

        fn load() -> Result<()> {
            fetch()?;
            Ok(())
        }

        let err = load().expect_err("remote failure");
        assert!(matches!(err, Error::Remote(RemoteError::Disconnected)));
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_remote_error_display() {
        assert_eq!(
            RemoteError::transport("pipe closed").to_string(),
            "transport failure: pipe closed"
        );
        assert_eq!(
            RemoteError::Disconnected.to_string(),
            "provider disconnected"
        );
    }
}
