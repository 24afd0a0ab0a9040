//! Connection state and the data it guards.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::identifiers::{ConnectionToken, SessionToken};
use crate::options::BrowseOptions;
use crate::subscription::SubscriptionRegistry;
use crate::transport::RemoteService;

// ============================================================================
// ConnectionState
// ============================================================================

/// Where the browser is in its connection lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Not connected; `connect()` may be called.
    #[default]
    Disconnected,
    /// Binding or waiting for the provider to accept.
    Connecting,
    /// Connected; accessors are valid and subscriptions are live.
    Connected,
    /// The provider went away without `disconnect()` being called.
    Suspended,
}

impl ConnectionState {
    /// Returns the diagnostic label of the state.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "CONNECT_STATE_DISCONNECTED",
            Self::Connecting => "CONNECT_STATE_CONNECTING",
            Self::Connected => "CONNECT_STATE_CONNECTED",
            Self::Suspended => "CONNECT_STATE_SUSPENDED",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SessionState
// ============================================================================

/// Mutable state of a browser, guarded by one lock.
///
/// Everything except `subscriptions` is connection-scoped and cleared when a
/// connection ends.
#[derive(Default)]
pub(crate) struct SessionState {
    /// Current lifecycle state.
    pub connection_state: ConnectionState,
    /// Token of the live attempt. Events carrying any other token are stale.
    pub token: Option<ConnectionToken>,
    /// Token of the binding to release on teardown. Binder events are
    /// matched against it.
    ///
    /// Outlives `token` while suspended: the channel stays bound so the
    /// binder can report it again, which starts a new attempt over it.
    pub bound: Option<ConnectionToken>,
    /// Provider handle, set once the binder reports the channel.
    pub service: Option<Arc<dyn RemoteService>>,
    /// Root node id, set on connect.
    pub root_id: Option<String>,
    /// Provider session handle, set on connect.
    pub session_token: Option<SessionToken>,
    /// Provider extras from the connect reply.
    pub extras: Option<BrowseOptions>,
    /// Durable subscription intent.
    pub subscriptions: SubscriptionRegistry,
}

impl SessionState {
    /// Returns `true` if `token` belongs to the live attempt.
    #[inline]
    #[must_use]
    pub fn is_current(&self, token: ConnectionToken) -> bool {
        self.token == Some(token)
    }

    /// Returns `true` if `token` names the binding currently held.
    #[inline]
    #[must_use]
    pub fn is_bound(&self, token: ConnectionToken) -> bool {
        self.bound == Some(token)
    }

    /// Enters `Connecting` for a fresh attempt, invalidating the previous token.
    pub fn begin_attempt(&mut self, token: ConnectionToken) {
        self.connection_state = ConnectionState::Connecting;
        self.token = Some(token);
        self.bound = Some(token);
    }

    /// Enters `Connecting` for a new attempt over the binding already held.
    pub fn resume_attempt(&mut self, token: ConnectionToken) {
        self.connection_state = ConnectionState::Connecting;
        self.token = Some(token);
    }

    /// Enters `Connected` with the provider's reply.
    pub fn complete_connect(
        &mut self,
        root_id: String,
        session_token: SessionToken,
        extras: Option<BrowseOptions>,
    ) {
        self.connection_state = ConnectionState::Connected;
        self.root_id = Some(root_id);
        self.session_token = Some(session_token);
        self.extras = extras;
    }

    /// Enters `Suspended`, keeping the binding and subscriptions.
    pub fn suspend(&mut self) {
        self.connection_state = ConnectionState::Suspended;
        self.service = None;
        self.token = None;
    }

    /// Clears every connection-scoped field and enters `Disconnected`.
    ///
    /// Returns the binding that the caller must release.
    #[must_use]
    pub fn reset(&mut self) -> Option<ConnectionToken> {
        self.connection_state = ConnectionState::Disconnected;
        self.token = None;
        self.service = None;
        self.root_id = None;
        self.session_token = None;
        self.extras = None;
        self.bound.take()
    }

    /// Fails unless connected.
    pub fn require_connected(&self, operation: &'static str) -> Result<()> {
        if self.connection_state == ConnectionState::Connected {
            Ok(())
        } else {
            Err(Error::invalid_state(operation, self.connection_state))
        }
    }

    /// Returns the service and token to use for a live call.
    ///
    /// `None` unless connected.
    #[must_use]
    pub fn live_service(&self) -> Option<(Arc<dyn RemoteService>, ConnectionToken)> {
        if self.connection_state != ConnectionState::Connected {
            return None;
        }
        Some((Arc::clone(self.service.as_ref()?), self.token?))
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("state", &self.connection_state.label())
            .field("token", &self.token)
            .field("bound", &self.bound)
            .field("has_service", &self.service.is_some())
            .field("root_id", &self.root_id)
            .field("session_token", &self.session_token)
            .field("extras", &self.extras)
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(
            ConnectionState::Disconnected.to_string(),
            "CONNECT_STATE_DISCONNECTED"
        );
        assert_eq!(ConnectionState::Suspended.label(), "CONNECT_STATE_SUSPENDED");
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_new_attempt_invalidates_previous_token() {
        let mut state = SessionState::default();
        let first = ConnectionToken::generate();
        let second = ConnectionToken::generate();

        state.begin_attempt(first);
        assert!(state.is_current(first));

        state.begin_attempt(second);
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
        assert_eq!(state.connection_state, ConnectionState::Connecting);
    }

    #[test]
    fn test_suspend_keeps_binding() {
        let mut state = SessionState::default();
        let token = ConnectionToken::generate();
        state.begin_attempt(token);
        state.complete_connect(
            "root".into(),
            SessionToken::new("s").expect("token"),
            None,
        );

        state.suspend();
        assert_eq!(state.connection_state, ConnectionState::Suspended);
        assert!(!state.is_current(token));
        assert!(state.is_bound(token));
        assert!(state.require_connected("root").is_err());
    }

    #[test]
    fn test_resume_keeps_binding() {
        let mut state = SessionState::default();
        let bound = ConnectionToken::generate();
        state.begin_attempt(bound);
        state.suspend();

        let attempt = ConnectionToken::generate();
        state.resume_attempt(attempt);
        assert_eq!(state.connection_state, ConnectionState::Connecting);
        assert!(state.is_current(attempt));
        assert!(!state.is_current(bound));
        assert!(state.is_bound(bound));
        assert_eq!(state.reset(), Some(bound));
    }

    #[test]
    fn test_reset_returns_binding() {
        let mut state = SessionState::default();
        let token = ConnectionToken::generate();
        state.begin_attempt(token);
        state.complete_connect(
            "root".into(),
            SessionToken::new("s").expect("token"),
            Some(BrowseOptions::new().with("k", 1)),
        );
        assert!(state.require_connected("root").is_ok());

        assert_eq!(state.reset(), Some(token));
        assert_eq!(state.connection_state, ConnectionState::Disconnected);
        assert!(state.root_id.is_none());
        assert!(state.session_token.is_none());
        assert!(state.extras.is_none());
        assert_eq!(state.reset(), None);
    }

    #[test]
    fn test_live_service_requires_connection() {
        let state = SessionState::default();
        assert!(state.live_service().is_none());
    }
}
