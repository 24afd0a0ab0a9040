//! Channel establishment.
//!
//! A [`TransportBinder`] locates the provider named by a
//! [`ServiceComponent`] and reports, through [`BinderEvents`], when the
//! channel comes up or goes away.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::trace;

use crate::identifiers::{ConnectionToken, ServiceComponent};
use crate::session::event::SessionEvent;

use super::RemoteService;

// ============================================================================
// BindRequest
// ============================================================================

/// Parameters of a single bind attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    /// Provider to bind.
    pub component: ServiceComponent,
    /// Attempt the binding belongs to. Passed back to [`TransportBinder::unbind`].
    pub token: ConnectionToken,
}

// ============================================================================
// TransportBinder
// ============================================================================

/// Establishes and tears down the channel to the provider.
///
/// Methods are called while the browser holds its state lock. They must
/// return promptly and must not call back into the
/// [`MediaBrowser`](crate::MediaBrowser); report progress through
/// [`BinderEvents`] instead, from any thread.
pub trait TransportBinder: Send + Sync {
    /// Starts binding.
    ///
    /// Returns `false` if the attempt is rejected outright. `true` only
    /// means a channel will eventually be reported through `events`.
    fn bind(&self, request: &BindRequest, events: BinderEvents) -> bool;

    /// Releases the binding made for `token`.
    fn unbind(&self, token: ConnectionToken);
}

// ============================================================================
// BinderEvents
// ============================================================================

/// Sink for binder notifications, tagged with one connection attempt.
#[derive(Clone)]
pub struct BinderEvents {
    token: ConnectionToken,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl BinderEvents {
    pub(crate) fn new(token: ConnectionToken, events_tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { token, events_tx }
    }

    /// Returns the attempt this sink belongs to.
    #[inline]
    #[must_use]
    pub fn token(&self) -> ConnectionToken {
        self.token
    }

    /// Reports that the channel is up and `service` can be called.
    pub fn on_bound(&self, service: Arc<dyn RemoteService>) {
        self.post(SessionEvent::Bound {
            token: self.token,
            service,
        });
    }

    /// Reports that the channel went away.
    pub fn on_unbound(&self) {
        self.post(SessionEvent::Unbound { token: self.token });
    }

    fn post(&self, event: SessionEvent) {
        if self.events_tx.send(event).is_err() {
            trace!(token = %self.token, "Browser gone, binder event dropped");
        }
    }
}

impl fmt::Debug for BinderEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinderEvents")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
