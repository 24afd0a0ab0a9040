//! Remote provider interface.
//!
//! [`RemoteService`] is the handle the binder hands over once the channel is
//! up. Calls are fire-and-forget except [`RemoteService::get_item`]; the
//! provider answers connects and pushes children through
//! [`ServiceCallbacks`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::RemoteResult;
use crate::identifiers::ConnectionToken;
use crate::item::MediaItem;
use crate::options::BrowseOptions;
use crate::session::event::{ChildrenEvent, SessionEvent};

// ============================================================================
// ConnectRequest
// ============================================================================

/// Payload of the connect call.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectRequest {
    /// Identity of the connecting client.
    pub client_name: String,
    /// Hints the provider may use to pick a root.
    pub root_hints: Option<BrowseOptions>,
    /// Attempt the connect belongs to.
    pub token: ConnectionToken,
}

// ============================================================================
// ConnectReply
// ============================================================================

/// Successful answer to a connect call.
///
/// Validated by the browser: an empty root id or session token is treated
/// as a refused connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectReply {
    /// Id of the root node to browse from.
    pub root_id: String,
    /// Media session handle.
    pub session_token: String,
    /// Provider-specific extras.
    #[serde(default)]
    pub extras: Option<BrowseOptions>,
}

// ============================================================================
// RemoteService
// ============================================================================

/// Calls into the provider.
///
/// The synchronous methods are one-way: they return once the call is on the
/// wire, and an `Err` means the transport failed. They are called while the
/// browser holds its state lock and must not call back into the
/// [`MediaBrowser`](crate::MediaBrowser).
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Asks the provider to accept this client.
    ///
    /// The answer arrives through `callbacks`.
    fn connect(&self, request: &ConnectRequest, callbacks: ServiceCallbacks) -> RemoteResult<()>;

    /// Tells the provider this client is leaving.
    fn disconnect(&self, token: ConnectionToken) -> RemoteResult<()>;

    /// Registers interest in the children of `node_id`.
    ///
    /// The provider pushes children through the callbacks given to
    /// [`connect`](Self::connect) for `token`.
    fn add_subscription(
        &self,
        token: ConnectionToken,
        node_id: &str,
        options: Option<&BrowseOptions>,
    ) -> RemoteResult<()>;

    /// Drops interest registered with [`add_subscription`](Self::add_subscription).
    fn remove_subscription(
        &self,
        token: ConnectionToken,
        node_id: &str,
        options: Option<&BrowseOptions>,
    ) -> RemoteResult<()>;

    /// Looks up a single item. `Ok(None)` means the provider has no such item.
    async fn get_item(&self, media_id: &str) -> RemoteResult<Option<MediaItem>>;
}

// ============================================================================
// ServiceCallbacks
// ============================================================================

/// Sink for provider notifications, tagged with one connection attempt.
///
/// Holds no reference to the browser itself: once the browser is dropped,
/// notifications are silently discarded.
#[derive(Clone)]
pub struct ServiceCallbacks {
    token: ConnectionToken,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ServiceCallbacks {
    pub(crate) fn new(token: ConnectionToken, events_tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { token, events_tx }
    }

    /// Returns the attempt these callbacks belong to.
    #[inline]
    #[must_use]
    pub fn token(&self) -> ConnectionToken {
        self.token
    }

    /// The provider accepted the connection.
    pub fn on_connect(&self, reply: ConnectReply) {
        self.post(SessionEvent::Connected {
            token: self.token,
            reply,
        });
    }

    /// The provider refused the connection.
    pub fn on_connect_failed(&self) {
        self.post(SessionEvent::ConnectFailed { token: self.token });
    }

    /// Children of `parent_id` were loaded, or failed to load if `children`
    /// is `None`.
    ///
    /// `options` must be the options the subscription was registered with.
    pub fn on_load_children(
        &self,
        parent_id: impl Into<String>,
        children: Option<Vec<MediaItem>>,
        options: Option<BrowseOptions>,
    ) {
        self.post(SessionEvent::ChildrenLoaded {
            token: self.token,
            event: ChildrenEvent {
                parent_id: parent_id.into(),
                children,
                options,
            },
        });
    }

    fn post(&self, event: SessionEvent) {
        if let Err(e) = self.events_tx.send(event) {
            trace!(token = %self.token, event = ?e.0, "Browser gone, service event dropped");
        }
    }
}

impl fmt::Debug for ServiceCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCallbacks")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
