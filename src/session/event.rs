//! Events delivered to the browser's event loop.
//!
//! Everything that originates outside an application call (binder and
//! service notifications, item fetch results, deferred failures) is turned
//! into a [`SessionEvent`] and handled one at a time on the loop.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::callback::{ItemCallback, SubscriptionCallback};
use crate::error::RemoteError;
use crate::identifiers::ConnectionToken;
use crate::item::MediaItem;
use crate::options::{BrowseOptions, OptionsKey};
use crate::transport::{ConnectReply, RemoteService};

// ============================================================================
// ChildrenEvent
// ============================================================================

/// Children pushed by the provider for one subscribed node.
///
/// `children == None` is the provider's error path for that node.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildrenEvent {
    /// Node whose children changed.
    pub parent_id: String,
    /// Loaded children, or `None` if loading failed.
    pub children: Option<Vec<MediaItem>>,
    /// Options of the subscription this push answers.
    pub options: Option<BrowseOptions>,
}

impl ChildrenEvent {
    /// Invokes the matching notification on `callback`.
    ///
    /// `subscribed` is the key the subscription was registered with. Its
    /// options, not the pushed ones, pick the form: subscriptions registered
    /// without options (or with empty ones) get the two-argument forms.
    pub fn dispatch(&self, callback: &dyn SubscriptionCallback, subscribed: &OptionsKey) {
        let parent_id = self.parent_id.as_str();
        let options = subscribed.options().filter(|o| !o.is_empty());
        match (&self.children, options) {
            (Some(children), None) => callback.on_children_loaded(parent_id, children),
            (Some(children), Some(options)) => {
                callback.on_children_loaded_with_options(parent_id, children, options);
            }
            (None, None) => callback.on_error(parent_id),
            (None, Some(options)) => callback.on_error_with_options(parent_id, options),
        }
    }
}

// ============================================================================
// SessionEvent
// ============================================================================

/// Internal events for the event loop.
pub(crate) enum SessionEvent {
    /// The binder refused the bind request.
    BindFailed { token: ConnectionToken },
    /// The binder established the channel.
    Bound {
        token: ConnectionToken,
        service: Arc<dyn RemoteService>,
    },
    /// The binder lost the channel.
    Unbound { token: ConnectionToken },
    /// The provider accepted the connection.
    Connected {
        token: ConnectionToken,
        reply: ConnectReply,
    },
    /// The provider refused the connection.
    ConnectFailed { token: ConnectionToken },
    /// The provider pushed children for a node.
    ChildrenLoaded {
        token: ConnectionToken,
        event: ChildrenEvent,
    },
    /// A fire-and-forget call failed at the transport level.
    ServiceLost {
        token: ConnectionToken,
        error: RemoteError,
    },
    /// A single-item lookup finished.
    ItemLoaded {
        media_id: String,
        item: Option<MediaItem>,
        callback: Arc<dyn ItemCallback>,
    },
    /// Resolves once every earlier event has been handled.
    Barrier(oneshot::Sender<()>),
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindFailed { token } => write!(f, "BindFailed({token})"),
            Self::Bound { token, .. } => write!(f, "Bound({token})"),
            Self::Unbound { token } => write!(f, "Unbound({token})"),
            Self::Connected { token, reply } => {
                write!(f, "Connected({token}, root={})", reply.root_id)
            }
            Self::ConnectFailed { token } => write!(f, "ConnectFailed({token})"),
            Self::ChildrenLoaded { token, event } => {
                write!(f, "ChildrenLoaded({token}, parent={})", event.parent_id)
            }
            Self::ServiceLost { token, error } => write!(f, "ServiceLost({token}, {error})"),
            Self::ItemLoaded { media_id, item, .. } => {
                write!(f, "ItemLoaded({media_id}, found={})", item.is_some())
            }
            Self::Barrier(_) => f.write_str("Barrier"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
