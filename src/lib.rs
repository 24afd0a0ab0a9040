//! Media Browser - client for browsing a media provider's content tree.
//!
//! This library connects an application to a media provider that may live
//! in another process, keeps track of which tree nodes the application is
//! subscribed to, and routes the children the provider pushes back to the
//! right callback.
//!
//! # Architecture
//!
//! The browser follows a client-provider model:
//!
//! - **Application**: calls [`MediaBrowser`], receives callbacks
//! - **Transport**: [`TransportBinder`] and [`RemoteService`], supplied by the application
//! - **Provider**: answers connects, pushes children, looks up items
//!
//! Key design principles:
//!
//! - API calls never block; results arrive later on the browser's event loop
//! - Every connection attempt gets a fresh [`ConnectionToken`]; events from
//!   superseded attempts are dropped
//! - Subscriptions are client-side intent and are replayed after every connect
//! - Subscriptions are keyed by node id and [`OptionsKey`]; absent and empty
//!   options are the same subscription
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use media_browser::{MediaBrowser, MediaItem, ServiceComponent, SubscriptionCallback};
//!
//! struct Children;
//!
//! impl SubscriptionCallback for Children {
//!     fn on_children_loaded(&self, parent_id: &str, children: &[MediaItem]) {
//!         println!("{parent_id}: {} children", children.len());
//!     }
//! }
//!
//! let browser = MediaBrowser::builder()
//!     .component(ServiceComponent::new("com.example.music", "BrowserService")?)
//!     .callback(Arc::new(MyConnectionCallback))
//!     .binder(Arc::new(MyBinder::default()))
//!     .build()?;
//!
//! browser.subscribe("root", None, Arc::new(Children))?;
//! browser.connect()?;
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`callback`] | Application callback traits |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe token and component wrappers |
//! | [`item`] | [`MediaItem`] and its description |
//! | [`options`] | [`BrowseOptions`] and [`OptionsKey`] |
//! | [`session`] | [`MediaBrowser`] and the connection state machine |
//! | [`subscription`] | Subscription registry |
//! | [`transport`] | Provider transport traits |

// ============================================================================
// Modules
// ============================================================================

/// Application callback traits.
pub mod callback;

/// Error types and result aliases.
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Media items.
pub mod item;

/// Subscription options.
pub mod options;

/// Browser session and connection state machine.
///
/// Use [`MediaBrowser::builder()`] to create a browser.
pub mod session;

/// Client-side subscription registry.
pub mod subscription;

/// Provider transport boundary.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Callback types
pub use callback::{ConnectionCallback, ItemCallback, SubscriptionCallback};

// Error types
pub use error::{Error, RemoteError, RemoteResult, Result};

// Identifier types
pub use identifiers::{ConnectionToken, ServiceComponent, SessionToken};

// Item types
pub use item::{MediaDescription, MediaItem, MediaItemFlags};

// Option types
pub use options::{BrowseOptions, EXTRA_PAGE, EXTRA_PAGE_SIZE, OptionsKey};

// Session types
pub use session::{ChildrenEvent, ConnectionState, MediaBrowser, MediaBrowserBuilder};

// Subscription types
pub use subscription::{SubscriptionRegistry, SubscriptionSet};

// Transport types
pub use transport::{
    BindRequest, BinderEvents, ConnectReply, ConnectRequest, RemoteService, ServiceCallbacks,
    TransportBinder,
};
