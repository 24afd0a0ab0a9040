//! Provider transport boundary.
//!
//! The browser does not know how the provider is reached. Applications plug
//! in a [`TransportBinder`] that establishes the channel and a
//! [`RemoteService`] that speaks to the provider over it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   bind / unbind     ┌──────────────────┐
//! │  MediaBrowser   │────────────────────►│ TransportBinder  │
//! │                 │◄── BinderEvents ────│                  │
//! │  (event loop)   │                     └──────────────────┘
//! │                 │   connect, add/remove subscription, get_item
//! │                 │────────────────────►┌──────────────────┐
//! │                 │◄ ServiceCallbacks ──│  RemoteService   │
//! └─────────────────┘                     └──────────────────┘
//! ```
//!
//! Both sinks are tagged with the [`ConnectionToken`](crate::ConnectionToken)
//! of the attempt they were created for and only post to the event loop, so
//! they may be called from any thread and may outlive the browser.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `binder` | Channel establishment and [`BinderEvents`] |
//! | `remote` | Provider calls and [`ServiceCallbacks`] |

// ============================================================================
// Submodules
// ============================================================================

/// Channel establishment.
pub mod binder;

/// Remote provider interface.
pub mod remote;

// ============================================================================
// Re-exports
// ============================================================================

pub use binder::{BindRequest, BinderEvents, TransportBinder};
pub use remote::{ConnectReply, ConnectRequest, RemoteService, ServiceCallbacks};
