//! Browser session: connection state machine and dispatch.
//!
//! # Connection Lifecycle
//!
//! ```text
//!                 connect()
//!  Disconnected ────────────► Connecting ──── reply ok ────► Connected
//!       ▲                        │                              │
//!       │   bind/connect failed  │                   unbound    │
//!       └────────────────────────┘                              ▼
//!       ▲                                                   Suspended
//!       └──────────── disconnect() (from any state) ───────────┘
//! ```
//!
//! `connect()` is also accepted from `Suspended`. A suspended session also
//! returns to `Connecting` when the binder reports the kept binding bound
//! again. Subscriptions survive every transition and are replayed on each
//! entry into `Connected`.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `browser` | [`MediaBrowser`] handle and event loop |
//! | `builder` | [`MediaBrowserBuilder`] |
//! | `event` | Loop events and [`ChildrenEvent`] |
//! | `state` | [`ConnectionState`] and the guarded session data |

// ============================================================================
// Submodules
// ============================================================================

/// Browser handle and event loop.
pub mod browser;

/// Browser configuration.
pub mod builder;

/// Event loop messages.
pub mod event;

/// Connection state.
pub mod state;


// ============================================================================
// Re-exports
// ============================================================================

pub use browser::MediaBrowser;
pub use builder::MediaBrowserBuilder;
pub use event::ChildrenEvent;
pub use state::ConnectionState;
