//! Application callback interfaces.
//!
//! Every method has an empty default so applications implement only what
//! they care about. All callbacks run on the browser's event loop, one at a
//! time, and may call back into the browser.
//!
//! | Trait | Events |
//! |-------|--------|
//! | [`ConnectionCallback`] | connected, suspended, failed |
//! | [`SubscriptionCallback`] | children loaded, error (with and without options) |
//! | [`ItemCallback`] | item loaded, error |

// ============================================================================
// Imports
// ============================================================================

use crate::item::MediaItem;
use crate::options::BrowseOptions;

// ============================================================================
// ConnectionCallback
// ============================================================================

/// Receives connection lifecycle notifications.
pub trait ConnectionCallback: Send + Sync {
    /// The browser connected and subscriptions have been re-registered.
    fn on_connected(&self) {}

    /// The provider went away unexpectedly.
    ///
    /// Subscriptions are kept. Call `connect()` again to resume.
    fn on_connection_suspended(&self) {}

    /// The connection attempt was refused or could not be established.
    fn on_connection_failed(&self) {}
}

// ============================================================================
// SubscriptionCallback
// ============================================================================

/// Receives children of a subscribed node.
///
/// Subscriptions registered without options receive the two-argument forms;
/// subscriptions registered with options receive the `_with_options` forms.
pub trait SubscriptionCallback: Send + Sync {
    /// Children of `parent_id` were loaded or changed.
    fn on_children_loaded(&self, parent_id: &str, children: &[MediaItem]) {
        let _ = (parent_id, children);
    }

    /// Children of `parent_id` were loaded for a subscription with options.
    fn on_children_loaded_with_options(
        &self,
        parent_id: &str,
        children: &[MediaItem],
        options: &BrowseOptions,
    ) {
        let _ = (parent_id, children, options);
    }

    /// Loading children of `parent_id` failed.
    ///
    /// The subscription stays registered; the provider may recover.
    fn on_error(&self, parent_id: &str) {
        let _ = parent_id;
    }

    /// Loading children failed for a subscription with options.
    fn on_error_with_options(&self, parent_id: &str, options: &BrowseOptions) {
        let _ = (parent_id, options);
    }
}

// ============================================================================
// ItemCallback
// ============================================================================

/// Receives the result of a single item lookup.
pub trait ItemCallback: Send + Sync {
    /// The item was found.
    fn on_item_loaded(&self, item: MediaItem) {
        let _ = item;
    }

    /// The item could not be loaded.
    fn on_error(&self, media_id: &str) {
        let _ = media_id;
    }
}
