//! Client-side subscription registry.
//!
//! Subscriptions are the application's durable intent: they survive
//! disconnects and are replayed to the provider after every successful
//! connect.
//!
//! # Layout
//!
//! ```text
//! SubscriptionRegistry (node ids in registration order)
//! ├── "root"   → SubscriptionSet [(no options, cb1)]
//! └── "album"  → SubscriptionSet [(page=1, cb2), (page=2, cb3)]
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::callback::SubscriptionCallback;
use crate::options::{BrowseOptions, OptionsKey};

// ============================================================================
// Types
// ============================================================================

/// Shared handle to an application subscription callback.
pub type SharedSubscriptionCallback = Arc<dyn SubscriptionCallback>;

// ============================================================================
// SubscriptionSet
// ============================================================================

/// Callbacks registered for one node, keyed by options.
///
/// Holds at most one entry per distinct [`OptionsKey`], in insertion order.
#[derive(Default)]
pub struct SubscriptionSet {
    entries: Vec<(OptionsKey, SharedSubscriptionCallback)>,
}

impl SubscriptionSet {
    /// Creates an empty set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the set has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inserts an entry, replacing the callback in place if the key exists.
    ///
    /// Returns `true` if an existing entry was replaced.
    pub fn insert(&mut self, key: OptionsKey, callback: SharedSubscriptionCallback) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = callback;
            return true;
        }
        self.entries.push((key, callback));
        false
    }

    /// Removes the entry matching `options`, returning its key.
    pub fn remove(&mut self, options: Option<&BrowseOptions>) -> Option<OptionsKey> {
        let index = self.entries.iter().position(|(k, _)| k.matches(options))?;
        Some(self.entries.remove(index).0)
    }

    /// Returns the callback registered for `options`.
    #[must_use]
    pub fn callback(&self, options: Option<&BrowseOptions>) -> Option<&SharedSubscriptionCallback> {
        self.entry(options).map(|(_, cb)| cb)
    }

    /// Returns the stored key and callback matching `options`.
    #[must_use]
    pub fn entry(
        &self,
        options: Option<&BrowseOptions>,
    ) -> Option<&(OptionsKey, SharedSubscriptionCallback)> {
        self.entries.iter().find(|(k, _)| k.matches(options))
    }

    /// Iterates over the registered keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &OptionsKey> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl fmt::Debug for SubscriptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

// ============================================================================
// SubscriptionRegistry
// ============================================================================

/// Map of node id to [`SubscriptionSet`], iterated in registration order.
///
/// Never holds an empty set.
#[derive(Default)]
pub struct SubscriptionRegistry {
    /// Node ids in the order they were first subscribed.
    order: Vec<String>,
    /// Sets by node id.
    sets: FxHashMap<String, SubscriptionSet>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is subscribed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the number of subscribed nodes.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Returns the set for `node_id`.
    #[inline]
    #[must_use]
    pub fn get(&self, node_id: &str) -> Option<&SubscriptionSet> {
        self.sets.get(node_id)
    }

    /// Registers `callback` for `node_id` and `key`.
    ///
    /// Returns `true` if an existing callback was replaced.
    pub fn insert(
        &mut self,
        node_id: &str,
        key: OptionsKey,
        callback: SharedSubscriptionCallback,
    ) -> bool {
        if !self.sets.contains_key(node_id) {
            self.order.push(node_id.to_owned());
        }
        self.sets
            .entry(node_id.to_owned())
            .or_default()
            .insert(key, callback)
    }

    /// Removes the entry for `node_id` matching `options`.
    ///
    /// Drops the node entirely once its last entry is gone. Returns the
    /// removed key, or `None` if nothing matched.
    pub fn remove(&mut self, node_id: &str, options: Option<&BrowseOptions>) -> Option<OptionsKey> {
        let set = self.sets.get_mut(node_id)?;
        let removed = set.remove(options)?;

        if set.is_empty() {
            self.sets.remove(node_id);
            self.order.retain(|id| id != node_id);
        }

        Some(removed)
    }

    /// Returns the callback for `node_id` and `options`.
    #[must_use]
    pub fn callback(
        &self,
        node_id: &str,
        options: Option<&BrowseOptions>,
    ) -> Option<SharedSubscriptionCallback> {
        self.sets.get(node_id)?.callback(options).cloned()
    }

    /// Returns the stored key and callback for `node_id` and `options`.
    ///
    /// The key is the one registered by `subscribe`, which may differ from
    /// `options` in payload while still comparing equal.
    #[must_use]
    pub fn entry(
        &self,
        node_id: &str,
        options: Option<&BrowseOptions>,
    ) -> Option<(OptionsKey, SharedSubscriptionCallback)> {
        self.sets.get(node_id)?.entry(options).cloned()
    }

    /// Lists every `(node id, options)` pair to re-register, in node order
    /// then insertion order.
    #[must_use]
    pub fn replay_entries(&self) -> Vec<(String, Option<BrowseOptions>)> {
        self.order
            .iter()
            .filter_map(|id| self.sets.get(id).map(|set| (id, set)))
            .flat_map(|(id, set)| set.keys().map(move |k| (id.clone(), k.options().cloned())))
            .collect()
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.order
                    .iter()
                    .filter_map(|id| self.sets.get(id).map(|set| (id, set))),
            )
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::item::MediaItem;

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl SubscriptionCallback for Counting {
        fn on_children_loaded(&self, _parent_id: &str, _children: &[MediaItem]) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn page(n: i64) -> Option<BrowseOptions> {
        Some(BrowseOptions::new().with_page(n).with_page_size(10))
    }

    #[test]
    fn test_duplicate_key_replaces_in_place() {
        let mut set = SubscriptionSet::new();
        let first: SharedSubscriptionCallback = Arc::new(Counting::default());
        let second: SharedSubscriptionCallback = Arc::new(Counting::default());
        let other: SharedSubscriptionCallback = Arc::new(Counting::default());

        assert!(!set.insert(OptionsKey::new(page(1)), first));
        assert!(!set.insert(OptionsKey::new(page(2)), other));
        assert!(set.insert(OptionsKey::new(page(1)), Arc::clone(&second)));

        assert_eq!(set.len(), 2);
        let current = set.callback(page(1).as_ref()).expect("callback");
        assert!(Arc::ptr_eq(current, &second));

        let order: Vec<_> = set.keys().map(|k| k.options().and_then(|o| o.page())).collect();
        assert_eq!(order, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_absent_and_empty_share_entry() {
        let mut set = SubscriptionSet::new();
        set.insert(OptionsKey::new(None), Arc::new(Counting::default()));
        assert!(set.insert(
            OptionsKey::new(Some(BrowseOptions::new())),
            Arc::new(Counting::default())
        ));
        assert_eq!(set.len(), 1);
        assert!(set.callback(None).is_some());
    }

    #[test]
    fn test_entry_returns_registered_key() {
        let mut registry = SubscriptionRegistry::new();
        registry.insert("album", OptionsKey::new(None), Arc::new(Counting::default()));

        let (key, _) = registry
            .entry("album", Some(&BrowseOptions::new()))
            .expect("entry");
        assert!(key.options().is_none());
        assert!(registry.entry("album", page(1).as_ref()).is_none());
        assert!(registry.entry("missing", None).is_none());
    }

    #[test]
    fn test_remove_drops_empty_node() {
        let mut registry = SubscriptionRegistry::new();
        registry.insert("album", OptionsKey::new(page(1)), Arc::new(Counting::default()));
        registry.insert("album", OptionsKey::new(page(2)), Arc::new(Counting::default()));

        assert!(registry.remove("album", page(1).as_ref()).is_some());
        assert!(registry.get("album").is_some());

        assert!(registry.remove("album", page(2).as_ref()).is_some());
        assert!(registry.get("album").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut registry = SubscriptionRegistry::new();
        assert!(registry.remove("nothing", None).is_none());

        registry.insert("root", OptionsKey::new(None), Arc::new(Counting::default()));
        assert!(registry.remove("root", page(1).as_ref()).is_none());
        assert_eq!(registry.node_count(), 1);
    }

    #[test]
    fn test_replay_order() {
        let mut registry = SubscriptionRegistry::new();
        registry.insert("b", OptionsKey::new(None), Arc::new(Counting::default()));
        registry.insert("a", OptionsKey::new(page(2)), Arc::new(Counting::default()));
        registry.insert("a", OptionsKey::new(page(1)), Arc::new(Counting::default()));
        registry.insert("b", OptionsKey::new(None), Arc::new(Counting::default()));

        let replay = registry.replay_entries();
        assert_eq!(
            replay,
            vec![
                ("b".to_owned(), None),
                ("a".to_owned(), page(2)),
                ("a".to_owned(), page(1)),
            ]
        );
    }

    #[test]
    fn test_resubscribe_after_removal_moves_node_to_end() {
        let mut registry = SubscriptionRegistry::new();
        registry.insert("a", OptionsKey::new(None), Arc::new(Counting::default()));
        registry.insert("b", OptionsKey::new(None), Arc::new(Counting::default()));
        registry.remove("a", None);
        registry.insert("a", OptionsKey::new(None), Arc::new(Counting::default()));

        let ids: Vec<_> = registry.replay_entries().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["b".to_owned(), "a".to_owned()]);
    }
}
