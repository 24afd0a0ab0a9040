//! Subscription options and their comparison key.
//!
//! Options are an opaque map forwarded to the provider untouched. The
//! browser only needs to compare them, which [`OptionsKey`] does.
//!
//! # Example
//!
//! ```
//! use media_browser::{BrowseOptions, OptionsKey};
//!
//! let options = BrowseOptions::new().with_page(1).with_page_size(20);
//! assert_eq!(options.page(), Some(1));
//!
//! // No options and empty options describe the same subscription.
//! assert_eq!(OptionsKey::new(None), OptionsKey::new(Some(BrowseOptions::new())));
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Constants
// ============================================================================

/// Option key for the 1-based page number to load.
///
/// Forwarded to the provider as-is; the browser never validates it.
pub const EXTRA_PAGE: &str = "media_browser.extra.PAGE";

/// Option key for the number of items per page (at least 1).
pub const EXTRA_PAGE_SIZE: &str = "media_browser.extra.PAGE_SIZE";

// ============================================================================
// BrowseOptions
// ============================================================================

/// Opaque option payload attached to a subscription, root hints or extras.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrowseOptions(Map<String, Value>);

impl BrowseOptions {
    /// Creates an empty payload.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Returns `true` if the payload has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the value stored under `key`.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the underlying map.
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns the requested page, if one is set.
    #[inline]
    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.get(EXTRA_PAGE).and_then(Value::as_i64)
    }

    /// Returns the requested page size, if one is set.
    #[inline]
    #[must_use]
    pub fn page_size(&self) -> Option<i64> {
        self.get(EXTRA_PAGE_SIZE).and_then(Value::as_i64)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BrowseOptions {
    /// Adds an arbitrary entry.
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets the 1-based page number.
    #[inline]
    #[must_use]
    pub fn with_page(self, page: i64) -> Self {
        self.with(EXTRA_PAGE, page)
    }

    /// Sets the page size.
    #[inline]
    #[must_use]
    pub fn with_page_size(self, page_size: i64) -> Self {
        self.with(EXTRA_PAGE_SIZE, page_size)
    }
}

impl From<Map<String, Value>> for BrowseOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ============================================================================
// OptionsKey
// ============================================================================

/// Value-equality wrapper used to index subscriptions by their options.
///
/// Absent and empty payloads compare equal, so callers that never pass
/// options and callers that pass an empty payload share one registration.
/// The original payload is kept so replay forwards exactly what the
/// application registered.
#[derive(Debug, Clone, Default)]
pub struct OptionsKey {
    options: Option<BrowseOptions>,
}

impl OptionsKey {
    /// Wraps an options payload.
    #[inline]
    #[must_use]
    pub fn new(options: Option<BrowseOptions>) -> Self {
        Self { options }
    }

    /// Returns the payload as registered, including an empty one.
    #[inline]
    #[must_use]
    pub fn options(&self) -> Option<&BrowseOptions> {
        self.options.as_ref()
    }

    /// Returns `true` if the key carries no meaningful options.
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.options.as_ref().is_none_or(BrowseOptions::is_empty)
    }

    /// Compares against a borrowed payload without building a key.
    #[must_use]
    pub fn matches(&self, options: Option<&BrowseOptions>) -> bool {
        match (self.non_empty(), options.filter(|o| !o.is_empty())) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn non_empty(&self) -> Option<&BrowseOptions> {
        self.options.as_ref().filter(|o| !o.is_empty())
    }
}

impl PartialEq for OptionsKey {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other.options())
    }
}

impl Eq for OptionsKey {}

impl From<Option<BrowseOptions>> for OptionsKey {
    fn from(options: Option<BrowseOptions>) -> Self {
        Self::new(options)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_absent_equals_empty() {
        assert_eq!(OptionsKey::new(None), OptionsKey::new(Some(BrowseOptions::new())));
        assert!(OptionsKey::new(Some(BrowseOptions::new())).is_default());
    }

    #[test]
    fn test_present_differs_from_absent() {
        let paged = OptionsKey::new(Some(BrowseOptions::new().with_page(1)));
        assert_ne!(paged, OptionsKey::new(None));
        assert!(!paged.is_default());
    }

    #[test]
    fn test_deep_equality() {
        let a = BrowseOptions::new().with("filter", json!({ "genre": ["jazz", "soul"] }));
        let b = BrowseOptions::new().with("filter", json!({ "genre": ["jazz", "soul"] }));
        let c = BrowseOptions::new().with("filter", json!({ "genre": ["soul", "jazz"] }));

        assert_eq!(OptionsKey::new(Some(a.clone())), OptionsKey::new(Some(b)));
        assert_ne!(OptionsKey::new(Some(a)), OptionsKey::new(Some(c)));
    }

    #[test]
    fn test_key_keeps_original_payload() {
        let key = OptionsKey::new(Some(BrowseOptions::new()));
        assert_eq!(key.options(), Some(&BrowseOptions::new()));
        assert_eq!(OptionsKey::new(None).options(), None);
    }

    #[test]
    fn test_page_accessors() {
        let options = BrowseOptions::new().with_page(3).with_page_size(25);
        assert_eq!(options.page(), Some(3));
        assert_eq!(options.page_size(), Some(25));
        assert_eq!(options.len(), 2);
        assert_eq!(BrowseOptions::new().page(), None);
    }

    #[test]
    fn test_page_values_are_not_validated() {
        let options = BrowseOptions::new().with_page(0).with_page_size(-5);
        assert_eq!(options.page(), Some(0));
        assert_eq!(options.page_size(), Some(-5));
    }

    fn arb_options() -> impl Strategy<Value = Option<BrowseOptions>> {
        let entries = prop::collection::btree_map("[a-c]{1,2}", 0i64..4, 0..3);
        prop::option::of(entries.prop_map(|entries| {
            entries
                .into_iter()
                .fold(BrowseOptions::new(), |options, (k, v)| options.with(k, v))
        }))
    }

    proptest! {
        #[test]
        fn prop_equality_is_symmetric(a in arb_options(), b in arb_options()) {
            let ka = OptionsKey::new(a);
            let kb = OptionsKey::new(b);
            prop_assert_eq!(ka == kb, kb == ka);
        }

        #[test]
        fn prop_equality_is_reflexive(a in arb_options()) {
            let key = OptionsKey::new(a.clone());
            prop_assert_eq!(key.clone(), OptionsKey::new(a));
        }

        #[test]
        fn prop_default_keys_collapse(a in arb_options()) {
            let key = OptionsKey::new(a);
            prop_assert_eq!(key.is_default(), key == OptionsKey::new(None));
        }
    }
}
