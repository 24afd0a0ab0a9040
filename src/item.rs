//! Media items returned by the provider.
//!
//! A [`MediaItem`] pairs a [`MediaDescription`] with [`MediaItemFlags`]
//! telling the application whether the item can be browsed into, played,
//! or both.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::options::BrowseOptions;

// ============================================================================
// MediaItemFlags
// ============================================================================

/// Capability flags of a media item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaItemFlags(u32);

impl MediaItemFlags {
    /// No capabilities.
    pub const NONE: Self = Self(0);

    /// The item has children of its own that can be browsed.
    pub const BROWSABLE: Self = Self(1 << 0);

    /// The item can be played directly.
    pub const PLAYABLE: Self = Self(1 << 1);

    /// Creates flags from raw bits, dropping unknown ones.
    #[inline]
    #[must_use]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & (Self::BROWSABLE.0 | Self::PLAYABLE.0))
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every flag in `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MediaItemFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for MediaItemFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ============================================================================
// MediaDescription
// ============================================================================

/// Display metadata for a media item.
///
/// Only `media_id` is required; everything else is optional and opaque to
/// the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDescription {
    media_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    media_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extras: Option<BrowseOptions>,
}

impl MediaDescription {
    /// Creates a description with only a media id.
    ///
    /// The id is validated when the description is wrapped in a
    /// [`MediaItem`].
    #[must_use]
    pub fn new(media_id: impl Into<String>) -> Self {
        Self {
            media_id: media_id.into(),
            title: None,
            subtitle: None,
            description: None,
            icon_uri: None,
            media_uri: None,
            extras: None,
        }
    }

    /// Sets the title.
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the subtitle.
    #[inline]
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Sets the long description.
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the icon URI.
    #[inline]
    #[must_use]
    pub fn with_icon_uri(mut self, uri: impl Into<String>) -> Self {
        self.icon_uri = Some(uri.into());
        self
    }

    /// Sets the playable media URI.
    #[inline]
    #[must_use]
    pub fn with_media_uri(mut self, uri: impl Into<String>) -> Self {
        self.media_uri = Some(uri.into());
        self
    }

    /// Sets provider-specific extras.
    #[inline]
    #[must_use]
    pub fn with_extras(mut self, extras: BrowseOptions) -> Self {
        self.extras = Some(extras);
        self
    }

    /// Returns the media id.
    #[inline]
    #[must_use]
    pub fn media_id(&self) -> &str {
        &self.media_id
    }

    /// Returns the title.
    #[inline]
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the subtitle.
    #[inline]
    #[must_use]
    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    /// Returns the long description.
    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the icon URI.
    #[inline]
    #[must_use]
    pub fn icon_uri(&self) -> Option<&str> {
        self.icon_uri.as_deref()
    }

    /// Returns the media URI.
    #[inline]
    #[must_use]
    pub fn media_uri(&self) -> Option<&str> {
        self.media_uri.as_deref()
    }

    /// Returns provider-specific extras.
    #[inline]
    #[must_use]
    pub fn extras(&self) -> Option<&BrowseOptions> {
        self.extras.as_ref()
    }
}

impl fmt::Display for MediaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{title} ({})", self.media_id),
            None => f.write_str(&self.media_id),
        }
    }
}

// ============================================================================
// MediaItem
// ============================================================================

/// A single entry in the provider's content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMediaItem")]
pub struct MediaItem {
    description: MediaDescription,
    flags: MediaItemFlags,
}

impl MediaItem {
    /// Creates a media item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the description has an empty
    /// media id.
    pub fn new(description: MediaDescription, flags: MediaItemFlags) -> Result<Self> {
        if description.media_id.is_empty() {
            return Err(Error::invalid_argument(
                "description must have a non-empty media id",
            ));
        }
        Ok(Self { description, flags })
    }

    /// Returns the flags.
    #[inline]
    #[must_use]
    pub fn flags(&self) -> MediaItemFlags {
        self.flags
    }

    /// Returns `true` if the item has browsable children.
    #[inline]
    #[must_use]
    pub fn is_browsable(&self) -> bool {
        self.flags.contains(MediaItemFlags::BROWSABLE)
    }

    /// Returns `true` if the item can be played.
    #[inline]
    #[must_use]
    pub fn is_playable(&self) -> bool {
        self.flags.contains(MediaItemFlags::PLAYABLE)
    }

    /// Returns the description.
    #[inline]
    #[must_use]
    pub fn description(&self) -> &MediaDescription {
        &self.description
    }

    /// Returns the media id.
    #[inline]
    #[must_use]
    pub fn media_id(&self) -> &str {
        &self.description.media_id
    }
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MediaItem{{flags={}, description={}}}",
            self.flags.bits(),
            self.description
        )
    }
}

/// Unvalidated wire shape, checked on the way in.
#[derive(Deserialize)]
struct RawMediaItem {
    description: MediaDescription,
    #[serde(default)]
    flags: MediaItemFlags,
}

impl TryFrom<RawMediaItem> for MediaItem {
    type Error = Error;

    fn try_from(raw: RawMediaItem) -> Result<Self> {
        Self::new(raw.description, raw.flags)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_empty_media_id_rejected() {
        let err = MediaItem::new(MediaDescription::new(""), MediaItemFlags::PLAYABLE)
            .expect_err("empty id");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_flags_combine_independently() {
        let both = MediaItemFlags::BROWSABLE | MediaItemFlags::PLAYABLE;
        let item = MediaItem::new(MediaDescription::new("album:1"), both).expect("item");
        assert!(item.is_browsable());
        assert!(item.is_playable());

        let playable =
            MediaItem::new(MediaDescription::new("track:1"), MediaItemFlags::PLAYABLE)
                .expect("item");
        assert!(!playable.is_browsable());
        assert!(playable.is_playable());

        let neither =
            MediaItem::new(MediaDescription::new("header"), MediaItemFlags::NONE).expect("item");
        assert!(!neither.is_browsable());
        assert!(!neither.is_playable());
    }

    #[test]
    fn test_from_bits_truncate_drops_unknown_bits() {
        let flags = MediaItemFlags::from_bits_truncate(0b111);
        assert_eq!(flags.bits(), 0b11);
    }

    #[test]
    fn test_display() {
        let item = MediaItem::new(
            MediaDescription::new("track:7").with_title("Blue in Green"),
            MediaItemFlags::PLAYABLE,
        )
        .expect("item");
        assert_eq!(
            item.to_string(),
            "MediaItem{flags=2, description=Blue in Green (track:7)}"
        );
    }

    #[test]
    fn test_deserialize_validates_media_id() {
        let ok: MediaItem = serde_json::from_value(json!({
            "description": { "mediaId": "album:9", "title": "Kind of Blue" },
            "flags": 1
        }))
        .expect("valid item");
        assert_eq!(ok.media_id(), "album:9");
        assert_eq!(ok.description().title(), Some("Kind of Blue"));
        assert!(ok.is_browsable());

        let bad = serde_json::from_value::<MediaItem>(json!({
            "description": { "mediaId": "" },
            "flags": 2
        }));
        assert!(bad.is_err());
    }
}
