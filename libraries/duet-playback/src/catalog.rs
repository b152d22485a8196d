//! Immutable track catalog
//!
//! The catalog is built once from static configuration and shared read-only
//! by every component. Cloning is cheap (reference counted).

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque resource locator (file path, URL, asset key...)
///
/// The engine never interprets it; only the platform's media channel does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MediaRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Display title
    pub title: String,

    /// Audio resource loaded into a channel
    pub audio_ref: MediaRef,

    /// Cover art resource, passed through to observers
    pub cover_ref: MediaRef,
}

impl TrackDescriptor {
    pub fn new(
        title: impl Into<String>,
        audio_ref: impl Into<MediaRef>,
        cover_ref: impl Into<MediaRef>,
    ) -> Self {
        Self {
            title: title.into(),
            audio_ref: audio_ref.into(),
            cover_ref: cover_ref.into(),
        }
    }
}

/// Fixed, ordered list of tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    tracks: Arc<[TrackDescriptor]>,
}

impl Catalog {
    /// Build a catalog
    ///
    /// # Errors
    /// `EmptyCatalog` if `tracks` is empty: an engine needs something to
    /// load into its active channel.
    pub fn new(tracks: Vec<TrackDescriptor>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(PlaybackError::EmptyCatalog);
        }

        Ok(Self {
            tracks: tracks.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false for a constructed catalog; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackDescriptor> {
        self.tracks.get(index)
    }

    /// Track at `index`
    ///
    /// # Panics
    /// If `index` is out of range. Engine indices always come from the
    /// selector, which stays in range.
    pub fn track(&self, index: usize) -> &TrackDescriptor {
        &self.tracks[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.tracks.iter()
    }

    /// 1-based "3 / 12" position label
    pub fn position_label(&self, index: usize) -> String {
        format!("{} / {}", index + 1, self.len())
    }
}
