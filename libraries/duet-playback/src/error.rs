//! Error types for the playback engine

use thiserror::Error;

/// Playback errors
///
/// None of these are fatal: the engine always leaves itself Paused or
/// Playing on some track after reporting one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// The platform refused to start playback (autoplay policy)
    ///
    /// A user gesture is required before trying again.
    #[error("Playback blocked: {0}")]
    PlaybackBlocked(String),

    /// A track's media could not be fetched or decoded
    #[error("Failed to load track {index}: {reason}")]
    LoadFailure { index: usize, reason: String },

    /// The standby channel failed to start during a crossfade
    ///
    /// Recovered internally with a hard switch.
    #[error("Crossfade aborted: {0}")]
    FadeAbort(String),

    /// A transition is already running on the channel pair
    #[error("A transition is already in flight")]
    TransitionInFlight,

    /// The catalog has no tracks
    #[error("Catalog is empty")]
    EmptyCatalog,

    /// Seek ratio was NaN or infinite
    #[error("Invalid seek ratio: {0}")]
    InvalidSeekRatio(f32),

    /// The active channel has not reported a duration yet
    #[error("Track duration is not known yet")]
    NoDuration,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
