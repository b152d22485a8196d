//! Playback events
//!
//! Everything observers (UI, logging, remote control) need is pushed to an
//! event queue that the host drains after each call into the engine:
//! - Snapshots of the "now playing" view on every meaningful change
//! - Transition lifecycle (started, phase changes, completed)
//! - Recoverable failures (blocked playback, load failures, fade aborts)

use crate::catalog::MediaRef;
use crate::types::{PlaybackStatus, TransitionMode, TransitionPhase, TransitionTrigger};
use serde::{Deserialize, Serialize};

/// Observable "now playing" view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub track_index: usize,
    pub title: String,
    pub cover_ref: MediaRef,
    pub is_playing: bool,
    pub progress_ratio: f32,
    pub elapsed_label: String,
    pub duration_label: String,
}

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// "Now playing" view changed (track, play state, progress, seek)
    Snapshot(PlayerSnapshot),

    /// Play/pause state changed
    StatusChanged { status: PlaybackStatus },

    /// A transition was accepted
    TransitionStarted {
        from_index: usize,
        to_index: usize,
        trigger: TransitionTrigger,
    },

    /// Crossfade scheduler moved to a new phase
    PhaseChanged { phase: TransitionPhase },

    /// A transition finished and `index` is now playing
    TransitionCompleted { index: usize, mode: TransitionMode },

    /// The platform refused to start playback
    PlaybackBlocked { reason: String },

    /// A track failed to load
    LoadFailed { index: usize, reason: String },

    /// A crossfade could not proceed and fell back to a hard switch
    FadeAborted { reason: String },

    /// Every track failed to load in a row; the engine gave up and paused
    CatalogUnplayable,

    /// Shuffle was toggled
    ShuffleChanged { enabled: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_cover_ref_as_string() {
        let snapshot = PlayerSnapshot {
            track_index: 0,
            title: "Neon Skyline".to_string(),
            cover_ref: MediaRef::new("image1.jpg"),
            is_playing: false,
            progress_ratio: 0.0,
            elapsed_label: "0:00".to_string(),
            duration_label: "0:00".to_string(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["cover_ref"], "image1.jpg");
        assert_eq!(json["track_index"], 0);
    }
}
