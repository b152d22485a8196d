//! Core types for the playback engine

use crate::progress::auto_advance_lead;
use crate::selector::Direction;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Global playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Never started since construction
    Stopped,

    /// Active channel is audible
    Playing,

    /// Paused by the user (or by a blocked resume)
    Paused,
}

/// What asked for a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionTrigger {
    /// User skip
    Manual,

    /// Near end of track, or the `Ended` safety net
    AutoAdvance,

    /// Engine skipping past a track that failed to load
    Recovery,
}

/// A resolved transition, created per request and consumed immediately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub direction: Direction,
    pub target_index: usize,
    pub trigger: TransitionTrigger,
}

/// Crossfade scheduler phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionPhase {
    /// No transition running
    Idle,

    /// Standby loading the target, waiting for ready
    Preloading,

    /// Volumes interpolating between channels
    FadingVolumes,

    /// Roles exchanged, transition complete
    Swapped,
}

/// How a transition completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionMode {
    /// Full volume interpolation
    Crossfade,

    /// Direct cut on the active channel (fade could not proceed)
    HardSwitch,

    /// Swapped in while paused, nothing started
    Cue,
}

/// Engine state shared by the state machine and the scheduler
///
/// `transition_in_flight` is true from the moment the standby channel starts
/// preloading until the swap (or hard switch) completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub current_index: usize,
    pub status: PlaybackStatus,
    pub shuffle_enabled: bool,
    pub is_seeking: bool,
    pub transition_in_flight: bool,
}

impl PlayerState {
    pub fn new(start_index: usize, shuffle_enabled: bool) -> Self {
        Self {
            current_index: start_index,
            status: PlaybackStatus::Stopped,
            shuffle_enabled,
            is_seeking: false,
            transition_in_flight: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}

/// Configuration for the playback engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Crossfade length in milliseconds (default: 1500)
    pub crossfade_ms: u32,

    /// Longest wait for the standby channel to become ready before falling
    /// back to a hard switch (default: 5000, `None` waits forever)
    pub ready_timeout_ms: Option<u32>,

    /// Initial shuffle state (default: off)
    pub shuffle: bool,

    /// Catalog index loaded at construction (default: 0)
    pub start_index: usize,

    /// Upper bound on how early before the end of a track auto-advance
    /// fires; the lead is `min(crossfade, cap)` (default: 2000)
    pub auto_advance_lead_cap_ms: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            crossfade_ms: 1500,
            ready_timeout_ms: Some(5000),
            shuffle: false,
            start_index: 0,
            auto_advance_lead_cap_ms: 2000,
        }
    }
}

impl PlaybackConfig {
    pub fn crossfade_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.crossfade_ms))
    }

    pub fn ready_timeout(&self) -> Option<Duration> {
        self.ready_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms)))
    }

    pub fn auto_advance_lead(&self) -> Duration {
        auto_advance_lead(
            self.crossfade_duration(),
            Duration::from_millis(u64::from(self.auto_advance_lead_cap_ms)),
        )
    }
}
