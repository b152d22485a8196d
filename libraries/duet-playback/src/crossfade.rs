//! Crossfade scheduler
//!
//! Moves the player from one track to another using the two channels:
//!
//! ```text
//! Idle → Preloading → FadingVolumes → Swapped → Idle
//!             │
//!             └── play refused / ready timeout → hard switch → Idle
//! ```
//!
//! The interpolation is linear on purpose: `standby = k`,
//! `active = (1 - k) * start_volume_active`, with `k = elapsed / duration`.
//! The active channel's starting volume is captured rather than assumed to
//! be 1, so a fade can begin while the previous one was still fading in.
//!
//! Timestamps are host frame times (monotonic, arbitrary origin). A fade
//! starts at the time the standby began playing when the host supplies one,
//! otherwise on the next frame. The ready timeout counts from the first frame
//! after preloading begins.

use crate::catalog::Catalog;
use crate::channel::{ChannelPair, MediaChannel};
use crate::error::{PlaybackError, Result};
use crate::types::{PlayerState, TransitionMode, TransitionPhase, TransitionRequest};
use std::time::Duration;
use tracing::{debug, warn};

/// Crossfade settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossfadeSettings {
    /// Length of the volume interpolation
    pub duration: Duration,

    /// Longest wait for the standby channel to become ready
    pub ready_timeout: Option<Duration>,
}

impl Default for CrossfadeSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(1500),
            ready_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Linear crossfade gains at progress `k`
///
/// Returns `(standby, active)`.
#[inline]
pub fn fade_gains(k: f32, start_volume_active: f32) -> (f32, f32) {
    let k = k.clamp(0.0, 1.0);
    (k, (1.0 - k) * start_volume_active)
}

/// Progress `elapsed / duration` clamped to [0, 1]; a zero duration is complete
#[inline]
pub fn fade_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
}

/// A finished transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub request: TransitionRequest,
    pub mode: TransitionMode,
}

/// What happened when the standby reported ready
#[derive(Debug, Clone, PartialEq)]
pub enum ReadyOutcome {
    /// No transition was waiting on the standby (stale signal)
    Ignored,

    /// Standby started, interpolation is under way
    FadeStarted,

    /// Engine was not playing; standby swapped in without starting
    Cued(Completion),

    /// Standby refused to play; the target was cut in on the active channel
    HardSwitched {
        completion: Completion,
        error: PlaybackError,
    },
}

/// What happened on a frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Nothing to drive
    Idle,

    /// Still waiting for the standby to become ready
    Waiting,

    /// Interpolation step applied at progress `k`
    Faded { k: f32 },

    /// Interpolation reached 1 and the channels swapped
    Swapped(Completion),

    /// Standby never became ready; fell back to a hard switch
    TimedOut(Completion),
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Idle,
    Preloading {
        request: TransitionRequest,
        started_at: Option<Duration>,
    },
    Fading {
        request: TransitionRequest,
        started_at: Option<Duration>,
        start_volume_active: f32,
    },
}

/// Drives one transition at a time over a channel pair
#[derive(Debug)]
pub struct CrossfadeScheduler {
    settings: CrossfadeSettings,
    stage: Stage,
}

impl CrossfadeScheduler {
    pub fn new(settings: CrossfadeSettings) -> Self {
        Self {
            settings,
            stage: Stage::Idle,
        }
    }

    pub fn settings(&self) -> &CrossfadeSettings {
        &self.settings
    }

    pub fn phase(&self) -> TransitionPhase {
        match self.stage {
            Stage::Idle => TransitionPhase::Idle,
            Stage::Preloading { .. } => TransitionPhase::Preloading,
            Stage::Fading { .. } => TransitionPhase::FadingVolumes,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.stage, Stage::Idle)
    }

    /// Request being served, if any
    pub fn current_request(&self) -> Option<TransitionRequest> {
        match self.stage {
            Stage::Idle => None,
            Stage::Preloading { request, .. } | Stage::Fading { request, .. } => Some(request),
        }
    }

    /// Whether the scheduler needs frame ticks
    ///
    /// Preloading only needs them to enforce the ready timeout.
    pub fn wants_frames(&self) -> bool {
        match self.stage {
            Stage::Idle => false,
            Stage::Preloading { .. } => self.settings.ready_timeout.is_some(),
            Stage::Fading { .. } => true,
        }
    }

    /// Start a transition: silence the standby and load the target into it
    ///
    /// # Errors
    /// `TransitionInFlight` if a transition is already running.
    pub fn begin<M: MediaChannel>(
        &mut self,
        request: TransitionRequest,
        channels: &mut ChannelPair<M>,
        catalog: &Catalog,
        state: &mut PlayerState,
    ) -> Result<()> {
        if self.is_active() || state.transition_in_flight {
            return Err(PlaybackError::TransitionInFlight);
        }
        let track = catalog
            .get(request.target_index)
            .ok_or_else(|| PlaybackError::LoadFailure {
                index: request.target_index,
                reason: "index outside catalog".to_string(),
            })?;

        state.transition_in_flight = true;
        let standby = channels.standby_id();
        channels.set_volume(standby, 0.0);
        channels.load_track(standby, track);

        debug!(
            target_index = request.target_index,
            trigger = ?request.trigger,
            channel = ?standby,
            "Preloading standby channel"
        );
        self.stage = Stage::Preloading {
            request,
            started_at: None,
        };
        Ok(())
    }

    /// Standby channel reported ready at host time `now`, if known
    pub fn on_ready<M: MediaChannel>(
        &mut self,
        now: Option<Duration>,
        channels: &mut ChannelPair<M>,
        catalog: &Catalog,
        state: &mut PlayerState,
    ) -> ReadyOutcome {
        let Stage::Preloading { request, .. } = self.stage else {
            return ReadyOutcome::Ignored;
        };

        if !state.is_playing() {
            debug!(target_index = request.target_index, "Cueing target while paused");
            let completion = self.swap(request, TransitionMode::Cue, channels, state);
            return ReadyOutcome::Cued(completion);
        }

        match channels.standby_mut().play() {
            Ok(()) => {
                let start_volume_active = channels.active().volume();
                debug!(
                    target_index = request.target_index,
                    start_volume_active, "Standby playing, starting crossfade"
                );
                self.stage = Stage::Fading {
                    request,
                    started_at: now,
                    start_volume_active,
                };
                ReadyOutcome::FadeStarted
            }
            Err(error) => {
                warn!(
                    target_index = request.target_index,
                    %error,
                    "Standby refused to play, hard switching"
                );
                let completion = self.hard_switch(request, channels, catalog, state);
                ReadyOutcome::HardSwitched {
                    completion,
                    error: PlaybackError::FadeAbort(error.to_string()),
                }
            }
        }
    }

    /// Advance the transition to frame time `now`
    pub fn on_frame<M: MediaChannel>(
        &mut self,
        now: Duration,
        channels: &mut ChannelPair<M>,
        catalog: &Catalog,
        state: &mut PlayerState,
    ) -> FrameOutcome {
        match self.stage {
            Stage::Idle => FrameOutcome::Idle,

            Stage::Preloading {
                request,
                started_at,
            } => {
                let started_at = started_at.unwrap_or(now);
                self.stage = Stage::Preloading {
                    request,
                    started_at: Some(started_at),
                };

                match self.settings.ready_timeout {
                    Some(timeout) if now.saturating_sub(started_at) >= timeout => {
                        warn!(
                            target_index = request.target_index,
                            timeout_ms = timeout.as_millis() as u64,
                            "Standby never became ready, hard switching"
                        );
                        FrameOutcome::TimedOut(self.hard_switch(request, channels, catalog, state))
                    }
                    _ => FrameOutcome::Waiting,
                }
            }

            Stage::Fading {
                request,
                started_at,
                start_volume_active,
            } => {
                let started_at = started_at.unwrap_or(now);
                let k = fade_progress(now.saturating_sub(started_at), self.settings.duration);

                let (standby_gain, active_gain) = fade_gains(k, start_volume_active);
                let standby = channels.standby_id();
                let active = channels.active_id();
                channels.set_volume(standby, standby_gain);
                channels.set_volume(active, active_gain);

                if k >= 1.0 {
                    FrameOutcome::Swapped(self.swap(
                        request,
                        TransitionMode::Crossfade,
                        channels,
                        state,
                    ))
                } else {
                    self.stage = Stage::Fading {
                        request,
                        started_at: Some(started_at),
                        start_volume_active,
                    };
                    FrameOutcome::Faded { k }
                }
            }
        }
    }

    /// Jump a running fade straight to its end
    ///
    /// Used when playback is paused mid-fade. Returns `None` unless fading.
    pub fn finish_now<M: MediaChannel>(
        &mut self,
        channels: &mut ChannelPair<M>,
        state: &mut PlayerState,
    ) -> Option<Completion> {
        let Stage::Fading { request, .. } = self.stage else {
            return None;
        };
        Some(self.swap(request, TransitionMode::Crossfade, channels, state))
    }

    /// Abandon the running transition before its swap
    ///
    /// The standby is left silent and paused. A fade in progress gives the
    /// active channel back the volume it had when the fade began. Returns the
    /// abandoned request.
    pub fn abort<M: MediaChannel>(
        &mut self,
        channels: &mut ChannelPair<M>,
        state: &mut PlayerState,
    ) -> Option<TransitionRequest> {
        let request = match self.stage {
            Stage::Idle => return None,
            Stage::Preloading { request, .. } => request,
            Stage::Fading {
                request,
                start_volume_active,
                ..
            } => {
                let active = channels.active_id();
                channels.set_volume(active, start_volume_active);
                request
            }
        };

        let standby = channels.standby_id();
        channels.standby_mut().pause();
        channels.set_volume(standby, 0.0);
        state.transition_in_flight = false;
        self.stage = Stage::Idle;
        Some(request)
    }

    /// Role swap at the end of a fade (or a cue)
    fn swap<M: MediaChannel>(
        &mut self,
        request: TransitionRequest,
        mode: TransitionMode,
        channels: &mut ChannelPair<M>,
        state: &mut PlayerState,
    ) -> Completion {
        let old_active = channels.active_id();
        let incoming = channels.standby_id();

        channels.channel_mut(old_active).pause();
        // Ready for its next turn as a standby
        channels.set_volume(old_active, 1.0);
        channels.set_volume(incoming, 1.0);
        channels.swap_roles();

        state.current_index = request.target_index;
        state.transition_in_flight = false;
        self.stage = Stage::Idle;

        debug!(index = request.target_index, ?mode, active = ?incoming, "Channels swapped");
        Completion { request, mode }
    }

    /// Cut to the target on the active channel without interpolation
    fn hard_switch<M: MediaChannel>(
        &mut self,
        request: TransitionRequest,
        channels: &mut ChannelPair<M>,
        catalog: &Catalog,
        state: &mut PlayerState,
    ) -> Completion {
        channels.active_mut().pause();
        channels.standby_mut().pause();

        let active = channels.active_id();
        if let Some(track) = catalog.get(request.target_index) {
            channels.load_track(active, track);
        }
        channels.set_volume(active, 1.0);

        state.current_index = request.target_index;
        state.transition_in_flight = false;
        self.stage = Stage::Idle;

        Completion {
            request,
            mode: TransitionMode::HardSwitch,
        }
    }
}
