//! Playback engine - core orchestration
//!
//! Owns the catalog, both channels, the selector, the crossfade scheduler and
//! the progress reporter, and funnels every mutation of [`PlayerState`]
//! through its methods. The engine never blocks and never spawns: a host
//! drives it with three kinds of input and drains events afterwards.
//!
//! - Commands: [`PlaybackEngine::toggle_play`], [`PlaybackEngine::skip`],
//!   [`PlaybackEngine::set_shuffle`], [`PlaybackEngine::seek_to`]...
//! - Channel signals: [`PlaybackEngine::handle_channel_event_at`], or
//!   [`PlaybackEngine::handle_channel_event`] for hosts without a clock
//! - Frame ticks: [`PlaybackEngine::on_frame`], while
//!   [`PlaybackEngine::wants_frame`] is true

use crate::{
    catalog::{Catalog, TrackDescriptor},
    channel::{ChannelEvent, ChannelId, ChannelPair, ChannelRole, MediaChannel},
    crossfade::{Completion, CrossfadeScheduler, CrossfadeSettings, FrameOutcome, ReadyOutcome},
    error::{PlaybackError, Result},
    events::{PlayerEvent, PlayerSnapshot},
    frame::{FrameHandle, FrameScheduler, FrameTask},
    progress::{format_time, ProgressReporter},
    selector::{Direction, TrackSelector},
    types::{
        PlaybackConfig, PlaybackStatus, PlayerState, TransitionMode, TransitionPhase,
        TransitionRequest, TransitionTrigger,
    },
};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Dual-channel crossfade playback engine
pub struct PlaybackEngine<M: MediaChannel> {
    catalog: Catalog,
    channels: ChannelPair<M>,
    selector: TrackSelector,
    scheduler: CrossfadeScheduler,
    progress: ProgressReporter,
    state: PlayerState,

    // Frame loops
    frames: FrameScheduler,
    fade_frame: Option<FrameHandle>,
    progress_frame: Option<FrameHandle>,

    // Gesture unlock already consumed
    unlocked: bool,

    // Start the active channel once it is ready (set after a hard switch)
    autoplay_on_ready: bool,

    // Load failures since a track last became audible
    consecutive_load_failures: usize,

    // Event queue for observers
    pending_events: Vec<PlayerEvent>,
}

impl<M: MediaChannel> PlaybackEngine<M> {
    /// Create an engine and load the start track into channel A
    ///
    /// An out-of-range `config.start_index` falls back to the first track.
    pub fn new(catalog: Catalog, channel_a: M, channel_b: M, config: &PlaybackConfig) -> Self {
        let start_index = if config.start_index < catalog.len() {
            config.start_index
        } else {
            warn!(
                start_index = config.start_index,
                len = catalog.len(),
                "Start index outside catalog, using first track"
            );
            0
        };

        let settings = CrossfadeSettings {
            duration: config.crossfade_duration(),
            ready_timeout: config.ready_timeout(),
        };

        let mut engine = Self {
            channels: ChannelPair::new(channel_a, channel_b),
            selector: TrackSelector::new(),
            scheduler: CrossfadeScheduler::new(settings),
            progress: ProgressReporter::new(config.auto_advance_lead()),
            state: PlayerState::new(start_index, config.shuffle),
            frames: FrameScheduler::new(),
            fade_frame: None,
            progress_frame: None,
            unlocked: false,
            autoplay_on_ready: false,
            consecutive_load_failures: 0,
            pending_events: Vec::new(),
            catalog,
        };

        let active = engine.channels.active_id();
        engine
            .channels
            .load_track(active, engine.catalog.track(start_index));
        engine.emit_snapshot();
        engine
    }

    /// Replace the track selector (seeded selectors make shuffle reproducible)
    pub fn with_selector(mut self, selector: TrackSelector) -> Self {
        self.selector = selector;
        self
    }

    // ===== Playback Control =====

    /// Gesture-unlock hook
    ///
    /// Primes both channels once at volume 0. Later calls do nothing.
    pub fn unlock(&mut self) {
        if self.unlocked {
            return;
        }
        self.unlocked = true;
        self.channels.prime();
        debug!("Media output unlocked");
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Play if paused or stopped, pause if playing
    ///
    /// # Errors
    /// `PlaybackBlocked` if the platform refuses to start. The engine stays
    /// Stopped/Paused and does not retry; a new user gesture is needed.
    pub fn toggle_play(&mut self) -> Result<()> {
        self.unlock();
        if self.state.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Start or resume the active channel
    pub fn play(&mut self) -> Result<()> {
        if self.state.is_playing() {
            return Ok(());
        }

        if let Err(error) = self.channels.active_mut().play() {
            warn!(%error, "Playback refused");
            self.emit(PlayerEvent::PlaybackBlocked {
                reason: error.to_string(),
            });
            return Err(error);
        }

        self.set_status(PlaybackStatus::Playing);
        self.start_progress_loop();
        self.emit_snapshot();
        Ok(())
    }

    /// Pause playback
    ///
    /// A crossfade in progress is completed on the spot so that the track
    /// coming in is the one left paused.
    pub fn pause(&mut self) {
        if !self.state.is_playing() {
            return;
        }

        if let Some(completion) = self.scheduler.finish_now(&mut self.channels, &mut self.state) {
            self.cancel_fade_loop();
            self.complete_transition(completion);
        }

        self.channels.active_mut().pause();
        self.autoplay_on_ready = false;
        self.set_status(PlaybackStatus::Paused);
        self.stop_progress_loop();
        self.emit_snapshot();
    }

    /// Manual skip
    ///
    /// Returns the target index.
    ///
    /// # Errors
    /// `TransitionInFlight` while another transition is running.
    pub fn skip(&mut self, direction: Direction) -> Result<usize> {
        self.request_transition(direction, TransitionTrigger::Manual)
    }

    /// Resolve a target and hand it to the crossfade scheduler
    ///
    /// Valid in any playback state. Overlapping requests are rejected rather
    /// than queued.
    pub fn request_transition(
        &mut self,
        direction: Direction,
        trigger: TransitionTrigger,
    ) -> Result<usize> {
        if self.state.transition_in_flight {
            debug!(?direction, ?trigger, "Transition rejected, one is in flight");
            return Err(PlaybackError::TransitionInFlight);
        }

        let target_index = self.selector.resolve_next(
            self.state.current_index,
            self.catalog.len(),
            direction,
            self.state.shuffle_enabled,
        );

        self.start_transition(TransitionRequest {
            direction,
            target_index,
            trigger,
        })
    }

    /// Enable or disable shuffle for future transitions
    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.state.shuffle_enabled == enabled {
            return;
        }
        self.state.shuffle_enabled = enabled;
        debug!(enabled, "Shuffle changed");
        self.emit(PlayerEvent::ShuffleChanged { enabled });
    }

    // ===== Seek =====

    /// User started dragging the seek control; progress broadcasts pause
    pub fn begin_seek(&mut self) {
        self.state.is_seeking = true;
    }

    /// Seek control moved while dragging
    ///
    /// Emits a snapshot showing the dragged position; the channel is not
    /// touched until [`PlaybackEngine::seek_to`].
    pub fn seek_preview(&mut self, ratio: f32) -> Result<()> {
        if !ratio.is_finite() {
            return Err(PlaybackError::InvalidSeekRatio(ratio));
        }
        self.state.is_seeking = true;

        let ratio = ratio.clamp(0.0, 1.0);
        let duration = self.channels.active().duration();
        let mut snapshot = self.snapshot();
        snapshot.progress_ratio = ratio;
        snapshot.elapsed_label = format_time(duration.map(|d| d.mul_f32(ratio)));
        self.emit(PlayerEvent::Snapshot(snapshot));
        Ok(())
    }

    /// Set the active channel's position to `ratio * duration`
    ///
    /// Ends any seek drag, even when the seek itself cannot be applied.
    ///
    /// # Errors
    /// `InvalidSeekRatio` for NaN/infinite ratios, `NoDuration` before the
    /// active channel knows its duration.
    pub fn seek_to(&mut self, ratio: f32) -> Result<()> {
        if !ratio.is_finite() {
            return Err(PlaybackError::InvalidSeekRatio(ratio));
        }
        self.state.is_seeking = false;

        let duration = self
            .channels
            .active()
            .duration()
            .ok_or(PlaybackError::NoDuration)?;
        let position = duration.mul_f32(ratio.clamp(0.0, 1.0));
        self.channels.active_mut().seek(position);
        debug!(position_ms = position.as_millis() as u64, "Seeked active channel");

        self.emit_snapshot();
        Ok(())
    }

    // ===== Host Input =====

    /// Deliver an asynchronous signal from a channel
    ///
    /// Without a timestamp a crossfade starting on this signal is timed from
    /// the next frame.
    pub fn handle_channel_event(&mut self, channel: ChannelId, event: ChannelEvent) {
        self.dispatch_channel_event(channel, event, None);
    }

    /// Deliver a channel signal received at host time `now`
    ///
    /// `now` is on the same clock as [`PlaybackEngine::on_frame`].
    pub fn handle_channel_event_at(
        &mut self,
        channel: ChannelId,
        event: ChannelEvent,
        now: Duration,
    ) {
        self.dispatch_channel_event(channel, event, Some(now));
    }

    fn dispatch_channel_event(
        &mut self,
        channel: ChannelId,
        event: ChannelEvent,
        now: Option<Duration>,
    ) {
        let role = self.channels.role_of(channel);
        trace!(?channel, ?role, ?event, "Channel event");

        match (event, role) {
            (ChannelEvent::Ready, ChannelRole::Standby) => self.on_standby_ready(now),
            (ChannelEvent::Ready, ChannelRole::Active) => self.on_active_ready(),
            (ChannelEvent::MetadataLoaded { .. }, ChannelRole::Active) => self.emit_snapshot(),
            (ChannelEvent::Ended, ChannelRole::Active) => self.on_active_ended(),
            (ChannelEvent::Error { message }, ChannelRole::Standby) => {
                self.on_standby_error(message);
            }
            (ChannelEvent::Error { message }, ChannelRole::Active) => {
                self.on_active_error(message);
            }
            (ChannelEvent::MetadataLoaded { .. } | ChannelEvent::Ended, ChannelRole::Standby) => {}
        }
    }

    /// Deliver a frame tick at host time `now`
    ///
    /// Every registration due on this tick fires once; loops that are still
    /// running register again for the next tick.
    pub fn on_frame(&mut self, now: Duration) {
        for (handle, task) in self.frames.take_due() {
            match task {
                FrameTask::Crossfade if self.fade_frame == Some(handle) => {
                    self.fade_frame = None;
                    self.crossfade_tick(now);
                }
                FrameTask::Progress if self.progress_frame == Some(handle) => {
                    self.progress_frame = None;
                    self.progress_tick();
                }
                _ => {}
            }
        }
    }

    /// Whether a loop is waiting for the next frame
    pub fn wants_frame(&self) -> bool {
        self.frames.has_pending()
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== State Queries =====

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    pub fn phase(&self) -> TransitionPhase {
        self.scheduler.phase()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn channels(&self) -> &ChannelPair<M> {
        &self.channels
    }

    /// Platform media behind channel `id`
    ///
    /// Roles, volumes and loads stay under the engine's control; this only
    /// reaches the platform object itself.
    pub fn media_mut(&mut self, id: ChannelId) -> &mut M {
        self.channels.channel_mut(id).media_mut()
    }

    pub fn current_track(&self) -> &TrackDescriptor {
        self.catalog.track(self.state.current_index)
    }

    pub fn crossfade_settings(&self) -> &CrossfadeSettings {
        self.scheduler.settings()
    }

    /// Current "now playing" view
    pub fn snapshot(&self) -> PlayerSnapshot {
        let track = self.current_track();
        let active = self.channels.active();
        let sample = self.progress.sample(active.position(), active.duration());

        PlayerSnapshot {
            track_index: self.state.current_index,
            title: track.title.clone(),
            cover_ref: track.cover_ref.clone(),
            is_playing: self.state.is_playing(),
            progress_ratio: sample.ratio,
            elapsed_label: sample.elapsed_label,
            duration_label: sample.duration_label,
        }
    }

    // ===== Transitions =====

    fn start_transition(&mut self, request: TransitionRequest) -> Result<usize> {
        self.unlock();
        let from_index = self.state.current_index;

        self.scheduler
            .begin(request, &mut self.channels, &self.catalog, &mut self.state)?;

        // Leaving this track: no auto-advance until the next one is active
        self.progress.disarm();
        self.autoplay_on_ready = false;

        info!(
            from_index,
            to_index = request.target_index,
            trigger = ?request.trigger,
            "Transition started"
        );
        self.emit(PlayerEvent::TransitionStarted {
            from_index,
            to_index: request.target_index,
            trigger: request.trigger,
        });
        self.emit(PlayerEvent::PhaseChanged {
            phase: TransitionPhase::Preloading,
        });

        if self.scheduler.wants_frames() {
            self.start_fade_loop();
        }
        Ok(request.target_index)
    }

    fn complete_transition(&mut self, completion: Completion) {
        let index = completion.request.target_index;

        if completion.mode != TransitionMode::HardSwitch {
            self.emit(PlayerEvent::PhaseChanged {
                phase: TransitionPhase::Swapped,
            });
        }
        self.progress.rearm();

        if completion.mode == TransitionMode::HardSwitch {
            // Target not loaded yet; the active Ready settles the count
            if self.state.is_playing() {
                self.autoplay_on_ready = true;
            }
        } else {
            self.consecutive_load_failures = 0;
        }

        info!(
            index,
            title = %self.catalog.track(index).title,
            mode = ?completion.mode,
            "Now playing"
        );
        self.emit(PlayerEvent::TransitionCompleted {
            index,
            mode: completion.mode,
        });
        self.emit(PlayerEvent::PhaseChanged {
            phase: TransitionPhase::Idle,
        });

        if self.state.is_playing() {
            self.start_progress_loop();
        }
        self.emit_snapshot();
    }

    fn on_standby_ready(&mut self, now: Option<Duration>) {
        if self.scheduler.phase() != TransitionPhase::Preloading {
            return;
        }

        match self
            .scheduler
            .on_ready(now, &mut self.channels, &self.catalog, &mut self.state)
        {
            ReadyOutcome::Ignored => {}
            ReadyOutcome::FadeStarted => {
                self.emit(PlayerEvent::PhaseChanged {
                    phase: TransitionPhase::FadingVolumes,
                });
                self.start_fade_loop();
            }
            ReadyOutcome::Cued(completion) => {
                self.cancel_fade_loop();
                self.complete_transition(completion);
            }
            ReadyOutcome::HardSwitched { completion, error } => {
                self.cancel_fade_loop();
                self.emit(PlayerEvent::FadeAborted {
                    reason: error.to_string(),
                });
                self.complete_transition(completion);
            }
        }
    }

    fn on_active_ready(&mut self) {
        self.consecutive_load_failures = 0;
        if !std::mem::take(&mut self.autoplay_on_ready) || !self.state.is_playing() {
            return;
        }

        if let Err(error) = self.channels.active_mut().play() {
            warn!(%error, "Playback refused after hard switch");
            self.emit(PlayerEvent::PlaybackBlocked {
                reason: error.to_string(),
            });
            self.set_status(PlaybackStatus::Paused);
            self.stop_progress_loop();
            self.emit_snapshot();
        }
    }

    /// Natural end of track: safety net for a missed auto-advance window
    fn on_active_ended(&mut self) {
        if self.state.transition_in_flight || !self.progress.is_armed() {
            return;
        }
        self.progress.disarm();
        debug!(index = self.state.current_index, "Track ended before auto-advance");
        if let Err(error) = self.request_transition(Direction::Next, TransitionTrigger::AutoAdvance)
        {
            warn!(%error, "Auto-advance after end of track failed");
        }
    }

    fn on_standby_error(&mut self, message: String) {
        let was_fading = self.scheduler.phase() == TransitionPhase::FadingVolumes;
        let Some(failed) = self.scheduler.abort(&mut self.channels, &mut self.state) else {
            // No transition: stale error from an earlier load
            return;
        };
        self.cancel_fade_loop();

        warn!(
            index = failed.target_index,
            reason = %message,
            was_fading,
            "Standby failed to load"
        );
        if was_fading {
            self.emit(PlayerEvent::FadeAborted {
                reason: message.clone(),
            });
        }
        self.emit(PlayerEvent::LoadFailed {
            index: failed.target_index,
            reason: message,
        });
        self.progress.rearm();
        self.recover_from_load_failure(failed.target_index, failed.direction);
    }

    fn on_active_error(&mut self, message: String) {
        let index = self.state.current_index;
        warn!(index, reason = %message, "Active track failed to load");
        self.emit(PlayerEvent::LoadFailed {
            index,
            reason: message,
        });

        if self.state.transition_in_flight {
            // Already on the way out
            return;
        }
        self.autoplay_on_ready = false;
        self.recover_from_load_failure(index, Direction::Next);
    }

    /// Skip past a track that failed to load
    ///
    /// Gives up (and pauses) once every catalog entry has failed in a row.
    fn recover_from_load_failure(&mut self, failed_index: usize, direction: Direction) {
        self.consecutive_load_failures += 1;

        if self.consecutive_load_failures >= self.catalog.len() {
            warn!(
                failures = self.consecutive_load_failures,
                "Every track failed to load, giving up"
            );
            self.consecutive_load_failures = 0;
            if self.state.is_playing() {
                self.channels.active_mut().pause();
                self.set_status(PlaybackStatus::Paused);
                self.stop_progress_loop();
            }
            self.emit(PlayerEvent::CatalogUnplayable);
            self.emit_snapshot();
            return;
        }

        let target_index = self.selector.resolve_next(
            failed_index,
            self.catalog.len(),
            direction,
            self.state.shuffle_enabled,
        );
        let request = TransitionRequest {
            direction,
            target_index,
            trigger: TransitionTrigger::Recovery,
        };
        if let Err(error) = self.start_transition(request) {
            warn!(%error, "Could not start recovery transition");
        }
    }

    // ===== Frame Loops =====

    fn crossfade_tick(&mut self, now: Duration) {
        match self
            .scheduler
            .on_frame(now, &mut self.channels, &self.catalog, &mut self.state)
        {
            FrameOutcome::Idle => {}
            FrameOutcome::Waiting | FrameOutcome::Faded { .. } => {
                if self.scheduler.wants_frames() {
                    self.start_fade_loop();
                }
            }
            FrameOutcome::Swapped(completion) => self.complete_transition(completion),
            FrameOutcome::TimedOut(completion) => {
                self.emit(PlayerEvent::FadeAborted {
                    reason: "standby channel never became ready".to_string(),
                });
                self.complete_transition(completion);
            }
        }
    }

    fn progress_tick(&mut self) {
        if !self.state.is_playing() {
            return;
        }

        if !self.state.is_seeking {
            self.emit_snapshot();
        }

        let active = self.channels.active();
        let (position, duration) = (active.position(), active.duration());
        if !self.state.transition_in_flight && self.progress.check_auto_advance(position, duration) {
            debug!(
                index = self.state.current_index,
                position_ms = position.as_millis() as u64,
                "Auto-advance window reached"
            );
            if let Err(error) =
                self.request_transition(Direction::Next, TransitionTrigger::AutoAdvance)
            {
                warn!(%error, "Auto-advance failed");
            }
        }

        self.start_progress_loop();
    }

    fn start_fade_loop(&mut self) {
        if self.fade_frame.is_none() {
            self.fade_frame = Some(self.frames.request(FrameTask::Crossfade));
        }
    }

    fn cancel_fade_loop(&mut self) {
        if let Some(handle) = self.fade_frame.take() {
            self.frames.cancel(handle);
        }
    }

    fn start_progress_loop(&mut self) {
        if self.progress_frame.is_none() {
            self.progress_frame = Some(self.frames.request(FrameTask::Progress));
        }
    }

    fn stop_progress_loop(&mut self) {
        if let Some(handle) = self.progress_frame.take() {
            self.frames.cancel(handle);
        }
    }

    // ===== Events =====

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.state.status == status {
            return;
        }
        self.state.status = status;
        debug!(?status, "Playback status changed");
        self.emit(PlayerEvent::StatusChanged { status });
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }

    fn emit_snapshot(&mut self) {
        let snapshot = self.snapshot();
        self.emit(PlayerEvent::Snapshot(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChannel;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            TrackDescriptor::new("Neon Skyline", "song1.mp3", "image1.jpg"),
            TrackDescriptor::new("Velvet Static", "song2.mp3", "image2.jpg"),
            TrackDescriptor::new("Paper Comets", "song3.mp3", "image3.jpg"),
        ])
        .unwrap()
    }

    fn engine() -> PlaybackEngine<MockChannel> {
        PlaybackEngine::new(
            catalog(),
            MockChannel::new(),
            MockChannel::new(),
            &PlaybackConfig::default(),
        )
    }

    #[test]
    fn new_loads_start_track_into_channel_a() {
        let mut engine = engine();

        assert_eq!(engine.status(), PlaybackStatus::Stopped);
        assert_eq!(engine.channels().active_id(), ChannelId::A);
        let loaded = engine.channels().active().media().loaded.clone().unwrap();
        assert_eq!(loaded.as_str(), "song1.mp3");

        let events = engine.drain_events();
        let [PlayerEvent::Snapshot(snapshot)] = events.as_slice() else {
            panic!("expected a single snapshot, got {events:?}");
        };
        assert_eq!(snapshot.title, "Neon Skyline");
        assert_eq!(snapshot.cover_ref.as_str(), "image1.jpg");
        assert!(!snapshot.is_playing);
        assert_eq!(snapshot.elapsed_label, "0:00");
    }

    #[test]
    fn out_of_range_start_index_falls_back_to_first_track() {
        let config = PlaybackConfig {
            start_index: 9,
            ..PlaybackConfig::default()
        };
        let engine = PlaybackEngine::new(catalog(), MockChannel::new(), MockChannel::new(), &config);
        assert_eq!(engine.state().current_index, 0);
    }

    #[test]
    fn toggle_plays_then_pauses() {
        let mut engine = engine();

        engine.toggle_play().unwrap();
        assert_eq!(engine.status(), PlaybackStatus::Playing);
        assert!(!engine.channels().active().is_paused());
        assert!(engine.wants_frame());

        engine.toggle_play().unwrap();
        assert_eq!(engine.status(), PlaybackStatus::Paused);
        assert!(engine.channels().active().is_paused());
        assert!(!engine.wants_frame());
    }

    #[test]
    fn blocked_play_stays_stopped() {
        let mut engine = PlaybackEngine::new(
            catalog(),
            MockChannel::blocked("NotAllowedError"),
            MockChannel::new(),
            &PlaybackConfig::default(),
        );
        engine.drain_events();

        let result = engine.toggle_play();

        assert!(matches!(result, Err(PlaybackError::PlaybackBlocked(_))));
        assert_eq!(engine.status(), PlaybackStatus::Stopped);
        assert!(!engine.wants_frame());
        assert!(engine
            .drain_events()
            .iter()
            .any(|event| matches!(event, PlayerEvent::PlaybackBlocked { .. })));
    }

    #[test]
    fn unlock_primes_once() {
        let mut engine = engine();
        assert!(!engine.is_unlocked());

        engine.unlock();
        engine.unlock();
        engine.toggle_play().unwrap();

        assert!(engine.is_unlocked());
        assert_eq!(engine.channels().channel(ChannelId::A).media().prime_count, 1);
        assert_eq!(engine.channels().channel(ChannelId::B).media().prime_count, 1);
    }

    #[test]
    fn set_shuffle_emits_only_on_change() {
        let mut engine = engine();
        engine.drain_events();

        engine.set_shuffle(true);
        engine.set_shuffle(true);
        engine.set_shuffle(false);

        assert_eq!(
            engine.drain_events(),
            vec![
                PlayerEvent::ShuffleChanged { enabled: true },
                PlayerEvent::ShuffleChanged { enabled: false },
            ]
        );
    }

    #[test]
    fn seek_to_moves_active_channel() {
        let mut engine = engine();
        engine.media_mut(ChannelId::A).duration = Some(Duration::from_secs(200));

        engine.begin_seek();
        assert!(engine.state().is_seeking);
        engine.seek_to(0.25).unwrap();

        assert!(!engine.state().is_seeking);
        assert_eq!(engine.channels().active().position(), Duration::from_secs(50));
    }

    #[test]
    fn seek_ratio_is_clamped() {
        let mut engine = engine();
        engine.media_mut(ChannelId::A).duration = Some(Duration::from_secs(100));

        engine.seek_to(1.5).unwrap();
        assert_eq!(engine.channels().active().position(), Duration::from_secs(100));

        engine.seek_to(-0.5).unwrap();
        assert_eq!(engine.channels().active().position(), Duration::ZERO);
    }

    #[test]
    fn seek_without_duration_is_rejected() {
        let mut engine = engine();
        engine.begin_seek();

        assert_eq!(engine.seek_to(0.5), Err(PlaybackError::NoDuration));
        assert!(!engine.state().is_seeking);
        assert_eq!(engine.channels().active().position(), Duration::ZERO);
    }

    #[test]
    fn non_finite_seek_ratio_is_rejected() {
        let mut engine = engine();
        engine.media_mut(ChannelId::A).duration = Some(Duration::from_secs(100));

        assert!(matches!(
            engine.seek_to(f32::NAN),
            Err(PlaybackError::InvalidSeekRatio(_))
        ));
        assert!(engine.seek_preview(f32::INFINITY).is_err());
    }

    #[test]
    fn seek_preview_reports_dragged_position() {
        let mut engine = engine();
        engine.media_mut(ChannelId::A).duration = Some(Duration::from_secs(120));
        engine.drain_events();

        engine.seek_preview(0.5).unwrap();

        let events = engine.drain_events();
        let [PlayerEvent::Snapshot(snapshot)] = events.as_slice() else {
            panic!("expected a single snapshot, got {events:?}");
        };
        assert_eq!(snapshot.progress_ratio, 0.5);
        assert_eq!(snapshot.elapsed_label, "1:00");
        assert_eq!(snapshot.duration_label, "2:00");
        assert_eq!(engine.channels().active().position(), Duration::ZERO);
    }

    #[test]
    fn progress_ticks_are_muted_while_seeking() {
        let mut engine = engine();
        engine.toggle_play().unwrap();
        engine.begin_seek();
        engine.drain_events();

        engine.on_frame(Duration::from_millis(16));

        assert!(engine.drain_events().is_empty());
        assert!(engine.wants_frame());
    }

    #[test]
    fn metadata_on_active_emits_snapshot() {
        let mut engine = engine();
        engine.media_mut(ChannelId::A).duration = Some(Duration::from_secs(65));
        engine.drain_events();

        engine.handle_channel_event(
            ChannelId::A,
            ChannelEvent::MetadataLoaded {
                duration: Duration::from_secs(65),
            },
        );

        let events = engine.drain_events();
        assert!(matches!(
            events.as_slice(),
            [PlayerEvent::Snapshot(snapshot)] if snapshot.duration_label == "1:05"
        ));
    }

    #[test]
    fn standby_ready_without_transition_is_ignored() {
        let mut engine = engine();
        engine.drain_events();

        engine.handle_channel_event(ChannelId::B, ChannelEvent::Ready);

        assert_eq!(engine.phase(), TransitionPhase::Idle);
        assert!(engine.drain_events().is_empty());
    }
}
