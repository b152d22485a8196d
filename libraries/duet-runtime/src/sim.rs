//! Simulated media backend
//!
//! Channels that "play" against the tokio clock instead of an audio device.
//! Loading, readiness and end of track are driven by timers, so under
//! `tokio::time::pause` a whole listening session runs in milliseconds of
//! real time and deterministically.
//!
//! Signals go out on an unbounded sender because [`MediaChannel`] methods
//! are synchronous and must never wait on the runtime that is calling them.

use crate::runtime::{PlayerHandle, PlayerRuntime, RuntimeConfig};
use duet_playback::{
    Catalog, ChannelEvent, ChannelId, MediaChannel, MediaRef, PlaybackConfig, PlaybackEngine,
    PlaybackError, TrackDescriptor, TrackSelector,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Sender for channel signals, tagged with the channel they came from
pub type SignalSender = mpsc::UnboundedSender<(ChannelId, ChannelEvent)>;

/// Receiver side of [`SignalSender`]
pub type SignalReceiver = mpsc::UnboundedReceiver<(ChannelId, ChannelEvent)>;

/// How a simulated platform treats `play`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoplayPolicy {
    /// Every `play` succeeds
    #[default]
    Allowed,

    /// `play` fails until the channel has been primed by a user gesture
    GestureRequired,

    /// `play` always fails
    Blocked,
}

/// One playable resource known to the simulated library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedMedia {
    pub duration: Duration,

    /// Delay between `load` and the `Ready` signal
    pub load_delay: Duration,

    /// When set, loading ends in an `Error` signal with this message
    pub failure: Option<String>,
}

impl SimulatedMedia {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            load_delay: Duration::from_millis(50),
            failure: None,
        }
    }

    pub fn with_load_delay(mut self, load_delay: Duration) -> Self {
        self.load_delay = load_delay;
        self
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

/// Resources the simulated channels can load, by audio locator
#[derive(Debug, Clone, Default)]
pub struct SimulatedLibrary {
    media: HashMap<MediaRef, SimulatedMedia>,
    autoplay: AutoplayPolicy,
}

impl SimulatedLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, audio_ref: impl Into<MediaRef>, media: SimulatedMedia) {
        self.media.insert(audio_ref.into(), media);
    }

    pub fn with_media(mut self, audio_ref: impl Into<MediaRef>, media: SimulatedMedia) -> Self {
        self.insert(audio_ref, media);
        self
    }

    pub fn with_autoplay(mut self, autoplay: AutoplayPolicy) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn get(&self, audio_ref: &MediaRef) -> Option<&SimulatedMedia> {
        self.media.get(audio_ref)
    }

    pub fn autoplay(&self) -> AutoplayPolicy {
        self.autoplay
    }

    /// Create the two channels of a player, both reporting on `signals`
    pub fn channel_pair(self, signals: &SignalSender) -> (SimulatedChannel, SimulatedChannel) {
        let library = Arc::new(self);
        (
            SimulatedChannel::new(ChannelId::A, Arc::clone(&library), signals.clone()),
            SimulatedChannel::new(ChannelId::B, library, signals.clone()),
        )
    }
}

/// What is loaded and where the playhead is
#[derive(Debug, Clone)]
struct Loaded {
    duration: Duration,
    ready_at: Instant,
    failed: bool,
}

/// A media channel playing against the tokio clock
///
/// Must be used from inside a tokio runtime: loads and playback schedule
/// timer tasks.
#[derive(Debug)]
pub struct SimulatedChannel {
    id: ChannelId,
    library: Arc<SimulatedLibrary>,
    signals: SignalSender,

    loaded: Option<Loaded>,
    /// Position accumulated up to the last pause/seek
    base: Duration,
    /// When the current play run started (None while paused)
    playing_since: Option<Instant>,
    volume: f32,
    primed: bool,

    // Bumped to invalidate timers still in flight
    load_generation: Arc<AtomicU64>,
    run_generation: Arc<AtomicU64>,
}

impl SimulatedChannel {
    pub fn new(id: ChannelId, library: Arc<SimulatedLibrary>, signals: SignalSender) -> Self {
        Self {
            id,
            library,
            signals,
            loaded: None,
            base: Duration::ZERO,
            playing_since: None,
            volume: 1.0,
            primed: false,
            load_generation: Arc::new(AtomicU64::new(0)),
            run_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Time the playhead has moved since `since`, ignoring time before ready
    fn run_time(&self, since: Instant, now: Instant) -> Duration {
        let start = match &self.loaded {
            Some(loaded) => since.max(loaded.ready_at),
            None => since,
        };
        now.saturating_duration_since(start)
    }

    fn position_at(&self, now: Instant) -> Duration {
        let Some(loaded) = &self.loaded else {
            return Duration::ZERO;
        };
        let running = self
            .playing_since
            .map_or(Duration::ZERO, |since| self.run_time(since, now));
        (self.base + running).min(loaded.duration)
    }

    /// Fold the current run into `base` and stop the clock
    fn settle(&mut self) {
        let now = Instant::now();
        self.base = self.position_at(now);
        self.playing_since = None;
        self.run_generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Schedule the `Ended` signal for the current run
    fn schedule_end(&self) {
        let Some(loaded) = &self.loaded else {
            return;
        };
        if loaded.failed {
            return;
        }

        let start = Instant::now().max(loaded.ready_at);
        let ends_at = start + loaded.duration.saturating_sub(self.base);
        let generation = Arc::clone(&self.run_generation);
        let expected = generation.load(Ordering::SeqCst);
        let signals = self.signals.clone();
        let id = self.id;

        tokio::spawn(async move {
            tokio::time::sleep_until(ends_at).await;
            if generation.load(Ordering::SeqCst) == expected {
                trace!(channel = ?id, "Simulated media ended");
                signals.send((id, ChannelEvent::Ended)).ok();
            }
        });
    }
}

impl MediaChannel for SimulatedChannel {
    fn load(&mut self, track: &TrackDescriptor) {
        self.settle();
        self.base = Duration::ZERO;
        let expected = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let media = self.library.get(&track.audio_ref).cloned();
        let (delay, outcome) = match media {
            Some(media) => {
                let outcome = match media.failure {
                    Some(message) => Err(message),
                    None => Ok(media.duration),
                };
                (media.load_delay, outcome)
            }
            None => (
                Duration::from_millis(50),
                Err(format!("media not found: {}", track.audio_ref)),
            ),
        };

        let ready_at = Instant::now() + delay;
        self.loaded = Some(Loaded {
            duration: outcome.as_ref().copied().unwrap_or(Duration::ZERO),
            ready_at,
            failed: outcome.is_err(),
        });

        let generation = Arc::clone(&self.load_generation);
        let signals = self.signals.clone();
        let id = self.id;
        tokio::spawn(async move {
            tokio::time::sleep_until(ready_at).await;
            if generation.load(Ordering::SeqCst) != expected {
                // Superseded by a later load
                return;
            }
            match outcome {
                Ok(duration) => {
                    signals
                        .send((id, ChannelEvent::MetadataLoaded { duration }))
                        .ok();
                    signals.send((id, ChannelEvent::Ready)).ok();
                }
                Err(message) => {
                    signals.send((id, ChannelEvent::Error { message })).ok();
                }
            }
        });
    }

    fn play(&mut self) -> duet_playback::Result<()> {
        match self.library.autoplay() {
            AutoplayPolicy::Allowed => {}
            AutoplayPolicy::GestureRequired if self.primed => {}
            AutoplayPolicy::GestureRequired => {
                return Err(PlaybackError::PlaybackBlocked(
                    "user gesture required".to_string(),
                ));
            }
            AutoplayPolicy::Blocked => {
                return Err(PlaybackError::PlaybackBlocked(
                    "autoplay denied".to_string(),
                ));
            }
        }

        if self.playing_since.is_some() {
            return Ok(());
        }
        self.run_generation.fetch_add(1, Ordering::SeqCst);
        self.playing_since = Some(Instant::now());
        self.schedule_end();
        Ok(())
    }

    fn pause(&mut self) {
        if self.playing_since.is_some() {
            self.settle();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn seek(&mut self, position: Duration) {
        let playing = self.playing_since.is_some();
        self.settle();
        let duration = self.loaded.as_ref().map_or(Duration::ZERO, |l| l.duration);
        self.base = position.min(duration);

        if playing {
            self.playing_since = Some(Instant::now());
            self.schedule_end();
        }
    }

    fn position(&self) -> Duration {
        self.position_at(Instant::now())
    }

    fn duration(&self) -> Option<Duration> {
        let loaded = self.loaded.as_ref()?;
        (!loaded.failed && Instant::now() >= loaded.ready_at).then_some(loaded.duration)
    }

    fn is_paused(&self) -> bool {
        match (&self.loaded, self.playing_since) {
            (Some(loaded), Some(_)) => self.position() >= loaded.duration,
            _ => true,
        }
    }

    fn prime(&mut self) {
        self.primed = true;
    }
}

/// Build an engine over two simulated channels and spawn its event loop
///
/// Must be called from inside a tokio runtime.
pub fn spawn_simulated(
    catalog: Catalog,
    library: SimulatedLibrary,
    playback: &PlaybackConfig,
    runtime: &RuntimeConfig,
    selector: TrackSelector,
) -> (PlayerHandle, JoinHandle<()>) {
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let (a, b) = library.channel_pair(&signal_tx);
    let engine = PlaybackEngine::new(catalog, a, b, playback).with_selector(selector);
    PlayerRuntime::spawn(engine, signal_rx, runtime)
}
