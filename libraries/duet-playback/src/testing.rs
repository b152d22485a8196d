//! Scripted media channel for tests
//!
//! [`MockChannel`] records every call the engine makes and lets a test
//! decide whether `play` succeeds. It never emits signals on its own: tests
//! feed `ChannelEvent`s to the engine explicitly, which makes every
//! interleaving reproducible.

use crate::catalog::{MediaRef, TrackDescriptor};
use crate::channel::MediaChannel;
use crate::error::{PlaybackError, Result};
use std::time::Duration;

/// Test double for [`MediaChannel`]
#[derive(Debug, Clone)]
pub struct MockChannel {
    /// Audio ref of the last `load`
    pub loaded: Option<MediaRef>,
    pub load_count: usize,
    pub volume: f32,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub paused: bool,
    pub play_calls: usize,
    pub prime_count: usize,
    /// When set, `play` fails with `PlaybackBlocked` carrying this reason
    pub block_play: Option<String>,
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            loaded: None,
            load_count: 0,
            volume: 1.0,
            position: Duration::ZERO,
            duration: None,
            paused: true,
            play_calls: 0,
            prime_count: 0,
            block_play: None,
        }
    }

    /// A channel whose `play` is always refused
    pub fn blocked(reason: &str) -> Self {
        Self {
            block_play: Some(reason.to_string()),
            ..Self::new()
        }
    }
}

impl MediaChannel for MockChannel {
    fn load(&mut self, track: &TrackDescriptor) {
        self.loaded = Some(track.audio_ref.clone());
        self.load_count += 1;
        self.position = Duration::ZERO;
        self.duration = None;
        self.paused = true;
    }

    fn play(&mut self) -> Result<()> {
        self.play_calls += 1;
        if let Some(reason) = &self.block_play {
            return Err(PlaybackError::PlaybackBlocked(reason.clone()));
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn seek(&mut self, position: Duration) {
        self.position = position;
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn prime(&mut self) {
        self.prime_count += 1;
    }
}
