//! Dual output channels
//!
//! Abstracts the platform's media element (HTML audio, a CPAL voice, a
//! simulated clock...) behind [`MediaChannel`], and pairs two of them into
//! the Active/Standby arrangement the crossfade scheduler works on.

use crate::catalog::TrackDescriptor;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// Platform media output holding one loaded resource
///
/// Loading is asynchronous: `load` returns immediately and the platform later
/// reports [`ChannelEvent::Ready`] (or [`ChannelEvent::Error`]) for the
/// channel it was called on.
pub trait MediaChannel {
    /// Replace whatever is loaded with `track`'s audio and rewind to zero
    fn load(&mut self, track: &TrackDescriptor);

    /// Start or resume output
    ///
    /// # Returns
    /// * `Ok(())` - Output started
    /// * `Err(PlaybackError::PlaybackBlocked)` - Platform refused (autoplay policy)
    fn play(&mut self) -> Result<()>;

    /// Pause output, keeping position
    fn pause(&mut self);

    /// Set linear output gain, already clamped to [0, 1]
    fn set_volume(&mut self, volume: f32);

    /// Move the read position of the loaded resource
    fn seek(&mut self, position: Duration);

    /// Current read position
    fn position(&self) -> Duration;

    /// Total duration, once metadata has loaded
    fn duration(&self) -> Option<Duration>;

    /// Whether output is currently paused (or never started)
    fn is_paused(&self) -> bool;

    /// Gesture-unlock priming hook
    ///
    /// Called once, at volume 0, by [`crate::PlaybackEngine::unlock`].
    /// Platforms with gesture-restricted output start and immediately pause
    /// here; everybody else can ignore it.
    fn prime(&mut self) {}
}

/// Identity of one of the two channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelId {
    A,
    B,
}

impl ChannelId {
    fn slot(self) -> usize {
        match self {
            ChannelId::A => 0,
            ChannelId::B => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            ChannelId::A => ChannelId::B,
            ChannelId::B => ChannelId::A,
        }
    }
}

/// Role a channel currently plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelRole {
    /// Audible output
    Active,
    /// Preloading or fading in
    Standby,
}

/// Asynchronous signal from a media channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChannelEvent {
    /// Enough media buffered to start playback
    Ready,

    /// Duration became known
    MetadataLoaded { duration: Duration },

    /// Playback reached the natural end of the resource
    Ended,

    /// Resource could not be fetched or decoded
    Error { message: String },
}

/// One output channel and its bookkeeping
#[derive(Debug)]
pub struct Channel<M> {
    media: M,
    volume: f32,
    role: ChannelRole,
}

impl<M: MediaChannel> Channel<M> {
    fn new(mut media: M, role: ChannelRole) -> Self {
        media.set_volume(1.0);
        Self {
            media,
            volume: 1.0,
            role,
        }
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub(crate) fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn role(&self) -> ChannelRole {
        self.role
    }

    /// Set output gain, clamped to [0, 1]; NaN is treated as silence
    pub(crate) fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.volume = volume;
        self.media.set_volume(volume);
    }

    pub(crate) fn load_track(&mut self, track: &TrackDescriptor) {
        self.media.load(track);
    }

    pub(crate) fn play(&mut self) -> Result<()> {
        self.media.play()
    }

    pub(crate) fn pause(&mut self) {
        self.media.pause();
    }

    pub(crate) fn seek(&mut self, position: Duration) {
        self.media.seek(position);
    }

    pub fn position(&self) -> Duration {
        self.media.position()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.media.duration()
    }

    pub fn is_paused(&self) -> bool {
        self.media.is_paused()
    }

    /// Prime the platform at silence, then restore the previous gain
    fn prime(&mut self) {
        let restore = self.volume;
        self.set_volume(0.0);
        self.media.prime();
        self.set_volume(restore);
    }
}

/// The two channels of the player
///
/// Exactly one channel is Active at any time; only their roles change.
/// Outside this crate the pair is read-only:
///
/// ```compile_fail
/// use duet_playback::testing::MockChannel;
/// use duet_playback::ChannelPair;
///
/// let mut pair = ChannelPair::new(MockChannel::new(), MockChannel::new());
/// pair.swap_roles();
/// ```
#[derive(Debug)]
pub struct ChannelPair<M> {
    channels: [Channel<M>; 2],
    active: ChannelId,
}

impl<M: MediaChannel> ChannelPair<M> {
    /// Pair two media outputs; `a` starts as the active channel
    pub fn new(a: M, b: M) -> Self {
        Self {
            channels: [
                Channel::new(a, ChannelRole::Active),
                Channel::new(b, ChannelRole::Standby),
            ],
            active: ChannelId::A,
        }
    }

    pub fn active_id(&self) -> ChannelId {
        self.active
    }

    pub fn standby_id(&self) -> ChannelId {
        self.active.other()
    }

    pub fn role_of(&self, id: ChannelId) -> ChannelRole {
        self.channels[id.slot()].role
    }

    pub fn channel(&self, id: ChannelId) -> &Channel<M> {
        &self.channels[id.slot()]
    }

    pub(crate) fn channel_mut(&mut self, id: ChannelId) -> &mut Channel<M> {
        &mut self.channels[id.slot()]
    }

    pub fn active(&self) -> &Channel<M> {
        self.channel(self.active)
    }

    pub(crate) fn active_mut(&mut self) -> &mut Channel<M> {
        self.channel_mut(self.active)
    }

    pub fn standby(&self) -> &Channel<M> {
        self.channel(self.standby_id())
    }

    pub(crate) fn standby_mut(&mut self) -> &mut Channel<M> {
        self.channel_mut(self.standby_id())
    }

    /// Assign a track to a channel (asynchronous load, position reset)
    pub(crate) fn load_track(&mut self, id: ChannelId, track: &TrackDescriptor) {
        trace!(channel = ?id, title = %track.title, "Loading track into channel");
        self.channel_mut(id).load_track(track);
    }

    pub(crate) fn set_volume(&mut self, id: ChannelId, volume: f32) {
        self.channel_mut(id).set_volume(volume);
    }

    /// Exchange Active and Standby
    pub(crate) fn swap_roles(&mut self) {
        let old_active = self.active;
        self.active = old_active.other();
        self.channels[old_active.slot()].role = ChannelRole::Standby;
        self.channels[self.active.slot()].role = ChannelRole::Active;
    }

    /// Run the platform priming hook on both channels
    pub(crate) fn prime(&mut self) {
        for channel in &mut self.channels {
            channel.prime();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChannel;

    fn track(name: &str) -> TrackDescriptor {
        TrackDescriptor::new(name, format!("{name}.mp3"), format!("{name}.jpg"))
    }

    #[test]
    fn pair_starts_with_a_active() {
        let pair = ChannelPair::new(MockChannel::new(), MockChannel::new());
        assert_eq!(pair.active_id(), ChannelId::A);
        assert_eq!(pair.standby_id(), ChannelId::B);
        assert_eq!(pair.role_of(ChannelId::A), ChannelRole::Active);
        assert_eq!(pair.role_of(ChannelId::B), ChannelRole::Standby);
    }

    #[test]
    fn swap_roles_exchanges_active_and_standby() {
        let mut pair = ChannelPair::new(MockChannel::new(), MockChannel::new());
        pair.swap_roles();
        assert_eq!(pair.active_id(), ChannelId::B);
        assert_eq!(pair.role_of(ChannelId::A), ChannelRole::Standby);
        assert_eq!(pair.role_of(ChannelId::B), ChannelRole::Active);

        pair.swap_roles();
        assert_eq!(pair.active_id(), ChannelId::A);
    }

    #[test]
    fn volume_is_clamped() {
        let mut pair = ChannelPair::new(MockChannel::new(), MockChannel::new());

        pair.set_volume(ChannelId::A, 1.7);
        assert_eq!(pair.channel(ChannelId::A).volume(), 1.0);
        assert_eq!(pair.channel(ChannelId::A).media().volume, 1.0);

        pair.set_volume(ChannelId::A, -0.3);
        assert_eq!(pair.channel(ChannelId::A).volume(), 0.0);

        pair.set_volume(ChannelId::A, f32::NAN);
        assert_eq!(pair.channel(ChannelId::A).volume(), 0.0);

        pair.set_volume(ChannelId::B, 0.25);
        assert_eq!(pair.channel(ChannelId::B).media().volume, 0.25);
    }

    #[test]
    fn load_track_forwards_to_media() {
        let mut pair = ChannelPair::new(MockChannel::new(), MockChannel::new());
        pair.load_track(ChannelId::B, &track("song2"));

        let media = pair.channel(ChannelId::B).media();
        assert_eq!(media.loaded.as_ref().unwrap().as_str(), "song2.mp3");
        assert_eq!(media.load_count, 1);
        assert!(pair.channel(ChannelId::A).media().loaded.is_none());
    }

    #[test]
    fn prime_restores_volume() {
        let mut pair = ChannelPair::new(MockChannel::new(), MockChannel::new());
        pair.set_volume(ChannelId::B, 0.4);
        pair.prime();

        assert_eq!(pair.channel(ChannelId::A).media().prime_count, 1);
        assert_eq!(pair.channel(ChannelId::B).media().prime_count, 1);
        assert_eq!(pair.channel(ChannelId::A).volume(), 1.0);
        assert_eq!(pair.channel(ChannelId::B).volume(), 0.4);
    }
}
