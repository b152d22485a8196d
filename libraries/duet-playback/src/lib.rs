//! Duet Player - Playback Engine
//!
//! Platform-agnostic dual-channel crossfade playback for Duet Player.
//!
//! This crate provides:
//! - A fixed, ordered track catalog
//! - Two media channels in Active/Standby roles
//! - Linear crossfades between channels, with hard-switch fallback
//! - Linear (wrap-around) and shuffle track selection
//! - Progress reporting and near-end auto-advance
//! - Seek by ratio
//! - Recovery from tracks that fail to load
//!
//! # Architecture
//!
//! `duet-playback` does no I/O and owns no clock:
//! - Media output is provided via the [`MediaChannel`] trait
//! - Channel signals (ready, ended, error) are fed in with
//!   [`PlaybackEngine::handle_channel_event_at`] (or
//!   [`PlaybackEngine::handle_channel_event`] when the host has no clock)
//! - Time advances through [`PlaybackEngine::on_frame`]
//! - Observers drain [`PlayerEvent`]s after each call
//!
//! `duet-runtime` wires these inputs to a tokio event loop.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use duet_playback::testing::MockChannel;
//! use duet_playback::{
//!     Catalog, ChannelEvent, Direction, PlaybackConfig, PlaybackEngine, TrackDescriptor,
//! };
//! use std::time::Duration;
//!
//! let catalog = Catalog::new(vec![
//!     TrackDescriptor::new("Neon Skyline", "song1.mp3", "image1.jpg"),
//!     TrackDescriptor::new("Velvet Static", "song2.mp3", "image2.jpg"),
//! ])
//! .unwrap();
//!
//! let mut engine = PlaybackEngine::new(
//!     catalog,
//!     MockChannel::new(),
//!     MockChannel::new(),
//!     &PlaybackConfig::default(),
//! );
//!
//! // First user gesture: unlock output and start playing
//! engine.toggle_play().unwrap();
//!
//! // Skip: the standby channel preloads the next track
//! let target = engine.skip(Direction::Next).unwrap();
//! assert_eq!(target, 1);
//!
//! // Platform reports the standby ready, frames drive the fade
//! let standby = engine.channels().standby_id();
//! engine.handle_channel_event(standby, ChannelEvent::Ready);
//! engine.on_frame(Duration::ZERO);
//! engine.on_frame(Duration::from_millis(1500));
//!
//! assert_eq!(engine.state().current_index, 1);
//! assert_eq!(engine.channels().active_id(), standby);
//!
//! for event in engine.drain_events() {
//!     println!("{event:?}");
//! }
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use duet_playback::{MediaChannel, Result, TrackDescriptor};
//! use std::time::Duration;
//!
//! // Implement MediaChannel for your platform's media element
//! struct MyAudioElement {
//!     // ... platform-specific handle
//! }
//!
//! impl MediaChannel for MyAudioElement {
//!     fn load(&mut self, track: &TrackDescriptor) {
//!         // Start fetching track.audio_ref; report Ready or Error later
//!     }
//!
//!     fn play(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn pause(&mut self) {}
//!
//!     fn set_volume(&mut self, volume: f32) {}
//!
//!     fn seek(&mut self, position: Duration) {}
//!
//!     fn position(&self) -> Duration {
//!         Duration::ZERO
//!     }
//!
//!     fn duration(&self) -> Option<Duration> {
//!         None
//!     }
//!
//!     fn is_paused(&self) -> bool {
//!         true
//!     }
//! }
//! ```

mod catalog;
mod channel;
pub mod crossfade;
mod engine;
mod error;
mod events;
mod frame;
pub mod progress;
mod selector;
pub mod testing;
pub mod types;

// Public exports
pub use catalog::{Catalog, MediaRef, TrackDescriptor};
pub use channel::{Channel, ChannelEvent, ChannelId, ChannelPair, ChannelRole, MediaChannel};
pub use crossfade::CrossfadeSettings;
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use events::{PlayerEvent, PlayerSnapshot};
pub use selector::{linear, Direction, TrackSelector};
pub use types::{
    PlaybackConfig, PlaybackStatus, PlayerState, TransitionMode, TransitionPhase,
    TransitionRequest, TransitionTrigger,
};
