//! Duet Player - Runtime
//!
//! Hosts a [`duet_playback::PlaybackEngine`] on a single tokio task and
//! provides a simulated media backend.
//!
//! - [`PlayerRuntime`] turns commands, channel signals and frame ticks into
//!   engine calls, and publishes engine events on a broadcast channel
//! - [`PlayerHandle`] is the cloneable async control surface
//! - [`SimulatedChannel`] plays against the tokio clock, for the demo player
//!   and for tests under paused time
//!
//! # Example
//!
//! ```rust,no_run
//! use duet_playback::{Catalog, PlaybackConfig, TrackDescriptor, TrackSelector};
//! use duet_runtime::{spawn_simulated, RuntimeConfig, SimulatedLibrary, SimulatedMedia};
//! use std::time::Duration;
//!
//! # async fn demo() -> duet_runtime::Result<()> {
//! let catalog = Catalog::new(vec![
//!     TrackDescriptor::new("Neon Skyline", "song1.mp3", "image1.jpg"),
//!     TrackDescriptor::new("Velvet Static", "song2.mp3", "image2.jpg"),
//! ])?;
//! let library = SimulatedLibrary::new()
//!     .with_media("song1.mp3", SimulatedMedia::new(Duration::from_secs(200)))
//!     .with_media("song2.mp3", SimulatedMedia::new(Duration::from_secs(185)));
//!
//! let (player, task) = spawn_simulated(
//!     catalog,
//!     library,
//!     &PlaybackConfig::default(),
//!     &RuntimeConfig::default(),
//!     TrackSelector::new(),
//! );
//!
//! let mut events = player.subscribe();
//! player.toggle_play().await?;
//! player.skip(duet_playback::Direction::Next).await?;
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//!
//! player.shutdown().await?;
//! task.await.ok();
//! # Ok(())
//! # }
//! ```

mod error;
mod runtime;
mod sim;

pub use error::{Result, RuntimeError};
pub use runtime::{PlayerHandle, PlayerRuntime, RuntimeConfig};
pub use sim::{
    spawn_simulated, AutoplayPolicy, SignalReceiver, SignalSender, SimulatedChannel,
    SimulatedLibrary, SimulatedMedia,
};
