//! Player event loop
//!
//! One tokio task owns the [`PlaybackEngine`] and multiplexes its three
//! inputs:
//! - Commands from any number of [`PlayerHandle`]s (mpsc, oneshot replies)
//! - Channel signals from the media backend (unbounded mpsc)
//! - Frame ticks from an interval, polled only while the engine has live
//!   frame registrations
//!
//! After every input the engine's events are published on a broadcast
//! channel.

use crate::error::{Result, RuntimeError};
use crate::sim::SignalReceiver;
use duet_playback::{
    Direction, MediaChannel, PlaybackEngine, PlayerEvent, PlayerSnapshot, PlayerState,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

/// Event loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Frame tick period in milliseconds (default: 16, about 60 fps)
    pub frame_interval_ms: u64,

    /// Pending commands before senders wait (default: 32)
    pub command_buffer: usize,

    /// Events retained for slow subscribers (default: 256)
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            command_buffer: 32,
            event_capacity: 256,
        }
    }
}

impl RuntimeConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

/// Commands understood by the event loop
#[derive(Debug)]
enum Command {
    TogglePlay(oneshot::Sender<duet_playback::Result<()>>),
    Skip(Direction, oneshot::Sender<duet_playback::Result<usize>>),
    SetShuffle(bool),
    Unlock,
    BeginSeek,
    SeekPreview(f32, oneshot::Sender<duet_playback::Result<()>>),
    SeekTo(f32, oneshot::Sender<duet_playback::Result<()>>),
    Snapshot(oneshot::Sender<PlayerSnapshot>),
    State(oneshot::Sender<PlayerState>),
    Shutdown,
}

/// Cloneable control surface for a running player
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<PlayerEvent>,
}

impl PlayerHandle {
    /// Subscribe to engine events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    pub async fn toggle_play(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::TogglePlay(tx)).await?;
        rx.await
            .map_err(|_| RuntimeError::Closed)?
            .map_err(RuntimeError::from)
    }

    /// Skip in `direction`, returning the target index
    pub async fn skip(&self, direction: Direction) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Skip(direction, tx)).await?;
        rx.await
            .map_err(|_| RuntimeError::Closed)?
            .map_err(RuntimeError::from)
    }

    pub async fn set_shuffle(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetShuffle(enabled)).await
    }

    pub async fn unlock(&self) -> Result<()> {
        self.send(Command::Unlock).await
    }

    pub async fn begin_seek(&self) -> Result<()> {
        self.send(Command::BeginSeek).await
    }

    pub async fn seek_preview(&self, ratio: f32) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::SeekPreview(ratio, tx)).await?;
        rx.await
            .map_err(|_| RuntimeError::Closed)?
            .map_err(RuntimeError::from)
    }

    pub async fn seek_to(&self, ratio: f32) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::SeekTo(ratio, tx)).await?;
        rx.await
            .map_err(|_| RuntimeError::Closed)?
            .map_err(RuntimeError::from)
    }

    pub async fn snapshot(&self) -> Result<PlayerSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    pub async fn state(&self) -> Result<PlayerState> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::State(tx)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    /// Stop the event loop; pending commands are dropped
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RuntimeError::Closed)
    }
}

/// The event loop owning a playback engine
pub struct PlayerRuntime<M: MediaChannel> {
    engine: PlaybackEngine<M>,
    commands: mpsc::Receiver<Command>,
    signals: SignalReceiver,
    events: broadcast::Sender<PlayerEvent>,
    frames: Interval,
    epoch: Instant,
}

impl<M> PlayerRuntime<M>
where
    M: MediaChannel + Send + 'static,
{
    /// Spawn the event loop for `engine`
    ///
    /// `signals` must be the receiver paired with the sender the engine's
    /// channels report on. Events emitted while constructing the engine are
    /// published before any command runs.
    pub fn spawn(
        engine: PlaybackEngine<M>,
        signals: SignalReceiver,
        config: &RuntimeConfig,
    ) -> (PlayerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

        let mut frames = tokio::time::interval(config.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let runtime = Self {
            engine,
            commands: command_rx,
            signals,
            events: event_tx.clone(),
            frames,
            epoch: Instant::now(),
        };
        let handle = PlayerHandle {
            commands: command_tx,
            events: event_tx,
        };

        (handle, tokio::spawn(runtime.run()))
    }

    async fn run(mut self) {
        info!(
            tracks = self.engine.catalog().len(),
            "Player runtime started"
        );
        self.publish();

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => break,
                        Some(command) => self.handle_command(command),
                    }
                }
                Some((channel, event)) = self.signals.recv() => {
                    let now = self.epoch.elapsed();
                    self.engine.handle_channel_event_at(channel, event, now);
                }
                _ = self.frames.tick(), if self.engine.wants_frame() => {
                    let now = self.epoch.elapsed();
                    self.engine.on_frame(now);
                }
            }
            self.publish();
        }

        info!("Player runtime stopped");
    }

    fn handle_command(&mut self, command: Command) {
        debug!(?command, "Player command");
        match command {
            Command::TogglePlay(reply) => {
                reply.send(self.engine.toggle_play()).ok();
            }
            Command::Skip(direction, reply) => {
                reply.send(self.engine.skip(direction)).ok();
            }
            Command::SetShuffle(enabled) => self.engine.set_shuffle(enabled),
            Command::Unlock => self.engine.unlock(),
            Command::BeginSeek => self.engine.begin_seek(),
            Command::SeekPreview(ratio, reply) => {
                reply.send(self.engine.seek_preview(ratio)).ok();
            }
            Command::SeekTo(ratio, reply) => {
                reply.send(self.engine.seek_to(ratio)).ok();
            }
            Command::Snapshot(reply) => {
                reply.send(self.engine.snapshot()).ok();
            }
            Command::State(reply) => {
                reply.send(self.engine.state().clone()).ok();
            }
            Command::Shutdown => {}
        }
    }

    /// Forward drained engine events to subscribers
    fn publish(&mut self) {
        for event in self.engine.drain_events() {
            // No subscribers is fine
            self.events.send(event).ok();
        }
    }
}
