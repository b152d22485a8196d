/// Console session: executes parsed commands against a running player
use crate::commands::{ConsoleCommand, HELP};
use crate::error::Result;
use duet_playback::{Catalog, PlayerEvent, PlayerSnapshot};
use duet_runtime::PlayerHandle;
use tracing::{info, warn};

/// Whether the session keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    player: PlayerHandle,
    catalog: Catalog,
}

impl Session {
    pub fn new(player: PlayerHandle, catalog: Catalog) -> Self {
        Self { player, catalog }
    }

    /// Run one command, returning the text to show the listener
    pub async fn execute(&self, command: ConsoleCommand) -> Result<(Flow, String)> {
        let reply = match command {
            ConsoleCommand::Toggle => {
                self.player.toggle_play().await?;
                self.status().await?
            }
            ConsoleCommand::Skip(direction) => {
                let target = self.player.skip(direction).await?;
                format!("-> {}", self.catalog.track(target).title)
            }
            ConsoleCommand::Shuffle(enabled) => {
                let enabled = match enabled {
                    Some(enabled) => enabled,
                    None => !self.player.state().await?.shuffle_enabled,
                };
                self.player.set_shuffle(enabled).await?;
                format!("shuffle {}", if enabled { "on" } else { "off" })
            }
            ConsoleCommand::Seek(ratio) => {
                self.player.seek_to(ratio).await?;
                self.status().await?
            }
            ConsoleCommand::Status => self.status().await?,
            ConsoleCommand::Help => HELP.to_string(),
            ConsoleCommand::Quit => return Ok((Flow::Quit, "bye".to_string())),
        };
        Ok((Flow::Continue, reply))
    }

    async fn status(&self) -> Result<String> {
        let snapshot = self.player.snapshot().await?;
        let state = self.player.state().await?;
        Ok(now_playing(&snapshot, &self.catalog, state.shuffle_enabled))
    }
}

/// One-line "now playing" view
pub fn now_playing(snapshot: &PlayerSnapshot, catalog: &Catalog, shuffle: bool) -> String {
    let marker = if snapshot.is_playing { ">" } else { "||" };
    let mut line = format!(
        "{marker} {} [{}] {} / {} ({:.0}%)",
        snapshot.title,
        catalog.position_label(snapshot.track_index),
        snapshot.elapsed_label,
        snapshot.duration_label,
        snapshot.progress_ratio * 100.0,
    );
    if shuffle {
        line.push_str(" shuffle");
    }
    line
}

/// Log the discrete engine events worth telling the listener about
pub fn log_event(event: &PlayerEvent, catalog: &Catalog) {
    match event {
        PlayerEvent::TransitionCompleted { index, mode } => {
            info!(
                title = %catalog.track(*index).title,
                position = %catalog.position_label(*index),
                ?mode,
                "Now playing"
            );
        }
        PlayerEvent::PlaybackBlocked { reason } => warn!(%reason, "Playback blocked"),
        PlayerEvent::LoadFailed { index, reason } => {
            warn!(title = %catalog.track(*index).title, %reason, "Track failed to load");
        }
        PlayerEvent::FadeAborted { reason } => warn!(%reason, "Crossfade aborted"),
        PlayerEvent::CatalogUnplayable => warn!("No track in the catalog could be loaded"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_playback::{MediaRef, TrackDescriptor};

    #[test]
    fn now_playing_line() {
        let catalog = Catalog::new(vec![
            TrackDescriptor::new("Neon Skyline", "song1.mp3", "image1.jpg"),
            TrackDescriptor::new("Midnight Drive", "song2.mp3", "image2.jpg"),
        ])
        .unwrap();
        let snapshot = PlayerSnapshot {
            track_index: 1,
            title: "Midnight Drive".to_string(),
            cover_ref: MediaRef::new("image2.jpg"),
            is_playing: true,
            progress_ratio: 0.25,
            elapsed_label: "0:51".to_string(),
            duration_label: "3:27".to_string(),
        };

        assert_eq!(
            now_playing(&snapshot, &catalog, false),
            "> Midnight Drive [2 / 2] 0:51 / 3:27 (25%)"
        );
        assert!(now_playing(&snapshot, &catalog, true).ends_with(" shuffle"));
    }
}
