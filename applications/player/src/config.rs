/// Player configuration
use crate::error::{PlayerError, Result};
use duet_playback::{Catalog, PlaybackConfig, TrackDescriptor};
use duet_runtime::{AutoplayPolicy, RuntimeConfig, SimulatedLibrary, SimulatedMedia};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest crossfade accepted from configuration
const MAX_CROSSFADE_MS: u32 = 30_000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default = "default_simulation")]
    pub simulation: SimulationSettings,

    #[serde(default = "default_tracks")]
    pub tracks: Vec<TrackSettings>,
}

/// How the simulated media backend behaves
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,

    #[serde(default)]
    pub autoplay: AutoplayPolicy,
}

/// One catalog entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackSettings {
    pub title: String,
    pub audio_ref: String,
    pub cover_ref: String,

    /// Length of the simulated media
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,

    /// Simulate a resource that never loads, with this error message
    #[serde(default)]
    pub fail: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            runtime: RuntimeConfig::default(),
            simulation: default_simulation(),
            tracks: default_tracks(),
        }
    }
}

impl PlayerConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `duet.toml` in the working
    /// directory is used when present. Environment variables prefixed with
    /// `DUET_` override file values, with `__` between nested keys
    /// (`DUET_PLAYBACK__CROSSFADE_MS=800`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(PlayerError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from("duet.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with DUET_)
        settings = settings.add_source(
            config::Environment::with_prefix("DUET")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.tracks.is_empty() {
            return Err(PlayerError::Config(
                "At least one track is required".to_string(),
            ));
        }

        for (index, track) in self.tracks.iter().enumerate() {
            if track.title.trim().is_empty() {
                return Err(PlayerError::Config(format!("Track {index} has no title")));
            }
            if track.audio_ref.trim().is_empty() {
                return Err(PlayerError::Config(format!(
                    "Track {index} ({}) has no audio_ref",
                    track.title
                )));
            }
        }

        if self.playback.crossfade_ms > MAX_CROSSFADE_MS {
            return Err(PlayerError::Config(format!(
                "crossfade_ms must be at most {MAX_CROSSFADE_MS} (got {})",
                self.playback.crossfade_ms
            )));
        }

        if self.playback.ready_timeout_ms == Some(0) {
            return Err(PlayerError::Config(
                "ready_timeout_ms must be positive (omit it to wait forever)".to_string(),
            ));
        }

        if self.playback.start_index >= self.tracks.len() {
            return Err(PlayerError::Config(format!(
                "start_index {} is outside the catalog ({} tracks)",
                self.playback.start_index,
                self.tracks.len()
            )));
        }

        if self.runtime.frame_interval_ms == 0 {
            return Err(PlayerError::Config(
                "frame_interval_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the immutable catalog
    pub fn catalog(&self) -> Result<Catalog> {
        let tracks = self
            .tracks
            .iter()
            .map(|track| {
                TrackDescriptor::new(
                    track.title.clone(),
                    track.audio_ref.clone(),
                    track.cover_ref.clone(),
                )
            })
            .collect();
        Ok(Catalog::new(tracks)?)
    }

    /// Build the simulated media library backing the catalog
    pub fn library(&self) -> SimulatedLibrary {
        let load_delay = Duration::from_millis(self.simulation.load_delay_ms);
        let mut library = SimulatedLibrary::new().with_autoplay(self.simulation.autoplay);

        for track in &self.tracks {
            let mut media = SimulatedMedia::new(Duration::from_secs(track.duration_secs))
                .with_load_delay(load_delay);
            if let Some(message) = &track.fail {
                media = media.failing(message.clone());
            }
            library.insert(track.audio_ref.as_str(), media);
        }
        library
    }
}

// Default values
fn default_simulation() -> SimulationSettings {
    SimulationSettings {
        load_delay_ms: default_load_delay_ms(),
        autoplay: AutoplayPolicy::default(),
    }
}

fn default_load_delay_ms() -> u64 {
    120
}

fn default_duration_secs() -> u64 {
    180
}

fn default_tracks() -> Vec<TrackSettings> {
    [
        ("Neon Skyline", "song1.mp3", "image1.jpg", 184),
        ("Midnight Drive", "song2.mp3", "image2.jpg", 207),
        ("City Lights", "song3.mp3", "image3.jpg", 173),
    ]
    .into_iter()
    .map(|(title, audio_ref, cover_ref, duration_secs)| TrackSettings {
        title: title.to_string(),
        audio_ref: audio_ref.to_string(),
        cover_ref: cover_ref.to_string(),
        duration_secs,
        fail: None,
    })
    .collect()
}
