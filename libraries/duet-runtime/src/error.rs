//! Error types for the player runtime

use duet_playback::PlaybackError;
use thiserror::Error;

/// Errors returned through a [`crate::PlayerHandle`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("Player runtime has shut down")]
    Closed,
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
