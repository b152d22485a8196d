//! Duet Player - terminal demo player
//!
//! Library side of the `duet-player` binary: configuration, console command
//! parsing, and the session that maps commands onto a running player.

pub mod commands;
pub mod config;
pub mod error;
pub mod session;

pub use error::{PlayerError, Result};
