/// Line-based console commands
use duet_playback::Direction;
use std::str::FromStr;
use thiserror::Error;

/// One line typed at the player prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    /// Play/pause
    Toggle,
    Skip(Direction),
    /// Set shuffle, or flip it when no state is given
    Shuffle(Option<bool>),
    /// Seek to a fraction of the current track
    Seek(f32),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("Unknown command: {0} (try 'help')")]
    Unknown(String),

    #[error("Expected 'on' or 'off', got {0}")]
    InvalidToggle(String),

    #[error("Seek needs a position between 0 and 1 or a percentage, got {0}")]
    InvalidSeek(String),

    #[error("Empty command")]
    Empty,
}

pub const HELP: &str = "\
commands:
  play | pause | p             toggle playback
  next | n                     skip forward
  prev | previous | b          skip back
  shuffle [on|off]             toggle or set shuffle
  seek <0..1 | N%>             jump within the current track
  status | s                   show what is playing
  help | h | ?                 this text
  quit | q                     exit";

impl FromStr for ConsoleCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(ParseCommandError::Empty);
        };
        let argument = words.next();

        match command.to_ascii_lowercase().as_str() {
            "play" | "pause" | "p" | "toggle" => Ok(Self::Toggle),
            "next" | "n" => Ok(Self::Skip(Direction::Next)),
            "prev" | "previous" | "b" => Ok(Self::Skip(Direction::Previous)),
            "shuffle" => match argument.map(str::to_ascii_lowercase).as_deref() {
                None => Ok(Self::Shuffle(None)),
                Some("on") => Ok(Self::Shuffle(Some(true))),
                Some("off") => Ok(Self::Shuffle(Some(false))),
                Some(other) => Err(ParseCommandError::InvalidToggle(other.to_string())),
            },
            "seek" => argument
                .and_then(parse_ratio)
                .map(Self::Seek)
                .ok_or_else(|| ParseCommandError::InvalidSeek(argument.unwrap_or("").to_string())),
            "status" | "s" => Ok(Self::Status),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}

/// `0.25` or `25%`
fn parse_ratio(value: &str) -> Option<f32> {
    let ratio = match value.strip_suffix('%') {
        Some(percent) => percent.parse::<f32>().ok()? / 100.0,
        None => value.parse::<f32>().ok()?,
    };
    ratio.is_finite().then_some(ratio)
}
