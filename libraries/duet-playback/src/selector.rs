//! Track selection policies
//!
//! Linear order wraps around the catalog in both directions. Shuffle samples
//! uniformly among every track except the current one. Shuffle keeps no
//! history, so "previous" under shuffle is just another random pick.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Which way a transition moves through the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Next,
    Previous,
}

/// Resolves target indices for transitions
#[derive(Debug, Clone)]
pub struct TrackSelector {
    rng: StdRng,
}

impl Default for TrackSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackSelector {
    /// Selector seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic selector, for tests and reproducible sessions
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Resolve the index a transition should move to
    ///
    /// # Arguments
    /// * `current` - Index currently playing
    /// * `len` - Catalog length
    /// * `direction` - Next or Previous (ignored under shuffle)
    /// * `shuffle` - Whether shuffle is enabled
    ///
    /// A one-track catalog always resolves to `current`.
    pub fn resolve_next(
        &mut self,
        current: usize,
        len: usize,
        direction: Direction,
        shuffle: bool,
    ) -> usize {
        if len <= 1 {
            return current;
        }

        if shuffle {
            self.shuffled(current, len)
        } else {
            linear(current, len, direction)
        }
    }

    /// Uniform pick in [0, len) excluding `current`
    fn shuffled(&mut self, current: usize, len: usize) -> usize {
        // Sample from the len - 1 other slots and step over `current`
        let pick = self.rng.gen_range(0..len - 1);
        if pick >= current {
            pick + 1
        } else {
            pick
        }
    }
}

/// Wrap-around step through the catalog
pub fn linear(current: usize, len: usize, direction: Direction) -> usize {
    if len == 0 {
        return current;
    }

    match direction {
        Direction::Next => (current + 1) % len,
        Direction::Previous => (current + len - 1) % len,
    }
}
