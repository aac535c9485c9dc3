//! Backpressure pause pattern: a fixed random period repeated forever.
//!
//! The consumer agent draws one boolean per clock edge; `true` deasserts its
//! ready for that cycle. The pattern is a 256-draw period of independently
//! random bits that then repeats exactly, giving unbounded logical length
//! from finite memory. Seeding is explicit so a failing run can be replayed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Length of the random period before it repeats.
pub const PAUSE_PERIOD: usize = 256;

/// An unbounded, periodic sequence of pause decisions.
#[derive(Debug, Clone)]
pub struct PausePattern {
    period: Vec<bool>,
    index: usize,
}

impl PausePattern {
    /// A pattern with a fresh random seed. Run-to-run variation is
    /// intentional; use [`seeded`](Self::seeded) to pin a failing case.
    pub fn random() -> Self {
        Self::seeded(rand::thread_rng().gen())
    }

    /// A deterministic pattern: the same seed always yields the same
    /// sequence of draws.
    pub fn seeded(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::from_period((0..PAUSE_PERIOD).map(|_| rng.gen()).collect())
    }

    /// Builds a pattern from an explicit period.
    ///
    /// # Panics
    ///
    /// Panics if `period` is empty.
    pub fn from_period(period: Vec<bool>) -> Self {
        assert!(!period.is_empty(), "pause period must not be empty");
        Self { period, index: 0 }
    }

    /// Draws the next pause decision, wrapping at the period boundary.
    pub fn next_pause(&mut self) -> bool {
        let pause = self.period[self.index];
        self.index = (self.index + 1) % self.period.len();
        pause
    }

    /// Length of the repeating period.
    pub fn period_len(&self) -> usize {
        self.period.len()
    }
}

impl Iterator for PausePattern {
    type Item = bool;

    // Logically infinite: never returns None.
    fn next(&mut self) -> Option<bool> {
        Some(self.next_pause())
    }
}
