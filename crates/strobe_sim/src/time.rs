//! Femtosecond-precision simulation time.
//!
//! [`SimTime`] is the single time representation used throughout the harness:
//! event timestamps, clock half-periods, timed waits, and run summaries all
//! carry it. Scenarios usually speak in nanoseconds; the femtosecond base
//! keeps arbitrary clock ratios exact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;

/// An absolute point (or duration) in simulated time.
///
/// Ordering is plain numeric ordering on the femtosecond count, so event
/// queues and deadline comparisons need no further tie-breaking here.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime {
    fs: u64,
}

impl SimTime {
    /// Time zero.
    pub const ZERO: Self = Self { fs: 0 };

    /// Creates a time from a femtosecond count.
    pub const fn from_fs(fs: u64) -> Self {
        Self { fs }
    }

    /// Creates a time from a picosecond count.
    pub const fn from_ps(ps: u64) -> Self {
        Self { fs: ps * FS_PER_PS }
    }

    /// Creates a time from a nanosecond count.
    pub const fn from_ns(ns: u64) -> Self {
        Self { fs: ns * FS_PER_NS }
    }

    /// Creates a time from a microsecond count.
    pub const fn from_us(us: u64) -> Self {
        Self { fs: us * FS_PER_US }
    }

    /// Returns the raw femtosecond count.
    pub const fn as_fs(self) -> u64 {
        self.fs
    }

    /// Converts to nanoseconds, truncating sub-nanosecond remainder.
    pub const fn to_ns(self) -> u64 {
        self.fs / FS_PER_NS
    }

    /// Returns true at time zero.
    pub const fn is_zero(self) -> bool {
        self.fs == 0
    }
}

impl Add for SimTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            fs: self.fs + rhs.fs,
        }
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: Self) {
        self.fs += rhs.fs;
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [(u64, &str); 3] = [(FS_PER_US, "us"), (FS_PER_NS, "ns"), (FS_PER_PS, "ps")];
        if self.fs == 0 {
            return write!(f, "0 fs");
        }
        for (scale, suffix) in UNITS {
            if self.fs >= scale && self.fs.is_multiple_of(scale) {
                return write!(f, "{} {suffix}", self.fs / scale);
            }
        }
        write!(f, "{} fs", self.fs)
    }
}
