//! Elaboration-time filter parameters.
//!
//! A [`FilterConfig`] fixes the two hardware generics: the sample bit-width
//! and the window weight N. The derived quantities — shift amount, data
//! mask, accumulator sizing — are computed here once so the core and the
//! reference model cannot disagree on them.

use serde::{Deserialize, Serialize};

/// Rejected filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The window weight was zero.
    #[error("window weight must be at least 1")]
    ZeroWeight,

    /// The sample bit-width was outside the supported range.
    #[error("sample width {bits} is outside the supported range 1..=32")]
    SampleWidth {
        /// The offending width.
        bits: u32,
    },
}

/// Validated elaboration parameters for the moving-average filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    data_bits: u32,
    weight: u32,
}

impl FilterConfig {
    /// Validates and fixes the sample bit-width and window weight.
    pub fn new(data_bits: u32, weight: u32) -> Result<Self, ConfigError> {
        if weight == 0 {
            return Err(ConfigError::ZeroWeight);
        }
        if data_bits == 0 || data_bits > 32 {
            return Err(ConfigError::SampleWidth { bits: data_bits });
        }
        Ok(Self { data_bits, weight })
    }

    /// Sample bit-width.
    pub fn data_bits(self) -> u32 {
        self.data_bits
    }

    /// Window weight N: how many samples the moving average spans.
    pub fn weight(self) -> u32 {
        self.weight
    }

    /// Right-shift applied to the window sum: `ceil(log2(weight))`.
    ///
    /// Power-of-two division, so the average truncates for non-power-of-two
    /// weights exactly as the hardware does.
    pub fn shift(self) -> u32 {
        match self.weight {
            1 => 0,
            w => 32 - (w - 1).leading_zeros(),
        }
    }

    /// Mask that truncates a raw bus word to the sample width.
    pub fn data_mask(self) -> u64 {
        (1u64 << self.data_bits) - 1
    }

    /// Accumulator sizing bound in bits: `max(ceil(log2 N), width) * 2`.
    ///
    /// Deliberately generous; `N * (2^width - 1)` always fits below it.
    pub fn accumulator_bits(self) -> u32 {
        self.shift().max(self.data_bits) * 2
    }
}
