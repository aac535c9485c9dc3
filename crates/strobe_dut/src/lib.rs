//! Behavioral device side of the strobe harness: the validated filter
//! parameters and a cycle-accurate moving-average core implementing the
//! [`strobe_sim::Device`] boundary.
//!
//! The harness crate is written against the `Device` trait, so this core is
//! one pluggable model among possible others (fault-injecting wrappers,
//! alternative pipeline depths).

#![warn(missing_docs)]

pub mod config;
pub mod filter;

pub use config::{ConfigError, FilterConfig};
pub use filter::AvgFilter;
