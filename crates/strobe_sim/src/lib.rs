//! Edge-driven simulation substrate for the strobe verification harness.
//!
//! This crate provides the machinery a streaming-protocol testbench runs on:
//! femtosecond simulation time, a withholdable free-running clock, the shared
//! valid/ready signal bus, the device boundary trait, and an event kernel
//! that resumes cooperative stimulus tasks and passive monitors on every
//! rising edge.
//!
//! # Scheduling model
//!
//! Single-threaded cooperative concurrency, synchronized strictly to clock
//! edges. Each rising edge runs in two fixed phases: the device is clocked
//! and drive tasks resumed first, then monitors sample an immutable
//! [`EdgeSample`] snapshot. Signal writers are partitioned by construction
//! (stimulus side vs. device side), so no locking exists anywhere.
//!
//! # Modules
//!
//! - `time` — femtosecond-precision simulation time
//! - `error` — fatal error taxonomy for runs
//! - `bus` — shared signal state and per-edge samples
//! - `clock` — clock level/edge bookkeeping
//! - `device` — the device-under-test boundary trait
//! - `task` — drive task and monitor traits
//! - `kernel` — the event queue and run loop

#![warn(missing_docs)]

pub mod bus;
pub mod clock;
pub mod device;
pub mod error;
pub mod kernel;
pub mod task;
pub mod time;

pub use bus::{Bus, EdgeSample};
pub use clock::Clock;
pub use device::Device;
pub use error::SimError;
pub use kernel::{SimSummary, Simulation};
pub use task::{Control, DriveCtx, DriveTask, Monitor, Wake};
pub use time::SimTime;
