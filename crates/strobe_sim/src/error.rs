//! Error taxonomy for harness runs.
//!
//! Every check the harness performs is a synchronous in-line assertion; the
//! first failure aborts the run and surfaces as a [`SimError`]. There is no
//! retry or degraded mode.

use crate::time::SimTime;

/// Fatal conditions raised during a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// The device's output sample differed from the reference result on an
    /// edge where output-valid was asserted.
    #[error("output mismatch at cycle {cycle} ({time}): expected {expected}, got {actual}")]
    ValueMismatch {
        /// Rising-edge index at which the mismatch was observed.
        cycle: u64,
        /// Simulation time of the offending edge.
        time: SimTime,
        /// The reference model's held result.
        expected: u64,
        /// The value the device actually emitted.
        actual: u64,
    },

    /// The producer-facing ready signal was in the wrong state (asserted
    /// during reset or clock absence, or deasserted after traffic drained).
    #[error("readiness violation at {time}: {reason}")]
    ReadinessViolation {
        /// Simulation time of the check.
        time: SimTime,
        /// Which readiness rule was broken.
        reason: String,
    },

    /// A scenario-level invariant failed (e.g. the clock did not run, or
    /// edges appeared while the clock was withheld).
    #[error("scenario check failed at {time}: {reason}")]
    ScenarioCheck {
        /// Simulation time of the check.
        time: SimTime,
        /// Which invariant was broken.
        reason: String,
    },

    /// The event queue drained while a scenario task was still pending, so
    /// no further progress was possible.
    #[error("simulation stalled at {time}: no pending events")]
    Stalled {
        /// Time at which the queue ran dry.
        time: SimTime,
    },

    /// The watchdog limit elapsed before every scenario task finished.
    #[error("time limit exceeded: {limit}")]
    TimeLimitExceeded {
        /// The configured watchdog limit.
        limit: SimTime,
    },
}
