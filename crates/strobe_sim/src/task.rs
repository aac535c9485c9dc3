//! Cooperative task model: drive tasks, monitors, and their scheduling
//! contract.
//!
//! Every rising edge is dispatched in two fixed phases. First the kernel
//! clocks the device and resumes each [`DriveTask`] — the stimulus side —
//! which may rewrite producer signals for the next cycle. Then each
//! [`Monitor`] samples the stabilized [`EdgeSample`]. Monitors never touch
//! the bus, so the phase split guarantees observers read post-edge state
//! regardless of task registration order.

use crate::bus::{Bus, EdgeSample};
use crate::error::SimError;
use crate::time::SimTime;

/// Why a drive task is being resumed.
#[derive(Clone, Copy, Debug)]
pub enum Wake<'a> {
    /// Simulation start, before any clock activity. Tasks perform their
    /// setup here (start the clock, assert reset, drive initial values).
    Start,
    /// A rising clock edge, with its stabilized sample.
    Edge(&'a EdgeSample),
    /// A timed wait previously requested by this task has elapsed.
    Timer,
}

/// What a drive task wants from the scheduler next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Resume on the next rising edge.
    Pend,
    /// Also resume at the given absolute time. Edges in between still
    /// resume the task; the timer fires even when the clock is withheld.
    WakeAt(SimTime),
    /// The task has run to completion.
    Finish,
}

/// Mutable view handed to a drive task on each resume.
pub struct DriveCtx<'a> {
    /// The shared bus. Drive tasks own the producer-side signals.
    pub bus: &'a mut Bus,
    /// Current simulation time.
    pub now: SimTime,
    /// Rising edges dispatched so far.
    pub edges: u64,
    pub(crate) clock_start: bool,
}

impl DriveCtx<'_> {
    /// Requests the free-running clock to start. Idempotent; a clock that
    /// was never started produces no edges at all.
    pub fn start_clock(&mut self) {
        self.clock_start = true;
    }
}

/// A stimulus-side task resumed on every rising edge (and on its timers).
pub trait DriveTask {
    /// Advances the task. Returning an error aborts the run.
    fn resume(&mut self, ctx: &mut DriveCtx<'_>, wake: Wake<'_>) -> Result<Control, SimError>;
}

/// A passive observer sampled once per rising edge, after all drive tasks.
pub trait Monitor {
    /// Checks one stabilized edge. Returning an error aborts the run.
    fn sample(&mut self, edge: &EdgeSample) -> Result<(), SimError>;
}
