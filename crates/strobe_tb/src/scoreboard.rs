//! Synchronization and comparison against the golden model.
//!
//! [`AvgScoreboard`] is the passive observer wired into the kernel's sample
//! phase. On every rising edge it replays the reference update sequence in
//! the required order: reset clears the model; an accepted input sample is
//! pushed; an asserted output-valid first compares the device's data against
//! the held result, *then* latches the next result from the updated sum.
//! Deviating from compare-before-latch would desynchronize the model from
//! the device's one-beat pipeline and report false mismatches.
//!
//! The first failed comparison aborts the run; there is no recovery path.

use std::cell::RefCell;
use std::rc::Rc;

use strobe_dut::FilterConfig;
use strobe_sim::{EdgeSample, Monitor, SimError};

use crate::golden::GoldenAverage;

/// Shared handle to the stream of output beats a scoreboard verified.
///
/// Plain `Rc<RefCell<_>>`: scheduling is single-threaded and cooperative, so
/// the handle just lets the scenario runner keep a view into a scoreboard
/// owned by the kernel.
#[derive(Clone, Debug, Default)]
pub struct OutputLog {
    entries: Rc<RefCell<Vec<u64>>>,
}

impl OutputLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of beats recorded.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// True when no beat has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// A copy of the recorded beat values, in order.
    pub fn snapshot(&self) -> Vec<u64> {
        self.entries.borrow().clone()
    }

    fn push(&self, value: u64) {
        self.entries.borrow_mut().push(value);
    }
}

/// The reference-model observer: checks every device output beat and the
/// reset-readiness invariant.
#[derive(Debug)]
pub struct AvgScoreboard {
    model: GoldenAverage,
    log: OutputLog,
    // Output-valid level on the previous edge, for beat-boundary detection.
    beat_live: bool,
}

impl AvgScoreboard {
    /// Creates a scoreboard recording verified beats into `log`.
    pub fn new(cfg: FilterConfig, log: OutputLog) -> Self {
        Self {
            model: GoldenAverage::new(cfg),
            log,
            beat_live: false,
        }
    }
}

impl Monitor for AvgScoreboard {
    fn sample(&mut self, edge: &EdgeSample) -> Result<(), SimError> {
        if !edge.reset_n {
            if edge.in_ready {
                return Err(SimError::ReadinessViolation {
                    time: edge.time,
                    reason: "input-ready asserted while reset held".into(),
                });
            }
            self.model.clear();
            self.beat_live = false;
            return Ok(());
        }

        if edge.in_accepted {
            self.model.push(edge.in_data);
        }

        if edge.out_valid {
            let expected = self.model.result();
            if edge.out_data != expected {
                return Err(SimError::ValueMismatch {
                    cycle: edge.cycle,
                    time: edge.time,
                    expected,
                    actual: edge.out_data,
                });
            }
            // A fresh beat: either nothing was pending, or the pending beat
            // just fired and this edge registered a new one. A beat merely
            // held under backpressure is re-checked but not re-logged.
            if !self.beat_live || edge.out_fired {
                self.log.push(edge.out_data);
            }
            self.model.latch();
        }
        self.beat_live = edge.out_valid;
        Ok(())
    }
}
