//! Scenario drivers and end-to-end runners.
//!
//! Each scenario is an explicit state machine over
//! {Idle, Clocking, Resetting, Streaming, Draining, Checked}, registered
//! with the kernel as a drive task and resumed on every rising edge and on
//! its own timers. The scoreboard runs concurrently as a monitor; the
//! driver only sequences reset, stimulus, draining, and the final
//! readiness checks.
//!
//! Four scenarios are provided:
//!
//! 1. [`run_steady_stream`] — full-throttle sweep of 256 sequential bytes,
//!    consumer always ready.
//! 2. [`run_random_backpressure`] — the same sweep with per-cycle random
//!    consumer pauses, then pause-clearing and a settle interval.
//! 3. [`run_reset_hold`] — reset held with the clock running; the producer
//!    ready signal must stay low on every edge.
//! 4. [`run_clock_loss`] — reset held with the clock withheld entirely; the
//!    same deassertion must hold with zero edges observed.

use serde::{Deserialize, Serialize};

use strobe_dut::{AvgFilter, FilterConfig};
use strobe_sim::{
    Control, DriveCtx, DriveTask, SimError, SimSummary, SimTime, Simulation, Wake,
};

use crate::agents::{ByteSource, SinkAgent};
use crate::pause::PausePattern;
use crate::scoreboard::{AvgScoreboard, OutputLog};

/// Clock half-period used by all scenarios.
pub const CLOCK_HALF_PERIOD: SimTime = SimTime::from_ns(2);
/// Width of the standard reset pulse.
pub const RESET_PULSE: SimTime = SimTime::from_ns(5);
/// Settle interval after clearing consumer pauses.
pub const DRAIN_SETTLE: SimTime = SimTime::from_ns(5);
/// Observation window for the reset-hold and clock-loss scenarios.
pub const RESET_HOLD: SimTime = SimTime::from_ns(10);
/// Number of samples in the standard sequential sweep.
pub const STREAM_LEN: u64 = 256;

// Generous watchdog; a healthy scenario finishes orders of magnitude sooner.
const WATCHDOG: SimTime = SimTime::from_us(100);

/// Result of a streaming scenario: the run summary plus the verified output
/// beat stream, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Kernel run summary.
    pub summary: SimSummary,
    /// Every output beat the scoreboard verified.
    pub outputs: Vec<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Clocking,
    Resetting,
    Streaming,
    Draining,
    Checked,
}

/// Drives a full traffic scenario: reset pulse, stream a payload, drain,
/// then check that input-ready returns.
pub struct StreamScenario {
    phase: Phase,
    source: ByteSource,
    sink: SinkAgent,
    expect: u64,
    settle: Option<SimTime>,
    drain_until: Option<SimTime>,
}

impl StreamScenario {
    /// Full-throughput variant: the consumer is always ready and the final
    /// readiness check runs on the edge after the last beat.
    pub fn steady(payload: impl IntoIterator<Item = u64>) -> Self {
        Self::with_sink(payload, SinkAgent::new(), None)
    }

    /// Backpressured variant: the consumer draws pauses from `pauses` until
    /// all beats have fired, then clears them and settles for `settle`
    /// before the final readiness check.
    pub fn backpressured(
        payload: impl IntoIterator<Item = u64>,
        pauses: PausePattern,
        settle: SimTime,
    ) -> Self {
        Self::with_sink(payload, SinkAgent::with_pauses(pauses), Some(settle))
    }

    fn with_sink(
        payload: impl IntoIterator<Item = u64>,
        sink: SinkAgent,
        settle: Option<SimTime>,
    ) -> Self {
        let source = ByteSource::new(payload);
        let expect = source.remaining() as u64;
        Self {
            phase: Phase::Idle,
            source,
            sink,
            expect,
            settle,
            drain_until: None,
        }
    }
}

impl DriveTask for StreamScenario {
    fn resume(&mut self, ctx: &mut DriveCtx<'_>, wake: Wake<'_>) -> Result<Control, SimError> {
        // Agents run on every edge regardless of phase: the sink counts
        // fired beats and redrives ready, the source retires accepted
        // samples and offers the next.
        if let Wake::Edge(edge) = wake {
            self.sink.drive(ctx.bus, Some(edge));
            self.source.drive(ctx.bus, Some(edge));
        }

        match self.phase {
            Phase::Idle => {
                ctx.start_clock();
                ctx.bus.reset_n = false;
                self.sink.drive(ctx.bus, None);
                self.source.drive(ctx.bus, None);
                self.phase = Phase::Clocking;
                Ok(Control::WakeAt(ctx.now + RESET_PULSE))
            }
            Phase::Clocking | Phase::Resetting => match wake {
                Wake::Edge(_) => {
                    self.phase = Phase::Resetting;
                    Ok(Control::Pend)
                }
                Wake::Timer => {
                    // Reset pulse elapsed: release and start streaming.
                    ctx.bus.reset_n = true;
                    self.source.arm();
                    self.source.drive(ctx.bus, None);
                    self.phase = Phase::Streaming;
                    Ok(Control::Pend)
                }
                Wake::Start => Ok(Control::Pend),
            },
            Phase::Streaming => {
                if matches!(wake, Wake::Edge(_)) && self.sink.received() >= self.expect {
                    self.phase = Phase::Draining;
                    if let Some(settle) = self.settle {
                        self.sink.clear_pauses();
                        self.sink.drive(ctx.bus, None);
                        let deadline = ctx.now + settle;
                        self.drain_until = Some(deadline);
                        return Ok(Control::WakeAt(deadline));
                    }
                }
                Ok(Control::Pend)
            }
            Phase::Draining => match wake {
                Wake::Edge(_) => {
                    let settled = self.drain_until.is_none_or(|d| ctx.now >= d);
                    if settled {
                        if !ctx.bus.in_ready {
                            return Err(SimError::ReadinessViolation {
                                time: ctx.now,
                                reason: "input-ready not reasserted after traffic drained".into(),
                            });
                        }
                        self.phase = Phase::Checked;
                        return Ok(Control::Finish);
                    }
                    Ok(Control::Pend)
                }
                _ => Ok(Control::Pend),
            },
            Phase::Checked => Ok(Control::Finish),
        }
    }
}

/// Holds reset with the clock running and requires input-ready to stay low
/// on every edge of the observation window.
pub struct ResetHoldScenario {
    phase: Phase,
    hold: SimTime,
}

impl ResetHoldScenario {
    /// Creates the scenario with the given observation window.
    pub fn new(hold: SimTime) -> Self {
        Self {
            phase: Phase::Idle,
            hold,
        }
    }
}

impl DriveTask for ResetHoldScenario {
    fn resume(&mut self, ctx: &mut DriveCtx<'_>, wake: Wake<'_>) -> Result<Control, SimError> {
        match self.phase {
            Phase::Idle => {
                ctx.start_clock();
                ctx.bus.reset_n = false;
                ctx.bus.out_ready = false;
                self.phase = Phase::Clocking;
                Ok(Control::WakeAt(ctx.now + self.hold))
            }
            Phase::Clocking | Phase::Resetting => match wake {
                Wake::Edge(_) => {
                    if ctx.bus.in_ready {
                        return Err(SimError::ReadinessViolation {
                            time: ctx.now,
                            reason: "input-ready asserted while reset held".into(),
                        });
                    }
                    self.phase = Phase::Resetting;
                    Ok(Control::Pend)
                }
                Wake::Timer => {
                    if ctx.edges == 0 {
                        return Err(SimError::ScenarioCheck {
                            time: ctx.now,
                            reason: "clock produced no edges during the reset hold".into(),
                        });
                    }
                    if ctx.bus.in_ready {
                        return Err(SimError::ReadinessViolation {
                            time: ctx.now,
                            reason: "input-ready asserted while reset held".into(),
                        });
                    }
                    self.phase = Phase::Checked;
                    Ok(Control::Finish)
                }
                Wake::Start => Ok(Control::Pend),
            },
            _ => Ok(Control::Finish),
        }
    }
}

/// Holds reset with the clock withheld entirely: after the observation
/// window, zero edges must have occurred and input-ready must still be low.
pub struct ClockLossScenario {
    phase: Phase,
    hold: SimTime,
}

impl ClockLossScenario {
    /// Creates the scenario with the given observation window.
    pub fn new(hold: SimTime) -> Self {
        Self {
            phase: Phase::Idle,
            hold,
        }
    }
}

impl DriveTask for ClockLossScenario {
    fn resume(&mut self, ctx: &mut DriveCtx<'_>, wake: Wake<'_>) -> Result<Control, SimError> {
        match self.phase {
            Phase::Idle => {
                // The clock is deliberately never started.
                ctx.bus.reset_n = false;
                ctx.bus.out_ready = false;
                self.phase = Phase::Resetting;
                Ok(Control::WakeAt(ctx.now + self.hold))
            }
            Phase::Resetting => match wake {
                Wake::Timer => {
                    if ctx.edges != 0 {
                        return Err(SimError::ScenarioCheck {
                            time: ctx.now,
                            reason: format!(
                                "observed {} clock edges while the clock was withheld",
                                ctx.edges
                            ),
                        });
                    }
                    if ctx.bus.in_ready {
                        return Err(SimError::ReadinessViolation {
                            time: ctx.now,
                            reason: "input-ready asserted without any clock".into(),
                        });
                    }
                    self.phase = Phase::Checked;
                    Ok(Control::Finish)
                }
                _ => Ok(Control::Pend),
            },
            _ => Ok(Control::Finish),
        }
    }
}

/// Runs the full-throughput sweep scenario against the behavioral core.
pub fn run_steady_stream(cfg: FilterConfig) -> Result<ScenarioReport, SimError> {
    run_stream(cfg, StreamScenario::steady(byte_sweep()))
}

/// Runs the sweep under random consumer backpressure. `seed` pins the pause
/// pattern for replay; `None` draws a fresh one.
pub fn run_random_backpressure(
    cfg: FilterConfig,
    seed: Option<u64>,
) -> Result<ScenarioReport, SimError> {
    let pauses = match seed {
        Some(seed) => PausePattern::seeded(seed),
        None => PausePattern::random(),
    };
    run_stream(
        cfg,
        StreamScenario::backpressured(byte_sweep(), pauses, DRAIN_SETTLE),
    )
}

/// Runs the reset-hold scenario (clock running, reset asserted).
pub fn run_reset_hold(cfg: FilterConfig) -> Result<SimSummary, SimError> {
    let mut sim = Simulation::new(AvgFilter::new(cfg), CLOCK_HALF_PERIOD);
    sim.set_time_limit(WATCHDOG);
    sim.add_monitor(Box::new(AvgScoreboard::new(cfg, OutputLog::new())));
    sim.add_driver(Box::new(ResetHoldScenario::new(RESET_HOLD)));
    sim.run()
}

/// Runs the clock-loss scenario (no clock at all, reset asserted).
pub fn run_clock_loss(cfg: FilterConfig) -> Result<SimSummary, SimError> {
    let mut sim = Simulation::new(AvgFilter::new(cfg), CLOCK_HALF_PERIOD);
    sim.set_time_limit(WATCHDOG);
    sim.add_driver(Box::new(ClockLossScenario::new(RESET_HOLD)));
    sim.run()
}

/// The standard stimulus: sequential byte values 0..=255.
fn byte_sweep() -> impl Iterator<Item = u64> {
    0..STREAM_LEN
}

/// Shared plumbing for the two streaming scenarios.
pub fn run_stream(
    cfg: FilterConfig,
    scenario: StreamScenario,
) -> Result<ScenarioReport, SimError> {
    let log = OutputLog::new();
    let mut sim = Simulation::new(AvgFilter::new(cfg), CLOCK_HALF_PERIOD);
    sim.set_time_limit(WATCHDOG);
    sim.add_monitor(Box::new(AvgScoreboard::new(cfg, log.clone())));
    sim.add_driver(Box::new(scenario));
    let summary = sim.run()?;
    Ok(ScenarioReport {
        summary,
        outputs: log.snapshot(),
    })
}
