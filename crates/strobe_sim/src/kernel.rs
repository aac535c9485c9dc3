//! Event-driven simulation kernel.
//!
//! [`Simulation`] owns the bus, the clock, the device, and the registered
//! cooperative tasks. It runs a min-heap event queue carrying clock toggles
//! and task timers. On every rising edge it clocks the device, captures the
//! stabilized [`EdgeSample`], resumes the drive tasks, and then samples the
//! monitors — in that order, so observers always see post-edge state.
//!
//! The run ends when every drive task has finished. An empty event queue
//! before that point, or an event past the watchdog limit, is a fatal error:
//! a verification scenario that cannot make progress has already failed.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::bus::{Bus, EdgeSample};
use crate::clock::Clock;
use crate::device::Device;
use crate::error::SimError;
use crate::task::{Control, DriveCtx, DriveTask, Monitor, Wake};
use crate::time::SimTime;

/// What a queued event does when dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EventKind {
    /// Flip the clock level; rising flips dispatch a full edge.
    ClockToggle,
    /// Resume one drive task that requested a timed wait.
    Timer {
        /// Index of the requesting task.
        driver: usize,
    },
}

/// A scheduled event. Ordered by time, then by insertion sequence so that
/// same-time events dispatch in FIFO order.
#[derive(Clone, Copy, Debug)]
struct Event {
    time: SimTime,
    seq: u64,
    kind: EventKind,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time.cmp(&other.time).then(self.seq.cmp(&other.seq))
    }
}

/// The result of a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimSummary {
    /// Simulation time when the last drive task finished.
    pub final_time: SimTime,
    /// Total rising edges dispatched.
    pub cycles: u64,
}

struct DriverSlot {
    task: Box<dyn DriveTask>,
    done: bool,
}

/// The simulation kernel: bus, clock, device, tasks, and the event queue.
pub struct Simulation<D: Device> {
    device: D,
    bus: Bus,
    clock: Clock,
    now: SimTime,
    queue: BinaryHeap<Reverse<Event>>,
    next_seq: u64,
    drivers: Vec<DriverSlot>,
    monitors: Vec<Box<dyn Monitor>>,
    time_limit: Option<SimTime>,
}

impl<D: Device> Simulation<D> {
    /// Creates a kernel for the given device with a stopped clock of the
    /// given half-period. The bus powers up with reset asserted.
    pub fn new(device: D, half_period: SimTime) -> Self {
        Self {
            device,
            bus: Bus::new(),
            clock: Clock::new(half_period),
            now: SimTime::ZERO,
            queue: BinaryHeap::new(),
            next_seq: 0,
            drivers: Vec::new(),
            monitors: Vec::new(),
            time_limit: None,
        }
    }

    /// Registers a stimulus-side task.
    pub fn add_driver(&mut self, task: Box<dyn DriveTask>) {
        self.drivers.push(DriverSlot { task, done: false });
    }

    /// Registers a passive observer.
    pub fn add_monitor(&mut self, monitor: Box<dyn Monitor>) {
        self.monitors.push(monitor);
    }

    /// Arms the watchdog: any event scheduled past `limit` aborts the run.
    pub fn set_time_limit(&mut self, limit: SimTime) {
        self.time_limit = Some(limit);
    }

    /// Current bus state (post-run inspection).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The device model (post-run inspection).
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Runs until every drive task finishes.
    ///
    /// Drive tasks are first resumed once with [`Wake::Start`] at time zero
    /// to perform setup, mirroring an initial-process phase; after that the
    /// event queue alone makes progress.
    pub fn run(&mut self) -> Result<SimSummary, SimError> {
        for i in 0..self.drivers.len() {
            self.resume_driver(i, Wake::Start)?;
        }

        while !self.all_done() {
            let Some(Reverse(ev)) = self.queue.pop() else {
                return Err(SimError::Stalled { time: self.now });
            };
            if let Some(limit) = self.time_limit {
                if ev.time > limit {
                    return Err(SimError::TimeLimitExceeded { limit });
                }
            }
            self.now = ev.time;

            match ev.kind {
                EventKind::ClockToggle => {
                    let rising = self.clock.toggle();
                    let next = self.now + self.clock.half_period();
                    self.push_event(next, EventKind::ClockToggle);
                    if rising {
                        self.dispatch_edge()?;
                    }
                }
                EventKind::Timer { driver } => {
                    self.resume_driver(driver, Wake::Timer)?;
                }
            }
        }

        Ok(SimSummary {
            final_time: self.now,
            cycles: self.clock.rising_edges(),
        })
    }

    fn all_done(&self) -> bool {
        self.drivers.iter().all(|d| d.done)
    }

    fn push_event(&mut self, time: SimTime, kind: EventKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Event { time, seq, kind }));
    }

    /// Clocks the device and dispatches the edge to all tasks.
    fn dispatch_edge(&mut self) -> Result<(), SimError> {
        let edge = self.step_device();
        for i in 0..self.drivers.len() {
            self.resume_driver(i, Wake::Edge(&edge))?;
        }
        for monitor in &mut self.monitors {
            monitor.sample(&edge)?;
        }
        Ok(())
    }

    /// Captures pre-edge transfer flags, clocks the device, and assembles
    /// the stabilized sample.
    fn step_device(&mut self) -> EdgeSample {
        let pre = self.bus;
        self.device.posedge(&mut self.bus);
        EdgeSample {
            cycle: self.clock.rising_edges() - 1,
            time: self.now,
            reset_n: pre.reset_n,
            in_accepted: pre.in_handshake(),
            in_data: pre.in_data,
            out_fired: pre.out_handshake(),
            out_valid: self.bus.out_valid,
            out_data: self.bus.out_data,
            in_ready: self.bus.in_ready,
        }
    }

    fn resume_driver(&mut self, index: usize, wake: Wake<'_>) -> Result<(), SimError> {
        let control;
        let clock_start;
        {
            let slot = &mut self.drivers[index];
            if slot.done {
                return Ok(());
            }
            let mut ctx = DriveCtx {
                bus: &mut self.bus,
                now: self.now,
                edges: self.clock.rising_edges(),
                clock_start: false,
            };
            control = slot.task.resume(&mut ctx, wake)?;
            clock_start = ctx.clock_start;
        }

        if clock_start && !self.clock.is_running() {
            self.clock.start();
            let first = self.now + self.clock.half_period();
            self.push_event(first, EventKind::ClockToggle);
        }

        match control {
            Control::Pend => {}
            Control::WakeAt(time) => {
                let time = time.max(self.now);
                self.push_event(time, EventKind::Timer { driver: index });
            }
            Control::Finish => self.drivers[index].done = true,
        }
        Ok(())
    }
}
