//! Producer and consumer bus agents.
//!
//! Both agents are plain per-edge components owned by the scenario driver,
//! which keeps the single-writer-per-signal rule trivially true: the source
//! writes `in_valid`/`in_data`, the sink writes `out_ready`, nobody else
//! touches either.

use std::collections::VecDeque;

use strobe_sim::{Bus, EdgeSample};

use crate::pause::PausePattern;

/// Streams a queue of samples into the device, holding each offered value
/// until the handshake accepts it.
#[derive(Debug, Clone)]
pub struct ByteSource {
    pending: VecDeque<u64>,
    active: bool,
    sent: u64,
}

impl ByteSource {
    /// Creates a source preloaded with `payload`, initially inactive.
    pub fn new(payload: impl IntoIterator<Item = u64>) -> Self {
        Self {
            pending: payload.into_iter().collect(),
            active: false,
            sent: 0,
        }
    }

    /// Starts offering samples (typically once reset has been released).
    pub fn arm(&mut self) {
        self.active = true;
    }

    /// Samples accepted by the device so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// True once every sample has been accepted.
    pub fn exhausted(&self) -> bool {
        self.pending.is_empty()
    }

    /// Samples still waiting to be accepted.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Per-edge drive: retire an accepted sample, then present the next.
    pub fn drive(&mut self, bus: &mut Bus, edge: Option<&EdgeSample>) {
        if let Some(e) = edge {
            if e.in_accepted {
                self.pending.pop_front();
                self.sent += 1;
            }
        }
        match self.pending.front() {
            Some(&value) if self.active => {
                bus.in_valid = true;
                bus.in_data = value;
            }
            _ => {
                bus.in_valid = false;
                bus.in_data = 0;
            }
        }
    }
}

/// Accepts device output beats, optionally injecting per-cycle pauses.
#[derive(Debug, Clone, Default)]
pub struct SinkAgent {
    pauses: Option<PausePattern>,
    received: u64,
}

impl SinkAgent {
    /// A sink that is always ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that draws one pause decision per clock edge.
    pub fn with_pauses(pauses: PausePattern) -> Self {
        Self {
            pauses: Some(pauses),
            received: 0,
        }
    }

    /// Drops the pause pattern; the sink is permanently ready afterwards.
    pub fn clear_pauses(&mut self) {
        self.pauses = None;
    }

    /// Output beats consumed so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Per-edge drive: count a fired beat, then set ready for the next
    /// cycle from the pause pattern.
    pub fn drive(&mut self, bus: &mut Bus, edge: Option<&EdgeSample>) {
        if let Some(e) = edge {
            if e.out_fired {
                self.received += 1;
            }
        }
        let pause = match &mut self.pauses {
            Some(pattern) => pattern.next_pause(),
            None => false,
        };
        bus.out_ready = !pause;
    }
}
