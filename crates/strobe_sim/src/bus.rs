//! Shared handshake bus state and the per-edge sample handed to observers.
//!
//! [`Bus`] holds the device-facing signal set: active-low reset plus a
//! valid/ready/data triple per direction. Each signal has exactly one writer —
//! the scenario side drives `reset_n`, `in_valid`, `in_data`, and `out_ready`;
//! the device drives `in_ready`, `out_valid`, and `out_data` — so no locking
//! or driver resolution is needed.
//!
//! [`EdgeSample`] is the stabilized view of one rising edge: the transfer
//! flags are computed from the values the device clocked (pre-edge), while
//! the device outputs it carries are the freshly registered (post-edge)
//! values. Observers only ever see this snapshot, which makes the
//! sample-after-the-edge rule hold by construction.

use crate::time::SimTime;

/// The shared signal state between the stimulus side and the device.
///
/// All signals power up low; in particular `reset_n = false` means reset is
/// asserted until a scenario releases it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bus {
    /// Active-low reset. `false` forces the device into its cleared state.
    pub reset_n: bool,
    /// Producer asserts: a sample is offered on `in_data`.
    pub in_valid: bool,
    /// The sample offered by the producer.
    pub in_data: u64,
    /// Device asserts: it will accept an offered sample at the next edge.
    pub in_ready: bool,
    /// Device asserts: a result is offered on `out_data`.
    pub out_valid: bool,
    /// The result offered by the device.
    pub out_data: u64,
    /// Consumer asserts: it will accept an offered result at the next edge.
    pub out_ready: bool,
}

impl Bus {
    /// Creates a bus in the power-on state (everything low, reset asserted).
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the input direction will transfer at the next edge.
    pub fn in_handshake(&self) -> bool {
        self.in_valid && self.in_ready
    }

    /// True when the output direction will transfer at the next edge.
    pub fn out_handshake(&self) -> bool {
        self.out_valid && self.out_ready
    }
}

/// One rising clock edge, sampled after it has stabilized.
///
/// The two transfer flags reflect the signal values *entering* the edge
/// (what the device clocked); `in_ready`, `out_valid`, and `out_data` are the
/// device's registered outputs *after* the edge. Transfers in the two
/// directions are computed independently and may coincide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeSample {
    /// Zero-based index of this rising edge.
    pub cycle: u64,
    /// Simulation time of the edge.
    pub time: SimTime,
    /// Reset level the device clocked (pre-edge).
    pub reset_n: bool,
    /// An input transfer occurred at this edge.
    pub in_accepted: bool,
    /// The sample that transferred (meaningful when `in_accepted`).
    pub in_data: u64,
    /// An output transfer occurred at this edge.
    pub out_fired: bool,
    /// Output-valid after the edge.
    pub out_valid: bool,
    /// Output data after the edge.
    pub out_data: u64,
    /// Input-ready after the edge.
    pub in_ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn powers_up_low() {
        let bus = Bus::new();
        assert!(!bus.reset_n);
        assert!(!bus.in_valid);
        assert!(!bus.in_ready);
        assert!(!bus.out_valid);
        assert!(!bus.out_ready);
        assert_eq!(bus.in_data, 0);
        assert_eq!(bus.out_data, 0);
    }

    #[test]
    fn handshakes_need_both_signals() {
        let mut bus = Bus::new();
        assert!(!bus.in_handshake());
        bus.in_valid = true;
        assert!(!bus.in_handshake());
        bus.in_ready = true;
        assert!(bus.in_handshake());

        bus.out_valid = true;
        assert!(!bus.out_handshake());
        bus.out_ready = true;
        assert!(bus.out_handshake());
    }

    #[test]
    fn directions_are_independent() {
        let mut bus = Bus::new();
        bus.in_valid = true;
        bus.in_ready = true;
        bus.out_valid = true;
        bus.out_ready = true;
        // Both directions can transfer on the same edge.
        assert!(bus.in_handshake() && bus.out_handshake());
    }
}
