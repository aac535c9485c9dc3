//! Cycle-accurate behavioral model of the streaming moving-average core.
//!
//! [`AvgFilter`] mimics the register-transfer behavior of the hardware
//! filter: every state element updates only on a rising clock edge, all
//! decisions are made from pre-edge values, and an asserted (low) reset
//! clears every register including input-ready.
//!
//! One output beat is produced per accepted input sample, with one beat of
//! latency: the beat registered when sample `k` is accepted carries the
//! average of the window as it stood *before* `k` was pushed. Input-ready
//! deasserts while a beat is pending delivery, so consumer backpressure
//! propagates to the producer with no data loss.

use std::collections::VecDeque;

use strobe_sim::{Bus, Device};

use crate::config::FilterConfig;

/// The behavioral moving-average filter core.
#[derive(Debug, Clone)]
pub struct AvgFilter {
    cfg: FilterConfig,
    window: VecDeque<u64>,
    acc: u128,
    out_data: u64,
    out_valid: bool,
    in_ready: bool,
}

impl AvgFilter {
    /// Creates a core in its cleared (post-reset) state.
    pub fn new(cfg: FilterConfig) -> Self {
        Self {
            cfg,
            window: VecDeque::with_capacity(cfg.weight() as usize),
            acc: 0,
            out_data: 0,
            out_valid: false,
            in_ready: false,
        }
    }

    /// The elaboration parameters this core was built with.
    pub fn config(&self) -> FilterConfig {
        self.cfg
    }

    /// Number of samples currently held in the window.
    pub fn occupancy(&self) -> usize {
        self.window.len()
    }
}

impl Device for AvgFilter {
    fn posedge(&mut self, bus: &mut Bus) {
        if !bus.reset_n {
            self.window.clear();
            self.acc = 0;
            self.out_data = 0;
            self.out_valid = false;
            self.in_ready = false;
        } else {
            let fired = self.out_valid && bus.out_ready;
            let accepted = bus.in_valid && self.in_ready;
            if accepted {
                // The registered beat carries the average of the window as
                // it stood before this sample.
                self.out_data = (self.acc >> self.cfg.shift()) as u64;
                self.out_valid = true;

                let sample = bus.in_data & self.cfg.data_mask();
                if self.window.len() == self.cfg.weight() as usize {
                    if let Some(oldest) = self.window.pop_front() {
                        self.acc -= u128::from(oldest);
                    }
                }
                self.window.push_back(sample);
                self.acc += u128::from(sample);
            } else if fired {
                self.out_valid = false;
            }
            // Input stalls while a beat is pending delivery.
            self.in_ready = !self.out_valid;
        }

        bus.in_ready = self.in_ready;
        bus.out_valid = self.out_valid;
        bus.out_data = self.out_data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(bits: u32, weight: u32) -> (AvgFilter, Bus) {
        let cfg = FilterConfig::new(bits, weight).unwrap();
        (AvgFilter::new(cfg), Bus::new())
    }

    /// Clocks the core until the pending sample is accepted, consuming any
    /// intervening output beat, and returns the beat value seen.
    fn push_sample(f: &mut AvgFilter, bus: &mut Bus, sample: u64) -> u64 {
        bus.in_valid = true;
        bus.in_data = sample;
        bus.out_ready = true;
        loop {
            let accepted = bus.in_handshake();
            f.posedge(bus);
            if accepted {
                bus.in_valid = false;
                return bus.out_data;
            }
        }
    }

    #[test]
    fn reset_clears_everything() {
        let (mut f, mut bus) = filter(8, 4);
        bus.reset_n = true;
        f.posedge(&mut bus);
        push_sample(&mut f, &mut bus, 42);
        assert_eq!(f.occupancy(), 1);

        bus.reset_n = false;
        f.posedge(&mut bus);
        assert_eq!(f.occupancy(), 0);
        assert!(!bus.in_ready);
        assert!(!bus.out_valid);
        assert_eq!(bus.out_data, 0);
    }

    #[test]
    fn ready_stays_low_while_reset_held() {
        let (mut f, mut bus) = filter(8, 4);
        for _ in 0..5 {
            f.posedge(&mut bus);
            assert!(!bus.in_ready);
        }
    }

    #[test]
    fn ready_rises_on_first_edge_after_release() {
        let (mut f, mut bus) = filter(8, 4);
        f.posedge(&mut bus);
        assert!(!bus.in_ready);
        bus.reset_n = true;
        f.posedge(&mut bus);
        assert!(bus.in_ready);
    }

    #[test]
    fn unclocked_core_never_raises_ready() {
        let (_f, bus) = filter(8, 4);
        // No posedge calls at all: the cleared registers are all the
        // outside world can observe.
        assert!(!bus.in_ready);
        assert!(!bus.out_valid);
    }

    #[test]
    fn first_beat_is_zero() {
        let (mut f, mut bus) = filter(8, 4);
        bus.reset_n = true;
        f.posedge(&mut bus);
        let beat = push_sample(&mut f, &mut bus, 99);
        assert_eq!(beat, 0);
        assert!(bus.out_valid);
    }

    #[test]
    fn beats_lag_by_one_sample_and_evict_the_oldest() {
        let (mut f, mut bus) = filter(8, 2);
        bus.reset_n = true;
        f.posedge(&mut bus);

        assert_eq!(push_sample(&mut f, &mut bus, 10), 0);
        assert_eq!(push_sample(&mut f, &mut bus, 20), 10 >> 1);
        assert_eq!(push_sample(&mut f, &mut bus, 30), (10 + 20) >> 1);
        // 10 has been evicted by now.
        assert_eq!(push_sample(&mut f, &mut bus, 40), (20 + 30) >> 1);
        assert_eq!(f.occupancy(), 2);
    }

    #[test]
    fn samples_truncate_to_configured_width() {
        let (mut f, mut bus) = filter(4, 1);
        bus.reset_n = true;
        f.posedge(&mut bus);

        assert_eq!(push_sample(&mut f, &mut bus, 0xFF), 0);
        // 0xFF was stored as 0xF; weight 1 means shift 0.
        assert_eq!(push_sample(&mut f, &mut bus, 0x01), 0xF);
    }

    #[test]
    fn stalled_beat_is_held_and_blocks_input() {
        let (mut f, mut bus) = filter(8, 2);
        bus.reset_n = true;
        f.posedge(&mut bus);

        push_sample(&mut f, &mut bus, 10);
        // Second sample goes in, beat for it pending; stall the consumer.
        bus.in_valid = true;
        bus.in_data = 20;
        bus.out_ready = true;
        while !bus.in_handshake() {
            f.posedge(&mut bus);
        }
        f.posedge(&mut bus);
        bus.in_valid = false;
        bus.out_ready = false;

        let held = bus.out_data;
        for _ in 0..4 {
            f.posedge(&mut bus);
            assert!(bus.out_valid, "beat must be held under backpressure");
            assert_eq!(bus.out_data, held);
            assert!(!bus.in_ready, "input must stall while a beat is pending");
        }

        // Release: the beat fires and ready returns.
        bus.out_ready = true;
        f.posedge(&mut bus);
        f.posedge(&mut bus);
        assert!(!bus.out_valid);
        assert!(bus.in_ready);
    }

    #[test]
    fn ready_returns_after_traffic() {
        let (mut f, mut bus) = filter(8, 4);
        bus.reset_n = true;
        f.posedge(&mut bus);
        for x in 0..8 {
            push_sample(&mut f, &mut bus, x);
        }
        bus.out_ready = true;
        f.posedge(&mut bus);
        f.posedge(&mut bus);
        assert!(bus.in_ready);
        assert!(!bus.out_valid);
    }
}
