//! Verification harness for the streaming moving-average core.
//!
//! The harness couples a golden reference model to the valid/ready handshake
//! events of the device under test. A scenario driver sequences reset, the
//! stimulus sweep, optional consumer backpressure, and the final readiness
//! checks, while the scoreboard observes every clock edge concurrently and
//! aborts on the first divergence.
//!
//! # Modules
//!
//! - `golden` — bit-exact reference model of the windowed average
//! - `pause` — the repeating random backpressure pattern
//! - `agents` — producer and consumer bus agents
//! - `scoreboard` — per-edge comparison against the reference
//! - `scenario` — scenario state machines and end-to-end runners

pub mod agents;
pub mod golden;
pub mod pause;
pub mod scenario;
pub mod scoreboard;

pub use agents::{ByteSource, SinkAgent};
pub use golden::GoldenAverage;
pub use pause::{PausePattern, PAUSE_PERIOD};
pub use scenario::{
    run_clock_loss, run_random_backpressure, run_reset_hold, run_steady_stream, run_stream,
    ClockLossScenario, ResetHoldScenario, ScenarioReport, StreamScenario, STREAM_LEN,
};
pub use scoreboard::{AvgScoreboard, OutputLog};
