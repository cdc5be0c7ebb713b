//! Per-replication fire spread simulation

pub mod engine;
pub mod observer;
pub mod state;
pub mod stats;

pub use engine::{EngineSettings, SpreadEngine, PARALLEL_FRONT_MIN};
pub use observer::{NullObserver, RecordingObserver, SimulationObserver, Transition};
pub use state::{FireState, SimulationClock};
pub use stats::ReplicationStats;
