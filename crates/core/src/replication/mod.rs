//! Running many independent replications and combining their results

pub mod cancel;
pub mod orchestrator;
pub mod rng;
pub mod summary;

pub use cancel::CancelToken;
pub use orchestrator::Simulator;
pub use rng::{derive_seed, replication_seed};
pub use summary::{CombinedStats, ReplicationOutcome, RunSummary};
