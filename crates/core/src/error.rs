//! Error taxonomy for the simulator
//!
//! Every fallible operation in the crate returns [`SimError`]. The variants map
//! onto the stages of a run:
//!
//! - [`SimError::Configuration`] - invalid option combinations, always raised
//!   before any input is read
//! - [`SimError::Data`] - malformed or missing input files, unknown cell ids,
//!   unresolved weather lookups
//! - [`SimError::Model`] - out-of-domain or non-finite values in the FBP model
//! - [`SimError::Resource`] - worker pool construction failures
//! - [`SimError::Output`] - I/O failures while writing results
//! - [`SimError::Cancelled`] - a replication discarded by cancellation
//!
//! Errors raised inside a replication are wrapped in [`SimError::Replication`]
//! by the orchestrator so the failing replication can always be identified.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type SimResult<T> = Result<T, SimError>;

/// Run stage an error belongs to, used for process exit reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Option validation before any file is read
    Configuration,
    /// Loading of shared inputs (grid, weather, plans)
    Load,
    /// A single replication (1-based index)
    Replication(usize),
    /// Writing results
    Output,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Configuration => write!(f, "configuration"),
            Stage::Load => write!(f, "load"),
            Stage::Replication(index) => write!(f, "replication {index}"),
            Stage::Output => write!(f, "output"),
        }
    }
}

/// Simulator error
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid option or option combination
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed, missing or inconsistent input data
    #[error("data error in {source_name}: {message}")]
    Data {
        /// File or logical data source (e.g. `Weather.csv`, `ignitions`)
        source_name: String,
        /// Row, field and value details
        message: String,
    },

    /// Out-of-domain or non-finite value in the fire behaviour model
    #[error("model error at cell {cell}, period {period}: {message}")]
    Model {
        /// 1-based cell id
        cell: usize,
        /// Global simulation period
        period: u32,
        /// Offending quantity and value
        message: String,
    },

    /// Worker pool or other runtime resource could not be allocated
    #[error("resource error: {0}")]
    Resource(String),

    /// Failure writing an output file
    #[error("output error writing {}: {source}", .path.display())]
    Output {
        /// Path being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Replication discarded because the run was cancelled
    #[error("replication cancelled")]
    Cancelled,

    /// Error raised inside a replication
    #[error("replication {replication} failed: {source}")]
    Replication {
        /// 1-based replication index
        replication: usize,
        /// Error that aborted the replication
        #[source]
        source: Box<SimError>,
    },
}

impl SimError {
    /// Build a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Build a data error for the given source
    pub fn data(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Data {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Build a model error for a 0-based cell index
    pub fn model(cell_index: usize, period: u32, message: impl Into<String>) -> Self {
        Self::Model {
            cell: cell_index + 1,
            period,
            message: message.into(),
        }
    }

    /// Build an output error
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    /// Wrap an error raised inside replication `replication` (1-based)
    pub fn in_replication(self, replication: usize) -> Self {
        match self {
            already @ Self::Replication { .. } => already,
            other => Self::Replication {
                replication,
                source: Box::new(other),
            },
        }
    }

    /// Stage this error belongs to
    ///
    /// Data and model errors outside a replication wrapper can only come from
    /// the shared load. Write failures are output errors even when a
    /// replication raised them.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Configuration(_) => Stage::Configuration,
            Self::Data { .. } | Self::Model { .. } | Self::Resource(_) | Self::Cancelled => {
                Stage::Load
            }
            Self::Output { .. } => Stage::Output,
            Self::Replication { replication, source } => match source.as_ref() {
                Self::Output { .. } => Stage::Output,
                _ => Stage::Replication(*replication),
            },
        }
    }

    /// True for cancellation, including a wrapped one
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Replication { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replication_wrapping_is_idempotent() {
        let err = SimError::data("Weather.csv", "row 3: missing FFMC")
            .in_replication(4)
            .in_replication(9);
        assert_eq!(err.stage(), Stage::Replication(4));
        assert!(err.to_string().contains("replication 4"));
        assert!(err.to_string().contains("Weather.csv"));
    }

    #[test]
    fn test_model_error_reports_one_based_cell() {
        let err = SimError::model(0, 7, "non-finite head ROS");
        assert_eq!(
            err.to_string(),
            "model error at cell 1, period 7: non-finite head ROS"
        );
        assert_eq!(err.stage(), Stage::Load);
    }

    #[test]
    fn test_cancelled_detected_through_wrapper() {
        assert!(SimError::Cancelled.in_replication(2).is_cancelled());
        assert!(!SimError::Resource("pool".into()).is_cancelled());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Replication(12).to_string(), "replication 12");
        assert_eq!(Stage::Configuration.to_string(), "configuration");
    }
}
