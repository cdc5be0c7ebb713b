//! FBP Fire Simulation Core Library
//!
//! A cellular-automaton wildfire simulator driven by the Canadian Forest Fire
//! Behavior Prediction (FBP) system. Fire spreads cell to cell over a raster
//! landscape, one period at a time, under per-period weather; many
//! independent stochastic replications are run and combined into burn
//! statistics.
//!
//! ## Layout
//!
//! - [`grid`], [`weather`], [`harvest`], [`ignition`], [`tuning`]: inputs,
//!   loaded once into a shared [`Landscape`]
//! - [`physics`]: the stateless FBP model
//! - [`simulation`]: the per-replication spread engine and its observers
//! - [`replication`]: seeding, parallel orchestration, aggregation
//! - [`output`]: snapshot, message and statistics files
//!
//! ## Example
//!
//! ```no_run
//! use fbp_sim_core::{CancelToken, Landscape, SimulationConfig, Simulator};
//! use fbp_sim_core::output::ReplicationWriter;
//!
//! # fn main() -> fbp_sim_core::SimResult<()> {
//! let config = SimulationConfig::from_yaml(std::path::Path::new("run.yaml"))?;
//! config.validate()?;
//! let landscape = Landscape::load(&config)?;
//! let cols = landscape.grid.cols();
//! let simulator = Simulator::from_config(&config, landscape)?;
//! let summary = simulator.run(
//!     |replication| Ok(ReplicationWriter::for_config(&config, replication, cols)),
//!     &CancelToken::new(),
//! )?;
//! println!("mean burnt cells: {}", summary.combined.mean_burnt);
//! # Ok(())
//! # }
//! ```

// Core types and utilities
pub mod core_types;
pub mod error;
pub mod io;

// Inputs
pub mod config;
pub mod grid;
pub mod harvest;
pub mod ignition;
pub mod landscape;
pub mod tuning;
pub mod weather;

// Fire behaviour and spread
pub mod physics;
pub mod simulation;

// Runs and results
pub mod output;
pub mod replication;

pub use config::{FailurePolicy, SimulationConfig};
pub use core_types::{Cell, CellAttributes, CellState, FuelType, WeatherRecord};
pub use error::{SimError, SimResult, Stage};
pub use grid::{Grid, GridLoader};
pub use harvest::{HarvestEntry, HarvestPlan};
pub use ignition::{IgnitionEvent, IgnitionSource};
pub use landscape::Landscape;
pub use physics::{FbpModel, FirePrediction, SpreadFactors};
pub use replication::{CancelToken, CombinedStats, ReplicationOutcome, RunSummary, Simulator};
pub use simulation::{ReplicationStats, SimulationObserver, SpreadEngine};
pub use tuning::FuelTuning;
pub use weather::{WeatherMode, WeatherTimeline};
