//! Shared, read-only inputs of a run
//!
//! The landscape is loaded once and borrowed by every replication, including
//! replications running on other worker threads.

use tracing::info;

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::grid::{FuelMapping, Grid, GridLoader};
use crate::harvest::HarvestPlan;
use crate::ignition::IgnitionSource;
use crate::io::raster::read_matrix;
use crate::tuning::FuelTuning;
use crate::weather::WeatherTimeline;

#[derive(Debug, Clone)]
pub struct Landscape {
    pub grid: Grid,
    pub weather: WeatherTimeline,
    pub harvest: HarvestPlan,
    pub ignitions: IgnitionSource,
    /// Per-fuel factors, present only in tuned mode
    pub tuning: Option<FuelTuning>,
    /// Custom per-cell values lost when a cell burns
    pub values: Option<Vec<f64>>,
}

impl Landscape {
    /// Load every input named by `config`
    pub fn load(config: &SimulationConfig) -> SimResult<Self> {
        let inputs = &config.inputs;
        let mapping = match &inputs.fuel_lookup {
            Some(path) => FuelMapping::from_file(&inputs.resolve(path))?,
            None => FuelMapping::canadian_default(),
        };
        let grid = GridLoader::new(&mapping)
            .load(&inputs.resolve(&inputs.forest), &inputs.resolve(&inputs.data))?;
        let weather = WeatherTimeline::load(&inputs.resolve(&inputs.weather), config.timeline_settings())?;

        let harvest = match (&inputs.harvest_plan, config.use_harvest_plan) {
            (Some(path), true) => HarvestPlan::load(&inputs.resolve(path), &grid)?,
            _ => HarvestPlan::empty(),
        };
        let ignitions = match (&inputs.ignitions, config.use_ignitions) {
            (Some(path), true) => {
                IgnitionSource::load(&inputs.resolve(path), &grid, config.ignition_radius)?
            }
            _ => IgnitionSource::Random,
        };
        let tuning = match (&inputs.fuel_tuning, config.use_fuel_tuning) {
            (Some(path), true) => Some(FuelTuning::load(&inputs.resolve(path))?),
            _ => None,
        };
        let values = inputs
            .custom_values
            .as_ref()
            .map(|path| read_matrix(&inputs.resolve(path), grid.rows(), grid.cols()))
            .transpose()?;

        let landscape = Self {
            grid,
            weather,
            harvest,
            ignitions,
            tuning,
            values,
        };
        info!(
            rows = landscape.grid.rows(),
            cols = landscape.grid.cols(),
            scenarios = landscape.weather.scenarios().len(),
            harvest_entries = landscape.harvest.len(),
            "Landscape loaded"
        );
        Ok(landscape)
    }

    /// Landscape with random ignitions and no plan, tuning or values
    pub fn new(grid: Grid, weather: WeatherTimeline) -> Self {
        Self {
            grid,
            weather,
            harvest: HarvestPlan::empty(),
            ignitions: IgnitionSource::Random,
            tuning: None,
            values: None,
        }
    }

    pub fn with_harvest(mut self, harvest: HarvestPlan) -> Self {
        self.harvest = harvest;
        self
    }

    pub fn with_ignitions(mut self, ignitions: IgnitionSource) -> Self {
        self.ignitions = ignitions;
        self
    }

    pub fn with_tuning(mut self, tuning: FuelTuning) -> Self {
        self.tuning = Some(tuning);
        self
    }

    /// Attach a custom value per cell, checked against the grid size
    pub fn with_values(mut self, values: Vec<f64>) -> SimResult<Self> {
        if values.len() != self.grid.len() {
            return Err(SimError::data(
                "custom values",
                format!("expected {} values, got {}", self.grid.len(), values.len()),
            ));
        }
        self.values = Some(values);
        Ok(self)
    }
}
