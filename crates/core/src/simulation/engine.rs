//! Cellular-automaton spread engine
//!
//! One [`SpreadEngine`] runs one replication over a shared [`Landscape`].
//!
//! # Period protocol
//! 1. Harvest entries due this global period remove fuel from available cells
//! 2. Every burning cell is evaluated with the FBP model; spreading cells
//!    mark available neighbours whose directional rate and intensity exceed
//!    the thresholds
//! 3. Marked cells are sorted, de-duplicated and committed as burning with
//!    zero duration, so fire advances at most one cell per period
//! 4. Previously burning cells burn out when their burn length is reached or
//!    when no available neighbour is left. A cell whose prediction falls
//!    below the thresholds keeps burning and is evaluated again next period.
//!
//! The front is evaluated across the rayon pool once it is large enough.
//! Each evaluation draws from its own per-(period, cell) stream, so the
//! outcome does not depend on how the work is scheduled.

use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::observer::{SimulationObserver, Transition};
use super::state::{FireState, SimulationClock};
use super::stats::ReplicationStats;
use crate::config::SimulationConfig;
use crate::core_types::{CellState, WeatherRecord};
use crate::error::SimResult;
use crate::harvest::HarvestPlan;
use crate::landscape::Landscape;
use crate::physics::{FbpModel, SpreadFactors};
use crate::replication::cancel::CancelToken;
use crate::replication::rng::{cell_rng, replication_rng};

/// Default front size from which burning cells are evaluated on the rayon pool
pub const PARALLEL_FRONT_MIN: usize = 128;

/// Run-wide settings shared by every replication
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub sim_years: u32,
    pub max_fire_periods: u32,
    /// Periods a cell may burn, unlimited when `None`
    pub burn_length: Option<u32>,
    pub factors: SpreadFactors,
    pub model: FbpModel,
    /// Fronts smaller than this are evaluated on the calling thread
    pub parallel_front_min: usize,
}

impl EngineSettings {
    pub fn from_config(config: &SimulationConfig) -> SimResult<Self> {
        config.factors.validate()?;
        Ok(Self {
            sim_years: config.sim_years,
            max_fire_periods: config.max_fire_periods,
            burn_length: config.burn_length,
            factors: config.factors,
            model: config.fbp_model()?,
            parallel_front_min: PARALLEL_FRONT_MIN,
        })
    }
}

/// Result of evaluating one burning cell
#[derive(Debug)]
struct FrontCell {
    cell: usize,
    targets: Vec<usize>,
}

pub struct SpreadEngine<'a> {
    landscape: &'a Landscape,
    settings: &'a EngineSettings,
    harvest: &'a HarvestPlan,
    replication: usize,
    seed: u64,
    rng: ChaCha8Rng,
    scenario: usize,
    state: FireState,
    clock: SimulationClock,
}

impl<'a> SpreadEngine<'a> {
    /// Engine for replication `replication` (1-based) seeded with `seed`
    ///
    /// The weather scenario is drawn here, before any ignition.
    pub fn new(
        landscape: &'a Landscape,
        settings: &'a EngineSettings,
        harvest: &'a HarvestPlan,
        replication: usize,
        seed: u64,
    ) -> Self {
        let mut rng = replication_rng(seed);
        let scenario = landscape.weather.draw_scenario(&mut rng);
        Self {
            landscape,
            settings,
            harvest,
            replication,
            seed,
            rng,
            scenario,
            state: FireState::new(&landscape.grid),
            clock: SimulationClock::new(settings.max_fire_periods),
        }
    }

    pub fn scenario(&self) -> usize {
        self.scenario
    }

    pub fn state(&self) -> &FireState {
        &self.state
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Run every simulated year and summarise the replication
    ///
    /// The observer is finished only when the replication completes.
    pub fn run<O: SimulationObserver>(
        mut self,
        observer: &mut O,
        cancel: &CancelToken,
    ) -> SimResult<ReplicationStats> {
        debug!(
            replication = self.replication,
            scenario = self.scenario,
            "Replication started"
        );
        self.apply_initial_harvest(observer);
        for year in 1..=self.settings.sim_years {
            cancel.check()?;
            self.run_year(year, observer, cancel)?;
        }
        let stats = ReplicationStats::from_states(
            self.replication,
            self.scenario,
            self.seed,
            self.clock.global_period,
            self.state.states(),
            self.landscape.values.as_deref(),
        );
        observer.finish(&stats)?;
        debug!(
            replication = self.replication,
            burnt = stats.burnt,
            periods = stats.periods,
            "Replication finished"
        );
        Ok(stats)
    }

    fn apply_initial_harvest<O: SimulationObserver>(&mut self, observer: &mut O) {
        let harvest = self.harvest;
        for entry in harvest.initial() {
            if self.state.harvest(entry.cell) {
                observer.on_transition(Transition {
                    year: 0,
                    period: 0,
                    cell: entry.cell,
                    state: CellState::Harvested,
                });
            }
        }
    }

    fn run_year<O: SimulationObserver>(
        &mut self,
        year: u32,
        observer: &mut O,
        cancel: &CancelToken,
    ) -> SimResult<()> {
        self.clock.start_year(year);
        let ignitions = self
            .landscape
            .ignitions
            .resolve(year, self.state.states(), &mut self.rng);
        if ignitions.is_empty() {
            if !self.landscape.ignitions.scheduled(year).is_empty() {
                warn!(
                    replication = self.replication,
                    year, "Scheduled ignition cells are not available, no fire this year"
                );
            }
        } else {
            for &cell in &ignitions {
                self.state.ignite(cell);
                self.emit(observer, cell, CellState::Burning);
            }
            self.state.sort_burning();
            debug!(replication = self.replication, year, cells = ?ignitions, "Ignition");
        }

        while self.state.has_burning() && self.clock.advance() {
            cancel.check()?;
            self.step(observer)?;
            observer.on_period_end(&self.clock, self.state.states());
        }

        // Fires still burning at the period cap are put out
        let remaining = self.state.burning().to_vec();
        for &cell in &remaining {
            self.emit(observer, cell, CellState::Burnt);
        }
        self.state.extinguish(&remaining);

        debug!(
            replication = self.replication,
            year,
            periods = self.clock.period,
            burnt = self.state.count(CellState::Burnt),
            "Year finished"
        );
        observer.on_year_end(year, self.state.states());
        Ok(())
    }

    /// Simulate the current period
    fn step<O: SimulationObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let period = self.clock.global_period;
        let harvest = self.harvest;
        for entry in harvest.due_at(period) {
            if self.state.harvest(entry.cell) {
                self.emit(observer, entry.cell, CellState::Harvested);
            }
        }

        let landscape = self.landscape;
        let weather = landscape.weather.record_for(self.clock.period, self.scenario)?;
        let front = self.evaluate_front(weather)?;

        let mut ignitions: Vec<usize> = front
            .iter()
            .flat_map(|evaluated| evaluated.targets.iter().copied())
            .collect();
        ignitions.sort_unstable();
        ignitions.dedup();

        let expired: Vec<bool> = front
            .iter()
            .map(|evaluated| {
                let duration = self.state.tick(evaluated.cell);
                self.settings
                    .burn_length
                    .is_some_and(|length| duration >= length)
            })
            .collect();

        for &cell in &ignitions {
            if self.state.ignite(cell) {
                self.emit(observer, cell, CellState::Burning);
            }
        }

        // The front is in id order, so burnt-out cells are too
        let grid = &landscape.grid;
        let burnt_out: Vec<usize> = front
            .iter()
            .zip(&expired)
            .filter(|&(evaluated, &expired)| {
                expired || !self.state.has_available_neighbour(grid, evaluated.cell)
            })
            .map(|(evaluated, _)| evaluated.cell)
            .collect();
        for &cell in &burnt_out {
            self.emit(observer, cell, CellState::Burnt);
        }
        self.state.extinguish(&burnt_out);
        self.state.sort_burning();
        Ok(())
    }

    fn evaluate_front(&self, weather: &WeatherRecord) -> SimResult<Vec<FrontCell>> {
        let front = self.state.burning();
        if front.len() >= self.settings.parallel_front_min {
            front
                .par_iter()
                .map(|&cell| self.evaluate_cell(cell, weather))
                .collect()
        } else {
            front
                .iter()
                .map(|&cell| self.evaluate_cell(cell, weather))
                .collect()
        }
    }

    fn evaluate_cell(&self, id: usize, weather: &WeatherRecord) -> SimResult<FrontCell> {
        let grid = &self.landscape.grid;
        let cell = grid.cell(id);
        let factors = match &self.landscape.tuning {
            Some(tuning) => tuning.apply(&self.settings.factors, cell.fuel),
            None => self.settings.factors,
        };
        let period = self.clock.global_period;
        let model = &self.settings.model;
        let mut rng = cell_rng(self.seed, period, id);
        let prediction = model.predict(cell, weather, &factors, period, &mut rng)?;

        let targets = if prediction.is_spreading && prediction.hfi > model.hfi_threshold() {
            grid.neighbours(id)
                .filter(|&(neighbour, azimuth)| {
                    self.state.state(neighbour) == CellState::Available
                        && prediction.ros_toward(azimuth) > model.ros_threshold()
                })
                .map(|(neighbour, _)| neighbour)
                .collect()
        } else {
            Vec::new()
        };
        Ok(FrontCell { cell: id, targets })
    }

    fn emit<O: SimulationObserver>(&self, observer: &mut O, cell: usize, state: CellState) {
        observer.on_transition(Transition {
            year: self.clock.year,
            period: self.clock.global_period,
            cell,
            state,
        });
    }
}
