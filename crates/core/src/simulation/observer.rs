//! Hooks through which a replication reports its progress
//!
//! The engine never writes files itself. It reports state transitions,
//! period ends and year ends to a [`SimulationObserver`]; the file writers in
//! [`crate::output`] and the in-memory [`RecordingObserver`] used by tests
//! are both observers.

use super::state::SimulationClock;
use super::stats::ReplicationStats;
use crate::core_types::CellState;
use crate::error::SimResult;

/// One cell state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Simulated year (0 for changes made before the first year)
    pub year: u32,
    /// Global period of the change (0 before the first period)
    pub period: u32,
    /// 0-based cell id
    pub cell: usize,
    /// State the cell moved into
    pub state: CellState,
}

/// Receives the progress of one replication
///
/// Every method has a no-op default. `finish` is only called for
/// replications that complete; a failed or cancelled replication drops its
/// observer without finishing it.
pub trait SimulationObserver {
    fn on_transition(&mut self, _transition: Transition) {}

    /// Called after every simulated period with the committed states
    fn on_period_end(&mut self, _clock: &SimulationClock, _states: &[CellState]) {}

    /// Called once per simulated year after remaining fires are extinguished
    fn on_year_end(&mut self, _year: u32, _states: &[CellState]) {}

    fn finish(&mut self, _stats: &ReplicationStats) -> SimResult<()> {
        Ok(())
    }
}

/// An absent observer ignores everything
impl<O: SimulationObserver> SimulationObserver for Option<O> {
    fn on_transition(&mut self, transition: Transition) {
        if let Some(observer) = self {
            observer.on_transition(transition);
        }
    }

    fn on_period_end(&mut self, clock: &SimulationClock, states: &[CellState]) {
        if let Some(observer) = self {
            observer.on_period_end(clock, states);
        }
    }

    fn on_year_end(&mut self, year: u32, states: &[CellState]) {
        if let Some(observer) = self {
            observer.on_year_end(year, states);
        }
    }

    fn finish(&mut self, stats: &ReplicationStats) -> SimResult<()> {
        self.as_mut().map_or(Ok(()), |observer| observer.finish(stats))
    }
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SimulationObserver for NullObserver {}

/// Observer that keeps transitions and per-period states in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub transitions: Vec<Transition>,
    /// `(global period, states)` after each period
    pub periods: Vec<(u32, Vec<CellState>)>,
    /// `(year, states)` at the end of each year
    pub years: Vec<(u32, Vec<CellState>)>,
    pub finished: bool,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// States after a global period, if that period was simulated
    pub fn states_at(&self, period: u32) -> Option<&[CellState]> {
        self.periods
            .iter()
            .find(|(p, _)| *p == period)
            .map(|(_, states)| states.as_slice())
    }
}

impl SimulationObserver for RecordingObserver {
    fn on_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    fn on_period_end(&mut self, clock: &SimulationClock, states: &[CellState]) {
        self.periods.push((clock.global_period, states.to_vec()));
    }

    fn on_year_end(&mut self, year: u32, states: &[CellState]) {
        self.years.push((year, states.to_vec()));
    }

    fn finish(&mut self, _stats: &ReplicationStats) -> SimResult<()> {
        self.finished = true;
        Ok(())
    }
}
