//! Per-replication cell states and the simulation clock

use crate::core_types::CellState;
use crate::grid::Grid;

/// Position of a replication in simulated time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationClock {
    /// Periods simulated so far across all years
    pub global_period: u32,
    /// Current simulated year, 1-based (0 before the first year)
    pub year: u32,
    /// Period within the current year, 1-based (0 before the first period)
    pub period: u32,
    /// Per-year period cap
    pub cap: u32,
}

impl SimulationClock {
    pub fn new(cap: u32) -> Self {
        Self {
            cap,
            ..Self::default()
        }
    }

    pub fn start_year(&mut self, year: u32) {
        self.year = year;
        self.period = 0;
    }

    /// Advance to the next period; `false` once the year's cap is reached
    pub fn advance(&mut self) -> bool {
        if self.period >= self.cap {
            return false;
        }
        self.period += 1;
        self.global_period += 1;
        true
    }
}

/// Flat state arrays indexed by cell id
#[derive(Debug, Clone, PartialEq)]
pub struct FireState {
    states: Vec<CellState>,
    /// Periods each burning cell has burnt for
    durations: Vec<u32>,
    /// Burning cells in ascending id order
    burning: Vec<usize>,
}

impl FireState {
    /// Every burnable cell `Available`, every other cell `NonFuel`
    pub fn new(grid: &Grid) -> Self {
        let states = grid
            .cells()
            .iter()
            .map(|cell| {
                if cell.is_burnable() {
                    CellState::Available
                } else {
                    CellState::NonFuel
                }
            })
            .collect();
        Self {
            states,
            durations: vec![0; grid.len()],
            burning: Vec::new(),
        }
    }

    #[inline]
    pub fn states(&self) -> &[CellState] {
        &self.states
    }

    #[inline]
    pub fn state(&self, id: usize) -> CellState {
        self.states[id]
    }

    pub fn burning(&self) -> &[usize] {
        &self.burning
    }

    pub fn has_burning(&self) -> bool {
        !self.burning.is_empty()
    }

    pub fn duration(&self, id: usize) -> u32 {
        self.durations[id]
    }

    pub fn count(&self, state: CellState) -> usize {
        self.states.iter().filter(|&&s| s == state).count()
    }

    fn transition(&mut self, id: usize, to: CellState) {
        debug_assert!(
            self.states[id].can_transition_to(to),
            "illegal transition {} -> {to} at cell {id}",
            self.states[id]
        );
        self.states[id] = to;
    }

    /// Remove the fuel of an available cell; `false` when the cell is not available
    pub fn harvest(&mut self, id: usize) -> bool {
        if self.states[id] != CellState::Available {
            return false;
        }
        self.transition(id, CellState::Harvested);
        true
    }

    /// Set an available cell burning with zero duration
    ///
    /// Returns `false` when the cell is not available. Callers ignite in
    /// ascending id order or call [`FireState::sort_burning`] afterwards.
    pub fn ignite(&mut self, id: usize) -> bool {
        if self.states[id] != CellState::Available {
            return false;
        }
        self.transition(id, CellState::Burning);
        self.durations[id] = 0;
        self.burning.push(id);
        true
    }

    pub fn sort_burning(&mut self) {
        self.burning.sort_unstable();
    }

    /// Count one more period of burning
    pub fn tick(&mut self, id: usize) -> u32 {
        self.durations[id] += 1;
        self.durations[id]
    }

    /// Burn out the given cells, which must all be burning
    pub fn extinguish(&mut self, ids: &[usize]) {
        for &id in ids {
            self.transition(id, CellState::Burnt);
        }
        let states = &self.states;
        self.burning.retain(|&id| states[id] == CellState::Burning);
    }

    /// True when any 8-connected neighbour is still available
    pub fn has_available_neighbour(&self, grid: &Grid, id: usize) -> bool {
        grid.neighbours(id)
            .any(|(neighbour, _)| self.states[neighbour] == CellState::Available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{CellAttributes, FuelType};

    #[test]
    fn test_clock_respects_cap() {
        let mut clock = SimulationClock::new(2);
        clock.start_year(1);
        assert!(clock.advance());
        assert!(clock.advance());
        assert!(!clock.advance());
        assert_eq!((clock.period, clock.global_period), (2, 2));
        clock.start_year(2);
        assert!(clock.advance());
        assert_eq!((clock.year, clock.period, clock.global_period), (2, 1, 3));

        let mut zero = SimulationClock::new(0);
        zero.start_year(1);
        assert!(!zero.advance());
    }

    #[test]
    fn test_state_lifecycle() {
        let grid = Grid::uniform(3, 3, 100.0, Some(FuelType::C2), &CellAttributes::default());
        let mut state = FireState::new(&grid);
        assert_eq!(state.count(CellState::Available), 9);

        assert!(state.harvest(0));
        assert!(!state.ignite(0));
        assert!(state.ignite(4));
        assert!(!state.ignite(4));
        assert_eq!(state.burning(), &[4]);
        assert_eq!(state.tick(4), 1);
        assert!(state.has_available_neighbour(&grid, 4));

        state.extinguish(&[4]);
        assert!(!state.has_burning());
        assert_eq!(state.state(4), CellState::Burnt);
        assert_eq!(state.count(CellState::Harvested), 1);
    }

    #[test]
    fn test_non_fuel_cells_start_static() {
        let grid = Grid::uniform(2, 2, 100.0, None, &CellAttributes::default());
        let mut state = FireState::new(&grid);
        assert_eq!(state.count(CellState::NonFuel), 4);
        assert!(!state.ignite(0));
        assert!(!state.harvest(0));
    }
}
