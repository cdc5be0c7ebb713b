//! Per-replication results

use serde::Serialize;

use crate::core_types::CellState;

/// Outcome of one completed replication
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationStats {
    /// 1-based replication index
    pub replication: usize,
    /// Weather scenario the replication used
    pub scenario: usize,
    /// Seed the replication RNG was derived from
    pub seed: u64,
    /// Global periods simulated
    pub periods: u32,
    pub available: usize,
    pub burnt: usize,
    pub harvested: usize,
    pub non_fuel: usize,
    /// Cells burnt by the end of the replication, ascending
    #[serde(skip)]
    pub burnt_cells: Vec<usize>,
    /// Sum of the custom values of burnt cells
    pub value_loss: Option<f64>,
}

impl ReplicationStats {
    /// Summarise the final states of a replication
    pub fn from_states(
        replication: usize,
        scenario: usize,
        seed: u64,
        periods: u32,
        states: &[CellState],
        values: Option<&[f64]>,
    ) -> Self {
        let mut stats = Self {
            replication,
            scenario,
            seed,
            periods,
            available: 0,
            burnt: 0,
            harvested: 0,
            non_fuel: 0,
            burnt_cells: Vec::new(),
            value_loss: None,
        };
        for (id, state) in states.iter().enumerate() {
            match state {
                CellState::Available => stats.available += 1,
                // Burning cells are extinguished at year end, counted as burnt
                CellState::Burnt | CellState::Burning => {
                    stats.burnt += 1;
                    stats.burnt_cells.push(id);
                }
                CellState::Harvested => stats.harvested += 1,
                CellState::NonFuel => stats.non_fuel += 1,
            }
        }
        stats.value_loss =
            values.map(|values| stats.burnt_cells.iter().map(|&id| values[id]).sum());
        stats
    }
}
