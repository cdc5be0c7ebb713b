//! Ignition sources
//!
//! Either a fixed schedule read from `Ignitions.csv` (one ignition cell per
//! simulated year, expanded to every cell within the ignition radius) or a
//! single uniformly random available cell per year.

use std::path::Path;

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::core_types::CellState;
use crate::error::SimResult;
use crate::grid::Grid;
use crate::io::Table;

/// Ignition cell of a simulated year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnitionEvent {
    /// 1-based simulated year
    pub year: u32,
    /// 0-based cell id
    pub cell: usize,
}

/// Where each year's fire starts
#[derive(Debug, Clone, PartialEq)]
pub enum IgnitionSource {
    /// Scheduled ignitions, already expanded by the ignition radius
    Fixed {
        cells_by_year: FxHashMap<u32, Vec<usize>>,
    },
    /// One random available cell per year
    Random,
}

impl IgnitionSource {
    /// Load a `Year,Ncell` table and expand each ignition by `radius`
    pub fn load(path: &Path, grid: &Grid, radius: usize) -> SimResult<Self> {
        Self::from_table(&Table::read(path)?, grid, radius)
    }

    pub fn from_table(table: &Table, grid: &Grid, radius: usize) -> SimResult<Self> {
        let year_col = table.column("Year")?;
        let cell_col = table.column("Ncell")?;
        let events = table
            .rows()
            .iter()
            .map(|row| {
                let year = table.integer(row, year_col)?;
                let year = u32::try_from(year)
                    .ok()
                    .filter(|&y| y >= 1)
                    .ok_or_else(|| table.error_at(row, year_col, format!("year {year} must be >= 1")))?;
                let ncell = table.integer(row, cell_col)?;
                let cell = grid
                    .cell_id(ncell, table.source_name())
                    .map_err(|_| table.error_at(row, cell_col, format!("cell {ncell} does not exist")))?;
                Ok(IgnitionEvent { year, cell })
            })
            .collect::<SimResult<Vec<_>>>()?;
        Ok(Self::fixed(&events, grid, radius))
    }

    /// Scheduled ignitions; cell ids must already be valid for `grid`
    pub fn fixed(events: &[IgnitionEvent], grid: &Grid, radius: usize) -> Self {
        let mut cells_by_year: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
        for event in events {
            cells_by_year
                .entry(event.year)
                .or_default()
                .extend(grid.cells_within(event.cell, radius));
        }
        for cells in cells_by_year.values_mut() {
            cells.sort_unstable();
            cells.dedup();
        }
        IgnitionSource::Fixed { cells_by_year }
    }

    /// Cells to set burning at the start of `year`
    ///
    /// Only cells currently `Available` are returned, so harvested, non-fuel
    /// and previously burnt cells are skipped. Random sources draw exactly
    /// once from `rng` when an available cell exists.
    pub fn resolve<R: Rng>(&self, year: u32, states: &[CellState], rng: &mut R) -> Vec<usize> {
        match self {
            IgnitionSource::Fixed { cells_by_year } => cells_by_year
                .get(&year)
                .map(|cells| {
                    cells
                        .iter()
                        .copied()
                        .filter(|&id| states[id] == CellState::Available)
                        .collect()
                })
                .unwrap_or_default(),
            IgnitionSource::Random => {
                let available: Vec<usize> = states
                    .iter()
                    .enumerate()
                    .filter(|(_, state)| **state == CellState::Available)
                    .map(|(id, _)| id)
                    .collect();
                if available.is_empty() {
                    Vec::new()
                } else {
                    vec![available[rng.random_range(0..available.len())]]
                }
            }
        }
    }

    /// Scheduled cells of a year regardless of state (empty for random sources)
    pub fn scheduled(&self, year: u32) -> &[usize] {
        match self {
            IgnitionSource::Fixed { cells_by_year } => {
                cells_by_year.get(&year).map_or(&[], Vec::as_slice)
            }
            IgnitionSource::Random => &[],
        }
    }
}
