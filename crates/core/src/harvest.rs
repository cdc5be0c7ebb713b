//! Harvest plans: scheduled fuel removal
//!
//! A plan lists cells and the global period at which their fuel is removed.
//! Entries at period 0 or earlier are applied while a replication is reset,
//! before any ignition; later entries are applied at the start of their
//! period, before propagation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::grid::Grid;
use crate::io::Table;

/// One scheduled removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HarvestEntry {
    /// Global period of the treatment, `<= 0` for "before the first period"
    pub period: i64,
    /// 0-based cell id
    pub cell: usize,
}

/// Validated harvest schedule, sorted by period then cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestPlan {
    entries: Vec<HarvestEntry>,
    /// Index of the first entry with a positive period
    first_scheduled: usize,
}

impl HarvestPlan {
    /// A plan that removes nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load an `Ncell,Period` table
    pub fn load(path: &Path, grid: &Grid) -> SimResult<Self> {
        Self::from_table(&Table::read(path)?, grid)
    }

    pub fn from_table(table: &Table, grid: &Grid) -> SimResult<Self> {
        let cell_col = table.column("Ncell")?;
        let period_col = table.column("Period")?;
        let entries = table
            .rows()
            .iter()
            .map(|row| {
                let ncell = table.integer(row, cell_col)?;
                let cell = grid
                    .cell_id(ncell, table.source_name())
                    .map_err(|_| table.error_at(row, cell_col, format!("cell {ncell} does not exist")))?;
                Ok(HarvestEntry {
                    period: table.integer(row, period_col)?,
                    cell,
                })
            })
            .collect::<SimResult<Vec<_>>>()?;
        Ok(Self::sorted(entries))
    }

    /// Build a plan from 0-based entries, checking cell ids against `grid`
    pub fn from_entries(entries: Vec<HarvestEntry>, grid: &Grid) -> SimResult<Self> {
        if let Some(bad) = entries.iter().find(|e| e.cell >= grid.len()) {
            return Err(SimError::data(
                "harvest plan",
                format!(
                    "cell {} does not exist (grid has cells 1..={})",
                    bad.cell + 1,
                    grid.len()
                ),
            ));
        }
        Ok(Self::sorted(entries))
    }

    /// Plan that removes `cells` before the first period
    pub fn before_start(cells: &[usize], grid: &Grid) -> SimResult<Self> {
        Self::from_entries(
            cells
                .iter()
                .map(|&cell| HarvestEntry { period: 0, cell })
                .collect(),
            grid,
        )
    }

    fn sorted(mut entries: Vec<HarvestEntry>) -> Self {
        entries.sort_unstable();
        entries.dedup();
        let first_scheduled = entries.partition_point(|e| e.period <= 0);
        Self {
            entries,
            first_scheduled,
        }
    }

    pub fn entries(&self) -> &[HarvestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries applied at replication reset
    pub fn initial(&self) -> &[HarvestEntry] {
        &self.entries[..self.first_scheduled]
    }

    /// Entries scheduled for a global period (>= 1)
    pub fn due_at(&self, period: u32) -> &[HarvestEntry] {
        let period = i64::from(period);
        let start = self.entries.partition_point(|e| e.period < period);
        let end = self.entries.partition_point(|e| e.period <= period);
        &self.entries[start.max(self.first_scheduled)..end.max(self.first_scheduled)]
    }
}
