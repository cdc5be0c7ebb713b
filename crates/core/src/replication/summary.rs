//! Replication outcomes and their aggregation

use serde::Serialize;

use crate::error::SimError;
use crate::simulation::ReplicationStats;

/// How a single replication ended
#[derive(Debug)]
pub enum ReplicationOutcome {
    Completed(ReplicationStats),
    Failed { replication: usize, error: SimError },
    /// Discarded by cancellation; nothing was written for it
    Cancelled { replication: usize },
}

impl ReplicationOutcome {
    /// 1-based replication index
    pub fn replication(&self) -> usize {
        match self {
            ReplicationOutcome::Completed(stats) => stats.replication,
            ReplicationOutcome::Failed { replication, .. }
            | ReplicationOutcome::Cancelled { replication } => *replication,
        }
    }

    pub fn stats(&self) -> Option<&ReplicationStats> {
        match self {
            ReplicationOutcome::Completed(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ReplicationOutcome::Completed(_))
    }
}

/// Statistics combined over completed replications
///
/// Means and deviations are zero when no replication completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedStats {
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub mean_burnt: f64,
    /// Population standard deviation of burnt cells
    pub std_burnt: f64,
    pub min_burnt: usize,
    pub max_burnt: usize,
    pub mean_harvested: f64,
    pub mean_value_loss: Option<f64>,
    /// Fraction of completed replications in which each cell burnt
    #[serde(skip)]
    pub burn_probability: Vec<f64>,
}

impl CombinedStats {
    pub fn from_outcomes(outcomes: &[ReplicationOutcome], cells: usize) -> Self {
        let completed: Vec<&ReplicationStats> =
            outcomes.iter().filter_map(ReplicationOutcome::stats).collect();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, ReplicationOutcome::Failed { .. }))
            .count();
        let cancelled = outcomes
            .iter()
            .filter(|o| matches!(o, ReplicationOutcome::Cancelled { .. }))
            .count();

        let mut burn_probability = vec![0.0; cells];
        let n = completed.len();
        if n == 0 {
            return Self {
                completed: 0,
                failed,
                cancelled,
                mean_burnt: 0.0,
                std_burnt: 0.0,
                min_burnt: 0,
                max_burnt: 0,
                mean_harvested: 0.0,
                mean_value_loss: None,
                burn_probability,
            };
        }

        for stats in &completed {
            for &cell in &stats.burnt_cells {
                burn_probability[cell] += 1.0;
            }
        }
        let count = n as f64;
        for p in &mut burn_probability {
            *p /= count;
        }

        let mean_burnt = completed.iter().map(|s| s.burnt as f64).sum::<f64>() / count;
        let variance = completed
            .iter()
            .map(|s| (s.burnt as f64 - mean_burnt).powi(2))
            .sum::<f64>()
            / count;
        let losses: Option<Vec<f64>> = completed.iter().map(|s| s.value_loss).collect();

        Self {
            completed: n,
            failed,
            cancelled,
            mean_burnt,
            std_burnt: variance.sqrt(),
            min_burnt: completed.iter().map(|s| s.burnt).min().unwrap_or(0),
            max_burnt: completed.iter().map(|s| s.burnt).max().unwrap_or(0),
            mean_harvested: completed.iter().map(|s| s.harvested as f64).sum::<f64>() / count,
            mean_value_loss: losses.map(|l| l.iter().sum::<f64>() / count),
            burn_probability,
        }
    }
}

/// Everything a run produced, ordered by replication index
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<ReplicationOutcome>,
    pub combined: CombinedStats,
}

impl RunSummary {
    pub fn new(mut outcomes: Vec<ReplicationOutcome>, cells: usize) -> Self {
        outcomes.sort_by_key(ReplicationOutcome::replication);
        let combined = CombinedStats::from_outcomes(&outcomes, cells);
        Self { outcomes, combined }
    }

    pub fn completed(&self) -> impl Iterator<Item = &ReplicationStats> {
        self.outcomes.iter().filter_map(ReplicationOutcome::stats)
    }

    /// `(replication, error)` of every failed replication
    pub fn failures(&self) -> impl Iterator<Item = (usize, &SimError)> {
        self.outcomes.iter().filter_map(|o| match o {
            ReplicationOutcome::Failed { replication, error } => Some((*replication, error)),
            _ => None,
        })
    }

    /// Lowest-numbered failed replication, if any replication failed
    ///
    /// A run with a failed replication is unsuccessful even when the
    /// remaining replications were kept.
    pub fn first_failure(&self) -> Option<(usize, &SimError)> {
        self.failures().next()
    }
}
