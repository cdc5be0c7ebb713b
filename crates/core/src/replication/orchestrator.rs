//! Replication orchestration
//!
//! [`Simulator`] owns the shared landscape and runs replications over it,
//! sequentially or on a rayon pool. Each replication gets a seed derived from
//! the run seed and its 1-based index, so results do not depend on the number
//! of workers or the order in which replications are scheduled.

use rayon::prelude::*;
use tracing::{error, info, warn};

use super::cancel::CancelToken;
use super::rng::replication_seed;
use super::summary::{ReplicationOutcome, RunSummary};
use crate::config::{ExecutionConfig, FailurePolicy, SimulationConfig};
use crate::error::{SimError, SimResult};
use crate::harvest::HarvestPlan;
use crate::landscape::Landscape;
use crate::simulation::{EngineSettings, NullObserver, SimulationObserver, SpreadEngine};

/// Runs replications over a loaded landscape
#[derive(Debug)]
pub struct Simulator {
    landscape: Landscape,
    settings: EngineSettings,
    replications: usize,
    seed: u64,
    execution: ExecutionConfig,
}

impl Simulator {
    pub fn new(
        landscape: Landscape,
        settings: EngineSettings,
        replications: usize,
        seed: u64,
        execution: ExecutionConfig,
    ) -> Self {
        Self {
            landscape,
            settings,
            replications,
            seed,
            execution,
        }
    }

    pub fn from_config(config: &SimulationConfig, landscape: Landscape) -> SimResult<Self> {
        Ok(Self::new(
            landscape,
            EngineSettings::from_config(config)?,
            config.replications,
            config.seed,
            config.execution.clone(),
        ))
    }

    pub fn landscape(&self) -> &Landscape {
        &self.landscape
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn replications(&self) -> usize {
        self.replications
    }

    /// Run every replication with the landscape's own harvest plan
    ///
    /// `make_observer` is called once per replication with its 1-based index.
    pub fn run<O, F>(&self, make_observer: F, cancel: &CancelToken) -> SimResult<RunSummary>
    where
        O: SimulationObserver,
        F: Fn(usize) -> SimResult<O> + Sync,
    {
        self.run_with_plan(&self.landscape.harvest, make_observer, cancel)
    }

    /// Rerun the replications under a caller-supplied harvest plan
    ///
    /// Nothing is written; intended for optimisers searching over plans.
    pub fn evaluate(&self, plan: &HarvestPlan) -> SimResult<RunSummary> {
        self.run_with_plan(plan, |_| Ok(NullObserver), &CancelToken::new())
    }

    pub fn run_with_plan<O, F>(
        &self,
        plan: &HarvestPlan,
        make_observer: F,
        cancel: &CancelToken,
    ) -> SimResult<RunSummary>
    where
        O: SimulationObserver,
        F: Fn(usize) -> SimResult<O> + Sync,
    {
        let run_token = cancel.child(self.execution.time_budget());
        let fail_fast = self.execution.failure_policy == FailurePolicy::FailFast;
        info!(
            replications = self.replications,
            seed = self.seed,
            parallel = self.execution.parallel,
            "Starting replications"
        );

        let run_one = |replication: usize| -> ReplicationOutcome {
            if run_token.is_cancelled() {
                return ReplicationOutcome::Cancelled { replication };
            }
            let seed = replication_seed(self.seed, replication);
            let result = make_observer(replication).and_then(|mut observer| {
                SpreadEngine::new(&self.landscape, &self.settings, plan, replication, seed)
                    .run(&mut observer, &run_token)
            });
            match result {
                Ok(stats) => ReplicationOutcome::Completed(stats),
                Err(err) if err.is_cancelled() => ReplicationOutcome::Cancelled { replication },
                Err(err) => {
                    if fail_fast {
                        error!(replication, error = %err, "Replication failed, cancelling run");
                        run_token.cancel();
                    } else {
                        warn!(replication, error = %err, "Replication failed");
                    }
                    ReplicationOutcome::Failed {
                        replication,
                        error: err.in_replication(replication),
                    }
                }
            }
        };

        let outcomes: Vec<ReplicationOutcome> = if self.execution.parallel {
            match self.execution.threads {
                Some(threads) => {
                    let pool = rayon::ThreadPoolBuilder::new()
                        .num_threads(threads)
                        .build()
                        .map_err(|e| {
                            SimError::Resource(format!("cannot build a pool of {threads} workers: {e}"))
                        })?;
                    pool.install(|| (1..=self.replications).into_par_iter().map(run_one).collect())
                }
                None => (1..=self.replications).into_par_iter().map(run_one).collect(),
            }
        } else {
            (1..=self.replications).map(run_one).collect()
        };

        let mut summary = RunSummary::new(outcomes, self.landscape.grid.len());
        if fail_fast {
            let first_failure = summary
                .outcomes
                .iter()
                .position(|o| matches!(o, ReplicationOutcome::Failed { .. }));
            if let Some(index) = first_failure {
                if let ReplicationOutcome::Failed { error, .. } = summary.outcomes.swap_remove(index) {
                    return Err(error);
                }
            }
        }

        let combined = &summary.combined;
        info!(
            completed = combined.completed,
            failed = combined.failed,
            cancelled = combined.cancelled,
            mean_burnt = combined.mean_burnt,
            "Replications finished"
        );
        Ok(summary)
    }
}
