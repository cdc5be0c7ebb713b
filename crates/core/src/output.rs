//! Result files
//!
//! Per-replication files (grid snapshots and transition messages) are
//! buffered by a [`ReplicationWriter`] and written only when the replication
//! completes, so failed and cancelled replications leave nothing behind.
//! Run-level statistics are written from the [`RunSummary`] afterwards.
//!
//! ```text
//! <output>/Grids/Grids{r}/ForestGrid{period:05}.csv
//! <output>/Grids/Grids{r}/FinalGrid{year}.csv
//! <output>/Messages/MessagesFile{r}.csv
//! <output>/Stats/FinalStats.csv
//! <output>/Stats/BProb.csv
//! <output>/Stats/Summary.csv
//! ```

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{SimulationConfig, SnapshotConfig};
use crate::core_types::CellState;
use crate::error::{SimError, SimResult};
use crate::replication::RunSummary;
use crate::simulation::{ReplicationStats, SimulationClock, SimulationObserver, Transition};

/// Buffers one replication's files until it completes
#[derive(Debug)]
pub struct ReplicationWriter {
    root: PathBuf,
    replication: usize,
    cols: usize,
    snapshot: SnapshotConfig,
    messages: Option<String>,
    grids: Vec<(String, String)>,
}

impl ReplicationWriter {
    pub fn new(
        root: &Path,
        replication: usize,
        cols: usize,
        snapshot: SnapshotConfig,
        messages: bool,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            replication,
            cols,
            snapshot,
            messages: messages.then(|| String::from("replication,year,period,cell,state\n")),
            grids: Vec::new(),
        }
    }

    /// Writer configured from the run configuration, `None` without an output folder
    pub fn for_config(config: &SimulationConfig, replication: usize, cols: usize) -> Option<Self> {
        config.output_folder.as_deref().map(|root| {
            Self::new(
                root,
                replication,
                cols,
                config.snapshot.clone(),
                config.messages,
            )
        })
    }

    fn year_selected(&self, year: u32) -> bool {
        year >= 1 && (year - 1) % self.snapshot.year_frequency.max(1) == 0
    }

    fn grid_folder(&self) -> PathBuf {
        self.root
            .join("Grids")
            .join(format!("Grids{}", self.replication))
    }
}

impl SimulationObserver for ReplicationWriter {
    fn on_transition(&mut self, transition: Transition) {
        if let Some(messages) = &mut self.messages {
            let _ = writeln!(
                messages,
                "{},{},{},{},{}",
                self.replication,
                transition.year,
                transition.period,
                transition.cell + 1,
                transition.state
            );
        }
    }

    fn on_period_end(&mut self, clock: &SimulationClock, states: &[CellState]) {
        if self.snapshot.enabled
            && self.year_selected(clock.year)
            && clock.period % self.snapshot.period_step.max(1) == 0
        {
            self.grids.push((
                format!("ForestGrid{:05}.csv", clock.global_period),
                render_grid(states, self.cols),
            ));
        }
    }

    fn on_year_end(&mut self, year: u32, states: &[CellState]) {
        if self.snapshot.final_grid {
            self.grids
                .push((format!("FinalGrid{year}.csv"), render_grid(states, self.cols)));
        }
    }

    fn finish(&mut self, _stats: &ReplicationStats) -> SimResult<()> {
        if !self.grids.is_empty() {
            let folder = self.grid_folder();
            create_dir(&folder)?;
            for (name, contents) in self.grids.drain(..) {
                write_file(&folder.join(name), &contents)?;
            }
        }
        if let Some(messages) = self.messages.take() {
            let folder = self.root.join("Messages");
            create_dir(&folder)?;
            write_file(
                &folder.join(format!("MessagesFile{}.csv", self.replication)),
                &messages,
            )?;
        }
        debug!(replication = self.replication, "Replication outputs written");
        Ok(())
    }
}

/// `1` for cells touched by fire, `0` otherwise, one grid row per line
pub fn render_grid(states: &[CellState], cols: usize) -> String {
    let mut out = String::with_capacity(states.len() * 2);
    for row in states.chunks(cols.max(1)) {
        for (i, state) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push(if state.is_fire_affected() { '1' } else { '0' });
        }
        out.push('\n');
    }
    out
}

/// Write `Stats/FinalStats.csv`, `Stats/BProb.csv` and `Stats/Summary.csv`
pub fn write_statistics(root: &Path, summary: &RunSummary, cols: usize) -> SimResult<()> {
    let folder = root.join("Stats");
    create_dir(&folder)?;

    let mut final_stats =
        String::from("replication,scenario,seed,periods,burnt,harvested,non_fuel,available,value_loss\n");
    for stats in summary.completed() {
        let _ = writeln!(
            final_stats,
            "{},{},{},{},{},{},{},{},{}",
            stats.replication,
            stats.scenario,
            stats.seed,
            stats.periods,
            stats.burnt,
            stats.harvested,
            stats.non_fuel,
            stats.available,
            stats.value_loss.map_or_else(String::new, |v| v.to_string())
        );
    }
    write_file(&folder.join("FinalStats.csv"), &final_stats)?;

    let mut bprob = String::new();
    for row in summary.combined.burn_probability.chunks(cols.max(1)) {
        let line: Vec<String> = row.iter().map(|p| format!("{p:.4}")).collect();
        bprob.push_str(&line.join(","));
        bprob.push('\n');
    }
    write_file(&folder.join("BProb.csv"), &bprob)?;

    let c = &summary.combined;
    let summary_csv = format!(
        "completed,failed,cancelled,mean_burnt,std_burnt,min_burnt,max_burnt,mean_harvested,mean_value_loss\n{},{},{},{:.4},{:.4},{},{},{:.4},{}\n",
        c.completed,
        c.failed,
        c.cancelled,
        c.mean_burnt,
        c.std_burnt,
        c.min_burnt,
        c.max_burnt,
        c.mean_harvested,
        c.mean_value_loss.map_or_else(String::new, |v| format!("{v:.4}"))
    );
    write_file(&folder.join("Summary.csv"), &summary_csv)?;
    info!(folder = %folder.display(), "Statistics written");
    Ok(())
}

fn create_dir(path: &Path) -> SimResult<()> {
    fs::create_dir_all(path).map_err(|e| SimError::output(path, e))
}

fn write_file(path: &Path, contents: &str) -> SimResult<()> {
    fs::write(path, contents).map_err(|e| SimError::output(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use CellState::*;

    #[test]
    fn test_render_grid_marks_fire_affected() {
        let states = [Available, Burning, Burnt, NonFuel, Harvested, Available];
        assert_eq!(render_grid(&states, 3), "0,1,1\n0,0,0\n");
    }

    #[test]
    fn test_writer_buffers_until_finish() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotConfig {
            enabled: true,
            period_step: 2,
            year_frequency: 1,
            final_grid: true,
        };
        let mut writer = ReplicationWriter::new(dir.path(), 3, 2, snapshot, true);
        let states = [Burning, Available, Available, Available];
        writer.on_transition(Transition {
            year: 1,
            period: 0,
            cell: 0,
            state: Burning,
        });
        let mut clock = SimulationClock::new(10);
        clock.start_year(1);
        for _ in 0..3 {
            clock.advance();
            writer.on_period_end(&clock, &states);
        }
        writer.on_year_end(1, &states);
        assert!(!dir.path().join("Grids").exists());
        assert!(!dir.path().join("Messages").exists());

        let stats = ReplicationStats::from_states(3, 0, 0, 3, &states, None);
        writer.finish(&stats).unwrap();
        let grids = dir.path().join("Grids").join("Grids3");
        assert!(!grids.join("ForestGrid00001.csv").exists());
        assert_eq!(
            fs::read_to_string(grids.join("ForestGrid00002.csv")).unwrap(),
            "1,0\n0,0\n"
        );
        assert!(grids.join("FinalGrid1.csv").exists());
        let messages =
            fs::read_to_string(dir.path().join("Messages").join("MessagesFile3.csv")).unwrap();
        assert_eq!(messages, "replication,year,period,cell,state\n3,1,0,1,Burning\n");
    }
}
