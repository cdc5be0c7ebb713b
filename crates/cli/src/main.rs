use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fbp_sim_core::output::{write_statistics, ReplicationWriter};
use fbp_sim_core::{
    CancelToken, Landscape, RunSummary, SimError, SimResult, SimulationConfig, Simulator, Stage,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// FBP wildfire spread simulator
#[derive(Parser, Debug)]
#[command(name = "fbp-sim")]
#[command(about = "Cellular-automaton wildfire simulation with the Canadian FBP system", long_about = None)]
struct Args {
    /// YAML run configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Number of replications (overrides the configuration)
    #[arg(short, long)]
    nsims: Option<usize>,

    /// Run seed (overrides the configuration)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output folder (overrides the configuration)
    #[arg(short, long)]
    output_folder: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            init_logging(args.verbose);
            return report(&err);
        }
    };
    init_logging(config.verbose);

    match run(&config) {
        Ok(summary) => match summary.first_failure() {
            Some((_, err)) => report(err),
            None => ExitCode::SUCCESS,
        },
        Err(err) => report(&err),
    }
}

fn load_config(args: &Args) -> SimResult<SimulationConfig> {
    let mut config = SimulationConfig::from_yaml(&args.config)?;
    if let Some(nsims) = args.nsims {
        config.replications = nsims;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(folder) = &args.output_folder {
        config.output_folder = Some(folder.clone());
    }
    config.verbose |= args.verbose;
    config.validate()?;
    Ok(config)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(config: &SimulationConfig) -> SimResult<RunSummary> {
    let landscape = Landscape::load(config)?;
    let cols = landscape.grid.cols();
    let simulator = Simulator::from_config(config, landscape)?;

    let summary = simulator.run(
        |replication| Ok(ReplicationWriter::for_config(config, replication, cols)),
        &CancelToken::new(),
    )?;
    for (replication, err) in summary.failures() {
        warn!(replication, error = %err, "Replication discarded");
    }
    if summary.combined.cancelled > 0 {
        warn!(
            cancelled = summary.combined.cancelled,
            "Time budget exhausted, some replications were not run"
        );
    }

    if let (Some(folder), true) = (&config.output_folder, config.statistics) {
        write_statistics(folder, &summary, cols)?;
    }
    info!(
        completed = summary.combined.completed,
        mean_burnt = summary.combined.mean_burnt,
        std_burnt = summary.combined.std_burnt,
        "Simulation finished"
    );
    Ok(summary)
}

fn report(err: &SimError) -> ExitCode {
    let stage: Stage = err.stage();
    eprintln!("fbp-sim: {stage} failed: {err}");
    ExitCode::FAILURE
}
