//! Run configuration
//!
//! [`SimulationConfig`] is read from YAML. Every field has a default, so a
//! configuration file only names what differs from a plain run:
//!
//! ```yaml
//! inputs:
//!   folder: data/dogrib
//!   ignitions: Ignitions.csv
//! use_ignitions: true
//! output_folder: results
//! replications: 100
//! weather:
//!   mode: rows
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::physics::{FbpModel, SpreadFactors};
use crate::weather::{TimelineSettings, WeatherMode};

/// Input files, relative paths resolved against `folder`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputPaths {
    pub folder: PathBuf,
    /// ESRI ASCII fuel raster
    pub forest: PathBuf,
    /// Per-cell attribute table
    pub data: PathBuf,
    pub weather: PathBuf,
    /// Fuel lookup table, the built-in Canadian table when absent
    pub fuel_lookup: Option<PathBuf>,
    pub ignitions: Option<PathBuf>,
    pub harvest_plan: Option<PathBuf>,
    pub fuel_tuning: Option<PathBuf>,
    /// Custom per-cell value matrix for loss accounting
    pub custom_values: Option<PathBuf>,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("."),
            forest: PathBuf::from("Forest.asc"),
            data: PathBuf::from("Data.csv"),
            weather: PathBuf::from("Weather.csv"),
            fuel_lookup: None,
            ignitions: None,
            harvest_plan: None,
            fuel_tuning: None,
            custom_values: None,
        }
    }
}

impl InputPaths {
    /// Resolve a configured path against the input folder
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.folder.join(path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    pub mode: WeatherMode,
    /// Number of leading scenarios random mode draws from
    pub max_weather_index: Option<usize>,
    pub fire_period_minutes: f64,
    pub weather_period_minutes: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        let settings = TimelineSettings::default();
        Self {
            mode: settings.mode,
            max_weather_index: settings.max_weather_index,
            fire_period_minutes: settings.fire_period_minutes,
            weather_period_minutes: settings.weather_period_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Write `ForestGrid` snapshots
    pub enabled: bool,
    /// Snapshot every N periods of a year
    pub period_step: u32,
    /// Snapshot only every N-th year
    pub year_frequency: u32,
    /// Write a `FinalGrid{year}` file at the end of each year
    pub final_grid: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            period_step: 1,
            year_frequency: 1,
            final_grid: false,
        }
    }
}

/// What happens to the other replications when one fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Cancel the remaining replications and return the first error
    #[default]
    FailFast,
    /// Record the failure and let the other replications finish
    Isolate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Run replications on a worker pool
    pub parallel: bool,
    /// Worker count, rayon's default when absent
    pub threads: Option<usize>,
    pub failure_policy: FailurePolicy,
    /// Wall-clock budget in seconds; unfinished replications are cancelled
    pub time_budget_secs: Option<f64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            failure_policy: FailurePolicy::FailFast,
            time_budget_secs: None,
        }
    }
}

impl ExecutionConfig {
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs.map(Duration::from_secs_f64)
    }
}

/// Complete description of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub inputs: InputPaths,
    pub output_folder: Option<PathBuf>,
    pub sim_years: u32,
    pub replications: usize,
    pub seed: u64,
    pub weather: WeatherConfig,
    /// Per-year fire period cap
    pub max_fire_periods: u32,
    /// Chebyshev radius around each scheduled ignition cell
    pub ignition_radius: usize,
    pub use_ignitions: bool,
    pub use_harvest_plan: bool,
    pub use_fuel_tuning: bool,
    pub snapshot: SnapshotConfig,
    /// Write per-replication transition messages
    pub messages: bool,
    /// Write `Stats/` files
    pub statistics: bool,
    pub verbose: bool,
    /// Minimum spread rate (m/min)
    pub ros_threshold: f64,
    /// Minimum head fire intensity (kW/m)
    pub hfi_threshold: f64,
    /// Coefficient of variation of the spread multiplier, 0 disables it
    pub ros_cv: f64,
    pub factors: SpreadFactors,
    /// Periods a cell may burn before it is extinguished, unlimited when absent
    pub burn_length: Option<u32>,
    pub execution: ExecutionConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            inputs: InputPaths::default(),
            output_folder: None,
            sim_years: 1,
            replications: 1,
            seed: 123,
            weather: WeatherConfig::default(),
            max_fire_periods: 1000,
            ignition_radius: 0,
            use_ignitions: false,
            use_harvest_plan: false,
            use_fuel_tuning: false,
            snapshot: SnapshotConfig::default(),
            messages: false,
            statistics: true,
            verbose: false,
            ros_threshold: 0.1,
            hfi_threshold: 0.1,
            ros_cv: 0.0,
            factors: SpreadFactors::default(),
            burn_length: None,
            execution: ExecutionConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Read a YAML configuration file
    ///
    /// The result is not validated, so that command-line overrides can be
    /// applied first; call [`SimulationConfig::validate`] before running.
    pub fn from_yaml(path: &Path) -> SimResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SimError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
            .map_err(|e| SimError::configuration(format!("{}: {e}", path.display())))
    }

    /// Parse YAML without validating
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Check option combinations and value ranges
    pub fn validate(&self) -> SimResult<()> {
        if self.sim_years == 0 {
            return Err(SimError::configuration("sim_years must be >= 1"));
        }
        if self.replications == 0 {
            return Err(SimError::configuration("replications must be >= 1"));
        }
        flag_matches_path("use_harvest_plan", self.use_harvest_plan, "harvest_plan", self.inputs.harvest_plan.as_deref())?;
        flag_matches_path("use_ignitions", self.use_ignitions, "ignitions", self.inputs.ignitions.as_deref())?;
        flag_matches_path("use_fuel_tuning", self.use_fuel_tuning, "fuel_tuning", self.inputs.fuel_tuning.as_deref())?;

        if self.weather.mode == WeatherMode::Random && self.weather.max_weather_index.is_none() {
            return Err(SimError::configuration(
                "weather mode 'random' requires max_weather_index",
            ));
        }
        if self.weather.max_weather_index == Some(0) {
            return Err(SimError::configuration("max_weather_index must be >= 1"));
        }
        for (name, minutes) in [
            ("fire_period_minutes", self.weather.fire_period_minutes),
            ("weather_period_minutes", self.weather.weather_period_minutes),
        ] {
            if !minutes.is_finite() || minutes <= 0.0 {
                return Err(SimError::configuration(format!("{name} must be > 0, got {minutes}")));
            }
        }

        if self.snapshot.period_step == 0 {
            return Err(SimError::configuration("snapshot.period_step must be >= 1"));
        }
        if self.snapshot.year_frequency == 0 {
            return Err(SimError::configuration("snapshot.year_frequency must be >= 1"));
        }
        if self.output_folder.is_none() {
            if self.snapshot.enabled || self.snapshot.final_grid {
                return Err(SimError::configuration("grid snapshots require output_folder"));
            }
            if self.messages {
                return Err(SimError::configuration("message output requires output_folder"));
            }
        }

        // Thresholds and CV share the model's own checks
        self.fbp_model()?;
        self.factors.validate()?;

        if self.execution.threads == Some(0) {
            return Err(SimError::configuration("execution.threads must be >= 1"));
        }
        if let Some(secs) = self.execution.time_budget_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(SimError::configuration(format!(
                    "execution.time_budget_secs must be > 0, got {secs}"
                )));
            }
        }
        Ok(())
    }

    pub fn fbp_model(&self) -> SimResult<FbpModel> {
        FbpModel::new(self.ros_threshold, self.hfi_threshold, self.ros_cv)
    }

    pub fn timeline_settings(&self) -> TimelineSettings {
        TimelineSettings {
            mode: self.weather.mode,
            fire_period_minutes: self.weather.fire_period_minutes,
            weather_period_minutes: self.weather.weather_period_minutes,
            max_weather_index: self.weather.max_weather_index,
        }
    }

    /// True when any per-replication file output is requested
    pub fn writes_replication_files(&self) -> bool {
        self.output_folder.is_some()
            && (self.snapshot.enabled || self.snapshot.final_grid || self.messages)
    }
}

fn flag_matches_path(flag: &str, enabled: bool, field: &str, path: Option<&Path>) -> SimResult<()> {
    match (enabled, path.is_some()) {
        (true, false) => Err(SimError::configuration(format!(
            "{flag} is set but inputs.{field} is missing"
        ))),
        (false, true) => Err(SimError::configuration(format!(
            "inputs.{field} is given but {flag} is not set"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.seed, 123);
        assert_eq!(config.max_fire_periods, 1000);
        assert_eq!(config.weather.mode, WeatherMode::Rows);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = SimulationConfig::from_yaml_str(
            "replications: 8\nweather:\n  mode: random\n  max_weather_index: 3\nexecution:\n  failure_policy: isolate\n",
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.replications, 8);
        assert_eq!(config.weather.max_weather_index, Some(3));
        assert!((config.weather.fire_period_minutes - 60.0).abs() < f64::EPSILON);
        assert_eq!(config.execution.failure_policy, FailurePolicy::Isolate);
        assert_eq!(config.inputs.forest, PathBuf::from("Forest.asc"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = SimulationConfig::default();
        config.burn_length = Some(4);
        config.output_folder = Some(PathBuf::from("out"));
        let yaml = config.to_yaml().unwrap();
        assert_eq!(SimulationConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(SimulationConfig::from_yaml_str("replicatoins: 3\n").is_err());
    }

    #[test]
    fn test_invalid_combinations() {
        let cases: Vec<Box<dyn Fn(&mut SimulationConfig)>> = vec![
            Box::new(|c| c.sim_years = 0),
            Box::new(|c| c.replications = 0),
            Box::new(|c| c.use_harvest_plan = true),
            Box::new(|c| c.inputs.harvest_plan = Some("plan.csv".into())),
            Box::new(|c| c.use_ignitions = true),
            Box::new(|c| c.inputs.fuel_tuning = Some("tuning.csv".into())),
            Box::new(|c| c.weather.mode = WeatherMode::Random),
            Box::new(|c| c.snapshot.enabled = true),
            Box::new(|c| c.messages = true),
            Box::new(|c| c.snapshot.period_step = 0),
            Box::new(|c| c.ros_threshold = -1.0),
            Box::new(|c| c.hfi_threshold = f64::NAN),
            Box::new(|c| c.ros_cv = f64::INFINITY),
            Box::new(|c| c.factors.back = -0.5),
            Box::new(|c| c.weather.weather_period_minutes = 0.0),
            Box::new(|c| c.execution.threads = Some(0)),
            Box::new(|c| c.execution.time_budget_secs = Some(-1.0)),
        ];
        for (i, mutate) in cases.iter().enumerate() {
            let mut config = SimulationConfig::default();
            mutate(&mut config);
            let err = config.validate().unwrap_err();
            assert!(matches!(err, SimError::Configuration(_)), "case {i}: {err}");
        }
    }

    #[test]
    fn test_relative_inputs_resolve_against_folder() {
        let mut inputs = InputPaths::default();
        inputs.folder = PathBuf::from("/data/run");
        assert_eq!(inputs.resolve(&inputs.forest), PathBuf::from("/data/run/Forest.asc"));
    }
}
