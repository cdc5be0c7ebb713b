//! Weather timeline: scenario-grouped weather records queried by period
//!
//! `Weather.csv` rows are grouped by their `Scenario` column in order of first
//! appearance; scenario 0 is the first one in the file. Each replication picks
//! a scenario once (randomly in `random` mode) and then asks for the record of
//! every fire period.

use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core_types::WeatherRecord;
use crate::error::{SimError, SimResult};
use crate::io::{Table, TableRow};

/// How weather records are assigned to fire periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherMode {
    /// First record of the first scenario for every period
    Constant,
    /// One randomly drawn scenario per replication, walked row by row
    Random,
    /// Rows of the scenario walked in order, wrapping around
    #[default]
    Rows,
}

impl std::fmt::Display for WeatherMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            WeatherMode::Constant => "constant",
            WeatherMode::Random => "random",
            WeatherMode::Rows => "rows",
        })
    }
}

/// Timing and selection settings of a timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineSettings {
    pub mode: WeatherMode,
    /// Fire period length (minutes)
    pub fire_period_minutes: f64,
    /// Weather period length (minutes)
    pub weather_period_minutes: f64,
    /// Upper bound (exclusive) of randomly drawn scenarios
    pub max_weather_index: Option<usize>,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            mode: WeatherMode::default(),
            fire_period_minutes: 60.0,
            weather_period_minutes: 60.0,
            max_weather_index: None,
        }
    }
}

/// Records of one weather scenario
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherScenario {
    pub name: String,
    pub records: Vec<WeatherRecord>,
}

/// Immutable weather timeline shared by all replications
#[derive(Debug, Clone)]
pub struct WeatherTimeline {
    scenarios: Vec<WeatherScenario>,
    settings: TimelineSettings,
    source_name: String,
}

const COLUMNS: [&str; 13] = [
    "Scenario", "datetime", "APCP", "TMP", "RH", "WS", "WD", "FFMC", "DMC", "DC", "ISI", "BUI",
    "FWI",
];

impl WeatherTimeline {
    /// Load `Weather.csv`
    pub fn load(path: &Path, settings: TimelineSettings) -> SimResult<Self> {
        Self::from_table(&Table::read(path)?, settings)
    }

    pub fn from_table(table: &Table, settings: TimelineSettings) -> SimResult<Self> {
        table.require_columns(&COLUMNS)?;
        let mut scenarios: Vec<WeatherScenario> = Vec::new();
        for row in table.rows() {
            let record = parse_record(table, row)?;
            match scenarios.iter_mut().find(|s| s.name == record.scenario) {
                Some(scenario) => scenario.records.push(record),
                None => scenarios.push(WeatherScenario {
                    name: record.scenario.clone(),
                    records: vec![record],
                }),
            }
        }
        let timeline = Self::from_scenarios(scenarios, settings, table.source_name())?;
        debug!(
            scenarios = timeline.scenarios.len(),
            records = table.len(),
            mode = %settings.mode,
            "Weather loaded"
        );
        Ok(timeline)
    }

    /// Build a timeline from in-memory scenarios
    pub fn from_scenarios(
        scenarios: Vec<WeatherScenario>,
        settings: TimelineSettings,
        source_name: &str,
    ) -> SimResult<Self> {
        if scenarios.iter().all(|s| s.records.is_empty()) {
            return Err(SimError::data(source_name, "no weather records"));
        }
        for (name, value) in [
            ("fire period length", settings.fire_period_minutes),
            ("weather period length", settings.weather_period_minutes),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::configuration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if let Some(max) = settings.max_weather_index {
            if max == 0 || max > scenarios.len() {
                return Err(SimError::data(
                    source_name,
                    format!(
                        "max weather index {max} is outside 1..={} (scenarios in file)",
                        scenarios.len()
                    ),
                ));
            }
        }
        Ok(Self {
            scenarios,
            settings,
            source_name: source_name.to_string(),
        })
    }

    /// Single-scenario timeline, mostly for synthetic runs
    pub fn from_records(records: Vec<WeatherRecord>, settings: TimelineSettings) -> SimResult<Self> {
        Self::from_scenarios(
            vec![WeatherScenario {
                name: "0".to_string(),
                records,
            }],
            settings,
            "weather",
        )
    }

    pub fn scenarios(&self) -> &[WeatherScenario] {
        &self.scenarios
    }

    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    pub fn mode(&self) -> WeatherMode {
        self.settings.mode
    }

    /// Pick the scenario of a replication
    ///
    /// Only `random` mode consumes randomness; other modes use scenario 0.
    pub fn draw_scenario<R: Rng>(&self, rng: &mut R) -> usize {
        match self.settings.mode {
            WeatherMode::Random => {
                let bound = self
                    .settings
                    .max_weather_index
                    .unwrap_or(self.scenarios.len());
                rng.random_range(0..bound)
            }
            WeatherMode::Constant | WeatherMode::Rows => 0,
        }
    }

    /// 0-based weather period of a 1-based fire period
    #[inline]
    pub fn weather_period(&self, period: u32) -> usize {
        let elapsed = f64::from(period.saturating_sub(1)) * self.settings.fire_period_minutes;
        (elapsed / self.settings.weather_period_minutes).floor() as usize
    }

    /// Weather record for a 1-based fire period of the current year
    pub fn record_for(&self, period: u32, scenario_index: usize) -> SimResult<&WeatherRecord> {
        let scenario = self.scenarios.get(scenario_index).ok_or_else(|| {
            SimError::data(
                &self.source_name,
                format!(
                    "weather scenario {scenario_index} does not exist ({} scenarios)",
                    self.scenarios.len()
                ),
            )
        })?;
        let empty = || {
            SimError::data(
                &self.source_name,
                format!("weather scenario '{}' has no records", scenario.name),
            )
        };

        match self.settings.mode {
            WeatherMode::Constant => self.scenarios[0].records.first().ok_or_else(empty),
            WeatherMode::Random => {
                let row = self.weather_period(period);
                scenario.records.get(row).ok_or_else(|| {
                    SimError::data(
                        &self.source_name,
                        format!(
                            "period {period} needs weather row {} but scenario '{}' has {}",
                            row + 1,
                            scenario.name,
                            scenario.records.len()
                        ),
                    )
                })
            }
            WeatherMode::Rows => {
                if scenario.records.is_empty() {
                    return Err(empty());
                }
                let row = self.weather_period(period) % scenario.records.len();
                Ok(&scenario.records[row])
            }
        }
    }
}

fn parse_record(table: &Table, row: &TableRow) -> SimResult<WeatherRecord> {
    let column = |name: &str| table.column(name);
    let bounded = |name: &str, min: f64, max: f64| -> SimResult<f64> {
        let col = column(name)?;
        let value = table.number(row, col)?;
        if value < min || value > max {
            return Err(table.error_at(row, col, format!("value {value} outside [{min}, {max}]")));
        }
        Ok(value)
    };
    let non_negative = |name: &str| bounded(name, 0.0, f64::MAX);

    let datetime = Some(row.text(column("datetime")?))
        .filter(|text| !text.is_empty())
        .map(str::to_string);
    let julian_day = datetime.as_deref().and_then(parse_julian_day);

    Ok(WeatherRecord {
        scenario: row.text(column("Scenario")?).to_string(),
        datetime,
        julian_day,
        precipitation: non_negative("APCP")?,
        temperature: bounded("TMP", -90.0, 70.0)?,
        relative_humidity: bounded("RH", 0.0, 100.0)?,
        wind_speed: non_negative("WS")?,
        wind_direction: bounded("WD", 0.0, 360.0)?,
        ffmc: bounded("FFMC", 0.0, 101.0)?,
        dmc: non_negative("DMC")?,
        dc: non_negative("DC")?,
        isi: non_negative("ISI")?,
        bui: non_negative("BUI")?,
        fwi: non_negative("FWI")?,
    })
}

/// Day of year of a weather datetime, `None` when the text does not parse
pub fn parse_julian_day(text: &str) -> Option<u16> {
    const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%d/%m/%Y %H:%M",
    ];
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
        .map(|date| date.ordinal() as u16)
}
