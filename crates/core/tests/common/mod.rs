//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use fbp_sim_core::core_types::{CellAttributes, FuelType, WeatherRecord};
use fbp_sim_core::weather::{TimelineSettings, WeatherMode, WeatherTimeline};
use fbp_sim_core::{Grid, Landscape};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Moderate summer burning conditions, wind from the west
pub fn summer_weather() -> WeatherRecord {
    WeatherRecord::with_indices(90.0, 60.0, 15.0, 270.0)
}

pub fn settings(mode: WeatherMode) -> TimelineSettings {
    TimelineSettings {
        mode,
        ..TimelineSettings::default()
    }
}

/// Uniform C-2 grid under constant weather
pub fn uniform_landscape(rows: usize, cols: usize) -> Landscape {
    landscape_with_weather(rows, cols, vec![summer_weather()], WeatherMode::Constant)
}

pub fn landscape_with_weather(
    rows: usize,
    cols: usize,
    records: Vec<WeatherRecord>,
    mode: WeatherMode,
) -> Landscape {
    let grid = Grid::uniform(rows, cols, 100.0, Some(FuelType::C2), &CellAttributes::default());
    let weather = WeatherTimeline::from_records(records, settings(mode)).unwrap();
    Landscape::new(grid, weather)
}

pub const ATTRIBUTE_HEADER: &str =
    "fueltype,mon,jd,M,jd_min,lat,lon,elev,ffmc,ws,waz,bui,ps,saz,pc,pdf,gfl,cur,time,pattern";

pub const WEATHER_HEADER: &str = "Scenario,datetime,APCP,TMP,RH,WS,WD,FFMC,DMC,DC,ISI,BUI,FWI";

/// Write `Forest.asc`, `Data.csv` and `Weather.csv` for a uniform C-2 grid
pub fn write_inputs(dir: &Path, rows: usize, cols: usize) {
    let mut forest = format!(
        "ncols {cols}\nnrows {rows}\nxllcorner 0\nyllcorner 0\ncellsize 100\nNODATA_value -9999\n"
    );
    for _ in 0..rows {
        forest.push_str(&vec!["2"; cols].join(" "));
        forest.push('\n');
    }
    fs::write(dir.join("Forest.asc"), forest).unwrap();

    let mut data = format!("{ATTRIBUTE_HEADER}\n");
    for _ in 0..rows * cols {
        data.push_str(",6,,,,51.6,-115.6,1200,,,,,0,0,,,,,,\n");
    }
    fs::write(dir.join("Data.csv"), data).unwrap();

    let mut weather = format!("{WEATHER_HEADER}\n");
    for hour in 0..6 {
        weather.push_str(&format!(
            "1,2001-07-15 {:02}:00,0,25,30,15,270,90,40,300,8,60,20\n",
            12 + hour
        ));
    }
    fs::write(dir.join("Weather.csv"), weather).unwrap();
}
