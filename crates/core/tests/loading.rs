//! Input loading and result files, end to end through the file formats

mod common;

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;

use fbp_sim_core::output::{write_statistics, ReplicationWriter};
use fbp_sim_core::{
    CancelToken, CellState, FuelType, Landscape, SimError, SimulationConfig, Simulator, Stage,
};

fn config_for(dir: &Path) -> SimulationConfig {
    let yaml = format!(
        "inputs:\n  folder: {folder}\n  ignitions: Ignitions.csv\n  custom_values: Values.csv\n\
         use_ignitions: true\n\
         output_folder: {folder}/out\n\
         replications: 3\n\
         seed: 5\n\
         messages: true\n\
         snapshot:\n  enabled: true\n  final_grid: true\n\
         weather:\n  mode: rows\n\
         execution:\n  failure_policy: isolate\n",
        folder = dir.display()
    );
    SimulationConfig::from_yaml_str(&yaml).unwrap()
}

fn write_run_inputs(dir: &Path) {
    common::write_inputs(dir, 5, 5);
    fs::write(dir.join("Ignitions.csv"), "Year,Ncell\n1,13\n").unwrap();
    fs::write(dir.join("Values.csv"), "2 2 2 2 2\n".repeat(5)).unwrap();
}

#[test]
fn test_full_run_writes_result_files() {
    let dir = tempfile::tempdir().unwrap();
    write_run_inputs(dir.path());
    let config = config_for(dir.path());
    config.validate().unwrap();

    let landscape = Landscape::load(&config).unwrap();
    assert_eq!(landscape.grid.len(), 25);
    assert_eq!(landscape.grid.cell(0).fuel, Some(FuelType::C2));
    assert_eq!(landscape.ignitions.scheduled(1), &[12]);

    let cols = landscape.grid.cols();
    let simulator = Simulator::from_config(&config, landscape).unwrap();
    let summary = simulator
        .run(
            |r| Ok(ReplicationWriter::for_config(&config, r, cols)),
            &CancelToken::new(),
        )
        .unwrap();
    let out = dir.path().join("out");
    write_statistics(&out, &summary, cols).unwrap();

    assert_eq!(summary.combined.completed, 3);
    assert_relative_eq!(summary.combined.mean_burnt, 25.0);
    assert_eq!(summary.combined.mean_value_loss, Some(50.0));

    for r in 1..=3 {
        let grids = out.join("Grids").join(format!("Grids{r}"));
        assert_eq!(
            fs::read_to_string(grids.join("FinalGrid1.csv")).unwrap(),
            "1,1,1,1,1\n".repeat(5)
        );
        let first = fs::read_to_string(grids.join("ForestGrid00001.csv")).unwrap();
        assert_eq!(first.lines().nth(2), Some("0,1,1,1,0"));

        let messages =
            fs::read_to_string(out.join("Messages").join(format!("MessagesFile{r}.csv"))).unwrap();
        let mut lines = messages.lines();
        assert_eq!(lines.next(), Some("replication,year,period,cell,state"));
        assert_eq!(lines.next(), Some(format!("{r},1,0,13,Burning").as_str()));
        assert_eq!(
            messages.lines().filter(|l| l.ends_with(",Burnt")).count(),
            25
        );
    }

    let bprob = fs::read_to_string(out.join("Stats").join("BProb.csv")).unwrap();
    assert_eq!(bprob, "1.0000,1.0000,1.0000,1.0000,1.0000\n".repeat(5));
    let final_stats = fs::read_to_string(out.join("Stats").join("FinalStats.csv")).unwrap();
    assert_eq!(final_stats.lines().count(), 4);
    assert!(out.join("Stats").join("Summary.csv").exists());
}

#[test]
fn test_nodata_cells_are_non_fuel() {
    let dir = tempfile::tempdir().unwrap();
    common::write_inputs(dir.path(), 2, 2);
    fs::write(
        dir.path().join("Forest.asc"),
        "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 100\nNODATA_value -9999\n2 -9999\n101 2\n",
    )
    .unwrap();
    let config = SimulationConfig {
        inputs: fbp_sim_core::config::InputPaths {
            folder: dir.path().to_path_buf(),
            ..Default::default()
        },
        ..Default::default()
    };
    let landscape = Landscape::load(&config).unwrap();
    let fuels: Vec<_> = landscape.grid.cells().iter().map(|c| c.fuel).collect();
    assert_eq!(fuels, vec![Some(FuelType::C2), None, None, Some(FuelType::C2)]);

    let state = fbp_sim_core::simulation::FireState::new(&landscape.grid);
    assert_eq!(state.state(1), CellState::NonFuel);
    assert_eq!(state.state(2), CellState::NonFuel);
}

#[test]
fn test_attribute_table_must_match_raster() {
    let dir = tempfile::tempdir().unwrap();
    common::write_inputs(dir.path(), 3, 3);
    let data = format!(
        "{}\n{}",
        common::ATTRIBUTE_HEADER,
        ",6,,,,51.6,-115.6,1200,,,,,0,0,,,,,,\n".repeat(4)
    );
    fs::write(dir.path().join("Data.csv"), data).unwrap();
    let config = SimulationConfig {
        inputs: fbp_sim_core::config::InputPaths {
            folder: dir.path().to_path_buf(),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = Landscape::load(&config).unwrap_err();
    assert!(matches!(err, SimError::Data { .. }), "{err}");
    assert_eq!(err.stage(), Stage::Load);
}

#[test]
fn test_out_of_range_weather_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    common::write_inputs(dir.path(), 2, 2);
    fs::write(
        dir.path().join("Weather.csv"),
        format!(
            "{}\n1,2001-07-15 12:00,0,25,30,15,270,150,40,300,8,60,20\n",
            common::WEATHER_HEADER
        ),
    )
    .unwrap();
    let config = SimulationConfig {
        inputs: fbp_sim_core::config::InputPaths {
            folder: dir.path().to_path_buf(),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = Landscape::load(&config).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("FFMC"), "{message}");
}

#[test]
fn test_ignition_outside_grid_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_run_inputs(dir.path());
    fs::write(dir.path().join("Ignitions.csv"), "Year,Ncell\n1,26\n").unwrap();
    let err = Landscape::load(&config_for(dir.path())).unwrap_err();
    assert!(matches!(err, SimError::Data { .. }), "{err}");
    assert!(err.to_string().contains("26"));
}

#[test]
fn test_config_file_errors_are_configuration_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.yaml");
    fs::write(&path, "replications: 2\nunknown_option: 1\n").unwrap();
    let err = SimulationConfig::from_yaml(&path).unwrap_err();
    assert_eq!(err.stage(), Stage::Configuration);

    fs::write(&path, "replications: 2\nuse_harvest_plan: true\n").unwrap();
    let config = SimulationConfig::from_yaml(&path).unwrap();
    assert_eq!(config.replications, 2);
    let err = config.validate().unwrap_err();
    assert_eq!(err.stage(), Stage::Configuration);
    assert!(err.to_string().contains("harvest_plan"));
}
