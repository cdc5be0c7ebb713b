//! Spread engine behaviour on synthetic landscapes

mod common;

use fbp_sim_core::core_types::{CellState, WeatherRecord};
use fbp_sim_core::simulation::{
    EngineSettings, FireState, RecordingObserver, PARALLEL_FRONT_MIN,
};
use fbp_sim_core::weather::WeatherMode;
use fbp_sim_core::{
    CancelToken, FbpModel, HarvestEntry, HarvestPlan, IgnitionEvent, IgnitionSource, Landscape,
    ReplicationStats, SimError, SpreadEngine, SpreadFactors, Stage,
};

fn engine_settings(cap: u32, years: u32) -> EngineSettings {
    EngineSettings {
        sim_years: years,
        max_fire_periods: cap,
        burn_length: None,
        factors: SpreadFactors::default(),
        model: FbpModel::new(0.1, 0.1, 0.0).unwrap(),
        parallel_front_min: PARALLEL_FRONT_MIN,
    }
}

fn ignite_at(landscape: Landscape, cell: usize) -> Landscape {
    let source = IgnitionSource::fixed(&[IgnitionEvent { year: 1, cell }], &landscape.grid, 0);
    landscape.with_ignitions(source)
}

fn run(
    landscape: &Landscape,
    settings: &EngineSettings,
    seed: u64,
) -> Result<(ReplicationStats, RecordingObserver), SimError> {
    let mut observer = RecordingObserver::new();
    let stats = SpreadEngine::new(landscape, settings, &landscape.harvest, 1, seed)
        .run(&mut observer, &CancelToken::new())?;
    Ok((stats, observer))
}

#[test]
fn test_fire_advances_one_ring_per_period() {
    use CellState::*;
    let landscape = ignite_at(common::uniform_landscape(5, 5), 12);
    let mut settings = engine_settings(100, 1);
    settings.model = FbpModel::new(0.0, 0.0, 0.0).unwrap();
    let (stats, observer) = run(&landscape, &settings, 7).unwrap();

    let after_first = observer.states_at(1).unwrap();
    assert_eq!(after_first[12], Burnt);
    for id in [6, 7, 8, 11, 13, 16, 17, 18] {
        assert_eq!(after_first[id], Burning, "ring 1 cell {id}");
    }
    for id in [0, 4, 20, 24, 2, 10] {
        assert_eq!(after_first[id], Available, "ring 2 cell {id}");
    }

    let after_second = observer.states_at(2).unwrap();
    assert_eq!(after_second[6], Burnt);
    assert_eq!(after_second[0], Burning);

    assert_eq!(stats.burnt, 25);
    assert!(stats.periods <= 4);
    assert!(observer.finished);
    assert_eq!(observer.years.len(), 1);
}

#[test]
fn test_only_legal_transitions_are_reported() {
    let landscape = common::uniform_landscape(12, 12);
    let mut settings = engine_settings(30, 3);
    settings.model = FbpModel::new(0.1, 0.1, 0.4).unwrap();
    let (_, observer) = run(&landscape, &settings, 99).unwrap();

    let mut states = FireState::new(&landscape.grid).states().to_vec();
    assert!(!observer.transitions.is_empty());
    for transition in &observer.transitions {
        let previous = states[transition.cell];
        assert!(
            previous.can_transition_to(transition.state),
            "{previous} -> {} at cell {}",
            transition.state,
            transition.cell
        );
        states[transition.cell] = transition.state;
    }
    assert!(states.iter().all(|s| *s != CellState::Burning));
}

#[test]
fn test_new_ignitions_touch_the_previous_front() {
    let landscape = ignite_at(common::uniform_landscape(9, 9), 40);
    let (_, observer) = run(&landscape, &engine_settings(100, 1), 3).unwrap();

    for transition in observer
        .transitions
        .iter()
        .filter(|t| t.state == CellState::Burning && t.period > 1)
    {
        let before = observer.states_at(transition.period - 1).unwrap();
        assert!(
            landscape
                .grid
                .neighbours(transition.cell)
                .any(|(n, _)| before[n] == CellState::Burning),
            "cell {} ignited at period {} without a burning neighbour",
            transition.cell,
            transition.period
        );
    }
}

#[test]
fn test_unreachable_threshold_stops_spread() {
    let landscape = ignite_at(common::uniform_landscape(5, 5), 12);
    let mut settings = engine_settings(10, 1);
    settings.model = FbpModel::new(1.0e9, 0.1, 0.0).unwrap();
    let (stats, observer) = run(&landscape, &settings, 1).unwrap();

    // The ignition keeps burning without spreading until the cap puts it out
    assert_eq!(stats.burnt, 1);
    assert_eq!(stats.available, 24);
    assert_eq!(observer.periods.len(), 10);
    for (_, states) in &observer.periods {
        assert_eq!(states[12], CellState::Burning);
    }
}

#[test]
fn test_fire_survives_a_calm_period() {
    use CellState::*;
    let records = vec![
        WeatherRecord::with_indices(40.0, 60.0, 0.0, 270.0),
        WeatherRecord::with_indices(92.0, 60.0, 20.0, 270.0),
        WeatherRecord::with_indices(92.0, 60.0, 20.0, 270.0),
    ];
    let landscape = ignite_at(
        common::landscape_with_weather(5, 5, records, WeatherMode::Rows),
        12,
    );
    let (stats, observer) = run(&landscape, &engine_settings(20, 1), 4).unwrap();

    let after_calm = observer.states_at(1).unwrap();
    assert_eq!(after_calm[12], Burning);
    assert_eq!(after_calm.iter().filter(|s| **s == Available).count(), 24);

    let after_dry = observer.states_at(2).unwrap();
    assert_eq!(after_dry[12], Burnt);
    for id in [6, 7, 8, 11, 13, 16, 17, 18] {
        assert_eq!(after_dry[id], Burning, "ring 1 cell {id}");
    }
    assert_eq!(stats.burnt, 25);
}

#[test]
fn test_pooled_front_matches_sequential_front() {
    let landscape = ignite_at(common::uniform_landscape(41, 41), 20 * 41 + 20);
    let mut settings = engine_settings(30, 1);
    settings.model = FbpModel::new(0.1, 0.1, 0.6).unwrap();

    settings.parallel_front_min = 1;
    let (pooled_stats, pooled) = run(&landscape, &settings, 11).unwrap();
    settings.parallel_front_min = usize::MAX;
    let (sequential_stats, sequential) = run(&landscape, &settings, 11).unwrap();

    let widest = pooled
        .periods
        .iter()
        .map(|(_, states)| states.iter().filter(|&&s| s == CellState::Burning).count())
        .max()
        .unwrap();
    assert!(widest >= PARALLEL_FRONT_MIN, "widest front {widest}");

    assert_eq!(pooled.transitions, sequential.transitions);
    assert_eq!(pooled.periods, sequential.periods);
    assert_eq!(pooled_stats, sequential_stats);
}

#[test]
fn test_same_seed_same_replication() {
    let landscape = common::uniform_landscape(15, 15);
    let mut settings = engine_settings(40, 2);
    settings.model = FbpModel::new(5.0, 0.1, 0.8).unwrap();

    let (first_stats, first) = run(&landscape, &settings, 2024).unwrap();
    let (second_stats, second) = run(&landscape, &settings, 2024).unwrap();
    assert_eq!(first_stats, second_stats);
    assert_eq!(first.transitions, second.transitions);
    assert_eq!(first.periods, second.periods);
}

#[test]
fn test_harvested_cells_never_burn() {
    let mut landscape = ignite_at(common::uniform_landscape(9, 9), 40);
    let mut entries: Vec<HarvestEntry> = (0..9)
        .map(|row| HarvestEntry {
            period: 0,
            cell: row * 9 + 5,
        })
        .collect();
    entries.push(HarvestEntry { period: 2, cell: 0 });
    landscape.harvest = HarvestPlan::from_entries(entries, &landscape.grid).unwrap();

    let (stats, observer) = run(&landscape, &engine_settings(100, 1), 11).unwrap();
    let final_states = &observer.years[0].1;
    for row in 0..9 {
        assert_eq!(final_states[row * 9 + 5], CellState::Harvested);
        for col in 6..9 {
            assert_eq!(final_states[row * 9 + col], CellState::Available);
        }
    }
    assert_eq!(final_states[0], CellState::Harvested);
    assert_eq!(stats.harvested, 10);
    assert!(observer.transitions.iter().any(|t| t.cell == 0
        && t.state == CellState::Harvested
        && t.period == 2));
    assert!(!observer
        .transitions
        .iter()
        .any(|t| t.state == CellState::Burning && (t.cell == 0 || t.cell % 9 >= 5)));
}

#[test]
fn test_harvested_ignition_cell_means_no_fire() {
    let mut landscape = ignite_at(common::uniform_landscape(5, 5), 12);
    landscape.harvest = HarvestPlan::before_start(&[12], &landscape.grid).unwrap();
    let (stats, observer) = run(&landscape, &engine_settings(100, 1), 5).unwrap();

    assert_eq!(stats.burnt, 0);
    assert_eq!(stats.harvested, 1);
    assert_eq!(stats.periods, 0);
    assert_eq!(observer.transitions.len(), 1);
    assert_eq!(observer.transitions[0].year, 0);
}

#[test]
fn test_zero_period_cap_extinguishes_ignition() {
    let landscape = ignite_at(common::uniform_landscape(5, 5), 12);
    let (stats, observer) = run(&landscape, &engine_settings(0, 1), 5).unwrap();

    assert_eq!(stats.burnt, 1);
    assert_eq!(stats.periods, 0);
    assert!(observer.periods.is_empty());
    let states: Vec<CellState> = observer.transitions.iter().map(|t| t.state).collect();
    assert_eq!(states, vec![CellState::Burning, CellState::Burnt]);
}

#[test]
fn test_burn_length_limits_burning_time() {
    let landscape = ignite_at(common::uniform_landscape(1, 20), 0);
    let mut settings = engine_settings(100, 1);
    settings.burn_length = Some(1);
    let (stats, observer) = run(&landscape, &settings, 5).unwrap();

    // Every cell burns for exactly one period in a single-row strip
    for (period, states) in &observer.periods {
        let burning = states.iter().filter(|s| **s == CellState::Burning).count();
        assert!(burning <= 1, "period {period}: {burning} burning cells");
    }
    assert_eq!(stats.burnt, 20);
}

#[test]
fn test_row_weather_wraps_past_the_last_row() {
    let records: Vec<WeatherRecord> = [10.0, 15.0, 20.0]
        .into_iter()
        .map(|ws| WeatherRecord::with_indices(90.0, 60.0, ws, 270.0))
        .collect();
    let landscape = ignite_at(
        common::landscape_with_weather(1, 20, records.clone(), WeatherMode::Rows),
        0,
    );
    for (period, row) in [(4, 0), (5, 1), (6, 2)] {
        assert_eq!(landscape.weather.record_for(period, 0).unwrap(), &records[row]);
    }

    let (stats, observer) = run(&landscape, &engine_settings(6, 1), 8).unwrap();
    assert_eq!(stats.periods, 6);
    assert_eq!(observer.periods.len(), 6);
    // Cells 0..=6 were reached before the cap put the fire out
    assert_eq!(stats.burnt, 7);
    assert_eq!(stats.available, 13);
}

#[test]
fn test_random_weather_runs_out_of_rows() {
    let records = vec![common::summer_weather(); 3];
    let landscape = ignite_at(
        common::landscape_with_weather(1, 20, records, WeatherMode::Random),
        0,
    );
    let err = run(&landscape, &engine_settings(6, 1), 8).unwrap_err();
    assert!(matches!(err, SimError::Data { .. }), "{err}");
}

#[test]
fn test_out_of_domain_weather_is_a_model_error() {
    let landscape = ignite_at(
        common::landscape_with_weather(
            3,
            3,
            vec![WeatherRecord::with_indices(150.0, 60.0, 10.0, 270.0)],
            WeatherMode::Constant,
        ),
        4,
    );
    let err = run(&landscape, &engine_settings(10, 1), 1).unwrap_err();
    assert!(matches!(err, SimError::Model { period: 1, .. }), "{err}");
    assert_eq!(err.in_replication(1).stage(), Stage::Replication(1));
}

#[test]
fn test_later_years_ignite_remaining_fuel() {
    let landscape = common::uniform_landscape(6, 6);
    let mut settings = engine_settings(5, 3);
    settings.model = FbpModel::new(1.0e9, 0.1, 0.0).unwrap();
    let (stats, observer) = run(&landscape, &settings, 17).unwrap();

    // Nothing spreads, so each year burns exactly its ignition cell
    assert_eq!(stats.burnt, 3);
    assert_eq!(observer.years.len(), 3);
    let ignition_years: Vec<u32> = observer
        .transitions
        .iter()
        .filter(|t| t.state == CellState::Burning)
        .map(|t| t.year)
        .collect();
    assert_eq!(ignition_years, vec![1, 2, 3]);
}

#[test]
fn test_cancelled_token_aborts_replication() {
    let landscape = common::uniform_landscape(5, 5);
    let settings = engine_settings(10, 1);
    let token = CancelToken::new();
    token.cancel();
    let mut observer = RecordingObserver::new();
    let err = SpreadEngine::new(&landscape, &settings, &landscape.harvest, 1, 1)
        .run(&mut observer, &token)
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(!observer.finished);
}
