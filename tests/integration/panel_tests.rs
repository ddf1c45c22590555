//! Front-panel behaviour: profile selection and persistence, the too-hot
//! guard, and the telemetry/display cadences.

use crate::mock_hw::{Bench, MockStore};
use ovenpilot::app::events::AppEvent;
use ovenpilot::app::service::restore_profile;
use ovenpilot::drivers::switches::RawSwitch;
use ovenpilot::fsm::{OvenState, OvenStatus};
use ovenpilot::profile::Profile;

#[test]
fn profile_select_cycles_and_persists_each_step() {
    let mut bench = Bench::new(Profile::LeadFree, 25.0);
    bench.run_for(1_000);

    bench.press(RawSwitch::ProfileSelect);
    assert_eq!(bench.service.profile(), Profile::Leaded);
    bench.press(RawSwitch::ProfileSelect);
    assert_eq!(bench.service.profile(), Profile::Bake);
    bench.press(RawSwitch::ProfileSelect);
    assert_eq!(bench.service.profile(), Profile::LeadFree);

    assert_eq!(
        bench.store.saves,
        vec![Profile::Leaded, Profile::Bake, Profile::LeadFree]
    );
    let selected: Vec<Profile> = bench
        .io
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ProfileSelected(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(
        selected,
        vec![Profile::Leaded, Profile::Bake, Profile::LeadFree]
    );
}

#[test]
fn profile_select_is_ignored_while_running() {
    let mut bench = Bench::new(Profile::LeadFree, 25.0);
    bench.run_for(1_000);
    bench.press(RawSwitch::StartStop);
    assert_eq!(bench.service.state(), OvenState::Preheat);

    bench.press(RawSwitch::ProfileSelect);
    assert_eq!(bench.service.profile(), Profile::LeadFree);
    assert!(bench.store.saves.is_empty());
    assert_eq!(bench.service.state(), OvenState::Preheat);
}

#[test]
fn too_hot_oven_refuses_to_start() {
    let mut bench = Bench::new(Profile::LeadFree, 62.0);
    bench.run_for(1_100);
    assert_eq!(bench.service.state(), OvenState::TooHot);

    // Start presses bounce off while the oven is hot.
    bench.press(RawSwitch::StartStop);
    assert_eq!(bench.service.state(), OvenState::TooHot);
    assert_eq!(bench.service.status(), OvenStatus::Off);

    // Cooling below the room threshold re-arms the panel.
    bench.hw.temperature_c = 45.0;
    bench.run_for(1_100);
    assert_eq!(bench.service.state(), OvenState::Idle);
    bench.press(RawSwitch::StartStop);
    assert_eq!(bench.service.state(), OvenState::Preheat);
}

#[test]
fn persisted_leaded_profile_survives_a_power_cycle() {
    // Boot 1: operator selects leaded.
    let mut store = MockStore::empty();
    assert_eq!(restore_profile(&mut store), Profile::LeadFree);
    let mut bench = Bench::new(Profile::LeadFree, 25.0);
    bench.store = store;
    bench.run_for(1_000);
    bench.press(RawSwitch::ProfileSelect);
    assert_eq!(bench.store.raw, Some(1));

    // Boot 2: the selection comes back with the leaded curve constants.
    let restored = restore_profile(&mut bench.store);
    assert_eq!(restored, Profile::Leaded);
    let params = restored.params().unwrap();
    assert_eq!(params.soak_max_c, 180.0);
    assert_eq!(params.reflow_max_c, 224.0);
    assert_eq!(params.soak_micro_period_ms, 10_000);
}

#[test]
fn garbage_profile_byte_is_corrected_to_lead_free() {
    let mut store = MockStore::with_byte(7);
    assert_eq!(restore_profile(&mut store), Profile::LeadFree);
    // The silent correction is persisted so the next boot reads clean.
    assert_eq!(store.raw, Some(0));
}

#[test]
fn telemetry_streams_once_per_second_only_while_running() {
    let mut bench = Bench::new(Profile::LeadFree, 25.0);

    // Idle: no records, no header.
    bench.run_for(5_000);
    assert_eq!(bench.io.headers, 0);
    assert!(bench.io.samples.is_empty());

    bench.press(RawSwitch::StartStop);
    bench.run_for(10_000);
    assert_eq!(bench.io.headers, 1);
    let stamps: Vec<u32> = bench.io.samples.iter().map(|s| s.elapsed_secs).collect();
    assert_eq!(stamps, (1..=stamps.len() as u32).collect::<Vec<_>>());
    assert!(stamps.len() >= 9, "about one record per second: {stamps:?}");
    for s in &bench.io.samples {
        assert_eq!(s.setpoint_c, 150.0);
        assert_eq!(s.input_c, 25.0);
    }
}

#[test]
fn display_refreshes_at_a_fixed_cadence() {
    let mut bench = Bench::new(Profile::LeadFree, 25.0);
    bench.run_for(1_000);
    // 100 ms refresh → ten frames per second.
    assert_eq!(bench.io.frames.len(), 10);
    let frame = bench.io.frames.last().unwrap();
    assert_eq!(frame.state, OvenState::Idle);
    assert_eq!(frame.profile, Profile::LeadFree);
    assert_eq!(frame.reading_c, Some(25.0));
    assert_eq!(frame.plot_sample, None);
}

#[test]
fn display_shows_error_indicator_instead_of_reading() {
    let mut bench = Bench::new(Profile::LeadFree, 25.0);
    bench.hw.fault_bits = ovenpilot::error::SensorFault::OpenCircuit.mask();
    bench.run_for(1_100);
    assert_eq!(bench.service.state(), OvenState::Error);
    let frame = bench.io.frames.last().unwrap();
    assert_eq!(frame.reading_c, None, "faulted display shows an indicator");
}

#[test]
fn plot_samples_fire_every_three_seconds_while_running() {
    let mut bench = Bench::new(Profile::LeadFree, 25.0);
    bench.run_for(1_000);
    bench.press(RawSwitch::StartStop);
    bench.run_for(10_000);

    let plotted: Vec<u8> = bench
        .io
        .frames
        .iter()
        .filter_map(|f| f.plot_sample)
        .collect();
    // Samples at run seconds 3, 6 and 9 — and no more than once per cadence.
    assert_eq!(plotted.len(), 3, "plot cadence: {plotted:?}");
    for row in plotted {
        assert_eq!(row, ovenpilot::app::events::quantize_plot_row(25.0));
    }
}
