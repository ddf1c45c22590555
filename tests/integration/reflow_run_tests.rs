//! Full-run scenarios: the reflow curve end-to-end, fault preemption, and
//! cancellation.

use crate::mock_hw::Bench;
use ovenpilot::drivers::switches::RawSwitch;
use ovenpilot::error::SensorFault;
use ovenpilot::fsm::{OvenState, OvenStatus};
use ovenpilot::profile::Profile;

/// Let the bench take its first samples, then press start and confirm the
/// run began.
fn start_run(bench: &mut Bench) {
    bench.run_for(1_000);
    bench.press(RawSwitch::StartStop);
    assert_eq!(bench.io.headers, 1, "telemetry header at run start");
}

fn drive_to_reflow(bench: &mut Bench) {
    start_run(bench);
    assert_eq!(bench.service.state(), OvenState::Preheat);
    bench.hw.temperature_c = 155.0;
    bench.run_until(OvenState::Soak, 5_000);
    bench.hw.temperature_c = 205.0;
    bench.run_until(OvenState::Reflow, 150_000);
}

#[test]
fn lead_free_run_walks_the_whole_curve() {
    let mut bench = Bench::new(Profile::LeadFree, 25.0);
    drive_to_reflow(&mut bench);
    assert_eq!(bench.service.setpoint_c(), 250.0);

    bench.hw.temperature_c = 250.0;
    bench.run_until(OvenState::Cool, 5_000);
    assert_eq!(bench.service.setpoint_c(), 100.0);

    // Still above the cool floor: the run stays active.
    bench.hw.temperature_c = 150.0;
    bench.run_for(3_000);
    assert_eq!(bench.service.state(), OvenState::Cool);
    assert_eq!(bench.service.status(), OvenStatus::On);

    // Dropping through the floor completes the run and kills the heat.
    bench.hw.temperature_c = 95.0;
    bench.run_until(OvenState::Complete, 5_000);
    assert_eq!(bench.service.status(), OvenStatus::Off);
    assert!(bench.hw.buzzer, "completion beep sounding");
    assert!(!bench.hw.heater, "heater forced off once complete");

    // Beep times out and the sequencer returns to idle.
    bench.run_until(OvenState::Idle, 5_000);
    assert!(!bench.hw.buzzer, "beep silenced on completion exit");

    assert_eq!(
        bench.io.transitions(),
        vec![
            (OvenState::Idle, OvenState::Preheat),
            (OvenState::Preheat, OvenState::Soak),
            (OvenState::Soak, OvenState::Reflow),
            (OvenState::Reflow, OvenState::Cool),
            (OvenState::Cool, OvenState::Complete),
            (OvenState::Complete, OvenState::Idle),
        ]
    );
    assert!(
        bench.max_setpoint_c <= 250.0,
        "setpoint overshot: {}",
        bench.max_setpoint_c
    );
}

#[test]
fn soak_staircase_reaches_reflow_for_both_staged_profiles() {
    for (profile, peak) in [(Profile::LeadFree, 250.0), (Profile::Leaded, 224.0)] {
        let mut bench = Bench::new(profile, 25.0);
        start_run(&mut bench);
        bench.hw.temperature_c = 155.0;
        bench.run_until(OvenState::Soak, 5_000);
        bench.hw.temperature_c = 175.0;
        bench.run_until(OvenState::Reflow, 150_000);
        assert_eq!(bench.service.setpoint_c(), peak, "{profile:?}");
    }
}

#[test]
fn fault_mid_reflow_preempts_the_reflow_exit() {
    let mut bench = Bench::new(Profile::LeadFree, 25.0);
    drive_to_reflow(&mut bench);

    // The same sample satisfies the Reflow exit condition *and* carries a
    // fault: the fault override must win.
    bench.hw.temperature_c = 246.0;
    bench.hw.fault_bits = SensorFault::OverUnderVoltage.mask();
    bench.run_for(1_100);

    assert_eq!(bench.service.state(), OvenState::Error);
    assert_eq!(bench.service.status(), OvenStatus::Off);
    assert!(!bench.hw.heater);
    let transitions = bench.io.transitions();
    assert!(transitions.contains(&(OvenState::Reflow, OvenState::Error)));
    assert!(
        !transitions.contains(&(OvenState::Reflow, OvenState::Cool)),
        "fault must preempt the Reflow exit"
    );
}

#[test]
fn error_recovers_to_idle_once_fault_clears() {
    let mut bench = Bench::new(Profile::LeadFree, 25.0);
    drive_to_reflow(&mut bench);
    bench.hw.fault_bits = SensorFault::OpenCircuit.mask();
    bench.run_for(1_100);
    assert_eq!(bench.service.state(), OvenState::Error);

    // Recovery needs no acknowledgment: clear the condition and cool down.
    bench.hw.fault_bits = 0;
    bench.hw.temperature_c = 45.0;
    bench.run_for(1_100);
    assert_eq!(bench.service.state(), OvenState::Idle);
    assert_eq!(bench.service.fault_bits(), 0);
}

#[test]
fn cancel_during_bake_returns_straight_to_idle() {
    let mut bench = Bench::new(Profile::Bake, 25.0);
    start_run(&mut bench);
    assert_eq!(bench.service.state(), OvenState::Bake);
    assert_eq!(bench.service.status(), OvenStatus::On);

    // An indefinite hold: hours later it is still baking.
    bench.run_for(30_000);
    assert_eq!(bench.service.state(), OvenState::Bake);

    bench.press(RawSwitch::StartStop);
    assert_eq!(bench.service.state(), OvenState::Idle);
    assert_eq!(bench.service.status(), OvenStatus::Off);
    assert!(!bench.hw.heater);
    assert_eq!(
        bench.io.transitions(),
        vec![
            (OvenState::Idle, OvenState::Bake),
            (OvenState::Bake, OvenState::Idle),
        ]
    );
}

#[test]
fn cancel_mid_preheat_kills_the_run_on_the_next_tick() {
    let mut bench = Bench::new(Profile::LeadFree, 25.0);
    start_run(&mut bench);
    bench.hw.temperature_c = 120.0;
    bench.run_for(2_000);
    assert_eq!(bench.service.state(), OvenState::Preheat);

    bench.press(RawSwitch::StartStop);
    assert_eq!(bench.service.state(), OvenState::Idle);
    assert_eq!(bench.service.status(), OvenStatus::Off);
    assert!(!bench.hw.heater);
}

#[test]
fn heater_pulses_during_preheat_but_never_while_off() {
    let mut bench = Bench::new(Profile::LeadFree, 25.0);

    // Idle: heater must stay off no matter how long we wait.
    bench.run_for(5_000);
    assert!(!bench.hw.heater);

    // A cold oven with a 150 °C setpoint saturates the PID: the relay is on
    // for essentially the whole window.
    bench.press(RawSwitch::StartStop);
    bench.run_for(3_000);
    assert_eq!(bench.service.state(), OvenState::Preheat);
    assert!(bench.hw.heater, "saturated output must close the relay");
    assert!(bench.service.last_output_ms() > 1_900.0);
}
