//! Integration tests for the station controller.

use stepfill::hal::{MockDisplay, MockNvm, MockStepper};
use stepfill::{AnyStore, Config, Edge, Selection, StationController, TickInputs};

fn controller() -> StationController<AnyStore<MockNvm>, MockStepper, MockDisplay> {
    StationController::from_config(
        MockNvm::new(),
        MockStepper::new(),
        MockDisplay::new(),
        &Config::default(),
    )
    .unwrap()
}

#[test]
fn full_preset_cycle_returns_to_start() {
    let mut c = controller();
    let mut now = 0;

    for expected in [1, 2, 3, 0] {
        now += 25;
        let report = c.tick(TickInputs::advance(), now).unwrap();
        assert_eq!(report.advance_edge, Some(Edge::Pressed));
        assert_eq!(c.machine().selection(), Selection::Preset(expected));

        now += 25;
        let report = c.tick(TickInputs::idle(), now).unwrap();
        assert_eq!(report.advance_edge, Some(Edge::Released));
    }
    assert_eq!(c.machine().selection(), Selection::Preset(0));
}

#[test]
fn preset_run_moves_to_table_step_count() {
    let mut c = controller();
    c.tick(TickInputs::key('B'), 0).unwrap();

    let report = c.tick(TickInputs::run(), 20).unwrap();
    assert_eq!(report.ran_steps, Some(6400));
    assert_eq!(c.stepper().moves.as_slice(), [6400]);
    // Position re-homed after the move
    assert_eq!(c.stepper().position, 0);
}

#[test]
fn each_preset_runs_its_own_distance() {
    let expected = [('A', 2610), ('B', 6400), ('C', 3200), ('D', 3600)];
    for (key, steps) in expected {
        let mut c = controller();
        c.tick(TickInputs::key(key), 0).unwrap();
        let report = c.tick(TickInputs::run(), 20).unwrap();
        assert_eq!(report.ran_steps, Some(steps), "preset {}", key);
    }
}

#[test]
fn selection_does_not_change_while_running() {
    let mut c = controller();
    // Run input asserted on the same tick as a key event: the transition
    // applies first, then the (blocking) move uses the new selection
    let inputs = TickInputs {
        key: Some('C'),
        ..TickInputs::run()
    };
    let report = c.tick(inputs, 0).unwrap();

    assert_eq!(report.ran_steps, Some(3200));
    assert_eq!(c.machine().selection(), Selection::Preset(2));
}

#[test]
fn operator_session_end_to_end() {
    let mut c = controller();
    let mut now = 0;

    // Power-on default
    assert_eq!(c.display().row_text(0), "Pre Roll Jars");

    // Three jars of flour
    now += 20;
    c.tick(TickInputs::key('B'), now).unwrap();
    for _ in 0..3 {
        now += 20;
        c.tick(TickInputs::run(), now).unwrap();
    }
    assert_eq!(c.run_count(), 3);
    assert_eq!(c.display().row_text(3), "3");

    // Custom distance for an odd container
    for key in "*12800#".chars() {
        now += 20;
        c.tick(TickInputs::key(key), now).unwrap();
    }
    now += 20;
    let report = c.tick(TickInputs::run(), now).unwrap();
    assert_eq!(report.ran_steps, Some(12800));

    // Back to presets via the advance button
    now += 25;
    c.tick(TickInputs::advance(), now).unwrap();
    assert_eq!(c.machine().selection(), Selection::Preset(2));

    assert_eq!(
        c.stepper().moves.as_slice(),
        [6400, 6400, 6400, 12800]
    );
    assert_eq!(c.run_count(), 4);
}

#[test]
fn run_counter_accumulates_across_selections() {
    let mut c = controller();
    c.tick(TickInputs::run(), 0).unwrap();
    c.tick(TickInputs::key('D'), 20).unwrap();
    c.tick(TickInputs::run(), 40).unwrap();

    assert_eq!(c.run_count(), 2);
    let state = c.state();
    assert_eq!(state.run_count, 2);
    assert_eq!(state.active_steps, 3600);
}

#[test]
fn display_tracks_every_mode() {
    let mut c = controller();

    c.tick(TickInputs::key('A'), 0).unwrap();
    assert_eq!(c.display().row_text(0), "Pre Roll Jars");
    assert_eq!(c.display().row_text(2), "Number Labeled:");

    c.tick(TickInputs::key('*'), 20).unwrap();
    assert_eq!(c.display().row_text(0), "Custom Steps");

    c.tick(TickInputs::key('7'), 40).unwrap();
    c.tick(TickInputs::key('5'), 60).unwrap();
    assert_eq!(c.display().row_text(1), "75");

    c.tick(TickInputs::key('#'), 80).unwrap();
    assert_eq!(c.display().row_text(0), "Value entered:");
    assert_eq!(c.display().row_text(1), "75");
}
