//! Desktop simulator for the filling-station controller.
//!
//! Runs a scripted operator session against the mock hardware and prints
//! the panel after each step, so the control flow can be inspected
//! without a board attached.
//!
//! ```bash
//! cargo run --bin simulator
//! ```

use anyhow::{anyhow, Result};
use stepfill::hal::{MockClock, MockDisplay, MockNvm, MockStepper, DISPLAY_ROWS};
use stepfill::traits::Clock;
use stepfill::{Config, StationController, TickInputs};

/// Main loop interval in milliseconds (50Hz = 20ms)
const LOOP_INTERVAL_MS: u64 = 20;

type SimController = StationController<
    stepfill::AnyStore<MockNvm>,
    MockStepper,
    MockDisplay,
>;

fn show_panel(label: &str, controller: &SimController) {
    println!("--- {} ---", label);
    println!("+{}+", "-".repeat(20));
    for row in 0..DISPLAY_ROWS {
        println!("|{:<20}|", controller.display().row_text(row));
    }
    println!("+{}+", "-".repeat(20));
    println!();
}

fn main() -> Result<()> {
    println!();
    println!("================================");
    println!("  stepfill station simulator");
    println!("================================");
    println!();

    let config = Config::default();
    let mut clock = MockClock::new();
    let mut controller = StationController::from_config(
        MockNvm::new(),
        MockStepper::new(),
        MockDisplay::new(),
        &config,
    )
    .map_err(|e| anyhow!("startup failed: {:?}", e))?;

    let mut tick = |controller: &mut SimController, clock: &mut MockClock, inputs| {
        clock.advance(LOOP_INTERVAL_MS);
        controller
            .tick(inputs, clock.now_ms())
            .map_err(|e| anyhow!("tick failed: {:?}", e))
    };

    show_panel("power-on (restored selection)", &controller);

    // Advance button: press, then release
    tick(&mut controller, &mut clock, TickInputs::advance())?;
    tick(&mut controller, &mut clock, TickInputs::idle())?;
    show_panel("advance button pressed", &controller);

    // Keypad: jump straight to "Flour Jars"
    tick(&mut controller, &mut clock, TickInputs::key('B'))?;
    show_panel("keypad 'B'", &controller);

    // Run input asserted: one blocking move
    let report = tick(&mut controller, &mut clock, TickInputs::run())?;
    println!("run input: moved {} steps", report.ran_steps.unwrap_or(0));
    show_panel("after first run", &controller);

    // Custom entry: *3200#
    for key in "*3200#".chars() {
        tick(&mut controller, &mut clock, TickInputs::key(key))?;
    }
    show_panel("custom entry committed", &controller);

    let report = tick(&mut controller, &mut clock, TickInputs::run())?;
    println!("run input: moved {} steps", report.ran_steps.unwrap_or(0));
    show_panel("after custom run", &controller);

    let state = controller.state();
    println!("final state: {:?}", state);
    println!(
        "stepper history: {:?}, nvm-backed selection: {:?}",
        controller.stepper().moves,
        state.selection
    );

    Ok(())
}
