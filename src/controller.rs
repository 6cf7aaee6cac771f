//! Station controller that ties everything together.
//!
//! This module provides [`StationController`], the single-threaded
//! cooperative control loop core. One [`tick`](StationController::tick)
//! performs, in order: advance-button debounce, keypad event handling
//! (selection transitions, persistence, panel updates), and the motion
//! trigger check. Motor moves are synchronous and blocking for their
//! entire duration, during which no input is sampled and no panel update
//! occurs; the motor finishes before the next sample.
//!
//! # Example
//!
//! ```rust
//! use stepfill::{Config, StationController, TickInputs};
//! use stepfill::hal::{MockDisplay, MockNvm, MockStepper};
//!
//! let config = Config::default();
//! let mut controller = StationController::from_config(
//!     MockNvm::new(),
//!     MockStepper::new(),
//!     MockDisplay::new(),
//!     &config,
//! ).unwrap();
//!
//! // Operator picks "Flour Jars" and asserts the run input
//! controller.tick(TickInputs::key('B'), 0).unwrap();
//! let report = controller.tick(TickInputs::run(), 20).unwrap();
//!
//! assert_eq!(report.ran_steps, Some(6400));
//! ```

use crate::config::{Config, ConfigError};
use crate::debounce::{DebouncedInput, Edge};
use crate::motion;
use crate::selection::{KeyOutcome, Selection, SelectionMachine, StepProfile, EDIT_CAPACITY};
use crate::store::{AnyStore, SelectionStore};
use crate::traits::{NonVolatileMemory, PanelDisplay, StepperDriver};

/// Raw input levels and events for one control-loop iteration.
///
/// The board layer samples its pins and keypad scanner once per loop and
/// hands the results over; the controller owns all debounce and edge
/// logic for the advance button. Line levels are raw: with the default
/// pull-up wiring, `false` (logic low) means pressed/asserted.
#[derive(Clone, Copy, Debug)]
pub struct TickInputs {
    /// Raw level of the advance button line.
    pub advance_level: bool,
    /// Raw level of the run input line.
    pub run_level: bool,
    /// Key event from the keypad scanner, if any.
    pub key: Option<char>,
}

impl TickInputs {
    /// All lines idle (pull-ups high), no key.
    pub fn idle() -> Self {
        Self {
            advance_level: true,
            run_level: true,
            key: None,
        }
    }

    /// Idle lines plus one key event.
    pub fn key(key: char) -> Self {
        Self {
            key: Some(key),
            ..Self::idle()
        }
    }

    /// Run input asserted (pulled low), no key.
    pub fn run() -> Self {
        Self {
            run_level: false,
            ..Self::idle()
        }
    }

    /// Advance button held down (pulled low), no key.
    pub fn advance() -> Self {
        Self {
            advance_level: false,
            ..Self::idle()
        }
    }
}

/// What one tick did.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickReport {
    /// Debounced advance-button edge, if one was accepted this tick.
    pub advance_edge: Option<Edge>,
    /// Result of the keypad event, if one arrived.
    pub key_outcome: Option<KeyOutcome>,
    /// Step count of the move performed this tick, if the run input was
    /// asserted with a non-zero step count.
    pub ran_steps: Option<u32>,
}

/// Error from one of the controller's devices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlError<StE, SE, DE> {
    /// The selection store (non-volatile memory) failed.
    Storage(StE),
    /// The stepper driver failed.
    Stepper(SE),
    /// The panel display failed.
    Display(DE),
}

/// Snapshot of controller state for logging or a simulator UI.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationState {
    /// The active selection.
    pub selection: Selection,
    /// Step count a run would use right now.
    pub active_steps: u32,
    /// Committed custom step count.
    pub custom_steps: u32,
    /// Pending custom-entry digits.
    pub pending_digits: heapless::String<EDIT_CAPACITY>,
    /// Completed runs since startup.
    pub run_count: u32,
}

/// Main station controller.
///
/// Owns the selection machine (and through it the persistent store), the
/// stepper, the panel, and the advance-button debouncer. The selection
/// machine never touches the motor and the motion trigger never mutates
/// the selection; this type is the only place the two meet.
///
/// # Type Parameters
///
/// - `St`: selection store ([`SelectionStore`])
/// - `S`: stepper driver ([`StepperDriver`])
/// - `D`: panel display ([`PanelDisplay`])
pub struct StationController<St: SelectionStore, S: StepperDriver, D: PanelDisplay> {
    machine: SelectionMachine<St>,
    stepper: S,
    display: D,
    advance_button: DebouncedInput,
    run_active_low: bool,
    run_count: u32,
}

type Fallible<T, St, S, D> = Result<
    T,
    ControlError<
        <St as SelectionStore>::Error,
        <S as StepperDriver>::Error,
        <D as PanelDisplay>::Error,
    >,
>;

impl<M, S, D> StationController<AnyStore<M>, S, D>
where
    M: NonVolatileMemory,
    S: StepperDriver,
    D: PanelDisplay,
{
    /// Build a controller over raw non-volatile memory, with the storage
    /// policy and default preset table taken from `config`.
    ///
    /// Validates the storage layout against the preset count before
    /// touching the memory, then restores the persisted selection and
    /// shows it on the panel. Configuration mistakes surface as
    /// [`StartupError::Config`], device failures during restore as
    /// [`StartupError::Device`].
    pub fn from_config(
        mem: M,
        stepper: S,
        display: D,
        config: &Config,
    ) -> Result<Self, StartupError<ControlError<M::Error, S::Error, D::Error>>> {
        let profile = StepProfile::default();
        Self::with_profile(mem, stepper, display, config, profile)
    }

    /// [`from_config`](Self::from_config) with a custom preset table.
    pub fn with_profile(
        mem: M,
        stepper: S,
        display: D,
        config: &Config,
        profile: StepProfile,
    ) -> Result<Self, StartupError<ControlError<M::Error, S::Error, D::Error>>> {
        config
            .validate(profile.len())
            .map_err(StartupError::Config)?;
        let store = AnyStore::from_config(mem, &config.storage, profile.len() as u8)
            .map_err(StartupError::Config)?;
        Self::new(store, stepper, display, config, profile).map_err(StartupError::Device)
    }
}

impl<St, S, D> StationController<St, S, D>
where
    St: SelectionStore,
    S: StepperDriver,
    D: PanelDisplay,
{
    /// Build a controller over an already-constructed store.
    ///
    /// Restores the persisted selection and renders its screen.
    pub fn new(
        store: St,
        stepper: S,
        display: D,
        config: &Config,
        profile: StepProfile,
    ) -> Fallible<Self, St, S, D> {
        let machine = SelectionMachine::new(store, profile).map_err(ControlError::Storage)?;
        let mut controller = Self {
            machine,
            stepper,
            display,
            advance_button: if config.input.advance_active_low {
                DebouncedInput::active_low(config.input.debounce_ms)
            } else {
                DebouncedInput::new(config.input.debounce_ms)
            },
            run_active_low: config.input.run_active_low,
            run_count: 0,
        };
        controller
            .show_selection_screen()
            .map_err(ControlError::Display)?;
        Ok(controller)
    }

    /// Run one control-loop iteration.
    ///
    /// Input sampling, selection transitions, and the motion check run in
    /// that order. If the run input is asserted the resulting motor move
    /// completes (blocking) before this returns.
    pub fn tick(&mut self, inputs: TickInputs, now_ms: u64) -> Fallible<TickReport, St, S, D> {
        let mut report = TickReport::default();

        report.advance_edge = self.advance_button.poll(inputs.advance_level, now_ms);
        if report.advance_edge == Some(Edge::Pressed) {
            // Act on press, not release
            self.machine.advance().map_err(ControlError::Storage)?;
            self.show_selection_screen()
                .map_err(ControlError::Display)?;
        }

        if let Some(key) = inputs.key {
            let outcome = self
                .machine
                .handle_key(key)
                .map_err(ControlError::Storage)?;
            self.render_key_outcome(outcome)
                .map_err(ControlError::Display)?;
            report.key_outcome = Some(outcome);
        }

        let run_asserted = inputs.run_level != self.run_active_low;
        if run_asserted {
            let steps = self.machine.active_steps();
            if motion::run_steps(&mut self.stepper, steps).map_err(ControlError::Stepper)? {
                self.run_count += 1;
                self.show_run_count().map_err(ControlError::Display)?;
                report.ran_steps = Some(steps);
            }
        }

        Ok(report)
    }

    /// Draw the preset menu: one row per preset with its key binding.
    pub fn show_main_menu(&mut self) -> Result<(), D::Error> {
        self.display.clear()?;
        let count = self.machine.profile().len().min(4) as u8;
        for index in 0..count {
            self.display.set_cursor(0, index)?;
            // Bound keys exist for every row below 4
            if let (Some(name), Some(key)) = (
                self.machine.profile().name(index),
                self.machine.profile().key_for(index),
            ) {
                self.display.print(name)?;
                self.display.print(": ")?;
                let key_text = [key as u8];
                // keypad letters are ASCII
                self.display
                    .print(core::str::from_utf8(&key_text).unwrap_or("?"))?;
            }
        }
        Ok(())
    }

    /// State snapshot for logging or a simulator UI.
    pub fn state(&self) -> StationState {
        let mut pending = heapless::String::new();
        let _ = pending.push_str(self.machine.pending_digits());
        StationState {
            selection: self.machine.selection(),
            active_steps: self.machine.active_steps(),
            custom_steps: self.machine.custom_steps(),
            pending_digits: pending,
            run_count: self.run_count,
        }
    }

    /// Completed runs since startup.
    pub fn run_count(&self) -> u32 {
        self.run_count
    }

    /// The selection machine.
    pub fn machine(&self) -> &SelectionMachine<St> {
        &self.machine
    }

    /// The stepper driver.
    pub fn stepper(&self) -> &S {
        &self.stepper
    }

    /// The panel display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Tear the controller down into its devices.
    ///
    /// Used by tests to keep the non-volatile memory across a simulated
    /// power cycle.
    pub fn into_parts(self) -> (SelectionMachine<St>, S, D) {
        (self.machine, self.stepper, self.display)
    }

    fn render_key_outcome(&mut self, outcome: KeyOutcome) -> Result<(), D::Error> {
        match outcome {
            KeyOutcome::PresetSelected(_) => self.show_selection_screen(),
            KeyOutcome::CustomEntered => {
                self.display.clear()?;
                self.display.set_cursor(0, 0)?;
                self.display.print("Custom Steps")
            }
            KeyOutcome::DigitAccepted { index, digit } => {
                // Echo the digit as it is typed
                self.display.set_cursor(index, 1)?;
                let text = [digit as u8];
                self.display
                    .print(core::str::from_utf8(&text).unwrap_or("?"))
            }
            KeyOutcome::Committed(value) => {
                self.display.clear()?;
                self.display.set_cursor(0, 0)?;
                self.display.print("Value entered:")?;
                self.display.set_cursor(0, 1)?;
                self.display.print_number(value)
            }
            KeyOutcome::DigitDropped | KeyOutcome::EmptyCommit | KeyOutcome::Ignored => Ok(()),
        }
    }

    /// Selection screen: preset name plus the run counter.
    fn show_selection_screen(&mut self) -> Result<(), D::Error> {
        self.display.clear()?;
        self.display.set_cursor(0, 0)?;
        if let Some(name) = self.machine.active_name() {
            self.display.print(name)?;
        }
        self.display.set_cursor(0, 2)?;
        self.display.print("Number Labeled:")?;
        self.show_run_count()
    }

    fn show_run_count(&mut self) -> Result<(), D::Error> {
        self.display.set_cursor(0, 3)?;
        // Overwrite a previous, possibly wider value
        self.display.print("          ")?;
        self.display.set_cursor(0, 3)?;
        self.display.print_number(self.run_count)
    }
}

/// Failure while building a controller from raw configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartupError<E> {
    /// The configuration was rejected before any device was touched.
    Config(ConfigError),
    /// A device failed during restore or the first render.
    Device(E),
}
