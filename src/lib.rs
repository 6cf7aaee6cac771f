//! # stepfill
//!
//! Firmware core for a stepper-driven filling station: a fixed set of
//! operator-selectable presets (jar/pouch positions) plus a keypad-entered
//! custom step count, with the active selection persisted across power
//! cycles in wear-aware non-volatile storage.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for the stepper, keypad, EEPROM-like
//!   memory, and character panel
//! - **Wear-leveled persistence**: A rotating single-bit encoding spreads
//!   selection writes across a 32-bit region, multiplying effective write
//!   endurance roughly 8× over rewriting one byte per change
//! - **Debounced input**: Edge-triggered button handling with a 20 ms
//!   minimum sample interval
//! - **Single-threaded polling loop**: One cooperative `tick` per
//!   iteration; motor moves are intentionally blocking and never overlap
//!   input sampling
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware and panel abstractions
//! - `store` - Direct and rotating-bit persistent selection stores
//! - `debounce` - Edge-triggered input debouncing
//! - `selection` - Preset/custom selection state machine
//! - `motion` - The bounded blocking move primitive wrapper
//! - `controller` - Main controller that ties everything together
//! - `hal` - Mock implementations for testing
//!
//! ## Example
//!
//! ```rust
//! use stepfill::{Config, StationController, TickInputs};
//! use stepfill::hal::{MockDisplay, MockNvm, MockStepper};
//!
//! let mut controller = StationController::from_config(
//!     MockNvm::new(),
//!     MockStepper::new(),
//!     MockDisplay::new(),
//!     &Config::default(),
//! ).unwrap();
//!
//! // One loop iteration: operator selects "Pouch Front" on the keypad
//! controller.tick(TickInputs::key('C'), 0).unwrap();
//!
//! // Next iteration: run input asserted, one blocking move of 3200 steps
//! let report = controller.tick(TickInputs::run(), 20).unwrap();
//! assert_eq!(report.ran_steps, Some(3200));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

/// Configuration for motor limits, inputs, and storage policy.
pub mod config;
/// Main station controller coordinating selection, persistence, and motion.
pub mod controller;
/// Edge-triggered debouncing of noisy digital inputs.
pub mod debounce;
/// Mock hardware implementations for testing.
pub mod hal;
/// The bounded blocking move primitive wrapper.
pub mod motion;
/// Preset/custom selection state machine and step profile.
pub mod selection;
/// Durable, wear-aware storage of the selection index.
pub mod store;
/// Core traits for hardware and panel abstraction.
pub mod traits;

// Re-exports for convenience
pub use config::{
    Config, ConfigError, InputConfig, MotorConfig, StorageConfig, StoragePolicy,
    DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_WRITES,
};
pub use controller::{
    ControlError, StartupError, StationController, StationState, TickInputs, TickReport,
};
pub use debounce::{DebouncedInput, Edge};
pub use selection::{
    EditBuffer, KeyOutcome, Preset, Selection, SelectionMachine, StepProfile, EDIT_CAPACITY,
    MAX_PRESETS,
};
pub use store::{AnyStore, DirectStore, RotatingStore, SelectionStore};
pub use traits::{
    // Hardware
    Clock,
    Keypad,
    NonVolatileMemory,
    // Panel
    PanelDisplay,
    StepperDriver,
};
