//! Trait definitions for hardware abstraction and the operator panel.
//!
//! This module defines the contracts that allow stepfill to:
//! - Run on different hardware (controller boards, desktop mock)
//! - Keep the wear-leveled storage core independent of the actual medium
//!
//! # Submodules
//!
//! - `hardware`: Stepper driver, keypad, non-volatile memory, clock
//! - `display`: Character panel rendering trait
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`StepperDriver`]: Blocking position-mode stepper control
//! - [`Keypad`]: Debounced 4×4 matrix key events
//! - [`NonVolatileMemory`]: Byte/bit-addressable EEPROM-like storage
//! - [`Clock`]: Time source for `no_std` environments

pub mod display;
pub mod hardware;

pub use display::*;
pub use hardware::*;
