//! Hardware abstraction traits for the stepper, keypad, non-volatile memory,
//! and time source.
//!
//! This module defines the hardware interfaces that allow stepfill to run
//! against desktop mocks as well as real controller boards.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`StepperDriver`] | Position-mode stepper motor control |
//! | [`Keypad`] | 4×4 matrix keypad events |
//! | [`NonVolatileMemory`] | Byte- and bit-addressable persistent storage |
//! | [`Clock`] | Time source for `no_std` environments |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. Board support code implements these traits
//! over its GPIO/EEPROM peripherals; pin assignments come from
//! [`InputConfig`](crate::config::InputConfig).
//!
//! # Example
//!
//! ```rust
//! use stepfill::traits::StepperDriver;
//! use stepfill::hal::MockStepper;
//!
//! let mut stepper = MockStepper::new();
//! stepper.set_enabled(true).unwrap();
//! stepper.move_to(3200).unwrap();
//! stepper.run_to_position().unwrap();
//!
//! assert_eq!(stepper.position, 3200);
//! ```

/// Stepper motor driver in absolute-position mode.
///
/// Models the position-mode interface of common step/dir driver stacks:
/// set a target, block until it is reached, and re-zero the logical
/// position between moves. Speed and acceleration limits are fixed at
/// startup from [`MotorConfig`](crate::config::MotorConfig) and are the
/// implementor's concern, as is the polarity of the enable line (the
/// reference hardware enables on logic low).
///
/// # Implementation Notes
///
/// - `run_to_position` is intentionally blocking. The control loop relies
///   on the move being complete when it returns; motion never overlaps
///   input sampling.
/// - A stalled motor never returns from `run_to_position`. Recovery is a
///   hardware watchdog or a power cycle, not a software path.
pub trait StepperDriver {
    /// Error type for stepper operations.
    type Error;

    /// Set the absolute target position in steps.
    fn move_to(&mut self, target: i64) -> Result<(), Self::Error>;

    /// Drive the motor until the target position is reached.
    ///
    /// Blocks for the full duration of the move.
    fn run_to_position(&mut self) -> Result<(), Self::Error>;

    /// Overwrite the logical current position without moving.
    ///
    /// Called with 0 after every completed move so each run is a
    /// fixed-length relative motion expressed in absolute terms.
    fn set_current_position(&mut self, position: i64) -> Result<(), Self::Error>;

    /// Energize or release the motor outputs.
    ///
    /// `true` energizes. Implementations map this onto the driver's
    /// enable line, inverting as the wiring requires.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error>;
}

/// 4×4 matrix keypad input.
///
/// Produces at most one key character per poll from the fixed layout
/// `1`-`9`, `0`, `A`-`D`, `*`, `#`. The scanner owns its own debounce and
/// hold timing (50 ms / 500 ms on the reference hardware, see
/// [`InputConfig`](crate::config::InputConfig)); callers see only clean
/// key events.
pub trait Keypad {
    /// Returns the next key event, if any.
    ///
    /// A key is reported once per press, on the poll where it becomes
    /// stable. Returns `None` while no new key is down.
    fn poll(&mut self) -> Option<char>;
}

/// Byte-addressable non-volatile memory with single-bit updates.
///
/// Abstracts an EEPROM-like medium: reads are free, writes are precious.
/// `update_*` methods must skip the physical write when the stored value
/// already matches, which is what makes the rotating-bit selection store
/// cheap (see [`RotatingStore`](crate::store::RotatingStore)).
///
/// # Implementation Notes
///
/// - Addresses are relative to a reserved region; the implementation owns
///   the pool layout.
/// - Implementations should enforce a soft lifetime write cap
///   ([`StorageConfig::max_writes`](crate::config::StorageConfig)) and
///   report writes beyond it as errors. The cap is a wear guard, not a
///   correctness guarantee: breaching the medium's rated endurance risks
///   silent retention failure.
pub trait NonVolatileMemory {
    /// Error type for memory operations.
    type Error;

    /// Read one byte.
    fn read_byte(&self, addr: usize) -> Result<u8, Self::Error>;

    /// Write one byte, skipping the physical write if unchanged.
    fn update_byte(&mut self, addr: usize, value: u8) -> Result<(), Self::Error>;

    /// Read a single bit within a byte.
    ///
    /// `bit` is 0..8, LSB first. Default implementation reads the byte
    /// and masks.
    fn read_bit(&self, addr: usize, bit: u8) -> Result<bool, Self::Error> {
        Ok(self.read_byte(addr)? & (1 << bit) != 0)
    }

    /// Update a single bit within a byte.
    ///
    /// Default implementation is read-modify-update; the unchanged-value
    /// skip in [`update_byte`](Self::update_byte) makes a no-op bit
    /// update free.
    fn update_bit(&mut self, addr: usize, bit: u8, value: bool) -> Result<(), Self::Error> {
        let current = self.read_byte(addr)?;
        let next = if value {
            current | (1 << bit)
        } else {
            current & !(1 << bit)
        };
        self.update_byte(addr, next)
    }
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for debounce timing. On
/// desktop, this can wrap `std::time::Instant`. On embedded, use a
/// hardware timer.
///
/// # Example
///
/// ```rust
/// use stepfill::traits::Clock;
/// use stepfill::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(20);
/// assert_eq!(clock.now_ms(), 20);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // NonVolatileMemory Default Methods Tests
    // =========================================================================

    struct TestMemory {
        bytes: [u8; 4],
        byte_writes: usize,
    }

    impl TestMemory {
        fn new() -> Self {
            Self {
                bytes: [0xFF; 4],
                byte_writes: 0,
            }
        }
    }

    impl NonVolatileMemory for TestMemory {
        type Error = ();

        fn read_byte(&self, addr: usize) -> Result<u8, ()> {
            self.bytes.get(addr).copied().ok_or(())
        }

        fn update_byte(&mut self, addr: usize, value: u8) -> Result<(), ()> {
            if addr >= self.bytes.len() {
                return Err(());
            }
            if self.bytes[addr] != value {
                self.bytes[addr] = value;
                self.byte_writes += 1;
            }
            Ok(())
        }
    }

    #[test]
    fn read_bit_default_impl() {
        let mut mem = TestMemory::new();
        mem.bytes[1] = 0b0000_0100;

        assert!(!mem.read_bit(1, 0).unwrap());
        assert!(!mem.read_bit(1, 1).unwrap());
        assert!(mem.read_bit(1, 2).unwrap());
        assert!(!mem.read_bit(1, 7).unwrap());
    }

    #[test]
    fn update_bit_default_impl_clears_one_bit() {
        let mut mem = TestMemory::new();
        mem.update_bit(2, 3, false).unwrap();

        assert_eq!(mem.bytes[2], 0b1111_0111);
        assert_eq!(mem.byte_writes, 1);
    }

    #[test]
    fn update_bit_no_write_when_unchanged() {
        let mut mem = TestMemory::new();
        // Already set, update to set again
        mem.update_bit(0, 5, true).unwrap();

        assert_eq!(mem.bytes[0], 0xFF);
        assert_eq!(mem.byte_writes, 0);
    }

    #[test]
    fn update_bit_out_of_range_errors() {
        let mut mem = TestMemory::new();
        assert!(mem.update_bit(9, 0, false).is_err());
    }
}
