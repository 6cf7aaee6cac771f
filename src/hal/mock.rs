//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without a controller board.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockStepper`] | [`StepperDriver`] | Records every move and enable call |
//! | [`MockNvm`] | [`NonVolatileMemory`] | Byte array with write counting |
//! | [`MockKeypad`] | [`Keypad`] | Queued key events |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockDisplay`] | [`PanelDisplay`] | 20×4 character cell grid |
//!
//! # Example
//!
//! ```rust
//! use stepfill::hal::{MockKeypad, MockStepper};
//! use stepfill::traits::Keypad;
//!
//! let mut keypad = MockKeypad::new();
//! keypad.queue_key('B');
//! keypad.queue_key('#');
//!
//! assert_eq!(keypad.poll(), Some('B'));
//! assert_eq!(keypad.poll(), Some('#'));
//! assert_eq!(keypad.poll(), None);
//! ```
//!
//! [`StepperDriver`]: crate::traits::StepperDriver
//! [`NonVolatileMemory`]: crate::traits::NonVolatileMemory
//! [`Keypad`]: crate::traits::Keypad
//! [`Clock`]: crate::traits::Clock
//! [`PanelDisplay`]: crate::traits::PanelDisplay

use heapless::{Deque, String, Vec};

use crate::traits::{Clock, Keypad, NonVolatileMemory, PanelDisplay, StepperDriver};

// ============================================================================
// Stepper
// ============================================================================

/// Mock stepper driver.
///
/// Records every completed move for verification. Use the public fields
/// to inspect state after test operations.
///
/// # Example
///
/// ```rust
/// use stepfill::hal::MockStepper;
/// use stepfill::traits::StepperDriver;
///
/// let mut stepper = MockStepper::new();
/// stepper.set_enabled(true).unwrap();
/// stepper.move_to(2610).unwrap();
/// stepper.run_to_position().unwrap();
///
/// assert_eq!(stepper.moves.as_slice(), [2610]);
/// assert_eq!(stepper.position, 2610);
/// ```
#[derive(Debug, Default)]
pub struct MockStepper {
    /// Logical current position in steps.
    pub position: i64,
    /// Pending absolute target.
    pub target: i64,
    /// Targets of completed moves, in order.
    pub moves: Vec<i64, 32>,
    /// Whether the outputs are currently energized.
    pub enabled: bool,
    /// Number of `set_enabled` calls.
    pub enable_calls: usize,
}

impl MockStepper {
    /// Creates a new mock stepper at position 0, outputs released.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StepperDriver for MockStepper {
    type Error = ();

    fn move_to(&mut self, target: i64) -> Result<(), ()> {
        self.target = target;
        Ok(())
    }

    fn run_to_position(&mut self) -> Result<(), ()> {
        self.position = self.target;
        self.moves.push(self.target).map_err(|_| ())
    }

    fn set_current_position(&mut self, position: i64) -> Result<(), ()> {
        self.position = position;
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), ()> {
        self.enabled = enabled;
        self.enable_calls += 1;
        Ok(())
    }
}

// ============================================================================
// Non-volatile memory
// ============================================================================

/// Capacity of the mock memory in bytes.
pub const MOCK_NVM_BYTES: usize = 64;

/// Error type for [`MockNvm`] operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NvmError {
    /// Address past the end of the region.
    OutOfRange,
    /// The soft lifetime write cap was reached.
    WriteBudgetExhausted,
}

/// Mock EEPROM-like memory.
///
/// A 64-byte array initialized to the erased state (all `0xFF`), with
/// update-only-if-changed semantics and a physical write counter. An
/// optional write budget simulates the soft lifetime cap of the real
/// medium.
///
/// # Example
///
/// ```rust
/// use stepfill::hal::MockNvm;
/// use stepfill::traits::NonVolatileMemory;
///
/// let mut mem = MockNvm::new();
/// mem.update_bit(0, 0, false).unwrap();
/// mem.update_bit(0, 0, false).unwrap(); // unchanged, no physical write
///
/// assert_eq!(mem.read_byte(0).unwrap(), 0xFE);
/// assert_eq!(mem.write_count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct MockNvm {
    bytes: [u8; MOCK_NVM_BYTES],
    write_count: usize,
    max_writes: Option<usize>,
}

impl Default for MockNvm {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNvm {
    /// Creates an erased memory with no write budget.
    pub fn new() -> Self {
        Self {
            bytes: [0xFF; MOCK_NVM_BYTES],
            write_count: 0,
            max_writes: None,
        }
    }

    /// Apply a soft lifetime write cap; writes beyond it fail.
    pub fn with_max_writes(mut self, max_writes: usize) -> Self {
        self.max_writes = Some(max_writes);
        self
    }

    /// Number of physical byte writes performed so far.
    pub fn write_count(&self) -> usize {
        self.write_count
    }
}

impl NonVolatileMemory for MockNvm {
    type Error = NvmError;

    fn read_byte(&self, addr: usize) -> Result<u8, NvmError> {
        self.bytes.get(addr).copied().ok_or(NvmError::OutOfRange)
    }

    fn update_byte(&mut self, addr: usize, value: u8) -> Result<(), NvmError> {
        if addr >= MOCK_NVM_BYTES {
            return Err(NvmError::OutOfRange);
        }
        if self.bytes[addr] == value {
            return Ok(());
        }
        if let Some(cap) = self.max_writes {
            if self.write_count >= cap {
                return Err(NvmError::WriteBudgetExhausted);
            }
        }
        self.bytes[addr] = value;
        self.write_count += 1;
        Ok(())
    }
}

// ============================================================================
// Keypad
// ============================================================================

/// Mock keypad with queued key events.
///
/// Keys come out in the order queued, one per poll, matching the
/// one-event-per-scan contract of the real scanner.
#[derive(Debug, Default)]
pub struct MockKeypad {
    queue: Deque<char, 16>,
}

impl MockKeypad {
    /// Creates a keypad with no pending keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one key press.
    pub fn queue_key(&mut self, key: char) {
        // Dropping past 16 pending keys is fine for tests
        let _ = self.queue.push_back(key);
    }

    /// Queue a sequence of key presses.
    pub fn queue_keys(&mut self, keys: &str) {
        for key in keys.chars() {
            self.queue_key(key);
        }
    }
}

impl Keypad for MockKeypad {
    fn poll(&mut self) -> Option<char> {
        self.queue.pop_front()
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Mock clock with manually advanced time.
///
/// # Example
///
/// ```rust
/// use stepfill::hal::MockClock;
/// use stepfill::traits::Clock;
///
/// let mut clock = MockClock::new();
/// clock.advance(20);
/// clock.advance(5);
/// assert_eq!(clock.now_ms(), 25);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    now_ms: u64,
}

impl MockClock {
    /// Creates a clock at t=0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by `ms` milliseconds.
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

// ============================================================================
// Display
// ============================================================================

/// Panel width in characters.
pub const DISPLAY_COLS: usize = 20;

/// Panel height in rows.
pub const DISPLAY_ROWS: usize = 4;

/// Mock 20×4 character display.
///
/// Keeps the full cell grid so tests can assert exactly what the
/// operator would see. Printing past the right edge is clipped, like the
/// real panel.
///
/// # Example
///
/// ```rust
/// use stepfill::hal::MockDisplay;
/// use stepfill::traits::PanelDisplay;
///
/// let mut lcd = MockDisplay::new();
/// lcd.set_cursor(0, 0).unwrap();
/// lcd.print("Custom Steps").unwrap();
///
/// assert_eq!(lcd.row_text(0), "Custom Steps");
/// assert_eq!(lcd.row_text(1), "");
/// ```
#[derive(Debug)]
pub struct MockDisplay {
    cells: [[char; DISPLAY_COLS]; DISPLAY_ROWS],
    col: usize,
    row: usize,
    /// Number of `clear` calls.
    pub clear_count: usize,
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDisplay {
    /// Creates a blank display with the cursor at home.
    pub fn new() -> Self {
        Self {
            cells: [[' '; DISPLAY_COLS]; DISPLAY_ROWS],
            col: 0,
            row: 0,
            clear_count: 0,
        }
    }

    /// Text of one row with trailing blanks trimmed.
    pub fn row_text(&self, row: usize) -> String<DISPLAY_COLS> {
        let mut text: String<DISPLAY_COLS> = String::new();
        if let Some(cells) = self.cells.get(row) {
            let used = cells
                .iter()
                .rposition(|c| *c != ' ')
                .map_or(0, |last| last + 1);
            for c in &cells[..used] {
                let _ = text.push(*c);
            }
        }
        text
    }
}

impl PanelDisplay for MockDisplay {
    type Error = ();

    fn clear(&mut self) -> Result<(), ()> {
        self.cells = [[' '; DISPLAY_COLS]; DISPLAY_ROWS];
        self.col = 0;
        self.row = 0;
        self.clear_count += 1;
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), ()> {
        self.col = (col as usize).min(DISPLAY_COLS);
        self.row = (row as usize).min(DISPLAY_ROWS - 1);
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<(), ()> {
        for c in text.chars() {
            if self.col >= DISPLAY_COLS {
                break;
            }
            self.cells[self.row][self.col] = c;
            self.col += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepper_records_moves_in_order() {
        let mut stepper = MockStepper::new();
        stepper.move_to(100).unwrap();
        stepper.run_to_position().unwrap();
        stepper.move_to(200).unwrap();
        stepper.run_to_position().unwrap();

        assert_eq!(stepper.moves.as_slice(), [100, 200]);
        assert_eq!(stepper.position, 200);
    }

    #[test]
    fn nvm_counts_only_changing_writes() {
        let mut mem = MockNvm::new();
        mem.update_byte(1, 0xFF).unwrap();
        mem.update_byte(1, 0x00).unwrap();
        mem.update_byte(1, 0x00).unwrap();

        assert_eq!(mem.write_count(), 1);
    }

    #[test]
    fn nvm_write_budget_exhaustion() {
        let mut mem = MockNvm::new().with_max_writes(2);
        mem.update_byte(0, 0x01).unwrap();
        mem.update_byte(1, 0x02).unwrap();

        assert_eq!(
            mem.update_byte(2, 0x03),
            Err(NvmError::WriteBudgetExhausted)
        );
        // Unchanged writes stay free even at the cap
        assert!(mem.update_byte(0, 0x01).is_ok());
    }

    #[test]
    fn nvm_out_of_range() {
        let mut mem = MockNvm::new();
        assert_eq!(mem.read_byte(MOCK_NVM_BYTES), Err(NvmError::OutOfRange));
        assert_eq!(
            mem.update_byte(MOCK_NVM_BYTES, 0),
            Err(NvmError::OutOfRange)
        );
    }

    #[test]
    fn keypad_fifo_order() {
        let mut keypad = MockKeypad::new();
        keypad.queue_keys("*3200#");

        let mut out = heapless::String::<8>::new();
        while let Some(key) = keypad.poll() {
            out.push(key).unwrap();
        }
        assert_eq!(out, "*3200#");
    }

    #[test]
    fn display_clips_at_right_edge() {
        let mut lcd = MockDisplay::new();
        lcd.set_cursor(15, 2).unwrap();
        lcd.print("overflowing").unwrap();

        assert_eq!(lcd.row_text(2), "               overf");
    }

    #[test]
    fn display_clear_homes_cursor() {
        let mut lcd = MockDisplay::new();
        lcd.set_cursor(3, 3).unwrap();
        lcd.print("x").unwrap();
        lcd.clear().unwrap();
        lcd.print("y").unwrap();

        assert_eq!(lcd.row_text(0), "y");
        assert_eq!(lcd.row_text(3), "");
        assert_eq!(lcd.clear_count, 1);
    }

    #[test]
    fn display_print_number_via_default() {
        let mut lcd = MockDisplay::new();
        lcd.set_cursor(0, 3).unwrap();
        lcd.print_number(42).unwrap();

        assert_eq!(lcd.row_text(3), "42");
    }
}
