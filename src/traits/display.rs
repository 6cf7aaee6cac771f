//! Display abstraction for the operator status panel.
//!
//! This module defines the [`PanelDisplay`] trait for character displays
//! (20×4 LCD on the reference hardware, or a simulated grid for testing).

use core::fmt::Write;

use heapless::String;

/// Character display addressed by column and row.
///
/// Mirrors the call set of common character LCD drivers: clear the
/// screen, position the cursor, print text at the cursor. Backlight and
/// controller setup happen once at init and are the implementor's
/// concern.
///
/// # Example
///
/// ```rust
/// use stepfill::traits::PanelDisplay;
/// use stepfill::hal::MockDisplay;
///
/// let mut lcd = MockDisplay::new();
/// lcd.set_cursor(0, 1).unwrap();
/// lcd.print("Flour Jars").unwrap();
///
/// assert_eq!(lcd.row_text(1), "Flour Jars");
/// ```
pub trait PanelDisplay {
    /// Error type for display operations.
    type Error;

    /// Clears the screen and homes the cursor.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Moves the cursor to `col`, `row` (0-based).
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Self::Error>;

    /// Prints text at the cursor, advancing it.
    ///
    /// Text past the right edge of the screen is the implementor's to
    /// truncate or wrap; callers keep lines within the panel width.
    fn print(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Prints an integer at the cursor.
    ///
    /// Default implementation formats through a stack buffer and calls
    /// [`print`](Self::print).
    fn print_number(&mut self, value: u32) -> Result<(), Self::Error> {
        let mut buf: String<10> = String::new();
        // u32 always fits in 10 digits
        let _ = write!(buf, "{}", value);
        self.print(&buf)
    }
}
