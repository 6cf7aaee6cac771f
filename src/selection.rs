//! Selection state machine: presets, custom-entry mode, and persistence.
//!
//! The machine holds the operator's current selection, one of a closed
//! preset set or custom-entry mode, and transitions on debounced button
//! edges and keypad events. Preset transitions are persisted through a
//! [`SelectionStore`] so the selection survives power cycles; custom mode
//! is session-only state.
//!
//! # Example
//!
//! ```rust
//! use stepfill::selection::{KeyOutcome, Selection, SelectionMachine, StepProfile};
//! use stepfill::store::RotatingStore;
//! use stepfill::hal::MockNvm;
//!
//! let profile = StepProfile::default();
//! let store = RotatingStore::new(MockNvm::new(), 0, 4, profile.len() as u8).unwrap();
//! let mut machine = SelectionMachine::new(store, profile).unwrap();
//!
//! assert_eq!(machine.selection(), Selection::Preset(0));
//! assert_eq!(machine.handle_key('B').unwrap(), KeyOutcome::PresetSelected(1));
//! assert_eq!(machine.active_steps(), 6400);
//! ```

use heapless::{String, Vec};

use crate::store::SelectionStore;

/// Maximum number of presets in a profile.
pub const MAX_PRESETS: usize = 8;

/// Maximum printable length of a preset name (one panel row).
pub const MAX_NAME: usize = 20;

/// Digit capacity of the custom-entry buffer.
pub const EDIT_CAPACITY: usize = 15;

// ============================================================================
// Step profile
// ============================================================================

/// One named motion profile.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Preset {
    /// Operator-facing name, shown on the panel.
    pub name: String<MAX_NAME>,
    /// Step count of one run.
    pub steps: u32,
}

impl Preset {
    /// Create a preset, truncating the name to the panel width.
    pub fn new(name: &str, steps: u32) -> Self {
        let mut truncated: String<MAX_NAME> = String::new();
        for c in name.chars() {
            if truncated.push(c).is_err() {
                break;
            }
        }
        Self {
            name: truncated,
            steps,
        }
    }
}

/// Ordered table of presets, fixed at configuration time.
///
/// The first four presets are bound to the keypad letter keys `A`-`D` by
/// position. The default table matches the reference station.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepProfile {
    presets: Vec<Preset, MAX_PRESETS>,
}

impl Default for StepProfile {
    fn default() -> Self {
        let mut profile = Self::empty();
        for (name, steps) in [
            ("Pre Roll Jars", 2610),
            ("Flour Jars", 6400),
            ("Pouch Front", 3200),
            ("Pouch Back", 3600),
        ] {
            // The reference table fits well under MAX_PRESETS
            let _ = profile.push(Preset::new(name, steps));
        }
        profile
    }
}

impl StepProfile {
    /// An empty profile, to be filled with [`push`](Self::push).
    pub fn empty() -> Self {
        Self {
            presets: Vec::new(),
        }
    }

    /// Append a preset. Fails when the table is full.
    pub fn push(&mut self, preset: Preset) -> Result<(), Preset> {
        self.presets.push(preset)
    }

    /// Builder-style [`push`](Self::push), ignoring overflow.
    pub fn with_preset(mut self, name: &str, steps: u32) -> Self {
        let _ = self.push(Preset::new(name, steps));
        self
    }

    /// Number of presets.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// True when the table has no presets.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Preset at `index`.
    pub fn get(&self, index: u8) -> Option<&Preset> {
        self.presets.get(index as usize)
    }

    /// Step count of the preset at `index`.
    pub fn steps(&self, index: u8) -> Option<u32> {
        self.get(index).map(|p| p.steps)
    }

    /// Name of the preset at `index`.
    pub fn name(&self, index: u8) -> Option<&str> {
        self.get(index).map(|p| p.name.as_str())
    }

    /// Keypad letter bound to the preset at `index` (`A`-`D`).
    pub fn key_for(&self, index: u8) -> Option<char> {
        if (index as usize) < self.len().min(4) {
            Some((b'A' + index) as char)
        } else {
            None
        }
    }

    /// Preset index bound to a keypad letter.
    pub fn preset_for_key(&self, key: char) -> Option<u8> {
        let index = match key {
            'A'..='D' => key as u8 - b'A',
            _ => return None,
        };
        if (index as usize) < self.len() {
            Some(index)
        } else {
            None
        }
    }
}

// ============================================================================
// Edit buffer
// ============================================================================

/// Fixed-capacity buffer of pending custom-entry digits.
///
/// Cleared on custom-mode entry and on commit. Digits past capacity are
/// silently dropped, a policy choice: the operator sees the echo stop.
#[derive(Clone, Debug, Default)]
pub struct EditBuffer {
    digits: String<EDIT_CAPACITY>,
}

impl EditBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all pending digits.
    pub fn clear(&mut self) {
        self.digits.clear();
    }

    /// Append a digit. Returns false when the buffer is full.
    pub fn push(&mut self, digit: char) -> bool {
        self.digits.push(digit).is_ok()
    }

    /// Number of pending digits.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// True when no digits are pending.
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// The pending digits as text, for the panel echo.
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Parse the pending digits as a step count.
    ///
    /// An empty buffer parses as 0; a value past `u32::MAX` saturates.
    pub fn parse(&self) -> u32 {
        self.digits.bytes().fold(0u32, |value, b| {
            value.saturating_mul(10).saturating_add((b - b'0') as u32)
        })
    }
}

// ============================================================================
// State machine
// ============================================================================

/// The active selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// A fixed preset by index.
    Preset(u8),
    /// Custom-entry mode: the step count is typed on the keypad.
    Custom,
}

/// What a keypad event did to the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A preset letter selected and persisted this preset.
    PresetSelected(u8),
    /// `*` entered custom mode; the edit buffer and custom count were
    /// reset.
    CustomEntered,
    /// A digit was appended at `index` in the edit buffer.
    DigitAccepted {
        /// Position of the digit in the buffer, for the panel echo.
        index: u8,
        /// The digit itself.
        digit: char,
    },
    /// A digit arrived with the buffer full and was dropped.
    DigitDropped,
    /// `#` committed the typed value as the custom step count.
    Committed(u32),
    /// `#` with an empty buffer; the custom step count is unchanged.
    EmptyCommit,
    /// The key has no meaning in the current state.
    Ignored,
}

/// Selection state machine backed by a persistent store.
///
/// Owns the [`StepProfile`] and the [`SelectionStore`]; all preset
/// transitions go through [`advance`](Self::advance) or
/// [`handle_key`](Self::handle_key) so the store can never disagree with
/// the in-memory selection. The machine never touches the motor.
#[derive(Debug)]
pub struct SelectionMachine<St: SelectionStore> {
    store: St,
    profile: StepProfile,
    selection: Selection,
    /// Last persisted preset, the anchor for advance-button cycling.
    last_preset: u8,
    custom_steps: u32,
    buffer: EditBuffer,
}

impl<St: SelectionStore> SelectionMachine<St> {
    /// Restore the machine from the store.
    ///
    /// The initial selection is whatever the store decodes; a fresh
    /// store decodes to preset 0. The store must have been built for
    /// `profile.len()` presets.
    pub fn new(store: St, profile: StepProfile) -> Result<Self, St::Error> {
        let restored = store.read()?;
        Ok(Self {
            store,
            profile,
            selection: Selection::Preset(restored),
            last_preset: restored,
            custom_steps: 0,
            buffer: EditBuffer::new(),
        })
    }

    /// The active selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The preset table.
    pub fn profile(&self) -> &StepProfile {
        &self.profile
    }

    /// The committed custom step count.
    pub fn custom_steps(&self) -> u32 {
        self.custom_steps
    }

    /// Pending custom-entry digits, for the panel echo.
    pub fn pending_digits(&self) -> &str {
        self.buffer.as_str()
    }

    /// The step count a run would use right now.
    ///
    /// Preset table lookup, or the committed custom count in custom
    /// mode.
    pub fn active_steps(&self) -> u32 {
        match self.selection {
            Selection::Preset(i) => self.profile.steps(i).unwrap_or(0),
            Selection::Custom => self.custom_steps,
        }
    }

    /// Name of the active preset, if a preset is selected.
    pub fn active_name(&self) -> Option<&str> {
        match self.selection {
            Selection::Preset(i) => self.profile.name(i),
            Selection::Custom => None,
        }
    }

    /// Cycle to the next preset and persist it.
    ///
    /// From custom mode the cycle resumes after the last persisted
    /// preset. Returns the new preset index.
    pub fn advance(&mut self) -> Result<u8, St::Error> {
        let next = (self.last_preset + 1) % self.profile.len() as u8;
        self.select_preset(next)?;
        Ok(next)
    }

    /// Apply a keypad event.
    pub fn handle_key(&mut self, key: char) -> Result<KeyOutcome, St::Error> {
        if let Some(index) = self.profile.preset_for_key(key) {
            self.select_preset(index)?;
            return Ok(KeyOutcome::PresetSelected(index));
        }
        match key {
            '*' => {
                self.selection = Selection::Custom;
                self.buffer.clear();
                self.custom_steps = 0;
                Ok(KeyOutcome::CustomEntered)
            }
            '#' => {
                if self.selection != Selection::Custom {
                    return Ok(KeyOutcome::Ignored);
                }
                if self.buffer.is_empty() {
                    return Ok(KeyOutcome::EmptyCommit);
                }
                self.custom_steps = self.buffer.parse();
                self.buffer.clear();
                Ok(KeyOutcome::Committed(self.custom_steps))
            }
            '0'..='9' => {
                if self.selection != Selection::Custom {
                    return Ok(KeyOutcome::Ignored);
                }
                if self.buffer.push(key) {
                    Ok(KeyOutcome::DigitAccepted {
                        index: (self.buffer.len() - 1) as u8,
                        digit: key,
                    })
                } else {
                    Ok(KeyOutcome::DigitDropped)
                }
            }
            _ => Ok(KeyOutcome::Ignored),
        }
    }

    /// Access the store, for diagnostics.
    pub fn store(&self) -> &St {
        &self.store
    }

    /// Consume the machine, returning the store.
    pub fn into_store(self) -> St {
        self.store
    }

    fn select_preset(&mut self, index: u8) -> Result<(), St::Error> {
        self.store.advance_to(index)?;
        self.selection = Selection::Preset(index);
        self.last_preset = index;
        Ok(())
    }
}
