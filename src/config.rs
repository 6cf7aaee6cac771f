//! Configuration for the filling-station controller.
//!
//! Uses plain-old-data structs with builder-style `with_*` methods so the
//! same configuration works on desktop and on the target board. Defaults
//! match the reference hardware (NEMA stepper behind a step/dir driver,
//! 4×4 keypad, 20×4 LCD, single run button).
//!
//! # Example
//!
//! ```rust
//! use stepfill::config::{Config, StoragePolicy, StorageConfig};
//!
//! // Use defaults (rotating-bit storage, 20 ms debounce)
//! let config = Config::default();
//!
//! // Or switch to the simple one-byte selection store
//! let config = Config::default()
//!     .with_storage(StorageConfig::default().with_policy(StoragePolicy::Direct { address: 0 }));
//!
//! assert!(config.validate(4).is_ok());
//! ```

use core::fmt;

/// Soft cap on lifetime non-volatile writes, matching the reference
/// EEPROM pool configuration.
pub const DEFAULT_MAX_WRITES: u32 = 400;

/// Minimum interval between accepted advance-button samples.
pub const DEFAULT_DEBOUNCE_MS: u64 = 20;

// ============================================================================
// Main Config
// ============================================================================

/// Complete controller configuration.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Stepper speed/acceleration/wiring settings.
    pub motor: MotorConfig,
    /// Button and keypad settings.
    pub input: InputConfig,
    /// Selection persistence settings.
    pub storage: StorageConfig,
}

impl Config {
    /// Set motor configuration.
    pub fn with_motor(mut self, motor: MotorConfig) -> Self {
        self.motor = motor;
        self
    }

    /// Set input configuration.
    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    /// Set storage configuration.
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Validate the configuration against the preset table size.
    ///
    /// Delegates to [`StorageConfig::validate`]; the storage section is
    /// the only part with a cross-field invariant.
    pub fn validate(&self, preset_count: usize) -> Result<(), ConfigError> {
        self.storage.validate(preset_count)
    }
}

// ============================================================================
// Motor Config
// ============================================================================

/// Stepper motor limits and wiring.
///
/// Applied once at startup by the board layer; the core never changes
/// them at runtime.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorConfig {
    /// Maximum speed in steps per second.
    pub max_speed: f32,
    /// Acceleration in steps per second squared.
    pub acceleration: f32,
    /// Whether the direction line is inverted (true on the reference
    /// wiring).
    pub invert_direction: bool,
    /// Full steps per output revolution, for operator documentation and
    /// profile sanity checks.
    pub steps_per_rev: u32,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            max_speed: 1000.0,
            acceleration: 500.0,
            invert_direction: true,
            steps_per_rev: 3200,
        }
    }
}

impl MotorConfig {
    /// Set the maximum speed in steps per second.
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Set the acceleration in steps per second squared.
    pub fn with_acceleration(mut self, acceleration: f32) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Set direction-line inversion.
    pub fn with_invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }
}

// ============================================================================
// Input Config
// ============================================================================

/// Button and keypad wiring and timing.
///
/// Pin numbers are wiring facts consumed by the board layer, not by the
/// core logic; they are configuration rather than constants so a rewired
/// unit needs no rebuild of the core.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputConfig {
    /// Minimum interval between accepted advance-button samples, in ms.
    pub debounce_ms: u64,
    /// The advance button reads logic-low when pressed (pull-up wiring).
    pub advance_active_low: bool,
    /// The run input reads logic-low when asserted (pull-up wiring).
    pub run_active_low: bool,
    /// Keypad scanner debounce time in ms.
    pub keypad_debounce_ms: u16,
    /// Keypad scanner hold time in ms.
    pub keypad_hold_ms: u16,
    /// GPIO pin of the advance button.
    pub advance_pin: u8,
    /// GPIO pin of the run button.
    pub run_pin: u8,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            advance_active_low: true,
            run_active_low: true,
            keypad_debounce_ms: 50,
            keypad_hold_ms: 500,
            advance_pin: 12,
            run_pin: 4,
        }
    }
}

impl InputConfig {
    /// Set the advance-button debounce interval in ms.
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Set the advance button pin.
    pub fn with_advance_pin(mut self, pin: u8) -> Self {
        self.advance_pin = pin;
        self
    }

    /// Set the run button pin.
    pub fn with_run_pin(mut self, pin: u8) -> Self {
        self.run_pin = pin;
        self
    }
}

// ============================================================================
// Storage Config
// ============================================================================

/// Which persistent encoding the selection store uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StoragePolicy {
    /// One byte holds the selection index verbatim. One write per change;
    /// only acceptable when expected lifetime changes stay well under the
    /// medium's rated endurance.
    Direct {
        /// Byte address of the selection cell.
        address: usize,
    },
    /// Rotating single-bit encoding over a multi-byte region. Each change
    /// clears one bit; the region is rewritten only when exhausted,
    /// spreading wear across `region_bytes * 8` cells.
    Rotating {
        /// First byte address of the bit-vector region.
        base_address: usize,
        /// Region length in bytes (4 on the reference hardware, for a
        /// 32-bit vector).
        region_bytes: usize,
    },
}

/// Selection persistence settings.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageConfig {
    /// Encoding policy.
    pub policy: StoragePolicy,
    /// Soft cap on lifetime write operations.
    ///
    /// Enforced by the memory implementation as a wear guard; the store
    /// does not count writes itself.
    pub max_writes: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            policy: StoragePolicy::Rotating {
                base_address: 0,
                region_bytes: 4,
            },
            max_writes: DEFAULT_MAX_WRITES,
        }
    }
}

impl StorageConfig {
    /// Set the encoding policy.
    pub fn with_policy(mut self, policy: StoragePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the soft lifetime write cap.
    pub fn with_max_writes(mut self, max_writes: u32) -> Self {
        self.max_writes = max_writes;
        self
    }

    /// Validate the policy against the preset table size.
    ///
    /// The rotating encoding decodes a bit position modulo the preset
    /// count, so the region's bit length must be a positive multiple of
    /// it or decode results would shift after a wrap-around reset.
    pub fn validate(&self, preset_count: usize) -> Result<(), ConfigError> {
        if preset_count == 0 {
            return Err(ConfigError::EmptyProfile);
        }
        if let StoragePolicy::Rotating { region_bytes, .. } = self.policy {
            let bits = region_bytes * 8;
            if bits == 0 || bits % preset_count != 0 {
                return Err(ConfigError::RegionNotMultipleOfPresets {
                    bits,
                    presets: preset_count,
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Configuration rejected at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The preset table is empty.
    EmptyProfile,
    /// The rotating region's bit length is zero or not a multiple of the
    /// preset count.
    RegionNotMultipleOfPresets {
        /// Bit length of the configured region.
        bits: usize,
        /// Number of presets in the profile.
        presets: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyProfile => write!(f, "preset table is empty"),
            ConfigError::RegionNotMultipleOfPresets { bits, presets } => write!(
                f,
                "rotating region of {} bits is not a positive multiple of {} presets",
                bits, presets
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
