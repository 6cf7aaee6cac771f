//! Durable storage of the active selection index.
//!
//! The selection survives power cycles in EEPROM-like memory. Two
//! encodings are available as alternative policies:
//!
//! - [`DirectStore`]: one byte holds the index verbatim. Cheapest to
//!   read, but costs one cell write per change.
//! - [`RotatingStore`]: the index is the position of the first set bit in
//!   a B-bit vector, modulo the preset count. Each change clears a single
//!   bit, and the vector is rewritten to all-set only when no bit is left
//!   to clear. With B=32 and four presets, a given cell is written once
//!   per eight full sweeps of the selections, multiplying effective write
//!   endurance roughly 8×.
//!
//! [`AnyStore`] wraps both behind one type so the policy can be chosen
//! from [`StorageConfig`](crate::config::StorageConfig) at startup.
//!
//! # Example
//!
//! ```rust
//! use stepfill::store::{RotatingStore, SelectionStore};
//! use stepfill::hal::MockNvm;
//!
//! let mut store = RotatingStore::new(MockNvm::new(), 0, 4, 4).unwrap();
//! assert_eq!(store.read().unwrap(), 0);
//!
//! store.advance_to(2).unwrap();
//! assert_eq!(store.read().unwrap(), 2);
//! ```

use crate::config::{ConfigError, StorageConfig, StoragePolicy};
use crate::traits::NonVolatileMemory;

/// Durable read/advance access to the selection index.
///
/// `read` decodes the persisted preset index in `[0, N)`; `advance_to`
/// mutates durable state so a subsequent `read` returns the target. The
/// store's domain is preset indices only; custom-entry mode is
/// session-local state and is never persisted.
pub trait SelectionStore {
    /// Error type, typically the underlying memory's.
    type Error;

    /// Decode the stored selection index.
    fn read(&self) -> Result<u8, Self::Error>;

    /// Persist `target` as the selection index.
    fn advance_to(&mut self, target: u8) -> Result<(), Self::Error>;
}

// ============================================================================
// Direct encoding
// ============================================================================

/// One-byte selection store.
///
/// Simple and readable in a memory dump, but every change is a write to
/// the same cell. Only acceptable when expected lifetime changes stay
/// well under the medium's rated endurance.
#[derive(Debug)]
pub struct DirectStore<M: NonVolatileMemory> {
    mem: M,
    address: usize,
    preset_count: u8,
}

impl<M: NonVolatileMemory> DirectStore<M> {
    /// Create a direct store over `mem` at `address`.
    pub fn new(mem: M, address: usize, preset_count: u8) -> Result<Self, ConfigError> {
        if preset_count == 0 {
            return Err(ConfigError::EmptyProfile);
        }
        Ok(Self {
            mem,
            address,
            preset_count,
        })
    }

    /// Access the underlying memory.
    pub fn memory(&self) -> &M {
        &self.mem
    }

    /// Consume the store, returning the memory.
    ///
    /// Lets tests simulate a power cycle: keep the memory, rebuild the
    /// store, re-read.
    pub fn into_memory(self) -> M {
        self.mem
    }
}

impl<M: NonVolatileMemory> SelectionStore for DirectStore<M> {
    type Error = M::Error;

    fn read(&self) -> Result<u8, M::Error> {
        // Reduce modulo N: uninitialized EEPROM reads 0xFF
        Ok(self.mem.read_byte(self.address)? % self.preset_count)
    }

    fn advance_to(&mut self, target: u8) -> Result<(), M::Error> {
        self.mem
            .update_byte(self.address, target % self.preset_count)
    }
}

// ============================================================================
// Rotating bit-wear encoding
// ============================================================================

/// Rotating single-bit selection store.
///
/// The persisted state is a bit vector of `region_bytes * 8` bits, all
/// set when fresh. The decoded index is the position of the first set
/// bit (LSB-first within each byte, bytes in address order) modulo the
/// preset count. Advancing clears set bits one at a time; a direct value
/// write never happens. When every bit has been cleared the region is
/// reset to all-set and the sweep starts over.
///
/// The bit length must be a positive multiple of the preset count, or
/// decode results would shift after a wrap-around reset. [`Self::new`]
/// rejects such a configuration.
#[derive(Debug)]
pub struct RotatingStore<M: NonVolatileMemory> {
    mem: M,
    base: usize,
    region_bytes: usize,
    preset_count: u8,
}

impl<M: NonVolatileMemory> RotatingStore<M> {
    /// Create a rotating store over `mem` at `base`.
    ///
    /// `region_bytes * 8` must be a positive multiple of `preset_count`.
    pub fn new(
        mem: M,
        base: usize,
        region_bytes: usize,
        preset_count: u8,
    ) -> Result<Self, ConfigError> {
        if preset_count == 0 {
            return Err(ConfigError::EmptyProfile);
        }
        let bits = region_bytes * 8;
        if bits == 0 || bits % preset_count as usize != 0 {
            return Err(ConfigError::RegionNotMultipleOfPresets {
                bits,
                presets: preset_count as usize,
            });
        }
        Ok(Self {
            mem,
            base,
            region_bytes,
            preset_count,
        })
    }

    /// Access the underlying memory.
    pub fn memory(&self) -> &M {
        &self.mem
    }

    /// Consume the store, returning the memory.
    ///
    /// Lets tests simulate a power cycle: keep the memory, rebuild the
    /// store, re-read.
    pub fn into_memory(self) -> M {
        self.mem
    }

    /// Number of bits in the region.
    pub fn bits(&self) -> usize {
        self.region_bytes * 8
    }

    /// Position of the first set bit, if any.
    fn first_set_bit(&self) -> Result<Option<usize>, M::Error> {
        for i in 0..self.bits() {
            if self.mem.read_bit(self.base + i / 8, (i % 8) as u8)? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Rewrite the whole region to all-set.
    fn reset_region(&mut self) -> Result<(), M::Error> {
        for offset in 0..self.region_bytes {
            self.mem.update_byte(self.base + offset, 0xFF)?;
        }
        Ok(())
    }
}

impl<M: NonVolatileMemory> SelectionStore for RotatingStore<M> {
    type Error = M::Error;

    fn read(&self) -> Result<u8, M::Error> {
        match self.first_set_bit()? {
            Some(i) => Ok((i % self.preset_count as usize) as u8),
            // All-clear is transient (mid-advance) or corrupt; decode as 0
            None => Ok(0),
        }
    }

    fn advance_to(&mut self, target: u8) -> Result<(), M::Error> {
        let target = target % self.preset_count;
        // Each pass clears one bit or resets an exhausted region, so the
        // decoded index advances by one per pass: at most bits() clears
        // plus one reset before the loop closes on the target.
        while self.read()? != target {
            match self.first_set_bit()? {
                Some(i) => self.mem.update_bit(self.base + i / 8, (i % 8) as u8, false)?,
                None => self.reset_region()?,
            }
        }
        Ok(())
    }
}

// ============================================================================
// Policy dispatch
// ============================================================================

/// Selection store with the encoding chosen at runtime.
///
/// Enum dispatch over [`DirectStore`] and [`RotatingStore`], constructed
/// from a [`StorageConfig`]. Keeps the controller free of a second type
/// parameter for the storage policy.
///
/// # Example
///
/// ```rust
/// use stepfill::config::StorageConfig;
/// use stepfill::store::{AnyStore, SelectionStore};
/// use stepfill::hal::MockNvm;
///
/// let mut store = AnyStore::from_config(MockNvm::new(), &StorageConfig::default(), 4).unwrap();
/// store.advance_to(3).unwrap();
/// assert_eq!(store.read().unwrap(), 3);
/// ```
#[derive(Debug)]
pub enum AnyStore<M: NonVolatileMemory> {
    /// One-byte verbatim encoding.
    Direct(DirectStore<M>),
    /// Rotating single-bit encoding.
    Rotating(RotatingStore<M>),
}

impl<M: NonVolatileMemory> AnyStore<M> {
    /// Build the store selected by `config.policy`.
    pub fn from_config(
        mem: M,
        config: &StorageConfig,
        preset_count: u8,
    ) -> Result<Self, ConfigError> {
        match config.policy {
            StoragePolicy::Direct { address } => {
                Ok(AnyStore::Direct(DirectStore::new(mem, address, preset_count)?))
            }
            StoragePolicy::Rotating {
                base_address,
                region_bytes,
            } => Ok(AnyStore::Rotating(RotatingStore::new(
                mem,
                base_address,
                region_bytes,
                preset_count,
            )?)),
        }
    }

    /// Consume the store, returning the memory.
    pub fn into_memory(self) -> M {
        match self {
            AnyStore::Direct(store) => store.into_memory(),
            AnyStore::Rotating(store) => store.into_memory(),
        }
    }
}

impl<M: NonVolatileMemory> SelectionStore for AnyStore<M> {
    type Error = M::Error;

    fn read(&self) -> Result<u8, M::Error> {
        match self {
            AnyStore::Direct(store) => store.read(),
            AnyStore::Rotating(store) => store.read(),
        }
    }

    fn advance_to(&mut self, target: u8) -> Result<(), M::Error> {
        match self {
            AnyStore::Direct(store) => store.advance_to(target),
            AnyStore::Rotating(store) => store.advance_to(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockNvm;

    const PRESETS: u8 = 4;

    fn rotating() -> RotatingStore<MockNvm> {
        RotatingStore::new(MockNvm::new(), 0, 4, PRESETS).unwrap()
    }

    // =========================================================================
    // Rotating encoding
    // =========================================================================

    #[test]
    fn fresh_memory_reads_zero() {
        // Erased EEPROM is all 0xFF: first set bit at position 0
        assert_eq!(rotating().read().unwrap(), 0);
    }

    #[test]
    fn advance_then_read_round_trip() {
        let mut store = rotating();
        for target in 0..PRESETS {
            store.advance_to(target).unwrap();
            assert_eq!(store.read().unwrap(), target);
        }
    }

    #[test]
    fn round_trip_from_every_reachable_state() {
        for start in 0..PRESETS {
            for target in 0..PRESETS {
                let mut store = rotating();
                store.advance_to(start).unwrap();
                store.advance_to(target).unwrap();
                assert_eq!(store.read().unwrap(), target, "{} -> {}", start, target);
            }
        }
    }

    #[test]
    fn advance_clears_bits_never_writes_values() {
        let mut store = rotating();
        store.advance_to(2).unwrap();

        // Bits 0 and 1 cleared, bit 2 still set
        let mem = store.memory();
        assert!(!mem.read_bit(0, 0).unwrap());
        assert!(!mem.read_bit(0, 1).unwrap());
        assert!(mem.read_bit(0, 2).unwrap());
        assert_eq!(mem.write_count(), 2);
    }

    #[test]
    fn advance_to_current_selection_writes_nothing() {
        let mut store = rotating();
        store.advance_to(1).unwrap();
        let before = store.memory().write_count();

        store.advance_to(1).unwrap();
        assert_eq!(store.memory().write_count(), before);
    }

    #[test]
    fn set_bit_position_strictly_advances() {
        let mut store = rotating();
        let mut last = 0;
        // Cycle the selections a few times without exhausting the region
        for target in (1..PRESETS).chain(0..1).chain(1..PRESETS) {
            store.advance_to(target).unwrap();
            let pos = store.first_set_bit().unwrap().unwrap();
            assert!(pos > last || (pos == 0 && last == 0), "pos {} last {}", pos, last);
            last = pos;
        }
    }

    #[test]
    fn exhausted_region_resets_and_continues() {
        let mut store = rotating();
        // 8 full sweeps of 4 selections consume all 32 bits
        for _ in 0..8 {
            for target in [1, 2, 3, 0] {
                store.advance_to(target).unwrap();
            }
        }
        // Region is down to its last set bits; keep cycling across the reset
        store.advance_to(2).unwrap();
        assert_eq!(store.read().unwrap(), 2);
        store.advance_to(0).unwrap();
        assert_eq!(store.read().unwrap(), 0);
    }

    #[test]
    fn all_clear_region_decodes_as_zero() {
        let mut mem = MockNvm::new();
        for addr in 0..4 {
            mem.update_byte(addr, 0x00).unwrap();
        }
        let store = RotatingStore::new(mem, 0, 4, PRESETS).unwrap();
        assert_eq!(store.read().unwrap(), 0);
    }

    #[test]
    fn mutation_count_bounded_per_advance() {
        let mut store = rotating();
        let bits = store.bits();
        let mut before = store.memory().write_count();
        // Long random-ish walk through targets, including wrap-arounds
        for target in [3, 1, 0, 2, 3, 0, 1, 2, 0, 3, 2, 1, 0, 1, 2, 3, 0, 2, 1, 3] {
            store.advance_to(target).unwrap();
            let after = store.memory().write_count();
            // At most one byte write per cleared bit plus a full-region reset
            assert!(after - before <= bits + 4, "advance cost {}", after - before);
            before = after;
        }
    }

    #[test]
    fn region_at_nonzero_base_address() {
        let mut store = RotatingStore::new(MockNvm::new(), 16, 4, PRESETS).unwrap();
        store.advance_to(3).unwrap();
        assert_eq!(store.read().unwrap(), 3);
        // Bytes below the region untouched
        assert_eq!(store.memory().read_byte(0).unwrap(), 0xFF);
        assert_eq!(store.memory().read_byte(15).unwrap(), 0xFF);
    }

    #[test]
    fn rejects_region_not_multiple_of_presets() {
        // 24 bits over 5 presets
        assert!(RotatingStore::new(MockNvm::new(), 0, 3, 5).is_err());
        assert!(RotatingStore::new(MockNvm::new(), 0, 0, 4).is_err());
        assert!(RotatingStore::new(MockNvm::new(), 0, 4, 0).is_err());
    }

    #[test]
    fn out_of_range_target_reduced_modulo_presets() {
        let mut store = rotating();
        store.advance_to(6).unwrap();
        assert_eq!(store.read().unwrap(), 2);
    }

    // =========================================================================
    // Direct encoding
    // =========================================================================

    #[test]
    fn direct_round_trip() {
        let mut store = DirectStore::new(MockNvm::new(), 0, PRESETS).unwrap();
        for target in 0..PRESETS {
            store.advance_to(target).unwrap();
            assert_eq!(store.read().unwrap(), target);
        }
    }

    #[test]
    fn direct_uninitialized_reads_in_range() {
        // Fresh EEPROM byte is 0xFF; read must still be a valid index
        let store = DirectStore::new(MockNvm::new(), 0, PRESETS).unwrap();
        assert!(store.read().unwrap() < PRESETS);
    }

    #[test]
    fn direct_one_write_per_change() {
        let mut store = DirectStore::new(MockNvm::new(), 0, PRESETS).unwrap();
        store.advance_to(1).unwrap();
        store.advance_to(2).unwrap();
        store.advance_to(2).unwrap(); // unchanged, no write
        assert_eq!(store.memory().write_count(), 2);
    }

    // =========================================================================
    // Policy dispatch
    // =========================================================================

    #[test]
    fn any_store_from_default_config_is_rotating() {
        let store =
            AnyStore::from_config(MockNvm::new(), &StorageConfig::default(), PRESETS).unwrap();
        assert!(matches!(store, AnyStore::Rotating(_)));
    }

    #[test]
    fn any_store_direct_policy() {
        let config =
            StorageConfig::default().with_policy(StoragePolicy::Direct { address: 2 });
        let mut store = AnyStore::from_config(MockNvm::new(), &config, PRESETS).unwrap();
        store.advance_to(3).unwrap();
        assert_eq!(store.read().unwrap(), 3);
        assert_eq!(store.into_memory().read_byte(2).unwrap(), 3);
    }
}
