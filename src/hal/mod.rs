//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development. Board support
//!   for real hardware lives outside this crate and implements the same
//!   traits.

pub mod mock;

pub use mock::*;
