//! Ternary signal primitives.
//!
//! This module provides:
//! - [`Trit`] - A single ternary signal value (NEG, ZERO, POS)
//! - [`logic`] - The transfer functions of the Setun element set

mod trit;
pub mod logic;

pub use trit::{Trit, ParseTritError};
