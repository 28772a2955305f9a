//! # Setun Circuit Simulator
//!
//! A ternary logic circuit simulator built from the element set of the
//! Soviet Setun computers.
//!
//! Signals are single trits (NEG, ZERO, POS). Circuits are lists of
//! elements joined by directed output → input connections and advance in
//! discrete steps: every connection propagates, then every element
//! calculates once in list order.

pub mod ternary;
pub mod circuit;
pub mod registry;
pub mod scheme;
pub mod config;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use ternary::Trit;
pub use circuit::{
    Circuit, CircuitError, Connection, Element, ElementKind, ElementSnapshot, ElementState, PortRef,
    Simulator, SubCircuit,
};
pub use registry::{BuiltinLibrary, Library, LibraryPlugin, Registry, RegistryError};
pub use scheme::{load_scheme, save_scheme, SchemeError};
pub use config::SimConfig;

#[cfg(feature = "tui")]
pub use tui::run_monitor;
