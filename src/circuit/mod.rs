//! Ternary circuit model and simulation engine.
//!
//! This module implements:
//! - Ports addressed by stable (element, direction, index) handles
//! - The closed set of Setun elements and composite sub-circuits
//! - The connection graph with grouping and structural edits
//! - The two-phase (propagate, evaluate) simulation step

pub mod port;
pub mod element;
pub mod subcircuit;
pub mod graph;
pub mod engine;

pub use port::{Direction, ElementId, LineStyle, Point, Port, PortRef, Rect};
pub use element::{Element, ElementKind, ElementState};
pub use subcircuit::SubCircuit;
pub use graph::{Circuit, CircuitError, Connection};
pub use engine::{ElementSnapshot, Simulator};
