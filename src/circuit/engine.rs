//! Simulation engine.
//!
//! One step is two phases in fixed order: propagate every connection, then
//! calculate every element once in list order. An element placed before its
//! driver in the list therefore sees the driver's value one step late; the
//! circuit behaves like a globally clocked machine, not a settling solver.

use std::path::Path;
use log::{debug, info};
use serde::Serialize;

use crate::circuit::element::ElementState;
use crate::circuit::graph::Circuit;
use crate::circuit::port::ElementId;
use crate::scheme::{self, SchemeError};
use crate::ternary::Trit;

/// Serializable view of one element after a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSnapshot {
    pub id: ElementId,
    pub name: String,
    pub kind: &'static str,
    pub inputs: Vec<Trit>,
    pub outputs: Vec<Trit>,
    pub state: Option<ElementState>,
}

/// Drives a [`Circuit`] step by step.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    circuit: Circuit,
    steps: u64,
}

impl Simulator {
    /// Create a simulator over an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_circuit(circuit: Circuit) -> Self {
        Self { circuit, steps: 0 }
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Structural edits go through here. Callers must not edit mid-step.
    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    /// Steps executed since creation, load or reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Execute one propagate-then-evaluate cycle.
    ///
    /// Returns the new step count.
    pub fn step(&mut self) -> u64 {
        self.circuit.propagate();
        self.circuit.evaluate();
        self.steps += 1;
        debug!(
            "step {}: {} elements, {} connections",
            self.steps,
            self.circuit.len(),
            self.circuit.connections().len()
        );
        self.steps
    }

    /// Execute `count` steps. Returns the new step count.
    pub fn run(&mut self, count: u64) -> u64 {
        for _ in 0..count {
            self.step();
        }
        self.steps
    }

    /// Zero every port and stored state, and the step counter.
    pub fn reset(&mut self) {
        self.circuit.reset();
        self.steps = 0;
        debug!("simulator reset");
    }

    /// Current values of every top-level element.
    pub fn snapshot(&self) -> Vec<ElementSnapshot> {
        self.circuit
            .elements()
            .iter()
            .map(|el| ElementSnapshot {
                id: el.id(),
                name: el.name.clone(),
                kind: el.kind().tag(),
                inputs: el.inputs().iter().map(|p| p.value).collect(),
                outputs: el.outputs().iter().map(|p| p.value).collect(),
                state: el.state(),
            })
            .collect()
    }

    /// Replace the circuit with a scheme file.
    ///
    /// The file is decoded into a separate circuit first; on any error the
    /// current circuit is left untouched.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SchemeError> {
        let staged = scheme::load_scheme(path.as_ref())?;
        info!("loaded {} elements from {}", staged.len(), path.as_ref().display());
        self.circuit = staged;
        self.steps = 0;
        Ok(())
    }

    /// Write the circuit to a scheme file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SchemeError> {
        scheme::save_scheme(path, &self.circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Element, ElementKind, PortRef};
    use Trit::{O, P};

    #[test]
    fn test_one_step_latch() {
        // B is evaluated before its driver A.
        let mut c = Circuit::new();
        c.add_element(Element::new(2, ElementKind::TernaryElement, 100, 0)).unwrap();
        c.add_element(Element::new(1, ElementKind::Generator, 0, 0)).unwrap();
        c.connect(PortRef::output(1, 0), PortRef::input(2, 0)).unwrap();
        let mut sim = Simulator::with_circuit(c);

        sim.step();
        assert_eq!(sim.circuit().value(PortRef::output(2, 0)), Some(O));
        assert_eq!(sim.circuit().value(PortRef::output(1, 0)), Some(P));

        sim.step();
        assert_eq!(sim.circuit().value(PortRef::output(2, 0)), Some(P));
        assert_eq!(sim.steps(), 2);
    }

    #[test]
    fn test_fresh_value_when_driver_first() {
        let mut c = Circuit::new();
        c.add_element(Element::new(1, ElementKind::Generator, 0, 0)).unwrap();
        c.add_element(Element::new(2, ElementKind::Or, 100, 0)).unwrap();
        c.connect(PortRef::output(1, 0), PortRef::input(2, 0)).unwrap();
        let mut sim = Simulator::with_circuit(c);

        // propagate runs before the generator's first calculate
        sim.step();
        assert_eq!(sim.circuit().value(PortRef::output(2, 0)), Some(O));
        sim.step();
        assert_eq!(sim.circuit().value(PortRef::output(2, 0)), Some(P));
    }

    #[test]
    fn test_reset_twice_matches_once() {
        let mut c = Circuit::new();
        c.add_element(Element::new(1, ElementKind::Generator, 0, 0)).unwrap();
        c.add_element(Element::new(2, ElementKind::Trigger { state: O }, 100, 0)).unwrap();
        c.connect(PortRef::output(1, 0), PortRef::input(2, 0)).unwrap();
        let mut sim = Simulator::with_circuit(c);
        sim.run(3);
        assert_eq!(sim.circuit().element(2).unwrap().state(), Some(ElementState::Latch(P)));

        sim.reset();
        let once = sim.snapshot();
        sim.reset();
        assert_eq!(sim.snapshot(), once);
        assert_eq!(sim.steps(), 0);
        assert!(once.iter().all(|s| s.inputs.iter().chain(&s.outputs).all(|v| *v == O)));
        assert_eq!(once[1].state, Some(ElementState::Latch(O)));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut c = Circuit::new();
        c.add_element(Element::new(1, ElementKind::Counter { count: 0, max: 2 }, 0, 0)).unwrap();
        let sim = Simulator::with_circuit(c);
        let json = serde_json::to_string(&sim.snapshot()).unwrap();
        assert!(json.contains("\"kind\":\"Counter\""));
        assert!(json.contains("\"Count\""));
    }
}
