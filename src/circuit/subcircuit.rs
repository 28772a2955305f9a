//! Composite elements.
//!
//! A [`SubCircuit`] owns a nested [`Circuit`] and an explicit boundary map:
//! boundary input `j` feeds inner input port `inputs[j]`, boundary output
//! `k` mirrors inner output port `outputs[k]`. Inner ports are reachable
//! only through this map; the outer graph never connects to them directly.

use crate::circuit::graph::{Circuit, CircuitError};
use crate::circuit::port::{Direction, Port, PortRef};

/// A nested circuit with a fixed boundary.
#[derive(Debug, Clone, Default)]
pub struct SubCircuit {
    inner: Circuit,
    inputs: Vec<PortRef>,
    outputs: Vec<PortRef>,
}

impl SubCircuit {
    /// Wrap `inner` with the given boundary map.
    ///
    /// Every mapped port must exist in `inner` with the matching direction.
    pub fn new(inner: Circuit, inputs: Vec<PortRef>, outputs: Vec<PortRef>) -> Result<Self, CircuitError> {
        for (refs, direction) in [(&inputs, Direction::Input), (&outputs, Direction::Output)] {
            for port in refs.iter() {
                if port.direction != direction {
                    return Err(CircuitError::WrongDirection(*port));
                }
                if inner.port(*port).is_none() {
                    return Err(CircuitError::PortNotFound(*port));
                }
            }
        }
        Ok(Self { inner, inputs, outputs })
    }

    /// Boundary map used when nothing crosses the boundary on the way out:
    /// a single output mirroring the first inner element's first output.
    pub fn default_outputs(inner: &Circuit) -> Vec<PortRef> {
        inner
            .elements()
            .first()
            .filter(|el| !el.outputs().is_empty())
            .map(|el| vec![PortRef::output(el.id(), 0)])
            .unwrap_or_default()
    }

    pub fn circuit(&self) -> &Circuit {
        &self.inner
    }

    /// Inner input port behind each boundary input.
    pub fn inputs(&self) -> &[PortRef] {
        &self.inputs
    }

    /// Inner output port behind each boundary output.
    pub fn outputs(&self) -> &[PortRef] {
        &self.outputs
    }

    pub fn into_parts(self) -> (Circuit, Vec<PortRef>, Vec<PortRef>) {
        (self.inner, self.inputs, self.outputs)
    }

    /// One evaluation of the composite.
    ///
    /// Boundary inputs are copied in, every inner element is evaluated once
    /// in list order, every inner connection is propagated, then mapped
    /// inner outputs are copied to the boundary.
    pub(crate) fn calculate(&mut self, boundary_in: &[Port], boundary_out: &mut [Port]) {
        for (port, target) in boundary_in.iter().zip(&self.inputs) {
            self.inner.set_value(*target, port.value);
        }
        self.inner.evaluate();
        self.inner.propagate();
        for (port, source) in boundary_out.iter_mut().zip(&self.outputs) {
            port.value = self.inner.value(*source).unwrap_or_default();
        }
    }

    pub(crate) fn reset(&mut self) {
        self.inner.reset();
    }
}
