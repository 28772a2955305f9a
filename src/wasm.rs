//! WebAssembly bindings for the circuit simulator.
//!
//! This module provides JavaScript-friendly wrappers around [`Simulator`].

use wasm_bindgen::prelude::*;
use crate::circuit::{PortRef, Simulator};
use crate::registry::Registry;
use crate::scheme;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly simulator wrapper.
#[wasm_bindgen]
pub struct WasmSimulator {
    sim: Simulator,
    registry: Registry,
}

#[wasm_bindgen]
impl WasmSimulator {
    /// Create a simulator over an empty circuit.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            sim: Simulator::new(),
            registry: Registry::with_builtins(),
        }
    }

    /// Replace the circuit with scheme text. Returns the element count.
    ///
    /// On error the current circuit is kept.
    #[wasm_bindgen]
    pub fn load_scheme(&mut self, text: &str) -> Result<usize, JsError> {
        let circuit = scheme::from_str(text)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        let len = circuit.len();
        self.sim = Simulator::with_circuit(circuit);
        Ok(len)
    }

    /// Current circuit as scheme text.
    #[wasm_bindgen]
    pub fn save_scheme(&self) -> String {
        scheme::to_string(self.sim.circuit())
    }

    /// Add an element from the built-in libraries. Returns its id.
    #[wasm_bindgen]
    pub fn add_element(&mut self, name: &str, x: i32, y: i32) -> Result<u32, JsError> {
        let circuit = self.sim.circuit_mut();
        let id = circuit.issue_id();
        let element = self.registry.create_any(name, id, x, y)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        circuit.add_element(element)
            .map_err(|e| JsError::new(&format!("{}", e)))
    }

    /// Connect output `from_index` of `from` to input `to_index` of `to`.
    #[wasm_bindgen]
    pub fn connect(&mut self, from: u32, from_index: usize, to: u32, to_index: usize) -> Result<(), JsError> {
        self.sim
            .circuit_mut()
            .connect(PortRef::output(from, from_index), PortRef::input(to, to_index))
            .map_err(|e| JsError::new(&format!("{}", e)))
    }

    /// Execute one step. Returns the step count.
    #[wasm_bindgen]
    pub fn step(&mut self) -> u64 {
        self.sim.step()
    }

    /// Execute `count` steps. Returns the step count.
    #[wasm_bindgen]
    pub fn run(&mut self, count: u32) -> u64 {
        self.sim.run(count as u64)
    }

    /// Zero every port and stored state.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.sim.reset();
    }

    /// Get step count.
    #[wasm_bindgen]
    pub fn steps(&self) -> u64 {
        self.sim.steps()
    }

    /// Output value of an element as -1, 0 or 1, or `undefined`.
    #[wasm_bindgen]
    pub fn output(&self, element: u32, index: usize) -> Option<i8> {
        self.sim.circuit().value(PortRef::output(element, index)).map(i8::from)
    }

    /// Every element's ports and state as a JS array.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        let json = serde_json::to_string(&self.sim.snapshot())
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        js_sys::JSON::parse(&json).map_err(|_| JsError::new("snapshot is not valid JSON"))
    }

    /// Names of every built-in element.
    #[wasm_bindgen]
    pub fn element_names(&self) -> Vec<String> {
        self.registry
            .libraries()
            .iter()
            .flat_map(|lib| lib.entries().iter().map(|e| e.name().to_string()))
            .collect()
    }
}

impl Default for WasmSimulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Check scheme text and return its element count.
#[wasm_bindgen]
pub fn wasm_validate_scheme(text: &str) -> Result<usize, JsError> {
    let circuit = scheme::from_str(text)
        .map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(circuit.len())
}
