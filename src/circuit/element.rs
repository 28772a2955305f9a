//! Circuit elements.
//!
//! The element set is closed: every kind is a variant of [`ElementKind`]
//! and behaviour is dispatched through a single match in
//! [`Element::calculate`]. Port order is the role of each port, e.g. a
//! magnetic amplifier's input 0 is power and input 1 is control.

use serde::{Serialize, Deserialize};
use crate::circuit::port::{Direction, ElementId, Point, Port, PortRef, Rect};
use crate::circuit::subcircuit::SubCircuit;
use crate::ternary::{logic, Trit};

/// Default element width in editor units.
pub const DEFAULT_WIDTH: i32 = 60;
/// Default element height in editor units.
pub const DEFAULT_HEIGHT: i32 = 40;
/// Vertical space reserved per port on tall elements.
const PORT_PITCH: i32 = 12;

/// Behaviour variant of an element.
#[derive(Debug, Clone)]
pub enum ElementKind {
    /// Inputs: power, control. Output: gated control.
    MagneticAmplifier,
    /// Inputs: a, b. Output: ternary cell function.
    TernaryElement,
    /// Inputs: data, enable. The output port is the storage cell.
    ShiftRegister,
    /// Inputs: set+, set-, reset. Outputs: Q, ~Q.
    Trigger { state: Trit },
    /// Inputs: a, b. Outputs: sum, carry.
    HalfAdder,
    /// Inputs: a, b, carry-in. Outputs: sum, carry-out.
    Adder,
    /// `select` inputs, 3^select one-hot outputs.
    Decoder { select: usize },
    /// Inputs: increment, decrement. Output: level of `count` within `[0, max]`.
    Counter { count: u32, max: u32 },
    And,
    Or,
    /// Inputs: a, inhibit.
    Inhibit,
    /// Constant POS source.
    Generator,
    /// Composite wrapping a nested circuit.
    SubCircuit(Box<SubCircuit>),
}

/// Persistent internal state of a stateful element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementState {
    Latch(Trit),
    Count { count: u32, max: u32 },
}

impl ElementKind {
    /// Discriminator string used in scheme files.
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::MagneticAmplifier => "MagneticAmplifier",
            ElementKind::TernaryElement => "TernaryElement",
            ElementKind::ShiftRegister => "ShiftRegister",
            ElementKind::Trigger { .. } => "TernaryTrigger",
            ElementKind::HalfAdder => "HalfAdder",
            ElementKind::Adder => "TernaryAdder",
            ElementKind::Decoder { .. } => "Decoder",
            ElementKind::Counter { .. } => "Counter",
            ElementKind::And => "LogicAnd",
            ElementKind::Or => "LogicOr",
            ElementKind::Inhibit => "LogicInhibit",
            ElementKind::Generator => "Generator",
            ElementKind::SubCircuit(_) => "SubCircuit",
        }
    }

    /// Rebuild a leaf kind from its discriminator with initial state.
    ///
    /// Parameterised kinds take their parameter from `param`: select line
    /// count for decoders, `max` for counters. Composites are not leaf kinds
    /// and return `None`.
    pub fn from_tag(tag: &str, param: u32) -> Option<ElementKind> {
        let kind = match tag {
            "MagneticAmplifier" => ElementKind::MagneticAmplifier,
            "TernaryElement" => ElementKind::TernaryElement,
            "ShiftRegister" => ElementKind::ShiftRegister,
            "TernaryTrigger" => ElementKind::Trigger { state: Trit::O },
            "HalfAdder" => ElementKind::HalfAdder,
            "TernaryAdder" => ElementKind::Adder,
            "Decoder" => ElementKind::Decoder { select: param as usize },
            "Counter" => ElementKind::Counter { count: 0, max: param },
            "LogicAnd" => ElementKind::And,
            "LogicOr" => ElementKind::Or,
            "LogicInhibit" => ElementKind::Inhibit,
            "Generator" => ElementKind::Generator,
            _ => return None,
        };
        Some(kind)
    }

    /// Number of (input, output) ports this kind is built with.
    pub fn port_counts(&self) -> (usize, usize) {
        match self {
            ElementKind::MagneticAmplifier
            | ElementKind::TernaryElement
            | ElementKind::ShiftRegister
            | ElementKind::Counter { .. }
            | ElementKind::And
            | ElementKind::Or
            | ElementKind::Inhibit => (2, 1),
            ElementKind::Trigger { .. } => (3, 2),
            ElementKind::HalfAdder => (2, 2),
            ElementKind::Adder => (3, 2),
            ElementKind::Decoder { select } => (*select, logic::decoder_width(*select)),
            ElementKind::Generator => (0, 1),
            ElementKind::SubCircuit(sub) => (sub.inputs().len(), sub.outputs().len()),
        }
    }

    /// Human-readable default name.
    pub fn display_name(&self) -> String {
        match self {
            ElementKind::MagneticAmplifier => "Magnetic Amplifier".into(),
            ElementKind::TernaryElement => "Ternary Element".into(),
            ElementKind::ShiftRegister => "Shift Register".into(),
            ElementKind::Trigger { .. } => "Ternary Trigger".into(),
            ElementKind::HalfAdder => "Half Adder".into(),
            ElementKind::Adder => "Ternary Adder".into(),
            ElementKind::Decoder { select } => format!("Decoder {}x{}", select, logic::decoder_width(*select)),
            ElementKind::Counter { max, .. } => format!("Counter 0..{}", max),
            ElementKind::And => "AND".into(),
            ElementKind::Or => "OR".into(),
            ElementKind::Inhibit => "Inhibit".into(),
            ElementKind::Generator => "Generator".into(),
            ElementKind::SubCircuit(_) => "Sub-circuit".into(),
        }
    }
}

/// A placed element with its ports.
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    /// User-visible label.
    pub name: String,
    kind: ElementKind,
    bounds: Rect,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
}

impl Element {
    /// Create an element of `kind` with its top-left corner at (x, y).
    pub fn new(id: ElementId, kind: ElementKind, x: i32, y: i32) -> Self {
        let (ins, outs) = kind.port_counts();
        let tallest = ins.max(outs) as i32;
        let height = DEFAULT_HEIGHT.max(PORT_PITCH * (tallest + 1));
        let name = kind.display_name();
        let mut element = Self {
            id,
            name,
            kind,
            bounds: Rect::new(x, y, DEFAULT_WIDTH, height),
            inputs: Port::column(Direction::Input, ins),
            outputs: Port::column(Direction::Output, outs),
        };
        element.place_ports();
        element
    }

    /// Create a composite element covering `bounds`.
    pub fn composite(id: ElementId, sub: SubCircuit, bounds: Rect) -> Self {
        let kind = ElementKind::SubCircuit(Box::new(sub));
        let mut element = Self::new(id, kind, bounds.x, bounds.y);
        element.set_bounds(bounds);
        element
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// Look up one of this element's ports.
    pub fn port(&self, direction: Direction, index: usize) -> Option<&Port> {
        match direction {
            Direction::Input => self.inputs.get(index),
            Direction::Output => self.outputs.get(index),
        }
    }

    pub fn port_mut(&mut self, direction: Direction, index: usize) -> Option<&mut Port> {
        match direction {
            Direction::Input => self.inputs.get_mut(index),
            Direction::Output => self.outputs.get_mut(index),
        }
    }

    /// Value of input `index`, ZERO when the port does not exist.
    pub fn input(&self, index: usize) -> Trit {
        level(&self.inputs, index)
    }

    /// Value of output `index`, ZERO when the port does not exist.
    pub fn output(&self, index: usize) -> Trit {
        level(&self.outputs, index)
    }

    /// Internal state for stateful kinds.
    pub fn state(&self) -> Option<ElementState> {
        match &self.kind {
            ElementKind::Trigger { state } => Some(ElementState::Latch(*state)),
            ElementKind::Counter { count, max } => Some(ElementState::Count { count: *count, max: *max }),
            _ => None,
        }
    }

    /// Restore internal state. Ignored when the state does not fit the kind.
    pub fn set_state(&mut self, new_state: ElementState) {
        match (&mut self.kind, new_state) {
            (ElementKind::Trigger { state }, ElementState::Latch(value)) => *state = value,
            (ElementKind::Counter { count, max }, ElementState::Count { count: c, max: m }) => {
                *max = m;
                *count = c.min(m);
            }
            _ => {}
        }
    }

    /// Whether `reset` clears anything beyond port values.
    pub fn is_resettable(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Trigger { .. } | ElementKind::Counter { .. } | ElementKind::SubCircuit(_)
        )
    }

    pub fn subcircuit(&self) -> Option<&SubCircuit> {
        match &self.kind {
            ElementKind::SubCircuit(sub) => Some(sub),
            _ => None,
        }
    }

    /// Largest id used by this element or anything nested in it.
    pub(crate) fn max_id(&self) -> ElementId {
        let nested = self
            .subcircuit()
            .and_then(|sub| sub.circuit().all_ids().into_iter().max())
            .unwrap_or(0);
        self.id.max(nested)
    }

    pub(crate) fn into_subcircuit(self) -> Result<SubCircuit, Element> {
        match self.kind {
            ElementKind::SubCircuit(sub) => Ok(*sub),
            _ => Err(self),
        }
    }

    /// Read inputs, update internal state and drive outputs.
    pub fn calculate(&mut self) {
        let ins = &self.inputs;
        let outs = &mut self.outputs;
        let i = |n: usize| level(ins, n);

        match &mut self.kind {
            ElementKind::MagneticAmplifier => {
                drive(outs, 0, logic::magnetic_amplifier(i(0), i(1)));
            }
            ElementKind::TernaryElement => {
                drive(outs, 0, logic::ternary_cell(i(0), i(1)));
            }
            ElementKind::ShiftRegister => {
                let held = level(outs, 0);
                drive(outs, 0, logic::shift_register(i(0), i(1), held));
            }
            ElementKind::Trigger { state } => {
                *state = logic::trigger(i(0), i(1), i(2), *state);
                drive(outs, 0, *state);
                drive(outs, 1, state.neg());
            }
            ElementKind::HalfAdder => {
                let (sum, carry) = logic::half_adder(i(0), i(1));
                drive(outs, 0, sum);
                drive(outs, 1, carry);
            }
            ElementKind::Adder => {
                let (sum, carry) = logic::full_adder(i(0), i(1), i(2));
                drive(outs, 0, sum);
                drive(outs, 1, carry);
            }
            ElementKind::Decoder { .. } => {
                let hot = logic::decoder_index(ins.iter().map(|p| p.value));
                for (n, port) in outs.iter_mut().enumerate() {
                    port.value = if n == hot { Trit::P } else { Trit::O };
                }
            }
            ElementKind::Counter { count, max } => {
                *count = logic::counter_next(i(0), i(1), *count, *max);
                drive(outs, 0, logic::counter_level(*count, *max));
            }
            ElementKind::And => drive(outs, 0, logic::and(i(0), i(1))),
            ElementKind::Or => drive(outs, 0, logic::or(i(0), i(1))),
            ElementKind::Inhibit => drive(outs, 0, logic::inhibit(i(0), i(1))),
            ElementKind::Generator => drive(outs, 0, Trit::P),
            ElementKind::SubCircuit(sub) => sub.calculate(ins, outs),
        }
    }

    /// Clear internal state and every port value to ZERO.
    pub fn reset(&mut self) {
        for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            port.value = Trit::O;
        }
        match &mut self.kind {
            ElementKind::Trigger { state } => *state = Trit::O,
            ElementKind::Counter { count, .. } => *count = 0,
            ElementKind::SubCircuit(sub) => sub.reset(),
            _ => {}
        }
    }

    /// Move and resize, recomputing every port's absolute position.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.place_ports();
    }

    /// Move keeping the current size.
    pub fn move_to(&mut self, x: i32, y: i32) {
        let Rect { width, height, .. } = self.bounds;
        self.set_bounds(Rect::new(x, y, width, height));
    }

    /// Find the port under `point`, inputs first.
    pub fn port_at(&self, point: Point) -> Option<PortRef> {
        if let Some(index) = self.inputs.iter().position(|p| p.hit(point)) {
            return Some(PortRef::input(self.id, index));
        }
        self.outputs
            .iter()
            .position(|p| p.hit(point))
            .map(|index| PortRef::output(self.id, index))
    }

    /// Find the port of `direction` at a relative location.
    pub fn port_at_relative(&self, direction: Direction, rel_x: f64, rel_y: f64) -> Option<usize> {
        let ports = match direction {
            Direction::Input => &self.inputs,
            Direction::Output => &self.outputs,
        };
        ports.iter().position(|p| {
            let (x, y) = p.relative();
            (x - rel_x).abs() < 1e-6 && (y - rel_y).abs() < 1e-6
        })
    }

    fn place_ports(&mut self) {
        let bounds = self.bounds;
        for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            port.place(&bounds);
        }
    }
}

fn level(ports: &[Port], index: usize) -> Trit {
    ports.get(index).map(|p| p.value).unwrap_or_default()
}

fn drive(ports: &mut [Port], index: usize, value: Trit) {
    if let Some(port) = ports.get_mut(index) {
        port.value = value;
    }
}
