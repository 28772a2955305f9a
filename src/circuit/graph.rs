//! Element set and connection graph.
//!
//! A [`Circuit`] keeps elements in insertion order (the evaluation order)
//! with an id → slot index beside it, and a list of directed
//! [`Connection`]s between [`PortRef`] handles. Connections never hold
//! addresses; they are resolved through the index on every use.

use std::collections::{HashMap, HashSet};
use log::{debug, trace, warn};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::circuit::element::Element;
use crate::circuit::port::{Direction, ElementId, Point, Port, PortRef, Rect};
use crate::circuit::subcircuit::SubCircuit;
use crate::ternary::Trit;

/// A directed edge from an output port to an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from: PortRef,
    pub to: PortRef,
}

impl Connection {
    /// Edge from output `from_index` of `from` to input `to_index` of `to`.
    pub const fn new(from: ElementId, from_index: usize, to: ElementId, to_index: usize) -> Self {
        Self {
            from: PortRef::output(from, from_index),
            to: PortRef::input(to, to_index),
        }
    }

    /// Whether either end belongs to `id`.
    pub fn touches(&self, id: ElementId) -> bool {
        self.from.element == id || self.to.element == id
    }
}

/// Errors from structural edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    #[error("element #{0} not found")]
    ElementNotFound(ElementId),

    #[error("element id #{0} is already in use")]
    DuplicateElement(ElementId),

    #[error("port {0} not found")]
    PortNotFound(PortRef),

    #[error("port {0} has the wrong direction for this end of a connection")]
    WrongDirection(PortRef),

    #[error("connection {} -> {} already exists", .0.from, .0.to)]
    DuplicateConnection(Connection),

    #[error("connection {} -> {} not found", .0.from, .0.to)]
    ConnectionNotFound(Connection),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

/// Elements plus the connections between their ports.
#[derive(Debug, Clone)]
pub struct Circuit {
    elements: Vec<Element>,
    index: HashMap<ElementId, usize>,
    connections: Vec<Connection>,
    next_id: ElementId,
}

impl Circuit {
    /// Create an empty circuit. Ids are issued from 1.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            index: HashMap::new(),
            connections: Vec::new(),
            next_id: 1,
        }
    }

    // ==================== Elements ====================

    /// The id the next [`Circuit::issue_id`] call returns.
    pub fn next_id(&self) -> ElementId {
        self.next_id
    }

    /// Raise the id counter. Never lowers it below an id already in use.
    pub fn set_next_id(&mut self, next: ElementId) {
        self.next_id = self.next_id.max(next);
    }

    /// Reserve a fresh element id.
    pub fn issue_id(&mut self) -> ElementId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Append an element to the end of the evaluation order.
    pub fn add_element(&mut self, element: Element) -> Result<ElementId, CircuitError> {
        let id = element.id();
        if self.contains_id(id) {
            return Err(CircuitError::DuplicateElement(id));
        }
        if let Some(sub) = element.subcircuit() {
            if let Some(clash) = sub.circuit().all_ids().into_iter().find(|i| self.contains_id(*i)) {
                return Err(CircuitError::DuplicateElement(clash));
            }
        }
        self.set_next_id(element.max_id().saturating_add(1));
        self.index.insert(id, self.elements.len());
        self.elements.push(element);
        Ok(id)
    }

    /// Remove an element and every connection touching its ports.
    pub fn remove_element(&mut self, id: ElementId) -> Result<Element, CircuitError> {
        let slot = self.slot(id)?;
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        debug!("removed element #{} and {} connections", id, before - self.connections.len());
        let element = self.elements.remove(slot);
        self.reindex();
        Ok(element)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        let slot = *self.index.get(&id)?;
        self.elements.get(slot)
    }

    /// Mutable access for geometry and naming edits.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let slot = *self.index.get(&id)?;
        self.elements.get_mut(slot)
    }

    /// Elements in evaluation order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether `id` is used here or inside any nested composite.
    pub fn contains_id(&self, id: ElementId) -> bool {
        self.index.contains_key(&id)
            || self
                .elements
                .iter()
                .filter_map(|el| el.subcircuit())
                .any(|sub| sub.circuit().contains_id(id))
    }

    /// Every element id, nested composites included.
    pub fn all_ids(&self) -> Vec<ElementId> {
        let mut ids = Vec::new();
        for el in &self.elements {
            ids.push(el.id());
            if let Some(sub) = el.subcircuit() {
                ids.extend(sub.circuit().all_ids());
            }
        }
        ids
    }

    /// Move and resize an element.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) -> Result<(), CircuitError> {
        let slot = self.slot(id)?;
        self.elements[slot].set_bounds(bounds);
        Ok(())
    }

    /// Move an element keeping its size.
    pub fn move_element(&mut self, id: ElementId, x: i32, y: i32) -> Result<(), CircuitError> {
        let slot = self.slot(id)?;
        self.elements[slot].move_to(x, y);
        Ok(())
    }

    /// Topmost (last drawn) element under `point`.
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.elements.iter().rev().find(|el| el.bounds().contains(point)).map(|el| el.id())
    }

    /// Topmost port under `point`.
    pub fn port_at(&self, point: Point) -> Option<PortRef> {
        self.elements.iter().rev().find_map(|el| el.port_at(point))
    }

    // ==================== Ports ====================

    pub fn port(&self, port: PortRef) -> Option<&Port> {
        self.element(port.element)?.port(port.direction, port.index)
    }

    pub fn value(&self, port: PortRef) -> Option<Trit> {
        self.port(port).map(|p| p.value)
    }

    /// Force a port value. Returns false when the port does not exist.
    pub fn set_value(&mut self, port: PortRef, value: Trit) -> bool {
        match self
            .element_mut(port.element)
            .and_then(|el| el.port_mut(port.direction, port.index))
        {
            Some(p) => {
                p.value = value;
                true
            }
            None => false,
        }
    }

    // ==================== Connections ====================

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Add an edge. Rejects duplicates, missing ports and reversed ends.
    ///
    /// A second driver on the same input is accepted; the value it sees is
    /// whichever edge propagates last.
    pub fn connect(&mut self, from: PortRef, to: PortRef) -> Result<(), CircuitError> {
        if from.direction != Direction::Output {
            return Err(CircuitError::WrongDirection(from));
        }
        if to.direction != Direction::Input {
            return Err(CircuitError::WrongDirection(to));
        }
        if self.port(from).is_none() {
            return Err(CircuitError::PortNotFound(from));
        }
        if self.port(to).is_none() {
            return Err(CircuitError::PortNotFound(to));
        }
        let conn = Connection { from, to };
        if self.connections.contains(&conn) {
            return Err(CircuitError::DuplicateConnection(conn));
        }
        if self.connections.iter().any(|c| c.to == to) {
            warn!("input {} now has more than one driver", to);
        }
        self.connections.push(conn);
        Ok(())
    }

    /// Remove an edge.
    pub fn disconnect(&mut self, from: PortRef, to: PortRef) -> Result<(), CircuitError> {
        let conn = Connection { from, to };
        match self.connections.iter().position(|c| *c == conn) {
            Some(pos) => {
                self.connections.remove(pos);
                Ok(())
            }
            None => Err(CircuitError::ConnectionNotFound(conn)),
        }
    }

    /// Connections with either end on `id`.
    pub fn connections_of(&self, id: ElementId) -> impl Iterator<Item = &Connection> + '_ {
        self.connections.iter().filter(move |c| c.touches(id))
    }

    /// Connections driving the input `to`.
    pub fn drivers_of(&self, to: PortRef) -> Vec<&Connection> {
        self.connections.iter().filter(|c| c.to == to).collect()
    }

    // ==================== Evaluation ====================

    /// Copy every connection's source value into its destination.
    pub fn propagate(&mut self) {
        let Self { elements, index, connections, .. } = self;
        for conn in connections.iter() {
            let value = match index.get(&conn.from.element) {
                Some(&slot) => elements[slot].port(Direction::Output, conn.from.index).map(|p| p.value),
                None => None,
            };
            let target = match index.get(&conn.to.element) {
                Some(&slot) => elements[slot].port_mut(Direction::Input, conn.to.index),
                None => None,
            };
            debug_assert!(value.is_some(), "dangling connection source {}", conn.from);
            debug_assert!(target.is_some(), "dangling connection target {}", conn.to);
            if let (Some(value), Some(port)) = (value, target) {
                trace!("{} -> {} = {}", conn.from, conn.to, value);
                port.value = value;
            }
        }
    }

    /// Calculate every element once, in list order.
    pub fn evaluate(&mut self) {
        for element in &mut self.elements {
            element.calculate();
        }
    }

    /// Zero every port and every stored state.
    pub fn reset(&mut self) {
        for element in &mut self.elements {
            element.reset();
        }
    }

    // ==================== Grouping ====================

    /// Replace `ids` by one composite element and return its id.
    ///
    /// Inner inputs driven from outside become boundary inputs and inner
    /// outputs driving outside become boundary outputs, in edge order;
    /// the crossing edges are rewired to the boundary ports.
    pub fn group(&mut self, ids: &[ElementId]) -> Result<ElementId, CircuitError> {
        let mut members: Vec<ElementId> = Vec::new();
        for &id in ids {
            self.slot(id)?;
            if !members.contains(&id) {
                members.push(id);
            }
        }
        if members.len() < 2 {
            return Err(CircuitError::InvalidOperation(format!(
                "grouping needs at least 2 elements, got {}",
                members.len()
            )));
        }
        let set: HashSet<ElementId> = members.iter().copied().collect();

        let mut internal = Vec::new();
        let mut boundary_in: Vec<PortRef> = Vec::new();
        let mut boundary_out: Vec<PortRef> = Vec::new();
        for conn in &self.connections {
            match (set.contains(&conn.from.element), set.contains(&conn.to.element)) {
                (true, true) => internal.push(*conn),
                (false, true) if !boundary_in.contains(&conn.to) => boundary_in.push(conn.to),
                (true, false) if !boundary_out.contains(&conn.from) => boundary_out.push(conn.from),
                _ => {}
            }
        }

        // `self` is not mutated until the composite is fully built.
        let mut inner = Circuit::new();
        let mut bounds: Option<Rect> = None;
        for el in self.elements.iter().filter(|el| set.contains(&el.id())) {
            bounds = Some(match bounds {
                Some(b) => b.union(&el.bounds()),
                None => el.bounds(),
            });
            inner.add_element(el.clone())?;
        }
        for conn in &internal {
            inner.connect(conn.from, conn.to)?;
        }
        if boundary_out.is_empty() {
            boundary_out = SubCircuit::default_outputs(&inner);
        }
        let sub = SubCircuit::new(inner, boundary_in.clone(), boundary_out.clone())?;

        let id = self.issue_id();
        let composite = Element::composite(id, sub, bounds.unwrap_or_default());
        let first_slot = self.elements.iter().position(|el| set.contains(&el.id())).unwrap_or(0);
        self.elements.retain(|el| !set.contains(&el.id()));
        self.elements.insert(first_slot.min(self.elements.len()), composite);
        self.reindex();

        let outer = std::mem::take(&mut self.connections);
        for mut conn in outer.into_iter().filter(|conn| !internal.contains(conn)) {
            if let Some(j) = boundary_in.iter().position(|p| *p == conn.to) {
                conn.to = PortRef::input(id, j);
            }
            if let Some(k) = boundary_out.iter().position(|p| *p == conn.from) {
                conn.from = PortRef::output(id, k);
            }
            if !self.connections.contains(&conn) {
                self.connections.push(conn);
            }
        }
        debug!("grouped {:?} into composite #{}", members, id);
        Ok(id)
    }

    /// Dissolve a composite, restoring its elements in its place.
    ///
    /// Returns the ids of the restored elements.
    pub fn ungroup(&mut self, id: ElementId) -> Result<Vec<ElementId>, CircuitError> {
        let slot = self.slot(id)?;
        if self.elements[slot].subcircuit().is_none() {
            return Err(CircuitError::InvalidOperation(format!("element #{} is not a composite", id)));
        }
        let sub = match self.elements.remove(slot).into_subcircuit() {
            Ok(sub) => sub,
            Err(element) => {
                self.elements.insert(slot, element);
                return Err(CircuitError::InvalidOperation(format!("element #{} is not a composite", id)));
            }
        };
        let (inner, inputs, outputs) = sub.into_parts();
        let Circuit { elements: restored, connections: inner_connections, .. } = inner;

        let ids: Vec<ElementId> = restored.iter().map(|el| el.id()).collect();
        for (offset, el) in restored.into_iter().enumerate() {
            self.elements.insert(slot + offset, el);
        }
        self.reindex();

        let outer: Vec<Connection> = std::mem::take(&mut self.connections);
        for mut conn in outer.into_iter().chain(inner_connections) {
            if conn.to.element == id {
                match inputs.get(conn.to.index) {
                    Some(target) => conn.to = *target,
                    None => continue,
                }
            }
            if conn.from.element == id {
                match outputs.get(conn.from.index) {
                    Some(source) => conn.from = *source,
                    None => continue,
                }
            }
            if !self.connections.contains(&conn) {
                self.connections.push(conn);
            }
        }
        debug!("ungrouped composite #{} into {:?}", id, ids);
        Ok(ids)
    }

    fn slot(&self, id: ElementId) -> Result<usize, CircuitError> {
        self.index.get(&id).copied().ok_or(CircuitError::ElementNotFound(id))
    }

    fn reindex(&mut self) {
        self.index = self.elements.iter().enumerate().map(|(slot, el)| (el.id(), slot)).collect();
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::ElementKind;
    use Trit::{O, P};

    fn el(id: ElementId, kind: ElementKind) -> Element {
        Element::new(id, kind, 0, 0)
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut c = Circuit::new();
        c.add_element(el(3, ElementKind::And)).unwrap();
        assert_eq!(c.next_id(), 4);
        assert_eq!(c.add_element(el(3, ElementKind::Or)), Err(CircuitError::DuplicateElement(3)));
        assert_eq!(c.issue_id(), 4);

        c.set_next_id(ElementId::MAX);
        assert_eq!(c.issue_id(), ElementId::MAX);
        assert_eq!(c.issue_id(), ElementId::MAX);
        assert!(c.add_element(el(ElementId::MAX, ElementKind::And)).is_ok());
        assert_eq!(
            c.add_element(el(ElementId::MAX, ElementKind::Or)),
            Err(CircuitError::DuplicateElement(ElementId::MAX))
        );
    }

    #[test]
    fn test_connect_validation() {
        let mut c = Circuit::new();
        c.add_element(el(1, ElementKind::Generator)).unwrap();
        c.add_element(el(2, ElementKind::And)).unwrap();

        c.connect(PortRef::output(1, 0), PortRef::input(2, 0)).unwrap();
        assert!(matches!(
            c.connect(PortRef::output(1, 0), PortRef::input(2, 0)),
            Err(CircuitError::DuplicateConnection(_))
        ));
        assert!(matches!(
            c.connect(PortRef::input(2, 1), PortRef::input(2, 0)),
            Err(CircuitError::WrongDirection(_))
        ));
        assert!(matches!(
            c.connect(PortRef::output(1, 3), PortRef::input(2, 1)),
            Err(CircuitError::PortNotFound(_))
        ));
        // fan-out from one output
        c.connect(PortRef::output(1, 0), PortRef::input(2, 1)).unwrap();
        assert_eq!(c.drivers_of(PortRef::input(2, 1)).len(), 1);
        assert_eq!(c.connections().len(), 2);

        c.disconnect(PortRef::output(1, 0), PortRef::input(2, 1)).unwrap();
        assert!(c.disconnect(PortRef::output(1, 0), PortRef::input(2, 1)).is_err());
    }

    #[test]
    fn test_remove_element_drops_its_connections() {
        let mut c = Circuit::new();
        c.add_element(el(1, ElementKind::Generator)).unwrap();
        c.add_element(el(2, ElementKind::And)).unwrap();
        c.add_element(el(3, ElementKind::Or)).unwrap();
        c.connect(PortRef::output(1, 0), PortRef::input(2, 0)).unwrap();
        c.connect(PortRef::output(2, 0), PortRef::input(3, 0)).unwrap();
        c.connect(PortRef::output(1, 0), PortRef::input(3, 1)).unwrap();

        let removed = c.remove_element(2).unwrap();
        assert_eq!(removed.id(), 2);
        assert_eq!(c.connections(), &[Connection::new(1, 0, 3, 1)]);
        assert!(c.element(2).is_none());
        assert_eq!(c.element(3).unwrap().id(), 3);
        assert_eq!(c.connections_of(1).count(), 1);
    }

    #[test]
    fn test_propagate_then_evaluate() {
        let mut c = Circuit::new();
        c.add_element(el(1, ElementKind::Generator)).unwrap();
        c.add_element(el(2, ElementKind::Or)).unwrap();
        c.connect(PortRef::output(1, 0), PortRef::input(2, 0)).unwrap();

        c.evaluate();
        assert_eq!(c.value(PortRef::output(1, 0)), Some(P));
        assert_eq!(c.value(PortRef::input(2, 0)), Some(O));
        c.propagate();
        assert_eq!(c.value(PortRef::input(2, 0)), Some(P));

        c.reset();
        assert_eq!(c.value(PortRef::output(1, 0)), Some(O));
        assert_eq!(c.value(PortRef::input(2, 0)), Some(O));
    }

    #[test]
    fn test_group_requires_two() {
        let mut c = Circuit::new();
        c.add_element(el(1, ElementKind::Generator)).unwrap();
        assert!(matches!(c.group(&[1, 1]), Err(CircuitError::InvalidOperation(_))));
        assert!(matches!(c.group(&[1, 9]), Err(CircuitError::ElementNotFound(9))));
        assert!(matches!(c.ungroup(1), Err(CircuitError::InvalidOperation(_))));
    }

    #[test]
    fn test_failed_group_leaves_circuit_intact() {
        let mut c = Circuit::new();
        c.add_element(el(1, ElementKind::Generator)).unwrap();
        c.add_element(el(2, ElementKind::And)).unwrap();
        c.add_element(el(3, ElementKind::Or)).unwrap();
        c.connect(PortRef::output(1, 0), PortRef::input(2, 0)).unwrap();
        c.connect(PortRef::output(2, 0), PortRef::input(3, 0)).unwrap();
        let before: Vec<Connection> = c.connections().to_vec();

        assert!(matches!(c.group(&[2, 3, 7]), Err(CircuitError::ElementNotFound(7))));
        assert!(matches!(c.group(&[2]), Err(CircuitError::InvalidOperation(_))));

        let ids: Vec<ElementId> = c.elements().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(c.connections(), before.as_slice());
        assert_eq!(c.next_id(), 4);
        assert_eq!(c.group(&[2, 3]).unwrap(), 4);
    }

    #[test]
    fn test_group_and_ungroup_rewire() {
        let mut c = Circuit::new();
        c.add_element(el(1, ElementKind::Generator)).unwrap();
        c.add_element(el(2, ElementKind::And)).unwrap();
        c.add_element(el(3, ElementKind::Or)).unwrap();
        c.add_element(el(4, ElementKind::Inhibit)).unwrap();
        c.connect(PortRef::output(1, 0), PortRef::input(2, 0)).unwrap();
        c.connect(PortRef::output(2, 0), PortRef::input(3, 0)).unwrap();
        c.connect(PortRef::output(3, 0), PortRef::input(4, 0)).unwrap();

        let g = c.group(&[2, 3]).unwrap();
        assert_eq!(g, 5);
        let ids: Vec<ElementId> = c.elements().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![1, 5, 4]);
        assert!(c.contains_id(2));
        assert!(c.element(2).is_none());

        let sub = c.element(g).unwrap().subcircuit().unwrap();
        assert_eq!(sub.inputs(), &[PortRef::input(2, 0)]);
        assert_eq!(sub.outputs(), &[PortRef::output(3, 0)]);
        assert_eq!(sub.circuit().connections(), &[Connection::new(2, 0, 3, 0)]);
        assert!(c.connections().contains(&Connection::new(1, 0, g, 0)));
        assert!(c.connections().contains(&Connection::new(g, 0, 4, 0)));

        let restored = c.ungroup(g).unwrap();
        assert_eq!(restored, vec![2, 3]);
        let ids: Vec<ElementId> = c.elements().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        let mut conns = c.connections().to_vec();
        conns.sort_by_key(|c| (c.from.element, c.to.element));
        assert_eq!(
            conns,
            vec![Connection::new(1, 0, 2, 0), Connection::new(2, 0, 3, 0), Connection::new(3, 0, 4, 0)]
        );
    }

    #[test]
    fn test_group_without_outgoing_edges_mirrors_first() {
        let mut c = Circuit::new();
        c.add_element(el(1, ElementKind::Generator)).unwrap();
        c.add_element(el(2, ElementKind::Generator)).unwrap();
        let g = c.group(&[2, 1]).unwrap();
        let composite = c.element(g).unwrap();
        assert_eq!(composite.inputs().len(), 0);
        assert_eq!(composite.outputs().len(), 1);
        assert_eq!(composite.subcircuit().unwrap().outputs(), &[PortRef::output(1, 0)]);

        c.evaluate();
        assert_eq!(c.value(PortRef::output(g, 0)), Some(P));
    }

    #[test]
    fn test_hit_testing() {
        let mut c = Circuit::new();
        c.add_element(Element::new(1, ElementKind::And, 0, 0)).unwrap();
        c.add_element(Element::new(2, ElementKind::Or, 100, 0)).unwrap();
        assert_eq!(c.element_at(Point::new(110, 10)), Some(2));
        assert_eq!(c.element_at(Point::new(80, 10)), None);
        assert_eq!(c.port_at(Point::new(160, 20)), Some(PortRef::output(2, 0)));

        c.move_element(2, 200, 0).unwrap();
        assert_eq!(c.port_at(Point::new(260, 20)), Some(PortRef::output(2, 0)));
        assert!(c.move_element(7, 0, 0).is_err());
    }
}
