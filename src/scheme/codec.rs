//! Scheme encoding and decoding.
//!
//! Version 2.0 layout:
//!
//! ```text
//! [Scheme]
//! Version=2.0
//! ElementCount=2
//! ConnectionCount=1
//! NextElementId=3
//!
//! [Element_0]
//! Type=Generator
//! Id=1
//! X=0
//! Y=0
//! Width=60
//! Height=40
//! Name=Generator
//! InputCount=0
//! OutputCount=1
//! Output_0_RelX=1
//! Output_0_RelY=0.5
//! Output_0_Value=+
//! Output_0_LineStyle=solid
//!
//! [Connection_0]
//! FromElementId=1
//! FromPoint=0
//! ToElementId=2
//! ToPoint=0
//! ```
//!
//! Connections address ports by element id and port index. Composite
//! elements store their children in sections prefixed with their own
//! section name, e.g. `[Element_3/Element_0]`, plus boundary maps as
//! `BoundaryInput_<j>=<elementId>:<index>`.

use crate::circuit::{
    Circuit, Direction, Element, ElementKind, ElementState, LineStyle, PortRef, Rect, SubCircuit,
};
use crate::scheme::doc::{Document, Section};
use crate::scheme::SchemeError;
use crate::ternary::{logic, Trit};

/// The version written by [`encode`] and the only one [`decode`] accepts.
pub const FORMAT_VERSION: &str = "2.0";

/// Versions known to predate id-based port addressing.
const OBSOLETE_VERSIONS: &[&str] = &["1.0"];

const SCHEME_SECTION: &str = "Scheme";

/// Encode a circuit as a document.
pub fn encode(circuit: &Circuit) -> Document {
    let mut doc = Document::new();
    let header = doc.section_mut(SCHEME_SECTION);
    header.set("Version", FORMAT_VERSION);
    header.set("ElementCount", circuit.len());
    header.set("ConnectionCount", circuit.connections().len());
    header.set("NextElementId", circuit.next_id());
    encode_circuit(&mut doc, "", circuit);
    doc
}

fn encode_circuit(doc: &mut Document, prefix: &str, circuit: &Circuit) {
    for (i, element) in circuit.elements().iter().enumerate() {
        let name = format!("{}Element_{}", prefix, i);
        encode_element(doc, &name, element);
    }
    for (i, conn) in circuit.connections().iter().enumerate() {
        let section = doc.section_mut(&format!("{}Connection_{}", prefix, i));
        section.set("FromElementId", conn.from.element);
        section.set("FromPoint", conn.from.index);
        section.set("ToElementId", conn.to.element);
        section.set("ToPoint", conn.to.index);
    }
}

fn encode_element(doc: &mut Document, name: &str, element: &Element) {
    let section = doc.section_mut(name);
    let bounds = element.bounds();
    section.set("Type", element.kind().tag());
    section.set("Id", element.id());
    section.set("X", bounds.x);
    section.set("Y", bounds.y);
    section.set("Width", bounds.width);
    section.set("Height", bounds.height);
    section.set("Name", &element.name);

    match element.kind() {
        ElementKind::Decoder { select } => section.set("Select", select),
        ElementKind::Trigger { state } => section.set("State", state),
        ElementKind::Counter { count, max } => {
            section.set("Count", count);
            section.set("Max", max);
        }
        _ => {}
    }

    for (label, ports) in [("Input", element.inputs()), ("Output", element.outputs())] {
        section.set(&format!("{}Count", label), ports.len());
        for (j, port) in ports.iter().enumerate() {
            let (rel_x, rel_y) = port.relative();
            section.set(&format!("{}_{}_RelX", label, j), rel_x);
            section.set(&format!("{}_{}_RelY", label, j), rel_y);
            section.set(&format!("{}_{}_Value", label, j), port.value);
            section.set(&format!("{}_{}_LineStyle", label, j), port.line_style.as_str());
        }
    }

    if let Some(sub) = element.subcircuit() {
        section.set("ChildCount", sub.circuit().len());
        section.set("ChildConnectionCount", sub.circuit().connections().len());
        for (label, refs) in [("BoundaryInput", sub.inputs()), ("BoundaryOutput", sub.outputs())] {
            section.set(&format!("{}Count", label), refs.len());
            for (j, port) in refs.iter().enumerate() {
                section.set(&format!("{}_{}", label, j), format!("{}:{}", port.element, port.index));
            }
        }
        encode_circuit(doc, &format!("{}/", name), sub.circuit());
    }
}

/// Decode a document into a fresh circuit.
pub fn decode(doc: &Document) -> Result<Circuit, SchemeError> {
    let header = doc.require(SCHEME_SECTION)?;
    let version = header.require("Version")?.trim();
    if OBSOLETE_VERSIONS.contains(&version) {
        return Err(SchemeError::ObsoleteFormat(version.to_string()));
    }
    if version != FORMAT_VERSION {
        return Err(SchemeError::UnsupportedVersion(version.to_string()));
    }

    let elements: usize = header.parse("ElementCount")?;
    let connections: usize = header.parse("ConnectionCount")?;
    let mut circuit = decode_circuit(doc, "", elements, connections)?;
    circuit.set_next_id(header.parse("NextElementId")?);
    Ok(circuit)
}

fn decode_circuit(doc: &Document, prefix: &str, elements: usize, connections: usize) -> Result<Circuit, SchemeError> {
    let mut circuit = Circuit::new();
    for i in 0..elements {
        let element = decode_element(doc, &format!("{}Element_{}", prefix, i))?;
        let id = element.id();
        circuit
            .add_element(element)
            .map_err(|e| SchemeError::Malformed(format!("{}Element_{}: {}", prefix, i, e)))?;
        log::trace!("decoded element #{}", id);
    }
    for i in 0..connections {
        let name = format!("{}Connection_{}", prefix, i);
        let section = doc.require(&name)?;
        let from = PortRef::output(section.parse("FromElementId")?, section.parse("FromPoint")?);
        let to = PortRef::input(section.parse("ToElementId")?, section.parse("ToPoint")?);
        circuit
            .connect(from, to)
            .map_err(|e| SchemeError::Malformed(format!("{}: {}", name, e)))?;
    }
    Ok(circuit)
}

fn decode_element(doc: &Document, name: &str) -> Result<Element, SchemeError> {
    let section = doc.require(name)?;
    let tag = match section.get("Type").or_else(|| section.get("ClassName")) {
        Some(tag) => tag.trim(),
        None => section.require("Type")?,
    };
    let id = section.parse("Id")?;
    let bounds = decode_bounds(section)?;

    let mut element = if tag == "SubCircuit" {
        let sub = decode_subcircuit(doc, section, name)?;
        Element::composite(id, sub, bounds)
    } else {
        let param = match tag {
            "Decoder" => {
                let select: u32 = section.parse("Select")?;
                if select as usize > logic::MAX_DECODER_SELECT {
                    return Err(invalid_value(section, "Select", select));
                }
                select
            }
            "Counter" => section.parse("Max")?,
            _ => 0,
        };
        let kind = ElementKind::from_tag(tag, param).ok_or_else(|| SchemeError::UnknownKind {
            section: name.to_string(),
            tag: tag.to_string(),
        })?;
        Element::new(id, kind, bounds.x, bounds.y)
    };

    if let Some(label) = section.get("Name") {
        element.name = label.to_string();
    }
    match element.state() {
        Some(ElementState::Latch(_)) => {
            element.set_state(ElementState::Latch(section.parse_or("State", Trit::O)?));
        }
        Some(ElementState::Count { max, .. }) => {
            let count: u32 = section.parse_or("Count", 0)?;
            if count > max {
                return Err(SchemeError::Malformed(format!("{}: count {} exceeds max {}", name, count, max)));
            }
            element.set_state(ElementState::Count { count, max });
        }
        None => {}
    }

    for (label, direction, expected) in [
        ("Input", Direction::Input, element.inputs().len()),
        ("Output", Direction::Output, element.outputs().len()),
    ] {
        let count: usize = section.parse(&format!("{}Count", label))?;
        if count != expected {
            return Err(SchemeError::Malformed(format!(
                "{}: {} has {} {} ports, file lists {}",
                name, tag, expected, label.to_lowercase(), count
            )));
        }
        for j in 0..count {
            let port = match element.port_mut(direction, j) {
                Some(port) => port,
                None => continue,
            };
            let (rel_x, rel_y) = port.relative();
            let rel_x = section.parse_or(&format!("{}_{}_RelX", label, j), rel_x)?;
            let rel_y = section.parse_or(&format!("{}_{}_RelY", label, j), rel_y)?;
            port.set_relative(rel_x, rel_y);
            port.value = section.parse_or(&format!("{}_{}_Value", label, j), Trit::O)?;
            port.line_style = section.parse_or(&format!("{}_{}_LineStyle", label, j), LineStyle::Solid)?;
        }
    }

    element.set_bounds(bounds);
    Ok(element)
}

/// Element bounds; sizes must be non-negative and the far edges must fit in `i32`.
fn decode_bounds(section: &Section) -> Result<Rect, SchemeError> {
    let x: i32 = section.parse("X")?;
    let y: i32 = section.parse("Y")?;
    let width: i32 = section.parse("Width")?;
    let height: i32 = section.parse("Height")?;
    for (key, origin, size) in [("Width", x, width), ("Height", y, height)] {
        if size < 0 || origin.checked_add(size).is_none() {
            return Err(invalid_value(section, key, size));
        }
    }
    Ok(Rect::new(x, y, width, height))
}

fn invalid_value(section: &Section, key: &str, value: impl ToString) -> SchemeError {
    SchemeError::InvalidValue {
        section: section.name().to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn decode_subcircuit(doc: &Document, section: &Section, name: &str) -> Result<SubCircuit, SchemeError> {
    let inner = decode_circuit(
        doc,
        &format!("{}/", name),
        section.parse("ChildCount")?,
        section.parse("ChildConnectionCount")?,
    )?;
    let inputs = decode_boundary(section, "BoundaryInput", Direction::Input)?;
    let outputs = decode_boundary(section, "BoundaryOutput", Direction::Output)?;
    SubCircuit::new(inner, inputs, outputs).map_err(|e| SchemeError::Malformed(format!("{}: {}", name, e)))
}

fn decode_boundary(section: &Section, label: &str, direction: Direction) -> Result<Vec<PortRef>, SchemeError> {
    let count: usize = section.parse(&format!("{}Count", label))?;
    (0..count)
        .map(|j| -> Result<PortRef, SchemeError> {
            let key = format!("{}_{}", label, j);
            let raw = section.require(&key)?;
            let invalid = || SchemeError::InvalidValue {
                section: section.name().to_string(),
                key: key.clone(),
                value: raw.to_string(),
            };
            let (element, index) = raw.split_once(':').ok_or_else(|| invalid())?;
            Ok(PortRef {
                element: element.trim().parse().map_err(|_| invalid())?,
                direction,
                index: index.trim().parse().map_err(|_| invalid())?,
            })
        })
        .collect()
}
