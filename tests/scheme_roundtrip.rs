//! Scheme files on disk.

use std::fs;
use setun_sim::circuit::LineStyle;
use setun_sim::{
    load_scheme, save_scheme, Circuit, Connection, ElementState, PortRef, Registry, SchemeError, Simulator, Trit,
};

fn sample() -> Circuit {
    let registry = Registry::with_builtins();
    let mut c = Circuit::new();
    for (n, name) in ["Generator", "Counter 0..8", "Decoder 1x3", "Ternary Trigger", "Half Adder"]
        .iter()
        .enumerate()
    {
        let id = c.issue_id();
        c.add_element(registry.create_any(name, id, n as i32 * 100, 20).unwrap()).unwrap();
    }
    c.connect(PortRef::output(1, 0), PortRef::input(2, 0)).unwrap();
    c.connect(PortRef::output(2, 0), PortRef::input(3, 0)).unwrap();
    c.connect(PortRef::output(3, 2), PortRef::input(4, 0)).unwrap();
    c.connect(PortRef::output(3, 0), PortRef::input(4, 1)).unwrap();
    c.connect(PortRef::output(2, 0), PortRef::input(5, 0)).unwrap();
    c.connect(PortRef::output(4, 0), PortRef::input(5, 1)).unwrap();
    c
}

fn pairing(c: &Circuit, conn: &Connection) -> (&'static str, usize, &'static str, usize) {
    let kind = |id| c.element(id).map(|el| el.kind().tag()).unwrap_or("?");
    (kind(conn.from.element), conn.from.index, kind(conn.to.element), conn.to.index)
}

#[test]
fn save_then_load_preserves_graph_and_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.scheme");

    let mut sim = Simulator::with_circuit(sample());
    sim.run(9);
    sim.circuit_mut().element_mut(5).unwrap().name = "Sum = a + b".into();
    sim.circuit_mut()
        .element_mut(4)
        .unwrap()
        .port_mut(setun_sim::circuit::Direction::Output, 1)
        .unwrap()
        .line_style = LineStyle::Dashed;
    sim.save(&path).unwrap();

    let loaded = load_scheme(&path).unwrap();
    let original = sim.circuit();
    assert_eq!(loaded.len(), original.len());
    assert_eq!(loaded.connections().len(), original.connections().len());
    assert_eq!(loaded.next_id(), original.next_id());

    for (a, b) in original.elements().iter().zip(loaded.elements()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.kind().tag(), b.kind().tag());
        assert_eq!(a.name, b.name);
        assert_eq!(a.bounds(), b.bounds());
        assert_eq!(a.state(), b.state());
        assert_eq!(a.inputs(), b.inputs());
        assert_eq!(a.outputs(), b.outputs());
    }
    for (a, b) in original.connections().iter().zip(loaded.connections()) {
        assert_eq!(pairing(original, a), pairing(&loaded, b));
    }
    assert_eq!(
        loaded.element(2).unwrap().state(),
        Some(ElementState::Count { count: 8, max: 8 })
    );
}

#[test]
fn loaded_circuit_continues_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("continue.scheme");

    let mut a = Simulator::with_circuit(sample());
    a.run(4);
    a.save(&path).unwrap();

    let mut b = Simulator::new();
    b.load(&path).unwrap();
    assert_eq!(b.steps(), 0);
    a.run(6);
    b.run(6);
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn failed_load_keeps_current_circuit() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.scheme");
    let bad = dir.path().join("bad.scheme");

    save_scheme(&good, &sample()).unwrap();
    let text = fs::read_to_string(&good).unwrap();
    fs::write(&bad, text.replace("ToElementId=5", "ToElementId=99")).unwrap();

    let mut sim = Simulator::new();
    sim.load(&good).unwrap();
    sim.run(2);
    let before = sim.snapshot();

    assert!(matches!(sim.load(&bad), Err(SchemeError::Malformed(_))));
    assert!(matches!(sim.load(dir.path().join("missing.scheme")), Err(SchemeError::Io(_))));
    assert_eq!(sim.snapshot(), before);
    assert_eq!(sim.steps(), 2);
}

#[test]
fn obsolete_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.scheme");
    fs::write(
        &path,
        "[Scheme]\nVersion=1.0\nElementCount=1\nConnectionCount=0\nNextElementId=2\n\n\
         [Element_0]\nClassName=Generator\nId=1\nX=0\nY=0\nWidth=60\nHeight=40\n",
    )
    .unwrap();
    let err = load_scheme(&path).unwrap_err();
    assert_eq!(err, SchemeError::ObsoleteFormat("1.0".into()));
    assert!(err.to_string().contains("obsolete"));
}

#[test]
fn save_replaces_existing_file_without_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.scheme");
    fs::write(&path, "previous contents").unwrap();

    save_scheme(&path, &sample()).unwrap();
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["out.scheme".to_string()]);
    assert!(load_scheme(&path).is_ok());
}

#[test]
fn failed_save_leaves_prior_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("out.scheme");
    assert!(matches!(save_scheme(&path, &sample()), Err(SchemeError::Io(_))));
    assert!(!path.exists());
}

#[test]
fn composite_survives_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grouped.scheme");

    let mut c = sample();
    let g = c.group(&[3, 4]).unwrap();
    let mut sim = Simulator::with_circuit(c);
    sim.run(5);
    sim.save(&path).unwrap();

    let mut back = Simulator::new();
    back.load(&path).unwrap();
    let sub = back.circuit().element(g).unwrap().subcircuit().unwrap();
    assert_eq!(sub.circuit().len(), 2);
    assert_eq!(sub.inputs(), &[PortRef::input(3, 0)]);
    assert_eq!(sub.outputs(), &[PortRef::output(4, 0)]);

    sim.run(4);
    back.run(4);
    assert_eq!(sim.snapshot(), back.snapshot());
    assert_eq!(back.circuit().value(PortRef::output(1, 0)), Some(Trit::P));
}

#[test]
fn awkward_names_survive_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("names.scheme");
    let names = ["line1\nline2", "x\n[Scheme]", "  padded  ", "\"quoted\"", "back\\slash\r\n"];

    let mut c = sample();
    for (id, name) in (1..).zip(names.iter()) {
        c.element_mut(id).unwrap().name = name.to_string();
    }
    save_scheme(&path, &c).unwrap();

    let loaded = load_scheme(&path).unwrap();
    for (id, name) in (1..).zip(names.iter()) {
        assert_eq!(loaded.element(id).unwrap().name, *name);
    }
}
