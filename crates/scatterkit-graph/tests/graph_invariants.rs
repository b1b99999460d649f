//! Structural invariants hold under arbitrary edit sequences.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use scatterkit_graph::node::{BlendMode, MathOp};
use scatterkit_graph::{Direction, Graph, NodeId, NodeKind, PortType, SocketRef, Value};

#[derive(Debug, Clone)]
enum Edit {
    AddMath,
    AddMix,
    Link { from: usize, to: usize, socket: usize },
    Remove(usize),
    Bypass(usize),
    RemovePort,
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        2 => Just(Edit::AddMath),
        1 => Just(Edit::AddMix),
        4 => (0usize..16, 0usize..16, 0usize..3)
            .prop_map(|(from, to, socket)| Edit::Link { from, to, socket }),
        1 => (0usize..16).prop_map(Edit::Remove),
        1 => (0usize..16).prop_map(Edit::Bypass),
        1 => Just(Edit::RemovePort),
    ]
}

fn base() -> Graph {
    let mut g = Graph::new("Fuzz");
    g.add_input("Fraction", PortType::Float, Value::Float(0.0))
        .unwrap();
    g.add_output("Image", PortType::Color).unwrap();
    g
}

fn pick(ids: &[NodeId], i: usize) -> Option<NodeId> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[i % ids.len()])
    }
}

fn apply(g: &mut Graph, edit: &Edit) {
    let ids: Vec<NodeId> = g.nodes().map(|n| n.id).collect();
    match edit {
        Edit::AddMath => {
            let id = g.add_node("Math", NodeKind::Math { op: MathOp::Add });
            let _ = g.connect(SocketRef::input("Fraction"), SocketRef::node(id, "A"));
        }
        Edit::AddMix => {
            let id = g.add_node(
                "Mix",
                NodeKind::Mix {
                    blend: BlendMode::Mix,
                },
            );
            let _ = g.connect(SocketRef::node(id, "Result"), SocketRef::output("Image"));
        }
        Edit::Link { from, to, socket } => {
            let (Some(a), Some(b)) = (pick(&ids, *from), pick(&ids, *to)) else {
                return;
            };
            let out = g.node(a).and_then(|n| n.outputs.first()).map(|s| s.name.clone());
            let input = g
                .node(b)
                .and_then(|n| n.inputs.get(socket % n.inputs.len().max(1)))
                .map(|s| s.name.clone());
            if let (Some(out), Some(input)) = (out, input) {
                let _ = g.link(a, &out, b, &input);
            }
        }
        Edit::Remove(i) => {
            if let Some(id) = pick(&ids, *i) {
                g.remove_node(id).unwrap();
            }
        }
        Edit::Bypass(i) => {
            if let Some(id) = pick(&ids, *i) {
                let node = g.node(id).unwrap();
                let input = node.inputs[0].name.clone();
                let output = node.outputs[0].name.clone();
                g.bypass(id, &input, &output).unwrap();
            }
        }
        Edit::RemovePort => {
            let _ = g.remove_port(Direction::Input, "Fraction");
        }
    }
}

proptest! {
    #[test]
    fn edits_never_break_structure(edits in prop::collection::vec(edit(), 1..40)) {
        let mut g = base();
        for e in &edits {
            apply(&mut g, e);
            let issues = g.validate();
            prop_assert!(issues.is_empty(), "after {:?}: {:?}", e, issues);
        }
    }

    #[test]
    fn clones_are_independent(edits in prop::collection::vec(edit(), 1..20)) {
        let mut original = base();
        for e in &edits {
            apply(&mut original, e);
        }
        let snapshot = original.clone();
        let mut copy = original.clone();
        for e in &edits {
            apply(&mut copy, e);
        }
        prop_assert_eq!(original, snapshot);
    }
}

#[test]
fn group_edits_resync_sockets_and_drop_dangling_links() {
    let mut inner = base();
    inner.add_output("Alpha", PortType::Float).unwrap();
    let mut host = Graph::new("Host");
    let group = host.add_node("Group", NodeKind::Group { graph: Box::new(inner) });
    let mix = host.add_node(
        "Mix",
        NodeKind::Mix {
            blend: BlendMode::Mix,
        },
    );
    host.link(group, "Alpha", mix, "Factor").unwrap();
    host.link(group, "Image", mix, "A").unwrap();

    host.edit_group(group, |g| g.remove_port(Direction::Output, "Alpha").map(|_| ()))
        .unwrap();

    let outputs: Vec<&str> = host
        .node(group)
        .unwrap()
        .outputs
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(outputs, vec!["Image"]);
    assert_eq!(host.links().len(), 1);
    assert!(host.link_into(&SocketRef::node(mix, "Factor")).is_none());
    assert!(host.validate().is_empty());
}
