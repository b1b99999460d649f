//! Noise blend compositor.
//!
//! Merges several sources per output group with a continuous noise field
//! instead of a per-cell pick. For a group of `n` sources the noise hue is
//! compared against the evenly spaced thresholds `k / n` and each
//! comparison mixes source `k` over the running result, so the field is
//! split into `n` equally likely regions with soft borders from the blend
//! noise blur.

use std::collections::BTreeSet;

use log::{debug, warn};
use scatterkit_graph::node::{BlendMode, MathOp};
use scatterkit_graph::{
    Graph, MixBy, Node, NodeId, NodeKind, PortType, SocketRef, TemplateLibrary, Value,
};

use crate::error::{AssemblyError, AssemblyResult};
use crate::names;
use crate::templates::{instantiate, Wiring};

/// Blend controls on the noise blend node, with their defaults.
pub const BLEND_CONTROLS: [(&str, f32); 4] = [
    ("Noise Scale", 5.0),
    ("Noise Detail", 5.0),
    ("Noise Roughness", 0.75),
    ("Noise Blending", 0.0),
];

/// One output group: the merged output name and the sockets feeding it.
pub type BlendGroup = (String, Vec<SocketRef>);

fn input_name(group: &str, index: usize) -> String {
    format!("{}{}", group, index + 1)
}

/// Builds the nested noise blend graph for the given groups.
fn blend_graph(
    host: &Graph,
    library: &TemplateLibrary,
    groups: &[BlendGroup],
) -> AssemblyResult<Graph> {
    let mut g = Graph::new(names::NODE_NOISE_BLEND);
    g.add_input(names::VECTOR, PortType::Vector, Value::Vector([0.0; 3]))?;
    for (control, default) in BLEND_CONTROLS {
        g.add_input(control, PortType::Float, Value::Float(default))?;
    }
    let widest = groups.iter().map(|(_, s)| s.len()).max().unwrap_or(0);
    for index in 0..widest {
        for (group, sockets) in groups {
            if let Some(socket) = sockets.get(index) {
                let port_type = host.source_type(socket)?;
                g.add_input(input_name(group, index), port_type, Value::default_for(port_type))?;
            }
        }
    }
    for (group, sockets) in groups {
        let port_type = host.source_type(&sockets[0])?;
        g.add_output(group.as_str(), port_type)?;
    }

    let noise = g.group_node(names::BLEND_NOISE, instantiate(library, names::BLEND_NOISE)?);
    g.feed(names::VECTOR, noise, names::VECTOR)?;
    for (control, _) in BLEND_CONTROLS {
        g.feed(control, noise, control)?;
    }

    for (group, sockets) in groups {
        let count = sockets.len();
        if count == 1 {
            warn!("noise blend group '{}' has a single source; passing it through", group);
            g.connect(SocketRef::input(input_name(group, 0)), SocketRef::output(group.as_str()))?;
            continue;
        }
        let mut result = SocketRef::input(input_name(group, 0));
        for k in 1..count {
            let threshold = g.math(&format!("{} Threshold {}", group, k), MathOp::GreaterThan);
            g.link(noise, "Hue", threshold, "A")?;
            g.set(threshold, "B", Value::Float(k as f32 / count as f32))?;
            let mix = g.mix(&format!("{} Mix {}", group, k), BlendMode::Mix);
            g.link(threshold, "Value", mix, "Factor")?;
            g.connect(result, SocketRef::node(mix, "A"))?;
            g.feed(&input_name(group, k), mix, "B")?;
            result = SocketRef::node(mix, "Result");
        }
        g.connect(result, SocketRef::output(group.as_str()))?;
    }
    Ok(g)
}

/// Adds a noise blend node to `host` merging each group's sockets.
///
/// `vector` drives the noise field. Groups with no sockets are ignored;
/// if none remain the call fails with `NoMatchingChannels`.
pub fn noise_blend_groups(
    host: &mut Graph,
    library: &TemplateLibrary,
    groups: &[BlendGroup],
    vector: SocketRef,
) -> AssemblyResult<NodeId> {
    let groups: Vec<BlendGroup> = groups
        .iter()
        .filter(|(_, sockets)| !sockets.is_empty())
        .cloned()
        .collect();
    if groups.is_empty() {
        return Err(AssemblyError::NoMatchingChannels);
    }
    let graph = blend_graph(host, library, &groups)?;
    let name = host.unique_name(names::NODE_NOISE_BLEND);
    let node = host.group_node(&name, graph);
    host.connect(vector, SocketRef::node(node, names::VECTOR))?;
    for (group, sockets) in &groups {
        for (index, socket) in sockets.iter().enumerate() {
            host.connect(socket.clone(), SocketRef::node(node, input_name(group, index)))?;
        }
    }
    debug!(
        "noise blend '{}' merges {} group(s)",
        name,
        groups.len()
    );
    Ok(node)
}

fn output_names(node: &Node) -> Vec<String> {
    node.outputs
        .iter()
        .filter(|s| s.port_type != PortType::Shader)
        .map(|s| s.name.clone())
        .collect()
}

/// Groups the outputs of `nodes` under a matching policy.
///
/// Nodes are taken top to bottom by layout position.
pub fn group_outputs(host: &Graph, nodes: &[NodeId], mix_by: MixBy) -> Vec<BlendGroup> {
    let mut ordered: Vec<&Node> = nodes.iter().filter_map(|&id| host.node(id)).collect();
    ordered.sort_by(|a, b| b.location[1].total_cmp(&a.location[1]));

    let mut groups: Vec<BlendGroup> = Vec::new();
    let mut push = |name: String, socket: SocketRef| {
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, sockets)) => sockets.push(socket),
            None => groups.push((name, vec![socket])),
        }
    };

    match mix_by {
        MixBy::Name => {
            for node in &ordered {
                for name in output_names(node) {
                    push(name.clone(), SocketRef::node(node.id, name));
                }
            }
        }
        MixBy::CommonName => {
            let common: BTreeSet<String> = ordered
                .iter()
                .map(|n| output_names(n).into_iter().collect::<BTreeSet<_>>())
                .reduce(|a, b| a.intersection(&b).cloned().collect())
                .unwrap_or_default();
            for node in &ordered {
                for name in output_names(node).into_iter().filter(|n| common.contains(n)) {
                    push(name.clone(), SocketRef::node(node.id, name));
                }
            }
        }
        MixBy::Order => {
            for node in &ordered {
                for (index, name) in output_names(node).into_iter().enumerate() {
                    push(format!("Col{} Tex", index), SocketRef::node(node.id, name));
                }
            }
        }
        MixBy::First => {
            for node in &ordered {
                if let Some(name) = output_names(node).into_iter().next() {
                    push("Color".to_string(), SocketRef::node(node.id, name));
                }
            }
        }
    }
    groups
}

/// Blends arbitrary nodes of a host graph with a noise mask.
///
/// The noise field reads the vector feeding the topmost node's `Vector`
/// input, or a fresh UV coordinate node when there is none.
pub fn noise_blend(
    host: &mut Graph,
    library: &TemplateLibrary,
    nodes: &[NodeId],
    mix_by: MixBy,
) -> AssemblyResult<NodeId> {
    if nodes.is_empty() {
        return Err(AssemblyError::EmptySelection);
    }
    let groups = group_outputs(host, nodes, mix_by);
    let first = groups
        .first()
        .and_then(|(_, sockets)| sockets.first())
        .and_then(|s| s.node_id());
    let existing = first.and_then(|id| {
        host.link_into(&SocketRef::node(id, names::VECTOR))
            .map(|l| l.from.clone())
    });
    let vector = match existing {
        Some(from) => from,
        None if groups.is_empty() => return Err(AssemblyError::NoMatchingChannels),
        None => {
            let coords = host.add_node(
                &host.unique_name("Blend Coordinates"),
                NodeKind::TextureCoordinate,
            );
            SocketRef::node(coords, "UV")
        }
    };
    let node = noise_blend_groups(host, library, &groups, vector)?;

    let placed: Vec<[f32; 2]> = nodes
        .iter()
        .filter_map(|&id| host.node(id).map(|n| n.location))
        .collect();
    if !placed.is_empty() {
        let x = placed.iter().map(|l| l[0]).fold(f32::MIN, f32::max) + 450.0;
        let y = placed.iter().map(|l| l[1]).sum::<f32>() / placed.len() as f32;
        host.place(node, [x, y]);
    }
    Ok(node)
}
