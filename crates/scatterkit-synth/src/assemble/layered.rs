//! Layered strategy.
//!
//! Texture set `i` holds the `i`-th texture of every channel. Each set is
//! assembled as a complete transparent single layer with its own seed,
//! then the layers are chained inside a master graph: a layer's channel
//! outputs feed the next layer's background inputs, and the last layer
//! feeds the master outputs. The master exposes the first layer's
//! interface, so every control drives all layers at once.

use std::collections::BTreeMap;

use log::debug;
use scatterkit_graph::{
    Channel, Direction, Graph, InterfacePort, LayeringStrategy, NodeId, PortType, ScatterConfig,
    TemplateLibrary,
};

use super::{assemble_layer, instance_name, ChannelTextures};
use crate::error::{AssemblyError, AssemblyResult};
use crate::rng::DeterministicRng;
use crate::templates::Wiring;

/// Splits channel textures into per-layer sets of one texture per channel.
///
/// Every set must carry the channels of the first one; a set missing one
/// fails with `ChannelMismatch` naming the channel and the set.
pub fn texture_sets(channels: &ChannelTextures) -> AssemblyResult<Vec<ChannelTextures>> {
    let count = channels.values().map(Vec::len).max().unwrap_or(0);
    let mut sets = Vec::with_capacity(count);
    for set in 0..count {
        let mut textures = ChannelTextures::new();
        for (&channel, list) in channels {
            let tex = list
                .get(set)
                .ok_or(AssemblyError::ChannelMismatch { channel, set })?;
            textures.insert(channel, vec![tex.clone()]);
        }
        sets.push(textures);
    }
    Ok(sets)
}

pub(super) fn assemble_layered(
    library: &TemplateLibrary,
    channels: &ChannelTextures,
    config: &ScatterConfig,
) -> AssemblyResult<Graph> {
    let sets = texture_sets(channels)?;
    let mut layers = Vec::with_capacity(sets.len());
    for (index, set) in sets.iter().enumerate() {
        let mut rng = DeterministicRng::for_layer(config.seed, index as u32);
        let mut layer = assemble_layer(library, set, config, &mut rng)?;
        layer.name = format!("Layer {}", index + 1);
        layers.push(layer);
    }
    let Some(first) = layers.first() else {
        return Err(AssemblyError::EmptySelection);
    };

    let mut g = Graph::new(instance_name(LayeringStrategy::Layered));
    for direction in [Direction::Input, Direction::Output] {
        for port in first.ports(direction) {
            g.add_port(port.clone())?;
        }
    }

    let backgrounds: BTreeMap<&str, Channel> = channels
        .keys()
        .map(|&channel| (channel.background_port(), channel))
        .collect();
    let mut previous: Option<NodeId> = None;
    let count = layers.len();
    for (index, layer) in layers.into_iter().enumerate() {
        let inputs: Vec<InterfacePort> = layer
            .ports(Direction::Input)
            .filter(|p| p.port_type != PortType::Virtual)
            .cloned()
            .collect();
        let name = layer.name.clone();
        let node = g.group_node(&name, layer);
        g.place(node, [400.0 * index as f32, 0.0]);
        for port in &inputs {
            match (previous, backgrounds.get(port.name.as_str())) {
                (Some(below), Some(channel)) => g.link(below, channel.as_str(), node, &port.name)?,
                _ if g.has_port(Direction::Input, &port.name) => g.feed(&port.name, node, &port.name)?,
                _ => {}
            }
        }
        previous = Some(node);
    }
    if let Some(top) = previous {
        for port in g.port_names(Direction::Output) {
            g.expose(top, &port, &port)?;
        }
    }
    debug!("stacked {} layer(s)", count);
    Ok(g)
}
