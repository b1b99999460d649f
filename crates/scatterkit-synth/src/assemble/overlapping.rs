//! Overlapping strategy.
//!
//! A single overlap layer holds the shifted cell stage, one source group
//! per channel and the normal correction. The master evaluates that layer
//! for the cell under the sample and its eight neighbours, each with its
//! own `Shift`, and composites the nine results over the background
//! inputs. Textures may therefore spill past their own cell.

use log::debug;
use scatterkit_graph::{
    Channel, Direction, Graph, LayeringStrategy, PortType, ProjectionMethod, ScatterConfig,
    SocketRef, TemplateLibrary, Value,
};

use super::{
    add_sources, expose_heads, randomize_layer_offset, source_heads, tidy_outputs, ChannelHeads,
    ChannelTextures,
};
use crate::alpha::{background_inputs, composite_over};
use crate::defaults::apply_defaults;
use crate::error::{AssemblyError, AssemblyResult};
use crate::names;
use crate::normals::correct_normals;
use crate::prune::prune;
use crate::rng::DeterministicRng;
use crate::templates::{add_cell_stage, base_template_name, instantiate, Wiring};

/// Name of the nested layer graph.
pub const OVERLAP_LAYER: &str = "Overlap Layer";

/// Tri-planar blend weights passed into the layer.
const AXES: &str = "Axes";

/// Master controls forwarded into every overlap layer.
const LAYER_CONTROLS: &[&str] = &[
    names::RANDOM_CELL_SHAPE,
    names::RANDOM_LOCATION,
    names::TEXTURE_ROTATION,
    names::RANDOM_ROTATION,
    names::RANDOM_SCALE,
    names::EDGE_BLUR,
    names::EDGE_WARP,
    names::EDGE_WARP_SCALE,
    names::EDGE_WARP_DETAIL,
    names::TEXTURE_WARP,
    names::TEXTURE_WARP_SCALE,
    names::NORMAL_STRENGTH,
    names::DENSITY,
    names::ALPHA_CLIP,
];

/// Cell shifts in compositing order. The cell under the sample is drawn
/// last so it stays on top of its neighbours.
const NEIGHBOUR_SHIFTS: [[f32; 3]; 9] = [
    [-1.0, -1.0, 0.0],
    [0.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 0.0, 0.0],
];

fn overlap_layer(
    library: &TemplateLibrary,
    channels: &ChannelTextures,
    config: &ScatterConfig,
    master: &Graph,
) -> AssemblyResult<Graph> {
    let mut layer = Graph::new(OVERLAP_LAYER);
    layer.add_input(names::VECTOR, PortType::Vector, Value::Vector([0.0; 3]))?;
    layer.add_input(names::SHIFT, PortType::Vector, Value::Vector([0.0; 3]))?;
    for control in LAYER_CONTROLS {
        if let Some(port) = master.port(Direction::Input, control) {
            layer.add_port(port.clone())?;
        }
    }
    let tri_planar = config.projection_method == ProjectionMethod::TriPlanar;
    if tri_planar {
        layer.add_input(AXES, PortType::Vector, Value::Vector([0.0; 3]))?;
    }

    let coordinates = instantiate(library, names::COORDINATES_OVERLAP)?;
    let stage = add_cell_stage(&mut layer, SocketRef::input(names::VECTOR), &coordinates)?;
    let sources = add_sources(
        &mut layer,
        library,
        channels,
        config,
        stage.coordinates,
        stage.warped,
    )?;
    let Some(first) = sources.first().copied() else {
        return Err(AssemblyError::EmptySelection);
    };
    let mut heads = source_heads(&sources);
    let cell_random = SocketRef::node(stage.coordinates, names::RANDOM_COLOR);
    let axes = tri_planar.then(|| SocketRef::input(AXES));
    correct_normals(
        &mut layer,
        library,
        &mut heads,
        &cell_random,
        config.projection_method,
        axes,
    )?;
    expose_heads(&mut layer, &heads)?;
    layer.add_output(names::CELL_ALPHA, PortType::Float)?;
    layer.expose(first.node, names::CELL_ALPHA, names::CELL_ALPHA)?;
    layer.add_output(names::RANDOM_COLOR, PortType::Color)?;
    layer.expose(first.node, names::RANDOM_COLOR, names::RANDOM_COLOR)?;
    Ok(layer)
}

pub(super) fn assemble_overlapping(
    library: &TemplateLibrary,
    channels: &ChannelTextures,
    config: &ScatterConfig,
    rng: &mut DeterministicRng,
) -> AssemblyResult<Graph> {
    let strategy = LayeringStrategy::Overlapping;
    let mut g = instantiate(library, &base_template_name(strategy))?;
    if !channels.contains_key(&Channel::Normal) {
        g.remove_port(Direction::Input, names::NORMAL_STRENGTH)?;
    }
    let layer = overlap_layer(library, channels, config, &g)?;
    let controls: Vec<String> = layer
        .ports(Direction::Input)
        .filter(|p| p.port_type != PortType::Virtual)
        .map(|p| p.name.clone())
        .filter(|name| ![names::VECTOR, names::SHIFT, AXES].contains(&name.as_str()))
        .collect();

    let coordinates = g.require(names::NODE_LAYER_COORDINATES)?;
    let mapping = g.require(names::TRI_PLANAR_MAPPING)?;
    let tri_planar = layer.has_port(Direction::Input, AXES);
    let mut under = background_inputs(&mut g, channels.keys())?;
    let mut random = None;
    for (index, shift) in NEIGHBOUR_SHIFTS.iter().enumerate() {
        let label = format!("Cell {}", index + 1);
        let node = g.group_node(&format!("Overlap {}", label), layer.clone());
        g.place(node, [600.0, -250.0 * index as f32]);
        g.set(node, names::SHIFT, Value::Vector(*shift))?;
        g.link(coordinates, "Output", node, names::VECTOR)?;
        for control in &controls {
            g.feed(control, node, control)?;
        }
        if tri_planar {
            g.link(mapping, AXES, node, AXES)?;
        }
        let mut over: ChannelHeads = channels
            .keys()
            .map(|&channel| (channel, SocketRef::node(node, channel.as_str())))
            .collect();
        composite_over(
            &mut g,
            &mut over,
            &under,
            &SocketRef::node(node, names::CELL_ALPHA),
            &label,
        )?;
        under = over;
        random = Some(SocketRef::node(node, names::RANDOM_COLOR));
    }
    expose_heads(&mut g, &under)?;
    if let Some(random) = random {
        g.connect(random, SocketRef::output(names::RANDOM_COLOR))?;
    }
    randomize_layer_offset(&mut g, rng)?;
    debug!("composited {} overlap cell(s)", NEIGHBOUR_SHIFTS.len());

    prune(&mut g, config)?;
    tidy_outputs(&mut g)?;
    apply_defaults(&mut g, strategy)?;
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::builtin_library;
    use scatterkit_graph::TextureDescriptor;

    fn image_channels(images: &[&str]) -> ChannelTextures {
        let mut channels = ChannelTextures::new();
        channels.insert(
            Channel::Image,
            images.iter().map(|i| TextureDescriptor::new(*i)).collect(),
        );
        channels
    }

    fn build(config: &ScatterConfig) -> Graph {
        let library = builtin_library().unwrap();
        let mut rng = DeterministicRng::new(config.seed);
        assemble_overlapping(&library, &image_channels(&["a.png", "b.png"]), config, &mut rng)
            .unwrap()
    }

    #[test]
    fn nine_cells_share_one_layer_shape() {
        let g = build(&ScatterConfig::with_layering(LayeringStrategy::Overlapping));
        let cells: Vec<_> = (1..=9)
            .map(|i| g.find(&format!("Overlap Cell {}", i)).unwrap())
            .collect();
        let shifts: Vec<_> = cells
            .iter()
            .map(|&id| g.input_default(id, names::SHIFT))
            .collect();
        assert_eq!(shifts[8], Some(Value::Vector([0.0; 3])));
        assert_eq!(shifts[0], Some(Value::Vector([-1.0, -1.0, 0.0])));
        let centre = g.link_into(&SocketRef::output(names::RANDOM_COLOR)).unwrap();
        assert_eq!(centre.from.node_id(), Some(cells[8]));
        assert!(g.validate().is_empty());
    }

    #[test]
    fn cells_composite_in_order() {
        let g = build(&ScatterConfig::with_layering(LayeringStrategy::Overlapping));
        let first = g.find("Image Over Cell 1").unwrap();
        let second = g.find("Image Over Cell 2").unwrap();
        let a = g.link_into(&SocketRef::node(second, "A")).unwrap();
        assert_eq!(a.from, SocketRef::node(first, "Result"));
        let a = g.link_into(&SocketRef::node(first, "A")).unwrap();
        assert_eq!(a.from, SocketRef::input("Background"));
    }

    #[test]
    fn overlapping_drops_color_randomization() {
        let g = build(&ScatterConfig {
            use_noise_col: true,
            ..ScatterConfig::with_layering(LayeringStrategy::Overlapping)
        });
        assert!(!g.has_port(Direction::Input, names::RANDOM_CELL_HUE));
        assert!(!g.has_port(Direction::Input, names::HUE_NOISE));
        assert!(!g.has_port(Direction::Input, names::NORMAL_STRENGTH));
        assert_eq!(
            g.port(Direction::Input, names::RANDOM_LOCATION).unwrap().default,
            Value::Float(0.5)
        );
    }

    #[test]
    fn tri_planar_feeds_axes_into_cells() {
        let mut channels = image_channels(&["a.png"]);
        channels.insert(
            Channel::Normal,
            vec![TextureDescriptor::new("a_n.png").with_channel(Channel::Normal)],
        );
        let config = ScatterConfig {
            projection_method: ProjectionMethod::TriPlanar,
            ..ScatterConfig::with_layering(LayeringStrategy::Overlapping)
        };
        let library = builtin_library().unwrap();
        let mut rng = DeterministicRng::new(0);
        let g = assemble_overlapping(&library, &channels, &config, &mut rng).unwrap();
        let cell = g.find("Overlap Cell 5").unwrap();
        assert!(g.link_into(&SocketRef::node(cell, AXES)).is_some());
        assert!(g.group(cell).unwrap().find(names::NODE_NORMAL_CORRECTION).is_some());
        assert!(g.validate().is_empty());
    }
}
