//! Master templates, one per layering strategy.
//!
//! ```text
//! Texture Coordinate -> Centered UVs | Tri-Planar Mapping -> Pattern Scale
//!   -> Scaled Coordinates -> [Randomize Layers] -> Layer Coordinates
//!   -> Scatter Coordinates -> Cell Coordinates -> [Texture Warp]
//!   -> Warped Coordinates -> (sources, added at assembly)
//! ```
//!
//! The coordinates strategy stops after the coordinate group. The
//! overlapping strategy stops at `Layer Coordinates`; its cell stage lives
//! inside the overlap layer built at assembly time.

use scatterkit_graph::node::{BlendMode, NoiseDimensions, VectorOp};
use scatterkit_graph::{
    Direction, Graph, GraphError, LayeringStrategy, NodeId, NodeKind, PortSchema, PortType,
    SocketRef, Value,
};

use super::{base_template_name, declare, InputRow, Interface, OutputRow, Wiring};
use crate::names;

const COORDINATE_CONTROLS: &[InputRow] = &[
    (names::TRI_PLANAR_BLENDING, PortType::Float, Value::Float(0.15)),
    (names::RANDOM_CELL_SHAPE, PortType::Float, Value::Float(1.0)),
    (names::RANDOM_LOCATION, PortType::Float, Value::Float(1.0)),
    (names::TEXTURE_ROTATION, PortType::Float, Value::Float(0.0)),
    (names::RANDOM_ROTATION, PortType::Float, Value::Float(1.0)),
    (names::RANDOM_SCALE, PortType::Float, Value::Float(0.25)),
    (names::EDGE_BLUR, PortType::Float, Value::Float(0.25)),
    (names::EDGE_WARP, PortType::Float, Value::Float(0.5)),
    (names::EDGE_WARP_SCALE, PortType::Float, Value::Float(1.0)),
    (names::EDGE_WARP_DETAIL, PortType::Float, Value::Float(3.0)),
];

const TEXTURE_CONTROLS: &[InputRow] = &[
    (names::TEXTURE_WARP, PortType::Float, Value::Float(0.5)),
    (names::TEXTURE_WARP_SCALE, PortType::Float, Value::Float(2.0)),
    (names::NORMAL_STRENGTH, PortType::Float, Value::Float(1.0)),
    (names::LABEL_BLENDING, PortType::Virtual, Value::None),
    (names::BLENDING_SCALE, PortType::Float, Value::Float(1.0)),
    (names::BLENDING_DETAIL, PortType::Float, Value::Float(6.0)),
    (names::BLENDING_ROUGHNESS, PortType::Float, Value::Float(0.75)),
    (names::BLENDING_BLUR, PortType::Float, Value::Float(0.25)),
    (names::LABEL_RANDOMIZE_CELLS, PortType::Virtual, Value::None),
    (names::RANDOM_CELL_HUE, PortType::Float, Value::Float(0.1)),
    (names::RANDOM_CELL_SATURATION, PortType::Float, Value::Float(0.1)),
    (names::RANDOM_CELL_VALUE, PortType::Float, Value::Float(0.1)),
    (names::LABEL_RANDOMIZE_TEXTURES, PortType::Virtual, Value::None),
    (names::HUE_NOISE, PortType::Float, Value::Float(0.1)),
    (names::SATURATION_NOISE, PortType::Float, Value::Float(0.1)),
    (names::VALUE_NOISE, PortType::Float, Value::Float(0.1)),
    (names::COLOR_NOISE_SCALE, PortType::Float, Value::Float(5.0)),
    (names::COLOR_NOISE_DETAIL, PortType::Float, Value::Float(2.0)),
    (names::COLOR_NOISE_WARP, PortType::Float, Value::Float(0.0)),
    (names::LABEL_TRANSPARENCY, PortType::Virtual, Value::None),
    (names::DENSITY, PortType::Float, Value::Float(1.0)),
    (names::ALPHA_CLIP, PortType::Float, Value::Float(0.5)),
];

const COORDINATE_OUTPUTS: &[OutputRow] = &[
    (names::VECTOR, PortType::Vector),
    (names::RANDOM_COLOR, PortType::Color),
];

const IMAGE_OUTPUTS: &[OutputRow] = &[
    (names::IMAGE, PortType::Color),
    (names::RANDOM_COLOR, PortType::Color),
];

/// Name of the scale control: cells tile opaquely, textures float freely.
pub(crate) fn scale_port(strategy: LayeringStrategy) -> &'static str {
    if strategy.is_transparent() {
        names::TEXTURE_SCALE
    } else {
        names::CELL_SCALE
    }
}

/// Master interface: the scale control, coordinate controls, and for
/// texture strategies the texture controls.
pub(super) fn interface(strategy: LayeringStrategy) -> Interface {
    let scale: InputRow = (scale_port(strategy), PortType::Float, Value::Float(2.0));
    let mut inputs = vec![scale];
    inputs.extend_from_slice(COORDINATE_CONTROLS);
    let outputs = if strategy == LayeringStrategy::Coordinates {
        COORDINATE_OUTPUTS
    } else {
        inputs.extend_from_slice(TEXTURE_CONTROLS);
        IMAGE_OUTPUTS
    };
    Interface {
        inputs,
        outputs: outputs.to_vec(),
    }
}

pub(super) fn base(
    strategy: LayeringStrategy,
    coordinates: &Graph,
    tri_planar: &Graph,
) -> Result<(Graph, Vec<PortSchema>), GraphError> {
    let mut g = Graph::new(base_template_name(strategy));
    let scale = scale_port(strategy);
    let schema = declare(&mut g, &interface(strategy))?;

    let coords = g.add_node("Texture Coordinate", NodeKind::TextureCoordinate);
    let centered = g.vector_math(names::NODE_CENTERED_UVS, VectorOp::Subtract);
    g.tag(centered, names::SECTION_UV_PROJECTION);
    g.link(coords, "UV", centered, "A")?;
    g.set(centered, "B", Value::Vector([0.5, 0.5, 0.0]))?;
    let mapping = g.group_node(names::TRI_PLANAR_MAPPING, tri_planar.clone());
    g.tag(mapping, names::SECTION_TRI_PLANAR_PROJECTION);
    g.feed(names::TRI_PLANAR_BLENDING, mapping, "Blending")?;

    let pattern = g.vector_math(names::NODE_PATTERN_SCALE, VectorOp::Multiply);
    g.link(centered, "Vector", pattern, "A")?;
    g.feed(scale, pattern, "B")?;
    let scaled = g.reroute(names::NODE_SCALED_COORDINATES, PortType::Vector);
    g.link(pattern, "Vector", scaled, "Input")?;

    if strategy == LayeringStrategy::Coordinates {
        let cells = add_coordinates_group(&mut g, SocketRef::node(scaled, "Output"), coordinates)?;
        g.expose(cells, "Vector", names::VECTOR)?;
        g.expose(cells, names::RANDOM_COLOR, names::RANDOM_COLOR)?;
        return Ok((g, schema));
    }

    let offset = g.add_node(names::NODE_LAYER_OFFSET, NodeKind::CombineXyz);
    g.tag(offset, names::SECTION_RANDOMIZE_LAYERS);
    let randomize = g.vector_math(names::NODE_RANDOMIZE_LAYER, VectorOp::Add);
    g.tag(randomize, names::SECTION_RANDOMIZE_LAYERS);
    g.link(scaled, "Output", randomize, "A")?;
    g.link(offset, "Vector", randomize, "B")?;
    let layer = g.reroute(names::NODE_LAYER_COORDINATES, PortType::Vector);
    g.link(randomize, "Vector", layer, "Input")?;

    if strategy != LayeringStrategy::Overlapping {
        let stage = add_cell_stage(&mut g, SocketRef::node(layer, "Output"), coordinates)?;
        g.expose(stage.coordinates, names::RANDOM_COLOR, names::RANDOM_COLOR)?;
    }
    Ok((g, schema))
}

/// Node ids of a cell stage.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellStage {
    /// The coordinate group.
    pub coordinates: NodeId,
    /// Reroute carrying the final per-cell sample vector.
    pub warped: NodeId,
}

/// Adds the coordinate group, feeding every control the host graph exposes
/// under the same name. `Rotation` is fed from `Texture Rotation`.
fn add_coordinates_group(
    g: &mut Graph,
    vector: SocketRef,
    coordinates: &Graph,
) -> Result<NodeId, GraphError> {
    let cells = g.group_node(names::NODE_SCATTER_COORDINATES, coordinates.clone());
    g.connect(vector, SocketRef::node(cells, names::VECTOR))?;
    for port in coordinates.port_names(Direction::Input) {
        let source = match port.as_str() {
            names::VECTOR => continue,
            "Rotation" => names::TEXTURE_ROTATION,
            other => other,
        };
        if g.has_port(Direction::Input, source) {
            g.feed(source, cells, &port)?;
        }
    }
    Ok(cells)
}

/// Adds the coordinate group followed by the texture warp stage.
pub(crate) fn add_cell_stage(
    g: &mut Graph,
    vector: SocketRef,
    coordinates: &Graph,
) -> Result<CellStage, GraphError> {
    let cells = add_coordinates_group(g, vector, coordinates)?;
    let cell_coords = g.reroute(names::NODE_CELL_COORDINATES, PortType::Vector);
    g.link(cells, names::VECTOR, cell_coords, "Input")?;

    let noise = g.add_node_in(
        names::SECTION_TEXTURE_WARP,
        "Texture Warp Noise",
        NodeKind::NoiseTexture {
            dimensions: NoiseDimensions::Three,
        },
    );
    g.link(cell_coords, "Output", noise, "Vector")?;
    g.feed(names::TEXTURE_WARP_SCALE, noise, "Scale")?;
    let warp = g.mix(names::NODE_TEXTURE_WARP_MIX, BlendMode::LinearLight);
    g.tag(warp, names::SECTION_TEXTURE_WARP);
    g.feed(names::TEXTURE_WARP, warp, "Factor")?;
    g.link(cell_coords, "Output", warp, "A")?;
    g.link(noise, "Color", warp, "B")?;

    let warped = g.reroute(names::NODE_WARPED_COORDINATES, PortType::Vector);
    g.link(warp, "Result", warped, "Input")?;
    Ok(CellStage {
        coordinates: cells,
        warped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{coordinates::coordinates, fragments::tri_planar_mapping};

    fn build(strategy: LayeringStrategy) -> Graph {
        let (coords, _) = coordinates(false).unwrap();
        let (tri, _) = tri_planar_mapping().unwrap();
        base(strategy, &coords, &tri).unwrap().0
    }

    #[test]
    fn scale_port_follows_transparency() {
        assert!(build(LayeringStrategy::Simple).has_port(Direction::Input, names::CELL_SCALE));
        assert!(build(LayeringStrategy::Layered).has_port(Direction::Input, names::TEXTURE_SCALE));
    }

    #[test]
    fn coordinates_base_exposes_vector_only() {
        let g = build(LayeringStrategy::Coordinates);
        assert_eq!(
            g.port_names(Direction::Output),
            vec![names::VECTOR, names::RANDOM_COLOR]
        );
        assert!(!g.has_port(Direction::Input, names::DENSITY));
        assert!(g.find(names::NODE_SCATTER_COORDINATES).is_some());
    }

    #[test]
    fn overlapping_base_has_no_cell_stage() {
        let g = build(LayeringStrategy::Overlapping);
        assert!(g.find(names::NODE_SCATTER_COORDINATES).is_none());
        assert!(g.find(names::NODE_LAYER_COORDINATES).is_some());
    }

    #[test]
    fn cell_stage_feeds_rotation_from_texture_rotation() {
        let g = build(LayeringStrategy::Simple);
        let cells = g.find(names::NODE_SCATTER_COORDINATES).unwrap();
        let link = g.link_into(&SocketRef::node(cells, "Rotation")).unwrap();
        assert_eq!(link.from, SocketRef::input(names::TEXTURE_ROTATION));
        assert!(g.find(names::NODE_WARPED_COORDINATES).is_some());
        assert!(g.validate().is_empty());
    }
}
