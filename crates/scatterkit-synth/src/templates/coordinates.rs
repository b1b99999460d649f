//! Coordinate field fragment: jittered Voronoi cell coordinates.
//!
//! ```text
//! Vector (+ Shift) -> [Edge Blur] -> [Edge Warp] -> Voronoi
//!   Voronoi.Position -> Cell Fraction                     -> Fraction
//!   Voronoi.Color    -> location jitter, rotation, scale  -> Vector
//!   Voronoi.Color                                         -> Random Color
//! ```
//!
//! Edge blur and edge warp nodes are tagged with their sections so the
//! pruner can splice them out. The overlap variant adds a `Shift` input
//! used to evaluate neighbouring cells.

use scatterkit_graph::node::{BlendMode, MathOp, NoiseDimensions, RangeCurve, VectorOp};
use scatterkit_graph::{Graph, GraphError, NodeKind, PortSchema, PortType, SocketRef, Value};

use super::{declare, InputRow, Interface, OutputRow, Wiring};
use crate::names;

const INPUTS: &[InputRow] = &[
    (names::VECTOR, PortType::Vector, Value::Vector([0.0; 3])),
    (names::RANDOM_CELL_SHAPE, PortType::Float, Value::Float(1.0)),
    (names::RANDOM_LOCATION, PortType::Float, Value::Float(1.0)),
    ("Rotation", PortType::Float, Value::Float(0.0)),
    (names::RANDOM_ROTATION, PortType::Float, Value::Float(1.0)),
    (names::RANDOM_SCALE, PortType::Float, Value::Float(0.25)),
    (names::EDGE_BLUR, PortType::Float, Value::Float(0.25)),
    (names::EDGE_WARP, PortType::Float, Value::Float(0.5)),
    (names::EDGE_WARP_SCALE, PortType::Float, Value::Float(1.0)),
    (names::EDGE_WARP_DETAIL, PortType::Float, Value::Float(3.0)),
];

const SHIFT_INPUT: &[InputRow] = &[(names::SHIFT, PortType::Vector, Value::Vector([0.0; 3]))];

const OUTPUTS: &[OutputRow] = &[
    (names::VECTOR, PortType::Vector),
    (names::RANDOM_COLOR, PortType::Color),
    (names::FRACTION, PortType::Float),
];

const TAU: f32 = std::f32::consts::TAU;

pub(super) fn interface(overlap: bool) -> Interface {
    let mut inputs = INPUTS.to_vec();
    if overlap {
        inputs.extend_from_slice(SHIFT_INPUT);
    }
    Interface {
        inputs,
        outputs: OUTPUTS.to_vec(),
    }
}

pub(super) fn coordinates(overlap: bool) -> Result<(Graph, Vec<PortSchema>), GraphError> {
    let name = if overlap {
        names::COORDINATES_OVERLAP
    } else {
        names::COORDINATES
    };
    let mut g = Graph::new(name);
    let schema = declare(&mut g, &interface(overlap))?;

    let cell_input = if overlap {
        let shift = g.vector_math("Shift Cells", VectorOp::Add);
        g.feed(names::VECTOR, shift, "A")?;
        g.feed(names::SHIFT, shift, "B")?;
        SocketRef::node(shift, "Vector")
    } else {
        SocketRef::input(names::VECTOR)
    };

    // Edge blur: jitter the lookup near cell borders.
    let blur_noise = g.add_node_in(
        names::SECTION_EDGE_BLUR,
        "Edge Blur Noise",
        NodeKind::WhiteNoise {
            dimensions: NoiseDimensions::Two,
        },
    );
    g.connect(cell_input.clone(), SocketRef::node(blur_noise, "Vector"))?;
    let blur_range = g.add_node_in(
        names::SECTION_EDGE_BLUR,
        "Blur Range",
        NodeKind::MapRange {
            curve: RangeCurve::Smootherstep,
        },
    );
    g.feed(names::EDGE_BLUR, blur_range, "Value")?;
    g.set(blur_range, "To Max", Value::Float(0.05))?;
    let edge_blur = g.mix("Edge Blur", BlendMode::LinearLight);
    g.tag(edge_blur, names::SECTION_EDGE_BLUR);
    g.link(blur_range, "Result", edge_blur, "Factor")?;
    g.connect(cell_input.clone(), SocketRef::node(edge_blur, "A"))?;
    g.link(blur_noise, "Color", edge_blur, "B")?;

    // Edge warp: domain-warp the cell pattern.
    let warp_noise = g.add_node_in(
        names::SECTION_EDGE_WARP,
        "Edge Warp Noise",
        NodeKind::NoiseTexture {
            dimensions: NoiseDimensions::Three,
        },
    );
    g.link(edge_blur, "Result", warp_noise, "Vector")?;
    g.feed(names::EDGE_WARP_SCALE, warp_noise, "Scale")?;
    g.feed(names::EDGE_WARP_DETAIL, warp_noise, "Detail")?;
    let edge_warp = g.mix("Edge Warp", BlendMode::LinearLight);
    g.tag(edge_warp, names::SECTION_EDGE_WARP);
    g.feed(names::EDGE_WARP, edge_warp, "Factor")?;
    g.link(edge_blur, "Result", edge_warp, "A")?;
    g.link(warp_noise, "Color", edge_warp, "B")?;

    let voronoi = g.add_node("Voronoi Texture", NodeKind::Voronoi);
    g.link(edge_warp, "Result", voronoi, "Vector")?;
    g.set(voronoi, "Scale", Value::Float(1.0))?;
    g.feed(names::RANDOM_CELL_SHAPE, voronoi, "Randomness")?;
    g.expose(voronoi, "Color", names::RANDOM_COLOR)?;

    let fraction = g.add_node(
        "Cell Fraction",
        NodeKind::WhiteNoise {
            dimensions: NoiseDimensions::Three,
        },
    );
    g.link(voronoi, "Position", fraction, "Vector")?;
    g.expose(fraction, "Value", names::FRACTION)?;

    // Cell-local coordinates, re-centred on the texture origin.
    let offset = g.vector_math("Cell Offset", VectorOp::Subtract);
    g.connect(cell_input, SocketRef::node(offset, "A"))?;
    g.link(voronoi, "Position", offset, "B")?;
    let origin = g.vector_math("Location Origin", VectorOp::Add);
    g.link(offset, "Vector", origin, "A")?;
    let centre = if overlap { [0.0; 3] } else { [0.5, 0.5, 0.0] };
    g.set(origin, "B", Value::Vector(centre))?;

    let components = g.add_node("Random Components", NodeKind::SeparateXyz);
    g.link(voronoi, "Color", components, "Vector")?;
    let jitter = g.add_node("Location Jitter", NodeKind::CombineXyz);
    for axis in ["X", "Y"] {
        let range = g.add_node(
            &format!("Location Range {}", axis),
            NodeKind::MapRange {
                curve: RangeCurve::Linear,
            },
        );
        g.link(components, axis, range, "Value")?;
        g.set(range, "To Min", Value::Float(-1.0))?;
        g.link(range, "Result", jitter, axis)?;
    }
    let amount = g.vector_math("Location Amount", VectorOp::Multiply);
    g.link(jitter, "Vector", amount, "A")?;
    g.feed(names::RANDOM_LOCATION, amount, "B")?;
    let shifted = g.vector_math("Shift Location", VectorOp::Add);
    g.link(origin, "Vector", shifted, "A")?;
    g.link(amount, "Vector", shifted, "B")?;

    let rotation_amount = g.math("Rotation Amount", MathOp::Multiply);
    g.link(components, "Z", rotation_amount, "A")?;
    g.feed(names::RANDOM_ROTATION, rotation_amount, "B")?;
    let rotation_angle = g.math("Rotation Angle", MathOp::Add);
    g.link(rotation_amount, "Value", rotation_angle, "A")?;
    g.feed("Rotation", rotation_angle, "B")?;
    let radians = g.math("Rotation Radians", MathOp::Multiply);
    g.link(rotation_angle, "Value", radians, "A")?;
    g.set(radians, "B", Value::Float(TAU))?;
    let rotate = g.add_node("Rotate Cell", NodeKind::VectorRotate);
    g.link(shifted, "Vector", rotate, "Vector")?;
    g.set(rotate, "Center", Value::Vector(centre))?;
    g.link(radians, "Value", rotate, "Angle")?;

    let variation = g.math("Scale Variation", MathOp::Multiply);
    g.link(fraction, "Value", variation, "A")?;
    g.feed(names::RANDOM_SCALE, variation, "B")?;
    let factor = g.math("Scale Factor", MathOp::Subtract);
    g.set(factor, "A", Value::Float(1.0))?;
    g.link(variation, "Value", factor, "B")?;
    let scale = g.vector_math("Scale Cell", VectorOp::Divide);
    g.link(rotate, "Vector", scale, "A")?;
    g.link(factor, "Value", scale, "B")?;
    g.expose(scale, "Vector", names::VECTOR)?;

    Ok((g, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scatterkit_graph::Direction;

    #[test]
    fn overlap_variant_adds_shift() {
        let (plain, _) = coordinates(false).unwrap();
        let (overlap, schema) = coordinates(true).unwrap();
        assert!(!plain.has_port(Direction::Input, names::SHIFT));
        assert!(overlap.has_port(Direction::Input, names::SHIFT));
        assert!(schema.iter().any(|p| p.name == names::SHIFT));
        assert!(overlap.find("Shift Cells").is_some());
    }

    #[test]
    fn edge_sections_are_tagged() {
        let (g, _) = coordinates(false).unwrap();
        assert_eq!(g.section(names::SECTION_EDGE_BLUR).len(), 3);
        assert_eq!(g.section(names::SECTION_EDGE_WARP).len(), 2);
        assert!(g.validate().is_empty());
    }

    #[test]
    fn cells_are_recentred_unless_overlapping() {
        let (plain, _) = coordinates(false).unwrap();
        let (overlap, _) = coordinates(true).unwrap();
        let origin = |g: &Graph| {
            let id = g.find("Location Origin").unwrap();
            g.input_default(id, "B").unwrap()
        };
        assert_eq!(origin(&plain), Value::Vector([0.5, 0.5, 0.0]));
        assert_eq!(origin(&overlap), Value::Vector([0.0; 3]));
    }
}
