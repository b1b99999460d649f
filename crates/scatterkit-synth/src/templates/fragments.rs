//! Small reusable fragments: projection, randomizers, normal correction,
//! and the blend noise field.

use scatterkit_graph::node::{BlendMode, MathOp, NoiseDimensions, RangeCurve, VectorOp};
use scatterkit_graph::{Graph, GraphError, NodeId, NodeKind, PortSchema, PortType, Value};

use super::{declare, InputRow, Interface, Wiring};
use crate::names;

type Built = Result<(Graph, Vec<PortSchema>), GraphError>;

const VECTOR_IN: InputRow = (names::VECTOR, PortType::Vector, Value::Vector([0.0; 3]));
const RANDOM_COLOR_IN: InputRow = (
    names::RANDOM_COLOR,
    PortType::Color,
    Value::Color([0.0, 0.0, 0.0, 1.0]),
);
const SEED_IN: InputRow = ("Random Seed", PortType::Float, Value::Float(0.0));

pub(super) fn tri_planar_mapping_interface() -> Interface {
    Interface {
        inputs: vec![("Blending", PortType::Float, Value::Float(0.15))],
        outputs: vec![(names::VECTOR, PortType::Vector), ("Axes", PortType::Vector)],
    }
}

/// Box projection weighted by the surface normal.
pub(super) fn tri_planar_mapping() -> Built {
    let mut g = Graph::new(names::TRI_PLANAR_MAPPING);
    let schema = declare(&mut g, &tri_planar_mapping_interface())?;
    let coords = g.add_node("Texture Coordinate", NodeKind::TextureCoordinate);
    let weights = g.vector_math("Normal Weights", VectorOp::Multiply);
    g.link(coords, "Normal", weights, "A")?;
    g.link(coords, "Normal", weights, "B")?;
    let sharpness = g.math("Blend Sharpness", MathOp::Divide);
    g.set(sharpness, "A", Value::Float(1.0))?;
    g.feed("Blending", sharpness, "B")?;
    let axes = g.vector_math("Blend Weights", VectorOp::Multiply);
    g.link(weights, "Vector", axes, "A")?;
    g.link(sharpness, "Value", axes, "B")?;
    g.expose(axes, "Vector", "Axes")?;
    let projected = g.vector_math("Box Projection", VectorOp::Multiply);
    g.link(coords, "Object", projected, "A")?;
    g.link(axes, "Vector", projected, "B")?;
    g.expose(projected, "Vector", names::VECTOR)?;
    Ok((g, schema))
}

pub(super) fn randomize_cell_hsv_interface() -> Interface {
    Interface {
        inputs: vec![
            ("Color", PortType::Color, Value::Color([0.8, 0.8, 0.8, 1.0])),
            RANDOM_COLOR_IN,
            ("Random Hue", PortType::Float, Value::Float(0.1)),
            ("Random Saturation", PortType::Float, Value::Float(0.1)),
            ("Random Value", PortType::Float, Value::Float(0.1)),
            SEED_IN,
        ],
        outputs: vec![("Color", PortType::Color)],
    }
}

/// Per-cell hue/saturation/value jitter driven by the cell's random color.
pub(super) fn randomize_cell_hsv() -> Built {
    let mut g = Graph::new(names::RANDOMIZE_CELL_HSV);
    let schema = declare(&mut g, &randomize_cell_hsv_interface())?;
    let seeded = seeded_random(&mut g)?;
    let hsv = g.add_node("Cell Random HSV", NodeKind::SeparateHsv);
    g.link(seeded, "Color", hsv, "Color")?;
    let shift = g.add_node("Shift HSV", NodeKind::HueSaturation);
    g.feed("Color", shift, "Color")?;
    for (component, control, socket, centre) in [
        ("H", "Random Hue", "Hue", 0.5),
        ("S", "Random Saturation", "Saturation", 1.0),
        ("V", "Random Value", "Value", 1.0),
    ] {
        let offset = jitter(&mut g, control, hsv, component, centre)?;
        g.link(offset, "Value", shift, socket)?;
    }
    g.expose(shift, "Color", "Color")?;
    Ok((g, schema))
}

pub(super) fn randomize_cell_value_interface() -> Interface {
    Interface {
        inputs: vec![
            ("Value", PortType::Float, Value::Float(0.5)),
            RANDOM_COLOR_IN,
            ("Random Value", PortType::Float, Value::Float(0.1)),
            SEED_IN,
        ],
        outputs: vec![("Value", PortType::Float)],
    }
}

/// Per-cell brightness jitter for data channels.
pub(super) fn randomize_cell_value() -> Built {
    let mut g = Graph::new(names::RANDOMIZE_CELL_VALUE);
    let schema = declare(&mut g, &randomize_cell_value_interface())?;
    let seeded = seeded_random(&mut g)?;
    let hsv = g.add_node("Cell Random HSV", NodeKind::SeparateHsv);
    g.link(seeded, "Color", hsv, "Color")?;
    let offset = jitter(&mut g, "Random Value", hsv, "V", 0.0)?;
    let apply = g.math("Apply Offset", MathOp::Add);
    g.feed("Value", apply, "A")?;
    g.link(offset, "Value", apply, "B")?;
    g.expose(apply, "Value", "Value")?;
    Ok((g, schema))
}

/// Hashes the cell's random color with the fragment seed.
fn seeded_random(g: &mut Graph) -> Result<NodeId, GraphError> {
    let seed = g.vector_math("Seed Offset", VectorOp::Add);
    g.feed(names::RANDOM_COLOR, seed, "A")?;
    g.feed("Random Seed", seed, "B")?;
    let noise = g.add_node(
        "Seeded Random",
        NodeKind::WhiteNoise {
            dimensions: NoiseDimensions::Three,
        },
    );
    g.link(seed, "Vector", noise, "Vector")?;
    Ok(noise)
}

/// `centre + (component - 0.5) * amount`.
fn jitter(
    g: &mut Graph,
    control: &str,
    hsv: NodeId,
    component: &str,
    centre: f32,
) -> Result<NodeId, GraphError> {
    let centred = g.math(&format!("Centre {}", component), MathOp::Subtract);
    g.link(hsv, component, centred, "A")?;
    let scaled = g.math(&format!("Scale {}", component), MathOp::Multiply);
    g.link(centred, "Value", scaled, "A")?;
    g.feed(control, scaled, "B")?;
    let offset = g.math(&format!("Offset {}", component), MathOp::Add);
    g.set(offset, "A", Value::Float(centre))?;
    g.link(scaled, "Value", offset, "B")?;
    Ok(offset)
}

/// Warped noise field shared by the texture-level randomizers.
fn texture_noise(g: &mut Graph) -> Result<NodeId, GraphError> {
    let warp = g.add_node(
        "Warp Noise",
        NodeKind::NoiseTexture {
            dimensions: NoiseDimensions::Three,
        },
    );
    g.feed(names::VECTOR, warp, "Vector")?;
    g.feed("Noise Scale", warp, "Scale")?;
    let warped = g.mix("Warp Vector", BlendMode::LinearLight);
    g.feed("Noise Warp", warped, "Factor")?;
    g.feed(names::VECTOR, warped, "A")?;
    g.link(warp, "Color", warped, "B")?;
    let noise = g.add_node(
        "Texture Noise",
        NodeKind::NoiseTexture {
            dimensions: NoiseDimensions::Three,
        },
    );
    g.link(warped, "Result", noise, "Vector")?;
    g.feed("Noise Scale", noise, "Scale")?;
    g.feed("Noise Detail", noise, "Detail")?;
    let hsv = g.add_node("Noise HSV", NodeKind::SeparateHsv);
    g.link(noise, "Color", hsv, "Color")?;
    Ok(hsv)
}

const NOISE_CONTROLS: [InputRow; 3] = [
    ("Noise Scale", PortType::Float, Value::Float(5.0)),
    ("Noise Detail", PortType::Float, Value::Float(2.0)),
    ("Noise Warp", PortType::Float, Value::Float(0.0)),
];

pub(super) fn randomize_noise_hsv_interface() -> Interface {
    let mut inputs = vec![
        ("Color", PortType::Color, Value::Color([0.8, 0.8, 0.8, 1.0])),
        VECTOR_IN,
        (names::HUE_NOISE, PortType::Float, Value::Float(0.1)),
        (names::SATURATION_NOISE, PortType::Float, Value::Float(0.1)),
        (names::VALUE_NOISE, PortType::Float, Value::Float(0.1)),
    ];
    inputs.extend_from_slice(&NOISE_CONTROLS);
    Interface {
        inputs,
        outputs: vec![("Color", PortType::Color)],
    }
}

/// Texture-level hue/saturation/value variation from a noise field.
pub(super) fn randomize_noise_hsv() -> Built {
    let mut g = Graph::new(names::RANDOMIZE_NOISE_HSV);
    let schema = declare(&mut g, &randomize_noise_hsv_interface())?;
    let hsv = texture_noise(&mut g)?;
    let shift = g.add_node("Shift HSV", NodeKind::HueSaturation);
    g.feed("Color", shift, "Color")?;
    for (component, control, socket, centre) in [
        ("H", names::HUE_NOISE, "Hue", 0.5),
        ("S", names::SATURATION_NOISE, "Saturation", 1.0),
        ("V", names::VALUE_NOISE, "Value", 1.0),
    ] {
        let offset = jitter(&mut g, control, hsv, component, centre)?;
        g.link(offset, "Value", shift, socket)?;
    }
    g.expose(shift, "Color", "Color")?;
    Ok((g, schema))
}

pub(super) fn randomize_noise_value_interface() -> Interface {
    let mut inputs = vec![
        ("Value", PortType::Float, Value::Float(0.5)),
        VECTOR_IN,
        (names::VALUE_NOISE, PortType::Float, Value::Float(0.1)),
    ];
    inputs.extend_from_slice(&NOISE_CONTROLS);
    Interface {
        inputs,
        outputs: vec![("Value", PortType::Float)],
    }
}

/// Texture-level brightness variation for data channels.
pub(super) fn randomize_noise_value() -> Built {
    let mut g = Graph::new(names::RANDOMIZE_NOISE_VALUE);
    let schema = declare(&mut g, &randomize_noise_value_interface())?;
    let hsv = texture_noise(&mut g)?;
    let offset = jitter(&mut g, names::VALUE_NOISE, hsv, "V", 0.0)?;
    let apply = g.math("Apply Offset", MathOp::Add);
    g.feed("Value", apply, "A")?;
    g.link(offset, "Value", apply, "B")?;
    g.expose(apply, "Value", "Value")?;
    Ok((g, schema))
}

pub(super) fn normal_correction_interface(tri_planar: bool) -> Interface {
    let mut inputs = vec![
        ("Color", PortType::Color, Value::Color([0.5, 0.5, 1.0, 1.0])),
        RANDOM_COLOR_IN,
        ("Rotation", PortType::Float, Value::Float(0.0)),
        ("Random Rotation", PortType::Float, Value::Float(1.0)),
        ("Strength", PortType::Float, Value::Float(1.0)),
    ];
    if tri_planar {
        inputs.push(("Axes", PortType::Vector, Value::Vector([0.0, 0.0, 1.0])));
    }
    Interface {
        inputs,
        outputs: vec![("Normal", PortType::Vector)],
    }
}

/// Rotates tangent-space normals back by the cell's random rotation.
pub(super) fn normal_correction(tri_planar: bool) -> Built {
    let name = if tri_planar {
        names::NORMAL_CORRECTION_TRI_PLANAR
    } else {
        names::NORMAL_CORRECTION_UV
    };
    let mut g = Graph::new(name);
    let schema = declare(&mut g, &normal_correction_interface(tri_planar))?;

    let normal_map = g.add_node("Normal Map", NodeKind::NormalMap);
    g.feed("Color", normal_map, "Color")?;
    g.feed("Strength", normal_map, "Strength")?;
    let components = g.add_node("Random Components", NodeKind::SeparateXyz);
    g.feed(names::RANDOM_COLOR, components, "Vector")?;
    let amount = g.math("Rotation Amount", MathOp::Multiply);
    g.link(components, "Z", amount, "A")?;
    g.feed("Random Rotation", amount, "B")?;
    let angle = g.math("Rotation Angle", MathOp::Add);
    g.link(amount, "Value", angle, "A")?;
    g.feed("Rotation", angle, "B")?;
    let counter = g.math("Counter Rotation", MathOp::Multiply);
    g.link(angle, "Value", counter, "A")?;
    g.set(counter, "B", Value::Float(-std::f32::consts::TAU))?;
    let rotate = g.add_node("Rotate Normal", NodeKind::VectorRotate);
    g.link(normal_map, "Normal", rotate, "Vector")?;
    g.link(counter, "Value", rotate, "Angle")?;

    if tri_planar {
        let weighted = g.vector_math("Axis Weight", VectorOp::Multiply);
        g.link(rotate, "Vector", weighted, "A")?;
        g.feed("Axes", weighted, "B")?;
        g.expose(weighted, "Vector", "Normal")?;
    } else {
        g.expose(rotate, "Vector", "Normal")?;
    }
    Ok((g, schema))
}

pub(super) fn blend_noise_interface() -> Interface {
    Interface {
        inputs: vec![
            VECTOR_IN,
            ("Noise Scale", PortType::Float, Value::Float(5.0)),
            ("Noise Detail", PortType::Float, Value::Float(5.0)),
            ("Noise Roughness", PortType::Float, Value::Float(0.75)),
            ("Noise Blending", PortType::Float, Value::Float(0.0)),
        ],
        outputs: vec![("Hue", PortType::Float)],
    }
}

/// Continuous noise field used to pick between blended sources.
pub(super) fn blend_noise() -> Built {
    let mut g = Graph::new(names::BLEND_NOISE);
    let schema = declare(&mut g, &blend_noise_interface())?;
    let white = g.add_node(
        "White Noise",
        NodeKind::WhiteNoise {
            dimensions: NoiseDimensions::Two,
        },
    );
    g.feed(names::VECTOR, white, "Vector")?;
    let blur = g.add_node(
        "Blur Range",
        NodeKind::MapRange {
            curve: RangeCurve::Smootherstep,
        },
    );
    g.feed("Noise Blending", blur, "Value")?;
    g.set(blur, "To Max", Value::Float(0.05))?;
    let blurred = g.mix("Blur Vector", BlendMode::LinearLight);
    g.link(blur, "Result", blurred, "Factor")?;
    g.feed(names::VECTOR, blurred, "A")?;
    g.link(white, "Color", blurred, "B")?;
    let noise = g.add_node(
        "Noise Texture",
        NodeKind::NoiseTexture {
            dimensions: NoiseDimensions::Three,
        },
    );
    g.link(blurred, "Result", noise, "Vector")?;
    g.feed("Noise Scale", noise, "Scale")?;
    g.feed("Noise Detail", noise, "Detail")?;
    g.feed("Noise Roughness", noise, "Roughness")?;
    let hsv = g.add_node("Separate HSV", NodeKind::SeparateHsv);
    g.link(noise, "Color", hsv, "Color")?;
    g.expose(hsv, "H", "Hue")?;
    Ok((g, schema))
}
