//! Source fragment skeleton: result wiring and the transparency stage.
//!
//! The per-image lookups and the bucket chain are added by the source
//! graph builder, which feeds the `Color Result` and `Alpha Result`
//! reroutes. Everything tagged `Transparency` is removed for opaque
//! strategies.

use scatterkit_graph::node::{BlendMode, MathOp};
use scatterkit_graph::{Graph, GraphError, NodeKind, PortSchema, PortType, Value};

use super::{declare, InputRow, Interface, OutputRow, Wiring};
use crate::names;

const INPUTS: &[InputRow] = &[
    (names::VECTOR, PortType::Vector, Value::Vector([0.0; 3])),
    (names::FRACTION, PortType::Float, Value::Float(0.0)),
    (names::RANDOM_COLOR, PortType::Color, Value::Color([0.0, 0.0, 0.0, 1.0])),
    (names::DENSITY, PortType::Float, Value::Float(1.0)),
    (names::ALPHA_CLIP, PortType::Float, Value::Float(0.5)),
];

const OUTPUTS: &[OutputRow] = &[
    (names::IMAGE, PortType::Color),
    (names::RANDOM_COLOR, PortType::Color),
    (names::CELL_ALPHA, PortType::Float),
];

pub(super) fn interface() -> Interface {
    Interface {
        inputs: INPUTS.to_vec(),
        outputs: OUTPUTS.to_vec(),
    }
}

pub(super) fn source() -> Result<(Graph, Vec<PortSchema>), GraphError> {
    let mut g = Graph::new(names::SOURCE);
    let schema = declare(&mut g, &interface())?;

    let count = g.add_node("Number of Images", NodeKind::Value { value: 1.0 });
    let width = g.math("Bucket Width", MathOp::Divide);
    g.set(width, "A", Value::Float(1.0))?;
    g.link(count, "Value", width, "B")?;

    let color = g.reroute("Color Result", PortType::Color);
    g.expose(color, "Output", names::IMAGE)?;
    let alpha = g.reroute("Alpha Result", PortType::Float);

    let section = names::SECTION_TRANSPARENCY;
    let density = g.math("Density Mask", MathOp::LessThan);
    g.tag(density, section);
    g.feed(names::RANDOM_COLOR, density, "A")?;
    g.feed(names::DENSITY, density, "B")?;
    let clip = g.math("Clip Mask", MathOp::GreaterThan);
    g.tag(clip, section);
    g.link(alpha, "Output", clip, "A")?;
    g.feed(names::ALPHA_CLIP, clip, "B")?;
    let cell_alpha = g.math("Cell Alpha", MathOp::Multiply);
    g.tag(cell_alpha, section);
    g.link(clip, "Value", cell_alpha, "A")?;
    g.link(density, "Value", cell_alpha, "B")?;
    g.expose(cell_alpha, "Value", names::CELL_ALPHA)?;
    let masked = g.mix("Masked Random Color", BlendMode::Mix);
    g.tag(masked, section);
    g.link(cell_alpha, "Value", masked, "Factor")?;
    g.set(masked, "A", Value::Color([0.0, 0.0, 0.0, 1.0]))?;
    g.feed(names::RANDOM_COLOR, masked, "B")?;
    g.expose(masked, "Result", names::RANDOM_COLOR)?;

    Ok((g, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scatterkit_graph::SocketRef;

    #[test]
    fn transparency_feeds_alpha_and_random_color() {
        let (g, _) = source().unwrap();
        assert_eq!(g.section(names::SECTION_TRANSPARENCY).len(), 4);
        let alpha_from = &g.link_into(&SocketRef::output(names::CELL_ALPHA)).unwrap().from;
        assert_eq!(alpha_from.node_id(), g.find("Cell Alpha"));
        assert!(g.validate().is_empty());
    }
}
