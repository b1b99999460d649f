//! Point evaluation of scalar and color node chains, for tests.
//!
//! Image lookups return stubbed samples keyed by image name. Node kinds
//! that need a real surface (noise, Voronoi, coordinates) evaluate to the
//! default of the requested output socket.

use std::collections::HashMap;

use scatterkit_graph::node::{BlendMode, MathOp, RangeCurve};
use scatterkit_graph::{Endpoint, Graph, NodeId, NodeKind, SocketRef, Value};

#[derive(Debug, Clone, Default)]
pub struct PointEval {
    samples: HashMap<String, [f32; 4]>,
    inputs: HashMap<String, Value>,
}

impl PointEval {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stubs the sample returned by every lookup of `image`.
    pub fn sample(&mut self, image: &str, rgba: [f32; 4]) {
        self.samples.insert(image.to_string(), rgba);
    }

    /// Overrides a boundary input of the evaluated graph.
    pub fn input(&mut self, port: &str, value: Value) {
        self.inputs.insert(port.to_string(), value);
    }

    /// Evaluates a boundary output as a color.
    pub fn output(&self, graph: &Graph, port: &str) -> [f32; 4] {
        self.output_value(graph, port).as_color()
    }

    /// Evaluates a boundary output.
    pub fn output_value(&self, graph: &Graph, port: &str) -> Value {
        eval_output(graph, port, &self.inputs, &self.samples)
    }
}

fn eval_output(
    graph: &Graph,
    port: &str,
    inputs: &HashMap<String, Value>,
    samples: &HashMap<String, [f32; 4]>,
) -> Value {
    match graph.link_into(&SocketRef::output(port)) {
        Some(link) => eval(graph, &link.from, inputs, samples),
        None => Value::None,
    }
}

fn eval(
    graph: &Graph,
    from: &SocketRef,
    inputs: &HashMap<String, Value>,
    samples: &HashMap<String, [f32; 4]>,
) -> Value {
    let id = match from.endpoint {
        Endpoint::GroupInput => {
            return inputs.get(&from.socket).copied().unwrap_or_else(|| {
                graph
                    .port(scatterkit_graph::Direction::Input, &from.socket)
                    .map(|p| p.default)
                    .unwrap_or_default()
            })
        }
        Endpoint::GroupOutput => return Value::None,
        Endpoint::Node(id) => id,
    };
    let Some(node) = graph.node(id) else {
        return Value::None;
    };
    let input = |socket: &str| eval_input(graph, id, socket, inputs, samples);

    match &node.kind {
        NodeKind::Value { value } => Value::Float(*value),
        NodeKind::Reroute { .. } => input("Input"),
        NodeKind::Math { op } => {
            let a = input("A").as_float();
            let b = input("B").as_float();
            Value::Float(match op {
                MathOp::Add => a + b,
                MathOp::Subtract => a - b,
                MathOp::Multiply => a * b,
                MathOp::Divide => {
                    if b == 0.0 {
                        0.0
                    } else {
                        a / b
                    }
                }
                MathOp::GreaterThan => f32::from(u8::from(a > b)),
                MathOp::LessThan => f32::from(u8::from(a < b)),
                MathOp::Minimum => a.min(b),
                MathOp::Maximum => a.max(b),
            })
        }
        NodeKind::Mix { blend } => {
            let f = input("Factor").as_float();
            let a = input("A").as_color();
            let b = input("B").as_color();
            let mut out = [0.0; 4];
            for i in 0..4 {
                out[i] = match blend {
                    BlendMode::Mix => a[i] * (1.0 - f) + b[i] * f,
                    BlendMode::LinearLight => a[i] + f * (2.0 * b[i] - 1.0),
                    BlendMode::Multiply => a[i] * (1.0 - f) + a[i] * b[i] * f,
                    BlendMode::Add => a[i] + b[i] * f,
                };
            }
            Value::Color(out)
        }
        NodeKind::MapRange { curve } => {
            let v = input("Value").as_float();
            let from_min = input("From Min").as_float();
            let from_max = input("From Max").as_float();
            let to_min = input("To Min").as_float();
            let to_max = input("To Max").as_float();
            let span = from_max - from_min;
            let mut t = if span == 0.0 { 0.0 } else { (v - from_min) / span };
            if *curve == RangeCurve::Smootherstep {
                t = t.clamp(0.0, 1.0);
                t = t * t * t * (t * (t * 6.0 - 15.0) + 10.0);
            }
            Value::Float(to_min + t * (to_max - to_min))
        }
        NodeKind::ImageTexture(image) => {
            let rgba = samples
                .get(&image.image)
                .copied()
                .unwrap_or([0.0, 0.0, 0.0, 1.0]);
            if from.socket == "Alpha" {
                Value::Float(rgba[3])
            } else {
                Value::Color(rgba)
            }
        }
        NodeKind::Group { graph: inner } => {
            let nested: HashMap<String, Value> = node
                .inputs
                .iter()
                .map(|s| (s.name.clone(), input(&s.name)))
                .collect();
            eval_output(inner, &from.socket, &nested, samples)
        }
        _ => node
            .output(&from.socket)
            .map(|s| s.default)
            .unwrap_or_default(),
    }
}

fn eval_input(
    graph: &Graph,
    id: NodeId,
    socket: &str,
    inputs: &HashMap<String, Value>,
    samples: &HashMap<String, [f32; 4]>,
) -> Value {
    match graph.link_into(&SocketRef::node(id, socket)) {
        Some(link) => eval(graph, &link.from, inputs, samples),
        None => graph.input_default(id, socket).unwrap_or_default(),
    }
}
