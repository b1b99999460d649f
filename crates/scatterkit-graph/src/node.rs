//! Nodes and the closed set of node kinds.

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::image::{ColorSpace, Extension, ImageProjection, Interpolation, TextureDescriptor};
use crate::port::{Direction, PortType, Socket, Value};

/// Stable identifier of a node within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scalar math operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// `1` when `A > B`, else `0`. Strict comparison.
    GreaterThan,
    /// `1` when `A < B`, else `0`. Strict comparison.
    LessThan,
    Minimum,
    Maximum,
}

/// Vector math operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Color mix blend modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// `A * (1 - f) + B * f`.
    Mix,
    /// `A + f * (2B - 1)`.
    LinearLight,
    Multiply,
    Add,
}

/// Map range interpolation curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeCurve {
    Linear,
    Smootherstep,
}

/// Noise dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseDimensions {
    #[serde(rename = "2d")]
    Two,
    #[serde(rename = "3d")]
    Three,
}

/// Image sampling parameters of an image-lookup node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    /// Image name.
    pub image: String,
    /// Color space tag.
    pub color_space: ColorSpace,
    /// Pixel interpolation.
    pub interpolation: Interpolation,
    /// Extension mode.
    pub extension: Extension,
    /// Projection mode.
    pub projection: ImageProjection,
}

impl From<&TextureDescriptor> for ImageNode {
    fn from(tex: &TextureDescriptor) -> Self {
        Self {
            image: tex.image.clone(),
            color_space: tex.color_space,
            interpolation: tex.interpolation,
            extension: tex.extension,
            projection: tex.projection,
        }
    }
}

/// The closed set of node operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NodeKind {
    /// Samples an image at a vector.
    ImageTexture(ImageNode),
    /// Scalar math.
    Math { op: MathOp },
    /// Vector math.
    VectorMath { op: VectorOp },
    /// Two-way color mix driven by a factor.
    Mix { blend: BlendMode },
    /// Remaps a value between ranges.
    MapRange { curve: RangeCurve },
    /// Constant scalar.
    Value { value: f32 },
    /// Pass-through used as a stable, named wiring point.
    Reroute { port_type: PortType },
    /// Fractal noise field.
    NoiseTexture { dimensions: NoiseDimensions },
    /// Hash noise, constant per input position.
    WhiteNoise { dimensions: NoiseDimensions },
    /// Cellular noise yielding per-cell color and position.
    Voronoi,
    /// Splits a color into hue, saturation, and value.
    SeparateHsv,
    /// Shifts hue, saturation, and value of a color.
    HueSaturation,
    /// Splits a vector into components.
    SeparateXyz,
    /// Builds a vector from components.
    CombineXyz,
    /// Rotates a vector about Z around a center.
    VectorRotate,
    /// Reads a named UV layer.
    UvMap { layer: String },
    /// Object texture coordinates.
    TextureCoordinate,
    /// Converts tangent-space colors into a shading normal.
    NormalMap,
    /// Nested graph.
    Group { graph: Box<Graph> },
    /// Physically based surface shader.
    PrincipledBsdf,
    /// Lambertian surface shader.
    DiffuseBsdf,
    /// Converts a height field into a shading normal.
    Bump,
    /// Material output sink.
    MaterialOutput,
}

fn float(name: &str, value: f32) -> Socket {
    Socket::with_default(name, PortType::Float, Value::Float(value))
}

fn vector(name: &str) -> Socket {
    Socket::new(name, PortType::Vector)
}

fn color(name: &str, rgba: [f32; 4]) -> Socket {
    Socket::with_default(name, PortType::Color, Value::Color(rgba))
}

impl NodeKind {
    /// Short type name used in logs and serialized graphs.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::ImageTexture(_) => "image_texture",
            NodeKind::Math { .. } => "math",
            NodeKind::VectorMath { .. } => "vector_math",
            NodeKind::Mix { .. } => "mix",
            NodeKind::MapRange { .. } => "map_range",
            NodeKind::Value { .. } => "value",
            NodeKind::Reroute { .. } => "reroute",
            NodeKind::NoiseTexture { .. } => "noise_texture",
            NodeKind::WhiteNoise { .. } => "white_noise",
            NodeKind::Voronoi => "voronoi",
            NodeKind::SeparateHsv => "separate_hsv",
            NodeKind::HueSaturation => "hue_saturation",
            NodeKind::SeparateXyz => "separate_xyz",
            NodeKind::CombineXyz => "combine_xyz",
            NodeKind::VectorRotate => "vector_rotate",
            NodeKind::UvMap { .. } => "uv_map",
            NodeKind::TextureCoordinate => "texture_coordinate",
            NodeKind::NormalMap => "normal_map",
            NodeKind::Group { .. } => "group",
            NodeKind::PrincipledBsdf => "principled_bsdf",
            NodeKind::DiffuseBsdf => "diffuse_bsdf",
            NodeKind::Bump => "bump",
            NodeKind::MaterialOutput => "material_output",
        }
    }

    /// Input and output sockets a fresh node of this kind carries.
    pub fn sockets(&self) -> (Vec<Socket>, Vec<Socket>) {
        match self {
            NodeKind::ImageTexture(_) => (
                vec![vector("Vector")],
                vec![
                    color("Color", [0.0, 0.0, 0.0, 1.0]),
                    float("Alpha", 1.0),
                ],
            ),
            NodeKind::Math { .. } => (
                vec![float("A", 0.5), float("B", 0.5)],
                vec![float("Value", 0.0)],
            ),
            NodeKind::VectorMath { .. } => (
                vec![vector("A"), vector("B")],
                vec![vector("Vector")],
            ),
            NodeKind::Mix { .. } => (
                vec![
                    float("Factor", 0.5),
                    color("A", [0.5, 0.5, 0.5, 1.0]),
                    color("B", [0.5, 0.5, 0.5, 1.0]),
                ],
                vec![color("Result", [0.0, 0.0, 0.0, 1.0])],
            ),
            NodeKind::MapRange { .. } => (
                vec![
                    float("Value", 1.0),
                    float("From Min", 0.0),
                    float("From Max", 1.0),
                    float("To Min", 0.0),
                    float("To Max", 1.0),
                ],
                vec![float("Result", 0.0)],
            ),
            NodeKind::Value { value } => (Vec::new(), vec![float("Value", *value)]),
            NodeKind::Reroute { port_type } => (
                vec![Socket::new("Input", *port_type)],
                vec![Socket::new("Output", *port_type)],
            ),
            NodeKind::NoiseTexture { .. } => (
                vec![
                    vector("Vector"),
                    float("Scale", 5.0),
                    float("Detail", 2.0),
                    float("Roughness", 0.5),
                ],
                vec![float("Fac", 0.0), color("Color", [0.0, 0.0, 0.0, 1.0])],
            ),
            NodeKind::WhiteNoise { .. } => (
                vec![vector("Vector")],
                vec![float("Value", 0.0), color("Color", [0.0, 0.0, 0.0, 1.0])],
            ),
            NodeKind::Voronoi => (
                vec![vector("Vector"), float("Scale", 5.0), float("Randomness", 1.0)],
                vec![
                    float("Distance", 0.0),
                    color("Color", [0.0, 0.0, 0.0, 1.0]),
                    vector("Position"),
                ],
            ),
            NodeKind::SeparateHsv => (
                vec![color("Color", [0.8, 0.8, 0.8, 1.0])],
                vec![float("H", 0.0), float("S", 0.0), float("V", 0.0)],
            ),
            NodeKind::HueSaturation => (
                vec![
                    float("Hue", 0.5),
                    float("Saturation", 1.0),
                    float("Value", 1.0),
                    float("Factor", 1.0),
                    color("Color", [0.8, 0.8, 0.8, 1.0]),
                ],
                vec![color("Color", [0.0, 0.0, 0.0, 1.0])],
            ),
            NodeKind::SeparateXyz => (
                vec![vector("Vector")],
                vec![float("X", 0.0), float("Y", 0.0), float("Z", 0.0)],
            ),
            NodeKind::CombineXyz => (
                vec![float("X", 0.0), float("Y", 0.0), float("Z", 0.0)],
                vec![vector("Vector")],
            ),
            NodeKind::VectorRotate => (
                vec![vector("Vector"), vector("Center"), float("Angle", 0.0)],
                vec![vector("Vector")],
            ),
            NodeKind::UvMap { .. } => (Vec::new(), vec![vector("UV")]),
            NodeKind::TextureCoordinate => (
                Vec::new(),
                vec![
                    vector("Generated"),
                    vector("Normal"),
                    vector("UV"),
                    vector("Object"),
                ],
            ),
            NodeKind::NormalMap => (
                vec![float("Strength", 1.0), color("Color", [0.5, 0.5, 1.0, 1.0])],
                vec![vector("Normal")],
            ),
            NodeKind::Group { graph } => (
                graph
                    .ports(Direction::Input)
                    .map(|p| Socket::with_default(p.name.clone(), p.port_type, p.default))
                    .collect(),
                graph
                    .ports(Direction::Output)
                    .map(|p| Socket::new(p.name.clone(), p.port_type))
                    .collect(),
            ),
            NodeKind::PrincipledBsdf => (
                vec![
                    color("Base Color", [0.8, 0.8, 0.8, 1.0]),
                    float("Metallic", 0.0),
                    float("Roughness", 0.5),
                    float("Specular", 0.5),
                    color("Emission", [0.0, 0.0, 0.0, 1.0]),
                    float("Alpha", 1.0),
                    vector("Normal"),
                ],
                vec![Socket::new("BSDF", PortType::Shader)],
            ),
            NodeKind::DiffuseBsdf => (
                vec![
                    color("Color", [0.8, 0.8, 0.8, 1.0]),
                    float("Roughness", 0.0),
                    vector("Normal"),
                ],
                vec![Socket::new("BSDF", PortType::Shader)],
            ),
            NodeKind::Bump => (
                vec![
                    float("Strength", 1.0),
                    float("Distance", 1.0),
                    float("Height", 1.0),
                    vector("Normal"),
                ],
                vec![vector("Normal")],
            ),
            NodeKind::MaterialOutput => (
                vec![
                    Socket::new("Surface", PortType::Shader),
                    Socket::new("Volume", PortType::Shader),
                    vector("Displacement"),
                ],
                Vec::new(),
            ),
        }
    }

    /// Nested graph of a group node.
    pub fn group(&self) -> Option<&Graph> {
        match self {
            NodeKind::Group { graph } => Some(graph),
            _ => None,
        }
    }

    /// Mutable nested graph of a group node.
    pub fn group_mut(&mut self) -> Option<&mut Graph> {
        match self {
            NodeKind::Group { graph } => Some(graph),
            _ => None,
        }
    }

    /// Image parameters of an image-lookup node.
    pub fn image(&self) -> Option<&ImageNode> {
        match self {
            NodeKind::ImageTexture(image) => Some(image),
            _ => None,
        }
    }
}

/// An operation instance inside a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    /// Identifier, stable for the lifetime of the graph.
    pub id: NodeId,
    /// Unique name within the graph.
    pub name: String,
    /// Display label (cosmetic).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Layout position (cosmetic).
    #[serde(default)]
    pub location: [f32; 2],
    /// Feature tag used to find dead subtrees when pruning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Operation and its parameters.
    pub kind: NodeKind,
    /// Input sockets.
    pub inputs: Vec<Socket>,
    /// Output sockets.
    pub outputs: Vec<Socket>,
}

impl Node {
    /// Creates a node with the stock sockets of its kind.
    pub fn new(id: NodeId, name: impl Into<String>, kind: NodeKind) -> Self {
        let (inputs, outputs) = kind.sockets();
        Self {
            id,
            name: name.into(),
            label: None,
            location: [0.0, 0.0],
            section: None,
            kind,
            inputs,
            outputs,
        }
    }

    /// Looks up an input socket.
    pub fn input(&self, name: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// Looks up an input socket mutably.
    pub fn input_mut(&mut self, name: &str) -> Option<&mut Socket> {
        self.inputs.iter_mut().find(|s| s.name == name)
    }

    /// Looks up an output socket.
    pub fn output(&self, name: &str) -> Option<&Socket> {
        self.outputs.iter().find(|s| s.name == name)
    }

    /// Display label, falling back to the name.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Whether this node is a group.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_node_has_two_operands() {
        let node = Node::new(
            NodeId(1),
            "Bucket Select",
            NodeKind::Math {
                op: MathOp::GreaterThan,
            },
        );
        assert!(node.input("A").is_some());
        assert!(node.input("B").is_some());
        assert_eq!(node.outputs.len(), 1);
        assert_eq!(node.output("Value").unwrap().port_type, PortType::Float);
    }

    #[test]
    fn group_sockets_mirror_interface() {
        let mut inner = Graph::new("Inner");
        inner
            .add_input("Vector", PortType::Vector, Value::Vector([0.0; 3]))
            .unwrap();
        inner.add_output("Color", PortType::Color).unwrap();
        let node = Node::new(
            NodeId(3),
            "Inner",
            NodeKind::Group {
                graph: Box::new(inner),
            },
        );
        assert_eq!(node.inputs.len(), 1);
        assert_eq!(node.outputs[0].name, "Color");
        assert!(node.is_group());
    }

    #[test]
    fn node_kind_serializes_with_kind_tag() {
        let kind = NodeKind::Math { op: MathOp::Divide };
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#"{"kind":"math","op":"divide"}"#);
    }
}
