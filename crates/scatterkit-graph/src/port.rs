//! Port types, values, and sockets.

use serde::{Deserialize, Serialize};

/// Data type carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    /// Scalar value.
    Float,
    /// Three-component vector.
    Vector,
    /// RGBA color.
    Color,
    /// Shader closure (host material graphs only).
    Shader,
    /// Label-only port with no data, used to visually group controls.
    Virtual,
}

impl PortType {
    /// Returns the port type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PortType::Float => "float",
            PortType::Vector => "vector",
            PortType::Color => "color",
            PortType::Shader => "shader",
            PortType::Virtual => "virtual",
        }
    }

    /// Whether a link may carry data from a port of this type into `to`.
    ///
    /// Float, vector, and color convert implicitly between each other.
    /// Shader only links to shader; virtual ports never link.
    pub fn can_link_to(self, to: PortType) -> bool {
        match (self, to) {
            (PortType::Virtual, _) | (_, PortType::Virtual) => false,
            (PortType::Shader, PortType::Shader) => true,
            (PortType::Shader, _) | (_, PortType::Shader) => false,
            _ => true,
        }
    }
}

impl std::fmt::Display for PortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a boundary port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Data enters the graph.
    Input,
    /// Data leaves the graph.
    Output,
}

impl Direction {
    /// Returns the direction as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

/// A default or constant value stored on a socket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Value {
    /// No value (shader and virtual ports).
    #[default]
    None,
    /// Scalar.
    Float(f32),
    /// XYZ vector.
    Vector([f32; 3]),
    /// RGBA color.
    Color([f32; 4]),
}

impl Value {
    /// Neutral default for a port type.
    pub fn default_for(port_type: PortType) -> Self {
        match port_type {
            PortType::Float => Value::Float(0.0),
            PortType::Vector => Value::Vector([0.0; 3]),
            PortType::Color => Value::Color([0.0, 0.0, 0.0, 1.0]),
            PortType::Shader | PortType::Virtual => Value::None,
        }
    }

    /// Opaque gray color.
    pub fn gray(level: f32) -> Self {
        Value::Color([level, level, level, 1.0])
    }

    /// Converts to a scalar (vectors and colors average their first three components).
    pub fn as_float(&self) -> f32 {
        match *self {
            Value::None => 0.0,
            Value::Float(v) => v,
            Value::Vector([x, y, z]) => (x + y + z) / 3.0,
            Value::Color([r, g, b, _]) => (r + g + b) / 3.0,
        }
    }

    /// Converts to a vector.
    pub fn as_vector(&self) -> [f32; 3] {
        match *self {
            Value::None => [0.0; 3],
            Value::Float(v) => [v; 3],
            Value::Vector(v) => v,
            Value::Color([r, g, b, _]) => [r, g, b],
        }
    }

    /// Converts to a color.
    pub fn as_color(&self) -> [f32; 4] {
        match *self {
            Value::None => [0.0, 0.0, 0.0, 1.0],
            Value::Float(v) => [v, v, v, 1.0],
            Value::Vector([x, y, z]) => [x, y, z, 1.0],
            Value::Color(c) => c,
        }
    }

    /// Converts this value to the representation of `port_type`.
    pub fn coerce(&self, port_type: PortType) -> Self {
        match port_type {
            PortType::Float => Value::Float(self.as_float()),
            PortType::Vector => Value::Vector(self.as_vector()),
            PortType::Color => Value::Color(self.as_color()),
            PortType::Shader | PortType::Virtual => Value::None,
        }
    }
}

/// A named, typed connection point on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Socket {
    /// Socket name, unique per node and side.
    pub name: String,
    /// Data type.
    pub port_type: PortType,
    /// Value used when no link is attached.
    #[serde(default)]
    pub default: Value,
}

impl Socket {
    /// Creates a socket with the neutral default for its type.
    pub fn new(name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            name: name.into(),
            port_type,
            default: Value::default_for(port_type),
        }
    }

    /// Creates a socket with an explicit default.
    pub fn with_default(name: impl Into<String>, port_type: PortType, default: Value) -> Self {
        Self {
            name: name.into(),
            port_type,
            default,
        }
    }
}

/// A boundary port of a graph, part of its externally visible interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterfacePort {
    /// Port name, unique per direction.
    pub name: String,
    /// Whether data enters or leaves the graph here.
    pub direction: Direction,
    /// Data type.
    pub port_type: PortType,
    /// Default value exposed to the consumer of the graph.
    #[serde(default)]
    pub default: Value,
}

impl InterfacePort {
    /// Creates an input port.
    pub fn input(name: impl Into<String>, port_type: PortType, default: Value) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Input,
            port_type,
            default,
        }
    }

    /// Creates an output port.
    pub fn output(name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Output,
            port_type,
            default: Value::default_for(port_type),
        }
    }

    /// Creates a virtual label port used to group controls.
    pub fn label(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Input,
            port_type: PortType::Virtual,
            default: Value::None,
        }
    }
}
