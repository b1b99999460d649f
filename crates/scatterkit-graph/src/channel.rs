//! Semantic texture channels.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::port::{PortType, Value};

/// A semantic PBR slot an image can be classified into.
///
/// Declaration order is the canonical channel order: it drives output
/// port order on assembled graphs and tie-breaks in the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Unclassified image.
    Image,
    /// Base color.
    Albedo,
    /// Ambient occlusion.
    #[serde(rename = "AO")]
    Ao,
    /// Metalness.
    Metallic,
    /// Specular reflectance.
    Specular,
    /// Roughness.
    Roughness,
    /// Glossiness (inverted roughness).
    Glossiness,
    /// Emission color.
    Emission,
    /// Opacity.
    Alpha,
    /// Height map for bump mapping.
    Bump,
    /// Tangent-space normal map.
    Normal,
    /// Height map for true displacement.
    Displacement,
}

impl Channel {
    /// All channels in canonical order.
    pub fn all() -> &'static [Channel] {
        &[
            Channel::Image,
            Channel::Albedo,
            Channel::Ao,
            Channel::Metallic,
            Channel::Specular,
            Channel::Roughness,
            Channel::Glossiness,
            Channel::Emission,
            Channel::Alpha,
            Channel::Bump,
            Channel::Normal,
            Channel::Displacement,
        ]
    }

    /// Value-only channels with no hue or saturation semantics.
    pub fn data_channels() -> &'static [Channel] {
        &[
            Channel::Ao,
            Channel::Metallic,
            Channel::Specular,
            Channel::Roughness,
            Channel::Glossiness,
            Channel::Alpha,
            Channel::Bump,
            Channel::Displacement,
        ]
    }

    /// Returns the channel name as used for output port names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Image => "Image",
            Channel::Albedo => "Albedo",
            Channel::Ao => "AO",
            Channel::Metallic => "Metallic",
            Channel::Specular => "Specular",
            Channel::Roughness => "Roughness",
            Channel::Glossiness => "Glossiness",
            Channel::Emission => "Emission",
            Channel::Alpha => "Alpha",
            Channel::Bump => "Bump",
            Channel::Normal => "Normal",
            Channel::Displacement => "Displacement",
        }
    }

    /// Whether this is a value-only data channel.
    pub fn is_data(&self) -> bool {
        Channel::data_channels().contains(self)
    }

    /// Whether this channel carries hue (and so gets HSV randomization).
    pub fn is_color(&self) -> bool {
        matches!(self, Channel::Image | Channel::Albedo | Channel::Emission)
    }

    /// Whether images of this channel should be sampled as non-color data.
    pub fn is_non_color(&self) -> bool {
        self.is_data() || *self == Channel::Normal
    }

    /// Whether color randomization stages apply to this channel.
    pub fn is_randomizable(&self) -> bool {
        !matches!(self, Channel::Normal | Channel::Displacement)
    }

    /// Type of the output port exposing this channel.
    pub fn port_type(&self) -> PortType {
        if *self == Channel::Normal {
            PortType::Vector
        } else if self.is_data() {
            PortType::Float
        } else {
            PortType::Color
        }
    }

    /// Name of the background input used by transparency compositing.
    pub fn background_port(&self) -> &'static str {
        match self {
            Channel::Image => "Background",
            other => other.as_str(),
        }
    }

    /// Neutral background shown where no cell covers the surface.
    pub fn background_default(&self) -> Value {
        match self {
            Channel::Normal => Value::Color([0.5, 0.5, 1.0, 1.0]),
            Channel::Ao => Value::gray(1.0),
            _ => Value::gray(0.5),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown channel: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_types_follow_channel_semantics() {
        assert_eq!(Channel::Normal.port_type(), PortType::Vector);
        assert_eq!(Channel::Roughness.port_type(), PortType::Float);
        assert_eq!(Channel::Displacement.port_type(), PortType::Float);
        assert_eq!(Channel::Albedo.port_type(), PortType::Color);
        assert_eq!(Channel::Emission.port_type(), PortType::Color);
        assert_eq!(Channel::Image.port_type(), PortType::Color);
    }

    #[test]
    fn background_defaults() {
        assert_eq!(
            Channel::Normal.background_default(),
            Value::Color([0.5, 0.5, 1.0, 1.0])
        );
        assert_eq!(Channel::Ao.background_default(), Value::gray(1.0));
        assert_eq!(Channel::Roughness.background_default(), Value::gray(0.5));
        assert_eq!(Channel::Image.background_port(), "Background");
        assert_eq!(Channel::Bump.background_port(), "Bump");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("ao".parse::<Channel>().unwrap(), Channel::Ao);
        assert_eq!("Normal".parse::<Channel>().unwrap(), Channel::Normal);
        assert!("sheen".parse::<Channel>().is_err());
    }

    #[test]
    fn canonical_order_is_sorted() {
        let mut sorted = Channel::all().to_vec();
        sorted.sort();
        assert_eq!(sorted, Channel::all());
    }

    #[test]
    fn serde_uses_port_names() {
        assert_eq!(serde_json::to_string(&Channel::Ao).unwrap(), "\"AO\"");
        assert_eq!(
            serde_json::from_str::<Channel>("\"Albedo\"").unwrap(),
            Channel::Albedo
        );
    }
}
