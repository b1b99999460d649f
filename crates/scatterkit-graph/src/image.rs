//! Image references and sampling settings.

use serde::{Deserialize, Serialize};

use crate::channel::Channel;

/// Color space tag applied to a sampled image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// Color data, gamma encoded.
    #[default]
    Srgb,
    /// Raw data (roughness, normals, heights).
    NonColor,
}

/// Pixel interpolation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Nearest pixel, no filtering.
    #[default]
    Closest,
    /// Bilinear filtering.
    Linear,
    /// Bicubic filtering.
    Cubic,
}

impl Interpolation {
    /// Returns the mode as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpolation::Closest => "closest",
            Interpolation::Linear => "linear",
            Interpolation::Cubic => "cubic",
        }
    }
}

/// How an image is extrapolated outside its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    /// Tile the image.
    #[default]
    Repeat,
    /// Transparent outside the image.
    Clip,
    /// Repeat the border pixels.
    Extend,
}

/// How an image projects a 3D lookup vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageProjection {
    /// XY plane.
    #[default]
    Flat,
    /// Tri-planar box projection.
    Box,
}

/// A source image plus its detected channel and sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextureDescriptor {
    /// Image name, normally the file name.
    pub image: String,
    /// Detected channel.
    #[serde(default = "default_channel")]
    pub channel: Channel,
    /// Color space tag.
    #[serde(default)]
    pub color_space: ColorSpace,
    /// Pixel interpolation.
    #[serde(default = "default_interpolation")]
    pub interpolation: Interpolation,
    /// Extension mode.
    #[serde(default)]
    pub extension: Extension,
    /// Projection mode.
    #[serde(default)]
    pub projection: ImageProjection,
}

fn default_channel() -> Channel {
    Channel::Image
}

fn default_interpolation() -> Interpolation {
    Interpolation::Linear
}

impl TextureDescriptor {
    /// Creates a descriptor for an unclassified image with stock sampling.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            channel: Channel::Image,
            color_space: ColorSpace::Srgb,
            interpolation: Interpolation::Linear,
            extension: Extension::Repeat,
            projection: ImageProjection::Flat,
        }
    }

    /// Sets the channel.
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// Sets the color space.
    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_defaults_from_json() {
        let tex: TextureDescriptor = serde_json::from_str(r#"{"image": "rock.png"}"#).unwrap();
        assert_eq!(tex, TextureDescriptor::new("rock.png"));
    }

    #[test]
    fn descriptor_rejects_unknown_fields() {
        let result: Result<TextureDescriptor, _> =
            serde_json::from_str(r#"{"image": "rock.png", "gamma": 2.2}"#);
        assert!(result.is_err());
    }
}
