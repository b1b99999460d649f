//! Assembly configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::image::Interpolation;

/// How the scatter coordinates are projected onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProjectionMethod {
    /// Centered UV coordinates.
    #[default]
    #[serde(rename = "uv")]
    Uv,
    /// Box projection blended across the three axes.
    #[serde(rename = "tri-planar")]
    TriPlanar,
}

impl ProjectionMethod {
    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionMethod::Uv => "uv",
            ProjectionMethod::TriPlanar => "tri-planar",
        }
    }
}

impl FromStr for ProjectionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uv" => Ok(ProjectionMethod::Uv),
            "tri-planar" | "tri_planar" | "triplanar" => Ok(ProjectionMethod::TriPlanar),
            _ => Err(format!("unknown projection method: {}", s)),
        }
    }
}

/// Top-level assembly algorithm. Selected once per assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayeringStrategy {
    /// Coordinate fragment only, no image sampling.
    Coordinates,
    /// One opaque source per channel.
    #[default]
    Simple,
    /// One sub-assembly per image, merged with a noise mask.
    Blended,
    /// One transparent layer over a background.
    SimpleAlpha,
    /// Texture sets chained through background inputs.
    Layered,
    /// Nine neighbouring cells evaluated and composited.
    Overlapping,
}

impl LayeringStrategy {
    /// All strategies.
    pub fn all() -> &'static [LayeringStrategy] {
        &[
            LayeringStrategy::Coordinates,
            LayeringStrategy::Simple,
            LayeringStrategy::Blended,
            LayeringStrategy::SimpleAlpha,
            LayeringStrategy::Layered,
            LayeringStrategy::Overlapping,
        ]
    }

    /// Returns the strategy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayeringStrategy::Coordinates => "coordinates",
            LayeringStrategy::Simple => "simple",
            LayeringStrategy::Blended => "blended",
            LayeringStrategy::SimpleAlpha => "simple_alpha",
            LayeringStrategy::Layered => "layered",
            LayeringStrategy::Overlapping => "overlapping",
        }
    }

    /// Whether cells may be transparent and composited over a background.
    pub fn is_transparent(&self) -> bool {
        matches!(
            self,
            LayeringStrategy::SimpleAlpha | LayeringStrategy::Layered | LayeringStrategy::Overlapping
        )
    }

    /// Whether the per-layer random offset stage survives pruning.
    pub fn keeps_layer_randomization(&self) -> bool {
        matches!(self, LayeringStrategy::Layered | LayeringStrategy::Overlapping)
    }
}

impl std::fmt::Display for LayeringStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LayeringStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayeringStrategy::all()
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown layering strategy: {}", s))
    }
}

/// The full set of choices driving one assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScatterConfig {
    /// Coordinate projection.
    pub projection_method: ProjectionMethod,
    /// Pixel interpolation for non-normal images.
    pub texture_interpolation: Interpolation,
    /// Layering strategy.
    pub layering: LayeringStrategy,
    /// Soften cell borders with noise.
    pub use_edge_blur: bool,
    /// Domain-warp cell borders.
    pub use_edge_warp: bool,
    /// Domain-warp the texture lookup inside each cell.
    pub use_texture_warp: bool,
    /// Per-cell random color controls.
    pub use_random_col: bool,
    /// Per-texture noise color controls.
    pub use_noise_col: bool,
    /// Classify images into PBR channels.
    pub use_pbr: bool,
    /// Tag data channels as non-color.
    pub use_manage_color: bool,
    /// Seed for every randomized parameter.
    pub seed: u32,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            projection_method: ProjectionMethod::Uv,
            texture_interpolation: Interpolation::Closest,
            layering: LayeringStrategy::Simple,
            use_edge_blur: true,
            use_edge_warp: true,
            use_texture_warp: false,
            use_random_col: true,
            use_noise_col: false,
            use_pbr: false,
            use_manage_color: true,
            seed: 0,
        }
    }
}

impl ScatterConfig {
    /// Default configuration with another layering strategy.
    pub fn with_layering(layering: LayeringStrategy) -> Self {
        Self {
            layering,
            ..Self::default()
        }
    }
}

/// How the noise blend compositor groups outputs across sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MixBy {
    /// Every output name found on any source.
    Name,
    /// Output names present on every source.
    #[default]
    CommonName,
    /// Outputs matched by position.
    Order,
    /// Only the first output of each source.
    First,
}

impl MixBy {
    /// All policies.
    pub fn all() -> &'static [MixBy] {
        &[MixBy::Name, MixBy::CommonName, MixBy::Order, MixBy::First]
    }

    /// Returns the policy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MixBy::Name => "name",
            MixBy::CommonName => "common_name",
            MixBy::Order => "order",
            MixBy::First => "first",
        }
    }
}

impl FromStr for MixBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MixBy::all()
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown mix policy: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: ScatterConfig = serde_json::from_str(r#"{"layering": "blended"}"#).unwrap();
        assert_eq!(config.layering, LayeringStrategy::Blended);
        assert_eq!(config.projection_method, ProjectionMethod::Uv);
        assert!(config.use_edge_blur);
        assert!(!config.use_texture_warp);
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let result: Result<ScatterConfig, _> = serde_json::from_str(r#"{"use_magic": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn projection_uses_hyphenated_name() {
        let json = serde_json::to_string(&ProjectionMethod::TriPlanar).unwrap();
        assert_eq!(json, "\"tri-planar\"");
        assert_eq!(
            "tri-planar".parse::<ProjectionMethod>().unwrap(),
            ProjectionMethod::TriPlanar
        );
    }

    #[test]
    fn transparency_capable_strategies() {
        let transparent: Vec<_> = LayeringStrategy::all()
            .iter()
            .filter(|l| l.is_transparent())
            .map(|l| l.as_str())
            .collect();
        assert_eq!(transparent, vec!["simple_alpha", "layered", "overlapping"]);
    }

    #[test]
    fn strategy_roundtrips_through_str() {
        for strategy in LayeringStrategy::all() {
            assert_eq!(strategy.as_str().parse::<LayeringStrategy>().unwrap(), *strategy);
        }
        assert!("stacked".parse::<LayeringStrategy>().is_err());
    }
}
