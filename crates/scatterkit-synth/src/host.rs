//! Host collaborator boundaries.
//!
//! UV provision, raster baking and preference storage belong to the host
//! application. This module fixes the traits the engine talks to and the
//! small amount of logic that sits in front of them: bake file naming and
//! the walk over a scatter node's channel outputs.

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use scatterkit_graph::{Channel, CodedError, Direction, Graph, NodeId, Preferences};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::unscatter::is_scatter_graph;

/// UV layer the engine asks the host to create before baking.
pub const UV_LAYER_NAME: &str = "ScattershotUVs";

/// Errors reported by host services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host could not provide the service at all.
    #[error("host service unavailable: {0}")]
    Unavailable(String),

    /// Baking one channel failed.
    #[error("failed to bake '{channel}': {reason}")]
    Bake {
        /// Channel being baked.
        channel: Channel,
        /// Host supplied reason.
        reason: String,
    },

    /// Preferences could not be read or written.
    #[error("preferences: {0}")]
    Preferences(String),

    /// The node to bake does not hold a scatter graph.
    #[error("node '{0}' is not a scatter group")]
    NotAScatterGraph(String),
}

impl CodedError for HostError {
    fn code(&self) -> &'static str {
        match self {
            HostError::Unavailable(_) => "HOST_001",
            HostError::Bake { .. } => "HOST_002",
            HostError::Preferences(_) => "HOST_003",
            HostError::NotAScatterGraph(_) => "HOST_004",
        }
    }

    fn category(&self) -> &'static str {
        "host"
    }
}

// ============================================================================
// UV provision
// ============================================================================

/// Projection used when the host unwraps meshes for baking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnwrapMethod {
    #[default]
    Smart,
    Cube,
    Cylinder,
    Sphere,
    /// Flat projection along local X.
    Side,
    /// Flat projection along local Y.
    Front,
    /// Flat projection along local Z.
    Top,
    /// Flat projection along global X.
    X,
    /// Flat projection along global Y.
    Y,
    /// Flat projection along global Z.
    Z,
}

impl UnwrapMethod {
    pub fn all() -> &'static [UnwrapMethod] {
        &[
            UnwrapMethod::Smart,
            UnwrapMethod::Cube,
            UnwrapMethod::Cylinder,
            UnwrapMethod::Sphere,
            UnwrapMethod::Side,
            UnwrapMethod::Front,
            UnwrapMethod::Top,
            UnwrapMethod::X,
            UnwrapMethod::Y,
            UnwrapMethod::Z,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnwrapMethod::Smart => "smart",
            UnwrapMethod::Cube => "cube",
            UnwrapMethod::Cylinder => "cylinder",
            UnwrapMethod::Sphere => "sphere",
            UnwrapMethod::Side => "side",
            UnwrapMethod::Front => "front",
            UnwrapMethod::Top => "top",
            UnwrapMethod::X => "x",
            UnwrapMethod::Y => "y",
            UnwrapMethod::Z => "z",
        }
    }
}

impl fmt::Display for UnwrapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnwrapMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnwrapMethod::all()
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown unwrap method: {}", s))
    }
}

/// Settings for a UV unwrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct UnwrapSettings {
    pub method: UnwrapMethod,
    /// Angle (radians) above which smart projection cuts a seam.
    pub angle_limit: f32,
    /// Apply object scale first so texel density matches across meshes.
    pub apply_scale: bool,
}

impl Default for UnwrapSettings {
    fn default() -> Self {
        Self {
            method: UnwrapMethod::Smart,
            angle_limit: std::f32::consts::FRAC_PI_4,
            apply_scale: true,
        }
    }
}

/// Assigns a named UV layer to a set of meshes.
pub trait UvProvider {
    /// Unwraps `meshes` into the layer `layer` and returns the layer name
    /// the host actually used.
    fn assign_uvs(
        &mut self,
        meshes: &[String],
        layer: &str,
        settings: &UnwrapSettings,
    ) -> Result<String, HostError>;
}

// ============================================================================
// Baking
// ============================================================================

/// One channel output to rasterize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakeRequest {
    /// Host graph holding the scatter node.
    pub graph: String,
    /// Scatter node whose output is baked.
    pub node: String,
    /// Output socket of the scatter node to bake.
    pub socket: String,
    /// Channel the baked image stores; decides its color space and format.
    pub output: Channel,
    /// File name rendered from the preferences template.
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// UV layer to bake into.
    pub uv_layer: String,
}

/// Rasterizes a graph output into an image.
pub trait BakeService {
    /// Bakes `request` and returns the name of the saved image.
    fn bake(&mut self, request: &BakeRequest) -> Result<String, HostError>;
}

/// Result of baking one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakedChannel {
    pub channel: Channel,
    pub image: String,
}

/// Values substituted into a bake name template.
#[derive(Debug, Clone, Copy)]
pub struct BakeNaming<'a> {
    /// `{C}`
    pub channel: Channel,
    /// `{G}`
    pub graph: &'a str,
    /// `{L}`
    pub label: &'a str,
    /// `{M}`
    pub material: &'a str,
    /// `{N}`
    pub node: &'a str,
}

/// Renders a bake file name template. Unknown braces are left as they are.
pub fn render_bake_name(template: &str, naming: &BakeNaming<'_>) -> String {
    template
        .replace("{C}", naming.channel.as_str())
        .replace("{G}", naming.graph)
        .replace("{L}", naming.label)
        .replace("{M}", naming.material)
        .replace("{N}", naming.node)
}

/// What to bake and at which size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeJob {
    /// Material name used for `{M}`.
    pub material: String,
    pub width: u32,
    pub height: u32,
    /// Channels to bake. Empty bakes every channel output.
    pub channels: Vec<Channel>,
}

impl BakeJob {
    pub fn new(material: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            material: material.into(),
            width,
            height,
            channels: Vec::new(),
        }
    }

    fn wants(&self, channel: Channel) -> bool {
        self.channels.is_empty() || channel == Channel::Image || self.channels.contains(&channel)
    }
}

/// Bakes every wanted channel output of the scatter node `node` in `host`.
///
/// Outputs are visited in port order; the `Image` output is always baked
/// when present. The first host failure aborts the walk.
pub fn bake_channels(
    host: &Graph,
    node: NodeId,
    job: &BakeJob,
    preferences: &Preferences,
    service: &mut dyn BakeService,
) -> Result<Vec<BakedChannel>, HostError> {
    let scatter = host
        .node(node)
        .ok_or_else(|| HostError::NotAScatterGraph(node.to_string()))?;
    let Some(graph) = scatter.kind.group().filter(|g| is_scatter_graph(g)) else {
        return Err(HostError::NotAScatterGraph(scatter.name.clone()));
    };

    let mut baked = Vec::new();
    for port in graph.ports(Direction::Output) {
        let Ok(channel) = port.name.parse::<Channel>() else {
            continue;
        };
        if !job.wants(channel) {
            continue;
        }
        let naming = BakeNaming {
            channel,
            graph: &graph.name,
            label: scatter.label.as_deref().unwrap_or(""),
            material: &job.material,
            node: &scatter.name,
        };
        let request = BakeRequest {
            graph: host.name.clone(),
            node: scatter.name.clone(),
            socket: port.name.clone(),
            output: channel,
            file_name: render_bake_name(&preferences.bake_name_template, &naming),
            width: job.width,
            height: job.height,
            uv_layer: UV_LAYER_NAME.to_string(),
        };
        debug!("baking {} of '{}' as '{}'", channel, scatter.name, request.file_name);
        let image = service.bake(&request)?;
        baked.push(BakedChannel { channel, image });
    }
    info!("baked {} channel(s) of '{}'", baked.len(), scatter.name);
    Ok(baked)
}

// ============================================================================
// Preferences
// ============================================================================

/// Persists user preferences.
pub trait PreferencesStore {
    /// Loads preferences, returning defaults when none were saved.
    fn load(&self) -> Result<Preferences, HostError>;

    /// Saves preferences.
    fn save(&mut self, preferences: &Preferences) -> Result<(), HostError>;
}

/// Store that keeps preferences in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    saved: Option<Preferences>,
}

impl PreferencesStore for MemoryPreferences {
    fn load(&self) -> Result<Preferences, HostError> {
        Ok(self.saved.clone().unwrap_or_default())
    }

    fn save(&mut self, preferences: &Preferences) -> Result<(), HostError> {
        self.saved = Some(preferences.clone());
        Ok(())
    }
}
