//! Feature pruning with link re-splicing.
//!
//! Each [`Feature`] owns a section tag, a set of boundary ports, and a list
//! of pass-through nodes. Pruning a feature, at every nesting level:
//!
//! 1. relinks replacement sources (projection swaps),
//! 2. bypasses pass-through nodes, splicing their predecessor into every
//!    consumer before the node is removed,
//! 3. removes the rest of the section,
//! 4. removes the feature's boundary ports,
//!
//! then recurses into the remaining group nodes. Removing a feature that
//! left nothing behind is a programming error and panics.

use log::debug;
use scatterkit_graph::{Channel, Direction, Graph, GraphError, LayeringStrategy, ProjectionMethod, ScatterConfig, SocketRef};

use crate::error::AssemblyResult;
use crate::names;

/// Optional stages that can be pruned from an assembled graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    EdgeBlur,
    EdgeWarp,
    TextureWarp,
    RandomCellColor,
    NoiseColor,
    Transparency,
    LayerRandomization,
    Blending,
    UvProjection,
    TriPlanarProjection,
}

#[derive(Debug, Clone, Copy)]
enum Match {
    Exact(&'static str),
    Prefix(&'static str),
}

impl Match {
    fn matches(&self, name: &str) -> bool {
        match self {
            Match::Exact(n) => name == *n,
            Match::Prefix(p) => name.starts_with(p),
        }
    }
}

/// A pass-through node: `input` is spliced into every consumer of `output`.
#[derive(Debug, Clone, Copy)]
struct Splice {
    node: Match,
    input: &'static str,
    output: &'static str,
}

const fn splice(node: Match, input: &'static str, output: &'static str) -> Splice {
    Splice {
        node,
        input,
        output,
    }
}

/// A replacement link made before the feature's nodes disappear.
type Relink = (&'static str, &'static str, &'static str, &'static str);

impl Feature {
    /// All features.
    pub fn all() -> &'static [Feature] {
        &[
            Feature::EdgeBlur,
            Feature::EdgeWarp,
            Feature::TextureWarp,
            Feature::RandomCellColor,
            Feature::NoiseColor,
            Feature::Transparency,
            Feature::LayerRandomization,
            Feature::Blending,
            Feature::UvProjection,
            Feature::TriPlanarProjection,
        ]
    }

    /// Returns the feature name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::EdgeBlur => "edge_blur",
            Feature::EdgeWarp => "edge_warp",
            Feature::TextureWarp => "texture_warp",
            Feature::RandomCellColor => "random_cell_color",
            Feature::NoiseColor => "noise_color",
            Feature::Transparency => "transparency",
            Feature::LayerRandomization => "layer_randomization",
            Feature::Blending => "blending",
            Feature::UvProjection => "uv_projection",
            Feature::TriPlanarProjection => "tri_planar_projection",
        }
    }

    fn section(&self) -> Option<&'static str> {
        match self {
            Feature::EdgeBlur => Some(names::SECTION_EDGE_BLUR),
            Feature::EdgeWarp => Some(names::SECTION_EDGE_WARP),
            Feature::TextureWarp => Some(names::SECTION_TEXTURE_WARP),
            Feature::RandomCellColor => Some(names::SECTION_RANDOMIZE_CELLS),
            Feature::NoiseColor => Some(names::SECTION_RANDOMIZE_TEXTURES),
            Feature::Transparency => Some(names::SECTION_TRANSPARENCY),
            Feature::LayerRandomization => Some(names::SECTION_RANDOMIZE_LAYERS),
            Feature::Blending => None,
            Feature::UvProjection => Some(names::SECTION_UV_PROJECTION),
            Feature::TriPlanarProjection => Some(names::SECTION_TRI_PLANAR_PROJECTION),
        }
    }

    fn splices(&self) -> &'static [Splice] {
        const EDGE_BLUR: &[Splice] = &[splice(Match::Exact("Edge Blur"), "A", "Result")];
        const EDGE_WARP: &[Splice] = &[splice(Match::Exact("Edge Warp"), "A", "Result")];
        const TEXTURE_WARP: &[Splice] = &[splice(
            Match::Exact(names::NODE_TEXTURE_WARP_MIX),
            "A",
            "Result",
        )];
        const RANDOM_CELL: &[Splice] = &[
            splice(Match::Prefix("Randomize Cell "), "Color", "Color"),
            splice(Match::Prefix("Randomize Cell "), "Value", "Value"),
        ];
        const NOISE: &[Splice] = &[
            splice(Match::Prefix("Randomize Noise "), "Color", "Color"),
            splice(Match::Prefix("Randomize Noise "), "Value", "Value"),
        ];
        const TRANSPARENCY: &[Splice] = &[
            splice(Match::Exact("Masked Random Color"), "B", "Result"),
            splice(Match::Exact("Clip Mask"), "A", "Value"),
            splice(Match::Exact("Cell Alpha"), "A", "Value"),
        ];
        const LAYERS: &[Splice] = &[splice(
            Match::Exact(names::NODE_RANDOMIZE_LAYER),
            "A",
            "Vector",
        )];
        match self {
            Feature::EdgeBlur => EDGE_BLUR,
            Feature::EdgeWarp => EDGE_WARP,
            Feature::TextureWarp => TEXTURE_WARP,
            Feature::RandomCellColor => RANDOM_CELL,
            Feature::NoiseColor => NOISE,
            Feature::Transparency => TRANSPARENCY,
            Feature::LayerRandomization => LAYERS,
            Feature::Blending | Feature::UvProjection | Feature::TriPlanarProjection => &[],
        }
    }

    fn relinks(&self) -> &'static [Relink] {
        match self {
            Feature::UvProjection => &[(
                names::TRI_PLANAR_MAPPING,
                names::VECTOR,
                names::NODE_PATTERN_SCALE,
                "A",
            )],
            _ => &[],
        }
    }

    /// Boundary ports owned by the feature, at any nesting level.
    pub fn ports(&self) -> Vec<String> {
        let fixed: &[&str] = match self {
            Feature::EdgeBlur => &[names::EDGE_BLUR],
            Feature::EdgeWarp => &[names::EDGE_WARP, names::EDGE_WARP_SCALE, names::EDGE_WARP_DETAIL],
            Feature::TextureWarp => &[names::TEXTURE_WARP, names::TEXTURE_WARP_SCALE],
            Feature::RandomCellColor => &[
                names::LABEL_RANDOMIZE_CELLS,
                names::RANDOM_CELL_HUE,
                names::RANDOM_CELL_SATURATION,
                names::RANDOM_CELL_VALUE,
            ],
            Feature::NoiseColor => &[
                names::LABEL_RANDOMIZE_TEXTURES,
                names::HUE_NOISE,
                names::SATURATION_NOISE,
                names::VALUE_NOISE,
                names::COLOR_NOISE_SCALE,
                names::COLOR_NOISE_DETAIL,
                names::COLOR_NOISE_WARP,
            ],
            Feature::Transparency => &[names::LABEL_TRANSPARENCY, names::DENSITY, names::ALPHA_CLIP],
            Feature::LayerRandomization | Feature::UvProjection => &[],
            Feature::Blending => &[
                names::LABEL_BLENDING,
                names::BLENDING_SCALE,
                names::BLENDING_DETAIL,
                names::BLENDING_ROUGHNESS,
                names::BLENDING_BLUR,
            ],
            Feature::TriPlanarProjection => &[names::TRI_PLANAR_BLENDING],
        };
        let mut ports: Vec<String> = fixed.iter().map(|p| p.to_string()).collect();
        for channel in Channel::data_channels() {
            match self {
                Feature::RandomCellColor => ports.push(names::random_cell_port(channel.as_str())),
                Feature::NoiseColor => ports.extend(names::noise_ports(channel.as_str())),
                _ => {}
            }
        }
        ports
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Features a configuration leaves disabled, in pruning order.
pub fn disabled_features(config: &ScatterConfig) -> Vec<Feature> {
    let strategy = config.layering;
    let mut features = vec![match config.projection_method {
        ProjectionMethod::Uv => Feature::TriPlanarProjection,
        ProjectionMethod::TriPlanar => Feature::UvProjection,
    }];
    if !config.use_edge_blur {
        features.push(Feature::EdgeBlur);
    }
    if !config.use_edge_warp {
        features.push(Feature::EdgeWarp);
    }
    if strategy == LayeringStrategy::Coordinates {
        return features;
    }
    if !config.use_texture_warp {
        features.push(Feature::TextureWarp);
    }
    if !config.use_random_col || strategy == LayeringStrategy::Overlapping {
        features.push(Feature::RandomCellColor);
    }
    if !config.use_noise_col || strategy == LayeringStrategy::Overlapping {
        features.push(Feature::NoiseColor);
    }
    if !strategy.is_transparent() {
        features.push(Feature::Transparency);
    }
    if !strategy.keeps_layer_randomization() {
        features.push(Feature::LayerRandomization);
    }
    if strategy != LayeringStrategy::Blended {
        features.push(Feature::Blending);
    }
    features
}

/// Prunes every feature the configuration disables.
pub fn prune(graph: &mut Graph, config: &ScatterConfig) -> AssemblyResult<Vec<Feature>> {
    let features = disabled_features(config);
    for feature in &features {
        prune_feature(graph, *feature)?;
    }
    Ok(features)
}

/// Prunes one feature from `graph` and every nested group.
///
/// Returns the number of removed nodes and ports.
///
/// # Panics
///
/// Panics if the feature left nothing to remove, which means it was
/// already pruned or never built.
pub fn prune_feature(graph: &mut Graph, feature: Feature) -> AssemblyResult<usize> {
    let ports = feature.ports();
    let removed = prune_level(graph, feature, &ports)?;
    assert!(
        removed > 0,
        "feature '{}' has nothing to prune in '{}'",
        feature,
        graph.name
    );
    debug!("pruned {} ({} item(s)) from '{}'", feature, removed, graph.name);
    Ok(removed)
}

fn prune_level(graph: &mut Graph, feature: Feature, ports: &[String]) -> Result<usize, GraphError> {
    let mut removed = 0;

    for (from_node, from_socket, to_node, to_socket) in feature.relinks() {
        if let (Some(from), Some(to)) = (graph.find(from_node), graph.find(to_node)) {
            graph.connect(
                SocketRef::node(from, *from_socket),
                SocketRef::node(to, *to_socket),
            )?;
            debug!("relinked {}.{} -> {}.{}", from_node, from_socket, to_node, to_socket);
        }
    }

    for splice in feature.splices() {
        let targets: Vec<_> = graph
            .nodes()
            .filter(|n| {
                splice.node.matches(&n.name)
                    && n.input(splice.input).is_some()
                    && n.output(splice.output).is_some()
            })
            .map(|n| (n.id, n.name.clone()))
            .collect();
        for (id, name) in targets {
            graph.bypass(id, splice.input, splice.output)?;
            debug!("spliced around '{}' in '{}'", name, graph.name);
            removed += 1;
        }
    }

    if let Some(section) = feature.section() {
        removed += graph.remove_section(section).len();
    }

    for port in ports {
        for direction in [Direction::Input, Direction::Output] {
            if graph.has_port(direction, port) {
                graph.remove_port(direction, port)?;
                removed += 1;
            }
        }
    }

    for id in graph.groups() {
        removed += graph.edit_group(id, |inner| prune_level(inner, feature, ports))?;
    }
    Ok(removed)
}
