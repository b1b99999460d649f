//! Graph assembly: classified textures plus a configuration in, one
//! instance graph out.
//!
//! Every strategy follows the same outline:
//!
//! 1. classify and group the textures by channel
//! 2. instantiate the strategy's master template
//! 3. add one source group per channel (per image for `blended`) fed by
//!    the cell stage
//! 4. run the randomization, normal correction and compositing stages on
//!    the channel heads, then expose one output per channel
//! 5. prune every disabled feature and apply the strategy defaults
//!
//! `layered` and `overlapping` reuse the single-layer steps for their
//! nested layers.

mod layered;
mod overlapping;

pub use layered::texture_sets;
pub use overlapping::OVERLAP_LAYER;

use std::collections::BTreeMap;

use log::{debug, info, warn};
use scatterkit_graph::hash::canonical_hash;
use scatterkit_graph::{
    Channel, Direction, Graph, GraphError, KeywordTable, LayeringStrategy, NodeId, ScatterConfig,
    SocketRef, TemplateLibrary, TextureDescriptor, Value,
};

use crate::alpha::composite_over_background;
use crate::blend::{noise_blend_groups, BlendGroup};
use crate::classify::assign_channels;
use crate::defaults::apply_defaults;
use crate::error::{AssemblyError, AssemblyResult};
use crate::names;
use crate::normals::correct_normals;
use crate::prune::prune;
use crate::randomize::{randomize_cells, randomize_noise};
use crate::rng::DeterministicRng;
use crate::source::{build_source, source_graph_name};
use crate::templates::{base_template_name, instantiate, Wiring};

/// Current producer of each channel's value while stages are chained.
pub type ChannelHeads = BTreeMap<Channel, SocketRef>;

/// Textures grouped by channel, in channel order.
pub type ChannelTextures = BTreeMap<Channel, Vec<TextureDescriptor>>;

/// Overlapping assemblies slow down noticeably past this many textures.
pub const OVERLAPPING_TEXTURE_LIMIT: usize = 4;

/// Upper bound of the per-layer random offset, in pattern units.
const LAYER_OFFSET_RANGE: f32 = 100.0;

/// Groups textures by their assigned channel, keeping input order within
/// each channel.
pub fn group_by_channel(textures: &[TextureDescriptor]) -> ChannelTextures {
    let mut channels = ChannelTextures::new();
    for tex in textures {
        channels.entry(tex.channel).or_default().push(tex.clone());
    }
    channels
}

/// Name of the instance graph produced for a strategy.
pub fn instance_name(strategy: LayeringStrategy) -> String {
    format!("Scatter {}", strategy.as_str())
}

// =========================================================================
// Assembler
// =========================================================================

/// Assembles scatter graphs from a template library and keyword table.
///
/// The assembler only reads both; every call works on fresh template
/// copies, so one assembler can serve any number of calls.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    library: &'a TemplateLibrary,
    keywords: &'a KeywordTable,
}

impl<'a> Assembler<'a> {
    pub fn new(library: &'a TemplateLibrary, keywords: &'a KeywordTable) -> Self {
        Self { library, keywords }
    }

    pub fn library(&self) -> &'a TemplateLibrary {
        self.library
    }

    pub fn keywords(&self) -> &'a KeywordTable {
        self.keywords
    }

    /// Assembles one instance graph.
    ///
    /// Fails with `EmptySelection` when no textures are given, except for
    /// the coordinates strategy which samples no image.
    pub fn assemble(
        &self,
        textures: &[TextureDescriptor],
        config: &ScatterConfig,
    ) -> AssemblyResult<Graph> {
        let strategy = config.layering;
        let mut use_pbr = config.use_pbr;
        if strategy == LayeringStrategy::Overlapping {
            if use_pbr {
                warn!("PBR auto-detect is not supported by the overlapping strategy; ignoring it");
                use_pbr = false;
            }
            if textures.len() > OVERLAPPING_TEXTURE_LIMIT {
                warn!(
                    "overlapping strategy with {} textures will be slow to evaluate",
                    textures.len()
                );
            }
        }
        if textures.is_empty() && strategy != LayeringStrategy::Coordinates {
            return Err(AssemblyError::EmptySelection);
        }

        let classified = assign_channels(textures, self.keywords, use_pbr);
        let channels = group_by_channel(&classified);
        debug!(
            "assembling {} with {} texture(s) over {} channel(s)",
            strategy,
            classified.len(),
            channels.len()
        );

        let mut rng = DeterministicRng::new(config.seed);
        let mut graph = match strategy {
            LayeringStrategy::Coordinates => assemble_coordinates(self.library, config)?,
            LayeringStrategy::Simple | LayeringStrategy::Blended | LayeringStrategy::SimpleAlpha => {
                assemble_layer(self.library, &channels, config, &mut rng)?
            }
            LayeringStrategy::Layered => layered::assemble_layered(self.library, &channels, config)?,
            LayeringStrategy::Overlapping => {
                overlapping::assemble_overlapping(self.library, &channels, config, &mut rng)?
            }
        };
        graph.name = instance_name(strategy);
        check(&graph)?;

        info!(
            "assembled {} graph: {} channel(s), {} node(s), hash {}",
            strategy,
            channels.len(),
            graph.node_count(),
            canonical_hash(&graph).unwrap_or_default()
        );
        Ok(graph)
    }
}

/// Assembles with a one-off [`Assembler`].
pub fn assemble(
    library: &TemplateLibrary,
    keywords: &KeywordTable,
    textures: &[TextureDescriptor],
    config: &ScatterConfig,
) -> AssemblyResult<Graph> {
    Assembler::new(library, keywords).assemble(textures, config)
}

fn check(graph: &Graph) -> AssemblyResult<()> {
    let issues = graph.validate();
    if issues.is_empty() {
        return Ok(());
    }
    Err(AssemblyError::InvalidGraph {
        graph: graph.name.clone(),
        issues: issues.iter().map(ToString::to_string).collect(),
    })
}

// =========================================================================
// Single-layer strategies
// =========================================================================

fn assemble_coordinates(library: &TemplateLibrary, config: &ScatterConfig) -> AssemblyResult<Graph> {
    let mut g = instantiate(library, &base_template_name(LayeringStrategy::Coordinates))?;
    prune(&mut g, config)?;
    apply_defaults(&mut g, LayeringStrategy::Coordinates)?;
    Ok(g)
}

/// One source group and the channel it serves.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceNode {
    pub channel: Channel,
    pub node: NodeId,
}

/// Adds the source groups for every channel, fed by the cell stage.
///
/// `blended` gets one group per image so each image is scattered on its
/// own and merged afterwards; every other strategy gets one per channel.
pub(crate) fn add_sources(
    g: &mut Graph,
    library: &TemplateLibrary,
    channels: &ChannelTextures,
    config: &ScatterConfig,
    cells: NodeId,
    warped: NodeId,
) -> AssemblyResult<Vec<SourceNode>> {
    let per_image = config.layering == LayeringStrategy::Blended;
    let mut sources = Vec::new();
    let mut row = 0.0;
    for (&channel, textures) in channels {
        let batches: Vec<(String, &[TextureDescriptor])> = if per_image {
            textures
                .iter()
                .enumerate()
                .map(|(i, tex)| {
                    (
                        format!("{} {}", source_graph_name(channel), i + 1),
                        std::slice::from_ref(tex),
                    )
                })
                .collect()
        } else {
            vec![(source_graph_name(channel), textures.as_slice())]
        };
        for (name, batch) in batches {
            let graph = build_source(library, channel, batch, config)?;
            let node = g.group_node(&name, graph);
            g.place(node, [600.0, row]);
            row -= 300.0;
            g.link(warped, "Output", node, names::VECTOR)?;
            g.link(cells, names::FRACTION, node, names::FRACTION)?;
            g.link(cells, names::RANDOM_COLOR, node, names::RANDOM_COLOR)?;
            for port in [names::DENSITY, names::ALPHA_CLIP] {
                g.feed(port, node, port)?;
            }
            sources.push(SourceNode { channel, node });
        }
    }
    debug!("added {} source group(s)", sources.len());
    Ok(sources)
}

/// Heads straight off the sources, one per channel.
pub(crate) fn source_heads(sources: &[SourceNode]) -> ChannelHeads {
    let mut heads = ChannelHeads::new();
    for source in sources {
        heads
            .entry(source.channel)
            .or_insert_with(|| SocketRef::node(source.node, source.channel.as_str()));
    }
    heads
}

/// Merges per-image sources with one noise blend node per assembly.
fn blend_sources(
    g: &mut Graph,
    library: &TemplateLibrary,
    sources: &[SourceNode],
) -> AssemblyResult<ChannelHeads> {
    let mut groups: Vec<BlendGroup> = Vec::new();
    for source in sources {
        let name = source.channel.as_str();
        let socket = SocketRef::node(source.node, name);
        match groups.iter_mut().find(|(group, _)| group == name) {
            Some((_, sockets)) => sockets.push(socket),
            None => groups.push((name.to_string(), vec![socket])),
        }
    }
    let pattern = g.require(names::NODE_PATTERN_SCALE)?;
    let node = noise_blend_groups(g, library, &groups, SocketRef::node(pattern, "Vector"))?;
    for (port, socket) in [
        (names::BLENDING_SCALE, "Noise Scale"),
        (names::BLENDING_DETAIL, "Noise Detail"),
        (names::BLENDING_ROUGHNESS, "Noise Roughness"),
        (names::BLENDING_BLUR, "Noise Blending"),
    ] {
        g.feed(port, node, socket)?;
    }
    Ok(groups
        .iter()
        .filter_map(|(name, _)| {
            let channel: Channel = name.parse().ok()?;
            Some((channel, SocketRef::node(node, name.as_str())))
        })
        .collect())
}

/// Adds an output per channel and connects its head.
pub(crate) fn expose_heads(g: &mut Graph, heads: &ChannelHeads) -> Result<(), GraphError> {
    for (channel, head) in heads {
        let port = channel.as_str();
        if !g.has_port(Direction::Output, port) {
            g.add_output(port, channel.port_type())?;
        }
        g.connect(head.clone(), SocketRef::output(port))?;
    }
    Ok(())
}

/// Drops an unpopulated `Image` output and moves `Random Color` last.
pub(crate) fn tidy_outputs(g: &mut Graph) -> Result<(), GraphError> {
    let image = SocketRef::output(names::IMAGE);
    if g.has_port(Direction::Output, names::IMAGE) && g.link_into(&image).is_none() {
        g.remove_port(Direction::Output, names::IMAGE)?;
    }
    if g.has_port(Direction::Output, names::RANDOM_COLOR) {
        let last = g.port_names(Direction::Output).len();
        g.move_port(Direction::Output, names::RANDOM_COLOR, last)?;
    }
    Ok(())
}

/// Widens the location jitter of tiled strategies so cells drift across
/// their neighbours.
fn widen_location_range(g: &mut Graph) -> Result<(), GraphError> {
    let cells = g.require(names::NODE_SCATTER_COORDINATES)?;
    g.edit_group(cells, |inner| {
        for axis in ["X", "Y"] {
            let range = inner.require(&format!("Location Range {}", axis))?;
            inner.set_input_default(range, "To Max", Value::Float(3.0))?;
        }
        Ok::<(), GraphError>(())
    })
}

/// Seeds the per-layer offset of strategies that stack layers.
pub(crate) fn randomize_layer_offset(
    g: &mut Graph,
    rng: &mut DeterministicRng,
) -> Result<(), GraphError> {
    let offset = g.require(names::NODE_LAYER_OFFSET)?;
    for axis in ["X", "Y"] {
        g.set(offset, axis, Value::Float(rng.signed() * LAYER_OFFSET_RANGE))?;
    }
    Ok(())
}

/// Builds one complete single-layer scatter graph.
///
/// Used directly by `simple`, `blended` and `simple_alpha`, and once per
/// texture set by `layered`.
pub(crate) fn assemble_layer(
    library: &TemplateLibrary,
    channels: &ChannelTextures,
    config: &ScatterConfig,
    rng: &mut DeterministicRng,
) -> AssemblyResult<Graph> {
    let strategy = config.layering;
    let mut g = instantiate(library, &base_template_name(strategy))?;
    let cells = g.require(names::NODE_SCATTER_COORDINATES)?;
    let warped = g.require(names::NODE_WARPED_COORDINATES)?;
    let cell_random = SocketRef::node(cells, names::RANDOM_COLOR);

    let sources = add_sources(&mut g, library, channels, config, cells, warped)?;
    let Some(first) = sources.first().copied() else {
        return Err(AssemblyError::EmptySelection);
    };
    let mut heads = if strategy == LayeringStrategy::Blended {
        blend_sources(&mut g, library, &sources)?
    } else {
        source_heads(&sources)
    };
    g.connect(
        SocketRef::node(first.node, names::RANDOM_COLOR),
        SocketRef::output(names::RANDOM_COLOR),
    )?;

    randomize_cells(&mut g, library, &mut heads, &cell_random, rng)?;
    let scaled = g.require(names::NODE_SCALED_COORDINATES)?;
    randomize_noise(&mut g, library, &mut heads, &SocketRef::node(scaled, "Output"))?;
    let mapping = g.require(names::TRI_PLANAR_MAPPING)?;
    correct_normals(
        &mut g,
        library,
        &mut heads,
        &cell_random,
        config.projection_method,
        Some(SocketRef::node(mapping, "Axes")),
    )?;
    if strategy.is_transparent() {
        let alpha = SocketRef::node(first.node, names::CELL_ALPHA);
        composite_over_background(&mut g, &mut heads, &alpha)?;
    }
    expose_heads(&mut g, &heads)?;

    if matches!(strategy, LayeringStrategy::Simple | LayeringStrategy::Blended) {
        widen_location_range(&mut g)?;
    }
    if strategy.keeps_layer_randomization() {
        randomize_layer_offset(&mut g, rng)?;
    }

    prune(&mut g, config)?;
    tidy_outputs(&mut g)?;
    apply_defaults(&mut g, strategy)?;
    Ok(g)
}
