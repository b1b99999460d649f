//! Unscatter and rescatter.
//!
//! A scatter group is recognized by the source graphs nested inside it.
//! Unscattering replaces the group with plain image nodes for every image
//! its sources sample; rescattering assembles those images again with new
//! settings.

use log::{debug, info};
use scatterkit_graph::{
    Channel, Direction, Extension, Graph, ImageProjection, Interpolation, NodeId, NodeKind,
    ScatterConfig, TextureDescriptor,
};
use serde::{Deserialize, Serialize};

use crate::assemble::Assembler;
use crate::bake::is_baked_image;
use crate::error::{AssemblyError, AssemblyResult};
use crate::names;

/// Sampling applied to the image nodes an unscatter creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct UnscatterOptions {
    pub interpolation: Interpolation,
    pub projection: ImageProjection,
    pub extension: Extension,
}

impl Default for UnscatterOptions {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Linear,
            projection: ImageProjection::Flat,
            extension: Extension::Repeat,
        }
    }
}

/// Channel a source graph serves, parsed from its name.
fn source_channel(graph: &Graph) -> Option<Channel> {
    let rest = graph.name.strip_prefix(names::SOURCE)?.trim();
    rest.parse().ok()
}

/// Whether `graph` holds at least one source graph at any depth.
pub fn is_scatter_graph(graph: &Graph) -> bool {
    graph
        .nodes()
        .filter_map(|n| n.kind.group())
        .any(|inner| source_channel(inner).is_some() || is_scatter_graph(inner))
}

fn collect(graph: &Graph, channel: Channel, found: &mut Vec<TextureDescriptor>) {
    let channel = source_channel(graph).unwrap_or(channel);
    for node in graph.nodes() {
        match &node.kind {
            NodeKind::ImageTexture(image) => {
                if is_baked_image(graph, node.id) || found.iter().any(|t| t.image == image.image) {
                    continue;
                }
                found.push(TextureDescriptor {
                    image: image.image.clone(),
                    channel,
                    color_space: image.color_space,
                    interpolation: image.interpolation,
                    extension: image.extension,
                    projection: image.projection,
                });
            }
            NodeKind::Group { graph: inner } => collect(inner, channel, found),
            _ => {}
        }
    }
}

/// Every image sampled anywhere inside `graph`, first occurrence wins.
///
/// Images inside a source graph carry that source's channel. Bake results
/// are skipped.
pub fn extract_images(graph: &Graph) -> Vec<TextureDescriptor> {
    let mut found = Vec::new();
    collect(graph, Channel::Image, &mut found);
    found
}

/// Replaces the scatter group `node` in `host` with one image node per
/// extracted image, laid out in columns of four. Returns the new nodes.
pub fn unscatter(
    host: &mut Graph,
    node: NodeId,
    options: &UnscatterOptions,
) -> AssemblyResult<Vec<NodeId>> {
    let scatter = host
        .node(node)
        .ok_or_else(|| AssemblyError::NotAScatterGraph(node.to_string()))?;
    let Some(graph) = scatter.kind.group().filter(|g| is_scatter_graph(g)) else {
        return Err(AssemblyError::NotAScatterGraph(scatter.name.clone()));
    };
    let origin = scatter.location;
    let textures = extract_images(graph);

    let mut created = Vec::with_capacity(textures.len());
    for (index, tex) in textures.iter().enumerate() {
        let sampling = TextureDescriptor {
            interpolation: options.interpolation,
            projection: options.projection,
            extension: options.extension,
            ..tex.clone()
        };
        let name = host.unique_name(&tex.image);
        let id = host.add_node(&name, NodeKind::ImageTexture((&sampling).into()));
        let column = (index / 4) as f32;
        let row = (index % 4) as f32;
        host.place(id, [origin[0] + 250.0 * column, origin[1] - 285.0 * row]);
        created.push(id);
    }
    let removed = host.remove_node(node)?;
    info!(
        "unscattered '{}' into {} image node(s)",
        removed.name,
        created.len()
    );
    Ok(created)
}

/// Assembles the images of `graph` again under `config`.
///
/// Boundary inputs that survive with the same name and type keep the
/// value they had on `graph`.
pub fn rescatter(
    graph: &Graph,
    assembler: &Assembler<'_>,
    config: &ScatterConfig,
) -> AssemblyResult<Graph> {
    if !is_scatter_graph(graph) {
        return Err(AssemblyError::NotAScatterGraph(graph.name.clone()));
    }
    let textures = extract_images(graph);
    let mut fresh = assembler.assemble(&textures, config)?;
    let mut carried = 0;
    for port in graph.ports(Direction::Input) {
        let same = fresh
            .port(Direction::Input, &port.name)
            .is_some_and(|p| p.port_type == port.port_type);
        if same {
            fresh.set_port_default(&port.name, port.default)?;
            carried += 1;
        }
    }
    debug!("carried {} input default(s) into '{}'", carried, fresh.name);
    Ok(fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble;
    use crate::templates::builtin_library;
    use pretty_assertions::assert_eq;
    use scatterkit_graph::{KeywordTable, LayeringStrategy, Value};

    fn scattered(images: &[&str], config: &ScatterConfig) -> Graph {
        let library = builtin_library().unwrap();
        let textures: Vec<_> = images.iter().map(|i| TextureDescriptor::new(*i)).collect();
        assemble(&library, &KeywordTable::default(), &textures, config).unwrap()
    }

    #[test]
    fn blended_images_are_extracted_once_each() {
        let g = scattered(
            &["a.png", "b.png", "c.png"],
            &ScatterConfig::with_layering(LayeringStrategy::Blended),
        );
        let names: Vec<_> = extract_images(&g).into_iter().map(|t| t.image).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn overlapping_copies_are_deduplicated() {
        let config = ScatterConfig::with_layering(LayeringStrategy::Overlapping);
        let g = scattered(&["a.png", "b.png"], &config);
        assert_eq!(extract_images(&g).len(), 2);
    }

    #[test]
    fn channels_come_from_source_names() {
        let config = ScatterConfig {
            use_pbr: true,
            ..ScatterConfig::default()
        };
        let g = scattered(&["rock_albedo.png", "rock_normal.png"], &config);
        let channels: Vec<_> = extract_images(&g).into_iter().map(|t| t.channel).collect();
        assert!(channels.contains(&Channel::Albedo));
        assert!(channels.contains(&Channel::Normal));
    }

    #[test]
    fn unscatter_replaces_the_group() {
        let mut host = Graph::new("Material");
        let graph = scattered(&["a.png", "b.png"], &ScatterConfig::default());
        let node = host.add_node("Scatter", NodeKind::Group { graph: Box::new(graph) });
        host.place(node, [100.0, 50.0]);
        let created = unscatter(&mut host, node, &UnscatterOptions::default()).unwrap();
        assert_eq!(created.len(), 2);
        assert!(host.node(node).is_none());
        let second = host.node(created[1]).unwrap();
        assert_eq!(second.location, [100.0, 50.0 - 285.0]);
        assert_eq!(
            second.kind.image().unwrap().interpolation,
            Interpolation::Linear
        );
    }

    #[test]
    fn plain_nodes_are_not_scatter_groups() {
        let mut host = Graph::new("Material");
        let node = host.add_node("Bsdf", NodeKind::PrincipledBsdf);
        assert_eq!(
            unscatter(&mut host, node, &UnscatterOptions::default()).unwrap_err(),
            AssemblyError::NotAScatterGraph("Bsdf".to_string())
        );
    }

    #[test]
    fn rescatter_carries_surviving_defaults() {
        let mut g = scattered(&["a.png"], &ScatterConfig::default());
        g.set_port_default(names::RANDOM_ROTATION, Value::Float(0.3)).unwrap();
        g.set_port_default(names::CELL_SCALE, Value::Float(9.0)).unwrap();
        let library = builtin_library().unwrap();
        let keywords = KeywordTable::default();
        let assembler = Assembler::new(&library, &keywords);
        let config = ScatterConfig::with_layering(LayeringStrategy::SimpleAlpha);
        let fresh = rescatter(&g, &assembler, &config).unwrap();
        assert_eq!(
            fresh.port(Direction::Input, names::RANDOM_ROTATION).unwrap().default,
            Value::Float(0.3)
        );
        assert!(!fresh.has_port(Direction::Input, names::CELL_SCALE));
        assert!(fresh.has_port(Direction::Input, names::DENSITY));
    }
}
