//! Wiring bake results back into a scatter group.
//!
//! A channel bake leaves the procedural network in place: each baked image
//! becomes a `Baked <Channel>` output of the group and the host's consumers
//! move over to it. [`clear_bake`] undoes exactly that. A coordinates bake
//! instead freezes the cell coordinates of every cell stage into an image
//! and keeps sampling the source textures live.

use log::{debug, info};
use scatterkit_graph::{
    Channel, ColorSpace, Direction, Endpoint, Graph, NodeId, NodeKind, PortType, SocketRef,
    TextureDescriptor,
};

use crate::error::{AssemblyError, AssemblyResult};
use crate::host::{BakeJob, BakeRequest, BakeService, BakedChannel, UV_LAYER_NAME};
use crate::names;
use crate::unscatter::is_scatter_graph;

/// Prefix of the group outputs and image nodes a channel bake adds.
pub const BAKED_PREFIX: &str = "Baked ";

/// UV node feeding every baked image.
pub const BAKE_UVS: &str = "Bake UVs";

/// Temporary group output a coordinates bake renders through.
pub const BAKE_OUTPUT: &str = "Bake Output";

const BAKED_COLUMN: f32 = 3000.0;
const BAKED_ROW: f32 = -300.0;

/// Name of the output and image node holding the baked `channel`.
pub fn baked_name(channel: Channel) -> String {
    format!("{}{}", BAKED_PREFIX, channel)
}

/// Whether `id` is an image node fed by the bake UV layer.
pub fn is_baked_image(graph: &Graph, id: NodeId) -> bool {
    let Some(node) = graph.node(id) else {
        return false;
    };
    if node.kind.image().is_none() {
        return false;
    }
    graph
        .link_into(&SocketRef::node(id, "Vector"))
        .and_then(|link| match link.from.endpoint {
            Endpoint::Node(uv) => graph.node(uv),
            _ => None,
        })
        .is_some_and(|uv| matches!(&uv.kind, NodeKind::UvMap { layer } if layer == UV_LAYER_NAME))
}

fn scatter_name(host: &Graph, node: NodeId) -> AssemblyResult<String> {
    let scatter = host
        .node(node)
        .ok_or_else(|| AssemblyError::NotAScatterGraph(node.to_string()))?;
    match scatter.kind.group() {
        Some(graph) if is_scatter_graph(graph) => Ok(scatter.name.clone()),
        _ => Err(AssemblyError::NotAScatterGraph(scatter.name.clone())),
    }
}

fn bake_uvs(g: &mut Graph) -> NodeId {
    if let Some(id) = g.find(BAKE_UVS) {
        return id;
    }
    let id = g.add_node(
        BAKE_UVS,
        NodeKind::UvMap {
            layer: UV_LAYER_NAME.to_string(),
        },
    );
    g.place(id, [BAKED_COLUMN - 300.0, 0.0]);
    id
}

/// Points the image node `name` at `image`, creating it when missing.
fn baked_image(
    g: &mut Graph,
    name: &str,
    image: &str,
    channel: Channel,
    location: [f32; 2],
) -> AssemblyResult<NodeId> {
    let color_space = if channel.is_non_color() {
        ColorSpace::NonColor
    } else {
        ColorSpace::Srgb
    };
    let descriptor = TextureDescriptor::new(image)
        .with_channel(channel)
        .with_color_space(color_space);
    let kind = NodeKind::ImageTexture((&descriptor).into());
    let id = match g.find(name) {
        Some(id) => {
            if let Some(node) = g.node_mut(id) {
                node.kind = kind;
            }
            id
        }
        None => {
            let id = g.add_node(name, kind);
            g.place(id, location);
            id
        }
    };
    let uvs = bake_uvs(g);
    g.link(uvs, "UV", id, "Vector")?;
    Ok(id)
}

/// Relinks every host consumer of `from` on the scatter node to `to`.
fn relink_consumers(host: &mut Graph, node: NodeId, from: &str, to: &str) -> AssemblyResult<()> {
    let source = SocketRef::node(node, from);
    let consumers: Vec<SocketRef> = host.links_from(&source).map(|l| l.to.clone()).collect();
    for consumer in consumers {
        host.connect(SocketRef::node(node, to), consumer)?;
    }
    Ok(())
}

// ============================================================================
// Channel bakes
// ============================================================================

/// Adds one image node and one `Baked <Channel>` output per baked channel
/// to the scatter group `node`, then moves the host's consumers of each
/// procedural output onto its baked twin.
///
/// Baking a channel again repoints the existing image node.
pub fn attach_baked(host: &mut Graph, node: NodeId, baked: &[BakedChannel]) -> AssemblyResult<()> {
    let name = scatter_name(host, node)?;
    host.edit_group(node, |g| {
        for (row, bake) in baked.iter().enumerate() {
            let output = bake.channel.as_str();
            let port_type = g
                .port(Direction::Output, output)
                .map(|p| p.port_type)
                .ok_or_else(|| AssemblyError::PortNotFound {
                    graph: g.name.clone(),
                    port: output.to_string(),
                })?;
            let baked_output = baked_name(bake.channel);
            let location = [BAKED_COLUMN, BAKED_ROW * row as f32];
            let image = baked_image(g, &baked_output, &bake.image, bake.channel, location)?;
            if !g.has_port(Direction::Output, &baked_output) {
                g.add_output(baked_output.as_str(), port_type)?;
                let before_last = g.port_names(Direction::Output).len().saturating_sub(2);
                g.move_port(Direction::Output, &baked_output, before_last)?;
            }
            g.connect(
                SocketRef::node(image, "Color"),
                SocketRef::output(baked_output.as_str()),
            )?;
        }
        let displacement = baked_name(Channel::Displacement);
        if g.has_port(Direction::Output, &displacement) {
            let before_last = g.port_names(Direction::Output).len().saturating_sub(2);
            g.move_port(Direction::Output, &displacement, before_last)?;
        }
        Ok::<(), AssemblyError>(())
    })?;

    for bake in baked {
        relink_consumers(host, node, bake.channel.as_str(), &baked_name(bake.channel))?;
    }
    info!("attached {} baked channel(s) to '{}'", baked.len(), name);
    Ok(())
}

/// Removes every channel bake from the scatter group `node`.
///
/// Host consumers of each `Baked <Channel>` output move back to the
/// procedural output, then the baked outputs, their image nodes and the
/// bake UV node are removed. Returns the channels that were cleared.
pub fn clear_bake(host: &mut Graph, node: NodeId) -> AssemblyResult<Vec<Channel>> {
    let name = scatter_name(host, node)?;
    let group = host.group(node)?;
    let cleared: Vec<Channel> = group
        .ports(Direction::Output)
        .filter_map(|p| p.name.strip_prefix(BAKED_PREFIX))
        .filter_map(|rest| rest.parse::<Channel>().ok())
        .filter(|c| group.has_port(Direction::Output, c.as_str()))
        .collect();

    for channel in &cleared {
        relink_consumers(host, node, &baked_name(*channel), channel.as_str())?;
    }
    host.edit_group(node, |g| {
        for channel in &cleared {
            g.remove_port(Direction::Output, &baked_name(*channel))?;
        }
        let images: Vec<NodeId> = g
            .nodes()
            .filter(|n| n.name.starts_with(BAKED_PREFIX) && n.kind.image().is_some())
            .map(|n| n.id)
            .collect();
        for id in images {
            g.remove_node(id)?;
        }
        let uvs_used = g
            .find(BAKE_UVS)
            .is_some_and(|uvs| g.links_from(&SocketRef::node(uvs, "UV")).next().is_some());
        if let (Some(uvs), false) = (g.find(BAKE_UVS), uvs_used) {
            g.remove_node(uvs)?;
        }
        Ok::<(), AssemblyError>(())
    })?;
    debug!("cleared {} baked channel(s) from '{}'", cleared.len(), name);
    Ok(cleared)
}

// ============================================================================
// Coordinates bakes
// ============================================================================

fn coordinate_stages(group: &Graph) -> Vec<(NodeId, String)> {
    let dotted = format!("{}.", names::NODE_SCATTER_COORDINATES);
    group
        .nodes()
        .filter(|n| n.is_group())
        .filter(|n| n.name == names::NODE_SCATTER_COORDINATES || n.name.starts_with(&dotted))
        .map(|n| (n.id, n.name.clone()))
        .collect()
}

/// Bakes the cell coordinates of every cell stage in the scatter group
/// `node` and feeds each stage's consumers from the baked image.
///
/// Every stage is rendered through a temporary `Bake Output` port, which
/// is removed again whether or not the host succeeds. Returns the saved
/// image names in stage order.
pub fn bake_coordinates(
    host: &mut Graph,
    node: NodeId,
    job: &BakeJob,
    service: &mut dyn BakeService,
) -> AssemblyResult<Vec<String>> {
    let name = scatter_name(host, node)?;
    let stages = coordinate_stages(host.group(node)?);
    if stages.is_empty() {
        return Ok(Vec::new());
    }

    host.edit_group(node, |g| g.add_output(BAKE_OUTPUT, PortType::Color))?;
    let result = bake_stages(host, node, &name, &stages, job, service);
    host.edit_group(node, |g| g.remove_port(Direction::Output, BAKE_OUTPUT).map(|_| ()))?;
    let images = result?;
    info!("baked {} coordinate stage(s) of '{}'", images.len(), name);
    Ok(images)
}

fn bake_stages(
    host: &mut Graph,
    node: NodeId,
    name: &str,
    stages: &[(NodeId, String)],
    job: &BakeJob,
    service: &mut dyn BakeService,
) -> AssemblyResult<Vec<String>> {
    let mut images = Vec::with_capacity(stages.len());
    for (stage, stage_name) in stages {
        let vector = SocketRef::node(*stage, names::VECTOR);
        host.edit_group(node, |g| g.connect(vector.clone(), SocketRef::output(BAKE_OUTPUT)))?;

        let file_name = format!("{}_{}_vector", name, stage_name);
        let request = BakeRequest {
            graph: host.name.clone(),
            node: name.to_string(),
            socket: BAKE_OUTPUT.to_string(),
            output: Channel::Normal,
            file_name: file_name.clone(),
            width: job.width,
            height: job.height,
            uv_layer: UV_LAYER_NAME.to_string(),
        };
        debug!("baking coordinates of '{}' as '{}'", stage_name, file_name);
        let image = service.bake(&request)?;

        host.edit_group(node, |g| {
            let location = g
                .node(*stage)
                .map(|n| [n.location[0], n.location[1] - 150.0])
                .unwrap_or_default();
            let texture = baked_image(g, &file_name, &image, Channel::Normal, location)?;
            let consumers: Vec<SocketRef> = g
                .links_from(&vector)
                .map(|l| l.to.clone())
                .filter(|to| to != &SocketRef::output(BAKE_OUTPUT))
                .collect();
            for consumer in consumers {
                g.connect(SocketRef::node(texture, "Color"), consumer)?;
            }
            Ok::<(), AssemblyError>(())
        })?;
        images.push(image);
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble;
    use crate::host::{bake_channels, HostError};
    use crate::templates::builtin_library;
    use crate::unscatter::extract_images;
    use pretty_assertions::assert_eq;
    use scatterkit_graph::{CodedError, KeywordTable, Link, Preferences, ScatterConfig};
    use std::collections::HashSet;

    #[derive(Default)]
    struct SavingBaker {
        requests: Vec<BakeRequest>,
        fail: bool,
    }

    impl BakeService for SavingBaker {
        fn bake(&mut self, request: &BakeRequest) -> Result<String, HostError> {
            if self.fail {
                return Err(HostError::Unavailable("no renderer".to_string()));
            }
            self.requests.push(request.clone());
            Ok(format!("{}.exr", request.file_name))
        }
    }

    /// Host material with a PBR scatter node feeding a BSDF.
    fn material() -> (Graph, NodeId, NodeId) {
        let library = builtin_library().unwrap();
        let textures = [
            TextureDescriptor::new("rock_albedo.png"),
            TextureDescriptor::new("rock_rough.png"),
        ];
        let config = ScatterConfig {
            use_pbr: true,
            ..ScatterConfig::default()
        };
        let scatter = assemble(&library, &KeywordTable::default(), &textures, &config).unwrap();
        let mut host = Graph::new("Rock");
        let node = host.add_node("Scatter", NodeKind::Group { graph: Box::new(scatter) });
        let bsdf = host.add_node("Bsdf", NodeKind::PrincipledBsdf);
        host.link(node, "Albedo", bsdf, "Base Color").unwrap();
        host.link(node, "Roughness", bsdf, "Roughness").unwrap();
        (host, node, bsdf)
    }

    fn baked() -> Vec<BakedChannel> {
        vec![
            BakedChannel {
                channel: Channel::Albedo,
                image: "Rock_Albedo.png".to_string(),
            },
            BakedChannel {
                channel: Channel::Roughness,
                image: "Rock_Roughness.png".to_string(),
            },
        ]
    }

    fn link_set(graph: &Graph) -> HashSet<Link> {
        graph.links().iter().cloned().collect()
    }

    #[test]
    fn attach_adds_baked_outputs_before_random_color() {
        let (mut host, node, _) = material();
        attach_baked(&mut host, node, &baked()).unwrap();
        let group = host.group(node).unwrap();
        let outputs = group.port_names(Direction::Output);
        assert_eq!(outputs.last().map(String::as_str), Some(names::RANDOM_COLOR));
        assert!(outputs.contains(&"Baked Albedo".to_string()));
        assert!(outputs.contains(&"Baked Roughness".to_string()));

        let image = group.find("Baked Roughness").unwrap();
        let node_image = group.node(image).unwrap().kind.image().unwrap();
        assert_eq!(node_image.image, "Rock_Roughness.png");
        assert_eq!(node_image.color_space, ColorSpace::NonColor);
        assert!(is_baked_image(group, image));
        assert_eq!(
            group.link_into(&SocketRef::output("Baked Roughness")).unwrap().from,
            SocketRef::node(image, "Color")
        );
    }

    #[test]
    fn attach_moves_host_consumers_to_baked_outputs() {
        let (mut host, node, bsdf) = material();
        attach_baked(&mut host, node, &baked()).unwrap();
        assert_eq!(
            host.link_into(&SocketRef::node(bsdf, "Base Color")).unwrap().from,
            SocketRef::node(node, "Baked Albedo")
        );
        assert_eq!(
            host.link_into(&SocketRef::node(bsdf, "Roughness")).unwrap().from,
            SocketRef::node(node, "Baked Roughness")
        );
    }

    #[test]
    fn rebaking_repoints_the_existing_image() {
        let (mut host, node, _) = material();
        attach_baked(&mut host, node, &baked()).unwrap();
        let nodes_before = host.group(node).unwrap().node_count();
        let again = [BakedChannel {
            channel: Channel::Albedo,
            image: "Rock_Albedo_v2.png".to_string(),
        }];
        attach_baked(&mut host, node, &again).unwrap();
        let group = host.group(node).unwrap();
        assert_eq!(group.node_count(), nodes_before);
        let image = group.find("Baked Albedo").unwrap();
        assert_eq!(group.node(image).unwrap().kind.image().unwrap().image, "Rock_Albedo_v2.png");
    }

    #[test]
    fn clear_restores_the_unbaked_graph() {
        let (mut host, node, _) = material();
        let interface_before = host.group(node).unwrap().port_names(Direction::Output);
        let inner_links_before = link_set(host.group(node).unwrap());
        let host_links_before = link_set(&host);
        let nodes_before = host.group(node).unwrap().node_count();

        attach_baked(&mut host, node, &baked()).unwrap();
        let cleared = clear_bake(&mut host, node).unwrap();

        assert_eq!(cleared, vec![Channel::Albedo, Channel::Roughness]);
        let group = host.group(node).unwrap();
        assert_eq!(group.port_names(Direction::Output), interface_before);
        assert_eq!(link_set(group), inner_links_before);
        assert_eq!(group.node_count(), nodes_before);
        assert_eq!(link_set(&host), host_links_before);
    }

    #[test]
    fn clear_without_bake_changes_nothing() {
        let (mut host, node, _) = material();
        let before = host.clone();
        assert!(clear_bake(&mut host, node).unwrap().is_empty());
        assert_eq!(link_set(&host), link_set(&before));
    }

    #[test]
    fn baked_channels_attach_after_a_bake_walk() {
        let (mut host, node, _) = material();
        let mut baker = SavingBaker::default();
        let job = BakeJob::new("Rock", 256, 256);
        let baked = bake_channels(&host, node, &job, &Preferences::default(), &mut baker).unwrap();
        attach_baked(&mut host, node, &baked).unwrap();
        let group = host.group(node).unwrap();
        let image = group.find("Baked Albedo").unwrap();
        assert_eq!(group.node(image).unwrap().kind.image().unwrap().image, "Rock_Albedo.exr");
    }

    #[test]
    fn baked_images_are_not_extracted() {
        let (mut host, node, _) = material();
        let before = extract_images(host.group(node).unwrap());
        attach_baked(&mut host, node, &baked()).unwrap();
        assert_eq!(extract_images(host.group(node).unwrap()), before);
    }

    #[test]
    fn non_scatter_nodes_are_rejected() {
        let (mut host, _, bsdf) = material();
        let err = attach_baked(&mut host, bsdf, &baked()).unwrap_err();
        assert_eq!(err, AssemblyError::NotAScatterGraph("Bsdf".to_string()));
        let err = clear_bake(&mut host, bsdf).unwrap_err();
        assert_eq!(err, AssemblyError::NotAScatterGraph("Bsdf".to_string()));
    }

    #[test]
    fn coordinates_bake_feeds_the_cell_stage_from_an_image() {
        let (mut host, node, _) = material();
        let mut baker = SavingBaker::default();
        let images =
            bake_coordinates(&mut host, node, &BakeJob::new("Rock", 512, 512), &mut baker).unwrap();

        assert_eq!(images, vec!["Scatter_Scatter Coordinates_vector.exr".to_string()]);
        assert_eq!(baker.requests[0].socket, BAKE_OUTPUT);
        assert_eq!(baker.requests[0].output, Channel::Normal);

        let group = host.group(node).unwrap();
        assert!(!group.has_port(Direction::Output, BAKE_OUTPUT));
        let texture = group.find("Scatter_Scatter Coordinates_vector").unwrap();
        let reroute = group.find(names::NODE_CELL_COORDINATES).unwrap();
        assert_eq!(
            group.link_into(&SocketRef::node(reroute, "Input")).unwrap().from,
            SocketRef::node(texture, "Color")
        );
        assert_eq!(
            group.node(texture).unwrap().kind.image().unwrap().color_space,
            ColorSpace::NonColor
        );
    }

    #[test]
    fn failed_coordinates_bake_removes_the_temporary_output() {
        let (mut host, node, _) = material();
        let mut baker = SavingBaker {
            fail: true,
            ..SavingBaker::default()
        };
        let err = bake_coordinates(&mut host, node, &BakeJob::new("Rock", 64, 64), &mut baker)
            .unwrap_err();
        assert_eq!(err.code(), "SCATTER_010");
        assert!(!host.group(node).unwrap().has_port(Direction::Output, BAKE_OUTPUT));
    }
}
