//! Shader wiring: scatters the image nodes selected in a material graph
//! and connects the result to the material's surface shader.
//!
//! The host graph is edited on a copy and replaced only once every step
//! succeeded, so a failed call leaves the material untouched.

use log::{debug, info};
use scatterkit_graph::{
    Channel, Direction, Graph, LayeringStrategy, NodeId, NodeKind, ScatterConfig, SocketRef,
    TextureDescriptor, Value,
};

use crate::assemble::Assembler;
use crate::error::{AssemblyError, AssemblyResult};
use crate::names;
use crate::templates::Wiring;

/// Surface shader kinds the adapter knows how to wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shader {
    Principled,
    Diffuse,
}

impl Shader {
    fn of(kind: &NodeKind) -> Option<Self> {
        match kind {
            NodeKind::PrincipledBsdf => Some(Shader::Principled),
            NodeKind::DiffuseBsdf => Some(Shader::Diffuse),
            _ => None,
        }
    }

    /// Shader input fed by a scatter output, if any.
    fn input_for(self, output: &str) -> Option<&'static str> {
        let channel: Channel = output.parse().ok()?;
        match (self, channel) {
            (Shader::Principled, Channel::Image | Channel::Albedo) => Some("Base Color"),
            (Shader::Principled, Channel::Metallic) => Some("Metallic"),
            (Shader::Principled, Channel::Roughness) => Some("Roughness"),
            (Shader::Principled, Channel::Emission) => Some("Emission"),
            (Shader::Principled, Channel::Alpha) => Some("Alpha"),
            (Shader::Diffuse, Channel::Image | Channel::Albedo) => Some("Color"),
            (Shader::Diffuse, Channel::Roughness) => Some("Roughness"),
            (_, Channel::Normal) => Some("Normal"),
            _ => None,
        }
    }
}

/// Options for [`scatter_into_material`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderWiring {
    /// Remove the consumed image nodes once wired.
    pub remove_images: bool,
}

impl Default for ShaderWiring {
    fn default() -> Self {
        Self {
            remove_images: true,
        }
    }
}

fn descriptor(host: &Graph, id: NodeId) -> Option<TextureDescriptor> {
    let image = host.node(id)?.kind.image()?;
    Some(TextureDescriptor {
        image: image.image.clone(),
        channel: Channel::Image,
        color_space: image.color_space,
        interpolation: image.interpolation,
        extension: image.extension,
        projection: image.projection,
    })
}

/// Shaders in the selection, or the shader feeding the material output.
fn target_shaders(host: &Graph, selection: &[NodeId]) -> Vec<(NodeId, Shader)> {
    let selected: Vec<_> = selection
        .iter()
        .filter_map(|&id| Some((id, Shader::of(&host.node(id)?.kind)?)))
        .collect();
    if !selected.is_empty() {
        return selected;
    }
    host.nodes()
        .filter(|n| matches!(n.kind, NodeKind::MaterialOutput))
        .filter_map(|out| host.link_into(&SocketRef::node(out.id, "Surface")))
        .filter_map(|link| {
            let id = link.from.node_id()?;
            Some((id, Shader::of(&host.node(id)?.kind)?))
        })
        .take(1)
        .collect()
}

/// Seeds transparent background inputs from the shader's own input
/// defaults so uncovered areas keep the material's look.
fn seed_backgrounds(
    host: &mut Graph,
    scatter: NodeId,
    shader: NodeId,
    kind: Shader,
    outputs: &[String],
) -> AssemblyResult<()> {
    for output in outputs {
        let Ok(channel) = output.parse::<Channel>() else {
            continue;
        };
        if matches!(channel, Channel::Normal | Channel::Bump) {
            continue;
        }
        let Some(input) = kind.input_for(output) else {
            continue;
        };
        let Some(value) = host.input_default(shader, input) else {
            continue;
        };
        let port = channel.background_port();
        let has_port = host
            .node(scatter)
            .is_some_and(|n| n.input(port).is_some());
        if has_port {
            host.set_input_default(scatter, port, value.coerce(channel.port_type()))?;
        }
    }
    Ok(())
}

fn wire_shader(
    host: &mut Graph,
    scatter: NodeId,
    shader: NodeId,
    kind: Shader,
    outputs: &[String],
    use_pbr: bool,
) -> AssemblyResult<()> {
    if !use_pbr {
        if let (Some(first), Some(input)) = (outputs.first(), kind.input_for(names::IMAGE)) {
            host.link(scatter, first, shader, input)?;
        }
        return Ok(());
    }
    for output in outputs {
        if let Some(input) = kind.input_for(output) {
            host.link(scatter, output, shader, input)?;
        }
    }
    let bump = Channel::Bump.as_str();
    if kind == Shader::Principled && outputs.iter().any(|o| o == bump) {
        let location = host
            .node(shader)
            .map(|n| [n.location[0] - 200.0, n.location[1] - 500.0])
            .unwrap_or_default();
        let name = host.unique_name("Bump");
        let node = host.add_node(&name, NodeKind::Bump);
        host.place(node, location);
        host.set(node, "Strength", Value::Float(0.5))?;
        host.set(node, "Distance", Value::Float(0.1))?;
        host.link(scatter, bump, node, "Height")?;
        let normal = Channel::Normal.as_str();
        if outputs.iter().any(|o| o == normal) {
            host.link(scatter, normal, node, "Normal")?;
        }
        host.link(node, "Normal", shader, "Normal")?;
        debug!("chained bump stage into '{}'", host.describe(&SocketRef::node(shader, "Normal")));
    }
    Ok(())
}

/// Scatters the image nodes in `selection` and wires the result into the
/// material graph `host`.
///
/// Consumers of the selected images, other than the wired shader, are
/// relinked to the first scatter output. The coordinates strategy instead
/// feeds its vector into every selected image and keeps them. Fails with
/// `MissingShader` when the result would be left unconnected.
pub fn scatter_into_material(
    host: &mut Graph,
    selection: &[NodeId],
    assembler: &Assembler<'_>,
    config: &ScatterConfig,
    options: &ShaderWiring,
) -> AssemblyResult<NodeId> {
    let images: Vec<NodeId> = selection
        .iter()
        .copied()
        .filter(|&id| host.node(id).is_some_and(|n| n.kind.image().is_some()))
        .collect();
    let textures: Vec<TextureDescriptor> =
        images.iter().filter_map(|&id| descriptor(host, id)).collect();
    let graph = assembler.assemble(&textures, config)?;

    let mut draft = host.clone();
    let name = draft.unique_name(&graph.name);
    let location = images
        .iter()
        .filter_map(|&id| draft.node(id).map(|n| n.location))
        .fold(None, |acc: Option<[f32; 2]>, l| match acc {
            Some(a) => Some([a[0].min(l[0]), a[1].max(l[1])]),
            None => Some(l),
        })
        .unwrap_or_default();
    let outputs = graph.port_names(Direction::Output);
    let scatter = draft.group_node(&name, graph);
    draft.place(scatter, location);

    if config.layering == LayeringStrategy::Coordinates {
        for &image in &images {
            draft.link(scatter, names::VECTOR, image, names::VECTOR)?;
        }
        *host = draft;
        info!("fed '{}' into {} image node(s)", name, images.len());
        return Ok(scatter);
    }

    let shaders = target_shaders(&draft, selection);
    let Some(first) = outputs.first() else {
        return Err(AssemblyError::NotAScatterGraph(name));
    };
    let mut relinked = 0;
    for &image in &images {
        let consumers: Vec<SocketRef> = draft
            .links()
            .iter()
            .filter(|l| l.from.node_id() == Some(image))
            .filter(|l| {
                l.to.node_id()
                    .and_then(|id| draft.node(id))
                    .map_or(true, |n| Shader::of(&n.kind).is_none())
            })
            .map(|l| l.to.clone())
            .collect();
        for to in consumers {
            draft.connect(SocketRef::node(scatter, first.as_str()), to)?;
            relinked += 1;
        }
    }
    if shaders.is_empty() && relinked == 0 {
        return Err(AssemblyError::MissingShader(host.name.clone()));
    }

    for &(shader, kind) in &shaders {
        wire_shader(&mut draft, scatter, shader, kind, &outputs, config.use_pbr)?;
        if config.layering.is_transparent() {
            seed_backgrounds(&mut draft, scatter, shader, kind, &outputs)?;
        }
    }
    if options.remove_images {
        for &image in &images {
            draft.remove_node(image)?;
        }
    }
    *host = draft;
    info!(
        "wired '{}' into {} shader(s), relinked {} consumer(s)",
        name,
        shaders.len(),
        relinked
    );
    Ok(scatter)
}
