//! Normal correction: rotates sampled tangent-space normals back by the
//! same per-cell rotation the coordinate field applied to the texture.

use log::debug;
use scatterkit_graph::{
    Channel, Direction, Graph, ProjectionMethod, SocketRef, TemplateLibrary,
};

use crate::assemble::ChannelHeads;
use crate::error::AssemblyResult;
use crate::names;
use crate::templates::{instantiate, Wiring};

/// Inserts the correction fragment on the `Normal` head.
///
/// `axes` feeds the tri-planar variant's blend weights. Without a
/// `Normal` head the `Normal Strength` control is removed instead.
/// Returns whether a correction node was added.
pub fn correct_normals(
    g: &mut Graph,
    library: &TemplateLibrary,
    heads: &mut ChannelHeads,
    cell_random: &SocketRef,
    projection: ProjectionMethod,
    axes: Option<SocketRef>,
) -> AssemblyResult<bool> {
    let Some(head) = heads.get_mut(&Channel::Normal) else {
        if g.has_port(Direction::Input, names::NORMAL_STRENGTH) {
            g.remove_port(Direction::Input, names::NORMAL_STRENGTH)?;
        }
        return Ok(false);
    };
    let template = match projection {
        ProjectionMethod::Uv => names::NORMAL_CORRECTION_UV,
        ProjectionMethod::TriPlanar => names::NORMAL_CORRECTION_TRI_PLANAR,
    };
    let node = g.group_node(names::NODE_NORMAL_CORRECTION, instantiate(library, template)?);
    g.connect(head.clone(), SocketRef::node(node, "Color"))?;
    g.connect(cell_random.clone(), SocketRef::node(node, names::RANDOM_COLOR))?;
    g.feed(names::TEXTURE_ROTATION, node, "Rotation")?;
    g.feed(names::RANDOM_ROTATION, node, "Random Rotation")?;
    g.feed(names::NORMAL_STRENGTH, node, "Strength")?;
    if let (ProjectionMethod::TriPlanar, Some(axes)) = (projection, axes) {
        g.connect(axes, SocketRef::node(node, "Axes"))?;
    }
    *head = SocketRef::node(node, "Normal");
    debug!("corrected normals with '{}'", template);
    Ok(true)
}
