//! Alpha-over-background compositing for transparent strategies.
//!
//! Every channel head is mixed over a per-channel background input:
//!
//! ```text
//! Background Coverage       = Alpha > 0
//! <Channel> Over Background = mix(Background, head, Background Coverage)
//! ```
//!
//! Background inputs are named after their channel (`Background` for
//! `Image`) so a stacked layer can feed its outputs straight into the next
//! layer's backgrounds.

use log::debug;
use scatterkit_graph::node::{BlendMode, MathOp};
use scatterkit_graph::{Channel, Direction, Graph, GraphError, SocketRef, Value};

use crate::assemble::ChannelHeads;
use crate::error::AssemblyResult;
use crate::templates::Wiring;

/// Label of the single-layer background stage.
pub const BACKGROUND: &str = "Background";

/// Exposes a background input per channel, typed and seeded after the
/// channel. Existing inputs are reused.
pub fn background_inputs<'a>(
    g: &mut Graph,
    channels: impl IntoIterator<Item = &'a Channel>,
) -> Result<ChannelHeads, GraphError> {
    let mut backgrounds = ChannelHeads::new();
    for channel in channels {
        let port = channel.background_port();
        if !g.has_port(Direction::Input, port) {
            let port_type = channel.port_type();
            g.add_input(port, port_type, channel.background_default().coerce(port_type))?;
        }
        backgrounds.insert(*channel, SocketRef::input(port));
    }
    Ok(backgrounds)
}

/// Mixes every foreground head over the matching background head where
/// `alpha` is positive. Heads without a background are left alone.
///
/// Nodes are named `<label> Coverage` and `<Channel> Over <label>`.
pub fn composite_over(
    g: &mut Graph,
    foreground: &mut ChannelHeads,
    background: &ChannelHeads,
    alpha: &SocketRef,
    label: &str,
) -> Result<(), GraphError> {
    let coverage = g.math(&format!("{} Coverage", label), MathOp::GreaterThan);
    g.connect(alpha.clone(), SocketRef::node(coverage, "A"))?;
    g.set(coverage, "B", Value::Float(0.0))?;

    for (channel, head) in foreground.iter_mut() {
        let Some(under) = background.get(channel) else {
            continue;
        };
        let over = g.mix(&format!("{} Over {}", channel, label), BlendMode::Mix);
        g.link(coverage, "Value", over, "Factor")?;
        g.connect(under.clone(), SocketRef::node(over, "A"))?;
        g.connect(head.clone(), SocketRef::node(over, "B"))?;
        *head = SocketRef::node(over, "Result");
    }
    Ok(())
}

/// Composites every head over a new background input using `alpha` as
/// coverage. Heads are advanced to the composited results.
pub fn composite_over_background(
    g: &mut Graph,
    heads: &mut ChannelHeads,
    alpha: &SocketRef,
) -> AssemblyResult<()> {
    let channels: Vec<Channel> = heads.keys().copied().collect();
    let backgrounds = background_inputs(g, &channels)?;
    composite_over(g, heads, &backgrounds, alpha, BACKGROUND)?;
    debug!("composited {} channel(s) over backgrounds", heads.len());
    Ok(())
}
