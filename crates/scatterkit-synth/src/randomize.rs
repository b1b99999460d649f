//! Per-cell and per-texture color randomization stages.
//!
//! Both stages wrap every randomizable channel head in a randomize
//! fragment. Color channels get hue/saturation/value jitter driven by the
//! shared HSV controls; data channels get a value-only jitter with their
//! own control ports, inserted next to the shared ones. Controls no
//! populated channel reads are removed.

use log::debug;
use scatterkit_graph::{Direction, Graph, GraphError, PortType, SocketRef, TemplateLibrary, Value};

use crate::assemble::ChannelHeads;
use crate::error::AssemblyResult;
use crate::names;
use crate::rng::DeterministicRng;
use crate::templates::{instantiate, Wiring};

const CELL_HSV_CONTROLS: [(&str, &str); 3] = [
    (names::RANDOM_CELL_HUE, "Random Hue"),
    (names::RANDOM_CELL_SATURATION, "Random Saturation"),
    (names::RANDOM_CELL_VALUE, "Random Value"),
];

const NOISE_HSV_CONTROLS: [(&str, &str); 6] = [
    (names::HUE_NOISE, names::HUE_NOISE),
    (names::SATURATION_NOISE, names::SATURATION_NOISE),
    (names::VALUE_NOISE, names::VALUE_NOISE),
    (names::COLOR_NOISE_SCALE, "Noise Scale"),
    (names::COLOR_NOISE_DETAIL, "Noise Detail"),
    (names::COLOR_NOISE_WARP, "Noise Warp"),
];

const NOISE_VALUE_SOCKETS: [&str; 4] = [names::VALUE_NOISE, "Noise Scale", "Noise Detail", "Noise Warp"];
const NOISE_VALUE_DEFAULTS: [f32; 4] = [0.1, 5.0, 2.0, 0.0];

/// Adds a boundary input just before the `before` port, or last if
/// `before` does not exist. Existing ports are left untouched.
pub(crate) fn insert_input_before(
    g: &mut Graph,
    name: &str,
    port_type: PortType,
    default: Value,
    before: &str,
) -> Result<(), GraphError> {
    if g.has_port(Direction::Input, name) {
        return Ok(());
    }
    g.add_input(name, port_type, default)?;
    let names = g.port_names(Direction::Input);
    if let Some(index) = names.iter().position(|n| n == before) {
        g.move_port(Direction::Input, name, index)?;
    }
    Ok(())
}

fn remove_inputs(g: &mut Graph, ports: &[&str]) -> Result<(), GraphError> {
    for port in ports {
        if g.has_port(Direction::Input, port) {
            g.remove_port(Direction::Input, port)?;
        }
    }
    Ok(())
}

/// Wraps every randomizable head in a per-cell randomizer keyed on
/// `cell_random`.
pub fn randomize_cells(
    g: &mut Graph,
    library: &TemplateLibrary,
    heads: &mut ChannelHeads,
    cell_random: &SocketRef,
    rng: &mut DeterministicRng,
) -> AssemblyResult<()> {
    let mut has_color = false;
    for (channel, head) in heads.iter_mut() {
        if !channel.is_randomizable() {
            continue;
        }
        let name = format!("Randomize Cell {}", channel);
        let (node, socket) = if channel.is_color() {
            has_color = true;
            let node = g.group_node(&name, instantiate(library, names::RANDOMIZE_CELL_HSV)?);
            for (port, socket) in CELL_HSV_CONTROLS {
                g.feed(port, node, socket)?;
            }
            (node, "Color")
        } else {
            let port = names::random_cell_port(channel.as_str());
            insert_input_before(
                g,
                &port,
                PortType::Float,
                Value::Float(0.1),
                names::LABEL_RANDOMIZE_TEXTURES,
            )?;
            let node = g.group_node(&name, instantiate(library, names::RANDOMIZE_CELL_VALUE)?);
            g.feed(&port, node, "Random Value")?;
            (node, "Value")
        };
        g.tag(node, names::SECTION_RANDOMIZE_CELLS);
        g.connect(head.clone(), SocketRef::node(node, socket))?;
        g.connect(cell_random.clone(), SocketRef::node(node, names::RANDOM_COLOR))?;
        g.set(node, "Random Seed", Value::Float(rng.fragment_seed()))?;
        *head = SocketRef::node(node, socket);
        debug!("randomized cells of {}", channel);
    }
    if !has_color {
        remove_inputs(g, &CELL_HSV_CONTROLS.map(|(port, _)| port))?;
    }
    Ok(())
}

/// Wraps every randomizable head in a noise-driven randomizer sampling
/// the noise field at `vector`.
pub fn randomize_noise(
    g: &mut Graph,
    library: &TemplateLibrary,
    heads: &mut ChannelHeads,
    vector: &SocketRef,
) -> AssemblyResult<()> {
    let mut has_color = false;
    for (channel, head) in heads.iter_mut() {
        if !channel.is_randomizable() {
            continue;
        }
        let name = format!("Randomize Noise {}", channel);
        let (node, socket) = if channel.is_color() {
            has_color = true;
            let node = g.group_node(&name, instantiate(library, names::RANDOMIZE_NOISE_HSV)?);
            for (port, socket) in NOISE_HSV_CONTROLS {
                g.feed(port, node, socket)?;
            }
            (node, "Color")
        } else {
            let node = g.group_node(&name, instantiate(library, names::RANDOMIZE_NOISE_VALUE)?);
            let ports = names::noise_ports(channel.as_str());
            for ((port, socket), default) in ports.iter().zip(NOISE_VALUE_SOCKETS).zip(NOISE_VALUE_DEFAULTS) {
                insert_input_before(
                    g,
                    port,
                    PortType::Float,
                    Value::Float(default),
                    names::LABEL_TRANSPARENCY,
                )?;
                g.feed(port, node, socket)?;
            }
            (node, "Value")
        };
        g.tag(node, names::SECTION_RANDOMIZE_TEXTURES);
        g.connect(head.clone(), SocketRef::node(node, socket))?;
        g.connect(vector.clone(), SocketRef::node(node, names::VECTOR))?;
        *head = SocketRef::node(node, socket);
        debug!("randomized texture noise of {}", channel);
    }
    if !has_color {
        remove_inputs(g, &NOISE_HSV_CONTROLS.map(|(port, _)| port))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{base_template_name, builtin_library};
    use scatterkit_graph::{Channel, LayeringStrategy};

    fn base() -> (TemplateLibrary, Graph) {
        let library = builtin_library().unwrap();
        let g = library
            .instantiate(&base_template_name(LayeringStrategy::Simple))
            .unwrap();
        (library, g)
    }

    fn heads(g: &mut Graph, channels: &[Channel]) -> ChannelHeads {
        channels
            .iter()
            .map(|&c| {
                let id = g.reroute(&format!("{} Head", c), PortType::Color);
                (c, SocketRef::node(id, "Output"))
            })
            .collect()
    }

    #[test]
    fn data_channel_ports_sit_with_the_cell_controls() {
        let (library, mut g) = base();
        let mut heads = heads(&mut g, &[Channel::Albedo, Channel::Roughness]);
        let cells = g.find(names::NODE_SCATTER_COORDINATES).unwrap();
        let random = SocketRef::node(cells, names::RANDOM_COLOR);
        let mut rng = DeterministicRng::new(3);
        randomize_cells(&mut g, &library, &mut heads, &random, &mut rng).unwrap();

        let ports = g.port_names(Direction::Input);
        let at = |name: &str| ports.iter().position(|p| p == name).unwrap();
        assert_eq!(at("Random Cell Roughness") + 1, at(names::LABEL_RANDOMIZE_TEXTURES));
        assert_eq!(
            heads[&Channel::Roughness].node_id(),
            g.find("Randomize Cell Roughness")
        );
        assert_eq!(g.section(names::SECTION_RANDOMIZE_CELLS).len(), 2);
        assert!(g.validate().is_empty());
    }

    #[test]
    fn normal_and_displacement_are_skipped() {
        let (library, mut g) = base();
        let mut heads = heads(&mut g, &[Channel::Normal, Channel::Displacement]);
        let before = heads.clone();
        let cells = g.find(names::NODE_SCATTER_COORDINATES).unwrap();
        let random = SocketRef::node(cells, names::RANDOM_COLOR);
        let mut rng = DeterministicRng::new(3);
        randomize_cells(&mut g, &library, &mut heads, &random, &mut rng).unwrap();
        assert_eq!(heads, before);
        assert!(!g.has_port(Direction::Input, names::RANDOM_CELL_HUE));
    }

    #[test]
    fn noise_stage_adds_four_ports_per_data_channel() {
        let (library, mut g) = base();
        let mut heads = heads(&mut g, &[Channel::Metallic]);
        let scaled = g.find(names::NODE_SCALED_COORDINATES).unwrap();
        randomize_noise(&mut g, &library, &mut heads, &SocketRef::node(scaled, "Output")).unwrap();
        for port in names::noise_ports("Metallic") {
            assert!(g.has_port(Direction::Input, &port), "{}", port);
        }
        assert!(!g.has_port(Direction::Input, names::HUE_NOISE));
        assert!(g.has_port(Direction::Input, names::LABEL_RANDOMIZE_TEXTURES));
    }

    #[test]
    fn insert_before_missing_label_appends() {
        let mut g = Graph::new("Ports");
        g.add_input("A", PortType::Float, Value::Float(0.0)).unwrap();
        insert_input_before(&mut g, "B", PortType::Float, Value::Float(0.0), "Nope").unwrap();
        insert_input_before(&mut g, "C", PortType::Float, Value::Float(0.0), "B").unwrap();
        assert_eq!(g.port_names(Direction::Input), vec!["A", "C", "B"]);
    }
}
