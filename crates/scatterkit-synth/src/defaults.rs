//! Per-strategy boundary input defaults.
//!
//! Applied once assembly and pruning are done, so only the inputs that
//! survived are touched.

use log::debug;
use scatterkit_graph::{Direction, Graph, GraphError, LayeringStrategy, Value};

use crate::names;

const COMMON: &[(&str, f32)] = &[
    (names::TRI_PLANAR_BLENDING, 0.15),
    (names::RANDOM_CELL_HUE, 0.1),
    (names::RANDOM_CELL_SATURATION, 0.1),
    (names::RANDOM_CELL_VALUE, 0.1),
    (names::RANDOM_ROTATION, 1.0),
    (names::RANDOM_SCALE, 0.25),
    (names::EDGE_WARP, 0.5),
    (names::EDGE_WARP_SCALE, 1.0),
    (names::EDGE_WARP_DETAIL, 3.0),
    (names::TEXTURE_WARP, 0.5),
    (names::EDGE_BLUR, 0.25),
];

const TILED: &[(&str, f32)] = &[
    (names::CELL_SCALE, 2.0),
    (names::RANDOM_CELL_SHAPE, 1.0),
    (names::RANDOM_LOCATION, 1.0),
];

const BLENDED: &[(&str, f32)] = &[
    (names::BLENDING_SCALE, 1.0),
    (names::BLENDING_DETAIL, 6.0),
    (names::BLENDING_ROUGHNESS, 0.75),
    (names::BLENDING_BLUR, 0.25),
    (names::CELL_SCALE, 2.0),
    (names::RANDOM_CELL_SHAPE, 1.0),
    (names::RANDOM_LOCATION, 1.0),
];

const SIMPLE_ALPHA: &[(&str, f32)] = &[
    (names::TEXTURE_SCALE, 2.0),
    (names::RANDOM_CELL_SHAPE, 1.0),
];

const LAYERED: &[(&str, f32)] = &[
    (names::TEXTURE_SCALE, 2.0),
    (names::RANDOM_CELL_SHAPE, 1.0),
    (names::EDGE_WARP, 0.0),
];

const OVERLAPPING: &[(&str, f32)] = &[
    (names::TEXTURE_SCALE, 2.0),
    (names::RANDOM_LOCATION, 0.5),
];

/// Input defaults for a strategy, later entries overriding earlier ones.
pub fn strategy_defaults(strategy: LayeringStrategy) -> Vec<(&'static str, f32)> {
    let specific = match strategy {
        LayeringStrategy::Coordinates | LayeringStrategy::Simple => TILED,
        LayeringStrategy::Blended => BLENDED,
        LayeringStrategy::SimpleAlpha => SIMPLE_ALPHA,
        LayeringStrategy::Layered => LAYERED,
        LayeringStrategy::Overlapping => OVERLAPPING,
    };
    COMMON.iter().chain(specific).copied().collect()
}

/// Sets the strategy defaults on every boundary input `graph` still has.
///
/// Returns the number of inputs updated.
pub fn apply_defaults(graph: &mut Graph, strategy: LayeringStrategy) -> Result<usize, GraphError> {
    let mut applied = 0;
    for (port, value) in strategy_defaults(strategy) {
        if graph.has_port(Direction::Input, port) {
            graph.set_port_default(port, Value::Float(value))?;
            applied += 1;
        }
    }
    debug!("applied {} {} default(s) to '{}'", applied, strategy, graph.name);
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scatterkit_graph::PortType;

    fn lookup(strategy: LayeringStrategy, port: &str) -> Option<f32> {
        strategy_defaults(strategy)
            .into_iter()
            .rev()
            .find(|(p, _)| *p == port)
            .map(|(_, v)| v)
    }

    #[test]
    fn layered_overrides_edge_warp() {
        assert_eq!(lookup(LayeringStrategy::Layered, names::EDGE_WARP), Some(0.0));
        assert_eq!(lookup(LayeringStrategy::Simple, names::EDGE_WARP), Some(0.5));
    }

    #[test]
    fn overlapping_halves_random_location() {
        assert_eq!(lookup(LayeringStrategy::Overlapping, names::RANDOM_LOCATION), Some(0.5));
        assert_eq!(lookup(LayeringStrategy::Overlapping, names::CELL_SCALE), None);
    }

    #[test]
    fn only_surviving_inputs_are_touched() {
        let mut g = Graph::new("Scatter");
        g.add_input(names::EDGE_WARP, PortType::Float, Value::Float(0.9)).unwrap();
        g.add_input(names::TEXTURE_SCALE, PortType::Float, Value::Float(7.0)).unwrap();
        let applied = apply_defaults(&mut g, LayeringStrategy::Layered).unwrap();
        assert_eq!(applied, 3);
        assert_eq!(g.port(Direction::Input, names::EDGE_WARP).unwrap().default, Value::Float(0.0));
        assert_eq!(g.port(Direction::Input, names::TEXTURE_SCALE).unwrap().default, Value::Float(2.0));
    }
}
