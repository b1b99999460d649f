//! Builtin template authoring.
//!
//! Every fragment the pipeline instantiates is authored here once, checked
//! against its declared port table, and registered in a
//! [`TemplateLibrary`]. Interfaces are declared from const row tables so
//! the graph interface and the registered schema can never drift apart.

mod base;
mod coordinates;
mod fragments;
mod source;

pub(crate) use base::{add_cell_stage, scale_port, CellStage};

use scatterkit_graph::node::{BlendMode, MathOp, VectorOp};
use scatterkit_graph::{
    Direction, Graph, GraphError, LayeringStrategy, NodeId, NodeKind, PortSchema, PortType,
    SocketRef, TemplateError, TemplateLibrary, Value,
};

use crate::error::{AssemblyError, AssemblyResult};
use crate::names;

/// One declared input: name, type, default. `Virtual` rows are labels.
pub(crate) type InputRow = (&'static str, PortType, Value);

/// One declared output: name, type.
pub(crate) type OutputRow = (&'static str, PortType);

/// Name of the master template for a layering strategy.
pub fn base_template_name(strategy: LayeringStrategy) -> String {
    format!("Scatter Base {}", strategy.as_str())
}

/// Declared boundary of a builtin template.
///
/// The same rows author the template and form the contract checked when
/// the template is instantiated.
#[derive(Debug, Clone)]
pub(crate) struct Interface {
    pub inputs: Vec<InputRow>,
    pub outputs: Vec<OutputRow>,
}

impl Interface {
    fn ports(&self) -> Vec<(&'static str, Direction)> {
        self.inputs
            .iter()
            .map(|(name, ..)| (*name, Direction::Input))
            .chain(self.outputs.iter().map(|(name, _)| (*name, Direction::Output)))
            .collect()
    }
}

/// Interface the builders expect of the named builtin template.
pub(crate) fn interface(name: &str) -> Option<Interface> {
    if let Some(strategy) = LayeringStrategy::all()
        .iter()
        .find(|s| base_template_name(**s) == name)
    {
        return Some(base::interface(*strategy));
    }
    match name {
        names::COORDINATES => Some(coordinates::interface(false)),
        names::COORDINATES_OVERLAP => Some(coordinates::interface(true)),
        names::SOURCE => Some(source::interface()),
        names::TRI_PLANAR_MAPPING => Some(fragments::tri_planar_mapping_interface()),
        names::RANDOMIZE_CELL_HSV => Some(fragments::randomize_cell_hsv_interface()),
        names::RANDOMIZE_CELL_VALUE => Some(fragments::randomize_cell_value_interface()),
        names::RANDOMIZE_NOISE_HSV => Some(fragments::randomize_noise_hsv_interface()),
        names::RANDOMIZE_NOISE_VALUE => Some(fragments::randomize_noise_value_interface()),
        names::NORMAL_CORRECTION_UV => Some(fragments::normal_correction_interface(false)),
        names::NORMAL_CORRECTION_TRI_PLANAR => Some(fragments::normal_correction_interface(true)),
        names::BLEND_NOISE => Some(fragments::blend_noise_interface()),
        _ => None,
    }
}

/// Adds the declared ports to `graph` and returns the matching schema.
pub(crate) fn declare(
    graph: &mut Graph,
    interface: &Interface,
) -> Result<Vec<PortSchema>, GraphError> {
    let Interface { inputs, outputs } = interface;
    let mut schema = Vec::with_capacity(inputs.len() + outputs.len());
    for (name, port_type, default) in inputs {
        graph.add_input(*name, *port_type, *default)?;
        schema.push(PortSchema::input(name, *port_type));
    }
    for (name, port_type) in outputs {
        graph.add_output(*name, *port_type)?;
        schema.push(PortSchema::output(name, *port_type));
    }
    Ok(schema)
}

/// Schema describing a graph's current interface.
pub(crate) fn schema_of(graph: &Graph) -> Vec<PortSchema> {
    [Direction::Input, Direction::Output]
        .into_iter()
        .flat_map(|direction| {
            graph.ports(direction).map(move |p| PortSchema {
                name: p.name.clone(),
                direction,
                port_type: p.port_type,
            })
        })
        .collect()
}

/// Terse node construction and wiring on top of [`Graph`].
pub(crate) trait Wiring {
    fn math(&mut self, name: &str, op: MathOp) -> NodeId;
    fn vector_math(&mut self, name: &str, op: VectorOp) -> NodeId;
    fn mix(&mut self, name: &str, blend: BlendMode) -> NodeId;
    fn reroute(&mut self, name: &str, port_type: PortType) -> NodeId;
    fn group_node(&mut self, name: &str, graph: Graph) -> NodeId;
    fn tag(&mut self, id: NodeId, section: &str);
    fn feed(&mut self, port: &str, node: NodeId, socket: &str) -> Result<(), GraphError>;
    fn expose(&mut self, node: NodeId, socket: &str, port: &str) -> Result<(), GraphError>;
    fn set(&mut self, node: NodeId, socket: &str, value: Value) -> Result<(), GraphError>;
}

impl Wiring for Graph {
    fn math(&mut self, name: &str, op: MathOp) -> NodeId {
        self.add_node(name, NodeKind::Math { op })
    }

    fn vector_math(&mut self, name: &str, op: VectorOp) -> NodeId {
        self.add_node(name, NodeKind::VectorMath { op })
    }

    fn mix(&mut self, name: &str, blend: BlendMode) -> NodeId {
        self.add_node(name, NodeKind::Mix { blend })
    }

    fn reroute(&mut self, name: &str, port_type: PortType) -> NodeId {
        self.add_node(name, NodeKind::Reroute { port_type })
    }

    fn group_node(&mut self, name: &str, graph: Graph) -> NodeId {
        self.add_node(
            name,
            NodeKind::Group {
                graph: Box::new(graph),
            },
        )
    }

    fn tag(&mut self, id: NodeId, section: &str) {
        if let Some(node) = self.node_mut(id) {
            node.section = Some(section.to_string());
        }
    }

    fn feed(&mut self, port: &str, node: NodeId, socket: &str) -> Result<(), GraphError> {
        self.connect(SocketRef::input(port), SocketRef::node(node, socket))
    }

    fn expose(&mut self, node: NodeId, socket: &str, port: &str) -> Result<(), GraphError> {
        self.connect(SocketRef::node(node, socket), SocketRef::output(port))
    }

    fn set(&mut self, node: NodeId, socket: &str, value: Value) -> Result<(), GraphError> {
        self.set_input_default(node, socket, value)
    }
}

/// Instantiates a template after checking it declares every port the
/// builders expect.
///
/// Fails with `MissingTemplate` when the library lacks `name` and with
/// `PortNotFound` when the template's schema misses an expected port.
pub(crate) fn instantiate(library: &TemplateLibrary, name: &str) -> AssemblyResult<Graph> {
    let template = library
        .get(name)
        .ok_or_else(|| AssemblyError::MissingTemplate(name.to_string()))?;
    if let Some(expected) = interface(name) {
        template.require_ports(&expected.ports())?;
    }
    Ok(template.instantiate())
}

fn builtin_error(err: GraphError) -> TemplateError {
    TemplateError::InvalidGraph {
        template: "builtin".to_string(),
        issues: vec![err.to_string()],
    }
}

fn register(
    library: &mut TemplateLibrary,
    built: Result<(Graph, Vec<PortSchema>), GraphError>,
) -> Result<(), TemplateError> {
    let (graph, schema) = built.map_err(builtin_error)?;
    library.register(graph, schema)?;
    Ok(())
}

/// Builds the library of every fragment and master template the
/// assembler uses.
pub fn builtin_library() -> Result<TemplateLibrary, TemplateError> {
    let mut library = TemplateLibrary::new();
    let (cells, cells_schema) = coordinates::coordinates(false).map_err(builtin_error)?;
    let (mapping, mapping_schema) = fragments::tri_planar_mapping().map_err(builtin_error)?;
    library.register(cells.clone(), cells_schema)?;
    library.register(mapping.clone(), mapping_schema)?;
    register(&mut library, coordinates::coordinates(true))?;
    register(&mut library, source::source())?;
    register(&mut library, fragments::randomize_cell_hsv())?;
    register(&mut library, fragments::randomize_cell_value())?;
    register(&mut library, fragments::randomize_noise_hsv())?;
    register(&mut library, fragments::randomize_noise_value())?;
    register(&mut library, fragments::normal_correction(false))?;
    register(&mut library, fragments::normal_correction(true))?;
    register(&mut library, fragments::blend_noise())?;
    for strategy in LayeringStrategy::all() {
        register(&mut library, base::base(*strategy, &cells, &mapping))?;
    }
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_library_registers_every_template() {
        let library = builtin_library().unwrap();
        for name in [
            names::COORDINATES,
            names::COORDINATES_OVERLAP,
            names::SOURCE,
            names::TRI_PLANAR_MAPPING,
            names::RANDOMIZE_CELL_HSV,
            names::RANDOMIZE_CELL_VALUE,
            names::RANDOMIZE_NOISE_HSV,
            names::RANDOMIZE_NOISE_VALUE,
            names::NORMAL_CORRECTION_UV,
            names::NORMAL_CORRECTION_TRI_PLANAR,
            names::BLEND_NOISE,
        ] {
            assert!(library.contains(name), "missing {}", name);
        }
        for strategy in LayeringStrategy::all() {
            assert!(library.contains(&base_template_name(*strategy)));
        }
        assert_eq!(library.len(), 11 + LayeringStrategy::all().len());
    }

    #[test]
    fn builtin_templates_are_valid_and_hash_stable() {
        let a = builtin_library().unwrap();
        let b = builtin_library().unwrap();
        for template in a.iter() {
            assert!(template.graph().validate().is_empty(), "{}", template.name());
            assert_eq!(b.get(template.name()).unwrap().hash(), template.hash());
        }
    }

    #[test]
    fn schema_of_matches_declared_rows() {
        let mut graph = Graph::new("Rows");
        let interface = Interface {
            inputs: vec![
                ("Vector", PortType::Vector, Value::Vector([0.0; 3])),
                ("Blending", PortType::Virtual, Value::None),
            ],
            outputs: vec![("Color", PortType::Color)],
        };
        let schema = declare(&mut graph, &interface).unwrap();
        assert_eq!(schema, schema_of(&graph));
    }

    #[test]
    fn every_builtin_template_has_an_interface() {
        let library = builtin_library().unwrap();
        for template in library.iter() {
            let expected = interface(template.name()).unwrap();
            assert_eq!(
                declare(&mut Graph::new("Copy"), &expected).unwrap(),
                template.schema(),
                "{}",
                template.name()
            );
        }
    }

    #[test]
    fn template_missing_an_expected_port_is_rejected() {
        let mut library = TemplateLibrary::new();
        let (mut graph, _) = source::source().unwrap();
        graph.remove_port(Direction::Input, names::DENSITY).unwrap();
        let schema = schema_of(&graph);
        library.register(graph, schema).unwrap();
        assert_eq!(
            instantiate(&library, names::SOURCE).unwrap_err(),
            AssemblyError::PortNotFound {
                graph: names::SOURCE.to_string(),
                port: names::DENSITY.to_string(),
            }
        );
    }

    #[test]
    fn missing_template_is_reported() {
        let library = TemplateLibrary::new();
        assert_eq!(
            instantiate(&library, names::SOURCE).unwrap_err(),
            AssemblyError::MissingTemplate(names::SOURCE.to_string())
        );
    }
}
