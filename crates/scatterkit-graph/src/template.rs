//! Content-addressed template library.
//!
//! Templates are reusable subgraph blueprints. They are registered once,
//! checked against their declared port schema at registration, and never
//! mutated afterwards. Every consumer gets an owned deep copy through
//! [`TemplateLibrary::instantiate`], so concurrent assemblies cannot observe
//! each other's edits.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, TemplateError};
use crate::graph::Graph;
use crate::hash::canonical_hash;
use crate::port::{Direction, PortType};

/// One declared boundary port of a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortSchema {
    /// Port name.
    pub name: String,
    /// Port direction.
    pub direction: Direction,
    /// Port type.
    pub port_type: PortType,
}

impl PortSchema {
    /// Declares an input port.
    pub fn input(name: &str, port_type: PortType) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::Input,
            port_type,
        }
    }

    /// Declares an output port.
    pub fn output(name: &str, port_type: PortType) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::Output,
            port_type,
        }
    }
}

/// A registered, immutable template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    hash: String,
    schema: Vec<PortSchema>,
    graph: Graph,
}

impl Template {
    /// Stable template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hex BLAKE3 hash of the canonical template graph.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Declared boundary ports.
    pub fn schema(&self) -> &[PortSchema] {
        &self.schema
    }

    /// Read-only view of the blueprint graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns an owned deep copy for mutation.
    pub fn instantiate(&self) -> Graph {
        self.graph.clone()
    }

    /// Fails with `PortNotFound` unless every `(name, direction)` is declared.
    pub fn require_ports(&self, ports: &[(&str, Direction)]) -> Result<(), GraphError> {
        for (name, direction) in ports {
            let declared = self
                .schema
                .iter()
                .any(|p| p.name == *name && p.direction == *direction);
            if !declared {
                return Err(GraphError::PortNotFound {
                    graph: self.name.clone(),
                    port: (*name).to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Read-only registry of templates keyed by name and content hash.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: BTreeMap<String, Template>,
    by_hash: BTreeMap<String, String>,
}

impl TemplateLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `graph` under its own name after checking it against `schema`.
    ///
    /// The graph's interface must match the schema exactly (same names,
    /// directions, and types) and the graph must pass structural validation.
    /// Returns the content hash.
    pub fn register(
        &mut self,
        graph: Graph,
        schema: Vec<PortSchema>,
    ) -> Result<String, TemplateError> {
        let name = graph.name.clone();
        if self.templates.contains_key(&name) {
            return Err(TemplateError::Duplicate(name));
        }

        for declared in &schema {
            match graph.port(declared.direction, &declared.name) {
                Some(port) if port.port_type == declared.port_type => {}
                _ => {
                    return Err(TemplateError::SchemaMismatch {
                        template: name,
                        port: declared.name.clone(),
                    })
                }
            }
        }
        for direction in [Direction::Input, Direction::Output] {
            for port in graph.ports(direction) {
                let declared = schema
                    .iter()
                    .any(|p| p.direction == direction && p.name == port.name);
                if !declared {
                    return Err(TemplateError::SchemaMismatch {
                        template: name,
                        port: port.name.clone(),
                    });
                }
            }
        }

        let issues = graph.validate();
        if !issues.is_empty() {
            return Err(TemplateError::InvalidGraph {
                template: name,
                issues: issues.iter().map(|i| i.to_string()).collect(),
            });
        }

        let hash = canonical_hash(&graph)?;
        debug!("registered template '{}' ({})", name, &hash[..16]);
        self.by_hash.insert(hash.clone(), name.clone());
        self.templates.insert(
            name.clone(),
            Template {
                name,
                hash: hash.clone(),
                schema,
                graph,
            },
        );
        Ok(hash)
    }

    /// Looks up a template by name.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Looks up a template by content hash.
    pub fn get_by_hash(&self, hash: &str) -> Option<&Template> {
        self.by_hash.get(hash).and_then(|name| self.templates.get(name))
    }

    /// Returns an owned deep copy of the named template.
    pub fn instantiate(&self, name: &str) -> Option<Graph> {
        self.get(name).map(Template::instantiate)
    }

    /// Whether a template is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// All templates in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
