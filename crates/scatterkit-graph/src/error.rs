//! Error types for graph editing and template registration.

use thiserror::Error;

use crate::port::PortType;

/// Common trait for coded scatterkit errors.
///
/// Every error surfaced to a caller carries a stable code (e.g.
/// `"GRAPH_003"`, `"SCATTER_001"`) and a category so that front ends can
/// report failures uniformly without matching on concrete types.
pub trait CodedError: std::error::Error {
    /// Stable error code for reporting.
    fn code(&self) -> &'static str;

    /// Human-readable message. Defaults to `Display`.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Error category such as "graph", "template", or "assembly".
    fn category(&self) -> &'static str;
}

/// Errors raised while editing a [`Graph`](crate::Graph).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A node name or id could not be resolved.
    #[error("graph '{graph}' has no node '{node}'")]
    NodeNotFound {
        /// Graph name.
        graph: String,
        /// Node name or id.
        node: String,
    },

    /// A boundary port or node socket could not be resolved.
    #[error("graph '{graph}' has no port '{port}'")]
    PortNotFound {
        /// Graph name.
        graph: String,
        /// Port name, `Node.socket` for node sockets.
        port: String,
    },

    /// A boundary port with this name and direction already exists.
    #[error("graph '{graph}' already declares port '{port}'")]
    DuplicatePort {
        /// Graph name.
        graph: String,
        /// Port name.
        port: String,
    },

    /// The link endpoints point the wrong way (e.g. into a group input).
    #[error("graph '{graph}': '{socket}' cannot be used as a link {role}")]
    DirectionMismatch {
        /// Graph name.
        graph: String,
        /// Offending socket.
        socket: String,
        /// "source" or "destination".
        role: &'static str,
    },

    /// The two sockets carry types that cannot be linked.
    #[error("cannot link {from} ({from_type}) to {to} ({to_type})")]
    IncompatibleTypes {
        /// Source socket.
        from: String,
        /// Source type.
        from_type: PortType,
        /// Destination socket.
        to: String,
        /// Destination type.
        to_type: PortType,
    },

    /// The link would close a cycle.
    #[error("graph '{graph}': linking {from} to {to} would create a cycle")]
    CycleDetected {
        /// Graph name.
        graph: String,
        /// Source socket.
        from: String,
        /// Destination socket.
        to: String,
    },

    /// A group operation targeted a node that is not a group.
    #[error("graph '{graph}': node '{node}' is not a group")]
    NotAGroup {
        /// Graph name.
        graph: String,
        /// Node name.
        node: String,
    },

    /// Another node already uses this name.
    #[error("graph '{graph}' already has a node named '{node}'")]
    DuplicateNode {
        /// Graph name.
        graph: String,
        /// Node name.
        node: String,
    },
}

impl CodedError for GraphError {
    fn code(&self) -> &'static str {
        match self {
            GraphError::NodeNotFound { .. } => "GRAPH_001",
            GraphError::PortNotFound { .. } => "GRAPH_002",
            GraphError::DuplicatePort { .. } => "GRAPH_003",
            GraphError::DirectionMismatch { .. } => "GRAPH_004",
            GraphError::IncompatibleTypes { .. } => "GRAPH_005",
            GraphError::CycleDetected { .. } => "GRAPH_006",
            GraphError::NotAGroup { .. } => "GRAPH_007",
            GraphError::DuplicateNode { .. } => "GRAPH_008",
        }
    }

    fn category(&self) -> &'static str {
        "graph"
    }
}

/// Errors raised when a template is registered in the library.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The declared schema names a port the graph does not expose.
    #[error("template '{template}' declares port '{port}' which its graph does not match")]
    SchemaMismatch {
        /// Template name.
        template: String,
        /// Port name.
        port: String,
    },

    /// The template graph fails structural validation.
    #[error("template '{template}' is structurally invalid: {}", issues.join("; "))]
    InvalidGraph {
        /// Template name.
        template: String,
        /// Rendered validation issues.
        issues: Vec<String>,
    },

    /// A template with this name is already registered.
    #[error("template '{0}' is already registered")]
    Duplicate(String),

    /// Serialization for content hashing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodedError for TemplateError {
    fn code(&self) -> &'static str {
        match self {
            TemplateError::SchemaMismatch { .. } => "TEMPLATE_001",
            TemplateError::InvalidGraph { .. } => "TEMPLATE_002",
            TemplateError::Duplicate(_) => "TEMPLATE_003",
            TemplateError::Json(_) => "TEMPLATE_004",
        }
    }

    fn category(&self) -> &'static str {
        "template"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_codes_are_stable() {
        let err = GraphError::PortNotFound {
            graph: "Scatter".to_string(),
            port: "Density".to_string(),
        };
        assert_eq!(err.code(), "GRAPH_002");
        assert_eq!(err.category(), "graph");
        assert!(err.message().contains("Density"));
    }

    #[test]
    fn duplicate_node_is_not_a_port_error() {
        let err = GraphError::DuplicateNode {
            graph: "Scatter".to_string(),
            node: "Cell Mix".to_string(),
        };
        assert_eq!(err.code(), "GRAPH_008");
        assert_eq!(err.to_string(), "graph 'Scatter' already has a node named 'Cell Mix'");
    }

    #[test]
    fn invalid_graph_lists_every_issue() {
        let err = TemplateError::InvalidGraph {
            template: "Scatter Source".to_string(),
            issues: vec!["first".to_string(), "second".to_string()],
        };
        let text = err.to_string();
        assert!(text.contains("first; second"));
        assert_eq!(err.code(), "TEMPLATE_002");
    }
}
