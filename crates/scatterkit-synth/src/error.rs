//! Error types for graph synthesis.

use scatterkit_graph::{Channel, CodedError, GraphError};
use thiserror::Error;

use crate::host::HostError;

/// Result type for synthesis operations.
pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Errors that can occur while assembling or wiring a scatter graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// The template library lacks a required fragment.
    #[error("template library has no '{0}' template")]
    MissingTemplate(String),

    /// A layered texture set does not carry the same channels as the first set.
    #[error("texture set {set} has no '{channel}' texture")]
    ChannelMismatch {
        /// Channel missing from the set.
        channel: Channel,
        /// Zero-based index of the offending set.
        set: usize,
    },

    /// The noise blend compositor found nothing to merge.
    #[error("no output matches across the selected sources")]
    NoMatchingChannels,

    /// A template or builder contract was violated.
    #[error("graph '{graph}' has no port '{port}'")]
    PortNotFound {
        /// Graph being edited.
        graph: String,
        /// Missing port or socket.
        port: String,
    },

    /// Nothing usable was selected.
    #[error("selection contains no image nodes")]
    EmptySelection,

    /// Any other graph edit failure.
    #[error(transparent)]
    Graph(GraphError),

    /// The host material has no shader to wire into.
    #[error("material graph '{0}' has no surface shader")]
    MissingShader(String),

    /// A node was expected to hold a scatter graph.
    #[error("node '{0}' is not a scatter group")]
    NotAScatterGraph(String),

    /// An assembled graph failed structural validation.
    #[error("assembled graph '{graph}' is invalid: {}", issues.join("; "))]
    InvalidGraph {
        /// Assembled graph name.
        graph: String,
        /// Validation findings.
        issues: Vec<String>,
    },

    /// A host service failed while the graph was being edited.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl From<GraphError> for AssemblyError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::PortNotFound { graph, port } => AssemblyError::PortNotFound { graph, port },
            other => AssemblyError::Graph(other),
        }
    }
}

impl CodedError for AssemblyError {
    fn code(&self) -> &'static str {
        match self {
            AssemblyError::MissingTemplate(_) => "SCATTER_001",
            AssemblyError::ChannelMismatch { .. } => "SCATTER_002",
            AssemblyError::NoMatchingChannels => "SCATTER_003",
            AssemblyError::PortNotFound { .. } => "SCATTER_004",
            AssemblyError::EmptySelection => "SCATTER_005",
            AssemblyError::Graph(_) => "SCATTER_006",
            AssemblyError::MissingShader(_) => "SCATTER_007",
            AssemblyError::NotAScatterGraph(_) => "SCATTER_008",
            AssemblyError::InvalidGraph { .. } => "SCATTER_009",
            AssemblyError::Host(_) => "SCATTER_010",
        }
    }

    fn category(&self) -> &'static str {
        "assembly"
    }
}
