//! Typed node-graph model for scatter synthesis.
//!
//! This crate holds everything the synthesis engine manipulates:
//!
//! - [`Graph`], [`Node`], and [`Link`] with enforced link invariants
//!   (single incoming link per input, no cycles, type-compatible ends)
//! - [`Channel`] and [`TextureDescriptor`] describing source images
//! - [`ScatterConfig`] and [`KeywordTable`] driving assembly and classification
//! - [`TemplateLibrary`], a read-only, content-addressed registry that only
//!   ever hands out deep copies
//!
//! # Example
//!
//! ```
//! use scatterkit_graph::{Graph, NodeKind, PortType, SocketRef, Value};
//! use scatterkit_graph::node::MathOp;
//!
//! let mut graph = Graph::new("Threshold");
//! graph.add_input("Value", PortType::Float, Value::Float(0.0)).unwrap();
//! graph.add_output("Mask", PortType::Float).unwrap();
//! let gt = graph.add_node("Greater", NodeKind::Math { op: MathOp::GreaterThan });
//! graph.connect(SocketRef::input("Value"), SocketRef::node(gt, "A")).unwrap();
//! graph.connect(SocketRef::node(gt, "Value"), SocketRef::output("Mask")).unwrap();
//! assert!(graph.validate().is_empty());
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod graph;
pub mod hash;
pub mod image;
pub mod keywords;
pub mod node;
pub mod port;
pub mod template;

pub use channel::Channel;
pub use config::{LayeringStrategy, MixBy, ProjectionMethod, ScatterConfig};
pub use error::{CodedError, GraphError, TemplateError};
pub use graph::{Endpoint, Graph, GraphIssue, IssueKind, Link, SocketRef};
pub use image::{ColorSpace, Extension, ImageProjection, Interpolation, TextureDescriptor};
pub use keywords::{KeywordEntry, KeywordTable, Preferences};
pub use node::{Node, NodeId, NodeKind};
pub use port::{Direction, InterfacePort, PortType, Socket, Value};
pub use template::{PortSchema, Template, TemplateLibrary};
