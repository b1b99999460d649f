//! Graphs: nodes, links, and a boundary interface.
//!
//! A [`Graph`] owns all of its storage. Cloning a graph deep-copies every
//! node, link, and nested group, so an instance never aliases the template
//! it was created from.
//!
//! Link invariants enforced by [`Graph::connect`]:
//! - every input socket has at most one incoming link (a new link replaces the old one)
//! - output sockets may fan out
//! - the node-to-node links form a DAG

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::node::{Node, NodeId, NodeKind};
use crate::port::{Direction, InterfacePort, PortType, Socket, Value};

/// One end of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum Endpoint {
    /// The graph's input boundary; acts as a link source.
    GroupInput,
    /// The graph's output boundary; acts as a link destination.
    GroupOutput,
    /// A node inside the graph.
    Node(NodeId),
}

/// A socket on an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SocketRef {
    /// Owning endpoint.
    pub endpoint: Endpoint,
    /// Socket or boundary port name.
    pub socket: String,
}

impl SocketRef {
    /// A socket on a node.
    pub fn node(id: NodeId, socket: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::Node(id),
            socket: socket.into(),
        }
    }

    /// A boundary input port, used as a link source.
    pub fn input(port: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::GroupInput,
            socket: port.into(),
        }
    }

    /// A boundary output port, used as a link destination.
    pub fn output(port: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::GroupOutput,
            socket: port.into(),
        }
    }

    /// Node id, if this socket sits on a node.
    pub fn node_id(&self) -> Option<NodeId> {
        match self.endpoint {
            Endpoint::Node(id) => Some(id),
            _ => None,
        }
    }
}

/// A directed connection from an output socket to an input socket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Source (node output or boundary input).
    pub from: SocketRef,
    /// Destination (node input or boundary output).
    pub to: SocketRef,
}

/// Kind of structural problem found by [`Graph::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// A link references a node or socket that does not exist.
    DanglingLink,
    /// An input socket has more than one incoming link.
    DuplicateInputLink,
    /// A link connects incompatible port types.
    TypeMismatch,
    /// The node links contain a cycle.
    Cycle,
    /// A group node's sockets no longer mirror its graph's interface.
    StaleGroupSockets,
    /// Two boundary ports share a name and direction.
    DuplicatePort,
}

/// A structural problem found by [`Graph::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphIssue {
    /// Problem kind.
    pub kind: IssueKind,
    /// Graph path, nested groups joined with `/`.
    pub path: String,
    /// Human-readable detail.
    pub message: String,
}

impl std::fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A named, owned collection of nodes, links, and boundary ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name.
    pub name: String,
    interface: Vec<InterfacePort>,
    nodes: BTreeMap<NodeId, Node>,
    links: Vec<Link>,
    next_id: u32,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interface: Vec::new(),
            nodes: BTreeMap::new(),
            links: Vec::new(),
            next_id: 1,
        }
    }

    fn port_not_found(&self, port: impl Into<String>) -> GraphError {
        GraphError::PortNotFound {
            graph: self.name.clone(),
            port: port.into(),
        }
    }

    fn node_not_found(&self, node: impl Into<String>) -> GraphError {
        GraphError::NodeNotFound {
            graph: self.name.clone(),
            node: node.into(),
        }
    }

    // =========================================================================
    // Interface
    // =========================================================================

    /// Appends a boundary port.
    pub fn add_port(&mut self, port: InterfacePort) -> Result<(), GraphError> {
        if self.port(port.direction, &port.name).is_some() {
            return Err(GraphError::DuplicatePort {
                graph: self.name.clone(),
                port: port.name,
            });
        }
        self.interface.push(port);
        Ok(())
    }

    /// Appends an input port.
    pub fn add_input(
        &mut self,
        name: impl Into<String>,
        port_type: PortType,
        default: Value,
    ) -> Result<(), GraphError> {
        self.add_port(InterfacePort::input(name, port_type, default))
    }

    /// Appends an output port.
    pub fn add_output(
        &mut self,
        name: impl Into<String>,
        port_type: PortType,
    ) -> Result<(), GraphError> {
        self.add_port(InterfacePort::output(name, port_type))
    }

    /// Looks up a boundary port.
    pub fn port(&self, direction: Direction, name: &str) -> Option<&InterfacePort> {
        self.interface
            .iter()
            .find(|p| p.direction == direction && p.name == name)
    }

    /// Whether a boundary port exists.
    pub fn has_port(&self, direction: Direction, name: &str) -> bool {
        self.port(direction, name).is_some()
    }

    /// Boundary ports of one direction, in declaration order.
    pub fn ports(&self, direction: Direction) -> impl Iterator<Item = &InterfacePort> {
        self.interface
            .iter()
            .filter(move |p| p.direction == direction)
    }

    /// Names of the boundary ports of one direction, in declaration order.
    pub fn port_names(&self, direction: Direction) -> Vec<String> {
        self.ports(direction).map(|p| p.name.clone()).collect()
    }

    /// Removes a boundary port and every link attached to it.
    pub fn remove_port(
        &mut self,
        direction: Direction,
        name: &str,
    ) -> Result<InterfacePort, GraphError> {
        let idx = self
            .interface
            .iter()
            .position(|p| p.direction == direction && p.name == name)
            .ok_or_else(|| self.port_not_found(name))?;
        let boundary = match direction {
            Direction::Input => SocketRef::input(name),
            Direction::Output => SocketRef::output(name),
        };
        self.links.retain(|l| l.from != boundary && l.to != boundary);
        Ok(self.interface.remove(idx))
    }

    /// Renames a boundary port, keeping its links.
    pub fn rename_port(
        &mut self,
        direction: Direction,
        name: &str,
        new_name: &str,
    ) -> Result<(), GraphError> {
        if name == new_name {
            return Ok(());
        }
        if self.has_port(direction, new_name) {
            return Err(GraphError::DuplicatePort {
                graph: self.name.clone(),
                port: new_name.to_string(),
            });
        }
        let graph_name = self.name.clone();
        let port = self
            .interface
            .iter_mut()
            .find(|p| p.direction == direction && p.name == name)
            .ok_or_else(|| GraphError::PortNotFound {
                graph: graph_name,
                port: name.to_string(),
            })?;
        port.name = new_name.to_string();
        let endpoint = match direction {
            Direction::Input => Endpoint::GroupInput,
            Direction::Output => Endpoint::GroupOutput,
        };
        for link in &mut self.links {
            for end in [&mut link.from, &mut link.to] {
                if end.endpoint == endpoint && end.socket == name {
                    end.socket = new_name.to_string();
                }
            }
        }
        Ok(())
    }

    /// Moves a boundary port to `index` among the ports of its direction.
    pub fn move_port(
        &mut self,
        direction: Direction,
        name: &str,
        index: usize,
    ) -> Result<(), GraphError> {
        let from = self
            .interface
            .iter()
            .position(|p| p.direction == direction && p.name == name)
            .ok_or_else(|| self.port_not_found(name))?;
        let port = self.interface.remove(from);
        let same_dir: Vec<usize> = self
            .interface
            .iter()
            .enumerate()
            .filter(|(_, p)| p.direction == direction)
            .map(|(i, _)| i)
            .collect();
        let at = match same_dir.get(index) {
            Some(&i) => i,
            None => self.interface.len(),
        };
        self.interface.insert(at, port);
        Ok(())
    }

    /// Sets the default value of a boundary input, coerced to its type.
    pub fn set_port_default(&mut self, name: &str, value: Value) -> Result<(), GraphError> {
        let graph_name = self.name.clone();
        let port = self
            .interface
            .iter_mut()
            .find(|p| p.direction == Direction::Input && p.name == name)
            .ok_or_else(|| GraphError::PortNotFound {
                graph: graph_name,
                port: name.to_string(),
            })?;
        port.default = value.coerce(port.port_type);
        Ok(())
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Returns `base` if no node uses it, otherwise `base.001`, `base.002`, ...
    pub fn unique_name(&self, base: &str) -> String {
        if self.find(base).is_none() {
            return base.to_string();
        }
        (1..)
            .map(|i| format!("{}.{:03}", base, i))
            .find(|candidate| self.find(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    /// Adds a node, uniquifying its name.
    pub fn add_node(&mut self, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let name = self.unique_name(name);
        self.nodes.insert(id, Node::new(id, name, kind));
        id
    }

    /// Adds a node tagged with a feature section.
    pub fn add_node_in(&mut self, section: &str, name: &str, kind: NodeKind) -> NodeId {
        let id = self.add_node(name, kind);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.section = Some(section.to_string());
        }
        id
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Looks up a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Finds a node by name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.values().find(|n| n.name == name).map(|n| n.id)
    }

    /// Finds a node by name or fails with `NodeNotFound`.
    pub fn require(&self, name: &str) -> Result<NodeId, GraphError> {
        self.find(name).ok_or_else(|| self.node_not_found(name))
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ids of the nodes tagged with `section`.
    pub fn section(&self, section: &str) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.section.as_deref() == Some(section))
            .map(|n| n.id)
            .collect()
    }

    /// Renames a node, failing if the name is taken by another node.
    pub fn rename_node(&mut self, id: NodeId, name: &str) -> Result<(), GraphError> {
        if let Some(other) = self.find(name) {
            if other != id {
                return Err(GraphError::DuplicateNode {
                    graph: self.name.clone(),
                    node: name.to_string(),
                });
            }
        }
        let missing = self.node_not_found(id.to_string());
        let node = self.nodes.get_mut(&id).ok_or(missing)?;
        node.name = name.to_string();
        Ok(())
    }

    /// Sets the default value of a node input, coerced to the socket type.
    pub fn set_input_default(
        &mut self,
        id: NodeId,
        socket: &str,
        value: Value,
    ) -> Result<(), GraphError> {
        let graph_name = self.name.clone();
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| GraphError::NodeNotFound {
                graph: graph_name.clone(),
                node: id.to_string(),
            })?;
        let node_name = node.name.clone();
        let input = node
            .input_mut(socket)
            .ok_or_else(|| GraphError::PortNotFound {
                graph: graph_name,
                port: format!("{}.{}", node_name, socket),
            })?;
        input.default = value.coerce(input.port_type);
        Ok(())
    }

    /// Reads the default value of a node input.
    pub fn input_default(&self, id: NodeId, socket: &str) -> Option<Value> {
        self.node(id)?.input(socket).map(|s| s.default)
    }

    /// Sets the cosmetic layout position of a node.
    pub fn place(&mut self, id: NodeId, location: [f32; 2]) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.location = location;
        }
    }

    /// Removes a node together with every link attached to it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        let node = self
            .nodes
            .remove(&id)
            .ok_or_else(|| self.node_not_found(id.to_string()))?;
        let endpoint = Endpoint::Node(id);
        self.links
            .retain(|l| l.from.endpoint != endpoint && l.to.endpoint != endpoint);
        Ok(node)
    }

    /// Removes every node tagged with `section`.
    pub fn remove_section(&mut self, section: &str) -> Vec<Node> {
        self.section(section)
            .into_iter()
            .filter_map(|id| self.remove_node(id).ok())
            .collect()
    }

    // =========================================================================
    // Links
    // =========================================================================

    /// All links.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Human-readable form of a socket reference.
    pub fn describe(&self, socket: &SocketRef) -> String {
        match socket.endpoint {
            Endpoint::GroupInput => format!("Group Input.{}", socket.socket),
            Endpoint::GroupOutput => format!("Group Output.{}", socket.socket),
            Endpoint::Node(id) => match self.nodes.get(&id) {
                Some(node) => format!("{}.{}", node.name, socket.socket),
                None => format!("{}.{}", id, socket.socket),
            },
        }
    }

    /// Type of a socket used as a link source.
    pub fn source_type(&self, from: &SocketRef) -> Result<PortType, GraphError> {
        match from.endpoint {
            Endpoint::GroupInput => self
                .port(Direction::Input, &from.socket)
                .map(|p| p.port_type)
                .ok_or_else(|| self.port_not_found(&from.socket)),
            Endpoint::GroupOutput => Err(GraphError::DirectionMismatch {
                graph: self.name.clone(),
                socket: self.describe(from),
                role: "source",
            }),
            Endpoint::Node(id) => {
                let node = self
                    .nodes
                    .get(&id)
                    .ok_or_else(|| self.node_not_found(id.to_string()))?;
                node.output(&from.socket)
                    .map(|s| s.port_type)
                    .ok_or_else(|| self.port_not_found(self.describe(from)))
            }
        }
    }

    /// Type of a socket used as a link destination.
    pub fn destination_type(&self, to: &SocketRef) -> Result<PortType, GraphError> {
        match to.endpoint {
            Endpoint::GroupOutput => self
                .port(Direction::Output, &to.socket)
                .map(|p| p.port_type)
                .ok_or_else(|| self.port_not_found(&to.socket)),
            Endpoint::GroupInput => Err(GraphError::DirectionMismatch {
                graph: self.name.clone(),
                socket: self.describe(to),
                role: "destination",
            }),
            Endpoint::Node(id) => {
                let node = self
                    .nodes
                    .get(&id)
                    .ok_or_else(|| self.node_not_found(id.to_string()))?;
                node.input(&to.socket)
                    .map(|s| s.port_type)
                    .ok_or_else(|| self.port_not_found(self.describe(to)))
            }
        }
    }

    /// Whether `target` is reachable from `start` along node links.
    fn reaches(&self, start: NodeId, target: NodeId) -> bool {
        let mut stack = vec![start];
        let mut seen = BTreeSet::new();
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            for link in &self.links {
                if link.from.endpoint == Endpoint::Node(current) {
                    if let Endpoint::Node(next) = link.to.endpoint {
                        stack.push(next);
                    }
                }
            }
        }
        false
    }

    /// Links `from` into `to`, replacing any link already feeding `to`.
    pub fn connect(&mut self, from: SocketRef, to: SocketRef) -> Result<(), GraphError> {
        let from_type = self.source_type(&from)?;
        let to_type = self.destination_type(&to)?;
        if !from_type.can_link_to(to_type) {
            return Err(GraphError::IncompatibleTypes {
                from: self.describe(&from),
                from_type,
                to: self.describe(&to),
                to_type,
            });
        }
        if let (Endpoint::Node(a), Endpoint::Node(b)) = (from.endpoint, to.endpoint) {
            if self.reaches(b, a) {
                return Err(GraphError::CycleDetected {
                    graph: self.name.clone(),
                    from: self.describe(&from),
                    to: self.describe(&to),
                });
            }
        }
        self.links.retain(|l| l.to != to);
        self.links.push(Link { from, to });
        Ok(())
    }

    /// Shorthand for linking two node sockets.
    pub fn link(
        &mut self,
        from: NodeId,
        from_socket: &str,
        to: NodeId,
        to_socket: &str,
    ) -> Result<(), GraphError> {
        self.connect(
            SocketRef::node(from, from_socket),
            SocketRef::node(to, to_socket),
        )
    }

    /// Removes the link feeding `to`, if any.
    pub fn disconnect(&mut self, to: &SocketRef) -> Option<Link> {
        let idx = self.links.iter().position(|l| &l.to == to)?;
        Some(self.links.remove(idx))
    }

    /// The link feeding `to`, if any.
    pub fn link_into(&self, to: &SocketRef) -> Option<&Link> {
        self.links.iter().find(|l| &l.to == to)
    }

    /// All links leaving `from`.
    pub fn links_from<'a>(&'a self, from: &'a SocketRef) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| &l.from == from)
    }

    /// Removes a node after re-wiring its `input` predecessor directly into
    /// every consumer of its `output`.
    ///
    /// Splicing happens before removal, so no consumer is ever left linked
    /// to a missing node. Consumers are disconnected if `input` has no link.
    pub fn bypass(&mut self, id: NodeId, input: &str, output: &str) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get(&id)
            .ok_or_else(|| self.node_not_found(id.to_string()))?;
        if node.input(input).is_none() {
            return Err(self.port_not_found(format!("{}.{}", node.name, input)));
        }
        if node.output(output).is_none() {
            return Err(self.port_not_found(format!("{}.{}", node.name, output)));
        }
        let predecessor = self
            .link_into(&SocketRef::node(id, input))
            .map(|l| l.from.clone());
        let out = SocketRef::node(id, output);
        let consumers: Vec<SocketRef> = self.links_from(&out).map(|l| l.to.clone()).collect();
        for consumer in consumers {
            match &predecessor {
                Some(pred) => self.connect(pred.clone(), consumer)?,
                None => {
                    self.disconnect(&consumer);
                }
            }
        }
        self.remove_node(id)?;
        Ok(())
    }

    // =========================================================================
    // Nested groups
    // =========================================================================

    /// Group node ids, in id order.
    pub fn groups(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.is_group())
            .map(|n| n.id)
            .collect()
    }

    /// Nested graph of a group node.
    pub fn group(&self, id: NodeId) -> Result<&Graph, GraphError> {
        let node = self
            .nodes
            .get(&id)
            .ok_or_else(|| self.node_not_found(id.to_string()))?;
        node.kind.group().ok_or_else(|| GraphError::NotAGroup {
            graph: self.name.clone(),
            node: node.name.clone(),
        })
    }

    /// Edits a nested graph, then re-syncs the group node's sockets.
    pub fn edit_group<T, E>(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut Graph) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<GraphError>,
    {
        let graph_name = self.name.clone();
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| GraphError::NodeNotFound {
                graph: graph_name.clone(),
                node: id.to_string(),
            })?;
        let node_name = node.name.clone();
        let inner = node.kind.group_mut().ok_or(GraphError::NotAGroup {
            graph: graph_name,
            node: node_name,
        })?;
        let result = edit(inner)?;
        self.sync_group(id)?;
        Ok(result)
    }

    /// Rebuilds a group node's sockets from its nested interface.
    ///
    /// Input defaults survive for sockets whose name and type are
    /// unchanged. Links to sockets that no longer exist are dropped.
    pub fn sync_group(&mut self, id: NodeId) -> Result<(), GraphError> {
        let graph_name = self.name.clone();
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| GraphError::NodeNotFound {
                graph: graph_name.clone(),
                node: id.to_string(),
            })?;
        if !node.is_group() {
            return Err(GraphError::NotAGroup {
                graph: graph_name,
                node: node.name.clone(),
            });
        }
        let (mut inputs, outputs) = node.kind.sockets();
        let previous: HashMap<&str, (PortType, Value)> = node
            .inputs
            .iter()
            .map(|s| (s.name.as_str(), (s.port_type, s.default)))
            .collect();
        for socket in &mut inputs {
            if let Some((port_type, default)) = previous.get(socket.name.as_str()) {
                if *port_type == socket.port_type {
                    socket.default = *default;
                }
            }
        }
        node.inputs = inputs;
        node.outputs = outputs;

        let input_names: BTreeSet<String> = node.inputs.iter().map(|s| s.name.clone()).collect();
        let output_names: BTreeSet<String> = node.outputs.iter().map(|s| s.name.clone()).collect();
        let endpoint = Endpoint::Node(id);
        self.links.retain(|l| {
            (l.to.endpoint != endpoint || input_names.contains(&l.to.socket))
                && (l.from.endpoint != endpoint || output_names.contains(&l.from.socket))
        });
        Ok(())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Node ids in dependency order, or `CycleDetected`.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut indegree: BTreeMap<NodeId, usize> = self.nodes.keys().map(|&id| (id, 0)).collect();
        let mut edges: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for link in &self.links {
            if let (Endpoint::Node(a), Endpoint::Node(b)) = (link.from.endpoint, link.to.endpoint) {
                if self.nodes.contains_key(&a) && self.nodes.contains_key(&b) {
                    edges.entry(a).or_default().push(b);
                    *indegree.entry(b).or_default() += 1;
                }
            }
        }
        let mut ready: Vec<NodeId> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(&id, _)| id)
            .rev()
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop() {
            order.push(id);
            for next in edges.get(&id).into_iter().flatten() {
                if let Some(d) = indegree.get_mut(next) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push(*next);
                    }
                }
            }
        }
        if order.len() != self.nodes.len() {
            return Err(GraphError::CycleDetected {
                graph: self.name.clone(),
                from: "?".to_string(),
                to: "?".to_string(),
            });
        }
        Ok(order)
    }

    /// Checks every structural invariant, recursing into nested groups.
    ///
    /// An empty result means the graph has no dangling links, no input with
    /// two links, no incompatible links, no cycles, and no stale group sockets.
    pub fn validate(&self) -> Vec<GraphIssue> {
        let mut issues = Vec::new();
        self.validate_into(&self.name, &mut issues);
        issues
    }

    fn validate_into(&self, path: &str, issues: &mut Vec<GraphIssue>) {
        let issue = |kind: IssueKind, message: String| GraphIssue {
            kind,
            path: path.to_string(),
            message,
        };

        let mut seen_ports = BTreeSet::new();
        for port in &self.interface {
            if !seen_ports.insert((port.direction, port.name.as_str())) {
                issues.push(issue(
                    IssueKind::DuplicatePort,
                    format!("duplicate {} port '{}'", port.direction.as_str(), port.name),
                ));
            }
        }

        let mut fed = BTreeSet::new();
        for link in &self.links {
            match (self.source_type(&link.from), self.destination_type(&link.to)) {
                (Ok(a), Ok(b)) => {
                    if !a.can_link_to(b) {
                        issues.push(issue(
                            IssueKind::TypeMismatch,
                            format!(
                                "{} ({}) feeds {} ({})",
                                self.describe(&link.from),
                                a,
                                self.describe(&link.to),
                                b
                            ),
                        ));
                    }
                }
                _ => issues.push(issue(
                    IssueKind::DanglingLink,
                    format!(
                        "link {} -> {} references a missing socket",
                        self.describe(&link.from),
                        self.describe(&link.to)
                    ),
                )),
            }
            if !fed.insert(&link.to) {
                issues.push(issue(
                    IssueKind::DuplicateInputLink,
                    format!("{} has more than one incoming link", self.describe(&link.to)),
                ));
            }
        }

        if self.topological_order().is_err() {
            issues.push(issue(IssueKind::Cycle, "node links contain a cycle".to_string()));
        }

        for node in self.nodes.values() {
            let Some(inner) = node.kind.group() else {
                continue;
            };
            let (inputs, outputs) = node.kind.sockets();
            if !same_shape(&inputs, &node.inputs) || !same_shape(&outputs, &node.outputs) {
                issues.push(issue(
                    IssueKind::StaleGroupSockets,
                    format!("group node '{}' sockets do not match its graph", node.name),
                ));
            }
            inner.validate_into(&format!("{}/{}", path, node.name), issues);
        }
    }
}

fn same_shape(a: &[Socket], b: &[Socket]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x.name == y.name && x.port_type == y.port_type)
}
