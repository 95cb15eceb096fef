//! The node registry built by the program parser.

use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::syntax::Span;

/// Name of the node every run starts at.
pub const START: &str = "start";

/// Name of the terminal node. Reaching it runs its operation and halts.
pub const END: &str = "end";

/// Largest number of edges a node may have.
pub const MAX_EDGES: usize = 2;

pub type Edges = SmallVec<[String; MAX_EDGES]>;

/// A named state of the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    /// Successors in declaration order. With two edges the first is taken
    /// when the operation yields `true`.
    pub edges: Edges,
    /// Raw operation text, without the surrounding braces.
    pub operation: Option<String>,
    /// 1-based source line.
    pub line: usize,
    /// The declaration in the program source.
    pub span: Span,
    /// The operation text in the program source.
    pub operation_span: Option<Span>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            edges: Edges::new(),
            operation: None,
            line: 0,
            span: Span::new(0, 0),
            operation_span: None,
        }
    }

    pub fn with_edges<I, S>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges = edges.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.name == END
    }
}

/// Mapping from node name to node.
///
/// Inserting a node under an existing name replaces it; the name keeps its
/// original position in [`Graph::iter`].
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<String, Node>,
    order: Vec<String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node`, returning the definition it replaced, if any.
    pub fn insert(&mut self, node: Node) -> Option<Node> {
        let name = node.name.clone();
        let previous = self.nodes.insert(name.clone(), node);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in order of first declaration.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|name| self.nodes.get(name))
    }
}

impl FromIterator<Node> for Graph {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        let mut graph = Graph::new();
        for node in iter {
            graph.insert(node);
        }
        graph
    }
}

/// Human-readable dump, one node per line.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.iter() {
            write!(f, "{} | edges: [{}]", node.name, node.edges.join(", "))?;
            if let Some(operation) = &node.operation {
                write!(f, " | operation: {}", operation)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
