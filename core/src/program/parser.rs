//! Line-oriented program parser.
//!
//! Parsing never fails. Lines that are not node declarations are skipped,
//! which is how blank lines and comments are supported.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use tracing::{debug, trace, warn};

use crate::graph::{Edges, Graph, MAX_EDGES, Node};
use crate::syntax::Span;

#[derive(Parser)]
#[grammar = "program/program.pest"]
pub struct ProgramParser;

/// Builds a graph from program text.
///
/// A later declaration of a name replaces the earlier one.
pub fn parse(source: &str) -> Graph {
    let mut graph = Graph::new();
    let mut offset = 0;

    for (index, raw) in source.split_inclusive('\n').enumerate() {
        let line = raw.trim_end_matches(['\n', '\r']);
        if let Some(node) = parse_line(line, offset, index + 1) {
            let line = node.line;
            if let Some(previous) = graph.insert(node) {
                debug!(
                    name = %previous.name,
                    line,
                    previous_line = previous.line,
                    "node redefined"
                );
            }
        }
        offset += raw.len();
    }

    debug!(nodes = graph.len(), "program parsed");
    graph
}

fn parse_line(line: &str, offset: usize, line_number: usize) -> Option<Node> {
    let declaration = match ProgramParser::parse(Rule::node_line, line) {
        Ok(mut pairs) => pairs.next()?,
        Err(error) => {
            if line.trim_start().starts_with('<') {
                warn!(line = line_number, %error, "ignoring malformed node declaration");
            } else {
                trace!(line = line_number, "ignoring line");
            }
            return None;
        }
    };

    let start = offset + (line.len() - line.trim_start().len());
    let mut node = Node::new(String::new());
    node.line = line_number;
    node.span = Span::new(start, offset + line.trim_end().len());

    for pair in declaration.into_inner() {
        match pair.as_rule() {
            Rule::node_name => node.name = pair.as_str().to_string(),
            Rule::edge_list => node.edges = edges(pair),
            Rule::operation => {
                if let Some(text) = pair.into_inner().next() {
                    let (operation, span) = trimmed(text);
                    if !operation.is_empty() {
                        node.operation = Some(operation.to_string());
                        node.operation_span = Some(span.offset(offset));
                    }
                }
            }
            Rule::trailing => {
                let rest = pair.as_str().trim_start();
                if rest.starts_with('[') || rest.starts_with('{') {
                    warn!(
                        line = line_number,
                        text = rest,
                        "ignoring unterminated edge list or operation"
                    );
                }
            }
            _ => {}
        }
    }

    if node.edges.len() > MAX_EDGES {
        warn!(
            name = %node.name,
            line = line_number,
            edges = node.edges.len(),
            "node has more than {} edges",
            MAX_EDGES
        );
    }

    Some(node)
}

/// Trimmed edge names. `[]` and `[ ]` declare no edges.
fn edges(list: Pair<'_, Rule>) -> Edges {
    let entries: Vec<&str> = list.into_inner().map(|edge| edge.as_str().trim()).collect();
    match entries.as_slice() {
        [only] if only.is_empty() => Edges::new(),
        _ => entries.into_iter().map(str::to_string).collect(),
    }
}

fn trimmed<'i>(pair: Pair<'i, Rule>) -> (&'i str, Span) {
    let raw = pair.as_str();
    let start = pair.as_span().start() + (raw.len() - raw.trim_start().len());
    let text = raw.trim();
    (text, Span::new(start, start + text.len()))
}
