use thiserror::Error;

use crate::graph::MAX_EDGES;
use crate::operation::OperationError;
use crate::syntax::Span;

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The current node is not defined. `referenced_by` is the node whose
    /// edge led here, or `None` for a missing `start`.
    #[error("node `{name}` not found")]
    NodeNotFound {
        name: String,
        referenced_by: Option<String>,
    },

    #[error("node `{node}` has {count} edges, at most {} are allowed", MAX_EDGES)]
    TooManyEdges { node: String, count: usize },

    #[error("run exceeded the limit of {limit} steps (next node `{node}`)")]
    StepLimitExceeded { limit: usize, node: String },

    #[error("failed to write output")]
    Output(#[source] std::io::Error),
}

/// A per-step error the run recovered from.
///
/// The operation was skipped, its result treated as absent, and execution
/// continued along the default transition.
#[derive(Debug)]
pub struct StepDiagnostic {
    /// 1-based step number.
    pub step: usize,
    pub node: String,
    /// Location of the operation text in the program source.
    pub span: Option<Span>,
    pub error: OperationError,
}
