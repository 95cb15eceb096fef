//! Core of the grd language: a virtual machine that walks a textual
//! control-flow graph.
//!
//! A program is a set of node declarations, one per line:
//!
//! ```text
//! <start> [loop]       {SET(0)}
//! <loop>  [check]      {INCREMENT}
//! <check> [loop | end] {CHECK({} < 5)}
//! <end>
//! ```
//!
//! [`program::parse`] turns the text into a [`graph::Graph`], and an
//! [`executor::Executor`] runs it from `start` until it reaches `end` (or a
//! node without edges).

pub mod dispatch;
pub mod executor;
pub mod expression;
pub mod graph;
pub mod memory;
pub mod operation;
pub mod program;
pub mod syntax;

pub use dispatch::Dispatcher;
pub use executor::{ExecutionOptions, Executor, RunError, RunReport, StepDiagnostic};
pub use expression::{EvalError, Value};
pub use graph::{Graph, Node};
pub use memory::{AddressingMode, Memory};
pub use operation::{Operation, OperationError};
pub use syntax::Span;

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
