//! The control loop.
//!
//! An [`Executor`] owns the memory of one run and borrows the graph
//! immutably. Each step looks up the current node, runs its operation
//! through the [`Dispatcher`] and picks the successor:
//!
//! - no edges: halt
//! - one edge: take it
//! - two edges: the first if the operation returned `true`, else the second
//!
//! Reaching `end` runs its operation and halts.

mod error;
mod options;


pub use error::{RunError, StepDiagnostic};
pub use options::{DEFAULT_MAX_STEPS, ExecutionOptions};

use std::io::Write;

use tracing::{debug, warn};

use crate::dispatch::Dispatcher;
use crate::graph::{END, Graph, MAX_EDGES, Node, START};
use crate::memory::Memory;
use crate::operation::{Operation, OperationError};

/// Summary of a completed run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Number of nodes executed.
    pub steps: usize,
    /// The node the run stopped at.
    pub halted_at: String,
    /// Final pointer value.
    pub pointer: i64,
    /// Errors the run recovered from, in order.
    pub diagnostics: Vec<StepDiagnostic>,
}

/// Runs a graph, writing OUTPUT lines (and debug traces) to `out`.
pub struct Executor<'g, W> {
    graph: &'g Graph,
    options: ExecutionOptions,
    dispatcher: Dispatcher,
    memory: Memory,
    recovered: Vec<StepDiagnostic>,
    out: W,
}

impl<'g, W: Write> Executor<'g, W> {
    pub fn new(graph: &'g Graph, options: ExecutionOptions, out: W) -> Self {
        let dispatcher = Dispatcher::new(options.mode).with_max_depth(options.max_depth);
        Self {
            graph,
            options,
            dispatcher,
            memory: Memory::new(),
            recovered: Vec::new(),
            out,
        }
    }

    /// Memory as left by the last run.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Errors recovered before the last run failed.
    ///
    /// A successful run hands its diagnostics over in [`RunReport`], so this
    /// is empty unless [`Executor::run`] returned an error.
    pub fn take_diagnostics(&mut self) -> Vec<StepDiagnostic> {
        std::mem::take(&mut self.recovered)
    }

    /// Runs from `start` with fresh memory.
    pub fn run(&mut self) -> Result<RunReport, RunError> {
        self.memory = Memory::new();
        self.recovered.clear();
        let mut report = RunReport::default();

        match self.walk(&mut report) {
            Ok(()) => {
                report.pointer = self.memory.pointer();
                debug!(steps = report.steps, halted_at = %report.halted_at, "run finished");
                Ok(report)
            }
            Err(err) => {
                debug!(steps = report.steps, %err, "run failed");
                self.recovered = report.diagnostics;
                Err(err)
            }
        }
    }

    fn walk(&mut self, report: &mut RunReport) -> Result<(), RunError> {
        let graph = self.graph;
        let mut current = START;
        let mut referenced_by: Option<&str> = None;

        loop {
            if let Some(limit) = self.options.max_steps {
                if report.steps >= limit {
                    return Err(RunError::StepLimitExceeded {
                        limit,
                        node: current.to_string(),
                    });
                }
            }

            let node = match graph.get(current) {
                Some(node) => node,
                // An undeclared `end` is an implicit terminal.
                None if current == END => {
                    report.halted_at = END.to_string();
                    break;
                }
                None => {
                    return Err(RunError::NodeNotFound {
                        name: current.to_string(),
                        referenced_by: referenced_by.map(str::to_string),
                    });
                }
            };

            if !node.is_terminal() && node.edges.len() > MAX_EDGES {
                return Err(RunError::TooManyEdges {
                    node: node.name.clone(),
                    count: node.edges.len(),
                });
            }

            report.steps += 1;
            let result = self.execute(node, report)?;
            let next = if node.is_terminal() {
                None
            } else {
                successor(node, result)
            };

            debug!(step = report.steps, node = %node.name, ?result, ?next, "step");
            if self.options.debug {
                self.trace(report.steps, node, result, next)?;
            }

            match next {
                Some(next) => {
                    referenced_by = Some(node.name.as_str());
                    current = next;
                }
                None => {
                    report.halted_at = node.name.clone();
                    break;
                }
            }
        }

        Ok(())
    }

    /// Runs the node's operation, recording recoverable errors.
    fn execute(&mut self, node: &Node, report: &mut RunReport) -> Result<Option<bool>, RunError> {
        let Some(text) = node.operation.as_deref() else {
            return Ok(None);
        };

        let result = Operation::parse(text).and_then(|operation| {
            self.dispatcher
                .execute(&operation, &mut self.memory, &mut self.out)
        });

        match result {
            Ok(result) => Ok(result),
            Err(OperationError::Output(err)) => Err(RunError::Output(err)),
            Err(error) => {
                warn!(node = %node.name, line = node.line, %error, "operation skipped");
                report.diagnostics.push(StepDiagnostic {
                    step: report.steps,
                    node: node.name.clone(),
                    span: node.operation_span.clone(),
                    error,
                });
                Ok(None)
            }
        }
    }

    fn trace(
        &mut self,
        step: usize,
        node: &Node,
        result: Option<bool>,
        next: Option<&str>,
    ) -> Result<(), RunError> {
        let result = match result {
            Some(result) => result.to_string(),
            None => "none".to_string(),
        };
        writeln!(
            self.out,
            "[step {}] {} -> {} | result: {} | {}",
            step,
            node.name,
            next.unwrap_or("halt"),
            result,
            self.memory
        )
        .map_err(RunError::Output)
    }
}

/// Picks the next node. Callers have already rejected nodes with too many edges.
fn successor(node: &Node, result: Option<bool>) -> Option<&str> {
    match node.edges.as_slice() {
        [] => None,
        [only] => Some(only.as_str()),
        [on_true, on_false, ..] => Some(if result == Some(true) {
            on_true.as_str()
        } else {
            on_false.as_str()
        }),
    }
}
