//! Configuration options for a run.

use crate::expression::DEFAULT_MAX_DEPTH;
use crate::memory::AddressingMode;

/// Default bound on node executions per run.
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Configuration options for program execution.
///
/// # Example
///
/// ```
/// use grd_core::{AddressingMode, ExecutionOptions};
///
/// let options = ExecutionOptions {
///     mode: AddressingMode::Named,
///     max_steps: Some(10_000),
///     ..ExecutionOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Whether identifiers address named cells.
    ///
    /// Default: `AddressingMode::Tape`
    pub mode: AddressingMode,

    /// Maximum number of node executions (if Some).
    ///
    /// Programs can loop forever through graph cycles; set to `None` only
    /// for trusted programs.
    ///
    /// Default: `Some(1_000_000)`
    pub max_steps: Option<usize>,

    /// Maximum expression nesting depth.
    ///
    /// Default: 256
    pub max_depth: usize,

    /// Write a trace line per step to the output stream.
    ///
    /// Default: false
    pub debug: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            mode: AddressingMode::Tape,
            max_steps: Some(DEFAULT_MAX_STEPS),
            max_depth: DEFAULT_MAX_DEPTH,
            debug: false,
        }
    }
}
