use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use grd::{render_diagnostic, render_run_error};
use grd_core::{
    AddressingMode, ExecutionOptions, Executor, Graph, RunError, StepDiagnostic, program,
};
use miette::{Diagnostic, Result};
use thiserror::Error;
use tracing::{debug, warn};

/// grd - Run control-flow-graph programs
#[derive(Parser, Debug)]
#[command(name = "grd")]
#[command(about = "Run grd graph programs", long_about = None)]
struct Args {
    /// Dump the parsed graph and trace every step
    #[arg(long)]
    debug: bool,

    /// Let identifiers in expressions address named memory cells
    #[arg(long)]
    named: bool,

    /// Stop the run after this many node executions
    #[arg(long, value_name = "N", conflicts_with = "unlimited")]
    max_steps: Option<usize>,

    /// Run without a step limit
    #[arg(long)]
    unlimited: bool,

    /// Program file (usually with a `.grd` extension)
    path: Option<PathBuf>,
}

#[derive(Debug, Error, Diagnostic)]
enum CliError {
    #[error("could not read `{path}`")]
    #[diagnostic(code(grd::read))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write to {stream}")]
    #[diagnostic(code(grd::write))]
    Write {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    fn stdout(source: std::io::Error) -> Self {
        CliError::Write {
            stream: "stdout",
            source,
        }
    }

    fn stderr(source: std::io::Error) -> Self {
        CliError::Write {
            stream: "stderr",
            source,
        }
    }
}

impl Args {
    fn options(&self) -> ExecutionOptions {
        let defaults = ExecutionOptions::default();
        ExecutionOptions {
            mode: if self.named {
                AddressingMode::Named
            } else {
                AddressingMode::Tape
            },
            max_steps: if self.unlimited {
                None
            } else {
                self.max_steps.or(defaults.max_steps)
            },
            debug: self.debug,
            ..defaults
        }
    }
}

fn run(path: &Path, args: &Args) -> Result<ExitCode> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("grd") {
        warn!(path = %path.display(), "program file does not have a .grd extension");
    }

    let source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let name = path.display().to_string();

    let graph = program::parse(&source);
    debug!(nodes = graph.len(), "parsed program");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.debug {
        writeln!(out, "=== Graph ===").map_err(CliError::stdout)?;
        write!(out, "{}", graph).map_err(CliError::stdout)?;
        writeln!(out).map_err(CliError::stdout)?;
    }

    let use_color = std::io::stderr().is_terminal();
    let mut stderr = std::io::stderr().lock();

    let mut executor = Executor::new(&graph, args.options(), &mut out);
    let (diagnostics, failure) = match executor.run() {
        Ok(report) => {
            debug!(steps = report.steps, halted_at = %report.halted_at, "done");
            (report.diagnostics, None)
        }
        Err(err) => (executor.take_diagnostics(), Some(err)),
    };

    let code = report(
        &name,
        &source,
        &graph,
        &diagnostics,
        failure.as_ref(),
        &mut stderr,
        use_color,
    )?;
    Ok(code)
}

/// Renders recovered diagnostics, then the fatal error if there is one.
fn report(
    name: &str,
    source: &str,
    graph: &Graph,
    diagnostics: &[StepDiagnostic],
    failure: Option<&RunError>,
    stderr: &mut dyn Write,
    use_color: bool,
) -> Result<ExitCode, CliError> {
    for diagnostic in diagnostics {
        render_diagnostic(name, source, diagnostic, stderr, use_color).map_err(CliError::stderr)?;
    }

    match failure {
        None => Ok(ExitCode::SUCCESS),
        Some(err) => {
            render_run_error(name, source, graph, err, stderr, use_color)
                .map_err(CliError::stderr)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use GRD_LOG environment variable to control log level
    // Default to WARN if not set
    let filter = EnvFilter::try_from_env("GRD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let Some(path) = args.path.clone() else {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{}", Args::command().render_help()).map_err(CliError::stdout)?;
        writeln!(stdout).map_err(CliError::stdout)?;
        return Ok(ExitCode::SUCCESS);
    };

    run(&path, &args)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn failed_run(source: &str) -> (Graph, Vec<StepDiagnostic>, RunError) {
        let graph = program::parse(source);
        let mut executor = Executor::new(&graph, ExecutionOptions::default(), Vec::new());
        let err = executor.run().unwrap_err();
        let diagnostics = executor.take_diagnostics();
        (graph, diagnostics, err)
    }

    #[test]
    fn fatal_runs_still_report_recovered_errors() {
        let source = "<start>[next]{SET(1 / 0)}\n<next>[gone]\n";
        let (graph, diagnostics, err) = failed_run(source);

        let mut stderr = Vec::new();
        let code = report("a.grd", source, &graph, &diagnostics, Some(&err), &mut stderr, false)
            .unwrap();
        let rendered = String::from_utf8(stderr).unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        assert!(rendered.contains("division by zero"), "{}", rendered);
        assert!(rendered.contains("node `gone` not found"), "{}", rendered);
        assert!(
            rendered.find("division by zero") < rendered.find("node `gone` not found"),
            "{}",
            rendered
        );
    }

    #[test]
    fn successful_runs_exit_cleanly() {
        let graph = program::parse("<start>[end]");
        let code = report("a.grd", "<start>[end]", &graph, &[], None, &mut Vec::<u8>::new(), false)
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn write_failures_are_reported() {
        let source = "<start>[gone]{SET(1 / 0)}\n";
        let (graph, diagnostics, err) = failed_run(source);

        let result = report("a.grd", source, &graph, &diagnostics, Some(&err), &mut Closed, false);
        assert!(matches!(
            result,
            Err(CliError::Write { stream: "stderr", .. })
        ));

        let result = report("a.grd", source, &graph, &[], Some(&err), &mut Closed, false);
        assert!(matches!(result, Err(CliError::Write { .. })));
    }

    #[test]
    fn step_limit_flags() {
        let args = Args::parse_from(["grd", "--max-steps", "5", "prog.grd"]);
        assert_eq!(args.options().max_steps, Some(5));

        let args = Args::parse_from(["grd", "--unlimited", "--named", "prog.grd"]);
        let options = args.options();
        assert_eq!(options.max_steps, None);
        assert_eq!(options.mode, AddressingMode::Named);

        let args = Args::parse_from(["grd"]);
        assert_eq!(args.options().max_steps, ExecutionOptions::default().max_steps);
        assert!(args.path.is_none());
    }
}
