//! Error rendering using ariadne
//!
//! Fatal run errors and recovered step diagnostics are rendered against the
//! program source, pointing at the node declaration or operation involved.

use std::io::Write;
use std::ops::Range;

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use grd_core::{EvalError, Graph, OperationError, RunError, StepDiagnostic};

/// Render a fatal run error to `writer`.
///
/// `name` identifies the program in the report header (usually its path).
pub fn render_run_error(
    name: &str,
    source: &str,
    graph: &Graph,
    error: &RunError,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let span_of = |node: &str| graph.get(node).map(|node| node.span.0.clone());

    let (code, span, label, help) = match error {
        RunError::NodeNotFound {
            name: missing,
            referenced_by: Some(from),
        } => (
            "R001",
            span_of(from),
            format!("edge to `{}` leads nowhere", missing),
            Some(format!("declare the node with `<{}>`", missing)),
        ),
        RunError::NodeNotFound {
            referenced_by: None,
            ..
        } => (
            "R001",
            None,
            String::new(),
            Some("every program starts at a node named `start`".to_string()),
        ),
        RunError::TooManyEdges { node, .. } => (
            "R002",
            span_of(node),
            "declared here".to_string(),
            Some("split the node so that each has at most two edges".to_string()),
        ),
        RunError::StepLimitExceeded { node, .. } => (
            "R003",
            span_of(node),
            "the run was stopped before this node".to_string(),
            Some("the program may loop forever; raise or disable the step limit".to_string()),
        ),
        RunError::Output(err) => {
            return writeln!(writer, "Error: {}: {}", error, err);
        }
    };

    let report = Rendered {
        kind: ReportKind::Error,
        message: error.to_string(),
        code,
        span,
        label,
        help,
    };
    report.write(name, source, writer, use_color)
}

pub fn render_run_error_to_string(
    name: &str,
    source: &str,
    graph: &Graph,
    error: &RunError,
) -> String {
    let mut buf = Vec::new();
    render_run_error(name, source, graph, error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Same as `render_run_error_to_string` but without ANSI color codes,
/// making the output easier to compare in tests.
pub fn render_run_error_to_string_no_color(
    name: &str,
    source: &str,
    graph: &Graph,
    error: &RunError,
) -> String {
    let mut buf = Vec::new();
    render_run_error(name, source, graph, error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render a recovered step error as a warning.
pub fn render_diagnostic(
    name: &str,
    source: &str,
    diagnostic: &StepDiagnostic,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let (code, help) = match &diagnostic.error {
        OperationError::Eval(EvalError::DivisionByZero | EvalError::ModuloByZero) => ("E001", None),
        OperationError::Eval(EvalError::NamedMemoryDisabled { .. }) => (
            "E002",
            Some("run with named memory enabled (`--named`) to use names".to_string()),
        ),
        OperationError::Eval(_) => ("E003", None),
        OperationError::Unsupported { .. } => (
            "E004",
            Some("supported operations: SET, INCREMENT, DECREMENT, OUTPUT, CHECK, SHIFT".to_string()),
        ),
        OperationError::Malformed { .. } | OperationError::InvalidArgument { .. } => ("E005", None),
        OperationError::Output(_) => ("E006", None),
    };

    let report = Rendered {
        kind: ReportKind::Warning,
        message: format!("operation in `{}` skipped", diagnostic.node),
        code,
        span: diagnostic.span.as_ref().map(|span| span.0.clone()),
        label: diagnostic.error.to_string(),
        help,
    };
    report.write(name, source, writer, use_color)
}

pub fn render_diagnostic_to_string(name: &str, source: &str, diagnostic: &StepDiagnostic) -> String {
    let mut buf = Vec::new();
    render_diagnostic(name, source, diagnostic, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

pub fn render_diagnostic_to_string_no_color(
    name: &str,
    source: &str,
    diagnostic: &StepDiagnostic,
) -> String {
    let mut buf = Vec::new();
    render_diagnostic(name, source, diagnostic, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

struct Rendered<'k> {
    kind: ReportKind<'k>,
    message: String,
    code: &'static str,
    span: Option<Range<usize>>,
    label: String,
    help: Option<String>,
}

impl Rendered<'_> {
    fn write(
        self,
        name: &str,
        source: &str,
        writer: &mut dyn Write,
        use_color: bool,
    ) -> std::io::Result<()> {
        let mut colors = ColorGenerator::new();
        colors.next(); // Skip the first color.

        let span = self.span.clone().unwrap_or(0..0);
        let mut report = Report::build(self.kind, (name, span.clone()))
            .with_message(&self.message)
            .with_code(self.code)
            .with_config(ariadne::Config::default().with_color(use_color));

        if self.span.is_some() {
            report = report.with_label(
                Label::new((name, span))
                    .with_message(&self.label)
                    .with_color(colors.next()),
            );
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report
            .finish()
            .write((name, Source::from(source)), &mut *writer)
    }
}
