//! Shared harness for whole-program tests.
//!
//! `program_case!` parses and runs a program through the `grd` facade and
//! compares its output, where it halted and how many operations it skipped.

use grd::{ExecutionOptions, RunError, RunReport, run_source};

pub struct Outcome {
    pub report: Result<RunReport, RunError>,
    pub output: String,
}

pub fn run(source: &str, options: ExecutionOptions) -> Outcome {
    let mut out = Vec::new();
    let report = run_source(source, options, &mut out);
    Outcome {
        report,
        output: String::from_utf8(out).expect("program output is UTF-8"),
    }
}

macro_rules! program_case {
    (
        $name:ident,
        source: $source:expr,
        $(options: $options:expr,)?
        output: $output:expr
        $(, halted_at: $halted_at:expr)?
        $(, diagnostics: $diagnostics:expr)?
        $(,)?
    ) => {
        #[test]
        fn $name() {
            #[allow(unused_mut, unused_assignments)]
            let mut options = grd::ExecutionOptions::default();
            $( options = $options; )?
            let outcome = crate::cases::run($source, options);
            let report = match outcome.report {
                Ok(report) => report,
                Err(err) => panic!("program failed: {}\noutput so far:\n{}", err, outcome.output),
            };
            pretty_assertions::assert_eq!(outcome.output, $output);
            $( pretty_assertions::assert_eq!(report.halted_at, $halted_at); )?
            $( pretty_assertions::assert_eq!(report.diagnostics.len(), $diagnostics); )?
        }
    };

    (
        $name:ident,
        source: $source:expr,
        $(options: $options:expr,)?
        error: $error:pat
        $(, output: $output:expr)?
        $(,)?
    ) => {
        #[test]
        fn $name() {
            #[allow(unused_mut, unused_assignments)]
            let mut options = grd::ExecutionOptions::default();
            $( options = $options; )?
            let outcome = crate::cases::run($source, options);
            match &outcome.report {
                Err($error) => {}
                other => panic!("unexpected result: {:?}", other),
            }
            $( pretty_assertions::assert_eq!(outcome.output, $output); )?
        }
    };
}
