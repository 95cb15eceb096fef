//! Executes one [`Operation`] against memory.

use std::io::Write;

use tracing::{debug, trace};

use crate::expression::{self, DEFAULT_MAX_DEPTH, Value, reference};
use crate::memory::{AddressingMode, Memory};
use crate::operation::{Operation, OperationError, Output};

/// Interprets operations for one run.
///
/// Every operation evaluates its argument before touching memory or the
/// output stream, so an operation that fails has no effect.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    mode: AddressingMode,
    max_depth: usize,
}

impl Dispatcher {
    pub fn new(mode: AddressingMode) -> Self {
        Self {
            mode,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Runs `operation`, returning the boolean produced by `CHECK`.
    pub fn execute<W: Write + ?Sized>(
        &self,
        operation: &Operation,
        memory: &mut Memory,
        out: &mut W,
    ) -> Result<Option<bool>, OperationError> {
        trace!(keyword = operation.keyword(), "dispatch");
        match operation {
            Operation::Set { target, expression } => {
                let value = self.evaluate(expression, memory)?.as_int();
                target.write(memory, self.mode, value)?;
                debug!(?target, value, "set");
                Ok(None)
            }

            Operation::Increment(target) => {
                let value = target.read(memory, self.mode)?.wrapping_add(1);
                target.write(memory, self.mode, value)?;
                Ok(None)
            }

            Operation::Decrement(target) => {
                let value = target.read(memory, self.mode)?.wrapping_sub(1);
                target.write(memory, self.mode, value)?;
                Ok(None)
            }

            Operation::Output(output) => {
                let line = match output {
                    Output::Template(template) => reference::render(template, memory, self.mode)?,
                    Output::Value(expression) => {
                        self.evaluate(expression, memory)?.as_int().to_string()
                    }
                };
                writeln!(out, "{}", line).map_err(OperationError::Output)?;
                Ok(None)
            }

            Operation::Check(condition) => {
                let result = match condition {
                    None => memory.current() != 0,
                    Some(condition) => self.evaluate(condition, memory)?.as_bool(),
                };
                debug!(result, "check");
                Ok(Some(result))
            }

            Operation::Shift(delta) => {
                memory.shift(*delta);
                debug!(delta, pointer = memory.pointer(), "shift");
                Ok(None)
            }
        }
    }

    fn evaluate(&self, source: &str, memory: &Memory) -> Result<Value, OperationError> {
        Ok(expression::evaluate_with_max_depth(
            source,
            memory,
            self.mode,
            self.max_depth,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{EvalError, Reference};
    use pretty_assertions::assert_eq;

    struct Fixture {
        dispatcher: Dispatcher,
        memory: Memory,
        out: Vec<u8>,
    }

    impl Fixture {
        fn new(mode: AddressingMode) -> Self {
            Self {
                dispatcher: Dispatcher::new(mode),
                memory: Memory::new(),
                out: Vec::new(),
            }
        }

        fn run(&mut self, text: &str) -> Result<Option<bool>, OperationError> {
            let operation = Operation::parse(text)?;
            self.dispatcher
                .execute(&operation, &mut self.memory, &mut self.out)
        }

        fn output(&self) -> String {
            String::from_utf8(self.out.clone()).unwrap()
        }
    }

    #[test]
    fn set_stores_into_the_current_cell() {
        let mut f = Fixture::new(AddressingMode::Tape);
        f.memory.set(1, 20);
        assert_eq!(f.run("SET({1} / 3 + 1)").unwrap(), None);
        assert_eq!(f.memory.current(), 7);
    }

    #[test]
    fn set_into_relative_cell() {
        let mut f = Fixture::new(AddressingMode::Tape);
        f.run("SHIFT(>)").unwrap();
        f.run("SET({-1}, 4)").unwrap();
        assert_eq!(f.memory.get(0), 4);
        assert_eq!(f.memory.get(1), 0);
    }

    #[test]
    fn increment_and_decrement_default_to_zero() {
        let mut f = Fixture::new(AddressingMode::Tape);
        f.run("INCREMENT").unwrap();
        f.run("INCREMENT").unwrap();
        f.run("DECREMENT({3})").unwrap();
        assert_eq!(f.memory.get(0), 2);
        assert_eq!(f.memory.get(3), -1);
    }

    #[test]
    fn output_template_and_value() {
        let mut f = Fixture::new(AddressingMode::Tape);
        f.memory.set(0, 5);
        f.memory.set(1, -2);
        f.run(r#"OUTPUT("a={} b={1}")"#).unwrap();
        f.run("OUTPUT({})").unwrap();
        f.run("OUTPUT({} * {1})").unwrap();
        f.run(r#"OUTPUT("plain text")"#).unwrap();
        assert_eq!(f.output(), "a=5 b=-2\n5\n-10\nplain text\n");
    }

    #[test]
    fn check_tests_the_current_cell_or_a_condition() {
        let mut f = Fixture::new(AddressingMode::Tape);
        assert_eq!(f.run("CHECK").unwrap(), Some(false));
        f.memory.set(0, 3);
        assert_eq!(f.run("CHECK").unwrap(), Some(true));
        assert_eq!(f.run("CHECK({} < 5)").unwrap(), Some(true));
        assert_eq!(f.run("CHECK({} - 3)").unwrap(), Some(false));
    }

    #[test]
    fn shift_moves_the_pointer() {
        let mut f = Fixture::new(AddressingMode::Tape);
        f.run(r#"SHIFT(">>>")"#).unwrap();
        assert_eq!(f.memory.pointer(), 3);
        f.run(r#"SHIFT("<")"#).unwrap();
        assert_eq!(f.memory.pointer(), 2);
    }

    #[test]
    fn failed_operations_have_no_effect() {
        let mut f = Fixture::new(AddressingMode::Tape);
        f.memory.set(0, 9);

        let err = f.run("SET({} / 0)").unwrap_err();
        assert!(matches!(err, OperationError::Eval(EvalError::DivisionByZero)));
        assert_eq!(f.memory.current(), 9);

        assert!(f.run("OUTPUT(1 % 0)").is_err());
        assert!(f.run(r#"OUTPUT("{x}")"#).is_err());
        assert_eq!(f.output(), "");
    }

    #[test]
    fn named_mode() {
        let mut f = Fixture::new(AddressingMode::Named);
        f.run("SET(total, 10)").unwrap();
        f.run("INCREMENT(total)").unwrap();
        f.run("SET(half, total / 2)").unwrap();
        f.run(r#"OUTPUT("total={total} half={half}")"#).unwrap();
        f.run("OUTPUT(half)").unwrap();

        assert_eq!(f.memory.named("total"), 11);
        assert_eq!(f.run("CHECK(half == 5)").unwrap(), Some(true));
        assert_eq!(f.output(), "total=11 half=5\n5\n");
    }

    #[test]
    fn names_are_rejected_in_tape_mode() {
        let mut f = Fixture::new(AddressingMode::Tape);
        let err = f.run("INCREMENT(total)").unwrap_err();
        assert!(matches!(
            err,
            OperationError::Eval(EvalError::NamedMemoryDisabled { .. })
        ));
        assert_eq!(f.memory.named("total"), 0);
    }

    #[test]
    fn output_failure_is_reported() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let dispatcher = Dispatcher::new(AddressingMode::Tape);
        let mut memory = Memory::new();
        let operation = Operation::Output(crate::operation::Output::Value("1".to_string()));
        let err = dispatcher
            .execute(&operation, &mut memory, &mut Closed)
            .unwrap_err();
        assert!(matches!(err, OperationError::Output(_)));

        let set = Operation::Set {
            target: Reference::Current,
            expression: "2".to_string(),
        };
        dispatcher.execute(&set, &mut memory, &mut Closed).unwrap();
        assert_eq!(memory.current(), 2);
    }
}
