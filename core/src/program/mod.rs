mod parser;

pub use parser::{ProgramParser, Rule, parse};
