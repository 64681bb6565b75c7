//! Tree-walking evaluator for the rill language.
//!
//! Lowering substitutes the parser's syntax tree with a semantic tree
//! that evaluates directly against a chain of lexical frames. Nothing
//! here looks at source text again except string interpolation, which
//! resolves placeholder names at render time.

pub mod error;
pub mod frame;
pub mod interp;
pub mod nodes;
pub mod value;

// Re-export public API
pub use error::{Result, RuntimeError};
pub use frame::Frame;
pub use interp::run;
pub use nodes::{lower, Node};
pub use value::{binary, BinOp, Value};

/// Parse and run a complete program in one step.
///
/// Mainly useful for tests and embedding; the command line drives the
/// stages separately so it can dump intermediate forms.
pub fn run_source(source: &str, argv: Vec<String>) -> miette::Result<i64> {
    let tree = rill_parser::parse_program(source)?;
    Ok(interp::run(tree, argv)?)
}
