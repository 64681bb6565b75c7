// Rill Parser Library
// Grammar-driven tokenizer, indentation reconstruction, and rewrite
// passes for the rill programming language

pub mod ast;
pub mod error;
pub mod grammar;
pub mod indent;
pub mod pratt;
pub mod rewrite;
pub mod tokenizer;

pub use ast::*;
pub use error::*;
pub use grammar::{Grammar, LAMBDA};
pub use tokenizer::{tokenize, Token};

// Main parsing functions
pub fn parse_program(source: &str) -> ParseResult<Node> {
    let tokens = tokenizer::tokenize(source)?;
    let tree = indent::blocks(tokens)?;
    rewrite::finalize(tree)
}

pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult<Node> {
    let tree = indent::blocks(tokens)?;
    rewrite::finalize(tree)
}

// Version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
