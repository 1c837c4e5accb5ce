//! Front end for a Python subset: a lexer producing a typed token stream
//! and a recursive-descent parser producing a typed syntax tree.
//!
//! The two stages are decoupled: the lexer knows nothing about the grammar
//! and the parser consumes tokens without ever touching source text. Both
//! are pure functions of their input and fail fast on the first error.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Module;
pub use error::{LexError, ParseError, SyntaxError};

/// Runs the whole pipeline: source text in, tree root out.
pub fn parse_source(source: &str) -> Result<Module, ParseError> {
    let tokens = lexer::tokenize(source)?;
    let module = parser::parse_tokens(tokens)?;
    Ok(module)
}
