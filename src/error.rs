use thiserror::Error;

/// Errors produced while scanning source text into tokens.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("Unexpected character '{character}' at line {line}, column {column}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Unterminated string literal at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },
    #[error("Invalid dedent to {width} spaces at line {line}, column {column}")]
    InvalidDedent {
        width: usize,
        line: usize,
        column: usize,
    },
    #[error("Tabs are not supported for indentation at line {line}, column {column}")]
    TabIndentation { line: usize, column: usize },
    #[error("Invalid number literal '{literal}' at line {line}, column {column}")]
    InvalidNumber {
        literal: String,
        line: usize,
        column: usize,
    },
}

impl LexError {
    /// 1-based (line, column) of the offending character or span.
    pub fn position(&self) -> (usize, usize) {
        match *self {
            LexError::UnexpectedCharacter { line, column, .. }
            | LexError::UnterminatedString { line, column }
            | LexError::InvalidDedent { line, column, .. }
            | LexError::TabIndentation { line, column }
            | LexError::InvalidNumber { line, column, .. } => (line, column),
        }
    }
}

/// Errors produced while matching the token stream against the grammar.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("Expected {expected}, found {found} at line {line}, column {column}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },
    #[error("Block starting at line {line}, column {column} is never closed before end of input")]
    UnterminatedBlock { line: usize, column: usize },
    #[error("Cannot assign to this expression at line {line}, column {column}")]
    InvalidAssignTarget { line: usize, column: usize },
}

impl SyntaxError {
    pub fn position(&self) -> (usize, usize) {
        match *self {
            SyntaxError::UnexpectedToken { line, column, .. }
            | SyntaxError::UnterminatedBlock { line, column }
            | SyntaxError::InvalidAssignTarget { line, column } => (line, column),
        }
    }
}

/// Union of the two failure kinds, for callers running the whole pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    pub fn position(&self) -> (usize, usize) {
        match self {
            ParseError::Lex(err) => err.position(),
            ParseError::Syntax(err) => err.position(),
        }
    }
}
