use std::fmt;

use serde::{Deserialize, Serialize};

/// Byte span plus the 1-based line/column of the token's first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

/// Decoded numeric literal payload. NUMBER is a single lexical category;
/// the integer/float split only shows up in the decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Def,
    Class,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Import,
    From,
    As,
    Return,
    Pass,
    Break,
    Continue,
    And,
    Or,
    Not,
    True,
    False,
    None,
}

impl Keyword {
    /// Classifies an identifier against the fixed keyword table.
    pub fn from_ident(ident: &str) -> Option<Keyword> {
        let keyword = match ident {
            "def" => Keyword::Def,
            "class" => Keyword::Class,
            "if" => Keyword::If,
            "elif" => Keyword::Elif,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "for" => Keyword::For,
            "in" => Keyword::In,
            "import" => Keyword::Import,
            "from" => Keyword::From,
            "as" => Keyword::As,
            "return" => Keyword::Return,
            "pass" => Keyword::Pass,
            "break" => Keyword::Break,
            "continue" => Keyword::Continue,
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "not" => Keyword::Not,
            "True" => Keyword::True,
            "False" => Keyword::False,
            "None" => Keyword::None,
            _ => return Option::None,
        };
        Some(keyword)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Def => "def",
            Keyword::Class => "class",
            Keyword::If => "if",
            Keyword::Elif => "elif",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::For => "for",
            Keyword::In => "in",
            Keyword::Import => "import",
            Keyword::From => "from",
            Keyword::As => "as",
            Keyword::Return => "return",
            Keyword::Pass => "pass",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
            Keyword::True => "True",
            Keyword::False => "False",
            Keyword::None => "None",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Assign,    // =
    Eq,        // ==
    NotEq,     // !=
    Less,      // <
    Greater,   // >
    LessEq,    // <=
    GreaterEq, // >=
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    FloorDiv,  // //
    Percent,   // %
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Assign => "=",
            Op::Eq => "==",
            Op::NotEq => "!=",
            Op::Less => "<",
            Op::Greater => ">",
            Op::LessEq => "<=",
            Op::GreaterEq => ">=",
            Op::Plus => "+",
            Op::Minus => "-",
            Op::Star => "*",
            Op::Slash => "/",
            Op::FloorDiv => "//",
            Op::Percent => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    Colon,    // :
    Comma,    // ,
    Dot,      // .
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }
}

impl Delim {
    pub fn as_str(self) -> &'static str {
        match self {
            Delim::Colon => ":",
            Delim::Comma => ",",
            Delim::Dot => ".",
            Delim::LParen => "(",
            Delim::RParen => ")",
            Delim::LBracket => "[",
            Delim::RBracket => "]",
            Delim::LBrace => "{",
            Delim::RBrace => "}",
        }
    }
}

/// The closed set of lexical categories. String and number payloads are
/// decoded by the lexer; the parser never re-reads source text.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    Name(&'a str),
    Number(Number),
    Str(String),
    Keyword(Keyword),
    Op(Op),
    Delim(Delim),
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Name(name) => write!(f, "identifier '{name}'"),
            TokenKind::Number(Number::Int(value)) => write!(f, "number '{value}'"),
            TokenKind::Number(Number::Float(value)) => write!(f, "number '{value}'"),
            TokenKind::Str(_) => write!(f, "string literal"),
            TokenKind::Keyword(keyword) => write!(f, "keyword '{}'", keyword.as_str()),
            TokenKind::Op(op) => write!(f, "'{}'", op.as_str()),
            TokenKind::Delim(delim) => write!(f, "'{}'", delim.as_str()),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Indent => write!(f, "indent"),
            TokenKind::Dedent => write!(f, "dedent"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }
}
