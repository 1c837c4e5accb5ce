//! Scanner turning source text into a token stream.
//!
//! The lexer knows nothing about the grammar: it only classifies characters,
//! decodes literals, and translates indentation changes into Indent/Dedent
//! tokens. Blank and comment-only lines produce no tokens at all and leave
//! the indentation stack untouched.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::LexError;
use crate::token::{Delim, Keyword, Number, Op, Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    indent_stack: Vec<usize>,
    pending_tokens: Vec<Token<'a>>,
    at_line_start: bool,
    line_has_content: bool,
    eof_reached: bool,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            indent_stack: vec![0],
            pending_tokens: Vec::new(),
            at_line_start: true,
            line_has_content: false,
            eof_reached: false,
            line: 1,
            column: 1,
        }
    }

    /// Scans the next token. Single pass: once `Eof` has been returned the
    /// lexer keeps returning `Eof`.
    pub fn next_token(&mut self) -> Result<Token<'a>, LexError> {
        if let Some(token) = self.pending_tokens.pop() {
            return Ok(token);
        }

        if self.eof_reached {
            return Ok(self.marker_token(TokenKind::Eof));
        }

        loop {
            if self.at_line_start {
                self.at_line_start = false;
                if let Some(token) = self.handle_indentation()? {
                    return Ok(token);
                }
            }

            self.skip_spaces();

            let (start_idx, ch) = match self.chars.peek() {
                Some(&(idx, c)) => (idx, c),
                None => return self.finish_input(),
            };

            let start_line = self.line;
            let start_column = self.column;
            match ch {
                '\n' => {
                    self.advance_char();
                    self.at_line_start = true;
                    if self.line_has_content {
                        self.line_has_content = false;
                        return Ok(Token::new(
                            TokenKind::Newline,
                            Span {
                                start: start_idx,
                                end: start_idx + 1,
                                line: start_line,
                                column: start_column,
                            },
                        ));
                    }
                }
                '#' => {
                    while let Some(&(_, c)) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance_char();
                    }
                }
                '"' | '\'' => {
                    self.line_has_content = true;
                    return self.read_string(ch, start_idx, start_line, start_column);
                }
                c if c.is_alphabetic() || c == '_' => {
                    self.line_has_content = true;
                    return Ok(self.read_identifier(start_idx, start_line, start_column));
                }
                c if c.is_ascii_digit() => {
                    self.line_has_content = true;
                    return self.read_number(start_idx, start_line, start_column);
                }
                _ => {
                    self.line_has_content = true;
                    return self.read_operator(start_idx, ch, start_line, start_column);
                }
            }
        }
    }

    /// End of input: flush the pending newline, unwind the indentation
    /// stack, then report `Eof`.
    fn finish_input(&mut self) -> Result<Token<'a>, LexError> {
        self.eof_reached = true;
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            let dedent = self.marker_token(TokenKind::Dedent);
            self.pending_tokens.push(dedent);
        }
        if self.line_has_content {
            self.line_has_content = false;
            return Ok(self.marker_token(TokenKind::Newline));
        }
        if let Some(token) = self.pending_tokens.pop() {
            return Ok(token);
        }
        Ok(self.marker_token(TokenKind::Eof))
    }

    /// Compares the leading-space run of a significant line against the
    /// indentation stack. Returns the Indent/Dedent token to emit, if any.
    fn handle_indentation(&mut self) -> Result<Option<Token<'a>>, LexError> {
        let width = match self.measure_indentation()? {
            Some(width) => width,
            None => return Ok(None),
        };

        let current = *self.indent_stack.last().unwrap_or(&0);
        let span = self.marker_span();

        if width > current {
            self.indent_stack.push(width);
            return Ok(Some(Token::new(TokenKind::Indent, span)));
        }
        if width < current {
            while let Some(&top) = self.indent_stack.last() {
                if top > width {
                    self.indent_stack.pop();
                    self.pending_tokens.push(Token::new(TokenKind::Dedent, span));
                } else {
                    break;
                }
            }
            if *self.indent_stack.last().unwrap_or(&0) != width {
                return Err(LexError::InvalidDedent {
                    width,
                    line: self.line,
                    column: self.column,
                });
            }
            return Ok(self.pending_tokens.pop());
        }
        Ok(None)
    }

    /// Consumes the leading spaces of the current line and returns their
    /// count, or `None` when the line is blank or comment-only and must not
    /// affect block structure.
    fn measure_indentation(&mut self) -> Result<Option<usize>, LexError> {
        let mut lookahead = self.chars.clone();
        let mut skipped = 0;
        loop {
            match lookahead.peek() {
                Some(&(_, ' ')) => {
                    lookahead.next();
                    skipped += 1;
                }
                Some(&(_, '\t')) => {
                    return Err(LexError::TabIndentation {
                        line: self.line,
                        column: self.column + skipped,
                    });
                }
                Some(&(_, '\n')) | Some(&(_, '#')) | None => return Ok(None),
                Some(_) => break,
            }
        }

        let mut width = 0;
        while let Some(&(_, ' ')) = self.chars.peek() {
            self.advance_char();
            width += 1;
        }
        Ok(Some(width))
    }

    fn skip_spaces(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c == ' ' || c == '\t' {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }

        let end = self.current_index();
        let ident = &self.input[start..end];
        let kind = match Keyword::from_ident(ident) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Name(ident),
        };
        Token::new(
            kind,
            Span {
                start,
                end,
                line,
                column,
            },
        )
    }

    fn read_number(
        &mut self,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<Token<'a>, LexError> {
        self.advance_char();
        self.consume_digits();

        let mut is_float = false;

        // A dot only belongs to the number when a digit follows; `1.foo`
        // must lex as an attribute access on `1`.
        if let Some(&(_, '.')) = self.chars.peek() {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if matches!(lookahead.peek(), Some(&(_, c)) if c.is_ascii_digit()) {
                is_float = true;
                self.advance_char();
                self.consume_digits();
            }
        }

        if let Some(&(_, c)) = self.chars.peek() {
            if c == 'e' || c == 'E' {
                let mut lookahead = self.chars.clone();
                lookahead.next();
                if matches!(lookahead.peek(), Some(&(_, s)) if s == '+' || s == '-') {
                    lookahead.next();
                }
                if matches!(lookahead.peek(), Some(&(_, d)) if d.is_ascii_digit()) {
                    is_float = true;
                    self.advance_char();
                    if matches!(self.chars.peek(), Some(&(_, s)) if s == '+' || s == '-') {
                        self.advance_char();
                    }
                    self.consume_digits();
                }
            }
        }

        let end = self.current_index();
        let literal = &self.input[start..end];
        let number = if is_float {
            literal
                .parse::<f64>()
                .map(Number::Float)
                .map_err(|_| LexError::InvalidNumber {
                    literal: literal.to_string(),
                    line,
                    column,
                })?
        } else {
            literal
                .parse::<i64>()
                .map(Number::Int)
                .map_err(|_| LexError::InvalidNumber {
                    literal: literal.to_string(),
                    line,
                    column,
                })?
        };

        Ok(Token::new(
            TokenKind::Number(number),
            Span {
                start,
                end,
                line,
                column,
            },
        ))
    }

    fn consume_digits(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn read_string(
        &mut self,
        quote: char,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<Token<'a>, LexError> {
        self.advance_char(); // opening quote
        let mut value = String::new();

        while let Some(&(idx, c)) = self.chars.peek() {
            match c {
                c if c == quote => {
                    self.advance_char();
                    return Ok(Token::new(
                        TokenKind::Str(value),
                        Span {
                            start,
                            end: idx + c.len_utf8(),
                            line,
                            column,
                        },
                    ));
                }
                '\n' => break,
                '\\' => {
                    self.advance_char();
                    match self.chars.peek() {
                        Some(&(_, escaped)) => {
                            self.advance_char();
                            match escaped {
                                'n' => value.push('\n'),
                                't' => value.push('\t'),
                                'r' => value.push('\r'),
                                '0' => value.push('\0'),
                                '\\' | '\'' | '"' => value.push(escaped),
                                other => {
                                    // Unknown escapes keep the backslash.
                                    value.push('\\');
                                    value.push(other);
                                }
                            }
                        }
                        None => break,
                    }
                }
                _ => {
                    value.push(c);
                    self.advance_char();
                }
            }
        }

        Err(LexError::UnterminatedString { line, column })
    }

    fn read_operator(
        &mut self,
        start: usize,
        ch: char,
        line: usize,
        column: usize,
    ) -> Result<Token<'a>, LexError> {
        self.advance_char();

        // Longest match first: two-character operators consume their second
        // character before the single-character fallback applies.
        let kind = match ch {
            '=' => {
                if self.eat('=') {
                    TokenKind::Op(Op::Eq)
                } else {
                    TokenKind::Op(Op::Assign)
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::Op(Op::NotEq)
                } else {
                    return Err(LexError::UnexpectedCharacter {
                        character: '!',
                        line,
                        column,
                    });
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::Op(Op::LessEq)
                } else {
                    TokenKind::Op(Op::Less)
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::Op(Op::GreaterEq)
                } else {
                    TokenKind::Op(Op::Greater)
                }
            }
            '/' => {
                if self.eat('/') {
                    TokenKind::Op(Op::FloorDiv)
                } else {
                    TokenKind::Op(Op::Slash)
                }
            }
            '+' => TokenKind::Op(Op::Plus),
            '-' => TokenKind::Op(Op::Minus),
            '*' => TokenKind::Op(Op::Star),
            '%' => TokenKind::Op(Op::Percent),
            ':' => TokenKind::Delim(Delim::Colon),
            ',' => TokenKind::Delim(Delim::Comma),
            '.' => TokenKind::Delim(Delim::Dot),
            '(' => TokenKind::Delim(Delim::LParen),
            ')' => TokenKind::Delim(Delim::RParen),
            '[' => TokenKind::Delim(Delim::LBracket),
            ']' => TokenKind::Delim(Delim::RBracket),
            '{' => TokenKind::Delim(Delim::LBrace),
            '}' => TokenKind::Delim(Delim::RBrace),
            other => {
                return Err(LexError::UnexpectedCharacter {
                    character: other,
                    line,
                    column,
                });
            }
        };

        let end = self.current_index();
        Ok(Token::new(
            kind,
            Span {
                start,
                end,
                line,
                column,
            },
        ))
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.advance_char();
            true
        } else {
            false
        }
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(idx, _)| idx)
            .unwrap_or(self.input.len())
    }

    /// Zero-width span at the current scan position, for structural tokens.
    fn marker_span(&mut self) -> Span {
        let index = self.current_index();
        Span {
            start: index,
            end: index,
            line: self.line,
            column: self.column,
        }
    }

    fn marker_token(&mut self, kind: TokenKind<'a>) -> Token<'a> {
        let span = self.marker_span();
        Token::new(kind, span)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_token())
    }
}

/// Scans the whole input eagerly. The returned sequence always ends with
/// exactly one `Eof` token.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}
