//! Recursive-descent parser over the lexer's token stream.
//!
//! One parsing function per grammar nonterminal, a single cursor with
//! one-token lookahead, and no backtracking: every statement form is
//! distinguishable by its first token, and binary expressions are resolved
//! by precedence climbing instead of trying alternatives.

use crate::ast::{
    BinaryOperator, Expr, ExprKind, ImportName, Module, Stmt, StmtKind, UnaryOperator,
};
use crate::error::SyntaxError;
use crate::token::{Delim, Keyword, Op, Span, Token, TokenKind};

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses the whole token sequence into a `Module`, leaving the cursor
    /// on the trailing `Eof`.
    pub fn parse_module(mut self) -> Result<Module, SyntaxError> {
        let mut body = Vec::new();
        while !self.at_eof() {
            body.push(self.parse_statement()?);
        }
        Ok(Module { body })
    }

    fn parse_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let span = self.current_span();
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Def) => self.parse_function_def(span),
            TokenKind::Keyword(Keyword::Class) => self.parse_class_def(span),
            TokenKind::Keyword(Keyword::If) => self.parse_if(span),
            TokenKind::Keyword(Keyword::While) => self.parse_while(span),
            TokenKind::Keyword(Keyword::For) => self.parse_for(span),
            TokenKind::Keyword(Keyword::Import) => self.parse_import(span),
            TokenKind::Keyword(Keyword::From) => self.parse_from_import(span),
            TokenKind::Keyword(Keyword::Return) => self.parse_return(span),
            TokenKind::Keyword(Keyword::Pass) => self.parse_simple(span, StmtKind::Pass),
            TokenKind::Keyword(Keyword::Break) => self.parse_simple(span, StmtKind::Break),
            TokenKind::Keyword(Keyword::Continue) => self.parse_simple(span, StmtKind::Continue),
            _ => self.parse_assignment_or_expr(span),
        }
    }

    fn parse_function_def(&mut self, span: Span) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::Def)?;
        let name = self.expect_name()?;
        self.expect_delim(Delim::LParen)?;
        let params = self.parse_params()?;
        self.expect_delim(Delim::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::FunctionDef { name, params, body },
            span,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut params = Vec::new();
        if self.at_delim(Delim::RParen) {
            return Ok(params);
        }
        loop {
            params.push(self.expect_name()?);
            if !self.consume_delim(Delim::Comma) {
                break;
            }
            if self.at_delim(Delim::RParen) {
                break; // trailing comma
            }
        }
        Ok(params)
    }

    fn parse_class_def(&mut self, span: Span) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::Class)?;
        let name = self.expect_name()?;
        let mut bases = Vec::new();
        if self.consume_delim(Delim::LParen) {
            if !self.at_delim(Delim::RParen) {
                loop {
                    bases.push(self.parse_expression()?);
                    if !self.consume_delim(Delim::Comma) {
                        break;
                    }
                    if self.at_delim(Delim::RParen) {
                        break;
                    }
                }
            }
            self.expect_delim(Delim::RParen)?;
        }
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::ClassDef { name, bases, body },
            span,
        })
    }

    fn parse_if(&mut self, span: Span) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::If)?;
        let test = self.parse_expression()?;
        let body = self.parse_block()?;
        let orelse = self.parse_orelse_of_if()?;
        Ok(Stmt {
            kind: StmtKind::If { test, body, orelse },
            span,
        })
    }

    /// `elif` becomes a nested `If` statement that is the sole element of
    /// the outer `orelse`.
    fn parse_orelse_of_if(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        if self.at_keyword(Keyword::Elif) {
            let span = self.current_span();
            self.expect_keyword(Keyword::Elif)?;
            let test = self.parse_expression()?;
            let body = self.parse_block()?;
            let orelse = self.parse_orelse_of_if()?;
            return Ok(vec![Stmt {
                kind: StmtKind::If { test, body, orelse },
                span,
            }]);
        }
        if self.consume_keyword(Keyword::Else) {
            return self.parse_block();
        }
        Ok(Vec::new())
    }

    fn parse_while(&mut self, span: Span) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::While)?;
        let test = self.parse_expression()?;
        let body = self.parse_block()?;
        let orelse = self.parse_loop_orelse()?;
        Ok(Stmt {
            kind: StmtKind::While { test, body, orelse },
            span,
        })
    }

    fn parse_for(&mut self, span: Span) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::For)?;
        let target = self.parse_postfix()?;
        self.check_assign_target(&target)?;
        self.expect_keyword(Keyword::In)?;
        let iter = self.parse_expression()?;
        let body = self.parse_block()?;
        let orelse = self.parse_loop_orelse()?;
        Ok(Stmt {
            kind: StmtKind::For {
                target,
                iter,
                body,
                orelse,
            },
            span,
        })
    }

    fn parse_loop_orelse(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        if self.consume_keyword(Keyword::Else) {
            self.parse_block()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_import(&mut self, span: Span) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::Import)?;
        let mut names = Vec::new();
        loop {
            names.push(self.parse_import_name()?);
            if !self.consume_delim(Delim::Comma) {
                break;
            }
        }
        self.expect_newline()?;
        Ok(Stmt {
            kind: StmtKind::Import { names },
            span,
        })
    }

    fn parse_from_import(&mut self, span: Span) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::From)?;
        let module = self.parse_dotted_name()?;
        self.expect_keyword(Keyword::Import)?;
        let mut names = Vec::new();
        loop {
            let name = self.expect_name()?;
            let alias = if self.consume_keyword(Keyword::As) {
                Some(self.expect_name()?)
            } else {
                None
            };
            names.push(ImportName { name, alias });
            if !self.consume_delim(Delim::Comma) {
                break;
            }
        }
        self.expect_newline()?;
        Ok(Stmt {
            kind: StmtKind::FromImport { module, names },
            span,
        })
    }

    fn parse_import_name(&mut self) -> Result<ImportName, SyntaxError> {
        let name = self.parse_dotted_name()?;
        let alias = if self.consume_keyword(Keyword::As) {
            Some(self.expect_name()?)
        } else {
            None
        };
        Ok(ImportName { name, alias })
    }

    fn parse_dotted_name(&mut self) -> Result<String, SyntaxError> {
        let mut dotted = self.expect_name()?;
        while self.consume_delim(Delim::Dot) {
            dotted.push('.');
            dotted.push_str(&self.expect_name()?);
        }
        Ok(dotted)
    }

    fn parse_return(&mut self, span: Span) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::Return)?;
        let value = if self.at_newline() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_newline()?;
        Ok(Stmt {
            kind: StmtKind::Return(value),
            span,
        })
    }

    fn parse_simple(&mut self, span: Span, kind: StmtKind) -> Result<Stmt, SyntaxError> {
        self.advance();
        self.expect_newline()?;
        Ok(Stmt { kind, span })
    }

    /// Parses an expression, then reinterprets it as an assignment target
    /// when `=` follows. Chained assignments collect every expression before
    /// the last `=` as a target.
    fn parse_assignment_or_expr(&mut self, span: Span) -> Result<Stmt, SyntaxError> {
        let mut expr = self.parse_expression()?;
        let mut targets = Vec::new();
        while self.at_op(Op::Assign) {
            self.check_assign_target(&expr)?;
            self.advance();
            targets.push(expr);
            expr = self.parse_expression()?;
        }
        self.expect_newline()?;
        let kind = if targets.is_empty() {
            StmtKind::Expr(expr)
        } else {
            StmtKind::Assign {
                targets,
                value: expr,
            }
        };
        Ok(Stmt { kind, span })
    }

    fn check_assign_target(&self, expr: &Expr) -> Result<(), SyntaxError> {
        match expr.kind {
            ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => Ok(()),
            _ => Err(SyntaxError::InvalidAssignTarget {
                line: expr.span.line,
                column: expr.span.column,
            }),
        }
    }

    /// `: NEWLINE INDENT stmt+ DEDENT` — the body of every compound
    /// statement.
    fn parse_block(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let opening = self.current_span();
        self.expect_delim(Delim::Colon)?;
        self.expect_newline()?;
        self.expect_indent()?;
        let mut body = Vec::new();
        loop {
            if self.at_eof() {
                return Err(SyntaxError::UnterminatedBlock {
                    line: opening.line,
                    column: opening.column,
                });
            }
            if matches!(self.current_kind(), TokenKind::Dedent) {
                self.advance();
                break;
            }
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    // Expressions, via precedence climbing. Each binary operator has a
    // fixed binding power; left associativity comes from recursing with
    // `power + 1` as the new minimum.

    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_power: u8) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.current_binary_op() {
            let power = binding_power(op);
            if power < min_power {
                break;
            }
            self.advance();
            let right = self.parse_binary(power + 1)?;
            let span = left.span;
            left = Expr {
                kind: ExprKind::BinaryOp {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            };
        }
        Ok(left)
    }

    fn current_binary_op(&self) -> Option<BinaryOperator> {
        let op = match self.current_kind() {
            TokenKind::Keyword(Keyword::Or) => BinaryOperator::Or,
            TokenKind::Keyword(Keyword::And) => BinaryOperator::And,
            TokenKind::Op(Op::Eq) => BinaryOperator::Eq,
            TokenKind::Op(Op::NotEq) => BinaryOperator::NotEq,
            TokenKind::Op(Op::Less) => BinaryOperator::Less,
            TokenKind::Op(Op::Greater) => BinaryOperator::Greater,
            TokenKind::Op(Op::LessEq) => BinaryOperator::LessEq,
            TokenKind::Op(Op::GreaterEq) => BinaryOperator::GreaterEq,
            TokenKind::Op(Op::Plus) => BinaryOperator::Add,
            TokenKind::Op(Op::Minus) => BinaryOperator::Sub,
            TokenKind::Op(Op::Star) => BinaryOperator::Mul,
            TokenKind::Op(Op::Slash) => BinaryOperator::Div,
            TokenKind::Op(Op::FloorDiv) => BinaryOperator::FloorDiv,
            TokenKind::Op(Op::Percent) => BinaryOperator::Mod,
            _ => return None,
        };
        Some(op)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let span = self.current_span();
        if self.consume_keyword(Keyword::Not) {
            let operand = self.parse_unary()?;
            return Ok(Expr {
                kind: ExprKind::UnaryOp {
                    op: UnaryOperator::Not,
                    operand: Box::new(operand),
                },
                span,
            });
        }
        if self.at_op(Op::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr {
                kind: ExprKind::UnaryOp {
                    op: UnaryOperator::Neg,
                    operand: Box::new(operand),
                },
                span,
            });
        }
        self.parse_postfix()
    }

    /// Postfix suffixes bind tightest: calls, attribute access, and
    /// subscripts chain left to right.
    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;
        loop {
            let span = expr.span;
            match self.current_kind() {
                TokenKind::Delim(Delim::LParen) => {
                    self.advance();
                    let args = self.parse_call_args()?;
                    self.expect_delim(Delim::RParen)?;
                    expr = Expr {
                        kind: ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    };
                }
                TokenKind::Delim(Delim::Dot) => {
                    self.advance();
                    let name = self.expect_name()?;
                    expr = Expr {
                        kind: ExprKind::Attribute {
                            object: Box::new(expr),
                            name,
                        },
                        span,
                    };
                }
                TokenKind::Delim(Delim::LBracket) => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect_delim(Delim::RBracket)?;
                    expr = Expr {
                        kind: ExprKind::Subscript {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        if self.at_delim(Delim::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.consume_delim(Delim::Comma) {
                break;
            }
            if self.at_delim(Delim::RParen) {
                break;
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let span = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Number(value) => {
                let value = *value;
                self.advance();
                ExprKind::Number(value)
            }
            TokenKind::Str(value) => {
                let value = value.clone();
                self.advance();
                ExprKind::Str(value)
            }
            TokenKind::Name(name) => {
                let name = name.to_string();
                self.advance();
                ExprKind::Name(name)
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Keyword(Keyword::None) => {
                self.advance();
                ExprKind::NoneLiteral
            }
            TokenKind::Delim(Delim::LParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_delim(Delim::RParen)?;
                // Grouping parentheses leave no trace in the tree.
                return Ok(inner);
            }
            TokenKind::Delim(Delim::LBracket) => return self.parse_list(span),
            TokenKind::Delim(Delim::LBrace) => return self.parse_dict(span),
            _ => return Err(self.expected("an expression")),
        };
        Ok(Expr { kind, span })
    }

    fn parse_list(&mut self, span: Span) -> Result<Expr, SyntaxError> {
        self.expect_delim(Delim::LBracket)?;
        let mut elements = Vec::new();
        if !self.at_delim(Delim::RBracket) {
            loop {
                elements.push(self.parse_expression()?);
                if !self.consume_delim(Delim::Comma) {
                    break;
                }
                if self.at_delim(Delim::RBracket) {
                    break;
                }
            }
        }
        self.expect_delim(Delim::RBracket)?;
        Ok(Expr {
            kind: ExprKind::List(elements),
            span,
        })
    }

    fn parse_dict(&mut self, span: Span) -> Result<Expr, SyntaxError> {
        self.expect_delim(Delim::LBrace)?;
        let mut items = Vec::new();
        if !self.at_delim(Delim::RBrace) {
            loop {
                let key = self.parse_expression()?;
                self.expect_delim(Delim::Colon)?;
                let value = self.parse_expression()?;
                items.push((key, value));
                if !self.consume_delim(Delim::Comma) {
                    break;
                }
                if self.at_delim(Delim::RBrace) {
                    break;
                }
            }
        }
        self.expect_delim(Delim::RBrace)?;
        Ok(Expr {
            kind: ExprKind::Dict(items),
            span,
        })
    }

    // Cursor plumbing.

    fn current(&self) -> &Token<'a> {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .expect("token stream must not be empty")
    }

    fn current_kind(&self) -> &TokenKind<'a> {
        &self.current().kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof) || self.position >= self.tokens.len()
    }

    fn at_newline(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Newline)
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.current_kind(), TokenKind::Keyword(k) if *k == keyword)
    }

    fn at_op(&self, op: Op) -> bool {
        matches!(self.current_kind(), TokenKind::Op(o) if *o == op)
    }

    fn at_delim(&self, delim: Delim) -> bool {
        matches!(self.current_kind(), TokenKind::Delim(d) if *d == delim)
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_delim(&mut self, delim: Delim) -> bool {
        if self.at_delim(delim) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), SyntaxError> {
        if self.consume_keyword(keyword) {
            Ok(())
        } else {
            Err(self.expected(&format!("keyword '{}'", keyword.as_str())))
        }
    }

    fn expect_delim(&mut self, delim: Delim) -> Result<(), SyntaxError> {
        if self.consume_delim(delim) {
            Ok(())
        } else {
            Err(self.expected(&format!("'{}'", delim.as_str())))
        }
    }

    fn expect_newline(&mut self) -> Result<(), SyntaxError> {
        if self.at_newline() {
            self.advance();
            Ok(())
        } else {
            Err(self.expected("newline"))
        }
    }

    fn expect_indent(&mut self) -> Result<(), SyntaxError> {
        if matches!(self.current_kind(), TokenKind::Indent) {
            self.advance();
            Ok(())
        } else {
            Err(self.expected("an indented block"))
        }
    }

    fn expect_name(&mut self) -> Result<String, SyntaxError> {
        if let TokenKind::Name(name) = self.current_kind() {
            let name = name.to_string();
            self.advance();
            Ok(name)
        } else {
            Err(self.expected("an identifier"))
        }
    }

    fn expected(&self, expected: &str) -> SyntaxError {
        let token = self.current();
        SyntaxError::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind.to_string(),
            line: token.span.line,
            column: token.span.column,
        }
    }
}

fn binding_power(op: BinaryOperator) -> u8 {
    match op {
        BinaryOperator::Or => 1,
        BinaryOperator::And => 2,
        BinaryOperator::Eq
        | BinaryOperator::NotEq
        | BinaryOperator::Less
        | BinaryOperator::Greater
        | BinaryOperator::LessEq
        | BinaryOperator::GreaterEq => 3,
        BinaryOperator::Add | BinaryOperator::Sub => 4,
        BinaryOperator::Mul
        | BinaryOperator::Div
        | BinaryOperator::FloorDiv
        | BinaryOperator::Mod => 5,
    }
}

/// Parses a complete token sequence, as produced by [`crate::lexer::tokenize`],
/// into the tree root.
pub fn parse_tokens(tokens: Vec<Token<'_>>) -> Result<Module, SyntaxError> {
    if tokens.is_empty() {
        return Ok(Module { body: Vec::new() });
    }
    Parser::new(tokens).parse_module()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Number;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse(input: &str) -> Result<Module, SyntaxError> {
        let tokens = tokenize(input).expect("tokenize should succeed");
        parse_tokens(tokens)
    }

    fn parse_ok(input: &str) -> Module {
        parse(input).expect("parse should succeed")
    }

    /// Strips spans so tests can compare structure only.
    fn shape(expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Name(name) => format!("Name({name})"),
            ExprKind::Number(Number::Int(v)) => format!("Int({v})"),
            ExprKind::Number(Number::Float(v)) => format!("Float({v})"),
            ExprKind::Str(v) => format!("Str({v})"),
            ExprKind::Bool(v) => format!("Bool({v})"),
            ExprKind::NoneLiteral => "None".to_string(),
            ExprKind::List(items) => {
                let items: Vec<_> = items.iter().map(shape).collect();
                format!("List[{}]", items.join(", "))
            }
            ExprKind::Dict(items) => {
                let items: Vec<_> = items
                    .iter()
                    .map(|(k, v)| format!("{}: {}", shape(k), shape(v)))
                    .collect();
                format!("Dict{{{}}}", items.join(", "))
            }
            ExprKind::Attribute { object, name } => format!("Attr({}, {name})", shape(object)),
            ExprKind::Subscript { object, index } => {
                format!("Sub({}, {})", shape(object), shape(index))
            }
            ExprKind::BinaryOp { op, left, right } => {
                format!("({:?} {} {})", op, shape(left), shape(right))
            }
            ExprKind::UnaryOp { op, operand } => format!("({:?} {})", op, shape(operand)),
            ExprKind::Call { callee, args } => {
                let args: Vec<_> = args.iter().map(shape).collect();
                format!("Call({}, [{}])", shape(callee), args.join(", "))
            }
        }
    }

    fn expr_stmt_shape(stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::Expr(expr) => shape(expr),
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_simple_program() {
        let module = parse_ok(indoc! {"
            def fn():
                n = 4 + 4
                print(n)
            fn()
        "});
        assert_eq!(module.body.len(), 2);
        match &module.body[0].kind {
            StmtKind::FunctionDef { name, params, body } => {
                assert_eq!(name, "fn");
                assert!(params.is_empty());
                assert_eq!(body.len(), 2);
                match &body[0].kind {
                    StmtKind::Assign { targets, value } => {
                        assert_eq!(targets.len(), 1);
                        assert_eq!(shape(&targets[0]), "Name(n)");
                        assert_eq!(shape(value), "(Add Int(4) Int(4))");
                    }
                    other => panic!("expected assignment, got {other:?}"),
                }
                assert_eq!(expr_stmt_shape(&body[1]), "Call(Name(print), [Name(n)])");
            }
            other => panic!("expected function definition, got {other:?}"),
        }
        assert_eq!(expr_stmt_shape(&module.body[1]), "Call(Name(fn), [])");
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let module = parse_ok("a + b * c\n");
        assert_eq!(
            expr_stmt_shape(&module.body[0]),
            "(Add Name(a) (Mul Name(b) Name(c)))"
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        let module = parse_ok("(a + b) * c\n");
        assert_eq!(
            expr_stmt_shape(&module.body[0]),
            "(Mul (Add Name(a) Name(b)) Name(c))"
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let module = parse_ok("a - b - c\n");
        assert_eq!(
            expr_stmt_shape(&module.body[0]),
            "(Sub (Sub Name(a) Name(b)) Name(c))"
        );
    }

    #[test]
    fn comparison_binds_looser_than_arithmetic() {
        let module = parse_ok("a + 1 < b * 2 or done\n");
        assert_eq!(
            expr_stmt_shape(&module.body[0]),
            "(Or (Less (Add Name(a) Int(1)) (Mul Name(b) Int(2))) Name(done))"
        );
    }

    #[test]
    fn unary_operators_bind_tighter_than_binary() {
        let module = parse_ok("-a + not b\n");
        assert_eq!(
            expr_stmt_shape(&module.body[0]),
            "(Add (Neg Name(a)) (Not Name(b)))"
        );
    }

    #[test]
    fn postfix_chains_bind_tightest() {
        let module = parse_ok("-obj.items[0].count()\n");
        assert_eq!(
            expr_stmt_shape(&module.body[0]),
            "(Neg Call(Attr(Sub(Attr(Name(obj), items), Int(0)), count), []))"
        );
    }

    #[test]
    fn parses_if_else_shape() {
        let module = parse_ok("if x:\n    y = 1\nelse:\n    y = 2\n");
        match &module.body[0].kind {
            StmtKind::If { test, body, orelse } => {
                assert_eq!(shape(test), "Name(x)");
                assert_eq!(body.len(), 1);
                assert_eq!(orelse.len(), 1);
            }
            other => panic!("expected if statement, got {other:?}"),
        }
    }

    #[test]
    fn elif_nests_inside_orelse() {
        let module = parse_ok(indoc! {"
            if a:
                x = 1
            elif b:
                x = 2
            else:
                x = 3
        "});
        match &module.body[0].kind {
            StmtKind::If { orelse, .. } => {
                assert_eq!(orelse.len(), 1);
                match &orelse[0].kind {
                    StmtKind::If { test, orelse, .. } => {
                        assert_eq!(shape(test), "Name(b)");
                        assert_eq!(orelse.len(), 1);
                    }
                    other => panic!("expected nested if, got {other:?}"),
                }
            }
            other => panic!("expected if statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_function_with_params() {
        let module = parse_ok("def f(a, b):\n    return a\n");
        match &module.body[0].kind {
            StmtKind::FunctionDef { name, params, body } => {
                assert_eq!(name, "f");
                assert_eq!(params, &["a".to_string(), "b".to_string()]);
                assert_eq!(body.len(), 1);
                assert!(matches!(body[0].kind, StmtKind::Return(Some(_))));
            }
            other => panic!("expected function definition, got {other:?}"),
        }
    }

    #[test]
    fn parses_class_with_bases() {
        let module = parse_ok(indoc! {"
            class Dog(Animal):
                def bark(self):
                    pass
        "});
        match &module.body[0].kind {
            StmtKind::ClassDef { name, bases, body } => {
                assert_eq!(name, "Dog");
                assert_eq!(bases.len(), 1);
                assert_eq!(shape(&bases[0]), "Name(Animal)");
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected class definition, got {other:?}"),
        }
    }

    #[test]
    fn parses_loops_with_orelse() {
        let module = parse_ok(indoc! {"
            while n < 10:
                n = n + 1
            else:
                done = True
            for item in items:
                total = total + item
        "});
        match &module.body[0].kind {
            StmtKind::While { test, orelse, .. } => {
                assert_eq!(shape(test), "(Less Name(n) Int(10))");
                assert_eq!(orelse.len(), 1);
            }
            other => panic!("expected while statement, got {other:?}"),
        }
        match &module.body[1].kind {
            StmtKind::For {
                target,
                iter,
                orelse,
                ..
            } => {
                assert_eq!(shape(target), "Name(item)");
                assert_eq!(shape(iter), "Name(items)");
                assert!(orelse.is_empty());
            }
            other => panic!("expected for statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_imports() {
        let module = parse_ok("import os.path, sys as system\nfrom collections import deque as dq, Counter\n");
        match &module.body[0].kind {
            StmtKind::Import { names } => {
                assert_eq!(names.len(), 2);
                assert_eq!(names[0].name, "os.path");
                assert_eq!(names[0].alias, None);
                assert_eq!(names[1].name, "sys");
                assert_eq!(names[1].alias.as_deref(), Some("system"));
            }
            other => panic!("expected import statement, got {other:?}"),
        }
        match &module.body[1].kind {
            StmtKind::FromImport { module, names } => {
                assert_eq!(module, "collections");
                assert_eq!(names.len(), 2);
                assert_eq!(names[0].alias.as_deref(), Some("dq"));
                assert_eq!(names[1].name, "Counter");
            }
            other => panic!("expected from-import statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_chained_assignment() {
        let module = parse_ok("a = b.attr = c[0] = 1\n");
        match &module.body[0].kind {
            StmtKind::Assign { targets, value } => {
                assert_eq!(targets.len(), 3);
                assert_eq!(shape(&targets[0]), "Name(a)");
                assert_eq!(shape(&targets[1]), "Attr(Name(b), attr)");
                assert_eq!(shape(&targets[2]), "Sub(Name(c), Int(0))");
                assert_eq!(shape(value), "Int(1)");
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn parses_literals_and_collections() {
        let module = parse_ok("x = [1, 2.5, \"s\", True, None]\ny = {\"a\": 1, \"b\": 2}\n");
        match &module.body[0].kind {
            StmtKind::Assign { value, .. } => {
                assert_eq!(
                    shape(value),
                    "List[Int(1), Float(2.5), Str(s), Bool(true), None]"
                );
            }
            other => panic!("expected assignment, got {other:?}"),
        }
        match &module.body[1].kind {
            StmtKind::Assign { value, .. } => {
                assert_eq!(shape(value), "Dict{Str(a): Int(1), Str(b): Int(2)}");
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn rejects_assignment_to_literal() {
        let err = parse("1 = x\n").expect_err("expected syntax failure");
        assert_eq!(
            err,
            SyntaxError::InvalidAssignTarget { line: 1, column: 1 }
        );
    }

    #[test]
    fn missing_rhs_fails_at_the_newline() {
        let err = parse("x = \n").expect_err("expected syntax failure");
        assert_eq!(
            err,
            SyntaxError::UnexpectedToken {
                expected: "an expression".to_string(),
                found: "newline".to_string(),
                line: 1,
                column: 5,
            }
        );
    }

    #[test]
    fn missing_block_body_fails() {
        let err = parse("if x:\n").expect_err("expected syntax failure");
        assert!(matches!(
            err,
            SyntaxError::UnexpectedToken { ref expected, .. } if expected == "an indented block"
        ));
    }

    #[test]
    fn unindented_block_body_fails() {
        let err = parse("if x:\nprint(1)\n").expect_err("expected syntax failure");
        assert!(matches!(
            err,
            SyntaxError::UnexpectedToken { ref expected, line: 2, .. } if expected == "an indented block"
        ));
    }

    #[test]
    fn block_never_dedented_fails() {
        // Hand-built token stream: a block that hits Eof before any Dedent.
        // The lexer itself always flushes Dedents, but parse_tokens accepts
        // token sequences from any producer.
        let span = Span::default();
        let tokens = vec![
            Token::new(TokenKind::Keyword(Keyword::If), span),
            Token::new(TokenKind::Name("x"), span),
            Token::new(TokenKind::Delim(Delim::Colon), span),
            Token::new(TokenKind::Newline, span),
            Token::new(TokenKind::Indent, span),
            Token::new(TokenKind::Name("y"), span),
            Token::new(TokenKind::Newline, span),
            Token::new(TokenKind::Eof, span),
        ];
        let err = parse_tokens(tokens).expect_err("expected syntax failure");
        assert!(matches!(err, SyntaxError::UnterminatedBlock { .. }));
    }

    #[test]
    fn statement_spans_point_at_first_token() {
        let module = parse_ok("x = 1\nif x:\n    pass\n");
        assert_eq!(
            (module.body[0].span.line, module.body[0].span.column),
            (1, 1)
        );
        assert_eq!(
            (module.body[1].span.line, module.body[1].span.column),
            (2, 1)
        );
    }

    #[test]
    fn parsing_is_deterministic() {
        let input = indoc! {"
            class Counter:
                def tick(self):
                    self.n = self.n + 1
                    return self.n

            c = Counter()
            while c.tick() < 3:
                pass
        "};
        let first = parse_ok(input);
        let second = parse_ok(input);
        assert_eq!(first, second);
    }
}
