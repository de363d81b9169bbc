use thiserror::Error;

use crate::ast::{
    AugOp, BinOp, BoolOp, CmpOp, Expr, ExprKind, Module, NameConstant, Position, Stmt, StmtKind,
    UnaryOp,
};
use crate::token::{Token, TokenKind};

pub mod ast;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected}, got {found}('{lexeme}') at line {line}")]
    UnexpectedToken {
        expected: String,
        found: String,
        lexeme: String,
        line: usize,
    },
    #[error("unexpected token {found} at line {line}")]
    UnexpectedExprToken { found: String, line: usize },
    #[error("invalid number {literal} at line {line}")]
    InvalidNumber { literal: String, line: usize },
    #[error("indentation error at line {line}")]
    IndentationError { line: usize },
    #[error("unexpected character '{character}' at line {line}")]
    IllegalCharacter { character: String, line: usize },
    #[error("expected function name at line {line}")]
    ExpectedFunctionName { line: usize },
    #[error("expected parameter name at line {line}")]
    ExpectedParameterName { line: usize },
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    eof: Token,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            eof: Token::new(TokenKind::Eof, "", 0, 0),
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn here(&self) -> Position {
        Position::new(self.current().line, self.current().column)
    }

    /// Illegal tokens from the lexer become parse errors at the point the
    /// parser first looks at them.
    fn check_illegal(&self) -> Result<(), ParseError> {
        let token = self.current();
        if token.kind != TokenKind::Illegal {
            return Ok(());
        }
        if token.lexeme == "indentation error" {
            Err(ParseError::IndentationError { line: token.line })
        } else {
            Err(ParseError::IllegalCharacter {
                character: token.lexeme.clone(),
                line: token.line,
            })
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        self.check_illegal()?;
        let token = self.current();
        if token.kind != kind {
            return Err(ParseError::UnexpectedToken {
                expected: kind.to_string(),
                found: token.kind.to_string(),
                lexeme: token.lexeme.clone(),
                line: token.line,
            });
        }
        self.advance();
        Ok(())
    }

    fn skip_newlines(&mut self) {
        while self.current().kind == TokenKind::Newline {
            self.advance();
        }
    }

    pub fn parse(mut self) -> Result<Module, ParseError> {
        let mut body = Vec::new();

        self.skip_newlines();
        while self.current().kind != TokenKind::Eof {
            body.push(self.parse_stmt()?);
            self.skip_newlines();
        }

        Ok(Module {
            body,
            position: Position::new(1, 1),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.check_illegal()?;
        match self.current().kind {
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Def => self.parse_func_def(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Pass => self.parse_pass_stmt(),
            TokenKind::Print => self.parse_print_stmt(),
            _ => self.parse_assign_or_expr_stmt(),
        }
    }

    /// Parses one expression, then decides between an assignment, an
    /// augmented assignment, and a plain expression statement based on the
    /// following token. Target validity is enforced by the compiler.
    fn parse_assign_or_expr_stmt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.here();
        let expr = self.parse_expr()?;

        match self.current().kind {
            TokenKind::Assign => {
                self.advance();
                let value = self.parse_expr()?;
                Ok(Stmt::new(
                    StmtKind::Assign {
                        target: expr,
                        value,
                    },
                    pos,
                ))
            }
            TokenKind::PlusAssign => {
                self.advance();
                let value = self.parse_expr()?;
                Ok(Stmt::new(
                    StmtKind::AugAssign {
                        target: expr,
                        op: AugOp::Add,
                        value,
                    },
                    pos,
                ))
            }
            TokenKind::MinusAssign => {
                self.advance();
                let value = self.parse_expr()?;
                Ok(Stmt::new(
                    StmtKind::AugAssign {
                        target: expr,
                        op: AugOp::Sub,
                        value,
                    },
                    pos,
                ))
            }
            _ => Ok(Stmt::new(StmtKind::Expr(expr), pos)),
        }
    }

    fn parse_print_stmt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.here();
        self.advance();

        let mut values = Vec::new();
        if !matches!(self.current().kind, TokenKind::Newline | TokenKind::Eof) {
            values.push(self.parse_expr()?);
            while self.current().kind == TokenKind::Comma {
                self.advance();
                values.push(self.parse_expr()?);
            }
        }

        Ok(Stmt::new(StmtKind::Print(values), pos))
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.here();
        self.advance();

        let test = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_block()?;

        let mut orelse = Vec::new();
        match self.current().kind {
            TokenKind::Else => {
                self.advance();
                self.expect(TokenKind::Colon)?;
                orelse = self.parse_block()?;
            }
            TokenKind::Elif => {
                // elif chains nest as a single If statement in orelse.
                orelse.push(self.parse_if_stmt()?);
            }
            _ => {}
        }

        Ok(Stmt::new(StmtKind::If { test, body, orelse }, pos))
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.here();
        self.advance();

        let test = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_block()?;

        Ok(Stmt::new(StmtKind::While { test, body }, pos))
    }

    fn parse_for_stmt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.here();
        self.advance();

        let target = self.parse_atom()?;
        self.expect(TokenKind::In)?;
        let iter = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_block()?;

        Ok(Stmt::new(StmtKind::For { target, iter, body }, pos))
    }

    fn parse_func_def(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.here();
        self.advance();

        self.check_illegal()?;
        if self.current().kind != TokenKind::Ident {
            return Err(ParseError::ExpectedFunctionName {
                line: self.current().line,
            });
        }
        let name = self.current().lexeme.clone();
        self.advance();

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.current().kind == TokenKind::Ident {
            params.push(self.current().lexeme.clone());
            self.advance();

            while self.current().kind == TokenKind::Comma {
                self.advance();
                if self.current().kind != TokenKind::Ident {
                    return Err(ParseError::ExpectedParameterName {
                        line: self.current().line,
                    });
                }
                params.push(self.current().lexeme.clone());
                self.advance();
            }
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Colon)?;

        let body = self.parse_block()?;

        Ok(Stmt::new(StmtKind::FuncDef { name, params, body }, pos))
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.here();
        self.advance();

        let value = if matches!(self.current().kind, TokenKind::Newline | TokenKind::Eof) {
            None
        } else {
            Some(self.parse_expr()?)
        };

        Ok(Stmt::new(StmtKind::Return(value), pos))
    }

    fn parse_pass_stmt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.here();
        self.advance();
        Ok(Stmt::new(StmtKind::Pass, pos))
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.skip_newlines();
        self.expect(TokenKind::Indent)?;

        let mut stmts = Vec::new();
        while !matches!(self.current().kind, TokenKind::Dedent | TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
            self.skip_newlines();
        }

        // A block may also be closed by end of input.
        if self.current().kind == TokenKind::Dedent {
            self.advance();
        }

        Ok(stmts)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_and_expr()?;

        if self.current().kind != TokenKind::Or {
            return Ok(left);
        }

        let pos = self.here();
        let mut values = vec![left];
        while self.current().kind == TokenKind::Or {
            self.advance();
            values.push(self.parse_and_expr()?);
        }

        Ok(Expr::new(
            ExprKind::BoolOp {
                op: BoolOp::Or,
                values,
            },
            pos,
        ))
    }

    fn parse_and_expr(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_not_expr()?;

        if self.current().kind != TokenKind::And {
            return Ok(left);
        }

        let pos = self.here();
        let mut values = vec![left];
        while self.current().kind == TokenKind::And {
            self.advance();
            values.push(self.parse_not_expr()?);
        }

        Ok(Expr::new(
            ExprKind::BoolOp {
                op: BoolOp::And,
                values,
            },
            pos,
        ))
    }

    fn parse_not_expr(&mut self) -> Result<Expr, ParseError> {
        if self.current().kind == TokenKind::Not {
            let pos = self.here();
            self.advance();
            let operand = self.parse_not_expr()?;
            return Ok(Expr::new(
                ExprKind::UnaryOp {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                pos,
            ));
        }
        self.parse_compare_expr()
    }

    fn compare_op(&self) -> Option<CmpOp> {
        match self.current().kind {
            TokenKind::Eq => Some(CmpOp::Eq),
            TokenKind::NotEq => Some(CmpOp::NotEq),
            TokenKind::Lt => Some(CmpOp::Lt),
            TokenKind::LtEq => Some(CmpOp::LtEq),
            TokenKind::Gt => Some(CmpOp::Gt),
            TokenKind::GtEq => Some(CmpOp::GtEq),
            TokenKind::In => Some(CmpOp::In),
            _ => None,
        }
    }

    fn parse_compare_expr(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_arith_expr()?;

        if self.compare_op().is_none() {
            return Ok(left);
        }

        let pos = self.here();
        let mut ops = Vec::new();
        let mut rights = Vec::new();
        while let Some(op) = self.compare_op() {
            ops.push(op);
            self.advance();
            rights.push(self.parse_arith_expr()?);
        }

        Ok(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
                rights,
            },
            pos,
        ))
    }

    fn parse_arith_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term_expr()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let pos = self.here();
            self.advance();
            let right = self.parse_term_expr()?;
            left = Expr::new(
                ExprKind::BinaryOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                pos,
            );
        }

        Ok(left)
    }

    fn parse_term_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor_expr()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let pos = self.here();
            self.advance();
            let right = self.parse_factor_expr()?;
            left = Expr::new(
                ExprKind::BinaryOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                pos,
            );
        }

        Ok(left)
    }

    fn parse_factor_expr(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current().kind {
            TokenKind::Plus => UnaryOp::Pos,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_call_expr(),
        };
        let pos = self.here();
        self.advance();
        let operand = self.parse_factor_expr()?;
        Ok(Expr::new(
            ExprKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            pos,
        ))
    }

    fn parse_call_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_atom()?;

        loop {
            match self.current().kind {
                TokenKind::LParen => {
                    let pos = self.here();
                    self.advance();
                    let mut args = Vec::new();

                    if self.current().kind != TokenKind::RParen {
                        args.push(self.parse_expr()?);
                        while self.current().kind == TokenKind::Comma {
                            self.advance();
                            if self.current().kind == TokenKind::RParen {
                                break;
                            }
                            args.push(self.parse_expr()?);
                        }
                    }
                    self.expect(TokenKind::RParen)?;

                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        pos,
                    );
                }
                TokenKind::LBracket => {
                    let pos = self.here();
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;

                    expr = Expr::new(
                        ExprKind::Subscript {
                            value: Box::new(expr),
                            index: Box::new(index),
                        },
                        pos,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        self.check_illegal()?;
        let pos = self.here();
        match self.current().kind {
            TokenKind::Int => {
                let literal = self.current().lexeme.clone();
                let line = self.current().line;
                self.advance();
                let value = literal
                    .parse::<i64>()
                    .map_err(|_| ParseError::InvalidNumber { literal, line })?;
                Ok(Expr::new(ExprKind::Int(value), pos))
            }
            TokenKind::Float => {
                let literal = self.current().lexeme.clone();
                let line = self.current().line;
                self.advance();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidNumber { literal, line })?;
                Ok(Expr::new(ExprKind::Float(value), pos))
            }
            TokenKind::Str => {
                let value = self.current().lexeme.clone();
                self.advance();
                Ok(Expr::new(ExprKind::Str(value), pos))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(ExprKind::NameConstant(NameConstant::True), pos))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(ExprKind::NameConstant(NameConstant::False), pos))
            }
            TokenKind::None => {
                self.advance();
                Ok(Expr::new(ExprKind::NameConstant(NameConstant::None), pos))
            }
            // `range` lexes as a keyword but behaves as an ordinary name.
            TokenKind::Ident | TokenKind::Range => {
                let name = self.current().lexeme.clone();
                self.advance();
                Ok(Expr::new(ExprKind::Name(name), pos))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_dict(),
            other => Err(ParseError::UnexpectedExprToken {
                found: other.to_string(),
                line: self.current().line,
            }),
        }
    }

    fn parse_list(&mut self) -> Result<Expr, ParseError> {
        let pos = self.here();
        self.advance();

        let mut elements = Vec::new();
        if self.current().kind != TokenKind::RBracket {
            elements.push(self.parse_expr()?);
            while self.current().kind == TokenKind::Comma {
                self.advance();
                if self.current().kind == TokenKind::RBracket {
                    break;
                }
                elements.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RBracket)?;

        Ok(Expr::new(ExprKind::List(elements), pos))
    }

    fn parse_dict(&mut self) -> Result<Expr, ParseError> {
        let pos = self.here();
        self.advance();

        let mut keys = Vec::new();
        let mut values = Vec::new();
        if self.current().kind != TokenKind::RBrace {
            keys.push(self.parse_expr()?);
            self.expect(TokenKind::Colon)?;
            values.push(self.parse_expr()?);

            while self.current().kind == TokenKind::Comma {
                self.advance();
                if self.current().kind == TokenKind::RBrace {
                    break;
                }
                keys.push(self.parse_expr()?);
                self.expect(TokenKind::Colon)?;
                values.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RBrace)?;

        Ok(Expr::new(ExprKind::Dict { keys, values }, pos))
    }
}

pub fn parse_tokens(tokens: Vec<Token>) -> Result<Module, ParseError> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse(source: &str) -> Module {
        parse_tokens(tokenize(source)).expect("parse failed")
    }

    fn parse_err(source: &str) -> ParseError {
        parse_tokens(tokenize(source)).expect_err("expected parse failure")
    }

    #[test]
    fn parses_assignment_and_expression_statements() {
        let module = parse("x = 1\nx\n");
        assert_eq!(module.body.len(), 2);
        match &module.body[0].kind {
            StmtKind::Assign { target, value } => {
                assert_eq!(target.kind, ExprKind::Name("x".to_string()));
                assert_eq!(value.kind, ExprKind::Int(1));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
        assert!(matches!(&module.body[1].kind, StmtKind::Expr(_)));
    }

    #[test]
    fn parses_subscript_assignment_target() {
        let module = parse("xs[0] = 5\n");
        match &module.body[0].kind {
            StmtKind::Assign { target, .. } => {
                assert!(matches!(target.kind, ExprKind::Subscript { .. }));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn parses_augmented_assignment() {
        let module = parse("x += 2\ny -= 3\n");
        assert!(matches!(
            &module.body[0].kind,
            StmtKind::AugAssign {
                op: AugOp::Add,
                ..
            }
        ));
        assert!(matches!(
            &module.body[1].kind,
            StmtKind::AugAssign {
                op: AugOp::Sub,
                ..
            }
        ));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let module = parse("2 + 3 * 4\n");
        let StmtKind::Expr(expr) = &module.body[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::BinaryOp { left, op, right } = &expr.kind else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinOp::Add);
        assert_eq!(left.kind, ExprKind::Int(2));
        assert!(matches!(
            right.kind,
            ExprKind::BinaryOp { op: BinOp::Mul, .. }
        ));
    }

    #[test]
    fn unary_minus_binds_tighter_than_multiplication() {
        let module = parse("-2 * 3\n");
        let StmtKind::Expr(expr) = &module.body[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::BinaryOp { left, op, .. } = &expr.kind else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinOp::Mul);
        assert!(matches!(
            left.kind,
            ExprKind::UnaryOp {
                op: UnaryOp::Neg,
                ..
            }
        ));
    }

    #[test]
    fn chained_comparison_collapses_into_one_node() {
        let module = parse("a < b < c\n");
        let StmtKind::Expr(expr) = &module.body[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Compare { left, ops, rights } = &expr.kind else {
            panic!("expected compare node");
        };
        assert_eq!(left.kind, ExprKind::Name("a".to_string()));
        assert_eq!(ops, &vec![CmpOp::Lt, CmpOp::Lt]);
        assert_eq!(rights.len(), 2);
    }

    #[test]
    fn boolean_chains_collapse_per_operator() {
        let module = parse("a and b and c or d\n");
        let StmtKind::Expr(expr) = &module.body[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::BoolOp { op, values } = &expr.kind else {
            panic!("expected bool op");
        };
        assert_eq!(*op, BoolOp::Or);
        assert_eq!(values.len(), 2);
        let ExprKind::BoolOp { op, values } = &values[0].kind else {
            panic!("expected nested and");
        };
        assert_eq!(*op, BoolOp::And);
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn not_is_right_associative() {
        let module = parse("not not x\n");
        let StmtKind::Expr(expr) = &module.body[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::UnaryOp { op, operand } = &expr.kind else {
            panic!("expected unary not");
        };
        assert_eq!(*op, UnaryOp::Not);
        assert!(matches!(
            operand.kind,
            ExprKind::UnaryOp {
                op: UnaryOp::Not,
                ..
            }
        ));
    }

    #[test]
    fn elif_nests_inside_orelse() {
        let source = indoc! {"
            if a:
                pass
            elif b:
                pass
            else:
                pass
        "};
        let module = parse(source);
        let StmtKind::If { orelse, .. } = &module.body[0].kind else {
            panic!("expected if");
        };
        assert_eq!(orelse.len(), 1);
        let StmtKind::If { orelse: inner, .. } = &orelse[0].kind else {
            panic!("expected nested elif");
        };
        assert_eq!(inner.len(), 1);
    }

    #[test]
    fn parses_function_definition_with_params() {
        let source = indoc! {"
            def add(a, b):
                return a + b
        "};
        let module = parse(source);
        let StmtKind::FuncDef { name, params, body } = &module.body[0].kind else {
            panic!("expected def");
        };
        assert_eq!(name, "add");
        assert_eq!(params, &vec!["a".to_string(), "b".to_string()]);
        assert_eq!(body.len(), 1);
        assert!(matches!(&body[0].kind, StmtKind::Return(Some(_))));
    }

    #[test]
    fn parses_for_over_range() {
        let source = indoc! {"
            for i in range(3):
                print i
        "};
        let module = parse(source);
        let StmtKind::For { target, iter, body } = &module.body[0].kind else {
            panic!("expected for");
        };
        assert_eq!(target.kind, ExprKind::Name("i".to_string()));
        assert!(matches!(iter.kind, ExprKind::Call { .. }));
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn bare_print_has_no_values() {
        let module = parse("print\n");
        let StmtKind::Print(values) = &module.body[0].kind else {
            panic!("expected print");
        };
        assert!(values.is_empty());
    }

    #[test]
    fn print_accepts_comma_separated_values() {
        let module = parse("print 1, 2, 3\n");
        let StmtKind::Print(values) = &module.body[0].kind else {
            panic!("expected print");
        };
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn trailing_commas_tolerated_in_collections_and_calls() {
        parse("[1, 2,]\n");
        parse("{\"a\": 1,}\n");
        parse("f(1, 2,)\n");
    }

    #[test]
    fn block_may_be_closed_by_end_of_input() {
        let module = parse("if True:\n    x = 1");
        let StmtKind::If { body, .. } = &module.body[0].kind else {
            panic!("expected if");
        };
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn reports_expected_token_with_line() {
        let err = parse_err("if True\n    pass\n");
        assert_eq!(
            err.to_string(),
            "expected COLON, got NEWLINE('\n') at line 1"
        );
    }

    #[test]
    fn reports_unexpected_expression_token() {
        let err = parse_err("x = )\n");
        assert_eq!(err.to_string(), "unexpected token RPAREN at line 1");
    }

    #[test]
    fn reports_integer_overflow() {
        let err = parse_err("n = 99999999999999999999999999\n");
        assert!(matches!(err, ParseError::InvalidNumber { line: 1, .. }));
    }

    #[test]
    fn reports_illegal_character() {
        let err = parse_err("x = 1 @ 2\n");
        assert_eq!(err.to_string(), "unexpected character '@' at line 1");
    }

    #[test]
    fn reports_indentation_error() {
        let source = indoc! {"
            if True:
                x = 1
              y = 2
        "};
        let err = parse_err(source);
        assert_eq!(err.to_string(), "indentation error at line 3");
    }

    #[test]
    fn range_is_usable_as_a_plain_name() {
        let module = parse("range(3)\n");
        let StmtKind::Expr(expr) = &module.body[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { callee, .. } = &expr.kind else {
            panic!("expected call");
        };
        assert_eq!(callee.kind, ExprKind::Name("range".to_string()));
    }
}
