//! Expression parsing implementation
//!
//! Binary operators are parsed by precedence climbing over the five Go
//! precedence levels (see [`BinOp::precedence`]); all binary operators are
//! left-associative. Unary operators bind tighter than any binary operator,
//! and postfix selectors, index expressions and calls bind tightest.
//!
//! # Grammar
//!
//! ```text
//! expr      ::= unary (binary_op unary)*
//! unary     ::= ("-" | "+" | "!" | "^") unary | postfix
//! postfix   ::= primary ("." ident | "[" expr "]" | "(" args ")")*
//! primary   ::= literal | ident | "(" expr ")" | type [ "{" elements "}" ]
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse expression (entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(1)
    }

    /// Parse a comma-separated list of expressions
    pub(crate) fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expression()?];
        while self.match_token(&TokenKind::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }

    /// Precedence climbing: only operators binding at least as tight as `min_precedence`
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some(op) = self.peek_binary_operator() {
            if op.precedence() < min_precedence {
                break;
            }
            let location = self.current_location();
            self.advance();
            let right = self.parse_binary(op.precedence() + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn peek_binary_operator(&self) -> Option<BinOp> {
        let op = match self.peek_kind() {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::NotEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Le => BinOp::Le,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::Ge => BinOp::Ge,
            TokenKind::AndAnd => BinOp::And,
            TokenKind::OrOr => BinOp::Or,
            TokenKind::Amp => BinOp::BitAnd,
            TokenKind::Pipe => BinOp::BitOr,
            TokenKind::Caret => BinOp::BitXor,
            TokenKind::AmpCaret => BinOp::BitClear,
            TokenKind::LtLt => BinOp::Shl,
            TokenKind::GtGt => BinOp::Shr,
            _ => return None,
        };
        Some(op)
    }

    /// Parse unary (- + ! ^)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();

        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Plus => Some(UnOp::Plus),
            TokenKind::Bang => Some(UnOp::Not),
            TokenKind::Caret => Some(UnOp::BitNot),
            TokenKind::Amp | TokenKind::Star | TokenKind::Arrow => {
                return self.error(format!("Unsupported unary operator {}", self.peek_kind()));
            }
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                location,
            });
        }

        self.parse_postfix()
    }

    /// Parse postfix (selector, index, call)
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let location = self.current_location();

            if self.match_token(&TokenKind::Dot) {
                let field = self.expect_identifier()?;
                expr = Expr::Selector {
                    target: Box::new(expr),
                    field,
                    location,
                };
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                if self.check(&TokenKind::Colon) {
                    return self.error("Slice expressions are not supported");
                }
                self.expect_token(&TokenKind::RBracket, "Expected ']' after index")?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                    location,
                };
            } else if self.match_token(&TokenKind::LParen) {
                let args = self.parse_argument_list()?;
                self.expect_rparen("after function arguments")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    location,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse argument list: (expr, expr, ...), allowing a trailing comma and `xs...`
    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        while !self.check(&TokenKind::RParen) {
            args.push(self.parse_expression()?);
            // spread is accepted; the argument is passed as a single value
            self.match_token(&TokenKind::Ellipsis);

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(args)
    }

    /// Parse primary (literals, identifiers, parenthesized expressions, composite literals)
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();

        let literal = match self.peek_kind() {
            TokenKind::IntLiteral(n) => Some(Expr::IntLiteral(*n, location)),
            TokenKind::FloatLiteral(f) => Some(Expr::FloatLiteral(*f, location)),
            TokenKind::StringLiteral(s) => Some(Expr::StringLiteral(s.clone(), location)),
            TokenKind::CharLiteral(c) => Some(Expr::CharLiteral(*c, location)),
            TokenKind::Ident(name) => Some(Expr::Ident(name.clone(), location)),
            _ => None,
        };
        if let Some(expr) = literal {
            self.advance();
            return Ok(expr);
        }

        match self.peek_kind() {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                Ok(Expr::Paren(Box::new(inner), location))
            }
            TokenKind::LBracket | TokenKind::Map => {
                let literal_type = self.parse_type()?;
                if self.check(&TokenKind::LBrace) {
                    self.parse_composite_literal(literal_type, location)
                } else {
                    Ok(Expr::Type(literal_type, location))
                }
            }
            TokenKind::Func => self.error("Function literals are not supported"),
            other => self.error(format!("Unexpected token: {}", other)),
        }
    }

    /// Parse `{ elements }` following a literal type
    fn parse_composite_literal(
        &mut self,
        literal_type: TypeExpr,
        location: SourceLocation,
    ) -> Result<Expr, ParseError> {
        self.expect_lbrace("to open composite literal")?;

        let value_type = match &literal_type {
            TypeExpr::Map(_, value) => Some((**value).clone()),
            other => other.element().cloned(),
        };

        let mut elements = Vec::new();
        self.skip_semicolons();
        while !self.check(&TokenKind::RBrace) {
            let first = self.parse_element_value(value_type.as_ref())?;
            let element = if self.match_token(&TokenKind::Colon) {
                Element {
                    key: Some(first),
                    value: self.parse_element_value(value_type.as_ref())?,
                }
            } else {
                Element {
                    key: None,
                    value: first,
                }
            };
            elements.push(element);

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            self.skip_semicolons();
        }
        self.skip_semicolons();
        self.expect_rbrace("to close composite literal")?;

        Ok(Expr::Composite {
            literal_type,
            elements,
            location,
        })
    }

    /// An element value; a bare `{ ... }` takes the enclosing element type
    fn parse_element_value(&mut self, elided_type: Option<&TypeExpr>) -> Result<Expr, ParseError> {
        match elided_type {
            Some(elem_type) if self.check(&TokenKind::LBrace) => {
                let location = self.current_location();
                self.parse_composite_literal(elem_type.clone(), location)
            }
            _ => self.parse_expression(),
        }
    }
}
