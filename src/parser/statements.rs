//! Statement parsing implementation
//!
//! This module handles parsing of all Go statement types:
//!
//! - Declarations: `var x int = 1`, `const n = 3`, grouped `var ( ... )`
//! - Simple statements: `x := 1`, `a, b = b, a`, `x += 2`, `x++`, calls
//! - Control flow: `if`/`else`, three-clause `for`, `for range`
//! - Jump statements: `return`, `break`, `continue`
//! - Blocks: `{ ... }`
//!
//! `switch`, `select`, `defer`, `go`, `goto`, `fallthrough`, local `type`
//! declarations and labels are consumed and kept as [`Stmt::Unsupported`].
//!
//! # Grammar
//!
//! ```text
//! statement   ::= var_decl | if_stmt | for_stmt | return_stmt
//!               | "break" | "continue" | block | simple_stmt
//! simple_stmt ::= expr_list (":=" | "=" | op"=") expr_list
//!               | expr ("++" | "--") | expr
//! for_stmt    ::= "for" [ cond | init ";" [cond] ";" [post] | range_clause ] block
//! if_stmt     ::= "if" [ simple_stmt ";" ] expr block [ "else" (if_stmt | block) ]
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

/// Result of parsing a simple statement in a position where a range clause may appear
enum SimpleStmt {
    Stmt(Stmt),
    Range {
        key: Option<String>,
        value: Option<String>,
        define: bool,
        collection: Expr,
    },
}

/// Map an op-assign token (`+=`, `&^=`, ...) to its binary operator
fn compound_operator(symbol: &str) -> Option<BinOp> {
    let op = match symbol {
        "+=" => BinOp::Add,
        "-=" => BinOp::Sub,
        "*=" => BinOp::Mul,
        "/=" => BinOp::Div,
        "%=" => BinOp::Mod,
        "&=" => BinOp::BitAnd,
        "|=" => BinOp::BitOr,
        "^=" => BinOp::BitXor,
        "&^=" => BinOp::BitClear,
        "<<=" => BinOp::Shl,
        ">>=" => BinOp::Shr,
        _ => return None,
    };
    Some(op)
}

impl Parser {
    /// Parse a brace-delimited block, recording both brace positions
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let location = self.current_location();
        self.expect_lbrace("to open block")?;

        let mut statements = Vec::new();
        self.skip_semicolons();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let stmt = self.parse_statement()?;
            // skipped constructs already consumed their terminator; labels have none
            if !matches!(stmt, Stmt::Unsupported { .. }) {
                self.expect_statement_end("in block")?;
            }
            statements.push(stmt);
            self.skip_semicolons();
        }

        let end = self.current_location();
        self.expect_rbrace("to close block")?;

        Ok(Block {
            statements,
            location,
            end,
        })
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();

        match self.peek_kind() {
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Var => self.parse_variable_declaration(false),
            TokenKind::Const => self.parse_variable_declaration(true),
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Break => {
                self.advance();
                self.skip_jump_label();
                Ok(Stmt::Break { location })
            }
            TokenKind::Continue => {
                self.advance();
                self.skip_jump_label();
                Ok(Stmt::Continue { location })
            }
            TokenKind::Switch
            | TokenKind::Select
            | TokenKind::Defer
            | TokenKind::Go
            | TokenKind::Goto
            | TokenKind::Fallthrough
            | TokenKind::Type => {
                let keyword = self.peek_kind().to_string().trim_matches('\'').to_string();
                self.skip_construct();
                Ok(Stmt::Unsupported { keyword, location })
            }
            TokenKind::Ident(_) if matches!(self.peek_ahead(1), Some(TokenKind::Colon)) => {
                // `label:` prefixes the next statement, which is parsed normally
                self.advance();
                self.advance();
                Ok(Stmt::Unsupported {
                    keyword: "label".to_string(),
                    location,
                })
            }
            _ => match self.parse_simple_statement(false)? {
                SimpleStmt::Stmt(stmt) => Ok(stmt),
                SimpleStmt::Range { .. } => self.error("Unexpected range clause outside 'for'"),
            },
        }
    }

    /// `break outer` / `continue outer`: labels are accepted and ignored
    fn skip_jump_label(&mut self) {
        if matches!(self.peek_kind(), TokenKind::Ident(_)) {
            self.advance();
        }
    }

    /// Parse assignment, short declaration, inc/dec or expression statement
    fn parse_simple_statement(&mut self, allow_range: bool) -> Result<SimpleStmt, ParseError> {
        let location = self.current_location();

        if allow_range && self.match_token(&TokenKind::Range) {
            let collection = self.parse_expression()?;
            return Ok(SimpleStmt::Range {
                key: None,
                value: None,
                define: false,
                collection,
            });
        }

        let lhs = self.parse_expression_list()?;

        let op = match self.peek_kind() {
            TokenKind::Define => Some(AssignOp::Define),
            TokenKind::Eq => Some(AssignOp::Assign),
            TokenKind::OpAssign(symbol) => match compound_operator(symbol) {
                Some(op) => Some(AssignOp::Compound(op)),
                None => return self.error(format!("Unknown assignment operator '{}'", symbol)),
            },
            _ => None,
        };

        if let Some(op) = op {
            self.advance();

            if allow_range && self.check(&TokenKind::Range) {
                if matches!(op, AssignOp::Compound(_)) {
                    return self.error("Range clause requires '=' or ':='");
                }
                self.advance();
                let mut names = Vec::with_capacity(lhs.len());
                for target in &lhs {
                    match target.as_ident() {
                        Some(name) => names.push(name.to_string()),
                        None => return self.error("Range variables must be identifiers"),
                    }
                }
                if names.len() > 2 {
                    return self.error("Range clause permits at most two iteration variables");
                }
                let collection = self.parse_expression()?;
                let mut names = names.into_iter();
                return Ok(SimpleStmt::Range {
                    key: names.next(),
                    value: names.next(),
                    define: op == AssignOp::Define,
                    collection,
                });
            }

            let rhs = self.parse_expression_list()?;
            return Ok(SimpleStmt::Stmt(Stmt::Assign {
                lhs,
                op,
                rhs,
                location,
            }));
        }

        let mut lhs = lhs;
        if lhs.len() != 1 {
            return self.error(format!("Expected ':=' or '=' after expression list, found {}", self.peek_kind()));
        }
        let target = lhs.remove(0);

        let incdec = match self.peek_kind() {
            TokenKind::PlusPlus => Some(IncDecOp::Inc),
            TokenKind::MinusMinus => Some(IncDecOp::Dec),
            _ => None,
        };
        if let Some(op) = incdec {
            self.advance();
            return Ok(SimpleStmt::Stmt(Stmt::IncDec {
                target,
                op,
                location,
            }));
        }

        Ok(SimpleStmt::Stmt(Stmt::Expr {
            expr: target,
            location,
        }))
    }

    /// A simple statement where a range clause is not allowed
    fn parse_plain_simple_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.parse_simple_statement(false)? {
            SimpleStmt::Stmt(stmt) => Ok(stmt),
            SimpleStmt::Range { .. } => self.error("Unexpected range clause"),
        }
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.expect_token(&TokenKind::Return, "Expected 'return'")?;

        let results = if self.check(&TokenKind::Semicolon) || self.check(&TokenKind::RBrace) {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };

        Ok(Stmt::Return { results, location })
    }

    /// Parse `if [init;] cond { } [else ...]`
    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.expect_token(&TokenKind::If, "Expected 'if'")?;

        let first = self.parse_plain_simple_statement()?;
        let (init, condition) = if self.match_token(&TokenKind::Semicolon) {
            (Some(Box::new(first)), self.parse_expression()?)
        } else {
            match first {
                Stmt::Expr { expr, .. } => (None, expr),
                _ => return self.error("Expected condition in 'if' statement"),
            }
        };

        let then_block = self.parse_block()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(Box::new(self.parse_if_statement()?))
            } else if self.check(&TokenKind::LBrace) {
                Some(Box::new(Stmt::Block(self.parse_block()?)))
            } else {
                return self.error(format!("Expected 'if' or '{{' after 'else', found {}", self.peek_kind()));
            }
        } else {
            None
        };

        Ok(Stmt::If {
            init,
            condition,
            then_block,
            else_branch,
            location,
        })
    }

    /// Parse every `for` form: infinite, condition-only, three-clause and range
    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.expect_token(&TokenKind::For, "Expected 'for'")?;

        if self.check(&TokenKind::LBrace) {
            let body = self.parse_block()?;
            return Ok(Stmt::For {
                init: None,
                condition: None,
                post: None,
                body,
                location,
            });
        }

        let first = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_simple_statement(true)?)
        };

        let init = match first {
            Some(SimpleStmt::Range {
                key,
                value,
                define,
                collection,
            }) => {
                let body = self.parse_block()?;
                return Ok(Stmt::Range {
                    key,
                    value,
                    define,
                    collection,
                    body,
                    location,
                });
            }
            Some(SimpleStmt::Stmt(stmt)) if self.check(&TokenKind::LBrace) => {
                let condition = match stmt {
                    Stmt::Expr { expr, .. } => expr,
                    _ => return self.error("Expected loop condition before '{'"),
                };
                let body = self.parse_block()?;
                return Ok(Stmt::For {
                    init: None,
                    condition: Some(condition),
                    post: None,
                    body,
                    location,
                });
            }
            Some(SimpleStmt::Stmt(stmt)) => Some(Box::new(stmt)),
            None => None,
        };

        self.expect_token(&TokenKind::Semicolon, "Expected ';' after for-loop initializer")?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after for-loop condition")?;

        let post = if self.check(&TokenKind::LBrace) {
            None
        } else {
            Some(Box::new(self.parse_plain_simple_statement()?))
        };

        let body = self.parse_block()?;

        Ok(Stmt::For {
            init,
            condition,
            post,
            body,
            location,
        })
    }

    /// Parse `var`/`const` declarations, single or grouped
    pub(crate) fn parse_variable_declaration(&mut self, is_const: bool) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance(); // 'var' or 'const'

        if !self.match_token(&TokenKind::LParen) {
            return self.parse_variable_spec(is_const);
        }

        let mut statements = Vec::new();
        self.skip_semicolons();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            statements.push(self.parse_variable_spec(is_const)?);
            self.expect_statement_end("in declaration group")?;
            self.skip_semicolons();
        }
        let end = self.current_location();
        self.expect_rparen("to close declaration group")?;

        Ok(Stmt::Block(Block {
            statements,
            location,
            end,
        }))
    }

    /// `names [type] [= values]`
    fn parse_variable_spec(&mut self, is_const: bool) -> Result<Stmt, ParseError> {
        let location = self.current_location();

        let mut names = vec![self.expect_identifier()?];
        while self.match_token(&TokenKind::Comma) {
            names.push(self.expect_identifier()?);
        }

        let var_type = if !self.check(&TokenKind::Eq) && self.is_type_start() {
            Some(self.parse_type()?)
        } else {
            None
        };

        let values = if self.match_token(&TokenKind::Eq) {
            self.parse_expression_list()?
        } else {
            Vec::new()
        };

        if var_type.is_none() && values.is_empty() && !is_const {
            return self.error(format!("Missing type or initializer for '{}'", names[0]));
        }

        Ok(Stmt::VarDecl {
            names,
            var_type,
            values,
            is_const,
            location,
        })
    }
}
