//! Declaration parsing implementation
//!
//! This module handles the file-level structure of a Go program:
//!
//! - Package clause: `package main`
//! - Imports: `import "fmt"` and grouped `import ( ... )`
//! - Function declarations: `func name(params) result { ... }`
//! - Type syntax: named types, slices, arrays, maps
//!
//! Top-level `type`, `var` and `const` declarations and methods are skipped;
//! they have no runtime meaning in the supported subset.
//!
//! # Grammar
//!
//! ```text
//! file       ::= "package" ident ";" import* top_decl*
//! import     ::= "import" (import_spec | "(" (import_spec ";")* ")")
//! func_decl  ::= "func" ident "(" params ")" result? block
//! params     ::= (ident_list type | type) ("," ...)*
//! type       ::= ident ("." ident)? | "[" "]" type | "[" int "]" type
//!              | "map" "[" type "]" type | "*" type | "..." type
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse `package name`
    pub(crate) fn parse_package_clause(&mut self) -> Result<String, ParseError> {
        self.expect_token(&TokenKind::Package, "Expected 'package' clause")?;
        let name = self.expect_identifier()?;
        self.expect_statement_end("after package clause")?;
        Ok(name)
    }

    /// Parse one `import` declaration, single or grouped. Returns the import paths.
    pub(crate) fn parse_import_decl(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect_token(&TokenKind::Import, "Expected 'import'")?;

        let mut paths = Vec::new();
        if self.match_token(&TokenKind::LParen) {
            self.skip_semicolons();
            while !self.check(&TokenKind::RParen) {
                paths.push(self.parse_import_spec()?);
                self.expect_statement_end("after import path")?;
                self.skip_semicolons();
            }
            self.expect_rparen("after import list")?;
        } else {
            paths.push(self.parse_import_spec()?);
        }
        self.expect_statement_end("after import")?;

        Ok(paths)
    }

    /// `"path"`, `alias "path"`, `. "path"` or `_ "path"`
    fn parse_import_spec(&mut self) -> Result<String, ParseError> {
        if matches!(self.peek_kind(), TokenKind::Ident(_) | TokenKind::Dot) {
            self.advance();
        }
        match self.peek_kind() {
            TokenKind::StringLiteral(path) => {
                let path = path.clone();
                self.advance();
                Ok(path)
            }
            other => self.error(format!("Expected import path, found {}", other)),
        }
    }

    /// Parse a top-level declaration. Only plain functions produce a node.
    pub(crate) fn parse_top_level_declaration(&mut self) -> Result<Option<FunctionDecl>, ParseError> {
        match self.peek_kind() {
            TokenKind::Func => {
                if matches!(self.peek_ahead(1), Some(TokenKind::LParen)) {
                    // method with a receiver
                    self.skip_construct();
                    return Ok(None);
                }
                self.parse_function_declaration().map(Some)
            }
            TokenKind::Type | TokenKind::Var | TokenKind::Const | TokenKind::Import => {
                self.skip_construct();
                Ok(None)
            }
            other => self.error(format!("Expected top-level declaration, found {}", other)),
        }
    }

    /// Parse `func name(params) result { body }`
    pub(crate) fn parse_function_declaration(&mut self) -> Result<FunctionDecl, ParseError> {
        let location = self.current_location();
        self.expect_token(&TokenKind::Func, "Expected 'func'")?;
        let name = self.expect_identifier()?;

        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        let result = self.parse_result_type()?;

        if !self.check(&TokenKind::LBrace) {
            return self.error(format!("Expected '{{' before body of function '{}'", name));
        }
        let body = self.parse_block()?;
        self.expect_statement_end("after function body")?;

        Ok(FunctionDecl {
            name,
            params,
            result,
            body,
            location,
        })
    }

    /// Parse a parameter list (without the parentheses).
    ///
    /// Go groups names before a shared type (`a, b int`), so names are held back
    /// until a type shows up. Names still pending at the end were really types
    /// of unnamed parameters.
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        while !self.check(&TokenKind::RParen) {
            let plain_name = matches!(self.peek_kind(), TokenKind::Ident(_))
                && !matches!(self.peek_ahead(1), Some(TokenKind::Dot));

            if plain_name {
                let name = self.expect_identifier()?;
                if self.check(&TokenKind::Comma) || self.check(&TokenKind::RParen) {
                    pending.push(name);
                } else {
                    let param_type = self.parse_type()?;
                    for grouped in pending.drain(..) {
                        params.push(Param {
                            name: grouped,
                            param_type: param_type.clone(),
                        });
                    }
                    params.push(Param { name, param_type });
                }
            } else {
                let param_type = self.parse_type()?;
                params.push(Param {
                    name: "_".to_string(),
                    param_type,
                });
            }

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        params.extend(pending.into_iter().map(|type_name| Param {
            name: "_".to_string(),
            param_type: TypeExpr::Named(type_name),
        }));

        Ok(params)
    }

    /// Optional result: a type, or a parenthesised list of which only the first is kept
    fn parse_result_type(&mut self) -> Result<Option<TypeExpr>, ParseError> {
        if self.check(&TokenKind::LBrace) {
            return Ok(None);
        }
        if self.match_token(&TokenKind::LParen) {
            let results = self.parse_parameter_list()?;
            self.expect_rparen("after result list")?;
            return Ok(results.into_iter().next().map(|p| p.param_type));
        }
        self.parse_type().map(Some)
    }

    /// Whether the current token can start a type
    pub(crate) fn is_type_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Ident(_)
                | TokenKind::LBracket
                | TokenKind::Map
                | TokenKind::Star
                | TokenKind::Ellipsis
                | TokenKind::Interface
                | TokenKind::Chan
                | TokenKind::Func
                | TokenKind::Struct
        )
    }

    /// Parse a type
    pub(crate) fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                if self.match_token(&TokenKind::Dot) {
                    let member = self.expect_identifier()?;
                    return Ok(TypeExpr::Named(format!("{}.{}", name, member)));
                }
                Ok(TypeExpr::Named(name))
            }
            TokenKind::LBracket => {
                self.advance();
                if self.match_token(&TokenKind::RBracket) {
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                if self.match_token(&TokenKind::Ellipsis) {
                    self.expect_token(&TokenKind::RBracket, "Expected ']' after '...'")?;
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let length = self.parse_expression()?;
                self.expect_token(&TokenKind::RBracket, "Expected ']' after array length")?;
                let elem = Box::new(self.parse_type()?);
                match length {
                    Expr::IntLiteral(n, _) if n >= 0 => Ok(TypeExpr::Array(n as usize, elem)),
                    _ => Ok(TypeExpr::Slice(elem)),
                }
            }
            TokenKind::Map => {
                self.advance();
                self.expect_token(&TokenKind::LBracket, "Expected '[' after 'map'")?;
                let key = self.parse_type()?;
                self.expect_token(&TokenKind::RBracket, "Expected ']' after map key type")?;
                let value = self.parse_type()?;
                Ok(TypeExpr::Map(Box::new(key), Box::new(value)))
            }
            TokenKind::Star => {
                self.advance();
                let inner = self.parse_type()?;
                Ok(TypeExpr::Named(format!("*{}", inner.label())))
            }
            TokenKind::Ellipsis => {
                // variadic parameter
                self.advance();
                Ok(TypeExpr::Slice(Box::new(self.parse_type()?)))
            }
            TokenKind::Interface => {
                self.advance();
                self.expect_lbrace("after 'interface'")?;
                self.expect_rbrace("in empty interface type")?;
                Ok(TypeExpr::Named("interface{}".to_string()))
            }
            other => self.error(format!("Unsupported type starting with {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn parse_function(source: &str) -> FunctionDecl {
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        program.functions.into_iter().next().unwrap()
    }

    #[test]
    fn test_grouped_parameters() {
        let f = parse_function("package main\nfunc add(a, b int, s string) int {\n\treturn a + b\n}\n");

        let names: Vec<_> = f.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "s"]);
        assert_eq!(f.params[1].param_type, TypeExpr::Named("int".to_string()));
        assert_eq!(f.params[2].param_type, TypeExpr::Named("string".to_string()));
        assert_eq!(f.result, Some(TypeExpr::Named("int".to_string())));
    }

    #[test]
    fn test_composite_parameter_types() {
        let f = parse_function("package main\nfunc f(xs []int, m map[string][]int, grid [3]int) {}\n");

        assert_eq!(f.params[0].param_type.label(), "[]int");
        assert_eq!(f.params[1].param_type.label(), "map[string][]int");
        assert_eq!(f.params[2].param_type.label(), "[3]int");
        assert_eq!(f.result, None);
    }

    #[test]
    fn test_parenthesised_result() {
        let f = parse_function("package main\nfunc f() (n int) {\n\treturn 1\n}\n");
        assert_eq!(f.result, Some(TypeExpr::Named("int".to_string())));
    }

    #[test]
    fn test_methods_are_skipped() {
        let mut parser = Parser::new(
            "package main\nfunc (p Point) Len() int {\n\treturn 0\n}\nfunc main() {}\n",
        )
        .unwrap();
        let program = parser.parse_program().unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name, "main");
    }
}
