//! Go source code parser
//!
//! This module transforms Go source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization with automatic semicolon insertion (source text → tokens)
//! - [`parse`]: Parser struct and helpers, split across `declarations`,
//!   `statements` and `expressions` (tokens → AST)
//! - [`ast`]: AST node definitions
//! - [`printer`]: AST → canonical source text, used for step text and outline labels
//!
//! # Supported Go Subset
//!
//! - Types: `int` family, `float64`, `string`, `bool`, slices, arrays, maps
//! - Statements: `:=`, `=`, `op=`, `var`/`const`, `if`/`else`, all `for` forms
//!   including `range`, `++`/`--`, `return`, `break`, `continue`
//! - Expressions: arithmetic, comparison, logical, bitwise, composite literals,
//!   index, selectors, calls
//! - Single file, single package; `switch`, `defer`, `go` and friends are
//!   recognised and skipped
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod printer;
mod statements;

pub use parse::{ParseError, Parser};

/// Lex and parse a whole source file
pub fn parse_source(source: &str) -> Result<ast::Program, ParseError> {
    Parser::new(source)?.parse_program()
}
