//! # Introduction
//!
//! goflow parses a small subset of Go, runs it with a tree-walking
//! interpreter and records a step after every executed construct. The
//! finished trace can be replayed forwards and backwards in a terminal UI
//! built with [ratatui](https://docs.rs/ratatui), or dumped as JSON.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Interpreter → Trace → TUI / JSON
//!                              ↘ Outline
//! ```
//!
//! 1. [`parser`] tokenises the source and builds an AST.
//! 2. [`interpreter`] walks the AST and records a [`snapshot::Step`] for each
//!    assignment, declaration, loop check, branch, call and return.
//! 3. [`memory`] holds the runtime model: [`memory::value::Value`], the flat
//!    per-call [`memory::environment::Environment`] and the call stack.
//! 4. [`snapshot`] turns live state into immutable steps and offers
//!    [`snapshot::Playback`] for cursor-style navigation.
//! 5. [`outline`] extracts the static function / loop / branch tree.
//! 6. [`response`] bundles all of the above into one serialisable document.
//! 7. [`ui`] is the ratatui front end; not part of the stable library API.
//!
//! ## Supported Go subset
//!
//! Types: the `int` family, `float64`, `string`, `bool`, slices and maps.
//! Control flow: `if/else`, every `for` form including `range`, `break`,
//! `continue`, `return`.
//! Built-ins: `len`, `make`, `append`, `delete`, and `fmt.Print*` /
//! `fmt.Sprint*`.

pub mod interpreter;
pub mod memory;
pub mod outline;
pub mod parser;
pub mod response;
pub mod snapshot;
pub mod ui;

use interpreter::{Interpreter, Limits};
use parser::ParseError;
use snapshot::Trace;

/// Parse and run `source`, returning the recorded trace
pub fn trace_source(source: &str, limits: Limits) -> Result<Trace, ParseError> {
    let program = parser::parse_source(source)?;
    Ok(Interpreter::new(program, limits).run())
}
