//! Go-subset interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: Main interpreter with statement dispatch
//! - [`constants`]: Safety limits
//!
//! # Execution Model
//!
//! The interpreter walks the AST and executes statements one at a time.
//! After each executed construct a step is recorded, so a finished run can be
//! played back forwards and backwards.
//!
//! # Built-in Functions
//!
//! Built-in functions (`len`, `make`, `append`, `delete` and the `fmt` print
//! family) are implemented directly on the interpreter rather than as
//! separate runtime modules.

mod builtins;
mod calls;
pub mod constants;
pub mod engine;
mod expressions;
pub mod format;
mod loops;
mod ops;
mod statements;

pub use constants::Limits;
pub use engine::Interpreter;
