//! Memory model for the Go-subset interpreter
//!
//! This module provides the core runtime state abstractions:
//! - [`value`]: Runtime value representation (Int, Float, Str, Bool, Slice, Map, Absent)
//! - [`environment`]: Bindings of the active invocation with scope labels
//! - [`stack`]: Call frames saved across user function calls
//!
//! # Sharing
//!
//! Scalars are copied on every binding. Slices and maps are reference-like:
//! their storage lives behind `Rc<RefCell<..>>`, so an assignment or argument
//! pass aliases the same container, matching Go.

pub mod environment;
pub mod stack;
pub mod value;
