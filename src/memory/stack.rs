//! Call stack implementation
//!
//! This module provides the call stack for function execution:
//! - [`CallStack`]: the entry function plus one [`CallFrame`] per active call
//! - [`CallFrame`]: the caller state saved when a user function is invoked
//!
//! A frame owns the caller's [`Environment`], moved out while the callee runs
//! in a fresh one. Arguments are copied into the callee; slices and maps share
//! storage, so mutations the callee makes through them remain visible after
//! the caller's state is restored.

use super::environment::Environment;
use super::value::Value;

/// Caller state saved across one invocation
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Name of the function being called
    pub function_name: String,
    pub saved_env: Environment,
    pub saved_has_returned: bool,
    pub saved_return_value: Option<Value>,
}

/// The call stack
#[derive(Debug, Clone)]
pub struct CallStack {
    entry: String,
    frames: Vec<CallFrame>,
}

impl CallStack {
    pub fn new(entry: impl Into<String>) -> Self {
        CallStack {
            entry: entry.into(),
            frames: Vec::new(),
        }
    }

    /// Push a new call frame
    pub fn push(&mut self, frame: CallFrame) {
        self.frames.push(frame);
    }

    /// Pop the top call frame
    pub fn pop(&mut self) -> Option<CallFrame> {
        self.frames.pop()
    }

    /// Number of active functions, the entry function included
    pub fn depth(&self) -> usize {
        self.frames.len() + 1
    }

    /// Name of the function currently executing
    pub fn current_function(&self) -> &str {
        self.frames
            .last()
            .map(|frame| frame.function_name.as_str())
            .unwrap_or(&self.entry)
    }

    /// Function names from the entry function to the innermost call
    pub fn names(&self) -> Vec<String> {
        std::iter::once(self.entry.clone())
            .chain(self.frames.iter().map(|frame| frame.function_name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(name: &str) -> CallFrame {
        CallFrame {
            function_name: name.to_string(),
            saved_env: Environment::new("caller"),
            saved_has_returned: false,
            saved_return_value: None,
        }
    }

    #[test]
    fn test_depth_counts_entry_function() {
        let mut stack = CallStack::new("main");
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current_function(), "main");

        stack.push(frame("fib"));
        stack.push(frame("fib"));
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.names(), vec!["main", "fib", "fib"]);
        assert_eq!(stack.current_function(), "fib");

        stack.pop();
        stack.pop();
        assert!(stack.pop().is_none());
        assert_eq!(stack.names(), vec!["main"]);
    }

    #[test]
    fn test_frame_restores_scalars_but_shares_containers() {
        use crate::memory::value::Kind;

        let mut env = Environment::new("main");
        let xs = Value::new_slice(Kind::Int, vec![Value::Int(1)]);
        env.write("n", Value::Int(1), "int");
        env.write("xs", xs, "[]int");

        let saved = env.clone();
        env.write("n", Value::Int(99), "int");
        if let Some(Value::Slice(slice)) = env.lookup("xs") {
            slice.items.borrow_mut().push(Value::Int(2));
        }

        assert_eq!(saved.read("n"), Value::Int(1));
        assert_eq!(saved.read("xs").to_string(), "[1 2]");
    }
}
