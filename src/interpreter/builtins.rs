//! Built-in function implementations
//!
//! This module provides the implementation of Go built-ins that are
//! directly handled by the interpreter rather than being defined in user code.
//!
//! # Supported Built-ins
//!
//! - `len(x)`: element count of a slice or map, byte length of a string
//! - `make(map[K]V)`: an empty map (the slice form is not supported)
//! - `append(s, v...)`: a new slice holding `s` followed by `v...`
//! - `delete(m, k)`: remove a key from a map in place
//! - `fmt.Print`, `fmt.Println`, `fmt.Printf`: formatted program output
//! - `fmt.Sprint`, `fmt.Sprintln`, `fmt.Sprintf`: the same text as a value
//!
//! # Implementation Notes
//!
//! - `append` never writes through to the input's storage, so an alias of the
//!   original slice keeps seeing the old elements
//! - Values whose kind differs from a slice's element kind are dropped by
//!   `append`
//! - All built-ins are implemented as methods on the [`Interpreter`] struct

use crate::interpreter::engine::Interpreter;
use crate::interpreter::format::{sprint, sprintf, sprintln};
use crate::memory::value::{Kind, MapKey, MapValue, Value};
use crate::parser::ast::{Expr, TypeExpr};

impl Interpreter {
    /// Dispatch an unqualified built-in call. Returns `None` for other names.
    pub(crate) fn call_builtin(&mut self, name: &str, args: &[Expr]) -> Option<Value> {
        let value = match name {
            "len" => self.builtin_len(args),
            "make" => Self::builtin_make(args),
            "append" => self.builtin_append(args),
            "delete" => self.builtin_delete(args),
            _ => return None,
        };
        Some(value)
    }

    fn builtin_len(&mut self, args: &[Expr]) -> Value {
        let Some(arg) = args.first() else {
            return Value::Absent;
        };
        match self.evaluate_expr(arg) {
            Value::Slice(slice) => Value::Int(slice.len() as i64),
            Value::Map(map) => Value::Int(map.len() as i64),
            Value::Str(s) => Value::Int(s.len() as i64),
            Value::Absent => Value::Int(0),
            _ => Value::Absent,
        }
    }

    fn builtin_make(args: &[Expr]) -> Value {
        match args.first() {
            Some(Expr::Type(TypeExpr::Map(key, value), _)) => {
                Value::Map(MapValue::new(key.label(), value.label()))
            }
            _ => Value::Absent,
        }
    }

    fn builtin_append(&mut self, args: &[Expr]) -> Value {
        let Some((target, rest)) = args.split_first() else {
            return Value::Absent;
        };
        let target = self.evaluate_expr(target);
        let values: Vec<Value> = rest.iter().map(|arg| self.evaluate_expr(arg)).collect();

        let (elem_kind, mut items) = match &target {
            Value::Slice(slice) => (slice.elem_kind, slice.items.borrow().clone()),
            Value::Absent => match values.first().map(Value::kind) {
                Some(kind @ (Kind::Int | Kind::Float | Kind::Str | Kind::Bool)) => (kind, Vec::new()),
                _ => return Value::Absent,
            },
            _ => return Value::Absent,
        };

        items.extend(values.into_iter().filter(|value| value.kind() == elem_kind));
        Value::new_slice(elem_kind, items)
    }

    fn builtin_delete(&mut self, args: &[Expr]) -> Value {
        if let [target, key] = args {
            let target = self.evaluate_expr(target);
            let key = self.evaluate_expr(key);
            if let (Value::Map(map), Some(key)) = (&target, MapKey::from_value(&key)) {
                map.entries.borrow_mut().remove(&key);
            }
        }
        Value::Absent
    }

    /// Render a `fmt.Print*` or `fmt.Sprint*` call. Returns `None` for other
    /// `fmt` functions.
    pub(crate) fn format_fmt_function(&mut self, function: &str, args: &[Expr]) -> Option<String> {
        let values: Vec<Value> = args.iter().map(|arg| self.evaluate_expr(arg)).collect();
        let text = match function {
            "Print" | "Sprint" => sprint(&values),
            "Println" | "Sprintln" => sprintln(&values),
            "Printf" | "Sprintf" => match values.split_first() {
                Some((Value::Str(format), rest)) => sprintf(format, rest),
                Some((other, rest)) => sprintf(&other.to_string(), rest),
                None => String::new(),
            },
            _ => return None,
        };
        Some(text)
    }

    /// Output of a `fmt.Print`, `fmt.Println` or `fmt.Printf` statement
    pub(crate) fn format_fmt_call(&mut self, function: &str, args: &[Expr]) -> String {
        self.format_fmt_function(function, args).unwrap_or_default()
    }
}
