//! Assignment targets
//!
//! Resolves the left-hand side of `=`, `:=`, `op=` and range clauses:
//!
//! - Identifiers are written to the current environment
//! - `slice[i]` is updated in place when `i` is in range and the value's
//!   kind matches the element kind
//! - `map[k]` inserts or overwrites the entry
//!
//! Any other target is ignored.

use crate::interpreter::engine::Interpreter;
use crate::memory::value::{MapKey, Value};
use crate::parser::ast::Expr;
use tracing::trace;

/// Name whose writes are discarded
const BLANK_IDENTIFIER: &str = "_";

impl Interpreter {
    /// Assign a value to an l-value
    pub(crate) fn assign_to(&mut self, target: &Expr, value: Value) {
        match target {
            Expr::Ident(name, _) => self.assign_variable(name, value),

            Expr::Index { target, index, .. } => {
                let container = self.evaluate_expr(target);
                let index = self.evaluate_expr(index);
                Self::store_indexed(&container, &index, value);
            }

            Expr::Paren(inner, _) => self.assign_to(inner, value),

            other => {
                trace!(target = %other, "ignoring assignment to unsupported target");
            }
        }
    }

    /// `name = value`. Assigning `nil` keeps the binding's existing label.
    pub(crate) fn assign_variable(&mut self, name: &str, value: Value) {
        if name == BLANK_IDENTIFIER {
            return;
        }
        let label = match (&value, self.env.type_label(name)) {
            (Value::Absent, Some(existing)) => existing.to_string(),
            _ => value.type_label(),
        };
        self.env.write(name, value, label);
    }

    /// `name := value`
    pub(crate) fn define_variable(&mut self, name: &str, value: Value) {
        if name == BLANK_IDENTIFIER {
            return;
        }
        let label = value.type_label();
        self.env.write(name, value, label);
    }

    /// In-place element write into a shared slice or map
    pub(crate) fn store_indexed(container: &Value, index: &Value, value: Value) {
        match container {
            Value::Slice(slice) => {
                if value.kind() != slice.elem_kind {
                    return;
                }
                let Some(i) = index.as_int().and_then(|i| usize::try_from(i).ok()) else {
                    return;
                };
                if let Some(slot) = slice.items.borrow_mut().get_mut(i) {
                    *slot = value;
                }
            }
            Value::Map(map) => {
                if let Some(key) = MapKey::from_value(index) {
                    map.entries.borrow_mut().insert(key, value);
                }
            }
            _ => {}
        }
    }
}
