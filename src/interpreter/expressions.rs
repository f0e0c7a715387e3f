//! Expression evaluation
//!
//! Every expression evaluates to a [`Value`]; nothing here fails. Constructs
//! outside the subset (selectors, type expressions, unknown calls) evaluate
//! to `Absent`.

use crate::interpreter::engine::Interpreter;
use crate::memory::value::{Kind, MapKey, MapValue, Value};
use crate::parser::ast::{Element, Expr, SourceLocation, TypeExpr};
use tracing::trace;

/// `fmt` functions that produce a string value
const SPRINT_FUNCTIONS: [&str; 3] = ["Sprint", "Sprintln", "Sprintf"];

impl Interpreter {
    /// Evaluate an expression in the current environment
    pub(crate) fn evaluate_expr(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::IntLiteral(n, _) => Value::Int(*n),
            Expr::FloatLiteral(x, _) => Value::Float(*x),
            Expr::StringLiteral(s, _) => Value::Str(s.clone()),
            Expr::CharLiteral(c, _) => Value::Int(*c as i64),

            Expr::Ident(name, _) => self.env.read(name),

            Expr::Binary { op, left, right, .. } => {
                let left = self.evaluate_expr(left);
                let right = self.evaluate_expr(right);
                Self::binary_op(*op, &left, &right)
            }

            Expr::Unary { op, operand, .. } => {
                let operand = self.evaluate_expr(operand);
                Self::unary_op(*op, &operand)
            }

            Expr::Paren(inner, _) => self.evaluate_expr(inner),

            Expr::Composite {
                literal_type,
                elements,
                ..
            } => self.evaluate_composite(literal_type, elements),

            Expr::Index { target, index, .. } => {
                let target = self.evaluate_expr(target);
                let index = self.evaluate_expr(index);
                Self::index_value(&target, &index)
            }

            Expr::Call {
                callee,
                args,
                location,
            } => self.evaluate_call(callee, args, *location),

            Expr::Selector { .. } | Expr::Type(..) => Value::Absent,
        }
    }

    /// `[]T{...}` and `map[K]V{...}`.
    ///
    /// Slice literals support `int`, `float64` and `string` elements and drop
    /// elements of any other kind. Map literals accept any scalar key.
    fn evaluate_composite(&mut self, literal_type: &TypeExpr, elements: &[Element]) -> Value {
        match literal_type {
            TypeExpr::Slice(elem) | TypeExpr::Array(_, elem) => {
                let elem_kind = match Kind::from_type(elem) {
                    Some(kind @ (Kind::Int | Kind::Float | Kind::Str)) => kind,
                    _ => return Value::Absent,
                };
                let items = elements
                    .iter()
                    .map(|element| self.evaluate_expr(&element.value))
                    .filter(|value| value.kind() == elem_kind)
                    .collect();
                Value::new_slice(elem_kind, items)
            }

            TypeExpr::Map(key_type, value_type) => {
                let map = MapValue::new(key_type.label(), value_type.label());
                for element in elements {
                    let Some(key) = &element.key else { continue };
                    let key = self.evaluate_expr(key);
                    let value = self.evaluate_expr(&element.value);
                    if let Some(key) = MapKey::from_value(&key) {
                        map.entries.borrow_mut().insert(key, value);
                    }
                }
                Value::Map(map)
            }

            TypeExpr::Named(_) => Value::Absent,
        }
    }

    /// Calls in value position: user functions first, then built-ins
    fn evaluate_call(&mut self, callee: &Expr, args: &[Expr], location: SourceLocation) -> Value {
        match callee {
            Expr::Ident(name, _) => {
                if self.functions.contains_key(name) {
                    return self.call_function(name, args, location);
                }
                self.call_builtin(name, args).unwrap_or_else(|| {
                    trace!(function = %name, "call to unknown function evaluates to nil");
                    Value::Absent
                })
            }

            Expr::Selector { target, field, .. }
                if target.as_ident() == Some("fmt") && SPRINT_FUNCTIONS.contains(&field.as_str()) =>
            {
                self.format_fmt_function(field, args)
                    .map(Value::Str)
                    .unwrap_or(Value::Absent)
            }

            _ => Value::Absent,
        }
    }
}
