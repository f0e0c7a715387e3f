use crate::interpreter::engine::Interpreter;
use crate::memory::value::Value;
use crate::parser::ast::UnOp;

impl Interpreter {
    /// Apply a unary operator; unsupported operand kinds yield `Absent`
    pub(crate) fn unary_op(op: UnOp, operand: &Value) -> Value {
        match (op, operand) {
            (UnOp::Neg, Value::Int(n)) => Value::Int(n.wrapping_neg()),
            (UnOp::Neg, Value::Float(x)) => Value::Float(-x),
            (UnOp::Plus, Value::Int(_) | Value::Float(_)) => operand.clone(),
            (UnOp::Not, Value::Bool(b)) => Value::Bool(!b),
            (UnOp::BitNot, Value::Int(n)) => Value::Int(!n),
            _ => Value::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::memory::value::Value;
    use crate::parser::ast::UnOp;

    #[test]
    fn test_unary_operators() {
        assert_eq!(Interpreter::unary_op(UnOp::Neg, &Value::Int(3)), Value::Int(-3));
        assert_eq!(Interpreter::unary_op(UnOp::Neg, &Value::Int(i64::MIN)), Value::Int(i64::MIN));
        assert_eq!(Interpreter::unary_op(UnOp::Neg, &Value::Float(1.5)), Value::Float(-1.5));
        assert_eq!(Interpreter::unary_op(UnOp::Not, &Value::Bool(false)), Value::Bool(true));
        assert_eq!(Interpreter::unary_op(UnOp::BitNot, &Value::Int(0)), Value::Int(-1));
        assert_eq!(Interpreter::unary_op(UnOp::Not, &Value::Int(1)), Value::Absent);
        assert_eq!(Interpreter::unary_op(UnOp::Neg, &Value::Str("a".into())), Value::Absent);
    }
}
