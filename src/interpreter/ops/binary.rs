use crate::interpreter::engine::Interpreter;
use crate::memory::value::Value;
use crate::parser::ast::BinOp;

impl Interpreter {
    /// Apply a binary operator to two already evaluated operands.
    ///
    /// Operands must share one kind: integer pairs support arithmetic,
    /// comparison and bitwise operators, boolean pairs support `&&` and `||`.
    /// Every other combination yields `Absent`.
    pub(crate) fn binary_op(op: BinOp, left: &Value, right: &Value) -> Value {
        match (left, right) {
            (Value::Int(l), Value::Int(r)) => Self::int_binary_op(op, *l, *r),
            (Value::Bool(l), Value::Bool(r)) => match op {
                BinOp::And => Value::Bool(*l && *r),
                BinOp::Or => Value::Bool(*l || *r),
                _ => Value::Absent,
            },
            _ => Value::Absent,
        }
    }

    #[inline]
    fn int_binary_op(op: BinOp, l: i64, r: i64) -> Value {
        match op {
            BinOp::Add => Value::Int(l.wrapping_add(r)),
            BinOp::Sub => Value::Int(l.wrapping_sub(r)),
            BinOp::Mul => Value::Int(l.wrapping_mul(r)),
            // Division and remainder by zero yield 0
            BinOp::Div => Value::Int(if r == 0 { 0 } else { l.wrapping_div(r) }),
            BinOp::Mod => Value::Int(if r == 0 { 0 } else { l.wrapping_rem(r) }),

            BinOp::Eq => Value::Bool(l == r),
            BinOp::Ne => Value::Bool(l != r),
            BinOp::Lt => Value::Bool(l < r),
            BinOp::Le => Value::Bool(l <= r),
            BinOp::Gt => Value::Bool(l > r),
            BinOp::Ge => Value::Bool(l >= r),

            BinOp::BitAnd => Value::Int(l & r),
            BinOp::BitOr => Value::Int(l | r),
            BinOp::BitXor => Value::Int(l ^ r),
            BinOp::BitClear => Value::Int(l & !r),
            BinOp::Shl => Value::Int(Self::shift_amount(r).map_or(0, |s| l.wrapping_shl(s))),
            BinOp::Shr => Value::Int(Self::shift_amount(r).map_or(0, |s| l.wrapping_shr(s))),

            BinOp::And | BinOp::Or => Value::Absent,
        }
    }

    /// Shift counts outside `0..64` have no representable result
    #[inline]
    fn shift_amount(count: i64) -> Option<u32> {
        u32::try_from(count).ok().filter(|s| *s < 64)
    }
}
