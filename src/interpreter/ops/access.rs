//! Index reads

use crate::interpreter::engine::Interpreter;
use crate::memory::value::{MapKey, Value};

impl Interpreter {
    /// `target[index]`.
    ///
    /// A map read of a missing key yields `0` and never inserts. A slice read
    /// outside `[0, len)` or with a non-integer index yields `Absent`, as does
    /// indexing anything else.
    pub(crate) fn index_value(target: &Value, index: &Value) -> Value {
        match target {
            Value::Map(map) => MapKey::from_value(index)
                .and_then(|key| map.entries.borrow().get(&key).cloned())
                .unwrap_or(Value::Int(0)),
            Value::Slice(slice) => index
                .as_int()
                .and_then(|i| slice.get(i))
                .unwrap_or(Value::Absent),
            _ => Value::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::memory::value::{Kind, MapKey, MapValue, Value};

    #[test]
    fn test_missing_map_key_reads_zero_without_inserting() {
        let map = MapValue::new("string", "int");
        map.entries.borrow_mut().insert(MapKey::Str("a".into()), Value::Int(3));
        let value = Value::Map(map.clone());

        assert_eq!(Interpreter::index_value(&value, &Value::Str("a".into())), Value::Int(3));
        assert_eq!(Interpreter::index_value(&value, &Value::Str("zz".into())), Value::Int(0));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_slice_bounds() {
        let xs = Value::new_slice(Kind::Str, vec![Value::Str("a".into())]);

        assert_eq!(Interpreter::index_value(&xs, &Value::Int(0)), Value::Str("a".into()));
        assert_eq!(Interpreter::index_value(&xs, &Value::Int(1)), Value::Absent);
        assert_eq!(Interpreter::index_value(&xs, &Value::Str("0".into())), Value::Absent);
        assert_eq!(Interpreter::index_value(&Value::Int(4), &Value::Int(0)), Value::Absent);
    }
}
