//! Runtime value representation
//!
//! This module defines the [`Value`] enum, the tagged runtime representation of
//! every value a Go-subset program can compute.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 64-bit signed integer (also used for runes)
//! - [`Value::Float`]: 64-bit float
//! - [`Value::Str`]: string
//! - [`Value::Bool`]: boolean
//! - [`Value::Slice`]: shared, homogeneous sequence
//! - [`Value::Map`]: shared mapping with scalar keys
//! - [`Value::Absent`]: uninitialised or missing
//!
//! # Aliasing
//!
//! Slices and maps hold their storage behind `Rc<RefCell<..>>`. Cloning a
//! [`Value`] therefore shares a container the way assigning one does in Go,
//! while scalars are copied.

use crate::parser::ast::TypeExpr;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// The concrete kind of a [`Value`], used for homogeneity checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Int,
    Float,
    Str,
    Bool,
    Slice,
    Map,
    Absent,
}

impl Kind {
    /// Go spelling of the kind, as used in type labels
    pub fn type_name(self) -> &'static str {
        match self {
            Kind::Int => "int",
            Kind::Float => "float64",
            Kind::Str => "string",
            Kind::Bool => "bool",
            Kind::Slice => "[]",
            Kind::Map => "map",
            Kind::Absent => "auto",
        }
    }

    /// Scalar kind named by a Go type, if it is one of the supported element types
    pub fn from_type(type_expr: &TypeExpr) -> Option<Kind> {
        match type_expr {
            TypeExpr::Named(name) => match name.as_str() {
                "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
                | "uint32" | "uint64" | "byte" | "rune" | "uintptr" => Some(Kind::Int),
                "float32" | "float64" => Some(Kind::Float),
                "string" => Some(Kind::Str),
                "bool" => Some(Kind::Bool),
                _ => None,
            },
            _ => None,
        }
    }
}

/// A map key. Only scalar values can key a map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl MapKey {
    pub fn from_value(value: &Value) -> Option<MapKey> {
        match value {
            Value::Bool(b) => Some(MapKey::Bool(*b)),
            Value::Int(n) => Some(MapKey::Int(*n)),
            Value::Str(s) => Some(MapKey::Str(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Bool(b) => Value::Bool(*b),
            MapKey::Int(n) => Value::Int(*n),
            MapKey::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(b) => write!(f, "{}", b),
            MapKey::Int(n) => write!(f, "{}", n),
            MapKey::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Slice storage shared between aliases
#[derive(Debug, Clone, PartialEq)]
pub struct SliceValue {
    pub elem_kind: Kind,
    pub items: Rc<RefCell<Vec<Value>>>,
}

impl SliceValue {
    pub fn new(elem_kind: Kind, items: Vec<Value>) -> Self {
        SliceValue {
            elem_kind,
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Element at `index`, or `None` when out of range
    pub fn get(&self, index: i64) -> Option<Value> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.items.borrow().get(i).cloned())
    }
}

/// Map storage shared between aliases, iterated in key order
#[derive(Debug, Clone, PartialEq)]
pub struct MapValue {
    pub key_type: String,
    pub value_type: String,
    pub entries: Rc<RefCell<BTreeMap<MapKey, Value>>>,
}

impl MapValue {
    pub fn new(key_type: impl Into<String>, value_type: impl Into<String>) -> Self {
        MapValue {
            key_type: key_type.into(),
            value_type: value_type.into(),
            entries: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Slice(SliceValue),
    Map(MapValue),
    #[default]
    Absent,
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Bool(_) => Kind::Bool,
            Value::Slice(_) => Kind::Slice,
            Value::Map(_) => Kind::Map,
            Value::Absent => Kind::Absent,
        }
    }

    /// Display type label derived from the runtime kind
    pub fn type_label(&self) -> String {
        match self {
            Value::Slice(slice) => format!("[]{}", slice.elem_kind.type_name()),
            Value::Map(map) => format!("map[{}]{}", map.key_type, map.value_type),
            other => other.kind().type_name().to_string(),
        }
    }

    /// Zero value for a declared type
    pub fn zero_value(type_expr: &TypeExpr) -> Value {
        match type_expr {
            TypeExpr::Slice(_) | TypeExpr::Array(..) | TypeExpr::Map(..) => Value::Absent,
            TypeExpr::Named(name) => match name.as_str() {
                "string" => Value::Str(String::new()),
                "bool" => Value::Bool(false),
                "float32" | "float64" => Value::Float(0.0),
                _ => Value::Int(0),
            },
        }
    }

    pub fn new_slice(elem_kind: Kind, items: Vec<Value>) -> Value {
        Value::Slice(SliceValue::new(elem_kind, items))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Format a float the way Go's `%v` does: shortest round-trip digits, switching
/// to exponent form when the decimal exponent is below -4 or at least 6.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // `{:e}` yields the shortest round-trip mantissa, e.g. "1.5e-7"
    let sci = format!("{:e}", f);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= 6 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        format!("{}", f)
    }
}

/// Containers entered by an ongoing recursive walk.
///
/// A slice or map can hold itself (`m["self"] = m`), so every walk that
/// descends into elements goes through [`Visiting::walk`], which refuses to
/// enter storage that is already on the path.
#[derive(Debug, Default)]
pub struct Visiting {
    path: Vec<*const ()>,
}

impl Visiting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with `value`'s storage on the path, or return `None` when that
    /// storage is already being walked. Scalars are always entered.
    pub fn walk<R>(&mut self, value: &Value, f: impl FnOnce(&mut Visiting) -> R) -> Option<R> {
        let id = value.storage_id();
        if let Some(id) = id {
            if self.path.contains(&id) {
                return None;
            }
            self.path.push(id);
        }
        let result = f(self);
        if id.is_some() {
            self.path.pop();
        }
        Some(result)
    }
}

impl Value {
    /// Address of a container's shared storage
    fn storage_id(&self) -> Option<*const ()> {
        match self {
            Value::Slice(slice) => Some(Rc::as_ptr(&slice.items) as *const ()),
            Value::Map(map) => Some(Rc::as_ptr(&map.entries) as *const ()),
            _ => None,
        }
    }

    fn write_go(&self, f: &mut fmt::Formatter<'_>, visiting: &mut Visiting) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Slice(slice) => {
                write!(f, "[")?;
                for (i, item) in slice.items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    item.write_nested(f, visiting)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "map[")?;
                for (i, (key, value)) in map.entries.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}:", key)?;
                    value.write_nested(f, visiting)?;
                }
                write!(f, "]")
            }
            Value::Absent => write!(f, "<nil>"),
        }
    }

    /// An element of a container. A container already on the path renders as `<nil>`.
    fn write_nested(&self, f: &mut fmt::Formatter<'_>, visiting: &mut Visiting) -> fmt::Result {
        visiting
            .walk(self, |visiting| self.write_go(f, visiting))
            .unwrap_or_else(|| write!(f, "<nil>"))
    }
}

/// Go `%v` rendering
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_nested(f, &mut Visiting::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values() {
        let named = |n: &str| TypeExpr::Named(n.to_string());

        assert_eq!(Value::zero_value(&named("string")), Value::Str(String::new()));
        assert_eq!(Value::zero_value(&named("bool")), Value::Bool(false));
        assert_eq!(Value::zero_value(&named("float64")), Value::Float(0.0));
        assert_eq!(Value::zero_value(&named("int")), Value::Int(0));
        assert_eq!(Value::zero_value(&named("rune")), Value::Int(0));
        assert_eq!(Value::zero_value(&TypeExpr::Slice(Box::new(named("int")))), Value::Absent);
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(Value::Int(1).type_label(), "int");
        assert_eq!(Value::Str("a".into()).type_label(), "string");
        assert_eq!(Value::new_slice(Kind::Int, vec![]).type_label(), "[]int");
        assert_eq!(Value::Map(MapValue::new("string", "int")).type_label(), "map[string]int");
        assert_eq!(Value::Absent.type_label(), "auto");
    }

    #[test]
    fn test_clone_shares_container_storage() {
        let original = Value::new_slice(Kind::Int, vec![Value::Int(1)]);
        let alias = original.clone();

        if let Value::Slice(slice) = &alias {
            slice.items.borrow_mut()[0] = Value::Int(9);
        }
        assert_eq!(original.to_string(), "[9]");
    }

    #[test]
    fn test_go_formatting() {
        let map = MapValue::new("string", "int");
        map.entries.borrow_mut().insert(MapKey::Str("b".into()), Value::Int(2));
        map.entries.borrow_mut().insert(MapKey::Str("a".into()), Value::Int(1));

        assert_eq!(Value::Map(map).to_string(), "map[a:1 b:2]");
        assert_eq!(
            Value::new_slice(Kind::Str, vec![Value::Str("x".into()), Value::Str("y".into())]).to_string(),
            "[x y]"
        );
        assert_eq!(Value::Absent.to_string(), "<nil>");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_self_containing_map_renders_once() {
        let map = MapValue::new("string", "any");
        let value = Value::Map(map.clone());
        map.entries.borrow_mut().insert(MapKey::Str("n".into()), Value::Int(1));
        map.entries.borrow_mut().insert(MapKey::Str("self".into()), value.clone());

        assert_eq!(value.to_string(), "map[n:1 self:<nil>]");
    }

    #[test]
    fn test_sibling_aliases_are_not_cycles() {
        let inner = Value::new_slice(Kind::Int, vec![Value::Int(3)]);
        let outer = Value::new_slice(Kind::Slice, vec![inner.clone(), inner]);

        assert_eq!(outer.to_string(), "[[3] [3]]");
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(format_float(3.5), "3.5");
        assert_eq!(format_float(2.0), "2");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(1e21), "1e+21");
        assert_eq!(format_float(123456.0), "123456");
        assert_eq!(format_float(1e6), "1e+06");
        assert_eq!(format_float(123456789.0), "1.23456789e+08");
        assert_eq!(format_float(f64::INFINITY), "+Inf");
    }

    #[test]
    fn test_slice_get_bounds() {
        let slice = SliceValue::new(Kind::Int, vec![Value::Int(4), Value::Int(5)]);
        assert_eq!(slice.get(1), Some(Value::Int(5)));
        assert_eq!(slice.get(2), None);
        assert_eq!(slice.get(-1), None);
    }
}
