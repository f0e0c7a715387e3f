//! Variable environment for one function invocation
//!
//! An [`Environment`] holds every binding of the currently executing call:
//! value, display type label, and the scope label recorded when the name was
//! first introduced. Loop bodies push a label onto the environment's scope
//! stack but do not open a new binding scope, so a name introduced inside a
//! loop stays visible until the function returns.

use super::value::Value;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    type_label: String,
    scope: String,
}

/// A borrowed view of one binding, in introduction order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding<'a> {
    pub name: &'a str,
    pub type_label: &'a str,
    pub value: &'a Value,
    pub scope: &'a str,
}

/// Bindings and scope labels of the active invocation
#[derive(Debug, Clone, Default)]
pub struct Environment {
    slots: FxHashMap<String, Slot>,
    insertion_order: Vec<String>, // Track order of introduction
    scope_stack: Vec<String>,
}

impl Environment {
    /// A fresh environment whose scope stack is `[root_scope]`
    pub fn new(root_scope: impl Into<String>) -> Self {
        Environment {
            slots: FxHashMap::default(),
            insertion_order: Vec::new(),
            scope_stack: vec![root_scope.into()],
        }
    }

    /// Value of `name`. Unbound names fall back to the predeclared `true`,
    /// `false` and `nil`; anything else reads as `0`.
    pub fn read(&self, name: &str) -> Value {
        if let Some(slot) = self.slots.get(name) {
            return slot.value.clone();
        }
        match name {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "nil" => Value::Absent,
            _ => Value::Int(0),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).map(|slot| &slot.value)
    }

    pub fn type_label(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(|slot| slot.type_label.as_str())
    }

    /// Insert or overwrite a binding. The scope label and position are fixed
    /// at first introduction.
    pub fn write(&mut self, name: &str, value: Value, type_label: impl Into<String>) {
        let type_label = type_label.into();
        if let Some(slot) = self.slots.get_mut(name) {
            slot.value = value;
            slot.type_label = type_label;
            return;
        }

        let scope = self.scope_label();
        self.insertion_order.push(name.to_string());
        self.slots.insert(
            name.to_string(),
            Slot {
                value,
                type_label,
                scope,
            },
        );
    }

    pub fn push_scope(&mut self, label: impl Into<String>) {
        self.scope_stack.push(label.into());
    }

    pub fn pop_scope(&mut self) -> Option<String> {
        self.scope_stack.pop()
    }

    pub fn scope_stack(&self) -> &[String] {
        &self.scope_stack
    }

    /// Dotted scope path, e.g. `main.for_2`
    pub fn scope_label(&self) -> String {
        self.scope_stack.join(".")
    }

    /// All bindings in introduction order
    pub fn snapshot(&self) -> Vec<Binding<'_>> {
        self.insertion_order
            .iter()
            .filter_map(|name| {
                self.slots.get(name).map(|slot| Binding {
                    name,
                    type_label: &slot.type_label,
                    value: &slot.value,
                    scope: &slot.scope,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_fallbacks() {
        let env = Environment::new("main");

        assert_eq!(env.read("true"), Value::Bool(true));
        assert_eq!(env.read("false"), Value::Bool(false));
        assert_eq!(env.read("nil"), Value::Absent);
        assert_eq!(env.read("undefined"), Value::Int(0));
    }

    #[test]
    fn test_bound_name_shadows_predeclared() {
        let mut env = Environment::new("main");
        env.write("true", Value::Int(7), "int");
        assert_eq!(env.read("true"), Value::Int(7));
    }

    #[test]
    fn test_scope_label_fixed_at_introduction() {
        let mut env = Environment::new("main");
        env.write("x", Value::Int(1), "int");
        env.push_scope("for_1");
        env.write("y", Value::Int(2), "int");
        env.write("x", Value::Int(3), "int");
        env.pop_scope();

        let snapshot = env.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!((snapshot[0].name, snapshot[0].scope), ("x", "main"));
        assert_eq!(snapshot[0].value, &Value::Int(3));
        assert_eq!((snapshot[1].name, snapshot[1].scope), ("y", "main.for_1"));
        assert_eq!(env.scope_stack(), ["main".to_string()]);
    }

    #[test]
    fn test_overwrite_updates_type_label() {
        let mut env = Environment::new("main");
        env.write("v", Value::Int(1), "int");
        env.write("v", Value::Str("s".into()), "string");
        assert_eq!(env.type_label("v"), Some("string"));
        assert_eq!(env.len(), 1);
    }
}
