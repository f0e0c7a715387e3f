//! User function invocation.
//!
//! A call saves the caller's whole state in a [`CallFrame`], runs the callee
//! in a fresh [`Environment`] and restores the caller exactly afterwards.
//! Slices and maps passed as arguments share storage with the caller, so
//! mutations made through them survive the restore.

use crate::interpreter::constants::MAX_CALL_DEPTH_MARKER;
use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::memory::environment::Environment;
use crate::memory::stack::CallFrame;
use crate::memory::value::Value;
use crate::parser::ast::{Expr, SourceLocation};
use crate::parser::printer::quote_string;
use crate::snapshot::{StatementKind, StepEvent};
use std::mem;
use tracing::{debug, warn};

/// Argument rendering used in `func_call` step text
fn describe_argument(value: &Value) -> String {
    match value {
        Value::Str(s) => quote_string(s),
        other => other.to_string(),
    }
}

impl Interpreter {
    /// Invoke user function `name`, returning its result or `Absent`
    #[tracing::instrument(level = "debug", skip_all, fields(function = %name))]
    pub(crate) fn call_function(&mut self, name: &str, args: &[Expr], location: SourceLocation) -> Value {
        let Some(function) = self.functions.get(name).cloned() else {
            return Value::Absent;
        };

        let depth = self.call_stack.depth();
        if depth >= self.limits.max_call_depth {
            warn!(
                depth,
                limit = self.limits.max_call_depth,
                "call depth limit reached, abandoning call"
            );
            self.record(StepEvent::new(
                StatementKind::FuncCall,
                location.line,
                format!("{}(...): {}", name, MAX_CALL_DEPTH_MARKER),
            ));
            return Value::Absent;
        }

        // Arguments are evaluated in the caller's environment
        let arguments: Vec<Value> = args.iter().map(|arg| self.evaluate_expr(arg)).collect();
        let rendered: Vec<String> = arguments.iter().map(describe_argument).collect();
        self.record(StepEvent::new(
            StatementKind::FuncCall,
            location.line,
            format!("{}({})", name, rendered.join(", ")),
        ));

        let saved_env = mem::replace(&mut self.env, Environment::new(name));
        self.call_stack.push(CallFrame {
            function_name: name.to_string(),
            saved_env,
            saved_has_returned: self.has_returned(),
            saved_return_value: self.return_value.take(),
        });
        self.control_flow = ControlFlow::Normal;

        // Missing arguments bind the parameter's zero value
        for (i, param) in function.params.iter().enumerate() {
            if param.name == "_" {
                continue;
            }
            let value = arguments
                .get(i)
                .cloned()
                .unwrap_or_else(|| Value::zero_value(&param.param_type));
            self.env.write(&param.name, value, param.param_type.label());
        }

        debug!(depth = depth + 1, "entering function");
        self.record(StepEvent::new(
            StatementKind::FuncEnter,
            function.body.location.line,
            format!("enter {}", name),
        ));

        self.execute_block(&function.body);
        let result = self.return_value.take().unwrap_or(Value::Absent);

        if let Some(frame) = self.call_stack.pop() {
            self.env = frame.saved_env;
            self.control_flow = if frame.saved_has_returned {
                ControlFlow::Return
            } else {
                ControlFlow::Normal
            };
            self.return_value = frame.saved_return_value;
        }
        debug!(result = %result, "leaving function");

        result
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::constants::Limits;
    use crate::interpreter::engine::Interpreter;
    use crate::parser::parse_source;
    use crate::snapshot::{StatementKind, Trace};
    use pretty_assertions::assert_eq;

    fn run_with(source: &str, limits: Limits) -> Trace {
        Interpreter::new(parse_source(source).unwrap(), limits).run()
    }

    fn run(source: &str) -> Trace {
        run_with(source, Limits::default())
    }

    const ADD: &str = "package main

func add(a int, b int) int {
	sum := a + b
	return sum
}

func main() {
	x := 2
	y := add(x, 3)
	x = y
}
";

    #[test]
    fn test_call_protocol_steps() {
        let trace = run(ADD);
        let kinds: Vec<_> = trace.steps.iter().map(|s| s.statement_type).collect();
        assert_eq!(
            kinds,
            vec![
                StatementKind::Declare,
                StatementKind::FuncCall,
                StatementKind::FuncEnter,
                StatementKind::Declare,
                StatementKind::FuncReturn,
                StatementKind::Declare,
                StatementKind::Assign,
            ]
        );

        let call = &trace.steps[1];
        assert_eq!(call.statement, "add(2, 3)");
        assert_eq!(call.line, 10);
        assert_eq!(call.call_stack, vec!["main"]);

        let enter = &trace.steps[2];
        assert_eq!(enter.statement, "enter add");
        assert_eq!(enter.line, 3);
        assert_eq!(enter.function_name, "add");
        assert_eq!(enter.call_stack, vec!["main", "add"]);
        assert_eq!(enter.scope_stack, vec!["add"]);
        let names: Vec<_> = enter.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let after = &trace.steps[5];
        assert_eq!(after.function_name, "main");
        assert_eq!(after.variable("y").unwrap().value.to_string(), "5");
        assert!(after.variable("sum").is_none());
    }

    #[test]
    fn test_recursive_fib() {
        let trace = run("package main

func fib(n int) int {
	if n < 2 {
		return n
	}
	return fib(n-1) + fib(n-2)
}

func main() {
	r := fib(5)
}
");
        let last = trace.steps.last().unwrap();
        assert_eq!(last.variable("r").unwrap().value.to_string(), "5");
        let deepest = trace.steps.iter().map(|s| s.call_stack.len()).max().unwrap();
        assert_eq!(deepest, 6);
    }

    #[test]
    fn test_depth_limit_abandons_call() {
        let trace = run_with(
            "package main

func down(n int) int {
	return down(n + 1)
}

func main() {
	r := down(0)
}
",
            Limits {
                max_call_depth: 4,
                ..Limits::default()
            },
        );

        let cutoff: Vec<_> = trace
            .steps
            .iter()
            .filter(|s| s.statement.contains("max call depth reached"))
            .collect();
        assert_eq!(cutoff.len(), 1);
        assert_eq!(cutoff[0].statement_type, StatementKind::FuncCall);
        assert_eq!(cutoff[0].call_stack.len(), 4);
        assert!(trace.steps.iter().all(|s| s.call_stack.len() <= 4));

        let last = trace.steps.last().unwrap();
        assert_eq!(last.function_name, "main");
        assert_eq!(last.variable("r").unwrap().value.to_string(), "<nil>");
    }

    #[test]
    fn test_missing_arguments_get_zero_values_and_containers_alias() {
        let trace = run("package main

func fill(xs []int, label string, n int) {
	xs[0] = n
}

func main() {
	data := []int{0, 0}
	fill(data)
	fill(data, \"x\", 7)
}
");
        let enter = trace
            .steps
            .iter()
            .find(|s| s.statement_type == StatementKind::FuncEnter)
            .unwrap();
        assert_eq!(enter.variable("label").unwrap().value.to_string(), "");
        assert_eq!(enter.variable("n").unwrap().type_label, "int");

        let last = trace.steps.last().unwrap();
        assert_eq!(last.variable("data").unwrap().value.to_string(), "[7 0]");
    }

    #[test]
    fn test_caller_bindings_restored() {
        let trace = run("package main

func shadow(x int) int {
	x = 100
	y := 1
	return x + y
}

func main() {
	x := 1
	z := shadow(x)
}
");
        let last = trace.steps.last().unwrap();
        assert_eq!(last.variable("x").unwrap().value.to_string(), "1");
        assert_eq!(last.variable("z").unwrap().value.to_string(), "101");
        assert!(last.variable("y").is_none());
        assert_eq!(last.scope_stack, vec!["main"]);
    }

    #[test]
    fn test_return_inside_loop_leaves_function() {
        let trace = run("package main

func find(xs []int, want int) int {
	for i, x := range xs {
		if x == want {
			return i
		}
	}
	return -1
}

func main() {
	a := find([]int{4, 5, 6}, 5)
	b := find([]int{4}, 9)
}
");
        let last = trace.steps.last().unwrap();
        assert_eq!(last.variable("a").unwrap().value.to_string(), "1");
        assert_eq!(last.variable("b").unwrap().value.to_string(), "-1");
    }
}
