//! Simple statement execution
//!
//! Adds `impl Interpreter` methods for assignments, declarations, `if`,
//! inc/dec, `return` and expression statements. Each executed construct
//! records exactly one step after its effect is applied; `if` records before
//! its condition is evaluated so calls made by the condition follow it.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::memory::value::{MapKey, Value};
use crate::parser::ast::{AssignOp, BinOp, Block, Expr, IncDecOp, SourceLocation, Stmt, TypeExpr};
use crate::snapshot::{StatementKind, StepEvent};

/// `fmt` functions that write to the program's output
const PRINT_FUNCTIONS: [&str; 3] = ["Print", "Println", "Printf"];

impl Interpreter {
    /// `=`, `:=` and `op=`
    pub(crate) fn execute_assign(&mut self, stmt: &Stmt, lhs: &[Expr], op: AssignOp, rhs: &[Expr]) {
        let kind = match op {
            AssignOp::Define => StatementKind::Declare,
            AssignOp::Assign | AssignOp::Compound(_) => StatementKind::Assign,
        };

        match op {
            AssignOp::Compound(bin_op) => {
                if let (Some(target), Some(operand)) = (lhs.first(), rhs.first()) {
                    self.apply_compound(target, bin_op, operand);
                }
            }
            AssignOp::Assign | AssignOp::Define => {
                // Every right-hand side is evaluated before any target is written
                let mut values: Vec<Value> = rhs.iter().map(|expr| self.evaluate_expr(expr)).collect();
                values.resize(lhs.len().max(values.len()), Value::Absent);

                for (target, value) in lhs.iter().zip(values) {
                    match (op, target) {
                        (AssignOp::Define, Expr::Ident(name, _)) => self.define_variable(name, value),
                        _ => self.assign_to(target, value),
                    }
                }
            }
        }

        self.record(StepEvent::new(kind, stmt.location().line, stmt.to_string()));
    }

    /// `target op= operand` with the target's container and index evaluated once
    fn apply_compound(&mut self, target: &Expr, op: BinOp, operand: &Expr) {
        match target {
            Expr::Index { target, index, .. } => {
                let container = self.evaluate_expr(target);
                let index = self.evaluate_expr(index);
                let operand = self.evaluate_expr(operand);
                let current = Self::index_value(&container, &index);
                Self::store_indexed(&container, &index, Self::binary_op(op, &current, &operand));
            }
            Expr::Paren(inner, _) => self.apply_compound(inner, op, operand),
            other => {
                let current = self.evaluate_expr(other);
                let operand = self.evaluate_expr(operand);
                let updated = Self::binary_op(op, &current, &operand);
                self.assign_to(other, updated);
            }
        }
    }

    /// `var` and `const` declarations
    pub(crate) fn execute_var_decl(
        &mut self,
        stmt: &Stmt,
        names: &[String],
        var_type: Option<&TypeExpr>,
        values: &[Expr],
    ) {
        let values: Vec<Value> = values.iter().map(|expr| self.evaluate_expr(expr)).collect();

        for (i, name) in names.iter().enumerate() {
            if name == "_" {
                continue;
            }
            let value = match (values.get(i), var_type) {
                (Some(value), _) => value.clone(),
                (None, Some(var_type)) => Value::zero_value(var_type),
                (None, None) => Value::Absent,
            };
            let label = match var_type {
                Some(var_type) => var_type.label(),
                None => value.type_label(),
            };
            self.env.write(name, value, label);
        }

        self.record(StepEvent::new(
            StatementKind::Declare,
            stmt.location().line,
            stmt.to_string(),
        ));
    }

    /// `if [init;] cond { ... } [else ...]`
    pub(crate) fn execute_if(
        &mut self,
        init: Option<&Stmt>,
        condition: &Expr,
        then_block: &Block,
        else_branch: Option<&Stmt>,
        location: SourceLocation,
    ) {
        if let Some(init) = init {
            self.execute_statement(init);
            if self.control_flow != ControlFlow::Normal {
                return;
            }
        }

        self.record(StepEvent::new(
            StatementKind::IfCond,
            location.line,
            format!("if {}", condition),
        ));

        // Non-boolean conditions count as false
        let taken = self.evaluate_expr(condition).as_bool().unwrap_or(false);
        if taken {
            self.execute_block(then_block);
        } else if let Some(else_branch) = else_branch {
            self.execute_statement(else_branch);
        }
    }

    /// `x++` / `x--`
    pub(crate) fn execute_inc_dec(&mut self, stmt: &Stmt, target: &Expr, op: IncDecOp) {
        let delta = match op {
            IncDecOp::Inc => 1,
            IncDecOp::Dec => -1,
        };
        self.adjust_number(target, delta);
        self.record(StepEvent::new(
            StatementKind::Assign,
            stmt.location().line,
            stmt.to_string(),
        ));
    }

    fn adjust_number(&mut self, target: &Expr, delta: i64) {
        match target {
            Expr::Ident(name, _) => {
                let updated = match self.env.lookup(name) {
                    Some(Value::Int(n)) => Value::Int(n.wrapping_add(delta)),
                    Some(Value::Float(x)) => Value::Float(x + delta as f64),
                    _ => return,
                };
                let label = self
                    .env
                    .type_label(name)
                    .map(str::to_string)
                    .unwrap_or_else(|| updated.type_label());
                self.env.write(name, updated, label);
            }

            Expr::Index { target, index, .. } => {
                let container = self.evaluate_expr(target);
                let index = self.evaluate_expr(index);
                match &container {
                    Value::Map(map) => {
                        let Some(key) = MapKey::from_value(&index) else {
                            return;
                        };
                        let mut entries = map.entries.borrow_mut();
                        let updated = match entries.get(&key) {
                            None => Value::Int(delta),
                            Some(Value::Int(n)) => Value::Int(n.wrapping_add(delta)),
                            Some(Value::Float(x)) => Value::Float(x + delta as f64),
                            Some(_) => return,
                        };
                        entries.insert(key, updated);
                    }
                    Value::Slice(slice) => {
                        let Some(i) = index.as_int().and_then(|i| usize::try_from(i).ok()) else {
                            return;
                        };
                        let mut items = slice.items.borrow_mut();
                        if let Some(Value::Int(n)) = items.get_mut(i) {
                            *n = n.wrapping_add(delta);
                        }
                    }
                    _ => {}
                }
            }

            Expr::Paren(inner, _) => self.adjust_number(inner, delta),

            _ => {}
        }
    }

    /// `return [expr]`
    pub(crate) fn execute_return(&mut self, stmt: &Stmt, results: &[Expr]) {
        // Only the first result is supported
        let value = results.first().map(|expr| self.evaluate_expr(expr));
        self.return_value = value;
        self.control_flow = ControlFlow::Return;
        self.record(StepEvent::new(
            StatementKind::FuncReturn,
            stmt.location().line,
            stmt.to_string(),
        ));
    }

    /// A call or other expression used as a statement
    pub(crate) fn execute_expression_statement(&mut self, stmt: &Stmt, expr: &Expr) {
        let line = stmt.location().line;

        if let Expr::Call { callee, args, location } = expr {
            match callee.as_ref() {
                // User calls record their own func_call/func_enter steps
                Expr::Ident(name, _) if self.functions.contains_key(name) => {
                    self.call_function(name, args, *location);
                    return;
                }
                Expr::Selector { target, field, .. }
                    if target.as_ident() == Some("fmt") && PRINT_FUNCTIONS.contains(&field.as_str()) =>
                {
                    let output = self.format_fmt_call(field, args);
                    let mut event = StepEvent::new(StatementKind::Call, line, stmt.to_string());
                    if !output.is_empty() {
                        event = event.with_output(output);
                    }
                    self.record(event);
                    return;
                }
                _ => {}
            }
        }

        self.evaluate_expr(expr);
        self.record(StepEvent::new(StatementKind::Call, line, stmt.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::constants::Limits;
    use crate::interpreter::engine::Interpreter;
    use crate::parser::parse_source;
    use crate::snapshot::{StatementKind, Trace};
    use pretty_assertions::assert_eq;

    fn run_main(body: &str) -> Trace {
        let source = format!("package main\n\nimport \"fmt\"\n\nfunc main() {{\n{}\n}}\n", body);
        let program = parse_source(&source).unwrap();
        Interpreter::new(program, Limits::default()).run()
    }

    fn kinds(trace: &Trace) -> Vec<StatementKind> {
        trace.steps.iter().map(|s| s.statement_type).collect()
    }

    fn final_value(trace: &Trace, name: &str) -> String {
        trace
            .steps
            .last()
            .and_then(|s| s.variable(name))
            .map(|v| v.value.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_declare_assign_print() {
        let trace = run_main("x := 5\nx = x + 3\nfmt.Println(x)");

        assert_eq!(
            kinds(&trace),
            vec![StatementKind::Declare, StatementKind::Assign, StatementKind::Call]
        );
        assert_eq!(trace.steps[0].variable("x").unwrap().type_label, "int");
        assert_eq!(trace.steps[1].variable("x").unwrap().value.to_string(), "8");
        assert_eq!(trace.steps[2].output.as_deref(), Some("8\n"));
        assert_eq!(trace.final_output, "8\n");
    }

    #[test]
    fn test_parallel_assignment_swaps() {
        let trace = run_main("a, b := 1, 2\na, b = b, a");
        assert_eq!(final_value(&trace, "a"), "2");
        assert_eq!(final_value(&trace, "b"), "1");
    }

    #[test]
    fn test_compound_assignment() {
        let trace = run_main("n := 10\nn -= 3\nn *= 2\nn %= 4");
        assert_eq!(final_value(&trace, "n"), "2");
        assert_eq!(trace.steps[1].statement, "n -= 3");
        assert_eq!(trace.steps[1].statement_type, StatementKind::Assign);
    }

    #[test]
    fn test_compound_index_target_evaluated_once() {
        let source = "package main

func pick(calls []int) int {
\tcalls[0]++
\treturn calls[0]
}

func main() {
\tcalls := []int{0}
\txs := []int{10, 20, 30}
\txs[pick(calls)] += 5
}
";
        let trace = Interpreter::new(parse_source(source).unwrap(), Limits::default()).run();

        let calls = trace
            .steps
            .iter()
            .filter(|s| s.statement_type == StatementKind::FuncCall)
            .count();
        assert_eq!(calls, 1);
        assert_eq!(final_value(&trace, "calls"), "[1]");
        assert_eq!(final_value(&trace, "xs"), "[10 25 30]");
    }

    #[test]
    fn test_compound_assignment_on_map_entry() {
        let trace = run_main("m := map[string]int{\"a\": 1}\nm[\"a\"] += 4\nm[\"b\"] -= 2\nm[\"a\"] *= 3");
        assert_eq!(final_value(&trace, "m"), "map[a:15 b:-2]");
    }

    #[test]
    fn test_var_decl_zero_values_and_labels() {
        let trace = run_main("var s string\nvar xs []int\nvar f float64 = 1.5\nconst limit = 3");
        let last = trace.steps.last().unwrap();

        assert_eq!(last.variable("s").unwrap().value.to_string(), "");
        assert_eq!(last.variable("xs").unwrap().type_label, "[]int");
        assert_eq!(last.variable("xs").unwrap().value.to_string(), "<nil>");
        assert_eq!(last.variable("f").unwrap().type_label, "float64");
        assert_eq!(last.variable("limit").unwrap().type_label, "int");
        assert!(kinds(&trace).iter().all(|k| *k == StatementKind::Declare));
    }

    #[test]
    fn test_if_else_chain() {
        let trace = run_main("x := 7\nif x < 5 {\n y := 1\n} else if x < 10 {\n y := 2\n} else {\n y := 3\n}");

        assert_eq!(
            kinds(&trace),
            vec![
                StatementKind::Declare,
                StatementKind::IfCond,
                StatementKind::IfCond,
                StatementKind::Declare
            ]
        );
        assert_eq!(trace.steps[1].statement, "if x < 5");
        assert_eq!(trace.steps[2].statement, "if x < 10");
        assert_eq!(final_value(&trace, "y"), "2");
    }

    #[test]
    fn test_if_with_init_and_non_bool_condition() {
        let trace = run_main("if v := 3; v {\n w := 1\n}");
        assert_eq!(kinds(&trace), vec![StatementKind::Declare, StatementKind::IfCond]);
        assert!(trace.steps[1].variable("w").is_none());
    }

    #[test]
    fn test_inc_dec_on_map_and_slice_entries() {
        let trace = run_main(
            "counts := make(map[string]int)\ncounts[\"a\"]++\ncounts[\"a\"]++\nxs := []int{1, 2}\nxs[1]--",
        );
        assert_eq!(final_value(&trace, "counts"), "map[a:2]");
        assert_eq!(final_value(&trace, "xs"), "[1 1]");
    }

    #[test]
    fn test_slice_assignment_requires_matching_kind() {
        let trace = run_main("xs := []int{1, 2}\nxs[0] = \"a\"\nxs[1] = 9\nxs[5] = 1");
        assert_eq!(final_value(&trace, "xs"), "[1 9]");
    }

    #[test]
    fn test_blank_identifier_discards() {
        let trace = run_main("_ = 5\n_, y := 1, 2");
        let last = trace.steps.last().unwrap();
        assert!(last.variable("_").is_none());
        assert_eq!(last.variable("y").unwrap().value.to_string(), "2");
    }

    #[test]
    fn test_print_family_output() {
        let trace = run_main("fmt.Print(\"a\", 1, 2, \"b\")\nfmt.Printf(\"%d-%s\\n\", 4, \"x\")\nfmt.Printf(\"\")");
        assert_eq!(trace.steps[0].output.as_deref(), Some("a1 2b"));
        assert_eq!(trace.steps[1].output.as_deref(), Some("4-x\n"));
        assert_eq!(trace.steps[2].output, None);
        assert_eq!(trace.final_output, "a1 2b4-x\n");
    }

    #[test]
    fn test_delete_records_call() {
        let trace = run_main("m := map[string]int{\"a\": 1, \"b\": 2}\ndelete(m, \"a\")");
        assert_eq!(trace.steps[1].statement_type, StatementKind::Call);
        assert_eq!(trace.steps[1].statement, "delete(m, \"a\")");
        assert_eq!(final_value(&trace, "m"), "map[b:2]");
    }
}
