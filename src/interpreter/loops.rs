//! Loop statement execution (`for` and `for ... range`).
//!
//! Adds `impl Interpreter` methods for the loop forms of the Go subset.
//! `break` and `continue` are propagated via `LoopBodyResult` so the loop
//! driver can react without inspecting `control_flow` directly.
//!
//! Every loop execution gets a fresh `for_N` id from the [`LoopCounter`] and
//! stops silently once it has run `max_loop_iterations` iterations.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::memory::value::{MapKey, MapValue, SliceValue, Value};
use crate::parser::ast::{Block, Expr, Stmt};
use crate::snapshot::{StatementKind, StepEvent};
use tracing::{debug, warn};

/// Hands out loop execution ids over a whole run
#[derive(Debug, Default)]
pub(crate) struct LoopCounter {
    executions: usize,
}

impl LoopCounter {
    /// Start a new loop execution
    pub(crate) fn begin(&mut self, max_iterations: usize) -> LoopExecution {
        self.executions += 1;
        LoopExecution {
            id: format!("for_{}", self.executions),
            iteration: 0,
            max_iterations,
        }
    }
}

/// Iteration state of one loop execution
#[derive(Debug)]
pub(crate) struct LoopExecution {
    pub(crate) id: String,
    pub(crate) iteration: usize,
    max_iterations: usize,
}

impl LoopExecution {
    /// Whether another iteration is allowed
    fn has_budget(&self) -> bool {
        if self.iteration < self.max_iterations {
            return true;
        }
        warn!(
            loop_id = %self.id,
            limit = self.max_iterations,
            "loop iteration limit reached, stopping loop"
        );
        false
    }

    fn advance(&mut self) {
        self.iteration += 1;
    }
}

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`, the loop should iterate again.
    Continue,
    /// `break` was encountered, the loop should exit cleanly.
    Break,
    /// `return` was executed; the loop driver should unwind and leave
    /// `self.control_flow` for the call boundary.
    Exit,
}

/// What a range loop walks, fixed when the loop starts
enum RangeSource {
    Slice { slice: SliceValue, len: usize },
    Map { map: MapValue, keys: Vec<MapKey> },
    Empty,
}

impl RangeSource {
    fn new(collection: Value) -> Self {
        match collection {
            Value::Slice(slice) => {
                let len = slice.len();
                RangeSource::Slice { slice, len }
            }
            Value::Map(map) => {
                let keys = map.entries.borrow().keys().cloned().collect();
                RangeSource::Map { map, keys }
            }
            _ => RangeSource::Empty,
        }
    }

    fn len(&self) -> usize {
        match self {
            RangeSource::Slice { len, .. } => *len,
            RangeSource::Map { keys, .. } => keys.len(),
            RangeSource::Empty => 0,
        }
    }

    /// Key and current element at `position`, read from the live storage
    fn entry(&self, position: usize) -> Option<(Value, Value)> {
        match self {
            RangeSource::Slice { slice, .. } => {
                let item = slice.items.borrow().get(position).cloned().unwrap_or_default();
                Some((Value::Int(position as i64), item))
            }
            RangeSource::Map { map, keys } => {
                let key = keys.get(position)?;
                let item = map.entries.borrow().get(key).cloned()?;
                Some((key.to_value(), item))
            }
            RangeSource::Empty => None,
        }
    }
}

impl Interpreter {
    /// Executes `body` with the loop's label pushed onto the scope stack.
    pub(crate) fn execute_loop_body(&mut self, body: &Block, loop_id: &str) -> LoopBodyResult {
        self.env.push_scope(loop_id);
        self.execute_block(body);
        self.env.pop_scope();

        match self.control_flow {
            ControlFlow::Normal => LoopBodyResult::Continue,
            ControlFlow::Continue => {
                self.control_flow = ControlFlow::Normal;
                LoopBodyResult::Continue
            }
            ControlFlow::Break => {
                self.control_flow = ControlFlow::Normal;
                LoopBodyResult::Break
            }
            ControlFlow::Return => LoopBodyResult::Exit,
        }
    }

    /// Executes a `for init; cond; post { body }` loop in any of its forms.
    ///
    /// The init statement records its own step, followed by one `for_init`
    /// step. Each iteration whose condition holds records a `for_cond` step
    /// carrying the loop id and the 1-based iteration number.
    pub(crate) fn execute_for(
        &mut self,
        stmt: &Stmt,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        post: Option<&Stmt>,
        body: &Block,
    ) {
        let line = stmt.location().line;
        let mut execution = self.loop_counter.begin(self.limits.max_loop_iterations);
        debug!(loop_id = %execution.id, line, "entering for loop");

        if let Some(init) = init {
            self.execute_statement(init);
        }
        self.record(StepEvent::new(StatementKind::ForInit, line, stmt.to_string()));

        let condition_text = condition
            .map(|c| c.to_string())
            .unwrap_or_else(|| "true".to_string());

        while execution.has_budget() {
            // Only `false` ends the loop; a condition without a boolean result runs to the cap
            if let Some(condition) = condition {
                if self.evaluate_expr(condition) == Value::Bool(false) {
                    break;
                }
            }

            execution.advance();
            self.record(
                StepEvent::new(StatementKind::ForCond, line, condition_text.clone())
                    .with_loop(execution.id.clone(), execution.iteration),
            );

            match self.execute_loop_body(body, &execution.id) {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break => break,
                LoopBodyResult::Exit => return,
            }

            if let Some(post) = post {
                self.execute_statement(post);
            }
        }
    }

    /// Executes a `for k, v := range collection { body }` loop.
    ///
    /// The collection is evaluated once and its length fixed at loop start.
    /// Each element is read from the shared storage on its own iteration, so
    /// writes made by the body to later elements are seen. Maps iterate over
    /// the keys present at loop start in key order, skipping keys deleted
    /// before they are reached. Any other value iterates zero times.
    pub(crate) fn execute_range(
        &mut self,
        stmt: &Stmt,
        key: Option<&str>,
        value: Option<&str>,
        define: bool,
        collection: &Expr,
        body: &Block,
    ) {
        let line = stmt.location().line;
        let mut execution = self.loop_counter.begin(self.limits.max_loop_iterations);
        debug!(loop_id = %execution.id, line, "entering range loop");

        let source = RangeSource::new(self.evaluate_expr(collection));
        self.record(StepEvent::new(StatementKind::ForInit, line, stmt.to_string()));

        let condition_text = format!("range {}", collection);
        for position in 0..source.len() {
            let Some((entry_key, entry_value)) = source.entry(position) else {
                continue;
            };
            if !execution.has_budget() {
                break;
            }

            for (name, bound) in [(key, entry_key), (value, entry_value)] {
                let Some(name) = name else { continue };
                if define {
                    self.define_variable(name, bound);
                } else {
                    self.assign_variable(name, bound);
                }
            }

            execution.advance();
            self.record(
                StepEvent::new(StatementKind::ForCond, line, condition_text.clone())
                    .with_loop(execution.id.clone(), execution.iteration),
            );

            match self.execute_loop_body(body, &execution.id) {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break => break,
                LoopBodyResult::Exit => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::constants::Limits;
    use crate::interpreter::engine::Interpreter;
    use crate::parser::parse_source;
    use crate::snapshot::{StatementKind, Trace};
    use pretty_assertions::assert_eq;

    fn run_main_with(body: &str, limits: Limits) -> Trace {
        let source = format!("package main\n\nimport \"fmt\"\n\nfunc main() {{\n{}\n}}\n", body);
        Interpreter::new(parse_source(&source).unwrap(), limits).run()
    }

    fn run_main(body: &str) -> Trace {
        run_main_with(body, Limits::default())
    }

    fn iterations(trace: &Trace) -> Vec<(String, usize)> {
        trace
            .steps
            .iter()
            .filter_map(|s| s.loop_iteration.as_ref())
            .map(|l| (l.loop_id.clone(), l.iteration))
            .collect()
    }

    #[test]
    fn test_counted_loop() {
        let trace = run_main("sum := 0\nfor i := 0; i < 3; i++ {\n sum = sum + i\n}");

        let conds: Vec<_> = trace
            .steps
            .iter()
            .filter(|s| s.statement_type == StatementKind::ForCond)
            .collect();
        assert_eq!(conds.len(), 3);
        assert_eq!(
            iterations(&trace),
            vec![("for_1".to_string(), 1), ("for_1".to_string(), 2), ("for_1".to_string(), 3)]
        );
        assert_eq!(trace.steps[1].statement, "i := 0");
        assert_eq!(trace.steps[2].statement_type, StatementKind::ForInit);
        assert_eq!(conds[0].statement, "i < 3");

        let last = trace.steps.last().unwrap();
        assert_eq!(last.variable("sum").unwrap().value.to_string(), "3");
    }

    #[test]
    fn test_body_scope_label() {
        let trace = run_main("for i := 0; i < 1; i++ {\n t := i\n}");
        let declare = trace
            .steps
            .iter()
            .find(|s| s.statement == "t := i")
            .unwrap();
        assert_eq!(declare.scope_stack, vec!["main", "for_1"]);
        assert_eq!(declare.variable("t").unwrap().scope, "main.for_1");
        assert_eq!(declare.variable("i").unwrap().scope, "main");
        assert_eq!(trace.steps.last().unwrap().scope_stack, vec!["main"]);
    }

    #[test]
    fn test_infinite_loop_is_capped() {
        let trace = run_main_with(
            "n := 0\nfor {\n n++\n}",
            Limits {
                max_loop_iterations: 5,
                ..Limits::default()
            },
        );
        let iters = iterations(&trace);
        assert_eq!(iters.len(), 5);
        assert_eq!(iters.last().unwrap().1, 5);
        assert_eq!(trace.steps.last().unwrap().variable("n").unwrap().value.to_string(), "5");
    }

    #[test]
    fn test_default_cap_is_one_hundred() {
        let trace = run_main("for {\n}");
        assert_eq!(iterations(&trace).len(), 100);
    }

    #[test]
    fn test_break_and_continue() {
        let trace = run_main(
            "total := 0\nfor i := 0; i < 10; i++ {\n if i == 4 {\n  break\n }\n if i % 2 == 0 {\n  continue\n }\n total += i\n}",
        );
        let last = trace.steps.last().unwrap();
        assert_eq!(last.variable("total").unwrap().value.to_string(), "4");
        assert_eq!(last.variable("i").unwrap().value.to_string(), "4");
        assert!(trace.steps.iter().any(|s| s.statement_type == StatementKind::Break));
        assert_eq!(
            trace
                .steps
                .iter()
                .filter(|s| s.statement_type == StatementKind::Continue)
                .count(),
            2
        );
    }

    #[test]
    fn test_each_execution_gets_fresh_id() {
        let trace = run_main("for i := 0; i < 2; i++ {\n for j := 0; j < 2; j++ {\n }\n}");
        let ids: Vec<_> = iterations(&trace).into_iter().map(|(id, _)| id).collect();
        assert_eq!(
            ids,
            vec!["for_1", "for_2", "for_2", "for_1", "for_3", "for_3"]
        );
    }

    #[test]
    fn test_range_over_slice_and_map() {
        let trace = run_main(
            "xs := []int{10, 20}\nsum := 0\nfor i, x := range xs {\n sum += i + x\n}\nm := map[string]int{\"b\": 2, \"a\": 1}\nvar keys []string\nfor k := range m {\n keys = append(keys, k)\n}",
        );
        let last = trace.steps.last().unwrap();
        assert_eq!(last.variable("sum").unwrap().value.to_string(), "31");
        assert_eq!(last.variable("keys").unwrap().value.to_string(), "[a b]");
        assert_eq!(last.variable("keys").unwrap().type_label, "[]string");

        let range_conds: Vec<_> = trace
            .steps
            .iter()
            .filter(|s| s.statement_type == StatementKind::ForCond)
            .map(|s| s.statement.as_str())
            .collect();
        assert_eq!(range_conds, vec!["range xs", "range xs", "range m", "range m"]);
    }

    #[test]
    fn test_range_length_fixed_at_start() {
        let trace = run_main("xs := []int{1, 2}\nfor _, x := range xs {\n xs = append(xs, x)\n}");
        assert_eq!(
            trace.steps.last().unwrap().variable("xs").unwrap().value.to_string(),
            "[1 2 1 2]"
        );
    }

    #[test]
    fn test_range_reads_elements_written_during_loop() {
        let trace = run_main(
            "s := []int{1, 2, 3}\nfor i, v := range s {\n if i == 0 {\n  s[2] = 100\n }\n fmt.Println(v)\n}",
        );
        assert_eq!(trace.final_output, "1\n2\n100\n");
    }

    #[test]
    fn test_range_skips_map_keys_deleted_before_reached() {
        let trace = run_main(
            "m := map[string]int{\"a\": 1, \"b\": 2, \"c\": 3}\nfor k, v := range m {\n if k == \"a\" {\n  delete(m, \"b\")\n  m[\"c\"] = 30\n }\n fmt.Println(k, v)\n}",
        );
        assert_eq!(trace.final_output, "a 1\nc 30\n");
        assert_eq!(iterations(&trace).len(), 2);
    }

    #[test]
    fn test_non_boolean_condition_runs_to_cap() {
        let trace = run_main("x := 0.5\nn := 0\nfor x < 1.5 {\n n++\n}");
        let conds = trace
            .steps
            .iter()
            .filter(|s| s.statement_type == StatementKind::ForCond)
            .count();
        assert_eq!(conds, 100);
        assert_eq!(trace.steps.last().unwrap().variable("n").unwrap().value.to_string(), "100");
    }

    #[test]
    fn test_false_condition_skips_body() {
        let trace = run_main("n := 0\nfor n > 5 {\n n++\n}");
        assert!(iterations(&trace).is_empty());
    }

    #[test]
    fn test_range_over_non_collection() {
        let trace = run_main("n := 3\nfor i := range n {\n n = i\n}");
        assert!(iterations(&trace).is_empty());
        assert_eq!(trace.steps.last().unwrap().statement_type, StatementKind::ForInit);
    }
}
