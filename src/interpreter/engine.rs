// Execution engine for the Go-subset interpreter

use crate::interpreter::constants::Limits;
use crate::interpreter::loops::LoopCounter;
use crate::memory::environment::Environment;
use crate::memory::stack::CallStack;
use crate::memory::value::Value;
use crate::parser::ast::{Block, FunctionDecl, Program, Stmt};
use crate::snapshot::{StatementKind, StepEvent, StepRecorder, Trace};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Name of the function a run starts from
pub const ENTRY_FUNCTION: &str = "main";

/// Pending control transfer raised by `break`, `continue` or `return`.
///
/// Blocks stop executing as soon as this is not `Normal`; loops consume
/// `Break` and `Continue`, the call boundary consumes `Return`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return,
}

/// The main interpreter. One value is built per run and consumed by [`Interpreter::run`].
pub struct Interpreter {
    /// User functions by name, excluding the entry point
    pub(crate) functions: FxHashMap<String, Rc<FunctionDecl>>,

    /// The `main` declaration, if the program has one
    entry: Option<Rc<FunctionDecl>>,

    /// Bindings of the function currently executing
    pub(crate) env: Environment,

    /// Saved caller states
    pub(crate) call_stack: CallStack,

    pub(crate) loop_counter: LoopCounter,

    recorder: StepRecorder,

    pub(crate) limits: Limits,

    pub(crate) control_flow: ControlFlow,

    /// Value captured by the last executed `return`
    pub(crate) return_value: Option<Value>,
}

impl Interpreter {
    /// Create a new interpreter for a parsed program
    pub fn new(program: Program, limits: Limits) -> Self {
        let mut functions = FxHashMap::default();
        let mut entry = None;

        // Index functions for fast lookup
        for function in program.functions {
            let function = Rc::new(function);
            if function.name == ENTRY_FUNCTION {
                entry = Some(function);
            } else {
                functions.insert(function.name.clone(), function);
            }
        }

        Interpreter {
            functions,
            entry,
            env: Environment::new(ENTRY_FUNCTION),
            call_stack: CallStack::new(ENTRY_FUNCTION),
            loop_counter: LoopCounter::default(),
            recorder: StepRecorder::new(),
            limits,
            control_flow: ControlFlow::Normal,
            return_value: None,
        }
    }

    /// Run the program from start to finish and return its trace
    pub fn run(mut self) -> Trace {
        let Some(entry) = self.entry.clone() else {
            warn!("program has no main function, nothing to trace");
            return self.recorder.finish();
        };

        debug!(functions = self.functions.len(), "starting execution at main");
        self.execute_block(&entry.body);

        debug!(
            steps = self.recorder.len(),
            output_bytes = self.recorder.output().len(),
            "execution finished"
        );
        self.recorder.finish()
    }

    /// Record one step against the current environment and call stack
    pub(crate) fn record(&mut self, event: StepEvent) {
        self.recorder.record(event, &self.env, &self.call_stack);
    }

    /// Execute statements in order until one raises a control transfer
    pub(crate) fn execute_block(&mut self, block: &Block) {
        self.execute_statements(&block.statements);
    }

    pub(crate) fn execute_statements(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.execute_statement(stmt);
            if self.control_flow != ControlFlow::Normal {
                return;
            }
        }
    }

    /// Execute a single statement
    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { lhs, op, rhs, .. } => self.execute_assign(stmt, lhs, *op, rhs),

            Stmt::VarDecl {
                names,
                var_type,
                values,
                ..
            } => self.execute_var_decl(stmt, names, var_type.as_ref(), values),

            Stmt::If {
                init,
                condition,
                then_block,
                else_branch,
                location,
            } => self.execute_if(
                init.as_deref(),
                condition,
                then_block,
                else_branch.as_deref(),
                *location,
            ),

            Stmt::For {
                init,
                condition,
                post,
                body,
                ..
            } => self.execute_for(stmt, init.as_deref(), condition.as_ref(), post.as_deref(), body),

            Stmt::Range {
                key,
                value,
                define,
                collection,
                body,
                ..
            } => self.execute_range(
                stmt,
                key.as_deref(),
                value.as_deref(),
                *define,
                collection,
                body,
            ),

            Stmt::IncDec { target, op, .. } => self.execute_inc_dec(stmt, target, *op),

            Stmt::Return { results, .. } => self.execute_return(stmt, results),

            Stmt::Expr { expr, .. } => self.execute_expression_statement(stmt, expr),

            Stmt::Break { location } => {
                self.record(StepEvent::new(StatementKind::Break, location.line, "break"));
                self.control_flow = ControlFlow::Break;
            }

            Stmt::Continue { location } => {
                self.record(StepEvent::new(
                    StatementKind::Continue,
                    location.line,
                    "continue",
                ));
                self.control_flow = ControlFlow::Continue;
            }

            Stmt::Block(block) => self.execute_block(block),

            Stmt::Unsupported { keyword, location } => {
                trace!(keyword = %keyword, line = location.line, "skipping unsupported statement");
            }
        }
    }

    /// Whether a `return` is pending in the current function
    pub(crate) fn has_returned(&self) -> bool {
        self.control_flow == ControlFlow::Return
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn run(source: &str) -> Trace {
        let program = parse_source(source).unwrap();
        Interpreter::new(program, Limits::default()).run()
    }

    #[test]
    fn test_missing_main_gives_empty_trace() {
        let trace = run("package main\nfunc helper() {\n x := 1\n}\n");
        assert!(trace.is_empty());
        assert_eq!(trace.final_output, "");
    }

    #[test]
    fn test_statements_after_return_are_skipped() {
        let trace = run("package main\nfunc main() {\n x := 1\n return\n x = 2\n}\n");
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.steps[1].statement_type, StatementKind::FuncReturn);
    }

    #[test]
    fn test_unsupported_statements_record_nothing() {
        let trace = run("package main\nfunc main() {\n defer cleanup()\n x := 1\n}\n");
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.steps[0].statement, "x := 1");
    }

    #[test]
    fn test_bare_block_runs_inline() {
        let trace = run("package main\nfunc main() {\n {\n  y := 2\n }\n y++\n}\n");
        let last = trace.steps.last().unwrap();
        assert_eq!(last.variable("y").unwrap().value.to_string(), "3");
        assert_eq!(last.variable("y").unwrap().scope, "main");
    }
}
