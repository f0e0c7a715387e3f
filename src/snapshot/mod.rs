// Step recording and playback for time-travel execution

use crate::memory::environment::Environment;
use crate::memory::stack::CallStack;
use crate::memory::value::{format_float, Value, Visiting};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// What kind of construct produced a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Assign,
    Declare,
    ForInit,
    ForCond,
    IfCond,
    Call,
    FuncCall,
    FuncEnter,
    FuncReturn,
    Break,
    Continue,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Assign => "assign",
            StatementKind::Declare => "declare",
            StatementKind::ForInit => "for_init",
            StatementKind::ForCond => "for_cond",
            StatementKind::IfCond => "if_cond",
            StatementKind::Call => "call",
            StatementKind::FuncCall => "func_call",
            StatementKind::FuncEnter => "func_enter",
            StatementKind::FuncReturn => "func_return",
            StatementKind::Break => "break",
            StatementKind::Continue => "continue",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable deep copy of a [`Value`] taken when a step is recorded.
///
/// Containers are copied element by element, so later mutations through a
/// shared slice or map never reach an earlier step.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Slice(Vec<RecordedValue>),
    /// Entries in key order
    Map(Vec<(RecordedValue, RecordedValue)>),
    Absent,
}

impl From<&Value> for RecordedValue {
    fn from(value: &Value) -> Self {
        RecordedValue::copy_nested(value, &mut Visiting::new())
    }
}

impl RecordedValue {
    /// A container that holds itself is copied once; the inner reference
    /// becomes `Absent`.
    fn copy_nested(value: &Value, visiting: &mut Visiting) -> Self {
        visiting
            .walk(value, |visiting| match value {
                Value::Int(n) => RecordedValue::Int(*n),
                Value::Float(x) => RecordedValue::Float(*x),
                Value::Str(s) => RecordedValue::Str(s.clone()),
                Value::Bool(b) => RecordedValue::Bool(*b),
                Value::Slice(slice) => RecordedValue::Slice(
                    slice
                        .items
                        .borrow()
                        .iter()
                        .map(|item| RecordedValue::copy_nested(item, visiting))
                        .collect(),
                ),
                Value::Map(map) => RecordedValue::Map(
                    map.entries
                        .borrow()
                        .iter()
                        .map(|(k, v)| {
                            (
                                RecordedValue::from(&k.to_value()),
                                RecordedValue::copy_nested(v, visiting),
                            )
                        })
                        .collect(),
                ),
                Value::Absent => RecordedValue::Absent,
            })
            .unwrap_or(RecordedValue::Absent)
    }
}

/// Go `%v` rendering, identical to [`Value`]'s
impl fmt::Display for RecordedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordedValue::Int(n) => write!(f, "{}", n),
            RecordedValue::Float(x) => write!(f, "{}", format_float(*x)),
            RecordedValue::Str(s) => write!(f, "{}", s),
            RecordedValue::Bool(b) => write!(f, "{}", b),
            RecordedValue::Slice(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            RecordedValue::Map(entries) => {
                write!(f, "map[")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                write!(f, "]")
            }
            RecordedValue::Absent => write!(f, "<nil>"),
        }
    }
}

/// Scalars serialise as JSON scalars, slices as arrays, maps as objects keyed
/// by the key's `%v` text, and `Absent` as `null`.
impl Serialize for RecordedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RecordedValue::Int(n) => serializer.serialize_i64(*n),
            RecordedValue::Float(x) => serializer.serialize_f64(*x),
            RecordedValue::Str(s) => serializer.serialize_str(s),
            RecordedValue::Bool(b) => serializer.serialize_bool(*b),
            RecordedValue::Slice(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            RecordedValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(&key.to_string(), value)?;
                }
                map.end()
            }
            RecordedValue::Absent => serializer.serialize_none(),
        }
    }
}

/// One visible binding at the moment a step was recorded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub type_label: String,
    pub value: RecordedValue,
    pub scope: String,
}

/// Loop identity and iteration number carried by `for_cond` steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopIteration {
    pub loop_id: String,
    pub iteration: usize,
}

/// One recorded execution event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub step_index: usize,
    pub line: usize,
    pub statement: String,
    pub statement_type: StatementKind,
    pub variables: Vec<Variable>,
    pub scope_stack: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_iteration: Option<LoopIteration>,
    pub call_stack: Vec<String>,
    pub function_name: String,
}

impl Step {
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Call nesting depth at this step, the entry function included
    pub fn depth(&self) -> usize {
        self.call_stack.len()
    }
}

/// Event description handed to [`StepRecorder::record`]
#[derive(Debug, Clone)]
pub struct StepEvent {
    pub kind: StatementKind,
    pub line: usize,
    pub statement: String,
    pub output: Option<String>,
    pub loop_iteration: Option<LoopIteration>,
}

impl StepEvent {
    pub fn new(kind: StatementKind, line: usize, statement: impl Into<String>) -> Self {
        StepEvent {
            kind,
            line,
            statement: statement.into(),
            output: None,
            loop_iteration: None,
        }
    }

    pub fn with_output(mut self, output: String) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_loop(mut self, loop_id: impl Into<String>, iteration: usize) -> Self {
        self.loop_iteration = Some(LoopIteration {
            loop_id: loop_id.into(),
            iteration,
        });
        self
    }
}

/// Appends steps with consecutive indices and owns the program's output buffer
#[derive(Debug, Default)]
pub struct StepRecorder {
    steps: Vec<Step>,
    output: String,
}

impl StepRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one step, deep-copying the current bindings
    pub fn record(&mut self, event: StepEvent, env: &Environment, call_stack: &CallStack) {
        if let Some(fragment) = &event.output {
            self.output.push_str(fragment);
        }

        let variables = env
            .snapshot()
            .into_iter()
            .map(|binding| Variable {
                name: binding.name.to_string(),
                type_label: binding.type_label.to_string(),
                value: RecordedValue::from(binding.value),
                scope: binding.scope.to_string(),
            })
            .collect();

        self.steps.push(Step {
            step_index: self.steps.len(),
            line: event.line,
            statement: event.statement,
            statement_type: event.kind,
            variables,
            scope_stack: env.scope_stack().to_vec(),
            output: event.output,
            loop_iteration: event.loop_iteration,
            call_stack: call_stack.names(),
            function_name: call_stack.current_function().to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Output written so far
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn finish(self) -> Trace {
        Trace {
            steps: self.steps,
            final_output: self.output,
        }
    }
}

/// The ordered record of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub steps: Vec<Step>,
    pub final_output: String,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Concatenated output of steps `0..=index`
    pub fn output_until(&self, index: usize) -> String {
        self.steps
            .iter()
            .take(index.saturating_add(1))
            .filter_map(|step| step.output.as_deref())
            .collect()
    }
}

/// Errors from moving a [`Playback`] cursor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("trace has no steps")]
    Empty,
    #[error("already at the first step")]
    AtStart,
    #[error("already at the last step")]
    AtEnd,
    #[error("step {index} is out of range (trace has {len} steps)")]
    OutOfRange { index: usize, len: usize },
}

/// Cursor over a finished trace for forward and backward stepping
#[derive(Debug, Clone)]
pub struct Playback {
    trace: Trace,
    position: usize,
}

impl Playback {
    pub fn new(trace: Trace) -> Self {
        Playback { trace, position: 0 }
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.trace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }

    pub fn current(&self) -> Option<&Step> {
        self.trace.get(self.position)
    }

    fn last_index(&self) -> Result<usize, PlaybackError> {
        self.trace.len().checked_sub(1).ok_or(PlaybackError::Empty)
    }

    fn step_at(&self, index: usize) -> Result<&Step, PlaybackError> {
        self.trace.get(index).ok_or(PlaybackError::OutOfRange {
            index,
            len: self.trace.len(),
        })
    }

    pub fn step_forward(&mut self) -> Result<&Step, PlaybackError> {
        if self.position >= self.last_index()? {
            return Err(PlaybackError::AtEnd);
        }
        self.position += 1;
        self.step_at(self.position)
    }

    pub fn step_backward(&mut self) -> Result<&Step, PlaybackError> {
        self.last_index()?;
        if self.position == 0 {
            return Err(PlaybackError::AtStart);
        }
        self.position -= 1;
        self.step_at(self.position)
    }

    /// Advance to the next step that is not nested deeper than the current one,
    /// stepping over the body of any call made from here
    pub fn step_over(&mut self) -> Result<&Step, PlaybackError> {
        let last = self.last_index()?;
        if self.position >= last {
            return Err(PlaybackError::AtEnd);
        }

        let depth = self.step_at(self.position)?.depth();
        self.position = self
            .trace
            .steps
            .iter()
            .enumerate()
            .skip(self.position + 1)
            .find(|(_, step)| step.depth() <= depth)
            .map(|(index, _)| index)
            .unwrap_or(last);
        self.step_at(self.position)
    }

    pub fn rewind_to_start(&mut self) -> Result<&Step, PlaybackError> {
        self.last_index()?;
        self.position = 0;
        self.step_at(0)
    }

    pub fn jump_to_end(&mut self) -> Result<&Step, PlaybackError> {
        self.position = self.last_index()?;
        self.step_at(self.position)
    }

    pub fn goto(&mut self, index: usize) -> Result<&Step, PlaybackError> {
        self.step_at(index)?;
        self.position = index;
        self.step_at(index)
    }

    /// Program output produced up to and including the current step
    pub fn output_until_current(&self) -> String {
        if self.trace.is_empty() {
            return String::new();
        }
        self.trace.output_until(self.position)
    }
}
