// Safety limits for the Go-subset interpreter

/// Maximum number of active functions, the entry function included
pub const DEFAULT_MAX_CALL_DEPTH: usize = 50;

/// Maximum iterations of a single loop execution
pub const DEFAULT_MAX_LOOP_ITERATIONS: usize = 100;

/// Marker appended to the text of a call that was cut off by the depth limit
pub const MAX_CALL_DEPTH_MARKER: &str = "max call depth reached";

/// Bounds that keep every run finite. Reaching either limit stops the loop or
/// call in question without failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_call_depth: usize,
    pub max_loop_iterations: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_loop_iterations: DEFAULT_MAX_LOOP_ITERATIONS,
        }
    }
}
