//! JSON response surface
//!
//! [`TraceResponse`] bundles everything a front end needs to replay one run:
//! the source, the static outline, every step and the final output. It is
//! serialised with camelCase keys.

use crate::interpreter::{Interpreter, Limits};
use crate::outline::{self, Outline};
use crate::parser::parse_source;
use crate::snapshot::Step;
use serde::Serialize;
use tracing::info;

/// Result of tracing one program
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub source_code: String,
    pub total_steps: usize,
    pub ast: Option<Outline>,
    pub trace: Vec<Step>,
    pub final_output: String,
}

impl TraceResponse {
    /// A failed response carrying only the error message
    pub fn failure(message: impl Into<String>) -> Self {
        TraceResponse {
            success: false,
            error: Some(message.into()),
            source_code: String::new(),
            total_steps: 0,
            ast: None,
            trace: Vec::new(),
            final_output: String::new(),
        }
    }

    /// Parse, outline and run `source`
    pub fn from_source(source: &str, limits: Limits) -> Self {
        if source.trim().is_empty() {
            return Self::failure("Code cannot be empty");
        }

        let program = match parse_source(source) {
            Ok(program) => program,
            Err(e) => return Self::failure(e.to_string()),
        };

        let outline = outline::extract(&program);
        let trace = Interpreter::new(program, limits).run();
        info!(
            steps = trace.len(),
            outline_nodes = outline.node_count(),
            "traced program"
        );

        TraceResponse {
            success: true,
            error: None,
            source_code: source.to_string(),
            total_steps: trace.steps.len(),
            ast: Some(outline),
            trace: trace.steps,
            final_output: trace.final_output,
        }
    }
}
