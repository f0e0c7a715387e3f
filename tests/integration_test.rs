// Integration tests for the Go-subset tracer

use goflow::interpreter::Limits;
use goflow::response::TraceResponse;
use goflow::snapshot::{RecordedValue, StatementKind, Trace};
use goflow::trace_source;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn run(source: &str) -> Trace {
    trace_source(source, Limits::default()).expect("Parsing failed")
}

fn final_value(trace: &Trace, name: &str) -> RecordedValue {
    trace
        .steps
        .last()
        .and_then(|step| step.variable(name))
        .map(|v| v.value.clone())
        .unwrap_or_else(|| panic!("no binding for {}", name))
}

#[test]
fn test_declare_assign_print() {
    let trace = run(r#"package main

import "fmt"

func main() {
	x := 5
	x = x + 3
	fmt.Println(x)
}
"#);

    let kinds: Vec<_> = trace.steps.iter().map(|s| s.statement_type).collect();
    assert_eq!(
        kinds,
        vec![StatementKind::Declare, StatementKind::Assign, StatementKind::Call]
    );
    assert_eq!(trace.steps[0].variable("x").unwrap().value, RecordedValue::Int(5));
    assert_eq!(trace.steps[0].variable("x").unwrap().type_label, "int");
    assert_eq!(trace.steps[1].variable("x").unwrap().value, RecordedValue::Int(8));
    assert_eq!(trace.steps[2].output.as_deref(), Some("8\n"));
    assert_eq!(trace.final_output, "8\n");
    assert_eq!(
        trace.steps.iter().map(|s| s.line).collect::<Vec<_>>(),
        vec![6, 7, 8]
    );
}

#[test]
fn test_counted_loop_sum() {
    let trace = run(r#"package main

func main() {
	sum := 0
	for i := 0; i < 3; i++ {
		sum = sum + i
	}
}
"#);

    let iterations: Vec<_> = trace
        .steps
        .iter()
        .filter(|s| s.statement_type == StatementKind::ForCond)
        .map(|s| s.loop_iteration.as_ref().unwrap().iteration)
        .collect();
    assert_eq!(iterations, vec![1, 2, 3]);
    assert_eq!(final_value(&trace, "sum"), RecordedValue::Int(3));
}

#[test]
fn test_recursive_fib() {
    let trace = run(r#"package main

func fib(n int) int {
	if n <= 1 {
		return n
	}
	return fib(n-1) + fib(n-2)
}

func main() {
	result := fib(5)
}
"#);

    assert_eq!(final_value(&trace, "result"), RecordedValue::Int(5));
    let deepest = trace.steps.iter().map(|s| s.call_stack.len()).max().unwrap();
    // main plus fib(5) down to fib(1)
    assert_eq!(deepest, 6);
    assert!(deepest <= Limits::default().max_call_depth);
}

#[test]
fn test_map_increment() {
    let trace = run(r#"package main

func main() {
	counts := make(map[string]int)
	counts["a"]++
	counts["a"]++
}
"#);

    assert_eq!(
        final_value(&trace, "counts"),
        RecordedValue::Map(vec![(RecordedValue::Str("a".to_string()), RecordedValue::Int(2))])
    );
}

#[test]
fn test_map_stored_into_itself() {
    let trace = run(r#"package main

import "fmt"

func main() {
	m := map[string]any{}
	m["self"] = m
	fmt.Println(len(m))
	fmt.Println(m)
}
"#);

    assert_eq!(trace.final_output, "1\nmap[self:<nil>]\n");
    assert_eq!(
        final_value(&trace, "m"),
        RecordedValue::Map(vec![(RecordedValue::Str("self".to_string()), RecordedValue::Absent)])
    );
    let json = serde_json::to_value(&trace.steps[1]).unwrap();
    assert_eq!(json["variables"][0]["value"]["self"], serde_json::Value::Null);
}

#[test]
fn test_append_leaves_input_untouched() {
    let trace = run(r#"package main

func main() {
	a := []int{1, 2}
	b := append(a, 3)
	b[0] = 9
}
"#);

    assert_eq!(final_value(&trace, "a").to_string(), "[1 2]");
    assert_eq!(final_value(&trace, "b").to_string(), "[9 2 3]");
}

#[test]
fn test_missing_key_read_does_not_insert() {
    let trace = run(r#"package main

func main() {
	m := map[string]int{"x": 1}
	v := m["nope"]
	n := len(m)
}
"#);

    assert_eq!(final_value(&trace, "v"), RecordedValue::Int(0));
    assert_eq!(final_value(&trace, "n"), RecordedValue::Int(1));
}

#[test]
fn test_step_indices_are_contiguous() {
    let trace = run(r#"package main

import "fmt"

func square(n int) int {
	return n * n
}

func main() {
	a := 2
	b := square(a)
	if b > a {
		fmt.Printf("%d > %d\n", b, a)
	}
}
"#);

    let indices: Vec<_> = trace.steps.iter().map(|s| s.step_index).collect();
    assert_eq!(indices, (0..trace.len()).collect::<Vec<_>>());
    assert_eq!(trace.final_output, "4 > 2\n");
}

#[test]
fn test_calls_are_balanced_and_restore_caller() {
    let trace = run(r#"package main

func bump(xs []int, n int) int {
	n = n + 1
	xs[0] = n
	return n
}

func main() {
	data := []int{0}
	n := 1
	r := bump(data, n)
}
"#);

    let calls = trace
        .steps
        .iter()
        .filter(|s| s.statement_type == StatementKind::FuncCall)
        .count();
    let enters = trace
        .steps
        .iter()
        .filter(|s| s.statement_type == StatementKind::FuncEnter)
        .count();
    assert_eq!(calls, 1);
    assert_eq!(enters, 1);

    let call_index = trace
        .steps
        .iter()
        .position(|s| s.statement_type == StatementKind::FuncCall)
        .unwrap();
    let before = &trace.steps[call_index];
    let after = trace.steps.last().unwrap();

    // Scalars are unaffected by the callee's writes, the shared slice is not
    assert_eq!(before.variable("n").unwrap().value, after.variable("n").unwrap().value);
    assert_eq!(after.variable("data").unwrap().value.to_string(), "[2]");
    assert_eq!(after.variable("r").unwrap().value, RecordedValue::Int(2));
}

#[test]
fn test_loop_iterations_increase_and_are_capped() {
    let trace = run(r#"package main

func main() {
	n := 0
	for {
		n++
	}
	for j := 0; j < 2; j++ {
	}
}
"#);

    let mut per_loop: HashMap<String, Vec<usize>> = HashMap::new();
    for step in &trace.steps {
        if let Some(it) = &step.loop_iteration {
            per_loop.entry(it.loop_id.clone()).or_default().push(it.iteration);
        }
    }
    assert_eq!(per_loop.len(), 2);
    for iterations in per_loop.values() {
        assert!(iterations.windows(2).all(|w| w[0] < w[1]));
        assert!(iterations.iter().all(|&i| i <= 100));
    }
    assert_eq!(final_value(&trace, "n"), RecordedValue::Int(100));
}

#[test]
fn test_unsupported_constructs_degrade_quietly() {
    let trace = run(r#"package main

import "fmt"

func main() {
	x := 1
	switch x {
	case 1:
		x = 2
	}
	defer fmt.Println("never")
	y := strings.Repeat("a", 3)
	fmt.Println(x, y)
}
"#);

    assert_eq!(final_value(&trace, "x"), RecordedValue::Int(1));
    assert_eq!(final_value(&trace, "y"), RecordedValue::Absent);
    assert_eq!(trace.final_output, "1 <nil>\n");
}

#[test]
fn test_parse_errors_surface_before_running() {
    let err = trace_source("package main\nfunc main() {\n\tx := \n}\n", Limits::default()).unwrap_err();
    assert!(err.to_string().starts_with("Parse error"));
}

#[test]
fn test_independent_runs_on_threads() {
    let source = "package main\nfunc main() {\n\tx := 1\n\tx++\n}\n";
    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(move || trace_source(source, Limits::default()).unwrap()))
        .collect();
    let traces: Vec<Trace> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(traces.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_response_document() {
    let source = r#"package main

import "fmt"

func main() {
	for i := 0; i < 2; i++ {
		fmt.Print(i)
	}
}
"#;
    let response = TraceResponse::from_source(source, Limits::default());
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["finalOutput"], "01");
    assert_eq!(json["totalSteps"], json["trace"].as_array().unwrap().len());
    assert_eq!(json["ast"]["nodes"][0]["children"][0]["type"], "for");
    assert_eq!(json["trace"][1]["statementType"], "for_init");
    assert_eq!(json["trace"][2]["loopIteration"]["iteration"], 1);
}

#[test]
fn test_demo_programs() {
    let fib = run(include_str!("../demos/fib.go"));
    assert_eq!(
        fib.final_output,
        "fib(0) = 0\nfib(1) = 1\nfib(2) = 1\nfib(3) = 2\nfib(4) = 3\nfib(5) = 5\n"
    );

    let words = run(include_str!("../demos/word_count.go"));
    assert_eq!(
        words.final_output,
        "counts: map[go:3 rust:2 zig:1]\nrepeated: [go rust] (2)\n"
    );

    let sorted = run(include_str!("../demos/sort.go"));
    assert_eq!(sorted.final_output, "[1 2 5 7 9]\n");
}
