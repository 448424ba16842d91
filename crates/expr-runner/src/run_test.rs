use super::{execute_eval, execute_parse, execute_print, execute_tokenize, parse_binding, RunnerError};
use crate::cli::{EvalCommand, OutputFormat, ParseCommand, PrintCommand, TokenizeCommand};
use expr_engine::{EvalError, Value};
use serde_json::{json, Value as JsonValue};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn eval_command(expression: &str) -> EvalCommand {
    EvalCommand {
        expression: expression.to_string(),
        context: None,
        bindings: Vec::new(),
        config: None,
        locale: None,
        format: None,
    }
}

#[test]
fn tokenize_text_lists_tokens_with_ranges() {
    let output = execute_tokenize(&TokenizeCommand {
        expression: "a + 1".to_string(),
        locale: None,
        format: OutputFormat::Text,
    })
    .expect("tokenize must succeed");
    let lines = output.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Identifier"));
    assert!(lines[0].ends_with("0..1"));
    assert!(lines[2].starts_with("Number"));
}

#[test]
fn tokenize_json_is_an_array_of_tokens() {
    let output = execute_tokenize(&TokenizeCommand {
        expression: "x?.y".to_string(),
        locale: None,
        format: OutputFormat::Json,
    })
    .expect("tokenize must succeed");
    let parsed: JsonValue = serde_json::from_str(&output).expect("must be valid json");
    let tokens = parsed.as_array().expect("array of tokens");
    assert_eq!(tokens[1], json!({ "type": "QuestionDot", "value": "?.", "range": [1, 3] }));
}

#[test]
fn parse_emits_tagged_ast_json() {
    let output = execute_parse(&ParseCommand {
        expression: "a.b".to_string(),
        locale: None,
    })
    .expect("parse must succeed");
    let parsed: JsonValue = serde_json::from_str(&output).expect("must be valid json");
    assert_eq!(parsed["type"], "MemberExpression");
    assert_eq!(parsed["property"]["name"], "b");
    assert_eq!(parsed["computed"], false);
}

#[test]
fn print_renders_canonical_form() {
    let output = execute_print(&PrintCommand {
        expression: "1+2*3".to_string(),
        locale: None,
    })
    .expect("print must succeed");
    assert_eq!(output, "(1 + (2 * 3))");
}

#[test]
fn parse_errors_use_requested_locale() {
    let error = execute_print(&PrintCommand {
        expression: "1 +".to_string(),
        locale: Some("zh-CN".to_string()),
    })
    .expect_err("must fail");
    assert!(matches!(error, RunnerError::Parse(_)));
    assert_eq!(error.to_string(), "parse failed: 意外的 token: EOF 3");

    let error = execute_print(&PrintCommand {
        expression: "1".to_string(),
        locale: Some("xx".to_string()),
    })
    .expect_err("must fail");
    assert!(matches!(error, RunnerError::UnknownLocale { .. }));
}

#[test]
fn eval_uses_bindings_and_formats() {
    let mut command = eval_command("{ total: price * qty, name }");
    command.bindings = vec![
        "price=2.5".to_string(),
        "qty=4".to_string(),
        "name=widget".to_string(),
    ];
    assert_eq!(
        execute_eval(&command).expect("eval must succeed"),
        "{ total: 10, name: 'widget' }"
    );

    command.format = Some(OutputFormat::Json);
    let parsed: JsonValue =
        serde_json::from_str(&execute_eval(&command).expect("eval must succeed")).expect("must be valid json");
    assert_eq!(parsed, json!({ "total": 10.0, "name": "widget" }));
}

#[test]
fn eval_layers_config_context_file_and_bindings() {
    let config = write_temp_file(
        "eval-config",
        "yaml",
        "schema: expr-runner/0.0.1\nformat: json\ncontext:\n  a: 1\n  b: 1\n  c: 1\n",
    );
    let context = write_temp_file("eval-context", "json", r#"{"b": 2, "c": 2}"#);
    let mut command = eval_command("[a, b, c]");
    command.config = Some(config);
    command.context = Some(context);
    command.bindings = vec!["c=3".to_string()];

    let parsed: JsonValue =
        serde_json::from_str(&execute_eval(&command).expect("eval must succeed")).expect("must be valid json");
    assert_eq!(parsed, json!([1.0, 2.0, 3.0]));

    command.format = Some(OutputFormat::Text);
    assert_eq!(execute_eval(&command).expect("eval must succeed"), "[1, 2, 3]");
}

#[test]
fn eval_reports_evaluation_errors() {
    let error = execute_eval(&eval_command("1 + true")).expect_err("must fail");
    assert!(matches!(error, RunnerError::Eval(EvalError::Type { pos: 4, .. })));
    assert_eq!(error.to_string(), "evaluation failed: Expect Number: 4");

    let error = execute_eval(&eval_command("1 +")).expect_err("must fail");
    assert!(matches!(error, RunnerError::Eval(EvalError::Parse(_))));
}

#[test]
fn eval_rejects_invalid_config() {
    let config = write_temp_file("eval-config-invalid", "yaml", "schema: other/1\n");
    let mut command = eval_command("1");
    command.config = Some(config);
    assert!(matches!(execute_eval(&command), Err(RunnerError::ConfigLoad(_))));
}

#[test]
fn parse_binding_reads_json_or_falls_back_to_string() {
    assert_eq!(
        parse_binding("xs=[1, 2]").expect("binding"),
        ("xs".to_string(), Value::from(json!([1, 2])))
    );
    assert_eq!(
        parse_binding("s=\"quoted\"").expect("binding"),
        ("s".to_string(), Value::from("quoted"))
    );
    assert_eq!(
        parse_binding("word=hello world").expect("binding"),
        ("word".to_string(), Value::from("hello world"))
    );
    assert_eq!(
        parse_binding("eq=a=b").expect("binding"),
        ("eq".to_string(), Value::from("a=b"))
    );
    assert!(matches!(parse_binding("novalue"), Err(RunnerError::InvalidBinding { .. })));
    assert!(matches!(parse_binding("1x=2"), Err(RunnerError::InvalidBinding { .. })));
}

fn write_temp_file(prefix: &str, extension: &str, content: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time must be monotonic")
        .as_nanos();
    path.push(format!("expr-runner-{prefix}-{}-{nanos}.{extension}", std::process::id()));
    fs::write(&path, content).expect("must write temp file");
    path
}
