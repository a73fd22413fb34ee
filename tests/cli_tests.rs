// tests/cli_tests.rs
#![cfg(feature = "cli")]

use selector_lang::cli::{CliError, QueryOptions, QueryResult, execute_query};

fn run(selector: &str, input: Option<&str>, compact: bool) -> Result<String, CliError> {
    let options = QueryOptions {
        selector: selector.to_string(),
        input: input.map(str::to_string),
        compact,
        ..Default::default()
    };
    match execute_query(&options)? {
        QueryResult::Output(bytes) => Ok(String::from_utf8(bytes).unwrap()),
        QueryResult::SyntaxValid => panic!("unexpected syntax-only result"),
    }
}

#[test]
fn test_syntax_only() {
    let options = QueryOptions {
        selector: "users.filter(age > 30).map(name)".to_string(),
        syntax_only: true,
        ..Default::default()
    };
    assert!(matches!(
        execute_query(&options).unwrap(),
        QueryResult::SyntaxValid
    ));
}

#[test]
fn test_syntax_only_reports_errors() {
    let options = QueryOptions {
        selector: "users.filter(".to_string(),
        syntax_only: true,
        ..Default::default()
    };
    assert!(matches!(execute_query(&options), Err(CliError::Parse(_))));
}

#[test]
fn test_syntax_only_skips_input() {
    let options = QueryOptions {
        selector: "a".to_string(),
        input: Some("not json".to_string()),
        syntax_only: true,
        ..Default::default()
    };
    assert!(execute_query(&options).is_ok());
}

#[test]
fn test_compact_output() {
    let out = run("{name, n: len(tags)}", Some(r#"{"name": "Tom", "tags": ["a", "b"]}"#), true)
        .unwrap();
    assert_eq!(out, "{\"name\":\"Tom\",\"n\":2}\n");
}

#[test]
fn test_pretty_output() {
    let out = run("a", Some(r#"{"a": {"b": [1, 2]}}"#), false).unwrap();
    assert_eq!(out, "{\n  \"b\": [\n    1,\n    2\n  ]\n}\n");
}

#[test]
fn test_branch_writes_one_document_each() {
    let out = run("branch()", Some(r#"[1, "x", {"a": null}]"#), true).unwrap();
    assert_eq!(out, "1\n\"x\"\n{\"a\":null}\n");
}

#[test]
fn test_null_document_without_input() {
    let out = run("$this", None, true).unwrap();
    assert_eq!(out, "null\n");

    let out = run("1 + 2", None, true).unwrap();
    assert_eq!(out, "3\n");
}

#[test]
fn test_empty_selector_echoes_document() {
    let out = run("", Some(r#"{"b": 1, "a": 2}"#), true).unwrap();
    assert_eq!(out, "{\"b\":1,\"a\":2}\n");
}

#[test]
fn test_modification_is_written() {
    let out = run(
        "users.each(age += 1)",
        Some(r#"{"users": [{"age": 1}, {"age": 2}]}"#),
        true,
    )
    .unwrap();
    assert_eq!(out, "[{\"age\":2},{\"age\":3}]\n");
}

#[test]
fn test_invalid_document() {
    let err = run("a", Some("{"), true).unwrap_err();
    assert!(matches!(err, CliError::Format(_)));
    assert!(err.to_string().starts_with("invalid json document"), "{err}");
}

#[test]
fn test_evaluation_error() {
    let err = run("missing", Some("{}"), true).unwrap_err();
    assert!(matches!(err, CliError::Eval(_)));
    assert_eq!(
        err.to_string(),
        "error evaluating property: map key not found: \"missing\""
    );
}
