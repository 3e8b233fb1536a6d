mod common;

use common::compile_str;
use std::io::Write;
use wayfinder_cli::engine::{build, ArgsBody, Invocation};
use wayfinder_cli::error::Error;
use wayfinder_cli::model::Api;
use wayfinder_cli::param::ParamValue;

const USERS: &str = r#"{
  "openapi": "3.0.0",
  "paths": {
    "/users/{id}/posts/{postId}": {
      "get": {
        "operationId": "getPost",
        "parameters": [
          {"name": "id", "in": "path", "schema": {"type": "integer"}},
          {"name": "postId", "in": "path", "schema": {"type": "string"}},
          {"name": "tag", "in": "query", "style": "form", "explode": true,
           "schema": {"type": "array", "items": {"type": "string"}}},
          {"name": "ids", "in": "query", "style": "form", "explode": false,
           "schema": {"type": "array", "items": {"type": "integer"}}},
          {"name": "limit", "in": "query", "schema": {"type": "integer", "default": 20}},
          {"name": "verbose", "in": "query", "schema": {"type": "boolean"}},
          {"name": "Authorization", "in": "header", "schema": {"type": "string"}},
          {"name": "X-Trace", "in": "header", "schema": {"type": "boolean", "default": true}}
        ]
      }
    },
    "/users": {
      "post": {
        "operationId": "createUser",
        "requestBody": {"content": {"application/json": {"schema": {"type": "object"}}}}
      }
    }
  }
}"#;

fn api() -> Api {
    compile_str(USERS).unwrap()
}

fn strings(values: &[&str]) -> ParamValue {
    ParamValue::Array(
        values
            .iter()
            .map(|v| ParamValue::String((*v).to_string()))
            .collect(),
    )
}

#[test]
fn test_path_parameters_are_substituted() {
    let api = api();
    let op = api.operation("get-post").unwrap();
    let request = build(op, &Invocation::new(vec!["42".into(), "7".into()]), &ArgsBody).unwrap();

    assert_eq!(request.method, "GET");
    assert_eq!(request.uri, "https://api.example.com/users/42/posts/7");
    assert!(request.headers.is_empty());
    assert!(request.body.is_none());
}

#[test]
fn test_path_values_are_percent_encoded() {
    let api = api();
    let op = api.operation("get-post").unwrap();
    let request = build(
        op,
        &Invocation::new(vec!["1".into(), "a b/c".into()]),
        &ArgsBody,
    )
    .unwrap();
    assert_eq!(request.uri, "https://api.example.com/users/1/posts/a%20b%2Fc");
}

#[test]
fn test_mistyped_path_argument_is_a_parse_error() {
    let api = api();
    let op = api.operation("get-post").unwrap();
    let err = build(op, &Invocation::new(vec!["abc".into(), "7".into()]), &ArgsBody).unwrap_err();
    assert!(matches!(
        err,
        Error::ParameterParse { ref name, ref input, .. } if name == "id" && input == "abc"
    ));
}

#[test]
fn test_missing_and_extra_positionals() {
    let api = api();
    let op = api.operation("get-post").unwrap();

    let err = build(op, &Invocation::new(vec!["1".into()]), &ArgsBody).unwrap_err();
    assert!(matches!(err, Error::MissingArgument { ref name, .. } if name == "postId"));

    let err = build(
        op,
        &Invocation::new(vec!["1".into(), "2".into(), "3".into()]),
        &ArgsBody,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedArguments {
            expected: 2,
            actual: 3,
            ..
        }
    ));
}

#[test]
fn test_exploded_array_repeats_the_query_name() {
    let api = api();
    let op = api.operation("get-post").unwrap();
    let invocation = Invocation::new(vec!["1".into(), "2".into()])
        .with_query("tag", strings(&["a", "b", "c"]))
        .with_query(
            "ids",
            ParamValue::Array(vec![ParamValue::Integer(1), ParamValue::Integer(2)]),
        );
    let request = build(op, &invocation, &ArgsBody).unwrap();
    assert_eq!(
        request.uri,
        "https://api.example.com/users/1/posts/2?tag=a&tag=b&tag=c&ids=1%2C2"
    );
}

#[test]
fn test_defaults_and_zero_values_are_suppressed() {
    let api = api();
    let op = api.operation("get-post").unwrap();
    let invocation = Invocation::new(vec!["1".into(), "2".into()])
        .with_query("limit", ParamValue::Integer(20))
        .with_query("verbose", ParamValue::Boolean(false))
        .with_query("tag", ParamValue::Array(Vec::new()))
        .with_header("X-Trace", ParamValue::Boolean(true))
        .with_header("Authorization", ParamValue::String(String::new()));
    let request = build(op, &invocation, &ArgsBody).unwrap();
    assert_eq!(request.uri, "https://api.example.com/users/1/posts/2");
    assert!(request.headers.is_empty());

    // A value that differs from the default is sent, even a zero value.
    let invocation = Invocation::new(vec!["1".into(), "2".into()])
        .with_query("limit", ParamValue::Integer(0))
        .with_query("verbose", ParamValue::Boolean(true))
        .with_header("X-Trace", ParamValue::Boolean(false));
    let request = build(op, &invocation, &ArgsBody).unwrap();
    assert_eq!(
        request.uri,
        "https://api.example.com/users/1/posts/2?limit=0&verbose=true"
    );
    assert_eq!(request.header("x-trace"), Some("false"));
}

#[test]
fn test_header_values_are_validated() {
    let api = api();
    let op = api.operation("get-post").unwrap();
    let invocation = Invocation::new(vec!["1".into(), "2".into()]).with_header(
        "Authorization",
        ParamValue::String("Bearer x\r\nX-Evil: 1".into()),
    );
    let err = build(op, &invocation, &ArgsBody).unwrap_err();
    assert!(matches!(err, Error::InvalidHeader { ref name, .. } if name == "Authorization"));
}

#[test]
fn test_dry_run_view_redacts_credentials() {
    let api = api();
    let op = api.operation("get-post").unwrap();
    let invocation = Invocation::new(vec!["1".into(), "2".into()])
        .with_header("Authorization", ParamValue::String("Bearer secret".into()));
    let request = build(op, &invocation, &ArgsBody).unwrap();
    assert_eq!(request.header("authorization"), Some("Bearer secret"));

    let view = request.to_redacted_json();
    assert_eq!(view["dry_run"], true);
    assert_eq!(view["headers"][0]["name"], "Authorization");
    assert_eq!(view["headers"][0]["value"], "[REDACTED]");
    assert!(!view.to_string().contains("secret"));
}

#[test]
fn test_body_from_arguments() {
    let api = api();
    let op = api.operation("create-user").unwrap();

    let request = build(op, &Invocation::new(vec![r#"{"name":"ada"}"#.into()]), &ArgsBody).unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.body.as_deref(), Some(r#"{"name":"ada"}"#));
    assert_eq!(request.header("content-type"), Some("application/json"));

    let request = build(
        op,
        &Invocation::new(vec!["name:".into(), "ada".into()]),
        &ArgsBody,
    )
    .unwrap();
    assert_eq!(request.body.as_deref(), Some("name: ada"));

    let request = build(op, &Invocation::default(), &ArgsBody).unwrap();
    assert!(request.body.is_none());
    assert!(request.header("content-type").is_none());
}

#[test]
fn test_body_from_file_and_fixed_source() {
    let api = api();
    let op = api.operation("create-user").unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"name":"grace"}}"#).unwrap();
    let arg = format!("@{}", file.path().display());
    let request = build(op, &Invocation::new(vec![arg]), &ArgsBody).unwrap();
    assert_eq!(request.body.as_deref(), Some(r#"{"name":"grace"}"#));

    let fixed = Some("{}".to_string());
    let request = build(op, &Invocation::new(vec!["ignored".into()]), &fixed).unwrap();
    assert_eq!(request.body.as_deref(), Some("{}"));

    let err = build(op, &Invocation::new(vec!["@/nonexistent/body.json".into()]), &ArgsBody);
    assert!(err.is_err());
}
