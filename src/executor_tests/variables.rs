use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    error::ErrorKind,
    executor::ExecuteParams,
    schema::{
        meta::{Argument, Field, InputObjectType, ObjectType, TypeRef},
        model::Schema,
    },
    value::{Resolved, Value},
    Variables,
};

fn echo_schema() -> Arc<Schema> {
    let input = InputObjectType::new(
        "TestInputObject",
        vec![
            Argument::new("a", TypeRef::string()),
            Argument::new("b", TypeRef::string().list()),
            Argument::new("c", TypeRef::string().non_null()),
            Argument::new("d", TypeRef::int()).default_value(crate::ast::InputValue::Int(7)),
        ],
    );

    let query = ObjectType::new(
        "Query",
        vec![
            Field::new("fieldWithObjectInput", TypeRef::string())
                .argument(Argument::new("input", TypeRef::named("TestInputObject")))
                .resolver(|_, args| {
                    Ok(Resolved::from(
                        args.get("input")
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "absent".into()),
                    ))
                }),
            Field::new("echo", TypeRef::string())
                .argument(Argument::new("input", TypeRef::string().non_null()))
                .resolver(|_, args| {
                    Ok(Resolved::from(
                        args.get("input").cloned().unwrap_or(Value::Null),
                    ))
                }),
            Field::new("echoDefault", TypeRef::string())
                .argument(
                    Argument::new("v", TypeRef::string())
                        .default_value(crate::ast::InputValue::String("hello".into())),
                )
                .resolver(|_, args| {
                    Ok(Resolved::from(
                        args.get("v").cloned().unwrap_or(Value::Null),
                    ))
                }),
        ],
    );

    Schema::builder(query)
        .register(input)
        .finish()
        .expect("valid schema")
}

#[test]
fn inline_input_object_literals_pick_up_field_defaults() {
    let schema = echo_schema();
    let response = crate::run(
        &schema,
        r#"{ fieldWithObjectInput(input: {a: "foo", b: ["bar"], c: "baz"}) }"#,
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data.to_string(),
        r#"{"fieldWithObjectInput":"{\"a\":\"foo\",\"b\":[\"bar\"],\"c\":\"baz\",\"d\":7}"}"#,
    );
}

#[test]
fn variable_input_objects_coerce_like_literals() {
    let schema = echo_schema();
    let mut variables = Variables::new();
    variables.insert(
        "input".into(),
        Value::from(json!({"a": "foo", "b": ["bar"], "c": "baz"})),
    );

    let response = crate::run(
        &schema,
        "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }",
        ExecuteParams {
            variables,
            ..ExecuteParams::default()
        },
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data.to_string(),
        r#"{"fieldWithObjectInput":"{\"a\":\"foo\",\"b\":[\"bar\"],\"c\":\"baz\",\"d\":7}"}"#,
    );
}

#[test]
fn single_values_coerce_into_lists() {
    let schema = echo_schema();
    let mut variables = Variables::new();
    variables.insert("input".into(), Value::from(json!({"b": "bar", "c": "baz"})));

    let response = crate::run(
        &schema,
        "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }",
        ExecuteParams {
            variables,
            ..ExecuteParams::default()
        },
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data.to_string(),
        r#"{"fieldWithObjectInput":"{\"b\":[\"bar\"],\"c\":\"baz\",\"d\":7}"}"#,
    );
}

#[test]
fn null_in_a_non_null_input_field_is_invalid_input() {
    let schema = echo_schema();
    let mut variables = Variables::new();
    variables.insert(
        "input".into(),
        Value::from(json!({"a": "foo", "b": "bar", "c": null})),
    );

    let response = crate::run(
        &schema,
        "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }",
        ExecuteParams {
            variables,
            ..ExecuteParams::default()
        },
    );

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].error().kind(), &ErrorKind::InvalidInput);
    assert_eq!(
        response.errors[0].error().message(),
        "Variable \"$input\" got invalid value: In field \"c\": \
         Expected non-null value of type \"String!\"",
    );
}

#[test]
fn missing_required_variable_is_invalid_input() {
    let schema = echo_schema();
    let response = crate::run(
        &schema,
        "query q($value: String!) { echo(input: $value) }",
        ExecuteParams::default(),
    );

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].error().kind(), &ErrorKind::InvalidInput);
    assert_eq!(
        response.errors[0].error().message(),
        "Variable \"$value\" of required type \"String!\" was not provided.",
    );
    assert_eq!(response.errors[0].locations().len(), 1);
}

#[test]
fn null_for_a_non_null_variable_is_invalid_input() {
    let schema = echo_schema();
    let mut variables = Variables::new();
    variables.insert("value".into(), Value::Null);

    let response = crate::run(
        &schema,
        "query q($value: String!) { echo(input: $value) }",
        ExecuteParams {
            variables,
            ..ExecuteParams::default()
        },
    );

    assert_eq!(response.data, Value::Null);
    assert_eq!(
        response.errors[0].error().message(),
        "Variable \"$value\" of non-null type \"String!\" must not be null.",
    );
}

#[test]
fn unset_variables_fall_back_to_argument_defaults() {
    let schema = echo_schema();
    let response = crate::run(
        &schema,
        "query q($x: String) { echoDefault(v: $x) }",
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data.to_string(), r#"{"echoDefault":"hello"}"#);
}

#[test]
fn variable_defaults_apply_when_no_value_is_given() {
    let schema = echo_schema();
    let response = crate::run(
        &schema,
        r#"query q($x: String = "from-default") { echoDefault(v: $x) }"#,
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data.to_string(),
        r#"{"echoDefault":"from-default"}"#,
    );
}
