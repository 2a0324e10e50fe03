use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    error::ErrorKind,
    executor::ExecuteParams,
    schema::{
        meta::{
            Argument, EnumType, EnumValue, Field, InputObjectType, InterfaceType, ObjectType,
            TypeRef,
        },
        model::Schema,
    },
    value::{Resolved, Value},
};

fn menagerie_schema() -> Arc<Schema> {
    let pet = InterfaceType::new("Pet", vec![Field::new("name", TypeRef::string())]);

    let dog = ObjectType::new(
        "Dog",
        vec![
            Field::new("name", TypeRef::string()),
            Field::new("barkVolume", TypeRef::int()),
        ],
    )
    .interfaces(["Pet"]);

    let cat = ObjectType::new(
        "Cat",
        vec![
            Field::new("name", TypeRef::string()),
            Field::new("meowVolume", TypeRef::int()),
        ],
    )
    .interfaces(["Pet"]);

    let mood = EnumType::new(
        "Mood",
        vec![
            EnumValue::new("HUNGRY"),
            EnumValue::new("SLEEPY"),
            EnumValue::new("GRUMPY").deprecated("cats are always grumpy"),
        ],
    );

    let filter = InputObjectType::new(
        "PetFilter",
        vec![
            Argument::new("name", TypeRef::string()),
            Argument::new("limit", TypeRef::int())
                .default_value(crate::ast::InputValue::Int(10)),
        ],
    );

    let query = ObjectType::new(
        "Query",
        vec![
            Field::new("pets", TypeRef::named("Pet").list())
                .argument(Argument::new("filter", TypeRef::named("PetFilter")))
                .resolver(|_, _| Ok(Resolved::List(vec![]))),
            Field::new("mood", TypeRef::named("Mood"))
                .resolver(|_, _| Ok(Resolved::from("SLEEPY"))),
            Field::new("petCount", TypeRef::int())
                .deprecated("count pets yourself")
                .resolver(|_, _| Ok(Resolved::from(0))),
        ],
    );

    Schema::builder(query)
        .register(pet)
        .register(dog)
        .register(cat)
        .register(mood)
        .register(filter)
        .finish()
        .expect("valid schema")
}

#[test]
fn schema_meta_field_reports_the_operation_roots() {
    let schema = menagerie_schema();
    let response = crate::run(
        &schema,
        "{ __schema { queryType { name } mutationType { name } } }",
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        Value::from(json!({
            "__schema": {
                "queryType": { "name": "Query" },
                "mutationType": null,
            },
        })),
    );
}

#[test]
fn schema_directives_start_with_the_built_ins() {
    let schema = menagerie_schema();
    let response = crate::run(
        &schema,
        "{ __schema { directives { name } } }",
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        Value::from(json!({
            "__schema": {
                "directives": [{ "name": "skip" }, { "name": "include" }],
            },
        })),
    );
}

#[test]
fn type_lookup_reports_name_and_kind() {
    let schema = menagerie_schema();
    let response = crate::run(
        &schema,
        r#"{
            dog: __type(name: "Dog") { name kind }
            pet: __type(name: "Pet") { name kind }
            mood: __type(name: "Mood") { name kind }
            filter: __type(name: "PetFilter") { name kind }
        }"#,
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        Value::from(json!({
            "dog": { "name": "Dog", "kind": "OBJECT" },
            "pet": { "name": "Pet", "kind": "INTERFACE" },
            "mood": { "name": "Mood", "kind": "ENUM" },
            "filter": { "name": "PetFilter", "kind": "INPUT_OBJECT" },
        })),
    );
}

#[test]
fn unknown_type_lookup_comes_back_null() {
    let schema = menagerie_schema();
    let response = crate::run(
        &schema,
        r#"{ __type(name: "Wolf") { name } }"#,
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, Value::from(json!({ "__type": null })));
}

#[test]
fn wrapped_types_unwrap_through_of_type() {
    let schema = menagerie_schema();
    let response = crate::run(
        &schema,
        r#"{
            __type(name: "Query") {
                fields { name type { kind name ofType { kind name } } }
            }
        }"#,
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        Value::from(json!({
            "__type": {
                "fields": [
                    {
                        "name": "pets",
                        "type": {
                            "kind": "LIST",
                            "name": null,
                            "ofType": { "kind": "INTERFACE", "name": "Pet" },
                        },
                    },
                    {
                        "name": "mood",
                        "type": {
                            "kind": "ENUM",
                            "name": "Mood",
                            "ofType": null,
                        },
                    },
                ],
            },
        })),
    );
}

#[test]
fn deprecated_fields_are_hidden_unless_requested() {
    let schema = menagerie_schema();

    let response = crate::run(
        &schema,
        r#"{ __type(name: "Query") { fields { name } } }"#,
        ExecuteParams::default(),
    );
    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        Value::from(json!({
            "__type": { "fields": [{ "name": "pets" }, { "name": "mood" }] },
        })),
    );

    let response = crate::run(
        &schema,
        r#"{
            __type(name: "Query") {
                fields(includeDeprecated: true) {
                    name isDeprecated deprecationReason
                }
            }
        }"#,
        ExecuteParams::default(),
    );
    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        Value::from(json!({
            "__type": {
                "fields": [
                    { "name": "pets", "isDeprecated": false, "deprecationReason": null },
                    { "name": "mood", "isDeprecated": false, "deprecationReason": null },
                    {
                        "name": "petCount",
                        "isDeprecated": true,
                        "deprecationReason": "count pets yourself",
                    },
                ],
            },
        })),
    );
}

#[test]
fn possible_types_come_back_in_name_order() {
    let schema = menagerie_schema();
    let response = crate::run(
        &schema,
        r#"{ __type(name: "Pet") { possibleTypes { name } } }"#,
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        Value::from(json!({
            "__type": { "possibleTypes": [{ "name": "Cat" }, { "name": "Dog" }] },
        })),
    );
}

#[test]
fn enum_values_respect_the_deprecation_filter() {
    let schema = menagerie_schema();
    let response = crate::run(
        &schema,
        r#"{
            visible: __type(name: "Mood") { enumValues { name } }
            all: __type(name: "Mood") {
                enumValues(includeDeprecated: true) { name isDeprecated }
            }
        }"#,
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        Value::from(json!({
            "visible": {
                "enumValues": [{ "name": "HUNGRY" }, { "name": "SLEEPY" }],
            },
            "all": {
                "enumValues": [
                    { "name": "HUNGRY", "isDeprecated": false },
                    { "name": "SLEEPY", "isDeprecated": false },
                    { "name": "GRUMPY", "isDeprecated": true },
                ],
            },
        })),
    );
}

#[test]
fn input_fields_render_their_defaults_as_literals() {
    let schema = menagerie_schema();
    let response = crate::run(
        &schema,
        r#"{
            __type(name: "PetFilter") {
                inputFields { name defaultValue type { name } }
            }
        }"#,
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        Value::from(json!({
            "__type": {
                "inputFields": [
                    { "name": "name", "defaultValue": null, "type": { "name": "String" } },
                    { "name": "limit", "defaultValue": "10", "type": { "name": "Int" } },
                ],
            },
        })),
    );
}

#[test]
fn disabling_introspection_rejects_the_meta_fields() {
    let schema = menagerie_schema();

    for (source, message) in [
        (
            "{ __schema { queryType { name } } }",
            r#"Unknown field "__schema" on type "Query""#,
        ),
        (
            r#"{ __type(name: "Dog") { name } }"#,
            r#"Unknown field "__type" on type "Query""#,
        ),
    ] {
        let response = crate::run(
            &schema,
            source,
            ExecuteParams {
                introspection_enabled: false,
                ..ExecuteParams::default()
            },
        );

        assert_eq!(response.data, Value::Null);
        assert_eq!(response.errors.len(), 1, "{source}");
        assert_eq!(response.errors[0].error().kind(), &ErrorKind::BadQuery);
        assert_eq!(response.errors[0].error().message(), message);
    }
}

#[test]
fn typename_stays_available_without_introspection() {
    let schema = menagerie_schema();
    let response = crate::run(
        &schema,
        "{ __typename }",
        ExecuteParams {
            introspection_enabled: false,
            ..ExecuteParams::default()
        },
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data.to_string(), r#"{"__typename":"Query"}"#);
}
