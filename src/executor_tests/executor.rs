use std::{
    sync::{
        atomic::{AtomicI64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    ast::OperationType,
    error::{ErrorKind, FieldError, PathSegment},
    executor::{ExecuteParams, RequestContext},
    schema::{
        meta::{AppliedDirective, Argument, Field, InterfaceType, ObjectType, TypeRef, UnionType},
        model::Schema,
    },
    trace::{CountingTracer, FieldTrace},
    value::{Object, Resolved, Value},
};

fn scalar_schema() -> Arc<Schema> {
    let query = ObjectType::new(
        "Query",
        vec![
            Field::new("a", TypeRef::int()).resolver(|_, _| Ok(Resolved::from(1))),
            Field::new("b", TypeRef::int()).resolver(|_, _| Ok(Resolved::from(2))),
            Field::new("c", TypeRef::int()).resolver(|_, _| Ok(Resolved::from(3))),
        ],
    );
    Schema::builder(query).finish().expect("valid schema")
}

#[test]
fn fields_come_back_in_selection_order() {
    let schema = scalar_schema();
    let response = crate::run(&schema, "{ b a c }", ExecuteParams::default());

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data.to_string(), r#"{"b":2,"a":1,"c":3}"#);
}

#[test]
fn aliases_rename_response_keys() {
    let schema = scalar_schema();
    let response = crate::run(&schema, "{ x: a y: a }", ExecuteParams::default());

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data.to_string(), r#"{"x":1,"y":1}"#);
}

#[test]
fn default_resolver_indexes_object_sources() {
    let user = ObjectType::new(
        "User",
        vec![
            Field::new("name", TypeRef::string()),
            Field::new("age", TypeRef::int()),
        ],
    );
    let query = ObjectType::new("Query", vec![Field::new("user", TypeRef::named("User"))]);
    let schema = Schema::builder(query)
        .register(user)
        .finish()
        .expect("valid schema");

    let response = crate::run(
        &schema,
        "{ user { name age } }",
        ExecuteParams {
            root: Resolved::from(Value::from(json!({"user": {"name": "Ada", "age": 36}}))),
            ..ExecuteParams::default()
        },
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        serde_json::to_value(&response.data).unwrap(),
        json!({"user": {"name": "Ada", "age": 36}}),
    );
}

fn number_schema(number: Arc<AtomicI64>) -> Arc<Schema> {
    let holder = |n: i64| {
        Resolved::from(Value::Object(Object::from_iter([(
            "theNumber",
            Value::from(n),
        )])))
    };

    let query_number = Arc::clone(&number);
    let query = ObjectType::new(
        "Query",
        vec![Field::new("theNumber", TypeRef::int()).resolver(move |_, _| {
            Ok(Resolved::from(query_number.load(Ordering::SeqCst)))
        })],
    );

    let change_number = Arc::clone(&number);
    let mutation = ObjectType::new(
        "Mutation",
        vec![
            Field::new(
                "immediatelyChangeTheNumber",
                TypeRef::named("NumberHolder"),
            )
            .argument(Argument::new("newNumber", TypeRef::int().non_null()))
            .resolver(move |_, args| {
                let n = args
                    .get("newNumber")
                    .and_then(Value::as_int_value)
                    .unwrap_or(0);
                change_number.store(n, Ordering::SeqCst);
                Ok(holder(n))
            }),
            Field::new("failToChangeTheNumber", TypeRef::named("NumberHolder"))
                .argument(Argument::new("newNumber", TypeRef::int().non_null()))
                .resolver(|_, _| Err(FieldError::internal("Cannot change the number"))),
        ],
    );

    let number_holder = ObjectType::new(
        "NumberHolder",
        vec![Field::new("theNumber", TypeRef::int())],
    );

    Schema::builder(query)
        .mutation(mutation)
        .register(number_holder)
        .finish()
        .expect("valid schema")
}

#[test]
fn mutations_run_serially_in_document_order() {
    let number = Arc::new(AtomicI64::new(6));
    let schema = number_schema(Arc::clone(&number));

    let response = crate::run(
        &schema,
        r#"mutation M {
          first: immediatelyChangeTheNumber(newNumber: 1) { theNumber }
          second: immediatelyChangeTheNumber(newNumber: 2) { theNumber }
          third: immediatelyChangeTheNumber(newNumber: 3) { theNumber }
          fourth: immediatelyChangeTheNumber(newNumber: 4) { theNumber }
          fifth: immediatelyChangeTheNumber(newNumber: 5) { theNumber }
        }"#,
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data.to_string(),
        r#"{"first":{"theNumber":1},"second":{"theNumber":2},"third":{"theNumber":3},"fourth":{"theNumber":4},"fifth":{"theNumber":5}}"#,
    );
    assert_eq!(number.load(Ordering::SeqCst), 5);
}

#[test]
fn mutation_failures_stay_contained_mid_sequence() {
    let number = Arc::new(AtomicI64::new(6));
    let schema = number_schema(Arc::clone(&number));

    let response = crate::run(
        &schema,
        r#"mutation M {
          first: immediatelyChangeTheNumber(newNumber: 1) { theNumber }
          second: immediatelyChangeTheNumber(newNumber: 2) { theNumber }
          third: failToChangeTheNumber(newNumber: 3) { theNumber }
          fourth: immediatelyChangeTheNumber(newNumber: 4) { theNumber }
          fifth: immediatelyChangeTheNumber(newNumber: 5) { theNumber }
          sixth: failToChangeTheNumber(newNumber: 6) { theNumber }
        }"#,
        ExecuteParams::default(),
    );

    assert_eq!(
        response.data.to_string(),
        r#"{"first":{"theNumber":1},"second":{"theNumber":2},"third":null,"fourth":{"theNumber":4},"fifth":{"theNumber":5},"sixth":null}"#,
    );
    assert_eq!(response.errors.len(), 2);
    for error in &response.errors {
        assert_eq!(error.error().message(), "Cannot change the number");
        assert_eq!(error.error().kind(), &ErrorKind::Internal);
        assert_eq!(error.locations().len(), 1);
    }
    assert_eq!(
        response.errors[0].path(),
        &[PathSegment::Field("third".into())],
    );
    assert_eq!(
        response.errors[1].path(),
        &[PathSegment::Field("sixth".into())],
    );
    // Mutations after a failed sibling still ran.
    assert_eq!(number.load(Ordering::SeqCst), 5);
}

#[test]
fn mutations_need_a_mutation_root() {
    let schema = scalar_schema();
    let response = crate::run(&schema, "mutation { a }", ExecuteParams::default());

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Schema is not configured for mutations",
    );
    assert_eq!(response.errors[0].error().kind(), &ErrorKind::BadQuery);
}

fn nest_schema() -> Arc<Schema> {
    let nest = ObjectType::new(
        "Nest",
        vec![
            Field::new("nonNullInt", TypeRef::int().non_null())
                .resolver(|_, _| Ok(Resolved::null())),
            Field::new("failed", TypeRef::int().non_null())
                .resolver(|_, _| Err(FieldError::internal("boom"))),
            Field::new("ok", TypeRef::int()).resolver(|_, _| Ok(Resolved::from(1))),
        ],
    );
    let query = ObjectType::new(
        "Query",
        vec![Field::new("nest", TypeRef::named("Nest"))
            .resolver(|_, _| Ok(Resolved::from(Value::Object(Object::with_capacity(0)))))],
    );
    Schema::builder(query)
        .register(nest)
        .finish()
        .expect("valid schema")
}

#[test]
fn null_in_a_non_null_field_propagates_to_the_nullable_parent() {
    let schema = nest_schema();
    let response = crate::run(
        &schema,
        "{ nest { ok nonNullInt } }",
        ExecuteParams::default(),
    );

    assert_eq!(response.data.to_string(), r#"{"nest":null}"#);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Cannot return null for non-nullable field Nest.nonNullInt.",
    );
    assert_eq!(
        response.errors[0].path(),
        &[
            PathSegment::Field("nest".into()),
            PathSegment::Field("nonNullInt".into()),
        ],
    );
}

#[test]
fn failed_non_null_field_keeps_its_own_error_only() {
    let schema = nest_schema();
    let response = crate::run(&schema, "{ nest { failed } }", ExecuteParams::default());

    assert_eq!(response.data.to_string(), r#"{"nest":null}"#);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].error().message(), "boom");
}

#[test]
fn non_null_list_element_collapses_the_list() {
    let query = ObjectType::new(
        "Query",
        vec![Field::new("nums", TypeRef::int().non_null().list()).resolver(|_, _| {
            Ok(Resolved::from(Value::List(vec![
                Value::from(1),
                Value::Null,
                Value::from(3),
            ])))
        })],
    );
    let schema = Schema::builder(query).finish().expect("valid schema");

    let response = crate::run(&schema, "{ nums }", ExecuteParams::default());

    assert_eq!(response.data.to_string(), r#"{"nums":null}"#);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Cannot return null for non-nullable field Query.nums.",
    );
    assert_eq!(
        response.errors[0].path(),
        &[PathSegment::Field("nums".into()), PathSegment::Index(1)],
    );
}

#[test]
fn non_iterable_value_for_a_list_field_is_an_error() {
    let query = ObjectType::new(
        "Query",
        vec![Field::new("numbers", TypeRef::int().list())
            .resolver(|_, _| Ok(Resolved::from(1)))],
    );
    let schema = Schema::builder(query).finish().expect("valid schema");

    let response = crate::run(&schema, "{ numbers }", ExecuteParams::default());

    assert_eq!(response.data.to_string(), r#"{"numbers":null}"#);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "User Error: expected iterable, but did not find one for field Query.numbers.",
    );
}

struct DogSource {
    name: &'static str,
    bark_volume: i64,
}

struct CatSource {
    name: &'static str,
    meow_volume: i64,
}

fn pet_schema() -> Arc<Schema> {
    let pet = InterfaceType::new("Pet", vec![Field::new("name", TypeRef::string())]);

    let dog = ObjectType::new(
        "Dog",
        vec![
            Field::new("name", TypeRef::string()).resolver(|ctx, _| {
                let dog = ctx
                    .source()
                    .downcast_host::<DogSource>()
                    .ok_or_else(|| FieldError::internal("not a dog"))?;
                Ok(Resolved::from(dog.name))
            }),
            Field::new("barkVolume", TypeRef::int()).resolver(|ctx, _| {
                let dog = ctx
                    .source()
                    .downcast_host::<DogSource>()
                    .ok_or_else(|| FieldError::internal("not a dog"))?;
                Ok(Resolved::from(dog.bark_volume))
            }),
        ],
    )
    .interfaces(["Pet"])
    .is_type_of(|source, _| source.downcast_host::<DogSource>().is_some());

    let cat = ObjectType::new(
        "Cat",
        vec![
            Field::new("name", TypeRef::string()).resolver(|ctx, _| {
                let cat = ctx
                    .source()
                    .downcast_host::<CatSource>()
                    .ok_or_else(|| FieldError::internal("not a cat"))?;
                Ok(Resolved::from(cat.name))
            }),
            Field::new("meowVolume", TypeRef::int()).resolver(|ctx, _| {
                let cat = ctx
                    .source()
                    .downcast_host::<CatSource>()
                    .ok_or_else(|| FieldError::internal("not a cat"))?;
                Ok(Resolved::from(cat.meow_volume))
            }),
        ],
    )
    .interfaces(["Pet"])
    .is_type_of(|source, _| source.downcast_host::<CatSource>().is_some());

    let query = ObjectType::new(
        "Query",
        vec![Field::new("pets", TypeRef::named("Pet").list()).resolver(|_, _| {
            Ok(Resolved::List(vec![
                Resolved::host(DogSource {
                    name: "Odie",
                    bark_volume: 4,
                }),
                Resolved::host(CatSource {
                    name: "Garfield",
                    meow_volume: 10,
                }),
            ]))
        })],
    );

    Schema::builder(query)
        .register(pet)
        .register(dog)
        .register(cat)
        .finish()
        .expect("valid schema")
}

#[test]
fn interface_values_dispatch_through_is_type_of() {
    let schema = pet_schema();
    let response = crate::run(
        &schema,
        "{ pets { __typename name } }",
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data.to_string(),
        r#"{"pets":[{"__typename":"Dog","name":"Odie"},{"__typename":"Cat","name":"Garfield"}]}"#,
    );
}

#[test]
fn fragments_narrow_to_the_runtime_type() {
    let schema = pet_schema();
    let response = crate::run(
        &schema,
        r#"{
          pets {
            name
            ... on Dog { barkVolume }
            ...catFields
          }
        }
        fragment catFields on Cat { meowVolume }"#,
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data.to_string(),
        r#"{"pets":[{"name":"Odie","barkVolume":4},{"name":"Garfield","meowVolume":10}]}"#,
    );
}

#[test]
fn resolve_type_must_name_a_possible_type() {
    let pet = InterfaceType::new("Pet", vec![Field::new("name", TypeRef::string())])
        .resolve_type(|_, _| Some("Human".into()));
    let dog = ObjectType::new("Dog", vec![Field::new("name", TypeRef::string())])
        .interfaces(["Pet"]);
    let human = ObjectType::new("Human", vec![Field::new("name", TypeRef::string())]);
    let query = ObjectType::new(
        "Query",
        vec![Field::new("pet", TypeRef::named("Pet")).resolver(|_, _| {
            Ok(Resolved::host(DogSource {
                name: "Odie",
                bark_volume: 4,
            }))
        })],
    );
    let schema = Schema::builder(query)
        .register(pet)
        .register(dog)
        .register(human)
        .finish()
        .expect("valid schema");

    let response = crate::run(&schema, "{ pet { name } }", ExecuteParams::default());

    assert_eq!(response.data.to_string(), r#"{"pet":null}"#);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Runtime Object type \"Human\" is not a possible type for \"Pet\".",
    );
    assert_eq!(response.errors[0].error().kind(), &ErrorKind::Internal);
}

#[test]
fn union_members_probe_in_declaration_order() {
    let dog = ObjectType::new("Dog", vec![Field::new("barkVolume", TypeRef::int())])
        .is_type_of(|source, _| source.downcast_host::<DogSource>().is_some());
    let cat = ObjectType::new("Cat", vec![Field::new("meowVolume", TypeRef::int())])
        .is_type_of(|source, _| source.downcast_host::<CatSource>().is_some());
    let cat_or_dog = UnionType::new("CatOrDog", ["Cat", "Dog"]);
    let query = ObjectType::new(
        "Query",
        vec![Field::new("pet", TypeRef::named("CatOrDog")).resolver(|_, _| {
            Ok(Resolved::host(DogSource {
                name: "Odie",
                bark_volume: 4,
            }))
        })],
    );
    let schema = Schema::builder(query)
        .register(dog)
        .register(cat)
        .register(cat_or_dog)
        .finish()
        .expect("valid schema");

    let response = crate::run(
        &schema,
        "{ pet { __typename ... on Dog { barkVolume } } }",
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data.to_string(),
        r#"{"pet":{"__typename":"Dog","barkVolume":4}}"#,
    );
}

#[test]
fn skip_and_include_honor_variables() {
    let schema = scalar_schema();
    let mut variables = crate::Variables::new();
    variables.insert("yes".into(), Value::from(true));

    let response = crate::run(
        &schema,
        "query Q($yes: Boolean!) { a @include(if: $yes) b @skip(if: $yes) c }",
        ExecuteParams {
            variables,
            ..ExecuteParams::default()
        },
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data.to_string(), r#"{"a":1,"c":3}"#);
}

#[test]
fn skip_and_include_honor_literals() {
    let schema = scalar_schema();
    let response = crate::run(
        &schema,
        "{ a @skip(if: true) b @include(if: false) c @include(if: true) }",
        ExecuteParams::default(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data.to_string(), r#"{"c":3}"#);
}

#[test]
fn panicking_resolver_becomes_an_internal_error() {
    let query = ObjectType::new(
        "Query",
        vec![
            Field::new("boom", TypeRef::int()).resolver(|_, _| panic!("kaboom")),
            Field::new("ok", TypeRef::int()).resolver(|_, _| Ok(Resolved::from(1))),
        ],
    );
    let schema = Schema::builder(query).finish().expect("valid schema");

    let response = crate::run(&schema, "{ boom ok }", ExecuteParams::default());

    assert_eq!(response.data.to_string(), r#"{"boom":null,"ok":1}"#);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "resolver panic: kaboom",
    );
    assert_eq!(response.errors[0].error().kind(), &ErrorKind::Internal);
}

#[test]
fn error_envelope_has_one_based_locations() {
    let query = ObjectType::new(
        "Query",
        vec![Field::new("fail", TypeRef::int())
            .resolver(|_, _| Err(FieldError::internal("boom")))],
    );
    let schema = Schema::builder(query).finish().expect("valid schema");

    let response = crate::run(&schema, "{ fail }", ExecuteParams::default());

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "data": {"fail": null},
            "errors": [{
                "type": "INTERNAL",
                "message": "boom",
                "locations": [{"line": 1, "column": 3}],
                "path": ["fail"],
            }],
        }),
    );
}

#[test]
fn expired_deadline_is_reported_once() {
    let schema = scalar_schema();
    let response = crate::run(
        &schema,
        "{ a b c }",
        ExecuteParams {
            request: Arc::new(RequestContext::with_deadline(Instant::now())),
            ..ExecuteParams::default()
        },
    );

    assert_eq!(
        response.data.to_string(),
        r#"{"a":null,"b":null,"c":null}"#,
    );
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].error(), &FieldError::deadline_exceeded());
}

#[test]
fn cancellation_stops_remaining_fields() {
    let request = Arc::new(RequestContext::new());
    let cancel_from_resolver = Arc::clone(&request);

    let query = ObjectType::new(
        "Query",
        vec![
            Field::new("first", TypeRef::int()).resolver(move |_, _| {
                cancel_from_resolver.cancel();
                Ok(Resolved::from(1))
            }),
            Field::new("second", TypeRef::int()).resolver(|_, _| Ok(Resolved::from(2))),
        ],
    );
    let schema = Schema::builder(query).finish().expect("valid schema");

    let response = crate::run(
        &schema,
        "{ first second }",
        ExecuteParams {
            request,
            ..ExecuteParams::default()
        },
    );

    // Cancellation lands before the first field's value completes, so even
    // its own field nulls out.
    assert_eq!(response.data.to_string(), r#"{"first":null,"second":null}"#);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].error(), &FieldError::deadline_exceeded());
}

#[test]
fn operation_selection_requires_a_name_for_multiple_operations() {
    let schema = scalar_schema();
    let response = crate::run(
        &schema,
        "query A { a } query B { b }",
        ExecuteParams::default(),
    );

    assert_eq!(response.data, Value::Null);
    assert_eq!(
        response.errors[0].error().message(),
        "Must provide operation name if query contains multiple operations",
    );

    let response = crate::run(
        &schema,
        "query A { a } query B { b }",
        ExecuteParams {
            operation_name: Some("B"),
            ..ExecuteParams::default()
        },
    );
    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data.to_string(), r#"{"b":2}"#);

    let response = crate::run(
        &schema,
        "query A { a } query B { b }",
        ExecuteParams {
            operation_name: Some("C"),
            ..ExecuteParams::default()
        },
    );
    assert_eq!(
        response.errors[0].error().message(),
        "Unknown operation named \"C\"",
    );
}

#[test]
fn document_without_operations_is_rejected() {
    let schema = scalar_schema();
    let document =
        crate::parser::parse_document_source("fragment F on Query { a }").expect("parses");

    let response = crate::executor::execute(&schema, &document, ExecuteParams::default());

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors[0].error().message(), "Must provide an operation");
    assert_eq!(response.errors[0].error().kind(), &ErrorKind::BadQuery);
}

#[test]
fn parse_errors_come_back_as_bad_query() {
    let schema = scalar_schema();
    let response = crate::run(&schema, "{ a", ExecuteParams::default());

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].error().kind(), &ErrorKind::BadQuery);
    assert_eq!(response.errors[0].locations().len(), 1);
}

#[test]
fn validation_errors_come_back_as_bad_query() {
    let schema = scalar_schema();
    let response = crate::run(&schema, "{ nope }", ExecuteParams::default());

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].error().kind(), &ErrorKind::BadQuery);
    assert_eq!(
        response.errors[0].error().message(),
        "Unknown field \"nope\" on type \"Query\"",
    );
}

#[test]
fn deprecated_fields_notify_the_hook() {
    let query = ObjectType::new(
        "Query",
        vec![
            Field::new("old", TypeRef::int())
                .deprecated("use new")
                .resolver(|_, _| Ok(Resolved::from(1))),
            Field::new("new", TypeRef::int()).resolver(|_, _| Ok(Resolved::from(2))),
        ],
    );
    let schema = Schema::builder(query).finish().expect("valid schema");

    let seen = AtomicUsize::new(0);
    let response = crate::run(
        &schema,
        "{ old new }",
        ExecuteParams {
            on_deprecated_field: Some(Box::new(|info| {
                assert_eq!(info.field_name, "old");
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })),
            ..ExecuteParams::default()
        },
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data.to_string(), r#"{"old":1,"new":2}"#);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_deprecation_hook_nulls_the_field() {
    let query = ObjectType::new(
        "Query",
        vec![Field::new("old", TypeRef::int())
            .deprecated("gone")
            .resolver(|_, _| Ok(Resolved::from(1)))],
    );
    let schema = Schema::builder(query).finish().expect("valid schema");

    let response = crate::run(
        &schema,
        "{ old }",
        ExecuteParams {
            on_deprecated_field: Some(Box::new(|_| {
                Err(FieldError::new(
                    ErrorKind::Custom("Forbidden".into()),
                    "deprecated fields are disabled",
                ))
            })),
            ..ExecuteParams::default()
        },
    );

    assert_eq!(response.data.to_string(), r#"{"old":null}"#);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "deprecated fields are disabled",
    );
}

#[test]
fn field_directives_notify_the_hook() {
    let query = ObjectType::new(
        "Query",
        vec![Field::new("priced", TypeRef::int())
            .directive(AppliedDirective::new("cost").argument("weight", Value::from(5)))
            .resolver(|_, _| Ok(Resolved::from(1)))],
    );
    let schema = Schema::builder(query).finish().expect("valid schema");

    let seen = Mutex::new(vec![]);
    let response = crate::run(
        &schema,
        "{ priced }",
        ExecuteParams {
            on_field_directive: Some(Box::new(|directive, info| {
                seen.lock()
                    .unwrap()
                    .push((directive.name.to_string(), info.field_name.to_owned()));
                Ok(())
            })),
            ..ExecuteParams::default()
        },
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        seen.into_inner().unwrap(),
        vec![("cost".to_owned(), "priced".to_owned())],
    );
}

#[test]
fn resolvers_see_the_full_field_record() {
    struct RootTag;

    let query = ObjectType::new(
        "Query",
        vec![Field::new("echo", TypeRef::string())
            .argument(Argument::new("loud", TypeRef::boolean()))
            .resolver(|ctx, _| {
                let info = ctx.info();
                assert_eq!(info.field_name, "echo");
                assert_eq!(info.field_asts.len(), 1);
                assert_eq!(info.field_asts[0].item.name.item, "echo");
                assert_eq!(info.parent_type.name(), "Query");
                assert_eq!(info.field_type, &TypeRef::string());
                assert!(info.schema.concrete_type_by_name("Query").is_some());
                assert!(info.fragments.contains_key("queryFields"));
                assert_eq!(info.operation.item.operation_type, OperationType::Query);
                assert_eq!(info.operation.item.name.as_ref().map(|n| n.item), Some("Q"));
                assert_eq!(info.variables.get("flag"), Some(&Value::from(true)));
                assert!(info.root_value.downcast_host::<RootTag>().is_some());
                Ok(Resolved::from("ok"))
            })],
    );
    let schema = Schema::builder(query).finish().expect("valid schema");

    let mut variables = crate::Variables::new();
    variables.insert("flag".into(), Value::from(true));
    let response = crate::run(
        &schema,
        "query Q($flag: Boolean) { ...queryFields } \
         fragment queryFields on Query { echo(loud: $flag) }",
        ExecuteParams {
            root: Resolved::host(RootTag),
            variables,
            ..ExecuteParams::default()
        },
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data.to_string(), r#"{"echo":"ok"}"#);
}

#[test]
fn tracer_sees_every_field_with_its_path() {
    let schema = pet_schema();
    let tracer = CountingTracer::default();

    let response = crate::run(
        &schema,
        "{ pets { name } }",
        ExecuteParams {
            tracer: Some(&tracer),
            ..ExecuteParams::default()
        },
    );
    assert_eq!(response.errors, vec![]);

    let name_path = vec![
        PathSegment::Field("pets".into()),
        PathSegment::Field("name".into()),
    ];
    let entries = tracer.take();
    assert_eq!(entries.len(), 2);
    // Leaves complete before their parent, and both elements fold together.
    assert_eq!(entries[0].path, name_path);
    assert_eq!(entries[0].count, 2);
    assert_eq!(entries[1].path, vec![PathSegment::Field("pets".into())]);
    assert_eq!(entries[1].count, 1);
}

#[test]
fn tracer_durations_accumulate() {
    let query = ObjectType::new(
        "Query",
        vec![Field::new("slow", TypeRef::int()).resolver(|_, _| {
            std::thread::sleep(Duration::from_millis(5));
            Ok(Resolved::from(1))
        })],
    );
    let schema = Schema::builder(query).finish().expect("valid schema");
    let tracer = CountingTracer::default();

    crate::run(
        &schema,
        "{ slow }",
        ExecuteParams {
            tracer: Some(&tracer),
            ..ExecuteParams::default()
        },
    );

    let entries: Vec<FieldTrace> = tracer.take();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].total >= Duration::from_millis(5));
}
