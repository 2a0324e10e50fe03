//! Tamarack is a dynamic GraphQL execution engine
//!
//! Schemas are built programmatically at runtime instead of being derived
//! from host types: callers describe object, interface, union, enum, scalar
//! and input object types, attach resolver closures to fields, and get back
//! an immutable [`Schema`] that every request shares.
//!
//! A request goes through [`run`]: the source is parsed, validated against
//! the schema, its variables coerced, and the selected operation executed
//! field by field. The outcome is always a [`Response`] whose error list
//! carries one-based source locations and response paths, never a panic.
//!
//! ```
//! use tamarack::{
//!     schema::{Field, ObjectType, Schema, TypeRef},
//!     value::Resolved,
//!     ExecuteParams,
//! };
//!
//! let query = ObjectType::new(
//!     "Query",
//!     vec![Field::new("hello", TypeRef::string())
//!         .resolver(|_ctx, _args| Ok(Resolved::from("world")))],
//! );
//! let schema = Schema::builder(query).finish().unwrap();
//!
//! let response = tamarack::run(&schema, "{ hello }", ExecuteParams::default());
//! assert_eq!(response.data.to_string(), r#"{"hello":"world"}"#);
//! ```
//!
//! Long-running requests can cooperate through a
//! [`coroutine::Coroutine`]: resolvers call
//! [`executor::RequestContext::pause_coroutine`] to hand control back to the
//! caller, who resumes or stops the request at will.

#![warn(missing_docs)]

pub mod ast;
pub mod coroutine;
pub mod error;
pub mod executor;
pub mod parser;
pub mod schema;
pub mod trace;
pub mod validation;
pub mod value;

mod util;

#[cfg(test)]
mod executor_tests;

pub use crate::{
    error::{ErrorKind, ExecutionError, FieldError, PathSegment, Response},
    executor::{ExecuteParams, RequestContext, ResolveInfo, ResolverArgs, ResolverContext, Variables},
    schema::{Schema, SchemaError},
};

/// The result a field resolver produces.
pub type FieldResult<T = crate::value::Resolved> = Result<T, FieldError>;

/// Parses, validates and executes `source` against `schema`
///
/// Parse and validation failures come back as `BadQuery` errors in the
/// response instead of a separate error channel, so callers serialize one
/// envelope shape regardless of where the request failed.
pub fn run(schema: &Schema, source: &str, params: ExecuteParams<'_>) -> Response {
    let document = match parser::parse_document_source(source) {
        Ok(document) => document,
        Err(e) => {
            return Response::from_errors(vec![ExecutionError::at_locations(
                vec![e.span.start],
                FieldError::new(ErrorKind::BadQuery, e.item.to_string()),
            )]);
        }
    };

    let errors = validate(schema, &document, params.introspection_enabled);
    if !errors.is_empty() {
        return Response::from_errors(
            errors
                .into_iter()
                .map(|e| {
                    let (locations, message) = e.into_parts();
                    ExecutionError::at_locations(
                        locations,
                        FieldError::new(ErrorKind::BadQuery, message),
                    )
                })
                .collect(),
        );
    }

    executor::execute(schema, &document, params)
}

/// Runs the full validation rule set over an already parsed document.
pub fn validate(
    schema: &Schema,
    document: &ast::Document<'_>,
    introspection_enabled: bool,
) -> Vec<validation::RuleError> {
    let mut ctx = validation::ValidatorContext::new(schema, document, introspection_enabled);
    validation::visit_all_rules(&mut ctx, document);
    ctx.into_errors()
}

/// Runs only the selected validation rules over an already parsed document.
///
/// The rules are independent of each other, so running a subset reports
/// exactly the errors those rules would have contributed to [`validate`].
pub fn validate_with_rules(
    schema: &Schema,
    document: &ast::Document<'_>,
    introspection_enabled: bool,
    rules: &[validation::Rule],
) -> Vec<validation::RuleError> {
    let mut ctx = validation::ValidatorContext::new(schema, document, introspection_enabled);
    for &rule in rules {
        validation::visit_rule(rule, &mut ctx, document);
    }
    ctx.into_errors()
}
