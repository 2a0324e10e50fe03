//! Checking literal values from the query against declared input types

use std::collections::HashSet;

use crate::{
    ast::InputValue,
    schema::{
        meta::{Argument, NamedType},
        model::{Schema, TypeType},
    },
};

use std::sync::Arc;

pub(crate) mod error {
    use std::fmt::Display;

    pub(crate) fn non_null(arg_type: impl Display) -> String {
        format!("Type \"{arg_type}\" is not nullable")
    }

    pub(crate) fn enum_value(arg_value: impl Display, arg_type: impl Display) -> String {
        format!("Invalid value \"{arg_value}\" for enum \"{arg_type}\"")
    }

    pub(crate) fn type_value(arg_value: impl Display, arg_type: impl Display) -> String {
        format!("Invalid value \"{arg_value}\" for type \"{arg_type}\"")
    }

    pub(crate) fn input_object(arg_type: impl Display) -> String {
        format!("\"{arg_type}\" is not an input object")
    }

    pub(crate) fn field(arg_type: impl Display, field_name: impl Display, message: &str) -> String {
        format!("Error on \"{arg_type}\" field \"{field_name}\": {message}")
    }

    pub(crate) fn missing_fields(arg_type: impl Display, missing: impl Display) -> String {
        format!("\"{arg_type}\" is missing fields: {missing}")
    }

    pub(crate) fn unknown_field(arg_type: impl Display, field_name: impl Display) -> String {
        format!("Field \"{field_name}\" does not exist on type \"{arg_type}\"")
    }
}

/// Returns an error string if the field is invalid
fn validate_object_field(
    schema: &Schema,
    object_type: &TypeType<'_>,
    object_fields: &[Arc<Argument>],
    field_value: &InputValue,
    field_key: &str,
) -> Option<String> {
    let field_type = object_fields
        .iter()
        .find(|f| f.name == field_key)
        .and_then(|f| schema.make_type(&f.arg_type));

    if let Some(field_arg_type) = field_type {
        validate_literal_value(schema, &field_arg_type, field_value)
            .map(|m| error::field(object_type, field_key, &m))
    } else {
        Some(error::unknown_field(object_type, field_key))
    }
}

/// Returns an error string if the value is invalid
pub(crate) fn validate_literal_value(
    schema: &Schema,
    arg_type: &TypeType<'_>,
    arg_value: &InputValue,
) -> Option<String> {
    match arg_type {
        TypeType::NonNull(inner) => {
            if arg_value.is_null() {
                Some(error::non_null(arg_type))
            } else {
                validate_literal_value(schema, inner, arg_value)
            }
        }
        TypeType::List(inner) => match arg_value {
            InputValue::List(items) => items
                .iter()
                .find_map(|i| validate_literal_value(schema, inner, &i.item)),
            // A single value is accepted wherever a list is expected.
            v => validate_literal_value(schema, inner, v),
        },
        TypeType::Concrete(t) => match arg_value {
            InputValue::Null | InputValue::Variable(_) => None,
            InputValue::List(_) => Some("Input lists are not literals".to_owned()),
            InputValue::Object(obj) => {
                let NamedType::InputObject(io) = &***t else {
                    return Some(error::input_object(arg_type));
                };

                let mut remaining_required_fields = io
                    .input_fields
                    .iter()
                    .filter(|f| f.arg_type.is_non_null() && f.default_value.is_none())
                    .map(|f| f.name.as_str())
                    .collect::<HashSet<_>>();

                let error_message = obj.iter().find_map(|(key, value)| {
                    remaining_required_fields.remove(key.item.as_str());
                    validate_object_field(schema, arg_type, &io.input_fields, &value.item, &key.item)
                });

                if error_message.is_some() {
                    return error_message;
                }

                if remaining_required_fields.is_empty() {
                    None
                } else {
                    let mut missing = remaining_required_fields
                        .into_iter()
                        .map(|s| format!("\"{s}\""))
                        .collect::<Vec<_>>();
                    missing.sort();
                    Some(error::missing_fields(arg_type, missing.join(", ")))
                }
            }
            v => match &***t {
                NamedType::Enum(e) => match v {
                    // A string literal is not a valid way to spell an enum
                    // value in a query, even though the same string coerces
                    // as a variable value.
                    InputValue::Enum(name) => {
                        if e.value_by_name(name).is_some() {
                            None
                        } else {
                            Some(error::type_value(v, arg_type))
                        }
                    }
                    _ => Some(error::enum_value(v, arg_type)),
                },
                NamedType::Scalar(s) => match s.parse_literal(v) {
                    Ok(_) => None,
                    Err(_) => Some(error::type_value(v, arg_type)),
                },
                _ => Some(error::input_object(arg_type)),
            },
        },
    }
}
