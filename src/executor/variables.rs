//! Variable coercion and argument collection

use std::sync::Arc;

use crate::{
    ast::{Arguments, InputValue, Operation},
    error::{ErrorKind, ExecutionError, FieldError},
    executor::Variables,
    parser::Spanning,
    schema::{
        meta::{Argument, NamedType},
        model::{Schema, TypeType},
    },
    value::{Object, Value},
};

/// Coerces the raw variable map against the operation's variable definitions.
///
/// Returns the coerced map, or every coercion failure at once. A bad type
/// literal is a [`ErrorKind::BadQuery`] error, everything about the values
/// themselves is [`ErrorKind::InvalidInput`].
pub(crate) fn coerce_variable_values(
    schema: &Schema,
    operation: &Spanning<Operation<'_>>,
    raw: &Variables,
) -> Result<Variables, Vec<ExecutionError>> {
    let mut coerced = Variables::new();
    let mut errors = vec![];

    let Some(defs) = &operation.item.variable_definitions else {
        return Ok(coerced);
    };

    for (name, def) in defs.item.iter() {
        let position = name.span.start;
        let type_literal = &def.var_type.item;

        let var_type = match schema.make_type_from_ast(type_literal) {
            Some(t) if t.innermost_concrete().is_input() => t,
            _ => {
                errors.push(ExecutionError::new(
                    position,
                    vec![],
                    FieldError::new(
                        ErrorKind::BadQuery,
                        format!(
                            "Variable \"${}\" expected value of type \"{type_literal}\" \
                             which cannot be used as an input type.",
                            name.item,
                        ),
                    ),
                ));
                continue;
            }
        };

        match raw.get(name.item) {
            None | Some(Value::Null) if def.default_value.is_some() => {
                // The default literal was already validated against the type.
                let default = def
                    .default_value
                    .as_ref()
                    .map(|d| value_from_ast(schema, &var_type, &d.item, &coerced))
                    .unwrap_or(Value::Null);
                coerced.insert(name.item.to_owned(), default);
            }
            None if var_type.is_non_null() => {
                errors.push(ExecutionError::new(
                    position,
                    vec![],
                    FieldError::invalid_input(format!(
                        "Variable \"${}\" of required type \"{type_literal}\" was not provided.",
                        name.item,
                    )),
                ));
            }
            Some(Value::Null) if var_type.is_non_null() => {
                errors.push(ExecutionError::new(
                    position,
                    vec![],
                    FieldError::invalid_input(format!(
                        "Variable \"${}\" of non-null type \"{type_literal}\" must not be null.",
                        name.item,
                    )),
                ));
            }
            Some(Value::Null) => {
                coerced.insert(name.item.to_owned(), Value::Null);
            }
            // Absent, nullable, no default: the variable stays unset so
            // argument collection can fall back to argument defaults.
            None => {}
            Some(value) => match coerce_value(schema, &var_type, value) {
                Ok(value) => {
                    coerced.insert(name.item.to_owned(), value);
                }
                Err(message) => {
                    errors.push(ExecutionError::new(
                        position,
                        vec![],
                        FieldError::invalid_input(format!(
                            "Variable \"${}\" got invalid value: {message}",
                            name.item,
                        )),
                    ));
                }
            },
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

/// Coerces one raw value against an input type.
///
/// Coercion is a fixed point: feeding an already-coerced value back through
/// the same type returns it unchanged.
fn coerce_value(schema: &Schema, t: &TypeType<'_>, value: &Value) -> Result<Value, String> {
    match t {
        TypeType::NonNull(inner) => {
            if value.is_null() {
                Err(format!("Expected non-null value of type \"{t}\""))
            } else {
                coerce_value(schema, inner, value)
            }
        }
        _ if value.is_null() => Ok(Value::Null),
        TypeType::List(inner) => match value {
            Value::List(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let coerced = coerce_value(schema, inner, item)
                        .map_err(|e| format!("In list element {index}: {e}"))?;
                    list.push(coerced);
                }
                Ok(Value::List(list))
            }
            // A single value is accepted wherever a list is expected.
            v => Ok(Value::List(vec![coerce_value(schema, inner, v)?])),
        },
        TypeType::Concrete(named) => match &***named {
            NamedType::Scalar(s) => s.parse_value(value),
            NamedType::Enum(e) => {
                // Internal values pass through untouched, keeping coercion
                // idempotent for enums whose internal value is not the name.
                if e.name_for_value(value).is_some() {
                    return Ok(value.clone());
                }
                match value {
                    Value::String(name) => e
                        .value_by_name(name)
                        .map(|v| v.value.clone())
                        .ok_or_else(|| format!("Invalid value \"{name}\" for enum \"{t}\"")),
                    v => Err(format!("Invalid value \"{v}\" for enum \"{t}\"")),
                }
            }
            NamedType::InputObject(io) => {
                let Value::Object(obj) = value else {
                    return Err(format!("Expected input object value for type \"{t}\""));
                };

                for (key, _) in obj.iter() {
                    if io.field_by_name(key).is_none() {
                        return Err(format!(
                            "Field \"{key}\" does not exist on type \"{t}\"",
                        ));
                    }
                }

                let mut coerced = Object::with_capacity(io.input_fields.len());
                for field in &io.input_fields {
                    let Some(field_type) = schema.make_type(&field.arg_type) else {
                        continue;
                    };
                    match obj.get_field_value(&field.name) {
                        Some(field_value) => {
                            let value = coerce_value(schema, &field_type, field_value)
                                .map_err(|e| format!("In field \"{}\": {e}", field.name))?;
                            // Nullish results are dropped rather than kept as
                            // explicit nulls.
                            if !value.is_null() {
                                coerced.add_field(field.name.as_str(), value);
                            }
                        }
                        None => match &field.default_value {
                            Some(default) => {
                                let value = value_from_ast(
                                    schema,
                                    &field_type,
                                    default,
                                    &Variables::new(),
                                );
                                if !value.is_null() {
                                    coerced.add_field(field.name.as_str(), value);
                                }
                            }
                            None if field.arg_type.is_non_null() => {
                                return Err(format!(
                                    "Missing required field \"{}\" of type \"{}\"",
                                    field.name, field.arg_type,
                                ));
                            }
                            None => {}
                        },
                    }
                }
                Ok(Value::Object(coerced))
            }
            _ => Err(format!("\"{t}\" is not an input type")),
        },
    }
}

/// Evaluates a query literal against an input type.
///
/// Used for variable defaults, argument defaults and `@skip`/`@include`
/// arguments. Literals reaching this point were accepted by validation, so a
/// shape mismatch evaluates to null instead of an error.
pub(crate) fn value_from_ast(
    schema: &Schema,
    t: &TypeType<'_>,
    literal: &InputValue,
    variables: &Variables,
) -> Value {
    if let InputValue::Variable(name) = literal {
        return variables.get(name).cloned().unwrap_or(Value::Null);
    }

    match t {
        TypeType::NonNull(inner) => value_from_ast(schema, inner, literal, variables),
        TypeType::List(inner) => match literal {
            InputValue::Null => Value::Null,
            InputValue::List(items) => Value::List(
                items
                    .iter()
                    .map(|item| value_from_ast(schema, inner, &item.item, variables))
                    .collect(),
            ),
            single => Value::List(vec![value_from_ast(schema, inner, single, variables)]),
        },
        TypeType::Concrete(named) => match (&***named, literal) {
            (_, InputValue::Null) => Value::Null,
            (NamedType::Scalar(s), lit) => s.parse_literal(lit).unwrap_or(Value::Null),
            (NamedType::Enum(e), InputValue::Enum(name)) => e
                .value_by_name(name)
                .map(|v| v.value.clone())
                .unwrap_or(Value::Null),
            (NamedType::InputObject(io), InputValue::Object(fields)) => {
                let mut object = Object::with_capacity(io.input_fields.len());
                for field in &io.input_fields {
                    let Some(field_type) = schema.make_type(&field.arg_type) else {
                        continue;
                    };
                    let provided = fields
                        .iter()
                        .find(|(key, _)| key.item == field.name)
                        .map(|(_, value)| &value.item);
                    let value = match (provided, &field.default_value) {
                        (Some(lit), _) => value_from_ast(schema, &field_type, lit, variables),
                        (None, Some(default)) => {
                            value_from_ast(schema, &field_type, default, variables)
                        }
                        (None, None) => continue,
                    };
                    if !value.is_null() {
                        object.add_field(field.name.as_str(), value);
                    }
                }
                Value::Object(object)
            }
            _ => Value::Null,
        },
    }
}

/// Builds the argument map for one field or directive application.
///
/// Missing arguments fall back to their declared defaults; arguments that
/// come out nullish are omitted from the map entirely.
pub(crate) fn collect_argument_values(
    schema: &Schema,
    declared: &[Arc<Argument>],
    ast_arguments: Option<&Spanning<Arguments<'_>>>,
    variables: &Variables,
) -> Object {
    let mut values = Object::with_capacity(declared.len());

    for arg in declared {
        let Some(arg_type) = schema.make_type(&arg.arg_type) else {
            continue;
        };

        let provided = ast_arguments.and_then(|args| args.item.get(&arg.name));

        let value = match provided.map(|p| &p.item) {
            // An unset variable behaves as if the argument was omitted.
            Some(InputValue::Variable(var)) if !variables.contains_key(var) => arg
                .default_value
                .as_ref()
                .map(|d| value_from_ast(schema, &arg_type, d, variables)),
            Some(literal) => Some(value_from_ast(schema, &arg_type, literal, variables)),
            None => arg
                .default_value
                .as_ref()
                .map(|d| value_from_ast(schema, &arg_type, d, variables)),
        };

        if let Some(value) = value {
            if !value.is_null() {
                values.add_field(arg.name.as_str(), value);
            }
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        executor::Variables,
        parser::Spanning,
        schema::{
            meta::{Argument, EnumType, EnumValue, Field, InputObjectType, ObjectType, TypeRef},
            model::Schema,
        },
        value::Value,
    };

    use super::{coerce_value, value_from_ast};

    fn test_schema() -> std::sync::Arc<Schema> {
        let input = InputObjectType::new(
            "TestInputObject",
            vec![
                Argument::new("a", TypeRef::string()),
                Argument::new("b", TypeRef::string().list()),
                Argument::new("c", TypeRef::string().non_null()),
                Argument::new("d", TypeRef::int())
                    .default_value(crate::ast::InputValue::Int(7)),
            ],
        );
        let color = EnumType::new(
            "Color",
            vec![
                EnumValue::new("RED").value(Value::from(0)),
                EnumValue::new("GREEN").value(Value::from(1)),
            ],
        );
        let query = ObjectType::new(
            "Query",
            vec![Field::new("f", TypeRef::int())
                .argument(Argument::new("input", TypeRef::named("TestInputObject")))
                .argument(Argument::new("color", TypeRef::named("Color")))],
        );
        Schema::builder(query)
            .register(input)
            .register(color)
            .finish()
            .expect("valid schema")
    }

    fn json(v: serde_json::Value) -> Value {
        Value::from(v)
    }

    #[test]
    fn nested_input_object_coercion_wraps_single_values() {
        let schema = test_schema();
        let t = schema
            .make_type(&TypeRef::named("TestInputObject"))
            .unwrap();

        let coerced = coerce_value(
            &schema,
            &t,
            &json(serde_json::json!({"a": "foo", "b": "bar", "c": "baz"})),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&coerced).unwrap(),
            serde_json::json!({"a": "foo", "b": ["bar"], "c": "baz", "d": 7}),
        );
    }

    #[test]
    fn coercion_is_idempotent() {
        let schema = test_schema();
        let t = schema
            .make_type(&TypeRef::named("TestInputObject"))
            .unwrap();

        let once = coerce_value(
            &schema,
            &t,
            &json(serde_json::json!({"b": ["x", "y"], "c": "z"})),
        )
        .unwrap();
        let twice = coerce_value(&schema, &t, &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn enum_coercion_accepts_names_and_internal_values() {
        let schema = test_schema();
        let t = schema.make_type(&TypeRef::named("Color")).unwrap();

        assert_eq!(
            coerce_value(&schema, &t, &Value::from("GREEN")),
            Ok(Value::from(1)),
        );
        // Already coerced: the internal value passes through.
        assert_eq!(coerce_value(&schema, &t, &Value::from(1)), Ok(Value::from(1)));
        assert!(coerce_value(&schema, &t, &Value::from("BLUE")).is_err());
    }

    #[test]
    fn missing_required_input_field_is_an_error() {
        let schema = test_schema();
        let t = schema
            .make_type(&TypeRef::named("TestInputObject"))
            .unwrap();

        let err = coerce_value(&schema, &t, &json(serde_json::json!({"a": "foo"})))
            .unwrap_err();
        assert_eq!(err, "Missing required field \"c\" of type \"String!\"");
    }

    #[test]
    fn unknown_input_field_is_an_error() {
        let schema = test_schema();
        let t = schema
            .make_type(&TypeRef::named("TestInputObject"))
            .unwrap();

        let err = coerce_value(&schema, &t, &json(serde_json::json!({"c": "x", "z": 1})))
            .unwrap_err();
        assert_eq!(
            err,
            "Field \"z\" does not exist on type \"TestInputObject\"",
        );
    }

    #[test]
    fn literals_evaluate_with_variable_substitution() {
        let schema = test_schema();
        let t = schema.make_type(&TypeRef::string().list()).unwrap();

        let mut variables = Variables::new();
        variables.insert("v".into(), Value::from("b"));

        let literal = crate::ast::InputValue::List(vec![
            Spanning::unlocated(crate::ast::InputValue::String("a".into())),
            Spanning::unlocated(crate::ast::InputValue::variable("v")),
        ]);
        assert_eq!(
            value_from_ast(&schema, &t, &literal, &variables),
            Value::List(vec![Value::from("a"), Value::from("b")]),
        );
    }
}
