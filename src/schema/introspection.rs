//! The `__Schema` family of types and their resolvers
//!
//! Introspection runs through the ordinary execution pipeline. The resolvers
//! below hand reflection handles down as opaque host objects and pick them
//! apart again one level deeper.

use std::sync::Arc;

use arcstr::ArcStr;

use crate::{
    ast::InputValue,
    error::FieldError,
    executor::{ResolverArgs, ResolverContext},
    schema::meta::{
        Argument, DirectiveLocation, DirectiveType, EnumType, EnumValue, Field, NamedType,
        ObjectType, TypeRef,
    },
    value::{Resolved, Value},
};

/// Marker source value for the `__schema` meta field.
pub(crate) struct SchemaHandle;

/// Source value describing one (possibly wrapped) type.
pub(crate) struct TypeHandle(pub(crate) TypeRef);

fn host<'a, T: std::any::Any + Send + Sync>(
    ctx: &'a ResolverContext<'_>,
) -> Result<&'a T, FieldError> {
    ctx.source()
        .downcast_host::<T>()
        .ok_or_else(|| FieldError::internal("introspection resolver got an unexpected source"))
}

fn named_type<'a>(
    ctx: &'a ResolverContext<'_>,
    name: &str,
) -> Result<&'a Arc<NamedType>, FieldError> {
    ctx.schema()
        .concrete_type_by_name(name)
        .ok_or_else(|| FieldError::internal(format!("type \"{name}\" missing from schema")))
}

fn type_handle(name: &ArcStr) -> Resolved {
    Resolved::host(TypeHandle(TypeRef::Named(name.clone())))
}

fn include_deprecated(args: &ResolverArgs<'_>) -> bool {
    args.get("includeDeprecated")
        .and_then(Value::as_bool_value)
        .unwrap_or(false)
}

pub(crate) fn typename_meta_field() -> Field {
    // Resolved directly by the executor, after abstract types have been
    // narrowed to the concrete object.
    Field::new(arcstr::literal!("__typename"), TypeRef::string().non_null())
        .description(arcstr::literal!("The name of the current Object type at runtime."))
}

pub(crate) fn schema_meta_field() -> Field {
    Field::new(
        arcstr::literal!("__schema"),
        TypeRef::named("__Schema").non_null(),
    )
    .description(arcstr::literal!("Access the current type schema of this server."))
    .resolver(|_, _| Ok(Resolved::host(SchemaHandle)))
}

pub(crate) fn type_meta_field() -> Field {
    Field::new(arcstr::literal!("__type"), TypeRef::named("__Type"))
        .description(arcstr::literal!("Request the type information of a single type."))
        .argument(Argument::new(
            arcstr::literal!("name"),
            TypeRef::string().non_null(),
        ))
        .resolver(|ctx, args| {
            let name = args
                .get("name")
                .and_then(Value::as_string_value)
                .ok_or_else(|| FieldError::internal("__type requires a name argument"))?;
            Ok(match ctx.schema().concrete_type_by_name(name) {
                Some(t) => type_handle(t.name()),
                None => Resolved::null(),
            })
        })
}

/// Every type backing the `__schema` and `__type` meta fields.
pub(crate) fn meta_types() -> Vec<NamedType> {
    vec![
        schema_type().into(),
        type_type().into(),
        field_type().into(),
        input_value_type().into(),
        enum_value_type().into(),
        directive_type().into(),
        type_kind_enum().into(),
        directive_location_enum().into(),
    ]
}

fn schema_type() -> ObjectType {
    ObjectType::new(
        arcstr::literal!("__Schema"),
        vec![
            Field::new(arcstr::literal!("description"), TypeRef::string())
                .resolver(|_, _| Ok(Resolved::null())),
            Field::new(
                arcstr::literal!("types"),
                TypeRef::named("__Type").non_null().list().non_null(),
            )
            .description(arcstr::literal!("A list of all types supported by this server."))
            .resolver(|ctx, _| {
                host::<SchemaHandle>(ctx)?;
                Ok(Resolved::List(
                    ctx.schema()
                        .type_list()
                        .into_iter()
                        .map(|t| type_handle(t.name()))
                        .collect(),
                ))
            }),
            Field::new(
                arcstr::literal!("queryType"),
                TypeRef::named("__Type").non_null(),
            )
            .description(arcstr::literal!("The type that query operations will be rooted at."))
            .resolver(|ctx, _| {
                host::<SchemaHandle>(ctx)?;
                Ok(type_handle(ctx.schema().query_type().name()))
            }),
            Field::new(arcstr::literal!("mutationType"), TypeRef::named("__Type"))
                .description(arcstr::literal!(
                    "If this server supports mutation, the type that mutation operations will be rooted at."
                ))
                .resolver(|ctx, _| {
                    host::<SchemaHandle>(ctx)?;
                    Ok(match ctx.schema().mutation_type() {
                        Some(t) => type_handle(t.name()),
                        None => Resolved::null(),
                    })
                }),
            Field::new(
                arcstr::literal!("subscriptionType"),
                TypeRef::named("__Type"),
            )
            .description(arcstr::literal!(
                "If this server supports subscription, the type that subscription operations will be rooted at."
            ))
            .resolver(|ctx, _| {
                host::<SchemaHandle>(ctx)?;
                Ok(match ctx.schema().subscription_type() {
                    Some(t) => type_handle(t.name()),
                    None => Resolved::null(),
                })
            }),
            Field::new(
                arcstr::literal!("directives"),
                TypeRef::named("__Directive").non_null().list().non_null(),
            )
            .description(arcstr::literal!("A list of all directives supported by this server."))
            .resolver(|ctx, _| {
                host::<SchemaHandle>(ctx)?;
                Ok(Resolved::List(
                    ctx.schema()
                        .directive_list()
                        .iter()
                        .map(|d| Resolved::host(d.clone()))
                        .collect(),
                ))
            }),
        ],
    )
    .description(arcstr::literal!(
        "A GraphQL Schema defines the capabilities of a GraphQL server. It exposes all \
         available types and directives on the server, as well as the entry points for \
         query, mutation, and subscription operations."
    ))
}

fn type_type() -> ObjectType {
    ObjectType::new(
        arcstr::literal!("__Type"),
        vec![
            Field::new(
                arcstr::literal!("kind"),
                TypeRef::named("__TypeKind").non_null(),
            )
            .resolver(|ctx, _| {
                let handle: &TypeHandle = host(ctx)?;
                let kind = match &handle.0 {
                    TypeRef::Named(name) => named_type(ctx, name)?.kind().as_str(),
                    TypeRef::List(_) => "LIST",
                    TypeRef::NonNull(_) => "NON_NULL",
                };
                Ok(Value::from(kind).into())
            }),
            Field::new(arcstr::literal!("name"), TypeRef::string()).resolver(|ctx, _| {
                let handle: &TypeHandle = host(ctx)?;
                Ok(match &handle.0 {
                    TypeRef::Named(name) => Value::from(name.as_str()).into(),
                    _ => Resolved::null(),
                })
            }),
            Field::new(arcstr::literal!("description"), TypeRef::string()).resolver(|ctx, _| {
                let handle: &TypeHandle = host(ctx)?;
                Ok(match &handle.0 {
                    TypeRef::Named(name) => named_type(ctx, name)?
                        .description()
                        .map(|d| Value::from(d.as_str()))
                        .into(),
                    _ => Resolved::null(),
                })
            }),
            Field::new(
                arcstr::literal!("fields"),
                TypeRef::named("__Field").non_null().list(),
            )
            .argument(
                Argument::new(arcstr::literal!("includeDeprecated"), TypeRef::boolean())
                    .default_value(InputValue::Boolean(false)),
            )
            .resolver(|ctx, args| {
                let handle: &TypeHandle = host(ctx)?;
                let include = include_deprecated(&args);
                let TypeRef::Named(name) = &handle.0 else {
                    return Ok(Resolved::null());
                };
                Ok(match named_type(ctx, name)?.fields() {
                    Some(fields) => Resolved::List(
                        fields
                            .values()
                            .filter(|f| include || f.deprecation_reason.is_none())
                            .map(|f| Resolved::host(f.clone()))
                            .collect(),
                    ),
                    None => Resolved::null(),
                })
            }),
            Field::new(
                arcstr::literal!("interfaces"),
                TypeRef::named("__Type").non_null().list(),
            )
            .resolver(|ctx, _| {
                let handle: &TypeHandle = host(ctx)?;
                let TypeRef::Named(name) = &handle.0 else {
                    return Ok(Resolved::null());
                };
                Ok(match &**named_type(ctx, name)? {
                    NamedType::Object(o) => Resolved::List(
                        o.interface_names().iter().map(type_handle).collect(),
                    ),
                    _ => Resolved::null(),
                })
            }),
            Field::new(
                arcstr::literal!("possibleTypes"),
                TypeRef::named("__Type").non_null().list(),
            )
            .resolver(|ctx, _| {
                let handle: &TypeHandle = host(ctx)?;
                let TypeRef::Named(name) = &handle.0 else {
                    return Ok(Resolved::null());
                };
                if !named_type(ctx, name)?.is_abstract() {
                    return Ok(Resolved::null());
                }
                Ok(Resolved::List(
                    ctx.schema()
                        .possible_type_names(name)
                        .iter()
                        .map(type_handle)
                        .collect(),
                ))
            }),
            Field::new(
                arcstr::literal!("enumValues"),
                TypeRef::named("__EnumValue").non_null().list(),
            )
            .argument(
                Argument::new(arcstr::literal!("includeDeprecated"), TypeRef::boolean())
                    .default_value(InputValue::Boolean(false)),
            )
            .resolver(|ctx, args| {
                let handle: &TypeHandle = host(ctx)?;
                let include = include_deprecated(&args);
                let TypeRef::Named(name) = &handle.0 else {
                    return Ok(Resolved::null());
                };
                Ok(match &**named_type(ctx, name)? {
                    NamedType::Enum(e) => Resolved::List(
                        e.values
                            .iter()
                            .filter(|v| include || v.deprecation_reason.is_none())
                            .map(|v| Resolved::host(v.clone()))
                            .collect(),
                    ),
                    _ => Resolved::null(),
                })
            }),
            Field::new(
                arcstr::literal!("inputFields"),
                TypeRef::named("__InputValue").non_null().list(),
            )
            .resolver(|ctx, _| {
                let handle: &TypeHandle = host(ctx)?;
                let TypeRef::Named(name) = &handle.0 else {
                    return Ok(Resolved::null());
                };
                Ok(match &**named_type(ctx, name)? {
                    NamedType::InputObject(io) => Resolved::List(
                        io.input_fields
                            .iter()
                            .map(|f| Resolved::host(f.clone()))
                            .collect(),
                    ),
                    _ => Resolved::null(),
                })
            }),
            Field::new(arcstr::literal!("ofType"), TypeRef::named("__Type")).resolver(
                |ctx, _| {
                    let handle: &TypeHandle = host(ctx)?;
                    Ok(match &handle.0 {
                        TypeRef::Named(_) => Resolved::null(),
                        TypeRef::List(inner) | TypeRef::NonNull(inner) => {
                            Resolved::host(TypeHandle((**inner).clone()))
                        }
                    })
                },
            ),
        ],
    )
    .description(arcstr::literal!(
        "The fundamental unit of any GraphQL Schema is the type. There are many kinds of \
         types in GraphQL. Depending on the kind of a type, certain fields describe \
         information about that type. Scalar types provide no information beyond a name \
         and description, while Enum types provide their values. Object and Interface \
         types provide the fields they describe. Abstract types, Union and Interface, \
         provide the Object types possible at runtime. List and NonNull types compose \
         other types."
    ))
}

fn field_type() -> ObjectType {
    ObjectType::new(
        arcstr::literal!("__Field"),
        vec![
            Field::new(arcstr::literal!("name"), TypeRef::string().non_null()).resolver(
                |ctx, _| {
                    let field: &Arc<Field> = host(ctx)?;
                    Ok(Value::from(field.name.as_str()).into())
                },
            ),
            Field::new(arcstr::literal!("description"), TypeRef::string()).resolver(|ctx, _| {
                let field: &Arc<Field> = host(ctx)?;
                Ok(field
                    .description
                    .as_ref()
                    .map(|d| Value::from(d.as_str()))
                    .into())
            }),
            Field::new(
                arcstr::literal!("args"),
                TypeRef::named("__InputValue").non_null().list().non_null(),
            )
            .resolver(|ctx, _| {
                let field: &Arc<Field> = host(ctx)?;
                Ok(Resolved::List(
                    field
                        .arguments
                        .iter()
                        .map(|a| Resolved::host(a.clone()))
                        .collect(),
                ))
            }),
            Field::new(
                arcstr::literal!("type"),
                TypeRef::named("__Type").non_null(),
            )
            .resolver(|ctx, _| {
                let field: &Arc<Field> = host(ctx)?;
                Ok(Resolved::host(TypeHandle(field.field_type.clone())))
            }),
            Field::new(
                arcstr::literal!("isDeprecated"),
                TypeRef::boolean().non_null(),
            )
            .resolver(|ctx, _| {
                let field: &Arc<Field> = host(ctx)?;
                Ok(Value::from(field.deprecation_reason.is_some()).into())
            }),
            Field::new(arcstr::literal!("deprecationReason"), TypeRef::string()).resolver(
                |ctx, _| {
                    let field: &Arc<Field> = host(ctx)?;
                    Ok(field
                        .deprecation_reason
                        .as_ref()
                        .map(|r| Value::from(r.as_str()))
                        .into())
                },
            ),
        ],
    )
    .description(arcstr::literal!(
        "Object and Interface types are described by a list of Fields, each of which has \
         a name, potentially a list of arguments, and a return type."
    ))
}

fn input_value_type() -> ObjectType {
    ObjectType::new(
        arcstr::literal!("__InputValue"),
        vec![
            Field::new(arcstr::literal!("name"), TypeRef::string().non_null()).resolver(
                |ctx, _| {
                    let arg: &Arc<Argument> = host(ctx)?;
                    Ok(Value::from(arg.name.as_str()).into())
                },
            ),
            Field::new(arcstr::literal!("description"), TypeRef::string()).resolver(|ctx, _| {
                let arg: &Arc<Argument> = host(ctx)?;
                Ok(arg
                    .description
                    .as_ref()
                    .map(|d| Value::from(d.as_str()))
                    .into())
            }),
            Field::new(
                arcstr::literal!("type"),
                TypeRef::named("__Type").non_null(),
            )
            .resolver(|ctx, _| {
                let arg: &Arc<Argument> = host(ctx)?;
                Ok(Resolved::host(TypeHandle(arg.arg_type.clone())))
            }),
            Field::new(arcstr::literal!("defaultValue"), TypeRef::string())
                .description(arcstr::literal!(
                    "A GraphQL-formatted string representing the default value for this input value."
                ))
                .resolver(|ctx, _| {
                    let arg: &Arc<Argument> = host(ctx)?;
                    Ok(arg
                        .default_value
                        .as_ref()
                        .map(|v| Value::from(v.to_string()))
                        .into())
                }),
        ],
    )
    .description(arcstr::literal!(
        "Arguments provided to Fields or Directives and the input fields of an \
         InputObject are represented as Input Values which describe their type and \
         optionally a default value."
    ))
}

fn enum_value_type() -> ObjectType {
    ObjectType::new(
        arcstr::literal!("__EnumValue"),
        vec![
            Field::new(arcstr::literal!("name"), TypeRef::string().non_null()).resolver(
                |ctx, _| {
                    let value: &Arc<EnumValue> = host(ctx)?;
                    Ok(Value::from(value.name.as_str()).into())
                },
            ),
            Field::new(arcstr::literal!("description"), TypeRef::string()).resolver(|ctx, _| {
                let value: &Arc<EnumValue> = host(ctx)?;
                Ok(value
                    .description
                    .as_ref()
                    .map(|d| Value::from(d.as_str()))
                    .into())
            }),
            Field::new(
                arcstr::literal!("isDeprecated"),
                TypeRef::boolean().non_null(),
            )
            .resolver(|ctx, _| {
                let value: &Arc<EnumValue> = host(ctx)?;
                Ok(Value::from(value.deprecation_reason.is_some()).into())
            }),
            Field::new(arcstr::literal!("deprecationReason"), TypeRef::string()).resolver(
                |ctx, _| {
                    let value: &Arc<EnumValue> = host(ctx)?;
                    Ok(value
                        .deprecation_reason
                        .as_ref()
                        .map(|r| Value::from(r.as_str()))
                        .into())
                },
            ),
        ],
    )
    .description(arcstr::literal!(
        "One possible value for a given Enum. Enum values are unique values, not a \
         placeholder for a string or numeric value. However an Enum value is returned in \
         a JSON response as a string."
    ))
}

fn directive_type() -> ObjectType {
    ObjectType::new(
        arcstr::literal!("__Directive"),
        vec![
            Field::new(arcstr::literal!("name"), TypeRef::string().non_null()).resolver(
                |ctx, _| {
                    let directive: &Arc<DirectiveType> = host(ctx)?;
                    Ok(Value::from(directive.name.as_str()).into())
                },
            ),
            Field::new(arcstr::literal!("description"), TypeRef::string()).resolver(|ctx, _| {
                let directive: &Arc<DirectiveType> = host(ctx)?;
                Ok(directive
                    .description
                    .as_ref()
                    .map(|d| Value::from(d.as_str()))
                    .into())
            }),
            Field::new(
                arcstr::literal!("locations"),
                TypeRef::named("__DirectiveLocation")
                    .non_null()
                    .list()
                    .non_null(),
            )
            .resolver(|ctx, _| {
                let directive: &Arc<DirectiveType> = host(ctx)?;
                Ok(Value::List(
                    directive
                        .locations
                        .iter()
                        .map(|l| Value::from(l.as_str()))
                        .collect(),
                )
                .into())
            }),
            Field::new(
                arcstr::literal!("args"),
                TypeRef::named("__InputValue").non_null().list().non_null(),
            )
            .resolver(|ctx, _| {
                let directive: &Arc<DirectiveType> = host(ctx)?;
                Ok(Resolved::List(
                    directive
                        .arguments
                        .iter()
                        .map(|a| Resolved::host(a.clone()))
                        .collect(),
                ))
            }),
        ],
    )
    .description(arcstr::literal!(
        "A Directive provides a way to describe alternate runtime execution and type \
         validation behavior in a GraphQL document."
    ))
}

fn type_kind_enum() -> EnumType {
    EnumType::new(
        arcstr::literal!("__TypeKind"),
        vec![
            EnumValue::new("SCALAR")
                .description(arcstr::literal!("Indicates this type is a scalar.")),
            EnumValue::new("OBJECT").description(arcstr::literal!(
                "Indicates this type is an object. `fields` and `interfaces` are valid fields."
            )),
            EnumValue::new("INTERFACE").description(arcstr::literal!(
                "Indicates this type is an interface. `fields` and `possibleTypes` are valid fields."
            )),
            EnumValue::new("UNION").description(arcstr::literal!(
                "Indicates this type is a union. `possibleTypes` is a valid field."
            )),
            EnumValue::new("ENUM").description(arcstr::literal!(
                "Indicates this type is an enum. `enumValues` is a valid field."
            )),
            EnumValue::new("INPUT_OBJECT").description(arcstr::literal!(
                "Indicates this type is an input object. `inputFields` is a valid field."
            )),
            EnumValue::new("LIST").description(arcstr::literal!(
                "Indicates this type is a list. `ofType` is a valid field."
            )),
            EnumValue::new("NON_NULL").description(arcstr::literal!(
                "Indicates this type is a non-null. `ofType` is a valid field."
            )),
        ],
    )
    .description(arcstr::literal!("An enum describing what kind of type a given `__Type` is."))
}

fn directive_location_enum() -> EnumType {
    let locations = [
        DirectiveLocation::Query,
        DirectiveLocation::Mutation,
        DirectiveLocation::Subscription,
        DirectiveLocation::Field,
        DirectiveLocation::FragmentDefinition,
        DirectiveLocation::FragmentSpread,
        DirectiveLocation::InlineFragment,
        DirectiveLocation::Schema,
        DirectiveLocation::Scalar,
        DirectiveLocation::Object,
        DirectiveLocation::FieldDefinition,
        DirectiveLocation::ArgumentDefinition,
        DirectiveLocation::Interface,
        DirectiveLocation::Union,
        DirectiveLocation::Enum,
        DirectiveLocation::EnumValue,
        DirectiveLocation::InputObject,
        DirectiveLocation::InputFieldDefinition,
    ];

    EnumType::new(
        arcstr::literal!("__DirectiveLocation"),
        locations
            .into_iter()
            .map(|l| EnumValue::new(l.as_str()))
            .collect(),
    )
    .description(arcstr::literal!(
        "A Directive can be adjacent to many parts of the GraphQL language, a \
         __DirectiveLocation describes one such possible adjacency."
    ))
}
