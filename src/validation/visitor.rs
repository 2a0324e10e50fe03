use std::{borrow::Cow, sync::Arc};

use crate::{
    ast::{
        Arguments, Definition, Directive, Document, Field, InlineFragment, InputValue,
        OperationType, Selection, Type, VariableDefinitions,
    },
    parser::Spanning,
    schema::meta::Argument,
    validation::{ValidatorContext, Visitor},
};

/// Walks the document, keeping the context's type cursor in lock-step
/// with the traversal. Every `with_pushed_*` scope pops on the way out,
/// so the cursor is balanced even when a hook reports errors.
#[doc(hidden)]
pub fn visit<'a, V: Visitor<'a>>(
    visitor: &mut V,
    ctx: &mut ValidatorContext<'a>,
    doc: &'a Document<'a>,
) {
    visitor.enter_document(ctx, doc);
    for def in doc {
        visit_definition(visitor, ctx, def);
    }
    visitor.exit_document(ctx, doc);
}

fn visit_definition<'a, V: Visitor<'a>>(
    visitor: &mut V,
    ctx: &mut ValidatorContext<'a>,
    def: &'a Definition<'a>,
) {
    let def_type = definition_type(ctx, def);

    ctx.with_pushed_type(def_type.as_ref(), |ctx| match def {
        Definition::Operation(op) => {
            visitor.enter_operation_definition(ctx, op);
            visit_variable_definitions(visitor, ctx, &op.item.variable_definitions);
            visit_directives(visitor, ctx, &op.item.directives);
            visit_selection_set(visitor, ctx, &op.item.selection_set);
            visitor.exit_operation_definition(ctx, op);
        }
        Definition::Fragment(fragment) => {
            visitor.enter_fragment_definition(ctx, fragment);
            visit_directives(visitor, ctx, &fragment.item.directives);
            visit_selection_set(visitor, ctx, &fragment.item.selection_set);
            visitor.exit_fragment_definition(ctx, fragment);
        }
    });
}

/// The root type a definition's selections start from, as a type literal.
fn definition_type<'a>(
    ctx: &ValidatorContext<'a>,
    def: &'a Definition<'a>,
) -> Option<Type<'a>> {
    match def {
        Definition::Fragment(fragment) => Some(Type::NonNullNamed(Cow::Borrowed(
            fragment.item.type_condition.item,
        ))),
        Definition::Operation(op) => {
            let root = match op.item.operation_type {
                OperationType::Query => Some(ctx.schema.query_type()),
                OperationType::Mutation => ctx.schema.mutation_type(),
                OperationType::Subscription => ctx.schema.subscription_type(),
            };
            root.map(|t| Type::NonNullNamed(Cow::Borrowed(t.name().as_str())))
        }
    }
}

fn visit_variable_definitions<'a, V: Visitor<'a>>(
    visitor: &mut V,
    ctx: &mut ValidatorContext<'a>,
    defs: &'a Option<Spanning<VariableDefinitions<'a>>>,
) {
    let Some(defs) = defs else { return };

    for def in defs.item.iter() {
        let var_type = def.1.var_type.item.clone();

        ctx.with_pushed_input_type(Some(&var_type), |ctx| {
            visitor.enter_variable_definition(ctx, def);
            if let Some(default_value) = &def.1.default_value {
                visit_input_value(visitor, ctx, default_value);
            }
            visitor.exit_variable_definition(ctx, def);
        });
    }
}

fn visit_directives<'a, V: Visitor<'a>>(
    visitor: &mut V,
    ctx: &mut ValidatorContext<'a>,
    directives: &'a Option<Vec<Spanning<Directive<'a>>>>,
) {
    for directive in directives.iter().flatten() {
        let declared_args = ctx
            .schema
            .directive_by_name(directive.item.name.item)
            .map(|d| &d.arguments);

        visitor.enter_directive(ctx, directive);
        visit_arguments(visitor, ctx, declared_args, &directive.item.arguments);
        visitor.exit_directive(ctx, directive);
    }
}

fn visit_arguments<'a, V: Visitor<'a>>(
    visitor: &mut V,
    ctx: &mut ValidatorContext<'a>,
    declared_args: Option<&'a Vec<Arc<Argument>>>,
    arguments: &'a Option<Spanning<Arguments<'a>>>,
) {
    let Some(arguments) = arguments else { return };

    for argument in arguments.item.iter() {
        let arg_type = declared_args
            .and_then(|args| args.iter().find(|a| a.name == argument.0.item))
            .map(|a| a.arg_type.to_ast());

        ctx.with_pushed_input_type(arg_type.as_ref(), |ctx| {
            visitor.enter_argument(ctx, argument);
            visit_input_value(visitor, ctx, &argument.1);
            visitor.exit_argument(ctx, argument);
        });
    }
}

fn visit_selection_set<'a, V: Visitor<'a>>(
    visitor: &mut V,
    ctx: &mut ValidatorContext<'a>,
    selection_set: &'a [Selection<'a>],
) {
    ctx.with_pushed_parent_type(|ctx| {
        visitor.enter_selection_set(ctx, selection_set);
        for selection in selection_set {
            match selection {
                Selection::Field(field) => visit_field(visitor, ctx, field),
                Selection::FragmentSpread(spread) => {
                    visitor.enter_fragment_spread(ctx, spread);
                    visit_directives(visitor, ctx, &spread.item.directives);
                    visitor.exit_fragment_spread(ctx, spread);
                }
                Selection::InlineFragment(fragment) => {
                    visit_inline_fragment(visitor, ctx, fragment);
                }
            }
        }
        visitor.exit_selection_set(ctx, selection_set);
    });
}

fn visit_field<'a, V: Visitor<'a>>(
    visitor: &mut V,
    ctx: &mut ValidatorContext<'a>,
    field: &'a Spanning<Field<'a>>,
) {
    let field_def = ctx.parent_type().and_then(|t| {
        ctx.schema
            .field_on_type(t, field.item.name.item, ctx.introspection_enabled)
    });
    let field_type = field_def.map(|f| f.field_type.to_ast());
    let field_args = field_def.map(|f| &f.arguments);

    ctx.with_pushed_type(field_type.as_ref(), |ctx| {
        visitor.enter_field(ctx, field);

        visit_arguments(visitor, ctx, field_args, &field.item.arguments);
        visit_directives(visitor, ctx, &field.item.directives);
        if let Some(selection_set) = &field.item.selection_set {
            visit_selection_set(visitor, ctx, selection_set);
        }

        visitor.exit_field(ctx, field);
    });
}

fn visit_inline_fragment<'a, V: Visitor<'a>>(
    visitor: &mut V,
    ctx: &mut ValidatorContext<'a>,
    fragment: &'a Spanning<InlineFragment<'a>>,
) {
    let mut descend = move |ctx: &mut ValidatorContext<'a>| {
        visitor.enter_inline_fragment(ctx, fragment);
        visit_directives(visitor, ctx, &fragment.item.directives);
        visit_selection_set(visitor, ctx, &fragment.item.selection_set);
        visitor.exit_inline_fragment(ctx, fragment);
    };

    // An untyped inline fragment keeps its parent's type cursor.
    match fragment.item.type_condition {
        Some(Spanning {
            item: type_name, ..
        }) => ctx.with_pushed_type(Some(&Type::NonNullNamed(Cow::Borrowed(type_name))), descend),
        None => descend(ctx),
    }
}

fn visit_input_value<'a, V: Visitor<'a>>(
    visitor: &mut V,
    ctx: &mut ValidatorContext<'a>,
    input_value: &'a Spanning<InputValue>,
) {
    input_value_hook(visitor, ctx, input_value, true);

    match &input_value.item {
        InputValue::Object(fields) => {
            for field in fields {
                let field_type = ctx
                    .current_input_type_literal()
                    .and_then(|t| match t {
                        Type::NonNullNamed(name) | Type::Named(name) => {
                            ctx.schema.concrete_type_by_name(name)
                        }
                        _ => None,
                    })
                    .and_then(|ct| ct.input_field_by_name(&field.0.item))
                    .map(|f| f.arg_type.to_ast());

                ctx.with_pushed_input_type(field_type.as_ref(), |ctx| {
                    visitor.enter_object_field(ctx, field);
                    visit_input_value(visitor, ctx, &field.1);
                    visitor.exit_object_field(ctx, field);
                });
            }
        }
        InputValue::List(items) => {
            let element_type = ctx.current_input_type_literal().and_then(|t| match t {
                Type::List(inner) | Type::NonNullList(inner) => Some(inner.as_ref().clone()),
                _ => None,
            });

            ctx.with_pushed_input_type(element_type.as_ref(), |ctx| {
                for item in items {
                    visit_input_value(visitor, ctx, item);
                }
            });
        }
        _ => (),
    }

    input_value_hook(visitor, ctx, input_value, false);
}

/// Dispatches one enter or exit hook for a literal, re-wrapped in its span.
fn input_value_hook<'a, V: Visitor<'a>>(
    visitor: &mut V,
    ctx: &mut ValidatorContext<'a>,
    input_value: &'a Spanning<InputValue>,
    entering: bool,
) {
    let span = input_value.span;

    macro_rules! hook {
        ($enter:ident, $exit:ident, $item:expr) => {
            if entering {
                visitor.$enter(ctx, Spanning::new(span, $item));
            } else {
                visitor.$exit(ctx, Spanning::new(span, $item));
            }
        };
    }

    match &input_value.item {
        InputValue::Null => hook!(enter_null_value, exit_null_value, ()),
        InputValue::Int(i) => hook!(enter_int_value, exit_int_value, *i),
        InputValue::Float(f) => hook!(enter_float_value, exit_float_value, *f),
        InputValue::String(s) => hook!(enter_string_value, exit_string_value, s),
        InputValue::Boolean(b) => hook!(enter_boolean_value, exit_boolean_value, *b),
        InputValue::Enum(s) => hook!(enter_enum_value, exit_enum_value, s),
        InputValue::Variable(s) => hook!(enter_variable_value, exit_variable_value, s),
        InputValue::List(l) => hook!(enter_list_value, exit_list_value, l),
        InputValue::Object(o) => hook!(enter_object_value, exit_object_value, o),
    }
}
