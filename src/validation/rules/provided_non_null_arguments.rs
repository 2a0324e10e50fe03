use std::sync::Arc;

use crate::{
    ast::{Arguments, Directive, Field},
    parser::Spanning,
    schema::meta::Argument,
    validation::{ValidatorContext, Visitor},
};

pub struct ProvidedNonNullArguments;

pub fn factory() -> ProvidedNonNullArguments {
    ProvidedNonNullArguments
}

impl<'a> Visitor<'a> for ProvidedNonNullArguments {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        let field_name = field.item.name.item;

        let Some(field_meta) = ctx.parent_type().and_then(|t| {
            ctx.schema
                .field_on_type(t, field_name, ctx.introspection_enabled)
        }) else {
            return;
        };

        for meta_arg in missing_required(&field_meta.arguments, field.item.arguments.as_ref()) {
            ctx.report_error(
                &field_error_message(field_name, &meta_arg.name, &meta_arg.arg_type.to_string()),
                &[field.span.start],
            );
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive<'a>>,
    ) {
        let directive_name = directive.item.name.item;

        let Some(directive_meta) = ctx.schema.directive_by_name(directive_name) else {
            return;
        };

        for meta_arg in
            missing_required(&directive_meta.arguments, directive.item.arguments.as_ref())
        {
            ctx.report_error(
                &directive_error_message(
                    directive_name,
                    &meta_arg.name,
                    &meta_arg.arg_type.to_string(),
                ),
                &[directive.span.start],
            );
        }
    }
}

/// Declared arguments that must be supplied but are absent from `provided`.
fn missing_required<'m>(
    declared: &'m [Arc<Argument>],
    provided: Option<&Spanning<Arguments<'_>>>,
) -> Vec<&'m Arc<Argument>> {
    declared
        .iter()
        .filter(|arg| arg.arg_type.is_non_null() && arg.default_value.is_none())
        .filter(|arg| !provided.is_some_and(|args| args.item.get(&arg.name).is_some()))
        .collect()
}

fn field_error_message(field_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        r#"Field "{field_name}" argument "{arg_name}" of type "{type_name}" is required but not provided"#
    )
}

fn directive_error_message(directive_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        r#"Directive "@{directive_name}" argument "{arg_name}" of type "{type_name}" is required but not provided"#
    )
}
