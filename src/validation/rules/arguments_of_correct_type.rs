use std::{fmt, sync::Arc};

use crate::{
    ast::{Directive, Field, InputValue},
    parser::Spanning,
    schema::meta::Argument,
    validation::{input_value::validate_literal_value, ValidatorContext, Visitor},
};

pub struct ArgumentsOfCorrectType<'a> {
    current_args: Option<&'a Vec<Arc<Argument>>>,
}

pub fn factory<'a>() -> ArgumentsOfCorrectType<'a> {
    ArgumentsOfCorrectType { current_args: None }
}

impl<'a> Visitor<'a> for ArgumentsOfCorrectType<'a> {
    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive<'a>>,
    ) {
        self.current_args = ctx
            .schema
            .directive_by_name(directive.item.name.item)
            .map(|d| &d.arguments);
    }

    fn exit_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive<'a>>) {
        self.current_args = None;
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        self.current_args = ctx
            .parent_type()
            .and_then(|t| {
                ctx.schema
                    .field_on_type(t, field.item.name.item, ctx.introspection_enabled)
            })
            .map(|f| &f.arguments);
    }

    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field<'a>>) {
        self.current_args = None;
    }

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (arg_name, arg_value): &'a (Spanning<&'a str>, Spanning<InputValue>),
    ) {
        let Some(argument_meta) = self
            .current_args
            .and_then(|args| args.iter().find(|a| a.name == arg_name.item))
        else {
            return;
        };

        let Some(meta_type) = ctx.schema.make_type(&argument_meta.arg_type) else {
            return;
        };

        if let Some(err) = validate_literal_value(ctx.schema, &meta_type, &arg_value.item) {
            ctx.report_error(&error_message(arg_name.item, err), &[arg_value.span.start]);
        }
    }
}

fn error_message(arg_name: impl fmt::Display, msg: impl fmt::Display) -> String {
    format!("Invalid value for argument \"{arg_name}\", reason: {msg}")
}
