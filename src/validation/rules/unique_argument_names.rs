use std::collections::HashMap;

use crate::{
    ast::{Directive, Field, InputValue},
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueArgumentNames<'a> {
    known_names: HashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueArgumentNames<'a> {
    UniqueArgumentNames {
        known_names: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for UniqueArgumentNames<'a> {
    fn enter_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive<'a>>) {
        self.known_names.clear();
    }

    fn enter_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field<'a>>) {
        self.known_names.clear();
    }

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (arg_name, _): &'a (Spanning<&'a str>, Spanning<InputValue>),
    ) {
        let pos = arg_name.span.start;
        let first = *self.known_names.entry(arg_name.item).or_insert(pos);
        if first != pos {
            ctx.report_error(&error_message(arg_name.item), &[first, pos]);
        }
    }
}

fn error_message(arg_name: &str) -> String {
    format!(r#"There can only be one argument named "{arg_name}""#)
}
