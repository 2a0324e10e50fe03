use std::collections::HashMap;

use crate::{
    ast::{Operation, VariableDefinition},
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueVariableNames<'a> {
    names: HashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueVariableNames<'a> {
    UniqueVariableNames {
        names: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for UniqueVariableNames<'a> {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Operation<'a>>,
    ) {
        self.names.clear();
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (var_name, _): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        let pos = var_name.span.start;
        // Duplicates are reported against the first occurrence.
        let first = *self.names.entry(var_name.item).or_insert(pos);
        if first != pos {
            ctx.report_error(&error_message(var_name.item), &[first, pos]);
        }
    }
}

fn error_message(var_name: &str) -> String {
    format!("There can only be one variable named {var_name}")
}
