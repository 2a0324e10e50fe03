use std::collections::HashMap;

use crate::{
    ast::Operation,
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueOperationNames<'a> {
    names: HashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueOperationNames<'a> {
    UniqueOperationNames {
        names: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for UniqueOperationNames<'a> {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        let Some(op_name) = &op.item.name else {
            return;
        };

        let pos = op.span.start;
        // Duplicates are reported against the first occurrence.
        let first = *self.names.entry(op_name.item).or_insert(pos);
        if first != pos {
            ctx.report_error(&error_message(op_name.item), &[first, pos]);
        }
    }
}

fn error_message(op_name: &str) -> String {
    format!("There can only be one operation named {op_name}")
}
