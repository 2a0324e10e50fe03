use crate::{
    ast::{Definition, Document, Operation},
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct LoneAnonymousOperation {
    operation_count: Option<usize>,
}

pub fn factory() -> LoneAnonymousOperation {
    LoneAnonymousOperation {
        operation_count: None,
    }
}

impl<'a> Visitor<'a> for LoneAnonymousOperation {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
        self.operation_count = Some(
            doc.iter()
                .filter(|d| matches!(d, Definition::Operation(_)))
                .count(),
        );
    }

    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        let anonymous = op.item.name.is_none();
        if anonymous && self.operation_count.is_some_and(|count| count > 1) {
            ctx.report_error(error_message(), &[op.span.start]);
        }
    }
}

fn error_message() -> &'static str {
    "This anonymous operation must be the only defined operation"
}
