use crate::{
    ast::Field,
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct ScalarLeafs;

pub fn factory() -> ScalarLeafs {
    ScalarLeafs
}

impl<'a> Visitor<'a> for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        let Some(field_type) = ctx.current_type() else {
            return;
        };
        let Some(type_literal) = ctx.current_type_literal() else {
            return;
        };

        let field_name = field.item.name.item;
        let has_selection = field.item.selection_set.is_some();

        let message = match (field_type.is_leaf(), has_selection) {
            // Leaves terminate the selection; everything else must recurse.
            (true, true) => no_allowed_error_message(field_name, &type_literal.to_string()),
            (false, false) => required_error_message(field_name, &type_literal.to_string()),
            _ => return,
        };
        ctx.report_error(&message, &[field.span.start]);
    }
}

fn no_allowed_error_message(field_name: &str, type_name: &str) -> String {
    format!(
        r#"Field "{field_name}" must not have a selection since type {type_name} has no subfields"#
    )
}

fn required_error_message(field_name: &str, type_name: &str) -> String {
    format!(
        r#"Field "{field_name}" of type "{type_name}" must have a selection of subfields. Did you mean "{field_name} {{ ... }}"?"#
    )
}
