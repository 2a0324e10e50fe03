use crate::{
    ast::{Fragment, InlineFragment},
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct FragmentsOnCompositeTypes;

pub fn factory() -> FragmentsOnCompositeTypes {
    FragmentsOnCompositeTypes
}

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        let Some(current_type) = ctx.current_type() else {
            return;
        };

        if !current_type.is_composite() {
            ctx.report_error(
                &error_message(Some(f.item.name.item), current_type.name()),
                &[f.item.type_condition.span.start],
            );
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<InlineFragment<'a>>,
    ) {
        let Some(type_cond) = &f.item.type_condition else {
            return;
        };
        let Some(current_type) = ctx.current_type() else {
            return;
        };

        if !current_type.is_composite() {
            ctx.report_error(
                &error_message(None, current_type.name()),
                &[type_cond.span.start],
            );
        }
    }
}

fn error_message(fragment_name: Option<&str>, on_type: &str) -> String {
    if let Some(name) = fragment_name {
        format!(r#"Fragment "{name}" cannot condition non composite type "{on_type}"#)
    } else {
        format!(r#"Fragment cannot condition on non composite type "{on_type}""#)
    }
}
