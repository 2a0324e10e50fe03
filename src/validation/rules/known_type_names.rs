use crate::{
    ast::{Fragment, InlineFragment, VariableDefinition},
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct KnownTypeNames;

pub fn factory() -> KnownTypeNames {
    KnownTypeNames
}

impl<'a> Visitor<'a> for KnownTypeNames {
    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<InlineFragment<'a>>,
    ) {
        let Some(type_cond) = &fragment.item.type_condition else {
            return;
        };
        check_known(ctx, type_cond.item, type_cond.span.start);
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment<'a>>,
    ) {
        let type_cond = &fragment.item.type_condition;
        check_known(ctx, type_cond.item, type_cond.span.start);
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (_, var_def): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        let var_type = &var_def.var_type;
        check_known(ctx, var_type.item.innermost_name(), var_type.span.start);
    }
}

fn check_known(ctx: &mut ValidatorContext<'_>, type_name: &str, location: SourcePosition) {
    if ctx.schema.concrete_type_by_name(type_name).is_none() {
        ctx.report_error(&error_message(type_name), &[location]);
    }
}

fn error_message(type_name: &str) -> String {
    format!(r#"Unknown type "{type_name}""#)
}
