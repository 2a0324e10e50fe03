use crate::{
    ast::FragmentSpread,
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownFragmentNames;

pub fn factory() -> KnownFragmentNames {
    KnownFragmentNames
}

impl<'a> Visitor<'a> for KnownFragmentNames {
    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        let spread_name = &spread.item.name;
        if !ctx.is_known_fragment(spread_name.item) {
            ctx.report_error(&error_message(spread_name.item), &[spread_name.span.start]);
        }
    }
}

fn error_message(frag_name: &str) -> String {
    format!(r#"Unknown fragment: "{frag_name}""#)
}
