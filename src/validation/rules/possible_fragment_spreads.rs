use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    ast::{Definition, Document, FragmentSpread, InlineFragment},
    parser::Spanning,
    schema::meta::NamedType,
    validation::{ValidatorContext, Visitor},
};

pub struct PossibleFragmentSpreads<'a> {
    fragment_types: HashMap<&'a str, &'a Arc<NamedType>>,
}

pub fn factory<'a>() -> PossibleFragmentSpreads<'a> {
    PossibleFragmentSpreads {
        fragment_types: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for PossibleFragmentSpreads<'a> {
    fn enter_document(&mut self, ctx: &mut ValidatorContext<'a>, defs: &'a Document<'a>) {
        for def in defs {
            let Definition::Fragment(frag) = def else {
                continue;
            };
            if let Some(t) = ctx
                .schema
                .concrete_type_by_name(frag.item.type_condition.item)
            {
                self.fragment_types.insert(frag.item.name.item, t);
            }
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        frag: &'a Spanning<InlineFragment<'a>>,
    ) {
        let Some(parent_type) = ctx.parent_type() else {
            return;
        };
        let Some(frag_type) = frag
            .item
            .type_condition
            .as_ref()
            .and_then(|s| ctx.schema.concrete_type_by_name(s.item))
        else {
            return;
        };

        if !ctx.schema.type_overlap(parent_type, frag_type) {
            ctx.report_error(
                &error_message(None, parent_type.name(), frag_type.name()),
                &[frag.span.start],
            );
        }
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        let Some(parent_type) = ctx.parent_type() else {
            return;
        };
        let Some(frag_type) = self.fragment_types.get(spread.item.name.item).copied() else {
            return;
        };

        if !ctx.schema.type_overlap(parent_type, frag_type) {
            ctx.report_error(
                &error_message(
                    Some(spread.item.name.item),
                    parent_type.name(),
                    frag_type.name(),
                ),
                &[spread.span.start],
            );
        }
    }
}

fn error_message(frag_name: Option<&str>, parent_type_name: &str, frag_type: &str) -> String {
    if let Some(frag_name) = frag_name {
        format!(
            r#"Fragment "{frag_name}" cannot be spread here as objects of type "{parent_type_name}" can never be of type "{frag_type}""#
        )
    } else {
        format!(
            r#"Fragment cannot be spread here as objects of type "{parent_type_name}" can never be of type "{frag_type}""#
        )
    }
}
