use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Document, Fragment, FragmentSpread},
    parser::Spanning,
    validation::{RuleError, ValidatorContext, Visitor},
};

pub struct NoFragmentCycles<'a> {
    current_fragment: Option<&'a str>,
    spreads: HashMap<&'a str, Vec<Spanning<&'a str>>>,
    fragment_order: Vec<&'a str>,
}

/// Depth-first search over the fragment spread graph.
struct CycleDetector<'a> {
    done: HashSet<&'a str>,
    spreads: &'a HashMap<&'a str, Vec<Spanning<&'a str>>>,
    on_path: HashMap<&'a str, usize>,
    errors: Vec<RuleError>,
}

pub fn factory<'a>() -> NoFragmentCycles<'a> {
    NoFragmentCycles {
        current_fragment: None,
        spreads: HashMap::new(),
        fragment_order: Vec::new(),
    }
}

impl<'a> Visitor<'a> for NoFragmentCycles<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document<'a>) {
        assert!(self.current_fragment.is_none());

        let mut detector = CycleDetector {
            done: HashSet::new(),
            spreads: &self.spreads,
            on_path: HashMap::new(),
            errors: Vec::new(),
        };

        for frag in &self.fragment_order {
            if !detector.done.contains(frag) {
                detector.walk(frag, &mut Vec::new());
            }
        }

        ctx.append_errors(detector.errors);
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment<'a>>,
    ) {
        assert!(self.current_fragment.is_none());

        let fragment_name = fragment.item.name.item;
        self.current_fragment = Some(fragment_name);
        self.fragment_order.push(fragment_name);
    }

    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment<'a>>,
    ) {
        assert_eq!(Some(fragment.item.name.item), self.current_fragment);
        self.current_fragment = None;
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        if let Some(current_fragment) = self.current_fragment {
            self.spreads
                .entry(current_fragment)
                .or_default()
                .push(Spanning::new(spread.span, spread.item.name.item));
        }
    }
}

impl<'a> CycleDetector<'a> {
    fn walk(&mut self, from: &'a str, path: &mut Vec<&'a Spanning<&'a str>>) {
        self.done.insert(from);

        let Some(spreads) = self.spreads.get(from) else {
            return;
        };

        self.on_path.insert(from, path.len());

        for spread in spreads {
            let name = spread.item;

            match self.on_path.get(name).copied() {
                Some(index) => {
                    // Report the cycle at the spread that closes it.
                    let at = if index < path.len() {
                        path[index]
                    } else {
                        spread
                    };
                    self.errors
                        .push(RuleError::new(&error_message(name), &[at.span.start]));
                }
                None if !self.done.contains(name) => {
                    path.push(spread);
                    self.walk(name, path);
                    path.pop();
                }
                None => {}
            }
        }

        self.on_path.remove(from);
    }
}

fn error_message(frag_name: &str) -> String {
    format!(r#"Cannot spread fragment "{frag_name}""#)
}
