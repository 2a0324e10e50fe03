use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Definition, Document, Fragment, FragmentSpread, Operation},
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

pub fn factory<'a>() -> NoUnusedFragments<'a> {
    NoUnusedFragments {
        spreads: HashMap::new(),
        defined_fragments: Vec::new(),
        current_scope: None,
    }
}

pub struct NoUnusedFragments<'a> {
    spreads: HashMap<Scope<'a>, Vec<&'a str>>,
    defined_fragments: Vec<&'a Spanning<Fragment<'a>>>,
    current_scope: Option<Scope<'a>>,
}

impl<'a> NoUnusedFragments<'a> {
    /// Marks every fragment reachable by spreads from `root`.
    ///
    /// Iterative traversal; the spread graph may be deep and is user supplied.
    fn mark_reachable(&self, root: Scope<'a>, reachable: &mut HashSet<&'a str>) {
        let mut pending = vec![root];

        while let Some(scope) = pending.pop() {
            if let Scope::Fragment(name) = scope {
                if !reachable.insert(name) {
                    continue;
                }
            }

            pending.extend(
                self.spreads
                    .get(&scope)
                    .into_iter()
                    .flatten()
                    .map(|name| Scope::Fragment(name)),
            );
        }
    }
}

impl<'a> Visitor<'a> for NoUnusedFragments<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, defs: &'a Document<'a>) {
        let mut reachable = HashSet::new();

        for def in defs {
            if let Definition::Operation(op) = def {
                let op_name = op.item.name.map(|s| s.item);
                self.mark_reachable(Scope::Operation(op_name), &mut reachable);
            }
        }

        for fragment in &self.defined_fragments {
            if !reachable.contains(fragment.item.name.item) {
                ctx.report_error(
                    &error_message(fragment.item.name.item),
                    &[fragment.span.start],
                );
            }
        }
    }

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        let op_name = op.item.name.as_ref().map(|s| s.item);
        self.current_scope = Some(Scope::Operation(op_name));
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        self.current_scope = Some(Scope::Fragment(f.item.name.item));
        self.defined_fragments.push(f);
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        if let Some(scope) = &self.current_scope {
            self.spreads
                .entry(*scope)
                .or_default()
                .push(spread.item.name.item);
        }
    }
}

fn error_message(frag_name: &str) -> String {
    format!(r#"Fragment "{frag_name}" is never used"#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn all_fragment_names_are_used() {
        expect_passes_rule(
            factory,
            r#"
          {
            human(id: 4) {
              ...HumanFields1
              ... on Human {
                ...HumanFields2
              }
            }
          }
          fragment HumanFields1 on Human {
            name
            ...HumanFields3
          }
          fragment HumanFields2 on Human {
            name
          }
          fragment HumanFields3 on Human {
            name
          }
        "#,
        );
    }

    #[test]
    fn contains_unknown_fragments() {
        expect_fails_rule(
            factory,
            r#"
          query Foo {
            human(id: 4) {
              ...HumanFields1
            }
          }
          fragment HumanFields1 on Human {
            name
          }
          fragment Unused1 on Human {
            name
          }
          fragment Unused2 on Human {
            name
          }
        "#,
            &[&error_message("Unused1"), &error_message("Unused2")],
        );
    }

    #[test]
    fn unused_fragments_referenced_only_by_each_other() {
        expect_fails_rule(
            factory,
            r#"
          query Foo {
            human(id: 4) {
              ...HumanFields1
            }
          }
          fragment HumanFields1 on Human {
            name
          }
          fragment Unused1 on Human {
            name
            ...Unused2
          }
          fragment Unused2 on Human {
            name
            ...Unused1
          }
        "#,
            &[&error_message("Unused1"), &error_message("Unused2")],
        );
    }
}
