use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Document, Fragment, FragmentSpread, InputValue, Operation, VariableDefinition},
    parser::Spanning,
    validation::{RuleError, ValidatorContext, Visitor},
};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

pub fn factory<'a>() -> NoUnusedVariables<'a> {
    NoUnusedVariables {
        defined: HashMap::new(),
        used: HashMap::new(),
        current_scope: None,
        spread_graph: HashMap::new(),
    }
}

pub struct NoUnusedVariables<'a> {
    defined: HashMap<Option<&'a str>, Vec<&'a Spanning<&'a str>>>,
    used: HashMap<Scope<'a>, Vec<&'a str>>,
    current_scope: Option<Scope<'a>>,
    spread_graph: HashMap<Scope<'a>, Vec<&'a str>>,
}

impl<'a> NoUnusedVariables<'a> {
    /// Which of `defined` are referenced from `root` or any fragment it
    /// transitively spreads.
    fn used_from(&self, root: Scope<'a>, defined: &HashSet<&'a str>) -> HashSet<&'a str> {
        let mut used = HashSet::new();
        let mut visited = HashSet::new();
        let mut pending = vec![root];

        // Iterative traversal; the spread graph may be deep and is user supplied.
        while let Some(scope) = pending.pop() {
            if !visited.insert(scope.clone()) {
                continue;
            }

            for var in self.used.get(&scope).into_iter().flatten() {
                if defined.contains(var) {
                    used.insert(*var);
                }
            }

            if let Some(spreads) = self.spread_graph.get(&scope) {
                pending.extend(spreads.iter().map(|s| Scope::Fragment(s)));
            }
        }

        used
    }
}

impl<'a> Visitor<'a> for NoUnusedVariables<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document<'a>) {
        for (op_name, def_vars) in &self.defined {
            let defined = def_vars.iter().map(|def| def.item).collect();
            let used = self.used_from(Scope::Operation(*op_name), &defined);

            ctx.append_errors(
                def_vars
                    .iter()
                    .filter(|var| !used.contains(var.item))
                    .map(|var| {
                        RuleError::new(&error_message(var.item, *op_name), &[var.span.start])
                    })
                    .collect(),
            );
        }
    }

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        let op_name = op.item.name.map(|s| s.item);
        self.current_scope = Some(Scope::Operation(op_name));
        self.defined.insert(op_name, Vec::new());
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        self.current_scope = Some(Scope::Fragment(f.item.name.item));
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        if let Some(scope) = &self.current_scope {
            self.spread_graph
                .entry(scope.clone())
                .or_default()
                .push(spread.item.name.item);
        }
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        (var_name, _): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        if let Some(Scope::Operation(name)) = &self.current_scope {
            if let Some(vars) = self.defined.get_mut(name) {
                vars.push(var_name);
            }
        }
    }

    fn enter_argument(
        &mut self,
        _: &mut ValidatorContext<'a>,
        (_, value): &'a (Spanning<&'a str>, Spanning<InputValue>),
    ) {
        if let Some(scope) = &self.current_scope {
            self.used
                .entry(scope.clone())
                .or_default()
                .extend(value.item.referenced_variables());
        }
    }
}

fn error_message(var_name: &str, op_name: Option<&str>) -> String {
    if let Some(op_name) = op_name {
        format!(r#"Variable "${var_name}" is not used by operation "{op_name}""#)
    } else {
        format!(r#"Variable "${var_name}" is not used"#)
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn uses_all_variables() {
        expect_passes_rule(
            factory,
            r#"
          query ($a: Int, $b: Int) {
            complicatedArgs {
              multipleOpts(opt1: $a, opt2: $b)
            }
          }
        "#,
        );
    }

    #[test]
    fn uses_all_variables_in_fragments() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($a: Int, $b: Int) {
            complicatedArgs {
              ...FragA
            }
          }
          fragment FragA on ComplicatedArgs {
            intArgField(intArg: $a) {
              ...FragB
            }
          }
          fragment FragB on ComplicatedArgs {
            intArgField(intArg: $b)
          }
        "#,
        );
    }

    #[test]
    fn variable_not_used() {
        expect_fails_rule(
            factory,
            r#"
          query ($a: Int, $b: Int, $c: Int) {
            complicatedArgs {
              multipleOpts(opt1: $a, opt2: $b)
            }
          }
        "#,
            &[&error_message("c", None)],
        );
    }

    #[test]
    fn variable_not_used_in_fragments() {
        expect_fails_rule(
            factory,
            r#"
          query Foo($a: Int, $b: Int, $c: Int) {
            complicatedArgs {
              ...FragA
            }
          }
          fragment FragA on ComplicatedArgs {
            intArgField(intArg: $a) {
              ...FragB
            }
          }
          fragment FragB on ComplicatedArgs {
            intArgField(intArg: $b)
          }
        "#,
            &[&error_message("c", Some("Foo"))],
        );
    }

    #[test]
    fn variable_used_by_other_operation_only() {
        expect_fails_rule(
            factory,
            r#"
          query Foo($b: Int) {
            complicatedArgs {
              intArgField(intArg: $b)
            }
          }
          query Bar($a: Int) {
            complicatedArgs {
              multipleOpts(opt1: $b)
            }
          }
        "#,
            &[&error_message("a", Some("Bar"))],
        );
    }
}
