use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Document, Fragment, FragmentSpread, InputValue, Operation, VariableDefinition},
    parser::{SourcePosition, Spanning},
    validation::{RuleError, ValidatorContext, Visitor},
};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

pub fn factory<'a>() -> NoUndefinedVariables<'a> {
    NoUndefinedVariables {
        defined: HashMap::new(),
        used: HashMap::new(),
        current_scope: None,
        spread_graph: HashMap::new(),
    }
}

pub struct NoUndefinedVariables<'a> {
    defined: HashMap<Option<&'a str>, (SourcePosition, HashSet<&'a str>)>,
    used: HashMap<Scope<'a>, Vec<Spanning<&'a str>>>,
    current_scope: Option<Scope<'a>>,
    spread_graph: HashMap<Scope<'a>, Vec<&'a str>>,
}

impl<'a> NoUndefinedVariables<'a> {
    /// Usages reachable from `root` that are not in `defined`.
    fn undefined_from(
        &self,
        root: Scope<'a>,
        defined: &HashSet<&'a str>,
    ) -> Vec<&Spanning<&'a str>> {
        let mut undefined = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![root];

        // Iterative traversal; the spread graph may be deep and is user supplied.
        while let Some(scope) = pending.pop() {
            if !visited.insert(scope.clone()) {
                continue;
            }

            for var in self.used.get(&scope).into_iter().flatten() {
                if !defined.contains(&var.item) {
                    undefined.push(var);
                }
            }

            if let Some(spreads) = self.spread_graph.get(&scope) {
                pending.extend(spreads.iter().map(|s| Scope::Fragment(s)));
            }
        }

        undefined
    }
}

impl<'a> Visitor<'a> for NoUndefinedVariables<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document<'a>) {
        for (op_name, (pos, def_vars)) in &self.defined {
            let undefined = self.undefined_from(Scope::Operation(*op_name), def_vars);

            ctx.append_errors(
                undefined
                    .into_iter()
                    .map(|var| {
                        RuleError::new(&error_message(var.item, *op_name), &[var.span.start, *pos])
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
        self.defined.insert(op_name, (op.span.start, HashSet::new()));
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
            if let Some((_, vars)) = self.defined.get_mut(name) {
                vars.insert(var_name.item);
            }
        }
    }

    fn enter_argument(
        &mut self,
        _: &mut ValidatorContext<'a>,
        (_, value): &'a (Spanning<&'a str>, Spanning<InputValue>),
    ) {
        if let Some(scope) = &self.current_scope {
            let usages = value
                .item
                .referenced_variables()
                .into_iter()
                .map(|var_name| Spanning::new(value.span, var_name));
            self.used.entry(scope.clone()).or_default().extend(usages);
        }
    }
}

fn error_message(var_name: &str, op_name: Option<&str>) -> String {
    if let Some(op_name) = op_name {
        format!(r#"Variable "${var_name}" is not defined by operation "{op_name}""#)
    } else {
        format!(r#"Variable "${var_name}" is not defined"#)
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn all_variables_defined() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($a: Int, $b: Int) {
            complicatedArgs {
              multipleOpts(opt1: $a, opt2: $b)
            }
          }
        "#,
        );
    }

    #[test]
    fn all_variables_in_fragments_deeply_defined() {
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
    fn variable_not_defined() {
        expect_fails_rule(
            factory,
            r#"
          query Foo($a: Int) {
            complicatedArgs {
              multipleOpts(opt1: $a, opt2: $b)
            }
          }
        "#,
            &[&error_message("b", Some("Foo"))],
        );
    }

    #[test]
    fn variable_not_defined_by_unnamed_query() {
        expect_fails_rule(
            factory,
            r#"
          {
            complicatedArgs {
              intArgField(intArg: $a)
            }
          }
        "#,
            &[&error_message("a", None)],
        );
    }

    #[test]
    fn variable_in_fragment_not_defined_by_operation() {
        expect_fails_rule(
            factory,
            r#"
          query Foo {
            complicatedArgs {
              ...FragA
            }
          }
          fragment FragA on ComplicatedArgs {
            intArgField(intArg: $a)
          }
        "#,
            &[&error_message("a", Some("Foo"))],
        );
    }

    #[test]
    fn variables_defined_in_other_operations_do_not_leak() {
        expect_fails_rule(
            factory,
            r#"
          query Foo($a: Int) {
            complicatedArgs {
              intArgField(intArg: $a)
            }
          }
          query Bar {
            complicatedArgs {
              intArgField(intArg: $a)
            }
          }
        "#,
            &[&error_message("a", Some("Bar"))],
        );
    }
}
