use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Document, Fragment, FragmentSpread, Operation, Type, VariableDefinition},
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

type VarDef<'a> = (Spanning<&'a str>, VariableDefinition<'a>);

pub fn factory<'a>() -> VariableInAllowedPosition<'a> {
    VariableInAllowedPosition {
        spread_graph: HashMap::new(),
        usages: HashMap::new(),
        definitions: HashMap::new(),
        current_scope: None,
    }
}

pub struct VariableInAllowedPosition<'a> {
    spread_graph: HashMap<Scope<'a>, HashSet<&'a str>>,
    usages: HashMap<Scope<'a>, Vec<(Spanning<&'a String>, Type<'a>)>>,
    definitions: HashMap<Scope<'a>, Vec<&'a VarDef<'a>>>,
    current_scope: Option<Scope<'a>>,
}

impl<'a> VariableInAllowedPosition<'a> {
    fn check_scope(
        &self,
        root: &Scope<'a>,
        definitions: &[&'a VarDef<'a>],
        ctx: &mut ValidatorContext<'a>,
    ) {
        let mut visited = HashSet::new();
        let mut pending = vec![root.clone()];

        // Iterative traversal; the spread graph may be deep and is user supplied.
        while let Some(scope) = pending.pop() {
            if !visited.insert(scope.clone()) {
                continue;
            }

            for (usage_name, position_type) in
                self.usages.get(&scope).into_iter().flatten()
            {
                let Some((def_name, def)) = definitions
                    .iter()
                    .find(|(n, _)| n.item == usage_name.item.as_str())
                else {
                    continue;
                };

                // An optional variable with a default may flow into a
                // non-null position.
                let effective_type = match (&def.default_value, &def.var_type.item) {
                    (Some(_), Type::List(inner)) => Type::NonNullList(inner.clone()),
                    (Some(_), Type::Named(inner)) => Type::NonNullNamed(inner.clone()),
                    (_, t) => t.clone(),
                };

                if !ctx.schema.is_subtype(&effective_type, position_type) {
                    ctx.report_error(
                        &error_message(
                            usage_name.item,
                            &def.var_type.item.to_string(),
                            &position_type.to_string(),
                        ),
                        &[def_name.span.start, usage_name.span.start],
                    );
                }
            }

            if let Some(spreads) = self.spread_graph.get(&scope) {
                pending.extend(spreads.iter().map(|s| Scope::Fragment(s)));
            }
        }
    }
}

impl<'a> Visitor<'a> for VariableInAllowedPosition<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document<'a>) {
        for (scope, definitions) in &self.definitions {
            self.check_scope(scope, definitions, ctx);
        }
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment<'a>>,
    ) {
        self.current_scope = Some(Scope::Fragment(fragment.item.name.item));
    }

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        self.current_scope = Some(Scope::Operation(op.item.name.map(|s| s.item)));
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
                .insert(spread.item.name.item);
        }
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        def: &'a VarDef<'a>,
    ) {
        if let Some(scope) = &self.current_scope {
            self.definitions.entry(scope.clone()).or_default().push(def);
        }
    }

    fn enter_variable_value(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        var_name: Spanning<&'a String>,
    ) {
        if let (Some(scope), Some(input_type)) =
            (&self.current_scope, ctx.current_input_type_literal())
        {
            self.usages
                .entry(scope.clone())
                .or_default()
                .push((var_name, input_type.clone()));
        }
    }
}

fn error_message(var_name: &str, declared: &str, expected: &str) -> String {
    format!(
        r#"Variable "${var_name}" of type "{declared}" used in position expecting type "{expected}""#
    )
}
