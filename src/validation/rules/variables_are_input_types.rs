use crate::{
    ast::VariableDefinition,
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct VariablesAreInputTypes;

pub fn factory() -> VariablesAreInputTypes {
    VariablesAreInputTypes
}

impl<'a> Visitor<'a> for VariablesAreInputTypes {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (var_name, var_def): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        let Some(var_type) = ctx
            .schema
            .concrete_type_by_name(var_def.var_type.item.innermost_name())
        else {
            return;
        };

        if !var_type.is_input() {
            ctx.report_error(
                &error_message(var_name.item, &var_def.var_type.item.to_string()),
                &[var_def.var_type.span.start],
            );
        }
    }
}

fn error_message(var_name: &str, type_name: &str) -> String {
    format!(r#"Variable "{var_name}" cannot be of non-input type "{type_name}""#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn input_types_are_valid() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($a: String, $b: [Boolean!]!, $c: ComplexInput) {
            field(a: $a, b: $b, c: $c)
          }
        "#,
        );
    }

    #[test]
    fn output_types_are_invalid() {
        expect_fails_rule(
            factory,
            r#"
          query Foo($a: Dog, $b: [[CatOrDog!]]!, $c: Pet) {
            field(a: $a, b: $b, c: $c)
          }
        "#,
            &[
                &error_message("a", "Dog"),
                &error_message("b", "[[CatOrDog!]]!"),
                &error_message("c", "Pet"),
            ],
        );
    }
}
