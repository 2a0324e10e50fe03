use std::fmt;

use crate::{
    ast::VariableDefinition,
    parser::Spanning,
    validation::{input_value::validate_literal_value, ValidatorContext, Visitor},
};

pub struct DefaultValuesOfCorrectType;

pub fn factory() -> DefaultValuesOfCorrectType {
    DefaultValuesOfCorrectType
}

impl<'a> Visitor<'a> for DefaultValuesOfCorrectType {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (var_name, var_def): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        let Some(default) = &var_def.default_value else {
            return;
        };
        let var_type = &var_def.var_type.item;

        // A non-null variable can never fall back to its default.
        if var_type.is_non_null() {
            ctx.report_error(
                &non_null_error_message(var_name.item, var_type),
                &[default.span.start],
            );
            return;
        }

        let Some(meta_type) = ctx.schema.make_type_from_ast(var_type) else {
            return;
        };

        if validate_literal_value(ctx.schema, &meta_type, &default.item).is_some() {
            ctx.report_error(
                &type_error_message(var_name.item, var_type),
                &[default.span.start],
            );
        }
    }
}

fn type_error_message(arg_name: impl fmt::Display, type_name: impl fmt::Display) -> String {
    format!("Invalid default value for argument \"{arg_name}\", expected type \"{type_name}\"")
}

fn non_null_error_message(arg_name: impl fmt::Display, type_name: impl fmt::Display) -> String {
    format!(
        "Argument \"{arg_name}\" has type \"{type_name}\" and is not nullable, \
         so it can't have a default value",
    )
}

#[cfg(test)]
mod tests {
    use super::{factory, non_null_error_message, type_error_message};

    use crate::validation::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn variables_with_no_default_values() {
        expect_passes_rule(
            factory,
            r#"
          query NullableValues($a: Int, $b: String, $c: ComplexInput) {
            dog { name }
          }
        "#,
        );
    }

    #[test]
    fn required_variables_without_default_values() {
        expect_passes_rule(
            factory,
            r#"
          query RequiredValues($a: Int!, $b: String!) {
            dog { name }
          }
        "#,
        );
    }

    #[test]
    fn variables_with_valid_default_values() {
        expect_passes_rule(
            factory,
            r#"
          query WithDefaultValues(
            $a: Int = 1,
            $b: String = "ok",
            $c: ComplexInput = { requiredField: true, intField: 3 }
          ) {
            dog { name }
          }
        "#,
        );
    }

    #[test]
    fn no_required_variables_with_default_values() {
        expect_fails_rule(
            factory,
            r#"
          query UnreachableDefaultValues($a: Int! = 3, $b: String! = "default") {
            dog { name }
          }
        "#,
            &[
                &non_null_error_message("a", "Int!"),
                &non_null_error_message("b", "String!"),
            ],
        );
    }

    #[test]
    fn variables_with_invalid_default_values() {
        expect_fails_rule(
            factory,
            r#"
          query InvalidDefaultValues(
            $a: Int = "one",
            $b: String = 4,
            $c: ComplexInput = "notverycomplex"
          ) {
            dog { name }
          }
        "#,
            &[
                &type_error_message("a", "Int"),
                &type_error_message("b", "String"),
                &type_error_message("c", "ComplexInput"),
            ],
        );
    }

    #[test]
    fn complex_variables_missing_required_field() {
        expect_fails_rule(
            factory,
            r#"
          query MissingRequiredField($a: ComplexInput = {intField: 3}) {
            dog { name }
          }
        "#,
            &[&type_error_message("a", "ComplexInput")],
        );
    }

    #[test]
    fn list_variables_with_invalid_item() {
        expect_fails_rule(
            factory,
            r#"
          query InvalidItem($a: [String] = ["one", 2]) {
            dog { name }
          }
        "#,
            &[&type_error_message("a", "[String]")],
        );
    }
}
