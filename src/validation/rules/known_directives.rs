use crate::{
    ast::{
        Directive, Field, Fragment, FragmentSpread, InlineFragment, Operation, OperationType,
    },
    parser::Spanning,
    schema::meta::DirectiveLocation,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownDirectives {
    location_stack: Vec<DirectiveLocation>,
}

pub fn factory() -> KnownDirectives {
    KnownDirectives {
        location_stack: Vec::new(),
    }
}

// Paired hooks pushing a fixed directive location while inside the node.
macro_rules! track_location {
    ($(($enter:ident, $exit:ident, $Ast:ty, $location:ident),)*) => {
        $(
            fn $enter(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<$Ast>) {
                self.location_stack.push(DirectiveLocation::$location);
            }

            fn $exit(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<$Ast>) {
                let top = self.location_stack.pop();
                assert_eq!(top, Some(DirectiveLocation::$location));
            }
        )*
    };
}

impl<'a> Visitor<'a> for KnownDirectives {
    track_location! {
        (enter_field, exit_field, Field<'a>, Field),
        (enter_fragment_definition, exit_fragment_definition, Fragment<'a>, FragmentDefinition),
        (enter_fragment_spread, exit_fragment_spread, FragmentSpread<'a>, FragmentSpread),
        (enter_inline_fragment, exit_inline_fragment, InlineFragment<'a>, InlineFragment),
    }

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        self.location_stack.push(match op.item.operation_type {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        });
    }

    fn exit_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Operation<'a>>,
    ) {
        let top = self.location_stack.pop();
        assert!(matches!(
            top,
            Some(
                DirectiveLocation::Query
                    | DirectiveLocation::Mutation
                    | DirectiveLocation::Subscription
            )
        ));
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive<'a>>,
    ) {
        let name = directive.item.name.item;

        let Some(directive_type) = ctx.schema.directive_by_name(name) else {
            ctx.report_error(&unknown_error_message(name), &[directive.span.start]);
            return;
        };

        if let Some(location) = self.location_stack.last() {
            if !directive_type.locations.contains(location) {
                ctx.report_error(
                    &misplaced_error_message(name, location),
                    &[directive.span.start],
                );
            }
        }
    }
}

fn unknown_error_message(directive_name: &str) -> String {
    format!(r#"Unknown directive "{directive_name}""#)
}

fn misplaced_error_message(directive_name: &str, location: &DirectiveLocation) -> String {
    format!(r#"Directive "{directive_name}" may not be used on {location}"#)
}

#[cfg(test)]
mod tests {
    use super::{factory, misplaced_error_message, unknown_error_message};

    use crate::{
        schema::meta::DirectiveLocation,
        validation::{expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn with_no_directives() {
        expect_passes_rule(
            factory,
            r#"
          query Foo {
            dog
            ...Frag
          }

          fragment Frag on Dog {
            name
          }
        "#,
        );
    }

    #[test]
    fn with_known_directives() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog @include(if: true) {
              name
            }
            human @skip(if: false) {
              name
            }
          }
        "#,
        );
    }

    #[test]
    fn with_unknown_directive() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog @unknown(directive: "value") {
              name
            }
          }
        "#,
            &[&unknown_error_message("unknown")],
        );
    }

    #[test]
    fn with_many_unknown_directives() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog @unknown(directive: "value") {
              name
            }
            human @unknown(directive: "value") {
              name
              pets @unknown(directive: "value") {
                name
              }
            }
          }
        "#,
            &[
                &unknown_error_message("unknown"),
                &unknown_error_message("unknown"),
                &unknown_error_message("unknown"),
            ],
        );
    }

    #[test]
    fn with_well_placed_directives() {
        expect_passes_rule(
            factory,
            r#"
          query Foo @onQuery {
            dog @include(if: true)
            ...Frag @include(if: true)
            cat @skip(if: true)
            ...SkippedFrag @skip(if: true)
          }

          mutation Bar @onMutation {
            testInput
          }
        "#,
        );
    }

    #[test]
    fn with_misplaced_directives() {
        expect_fails_rule(
            factory,
            r#"
          query Foo @include(if: true) {
            dog @onQuery
            ...Frag @onQuery
          }

          mutation Bar @onQuery {
            testInput
          }
        "#,
            &[
                &misplaced_error_message("include", &DirectiveLocation::Query),
                &misplaced_error_message("onQuery", &DirectiveLocation::Field),
                &misplaced_error_message("onQuery", &DirectiveLocation::FragmentSpread),
                &misplaced_error_message("onQuery", &DirectiveLocation::Mutation),
            ],
        );
    }
}
