//! The default validation rule set.

mod arguments_of_correct_type;
mod default_values_of_correct_type;
mod fields_on_correct_type;
mod fragments_on_composite_types;
mod known_argument_names;
mod known_directives;
mod known_fragment_names;
mod known_type_names;
mod lone_anonymous_operation;
mod no_fragment_cycles;
mod no_undefined_variables;
mod no_unused_fragments;
mod no_unused_variables;
mod overlapping_fields_can_be_merged;
mod possible_fragment_spreads;
mod provided_non_null_arguments;
mod scalar_leafs;
mod unique_argument_names;
mod unique_fragment_names;
mod unique_input_field_names;
mod unique_operation_names;
mod unique_variable_names;
mod variables_are_input_types;
mod variables_in_allowed_position;

use crate::{
    ast::Document,
    validation::{visit, MultiVisitorNil, ValidatorContext},
};

/// One rule of the default validation set.
///
/// [`crate::validate_with_rules`] takes a slice of these to run a chosen
/// subset instead of the whole set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[allow(missing_docs)]
pub enum Rule {
    ArgumentsOfCorrectType,
    DefaultValuesOfCorrectType,
    FieldsOnCorrectType,
    FragmentsOnCompositeTypes,
    KnownArgumentNames,
    KnownDirectives,
    KnownFragmentNames,
    KnownTypeNames,
    LoneAnonymousOperation,
    NoFragmentCycles,
    NoUndefinedVariables,
    NoUnusedFragments,
    NoUnusedVariables,
    OverlappingFieldsCanBeMerged,
    PossibleFragmentSpreads,
    ProvidedNonNullArguments,
    ScalarLeafs,
    UniqueArgumentNames,
    UniqueFragmentNames,
    UniqueInputFieldNames,
    UniqueOperationNames,
    UniqueVariableNames,
    VariablesAreInputTypes,
    VariablesInAllowedPosition,
}

impl Rule {
    /// The full default set, in the order the one-pass visitor runs it.
    pub const ALL: [Self; 24] = [
        Self::ArgumentsOfCorrectType,
        Self::DefaultValuesOfCorrectType,
        Self::FieldsOnCorrectType,
        Self::FragmentsOnCompositeTypes,
        Self::KnownArgumentNames,
        Self::KnownDirectives,
        Self::KnownFragmentNames,
        Self::KnownTypeNames,
        Self::LoneAnonymousOperation,
        Self::NoFragmentCycles,
        Self::NoUndefinedVariables,
        Self::NoUnusedFragments,
        Self::NoUnusedVariables,
        Self::OverlappingFieldsCanBeMerged,
        Self::PossibleFragmentSpreads,
        Self::ProvidedNonNullArguments,
        Self::ScalarLeafs,
        Self::UniqueArgumentNames,
        Self::UniqueFragmentNames,
        Self::UniqueInputFieldNames,
        Self::UniqueOperationNames,
        Self::UniqueVariableNames,
        Self::VariablesAreInputTypes,
        Self::VariablesInAllowedPosition,
    ];
}

/// Runs a single rule over `doc` in its own traversal. Rules are
/// independent of each other, so per-rule passes report the same errors
/// the combined pass does.
pub(crate) fn visit_rule<'a>(rule: Rule, ctx: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
    match rule {
        Rule::ArgumentsOfCorrectType => visit(&mut self::arguments_of_correct_type::factory(), ctx, doc),
        Rule::DefaultValuesOfCorrectType => visit(&mut self::default_values_of_correct_type::factory(), ctx, doc),
        Rule::FieldsOnCorrectType => visit(&mut self::fields_on_correct_type::factory(), ctx, doc),
        Rule::FragmentsOnCompositeTypes => visit(&mut self::fragments_on_composite_types::factory(), ctx, doc),
        Rule::KnownArgumentNames => visit(&mut self::known_argument_names::factory(), ctx, doc),
        Rule::KnownDirectives => visit(&mut self::known_directives::factory(), ctx, doc),
        Rule::KnownFragmentNames => visit(&mut self::known_fragment_names::factory(), ctx, doc),
        Rule::KnownTypeNames => visit(&mut self::known_type_names::factory(), ctx, doc),
        Rule::LoneAnonymousOperation => visit(&mut self::lone_anonymous_operation::factory(), ctx, doc),
        Rule::NoFragmentCycles => visit(&mut self::no_fragment_cycles::factory(), ctx, doc),
        Rule::NoUndefinedVariables => visit(&mut self::no_undefined_variables::factory(), ctx, doc),
        Rule::NoUnusedFragments => visit(&mut self::no_unused_fragments::factory(), ctx, doc),
        Rule::NoUnusedVariables => visit(&mut self::no_unused_variables::factory(), ctx, doc),
        Rule::OverlappingFieldsCanBeMerged => visit(&mut self::overlapping_fields_can_be_merged::factory(), ctx, doc),
        Rule::PossibleFragmentSpreads => visit(&mut self::possible_fragment_spreads::factory(), ctx, doc),
        Rule::ProvidedNonNullArguments => visit(&mut self::provided_non_null_arguments::factory(), ctx, doc),
        Rule::ScalarLeafs => visit(&mut self::scalar_leafs::factory(), ctx, doc),
        Rule::UniqueArgumentNames => visit(&mut self::unique_argument_names::factory(), ctx, doc),
        Rule::UniqueFragmentNames => visit(&mut self::unique_fragment_names::factory(), ctx, doc),
        Rule::UniqueInputFieldNames => visit(&mut self::unique_input_field_names::factory(), ctx, doc),
        Rule::UniqueOperationNames => visit(&mut self::unique_operation_names::factory(), ctx, doc),
        Rule::UniqueVariableNames => visit(&mut self::unique_variable_names::factory(), ctx, doc),
        Rule::VariablesAreInputTypes => visit(&mut self::variables_are_input_types::factory(), ctx, doc),
        Rule::VariablesInAllowedPosition => visit(&mut self::variables_in_allowed_position::factory(), ctx, doc),
    }
}

/// Runs the full default rule set over `doc`, accumulating errors in `ctx`.
pub(crate) fn visit_all_rules<'a>(ctx: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
    let mut mv = MultiVisitorNil
        .with(self::arguments_of_correct_type::factory())
        .with(self::default_values_of_correct_type::factory())
        .with(self::fields_on_correct_type::factory())
        .with(self::fragments_on_composite_types::factory())
        .with(self::known_argument_names::factory())
        .with(self::known_directives::factory())
        .with(self::known_fragment_names::factory())
        .with(self::known_type_names::factory())
        .with(self::lone_anonymous_operation::factory())
        .with(self::no_fragment_cycles::factory())
        .with(self::no_undefined_variables::factory())
        .with(self::no_unused_fragments::factory())
        .with(self::no_unused_variables::factory())
        .with(self::overlapping_fields_can_be_merged::factory())
        .with(self::possible_fragment_spreads::factory())
        .with(self::provided_non_null_arguments::factory())
        .with(self::scalar_leafs::factory())
        .with(self::unique_argument_names::factory())
        .with(self::unique_fragment_names::factory())
        .with(self::unique_input_field_names::factory())
        .with(self::unique_operation_names::factory())
        .with(self::unique_variable_names::factory())
        .with(self::variables_are_input_types::factory())
        .with(self::variables_in_allowed_position::factory());

    visit(&mut mv, ctx, doc);
}
