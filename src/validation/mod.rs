//! Query validation related methods and data structures.

mod context;
pub(crate) mod input_value;
mod multi_visitor;
pub mod rules;
mod traits;
mod visitor;

#[cfg(test)]
pub(crate) mod test_harness;

pub use self::{
    context::{RuleError, ValidatorContext},
    multi_visitor::MultiVisitorNil,
    rules::Rule,
    traits::Visitor,
    visitor::visit,
};

pub(crate) use self::rules::{visit_all_rules, visit_rule};

#[cfg(test)]
pub(crate) use self::test_harness::{
    expect_fails_rule, expect_fails_rule_without_introspection, expect_passes_rule,
    expect_passes_rule_without_introspection,
};
