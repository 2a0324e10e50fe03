use std::{collections::HashSet, fmt, sync::Arc};

use crate::{
    ast::{Definition, Document, Type},
    parser::SourcePosition,
    schema::{meta::NamedType, model::Schema},
};

/// Query validation error
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct RuleError {
    locations: Vec<SourcePosition>,
    message: String,
}

impl RuleError {
    #[doc(hidden)]
    pub fn new(message: &str, locations: &[SourcePosition]) -> Self {
        Self {
            message: message.into(),
            locations: locations.to_vec(),
        }
    }

    /// Access the message for a validation error
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Access the positions of the validation error
    ///
    /// All validation errors contain at least one source position, but some
    /// validators supply extra context through multiple positions.
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }

    /// Consumes this error, splitting it into its locations and message.
    pub fn into_parts(self) -> (Vec<SourcePosition>, String) {
        (self.locations, self.message)
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Every `RuleError` carries at least one source position.
        write!(
            f,
            "{}. At {}",
            self.message,
            itertools::Itertools::format(self.locations.iter(), ", "),
        )
    }
}

impl std::error::Error for RuleError {}

#[doc(hidden)]
pub struct ValidatorContext<'a> {
    pub schema: &'a Schema,
    pub introspection_enabled: bool,
    errors: Vec<RuleError>,
    type_stack: Vec<Option<&'a Arc<NamedType>>>,
    type_literal_stack: Vec<Option<Type<'a>>>,
    input_type_stack: Vec<Option<&'a Arc<NamedType>>>,
    input_type_literal_stack: Vec<Option<Type<'a>>>,
    parent_type_stack: Vec<Option<&'a Arc<NamedType>>>,
    fragment_names: HashSet<&'a str>,
}

impl<'a> ValidatorContext<'a> {
    #[doc(hidden)]
    pub fn new(
        schema: &'a Schema,
        document: &Document<'a>,
        introspection_enabled: bool,
    ) -> ValidatorContext<'a> {
        ValidatorContext {
            errors: Vec::new(),
            schema,
            introspection_enabled,
            type_stack: Vec::new(),
            type_literal_stack: Vec::new(),
            parent_type_stack: Vec::new(),
            input_type_stack: Vec::new(),
            input_type_literal_stack: Vec::new(),
            fragment_names: document
                .iter()
                .filter_map(|def| match def {
                    Definition::Fragment(frag) => Some(frag.item.name.item),
                    _ => None,
                })
                .collect(),
        }
    }

    #[doc(hidden)]
    pub fn append_errors(&mut self, mut errors: Vec<RuleError>) {
        self.errors.append(&mut errors);
    }

    #[doc(hidden)]
    pub fn report_error(&mut self, message: &str, locations: &[SourcePosition]) {
        self.errors.push(RuleError::new(message, locations));
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[doc(hidden)]
    pub fn into_errors(mut self) -> Vec<RuleError> {
        self.errors.sort();
        self.errors
    }

    fn resolve(&self, t: Option<&Type<'a>>) -> Option<&'a Arc<NamedType>> {
        t.and_then(|t| self.schema.concrete_type_by_name(t.innermost_name()))
    }

    #[doc(hidden)]
    pub fn with_pushed_type<F, R>(&mut self, t: Option<&Type<'a>>, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        self.type_stack.push(self.resolve(t));
        self.type_literal_stack.push(t.cloned());

        let res = f(self);

        self.type_literal_stack.pop();
        self.type_stack.pop();

        res
    }

    #[doc(hidden)]
    pub fn with_pushed_parent_type<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        self.parent_type_stack.push(self.current_type());
        let res = f(self);
        self.parent_type_stack.pop();

        res
    }

    #[doc(hidden)]
    pub fn with_pushed_input_type<F, R>(&mut self, t: Option<&Type<'a>>, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        self.input_type_stack.push(self.resolve(t));
        self.input_type_literal_stack.push(t.cloned());

        let res = f(self);

        self.input_type_literal_stack.pop();
        self.input_type_stack.pop();

        res
    }

    #[doc(hidden)]
    pub fn current_type(&self) -> Option<&'a Arc<NamedType>> {
        self.type_stack.last().copied().flatten()
    }

    #[doc(hidden)]
    pub fn current_type_literal(&self) -> Option<&Type<'a>> {
        self.type_literal_stack.last().and_then(Option::as_ref)
    }

    #[doc(hidden)]
    pub fn parent_type(&self) -> Option<&'a Arc<NamedType>> {
        self.parent_type_stack.last().copied().flatten()
    }

    #[doc(hidden)]
    pub fn current_input_type_literal(&self) -> Option<&Type<'a>> {
        self.input_type_literal_stack
            .last()
            .and_then(Option::as_ref)
    }

    #[doc(hidden)]
    pub fn current_input_type(&self) -> Option<&'a Arc<NamedType>> {
        self.input_type_stack.last().copied().flatten()
    }

    #[doc(hidden)]
    pub fn is_known_fragment(&self, name: &str) -> bool {
        self.fragment_names.contains(name)
    }
}
