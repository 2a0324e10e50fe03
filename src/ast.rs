use std::{borrow::Cow, fmt};

use indexmap::IndexMap;
use itertools::Itertools as _;

use crate::parser::Spanning;

/// A type literal in the syntax tree
///
/// This enum carries no semantic information and might refer to types that do
/// not exist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Type<'a> {
    /// A nullable named type, e.g. `String`
    Named(Cow<'a, str>),
    /// A nullable list type, e.g. `[String]`
    ///
    /// The list itself is what's nullable, the containing type might be
    /// non-null.
    List(Box<Type<'a>>),
    /// A non-null named type, e.g. `String!`
    NonNullNamed(Cow<'a, str>),
    /// A non-null list type, e.g. `[String]!`.
    NonNullList(Box<Type<'a>>),
}

/// A JSON-like value that can be passed into the query execution, either
/// out-of-band, or in-band as default variable values. These are used when
/// the parser has not yet determined what the concrete type of the input
/// should be, so they are not guaranteed to match any schema type.
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum InputValue {
    Null,
    Int(i32),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    Variable(String),
    List(Vec<Spanning<InputValue>>),
    Object(Vec<(Spanning<String>, Spanning<InputValue>)>),
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct VariableDefinition<'a> {
    pub var_type: Spanning<Type<'a>>,
    pub default_value: Option<Spanning<InputValue>>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Arguments<'a> {
    pub items: Vec<(Spanning<&'a str>, Spanning<InputValue>)>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct VariableDefinitions<'a> {
    pub items: Vec<(Spanning<&'a str>, VariableDefinition<'a>)>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Field<'a> {
    pub alias: Option<Spanning<&'a str>>,
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a>>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Option<Vec<Selection<'a>>>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct FragmentSpread<'a> {
    pub name: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct InlineFragment<'a> {
    pub type_condition: Option<Spanning<&'a str>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

/// Entry in a GraphQL selection set
///
/// This enum represents one of the three variants of a selection that exists
/// in GraphQL: a field, a fragment spread, or an inline fragment. Each of the
/// variants references their location in the query source.
///
/// ```graphql
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     nestedField
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Selection<'a> {
    Field(Spanning<Field<'a>>),
    FragmentSpread(Spanning<FragmentSpread<'a>>),
    InlineFragment(Spanning<InlineFragment<'a>>),
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Directive<'a> {
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a>>>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Operation<'a> {
    pub operation_type: OperationType,
    pub name: Option<Spanning<&'a str>>,
    pub variable_definitions: Option<Spanning<VariableDefinitions<'a>>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Fragment<'a> {
    pub name: Spanning<&'a str>,
    pub type_condition: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Definition<'a> {
    Operation(Spanning<Operation<'a>>),
    Fragment(Spanning<Fragment<'a>>),
}

#[doc(hidden)]
pub type Document<'a> = [Definition<'a>];
#[doc(hidden)]
pub type OwnedDocument<'a> = Vec<Definition<'a>>;

impl<'a> Type<'a> {
    /// Gets the name of the named type this type literal wraps, however deep.
    pub fn innermost_name(&self) -> &str {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => n,
            Self::List(l) | Self::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Determines if a type only can represent non-`null` values.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNullNamed(_) | Self::NonNullList(_))
    }

    /// An owned copy of this type literal, untied from the query source.
    pub fn into_owned(self) -> Type<'static> {
        match self {
            Self::Named(n) => Type::Named(Cow::Owned(n.into_owned())),
            Self::NonNullNamed(n) => Type::NonNullNamed(Cow::Owned(n.into_owned())),
            Self::List(l) => Type::List(Box::new(l.into_owned())),
            Self::NonNullList(l) => Type::NonNullList(Box::new(l.into_owned())),
        }
    }
}

impl fmt::Display for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::NonNullNamed(n) => write!(f, "{n}!"),
            Self::List(t) => write!(f, "[{t}]"),
            Self::NonNullList(t) => write!(f, "[{t}]!"),
        }
    }
}

impl InputValue {
    /// Shorthand for an enum value
    pub fn enum_value<S: Into<String>>(s: S) -> Self {
        Self::Enum(s.into())
    }

    /// Shorthand for a variable reference
    pub fn variable<S: Into<String>>(s: S) -> Self {
        Self::Variable(s.into())
    }

    /// Constructs an unlocated list of other input values
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l.into_iter().map(Spanning::unlocated).collect())
    }

    /// Constructs an unlocated object from a vector of key/value pairs
    pub fn object<K: Into<String>>(o: Vec<(K, Self)>) -> Self {
        Self::Object(
            o.into_iter()
                .map(|(k, v)| (Spanning::unlocated(k.into()), Spanning::unlocated(v)))
                .collect(),
        )
    }

    /// Is this value `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Is this value a variable reference?
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// View the underlying object value, if present.
    pub fn to_object_value(&self) -> Option<IndexMap<&str, &Self>> {
        match self {
            Self::Object(o) => Some(
                o.iter()
                    .map(|(k, v)| (k.item.as_str(), &v.item))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// View the underlying list value, if present.
    pub fn to_list_value(&self) -> Option<Vec<&Self>> {
        match self {
            Self::List(l) => Some(l.iter().map(|s| &s.item).collect()),
            _ => None,
        }
    }

    /// Recursively finds all variables
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            Self::Variable(name) => vec![name],
            Self::List(l) => l
                .iter()
                .flat_map(|v| v.item.referenced_variables())
                .collect(),
            Self::Object(o) => o
                .iter()
                .flat_map(|(_, v)| v.item.referenced_variables())
                .collect(),
            _ => vec![],
        }
    }

    /// Compares equality with another `InputValue` ignoring any source
    /// position information.
    pub fn unlocated_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int(i1), Self::Int(i2)) => i1 == i2,
            (Self::Float(f1), Self::Float(f2)) => f1 == f2,
            (Self::String(s1), Self::String(s2)) => s1 == s2,
            (Self::Boolean(b1), Self::Boolean(b2)) => b1 == b2,
            (Self::Enum(e1), Self::Enum(e2)) => e1 == e2,
            (Self::Variable(v1), Self::Variable(v2)) => v1 == v2,
            (Self::List(l1), Self::List(l2)) => {
                l1.len() == l2.len()
                    && l1
                        .iter()
                        .zip(l2.iter())
                        .all(|(v1, v2)| v1.item.unlocated_eq(&v2.item))
            }
            (Self::Object(o1), Self::Object(o2)) => {
                o1.len() == o2.len()
                    && o1.iter().all(|(sk, sv)| {
                        o2.iter().any(|(k, v)| {
                            sk.item == k.item && sv.item.unlocated_eq(&v.item)
                        })
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Enum(v) => write!(f, "{v}"),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(v) => {
                write!(f, "[{}]", v.iter().map(|s| &s.item).format(", "))
            }
            Self::Object(o) => write!(
                f,
                "{{{}}}",
                o.iter().format_with(", ", |(k, v), f| {
                    f(&format_args!("{}: {}", k.item, v.item))
                }),
            ),
        }
    }
}

impl<'a> Arguments<'a> {
    #[doc(hidden)]
    pub fn into_iter(self) -> impl Iterator<Item = (Spanning<&'a str>, Spanning<InputValue>)> {
        self.items.into_iter()
    }

    #[doc(hidden)]
    pub fn iter(&self) -> impl Iterator<Item = &(Spanning<&'a str>, Spanning<InputValue>)> {
        self.items.iter()
    }

    #[doc(hidden)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[doc(hidden)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[doc(hidden)]
    pub fn get(&self, key: &str) -> Option<&Spanning<InputValue>> {
        self.items
            .iter()
            .find(|(k, _)| k.item == key)
            .map(|(_, v)| v)
    }
}

impl<'a> VariableDefinitions<'a> {
    #[doc(hidden)]
    pub fn iter(&self) -> impl Iterator<Item = &(Spanning<&'a str>, VariableDefinition<'a>)> {
        self.items.iter()
    }

    #[doc(hidden)]
    pub fn get(&self, key: &str) -> Option<&VariableDefinition<'a>> {
        self.items
            .iter()
            .find(|(k, _)| k.item == key)
            .map(|(_, v)| v)
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::InputValue;

    #[test]
    fn test_input_value_fmt() {
        let value = InputValue::Null;
        assert_eq!(value.to_string(), "null");

        let value = InputValue::Int(123);
        assert_eq!(value.to_string(), "123");

        let value = InputValue::Float(12.3);
        assert_eq!(value.to_string(), "12.3");

        let value = InputValue::String("FOO".into());
        assert_eq!(value.to_string(), "\"FOO\"");

        let value = InputValue::Boolean(true);
        assert_eq!(value.to_string(), "true");

        let value = InputValue::enum_value("BAR");
        assert_eq!(value.to_string(), "BAR");

        let value = InputValue::variable("baz");
        assert_eq!(value.to_string(), "$baz");

        let list = vec![InputValue::Int(1), InputValue::Int(2)];
        let value = InputValue::list(list);
        assert_eq!(value.to_string(), "[1, 2]");

        let object = vec![
            ("foo", InputValue::Int(1)),
            ("bar", InputValue::Int(2)),
        ];
        let value = InputValue::object(object);
        assert_eq!(value.to_string(), "{foo: 1, bar: 2}");
    }

    #[test]
    fn unlocated_equality_ignores_object_order() {
        let a = InputValue::object(vec![
            ("x", InputValue::Int(1)),
            ("y", InputValue::Boolean(false)),
        ]);
        let b = InputValue::object(vec![
            ("y", InputValue::Boolean(false)),
            ("x", InputValue::Int(1)),
        ]);
        assert!(a.unlocated_eq(&b));
        assert!(!a.unlocated_eq(&InputValue::Null));
    }
}
