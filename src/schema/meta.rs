//! Types used to describe a `GraphQL` schema

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use arcstr::ArcStr;
use fnv::FnvHashMap;
use indexmap::IndexMap;
use std::sync::Arc;

use crate::{
    ast::InputValue,
    executor::{BoxResolver, ResolveInfo, ResolverArgs, ResolverContext},
    value::{Resolved, Value},
    FieldResult,
};

/// Reference to a named schema type, possibly wrapped in list or non-null
/// markers
///
/// References are late bound: they carry only the type name and are resolved
/// through the schema's type map. This is what makes cyclic type graphs
/// definable.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TypeRef {
    /// Reference to a named type.
    Named(ArcStr),
    /// A list wrapping the inner reference.
    List(Box<TypeRef>),
    /// A non-null marker around the inner reference.
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// Reference to the type with the given name.
    pub fn named(name: impl Into<ArcStr>) -> Self {
        Self::Named(name.into())
    }

    /// Reference to the built-in `Int` type.
    pub fn int() -> Self {
        Self::Named(arcstr::literal!("Int"))
    }

    /// Reference to the built-in `Float` type.
    pub fn float() -> Self {
        Self::Named(arcstr::literal!("Float"))
    }

    /// Reference to the built-in `String` type.
    pub fn string() -> Self {
        Self::Named(arcstr::literal!("String"))
    }

    /// Reference to the built-in `Boolean` type.
    pub fn boolean() -> Self {
        Self::Named(arcstr::literal!("Boolean"))
    }

    /// Reference to the built-in `ID` type.
    pub fn id() -> Self {
        Self::Named(arcstr::literal!("ID"))
    }

    /// Wraps this reference in a list.
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    /// Wraps this reference in a non-null marker.
    ///
    /// Double-wrapping is rejected when the schema is built.
    pub fn non_null(self) -> Self {
        Self::NonNull(Box::new(self))
    }

    /// The name of the named type this reference wraps, however deep.
    pub fn innermost_name(&self) -> &str {
        match self {
            Self::Named(n) => n,
            Self::List(inner) | Self::NonNull(inner) => inner.innermost_name(),
        }
    }

    /// Can this reference only represent non-null values?
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// The equivalent syntactic type literal, untied from any query source.
    pub fn to_ast(&self) -> crate::ast::Type<'static> {
        use std::borrow::Cow;

        use crate::ast::Type;

        match self {
            Self::Named(n) => Type::Named(Cow::Owned(n.to_string())),
            Self::List(inner) => Type::List(Box::new(inner.to_ast())),
            Self::NonNull(inner) => match &**inner {
                Self::Named(n) => Type::NonNullNamed(Cow::Owned(n.to_string())),
                Self::List(l) => Type::NonNullList(Box::new(l.to_ast())),
                // Doubled non-null is rejected at build time.
                Self::NonNull(_) => inner.to_ast(),
            },
        }
    }

    pub(crate) fn has_doubled_non_null(&self) -> bool {
        match self {
            Self::Named(_) => false,
            Self::List(inner) => inner.has_doubled_non_null(),
            Self::NonNull(inner) => {
                matches!(**inner, Self::NonNull(_)) || inner.has_doubled_non_null()
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// GraphQL type kind
///
/// The GraphQL specification defines a number of type kinds - the meta type
/// of a type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    /// The introspection name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::InputObject => "INPUT_OBJECT",
            Self::List => "LIST",
            Self::NonNull => "NON_NULL",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) type IsTypeOfFn = Box<dyn Fn(&Resolved, &ResolveInfo<'_>) -> bool + Send + Sync>;
pub(crate) type ResolveTypeFn =
    Box<dyn Fn(&Resolved, &ResolveInfo<'_>) -> Option<ArcStr> + Send + Sync>;
pub(crate) type SerializeFn = Box<dyn Fn(&Value) -> Option<Value> + Send + Sync>;
pub(crate) type ParseValueFn = Box<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;
pub(crate) type ParseLiteralFn = Box<dyn Fn(&InputValue) -> Result<Value, String> + Send + Sync>;

/// Map from field name to definition, in declaration order.
pub type FieldsMap = IndexMap<ArcStr, Arc<Field>>;

/// A directive as attached to a field definition in the schema.
#[derive(Clone, Debug)]
pub struct AppliedDirective {
    /// Name of the directive.
    pub name: ArcStr,
    /// Constant arguments the schema attached.
    pub arguments: Vec<(ArcStr, Value)>,
}

impl AppliedDirective {
    /// Attaches the directive with the given name.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            arguments: vec![],
        }
    }

    /// Adds a constant argument.
    pub fn argument(mut self, name: impl Into<ArcStr>, value: Value) -> Self {
        self.arguments.push((name.into(), value));
        self
    }
}

/// Field definition on an object or interface type
pub struct Field {
    /// Name of this field.
    pub name: ArcStr,
    /// Optional description, for introspection.
    pub description: Option<ArcStr>,
    /// Reference to the type this field yields.
    pub field_type: TypeRef,
    /// Declared arguments, in declaration order.
    pub arguments: Vec<Arc<Argument>>,
    /// Reason this field is deprecated, if it is.
    pub deprecation_reason: Option<ArcStr>,
    /// Directives the schema attached to this field definition.
    pub directives: Vec<AppliedDirective>,
    pub(crate) resolver: Option<BoxResolver>,
}

impl Field {
    /// New field yielding the referenced type.
    pub fn new(name: impl Into<ArcStr>, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            field_type,
            arguments: vec![],
            deprecation_reason: None,
            directives: vec![],
            resolver: None,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares an argument.
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(Arc::new(argument));
        self
    }

    /// Marks the field deprecated with the given reason.
    pub fn deprecated(mut self, reason: impl Into<ArcStr>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    /// Attaches a schema directive to this field definition.
    pub fn directive(mut self, directive: AppliedDirective) -> Self {
        self.directives.push(directive);
        self
    }

    /// Installs the resolver invoked for this field.
    ///
    /// Fields without a resolver fall back to indexing the parent source
    /// value by field name.
    pub fn resolver<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResolverContext<'_>, ResolverArgs<'_>) -> FieldResult + Send + Sync + 'static,
    {
        self.resolver = Some(Box::new(f));
        self
    }

    /// Looks up a declared argument by name.
    pub fn argument_by_name(&self, name: &str) -> Option<&Arc<Argument>> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// Argument declaration on a field or directive, also used for the fields of
/// input objects.
#[derive(Clone, Debug)]
pub struct Argument {
    /// Name of this argument.
    pub name: ArcStr,
    /// Optional description, for introspection.
    pub description: Option<ArcStr>,
    /// Reference to the input type of this argument.
    pub arg_type: TypeRef,
    /// Constant default applied when the argument is omitted.
    pub default_value: Option<InputValue>,
}

impl Argument {
    /// New argument of the referenced input type.
    pub fn new(name: impl Into<ArcStr>, arg_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            arg_type,
            default_value: None,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default applied when the argument is omitted.
    pub fn default_value(mut self, default: InputValue) -> Self {
        self.default_value = Some(default);
        self
    }
}

/// One declared value of an enum type
#[derive(Clone, Debug)]
pub struct EnumValue {
    /// Name of this enum value, as it appears in queries and responses.
    pub name: ArcStr,
    /// Optional description, for introspection.
    pub description: Option<ArcStr>,
    /// Internal value resolvers produce and receive for this name.
    pub value: Value,
    /// Reason this value is deprecated, if it is.
    pub deprecation_reason: Option<ArcStr>,
}

impl EnumValue {
    /// New enum value whose internal value is its own name.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        let name = name.into();
        let value = Value::String(name.to_string());
        Self {
            name,
            description: None,
            value,
            deprecation_reason: None,
        }
    }

    /// Sets the internal value.
    pub fn value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the value deprecated with the given reason.
    pub fn deprecated(mut self, reason: impl Into<ArcStr>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }
}

/// Fields indexed by name, together with any duplicate found while indexing.
pub(crate) struct FieldsModel {
    pub(crate) map: FieldsMap,
    duplicate: Option<ArcStr>,
}

fn index_fields(fields: Vec<Field>) -> FieldsModel {
    let mut map = FieldsMap::with_capacity(fields.len());
    let mut duplicate = None;
    for field in fields {
        let name = field.name.clone();
        if map.insert(name.clone(), Arc::new(field)).is_some() && duplicate.is_none() {
            duplicate = Some(name);
        }
    }
    FieldsModel { map, duplicate }
}

/// One-shot lazily initialized slot
///
/// Deferred construction lets types reference each other before every
/// definition exists; the closure runs at most once, when the schema is
/// built.
pub(crate) struct Thunked<T> {
    cell: OnceLock<T>,
    init: Mutex<Option<Box<dyn FnOnce() -> T + Send>>>,
}

impl<T> Thunked<T> {
    fn eager(value: T) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(value);
        Self {
            cell,
            init: Mutex::new(None),
        }
    }

    fn deferred<F: FnOnce() -> T + Send + 'static>(f: F) -> Self {
        Self {
            cell: OnceLock::new(),
            init: Mutex::new(Some(Box::new(f))),
        }
    }

    fn get(&self) -> &T {
        self.cell.get_or_init(|| {
            let init = self
                .init
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .take();
            match init {
                Some(f) => f(),
                // Either the cell or the init slot is populated at
                // construction, and `get_or_init` runs at most once.
                None => unreachable!("thunk invoked twice"),
            }
        })
    }
}

/// Scalar type metadata
pub struct ScalarType {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    serialize: Option<SerializeFn>,
    parse_value: Option<ParseValueFn>,
    parse_literal: Option<ParseLiteralFn>,
}

impl ScalarType {
    /// New scalar type with pass-through coercion.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            serialize: None,
            parse_value: None,
            parse_literal: None,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Installs the result coercion, turning internal values into response
    /// values. Returning `None` makes the field resolve to null.
    pub fn serialize_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.serialize = Some(Box::new(f));
        self
    }

    /// Installs the input coercion for variable values.
    ///
    /// Must be paired with [`ScalarType::parse_literal_fn`].
    pub fn parse_value_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.parse_value = Some(Box::new(f));
        self
    }

    /// Installs the input coercion for query literals.
    ///
    /// Must be paired with [`ScalarType::parse_value_fn`].
    pub fn parse_literal_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&InputValue) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.parse_literal = Some(Box::new(f));
        self
    }

    pub(crate) fn serialize(&self, value: &Value) -> Option<Value> {
        match &self.serialize {
            Some(f) => f(value),
            None => Some(value.clone()),
        }
    }

    pub(crate) fn parse_value(&self, value: &Value) -> Result<Value, String> {
        match &self.parse_value {
            Some(f) => f(value),
            None => Ok(value.clone()),
        }
    }

    pub(crate) fn parse_literal(&self, value: &InputValue) -> Result<Value, String> {
        match &self.parse_literal {
            Some(f) => f(value),
            None => default_parse_literal(value),
        }
    }
}

fn default_parse_literal(value: &InputValue) -> Result<Value, String> {
    match value {
        InputValue::Int(i) => Ok(Value::Int((*i).into())),
        InputValue::Float(f) => Ok(Value::Float(*f)),
        InputValue::String(s) => Ok(Value::String(s.clone())),
        InputValue::Boolean(b) => Ok(Value::Boolean(*b)),
        _ => Err(format!("Unexpected literal {value}")),
    }
}

/// Object type metadata
pub struct ObjectType {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    fields: Thunked<FieldsModel>,
    interfaces: Thunked<Vec<ArcStr>>,
    pub(crate) is_type_of: Option<IsTypeOfFn>,
}

impl ObjectType {
    /// New object type with the given fields.
    pub fn new(name: impl Into<ArcStr>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Thunked::eager(index_fields(fields)),
            interfaces: Thunked::eager(vec![]),
            is_type_of: None,
        }
    }

    /// New object type whose field list is produced on demand.
    ///
    /// Use this when field types refer back to the object being defined.
    pub fn with_deferred_fields<F>(name: impl Into<ArcStr>, fields: F) -> Self
    where
        F: FnOnce() -> Vec<Field> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            fields: Thunked::deferred(move || index_fields(fields())),
            interfaces: Thunked::eager(vec![]),
            is_type_of: None,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares the interfaces this object implements.
    pub fn interfaces<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<ArcStr>,
    {
        self.interfaces = Thunked::eager(names.into_iter().map(Into::into).collect());
        self
    }

    /// Installs the predicate deciding whether an abstract-typed source value
    /// belongs to this object type.
    pub fn is_type_of<F>(mut self, f: F) -> Self
    where
        F: Fn(&Resolved, &ResolveInfo<'_>) -> bool + Send + Sync + 'static,
    {
        self.is_type_of = Some(Box::new(f));
        self
    }

    pub(crate) fn fields_model(&self) -> &FieldsModel {
        self.fields.get()
    }

    pub(crate) fn interface_names(&self) -> &[ArcStr] {
        self.interfaces.get()
    }
}

/// Interface type metadata
pub struct InterfaceType {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    fields: Thunked<FieldsModel>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

impl InterfaceType {
    /// New interface type with the given fields.
    pub fn new(name: impl Into<ArcStr>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Thunked::eager(index_fields(fields)),
            resolve_type: None,
        }
    }

    /// New interface type whose field list is produced on demand.
    pub fn with_deferred_fields<F>(name: impl Into<ArcStr>, fields: F) -> Self
    where
        F: FnOnce() -> Vec<Field> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            fields: Thunked::deferred(move || index_fields(fields())),
            resolve_type: None,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Installs the function mapping a source value to the name of its
    /// concrete object type.
    ///
    /// Without it, the implementors' `is_type_of` predicates are probed in
    /// name order.
    pub fn resolve_type<F>(mut self, f: F) -> Self
    where
        F: Fn(&Resolved, &ResolveInfo<'_>) -> Option<ArcStr> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Box::new(f));
        self
    }

    pub(crate) fn fields_model(&self) -> &FieldsModel {
        self.fields.get()
    }
}

/// Union type metadata
pub struct UnionType {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    pub(crate) types: Vec<ArcStr>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

impl UnionType {
    /// New union over the named object types.
    pub fn new<I, N>(name: impl Into<ArcStr>, types: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<ArcStr>,
    {
        Self {
            name: name.into(),
            description: None,
            types: types.into_iter().map(Into::into).collect(),
            resolve_type: None,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Installs the function mapping a source value to the name of its
    /// concrete object type.
    pub fn resolve_type<F>(mut self, f: F) -> Self
    where
        F: Fn(&Resolved, &ResolveInfo<'_>) -> Option<ArcStr> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Box::new(f));
        self
    }
}

/// Enum type metadata
pub struct EnumType {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    pub(crate) values: Vec<Arc<EnumValue>>,
}

impl EnumType {
    /// New enum over the given values.
    pub fn new(name: impl Into<ArcStr>, values: Vec<EnumValue>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: values.into_iter().map(Arc::new).collect(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn value_by_name(&self, name: &str) -> Option<&Arc<EnumValue>> {
        self.values.iter().find(|v| v.name == name)
    }

    pub(crate) fn name_for_value(&self, value: &Value) -> Option<&ArcStr> {
        self.values
            .iter()
            .find(|v| &v.value == value)
            .map(|v| &v.name)
    }
}

/// Input object type metadata
pub struct InputObjectType {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    pub(crate) input_fields: Vec<Arc<Argument>>,
}

impl InputObjectType {
    /// New input object with the given fields.
    pub fn new(name: impl Into<ArcStr>, input_fields: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_fields: input_fields.into_iter().map(Arc::new).collect(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn field_by_name(&self, name: &str) -> Option<&Arc<Argument>> {
        self.input_fields.iter().find(|f| f.name == name)
    }
}

/// Metadata for a named schema type
///
/// The closed set of type kinds a schema is assembled from.
pub enum NamedType {
    /// Scalar type.
    Scalar(ScalarType),
    /// Object type.
    Object(ObjectType),
    /// Interface type.
    Interface(InterfaceType),
    /// Union type.
    Union(UnionType),
    /// Enum type.
    Enum(EnumType),
    /// Input object type.
    InputObject(InputObjectType),
}

impl NamedType {
    /// Name of this type.
    pub fn name(&self) -> &ArcStr {
        match self {
            Self::Scalar(t) => &t.name,
            Self::Object(t) => &t.name,
            Self::Interface(t) => &t.name,
            Self::Union(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::InputObject(t) => &t.name,
        }
    }

    /// Description of this type, if set.
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(t) => t.description.as_ref(),
            Self::Object(t) => t.description.as_ref(),
            Self::Interface(t) => t.description.as_ref(),
            Self::Union(t) => t.description.as_ref(),
            Self::Enum(t) => t.description.as_ref(),
            Self::InputObject(t) => t.description.as_ref(),
        }
    }

    /// Kind of this type.
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::Object(_) => TypeKind::Object,
            Self::Interface(_) => TypeKind::Interface,
            Self::Union(_) => TypeKind::Union,
            Self::Enum(_) => TypeKind::Enum,
            Self::InputObject(_) => TypeKind::InputObject,
        }
    }

    /// Fields of this type, for objects and interfaces.
    pub fn fields(&self) -> Option<&FieldsMap> {
        match self {
            Self::Object(t) => Some(&t.fields_model().map),
            Self::Interface(t) => Some(&t.fields_model().map),
            _ => None,
        }
    }

    /// Looks up a field definition by name, for objects and interfaces.
    pub fn field_by_name(&self, name: &str) -> Option<&Arc<Field>> {
        self.fields().and_then(|fields| fields.get(name))
    }

    /// Looks up an input field definition by name, for input objects.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Arc<Argument>> {
        match self {
            Self::InputObject(t) => t.field_by_name(name),
            _ => None,
        }
    }

    /// Is this an object, interface or union type?
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Interface(_) | Self::Union(_))
    }

    /// Is this an interface or union type?
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Union(_))
    }

    /// Is this a scalar or enum type?
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }

    /// Can this type be used in input positions?
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }

    /// Construction diagnostics for this type
    ///
    /// Forces any deferred field list. Called once per type when the schema
    /// is assembled; all diagnostics are collected rather than panicking.
    pub(crate) fn check(&self) -> Vec<String> {
        let mut errors = vec![];

        if let Err(e) = validate_name(self.name()) {
            errors.push(e);
        }

        match self {
            Self::Scalar(t) => {
                if t.parse_value.is_some() != t.parse_literal.is_some() {
                    errors.push(format!(
                        "{} must provide both parseValue and parseLiteral functions.",
                        t.name,
                    ));
                }
            }
            Self::Object(t) => {
                check_fields(&t.name, t.fields_model(), &mut errors);
            }
            Self::Interface(t) => {
                check_fields(&t.name, t.fields_model(), &mut errors);
            }
            Self::Union(t) => {
                if t.types.is_empty() {
                    errors.push(format!("Must provide types for Union {}.", t.name));
                }
            }
            Self::Enum(t) => {
                if t.values.is_empty() {
                    errors.push(format!("{} values must be a non-empty set.", t.name));
                }
                let mut seen = FnvHashMap::default();
                for value in &t.values {
                    if let Err(e) = validate_name(&value.name) {
                        errors.push(e);
                    }
                    if seen.insert(value.name.clone(), ()).is_some() {
                        errors.push(format!(
                            "{} may declare value {} only once.",
                            t.name, value.name,
                        ));
                    }
                }
            }
            Self::InputObject(t) => {
                let mut seen = FnvHashMap::default();
                for field in &t.input_fields {
                    if let Err(e) = validate_name(&field.name) {
                        errors.push(e);
                    }
                    if seen.insert(field.name.clone(), ()).is_some() {
                        errors.push(format!(
                            "{} may declare field {} only once.",
                            t.name, field.name,
                        ));
                    }
                }
            }
        }

        errors
    }
}

fn check_fields(type_name: &str, model: &FieldsModel, errors: &mut Vec<String>) {
    if model.map.is_empty() {
        errors.push(format!("{type_name} fields must be a non-empty set."));
    }
    if let Some(dup) = &model.duplicate {
        errors.push(format!("{type_name} may declare field {dup} only once."));
    }
    for field in model.map.values() {
        if let Err(e) = validate_name(&field.name) {
            errors.push(e);
        }
        let mut seen = FnvHashMap::default();
        for arg in &field.arguments {
            if let Err(e) = validate_name(&arg.name) {
                errors.push(e);
            }
            if seen.insert(arg.name.clone(), ()).is_some() {
                errors.push(format!(
                    "{type_name}.{} may declare argument {} only once.",
                    field.name, arg.name,
                ));
            }
        }
    }
}

impl fmt::Debug for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedType")
            .field("kind", &self.kind())
            .field("name", self.name())
            .finish_non_exhaustive()
    }
}

impl From<ScalarType> for NamedType {
    fn from(t: ScalarType) -> Self {
        Self::Scalar(t)
    }
}

impl From<ObjectType> for NamedType {
    fn from(t: ObjectType) -> Self {
        Self::Object(t)
    }
}

impl From<InterfaceType> for NamedType {
    fn from(t: InterfaceType) -> Self {
        Self::Interface(t)
    }
}

impl From<UnionType> for NamedType {
    fn from(t: UnionType) -> Self {
        Self::Union(t)
    }
}

impl From<EnumType> for NamedType {
    fn from(t: EnumType) -> Self {
        Self::Enum(t)
    }
}

impl From<InputObjectType> for NamedType {
    fn from(t: InputObjectType) -> Self {
        Self::InputObject(t)
    }
}

/// Location a directive may be applied in, per the GraphQL type system.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    /// The introspection name of this location.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
            Self::Subscription => "SUBSCRIPTION",
            Self::Field => "FIELD",
            Self::FragmentDefinition => "FRAGMENT_DEFINITION",
            Self::FragmentSpread => "FRAGMENT_SPREAD",
            Self::InlineFragment => "INLINE_FRAGMENT",
            Self::Schema => "SCHEMA",
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::FieldDefinition => "FIELD_DEFINITION",
            Self::ArgumentDefinition => "ARGUMENT_DEFINITION",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::EnumValue => "ENUM_VALUE",
            Self::InputObject => "INPUT_OBJECT",
            Self::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
            Self::Field => "field",
            Self::FragmentDefinition => "fragment definition",
            Self::FragmentSpread => "fragment spread",
            Self::InlineFragment => "inline fragment",
            Self::Schema => "schema",
            Self::Scalar => "scalar",
            Self::Object => "object",
            Self::FieldDefinition => "field definition",
            Self::ArgumentDefinition => "argument definition",
            Self::Interface => "interface",
            Self::Union => "union",
            Self::Enum => "enum",
            Self::EnumValue => "enum value",
            Self::InputObject => "input object",
            Self::InputFieldDefinition => "input field definition",
        };
        f.write_str(s)
    }
}

/// Directive declared by the schema, usable in queries
#[derive(Debug)]
pub struct DirectiveType {
    /// Name of this directive, without the `@`.
    pub name: ArcStr,
    /// Optional description, for introspection.
    pub description: Option<ArcStr>,
    /// Locations this directive may appear in.
    pub locations: Vec<DirectiveLocation>,
    /// Declared arguments.
    pub arguments: Vec<Arc<Argument>>,
}

impl DirectiveType {
    /// New directive usable in the given locations.
    pub fn new<I>(name: impl Into<ArcStr>, locations: I) -> Self
    where
        I: IntoIterator<Item = DirectiveLocation>,
    {
        Self {
            name: name.into(),
            description: None,
            locations: locations.into_iter().collect(),
            arguments: vec![],
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares an argument.
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(Arc::new(argument));
        self
    }

    pub(crate) fn new_skip() -> Self {
        Self::new(
            arcstr::literal!("skip"),
            [
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
        )
        .description(arcstr::literal!(
            "Directs the executor to skip this field or fragment when the `if` argument is true."
        ))
        .argument(Argument::new(
            arcstr::literal!("if"),
            TypeRef::boolean().non_null(),
        ))
    }

    pub(crate) fn new_include() -> Self {
        Self::new(
            arcstr::literal!("include"),
            [
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
        )
        .description(arcstr::literal!(
            "Directs the executor to include this field or fragment only when the `if` argument is true."
        ))
        .argument(Argument::new(
            arcstr::literal!("if"),
            TypeRef::boolean().non_null(),
        ))
    }

    /// Looks up a declared argument by name.
    pub fn argument_by_name(&self, name: &str) -> Option<&Arc<Argument>> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

/// Checks a type, field or argument name against the GraphQL grammar.
pub(crate) fn validate_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic());
    let valid_rest = chars.all(|c| c == '_' || c.is_ascii_alphanumeric());

    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(format!(
            "Names must match /^[_a-zA-Z][_a-zA-Z0-9]*$/ but \"{name}\" does not.",
        ))
    }
}
