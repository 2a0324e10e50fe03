use std::{fmt, sync::Arc, sync::OnceLock};

use arcstr::ArcStr;
use fnv::FnvHashMap;

use crate::{
    ast,
    schema::{
        introspection,
        meta::{DirectiveType, Field, NamedType, ScalarType, TypeRef},
    },
    value::Value,
};

/// Assembled, immutable schema shared by every request
///
/// Built once through [`Schema::builder`]; the type map is closed, every type
/// reference resolves, and all deferred field lists have been forced.
pub struct Schema {
    query_type_name: ArcStr,
    mutation_type_name: Option<ArcStr>,
    subscription_type_name: Option<ArcStr>,
    types: FnvHashMap<ArcStr, Arc<NamedType>>,
    directives: Vec<Arc<DirectiveType>>,
    typename_field: Arc<Field>,
    schema_field: Arc<Field>,
    type_field: Arc<Field>,
    possible: OnceLock<FnvHashMap<ArcStr, Vec<ArcStr>>>,
}

/// Errors detected while assembling a schema
///
/// Every diagnostic is collected before reporting, so one `build` surfaces
/// all construction mistakes at once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchemaError {
    /// The individual diagnostics.
    pub errors: Vec<String>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Incrementally describes a schema before it is assembled.
pub struct SchemaBuilder {
    query: NamedType,
    mutation: Option<NamedType>,
    subscription: Option<NamedType>,
    extra: Vec<NamedType>,
    directives: Vec<DirectiveType>,
}

impl SchemaBuilder {
    /// Sets the mutation root type.
    pub fn mutation(mut self, mutation: impl Into<NamedType>) -> Self {
        self.mutation = Some(mutation.into());
        self
    }

    /// Sets the subscription root type.
    pub fn subscription(mut self, subscription: impl Into<NamedType>) -> Self {
        self.subscription = Some(subscription.into());
        self
    }

    /// Registers a type not reachable from the roots alone, e.g. an object
    /// only returned through an interface.
    pub fn register(mut self, t: impl Into<NamedType>) -> Self {
        self.extra.push(t.into());
        self
    }

    /// Declares an additional directive beyond `@skip` and `@include`.
    pub fn directive(mut self, directive: DirectiveType) -> Self {
        self.directives.push(directive);
        self
    }

    /// Assembles the schema, forcing all deferred field lists and collecting
    /// every construction diagnostic.
    pub fn finish(self) -> Result<Arc<Schema>, SchemaError> {
        let mut errors = vec![];
        let mut types: FnvHashMap<ArcStr, Arc<NamedType>> = FnvHashMap::default();

        let mut insert = |t: NamedType, errors: &mut Vec<String>| -> ArcStr {
            let name = t.name().clone();
            if types.insert(name.clone(), Arc::new(t)).is_some() {
                errors.push(format!(
                    "Schema must contain unique named types but contains multiple types named \"{name}\".",
                ));
            }
            name
        };

        for scalar in built_in_scalars() {
            insert(scalar, &mut errors);
        }
        for meta in introspection::meta_types() {
            insert(meta, &mut errors);
        }

        if !matches!(self.query, NamedType::Object(_)) {
            errors.push(format!(
                "Schema query must be Object Type but got: {}.",
                self.query.name(),
            ));
        }
        let query_type_name = insert(self.query, &mut errors);

        let mutation_type_name = self.mutation.map(|m| {
            if !matches!(m, NamedType::Object(_)) {
                errors.push(format!(
                    "Schema mutation must be Object Type but got: {}.",
                    m.name(),
                ));
            }
            insert(m, &mut errors)
        });
        let subscription_type_name = self.subscription.map(|s| {
            if !matches!(s, NamedType::Object(_)) {
                errors.push(format!(
                    "Schema subscription must be Object Type but got: {}.",
                    s.name(),
                ));
            }
            insert(s, &mut errors)
        });

        for t in self.extra {
            insert(t, &mut errors);
        }

        let mut directives = vec![
            Arc::new(DirectiveType::new_skip()),
            Arc::new(DirectiveType::new_include()),
        ];
        for directive in self.directives {
            if directives.iter().any(|d| d.name == directive.name) {
                errors.push(format!(
                    "Schema must contain unique directives but contains multiple directives named \"@{}\".",
                    directive.name,
                ));
            }
            directives.push(Arc::new(directive));
        }

        let schema = Schema {
            query_type_name,
            mutation_type_name,
            subscription_type_name,
            types,
            directives,
            typename_field: Arc::new(introspection::typename_meta_field()),
            schema_field: Arc::new(introspection::schema_meta_field()),
            type_field: Arc::new(introspection::type_meta_field()),
            possible: OnceLock::new(),
        };

        schema.check(&mut errors);

        if errors.is_empty() {
            Ok(Arc::new(schema))
        } else {
            Err(SchemaError { errors })
        }
    }
}

impl Schema {
    /// Starts a schema description with the given query root type.
    pub fn builder(query: impl Into<NamedType>) -> SchemaBuilder {
        SchemaBuilder {
            query: query.into(),
            mutation: None,
            subscription: None,
            extra: vec![],
            directives: vec![],
        }
    }

    /// Closure diagnostics: forces every deferred field list and verifies
    /// that all type references resolve within the map.
    fn check(&self, errors: &mut Vec<String>) {
        let check_ref = |owner: &ArcStr, r: &TypeRef, input: bool, errors: &mut Vec<String>| {
            if r.has_doubled_non_null() {
                errors.push(format!(
                    "{owner} uses invalid type {r}: non-null cannot wrap non-null.",
                ));
            }
            match self.types.get(r.innermost_name()) {
                None => errors.push(format!(
                    "{owner} references unknown type \"{}\".",
                    r.innermost_name(),
                )),
                Some(t) if input && !t.is_input() => errors.push(format!(
                    "{owner} uses type \"{}\" which cannot be used as an input type.",
                    t.name(),
                )),
                Some(t) if !input && t.is_input() && !t.is_leaf() => errors.push(format!(
                    "{owner} uses input type \"{}\" in an output position.",
                    t.name(),
                )),
                Some(_) => {}
            }
        };

        for t in self.types.values() {
            errors.extend(t.check());

            if let Some(fields) = t.fields() {
                for field in fields.values() {
                    let owner: ArcStr = format!("{}.{}", t.name(), field.name).into();
                    check_ref(&owner, &field.field_type, false, errors);
                    for arg in &field.arguments {
                        check_ref(&owner, &arg.arg_type, true, errors);
                    }
                }
            }

            match &**t {
                NamedType::Object(o) => {
                    for iface in o.interface_names() {
                        match self.types.get(iface).map(|t| &**t) {
                            Some(NamedType::Interface(_)) => {}
                            _ => errors.push(format!(
                                "{} may only implement Interface types, it cannot implement \"{iface}\".",
                                t.name(),
                            )),
                        }
                    }
                }
                NamedType::Union(u) => {
                    for member in &u.types {
                        match self.types.get(member).map(|t| &**t) {
                            Some(NamedType::Object(o)) => {
                                // Unresolvable at runtime, so rejected here.
                                if u.resolve_type.is_none() && o.is_type_of.is_none() {
                                    errors.push(format!(
                                        "Union type {} does not provide a \"resolveType\" \
                                         function and possible type {member} does not provide \
                                         an \"isTypeOf\" function. There is no way to resolve \
                                         this possible type during execution.",
                                        t.name(),
                                    ));
                                }
                            }
                            _ => errors.push(format!(
                                "{} may only contain Object types, it cannot contain \"{member}\".",
                                t.name(),
                            )),
                        }
                    }
                }
                NamedType::InputObject(io) => {
                    for field in &io.input_fields {
                        let owner: ArcStr = format!("{}.{}", t.name(), field.name).into();
                        check_ref(&owner, &field.arg_type, true, errors);
                    }
                }
                _ => {}
            }
        }

        for directive in &self.directives {
            for arg in &directive.arguments {
                let owner: ArcStr = format!("@{}({}:)", directive.name, arg.name).into();
                check_ref(&owner, &arg.arg_type, true, errors);
            }
        }
    }

    /// Looks up a named type.
    pub fn concrete_type_by_name(&self, name: &str) -> Option<&Arc<NamedType>> {
        self.types.get(name)
    }

    /// The query root type.
    pub fn query_type(&self) -> &Arc<NamedType> {
        self.types
            .get(&self.query_type_name)
            .unwrap_or_else(|| unreachable!("query root registered at build time"))
    }

    /// The mutation root type, if the schema has one.
    pub fn mutation_type(&self) -> Option<&Arc<NamedType>> {
        self.mutation_type_name
            .as_ref()
            .and_then(|name| self.types.get(name))
    }

    /// The subscription root type, if the schema has one.
    pub fn subscription_type(&self) -> Option<&Arc<NamedType>> {
        self.subscription_type_name
            .as_ref()
            .and_then(|name| self.types.get(name))
    }

    /// All named types, sorted by name.
    pub fn type_list(&self) -> Vec<&Arc<NamedType>> {
        let mut types: Vec<_> = self.types.values().collect();
        types.sort_by_key(|t| t.name());
        types
    }

    /// All declared directives.
    pub fn directive_list(&self) -> &[Arc<DirectiveType>] {
        &self.directives
    }

    /// Looks up a directive by name.
    pub fn directive_by_name(&self, name: &str) -> Option<&Arc<DirectiveType>> {
        self.directives.iter().find(|d| d.name == name)
    }

    /// Resolves a type reference into a wrapped view over the named types.
    pub fn make_type(&self, r: &TypeRef) -> Option<TypeType<'_>> {
        match r {
            TypeRef::Named(name) => self.types.get(name.as_str()).map(TypeType::Concrete),
            TypeRef::List(inner) => self.make_type(inner).map(|t| TypeType::List(Box::new(t))),
            TypeRef::NonNull(inner) => {
                self.make_type(inner).map(|t| TypeType::NonNull(Box::new(t)))
            }
        }
    }

    /// Resolves a syntactic type literal against this schema.
    pub fn make_type_from_ast(&self, t: &ast::Type<'_>) -> Option<TypeType<'_>> {
        match t {
            ast::Type::Named(name) => self.types.get(name.as_ref()).map(TypeType::Concrete),
            ast::Type::NonNullNamed(name) => self
                .types
                .get(name.as_ref())
                .map(|t| TypeType::NonNull(Box::new(TypeType::Concrete(t)))),
            ast::Type::List(inner) => self
                .make_type_from_ast(inner)
                .map(|t| TypeType::List(Box::new(t))),
            ast::Type::NonNullList(inner) => self
                .make_type_from_ast(inner)
                .map(|t| TypeType::NonNull(Box::new(TypeType::List(Box::new(t))))),
        }
    }

    fn possible_map(&self) -> &FnvHashMap<ArcStr, Vec<ArcStr>> {
        self.possible.get_or_init(|| {
            let mut map: FnvHashMap<ArcStr, Vec<ArcStr>> = FnvHashMap::default();

            for t in self.types.values() {
                match &**t {
                    NamedType::Union(u) => {
                        map.insert(t.name().clone(), u.types.clone());
                    }
                    NamedType::Object(o) => {
                        for iface in o.interface_names() {
                            map.entry(iface.clone()).or_default().push(t.name().clone());
                        }
                    }
                    _ => {}
                }
            }

            for members in map.values_mut() {
                members.sort();
            }

            map
        })
    }

    /// The names of the object types an abstract type can resolve to.
    pub fn possible_type_names(&self, abstract_name: &str) -> &[ArcStr] {
        self.possible_map()
            .get(abstract_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The object types an abstract type can resolve to.
    pub fn possible_types(&self, abstract_name: &str) -> Vec<&Arc<NamedType>> {
        self.possible_type_names(abstract_name)
            .iter()
            .filter_map(|name| self.types.get(name))
            .collect()
    }

    /// Is `object_name` one of the possible types of `abstract_name`?
    pub fn is_possible_type(&self, abstract_name: &str, object_name: &str) -> bool {
        self.possible_type_names(abstract_name)
            .iter()
            .any(|n| n == object_name)
    }

    /// Can values of both types exist at the same runtime position?
    pub fn type_overlap(&self, a: &NamedType, b: &NamedType) -> bool {
        if a.name() == b.name() {
            return true;
        }

        match (a.is_abstract(), b.is_abstract()) {
            (true, true) => self
                .possible_type_names(a.name())
                .iter()
                .any(|n| self.is_possible_type(b.name(), n)),
            (true, false) => self.is_possible_type(a.name(), b.name()),
            (false, true) => self.is_possible_type(b.name(), a.name()),
            (false, false) => false,
        }
    }

    /// Does every value of `sub_type` fit into a position declared as
    /// `super_type`?
    pub fn is_subtype(&self, sub_type: &ast::Type<'_>, super_type: &ast::Type<'_>) -> bool {
        use ast::Type::{List, Named, NonNullList, NonNullNamed};

        if super_type == sub_type {
            return true;
        }

        match (super_type, sub_type) {
            (Named(super_name), Named(sub_name))
            | (NonNullNamed(super_name), NonNullNamed(sub_name))
            | (Named(super_name), NonNullNamed(sub_name)) => {
                self.is_named_subtype(sub_name, super_name)
            }
            (List(super_inner), List(sub_inner))
            | (NonNullList(super_inner), NonNullList(sub_inner))
            | (List(super_inner), NonNullList(sub_inner)) => {
                self.is_subtype(sub_inner, super_inner)
            }
            _ => false,
        }
    }

    fn is_named_subtype(&self, sub_name: &str, super_name: &str) -> bool {
        sub_name == super_name || self.is_possible_type(super_name, sub_name)
    }

    /// Looks up a field on a type, including the meta fields
    ///
    /// `__typename` is visible on every composite type. `__schema` and
    /// `__type` are visible on the query root, but only while introspection
    /// is enabled; with introspection disabled they behave like unknown
    /// fields.
    pub fn field_on_type<'s>(
        &'s self,
        t: &'s NamedType,
        name: &str,
        introspection_enabled: bool,
    ) -> Option<&'s Arc<Field>> {
        if name == "__typename" && t.is_composite() {
            return Some(&self.typename_field);
        }
        if introspection_enabled && t.name() == &self.query_type_name {
            if name == "__schema" {
                return Some(&self.schema_field);
            }
            if name == "__type" {
                return Some(&self.type_field);
            }
        }
        t.field_by_name(name)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("query", &self.query_type_name)
            .field("mutation", &self.mutation_type_name)
            .field("subscription", &self.subscription_type_name)
            .field("types", &self.types.len())
            .finish_non_exhaustive()
    }
}

/// Wrapped view over named types, produced by resolving a [`TypeRef`] or a
/// syntactic type literal.
#[derive(Clone, Debug)]
pub enum TypeType<'a> {
    /// A named type from the schema.
    Concrete(&'a Arc<NamedType>),
    /// A non-null marker around the inner type.
    NonNull(Box<TypeType<'a>>),
    /// A list wrapping the inner type.
    List(Box<TypeType<'a>>),
}

impl<'a> TypeType<'a> {
    /// The named type at the core of this wrapped view.
    pub fn innermost_concrete(&self) -> &'a Arc<NamedType> {
        match self {
            Self::Concrete(t) => t,
            Self::NonNull(inner) | Self::List(inner) => inner.innermost_concrete(),
        }
    }

    /// Is the outermost wrapper a non-null marker?
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// The element type, if this (possibly behind non-null) is a list.
    pub fn list_contents(&self) -> Option<&TypeType<'a>> {
        match self {
            Self::List(inner) => Some(inner),
            Self::NonNull(inner) => inner.list_contents(),
            Self::Concrete(_) => None,
        }
    }

    /// Strips one non-null wrapper, if present.
    pub fn remove_non_null(&self) -> &TypeType<'a> {
        match self {
            Self::NonNull(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for TypeType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(t) => write!(f, "{}", t.name()),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

fn built_in_scalars() -> Vec<NamedType> {
    vec![
        int_scalar().into(),
        float_scalar().into(),
        string_scalar().into(),
        boolean_scalar().into(),
        id_scalar().into(),
    ]
}

fn coerce_int(value: &Value) -> Result<Value, String> {
    match value {
        Value::Int(i) if i32::try_from(*i).is_ok() => Ok(Value::Int(*i)),
        Value::Int(i) => Err(format!(
            "Int cannot represent non 32-bit signed integer value: {i}",
        )),
        Value::Float(f) if f.fract() == 0.0 && i32::try_from(*f as i64).is_ok() => {
            Ok(Value::Int(*f as i64))
        }
        v => Err(format!("Int cannot represent non-integer value: {v}")),
    }
}

fn int_scalar() -> ScalarType {
    ScalarType::new(arcstr::literal!("Int"))
        .description(arcstr::literal!(
            "The `Int` scalar type represents non-fractional signed whole numeric values. \
             Int can represent values between -(2^31) and 2^31 - 1.",
        ))
        .serialize_fn(|v| coerce_int(v).ok())
        .parse_value_fn(coerce_int)
        .parse_literal_fn(|v| match v {
            crate::ast::InputValue::Int(i) => Ok(Value::Int((*i).into())),
            v => Err(format!("Int cannot represent non-integer value: {v}")),
        })
}

fn coerce_float(value: &Value) -> Result<Value, String> {
    match value {
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        v => Err(format!("Float cannot represent non numeric value: {v}")),
    }
}

fn float_scalar() -> ScalarType {
    ScalarType::new(arcstr::literal!("Float"))
        .description(arcstr::literal!(
            "The `Float` scalar type represents signed double-precision fractional values \
             as specified by IEEE 754.",
        ))
        .serialize_fn(|v| coerce_float(v).ok())
        .parse_value_fn(coerce_float)
        .parse_literal_fn(|v| match v {
            crate::ast::InputValue::Int(i) => Ok(Value::Float((*i).into())),
            crate::ast::InputValue::Float(f) => Ok(Value::Float(*f)),
            v => Err(format!("Float cannot represent non numeric value: {v}")),
        })
}

fn coerce_string(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(s) => Ok(Value::String(s.clone())),
        v => Err(format!("String cannot represent a non string value: {v}")),
    }
}

fn string_scalar() -> ScalarType {
    ScalarType::new(arcstr::literal!("String"))
        .description(arcstr::literal!(
            "The `String` scalar type represents textual data, represented as UTF-8 \
             character sequences.",
        ))
        .serialize_fn(|v| match v {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Boolean(b) => Some(Value::String(b.to_string())),
            Value::Int(i) => Some(Value::String(i.to_string())),
            Value::Float(f) => Some(Value::String(f.to_string())),
            _ => None,
        })
        .parse_value_fn(coerce_string)
        .parse_literal_fn(|v| match v {
            crate::ast::InputValue::String(s) => Ok(Value::String(s.clone())),
            v => Err(format!("String cannot represent a non string value: {v}")),
        })
}

fn coerce_boolean(value: &Value) -> Result<Value, String> {
    match value {
        Value::Boolean(b) => Ok(Value::Boolean(*b)),
        v => Err(format!("Boolean cannot represent a non boolean value: {v}")),
    }
}

fn boolean_scalar() -> ScalarType {
    ScalarType::new(arcstr::literal!("Boolean"))
        .description(arcstr::literal!(
            "The `Boolean` scalar type represents `true` or `false`.",
        ))
        .serialize_fn(|v| coerce_boolean(v).ok())
        .parse_value_fn(coerce_boolean)
        .parse_literal_fn(|v| match v {
            crate::ast::InputValue::Boolean(b) => Ok(Value::Boolean(*b)),
            v => Err(format!("Boolean cannot represent a non boolean value: {v}")),
        })
}

fn coerce_id(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Int(i) => Ok(Value::String(i.to_string())),
        v => Err(format!("ID cannot represent value: {v}")),
    }
}

fn id_scalar() -> ScalarType {
    ScalarType::new(arcstr::literal!("ID"))
        .description(arcstr::literal!(
            "The `ID` scalar type represents a unique identifier, often used to refetch \
             an object or as key for a cache. The ID type appears in a JSON response as a \
             String; however, it is not intended to be human-readable.",
        ))
        .serialize_fn(|v| coerce_id(v).ok())
        .parse_value_fn(coerce_id)
        .parse_literal_fn(|v| match v {
            crate::ast::InputValue::String(s) => Ok(Value::String(s.clone())),
            crate::ast::InputValue::Int(i) => Ok(Value::String(i.to_string())),
            v => Err(format!("ID cannot represent value: {v}")),
        })
}
