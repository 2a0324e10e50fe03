//! Query execution: operation selection, field collection and value
//! completion
//!
//! Execution is strictly serial on the calling thread. Mutations get their
//! ordering guarantee directly from that: each root field's entire sub-tree
//! completes before the next root field starts.

mod variables;

use std::{
    collections::HashSet,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};

use fnv::FnvHashMap;
use indexmap::IndexMap;

use crate::{
    ast::{
        Definition, Directive, Document, Field as FieldAst, Fragment, Operation, OperationType,
        Selection,
    },
    coroutine::CoroutineControl,
    error::{ErrorKind, ExecutionError, FieldError, PathSegment, Response},
    parser::{SourcePosition, Spanning},
    schema::{
        meta::{Field, NamedType, TypeRef},
        model::{Schema, TypeType},
    },
    trace::Tracer,
    value::{Object, Resolved, Value},
    FieldResult,
};

pub(crate) use self::variables::{coerce_variable_values, collect_argument_values};

/// Raw or coerced variable values, keyed by variable name.
pub type Variables = IndexMap<String, Value>;

/// Resolver installed on a field definition.
pub(crate) type BoxResolver =
    Box<dyn Fn(&ResolverContext<'_>, ResolverArgs<'_>) -> FieldResult + Send + Sync>;

/// Hook invoked when a deprecated field is selected.
pub type DeprecationHook<'a> = Box<dyn Fn(&ResolveInfo<'_>) -> Result<(), FieldError> + 'a>;

/// Hook invoked for every directive attached to a selected field definition.
pub type DirectiveHook<'a> =
    Box<dyn Fn(&crate::schema::meta::AppliedDirective, &ResolveInfo<'_>) -> Result<(), FieldError> + 'a>;

/// Static facts about the field being resolved, handed to resolvers,
/// `isTypeOf`/`resolveType` callbacks and the execution hooks.
pub struct ResolveInfo<'a> {
    /// Name of the field, without any alias.
    pub field_name: &'a str,
    /// Every field AST merged under the response name being resolved.
    pub field_asts: &'a [&'a Spanning<FieldAst<'a>>],
    /// Declared output type of the field.
    pub field_type: &'a TypeRef,
    /// The object type the field was selected on.
    pub parent_type: &'a Arc<NamedType>,
    /// The schema the request runs against.
    pub schema: &'a Schema,
    /// Fragment definitions of the executing document, by name.
    pub fragments: &'a FnvHashMap<&'a str, &'a Spanning<Fragment<'a>>>,
    /// Source value the root selection set is resolved against.
    pub root_value: &'a Resolved,
    /// The operation being executed.
    pub operation: &'a Spanning<Operation<'a>>,
    /// Coerced variable values of the request.
    pub variables: &'a Variables,
}

/// Everything a resolver can see besides its arguments.
pub struct ResolverContext<'a> {
    source: &'a Resolved,
    schema: &'a Schema,
    request: &'a RequestContext,
    info: &'a ResolveInfo<'a>,
}

impl<'a> ResolverContext<'a> {
    /// The parent source value this field is resolved against.
    pub fn source(&self) -> &'a Resolved {
        self.source
    }

    /// The schema the request runs against.
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// The cancellation and coroutine state of the request.
    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    /// Static facts about the field being resolved.
    pub fn info(&self) -> &'a ResolveInfo<'a> {
        self.info
    }
}

/// Coerced argument values for one resolver invocation.
pub struct ResolverArgs<'a> {
    values: &'a Object,
}

impl<'a> ResolverArgs<'a> {
    /// Looks up an argument by name. Omitted and nullish arguments are
    /// absent.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.values.get_field_value(name)
    }

    /// Iterates over the collected arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.values.iter()
    }
}

/// Shared per-request cancellation and coroutine state
///
/// Cloneable through [`RequestContext::detach`] and shareable behind an
/// [`Arc`], so a caller can cancel a request that is executing on another
/// thread.
pub struct RequestContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
    coroutine: Mutex<Option<Arc<CoroutineControl>>>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    /// A context without a deadline.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
            coroutine: Mutex::new(None),
        }
    }

    /// A context that counts as cancelled once `deadline` passes.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
            coroutine: Mutex::new(None),
        }
    }

    /// Cancels the request. Execution stops at the next completion boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Has the request been cancelled or run past its deadline?
    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Attaches a coroutine's pause handle to this request.
    pub fn attach_coroutine(&self, control: Arc<CoroutineControl>) {
        *self
            .coroutine
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(control);
    }

    /// Does this request carry a coroutine?
    pub fn has_coroutine(&self) -> bool {
        self.coroutine
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    /// Yields from inside a resolver back to whoever drives the attached
    /// coroutine. A no-op when no coroutine is attached.
    pub fn pause_coroutine(&self) -> Result<(), FieldError> {
        let control = self
            .coroutine
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        match control {
            Some(control) => control.pause(),
            None => Ok(()),
        }
    }

    /// A copy of this context without the coroutine attachment, for work
    /// spawned off the request that must not race with the executor on the
    /// rendezvous channels. Cancellation state stays shared.
    pub fn detach(&self) -> Self {
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: self.deadline,
            coroutine: Mutex::new(None),
        }
    }
}

/// Per-request knobs for [`execute`].
pub struct ExecuteParams<'a> {
    /// Which operation of the document to run. Required when the document
    /// holds more than one.
    pub operation_name: Option<&'a str>,
    /// Raw variable values, usually converted from host JSON.
    pub variables: Variables,
    /// Source value the root selection set is resolved against.
    pub root: Resolved,
    /// Cancellation and coroutine state, shareable with other threads.
    pub request: Arc<RequestContext>,
    /// Notified with `{path, duration}` after each field resolve.
    pub tracer: Option<&'a dyn Tracer>,
    /// Whether `__schema` and `__type` are visible on the query root.
    pub introspection_enabled: bool,
    /// Invoked when a selected field is deprecated; an error aborts the
    /// field.
    pub on_deprecated_field: Option<DeprecationHook<'a>>,
    /// Invoked per directive attached to a selected field definition; an
    /// error aborts the field.
    pub on_field_directive: Option<DirectiveHook<'a>>,
}

impl Default for ExecuteParams<'_> {
    fn default() -> Self {
        Self {
            operation_name: None,
            variables: Variables::new(),
            root: Resolved::null(),
            request: Arc::new(RequestContext::new()),
            tracer: None,
            introspection_enabled: true,
            on_deprecated_field: None,
            on_field_directive: None,
        }
    }
}

/// Executes one operation of an already validated document.
///
/// Never panics outward: operation selection failures, variable coercion
/// failures and resolver faults all come back as entries in the response's
/// error list.
pub fn execute(schema: &Schema, document: &Document<'_>, params: ExecuteParams<'_>) -> Response {
    let mut operations = vec![];
    let mut fragments = FnvHashMap::default();
    for def in document {
        match def {
            Definition::Operation(op) => operations.push(op),
            Definition::Fragment(fragment) => {
                fragments.insert(fragment.item.name.item, fragment);
            }
        }
    }

    let operation = match select_operation(&operations, params.operation_name) {
        Ok(op) => op,
        Err(e) => return bad_query(e),
    };

    let root_type = match operation.item.operation_type {
        OperationType::Query => schema.query_type(),
        OperationType::Mutation => match schema.mutation_type() {
            Some(t) => t,
            None => return bad_query("Schema is not configured for mutations".into()),
        },
        OperationType::Subscription => match schema.subscription_type() {
            Some(t) => t,
            None => return bad_query("Schema is not configured for subscriptions".into()),
        },
    };

    let variables = match coerce_variable_values(schema, operation, &params.variables) {
        Ok(v) => v,
        Err(errors) => return Response::from_errors(errors),
    };

    let mut exec = ExecutionContext {
        schema,
        fragments,
        operation,
        root: &params.root,
        variables,
        request: &params.request,
        tracer: params.tracer,
        introspection_enabled: params.introspection_enabled,
        on_deprecated_field: params.on_deprecated_field.as_deref(),
        on_field_directive: params.on_field_directive.as_deref(),
        errors: vec![],
        path: vec![],
        deadline_reported: false,
    };

    let mut collected = IndexMap::new();
    let mut visited_fragments = HashSet::new();
    exec.collect_fields(
        root_type,
        &operation.item.selection_set,
        &mut visited_fragments,
        &mut collected,
    );

    let data = match exec.resolve_selection_set(root_type, &params.root, &collected) {
        Ok(object) => Value::Object(object),
        Err(Propagated) => Value::Null,
    };

    let mut errors = exec.errors;
    errors.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    Response { data, errors }
}

fn select_operation<'a, 'd>(
    operations: &[&'a Spanning<Operation<'d>>],
    name: Option<&str>,
) -> Result<&'a Spanning<Operation<'d>>, String> {
    match name {
        Some(name) => operations
            .iter()
            .find(|op| op.item.name.map(|n| n.item) == Some(name))
            .copied()
            .ok_or_else(|| format!("Unknown operation named \"{name}\"")),
        None => match operations {
            [] => Err("Must provide an operation".into()),
            [single] => Ok(single),
            _ => Err("Must provide operation name if query contains multiple operations".into()),
        },
    }
}

fn bad_query(message: String) -> Response {
    Response::from_errors(vec![ExecutionError::at_origin(FieldError::new(
        ErrorKind::BadQuery,
        message,
    ))])
}

/// Marker for a null that must keep climbing to the nearest nullable
/// ancestor. The error behind it has already been recorded.
struct Propagated;

/// Fields grouped by response name, in first-appearance order.
type CollectedFields<'a> = IndexMap<&'a str, Vec<&'a Spanning<FieldAst<'a>>>>;

struct ExecutionContext<'a> {
    schema: &'a Schema,
    fragments: FnvHashMap<&'a str, &'a Spanning<Fragment<'a>>>,
    operation: &'a Spanning<Operation<'a>>,
    root: &'a Resolved,
    variables: Variables,
    request: &'a RequestContext,
    tracer: Option<&'a dyn Tracer>,
    introspection_enabled: bool,
    on_deprecated_field: Option<&'a (dyn Fn(&ResolveInfo<'_>) -> Result<(), FieldError> + 'a)>,
    on_field_directive: Option<
        &'a (dyn Fn(&crate::schema::meta::AppliedDirective, &ResolveInfo<'_>) -> Result<(), FieldError>
                 + 'a),
    >,
    errors: Vec<ExecutionError>,
    path: Vec<PathSegment>,
    deadline_reported: bool,
}

impl<'a> ExecutionContext<'a> {
    /// The full resolve record for one response name on `parent_type`.
    fn resolve_info<'s>(
        &'s self,
        parent_type: &'s Arc<NamedType>,
        field_def: &'s Arc<Field>,
        field_asts: &'s [&'s Spanning<FieldAst<'s>>],
    ) -> ResolveInfo<'s> {
        ResolveInfo {
            field_name: &field_def.name,
            field_asts,
            field_type: &field_def.field_type,
            parent_type,
            schema: self.schema,
            fragments: &self.fragments,
            root_value: self.root,
            operation: self.operation,
            variables: &self.variables,
        }
    }

    fn push_error(&mut self, position: SourcePosition, error: FieldError) {
        self.errors
            .push(ExecutionError::new(position, self.path.clone(), error));
    }

    /// Records the deadline error once; later observations only null fields.
    fn observe_cancellation(&mut self, position: SourcePosition) -> bool {
        if !self.request.is_cancelled() {
            return false;
        }
        if !self.deadline_reported {
            self.deadline_reported = true;
            self.push_error(position, FieldError::deadline_exceeded());
        }
        true
    }

    fn should_include(&self, directives: &Option<Vec<Spanning<Directive<'a>>>>) -> bool {
        for directive in directives.iter().flatten() {
            let name = directive.item.name.item;
            if name != "skip" && name != "include" {
                continue;
            }
            let Some(meta) = self.schema.directive_by_name(name) else {
                continue;
            };
            let args = collect_argument_values(
                self.schema,
                &meta.arguments,
                directive.item.arguments.as_ref(),
                &self.variables,
            );
            let condition = args.get_field_value("if").and_then(Value::as_bool_value);
            match name {
                "skip" if condition == Some(true) => return false,
                "include" if condition != Some(true) => return false,
                _ => {}
            }
        }
        true
    }

    fn fragment_condition_matches(
        &self,
        runtime_type: &Arc<NamedType>,
        condition: Option<&str>,
    ) -> bool {
        match condition {
            None => true,
            Some(name) if name == runtime_type.name().as_str() => true,
            Some(name) => match self.schema.concrete_type_by_name(name) {
                Some(t) if t.is_abstract() => {
                    self.schema.is_possible_type(t.name(), runtime_type.name())
                }
                _ => false,
            },
        }
    }

    /// Groups the selection set by response name against `runtime_type`,
    /// honoring `@skip`/`@include` and de-duplicating fragment spreads by
    /// name within one collection pass.
    fn collect_fields(
        &self,
        runtime_type: &'a Arc<NamedType>,
        selection_set: &'a [Selection<'a>],
        visited_fragments: &mut HashSet<&'a str>,
        into: &mut CollectedFields<'a>,
    ) {
        for selection in selection_set {
            match selection {
                Selection::Field(field) => {
                    if !self.should_include(&field.item.directives) {
                        continue;
                    }
                    let response_name = field
                        .item
                        .alias
                        .as_ref()
                        .map(|a| a.item)
                        .unwrap_or(field.item.name.item);
                    into.entry(response_name).or_default().push(field);
                }
                Selection::InlineFragment(fragment) => {
                    if !self.should_include(&fragment.item.directives) {
                        continue;
                    }
                    let condition = fragment.item.type_condition.as_ref().map(|c| c.item);
                    if !self.fragment_condition_matches(runtime_type, condition) {
                        continue;
                    }
                    self.collect_fields(
                        runtime_type,
                        &fragment.item.selection_set,
                        visited_fragments,
                        into,
                    );
                }
                Selection::FragmentSpread(spread) => {
                    if !self.should_include(&spread.item.directives) {
                        continue;
                    }
                    if !visited_fragments.insert(spread.item.name.item) {
                        continue;
                    }
                    let Some(fragment) = self.fragments.get(spread.item.name.item) else {
                        continue;
                    };
                    if !self.fragment_condition_matches(
                        runtime_type,
                        Some(fragment.item.type_condition.item),
                    ) {
                        continue;
                    }
                    self.collect_fields(
                        runtime_type,
                        &fragment.item.selection_set,
                        visited_fragments,
                        into,
                    );
                }
            }
        }
    }

    /// Resolves one grouped selection set against `source`, in collection
    /// order. `Err` climbs out of this object when a non-null field inside
    /// it failed.
    fn resolve_selection_set(
        &mut self,
        object_type: &'a Arc<NamedType>,
        source: &Resolved,
        collected: &CollectedFields<'a>,
    ) -> Result<Object, Propagated> {
        let mut result = Object::with_capacity(collected.len());

        for (response_name, field_asts) in collected {
            let field_name = field_asts[0].item.name.item;
            let Some(field_def) = self.schema.field_on_type(
                object_type,
                field_name,
                self.introspection_enabled,
            ) else {
                // Unknown fields contribute nothing, not even a null; an
                // invalid document still executes to a structured result.
                continue;
            };

            self.path.push(PathSegment::Field((*response_name).to_owned()));
            let value = self.resolve_field(object_type, field_def, source, field_asts);
            self.path.pop();

            match value {
                Ok(value) => {
                    result.add_field(*response_name, value);
                }
                Err(Propagated) => return Err(Propagated),
            }
        }

        Ok(result)
    }

    /// Resolves and completes a single field. `Err` means the field's type
    /// is non-null and its value could not be produced.
    fn resolve_field(
        &mut self,
        parent_type: &'a Arc<NamedType>,
        field_def: &Arc<Field>,
        source: &Resolved,
        field_asts: &[&'a Spanning<FieldAst<'a>>],
    ) -> Result<Value, Propagated> {
        let position = field_asts[0].span.start;
        let non_null = field_def.field_type.is_non_null();

        if self.observe_cancellation(position) {
            return self.fail(non_null);
        }

        // `__typename` never reaches a resolver; abstract parents were
        // already narrowed to the concrete object by value completion.
        if field_def.name == "__typename" {
            return Ok(Value::String(parent_type.name().to_string()));
        }

        let info = self.resolve_info(parent_type, field_def, field_asts);

        if field_def.deprecation_reason.is_some() {
            if let Some(hook) = self.on_deprecated_field {
                if let Err(e) = hook(&info) {
                    self.push_error(position, e);
                    return self.fail(non_null);
                }
            }
        }
        if let Some(hook) = self.on_field_directive {
            for directive in &field_def.directives {
                if let Err(e) = hook(directive, &info) {
                    self.push_error(position, e);
                    return self.fail(non_null);
                }
            }
        }

        let arguments = collect_argument_values(
            self.schema,
            &field_def.arguments,
            field_asts[0].item.arguments.as_ref(),
            &self.variables,
        );

        let started = Instant::now();
        let resolved = self.invoke_resolver(field_def, source, &info, &arguments);

        let completed = match resolved {
            Ok(resolved) => {
                let Some(field_type) = self.schema.make_type(&field_def.field_type) else {
                    self.push_error(
                        position,
                        FieldError::internal(format!(
                            "field \"{}\" references a type missing from the schema",
                            field_def.name,
                        )),
                    );
                    return self.fail(non_null);
                };
                self.complete_value(&field_type, parent_type, field_def, field_asts, resolved, position)
            }
            Err(e) => {
                self.push_error(position, e);
                self.fail(non_null)
            }
        };

        if let Some(tracer) = self.tracer {
            tracer.field_resolved(&self.path, started.elapsed());
        }

        match completed {
            // A nullable field is where propagated nulls come to rest.
            Err(Propagated) if !non_null => Ok(Value::Null),
            other => other,
        }
    }

    fn invoke_resolver(
        &self,
        field_def: &Arc<Field>,
        source: &Resolved,
        info: &ResolveInfo<'_>,
        arguments: &Object,
    ) -> FieldResult {
        let Some(resolver) = &field_def.resolver else {
            return Ok(default_resolve(source, &field_def.name));
        };

        let ctx = ResolverContext {
            source,
            schema: self.schema,
            request: self.request,
            info,
        };
        let args = ResolverArgs { values: arguments };

        // A panicking resolver must never take the whole request down.
        match catch_unwind(AssertUnwindSafe(|| resolver(&ctx, args))) {
            Ok(result) => result,
            Err(payload) => Err(FieldError::internal(panic_message(&payload))),
        }
    }

    /// Null for a nullable position, propagation for a non-null one. The
    /// error was recorded by the caller.
    fn fail(&self, non_null: bool) -> Result<Value, Propagated> {
        if non_null {
            Err(Propagated)
        } else {
            Ok(Value::Null)
        }
    }

    fn complete_value(
        &mut self,
        declared: &TypeType<'a>,
        parent_type: &'a Arc<NamedType>,
        field_def: &Arc<Field>,
        field_asts: &[&'a Spanning<FieldAst<'a>>],
        resolved: Resolved,
        position: SourcePosition,
    ) -> Result<Value, Propagated> {
        if self.observe_cancellation(position) {
            return self.fail(declared.is_non_null());
        }

        if let TypeType::NonNull(inner) = declared {
            return match self.complete_value(
                inner, parent_type, field_def, field_asts, resolved, position,
            ) {
                Ok(value) if value.is_null() => {
                    self.push_error(
                        position,
                        FieldError::internal(format!(
                            "Cannot return null for non-nullable field {}.{}.",
                            parent_type.name(),
                            field_def.name,
                        )),
                    );
                    Err(Propagated)
                }
                other => other,
            };
        }

        if resolved.is_null() {
            return Ok(Value::Null);
        }

        if let Some(element_type) = declared.list_contents() {
            return self.complete_list(
                element_type,
                parent_type,
                field_def,
                field_asts,
                resolved,
                position,
            );
        }

        let TypeType::Concrete(named) = declared else {
            // Lists were handled above and non-null unwrapped earlier.
            return Ok(Value::Null);
        };

        match &***named {
            NamedType::Scalar(scalar) => Ok(match resolved.as_value() {
                Some(value) => scalar.serialize(value).unwrap_or(Value::Null),
                None => Value::Null,
            }),
            NamedType::Enum(enum_type) => Ok(match resolved.as_value() {
                Some(value) => enum_type
                    .name_for_value(value)
                    .map(|name| Value::String(name.to_string()))
                    .unwrap_or(Value::Null),
                None => Value::Null,
            }),
            NamedType::Object(_) => {
                self.complete_object(named, field_def, field_asts, &resolved, position)
            }
            NamedType::Interface(_) | NamedType::Union(_) => self.complete_abstract(
                named, parent_type, field_def, field_asts, resolved, position,
            ),
            NamedType::InputObject(_) => Ok(Value::Null),
        }
    }

    fn complete_list(
        &mut self,
        element_type: &TypeType<'a>,
        parent_type: &'a Arc<NamedType>,
        field_def: &Arc<Field>,
        field_asts: &[&'a Spanning<FieldAst<'a>>],
        resolved: Resolved,
        position: SourcePosition,
    ) -> Result<Value, Propagated> {
        let elements: Vec<Resolved> = match resolved {
            Resolved::List(elements) => elements,
            Resolved::Value(Value::List(values)) => {
                values.into_iter().map(Resolved::Value).collect()
            }
            _ => {
                self.push_error(
                    position,
                    FieldError::internal(format!(
                        "User Error: expected iterable, but did not find one for field {}.{}.",
                        parent_type.name(),
                        field_def.name,
                    )),
                );
                return Ok(Value::Null);
            }
        };

        let mut completed = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            self.path.push(PathSegment::Index(index));
            let value = self.complete_value(
                element_type,
                parent_type,
                field_def,
                field_asts,
                element,
                position,
            );
            self.path.pop();

            match value {
                Ok(value) => completed.push(value),
                // A failed non-null element collapses the whole list; a
                // nullable element just comes back null.
                Err(Propagated) if element_type.is_non_null() => return Err(Propagated),
                Err(Propagated) => completed.push(Value::Null),
            }
        }

        Ok(Value::List(completed))
    }

    fn complete_abstract(
        &mut self,
        abstract_type: &'a Arc<NamedType>,
        parent_type: &'a Arc<NamedType>,
        field_def: &Arc<Field>,
        field_asts: &[&'a Spanning<FieldAst<'a>>],
        resolved: Resolved,
        position: SourcePosition,
    ) -> Result<Value, Propagated> {
        let info = self.resolve_info(parent_type, field_def, field_asts);

        let resolve_type = match &**abstract_type {
            NamedType::Interface(i) => i.resolve_type.as_ref(),
            NamedType::Union(u) => u.resolve_type.as_ref(),
            _ => None,
        };

        let runtime_name = match resolve_type {
            Some(f) => f(&resolved, &info),
            // Probe each possible type's isTypeOf in declaration order.
            None => {
                let member_names: Vec<_> = match &**abstract_type {
                    NamedType::Union(u) => u.types.iter().collect(),
                    _ => self
                        .schema
                        .possible_type_names(abstract_type.name())
                        .iter()
                        .collect(),
                };
                member_names
                    .into_iter()
                    .find(|name| {
                        self.schema
                            .concrete_type_by_name(name)
                            .and_then(|t| match &**t {
                                NamedType::Object(o) => o.is_type_of.as_ref(),
                                _ => None,
                            })
                            .is_some_and(|is_type_of| is_type_of(&resolved, &info))
                    })
                    .cloned()
            }
        };

        let Some(runtime_name) = runtime_name else {
            self.push_error(
                position,
                FieldError::internal(format!(
                    "Abstract type \"{}\" could not resolve to an Object type at runtime",
                    abstract_type.name(),
                )),
            );
            return Ok(Value::Null);
        };

        let runtime_type = self
            .schema
            .concrete_type_by_name(&runtime_name)
            .filter(|t| matches!(&***t, NamedType::Object(_)))
            .filter(|_| {
                self.schema
                    .is_possible_type(abstract_type.name(), &runtime_name)
            });

        match runtime_type {
            Some(runtime_type) => {
                self.complete_object(runtime_type, field_def, field_asts, &resolved, position)
            }
            None => {
                self.push_error(
                    position,
                    FieldError::internal(format!(
                        "Runtime Object type \"{runtime_name}\" is not a possible type for \"{}\".",
                        abstract_type.name(),
                    )),
                );
                Ok(Value::Null)
            }
        }
    }

    fn complete_object(
        &mut self,
        object_type: &'a Arc<NamedType>,
        field_def: &Arc<Field>,
        field_asts: &[&'a Spanning<FieldAst<'a>>],
        resolved: &Resolved,
        position: SourcePosition,
    ) -> Result<Value, Propagated> {
        if let NamedType::Object(object) = &**object_type {
            if let Some(is_type_of) = &object.is_type_of {
                let info = self.resolve_info(object_type, field_def, field_asts);
                if !is_type_of(resolved, &info) {
                    self.push_error(
                        position,
                        FieldError::internal(format!(
                            "Expected value of type \"{}\"",
                            object_type.name(),
                        )),
                    );
                    return Ok(Value::Null);
                }
            }
        }

        // Sub-selections of every AST for this response name merge into one
        // collection pass with a shared visited set.
        let mut collected = IndexMap::new();
        let mut visited_fragments = HashSet::new();
        for ast in field_asts {
            if let Some(selection_set) = &ast.item.selection_set {
                self.collect_fields(object_type, selection_set, &mut visited_fragments, &mut collected);
            }
        }

        self.resolve_selection_set(object_type, resolved, &collected)
            .map(Value::Object)
    }
}

/// The fallback resolver: index JSON-shaped parent objects by field name.
fn default_resolve(source: &Resolved, field_name: &str) -> Resolved {
    match source {
        Resolved::Value(Value::Object(object)) => object
            .get_field_value(field_name)
            .cloned()
            .map(Resolved::Value)
            .unwrap_or_else(Resolved::null),
        _ => Resolved::null(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "resolver panicked".into());
    format!("resolver panic: {message}")
}
