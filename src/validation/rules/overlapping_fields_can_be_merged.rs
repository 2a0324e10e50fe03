use std::{cell::RefCell, collections::HashMap, sync::Arc};

use indexmap::IndexMap;

use crate::{
    ast::{Arguments, Definition, Document, Field, Fragment, FragmentSpread, Selection},
    parser::{SourcePosition, Spanning},
    schema::meta::{Field as FieldMeta, NamedType, TypeRef},
    validation::{ValidatorContext, Visitor},
};

#[derive(Debug)]
struct Conflict {
    cause: Cause,
    left: Vec<SourcePosition>,
    right: Vec<SourcePosition>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct Cause(String, CauseKind);

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum CauseKind {
    Plain(String),
    Nested(Vec<Cause>),
}

/// One occurrence of a response name: the field node, the type it was
/// selected on, and its declaration if the schema has one.
#[derive(Debug)]
struct FieldEntry<'a> {
    parent: Option<&'a str>,
    ast: &'a Spanning<Field<'a>>,
    def: Option<&'a Arc<FieldMeta>>,
}

/// Occurrences grouped by response name, in document order.
type FieldsByResponseName<'a> = IndexMap<&'a str, Vec<FieldEntry<'a>>>;

/// Memo of fragment pairs that were already compared.
///
/// A pair compared without mutual exclusivity also covers the exclusive
/// comparison, but not the other way around, so the flag is part of the
/// answer rather than the key.
#[derive(Default)]
struct ComparedPairs<'a> {
    seen: HashMap<(&'a str, &'a str), bool>,
}

impl<'a> ComparedPairs<'a> {
    fn key(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    fn covered(&self, a: &'a str, b: &'a str, mutex: bool) -> bool {
        match self.seen.get(&Self::key(a, b)) {
            Some(&seen_mutex) => mutex || !seen_mutex,
            None => false,
        }
    }

    fn record(&mut self, a: &'a str, b: &'a str, mutex: bool) {
        self.seen.insert(Self::key(a, b), mutex);
    }
}

pub struct OverlappingFieldsCanBeMerged<'a> {
    named_fragments: HashMap<&'a str, &'a Fragment<'a>>,
    compared_fragments: RefCell<ComparedPairs<'a>>,
}

pub fn factory<'a>() -> OverlappingFieldsCanBeMerged<'a> {
    OverlappingFieldsCanBeMerged {
        named_fragments: HashMap::new(),
        compared_fragments: RefCell::default(),
    }
}

impl<'a> OverlappingFieldsCanBeMerged<'a> {
    fn conflicts_within_set(
        &self,
        parent_type: Option<&'a Arc<NamedType>>,
        selection_set: &'a [Selection<'a>],
        ctx: &ValidatorContext<'a>,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        let (fields, fragments) = self.collect_set(parent_type, selection_set, ctx);

        self.compare_within(&mut conflicts, &fields, ctx);

        for (i, frag_a) in fragments.iter().enumerate() {
            self.compare_fields_with_fragment(&mut conflicts, &fields, frag_a, false, ctx);

            for frag_b in &fragments[i + 1..] {
                self.compare_fragments(&mut conflicts, frag_a, frag_b, false, ctx);
            }
        }

        conflicts
    }

    fn compare_fragments(
        &self,
        conflicts: &mut Vec<Conflict>,
        name_a: &'a str,
        name_b: &'a str,
        mutually_exclusive: bool,
        ctx: &ValidatorContext<'a>,
    ) {
        if name_a == name_b {
            return;
        }

        let Some(frag_a) = self.named_fragments.get(name_a) else {
            return;
        };
        let Some(frag_b) = self.named_fragments.get(name_b) else {
            return;
        };

        if self
            .compared_fragments
            .borrow()
            .covered(name_a, name_b, mutually_exclusive)
        {
            return;
        }
        self.compared_fragments
            .borrow_mut()
            .record(name_a, name_b, mutually_exclusive);

        let (fields_a, fragments_a) = self.collect_fragment(frag_a, ctx);
        let (fields_b, fragments_b) = self.collect_fragment(frag_b, ctx);

        self.compare_field_maps(conflicts, mutually_exclusive, &fields_a, &fields_b, ctx);

        for nested in &fragments_b {
            self.compare_fragments(conflicts, name_a, nested, mutually_exclusive, ctx);
        }
        for nested in &fragments_a {
            self.compare_fragments(conflicts, nested, name_b, mutually_exclusive, ctx);
        }
    }

    fn compare_fields_with_fragment(
        &self,
        conflicts: &mut Vec<Conflict>,
        fields: &FieldsByResponseName<'a>,
        fragment_name: &str,
        mutually_exclusive: bool,
        ctx: &ValidatorContext<'a>,
    ) {
        let Some(fragment) = self.named_fragments.get(fragment_name) else {
            return;
        };

        let (fragment_fields, nested_fragments) = self.collect_fragment(fragment, ctx);

        self.compare_field_maps(conflicts, mutually_exclusive, fields, &fragment_fields, ctx);

        for nested in nested_fragments {
            self.compare_fields_with_fragment(conflicts, fields, nested, mutually_exclusive, ctx);
        }
    }

    fn compare_field_maps(
        &self,
        conflicts: &mut Vec<Conflict>,
        mutually_exclusive: bool,
        map_a: &FieldsByResponseName<'a>,
        map_b: &FieldsByResponseName<'a>,
        ctx: &ValidatorContext<'a>,
    ) {
        for (response_name, entries_a) in map_a {
            let Some(entries_b) = map_b.get(response_name) else {
                continue;
            };
            for a in entries_a {
                for b in entries_b {
                    conflicts.extend(self.compare_entries(
                        response_name,
                        a,
                        b,
                        mutually_exclusive,
                        ctx,
                    ));
                }
            }
        }
    }

    fn compare_within(
        &self,
        conflicts: &mut Vec<Conflict>,
        fields: &FieldsByResponseName<'a>,
        ctx: &ValidatorContext<'a>,
    ) {
        for (response_name, entries) in fields {
            for (i, a) in entries.iter().enumerate() {
                for b in &entries[i + 1..] {
                    conflicts.extend(self.compare_entries(response_name, a, b, false, ctx));
                }
            }
        }
    }

    fn compare_entries(
        &self,
        response_name: &str,
        a: &FieldEntry<'a>,
        b: &FieldEntry<'a>,
        parents_mutually_exclusive: bool,
        ctx: &ValidatorContext<'a>,
    ) -> Option<Conflict> {
        // Two fields selected on distinct object types can never be part of
        // the same response object, so only their output types must agree.
        let mutually_exclusive = parents_mutually_exclusive
            || (a.parent != b.parent
                && self.is_concrete_object(ctx, a.parent)
                && self.is_concrete_object(ctx, b.parent));

        let conflict_at = |kind: CauseKind| {
            Some(Conflict {
                cause: Cause(response_name.into(), kind),
                left: vec![a.ast.span.start],
                right: vec![b.ast.span.start],
            })
        };

        if !mutually_exclusive {
            let name_a = a.ast.item.name.item;
            let name_b = b.ast.item.name.item;

            if name_a != name_b {
                return conflict_at(CauseKind::Plain(format!(
                    "{name_a} and {name_b} are different fields"
                )));
            }

            if !same_arguments(&a.ast.item.arguments, &b.ast.item.arguments) {
                return conflict_at(CauseKind::Plain("they have differing arguments".into()));
            }
        }

        let type_a = a.def.map(|def| &def.field_type);
        let type_b = b.def.map(|def| &def.field_type);

        if let (Some(t1), Some(t2)) = (type_a, type_b) {
            if types_conflict(ctx, t1, t2) {
                return conflict_at(CauseKind::Plain(format!(
                    "they return conflicting types {t1} and {t2}"
                )));
            }
        }

        if let (Some(set_a), Some(set_b)) = (&a.ast.item.selection_set, &b.ast.item.selection_set)
        {
            let nested = self.conflicts_in_subselections(
                mutually_exclusive,
                type_a.map(|t| t.innermost_name()),
                set_a,
                type_b.map(|t| t.innermost_name()),
                set_b,
                ctx,
            );

            return bubble_up(&nested, response_name, a.ast.span.start, b.ast.span.start);
        }

        None
    }

    fn conflicts_in_subselections(
        &self,
        mutually_exclusive: bool,
        parent_a: Option<&str>,
        set_a: &'a [Selection<'a>],
        parent_b: Option<&str>,
        set_b: &'a [Selection<'a>],
        ctx: &ValidatorContext<'a>,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        let parent_a = parent_a.and_then(|t| ctx.schema.concrete_type_by_name(t));
        let parent_b = parent_b.and_then(|t| ctx.schema.concrete_type_by_name(t));

        let (fields_a, fragments_a) = self.collect_set(parent_a, set_a, ctx);
        let (fields_b, fragments_b) = self.collect_set(parent_b, set_b, ctx);

        self.compare_field_maps(&mut conflicts, mutually_exclusive, &fields_a, &fields_b, ctx);

        for fragment in &fragments_b {
            self.compare_fields_with_fragment(
                &mut conflicts,
                &fields_a,
                fragment,
                mutually_exclusive,
                ctx,
            );
        }
        for fragment in &fragments_a {
            self.compare_fields_with_fragment(
                &mut conflicts,
                &fields_b,
                fragment,
                mutually_exclusive,
                ctx,
            );
        }

        for frag_a in &fragments_a {
            for frag_b in &fragments_b {
                self.compare_fragments(&mut conflicts, frag_a, frag_b, mutually_exclusive, ctx);
            }
        }

        conflicts
    }

    fn is_concrete_object(&self, ctx: &ValidatorContext<'a>, type_name: Option<&str>) -> bool {
        type_name
            .and_then(|n| ctx.schema.concrete_type_by_name(n))
            .is_some_and(|t| matches!(&**t, NamedType::Object(_)))
    }

    fn collect_fragment(
        &self,
        fragment: &'a Fragment<'a>,
        ctx: &ValidatorContext<'a>,
    ) -> (FieldsByResponseName<'a>, Vec<&'a str>) {
        let fragment_type = ctx
            .schema
            .concrete_type_by_name(fragment.type_condition.item);

        self.collect_set(fragment_type, &fragment.selection_set, ctx)
    }

    fn collect_set(
        &self,
        parent_type: Option<&'a Arc<NamedType>>,
        selection_set: &'a [Selection<'a>],
        ctx: &ValidatorContext<'a>,
    ) -> (FieldsByResponseName<'a>, Vec<&'a str>) {
        let mut fields = IndexMap::new();
        let mut fragments = Vec::new();

        self.walk_set(parent_type, selection_set, ctx, &mut fields, &mut fragments);

        (fields, fragments)
    }

    fn walk_set(
        &self,
        parent_type: Option<&'a Arc<NamedType>>,
        selection_set: &'a [Selection<'a>],
        ctx: &ValidatorContext<'a>,
        fields: &mut FieldsByResponseName<'a>,
        fragments: &mut Vec<&'a str>,
    ) {
        for selection in selection_set {
            match selection {
                Selection::Field(f) => {
                    let field_name = f.item.name.item;
                    let def = parent_type.and_then(|t| {
                        ctx.schema
                            .field_on_type(t, field_name, ctx.introspection_enabled)
                    });
                    let response_name = f.item.alias.as_ref().map_or(field_name, |s| s.item);

                    fields.entry(response_name).or_default().push(FieldEntry {
                        parent: parent_type.map(|t| t.name().as_str()),
                        ast: f,
                        def,
                    });
                }
                Selection::FragmentSpread(Spanning {
                    item: FragmentSpread { name, .. },
                    ..
                }) => {
                    if !fragments.contains(&name.item) {
                        fragments.push(name.item);
                    }
                }
                Selection::InlineFragment(Spanning { item: inline, .. }) => {
                    let parent_type = inline
                        .type_condition
                        .as_ref()
                        .and_then(|cond| ctx.schema.concrete_type_by_name(cond.item))
                        .or(parent_type);

                    self.walk_set(parent_type, &inline.selection_set, ctx, fields, fragments);
                }
            }
        }
    }
}

/// Wraps nested conflicts into one conflict at the common ancestor field,
/// accumulating the source positions from both sides.
fn bubble_up(
    nested: &[Conflict],
    response_name: &str,
    pos_a: SourcePosition,
    pos_b: SourcePosition,
) -> Option<Conflict> {
    if nested.is_empty() {
        return None;
    }

    Some(Conflict {
        cause: Cause(
            response_name.into(),
            CauseKind::Nested(nested.iter().map(|c| c.cause.clone()).collect()),
        ),
        left: std::iter::once(pos_a)
            .chain(nested.iter().flat_map(|c| c.left.iter().copied()))
            .collect(),
        right: std::iter::once(pos_b)
            .chain(nested.iter().flat_map(|c| c.right.iter().copied()))
            .collect(),
    })
}

fn types_conflict(ctx: &ValidatorContext<'_>, t1: &TypeRef, t2: &TypeRef) -> bool {
    match (t1, t2) {
        (TypeRef::List(inner1), TypeRef::List(inner2))
        | (TypeRef::NonNull(inner1), TypeRef::NonNull(inner2)) => {
            types_conflict(ctx, inner1, inner2)
        }
        (TypeRef::Named(n1), TypeRef::Named(n2)) => {
            let ct1 = ctx.schema.concrete_type_by_name(n1);
            let ct2 = ctx.schema.concrete_type_by_name(n2);

            // Leaf values must be byte-identical to merge; composite types
            // only need their subselections to merge, checked separately.
            if ct1.is_some_and(|ct| ct.is_leaf()) || ct2.is_some_and(|ct| ct.is_leaf()) {
                n1 != n2
            } else {
                false
            }
        }
        _ => true,
    }
}

fn same_arguments(
    args1: &Option<Spanning<Arguments<'_>>>,
    args2: &Option<Spanning<Arguments<'_>>>,
) -> bool {
    match (args1, args2) {
        (None, None) => true,
        (Some(args1), Some(args2)) => {
            args1.item.len() == args2.item.len()
                && args1.item.iter().all(|(n1, v1)| {
                    args2
                        .item
                        .iter()
                        .find(|(n2, _)| n1.item == n2.item)
                        .is_some_and(|(_, v2)| v1.item.unlocated_eq(&v2.item))
                })
        }
        _ => false,
    }
}

impl<'a> Visitor<'a> for OverlappingFieldsCanBeMerged<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, defs: &'a Document<'a>) {
        for def in defs {
            if let Definition::Fragment(Spanning { item, .. }) = def {
                self.named_fragments.insert(item.name.item, item);
            }
        }
    }

    fn enter_selection_set(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        selection_set: &'a [Selection<'a>],
    ) {
        for conflict in self.conflicts_within_set(ctx.parent_type(), selection_set, ctx) {
            let Conflict {
                cause: Cause(name, kind),
                mut left,
                mut right,
            } = conflict;
            left.append(&mut right);
            ctx.report_error(&error_message(&name, &kind), &left);
        }
    }
}

fn error_message(response_name: &str, cause: &CauseKind) -> String {
    format!(
        "Fields \"{response_name}\" conflict because {}. \
         Use different aliases on the fields to fetch both if this was intentional",
        render_cause(cause),
    )
}

fn render_cause(cause: &CauseKind) -> String {
    match cause {
        CauseKind::Plain(msg) => msg.clone(),
        CauseKind::Nested(nested) => nested
            .iter()
            .map(|Cause(name, inner)| {
                format!(
                    r#"subfields "{name}" conflict because {}"#,
                    render_cause(inner),
                )
            })
            .collect::<Vec<_>>()
            .join(" and "),
    }
}
