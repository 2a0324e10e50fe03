use crate::{
    ast::{Field, Operation, OperationType, Selection},
    parser::Spanning,
    schema::meta::NamedType,
    validation::{ValidatorContext, Visitor},
};

pub struct FieldsOnCorrectType;

pub fn factory() -> FieldsOnCorrectType {
    FieldsOnCorrectType
}

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        operation: &'a Spanning<Operation<'a>>,
    ) {
        // https://spec.graphql.org/October2021/#note-bc213
        if operation.item.operation_type != OperationType::Subscription {
            return;
        }

        let root_fields = operation.item.selection_set.iter().filter_map(|s| {
            if let Selection::Field(field) = s {
                Some(&field.item.name)
            } else {
                None
            }
        });
        for name in root_fields {
            if name.item == "__typename" {
                ctx.report_error(
                    "`__typename` may not be included as a root \
                     field in a subscription operation",
                    &[name.span.start],
                );
            }
        }
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        let Some(parent_type) = ctx.parent_type() else {
            return;
        };

        let name = &field.item.name;
        let known = ctx
            .schema
            .field_on_type(parent_type, name.item, ctx.introspection_enabled)
            .is_some();

        // You can query for `__typename` on a union, but it isn't a
        // field on the union itself, it lives on the resulting object.
        let union_typename =
            matches!(&**parent_type, NamedType::Union(_)) && name.item == "__typename";

        if !known && !union_typename {
            ctx.report_error(
                &error_message(name.item, parent_type.name()),
                &[name.span.start],
            );
        }
    }
}

fn error_message(field: &str, type_name: &str) -> String {
    format!(r#"Unknown field "{field}" on type "{type_name}""#)
}
