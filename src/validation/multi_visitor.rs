use crate::{
    ast::{
        Directive, Document, Field, Fragment, FragmentSpread, InlineFragment, InputValue,
        Operation, Selection, VariableDefinition,
    },
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

/// Terminator of the visitor cons-list.
#[doc(hidden)]
pub struct MultiVisitorNil;

impl MultiVisitorNil {
    #[doc(hidden)]
    pub fn with<V>(self, visitor: V) -> MultiVisitorCons<V, Self> {
        MultiVisitorCons(visitor, self)
    }
}

/// One visitor stacked on top of the rest; hooks fan out to both.
#[doc(hidden)]
pub struct MultiVisitorCons<A, B>(A, B);

impl<A, B> MultiVisitorCons<A, B> {
    #[doc(hidden)]
    pub fn with<V>(self, visitor: V) -> MultiVisitorCons<V, Self> {
        MultiVisitorCons(visitor, self)
    }
}

impl<'a> Visitor<'a> for MultiVisitorNil {}

// All hook arguments are either references or `Spanning` over a `Copy`
// item, so handing the same argument to both halves just copies it.
macro_rules! fan_out {
    ($(($enter:ident, $exit:ident, $Arg:ty),)*) => {
        $(
            fn $enter(&mut self, ctx: &mut ValidatorContext<'a>, arg: $Arg) {
                self.0.$enter(ctx, arg);
                self.1.$enter(ctx, arg);
            }

            fn $exit(&mut self, ctx: &mut ValidatorContext<'a>, arg: $Arg) {
                self.0.$exit(ctx, arg);
                self.1.$exit(ctx, arg);
            }
        )*
    };
}

impl<'a, A, B> Visitor<'a> for MultiVisitorCons<A, B>
where
    A: Visitor<'a> + 'a,
    B: Visitor<'a> + 'a,
{
    fan_out! {
        (enter_document, exit_document, &'a Document<'a>),
        (enter_operation_definition, exit_operation_definition, &'a Spanning<Operation<'a>>),
        (enter_fragment_definition, exit_fragment_definition, &'a Spanning<Fragment<'a>>),
        (enter_variable_definition, exit_variable_definition, &'a (Spanning<&'a str>, VariableDefinition<'a>)),
        (enter_directive, exit_directive, &'a Spanning<Directive<'a>>),
        (enter_argument, exit_argument, &'a (Spanning<&'a str>, Spanning<InputValue>)),
        (enter_selection_set, exit_selection_set, &'a [Selection<'a>]),
        (enter_field, exit_field, &'a Spanning<Field<'a>>),
        (enter_fragment_spread, exit_fragment_spread, &'a Spanning<FragmentSpread<'a>>),
        (enter_inline_fragment, exit_inline_fragment, &'a Spanning<InlineFragment<'a>>),
        (enter_null_value, exit_null_value, Spanning<()>),
        (enter_int_value, exit_int_value, Spanning<i32>),
        (enter_float_value, exit_float_value, Spanning<f64>),
        (enter_string_value, exit_string_value, Spanning<&'a String>),
        (enter_boolean_value, exit_boolean_value, Spanning<bool>),
        (enter_enum_value, exit_enum_value, Spanning<&'a String>),
        (enter_variable_value, exit_variable_value, Spanning<&'a String>),
        (enter_list_value, exit_list_value, Spanning<&'a Vec<Spanning<InputValue>>>),
        (enter_object_value, exit_object_value, Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>),
        (enter_object_field, exit_object_field, &'a (Spanning<String>, Spanning<InputValue>)),
    }
}
