//! Schema description and the assembled schema model

pub(crate) mod introspection;
pub mod meta;
pub mod model;

pub use self::{
    meta::{
        AppliedDirective, Argument, DirectiveLocation, DirectiveType, EnumType, EnumValue, Field,
        InputObjectType, InterfaceType, NamedType, ObjectType, ScalarType, TypeKind, TypeRef,
        UnionType,
    },
    model::{Schema, SchemaBuilder, SchemaError, TypeType},
};
