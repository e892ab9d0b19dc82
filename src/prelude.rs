//! Common imports used throughout the crate.

pub use anyhow::{anyhow, Context as _, Error};

pub use crate::data::graphql::ext::{
    camel_cased_names, DirectiveExt, DirectiveFinder, DocumentExt, ObjectTypeExt, TypeExt, ValueExt,
};
pub use crate::env::ENV_VARS;

/// Concrete aliases for the `graphql_parser` schema AST. The parser is
/// generic over the backing text type; this crate only ever works with
/// owned documents.
pub mod s {
    use graphql_parser::schema;

    pub use graphql_parser::Pos;

    pub type Document = schema::Document<'static, String>;
    pub type Definition = schema::Definition<'static, String>;
    pub type DirectiveDefinition = schema::DirectiveDefinition<'static, String>;
    pub type TypeDefinition = schema::TypeDefinition<'static, String>;
    pub type ObjectType = schema::ObjectType<'static, String>;
    pub type InterfaceType = schema::InterfaceType<'static, String>;
    pub type UnionType = schema::UnionType<'static, String>;
    pub type EnumType = schema::EnumType<'static, String>;
    pub type EnumValue = schema::EnumValue<'static, String>;
    pub type ScalarType = schema::ScalarType<'static, String>;
    pub type InputObjectType = schema::InputObjectType<'static, String>;
    pub type InputValue = schema::InputValue<'static, String>;
    pub type Field = schema::Field<'static, String>;
    pub type Directive = schema::Directive<'static, String>;
    pub type Type = schema::Type<'static, String>;
    pub type Value = schema::Value<'static, String>;

    pub fn parse_schema(raw: &str) -> Result<Document, schema::ParseError> {
        graphql_parser::parse_schema::<String>(raw).map(|document| document.into_static())
    }
}
