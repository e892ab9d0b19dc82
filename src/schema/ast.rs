use crate::prelude::s;

/// Returns the name of a type.
pub fn get_type_name(t: &s::TypeDefinition) -> &str {
    match t {
        s::TypeDefinition::Enum(t) => &t.name,
        s::TypeDefinition::InputObject(t) => &t.name,
        s::TypeDefinition::Interface(t) => &t.name,
        s::TypeDefinition::Object(t) => &t.name,
        s::TypeDefinition::Scalar(t) => &t.name,
        s::TypeDefinition::Union(t) => &t.name,
    }
}

/// Returns the type definition that a field type refers to.
pub fn get_type_definition_from_type<'a>(
    schema: &'a s::Document,
    t: &s::Type,
) -> Option<&'a s::TypeDefinition> {
    use crate::prelude::DocumentExt;

    match t {
        s::Type::NamedType(name) => schema.get_named_type(name),
        s::Type::ListType(inner) => get_type_definition_from_type(schema, inner),
        s::Type::NonNullType(inner) => get_type_definition_from_type(schema, inner),
    }
}

/// Strip the outermost non-null wrapper from a type, turning `T!` into `T`.
/// List element types are left alone.
pub fn nullable(t: &s::Type) -> s::Type {
    match t {
        s::Type::NonNullType(inner) => (**inner).clone(),
        other => other.clone(),
    }
}
