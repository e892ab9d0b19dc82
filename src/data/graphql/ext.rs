use std::collections::HashMap;

use inflector::Inflector;

use crate::prelude::s;

pub trait ObjectTypeExt {
    fn field(&self, name: &str) -> Option<&s::Field>;
}

impl ObjectTypeExt for s::ObjectType {
    fn field(&self, name: &str) -> Option<&s::Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl ObjectTypeExt for s::InterfaceType {
    fn field(&self, name: &str) -> Option<&s::Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

pub trait DocumentExt {
    fn get_object_type_definitions(&self) -> Vec<&s::ObjectType>;

    fn get_object_type_definition(&self, name: &str) -> Option<&s::ObjectType>;

    fn get_interface_type_definitions(&self) -> Vec<&s::InterfaceType>;

    fn get_union_type_definitions(&self) -> Vec<&s::UnionType>;

    fn get_enum_definitions(&self) -> Vec<&s::EnumType>;

    fn get_object_and_interface_type_fields(&self) -> HashMap<&String, &Vec<s::Field>>;

    fn find_interface(&self, name: &str) -> Option<&s::InterfaceType>;

    fn get_named_type(&self, name: &str) -> Option<&s::TypeDefinition>;

    fn get_root_query_type(&self) -> Option<&s::ObjectType>;

    fn get_root_mutation_type(&self) -> Option<&s::ObjectType>;
}

impl DocumentExt for s::Document {
    fn get_object_type_definitions(&self) -> Vec<&s::ObjectType> {
        self.definitions
            .iter()
            .filter_map(|d| match d {
                s::Definition::TypeDefinition(s::TypeDefinition::Object(t)) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn get_object_type_definition(&self, name: &str) -> Option<&s::ObjectType> {
        self.get_object_type_definitions()
            .into_iter()
            .find(|object_type| object_type.name == name)
    }

    fn get_interface_type_definitions(&self) -> Vec<&s::InterfaceType> {
        self.definitions
            .iter()
            .filter_map(|d| match d {
                s::Definition::TypeDefinition(s::TypeDefinition::Interface(t)) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn get_union_type_definitions(&self) -> Vec<&s::UnionType> {
        self.definitions
            .iter()
            .filter_map(|d| match d {
                s::Definition::TypeDefinition(s::TypeDefinition::Union(t)) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn get_enum_definitions(&self) -> Vec<&s::EnumType> {
        self.definitions
            .iter()
            .filter_map(|d| match d {
                s::Definition::TypeDefinition(s::TypeDefinition::Enum(t)) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn get_object_and_interface_type_fields(&self) -> HashMap<&String, &Vec<s::Field>> {
        self.definitions
            .iter()
            .filter_map(|d| match d {
                s::Definition::TypeDefinition(s::TypeDefinition::Object(t)) => {
                    Some((&t.name, &t.fields))
                }
                s::Definition::TypeDefinition(s::TypeDefinition::Interface(t)) => {
                    Some((&t.name, &t.fields))
                }
                _ => None,
            })
            .collect()
    }

    fn find_interface(&self, name: &str) -> Option<&s::InterfaceType> {
        self.definitions.iter().find_map(|d| match d {
            s::Definition::TypeDefinition(s::TypeDefinition::Interface(t)) if t.name == name => {
                Some(t)
            }
            _ => None,
        })
    }

    fn get_named_type(&self, name: &str) -> Option<&s::TypeDefinition> {
        self.definitions.iter().find_map(|d| match d {
            s::Definition::TypeDefinition(typedef) => match typedef {
                s::TypeDefinition::Object(t) if t.name == name => Some(typedef),
                s::TypeDefinition::Interface(t) if t.name == name => Some(typedef),
                s::TypeDefinition::Enum(t) if t.name == name => Some(typedef),
                s::TypeDefinition::InputObject(t) if t.name == name => Some(typedef),
                s::TypeDefinition::Scalar(t) if t.name == name => Some(typedef),
                s::TypeDefinition::Union(t) if t.name == name => Some(typedef),
                _ => None,
            },
            _ => None,
        })
    }

    fn get_root_query_type(&self) -> Option<&s::ObjectType> {
        self.get_object_type_definition("Query")
    }

    fn get_root_mutation_type(&self) -> Option<&s::ObjectType> {
        self.get_object_type_definition("Mutation")
    }
}

pub trait TypeExt {
    fn get_base_type(&self) -> &str;

    fn is_list(&self) -> bool;

    fn is_non_null(&self) -> bool;
}

impl TypeExt for s::Type {
    fn get_base_type(&self) -> &str {
        match self {
            s::Type::NamedType(name) => name,
            s::Type::NonNullType(inner) => inner.get_base_type(),
            s::Type::ListType(inner) => inner.get_base_type(),
        }
    }

    fn is_list(&self) -> bool {
        match self {
            s::Type::NamedType(_) => false,
            s::Type::NonNullType(inner) => inner.is_list(),
            s::Type::ListType(_) => true,
        }
    }

    fn is_non_null(&self) -> bool {
        matches!(self, s::Type::NonNullType(_))
    }
}

pub trait DirectiveExt {
    fn argument(&self, name: &str) -> Option<&s::Value>;
}

impl DirectiveExt for s::Directive {
    fn argument(&self, name: &str) -> Option<&s::Value> {
        self.arguments
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

pub trait DirectiveFinder {
    fn find_directive(&self, name: &str) -> Option<&s::Directive>;
}

impl DirectiveFinder for s::ObjectType {
    fn find_directive(&self, name: &str) -> Option<&s::Directive> {
        self.directives
            .iter()
            .find(|directive| directive.name == name)
    }
}

impl DirectiveFinder for s::InterfaceType {
    fn find_directive(&self, name: &str) -> Option<&s::Directive> {
        self.directives
            .iter()
            .find(|directive| directive.name == name)
    }
}

impl DirectiveFinder for s::Field {
    fn find_directive(&self, name: &str) -> Option<&s::Directive> {
        self.directives
            .iter()
            .find(|directive| directive.name == name)
    }
}

pub trait ValueExt {
    fn as_str(&self) -> Option<&str>;

    fn as_enum(&self) -> Option<&str>;

    fn as_list(&self) -> Option<&Vec<s::Value>>;
}

impl ValueExt for s::Value {
    fn as_str(&self) -> Option<&str> {
        match self {
            s::Value::String(string) => Some(string),
            _ => None,
        }
    }

    fn as_enum(&self) -> Option<&str> {
        match self {
            s::Value::Enum(name) => Some(name),
            _ => None,
        }
    }

    fn as_list(&self) -> Option<&Vec<s::Value>> {
        match self {
            s::Value::List(list) => Some(list),
            _ => None,
        }
    }
}

/// The camel-cased singular and plural forms of `name`, used for naming the
/// query and mutation fields derived for a type.
pub fn camel_cased_names(name: &str) -> (String, String) {
    let singular = name.to_camel_case();
    let plural = name.to_plural().to_camel_case();
    (singular, plural)
}
