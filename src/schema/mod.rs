use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::prelude::s;
use crate::prelude::{DirectiveFinder, DocumentExt, TypeExt};

/// Generate full-fledged CRUD API schemas from annotated type definitions.
mod api;

/// Utilities for working with GraphQL schema ASTs.
pub mod ast;

mod input_schema;

pub use api::{ApiSchema, APISchemaError};
pub use input_schema::{
    InputSchema, InterfaceTarget, NestedOperation, NodeType, RelDirection, RelField, RelTarget,
};

pub const NODE_DIRECTIVE: &str = "node";
pub const RELATIONSHIP_DIRECTIVE: &str = "relationship";

/// Built-in scalars of the input language.
pub const SCALAR_TYPE_NAMES: [&str; 5] = ["ID", "String", "Int", "Float", "Boolean"];

/// Suffixes the generator appends to declared type names. Declared types
/// must not collide with them.
const RESERVED_SUFFIXES: [&str; 11] = [
    "Where",
    "Sort",
    "Options",
    "CreateInput",
    "UpdateInput",
    "ConnectInput",
    "DisconnectInput",
    "DeleteInput",
    "RelationInput",
    "ConnectWhere",
    "Implementation",
];

/// Type names the generator emits unconditionally.
const RESERVED_TYPE_NAMES: [&str; 6] = [
    "Query",
    "Mutation",
    "SortDirection",
    "CreateInfo",
    "UpdateInfo",
    "DeleteInfo",
];

pub(crate) fn is_scalar_type_name(name: &str) -> bool {
    SCALAR_TYPE_NAMES.contains(&name)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Strings(Vec<String>);

impl fmt::Display for Strings {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.0.iter().join(", "))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaValidationError {
    #[error("Interface `{0}` not defined")]
    InterfaceUndefined(String),

    #[error(
        "Type `{0}` does not satisfy interface `{1}` because it is missing \
         the following fields: {2}"
    )]
    InterfaceFieldsMissing(String, String, Strings), // (type, interface, missing_fields)

    #[error("@node is only allowed on object types, but `{0}` is not one")]
    NodeOnNonObjectType(String),

    #[error("@node type `{0}` must declare at least one scalar or enum field")]
    NodeTypeWithoutAttributes(String),

    #[error("Interface `{0}`, field `{1}`: @relationship is not supported on interface fields")]
    RelationshipOnInterface(String, String),

    #[error("Type `{0}`, field `{1}`: @relationship is only allowed on fields of @node types")]
    RelationshipOnNonNodeType(String, String),

    #[error("Type `{0}`, field `{1}` has an invalid @relationship: {2}")]
    InvalidRelationship(String, String, String), // (type, field, reason)

    #[error("Type `{0}`, field `{1}`: relationship target `{2}` is not defined")]
    RelationshipTargetUnknown(String, String, String),

    #[error("Type `{0}`, field `{1}`: relationship target `{2}` is not a @node type")]
    RelationshipTargetNotANode(String, String, String),

    #[error(
        "Interface `{0}` is used as a relationship target and may only \
         declare scalar and enum fields"
    )]
    InterfaceTargetWithNonScalarFields(String),

    #[error(
        "Interface `{0}` is used as a relationship target and must declare \
         at least one field"
    )]
    InterfaceTargetWithoutFields(String),

    #[error("Type `{0}`, field `{1}`: type `{2}` is not defined")]
    FieldTypeUnknown(String, String, String), // (type_name, field_name, field_type)

    #[error("The following type names are reserved: `{0}`")]
    UsageOfReservedTypes(Strings),
}

/// A parsed set of type definitions together with the interface
/// relationships between them. A `Schema` says nothing about directive
/// well-formedness; that is what `validate` checks, and `InputSchema` is
/// the proof that it has been checked.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    pub document: s::Document,

    // Maps type name to implemented interfaces.
    pub interfaces_for_type: BTreeMap<String, Vec<s::InterfaceType>>,

    // Maps an interface name to the list of types that implement it.
    pub types_for_interface: BTreeMap<String, Vec<s::ObjectType>>,
}

impl Schema {
    pub fn new(document: s::Document) -> Result<Self, SchemaValidationError> {
        let (interfaces_for_type, types_for_interface) = Self::collect_interfaces(&document)?;

        Ok(Schema {
            document,
            interfaces_for_type,
            types_for_interface,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, anyhow::Error> {
        let document = s::parse_schema(raw)?;

        Schema::new(document).map_err(Into::into)
    }

    fn collect_interfaces(
        document: &s::Document,
    ) -> Result<
        (
            BTreeMap<String, Vec<s::InterfaceType>>,
            BTreeMap<String, Vec<s::ObjectType>>,
        ),
        SchemaValidationError,
    > {
        // Initialize with an empty vec for each interface, so we don't
        // miss interfaces that have no implementors.
        let mut types_for_interface =
            BTreeMap::from_iter(document.get_interface_type_definitions().into_iter().map(
                |interface_type| (interface_type.name.clone(), Vec::<s::ObjectType>::new()),
            ));
        let mut interfaces_for_type = BTreeMap::<String, Vec<s::InterfaceType>>::new();

        for object_type in document.get_object_type_definitions() {
            for implemented_interface in &object_type.implements_interfaces {
                let interface_type = document
                    .find_interface(implemented_interface)
                    .cloned()
                    .ok_or_else(|| {
                        SchemaValidationError::InterfaceUndefined(implemented_interface.clone())
                    })?;

                Self::validate_interface_implementation(object_type, &interface_type)?;

                interfaces_for_type
                    .entry(object_type.name.clone())
                    .or_default()
                    .push(interface_type);
                types_for_interface
                    .get_mut(implemented_interface)
                    .unwrap()
                    .push(object_type.clone());
            }
        }

        Ok((interfaces_for_type, types_for_interface))
    }

    /// Validate that `object` implements `interface`.
    fn validate_interface_implementation(
        object: &s::ObjectType,
        interface: &s::InterfaceType,
    ) -> Result<(), SchemaValidationError> {
        let mut missing_fields = vec![];
        for i in &interface.fields {
            if !object
                .fields
                .iter()
                .any(|o| o.name == i.name && o.field_type == i.field_type)
            {
                missing_fields.push(i.to_string().trim().to_owned());
            }
        }
        if !missing_fields.is_empty() {
            Err(SchemaValidationError::InterfaceFieldsMissing(
                object.name.clone(),
                interface.name.clone(),
                Strings(missing_fields),
            ))
        } else {
            Ok(())
        }
    }

    /// Returned map has one entry for each interface in the schema.
    pub fn types_for_interface(&self) -> &BTreeMap<String, Vec<s::ObjectType>> {
        &self.types_for_interface
    }

    /// Returns `None` if the type implements no interfaces.
    pub fn interfaces_for_type(&self, type_name: &str) -> Option<&Vec<s::InterfaceType>> {
        self.interfaces_for_type.get(type_name)
    }

    pub fn is_node_type(&self, name: &str) -> bool {
        self.document
            .get_object_type_definition(name)
            .map_or(false, |object_type| {
                object_type.find_directive(NODE_DIRECTIVE).is_some()
            })
    }

    pub fn validate(&self) -> Result<(), Vec<SchemaValidationError>> {
        let mut errors: Vec<SchemaValidationError> = vec![];

        errors.extend(self.validate_node_directives());
        errors.extend(self.validate_relationship_directives());
        errors.extend(self.validate_fields());
        errors.extend(self.validate_reserved_types_usage().err());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// `@node` only goes on object types, and node types must have at
    /// least one scalar or enum field so that their generated `Where` and
    /// `CreateInput` types are never empty.
    fn validate_node_directives(&self) -> Vec<SchemaValidationError> {
        let mut errors = vec![];

        for interface_type in self.document.get_interface_type_definitions() {
            if interface_type.find_directive(NODE_DIRECTIVE).is_some() {
                errors.push(SchemaValidationError::NodeOnNonObjectType(
                    interface_type.name.clone(),
                ));
            }
        }

        for object_type in self.document.get_object_type_definitions() {
            if object_type.find_directive(NODE_DIRECTIVE).is_none() {
                continue;
            }
            let has_attributes = object_type.fields.iter().any(|field| {
                field.find_directive(RELATIONSHIP_DIRECTIVE).is_none()
                    && self.is_attribute_type(field.field_type.get_base_type())
            });
            if !has_attributes {
                errors.push(SchemaValidationError::NodeTypeWithoutAttributes(
                    object_type.name.clone(),
                ));
            }
        }

        errors
    }

    fn validate_relationship_directives(&self) -> Vec<SchemaValidationError> {
        let mut errors = vec![];

        for interface_type in self.document.get_interface_type_definitions() {
            for field in &interface_type.fields {
                if field.find_directive(RELATIONSHIP_DIRECTIVE).is_some() {
                    errors.push(SchemaValidationError::RelationshipOnInterface(
                        interface_type.name.clone(),
                        field.name.clone(),
                    ));
                }
            }
        }

        for object_type in self.document.get_object_type_definitions() {
            let is_node = object_type.find_directive(NODE_DIRECTIVE).is_some();
            for field in &object_type.fields {
                if field.find_directive(RELATIONSHIP_DIRECTIVE).is_none() {
                    continue;
                }
                if !is_node {
                    errors.push(SchemaValidationError::RelationshipOnNonNodeType(
                        object_type.name.clone(),
                        field.name.clone(),
                    ));
                    continue;
                }
                if let Err(e) = RelField::parse(self, &object_type.name, field) {
                    errors.push(e);
                }
            }
        }

        errors
    }

    /// Every field must use a declared type.
    fn validate_fields(&self) -> Vec<SchemaValidationError> {
        let local_types = self.document.get_object_and_interface_type_fields();
        let local_enums = self
            .document
            .get_enum_definitions()
            .iter()
            .map(|enum_type| enum_type.name.clone())
            .collect::<Vec<String>>();
        let local_unions = self
            .document
            .get_union_type_definitions()
            .iter()
            .map(|union_type| union_type.name.clone())
            .collect::<Vec<String>>();
        let local_scalars = self
            .document
            .definitions
            .iter()
            .filter_map(|d| match d {
                s::Definition::TypeDefinition(s::TypeDefinition::Scalar(t)) => Some(t.name.clone()),
                _ => None,
            })
            .collect::<Vec<String>>();

        let mut errors = vec![];
        for (type_name, fields) in &local_types {
            for field in *fields {
                let base = field.field_type.get_base_type();
                if is_scalar_type_name(base)
                    || local_types.contains_key(&base.to_string())
                    || local_enums.iter().any(|name| name == base)
                    || local_unions.iter().any(|name| name == base)
                    || local_scalars.iter().any(|name| name == base)
                {
                    continue;
                }
                errors.push(SchemaValidationError::FieldTypeUnknown(
                    type_name.to_string(),
                    field.name.clone(),
                    base.to_string(),
                ));
            }
        }
        errors
    }

    /// Checks whether the schema uses type names that the generator needs
    /// for itself.
    fn validate_reserved_types_usage(&self) -> Result<(), SchemaValidationError> {
        let document = &self.document;
        let declared_names: Vec<&String> = document
            .get_object_type_definitions()
            .into_iter()
            .map(|object_type| &object_type.name)
            .chain(
                document
                    .get_interface_type_definitions()
                    .into_iter()
                    .map(|interface_type| &interface_type.name),
            )
            .chain(
                document
                    .get_union_type_definitions()
                    .into_iter()
                    .map(|union_type| &union_type.name),
            )
            .collect();

        let mut reserved_types: Vec<String> = RESERVED_TYPE_NAMES
            .iter()
            .map(|name| name.to_string())
            .collect();
        for name in &declared_names {
            for suffix in RESERVED_SUFFIXES {
                reserved_types.push(format!("{}{}", name, suffix));
            }
        }

        // `reserved_types` will now only contain the reserved names the
        // given schema *is* using.
        reserved_types.retain(|reserved_type| document.get_named_type(reserved_type).is_some());

        if reserved_types.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::UsageOfReservedTypes(Strings(
                reserved_types,
            )))
        }
    }

    /// True for the types that count as plain attributes of a node: the
    /// built-in scalars, declared enums and declared custom scalars.
    pub(crate) fn is_attribute_type(&self, name: &str) -> bool {
        if is_scalar_type_name(name) {
            return true;
        }
        match self.document.get_named_type(name) {
            Some(s::TypeDefinition::Enum(_)) | Some(s::TypeDefinition::Scalar(_)) => true,
            _ => false,
        }
    }
}

#[test]
fn non_existing_interface() {
    let schema = "type Foo implements Bar @node { foo: Int }";
    let res = Schema::parse(schema);
    let error = res
        .unwrap_err()
        .downcast::<SchemaValidationError>()
        .unwrap();
    assert_eq!(
        error,
        SchemaValidationError::InterfaceUndefined("Bar".to_owned())
    );
}

#[test]
fn invalid_interface_implementation() {
    let schema = "
        interface Foo {
            x: Int,
            y: Int
        }

        type Bar implements Foo @node {
            x: Boolean
        }
    ";
    let res = Schema::parse(schema);
    assert_eq!(
        res.unwrap_err().to_string(),
        "Type `Bar` does not satisfy interface `Foo` because it is missing \
         the following fields: x: Int, y: Int",
    );
}

#[test]
fn node_type_needs_attributes() {
    let schema = "
        type Person @node {
            name: String!
        }

        type Friendship @node {
            partners: [Person!]! @relationship(type: \"PART_OF\", direction: OUT)
        }
    ";
    let schema = Schema::parse(schema).unwrap();
    let errors = schema.validate().unwrap_err();
    assert_eq!(
        errors,
        vec![SchemaValidationError::NodeTypeWithoutAttributes(
            "Friendship".to_owned()
        )]
    );
}

#[test]
fn relationship_needs_node_type() {
    let schema = "
        type Person @node {
            name: String!
        }

        type Appearance {
            title: String
            person: Person @relationship(type: \"APPEARS_AS\", direction: OUT)
        }
    ";
    let schema = Schema::parse(schema).unwrap();
    let errors = schema.validate().unwrap_err();
    assert_eq!(
        errors,
        vec![SchemaValidationError::RelationshipOnNonNodeType(
            "Appearance".to_owned(),
            "person".to_owned()
        )]
    );
}

#[test]
fn interface_target_needs_fields() {
    let schema = "
        interface Debt

        type Person @node {
            name: String!
            debts: [Debt!]! @relationship(type: \"OWES\", direction: OUT)
        }
    ";
    let schema = Schema::parse(schema).unwrap();
    let errors = schema.validate().unwrap_err();
    assert_eq!(
        errors,
        vec![SchemaValidationError::InterfaceTargetWithoutFields(
            "Debt".to_owned()
        )]
    );
}

#[test]
fn unknown_field_types_are_rejected() {
    let schema = "
        type Person @node {
            name: String!
            address: Address
        }
    ";
    let schema = Schema::parse(schema).unwrap();
    let errors = schema.validate().unwrap_err();
    assert_eq!(
        errors,
        vec![SchemaValidationError::FieldTypeUnknown(
            "Person".to_owned(),
            "address".to_owned(),
            "Address".to_owned()
        )]
    );
}

#[test]
fn reserved_type_names_are_rejected() {
    let schema = "
        type Person @node {
            name: String!
        }

        type PersonWhere @node {
            name: String!
        }

        type CreateInfo @node {
            name: String!
        }
    ";
    let schema = Schema::parse(schema).unwrap();
    let errors = schema.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        SchemaValidationError::UsageOfReservedTypes(Strings(names)) => {
            assert_eq!(names, &vec!["CreateInfo".to_owned(), "PersonWhere".to_owned()]);
        }
        e => panic!("expected UsageOfReservedTypes, got {}", e),
    }
}
