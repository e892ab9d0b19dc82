use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Error};
use itertools::Itertools;

use crate::prelude::s;
use crate::prelude::{DirectiveExt, DirectiveFinder, DocumentExt, TypeExt, ValueExt};
use crate::schema::api;

use super::{
    ApiSchema, APISchemaError, Schema, SchemaValidationError, NODE_DIRECTIVE,
    RELATIONSHIP_DIRECTIVE,
};

/// The internal representation of a set of annotated type definitions. Any
/// code that inspects node types and their relationships should use this
/// struct; the CRUD schema for querying and mutating is an `ApiSchema`,
/// generated with the `api_schema` method.
#[derive(Clone, Debug)]
pub struct InputSchema {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    schema: Schema,
    node_types: BTreeMap<String, NodeType>,
    interface_targets: BTreeMap<String, InterfaceTarget>,
}

/// An object type annotated with `@node`.
#[derive(Clone, Debug)]
pub struct NodeType {
    pub name: String,
    /// The scalar and enum fields of the type.
    pub attributes: Vec<s::Field>,
    pub relationships: Vec<RelField>,
}

/// An interface that appears as the target of at least one relationship.
#[derive(Clone, Debug)]
pub struct InterfaceTarget {
    pub name: String,
    pub fields: Vec<s::Field>,
    /// The node types implementing the interface.
    pub implementors: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NestedOperation {
    Create,
    Connect,
    Update,
    Delete,
    Disconnect,
}

impl NestedOperation {
    pub const ALL: [NestedOperation; 5] = [
        NestedOperation::Create,
        NestedOperation::Connect,
        NestedOperation::Update,
        NestedOperation::Delete,
        NestedOperation::Disconnect,
    ];
}

impl FromStr for NestedOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "CREATE" => Ok(NestedOperation::Create),
            "CONNECT" => Ok(NestedOperation::Connect),
            "UPDATE" => Ok(NestedOperation::Update),
            "DELETE" => Ok(NestedOperation::Delete),
            "DISCONNECT" => Ok(NestedOperation::Disconnect),
            _ => Err(anyhow!("failed to parse `{}` as a nested operation", s)),
        }
    }
}

impl fmt::Display for NestedOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NestedOperation::Create => "CREATE",
            NestedOperation::Connect => "CONNECT",
            NestedOperation::Update => "UPDATE",
            NestedOperation::Delete => "DELETE",
            NestedOperation::Disconnect => "DISCONNECT",
        };
        write!(f, "{}", name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RelDirection {
    In,
    Out,
}

impl FromStr for RelDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "IN" => Ok(RelDirection::In),
            "OUT" => Ok(RelDirection::Out),
            _ => Err(anyhow!("failed to parse `{}` as a direction", s)),
        }
    }
}

/// What a relationship field points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelTarget {
    /// A single `@node` object type.
    Node(String),
    /// A union whose members are all node types.
    Union { name: String, members: Vec<String> },
    /// An interface implemented exclusively by node types.
    Interface {
        name: String,
        implementors: Vec<String>,
    },
}

impl RelTarget {
    pub fn name(&self) -> &str {
        match self {
            RelTarget::Node(name) => name,
            RelTarget::Union { name, .. } => name,
            RelTarget::Interface { name, .. } => name,
        }
    }
}

/// A field of a node type carrying a `@relationship` directive.
#[derive(Clone, Debug)]
pub struct RelField {
    pub name: String,
    /// The relationship type in the graph, e.g. `ACTED_IN`.
    pub rel_type: String,
    pub direction: RelDirection,
    /// The nested mutation operations the schema allows through this
    /// relationship.
    pub operations: BTreeSet<NestedOperation>,
    pub target: RelTarget,
    pub is_list: bool,
}

impl RelField {
    pub fn allows(&self, op: NestedOperation) -> bool {
        self.operations.contains(&op)
    }

    /// Parse the `@relationship` directive on `field`. The caller must
    /// have checked that the directive is present and that `type_name` is
    /// a node type.
    pub(in crate::schema) fn parse(
        schema: &Schema,
        type_name: &str,
        field: &s::Field,
    ) -> Result<RelField, SchemaValidationError> {
        let invalid = |reason: &str| {
            SchemaValidationError::InvalidRelationship(
                type_name.to_owned(),
                field.name.clone(),
                reason.to_owned(),
            )
        };

        let directive = field
            .find_directive(RELATIONSHIP_DIRECTIVE)
            .expect("caller checked that the directive is present");

        let rel_type = directive
            .argument("type")
            .and_then(ValueExt::as_str)
            .ok_or_else(|| invalid("the `type` argument must be a string"))?
            .to_owned();

        let direction = directive
            .argument("direction")
            .and_then(ValueExt::as_enum)
            .ok_or_else(|| invalid("the `direction` argument must be `IN` or `OUT`"))
            .and_then(|name| {
                RelDirection::from_str(name)
                    .map_err(|_| invalid("the `direction` argument must be `IN` or `OUT`"))
            })?;

        let operations = match directive.argument("nestedOperations") {
            None => BTreeSet::from(NestedOperation::ALL),
            Some(value) => {
                let list = value
                    .as_list()
                    .ok_or_else(|| invalid("`nestedOperations` must be a list"))?;
                if list.is_empty() {
                    return Err(invalid("`nestedOperations` must not be empty"));
                }
                let mut operations = BTreeSet::new();
                for entry in list {
                    let op = entry
                        .as_enum()
                        .ok_or_else(|| invalid("`nestedOperations` entries must be enum values"))
                        .and_then(|name| {
                            NestedOperation::from_str(name).map_err(|_| {
                                invalid(&format!("unknown nested operation `{}`", entry))
                            })
                        })?;
                    if !operations.insert(op) {
                        return Err(invalid(&format!(
                            "duplicate nested operation `{}`",
                            op
                        )));
                    }
                }
                operations
            }
        };

        let target = Self::parse_target(schema, type_name, field)?;

        Ok(RelField {
            name: field.name.clone(),
            rel_type,
            direction,
            operations,
            target,
            is_list: field.field_type.is_list(),
        })
    }

    fn parse_target(
        schema: &Schema,
        type_name: &str,
        field: &s::Field,
    ) -> Result<RelTarget, SchemaValidationError> {
        let base = field.field_type.get_base_type();
        let not_a_node = |name: &str| {
            SchemaValidationError::RelationshipTargetNotANode(
                type_name.to_owned(),
                field.name.clone(),
                name.to_owned(),
            )
        };

        match schema.document.get_named_type(base) {
            None => Err(SchemaValidationError::RelationshipTargetUnknown(
                type_name.to_owned(),
                field.name.clone(),
                base.to_owned(),
            )),
            Some(s::TypeDefinition::Object(object_type)) => {
                if object_type.find_directive(NODE_DIRECTIVE).is_some() {
                    Ok(RelTarget::Node(object_type.name.clone()))
                } else {
                    Err(not_a_node(&object_type.name))
                }
            }
            Some(s::TypeDefinition::Union(union_type)) => {
                for member in &union_type.types {
                    if !schema.is_node_type(member) {
                        return Err(not_a_node(member));
                    }
                }
                Ok(RelTarget::Union {
                    name: union_type.name.clone(),
                    members: union_type.types.clone(),
                })
            }
            Some(s::TypeDefinition::Interface(interface_type)) => {
                if interface_type.fields.is_empty() {
                    return Err(SchemaValidationError::InterfaceTargetWithoutFields(
                        interface_type.name.clone(),
                    ));
                }
                if interface_type
                    .fields
                    .iter()
                    .any(|f| !schema.is_attribute_type(f.field_type.get_base_type()))
                {
                    return Err(SchemaValidationError::InterfaceTargetWithNonScalarFields(
                        interface_type.name.clone(),
                    ));
                }
                let implementors = schema
                    .types_for_interface
                    .get(&interface_type.name)
                    .map(|object_types| {
                        object_types
                            .iter()
                            .map(|object_type| object_type.name.clone())
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                for implementor in &implementors {
                    if !schema.is_node_type(implementor) {
                        return Err(not_a_node(implementor));
                    }
                }
                Ok(RelTarget::Interface {
                    name: interface_type.name.clone(),
                    implementors,
                })
            }
            Some(_) => Err(SchemaValidationError::InvalidRelationship(
                type_name.to_owned(),
                field.name.clone(),
                "the target must be an object, union, or interface type".to_owned(),
            )),
        }
    }
}

impl InputSchema {
    fn create(schema: Schema) -> Self {
        let mut node_types = BTreeMap::new();
        for object_type in schema.document.get_object_type_definitions() {
            if object_type.find_directive(NODE_DIRECTIVE).is_none() {
                continue;
            }
            let mut attributes = vec![];
            let mut relationships = vec![];
            for field in &object_type.fields {
                if field.find_directive(RELATIONSHIP_DIRECTIVE).is_some() {
                    // Validation has run; parsing can no longer fail.
                    let rel = RelField::parse(&schema, &object_type.name, field)
                        .expect("relationship directives have been validated");
                    relationships.push(rel);
                } else if schema.is_attribute_type(field.field_type.get_base_type()) {
                    attributes.push(field.clone());
                }
            }
            node_types.insert(
                object_type.name.clone(),
                NodeType {
                    name: object_type.name.clone(),
                    attributes,
                    relationships,
                },
            );
        }

        let mut interface_targets = BTreeMap::new();
        for node_type in node_types.values() {
            for rel in &node_type.relationships {
                if let RelTarget::Interface { name, implementors } = &rel.target {
                    if interface_targets.contains_key(name) {
                        continue;
                    }
                    let interface_type = schema
                        .document
                        .find_interface(name)
                        .expect("relationship targets have been validated");
                    interface_targets.insert(
                        name.clone(),
                        InterfaceTarget {
                            name: name.clone(),
                            fields: interface_type.fields.clone(),
                            implementors: implementors.clone(),
                        },
                    );
                }
            }
        }

        Self {
            inner: Arc::new(Inner {
                schema,
                node_types,
                interface_targets,
            }),
        }
    }

    /// Create a new `InputSchema` from an already parsed document. The
    /// document is validated here; on failure all validation errors are
    /// reported, not just the first.
    pub fn new(document: s::Document) -> Result<Self, Error> {
        let schema = Schema::new(document)?;
        Self::validated(schema)
    }

    /// A convenience function for creating an `InputSchema` from the
    /// string representation of the type definitions.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let schema = Schema::parse(raw)?;
        Self::validated(schema)
    }

    fn validated(schema: Schema) -> Result<Self, Error> {
        schema
            .validate()
            .map_err(|errors| anyhow!("invalid type definitions: {}", errors.iter().join("; ")))?;
        Ok(Self::create(schema))
    }

    /// Generate the `ApiSchema` with the CRUD machinery for this
    /// `InputSchema`
    pub fn api_schema(&self) -> Result<ApiSchema, APISchemaError> {
        let document = api::api_schema(self)?;
        ApiSchema::from_api_schema(document)
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub fn node_types(&self) -> impl Iterator<Item = (&str, &NodeType)> {
        self.inner
            .node_types
            .iter()
            .map(|(name, node_type)| (name.as_str(), node_type))
    }

    pub fn node_type(&self, name: &str) -> Option<&NodeType> {
        self.inner.node_types.get(name)
    }

    pub fn interface_targets(&self) -> impl Iterator<Item = (&str, &InterfaceTarget)> {
        self.inner
            .interface_targets
            .iter()
            .map(|(name, target)| (name.as_str(), target))
    }

    pub fn interface_target(&self, name: &str) -> Option<&InterfaceTarget> {
        self.inner.interface_targets.get(name)
    }

    /// The node types that appear as the target of at least one
    /// relationship, either directly or as the member of a union target.
    /// These are the types a mutation can connect to, so they get a
    /// `ConnectWhere` type.
    pub fn connect_targets(&self) -> BTreeSet<&str> {
        let mut targets = BTreeSet::new();
        for node_type in self.inner.node_types.values() {
            for rel in &node_type.relationships {
                match &rel.target {
                    RelTarget::Node(name) => {
                        targets.insert(name.as_str());
                    }
                    RelTarget::Union { members, .. } => {
                        targets.extend(members.iter().map(|member| member.as_str()));
                    }
                    RelTarget::Interface { .. } => {
                        // Interface targets have their own `ConnectWhere`
                        // generated alongside their `Where`.
                    }
                }
            }
        }
        targets
    }

    /// True if the generator emits a `<name>ConnectInput` for the node
    /// type, i.e. some relationship of the type allows `CONNECT`.
    pub fn has_connect_input(&self, name: &str) -> bool {
        self.allows_some(name, NestedOperation::Connect)
    }

    pub fn has_disconnect_input(&self, name: &str) -> bool {
        self.allows_some(name, NestedOperation::Disconnect)
    }

    pub fn has_delete_input(&self, name: &str) -> bool {
        self.allows_some(name, NestedOperation::Delete)
    }

    fn allows_some(&self, name: &str, op: NestedOperation) -> bool {
        self.inner.node_types.get(name).map_or(false, |node_type| {
            node_type.relationships.iter().any(|rel| rel.allows(op))
        })
    }

    pub fn document_string(&self) -> String {
        self.inner.schema.document.to_string()
    }
}
