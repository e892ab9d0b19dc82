use std::sync::Arc;

use inflector::Inflector;
use lazy_static::lazy_static;
use thiserror::Error;

use crate::prelude::s;
use crate::prelude::{camel_cased_names, DocumentExt, TypeExt, ENV_VARS};
use crate::schema::{ast, is_scalar_type_name, NODE_DIRECTIVE, RELATIONSHIP_DIRECTIVE};

use super::{InputSchema, NestedOperation, NodeType, RelField, RelTarget};

lazy_static! {
    static ref META_DEFINITIONS: Vec<s::Definition> = {
        let meta = include_str!("meta.graphql");
        s::parse_schema(meta)
            .expect("the schema in meta.graphql is invalid")
            .definitions
    };
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum APISchemaError {
    #[error("API schema type `{0}` already exists in the input schema")]
    TypeExists(String),
    #[error("Type `{0}` not found in the generated schema")]
    TypeNotFound(String),
}

/// A GraphQL schema with all the CRUD types and root fields that clients
/// can use to query and mutate node types. The schema is derived entirely
/// from an `InputSchema` by `InputSchema::api_schema`.
#[derive(Clone, Debug)]
pub struct ApiSchema {
    document: s::Document,
    query_type: Arc<s::ObjectType>,
    mutation_type: Option<Arc<s::ObjectType>>,
}

impl ApiSchema {
    pub(in crate::schema) fn from_api_schema(document: s::Document) -> Result<Self, APISchemaError> {
        let query_type = document
            .get_root_query_type()
            .cloned()
            .map(Arc::new)
            .ok_or_else(|| APISchemaError::TypeNotFound("Query".to_owned()))?;
        let mutation_type = document.get_root_mutation_type().cloned().map(Arc::new);

        Ok(Self {
            document,
            query_type,
            mutation_type,
        })
    }

    pub fn document(&self) -> &s::Document {
        &self.document
    }

    pub fn query_type(&self) -> &s::ObjectType {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&s::ObjectType> {
        self.mutation_type.as_deref()
    }

    pub fn get_named_type(&self, name: &str) -> Option<&s::TypeDefinition> {
        self.document.get_named_type(name)
    }

    /// Returns true if the given type is an input type. Uses the provided
    /// schema to resolve named types.
    pub fn is_input_type(&self, t: &s::Type) -> bool {
        match ast::get_type_definition_from_type(&self.document, t) {
            Some(s::TypeDefinition::Scalar(_))
            | Some(s::TypeDefinition::Enum(_))
            | Some(s::TypeDefinition::InputObject(_)) => true,
            Some(_) => false,
            None => is_scalar_type_name(t.get_base_type()),
        }
    }
}

/// Derives a full-fledged GraphQL API schema from an input schema. The
/// input schema has already been validated.
pub(in crate::schema) fn api_schema(
    input_schema: &InputSchema,
) -> Result<s::Document, APISchemaError> {
    let mut api = init_api_schema(input_schema);
    add_meta_types(&mut api);
    add_types_for_interface_targets(&mut api, input_schema)?;
    add_types_for_node_types(&mut api, input_schema)?;
    add_query_type(&mut api, input_schema)?;
    add_mutation_type(&mut api, input_schema)?;
    Ok(api)
}

/// Copies the type definitions of the input schema, stripping the `@node`
/// and `@relationship` directives and their definitions, if any.
fn init_api_schema(input_schema: &InputSchema) -> s::Document {
    let mut api = s::Document {
        definitions: vec![],
    };
    for defn in &input_schema.schema().document.definitions {
        match defn {
            s::Definition::SchemaDefinition(_) | s::Definition::TypeExtension(_) => (),
            s::Definition::DirectiveDefinition(directive) => {
                if directive.name != NODE_DIRECTIVE && directive.name != RELATIONSHIP_DIRECTIVE {
                    api.definitions.push(defn.clone());
                }
            }
            s::Definition::TypeDefinition(typedef) => {
                let typedef = match typedef {
                    s::TypeDefinition::Object(object_type) => {
                        let mut object_type = object_type.clone();
                        object_type
                            .directives
                            .retain(|directive| directive.name != NODE_DIRECTIVE);
                        for field in object_type.fields.iter_mut() {
                            field
                                .directives
                                .retain(|directive| directive.name != RELATIONSHIP_DIRECTIVE);
                        }
                        s::TypeDefinition::Object(object_type)
                    }
                    other => other.clone(),
                };
                api.definitions.push(s::Definition::TypeDefinition(typedef));
            }
        }
    }
    api
}

fn add_meta_types(api: &mut s::Document) {
    api.definitions.extend(META_DEFINITIONS.iter().cloned());
}

fn add_type_definition(api: &mut s::Document, typedef: s::TypeDefinition) -> Result<(), APISchemaError> {
    let name = ast::get_type_name(&typedef);
    if api.get_named_type(name).is_some() {
        return Err(APISchemaError::TypeExists(name.to_owned()));
    }
    api.definitions.push(s::Definition::TypeDefinition(typedef));
    Ok(())
}

fn add_input_type(
    api: &mut s::Document,
    name: String,
    fields: Vec<s::InputValue>,
) -> Result<(), APISchemaError> {
    add_type_definition(
        api,
        s::TypeDefinition::InputObject(s::InputObjectType {
            position: s::Pos::default(),
            description: None,
            name,
            directives: vec![],
            fields,
        }),
    )
}

/// Like `add_input_type`, but silently skips input objects that would end
/// up with no fields, which GraphQL forbids. Callers omit references to
/// the type under the same condition.
fn add_gated_input_type(
    api: &mut s::Document,
    name: String,
    fields: Vec<s::InputValue>,
) -> Result<(), APISchemaError> {
    if fields.is_empty() {
        return Ok(());
    }
    add_input_type(api, name, fields)
}

fn input_value(name: &str, suffix: &str, value_type: s::Type) -> s::InputValue {
    s::InputValue {
        position: s::Pos::default(),
        description: None,
        name: if suffix.is_empty() {
            name.to_owned()
        } else {
            format!("{}_{}", name, suffix)
        },
        value_type,
        default_value: None,
        directives: vec![],
    }
}

fn named_type(name: impl Into<String>) -> s::Type {
    s::Type::NamedType(name.into())
}

fn non_null(t: s::Type) -> s::Type {
    s::Type::NonNullType(Box::new(t))
}

fn list_of(t: s::Type) -> s::Type {
    s::Type::ListType(Box::new(t))
}

/// List-valued relationships wrap their per-field input types in `[X!]`,
/// single-valued ones use the bare type.
fn wrap_rel(t: s::Type, is_list: bool) -> s::Type {
    if is_list {
        list_of(non_null(t))
    } else {
        t
    }
}

/// The `Where` operator suffixes for a non-list field of the given type.
/// An empty suffix stands for the equality operator carrying the field's
/// own name. Enums and custom scalars only support the default operators.
fn field_filter_ops(type_name: &str) -> &'static [&'static str] {
    match type_name {
        "Boolean" => &["", "NOT"],
        "ID" | "String" => &[
            "",
            "NOT",
            "IN",
            "NOT_IN",
            "CONTAINS",
            "NOT_CONTAINS",
            "STARTS_WITH",
            "NOT_STARTS_WITH",
            "ENDS_WITH",
            "NOT_ENDS_WITH",
        ],
        "Int" | "Float" => &["", "NOT", "IN", "NOT_IN", "LT", "LTE", "GT", "GTE"],
        _ => &["", "NOT", "IN", "NOT_IN"],
    }
}

fn attribute_filter_values(field: &s::Field) -> Vec<s::InputValue> {
    let base = field.field_type.get_base_type();
    if field.field_type.is_list() {
        let list = list_of(named_type(base));
        return vec![
            input_value(&field.name, "", list.clone()),
            input_value(&field.name, "NOT", list),
            input_value(&field.name, "INCLUDES", named_type(base)),
            input_value(&field.name, "NOT_INCLUDES", named_type(base)),
        ];
    }
    field_filter_ops(base)
        .iter()
        .map(|&op| {
            let value_type = match op {
                "IN" | "NOT_IN" => list_of(named_type(base)),
                _ => named_type(base),
            };
            input_value(&field.name, op, value_type)
        })
        .collect()
}

/// Filter fields for a relationship. Union targets have no common `Where`
/// type and therefore contribute nothing.
fn relationship_filter_values(rel: &RelField) -> Vec<s::InputValue> {
    if ENV_VARS.disable_relationship_filters() {
        return vec![];
    }
    let target_where = match &rel.target {
        RelTarget::Node(name) => format!("{}Where", name),
        RelTarget::Interface { name, .. } => format!("{}Where", name),
        RelTarget::Union { .. } => return vec![],
    };
    if rel.is_list {
        ["ALL", "NONE", "SINGLE", "SOME"]
            .into_iter()
            .map(|op| input_value(&rel.name, op, named_type(target_where.as_str())))
            .collect()
    } else {
        vec![
            input_value(&rel.name, "", named_type(target_where.as_str())),
            input_value(&rel.name, "NOT", named_type(target_where.as_str())),
        ]
    }
}

fn add_where_type(
    api: &mut s::Document,
    type_name: &str,
    attributes: &[s::Field],
    relationships: &[RelField],
    implementation: Option<&str>,
) -> Result<(), APISchemaError> {
    let name = format!("{}Where", type_name);
    let mut fields = vec![];
    for field in attributes {
        fields.extend(attribute_filter_values(field));
    }
    for rel in relationships {
        fields.extend(relationship_filter_values(rel));
    }
    if let Some(enum_name) = implementation {
        fields.push(input_value(
            "typename",
            "IN",
            list_of(non_null(named_type(enum_name))),
        ));
    }
    if !ENV_VARS.disable_bool_filters() {
        fields.push(input_value("AND", "", list_of(non_null(named_type(name.as_str())))));
        fields.push(input_value("OR", "", list_of(non_null(named_type(name.as_str())))));
        fields.push(input_value("NOT", "", named_type(name.as_str())));
    }
    add_input_type(api, name, fields)
}

fn add_connect_where(api: &mut s::Document, type_name: &str) -> Result<(), APISchemaError> {
    add_input_type(
        api,
        format!("{}ConnectWhere", type_name),
        vec![input_value(
            "node",
            "",
            non_null(named_type(format!("{}Where", type_name))),
        )],
    )
}

/// The `Sort` and `Options` types for a node type. `Sort` is left out when
/// the type has no sortable field; list attributes cannot be sorted by.
fn add_sort_and_options_types(
    api: &mut s::Document,
    type_name: &str,
    attributes: &[s::Field],
) -> Result<(), APISchemaError> {
    let sortable: Vec<_> = attributes
        .iter()
        .filter(|field| !field.field_type.is_list())
        .collect();

    let mut options_fields = vec![
        input_value("limit", "", named_type("Int")),
        input_value("offset", "", named_type("Int")),
    ];
    if !sortable.is_empty() {
        let sort_name = format!("{}Sort", type_name);
        let fields = sortable
            .iter()
            .map(|field| input_value(&field.name, "", named_type("SortDirection")))
            .collect();
        add_input_type(api, sort_name.clone(), fields)?;
        options_fields.push(input_value(
            "sort",
            "",
            list_of(non_null(named_type(sort_name))),
        ));
    }
    add_input_type(api, format!("{}Options", type_name), options_fields)
}

/// Interfaces used as relationship targets get their own `Where` (with a
/// `typename_IN` filter over the implementing node types), `ConnectWhere`,
/// a member-keyed `CreateInput` and an `UpdateInput` over the interface's
/// own fields.
fn add_types_for_interface_targets(
    api: &mut s::Document,
    input_schema: &InputSchema,
) -> Result<(), APISchemaError> {
    for (name, target) in input_schema.interface_targets() {
        let implementation = if target.implementors.is_empty() {
            None
        } else {
            let enum_name = format!("{}Implementation", name);
            let values = target
                .implementors
                .iter()
                .map(|implementor| s::EnumValue {
                    position: s::Pos::default(),
                    description: None,
                    name: implementor.clone(),
                    directives: vec![],
                })
                .collect();
            add_type_definition(
                api,
                s::TypeDefinition::Enum(s::EnumType {
                    position: s::Pos::default(),
                    description: None,
                    name: enum_name.clone(),
                    directives: vec![],
                    values,
                }),
            )?;
            Some(enum_name)
        };

        add_where_type(api, name, &target.fields, &[], implementation.as_deref())?;
        add_connect_where(api, name)?;

        let fields = target
            .implementors
            .iter()
            .map(|implementor| {
                input_value(
                    implementor,
                    "",
                    named_type(format!("{}CreateInput", implementor)),
                )
            })
            .collect();
        add_gated_input_type(api, format!("{}CreateInput", name), fields)?;

        let fields = target
            .fields
            .iter()
            .map(|field| input_value(&field.name, "", ast::nullable(&field.field_type)))
            .collect();
        add_input_type(api, format!("{}UpdateInput", name), fields)?;
    }
    Ok(())
}

fn add_types_for_node_types(
    api: &mut s::Document,
    input_schema: &InputSchema,
) -> Result<(), APISchemaError> {
    for target in input_schema.connect_targets() {
        add_connect_where(api, target)?;
    }
    for (name, node_type) in input_schema.node_types() {
        add_where_type(api, name, &node_type.attributes, &node_type.relationships, None)?;
        add_sort_and_options_types(api, name, &node_type.attributes)?;
        for rel in &node_type.relationships {
            add_rel_field_types(api, input_schema, name, rel)?;
        }
        add_create_input(api, name, node_type)?;
        add_update_input(api, name, node_type)?;
        add_top_level_inputs(api, name, node_type)?;
        add_mutation_response_types(api, name)?;
    }
    Ok(())
}

/// Whether the relationship can produce a `CreateFieldInput`. Besides the
/// operation being allowed, the target's `CreateInput` must exist; for an
/// interface target without implementors there is none.
fn allows_create(rel: &RelField) -> bool {
    rel.allows(NestedOperation::Create)
        && match &rel.target {
            RelTarget::Interface { implementors, .. } => !implementors.is_empty(),
            _ => true,
        }
}

fn rel_prefix(node_name: &str, rel: &RelField) -> String {
    format!("{}{}", node_name, rel.name.to_pascal_case())
}

fn add_rel_field_types(
    api: &mut s::Document,
    input_schema: &InputSchema,
    node_name: &str,
    rel: &RelField,
) -> Result<(), APISchemaError> {
    let prefix = rel_prefix(node_name, rel);
    match &rel.target {
        RelTarget::Union { members, .. } => {
            for member in members {
                let member_prefix = format!("{}{}", prefix, member);
                add_rel_inputs_for_target(api, input_schema, &member_prefix, member, true, rel)?;
            }
            add_union_wrappers(api, &prefix, members, rel)
        }
        target => {
            let is_node = matches!(target, RelTarget::Node(_));
            add_rel_inputs_for_target(api, input_schema, &prefix, target.name(), is_node, rel)
        }
    }
}

/// The per-field input family against a single target type: the target is
/// either a node type or an interface target. Interface targets never have
/// the top-level `ConnectInput`/`DisconnectInput`/`DeleteInput` types, so
/// their `*FieldInput`s carry no recursive member.
fn add_rel_inputs_for_target(
    api: &mut s::Document,
    input_schema: &InputSchema,
    prefix: &str,
    target: &str,
    is_node: bool,
    rel: &RelField,
) -> Result<(), APISchemaError> {
    let connect_where = format!("{}ConnectWhere", target);

    if allows_create(rel) {
        add_input_type(
            api,
            format!("{}CreateFieldInput", prefix),
            vec![input_value(
                "node",
                "",
                non_null(named_type(format!("{}CreateInput", target))),
            )],
        )?;
    }
    if rel.allows(NestedOperation::Connect) {
        let mut fields = vec![input_value("where", "", named_type(connect_where.as_str()))];
        if is_node && input_schema.has_connect_input(target) {
            fields.push(input_value(
                "connect",
                "",
                named_type(format!("{}ConnectInput", target)),
            ));
        }
        add_input_type(api, format!("{}ConnectFieldInput", prefix), fields)?;
    }
    if rel.allows(NestedOperation::Disconnect) {
        let mut fields = vec![input_value("where", "", named_type(connect_where.as_str()))];
        if is_node && input_schema.has_disconnect_input(target) {
            fields.push(input_value(
                "disconnect",
                "",
                named_type(format!("{}DisconnectInput", target)),
            ));
        }
        add_input_type(api, format!("{}DisconnectFieldInput", prefix), fields)?;
    }
    if rel.allows(NestedOperation::Delete) {
        let mut fields = vec![input_value("where", "", named_type(connect_where.as_str()))];
        if is_node && input_schema.has_delete_input(target) {
            fields.push(input_value(
                "delete",
                "",
                named_type(format!("{}DeleteInput", target)),
            ));
        }
        add_input_type(api, format!("{}DeleteFieldInput", prefix), fields)?;
    }
    if rel.allows(NestedOperation::Update) {
        let mut fields = vec![
            input_value("where", "", named_type(connect_where.as_str())),
            input_value("update", "", named_type(format!("{}UpdateInput", target))),
        ];
        if allows_create(rel) {
            fields.push(input_value(
                "create",
                "",
                wrap_rel(named_type(format!("{}CreateFieldInput", prefix)), rel.is_list),
            ));
        }
        if rel.allows(NestedOperation::Connect) {
            fields.push(input_value(
                "connect",
                "",
                wrap_rel(named_type(format!("{}ConnectFieldInput", prefix)), rel.is_list),
            ));
        }
        if rel.allows(NestedOperation::Disconnect) {
            fields.push(input_value(
                "disconnect",
                "",
                wrap_rel(
                    named_type(format!("{}DisconnectFieldInput", prefix)),
                    rel.is_list,
                ),
            ));
        }
        if rel.allows(NestedOperation::Delete) {
            fields.push(input_value(
                "delete",
                "",
                wrap_rel(named_type(format!("{}DeleteFieldInput", prefix)), rel.is_list),
            ));
        }
        add_input_type(api, format!("{}UpdateFieldInput", prefix), fields)?;
    }
    if allows_create(rel) || rel.allows(NestedOperation::Connect) {
        let mut fields = vec![];
        if allows_create(rel) {
            fields.push(input_value(
                "create",
                "",
                wrap_rel(named_type(format!("{}CreateFieldInput", prefix)), rel.is_list),
            ));
        }
        if rel.allows(NestedOperation::Connect) {
            fields.push(input_value(
                "connect",
                "",
                wrap_rel(named_type(format!("{}ConnectFieldInput", prefix)), rel.is_list),
            ));
        }
        add_input_type(api, format!("{}FieldInput", prefix), fields)?;
    }
    Ok(())
}

fn union_wrapper_fields(
    prefix: &str,
    members: &[String],
    member_suffix: &str,
    wrap: bool,
    is_list: bool,
) -> Vec<s::InputValue> {
    members
        .iter()
        .map(|member| {
            let t = named_type(format!("{}{}{}", prefix, member, member_suffix));
            let t = if wrap { wrap_rel(t, is_list) } else { t };
            input_value(member, "", t)
        })
        .collect()
}

/// A union-targeted relationship fans out into one input family per member
/// and a member-keyed wrapper per operation. The wrappers are what the
/// `CreateInput`/`UpdateInput` and top-level inputs of the node type refer
/// to.
fn add_union_wrappers(
    api: &mut s::Document,
    prefix: &str,
    members: &[String],
    rel: &RelField,
) -> Result<(), APISchemaError> {
    if allows_create(rel) {
        add_input_type(
            api,
            format!("{}CreateInput", prefix),
            union_wrapper_fields(prefix, members, "CreateFieldInput", true, rel.is_list),
        )?;
    }
    if rel.allows(NestedOperation::Connect) {
        add_input_type(
            api,
            format!("{}ConnectInput", prefix),
            union_wrapper_fields(prefix, members, "ConnectFieldInput", true, rel.is_list),
        )?;
    }
    if rel.allows(NestedOperation::Disconnect) {
        add_input_type(
            api,
            format!("{}DisconnectInput", prefix),
            union_wrapper_fields(prefix, members, "DisconnectFieldInput", true, rel.is_list),
        )?;
    }
    if rel.allows(NestedOperation::Delete) {
        add_input_type(
            api,
            format!("{}DeleteInput", prefix),
            union_wrapper_fields(prefix, members, "DeleteFieldInput", true, rel.is_list),
        )?;
    }
    if rel.allows(NestedOperation::Update) {
        add_input_type(
            api,
            format!("{}UpdateInput", prefix),
            union_wrapper_fields(prefix, members, "UpdateFieldInput", true, rel.is_list),
        )?;
    }
    if allows_create(rel) || rel.allows(NestedOperation::Connect) {
        add_input_type(
            api,
            format!("{}FieldInput", prefix),
            union_wrapper_fields(prefix, members, "FieldInput", false, rel.is_list),
        )?;
    }
    Ok(())
}

fn add_create_input(
    api: &mut s::Document,
    name: &str,
    node_type: &NodeType,
) -> Result<(), APISchemaError> {
    let mut fields: Vec<_> = node_type
        .attributes
        .iter()
        .map(|field| input_value(&field.name, "", field.field_type.clone()))
        .collect();
    for rel in &node_type.relationships {
        if allows_create(rel) || rel.allows(NestedOperation::Connect) {
            fields.push(input_value(
                &rel.name,
                "",
                named_type(format!("{}FieldInput", rel_prefix(name, rel))),
            ));
        }
    }
    add_input_type(api, format!("{}CreateInput", name), fields)
}

fn add_update_input(
    api: &mut s::Document,
    name: &str,
    node_type: &NodeType,
) -> Result<(), APISchemaError> {
    let mut fields: Vec<_> = node_type
        .attributes
        .iter()
        .map(|field| input_value(&field.name, "", ast::nullable(&field.field_type)))
        .collect();
    for rel in &node_type.relationships {
        if !rel.allows(NestedOperation::Update) {
            continue;
        }
        let prefix = rel_prefix(name, rel);
        let value_type = match &rel.target {
            RelTarget::Union { .. } => named_type(format!("{}UpdateInput", prefix)),
            _ => wrap_rel(named_type(format!("{}UpdateFieldInput", prefix)), rel.is_list),
        };
        fields.push(input_value(&rel.name, "", value_type));
    }
    add_input_type(api, format!("{}UpdateInput", name), fields)
}

/// The `ConnectInput`/`DisconnectInput`/`DeleteInput`/`RelationInput`
/// types of a node type collect the relationships granting the operation;
/// each is left out when no relationship does.
fn add_top_level_inputs(
    api: &mut s::Document,
    name: &str,
    node_type: &NodeType,
) -> Result<(), APISchemaError> {
    let mut connect = vec![];
    let mut disconnect = vec![];
    let mut delete = vec![];
    let mut relation = vec![];

    for rel in &node_type.relationships {
        let prefix = rel_prefix(name, rel);
        let is_union = matches!(&rel.target, RelTarget::Union { .. });
        let field = |suffix: &str| {
            // Union-targeted relationships refer to the member-keyed
            // wrapper, which already wraps lists per member.
            if is_union {
                input_value(&rel.name, "", named_type(format!("{}{}Input", prefix, suffix)))
            } else {
                input_value(
                    &rel.name,
                    "",
                    wrap_rel(
                        named_type(format!("{}{}FieldInput", prefix, suffix)),
                        rel.is_list,
                    ),
                )
            }
        };
        if rel.allows(NestedOperation::Connect) {
            connect.push(field("Connect"));
        }
        if rel.allows(NestedOperation::Disconnect) {
            disconnect.push(field("Disconnect"));
        }
        if rel.allows(NestedOperation::Delete) {
            delete.push(field("Delete"));
        }
        if allows_create(rel) {
            relation.push(field("Create"));
        }
    }

    add_gated_input_type(api, format!("{}ConnectInput", name), connect)?;
    add_gated_input_type(api, format!("{}DisconnectInput", name), disconnect)?;
    add_gated_input_type(api, format!("{}DeleteInput", name), delete)?;
    add_gated_input_type(api, format!("{}RelationInput", name), relation)
}

/// Whether the mutation for the node type takes a `create` argument, i.e.
/// whether `<name>RelationInput` was emitted.
fn has_relation_input(node_type: &NodeType) -> bool {
    node_type.relationships.iter().any(allows_create)
}

fn object_field(name: String, arguments: Vec<s::InputValue>, field_type: s::Type) -> s::Field {
    s::Field {
        position: s::Pos::default(),
        description: None,
        name,
        arguments,
        field_type,
        directives: vec![],
    }
}

fn add_mutation_response_types(api: &mut s::Document, name: &str) -> Result<(), APISchemaError> {
    let plural = name.to_plural();
    let (_, plural_field) = camel_cased_names(name);
    for (verb, info) in [("Create", "CreateInfo"), ("Update", "UpdateInfo")] {
        let fields = vec![
            object_field("info".to_owned(), vec![], non_null(named_type(info))),
            object_field(
                plural_field.clone(),
                vec![],
                non_null(list_of(non_null(named_type(name)))),
            ),
        ];
        add_type_definition(
            api,
            s::TypeDefinition::Object(s::ObjectType {
                position: s::Pos::default(),
                description: None,
                name: format!("{}{}MutationResponse", verb, plural),
                implements_interfaces: vec![],
                directives: vec![],
                fields,
            }),
        )?;
    }
    Ok(())
}

fn add_query_type(api: &mut s::Document, input_schema: &InputSchema) -> Result<(), APISchemaError> {
    let fields = input_schema
        .node_types()
        .map(|(name, _)| {
            let (_, plural) = camel_cased_names(name);
            object_field(
                plural,
                vec![
                    input_value("where", "", named_type(format!("{}Where", name))),
                    input_value("options", "", named_type(format!("{}Options", name))),
                ],
                non_null(list_of(non_null(named_type(name)))),
            )
        })
        .collect();
    add_type_definition(
        api,
        s::TypeDefinition::Object(s::ObjectType {
            position: s::Pos::default(),
            description: None,
            name: "Query".to_owned(),
            implements_interfaces: vec![],
            directives: vec![],
            fields,
        }),
    )
}

/// The `Mutation` type is left out entirely when the schema declares no
/// node types, since an empty object type is invalid GraphQL.
fn add_mutation_type(
    api: &mut s::Document,
    input_schema: &InputSchema,
) -> Result<(), APISchemaError> {
    let mut fields = vec![];
    for (name, node_type) in input_schema.node_types() {
        fields.extend(mutation_fields(input_schema, name, node_type));
    }
    if fields.is_empty() {
        return Ok(());
    }
    add_type_definition(
        api,
        s::TypeDefinition::Object(s::ObjectType {
            position: s::Pos::default(),
            description: None,
            name: "Mutation".to_owned(),
            implements_interfaces: vec![],
            directives: vec![],
            fields,
        }),
    )
}

fn mutation_fields(input_schema: &InputSchema, name: &str, node_type: &NodeType) -> Vec<s::Field> {
    let plural = name.to_plural();

    let create = object_field(
        format!("create{}", plural),
        vec![input_value(
            "input",
            "",
            non_null(list_of(non_null(named_type(format!("{}CreateInput", name))))),
        )],
        non_null(named_type(format!("Create{}MutationResponse", plural))),
    );

    let mut update_args = vec![
        input_value("where", "", named_type(format!("{}Where", name))),
        input_value("update", "", named_type(format!("{}UpdateInput", name))),
    ];
    if input_schema.has_connect_input(name) {
        update_args.push(input_value(
            "connect",
            "",
            named_type(format!("{}ConnectInput", name)),
        ));
    }
    if input_schema.has_disconnect_input(name) {
        update_args.push(input_value(
            "disconnect",
            "",
            named_type(format!("{}DisconnectInput", name)),
        ));
    }
    if has_relation_input(node_type) {
        update_args.push(input_value(
            "create",
            "",
            named_type(format!("{}RelationInput", name)),
        ));
    }
    if input_schema.has_delete_input(name) {
        update_args.push(input_value(
            "delete",
            "",
            named_type(format!("{}DeleteInput", name)),
        ));
    }
    let update = object_field(
        format!("update{}", plural),
        update_args,
        non_null(named_type(format!("Update{}MutationResponse", plural))),
    );

    let mut delete_args = vec![input_value("where", "", named_type(format!("{}Where", name)))];
    if input_schema.has_delete_input(name) {
        delete_args.push(input_value(
            "delete",
            "",
            named_type(format!("{}DeleteInput", name)),
        ));
    }
    let delete = object_field(
        format!("delete{}", plural),
        delete_args,
        non_null(named_type("DeleteInfo")),
    );

    vec![create, update, delete]
}

#[cfg(test)]
mod tests {
    use crate::prelude::ObjectTypeExt;

    use super::*;

    const MOVIES: &str = "
        type Movie @node {
            id: ID!
            title: String!
            released: Int
            actors: [Actor!]! @relationship(type: \"ACTED_IN\", direction: IN)
        }

        type Actor @node {
            name: String!
            movies: [Movie!]! @relationship(type: \"ACTED_IN\", direction: OUT)
        }
    ";

    #[track_caller]
    fn api_schema(raw: &str) -> ApiSchema {
        let input_schema = InputSchema::parse(raw).expect("Failed to parse input schema");
        input_schema.api_schema().expect("Failed to derive API schema")
    }

    #[track_caller]
    fn input_object<'a>(schema: &'a ApiSchema, name: &str) -> &'a s::InputObjectType {
        match schema.get_named_type(name) {
            Some(s::TypeDefinition::InputObject(input_object)) => input_object,
            other => panic!("`{}` is not an input object: {:?}", name, other),
        }
    }

    fn field_names(input_object: &s::InputObjectType) -> Vec<&str> {
        input_object
            .fields
            .iter()
            .map(|field| field.name.as_str())
            .collect()
    }

    #[track_caller]
    fn field_type<'a>(input_object: &'a s::InputObjectType, name: &str) -> &'a s::Type {
        &input_object
            .fields
            .iter()
            .find(|field| field.name == name)
            .unwrap_or_else(|| panic!("`{}` has no field `{}`", input_object.name, name))
            .value_type
    }

    #[test]
    fn meta_types_are_added() {
        let schema = api_schema(MOVIES);
        match schema.get_named_type("SortDirection") {
            Some(s::TypeDefinition::Enum(enum_type)) => {
                let values: Vec<_> = enum_type.values.iter().map(|v| v.name.as_str()).collect();
                assert_eq!(values, vec!["ASC", "DESC"]);
            }
            other => panic!("SortDirection is not an enum: {:?}", other),
        }
        for name in ["CreateInfo", "UpdateInfo", "DeleteInfo"] {
            assert!(matches!(
                schema.get_named_type(name),
                Some(s::TypeDefinition::Object(_))
            ));
        }
    }

    #[test]
    fn directives_are_stripped() {
        let schema = api_schema(
            "
            directive @node on OBJECT
            directive @relationship(type: String!, direction: String!) on FIELD_DEFINITION

            type Movie @node {
                title: String!
                actors: [Actor!]! @relationship(type: \"ACTED_IN\", direction: IN)
            }

            type Actor @node {
                name: String!
            }
        ",
        );
        let printed = schema.document().to_string();
        assert!(!printed.contains("@node"));
        assert!(!printed.contains("@relationship"));
    }

    #[test]
    fn where_type_has_filter_operators() {
        let schema = api_schema(MOVIES);
        let where_type = input_object(&schema, "MovieWhere");
        assert_eq!(
            field_names(where_type),
            vec![
                "id",
                "id_NOT",
                "id_IN",
                "id_NOT_IN",
                "id_CONTAINS",
                "id_NOT_CONTAINS",
                "id_STARTS_WITH",
                "id_NOT_STARTS_WITH",
                "id_ENDS_WITH",
                "id_NOT_ENDS_WITH",
                "title",
                "title_NOT",
                "title_IN",
                "title_NOT_IN",
                "title_CONTAINS",
                "title_NOT_CONTAINS",
                "title_STARTS_WITH",
                "title_NOT_STARTS_WITH",
                "title_ENDS_WITH",
                "title_NOT_ENDS_WITH",
                "released",
                "released_NOT",
                "released_IN",
                "released_NOT_IN",
                "released_LT",
                "released_LTE",
                "released_GT",
                "released_GTE",
                "actors_ALL",
                "actors_NONE",
                "actors_SINGLE",
                "actors_SOME",
                "AND",
                "OR",
                "NOT",
            ]
        );
        assert_eq!(
            field_type(where_type, "id_IN"),
            &list_of(named_type("ID"))
        );
        assert_eq!(
            field_type(where_type, "actors_SOME"),
            &named_type("ActorWhere")
        );
        assert_eq!(
            field_type(where_type, "AND"),
            &list_of(non_null(named_type("MovieWhere")))
        );
    }

    #[test]
    fn boolean_and_list_attributes_have_reduced_operators() {
        let schema = api_schema(
            "
            type Account @node {
                active: Boolean!
                tags: [String!]
            }
        ",
        );
        let where_type = input_object(&schema, "AccountWhere");
        assert_eq!(
            field_names(where_type),
            vec![
                "active",
                "active_NOT",
                "tags",
                "tags_NOT",
                "tags_INCLUDES",
                "tags_NOT_INCLUDES",
                "AND",
                "OR",
                "NOT",
            ]
        );
        assert_eq!(
            field_type(where_type, "tags"),
            &list_of(named_type("String"))
        );
        assert_eq!(
            field_type(where_type, "tags_INCLUDES"),
            &named_type("String")
        );
    }

    #[test]
    fn sort_and_options_types() {
        let schema = api_schema(MOVIES);
        let sort = input_object(&schema, "MovieSort");
        assert_eq!(field_names(sort), vec!["id", "title", "released"]);
        assert_eq!(field_type(sort, "title"), &named_type("SortDirection"));

        let options = input_object(&schema, "MovieOptions");
        assert_eq!(field_names(options), vec!["limit", "offset", "sort"]);
        assert_eq!(
            field_type(options, "sort"),
            &list_of(non_null(named_type("MovieSort")))
        );
    }

    #[test]
    fn sort_is_omitted_without_sortable_fields() {
        let schema = api_schema(
            "
            type Keyword @node {
                aliases: [String!]!
            }
        ",
        );
        assert!(schema.get_named_type("KeywordSort").is_none());
        let options = input_object(&schema, "KeywordOptions");
        assert_eq!(field_names(options), vec!["limit", "offset"]);
    }

    #[test]
    fn create_and_update_inputs() {
        let schema = api_schema(MOVIES);

        let create = input_object(&schema, "MovieCreateInput");
        assert_eq!(field_names(create), vec!["id", "title", "released", "actors"]);
        // Non-nullability of attributes is preserved on create ...
        assert_eq!(field_type(create, "title"), &non_null(named_type("String")));
        assert_eq!(
            field_type(create, "actors"),
            &named_type("MovieActorsFieldInput")
        );

        // ... and relaxed on update.
        let update = input_object(&schema, "MovieUpdateInput");
        assert_eq!(field_names(update), vec!["id", "title", "released", "actors"]);
        assert_eq!(field_type(update, "title"), &named_type("String"));
        assert_eq!(
            field_type(update, "actors"),
            &list_of(non_null(named_type("MovieActorsUpdateFieldInput")))
        );
    }

    #[test]
    fn nested_inputs_with_all_operations() {
        let schema = api_schema(MOVIES);

        let create = input_object(&schema, "MovieActorsCreateFieldInput");
        assert_eq!(field_names(create), vec!["node"]);
        assert_eq!(
            field_type(create, "node"),
            &non_null(named_type("ActorCreateInput"))
        );

        // Actor's own `movies` relationship allows CONNECT, so the nested
        // `connect` member is present.
        let connect = input_object(&schema, "MovieActorsConnectFieldInput");
        assert_eq!(field_names(connect), vec!["where", "connect"]);
        assert_eq!(
            field_type(connect, "where"),
            &named_type("ActorConnectWhere")
        );

        let update = input_object(&schema, "MovieActorsUpdateFieldInput");
        assert_eq!(
            field_names(update),
            vec!["where", "update", "create", "connect", "disconnect", "delete"]
        );

        let field_input = input_object(&schema, "MovieActorsFieldInput");
        assert_eq!(field_names(field_input), vec!["create", "connect"]);

        let connect_where = input_object(&schema, "ActorConnectWhere");
        assert_eq!(field_names(connect_where), vec!["node"]);
        assert_eq!(
            field_type(connect_where, "node"),
            &non_null(named_type("ActorWhere"))
        );

        assert_eq!(
            field_names(input_object(&schema, "MovieConnectInput")),
            vec!["actors"]
        );
        assert_eq!(
            field_names(input_object(&schema, "MovieRelationInput")),
            vec!["actors"]
        );
    }

    #[test]
    fn nested_operations_restricted_to_create() {
        let schema = api_schema(
            "
            type Movie @node {
                title: String!
                actors: [Actor!]!
                    @relationship(type: \"ACTED_IN\", direction: IN, nestedOperations: [CREATE])
            }

            type Actor @node {
                name: String!
            }
        ",
        );
        assert!(schema.get_named_type("MovieActorsCreateFieldInput").is_some());
        for name in [
            "MovieActorsConnectFieldInput",
            "MovieActorsDisconnectFieldInput",
            "MovieActorsDeleteFieldInput",
            "MovieActorsUpdateFieldInput",
            "MovieConnectInput",
            "MovieDisconnectInput",
            "MovieDeleteInput",
        ] {
            assert!(schema.get_named_type(name).is_none(), "unexpected `{}`", name);
        }
        assert_eq!(
            field_names(input_object(&schema, "MovieActorsFieldInput")),
            vec!["create"]
        );
        assert_eq!(
            field_names(input_object(&schema, "MovieRelationInput")),
            vec!["actors"]
        );

        // The update mutation only takes the arguments whose inputs exist.
        let mutation = schema.mutation_type().unwrap();
        let update = mutation.field("updateMovies").unwrap();
        let args: Vec<_> = update.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(args, vec!["where", "update", "create"]);
        let delete = mutation.field("deleteMovies").unwrap();
        let args: Vec<_> = delete.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(args, vec!["where"]);
    }

    #[test]
    fn nested_operations_restricted_to_connect() {
        let schema = api_schema(
            "
            type Movie @node {
                title: String!
                actors: [Actor!]!
                    @relationship(type: \"ACTED_IN\", direction: IN, nestedOperations: [CONNECT])
            }

            type Actor @node {
                name: String!
            }
        ",
        );
        assert!(schema.get_named_type("MovieActorsCreateFieldInput").is_none());
        assert!(schema.get_named_type("MovieRelationInput").is_none());
        assert_eq!(
            field_names(input_object(&schema, "MovieActorsFieldInput")),
            vec!["connect"]
        );
        // Actor has no relationship allowing CONNECT, so the nested
        // `connect` member is absent.
        assert_eq!(
            field_names(input_object(&schema, "MovieActorsConnectFieldInput")),
            vec!["where"]
        );
        assert_eq!(
            field_names(input_object(&schema, "MovieConnectInput")),
            vec!["actors"]
        );
    }

    #[test]
    fn nested_operations_restricted_to_update() {
        let schema = api_schema(
            "
            type Movie @node {
                title: String!
                actors: [Actor!]!
                    @relationship(type: \"ACTED_IN\", direction: IN, nestedOperations: [UPDATE])
            }

            type Actor @node {
                name: String!
            }
        ",
        );
        // Without CREATE or CONNECT there is no `FieldInput`, and the
        // relationship disappears from `CreateInput`.
        assert!(schema.get_named_type("MovieActorsFieldInput").is_none());
        assert_eq!(
            field_names(input_object(&schema, "MovieCreateInput")),
            vec!["title"]
        );
        let update = input_object(&schema, "MovieActorsUpdateFieldInput");
        assert_eq!(field_names(update), vec!["where", "update"]);
        assert_eq!(
            field_names(input_object(&schema, "MovieUpdateInput")),
            vec!["title", "actors"]
        );
    }

    #[test]
    fn union_targets_fan_out_per_member() {
        let schema = api_schema(
            "
            union Person = Actor | Director

            type Movie @node {
                title: String!
                cast: [Person!]! @relationship(type: \"CAST\", direction: IN)
            }

            type Actor @node {
                name: String!
            }

            type Director @node {
                name: String!
            }
        ",
        );

        // One input family per member, plus member-keyed wrappers.
        assert_eq!(
            field_names(input_object(&schema, "MovieCastActorCreateFieldInput")),
            vec!["node"]
        );
        let create = input_object(&schema, "MovieCastCreateInput");
        assert_eq!(field_names(create), vec!["Actor", "Director"]);
        assert_eq!(
            field_type(create, "Actor"),
            &list_of(non_null(named_type("MovieCastActorCreateFieldInput")))
        );
        let field_input = input_object(&schema, "MovieCastFieldInput");
        assert_eq!(field_names(field_input), vec!["Actor", "Director"]);
        assert_eq!(
            field_type(field_input, "Actor"),
            &named_type("MovieCastActorFieldInput")
        );

        // The union has no common `Where`, so the relationship does not
        // show up in `MovieWhere` and the union gets no `ConnectWhere`.
        let where_type = input_object(&schema, "MovieWhere");
        assert!(field_names(where_type).iter().all(|name| !name.starts_with("cast")));
        assert!(schema.get_named_type("PersonConnectWhere").is_none());
        assert!(schema.get_named_type("ActorConnectWhere").is_some());

        let connect = input_object(&schema, "MovieConnectInput");
        assert_eq!(
            field_type(connect, "cast"),
            &named_type("MovieCastConnectInput")
        );
    }

    #[test]
    fn interface_targets() {
        let schema = api_schema(
            "
            interface Production {
                title: String!
            }

            type Movie implements Production @node {
                title: String!
            }

            type Series implements Production @node {
                title: String!
            }

            type Actor @node {
                name: String!
                actedIn: [Production!]! @relationship(type: \"ACTED_IN\", direction: OUT)
            }
        ",
        );

        match schema.get_named_type("ProductionImplementation") {
            Some(s::TypeDefinition::Enum(enum_type)) => {
                let values: Vec<_> = enum_type.values.iter().map(|v| v.name.as_str()).collect();
                assert_eq!(values, vec!["Movie", "Series"]);
            }
            other => panic!("ProductionImplementation is not an enum: {:?}", other),
        }

        let where_type = input_object(&schema, "ProductionWhere");
        assert_eq!(
            field_names(where_type),
            vec![
                "title",
                "title_NOT",
                "title_IN",
                "title_NOT_IN",
                "title_CONTAINS",
                "title_NOT_CONTAINS",
                "title_STARTS_WITH",
                "title_NOT_STARTS_WITH",
                "title_ENDS_WITH",
                "title_NOT_ENDS_WITH",
                "typename_IN",
                "AND",
                "OR",
                "NOT",
            ]
        );
        assert_eq!(
            field_type(where_type, "typename_IN"),
            &list_of(non_null(named_type("ProductionImplementation")))
        );

        assert_eq!(
            field_names(input_object(&schema, "ProductionCreateInput")),
            vec!["Movie", "Series"]
        );
        assert_eq!(
            field_names(input_object(&schema, "ProductionUpdateInput")),
            vec!["title"]
        );

        let create = input_object(&schema, "ActorActedInCreateFieldInput");
        assert_eq!(
            field_type(create, "node"),
            &non_null(named_type("ProductionCreateInput"))
        );
        // Interface targets have no top-level `ConnectInput`.
        assert_eq!(
            field_names(input_object(&schema, "ActorActedInConnectFieldInput")),
            vec!["where"]
        );

        let actor_where = input_object(&schema, "ActorWhere");
        assert_eq!(
            field_type(actor_where, "actedIn_SOME"),
            &named_type("ProductionWhere")
        );
    }

    #[test]
    fn query_and_mutation_roots() {
        let schema = api_schema(MOVIES);

        let query = schema.query_type();
        let names: Vec<_> = query.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["actors", "movies"]);
        let movies = query.field("movies").unwrap();
        let args: Vec<_> = movies.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(args, vec!["where", "options"]);
        assert_eq!(
            movies.field_type,
            non_null(list_of(non_null(named_type("Movie"))))
        );

        let mutation = schema.mutation_type().unwrap();
        let names: Vec<_> = mutation.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "createActors",
                "updateActors",
                "deleteActors",
                "createMovies",
                "updateMovies",
                "deleteMovies",
            ]
        );
        let create = mutation.field("createMovies").unwrap();
        assert_eq!(
            create.field_type,
            non_null(named_type("CreateMoviesMutationResponse"))
        );
        let update = mutation.field("updateMovies").unwrap();
        let args: Vec<_> = update.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            args,
            vec!["where", "update", "connect", "disconnect", "create", "delete"]
        );
        let delete = mutation.field("deleteMovies").unwrap();
        assert_eq!(delete.field_type, non_null(named_type("DeleteInfo")));

        let response = match schema.get_named_type("CreateMoviesMutationResponse") {
            Some(s::TypeDefinition::Object(object_type)) => object_type,
            other => panic!("missing mutation response: {:?}", other),
        };
        let names: Vec<_> = response.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["info", "movies"]);
    }

    #[test]
    fn schema_without_node_types() {
        let schema = api_schema(
            "
            type Color {
                hex: String
            }
        ",
        );
        assert!(schema.query_type().fields.is_empty());
        assert!(schema.mutation_type().is_none());
        // Pass-through types survive.
        assert!(matches!(
            schema.get_named_type("Color"),
            Some(s::TypeDefinition::Object(_))
        ));
    }

    #[test]
    fn is_input_type() {
        let schema = api_schema(MOVIES);
        assert!(schema.is_input_type(&named_type("MovieWhere")));
        assert!(schema.is_input_type(&named_type("SortDirection")));
        assert!(schema.is_input_type(&non_null(named_type("String"))));
        assert!(!schema.is_input_type(&named_type("Movie")));
    }
}
