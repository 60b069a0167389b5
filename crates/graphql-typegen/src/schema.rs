//! The read-only schema arena the engine resolves selections against.
//!
//! Built once per run from a parsed `ServiceDocument`; the engine never
//! touches parser types after ingestion.

use async_graphql_parser::types as ast;
use indexmap::IndexMap;
use wrapping::Wrapping;

use crate::model::DocumentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefinitionId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldDefinitionId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

/// A named schema type.
#[derive(Debug)]
pub struct Definition {
    pub name: String,
    pub kind: DefinitionKind,
    pub fields: Vec<FieldDefinitionId>,
    /// Enum definitions only.
    pub enum_values: Vec<String>,
    /// Union definitions only: member type names.
    pub union_members: Vec<String>,
    pub is_builtin: bool,
}

/// A field of an object, interface or input object definition.
#[derive(Debug)]
pub struct FieldDefinition {
    pub parent: DefinitionId,
    pub name: String,
    /// The named type after stripping all List/NonNull wrappers.
    pub base_type_name: String,
    pub wrapping: Wrapping,
    /// Input fields only.
    pub has_default: bool,
}

const BUILTIN_SCALARS: &[&str] = &["ID", "String", "Boolean", "Int", "Float"];

#[derive(Debug, Default)]
pub struct Schema {
    definitions: Vec<Definition>,
    fields: Vec<FieldDefinition>,
    definition_names: IndexMap<String, DefinitionId>,
    query_type: Option<String>,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

impl Schema {
    /// Convenience for tests and callers holding SDL text. Schema validity
    /// is assumed; only parse errors are reported.
    pub fn from_sdl(sdl: &str) -> Result<Self, async_graphql_parser::Error> {
        let document = async_graphql_parser::parse_schema(sdl)?;
        Ok(Schema::from(&document))
    }

    pub fn definition_by_name(&self, name: &str) -> Option<DefinitionId> {
        self.definition_names.get(name).copied()
    }

    pub fn field(&self, definition_id: DefinitionId, name: &str) -> Option<FieldDefinitionId> {
        self[definition_id]
            .fields
            .iter()
            .copied()
            .find(|id| self[*id].name == name)
    }

    /// The root object type for an operation kind, honoring an explicit
    /// `schema { ... }` definition and falling back to the default names.
    pub fn root_operation(&self, kind: DocumentKind) -> Option<DefinitionId> {
        let name = match kind {
            DocumentKind::Query => self.query_type.as_deref().unwrap_or("Query"),
            DocumentKind::Mutation => self.mutation_type.as_deref().unwrap_or("Mutation"),
            DocumentKind::Subscription => self.subscription_type.as_deref().unwrap_or("Subscription"),
            DocumentKind::Fragment => return None,
        };
        self.definition_by_name(name)
    }

    pub fn is_query_root(&self, definition_id: DefinitionId) -> bool {
        self.root_operation(DocumentKind::Query) == Some(definition_id)
    }

    pub fn definitions(&self) -> impl ExactSizeIterator<Item = (DefinitionId, &Definition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(idx, definition)| (DefinitionId(idx), definition))
    }

    fn push_definition(&mut self, name: &str, kind: DefinitionKind, is_builtin: bool) -> DefinitionId {
        if let Some(existing) = self.definition_names.get(name) {
            // Type extensions land on the original definition.
            return *existing;
        }

        let id = DefinitionId(self.definitions.len());
        self.definitions.push(Definition {
            name: name.to_owned(),
            kind,
            fields: Vec::new(),
            enum_values: Vec::new(),
            union_members: Vec::new(),
            is_builtin,
        });
        self.definition_names.insert(name.to_owned(), id);
        id
    }

    fn push_field(&mut self, parent: DefinitionId, name: &str, ty: &ast::Type, has_default: bool) {
        let (base_type_name, wrapping) = convert_type(ty);
        let id = FieldDefinitionId(self.fields.len());
        self.fields.push(FieldDefinition {
            parent,
            name: name.to_owned(),
            base_type_name,
            wrapping,
            has_default,
        });
        self.definitions[parent.0].fields.push(id);
    }
}

impl std::ops::Index<DefinitionId> for Schema {
    type Output = Definition;

    fn index(&self, index: DefinitionId) -> &Definition {
        &self.definitions[index.0]
    }
}

impl std::ops::Index<FieldDefinitionId> for Schema {
    type Output = FieldDefinition;

    fn index(&self, index: FieldDefinitionId) -> &FieldDefinition {
        &self.fields[index.0]
    }
}

/// Strips List/NonNull wrappers down to the named type, recording each
/// level's nullability on the way out.
pub(crate) fn convert_type(ty: &ast::Type) -> (String, Wrapping) {
    match &ty.base {
        ast::BaseType::Named(name) => (name.to_string(), Wrapping::new(!ty.nullable)),
        ast::BaseType::List(inner) => {
            let (name, wrapping) = convert_type(inner);
            let wrapping = if ty.nullable {
                wrapping.wrapped_by_nullable_list()
            } else {
                wrapping.wrapped_by_required_list()
            };
            (name, wrapping)
        }
    }
}

impl From<&ast::ServiceDocument> for Schema {
    fn from(document: &ast::ServiceDocument) -> Self {
        let mut schema = Schema::default();

        for scalar in BUILTIN_SCALARS {
            schema.push_definition(scalar, DefinitionKind::Scalar, true);
        }

        // Two passes so the definition set is complete before bodies refer
        // to it, and so extensions merge regardless of position.
        for definition in &document.definitions {
            match definition {
                ast::TypeSystemDefinition::Schema(schema_definition) => {
                    let schema_definition = &schema_definition.node;
                    if let Some(query) = &schema_definition.query {
                        schema.query_type = Some(query.node.to_string());
                    }
                    if let Some(mutation) = &schema_definition.mutation {
                        schema.mutation_type = Some(mutation.node.to_string());
                    }
                    if let Some(subscription) = &schema_definition.subscription {
                        schema.subscription_type = Some(subscription.node.to_string());
                    }
                }
                ast::TypeSystemDefinition::Type(type_definition) => {
                    let name = type_definition.node.name.node.as_str();
                    let kind = match &type_definition.node.kind {
                        ast::TypeKind::Scalar => DefinitionKind::Scalar,
                        ast::TypeKind::Object(_) => DefinitionKind::Object,
                        ast::TypeKind::Interface(_) => DefinitionKind::Interface,
                        ast::TypeKind::Union(_) => DefinitionKind::Union,
                        ast::TypeKind::Enum(_) => DefinitionKind::Enum,
                        ast::TypeKind::InputObject(_) => DefinitionKind::InputObject,
                    };
                    schema.push_definition(name, kind, false);
                }
                ast::TypeSystemDefinition::Directive(_) => {}
            }
        }

        for definition in &document.definitions {
            let ast::TypeSystemDefinition::Type(type_definition) = definition else {
                continue;
            };
            let Some(definition_id) = schema.definition_by_name(type_definition.node.name.node.as_str()) else {
                continue;
            };

            match &type_definition.node.kind {
                ast::TypeKind::Object(object) => {
                    for field in &object.fields {
                        schema.push_field(definition_id, field.node.name.node.as_str(), &field.node.ty.node, false);
                    }
                }
                ast::TypeKind::Interface(interface) => {
                    for field in &interface.fields {
                        schema.push_field(definition_id, field.node.name.node.as_str(), &field.node.ty.node, false);
                    }
                }
                ast::TypeKind::InputObject(input_object) => {
                    for field in &input_object.fields {
                        schema.push_field(
                            definition_id,
                            field.node.name.node.as_str(),
                            &field.node.ty.node,
                            field.node.default_value.is_some(),
                        );
                    }
                }
                ast::TypeKind::Union(union) => {
                    let members: Vec<String> = union.members.iter().map(|member| member.node.to_string()).collect();
                    schema.definitions[definition_id.0].union_members.extend(members);
                }
                ast::TypeKind::Enum(enum_type) => {
                    let values: Vec<String> = enum_type
                        .values
                        .iter()
                        .map(|value| value.node.value.node.to_string())
                        .collect();
                    schema.definitions[definition_id.0].enum_values.extend(values);
                }
                ast::TypeKind::Scalar => {}
            }
        }

        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingests_definitions_and_fields() {
        let schema = Schema::from_sdl(
            r#"
            type Query {
                user(id: ID!): User
            }

            type User {
                id: ID!
                emails: [String!]!
            }

            enum Role {
                ADMIN
                MEMBER
            }
            "#,
        )
        .unwrap();

        let user = schema.definition_by_name("User").unwrap();
        assert_eq!(schema[user].kind, DefinitionKind::Object);

        let emails = schema.field(user, "emails").unwrap();
        assert_eq!(schema[emails].base_type_name, "String");
        assert!(schema[emails].wrapping.is_list());
        assert!(schema[emails].wrapping.is_required());
        assert!(schema[emails].wrapping.inner_is_required());

        let role = schema.definition_by_name("Role").unwrap();
        assert_eq!(schema[role].enum_values, vec!["ADMIN", "MEMBER"]);

        assert_eq!(schema.root_operation(DocumentKind::Query), schema.definition_by_name("Query"));
        assert_eq!(schema.root_operation(DocumentKind::Mutation), None);
    }

    #[test]
    fn explicit_schema_definition_renames_roots() {
        let schema = Schema::from_sdl(
            r#"
            schema {
                query: TheQuery
            }

            type TheQuery {
                ping: String
            }
            "#,
        )
        .unwrap();

        assert_eq!(
            schema.root_operation(DocumentKind::Query),
            schema.definition_by_name("TheQuery"),
        );
    }
}
