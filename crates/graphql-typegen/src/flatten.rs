//! Selection-set resolution: walks an executable selection set against the
//! schema and accumulates flat [`Model`](crate::model::Model)s in the arena.
//!
//! The walk is depth-first and pre-order: a composite field registers its
//! child model name before descending, so inner model ids come out in the
//! order a reader encounters the selections.

use async_graphql_parser::types as ast;
use indexmap::IndexMap;

use crate::{
    config::GenerateConfig,
    error::{Result, TypegenError},
    model::{Field, Model, ModelArena, ModelId},
    names::NameRegistry,
    schema::{DefinitionId, DefinitionKind, Schema},
    wrap::field_flags,
};

pub(crate) struct GenerationCtx<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) config: &'a GenerateConfig,
    pub(crate) names: NameRegistry,
    pub(crate) models: ModelArena,
    /// Schema type name -> generated (possibly deduplicated) model name.
    type_names: IndexMap<String, String>,
}

impl<'a> GenerationCtx<'a> {
    pub(crate) fn new(schema: &'a Schema, config: &'a GenerateConfig) -> Self {
        GenerationCtx {
            schema,
            config,
            names: NameRegistry::default(),
            models: ModelArena::default(),
            type_names: IndexMap::new(),
        }
    }

    /// Reserves a unique generated name for a schema type and remembers the
    /// mapping for later references.
    pub(crate) fn register_type_name(&mut self, raw: &str) -> String {
        let name = self.names.unique(self.config.naming.type_name(raw));
        self.type_names.insert(raw.to_owned(), name.clone());
        name
    }

    /// The generated name a reference to a schema type resolves to. Types
    /// that never got a schema-level model keep their plain converted name.
    pub(crate) fn schema_type_name(&self, raw: &str) -> String {
        self.type_names
            .get(raw)
            .cloned()
            .unwrap_or_else(|| self.config.naming.type_name(raw))
    }
}

/// Resolves a whole selection set into a fresh root model, returning the
/// root id and the inner models created underneath it, in creation order.
pub(crate) fn flatten_root(
    ctx: &mut GenerationCtx<'_>,
    parent: DefinitionId,
    selection_set: &ast::SelectionSet,
    candidate_name: String,
) -> Result<(ModelId, Vec<ModelId>)> {
    let name = ctx.names.unique(candidate_name);
    let schema_type_name = ctx.schema[parent].name.clone();
    let root = ctx.models.push(Model::new(name, Some(schema_type_name)));
    let mut inner = Vec::new();
    flatten_into(ctx, parent, selection_set, root, &mut inner)?;
    Ok((root, inner))
}

fn flatten_into(
    ctx: &mut GenerationCtx<'_>,
    parent: DefinitionId,
    selection_set: &ast::SelectionSet,
    model_id: ModelId,
    inner: &mut Vec<ModelId>,
) -> Result<()> {
    for selection in &selection_set.items {
        match &selection.node {
            ast::Selection::Field(field) => {
                flatten_field(ctx, parent, &field.node, model_id, inner)?;
            }
            ast::Selection::FragmentSpread(spread) => {
                let name = spread.node.fragment_name.node.to_string();
                ctx.models[model_id].fragments_used.insert(name);
            }
            ast::Selection::InlineFragment(inline) => {
                flatten_inline_fragment(ctx, parent, &inline.node, model_id, inner)?;
            }
        }
    }
    Ok(())
}

fn flatten_field(
    ctx: &mut GenerationCtx<'_>,
    parent: DefinitionId,
    field: &ast::Field,
    model_id: ModelId,
    inner: &mut Vec<ModelId>,
) -> Result<()> {
    let field_name = field.name.node.as_str();
    let response_name = field
        .alias
        .as_ref()
        .map(|alias| alias.node.as_str())
        .unwrap_or(field_name);

    if field_name == "__typename" {
        ctx.models[model_id].upsert_field(Field {
            name: response_name.to_owned(),
            target_type: ctx.config.scalars.resolve("String").to_owned(),
            is_array: false,
            is_required: true,
            is_list_required: false,
            has_default: false,
        });
        return Ok(());
    }

    if field_name == "__schema" || field_name == "__type" {
        // Introspection roots only exist on the query type. They carry
        // introspection shapes we do not model, so they land as the
        // catch-all type.
        if !ctx.schema.is_query_root(parent) {
            return Err(TypegenError::schema_consistency(format!(
                "field \"{field_name}\" is only available on the query root, not on type \"{}\"",
                ctx.schema[parent].name,
            )));
        }
        ctx.models[model_id].upsert_field(Field {
            name: response_name.to_owned(),
            target_type: ctx.config.scalars.any_type.clone(),
            is_array: false,
            is_required: false,
            is_list_required: false,
            has_default: false,
        });
        return Ok(());
    }

    let Some(field_id) = ctx.schema.field(parent, field_name) else {
        return Err(TypegenError::schema_consistency(format!(
            "field \"{field_name}\" does not exist on type \"{}\"",
            ctx.schema[parent].name,
        )));
    };

    let (is_array, is_required, is_list_required) = field_flags(&ctx.schema[field_id].wrapping);
    let base_type_name = ctx.schema[field_id].base_type_name.clone();
    let Some(target_id) = ctx.schema.definition_by_name(&base_type_name) else {
        return Err(TypegenError::schema_consistency(format!(
            "field \"{field_name}\" on type \"{}\" has unknown type \"{base_type_name}\"",
            ctx.schema[parent].name,
        )));
    };

    let target_type = match ctx.schema[target_id].kind {
        DefinitionKind::Scalar => ctx.config.scalars.resolve(&base_type_name).to_owned(),
        DefinitionKind::Enum => ctx.schema_type_name(&base_type_name),
        DefinitionKind::InputObject => {
            return Err(TypegenError::schema_consistency(format!(
                "field \"{field_name}\" on type \"{}\" resolves to input type \"{base_type_name}\"",
                ctx.schema[parent].name,
            )));
        }
        DefinitionKind::Object | DefinitionKind::Interface | DefinitionKind::Union => {
            let candidate = ctx.config.naming.type_name(response_name);
            let child_name = ctx.names.unique(candidate);
            let child = ctx
                .models
                .push(Model::new(child_name.clone(), Some(base_type_name.clone())));
            inner.push(child);
            flatten_into(ctx, target_id, &field.selection_set.node, child, inner)?;
            child_name
        }
    };

    ctx.models[model_id].upsert_field(Field {
        name: response_name.to_owned(),
        target_type,
        is_array,
        is_required,
        is_list_required,
        has_default: false,
    });
    Ok(())
}

fn flatten_inline_fragment(
    ctx: &mut GenerationCtx<'_>,
    parent: DefinitionId,
    inline: &ast::InlineFragment,
    model_id: ModelId,
    inner: &mut Vec<ModelId>,
) -> Result<()> {
    let Some(condition) = &inline.type_condition else {
        // No type condition means the selections apply to the enclosing
        // type directly.
        return flatten_into(ctx, parent, &inline.selection_set.node, model_id, inner);
    };

    let condition = condition.node.on.node.to_string();
    let Some(condition_id) = ctx.schema.definition_by_name(&condition) else {
        return Err(TypegenError::schema_consistency(format!(
            "inline fragment condition refers to unknown type \"{condition}\"",
        )));
    };

    // One arm model per type condition; repeated conditions merge into it.
    let arm = match ctx.models[model_id].inline_fragments.get(&condition) {
        Some(existing) => ctx
            .models
            .by_name(existing)
            .ok_or_else(|| TypegenError::schema_consistency(format!("missing inline fragment model \"{existing}\"")))?,
        None => {
            let arm_name = ctx.names.unique(ctx.config.naming.inline_fragment_name(&condition));
            let arm = ctx.models.push(Model::new(arm_name.clone(), Some(condition.clone())));
            ctx.models[model_id].inline_fragments.insert(condition.clone(), arm_name);
            inner.push(arm);
            arm
        }
    };

    flatten_into(ctx, condition_id, &inline.selection_set.node, arm, inner)
}
