//! Schema-level models: one model per user-defined schema type, generated
//! independently of any document.

use crate::{
    error::{Result, TypegenError},
    flatten::GenerationCtx,
    model::{Field, Model, ModelId},
    schema::{DefinitionId, DefinitionKind},
    wrap::field_flags,
};

fn is_modelled(ctx: &GenerationCtx<'_>, id: DefinitionId) -> bool {
    let definition = &ctx.schema[id];
    !definition.is_builtin && !definition.name.starts_with("__") && definition.kind != DefinitionKind::Scalar
}

pub(crate) fn build_schema_models(ctx: &mut GenerationCtx<'_>) -> Result<Vec<ModelId>> {
    // Names first, so fields can refer to types declared later and still
    // pick up deduplicated names.
    let ids: Vec<DefinitionId> = ctx
        .schema
        .definitions()
        .filter(|(id, _)| is_modelled(ctx, *id))
        .map(|(id, _)| id)
        .collect();
    for id in &ids {
        let raw = ctx.schema[*id].name.clone();
        ctx.register_type_name(&raw);
    }

    let mut models = Vec::with_capacity(ids.len());
    for id in ids {
        let definition = &ctx.schema[id];
        let raw_name = definition.name.clone();
        let mut model = Model::new(ctx.schema_type_name(&raw_name), Some(raw_name.clone()));

        match definition.kind {
            DefinitionKind::Object | DefinitionKind::Interface | DefinitionKind::InputObject => {
                let is_input = definition.kind == DefinitionKind::InputObject;
                for field_id in definition.fields.clone() {
                    let field = &ctx.schema[field_id];
                    let field_name = field.name.clone();
                    let base_type_name = field.base_type_name.clone();
                    let wrapping = &field.wrapping;
                    let has_default = field.has_default;

                    let Some(target_id) = ctx.schema.definition_by_name(&base_type_name) else {
                        return Err(TypegenError::schema_consistency(format!(
                            "field \"{field_name}\" on type \"{raw_name}\" has unknown type \"{base_type_name}\"",
                        )));
                    };
                    let target_type = match ctx.schema[target_id].kind {
                        DefinitionKind::Scalar => ctx.config.scalars.resolve(&base_type_name).to_owned(),
                        _ => ctx.schema_type_name(&base_type_name),
                    };

                    let (is_array, mut is_required, mut is_list_required) = field_flags(wrapping);
                    if is_input && has_default {
                        // A default relaxes the outermost obligation only.
                        if is_array {
                            is_list_required = false;
                        } else {
                            is_required = false;
                        }
                    }
                    model.upsert_field(Field {
                        name: field_name,
                        target_type,
                        is_array,
                        is_required,
                        is_list_required,
                        has_default: is_input && has_default,
                    });
                }
            }
            DefinitionKind::Enum => {
                model.enum_values = definition.enum_values.clone();
            }
            DefinitionKind::Union => {
                let members = definition.union_members.clone();
                model.union_members = members.iter().map(|member| ctx.schema_type_name(member)).collect();
            }
            DefinitionKind::Scalar => unreachable!("scalars are filtered out above"),
        }

        models.push(ctx.models.push(model));
    }

    Ok(models)
}
