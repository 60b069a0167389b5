//! Turns parsed operations and fragment definitions into codegen documents.

use async_graphql_parser::types as ast;

use crate::{
    error::{Result, TypegenError},
    flatten::{flatten_root, GenerationCtx},
    model::{CodegenDocument, DocumentKind, Field, Model},
    schema::DefinitionKind,
    wrap::{field_flags, wrap_type},
};

pub(crate) fn build_operation(
    ctx: &mut GenerationCtx<'_>,
    location: &str,
    name: Option<&str>,
    operation: &ast::OperationDefinition,
) -> Result<CodegenDocument> {
    let raw_name = name.unwrap_or("Anonymous");
    let kind = match operation.ty {
        ast::OperationType::Query => DocumentKind::Query,
        ast::OperationType::Mutation => DocumentKind::Mutation,
        ast::OperationType::Subscription => DocumentKind::Subscription,
    };

    let Some(root_definition) = ctx.schema.root_operation(kind) else {
        return Err(TypegenError::schema_consistency(format!(
            "operation \"{raw_name}\" requires a {} root type the schema does not define",
            kind.suffix().to_lowercase(),
        )));
    };

    let candidate = ctx.config.naming.document_name(raw_name, kind);
    let (root_model, inner_models) = flatten_root(ctx, root_definition, &operation.selection_set.node, candidate)?;
    let document_name = ctx.models[root_model].name.clone();

    let variables_model = if operation.variable_definitions.is_empty() {
        None
    } else {
        Some(build_variables_model(ctx, &document_name, &operation.variable_definitions)?)
    };

    Ok(CodegenDocument {
        name: document_name,
        raw_name: raw_name.to_owned(),
        kind,
        source_location: location.to_owned(),
        variables_model,
        inner_models,
        root_model,
    })
}

fn build_variables_model(
    ctx: &mut GenerationCtx<'_>,
    document_name: &str,
    variables: &[async_graphql_parser::Positioned<ast::VariableDefinition>],
) -> Result<crate::model::ModelId> {
    let name = ctx.names.unique(format!("{document_name}Variables"));
    let mut model = Model::new(name, None);

    for variable in variables {
        let variable = &variable.node;
        let variable_name = variable.name.node.to_string();
        let (base_type_name, wrapping) = crate::schema::convert_type(&variable.var_type.node);

        let Some(definition_id) = ctx.schema.definition_by_name(&base_type_name) else {
            return Err(TypegenError::schema_consistency(format!(
                "variable \"${variable_name}\" has unknown type \"{base_type_name}\"",
            )));
        };
        let base_lexeme = match ctx.schema[definition_id].kind {
            DefinitionKind::Scalar => ctx.config.scalars.resolve(&base_type_name).to_owned(),
            DefinitionKind::Enum | DefinitionKind::InputObject => ctx.schema_type_name(&base_type_name),
            DefinitionKind::Object | DefinitionKind::Interface | DefinitionKind::Union => {
                return Err(TypegenError::schema_consistency(format!(
                    "variable \"${variable_name}\" uses output type \"{base_type_name}\"",
                )));
            }
        };

        let has_default = variable.default_value.is_some();
        let (is_array, mut is_required, mut is_list_required) = field_flags(&wrapping);
        // A default makes the variable optional at the call site even when
        // its declared type is non-null; only the outermost obligation
        // relaxes, and the lexeme keeps the declared nullability.
        if has_default {
            if is_array {
                is_list_required = false;
            } else {
                is_required = false;
            }
        }
        model.upsert_field(Field {
            name: variable_name,
            target_type: wrap_type(&base_lexeme, &wrapping),
            is_array,
            is_required,
            is_list_required,
            has_default,
        });
    }

    Ok(ctx.models.push(model))
}

pub(crate) fn build_fragment(
    ctx: &mut GenerationCtx<'_>,
    location: &str,
    name: &str,
    fragment: &ast::FragmentDefinition,
) -> Result<CodegenDocument> {
    let condition = fragment.type_condition.node.on.node.to_string();
    let Some(condition_id) = ctx.schema.definition_by_name(&condition) else {
        return Err(TypegenError::schema_consistency(format!(
            "fragment \"{name}\" is declared on unknown type \"{condition}\"",
        )));
    };

    let candidate = ctx.config.naming.fragment_type_name(name);
    let (root_model, inner_models) = flatten_root(ctx, condition_id, &fragment.selection_set.node, candidate)?;

    Ok(CodegenDocument {
        name: ctx.models[root_model].name.clone(),
        raw_name: name.to_owned(),
        kind: DocumentKind::Fragment,
        source_location: location.to_owned(),
        variables_model: None,
        inner_models,
        root_model,
    })
}
