//! Resolves GraphQL documents against a schema into flat, named models
//! ready for code generation.
//!
//! The expected workflow:
//!
//! 1. Parse the schema once with [`Schema::from_sdl()`].
//! 2. Parse each document file into a [`SourceDocument`].
//! 3. Call [`generate()`] with a [`GenerateConfig`].
//!
//! The resulting [`Generation`] holds every model in one arena, the
//! documents referring into it, the fragment dependency graph and a
//! manifest per output file. Rendering models into an actual target
//! language is out of scope here.

mod config;
mod document;
mod error;
mod flatten;
mod fragments;
mod model;
mod names;
mod print;
mod schema;
mod schema_models;
mod wrap;

use async_graphql_parser::types as ast;
use indexmap::IndexMap;
use itertools::Itertools;

pub use config::{GenerateConfig, NamingConfig, OutputStrategy, ScalarMap};
pub use error::{ConflictKind, TypegenError};
pub use fragments::FragmentRecord;
pub use model::{
    CodegenDocument, DocumentKind, Field, FileManifest, FragmentImport, Generation, Model, ModelArena, ModelId,
};
pub use names::NamingConvention;
pub use schema::{Definition, DefinitionId, DefinitionKind, FieldDefinition, FieldDefinitionId, Schema};

/// One parsed executable document file, tagged with the location the
/// output planning reports it under.
pub struct SourceDocument {
    pub location: String,
    pub document: ast::ExecutableDocument,
}

impl SourceDocument {
    pub fn parse(location: impl Into<String>, source: &str) -> Result<Self, async_graphql_parser::Error> {
        let document = match async_graphql_parser::parse_query(source) {
            Ok(document) => document,
            // Fragment-only files are valid input, but the parser insists
            // on at least one operation. Append one, then drop it again.
            Err(async_graphql_parser::Error::MissingOperation) => {
                let mut document = async_graphql_parser::parse_query(format!("{source}\nquery {{ __typename }}"))?;
                document.operations = ast::DocumentOperations::Multiple(Default::default());
                document
            }
            Err(err) => return Err(err),
        };

        Ok(SourceDocument {
            location: location.into(),
            document,
        })
    }
}

/// Resolves all documents against the schema and plans the output files.
pub fn generate(
    schema: &Schema,
    documents: &[SourceDocument],
    config: &GenerateConfig,
) -> Result<Generation, TypegenError> {
    config.output.validate()?;

    let mut ctx = flatten::GenerationCtx::new(schema, config);

    let schema_models = if config.no_schema {
        Vec::new()
    } else {
        let models = schema_models::build_schema_models(&mut ctx)?;
        tracing::debug!(count = models.len(), "built schema-level models");
        models
    };

    let mut pool = fragments::FragmentPool::default();
    let mut codegen_documents = Vec::new();

    if !config.no_documents {
        // Operation prints by name, for duplicate detection across files.
        let mut operation_fingerprints: IndexMap<String, (String, String)> = IndexMap::new();

        for source in documents {
            // Fragments first so spreads in this file's operations resolve,
            // sorted by name for deterministic output.
            for (name, fragment) in source
                .document
                .fragments
                .iter()
                .sorted_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()))
            {
                let is_new = pool.ingest(&source.location, name.as_str(), &fragment.node)?;
                if is_new {
                    codegen_documents.push(document::build_fragment(
                        &mut ctx,
                        &source.location,
                        name.as_str(),
                        &fragment.node,
                    )?);
                }
            }

            let operations: Vec<(Option<&str>, &ast::OperationDefinition)> = match &source.document.operations {
                ast::DocumentOperations::Single(operation) => vec![(None, &operation.node)],
                ast::DocumentOperations::Multiple(operations) => operations
                    .iter()
                    .map(|(name, operation)| (Some(name.as_str()), &operation.node))
                    .sorted_by(|(a, _), (b, _)| a.cmp(b))
                    .collect(),
            };

            for (name, operation) in operations {
                if let Some(name) = name {
                    let fingerprint = print::print_operation(Some(name), operation);
                    match operation_fingerprints.get(name) {
                        Some((existing, _)) if *existing == fingerprint => continue,
                        Some((_, existing_location)) => {
                            return Err(TypegenError::DuplicateDefinition {
                                kind: ConflictKind::Operation,
                                name: name.to_owned(),
                                locations: vec![existing_location.clone(), source.location.clone()],
                            });
                        }
                        None => {
                            operation_fingerprints.insert(name.to_owned(), (fingerprint, source.location.clone()));
                        }
                    }
                }
                codegen_documents.push(document::build_operation(&mut ctx, &source.location, name, operation)?);
            }
        }

        tracing::debug!(
            documents = codegen_documents.len(),
            fragments = pool.records().len(),
            "resolved documents",
        );
    }

    fragments::validate_spreads(&ctx, &codegen_documents, &pool)?;
    pool.resolve_dependencies()?;

    let files = fragments::build_manifests(&ctx, &schema_models, &codegen_documents, &pool)?;
    tracing::debug!(files = files.len(), models = ctx.models.len(), "planned output files");

    Ok(Generation {
        models: ctx.models,
        schema_models,
        documents: codegen_documents,
        fragments: pool.into_records(),
        files,
    })
}
