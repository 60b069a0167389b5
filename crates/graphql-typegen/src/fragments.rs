//! Fragment registry, dependency resolution and output-file planning.
//!
//! Fragments are registered as documents come in, deduplicated by their
//! canonical print, then resolved into a dependency graph. The same graph
//! drives cycle detection, per-file declaration ordering and cross-file
//! imports.

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use serde::Serialize;

use async_graphql_parser::types as ast;

use crate::{
    config::OutputStrategy,
    error::{ConflictKind, Result, TypegenError},
    flatten::GenerationCtx,
    model::{CodegenDocument, DocumentKind, FileManifest, FragmentImport, ModelId},
    print::print_fragment,
};

/// Everything the engine knows about one named fragment.
#[derive(Debug, Serialize)]
pub struct FragmentRecord {
    pub name: String,
    /// The source file the first (canonical) occurrence came from.
    pub defining_location: String,
    pub type_condition: String,
    /// Transitive closure of spread fragments, filled in by
    /// [`FragmentPool::resolve_dependencies`].
    pub dependencies: IndexSet<String>,
    pub fingerprint: String,
    #[serde(skip)]
    direct: IndexSet<String>,
}

#[derive(Debug, Default)]
pub(crate) struct FragmentPool {
    records: IndexMap<String, FragmentRecord>,
}

impl FragmentPool {
    /// Registers a fragment definition. A second definition with the same
    /// name is silently dropped when its canonical print matches the first,
    /// and rejected otherwise. Returns whether the definition is new.
    pub(crate) fn ingest(&mut self, location: &str, name: &str, fragment: &ast::FragmentDefinition) -> Result<bool> {
        let fingerprint = print_fragment(name, fragment);

        if let Some(existing) = self.records.get(name) {
            if existing.fingerprint == fingerprint {
                return Ok(false);
            }
            return Err(TypegenError::DuplicateDefinition {
                kind: ConflictKind::Fragment,
                name: name.to_owned(),
                locations: vec![existing.defining_location.clone(), location.to_owned()],
            });
        }

        self.records.insert(
            name.to_owned(),
            FragmentRecord {
                name: name.to_owned(),
                defining_location: location.to_owned(),
                type_condition: fragment.type_condition.node.on.node.to_string(),
                dependencies: IndexSet::new(),
                fingerprint,
                direct: collect_spreads(&fragment.selection_set.node),
            },
        );
        Ok(true)
    }

    pub(crate) fn records(&self) -> &IndexMap<String, FragmentRecord> {
        &self.records
    }

    pub(crate) fn into_records(self) -> IndexMap<String, FragmentRecord> {
        self.records
    }

    /// Computes the transitive dependency set of every fragment, rejecting
    /// spreads of unknown fragments and cyclic spread chains.
    pub(crate) fn resolve_dependencies(&mut self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            InProgress,
            Done,
        }

        fn visit(
            name: &str,
            records: &IndexMap<String, FragmentRecord>,
            states: &mut IndexMap<String, State>,
            path: &mut Vec<String>,
            resolved: &mut IndexMap<String, IndexSet<String>>,
        ) -> Result<()> {
            match states.get(name) {
                Some(State::Done) => return Ok(()),
                Some(State::InProgress) => {
                    let start = path.iter().position(|entry| entry == name).unwrap_or(0);
                    let mut cycle: Vec<String> = path[start..].to_vec();
                    cycle.push(name.to_owned());
                    return Err(TypegenError::FragmentCycle { cycle });
                }
                None => {}
            }

            let Some(record) = records.get(name) else {
                return Err(TypegenError::schema_consistency(format!(
                    "spread of undefined fragment \"{name}\"",
                )));
            };

            states.insert(name.to_owned(), State::InProgress);
            path.push(name.to_owned());

            let mut dependencies = IndexSet::new();
            for dependency in &record.direct {
                visit(dependency, records, states, path, resolved)?;
                dependencies.insert(dependency.clone());
                if let Some(transitive) = resolved.get(dependency) {
                    dependencies.extend(transitive.iter().cloned());
                }
            }

            path.pop();
            states.insert(name.to_owned(), State::Done);
            resolved.insert(name.to_owned(), dependencies);
            Ok(())
        }

        let mut states = IndexMap::new();
        let mut resolved = IndexMap::new();
        let names: Vec<String> = self.records.keys().cloned().collect();
        for name in &names {
            visit(name, &self.records, &mut states, &mut Vec::new(), &mut resolved)?;
        }
        for (name, dependencies) in resolved {
            if let Some(record) = self.records.get_mut(&name) {
                record.dependencies = dependencies;
            }
        }
        Ok(())
    }
}

/// Collects the names of all fragments spread anywhere in a selection set,
/// including under fields and inline fragments.
pub(crate) fn collect_spreads(selection_set: &ast::SelectionSet) -> IndexSet<String> {
    let mut spreads = IndexSet::new();
    collect_spreads_into(selection_set, &mut spreads);
    spreads
}

fn collect_spreads_into(selection_set: &ast::SelectionSet, spreads: &mut IndexSet<String>) {
    for selection in &selection_set.items {
        match &selection.node {
            ast::Selection::Field(field) => collect_spreads_into(&field.node.selection_set.node, spreads),
            ast::Selection::FragmentSpread(spread) => {
                spreads.insert(spread.node.fragment_name.node.to_string());
            }
            ast::Selection::InlineFragment(inline) => collect_spreads_into(&inline.node.selection_set.node, spreads),
        }
    }
}

/// Every fragment a document spreads must be defined somewhere in the
/// input. Spreads inside fragment bodies are checked again during
/// dependency resolution; this pass is what catches a dangling spread in
/// an operation.
pub(crate) fn validate_spreads(
    ctx: &GenerationCtx<'_>,
    documents: &[CodegenDocument],
    pool: &FragmentPool,
) -> Result<()> {
    for document in documents {
        for name in fragments_used(ctx, document) {
            if !pool.records().contains_key(&name) {
                return Err(TypegenError::schema_consistency(format!(
                    "spread of undefined fragment \"{name}\" in {}",
                    document.source_location,
                )));
            }
        }
    }
    Ok(())
}

/// Fragments a document references directly, in first-use order.
fn fragments_used(ctx: &GenerationCtx<'_>, document: &CodegenDocument) -> IndexSet<String> {
    let mut used = ctx.models[document.root_model].fragments_used.clone();
    for inner in &document.inner_models {
        used.extend(ctx.models[*inner].fragments_used.iter().cloned());
    }
    used
}

/// Orders the given fragment names so that every fragment comes after the
/// same-group fragments it spreads. Ties keep registration order.
fn topological_order(names: &[String], pool: &FragmentPool) -> Vec<String> {
    let group: IndexSet<&String> = names.iter().collect();
    let mut emitted: IndexSet<String> = IndexSet::new();
    let mut ordered = Vec::with_capacity(names.len());

    // Dependency counts only consider edges inside the group; cross-file
    // dependencies are satisfied by imports, not ordering.
    while ordered.len() < names.len() {
        let mut progressed = false;
        for name in names {
            if emitted.contains(name) {
                continue;
            }
            let ready = pool.records()[name]
                .direct
                .iter()
                .all(|dependency| !group.contains(dependency) || emitted.contains(dependency));
            if ready {
                emitted.insert(name.clone());
                ordered.push(name.clone());
                progressed = true;
            }
        }
        if !progressed {
            // Cycles are rejected before ordering runs.
            break;
        }
    }
    ordered
}

pub(crate) fn build_manifests(
    ctx: &GenerationCtx<'_>,
    schema_models: &[ModelId],
    documents: &[CodegenDocument],
    pool: &FragmentPool,
) -> Result<Vec<FileManifest>> {
    // Raw fragment name -> its document, for symbol names and locations.
    let fragment_documents: IndexMap<&str, &CodegenDocument> = documents
        .iter()
        .filter(|document| document.kind == DocumentKind::Fragment)
        .map(|document| (document.raw_name.as_str(), document))
        .collect();

    match &ctx.config.output {
        OutputStrategy::SingleFile { path } => {
            let fragment_names: Vec<String> = pool.records().keys().cloned().collect();
            let ordered_fragments = topological_order(&fragment_names, pool);

            // Schema models first: documents refer to them, never the
            // other way around.
            let mut declarations: Vec<String> = schema_models
                .iter()
                .map(|id| ctx.models[*id].name.clone())
                .collect();
            declarations.extend(
                ordered_fragments
                    .iter()
                    .filter_map(|name| fragment_documents.get(name.as_str()))
                    .map(|document| document.name.clone()),
            );
            declarations.extend(
                documents
                    .iter()
                    .filter(|document| document.kind != DocumentKind::Fragment)
                    .map(|document| document.name.clone()),
            );

            Ok(vec![FileManifest {
                filename: path.clone(),
                imports: Vec::new(),
                ordered_declarations: declarations,
            }])
        }
        OutputStrategy::MultipleFiles { dir, extension } => {
            let filename_for = |document: &CodegenDocument| format!("{dir}/{}.{extension}", document.name);

            let mut manifests: Vec<FileManifest> = schema_models
                .iter()
                .map(|id| {
                    let name = ctx.models[*id].name.clone();
                    FileManifest {
                        filename: format!("{dir}/{name}.{extension}"),
                        imports: Vec::new(),
                        ordered_declarations: vec![name],
                    }
                })
                .collect();

            for document in documents {
                let filename = filename_for(document);
                let imports = fragments_used(ctx, document)
                    .iter()
                    .filter_map(|name| fragment_documents.get(name.as_str()))
                    .map(|fragment| FragmentImport {
                        symbol: fragment.name.clone(),
                        from_file: relative_path(&filename, &filename_for(fragment)),
                    })
                    .collect();
                manifests.push(FileManifest {
                    filename,
                    imports,
                    ordered_declarations: vec![document.name.clone()],
                });
            }

            Ok(manifests)
        }
        OutputStrategy::NearOperationFile { extension } => {
            let mut by_location: IndexMap<&str, Vec<&CodegenDocument>> = IndexMap::new();
            for document in documents {
                by_location
                    .entry(document.source_location.as_str())
                    .or_default()
                    .push(document);
            }

            by_location
                .into_iter()
                .map(|(location, contents)| {
                    let filename = replace_extension(location, extension);

                    let local_fragments: Vec<String> = contents
                        .iter()
                        .filter(|document| document.kind == DocumentKind::Fragment)
                        .map(|document| document.raw_name.clone())
                        .collect();
                    let ordered_fragments = topological_order(&local_fragments, pool);

                    // One import per foreign fragment, deduplicated across
                    // all documents in the file.
                    let mut imports: Vec<FragmentImport> = Vec::new();
                    let mut seen: IndexSet<String> = IndexSet::new();
                    for document in &contents {
                        for name in fragments_used(ctx, document) {
                            let Some(fragment) = fragment_documents.get(name.as_str()) else {
                                continue;
                            };
                            if fragment.source_location == location || !seen.insert(name.clone()) {
                                continue;
                            }
                            imports.push(FragmentImport {
                                symbol: fragment.name.clone(),
                                from_file: relative_path(
                                    &filename,
                                    &replace_extension(&fragment.source_location, extension),
                                ),
                            });
                        }
                    }

                    let mut declarations: Vec<String> = ordered_fragments
                        .iter()
                        .filter_map(|name| fragment_documents.get(name.as_str()))
                        .map(|document| document.name.clone())
                        .collect();
                    declarations.extend(
                        contents
                            .iter()
                            .filter(|document| document.kind != DocumentKind::Fragment)
                            .map(|document| document.name.clone()),
                    );

                    Ok(FileManifest {
                        filename,
                        imports,
                        ordered_declarations: declarations,
                    })
                })
                .collect()
        }
    }
}

/// `path/to/file.graphql` with `ext` -> `path/to/file.ext`.
fn replace_extension(path: &str, extension: &str) -> String {
    let stem = match (path.rfind('/'), path.rfind('.')) {
        (Some(slash), Some(dot)) if dot > slash => &path[..dot],
        (None, Some(dot)) => &path[..dot],
        _ => path,
    };
    format!("{stem}.{extension}")
}

/// The relative path from the directory of `from` to `to`, always starting
/// with `./` or `../`.
fn relative_path(from: &str, to: &str) -> String {
    let from_dirs: Vec<&str> = from.split('/').collect();
    let from_dirs = &from_dirs[..from_dirs.len().saturating_sub(1)];
    let to_parts: Vec<&str> = to.split('/').collect();
    let (to_dirs, to_file) = to_parts.split_at(to_parts.len() - 1);

    let common = from_dirs
        .iter()
        .zip(to_dirs.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = std::iter::repeat("..".to_owned())
        .take(from_dirs.len() - common)
        .collect();
    if parts.is_empty() {
        parts.push(".".to_owned());
    }
    parts.extend(to_dirs[common..].iter().map(|part| (*part).to_owned()));
    parts.extend(to_file.iter().map(|part| (*part).to_owned()));
    parts.iter().join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths() {
        assert_eq!(relative_path("src/a.ts", "src/b.ts"), "./b.ts");
        assert_eq!(relative_path("src/pages/a.ts", "src/shared/b.ts"), "../shared/b.ts");
        assert_eq!(relative_path("a.ts", "lib/b.ts"), "./lib/b.ts");
        assert_eq!(relative_path("deep/nested/a.ts", "b.ts"), "../../b.ts");
    }

    #[test]
    fn extension_replacement() {
        assert_eq!(replace_extension("src/query.graphql", "generated.ts"), "src/query.generated.ts");
        assert_eq!(replace_extension("query", "ts"), "query.ts");
        assert_eq!(replace_extension("src.dir/query", "ts"), "src.dir/query.ts");
    }

    #[test]
    fn duplicate_fragments_deduplicate_or_conflict() {
        let parse = |source: &str| async_graphql_parser::parse_query(source).unwrap();
        let identical = parse("fragment F on User { id } query Q { me { id } }");
        let different = parse("fragment F on User { id name } query Q { me { id } }");

        let fragment = |document: &ast::ExecutableDocument| document.fragments.values().next().unwrap().node.clone();

        let mut pool = FragmentPool::default();
        assert!(pool.ingest("a.graphql", "F", &fragment(&identical)).unwrap());
        assert!(!pool.ingest("b.graphql", "F", &fragment(&identical)).unwrap());

        let error = pool.ingest("c.graphql", "F", &fragment(&different)).unwrap_err();
        assert!(matches!(
            error,
            TypegenError::DuplicateDefinition {
                kind: ConflictKind::Fragment,
                ..
            }
        ));
    }
}
