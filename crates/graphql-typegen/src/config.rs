use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    error::{Result, TypegenError},
    model::DocumentKind,
    names::NamingConvention,
};

/// Configuration for one generation run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateConfig {
    pub scalars: ScalarMap,
    pub naming: NamingConfig,
    pub output: OutputStrategy,
    /// Skip the schema-level models (objects, inputs, enums, unions).
    pub no_schema: bool,
    /// Skip the operation/fragment documents.
    pub no_documents: bool,
}

/// Maps schema scalar names to target primitive lexemes.
///
/// Unmapped scalars resolve to [`ScalarMap::any_type`] rather than failing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScalarMap {
    map: IndexMap<String, String>,
    pub any_type: String,
}

impl Default for ScalarMap {
    fn default() -> Self {
        let map = [
            ("ID", "string"),
            ("String", "string"),
            ("Boolean", "boolean"),
            ("Int", "number"),
            ("Float", "number"),
        ]
        .into_iter()
        .map(|(scalar, primitive)| (scalar.to_owned(), primitive.to_owned()))
        .collect();

        ScalarMap {
            map,
            any_type: "any".to_owned(),
        }
    }
}

impl ScalarMap {
    pub fn insert(&mut self, scalar: impl Into<String>, primitive: impl Into<String>) {
        self.map.insert(scalar.into(), primitive.into());
    }

    pub fn resolve(&self, scalar: &str) -> &str {
        self.map.get(scalar).map(String::as_str).unwrap_or(&self.any_type)
    }
}

/// Naming convention plus an optional fixed prefix for generated type names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NamingConfig {
    pub convention: NamingConvention,
    pub types_prefix: String,
}

impl NamingConfig {
    /// The candidate type name for a raw GraphQL name, before deduplication.
    pub(crate) fn type_name(&self, raw: &str) -> String {
        format!("{}{}", self.types_prefix, self.convention.apply(raw))
    }

    /// The candidate document name for an operation or fragment definition,
    /// e.g. `MyFeedQuery`, `AvatarFragment`.
    pub(crate) fn document_name(&self, raw: &str, kind: DocumentKind) -> String {
        format!("{}{}{}", self.types_prefix, self.convention.apply(raw), kind.suffix())
    }

    /// The composable mix-in type name a fragment spread refers to.
    pub(crate) fn fragment_type_name(&self, raw: &str) -> String {
        self.document_name(raw, DocumentKind::Fragment)
    }

    /// The discriminator arm name for an inline fragment type condition.
    pub(crate) fn inline_fragment_name(&self, type_condition: &str) -> String {
        format!("{}{}InlineFragment", self.types_prefix, type_condition)
    }
}

/// How generated declarations are distributed over output files.
///
/// The engine only computes per-file manifests; writing files is the
/// caller's concern.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum OutputStrategy {
    /// Everything in one file.
    SingleFile { path: String },
    /// One file per generated document, named `<Name>.<extension>`.
    MultipleFiles { dir: String, extension: String },
    /// One file next to each source document file, with cross-file fragment
    /// imports.
    NearOperationFile { extension: String },
}

impl Default for OutputStrategy {
    fn default() -> Self {
        OutputStrategy::SingleFile {
            path: "types.generated".to_owned(),
        }
    }
}

impl OutputStrategy {
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            OutputStrategy::SingleFile { path } => {
                let base = path.rsplit('/').next().unwrap_or(path);
                if !base.contains('.') {
                    return Err(TypegenError::Configuration(format!(
                        "the single-file strategy requires an output filename, got the directory path \"{path}\""
                    )));
                }
            }
            OutputStrategy::MultipleFiles { dir, extension } => {
                let base = dir.rsplit('/').next().unwrap_or(dir);
                if base.contains('.') {
                    return Err(TypegenError::Configuration(format!(
                        "the multiple-files strategy requires an output directory, got the file path \"{dir}\""
                    )));
                }
                validate_extension(extension)?;
            }
            OutputStrategy::NearOperationFile { extension } => validate_extension(extension)?,
        }

        Ok(())
    }
}

fn validate_extension(extension: &str) -> Result<()> {
    if extension.is_empty() || extension.starts_with('.') {
        return Err(TypegenError::Configuration(format!(
            "the output extension must be non-empty and without a leading dot, got \"{extension}\""
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scalar_map() {
        let scalars = ScalarMap::default();

        assert_eq!(scalars.resolve("ID"), "string");
        assert_eq!(scalars.resolve("Float"), "number");
        assert_eq!(scalars.resolve("DateTime"), "any");
    }

    #[test]
    fn single_file_strategy_needs_a_filename() {
        let strategy = OutputStrategy::SingleFile {
            path: "src/generated".to_owned(),
        };

        let err = strategy.validate().unwrap_err();
        assert!(matches!(err, TypegenError::Configuration(_)), "{err}");

        OutputStrategy::SingleFile {
            path: "src/generated.ts".to_owned(),
        }
        .validate()
        .unwrap();
    }

    #[test]
    fn multiple_files_strategy_needs_a_directory() {
        let strategy = OutputStrategy::MultipleFiles {
            dir: "src/generated.ts".to_owned(),
            extension: "ts".to_owned(),
        };

        assert!(strategy.validate().is_err());

        OutputStrategy::MultipleFiles {
            dir: "src/generated".to_owned(),
            extension: "ts".to_owned(),
        }
        .validate()
        .unwrap();
    }
}
