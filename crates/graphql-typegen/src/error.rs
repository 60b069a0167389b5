use std::fmt;

pub(crate) type Result<T, E = TypegenError> = std::result::Result<T, E>;

/// A fatal generation error. All variants abort the generation run they
/// occurred in; independent runs are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum TypegenError {
    /// A required output option is missing or invalid.
    #[error("{0}")]
    Configuration(String),

    /// A selection references a field or type the schema does not declare.
    /// Unexpected after upstream validation, but never silently dropped.
    #[error("{message}")]
    SchemaConsistency { message: String },

    /// Fragment spreads form a cycle.
    #[error("cyclic fragment spreads: {}", .cycle.join(" -> "))]
    FragmentCycle { cycle: Vec<String> },

    /// Two definitions share a name but not a structure.
    #[error("multiple {kind} definitions named \"{name}\" with different content, found in: {}", .locations.join(", "))]
    DuplicateDefinition {
        kind: ConflictKind,
        name: String,
        locations: Vec<String>,
    },
}

impl TypegenError {
    pub(crate) fn schema_consistency(message: impl Into<String>) -> Self {
        TypegenError::SchemaConsistency {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Fragment,
    Operation,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::Fragment => f.write_str("fragment"),
            ConflictKind::Operation => f.write_str("operation"),
        }
    }
}
