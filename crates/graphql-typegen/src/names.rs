use heck::{ToLowerCamelCase, ToPascalCase};
use indexmap::IndexSet;
use serde::Deserialize;

/// A pure function from a raw GraphQL name to a target identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingConvention {
    #[default]
    PascalCase,
    CamelCase,
    /// Use the GraphQL name as-is.
    Keep,
}

impl NamingConvention {
    pub fn apply(self, raw: &str) -> String {
        match self {
            NamingConvention::PascalCase => raw.to_pascal_case(),
            NamingConvention::CamelCase => raw.to_lower_camel_case(),
            NamingConvention::Keep => raw.to_owned(),
        }
    }
}

/// The per-run registry of generated type names.
///
/// The first occurrence of a name in traversal order keeps it; later
/// collisions get `_` prepended until unique. Deterministic, never an error.
/// One registry per generation run, discarded afterwards.
#[derive(Debug, Default)]
pub(crate) struct NameRegistry {
    seen: IndexSet<String>,
}

impl NameRegistry {
    /// Registers and returns a unique variant of `candidate`.
    pub(crate) fn unique(&mut self, candidate: String) -> String {
        let mut name = candidate;

        while !self.seen.insert(name.clone()) {
            name.insert(0, '_');
        }

        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colliding_names_get_underscore_prefixes() {
        let mut registry = NameRegistry::default();

        assert_eq!(registry.unique("User".to_owned()), "User");
        assert_eq!(registry.unique("User".to_owned()), "_User");
        assert_eq!(registry.unique("User".to_owned()), "__User");
        assert_eq!(registry.unique("Account".to_owned()), "Account");
        assert_eq!(registry.unique("User".to_owned()), "___User");
    }

    #[test]
    fn conventions() {
        assert_eq!(NamingConvention::PascalCase.apply("user_profile"), "UserProfile");
        assert_eq!(NamingConvention::CamelCase.apply("UserProfile"), "userProfile");
        assert_eq!(NamingConvention::Keep.apply("user_profile"), "user_profile");
    }
}
