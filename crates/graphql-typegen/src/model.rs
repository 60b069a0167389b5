use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Index into [`ModelArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ModelId(usize);

/// The flat, run-scoped store of every generated model.
///
/// Models reference each other by name, never by owned sub-objects, so
/// fragment composition (a graph, cyclic in the error case) needs no
/// ownership cycles.
#[derive(Debug, Default, Serialize)]
pub struct ModelArena {
    models: Vec<Model>,
    #[serde(skip)]
    by_name: IndexMap<String, ModelId>,
}

impl ModelArena {
    /// Model names are unique per run, so this panics only on a naming
    /// registry bug.
    pub(crate) fn push(&mut self, model: Model) -> ModelId {
        let id = ModelId(self.models.len());
        let previous = self.by_name.insert(model.name.clone(), id);
        debug_assert!(previous.is_none(), "duplicate model name {}", model.name);
        self.models.push(model);
        id
    }

    pub fn by_name(&self, name: &str) -> Option<ModelId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (ModelId, &Model)> {
        self.models.iter().enumerate().map(|(idx, model)| (ModelId(idx), model))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl std::ops::Index<ModelId> for ModelArena {
    type Output = Model;

    fn index(&self, index: ModelId) -> &Model {
        &self.models[index.0]
    }
}

impl std::ops::IndexMut<ModelId> for ModelArena {
    fn index_mut(&mut self, index: ModelId) -> &mut Model {
        &mut self.models[index.0]
    }
}

/// A generated named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Model {
    /// Unique within one generation run.
    pub name: String,
    /// The schema type this model was resolved against. Diagnostic
    /// back-reference, non-owning.
    pub schema_type_name: Option<String>,
    pub fields: Vec<Field>,
    /// Fragments composed into this model, in declaration order. Resolved
    /// structurally at emission time against the fragment's own model.
    pub fragments_used: IndexSet<String>,
    /// Discriminator arms: type condition name -> arm model name.
    pub inline_fragments: IndexMap<String, String>,
    /// Enum models only.
    pub enum_values: Vec<String>,
    /// Union models only: member model names.
    pub union_members: Vec<String>,
}

impl Model {
    pub(crate) fn new(name: String, schema_type_name: Option<String>) -> Self {
        Model {
            name,
            schema_type_name,
            fields: Vec::new(),
            fragments_used: IndexSet::new(),
            inline_fragments: IndexMap::new(),
            enum_values: Vec::new(),
            union_members: Vec::new(),
        }
    }

    /// Fields are keyed by response name; a later selection with the same
    /// name replaces the earlier one in place.
    pub(crate) fn upsert_field(&mut self, field: Field) {
        if let Some(existing) = self.fields.iter_mut().find(|existing| existing.name == field.name) {
            *existing = field;
        } else {
            self.fields.push(field);
        }
    }
}

/// One field of a [`Model`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    /// A primitive lexeme or the name of another registered model.
    pub target_type: String,
    pub is_array: bool,
    /// Item requiredness, distinct from the list's own requiredness.
    pub is_required: bool,
    pub is_list_required: bool,
    /// Variable and input fields only.
    pub has_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Query,
    Mutation,
    Subscription,
    Fragment,
}

impl DocumentKind {
    pub fn suffix(self) -> &'static str {
        match self {
            DocumentKind::Query => "Query",
            DocumentKind::Mutation => "Mutation",
            DocumentKind::Subscription => "Subscription",
            DocumentKind::Fragment => "Fragment",
        }
    }
}

/// One generated operation or fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodegenDocument {
    /// The final document name, `<Name><Kind>`.
    pub name: String,
    /// The name as written in the GraphQL source.
    pub raw_name: String,
    pub kind: DocumentKind,
    /// The file the definition came from.
    pub source_location: String,
    pub variables_model: Option<ModelId>,
    /// Nested models in declaration order, discriminator arms included.
    pub inner_models: Vec<ModelId>,
    pub root_model: ModelId,
}

/// An import of a fragment type generated in another output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentImport {
    pub symbol: String,
    pub from_file: String,
}

/// What one output file contains, for multi-file strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileManifest {
    pub filename: String,
    /// Deduplicated, one entry per (defining file, symbol).
    pub imports: Vec<FragmentImport>,
    /// Document names in dependency-first order: a fragment never appears
    /// before a same-file fragment it spreads.
    pub ordered_declarations: Vec<String>,
}

/// The output of one generation run: plain name/field data with no
/// target-language syntax baked in.
#[derive(Debug, Serialize)]
pub struct Generation {
    pub models: ModelArena,
    /// Schema-level models in schema declaration order.
    pub schema_models: Vec<ModelId>,
    pub documents: Vec<CodegenDocument>,
    /// Fragment name -> record, complete across all input files.
    pub fragments: IndexMap<String, crate::fragments::FragmentRecord>,
    /// One entry per output file, empty for the single-file strategy only
    /// when there is nothing to declare.
    pub files: Vec<FileManifest>,
}
