use graphql_typegen::{
    generate, ConflictKind, DocumentKind, GenerateConfig, OutputStrategy, Schema, SourceDocument, TypegenError,
};
use pretty_assertions::assert_eq;

fn schema() -> Schema {
    Schema::from_sdl(
        r#"
        type Query {
            fieldTest: String
            me: User
            search(term: String!): [SearchResult!]!
            entries: [Entry!]
        }

        type Mutation {
            rename(input: RenameInput!): User
        }

        type User {
            id: ID!
            name: String
            email: String!
            friends: [User!]!
            role: Role!
        }

        type Entry {
            id: ID!
            title: String!
            author: User!
        }

        type Post {
            id: ID!
            body: String!
        }

        union SearchResult = User | Post

        enum Role {
            ADMIN
            MEMBER
        }

        input RenameInput {
            id: ID!
            name: String! = "anonymous"
            tags: [String!]
        }
        "#,
    )
    .unwrap()
}

fn sources(files: &[(&str, &str)]) -> Vec<SourceDocument> {
    files
        .iter()
        .map(|(location, source)| SourceDocument::parse(*location, source).unwrap())
        .collect()
}

fn run(files: &[(&str, &str)], config: &GenerateConfig) -> graphql_typegen::Generation {
    generate(&schema(), &sources(files), config).unwrap()
}

fn documents_only() -> GenerateConfig {
    GenerateConfig {
        no_schema: true,
        ..GenerateConfig::default()
    }
}

#[test]
fn scalar_field_selection() {
    let generation = run(&[("q.graphql", "query FieldTest { fieldTest }")], &documents_only());

    assert_eq!(generation.documents.len(), 1);
    let document = &generation.documents[0];
    assert_eq!(document.name, "FieldTestQuery");
    assert_eq!(document.kind, DocumentKind::Query);

    let root = &generation.models[document.root_model];
    assert_eq!(root.schema_type_name.as_deref(), Some("Query"));
    assert_eq!(root.fields.len(), 1);
    assert_eq!(root.fields[0].name, "fieldTest");
    assert_eq!(root.fields[0].target_type, "string");
    assert!(!root.fields[0].is_required);
    assert!(!root.fields[0].is_array);
}

#[test]
fn nested_objects_become_separate_models() {
    let generation = run(&[("q.graphql", "query Me { me { id name friends { id } } }")], &documents_only());

    let document = &generation.documents[0];
    let root = &generation.models[document.root_model];

    let me = root.fields.iter().find(|field| field.name == "me").unwrap();
    assert_eq!(me.target_type, "Me");
    assert!(!me.is_required);

    assert_eq!(document.inner_models.len(), 2);
    let me_model = &generation.models[document.inner_models[0]];
    assert_eq!(me_model.name, "Me");
    assert_eq!(me_model.schema_type_name.as_deref(), Some("User"));

    let id = me_model.fields.iter().find(|field| field.name == "id").unwrap();
    assert_eq!(id.target_type, "string");
    assert!(id.is_required);

    let friends = me_model.fields.iter().find(|field| field.name == "friends").unwrap();
    assert_eq!(friends.target_type, "Friends");
    assert!(friends.is_array);
    assert!(friends.is_required, "item type is User!");
    assert!(friends.is_list_required, "list type is [User!]!");
}

#[test]
fn colliding_model_names_are_prefixed() {
    let generation = run(
        &[(
            "q.graphql",
            "query Me { me { friends { id } } other: me { friends { name } } }",
        )],
        &documents_only(),
    );

    let names: Vec<&str> = generation.models.iter().map(|(_, model)| model.name.as_str()).collect();
    assert!(names.contains(&"Friends"));
    assert!(names.contains(&"_Friends"), "{names:?}");
}

#[test]
fn aliases_use_the_response_name() {
    let generation = run(&[("q.graphql", "query Me { renamed: fieldTest fieldTest }")], &documents_only());

    let root = &generation.models[generation.documents[0].root_model];
    let names: Vec<&str> = root.fields.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(names, vec!["renamed", "fieldTest"]);
}

#[test]
fn repeated_plain_selection_keeps_one_field() {
    let generation = run(&[("q.graphql", "query Me { fieldTest fieldTest }")], &documents_only());

    let root = &generation.models[generation.documents[0].root_model];
    assert_eq!(root.fields.len(), 1);
}

#[test]
fn typename_is_a_required_string() {
    let generation = run(&[("q.graphql", "query Me { __typename me { __typename } }")], &documents_only());

    let root = &generation.models[generation.documents[0].root_model];
    let typename = root.fields.iter().find(|field| field.name == "__typename").unwrap();
    assert_eq!(typename.target_type, "string");
    assert!(typename.is_required);
}

#[test]
fn introspection_fields_only_exist_on_the_query_root() {
    let generation = run(&[("q.graphql", "query Q { __schema }")], &documents_only());
    let root = &generation.models[generation.documents[0].root_model];
    assert_eq!(root.fields[0].target_type, "any");

    let error = generate(
        &schema(),
        &sources(&[("q.graphql", "query Q { me { __schema } }")]),
        &documents_only(),
    )
    .unwrap_err();
    assert!(matches!(error, TypegenError::SchemaConsistency { .. }), "{error}");
}

#[test]
fn unknown_field_is_a_schema_consistency_error() {
    let error = generate(
        &schema(),
        &sources(&[("q.graphql", "query Q { nope }")]),
        &documents_only(),
    )
    .unwrap_err();

    assert!(matches!(error, TypegenError::SchemaConsistency { .. }));
    assert!(error.to_string().contains("nope"), "{error}");
}

#[test]
fn variables_model_wraps_types_into_lexemes() {
    let generation = run(
        &[(
            "q.graphql",
            r#"
            query Search($term: String!, $roles: [Role!], $limit: Int = 10) {
                search(term: $term) { __typename }
            }
            "#,
        )],
        &documents_only(),
    );

    let document = &generation.documents[0];
    let variables = &generation.models[document.variables_model.unwrap()];
    assert_eq!(variables.name, "SearchQueryVariables");

    let term = variables.fields.iter().find(|field| field.name == "term").unwrap();
    assert_eq!(term.target_type, "string");
    assert!(term.is_required);

    let roles = variables.fields.iter().find(|field| field.name == "roles").unwrap();
    assert_eq!(roles.target_type, "Array<Role>?");
    assert!(roles.is_array);
    assert!(roles.is_required, "item type is Role!");
    assert!(!roles.is_list_required, "list type is [Role!]");

    // The default keeps the lexeme but lifts the call-site obligation.
    let limit = variables.fields.iter().find(|field| field.name == "limit").unwrap();
    assert_eq!(limit.target_type, "number?");
    assert!(!limit.is_required);
    assert!(limit.has_default);
}

#[test]
fn variable_flags_split_item_and_list_requiredness() {
    let generation = run(
        &[(
            "q.graphql",
            "query Q($a: [String]!, $b: [String]! = []) { fieldTest }",
        )],
        &documents_only(),
    );

    let variables = &generation.models[generation.documents[0].variables_model.unwrap()];

    // [String]! is a required list of nullable items, the same signature a
    // selection field with that type reports.
    let a = variables.fields.iter().find(|field| field.name == "a").unwrap();
    assert_eq!(a.target_type, "Array<string?>");
    assert!(a.is_array);
    assert!(!a.is_required);
    assert!(a.is_list_required);

    // The default relaxes the list obligation, not the items.
    let b = variables.fields.iter().find(|field| field.name == "b").unwrap();
    assert_eq!(b.target_type, "Array<string?>");
    assert!(!b.is_required);
    assert!(!b.is_list_required);
    assert!(b.has_default);
}

#[test]
fn required_list_of_required_items_is_distinct_from_nullable() {
    let generation = run(
        &[(
            "q.graphql",
            "query Q($a: [String!]!, $b: [String]) { fieldTest }",
        )],
        &documents_only(),
    );

    let variables = &generation.models[generation.documents[0].variables_model.unwrap()];
    let lexeme = |name: &str| {
        variables
            .fields
            .iter()
            .find(|field| field.name == name)
            .unwrap()
            .target_type
            .clone()
    };

    assert_eq!(lexeme("a"), "Array<string>");
    assert_eq!(lexeme("b"), "Array<string?>?");
}

#[test]
fn inline_fragments_become_discriminator_arms() {
    let generation = run(
        &[(
            "q.graphql",
            r#"
            query Search {
                search(term: "x") {
                    __typename
                    ... on User { name }
                    ... on Post { body }
                    ... on User { email }
                }
            }
            "#,
        )],
        &documents_only(),
    );

    let document = &generation.documents[0];
    let search = &generation.models[document.inner_models[0]];
    assert_eq!(search.inline_fragments.len(), 2);

    let user_arm = &generation.models[generation.models.by_name(&search.inline_fragments["User"]).unwrap()];
    assert_eq!(user_arm.name, "UserInlineFragment");
    assert_eq!(user_arm.schema_type_name.as_deref(), Some("User"));
    // Repeated conditions merge into the one arm.
    let arm_fields: Vec<&str> = user_arm.fields.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(arm_fields, vec!["name", "email"]);
}

#[test]
fn fragment_spreads_are_recorded_not_inlined() {
    let generation = run(
        &[(
            "q.graphql",
            r#"
            fragment Item on Entry { id title }
            query Entries { entries { ...Item author { id } } }
            "#,
        )],
        &documents_only(),
    );

    let operation = generation
        .documents
        .iter()
        .find(|document| document.kind == DocumentKind::Query)
        .unwrap();
    let entries = &generation.models[operation.inner_models[0]];
    assert_eq!(entries.fragments_used.len(), 1);
    assert!(entries.fragments_used.contains("Item"));
    // Spread fields never leak into the referencing model.
    assert!(entries.fields.iter().all(|field| field.name != "id"));
}

#[test]
fn spreading_an_undefined_fragment_is_rejected() {
    let error = generate(
        &schema(),
        &sources(&[("q.graphql", "query Q { me { ...Missing } }")]),
        &documents_only(),
    )
    .unwrap_err();

    assert!(matches!(error, TypegenError::SchemaConsistency { .. }), "{error}");
    assert!(error.to_string().contains("Missing"), "{error}");
    assert!(error.to_string().contains("q.graphql"), "{error}");
}

#[test]
fn fragment_only_files_parse_and_generate() {
    let source = SourceDocument::parse("item.graphql", "fragment Item on Entry { id title }").unwrap();
    let generation = generate(&schema(), &[source], &documents_only()).unwrap();

    assert_eq!(generation.documents.len(), 1);
    assert_eq!(generation.documents[0].kind, DocumentKind::Fragment);
    assert_eq!(generation.documents[0].name, "ItemFragment");
    assert_eq!(generation.fragments["Item"].defining_location, "item.graphql");
}

#[test]
fn shared_fragment_is_registered_once() {
    let generation = run(
        &[
            ("a.graphql", "fragment Item on Entry { id } query A { entries { ...Item } }"),
            ("b.graphql", "fragment Item on Entry { id } query B { entries { ...Item } }"),
        ],
        &documents_only(),
    );

    assert_eq!(generation.fragments.len(), 1);
    let record = &generation.fragments["Item"];
    assert_eq!(record.defining_location, "a.graphql");
    assert_eq!(record.type_condition, "Entry");

    let fragment_documents = generation
        .documents
        .iter()
        .filter(|document| document.kind == DocumentKind::Fragment)
        .count();
    assert_eq!(fragment_documents, 1);
}

#[test]
fn conflicting_fragment_definitions_are_rejected() {
    let error = generate(
        &schema(),
        &sources(&[
            ("a.graphql", "fragment Item on Entry { id } query A { fieldTest }"),
            ("b.graphql", "fragment Item on Entry { title } query B { fieldTest }"),
        ]),
        &documents_only(),
    )
    .unwrap_err();

    match error {
        TypegenError::DuplicateDefinition { kind, name, locations } => {
            assert_eq!(kind, ConflictKind::Fragment);
            assert_eq!(name, "Item");
            assert_eq!(locations, vec!["a.graphql".to_owned(), "b.graphql".to_owned()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn identical_operations_deduplicate_but_conflicting_ones_fail() {
    let generation = run(
        &[
            ("a.graphql", "query Same { fieldTest }"),
            ("b.graphql", "query Same   {   fieldTest   }"),
        ],
        &documents_only(),
    );
    assert_eq!(generation.documents.len(), 1);

    let error = generate(
        &schema(),
        &sources(&[
            ("a.graphql", "query Same { fieldTest }"),
            ("b.graphql", "query Same { me { id } }"),
        ]),
        &documents_only(),
    )
    .unwrap_err();
    assert!(matches!(
        error,
        TypegenError::DuplicateDefinition {
            kind: ConflictKind::Operation,
            ..
        }
    ));
}

#[test]
fn fragment_cycles_are_rejected_with_the_cycle_path() {
    let error = generate(
        &schema(),
        &sources(&[(
            "q.graphql",
            r#"
            fragment A on User { ...B }
            fragment B on User { ...A }
            query Q { fieldTest }
            "#,
        )]),
        &documents_only(),
    )
    .unwrap_err();

    match error {
        TypegenError::FragmentCycle { cycle } => {
            assert!(cycle.contains(&"A".to_owned()) && cycle.contains(&"B".to_owned()), "{cycle:?}");
            assert_eq!(cycle.first(), cycle.last());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn transitive_fragment_dependencies_are_resolved() {
    let generation = run(
        &[(
            "q.graphql",
            r#"
            fragment C on User { id }
            fragment B on User { ...C }
            fragment A on User { ...B }
            query Q { me { ...A } }
            "#,
        )],
        &documents_only(),
    );

    let a = &generation.fragments["A"];
    assert!(a.dependencies.contains("B"));
    assert!(a.dependencies.contains("C"));
    assert!(generation.fragments["C"].dependencies.is_empty());
}

#[test]
fn single_file_orders_fragments_before_dependents() {
    let generation = run(
        &[(
            "q.graphql",
            r#"
            fragment Outer on User { ...Inner }
            fragment Inner on User { id }
            query Q { me { ...Outer } }
            "#,
        )],
        &documents_only(),
    );

    assert_eq!(generation.files.len(), 1);
    let declarations = &generation.files[0].ordered_declarations;
    let position = |name: &str| declarations.iter().position(|entry| entry == name).unwrap();

    assert!(position("InnerFragment") < position("OuterFragment"));
    assert!(position("OuterFragment") < position("QQuery"));
    assert!(generation.files[0].imports.is_empty());
}

#[test]
fn near_operation_file_imports_foreign_fragments() {
    let config = GenerateConfig {
        no_schema: true,
        output: OutputStrategy::NearOperationFile {
            extension: "generated.ts".to_owned(),
        },
        ..GenerateConfig::default()
    };
    let generation = run(
        &[
            ("src/shared/item.graphql", "fragment Item on Entry { id title }"),
            (
                "src/pages/entries.graphql",
                "query Entries { entries { ...Item } }",
            ),
        ],
        &config,
    );

    assert_eq!(generation.files.len(), 2);

    let page = generation
        .files
        .iter()
        .find(|file| file.filename == "src/pages/entries.generated.ts")
        .unwrap();
    assert_eq!(page.imports.len(), 1);
    assert_eq!(page.imports[0].symbol, "ItemFragment");
    assert_eq!(page.imports[0].from_file, "../shared/item.generated.ts");
    assert_eq!(page.ordered_declarations, vec!["EntriesQuery".to_owned()]);

    let shared = generation
        .files
        .iter()
        .find(|file| file.filename == "src/shared/item.generated.ts")
        .unwrap();
    assert!(shared.imports.is_empty());
    assert_eq!(shared.ordered_declarations, vec!["ItemFragment".to_owned()]);
}

#[test]
fn multiple_files_strategy_emits_one_file_per_document() {
    let config = GenerateConfig {
        no_schema: true,
        output: OutputStrategy::MultipleFiles {
            dir: "generated".to_owned(),
            extension: "ts".to_owned(),
        },
        ..GenerateConfig::default()
    };
    let generation = run(
        &[(
            "q.graphql",
            "fragment Item on Entry { id } query Entries { entries { ...Item } }",
        )],
        &config,
    );

    let filenames: Vec<&str> = generation.files.iter().map(|file| file.filename.as_str()).collect();
    assert_eq!(filenames, vec!["generated/ItemFragment.ts", "generated/EntriesQuery.ts"]);

    let query = &generation.files[1];
    assert_eq!(query.imports.len(), 1);
    assert_eq!(query.imports[0].from_file, "./ItemFragment.ts");
}

#[test]
fn single_file_declares_schema_models_before_documents() {
    let generation = run(
        &[("q.graphql", "fragment Item on Entry { id } query Q { entries { ...Item } }")],
        &GenerateConfig::default(),
    );

    let declarations = &generation.files[0].ordered_declarations;
    let position = |name: &str| declarations.iter().position(|entry| entry == name).unwrap();

    assert!(position("User") < position("ItemFragment"));
    assert!(position("Role") < position("ItemFragment"));
    assert!(position("ItemFragment") < position("QQuery"));
    assert_eq!(
        declarations.len(),
        generation.schema_models.len() + generation.documents.len(),
    );
}

#[test]
fn multiple_files_strategy_emits_one_file_per_schema_model() {
    let config = GenerateConfig {
        output: OutputStrategy::MultipleFiles {
            dir: "generated".to_owned(),
            extension: "ts".to_owned(),
        },
        ..GenerateConfig::default()
    };
    let generation = run(&[("q.graphql", "query Q { fieldTest }")], &config);

    let filenames: Vec<&str> = generation.files.iter().map(|file| file.filename.as_str()).collect();
    assert!(filenames.contains(&"generated/Role.ts"), "{filenames:?}");
    assert!(filenames.contains(&"generated/RenameInput.ts"), "{filenames:?}");
    assert!(filenames.contains(&"generated/QQuery.ts"), "{filenames:?}");

    let role = generation
        .files
        .iter()
        .find(|file| file.filename == "generated/Role.ts")
        .unwrap();
    assert!(role.imports.is_empty());
    assert_eq!(role.ordered_declarations, vec!["Role".to_owned()]);
}

#[test]
fn schema_models_cover_every_user_defined_type() {
    let generation = run(&[], &GenerateConfig::default());

    let names: Vec<&str> = generation
        .schema_models
        .iter()
        .map(|id| generation.models[*id].name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Query", "Mutation", "User", "Entry", "Post", "SearchResult", "Role", "RenameInput"],
    );

    let role = &generation.models[generation.models.by_name("Role").unwrap()];
    assert_eq!(role.enum_values, vec!["ADMIN", "MEMBER"]);

    let search_result = &generation.models[generation.models.by_name("SearchResult").unwrap()];
    assert_eq!(search_result.union_members, vec!["User", "Post"]);

    let input = &generation.models[generation.models.by_name("RenameInput").unwrap()];
    let name = input.fields.iter().find(|field| field.name == "name").unwrap();
    assert!(name.has_default);
    assert!(!name.is_required, "the default lifts the obligation");
}

#[test]
fn schema_models_reserve_names_before_documents() {
    let generation = run(
        &[("q.graphql", "query User { me { id } }")],
        &GenerateConfig::default(),
    );

    // The schema type keeps "User"; the document root got "UserQuery" and
    // its "me" sub-model "Me", so nothing collides.
    assert!(generation.models.by_name("User").is_some());
    assert!(generation.models.by_name("UserQuery").is_some());
}

#[test]
fn generation_is_deterministic() {
    let files = [
        ("b.graphql", "fragment Item on Entry { id } query B { entries { ...Item } }"),
        ("a.graphql", "query A($term: String!) { search(term: $term) { __typename } }"),
    ];

    let first = serde_json::to_value(run(&files, &GenerateConfig::default())).unwrap();
    let second = serde_json::to_value(run(&files, &GenerateConfig::default())).unwrap();

    assert_eq!(first, second);
}

#[test]
fn generation_serializes_to_json() {
    let generation = run(&[("q.graphql", "query Q { fieldTest }")], &documents_only());
    let value = serde_json::to_value(&generation).unwrap();

    assert!(value["documents"][0]["name"].as_str() == Some("QQuery"));
    assert!(value["models"].is_object() || value["models"].is_array());
}
