use draftsman_core::{
    mermaid, notation, Actor, ActorKind, ArchitectureContent, ArchitectureLayer,
    ArchitectureLayout, ArchitectureModule, Attribute, Cardinality, ConnectionKind,
    DocumentContent, DomainModelContent, DomainRelationKind, DomainRelationship, Entity,
    ErContent, ErEntity, ErField, ErRelationship, ModuleConnection, ModuleKind, Priority,
    ReferentialAction, Relationship, Status, UseCase, UseCaseContent, UseCaseRelationKind,
};
use proptest::prelude::*;

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn attribute() -> impl Strategy<Value = Attribute> {
    (ident(), prop::sample::select(vec!["string", "number", "boolean"]), any::<bool>())
        .prop_map(|(name, ty, required)| Attribute::new(&name, ty, required))
}

fn entity() -> impl Strategy<Value = Entity> {
    (ident(), prop::collection::vec(attribute(), 0..6), any::<bool>()).prop_map(
        |(id, attributes, root)| Entity {
            name: format!("E{}", id),
            id,
            attributes,
            methods: vec![],
            is_aggregate_root: root,
        },
    )
}

fn relationship_kind() -> impl Strategy<Value = DomainRelationKind> {
    prop::sample::select(vec![
        DomainRelationKind::Composition,
        DomainRelationKind::Aggregation,
        DomainRelationKind::Association,
        DomainRelationKind::Inheritance,
        DomainRelationKind::Dependency,
        DomainRelationKind::Unknown,
    ])
}

fn domain_model() -> impl Strategy<Value = DomainModelContent> {
    (
        prop::collection::vec(entity(), 0..5),
        prop::collection::vec((ident(), ident(), relationship_kind()), 0..6),
    )
        .prop_map(|(entities, rels)| DomainModelContent {
            relationships: rels
                .into_iter()
                .enumerate()
                .map(|(i, (source, target, kind))| DomainRelationship {
                    id: format!("r{}", i),
                    source,
                    target,
                    kind,
                    cardinality: None,
                    label: None,
                })
                .collect(),
            entities,
            ..Default::default()
        })
}

fn use_case_model() -> impl Strategy<Value = UseCaseContent> {
    let kinds = prop::sample::select(vec![ActorKind::Primary, ActorKind::Secondary, ActorKind::System]);
    let rel_kinds = prop::sample::select(vec![
        UseCaseRelationKind::Association,
        UseCaseRelationKind::Include,
        UseCaseRelationKind::Extend,
        UseCaseRelationKind::Generalization,
        UseCaseRelationKind::Unknown,
    ]);
    (
        prop::collection::vec((ident(), kinds), 0..4),
        prop::collection::vec(ident(), 0..4),
        prop::collection::vec((ident(), ident(), rel_kinds), 0..6),
    )
        .prop_map(|(actors, use_cases, rels)| UseCaseContent {
            actors: actors
                .into_iter()
                .map(|(id, kind)| Actor { name: id.to_uppercase(), id, kind, description: None })
                .collect(),
            use_cases: use_cases
                .into_iter()
                .map(|id| UseCase {
                    name: id.to_uppercase(),
                    id,
                    description: String::new(),
                    preconditions: vec![],
                    postconditions: vec![],
                    main_flow: vec![],
                    priority: Priority::Medium,
                })
                .collect(),
            relationships: rels
                .into_iter()
                .enumerate()
                .map(|(i, (source, target, kind))| Relationship {
                    id: format!("r{}", i),
                    source,
                    target,
                    kind,
                    label: None,
                })
                .collect(),
        })
}

fn er_model() -> impl Strategy<Value = ErContent> {
    let field = (ident(), prop::sample::select(vec!["int", "varchar", "text"]), any::<bool>(), any::<bool>())
        .prop_map(|(name, ty, pk, unique)| {
            let field = ErField::new(&name, ty);
            match (pk, unique) {
                (true, _) => field.primary_key(),
                (false, true) => field.unique(),
                (false, false) => field,
            }
        });
    let cardinality = prop::sample::select(vec![
        Cardinality::OneToOne,
        Cardinality::OneToMany,
        Cardinality::ManyToMany,
        Cardinality::Unknown,
    ]);
    (
        prop::collection::vec((ident(), prop::collection::vec(field, 0..4)), 0..4),
        prop::collection::vec((ident(), ident(), cardinality), 0..5),
    )
        .prop_map(|(entities, rels)| ErContent {
            entities: entities
                .into_iter()
                .map(|(id, fields)| ErEntity { name: id.clone(), table_name: id.clone(), id, fields })
                .collect(),
            relationships: rels
                .into_iter()
                .enumerate()
                .map(|(i, (source_entity, target_entity, kind))| ErRelationship {
                    id: format!("fk{}", i),
                    name: String::new(),
                    source_entity,
                    target_entity,
                    source_field: "id".into(),
                    target_field: String::new(),
                    kind,
                    on_delete: ReferentialAction::Restrict,
                    on_update: ReferentialAction::Restrict,
                })
                .collect(),
        })
}

fn architecture_model() -> impl Strategy<Value = ArchitectureContent> {
    let module_kind = prop::sample::select(vec![
        ModuleKind::Frontend,
        ModuleKind::Gateway,
        ModuleKind::Backend,
        ModuleKind::Database,
        ModuleKind::Cache,
        ModuleKind::Queue,
        ModuleKind::Other,
    ]);
    let connection_kind = prop::sample::select(vec![
        ConnectionKind::Sync,
        ConnectionKind::Async,
        ConnectionKind::Database,
        ConnectionKind::Cache,
        ConnectionKind::Stream,
        ConnectionKind::Unknown,
    ]);
    let layout = prop::option::of(prop::sample::select(vec![
        ArchitectureLayout::Flat,
        ArchitectureLayout::Layered,
    ]));
    (
        prop::collection::vec((ident(), module_kind, any::<bool>()), 0..5),
        prop::collection::vec(
            (ident(), ident(), connection_kind, prop::option::of("[A-Z]{2,5}")),
            0..5,
        ),
        prop::collection::vec((ident(), prop::collection::vec(ident(), 0..3), 0..3i32), 0..3),
        layout,
    )
        .prop_map(|(modules, conns, layers, layout)| ArchitectureContent {
            modules: modules
                .into_iter()
                .map(|(id, kind, colored)| ArchitectureModule {
                    name: id.to_uppercase(),
                    id,
                    kind,
                    technology: String::new(),
                    description: None,
                    dependencies: vec![],
                    interfaces: vec![],
                    status: Status::Proposed,
                    color: colored.then(|| "#1890ff".to_string()),
                })
                .collect(),
            connections: conns
                .into_iter()
                .map(|(source_module, target_module, kind, protocol)| ModuleConnection {
                    id: String::new(),
                    source_module,
                    target_module,
                    kind,
                    protocol,
                })
                .collect(),
            layers: layers
                .into_iter()
                .map(|(name, modules, order)| ArchitectureLayer { name, modules, order })
                .collect(),
            layout,
        })
}

fn content() -> impl Strategy<Value = DocumentContent> {
    prop_oneof![
        use_case_model().prop_map(DocumentContent::UseCase),
        domain_model().prop_map(DocumentContent::DomainModel),
        er_model().prop_map(DocumentContent::EntityRelationship),
        architecture_model().prop_map(DocumentContent::Architecture),
    ]
}

proptest! {
    #[test]
    fn one_member_line_per_attribute(e in entity()) {
        let model = DomainModelContent { entities: vec![e.clone()], ..Default::default() };
        let code = mermaid::class_diagram(&model).code;
        let members: Vec<&str> = code
            .lines()
            .filter(|l| l.starts_with("        "))
            .map(str::trim)
            .collect();
        prop_assert_eq!(members.len(), e.attributes.len());
        for (line, attr) in members.iter().zip(&e.attributes) {
            let glyph = if attr.required { '+' } else { '-' };
            prop_assert_eq!(line.to_string(), format!("{}{} {}", glyph, attr.data_type, attr.name));
        }
    }

    #[test]
    fn generation_is_idempotent(content in content()) {
        prop_assert_eq!(mermaid::generate(&content), mermaid::generate(&content));
        prop_assert_eq!(mermaid::render(&content), mermaid::render(&content.clone()));
    }

    #[test]
    fn edges_render_names_and_dangling_ends_vanish(model in domain_model()) {
        let rendered = mermaid::class_diagram(&model);
        // Entity ids may repeat in generated input; the last one wins in the lookup.
        let names: std::collections::HashMap<&str, &str> = model
            .entities
            .iter()
            .map(|e| (e.id.as_str(), e.name.as_str()))
            .collect();

        let mut expected = Vec::new();
        let mut dropped = 0;
        for rel in &model.relationships {
            match (names.get(rel.source.as_str()), names.get(rel.target.as_str())) {
                (Some(s), Some(t)) => expected.push(format!(
                    "    {} {} {}",
                    s,
                    notation::class_arrow(rel.kind),
                    t
                )),
                _ => dropped += 1,
            }
        }
        let edge_lines: Vec<&str> = rendered
            .code
            .lines()
            .filter(|l| {
                l.starts_with("    ")
                    && !l.starts_with("        ")
                    && !l.starts_with("    class ")
                    && !l.contains("<<")
                    && l.trim() != "}"
            })
            .collect();
        prop_assert_eq!(edge_lines, expected.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(rendered.warnings.len(), dropped);
    }
}
