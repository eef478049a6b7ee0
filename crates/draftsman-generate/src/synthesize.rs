use std::collections::BTreeMap;

use draftsman_core::{
    make_relationship_id, Aggregate, ArchitectureContent, ArchitectureLayer, ArchitectureLayout,
    ArchitectureModule, Cardinality, ConnectionKind, DomainModelContent, DomainRelationKind,
    DomainRelationship, Entity, ErContent, ErEntity, ErRelationship, KnowledgeConnection,
    KnowledgeGraphNode, KnowledgeNodeKind, ModuleConnection, ModuleKind, ReferentialAction,
    Relationship, UseCaseContent, UseCaseRelationKind,
};

use crate::vocabulary::{self, mentions};
use crate::{ArchitectureRequest, DomainModelRequest, ErRequest, UseCaseRequest};

/// Keep the caller's items when there are any, otherwise draft them from the text.
fn supplied_or<T: Clone>(supplied: &[T], draft: impl FnOnce() -> Vec<T>) -> Vec<T> {
    if supplied.is_empty() {
        draft()
    } else {
        supplied.to_vec()
    }
}

// --- Use-case models ---

pub fn use_case_model(req: &UseCaseRequest) -> UseCaseContent {
    let text = req.requirements.to_lowercase();

    let actors = supplied_or(&req.actors, || {
        vocabulary::ACTORS
            .iter()
            .filter(|t| mentions(&text, t.keywords))
            .map(|t| t.build())
            .collect()
    });
    let use_cases = supplied_or(&req.use_cases, || {
        vocabulary::USE_CASES
            .iter()
            .filter(|t| mentions(&text, t.keywords))
            .map(|t| t.build())
            .collect()
    });
    let relationships = supplied_or(&req.relationships, || {
        actors
            .iter()
            .flat_map(|a| use_cases.iter().map(move |uc| (a, uc)))
            .map(|(a, uc)| Relationship {
                id: make_relationship_id(&a.id, &uc.id),
                source: a.id.clone(),
                target: uc.id.clone(),
                kind: UseCaseRelationKind::Association,
                label: None,
            })
            .collect()
    });

    UseCaseContent {
        actors,
        use_cases,
        relationships,
    }
}

// --- Domain models ---

pub fn domain_model(req: &DomainModelRequest) -> DomainModelContent {
    let text = req.business_context.to_lowercase();

    let entities = supplied_or(&req.entities, || {
        vocabulary::ENTITIES
            .iter()
            .filter(|t| mentions(&text, t.keywords))
            .map(|t| t.build())
            .collect()
    });
    let value_objects = supplied_or(&req.value_objects, || {
        vocabulary::VALUE_OBJECTS
            .iter()
            .filter(|t| mentions(&text, t.keywords))
            .map(|t| t.build())
            .collect()
    });
    let aggregates = supplied_or(&req.aggregates, || {
        entities
            .iter()
            .filter(|e| e.is_aggregate_root)
            .map(|e| Aggregate {
                id: format!("{}_aggregate", e.id),
                name: format!("{}Aggregate", e.name),
                root: e.id.clone(),
                entities: vec![e.id.clone()],
                value_objects: vec![],
                boundary_rules: vec![format!(
                    "{} is only modified through its root",
                    e.name
                )],
            })
            .collect()
    });
    let relationships = supplied_or(&req.relationships, || chain_relationships(&entities));
    let knowledge_graph = knowledge_graph(&entities, &relationships);

    DomainModelContent {
        entities,
        value_objects,
        aggregates,
        relationships,
        knowledge_graph,
    }
}

/// Consecutive entities are associated; the first aggregates the last.
fn chain_relationships(entities: &[Entity]) -> Vec<DomainRelationship> {
    let mut rels: Vec<DomainRelationship> = entities
        .windows(2)
        .map(|pair| DomainRelationship {
            id: make_relationship_id(&pair[0].id, &pair[1].id),
            source: pair[0].id.clone(),
            target: pair[1].id.clone(),
            kind: DomainRelationKind::Association,
            cardinality: None,
            label: None,
        })
        .collect();
    if let (Some(first), Some(last)) = (entities.first(), entities.last()) {
        if entities.len() >= 2 {
            rels.push(DomainRelationship {
                id: format!("{}-aggregation", make_relationship_id(&first.id, &last.id)),
                source: first.id.clone(),
                target: last.id.clone(),
                kind: DomainRelationKind::Aggregation,
                cardinality: Some("1..*".to_string()),
                label: None,
            });
        }
    }
    rels
}

/// One entity node per entity, followed by one attribute node per attribute.
pub fn knowledge_graph(
    entities: &[Entity],
    relationships: &[DomainRelationship],
) -> Vec<KnowledgeGraphNode> {
    let mut nodes = Vec::new();
    for entity in entities {
        let attr_id = |name: &str| format!("{}_{}", entity.id, name);
        let mut connections: Vec<KnowledgeConnection> = entity
            .attributes
            .iter()
            .map(|a| KnowledgeConnection {
                target: attr_id(&a.name),
                relationship: "has".to_string(),
                weight: 1.0,
            })
            .collect();
        connections.extend(relationships.iter().filter(|r| r.source == entity.id).map(|r| {
            KnowledgeConnection {
                target: r.target.clone(),
                relationship: "relates to".to_string(),
                weight: 0.5,
            }
        }));

        let mut properties = BTreeMap::new();
        properties.insert(
            "aggregateRoot".to_string(),
            serde_json::Value::Bool(entity.is_aggregate_root),
        );
        nodes.push(KnowledgeGraphNode {
            id: entity.id.clone(),
            label: entity.name.clone(),
            kind: KnowledgeNodeKind::Entity,
            properties,
            connections,
        });

        for attr in &entity.attributes {
            let mut properties = BTreeMap::new();
            properties.insert(
                "type".to_string(),
                serde_json::Value::String(attr.data_type.clone()),
            );
            properties.insert("required".to_string(), serde_json::Value::Bool(attr.required));
            nodes.push(KnowledgeGraphNode {
                id: attr_id(&attr.name),
                label: attr.name.clone(),
                kind: KnowledgeNodeKind::Attribute,
                properties,
                connections: vec![],
            });
        }
    }
    nodes
}

// --- Entity-relationship models ---

pub fn er_model(req: &ErRequest) -> ErContent {
    let text = req.requirements.to_lowercase();

    let entities = supplied_or(&req.entities, || {
        vocabulary::TABLES
            .iter()
            .filter(|t| mentions(&text, t.keywords))
            .map(|t| t.build())
            .collect()
    });
    let relationships = supplied_or(&req.relationships, || foreign_keys(&entities));

    ErContent {
        entities,
        relationships,
    }
}

/// Derive one-to-many relationships from `<singular>_id` columns.
fn foreign_keys(entities: &[ErEntity]) -> Vec<ErRelationship> {
    let mut rels = Vec::new();
    for child in entities {
        for field in child.fields.iter().filter(|f| !f.primary_key) {
            let Some(stem) = field.name.strip_suffix("_id") else {
                continue;
            };
            let plural = format!("{}s", stem);
            let Some(parent) = entities.iter().find(|e| {
                let table = if e.table_name.is_empty() { &e.name } else { &e.table_name };
                *table == plural || table == stem
            }) else {
                continue;
            };
            rels.push(ErRelationship {
                id: format!("fk_{}_{}", child.table_name, field.name),
                name: "has".to_string(),
                source_entity: parent.id.clone(),
                target_entity: child.id.clone(),
                source_field: "id".to_string(),
                target_field: field.name.clone(),
                kind: Cardinality::OneToMany,
                on_delete: if field.nullable {
                    ReferentialAction::SetNull
                } else {
                    ReferentialAction::Cascade
                },
                on_update: ReferentialAction::Cascade,
            });
        }
    }
    rels
}

// --- Architecture models ---

/// `(layer name, order, member kinds)`; modules of other kinds land in "Service".
const LAYERS: &[(&str, i32, &[ModuleKind])] = &[
    ("Presentation", 0, &[ModuleKind::Frontend]),
    ("Gateway", 1, &[ModuleKind::Gateway]),
    (
        "Service",
        2,
        &[ModuleKind::Backend, ModuleKind::Service, ModuleKind::Compute, ModuleKind::Other],
    ),
    ("Messaging", 3, &[ModuleKind::Queue, ModuleKind::Broker, ModuleKind::Stream]),
    ("Data", 4, &[ModuleKind::Database, ModuleKind::Cache, ModuleKind::Storage]),
];

pub fn architecture_model(req: &ArchitectureRequest) -> ArchitectureContent {
    let text = req.requirements.to_lowercase();

    let mut modules = supplied_or(&req.modules, || {
        vocabulary::MODULES
            .iter()
            .filter(|t| mentions(&text, t.keywords))
            .map(|t| t.build())
            .collect()
    });
    let connections = supplied_or(&req.connections, || wire(&modules));
    let layers = supplied_or(&req.layers, || layers_for(&modules));

    for module in modules.iter_mut().filter(|m| m.dependencies.is_empty()) {
        module.dependencies = connections
            .iter()
            .filter(|c| c.source_module == module.id)
            .map(|c| c.target_module.clone())
            .collect();
    }

    ArchitectureContent {
        modules,
        connections,
        layers,
        layout: Some(ArchitectureLayout::Layered),
    }
}

fn of_kind<'a>(modules: &'a [ArchitectureModule], kinds: &[ModuleKind]) -> Vec<&'a ArchitectureModule> {
    modules.iter().filter(|m| kinds.contains(&m.kind)).collect()
}

/// Frontends call the gateway (or the backends directly), the gateway routes
/// to every service, and backends talk to the stores and queues.
fn wire(modules: &[ArchitectureModule]) -> Vec<ModuleConnection> {
    let frontends = of_kind(modules, &[ModuleKind::Frontend]);
    let gateways = of_kind(modules, &[ModuleKind::Gateway]);
    let backends = of_kind(modules, &[ModuleKind::Backend]);
    let services = of_kind(modules, &[ModuleKind::Backend, ModuleKind::Service]);

    let mut conns = Vec::new();
    let mut connect = |source: &ArchitectureModule,
                       target: &ArchitectureModule,
                       kind: ConnectionKind,
                       protocol: &str| {
        conns.push(ModuleConnection {
            id: format!("conn-{}-{}", source.id, target.id),
            source_module: source.id.clone(),
            target_module: target.id.clone(),
            kind,
            protocol: Some(protocol.to_string()),
        });
    };

    for &frontend in &frontends {
        match gateways.first() {
            Some(&gateway) => connect(frontend, gateway, ConnectionKind::Sync, "HTTPS"),
            None => {
                for &service in &services {
                    connect(frontend, service, ConnectionKind::Sync, "REST");
                }
            }
        }
    }
    for &gateway in &gateways {
        for &service in &services {
            connect(gateway, service, ConnectionKind::Sync, "REST");
        }
    }
    for &backend in &backends {
        for target in modules.iter().filter(|m| m.id != backend.id) {
            match target.kind {
                ModuleKind::Database => connect(backend, target, ConnectionKind::Database, "SQL"),
                ModuleKind::Cache => connect(backend, target, ConnectionKind::Cache, "RESP"),
                ModuleKind::Queue | ModuleKind::Broker => {
                    connect(backend, target, ConnectionKind::Async, "AMQP")
                }
                ModuleKind::Stream => connect(backend, target, ConnectionKind::Stream, "Kafka"),
                ModuleKind::Storage => connect(backend, target, ConnectionKind::Sync, "HTTPS"),
                ModuleKind::Service => connect(backend, target, ConnectionKind::Sync, "REST"),
                _ => {}
            }
        }
    }
    conns
}

fn layers_for(modules: &[ArchitectureModule]) -> Vec<ArchitectureLayer> {
    LAYERS
        .iter()
        .map(|(name, order, kinds)| ArchitectureLayer {
            name: name.to_string(),
            modules: modules
                .iter()
                .filter(|m| kinds.contains(&m.kind))
                .map(|m| m.id.clone())
                .collect(),
            order: *order,
        })
        .filter(|l| !l.modules.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftsman_core::{mermaid, Actor, ActorKind, ErField};

    fn use_case_req(text: &str) -> UseCaseRequest {
        UseCaseRequest {
            requirements: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn keywords_draft_actors_and_use_cases() {
        let model = use_case_model(&use_case_req("用户可以登录系统，管理员管理账户"));
        let actor_ids: Vec<&str> = model.actors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(actor_ids, vec!["user", "admin", "external_system"]);
        let uc_ids: Vec<&str> = model.use_cases.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(uc_ids, vec!["login", "manage_users"]);

        let login = &model.use_cases[0];
        assert_eq!(login.main_flow.len(), 4);
        assert_eq!(login.preconditions, vec!["User has a registered account"]);

        // Every actor is associated with every use case.
        assert_eq!(model.relationships.len(), 6);
        assert_eq!(model.relationships[0].id, "rel-user-login");
        assert_eq!(model.relationships[1].id, "rel-user-manage_users");
        assert!(model
            .relationships
            .iter()
            .all(|r| r.kind == UseCaseRelationKind::Association));
    }

    #[test]
    fn no_keywords_means_empty_collections() {
        let model = use_case_model(&use_case_req("a quiet afternoon"));
        assert!(model.actors.is_empty());
        assert!(model.use_cases.is_empty());
        assert!(model.relationships.is_empty());
    }

    #[test]
    fn supplied_actors_pass_through() {
        let mut req = use_case_req("the user wants to log in");
        req.actors = vec![Actor {
            id: "clerk".into(),
            name: "Clerk".into(),
            kind: ActorKind::Secondary,
            description: None,
        }];
        let model = use_case_model(&req);
        assert_eq!(model.actors, req.actors);
        assert_eq!(model.use_cases[0].id, "login");
        assert_eq!(model.relationships[0].source, "clerk");
    }

    #[test]
    fn domain_model_chains_entities_and_builds_aggregates() {
        let model = domain_model(&DomainModelRequest {
            business_context: "Users place an order for a product and pay with a payment".into(),
            ..Default::default()
        });
        let ids: Vec<&str> = model.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["user", "order", "product", "payment"]);

        let roots: Vec<&str> = model.aggregates.iter().map(|a| a.root.as_str()).collect();
        assert_eq!(roots, vec!["user", "order", "product"]);
        assert!(model.aggregates.iter().all(|a| a.validate().is_ok()));

        let rels: Vec<(&str, &str, DomainRelationKind)> = model
            .relationships
            .iter()
            .map(|r| (r.source.as_str(), r.target.as_str(), r.kind))
            .collect();
        assert_eq!(
            rels,
            vec![
                ("user", "order", DomainRelationKind::Association),
                ("order", "product", DomainRelationKind::Association),
                ("product", "payment", DomainRelationKind::Association),
                ("user", "payment", DomainRelationKind::Aggregation),
            ]
        );

        let code = mermaid::class_diagram(&model);
        assert!(code.warnings.is_empty());
        assert!(code.code.contains("    User o-- Payment : 1..*\n"));
    }

    #[test]
    fn single_entity_has_no_relationships() {
        let model = domain_model(&DomainModelRequest {
            business_context: "inventory only".into(),
            ..Default::default()
        });
        assert_eq!(model.entities.len(), 1);
        assert!(model.relationships.is_empty());
    }

    #[test]
    fn two_entities_get_distinct_relationship_ids() {
        let rels = chain_relationships(&domain_model(&DomainModelRequest {
            business_context: "user order".into(),
            ..Default::default()
        })
        .entities);
        assert_eq!(rels.len(), 2);
        assert_ne!(rels[0].id, rels[1].id);
    }

    #[test]
    fn knowledge_graph_links_attributes_and_relationships() {
        let model = domain_model(&DomainModelRequest {
            business_context: "user and order".into(),
            ..Default::default()
        });
        let user = &model.knowledge_graph[0];
        assert_eq!(user.id, "user");
        assert_eq!(user.kind, KnowledgeNodeKind::Entity);
        assert!(user
            .connections
            .iter()
            .any(|c| c.target == "user_email" && c.relationship == "has"));
        assert!(user
            .connections
            .iter()
            .any(|c| c.target == "order" && c.weight == 0.5));

        let rendered = mermaid::knowledge_graph(&model.knowledge_graph);
        assert!(rendered.warnings.is_empty());
        assert!(rendered.code.contains("    user_email(\"email\")\n"));
    }

    #[test]
    fn er_model_derives_foreign_keys() {
        let model = er_model(&ErRequest {
            requirements: "用户 下单 订单项 商品 支付".into(),
            ..Default::default()
        });
        let tables: Vec<&str> = model.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(tables, vec!["users", "orders", "products", "order_items", "payments"]);

        let edges: Vec<(&str, &str, &str)> = model
            .relationships
            .iter()
            .map(|r| (r.source_entity.as_str(), r.target_entity.as_str(), r.target_field.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("users", "orders", "user_id"),
                ("orders", "order_items", "order_id"),
                ("products", "order_items", "product_id"),
                ("orders", "payments", "order_id"),
            ]
        );
        assert!(model
            .relationships
            .iter()
            .all(|r| r.on_delete == ReferentialAction::Cascade));
    }

    #[test]
    fn nullable_foreign_key_sets_null_on_delete() {
        let entity = |table: &str, fields: Vec<ErField>| ErEntity {
            id: table.into(),
            name: table.into(),
            table_name: table.into(),
            fields,
        };
        let rels = foreign_keys(&[
            entity("team", vec![ErField::new("id", "int").primary_key()]),
            entity(
                "players",
                vec![ErField::new("id", "int").primary_key(), ErField::new("team_id", "int")],
            ),
        ]);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].source_entity, "team");
        assert_eq!(rels[0].on_delete, ReferentialAction::SetNull);
    }

    #[test]
    fn architecture_is_wired_and_layered() {
        let model = architecture_model(&ArchitectureRequest {
            requirements: "A web frontend behind an API gateway, a backend service with MySQL and Redis cache".into(),
            ..Default::default()
        });
        let ids: Vec<&str> = model.modules.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["web", "gateway", "app", "db", "cache"]);

        let conns: Vec<(&str, &str, ConnectionKind)> = model
            .connections
            .iter()
            .map(|c| (c.source_module.as_str(), c.target_module.as_str(), c.kind))
            .collect();
        assert_eq!(
            conns,
            vec![
                ("web", "gateway", ConnectionKind::Sync),
                ("gateway", "app", ConnectionKind::Sync),
                ("app", "db", ConnectionKind::Database),
                ("app", "cache", ConnectionKind::Cache),
            ]
        );

        let layers: Vec<(&str, Vec<String>)> = model
            .layers
            .iter()
            .map(|l| (l.name.as_str(), l.modules.clone()))
            .collect();
        assert_eq!(
            layers,
            vec![
                ("Presentation", vec!["web".to_string()]),
                ("Gateway", vec!["gateway".to_string()]),
                ("Service", vec!["app".to_string()]),
                ("Data", vec!["db".to_string(), "cache".to_string()]),
            ]
        );
        assert_eq!(model.modules[2].dependencies, vec!["db", "cache"]);

        let code = mermaid::architecture_graph(&model).code;
        assert!(code.contains("        db[(\"Primary Database\")]\n"));
        assert!(code.contains("        style db fill:#1890ff,stroke:#333,stroke-width:2px\n"));
        assert!(code.contains("    app -->|\"SQL\"| db\n"));
    }

    #[test]
    fn frontends_without_gateway_call_services_directly() {
        let model = architecture_model(&ArchitectureRequest {
            requirements: "mobile client and a search service".into(),
            ..Default::default()
        });
        let conns: Vec<(&str, &str)> = model
            .connections
            .iter()
            .map(|c| (c.source_module.as_str(), c.target_module.as_str()))
            .collect();
        assert_eq!(conns, vec![("mobile", "app"), ("mobile", "search"), ("app", "search")]);
    }

    #[test]
    fn empty_architecture_renders_placeholder() {
        let model = architecture_model(&ArchitectureRequest::default());
        assert!(model.modules.is_empty());
        assert!(model.layers.is_empty());
        assert!(mermaid::architecture_graph(&model).code.contains("stroke-dasharray"));
    }
}
