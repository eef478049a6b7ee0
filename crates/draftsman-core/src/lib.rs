pub mod error;
pub mod export;
pub mod guidelines;
pub mod mermaid;
pub mod model;
pub mod notation;
pub mod settings;
pub mod store;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use error::{Error, Result};
pub use model::*;

// --- Content payloads, one per document kind ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UseCaseContent {
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub use_cases: Vec<UseCase>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainModelContent {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub value_objects: Vec<ValueObject>,
    #[serde(default)]
    pub aggregates: Vec<Aggregate>,
    #[serde(default)]
    pub relationships: Vec<DomainRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub knowledge_graph: Vec<KnowledgeGraphNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErContent {
    #[serde(default)]
    pub entities: Vec<ErEntity>,
    #[serde(default)]
    pub relationships: Vec<ErRelationship>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureContent {
    #[serde(default)]
    pub modules: Vec<ArchitectureModule>,
    #[serde(default)]
    pub connections: Vec<ModuleConnection>,
    #[serde(default)]
    pub layers: Vec<ArchitectureLayer>,
    /// Defaults to layered when any layer is defined, flat otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<ArchitectureLayout>,
}

impl ArchitectureContent {
    pub fn layout(&self) -> ArchitectureLayout {
        match self.layout {
            Some(layout) => layout,
            None if self.layers.is_empty() => ArchitectureLayout::Flat,
            None => ArchitectureLayout::Layered,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DocumentContent {
    UseCase(UseCaseContent),
    DomainModel(DomainModelContent),
    EntityRelationship(ErContent),
    Architecture(ArchitectureContent),
}

impl DocumentContent {
    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentContent::UseCase(_) => DocumentKind::UseCase,
            DocumentContent::DomainModel(_) => DocumentKind::DomainModel,
            DocumentContent::EntityRelationship(_) => DocumentKind::EntityRelationship,
            DocumentContent::Architecture(_) => DocumentKind::Architecture,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    UseCase,
    DomainModel,
    EntityRelationship,
    Architecture,
}

impl DocumentKind {
    pub fn slug(self) -> &'static str {
        match self {
            DocumentKind::UseCase => "use-case",
            DocumentKind::DomainModel => "domain-model",
            DocumentKind::EntityRelationship => "entity-relationship",
            DocumentKind::Architecture => "architecture",
        }
    }

    pub fn default_title(self) -> &'static str {
        match self {
            DocumentKind::UseCase => "Use Case Model",
            DocumentKind::DomainModel => "Domain Model",
            DocumentKind::EntityRelationship => "Entity Relationship Model",
            DocumentKind::Architecture => "System Architecture",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "use-case" | "usecase" => Ok(DocumentKind::UseCase),
            "domain-model" | "domain" => Ok(DocumentKind::DomainModel),
            "entity-relationship" | "er" => Ok(DocumentKind::EntityRelationship),
            "architecture" => Ok(DocumentKind::Architecture),
            other => Err(format!(
                "unknown document type '{other}': expected use-case, domain-model, entity-relationship or architecture"
            )),
        }
    }
}

// --- Document envelope ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

fn default_version() -> u32 {
    1
}

impl DocumentMetadata {
    pub fn new(now: DateTime<Utc>, tags: Vec<String>, author: Option<String>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            version: 1,
            tags,
            author,
        }
    }
}

/// A stored design document: the structured model plus its rendered Mermaid text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: DocumentContent,
    #[serde(default)]
    pub diagram: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Build a document and render its diagram from `content`.
    pub fn new(id: String, title: String, content: DocumentContent, metadata: DocumentMetadata) -> Self {
        let diagram = mermaid::generate(&content);
        Self {
            id,
            title,
            content,
            diagram,
            metadata,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.content.kind()
    }

    /// Re-render the diagram after `content` changed.
    pub fn regenerate(&mut self, now: DateTime<Utc>) {
        self.diagram = mermaid::generate(&self.content);
        self.metadata.updated_at = now;
        self.metadata.version += 1;
    }
}

/// Document ids follow "{kind}-{unix millis}-{seq}". The sequence keeps ids
/// created within the same millisecond apart.
pub fn document_id(kind: DocumentKind, now: DateTime<Utc>, seq: u64) -> String {
    format!("{}-{}-{}", kind.slug(), now.timestamp_millis(), seq)
}

/// Generate a relationship ID from source and target IDs.
pub fn make_relationship_id(source: &str, target: &str) -> String {
    format!("rel-{}-{}", source, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn content_is_tagged_by_type() {
        let content = DocumentContent::EntityRelationship(ErContent::default());
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "entity-relationship");

        let back: DocumentContent =
            serde_json::from_str(r#"{"type":"use-case","actors":[{"id":"u","name":"User"}]}"#)
                .unwrap();
        match back {
            DocumentContent::UseCase(uc) => {
                assert_eq!(uc.actors.len(), 1);
                assert_eq!(uc.actors[0].kind, ActorKind::Primary);
            }
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[test]
    fn new_document_renders_diagram() {
        let doc = Document::new(
            "d1".into(),
            "Empty".into(),
            DocumentContent::DomainModel(DomainModelContent::default()),
            DocumentMetadata::new(at(10), vec![], None),
        );
        assert_eq!(doc.diagram, "classDiagram\n");
        assert_eq!(doc.kind(), DocumentKind::DomainModel);
    }

    #[test]
    fn regenerate_bumps_version_and_timestamp() {
        let mut doc = Document::new(
            "d1".into(),
            "Model".into(),
            DocumentContent::DomainModel(DomainModelContent::default()),
            DocumentMetadata::new(at(10), vec!["generated".into()], None),
        );
        if let DocumentContent::DomainModel(dm) = &mut doc.content {
            dm.entities.push(Entity {
                id: "order".into(),
                name: "Order".into(),
                attributes: vec![],
                methods: vec![],
                is_aggregate_root: false,
            });
        }
        doc.regenerate(at(20));
        assert!(doc.diagram.contains("class Order {"));
        assert_eq!(doc.metadata.version, 2);
        assert_eq!(doc.metadata.updated_at, at(20));
        assert_eq!(doc.metadata.created_at, at(10));
    }

    #[test]
    fn architecture_layout_defaults_from_layers() {
        let mut content = ArchitectureContent::default();
        assert_eq!(content.layout(), ArchitectureLayout::Flat);
        content.layers.push(ArchitectureLayer {
            name: "Data".into(),
            modules: vec![],
            order: 0,
        });
        assert_eq!(content.layout(), ArchitectureLayout::Layered);
        content.layout = Some(ArchitectureLayout::Flat);
        assert_eq!(content.layout(), ArchitectureLayout::Flat);
    }

    #[test]
    fn ids_are_derived_from_kind_time_and_sequence() {
        assert_eq!(document_id(DocumentKind::Architecture, at(2), 0), "architecture-2000-0");
        assert_ne!(
            document_id(DocumentKind::UseCase, at(2), 0),
            document_id(DocumentKind::UseCase, at(2), 1)
        );
        assert_eq!(make_relationship_id("u", "login"), "rel-u-login");
        assert_eq!("er".parse::<DocumentKind>().unwrap(), DocumentKind::EntityRelationship);
        assert!("diagram".parse::<DocumentKind>().is_err());
    }
}
