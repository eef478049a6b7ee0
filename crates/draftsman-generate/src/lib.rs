//! Drafts design documents from free-text requirements.
//!
//! Generation is keyword driven and deterministic. Anything the caller already
//! knows (actors, entities, tables, modules) is passed through untouched and
//! only the empty categories are drafted from the text.

pub mod engine;
mod synthesize;
pub mod vocabulary;

use std::sync::atomic::{AtomicU64, Ordering};

use draftsman_core::settings::Settings;
use draftsman_core::{
    document_id, Actor, Aggregate, ArchitectureLayer, ArchitectureModule, Document,
    DocumentContent, DocumentKind, DocumentMetadata, DomainRelationship, Entity, ErEntity,
    ErRelationship, ModuleConnection, Relationship, UseCase, ValueObject,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use engine::{Clock, FixedLatency, Latency, NoLatency, SystemClock};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UseCaseRequest {
    /// Free-text requirements, any language. Actors and use cases are drafted from keywords in it.
    pub requirements: String,
    /// Document title (defaults to "Use Case Model")
    #[serde(default)]
    pub title: Option<String>,
    /// Known actors; when non-empty they replace the drafted ones
    #[serde(default)]
    pub actors: Vec<Actor>,
    /// Known use cases; when non-empty they replace the drafted ones
    #[serde(default)]
    pub use_cases: Vec<UseCase>,
    /// Known relationships; when empty every actor is associated with every use case
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainModelRequest {
    /// Description of the business domain
    pub business_context: String,
    /// Document title (defaults to "Domain Model")
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub value_objects: Vec<ValueObject>,
    /// Known aggregates; when empty one aggregate is drafted per aggregate root
    #[serde(default)]
    pub aggregates: Vec<Aggregate>,
    #[serde(default)]
    pub relationships: Vec<DomainRelationship>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErRequest {
    /// Description of the data to store
    pub requirements: String,
    /// Document title (defaults to "Entity Relationship Model")
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub entities: Vec<ErEntity>,
    /// Known relationships; when empty they are derived from `<singular>_id` columns
    #[serde(default)]
    pub relationships: Vec<ErRelationship>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureRequest {
    /// Description of the system and its technology
    pub requirements: String,
    /// Document title (defaults to "System Architecture")
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub modules: Vec<ArchitectureModule>,
    #[serde(default)]
    pub connections: Vec<ModuleConnection>,
    /// Known layers; when empty modules are layered by type
    #[serde(default)]
    pub layers: Vec<ArchitectureLayer>,
}

/// Turns requests into rendered documents. Latency and time are injected so
/// callers (and tests) decide how slow and when "now" is.
pub struct DocumentEngine {
    latency: Box<dyn Latency>,
    clock: Box<dyn Clock>,
    tags: Vec<String>,
    author: Option<String>,
    sequence: AtomicU64,
}

impl Default for DocumentEngine {
    fn default() -> Self {
        Self::new(Box::new(NoLatency), Box::new(SystemClock))
    }
}

impl DocumentEngine {
    pub fn new(latency: Box<dyn Latency>, clock: Box<dyn Clock>) -> Self {
        Self {
            latency,
            clock,
            tags: Vec::new(),
            author: None,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let latency: Box<dyn Latency> = if settings.latency_ms == 0 {
            Box::new(NoLatency)
        } else {
            Box::new(FixedLatency(settings.latency()))
        };
        Self::new(latency, Box::new(SystemClock))
            .with_tags(settings.default_tags.clone())
            .with_author(settings.author.clone())
    }

    /// Tags stamped on every generated document.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// A new document id. Ids from one engine never repeat, even when the
    /// clock does not move between calls.
    pub fn next_id(&self, kind: DocumentKind) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        document_id(kind, self.clock.now(), seq)
    }

    pub async fn generate_use_case(&self, req: &UseCaseRequest) -> Document {
        engine::simulate(self.latency.as_ref(), DocumentKind::UseCase).await;
        let content = synthesize::use_case_model(req);
        self.wrap(req.title.as_deref(), DocumentContent::UseCase(content))
    }

    pub async fn generate_domain_model(&self, req: &DomainModelRequest) -> Document {
        engine::simulate(self.latency.as_ref(), DocumentKind::DomainModel).await;
        let content = synthesize::domain_model(req);
        self.wrap(req.title.as_deref(), DocumentContent::DomainModel(content))
    }

    pub async fn generate_er_model(&self, req: &ErRequest) -> Document {
        engine::simulate(self.latency.as_ref(), DocumentKind::EntityRelationship).await;
        let content = synthesize::er_model(req);
        self.wrap(req.title.as_deref(), DocumentContent::EntityRelationship(content))
    }

    pub async fn generate_architecture(&self, req: &ArchitectureRequest) -> Document {
        engine::simulate(self.latency.as_ref(), DocumentKind::Architecture).await;
        let content = synthesize::architecture_model(req);
        self.wrap(req.title.as_deref(), DocumentContent::Architecture(content))
    }

    /// Wrap caller-supplied content in a fresh document without drafting anything.
    pub fn document(&self, title: Option<&str>, content: DocumentContent) -> Document {
        self.wrap(title, content)
    }

    fn wrap(&self, title: Option<&str>, content: DocumentContent) -> Document {
        let kind = content.kind();
        let now = self.clock.now();
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(kind.default_title())
            .to_string();
        let metadata = DocumentMetadata::new(now, self.tags.clone(), self.author.clone());
        let doc = Document::new(self.next_id(kind), title, content, metadata);
        info!(id = %doc.id, %kind, lines = doc.diagram.lines().count(), "generated document");
        doc
    }
}
