use std::fmt::Display;
use std::sync::Arc;

use draftsman_core::export::{self, ExportFormat};
use draftsman_core::guidelines::GUIDELINES;
use draftsman_core::mermaid::{self, Rendered};
use draftsman_core::settings::{self, Settings};
use draftsman_core::store::{DocumentStore, FileStore};
use draftsman_core::{Document, DocumentContent, Error};
use draftsman_generate::{
    ArchitectureRequest, DocumentEngine, DomainModelRequest, ErRequest, UseCaseRequest,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DRAFTSMAN_LOG";

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GetDocumentRequest {
    /// Id of the document, as returned by list_documents or a generate_* tool (e.g. "use-case-1714564800000-0")
    id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SaveDocumentRequest {
    /// Id to save under. Omit to create a new document with a generated id. An existing id keeps its metadata and bumps its version.
    id: Option<String>,
    /// Document title. Omit to keep the existing title (or use the default for the document type).
    title: Option<String>,
    /// Structured content with a "type" tag: "use-case", "domain-model", "entity-relationship" or "architecture"
    content: DocumentContent,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct RenderRequest {
    /// Structured content with a "type" tag, same shape as the `content` of a stored document
    content: DocumentContent,
    /// "diagram" (default) or "knowledge-graph" (domain models only)
    view: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ExportRequest {
    /// Id of the document to export
    id: String,
    /// "mermaid", "markdown" or "json"
    format: String,
}

// --- Server ---

#[derive(Clone)]
pub struct DraftsmanServer {
    tool_router: ToolRouter<Self>,
    engine: Arc<DocumentEngine>,
    store: Arc<dyn DocumentStore>,
}

fn respond<E: Display>(result: Result<String, E>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
    }
}

fn pretty(doc: &Document) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Diagram text followed by one line per dropped reference.
fn with_warnings(rendered: Rendered) -> String {
    if rendered.warnings.is_empty() {
        return rendered.code;
    }
    let mut text = rendered.code;
    text.push_str(&format!("\nWarnings ({}):\n", rendered.warnings.len()));
    for warning in &rendered.warnings {
        text.push_str(&format!("- {}\n", warning));
    }
    text
}

/// Aggregates must list their root before a domain model is stored.
fn validate_content(content: &DocumentContent) -> Result<(), Error> {
    if let DocumentContent::DomainModel(model) = content {
        for aggregate in &model.aggregates {
            aggregate.validate()?;
        }
    }
    Ok(())
}

#[tool_router]
impl DraftsmanServer {
    pub fn new(engine: DocumentEngine, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            engine: Arc::new(engine),
            store,
        }
    }

    #[tool(description = "List stored documents, one per line as `id<TAB>type<TAB>title`")]
    fn list_documents(&self) -> Result<CallToolResult, McpError> {
        respond(self.list_text())
    }

    #[tool(
        description = "Get a stored document as JSON: {id, title, content: {type, ...}, diagram, metadata: {createdAt, updatedAt, version, tags, author?}}. `diagram` is the Mermaid text rendered from `content`."
    )]
    fn get_document(
        &self,
        Parameters(req): Parameters<GetDocumentRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.store.get(&req.id).and_then(|doc| pretty(&doc)))
    }

    #[tool(
        description = "Create or overwrite a document from structured content. The Mermaid diagram is re-rendered from the content. Domain models are rejected when an aggregate does not list its root among its entities."
    )]
    fn save_document(
        &self,
        Parameters(req): Parameters<SaveDocumentRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.save(req))
    }

    #[tool(description = "Delete a stored document by id. Deleting an unknown id succeeds.")]
    fn delete_document(
        &self,
        Parameters(req): Parameters<GetDocumentRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.store
                .delete(&req.id)
                .map(|()| format!("Deleted document '{}'", req.id)),
        )
    }

    #[tool(
        description = "Draft a use-case model from requirements text. Actors, use cases and relationships you pass are kept as-is; empty categories are drafted from keywords. The document is saved and returned as JSON."
    )]
    async fn generate_use_case(
        &self,
        Parameters(req): Parameters<UseCaseRequest>,
    ) -> Result<CallToolResult, McpError> {
        let doc = self.engine.generate_use_case(&req).await;
        respond(self.store_generated(doc))
    }

    #[tool(
        description = "Draft a domain model (entities, value objects, aggregates, relationships, knowledge graph) from a business description. Supplied parts are kept as-is. The document is saved and returned as JSON."
    )]
    async fn generate_domain_model(
        &self,
        Parameters(req): Parameters<DomainModelRequest>,
    ) -> Result<CallToolResult, McpError> {
        let doc = self.engine.generate_domain_model(&req).await;
        respond(self.store_generated(doc))
    }

    #[tool(
        description = "Draft an entity-relationship model (tables, fields, foreign-key relationships) from requirements text. Supplied tables and relationships are kept as-is. The document is saved and returned as JSON."
    )]
    async fn generate_er_model(
        &self,
        Parameters(req): Parameters<ErRequest>,
    ) -> Result<CallToolResult, McpError> {
        let doc = self.engine.generate_er_model(&req).await;
        respond(self.store_generated(doc))
    }

    #[tool(
        description = "Draft a layered system architecture (modules, connections, layers) from requirements text. Supplied modules, connections and layers are kept as-is. The document is saved and returned as JSON."
    )]
    async fn generate_architecture(
        &self,
        Parameters(req): Parameters<ArchitectureRequest>,
    ) -> Result<CallToolResult, McpError> {
        let doc = self.engine.generate_architecture(&req).await;
        respond(self.store_generated(doc))
    }

    #[tool(
        description = "Render structured content to Mermaid without saving it. References to unknown ids are left out of the diagram and listed as warnings after it."
    )]
    fn render_diagram(
        &self,
        Parameters(req): Parameters<RenderRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(render_text(&req.content, req.view.as_deref()))
    }

    #[tool(description = "Export a stored document as Mermaid text, a Markdown page or JSON")]
    fn export_document(
        &self,
        Parameters(req): Parameters<ExportRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.export_text(&req.id, &req.format))
    }

    #[tool(description = "Get the modeling guidelines that generated and edited documents should follow")]
    fn get_guidelines(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(GUIDELINES)]))
    }
}

impl DraftsmanServer {
    fn list_text(&self) -> Result<String, Error> {
        let ids = self.store.list()?;
        if ids.is_empty() {
            return Ok("No documents found. Use a generate_* tool or save_document to create one.".to_string());
        }
        let lines: Vec<String> = ids
            .iter()
            .map(|id| match self.store.get(id) {
                Ok(doc) => format!("{}\t{}\t{}", id, doc.kind(), doc.title),
                Err(_) => format!("{}\t?\t(unreadable)", id),
            })
            .collect();
        Ok(lines.join("\n"))
    }

    /// Move `doc` to a fresh id if its generated one is already stored, so a
    /// new document never replaces an existing one.
    fn claim_free_id(&self, doc: &mut Document) -> Result<(), Error> {
        let taken = self.store.list()?;
        while taken.contains(&doc.id) {
            doc.id = self.engine.next_id(doc.kind());
        }
        Ok(())
    }

    fn store_generated(&self, mut doc: Document) -> Result<String, Error> {
        self.claim_free_id(&mut doc)?;
        self.store.put(&doc)?;
        pretty(&doc)
    }

    fn save(&self, req: SaveDocumentRequest) -> Result<String, Error> {
        validate_content(&req.content)?;
        let existing = match req.id.as_deref() {
            Some(id) => match self.store.get(id) {
                Ok(doc) => Some(doc),
                Err(Error::NotFound { .. }) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        let doc = match existing {
            Some(mut doc) => {
                doc.content = req.content;
                if let Some(title) = req.title.filter(|t| !t.trim().is_empty()) {
                    doc.title = title;
                }
                doc.regenerate(self.engine.now());
                doc
            }
            None => {
                let mut doc = self.engine.document(req.title.as_deref(), req.content);
                match req.id {
                    Some(id) => doc.id = id,
                    None => self.claim_free_id(&mut doc)?,
                }
                doc
            }
        };

        self.store.put(&doc)?;
        info!(id = %doc.id, version = doc.metadata.version, "saved document");
        pretty(&doc)
    }

    fn export_text(&self, id: &str, format: &str) -> Result<String, Error> {
        let format: ExportFormat = format.parse()?;
        let doc = self.store.get(id)?;
        export::export(&doc, format)
    }
}

fn render_text(content: &DocumentContent, view: Option<&str>) -> Result<String, String> {
    match (view.map(str::trim), content) {
        (None | Some("") | Some("diagram"), _) => Ok(with_warnings(mermaid::render(content))),
        (Some("knowledge-graph"), DocumentContent::DomainModel(model)) => {
            Ok(with_warnings(mermaid::knowledge_graph(&model.knowledge_graph)))
        }
        (Some("knowledge-graph"), other) => Err(format!(
            "The knowledge-graph view needs a domain model, got '{}'",
            other.kind()
        )),
        (Some(view), _) => Err(format!(
            "Unknown view '{}' (use \"diagram\" or \"knowledge-graph\")",
            view
        )),
    }
}

#[tool_handler]
impl ServerHandler for DraftsmanServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = format!("{}\n\n## Modeling Guidelines\n{}", INSTRUCTIONS, GUIDELINES);
        ServerInfo {
            instructions: Some(instructions.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

const INSTRUCTIONS: &str = r#"draftsman turns structured software-design models into Mermaid diagrams and keeps them as documents.

## Document types
- **use-case**: actors (primary, secondary, system), use cases and their relationships (association, include, extend, generalization). Rendered as `graph TD`.
- **domain-model**: entities, value objects, aggregates, relationships (composition, aggregation, association, inheritance, dependency) and an optional knowledge graph. Rendered as `classDiagram`.
- **entity-relationship**: tables with typed fields and one-to-one, one-to-many or many-to-many relationships. Rendered as `erDiagram`.
- **architecture**: modules, connections (sync, async, database, cache, stream) and ordered layers. Rendered as `graph TD` with one subgraph per layer.

Every object is referred to by its `id`. The `diagram` of a stored document is always derived from its `content`; edit the content and call `save_document`, never edit the diagram text."#;

/// Write default settings to the draftsman home unless they already exist.
fn init_home() -> Result<(), Box<dyn std::error::Error>> {
    let home = settings::home_dir();
    if home.join("settings.json").exists() {
        eprintln!("Settings already exist in {}", home.display());
        return Ok(());
    }
    let settings = Settings::default();
    settings.write(&home)?;
    std::fs::create_dir_all(settings.store_dir(&home))?;
    eprintln!("Wrote default settings to {}", home.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the MCP transport, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    if std::env::args().nth(1).as_deref() == Some("init") {
        return init_home();
    }

    let home = settings::home_dir();
    let settings = Settings::load(&home);
    let store = FileStore::new(settings.store_dir(&home));
    info!(store = %store.dir().display(), latency_ms = settings.latency_ms, "starting draftsman-mcp");

    let server = DraftsmanServer::new(DocumentEngine::from_settings(&settings), Arc::new(store));
    let service = server
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| tracing::error!("MCP server error: {}", e))?;
    service.waiting().await?;
    Ok(())
}
