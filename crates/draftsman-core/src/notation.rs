//! Relationship-to-notation tables.
//!
//! Every relationship or connection kind maps to the Mermaid token used by
//! the grammar it appears in. `Unknown` kinds fall back to the grammar's
//! generic edge.

use crate::model::{
    Cardinality, ConnectionKind, DomainRelationKind, KnowledgeNodeKind, ModuleKind,
    UseCaseRelationKind, Visibility,
};

/// Class-diagram arrow for a domain relationship.
pub fn class_arrow(kind: DomainRelationKind) -> &'static str {
    match kind {
        DomainRelationKind::Composition => "*--",
        DomainRelationKind::Aggregation => "o--",
        DomainRelationKind::Association => "-->",
        DomainRelationKind::Inheritance => "--|>",
        DomainRelationKind::Dependency => "..>",
        DomainRelationKind::Unknown => "--",
    }
}

/// Flow-graph arrow for a use-case relationship.
pub fn use_case_arrow(kind: UseCaseRelationKind) -> &'static str {
    match kind {
        UseCaseRelationKind::Include => "-.->|include|",
        UseCaseRelationKind::Extend => "-.->|extend|",
        UseCaseRelationKind::Association
        | UseCaseRelationKind::Generalization
        | UseCaseRelationKind::Unknown => "-->",
    }
}

/// ER-diagram cardinality token.
pub fn er_cardinality(kind: Cardinality) -> &'static str {
    match kind {
        Cardinality::OneToOne => "||--||",
        Cardinality::OneToMany => "||--o{",
        Cardinality::ManyToMany => "}o--o{",
        Cardinality::Unknown => "||--||",
    }
}

/// Architecture arrow, labelled with the protocol or the kind's default label.
pub fn connection_arrow(kind: ConnectionKind, protocol: Option<&str>) -> String {
    let protocol = protocol.map(str::trim).filter(|p| !p.is_empty());
    let (dashed, fallback) = match kind {
        ConnectionKind::Async => (true, "async"),
        ConnectionKind::Database => (false, "DB"),
        ConnectionKind::Cache => (false, "cache"),
        ConnectionKind::Sync => (false, "sync"),
        ConnectionKind::Stream | ConnectionKind::Unknown => return "-->".to_string(),
    };
    let label = escape_label(protocol.unwrap_or(fallback));
    if dashed {
        format!("-.->|\"{}\"|", label)
    } else {
        format!("-->|\"{}\"|", label)
    }
}

/// Architecture node declaration: `<id><open>"<name>"<close>`.
pub fn module_node(kind: ModuleKind, id: &str, name: &str) -> String {
    let (open, close) = match kind {
        ModuleKind::Database => ("[(", ")]"),
        ModuleKind::Cache => ("{", "}"),
        ModuleKind::Queue => ("{{", "}}"),
        ModuleKind::Frontend => ("(", ")"),
        ModuleKind::Gateway => (">", "]"),
        ModuleKind::Service
        | ModuleKind::Backend
        | ModuleKind::Compute
        | ModuleKind::Storage
        | ModuleKind::Stream
        | ModuleKind::Broker
        | ModuleKind::Other => ("[", "]"),
    };
    format!("{}{}\"{}\"{}", id, open, escape_label(name), close)
}

/// Knowledge-graph node declaration.
pub fn knowledge_node(kind: KnowledgeNodeKind, id: &str, label: &str) -> String {
    let (open, close) = match kind {
        KnowledgeNodeKind::Entity => ("[", "]"),
        KnowledgeNodeKind::Attribute => ("(", ")"),
        KnowledgeNodeKind::Concept => ("{{", "}}"),
        KnowledgeNodeKind::Event => (">", "]"),
    };
    format!("{}{}\"{}\"{}", id, open, escape_label(label), close)
}

/// Member prefix for class-diagram attributes: explicit visibility first,
/// then `required`.
pub fn attribute_glyph(required: bool, visibility: Option<Visibility>) -> char {
    match visibility {
        Some(v) => visibility_glyph(v),
        None if required => '+',
        None => '-',
    }
}

pub fn visibility_glyph(visibility: Visibility) -> char {
    match visibility {
        Visibility::Public => '+',
        Visibility::Private => '-',
        Visibility::Protected => '#',
    }
}

/// Double quotes end a Mermaid label early; swap them for the entity form.
pub fn escape_label(text: &str) -> String {
    text.replace('"', "#quot;")
}
