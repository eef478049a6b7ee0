//! Mermaid generators.
//!
//! Each generator is a pure function of its model: identical input yields
//! byte-identical output. Relationships whose endpoints cannot be resolved are
//! left out of the diagram and reported as [`Warning`]s instead.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::model::{
    ActorKind, ArchitectureLayout, ArchitectureModule, Attribute, KnowledgeGraphNode, Method,
};
use crate::notation;
use crate::{ArchitectureContent, DocumentContent, DomainModelContent, ErContent, UseCaseContent};

const INDENT: &str = "    ";

const USE_CASE_CLASS_DEFS: [&str; 3] = [
    "classDef actor fill:#e1f5fe,stroke:#01579b,stroke-width:2px",
    "classDef usecase fill:#f3e5f5,stroke:#4a148c,stroke-width:2px",
    "classDef system fill:#fff3e0,stroke:#e65100,stroke-width:2px",
];

const PLACEHOLDER_NODE: &str = "empty[\"No modules defined\"]";
const PLACEHOLDER_STYLE: &str = "style empty fill:#fafafa,stroke:#999,stroke-dasharray: 5 5";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    Relationship,
    Connection,
    LayerMember,
    KnowledgeEdge,
    /// A module listed by more than one layer; only its first layer draws it.
    DuplicateLayerMember,
}

/// A reference the generator could not resolve and therefore left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    /// The relationship, connection, layer or node the reference came from.
    pub owner: String,
    /// The id that did not resolve.
    pub missing: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            WarningKind::Relationship => "relationship",
            WarningKind::Connection => "connection",
            WarningKind::LayerMember => "layer",
            WarningKind::KnowledgeEdge => "knowledge node",
            WarningKind::DuplicateLayerMember => {
                return write!(
                    f,
                    "layer '{}' repeats module '{}' already drawn in an earlier layer",
                    self.owner, self.missing
                );
            }
        };
        write!(f, "{} '{}' references unknown id '{}'", what, self.owner, self.missing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub code: String,
    pub warnings: Vec<Warning>,
}

impl Rendered {
    fn new(header: &str) -> Self {
        Self {
            code: format!("{}\n", header),
            warnings: Vec::new(),
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.code.push_str(INDENT);
        }
        self.code.push_str(text);
        self.code.push('\n');
    }

    fn blank(&mut self) {
        self.code.push('\n');
    }

    fn drop_reference(&mut self, kind: WarningKind, owner: &str, missing: &str) {
        debug!(owner, missing, "dropping unresolved reference");
        self.warnings.push(Warning {
            kind,
            owner: owner.to_string(),
            missing: missing.to_string(),
        });
    }
}

/// Render any document content with its default view.
pub fn render(content: &DocumentContent) -> Rendered {
    let rendered = match content {
        DocumentContent::UseCase(c) => use_case_graph(c),
        DocumentContent::DomainModel(c) => class_diagram(c),
        DocumentContent::EntityRelationship(c) => er_diagram(c),
        DocumentContent::Architecture(c) => architecture_graph(c),
    };
    debug!(
        kind = %content.kind(),
        bytes = rendered.code.len(),
        warnings = rendered.warnings.len(),
        "rendered diagram"
    );
    rendered
}

/// Render document content, discarding warnings.
pub fn generate(content: &DocumentContent) -> String {
    render(content).code
}

// --- Class diagram ---

pub fn class_diagram(model: &DomainModelContent) -> Rendered {
    let mut out = Rendered::new("classDiagram");

    for entity in &model.entities {
        out.line(1, &format!("class {} {{", entity.name));
        for attr in &entity.attributes {
            out.line(2, &attribute_member(attr));
        }
        for method in &entity.methods {
            out.line(2, &method_member(method));
        }
        out.line(1, "}");
        if entity.is_aggregate_root {
            out.line(1, &format!("{} : <<AggregateRoot>>", entity.name));
        }
    }

    for vo in &model.value_objects {
        out.line(1, &format!("class {} {{", vo.name));
        out.line(2, "<<ValueObject>>");
        for attr in &vo.attributes {
            out.line(2, &attribute_member(attr));
        }
        out.line(1, "}");
    }

    let names: HashMap<&str, &str> = model
        .entities
        .iter()
        .map(|e| (e.id.as_str(), e.name.as_str()))
        .chain(model.value_objects.iter().map(|v| (v.id.as_str(), v.name.as_str())))
        .collect();

    for rel in &model.relationships {
        let Some(source) = resolve(&names, &rel.source, &rel.id, WarningKind::Relationship, &mut out)
        else {
            continue;
        };
        let Some(target) = resolve(&names, &rel.target, &rel.id, WarningKind::Relationship, &mut out)
        else {
            continue;
        };
        let mut line = format!("{} {} {}", source, notation::class_arrow(rel.kind), target);
        if let Some(cardinality) = non_empty(rel.cardinality.as_deref()) {
            line.push_str(" : ");
            line.push_str(cardinality);
        }
        if let Some(label) = non_empty(rel.label.as_deref()) {
            line.push_str(" : ");
            line.push_str(label);
        }
        out.line(1, &line);
    }

    out
}

fn attribute_member(attr: &Attribute) -> String {
    format!(
        "{}{} {}",
        notation::attribute_glyph(attr.required, attr.visibility),
        attr.data_type,
        attr.name
    )
}

fn method_member(method: &Method) -> String {
    let glyph = method
        .visibility
        .map(notation::visibility_glyph)
        .unwrap_or('+');
    let params = method
        .parameters
        .iter()
        .map(|p| format!("{}:{}", p.name, p.data_type))
        .collect::<Vec<_>>()
        .join(",");
    if method.return_type.is_empty() {
        format!("{}{}({})", glyph, method.name, params)
    } else {
        format!("{}{}({}) {}", glyph, method.name, params, method.return_type)
    }
}

// --- Use-case flow graph ---

pub fn use_case_graph(model: &UseCaseContent) -> Rendered {
    let mut out = Rendered::new("graph TD");
    for def in USE_CASE_CLASS_DEFS {
        out.line(1, def);
    }

    if !model.actors.is_empty() {
        out.blank();
    }
    for actor in &model.actors {
        let name = notation::escape_label(&actor.name);
        let (node, class) = match actor.kind {
            ActorKind::System => (format!("{}[\" \"]", actor.id), "system"),
            ActorKind::Primary | ActorKind::Secondary => {
                (format!("{}[\"👤\"]", actor.id), "actor")
            }
        };
        out.line(1, &node);
        out.line(1, &format!("{} --- {}_label[\"{}\"]", actor.id, actor.id, name));
        out.line(1, &format!("class {} {}", actor.id, class));
        out.line(1, &format!("class {}_label {}", actor.id, class));
    }

    if !model.use_cases.is_empty() {
        out.blank();
    }
    for uc in &model.use_cases {
        out.line(1, &format!("{}((\"{}\"))", uc.id, notation::escape_label(&uc.name)));
        out.line(1, &format!("class {} usecase", uc.id));
    }

    let known: HashMap<&str, &str> = model
        .actors
        .iter()
        .map(|a| (a.id.as_str(), a.id.as_str()))
        .chain(model.use_cases.iter().map(|u| (u.id.as_str(), u.id.as_str())))
        .collect();

    let mut edges = Vec::new();
    for rel in &model.relationships {
        let Some(source) = resolve(&known, &rel.source, &rel.id, WarningKind::Relationship, &mut out)
        else {
            continue;
        };
        let Some(target) = resolve(&known, &rel.target, &rel.id, WarningKind::Relationship, &mut out)
        else {
            continue;
        };
        edges.push(format!("{} {} {}", source, notation::use_case_arrow(rel.kind), target));
    }
    if !edges.is_empty() {
        out.blank();
    }
    for edge in &edges {
        out.line(1, edge);
    }

    out
}

// --- Entity-relationship diagram ---

pub fn er_diagram(model: &ErContent) -> Rendered {
    let mut out = Rendered::new("erDiagram");

    for entity in &model.entities {
        out.line(1, &format!("{} {{", entity.name));
        for field in &entity.fields {
            let data_type = match field.length {
                Some(len) => format!("{}({})", field.data_type, len),
                None => field.data_type.clone(),
            };
            let mut constraints = Vec::new();
            if field.primary_key {
                constraints.push("PK");
            }
            if field.unique && !field.primary_key {
                constraints.push("UK");
            }
            if !field.nullable {
                constraints.push("NOT NULL");
            }
            if constraints.is_empty() {
                out.line(2, &format!("{} {}", data_type, field.name));
            } else {
                out.line(
                    2,
                    &format!("{} {} \"{}\"", data_type, field.name, constraints.join(",")),
                );
            }
        }
        out.line(1, "}");
    }

    let names: HashMap<&str, &str> = model
        .entities
        .iter()
        .map(|e| (e.id.as_str(), e.name.as_str()))
        .collect();

    for rel in &model.relationships {
        let owner = if rel.id.is_empty() { rel.name.as_str() } else { rel.id.as_str() };
        let Some(source) = resolve(&names, &rel.source_entity, owner, WarningKind::Relationship, &mut out)
        else {
            continue;
        };
        let Some(target) = resolve(&names, &rel.target_entity, owner, WarningKind::Relationship, &mut out)
        else {
            continue;
        };
        let label = if !rel.name.is_empty() {
            rel.name.clone()
        } else if !rel.source_field.is_empty() || !rel.target_field.is_empty() {
            format!("{}:{}", rel.source_field, rel.target_field)
        } else {
            rel.kind.as_str().to_string()
        };
        out.line(
            1,
            &format!(
                "{} {} {} : \"{}\"",
                source,
                notation::er_cardinality(rel.kind),
                target,
                notation::escape_label(&label)
            ),
        );
    }

    out
}

// --- Architecture graph ---

pub fn architecture_graph(model: &ArchitectureContent) -> Rendered {
    match model.layout() {
        ArchitectureLayout::Flat => flat_architecture(model),
        ArchitectureLayout::Layered => layered_architecture(model),
    }
}

fn flat_architecture(model: &ArchitectureContent) -> Rendered {
    let mut out = Rendered::new("graph TD");
    if model.modules.is_empty() {
        placeholder(&mut out);
        return out;
    }
    for module in &model.modules {
        module_lines(&mut out, 1, module);
    }
    connection_lines(&mut out, model);
    out
}

fn layered_architecture(model: &ArchitectureContent) -> Rendered {
    let mut out = Rendered::new("graph TD");
    if model.layers.is_empty() {
        placeholder(&mut out);
        return out;
    }

    let modules: HashMap<&str, &ArchitectureModule> =
        model.modules.iter().map(|m| (m.id.as_str(), m)).collect();

    // `sort_by_key` is stable, so equal orders keep their input order.
    let mut layers: Vec<_> = model.layers.iter().collect();
    layers.sort_by_key(|l| l.order);

    let mut placed: Vec<&str> = Vec::new();
    for (index, layer) in layers.iter().enumerate() {
        out.line(
            1,
            &format!("subgraph L{}[\"{}\"]", index, notation::escape_label(&layer.name)),
        );
        out.line(2, "direction LR");
        for member in &layer.modules {
            match modules.get(member.as_str()) {
                Some(module) if placed.contains(&module.id.as_str()) => {
                    debug!(layer = %layer.name, member, "skipping module already placed");
                    out.warnings.push(Warning {
                        kind: WarningKind::DuplicateLayerMember,
                        owner: layer.name.clone(),
                        missing: member.clone(),
                    });
                }
                Some(module) => {
                    module_lines(&mut out, 2, module);
                    placed.push(module.id.as_str());
                }
                None => out.drop_reference(WarningKind::LayerMember, &layer.name, member),
            }
        }
        out.line(1, "end");
    }

    for module in model.modules.iter().filter(|m| !placed.contains(&m.id.as_str())) {
        module_lines(&mut out, 1, module);
    }

    connection_lines(&mut out, model);
    out
}

fn module_lines(out: &mut Rendered, depth: usize, module: &ArchitectureModule) {
    out.line(depth, &notation::module_node(module.kind, &module.id, &module.name));
    if let Some(color) = non_empty(module.color.as_deref()) {
        out.line(
            depth,
            &format!("style {} fill:{},stroke:#333,stroke-width:2px", module.id, color),
        );
    }
}

fn connection_lines(out: &mut Rendered, model: &ArchitectureContent) {
    let known: HashMap<&str, &str> = model
        .modules
        .iter()
        .map(|m| (m.id.as_str(), m.id.as_str()))
        .collect();
    for conn in &model.connections {
        let owner = if conn.id.is_empty() {
            format!("{}->{}", conn.source_module, conn.target_module)
        } else {
            conn.id.clone()
        };
        let Some(source) = resolve(&known, &conn.source_module, &owner, WarningKind::Connection, out)
        else {
            continue;
        };
        let Some(target) = resolve(&known, &conn.target_module, &owner, WarningKind::Connection, out)
        else {
            continue;
        };
        let arrow = notation::connection_arrow(conn.kind, conn.protocol.as_deref());
        out.line(1, &format!("{} {} {}", source, arrow, target));
    }
}

fn placeholder(out: &mut Rendered) {
    out.line(1, PLACEHOLDER_NODE);
    out.line(1, PLACEHOLDER_STYLE);
}

// --- Knowledge graph ---

pub fn knowledge_graph(nodes: &[KnowledgeGraphNode]) -> Rendered {
    let mut out = Rendered::new("graph LR");
    for node in nodes {
        out.line(1, &notation::knowledge_node(node.kind, &node.id, &node.label));
    }
    let known: HashMap<&str, &str> = nodes.iter().map(|n| (n.id.as_str(), n.id.as_str())).collect();
    for node in nodes {
        for conn in &node.connections {
            let Some(target) = resolve(&known, &conn.target, &node.id, WarningKind::KnowledgeEdge, &mut out)
            else {
                continue;
            };
            let weight = conn.weight.clamp(0.0, 1.0);
            out.line(
                1,
                &format!(
                    "{} -->|\"{} ({:.2})\"| {}",
                    node.id,
                    notation::escape_label(&conn.relationship),
                    weight,
                    target
                ),
            );
        }
    }
    out
}

// --- Helpers ---

fn resolve<'a>(
    names: &HashMap<&str, &'a str>,
    id: &str,
    owner: &str,
    kind: WarningKind,
    out: &mut Rendered,
) -> Option<&'a str> {
    match names.get(id) {
        Some(name) => Some(*name),
        None => {
            out.drop_reference(kind, owner, id);
            None
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}
