use std::str::FromStr;

use crate::error::{Error, Result};
use crate::Document;

/// Text exports. Raster and vector images are produced by the renderer, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Mermaid,
    Markdown,
    Json,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mermaid" | "mmd" => Ok(ExportFormat::Mermaid),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "json" => Ok(ExportFormat::Json),
            _ => Err(Error::UnsupportedExport {
                format: s.to_string(),
            }),
        }
    }
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Mermaid => "mmd",
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }
}

pub fn export(doc: &Document, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Mermaid => Ok(doc.diagram.clone()),
        ExportFormat::Markdown => {
            let mut out = String::with_capacity(doc.diagram.len() + 64);
            out.push_str("# ");
            out.push_str(&doc.title);
            out.push_str("\n\n```mermaid\n");
            out.push_str(&doc.diagram);
            if !doc.diagram.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
            Ok(out)
        }
        ExportFormat::Json => Ok(serde_json::to_string_pretty(doc)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, DocumentContent, DocumentMetadata, ErContent};
    use chrono::{TimeZone, Utc};

    fn doc() -> Document {
        Document::new(
            "er-1".into(),
            "Schema".into(),
            DocumentContent::EntityRelationship(ErContent::default()),
            DocumentMetadata::new(Utc.timestamp_opt(0, 0).unwrap(), vec![], None),
        )
    }

    #[test]
    fn markdown_wraps_fenced_block() {
        let md = export(&doc(), ExportFormat::Markdown).unwrap();
        assert_eq!(md, "# Schema\n\n```mermaid\nerDiagram\n```\n");
    }

    #[test]
    fn json_round_trips() {
        let json = export(&doc(), "JSON".parse().unwrap()).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc());
    }

    #[test]
    fn images_are_not_exported_here() {
        assert!(matches!(
            "png".parse::<ExportFormat>(),
            Err(Error::UnsupportedExport { ref format }) if format == "png"
        ));
        assert_eq!(ExportFormat::Mermaid.extension(), "mmd");
    }
}
