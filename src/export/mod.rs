//! Export functionality for analysis results.
//!
//! This module provides exporters for writing a dependency order in
//! various formats: plain text, JSON, CSV, and Markdown. It also holds the
//! depth-first graph dump used for manual inspection.

pub mod csv;
pub mod json;
pub mod markdown;
pub mod text;

use crate::analysis::{DependencyOrder, Diagnostic};
use crate::reference::{DependencyRef, NodeKind};
use std::io::{self, Write};

pub use text::dump_graph;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Plain text - one `<NodeKind>: <Name>` line per node
    #[default]
    Text,
    /// JSON format - machine-readable, full data
    Json,
    /// CSV format - spreadsheet-friendly
    Csv,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: text, json, csv, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Text => write!(f, "text"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// One node of the reported order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub kind: NodeKind,
    pub name: String,
    /// Owning module, for module, directory and project nodes.
    pub module: Option<String>,
    pub level: usize,
    /// Display names of the direct dependencies, in first-seen order.
    pub dependencies: Vec<String>,
    pub resolved: bool,
}

/// Data container for export operations.
///
/// Holds everything an exporter writes, flattened out of a
/// [`DependencyOrder`].
#[derive(Debug, Clone)]
pub struct ExportData {
    /// Reported nodes in dependency order
    pub entries: Vec<ExportEntry>,
    /// Warnings collected during analysis
    pub diagnostics: Vec<Diagnostic>,
    /// Number of modules seen
    pub module_count: usize,
}

impl ExportData {
    /// Create export data from an analysis result.
    pub fn new(order: &DependencyOrder) -> Self {
        let levels = order.levels();
        let entries = order
            .order
            .iter()
            .filter_map(|key| order.graph.get_node(key).map(|node| (key, node)))
            .map(|(key, node)| ExportEntry {
                kind: node.kind(),
                name: node.name().to_string(),
                module: match node {
                    DependencyRef::Module(m) => Some(m.name().to_string()),
                    DependencyRef::Directory(d) => Some(d.name().to_string()),
                    DependencyRef::VisualStudioProject(p) => Some(p.module().to_string()),
                    _ => None,
                },
                level: levels.get(key).copied().unwrap_or(0),
                dependencies: order
                    .graph
                    .get_dependencies(key)
                    .into_iter()
                    .map(|d| d.name().to_string())
                    .collect(),
                resolved: node.is_resolved(),
            })
            .collect();

        Self {
            entries,
            diagnostics: order.diagnostics.clone(),
            module_count: order.modules.len(),
        }
    }

    /// Count of reported project nodes
    pub fn project_count(&self) -> usize {
        self.count_of(NodeKind::VisualStudioProject)
    }

    /// Count of reported nodes of one kind
    pub fn count_of(&self, kind: NodeKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Unresolved-reference warnings
    pub fn unresolved(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics
            .iter()
            .filter(|d| d.is_unresolved_reference())
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Text => text::TextExporter.export(data, writer),
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Csv => csv::CsvExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::path::PathBuf;

    /// Core <- Web, plus a dangling reference from Web.
    pub fn sample_data() -> ExportData {
        ExportData {
            entries: vec![
                ExportEntry {
                    kind: NodeKind::VisualStudioProject,
                    name: "Core".to_string(),
                    module: Some("Libraries".to_string()),
                    level: 0,
                    dependencies: Vec::new(),
                    resolved: true,
                },
                ExportEntry {
                    kind: NodeKind::ProjectRef,
                    name: "Gone".to_string(),
                    module: None,
                    level: 0,
                    dependencies: Vec::new(),
                    resolved: false,
                },
                ExportEntry {
                    kind: NodeKind::VisualStudioProject,
                    name: "Web".to_string(),
                    module: Some("Apps".to_string()),
                    level: 1,
                    dependencies: vec!["Core".to_string(), "Gone".to_string()],
                    resolved: true,
                },
            ],
            diagnostics: vec![
                Diagnostic::UnresolvedReference {
                    from: "Web".to_string(),
                    target: "..\\Gone\\Gone.csproj".to_string(),
                },
                Diagnostic::SkippedFile {
                    path: PathBuf::from("Apps/Broken/Broken.csproj"),
                    reason: "Failed to parse XML".to_string(),
                },
            ],
            module_count: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{get_dependency_order, AnalysisContext};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(
            "markdown".parse::<ExportFormat>().unwrap(),
            ExportFormat::Markdown
        );
        assert_eq!(
            "md".parse::<ExportFormat>().unwrap(),
            ExportFormat::Markdown
        );
        assert!("invalid".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_format_display() {
        assert_eq!(format!("{}", ExportFormat::Text), "text");
        assert_eq!(format!("{}", ExportFormat::Json), "json");
        assert_eq!(format!("{}", ExportFormat::Csv), "csv");
        assert_eq!(format!("{}", ExportFormat::Markdown), "markdown");
    }

    #[test]
    fn test_export_data_from_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Main/Lib")).unwrap();
        fs::create_dir_all(root.join("Main/App")).unwrap();
        fs::write(root.join("Main/Lib/Lib.csproj"), "<Project />").unwrap();
        fs::write(
            root.join("Main/App/App.csproj"),
            r#"<Project><ItemGroup><ProjectReference Include="..\Lib\Lib.csproj" /></ItemGroup></Project>"#,
        )
        .unwrap();

        let order = get_dependency_order(&AnalysisContext::new(root)).unwrap();
        let data = ExportData::new(&order);

        assert_eq!(data.project_count(), 2);
        assert_eq!(data.module_count, 1);

        let app = data.entries.iter().find(|e| e.name == "App").unwrap();
        let lib = data.entries.iter().find(|e| e.name == "Lib").unwrap();
        assert_eq!(app.dependencies, vec!["Lib"]);
        assert_eq!(app.module.as_deref(), Some("Main"));
        assert_eq!(app.level, lib.level + 1);
    }

    #[test]
    fn test_export_to_string_dispatches() {
        let data = fixtures::sample_data();
        let text = export_to_string(ExportFormat::Text, &data).unwrap();
        assert!(text.starts_with("VisualStudioProject: Core\n"));

        let json = export_to_string(ExportFormat::Json, &data).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
    }
}
