//! JSON export implementation.
//!
//! Exports the dependency order in JSON format for machine-readable output.

use super::{ExportData, Exporter};
use crate::analysis::Diagnostic;
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable node for JSON output.
#[derive(Serialize)]
struct JsonNode {
    kind: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    module: Option<String>,
    level: usize,
    dependencies: Vec<String>,
    resolved: bool,
}

/// Serializable unresolved reference for JSON output.
#[derive(Serialize)]
struct JsonUnresolved {
    from: String,
    target: String,
}

/// Serializable diagnostic for JSON output.
#[derive(Serialize)]
struct JsonDiagnostic {
    kind: String,
    message: String,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    nodes: usize,
    projects: usize,
    modules: usize,
    unresolved_references: usize,
    warnings: usize,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport {
    summary: JsonSummary,
    order: Vec<JsonNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unresolved: Vec<JsonUnresolved>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<JsonDiagnostic>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let order: Vec<JsonNode> = data
            .entries
            .iter()
            .map(|e| JsonNode {
                kind: e.kind.to_string(),
                name: e.name.clone(),
                module: e.module.clone(),
                level: e.level,
                dependencies: e.dependencies.clone(),
                resolved: e.resolved,
            })
            .collect();

        let unresolved: Vec<JsonUnresolved> = data
            .unresolved()
            .filter_map(|d| match d {
                Diagnostic::UnresolvedReference { from, target } => Some(JsonUnresolved {
                    from: from.clone(),
                    target: target.clone(),
                }),
                _ => None,
            })
            .collect();

        let diagnostics: Vec<JsonDiagnostic> = data
            .diagnostics
            .iter()
            .map(|d| JsonDiagnostic {
                kind: d.label().to_string(),
                message: d.to_string(),
            })
            .collect();

        let export = JsonExport {
            summary: JsonSummary {
                nodes: data.entries.len(),
                projects: data.project_count(),
                modules: data.module_count,
                unresolved_references: unresolved.len(),
                warnings: data.diagnostics.len(),
            },
            order,
            unresolved,
            diagnostics,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}
