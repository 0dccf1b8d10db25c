//! Markdown export implementation.
//!
//! Exports the dependency order in Markdown format for documentation and reporting.

use super::{ExportData, Exporter};
use crate::reference::NodeKind;
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

impl MarkdownExporter {
    /// Pipes would end a table cell early.
    fn cell(value: &str) -> String {
        value.replace('|', "\\|")
    }
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        // Title
        writeln!(writer, "# Build Order Report")?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Nodes | {} |", data.entries.len())?;
        writeln!(writer, "| Projects | {} |", data.project_count())?;
        writeln!(writer, "| Modules | {} |", data.module_count)?;
        writeln!(
            writer,
            "| Assembly References | {} |",
            data.count_of(NodeKind::AssemblyRef)
        )?;
        writeln!(
            writer,
            "| Unresolved References | {} |",
            data.unresolved().count()
        )?;
        writeln!(writer)?;

        // Order table
        writeln!(writer, "## Build Order")?;
        writeln!(writer)?;
        if data.entries.is_empty() {
            writeln!(writer, "No nodes to report.")?;
        } else {
            writeln!(writer, "| # | Kind | Name | Module | Level |")?;
            writeln!(writer, "|---|------|------|--------|-------|")?;
            for (i, entry) in data.entries.iter().enumerate() {
                let name = if entry.resolved {
                    Self::cell(&entry.name)
                } else {
                    format!("{} (unresolved)", Self::cell(&entry.name))
                };
                writeln!(
                    writer,
                    "| {} | {} | {} | {} | {} |",
                    i + 1,
                    entry.kind,
                    name,
                    Self::cell(entry.module.as_deref().unwrap_or("-")),
                    entry.level
                )?;
            }
        }
        writeln!(writer)?;

        // Warnings
        if !data.diagnostics.is_empty() {
            writeln!(writer, "## Warnings")?;
            writeln!(writer)?;
            for diagnostic in &data.diagnostics {
                writeln!(writer, "- **{}**: {}", diagnostic.label(), diagnostic)?;
            }
            writeln!(writer)?;
        }

        // Footer
        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by buildseq*")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_data;
    use crate::export::ExportData;

    fn render(data: &ExportData) -> String {
        let mut output = Vec::new();
        MarkdownExporter.export(data, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_markdown_export_summary() {
        let md = render(&sample_data());

        assert!(md.starts_with("# Build Order Report"));
        assert!(md.contains("| Projects | 2 |"));
        assert!(md.contains("| Unresolved References | 1 |"));
        assert!(md.contains("*Generated by buildseq*"));
    }

    #[test]
    fn test_markdown_export_order_table() {
        let md = render(&sample_data());

        assert!(md.contains("| 1 | VisualStudioProject | Core | Libraries | 0 |"));
        assert!(md.contains("| 2 | ProjectRef | Gone (unresolved) | - | 0 |"));
    }

    #[test]
    fn test_markdown_export_warnings() {
        let md = render(&sample_data());
        assert!(md.contains("## Warnings"));
        assert!(md.contains("- **unresolved-reference**: Web references"));

        let mut quiet = sample_data();
        quiet.diagnostics.clear();
        assert!(!render(&quiet).contains("## Warnings"));
    }

    #[test]
    fn test_markdown_empty_order() {
        let mut empty = sample_data();
        empty.entries.clear();
        assert!(render(&empty).contains("No nodes to report."));
    }
}
