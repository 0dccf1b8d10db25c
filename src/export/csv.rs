//! CSV export implementation.
//!
//! Exports the dependency order in CSV format for spreadsheet use.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or newlines.
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "kind,name,level,dependencies,unresolved")?;

        for entry in &data.entries {
            writeln!(
                writer,
                "{},{},{},{},{}",
                entry.kind.label(),
                Self::escape_field(&entry.name),
                entry.level,
                Self::escape_field(&entry.dependencies.join(";")),
                !entry.resolved
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_data;

    #[test]
    fn test_csv_export_basic() {
        let mut output = Vec::new();
        CsvExporter.export(&sample_data(), &mut output).unwrap();

        let csv_str = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = csv_str.lines().collect();

        // Header + 3 nodes
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "kind,name,level,dependencies,unresolved");
        assert_eq!(lines[1], "project,Core,0,,false");
        assert_eq!(lines[2], "project-ref,Gone,0,,true");
        assert!(lines[3].ends_with(",1,Core;Gone,false"));
    }

    #[test]
    fn test_csv_escape_field() {
        assert_eq!(CsvExporter::escape_field("simple"), "simple");
        assert_eq!(CsvExporter::escape_field("with,comma"), "\"with,comma\"");
        assert_eq!(
            CsvExporter::escape_field("with\"quote"),
            "\"with\"\"quote\""
        );
    }
}
