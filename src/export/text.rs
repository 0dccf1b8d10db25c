//! Plain text export and graph dump.

use super::{ExportData, Exporter};
use crate::graph::DependencyGraph;
use crate::reference::TextVisitor;
use std::io::{self, Write};

/// Text exporter implementation.
///
/// Writes the reported order, one `<NodeKind>: <Name>` line per node.
pub struct TextExporter;

impl Exporter for TextExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        for entry in &data.entries {
            writeln!(writer, "{}: {}", entry.kind, entry.name)?;
        }
        Ok(())
    }
}

/// Dumps the whole graph depth-first, one `<NodeKind>: <Name>` line per
/// node. Every node is written once, before its dependencies.
///
/// With `indented`, each line is indented by its depth below the node the
/// walk started from.
pub fn dump_graph<W: Write>(graph: &DependencyGraph, writer: W, indented: bool) -> io::Result<W> {
    let mut visitor = if indented {
        TextVisitor::indented(writer)
    } else {
        TextVisitor::new(writer)
    };
    graph.traverse_all(&mut visitor)?;
    Ok(visitor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_data;
    use crate::reference::{AssemblyRef, ModuleRef};

    #[test]
    fn test_text_export() {
        let mut output = Vec::new();
        TextExporter.export(&sample_data(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "VisualStudioProject: Core",
                "ProjectRef: Gone",
                "VisualStudioProject: Web"
            ]
        );
    }

    #[test]
    fn test_dump_graph_depth_first() {
        let mut graph = DependencyGraph::new();
        graph.add_edge(ModuleRef::new("Apps"), ModuleRef::new("Libraries"));
        graph.add_edge(ModuleRef::new("Libraries"), AssemblyRef::new("System.Xml"));
        graph.add_edge(ModuleRef::new("Apps"), AssemblyRef::new("System.Xml"));

        let out = dump_graph(&graph, Vec::new(), false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ModuleRef: Apps\nModuleRef: Libraries\nAssemblyRef: System.Xml\n"
        );

        let out = dump_graph(&graph, Vec::new(), true).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ModuleRef: Apps\n  ModuleRef: Libraries\n    AssemblyRef: System.Xml\n"
        );
    }
}
