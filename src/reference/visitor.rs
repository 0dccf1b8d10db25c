//! Visitor-style traversal sinks.
//!
//! The walk itself lives on [`crate::graph::DependencyGraph::traverse`];
//! this module defines what happens at each node.

use std::io::{self, Write};

use super::types::DependencyRef;

/// Receives each node of a depth-first traversal exactly once.
pub trait Visitor {
    /// Called for a node before its dependencies. `depth` is the distance
    /// from the traversal start.
    fn visit(&mut self, node: &DependencyRef, depth: usize) -> io::Result<()>;
}

/// Writes one `"<NodeKind>: <Name>"` line per visited node.
///
/// # Example
///
/// ```rust
/// use buildseq::reference::{AssemblyRef, DependencyRef, TextVisitor, Visitor};
///
/// let mut out = Vec::new();
/// let mut visitor = TextVisitor::new(&mut out);
/// visitor.visit(&DependencyRef::from(AssemblyRef::new("System.Xml")), 0).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "AssemblyRef: System.Xml\n");
/// ```
pub struct TextVisitor<W: Write> {
    writer: W,
    indent: bool,
}

impl<W: Write> TextVisitor<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            indent: false,
        }
    }

    /// Prefixes each line with two spaces per depth level.
    pub fn indented(writer: W) -> Self {
        Self {
            writer,
            indent: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Visitor for TextVisitor<W> {
    fn visit(&mut self, node: &DependencyRef, depth: usize) -> io::Result<()> {
        if self.indent {
            write!(self.writer, "{:width$}", "", width = depth * 2)?;
        }
        writeln!(self.writer, "{}", node)
    }
}

/// Collects visited nodes' display lines, mostly useful in tests.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    pub lines: Vec<String>,
}

impl Visitor for CollectingVisitor {
    fn visit(&mut self, node: &DependencyRef, _depth: usize) -> io::Result<()> {
        self.lines.push(node.to_string());
        Ok(())
    }
}
