//! Reference model for the dependency graph.
//!
//! Nodes are a closed set of kinds (modules, project references, assembly
//! references, directories and loaded projects) wrapped in
//! [`DependencyRef`]. Identity is the immutable [`NodeKey`], a
//! `(kind, case-folded name)` pair.
//!
//! # Example
//!
//! ```rust
//! use buildseq::reference::{AssemblyRef, DependencyRef, NodeKind};
//!
//! let a: DependencyRef = AssemblyRef::new("System.Core").into();
//! let b: DependencyRef = AssemblyRef::new("system.core").into();
//!
//! assert_eq!(a.kind(), NodeKind::AssemblyRef);
//! assert_eq!(a.key(), b.key());
//! ```

mod types;
mod visitor;

pub use types::{
    include_stem, normalize_guid, AssemblyRef, DependencyRef, DirectoryNode, ModuleRef, NodeKey,
    NodeKind, ProjectRef, ProjectReference, VisualStudioProject,
};
pub use visitor::{CollectingVisitor, TextVisitor, Visitor};
