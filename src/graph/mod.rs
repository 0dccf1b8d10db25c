//! Graph module for build-order modeling.
//!
//! This module provides the [`DependencyGraph`] struct: a directed graph of
//! [`DependencyRef`](crate::reference::DependencyRef) vertices with a
//! deterministic topological sort.
//!
//! # Example
//!
//! ```rust
//! use buildseq::graph::DependencyGraph;
//! use buildseq::reference::{AssemblyRef, ModuleRef};
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_edge(ModuleRef::new("Services"), ModuleRef::new("Libraries"));
//! graph.add_edge(ModuleRef::new("Services"), AssemblyRef::new("System.Xml"));
//!
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.edge_count(), 2);
//! ```

mod dependency_graph;

pub use dependency_graph::{CycleInfo, DependencyGraph, GraphError, GraphResult};
