//! buildseq - build order sequencing for multi-module .NET source trees
//!
//! This crate discovers project files and module dependency manifests,
//! builds a dependency graph of modules, projects and assemblies, sorts it
//! deterministically and emits a leveled MSBuild plan for parallel builds.

pub mod analysis;
pub mod export;
pub mod graph;
pub mod logger;
pub mod parser;
pub mod reference;
pub mod sequencer;
