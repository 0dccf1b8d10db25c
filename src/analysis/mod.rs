//! Dependency analysis for build ordering.
//!
//! This module turns a source tree into an ordered list of build nodes:
//!
//! - Discover project files and module manifests under the given roots
//! - Parse them in parallel
//! - Register modules, directories, projects and references in a
//!   [`DependencyGraph`](crate::graph::DependencyGraph)
//! - Resolve project references against the loaded projects
//! - Sort, and filter the result to the requested scope
//!
//! # Example
//!
//! ```ignore
//! use buildseq::analysis::{get_dependency_order, AnalysisContext, ParsePolicy};
//!
//! let ctx = AnalysisContext::new("src").with_parse_policy(ParsePolicy::SkipInvalid);
//! let order = get_dependency_order(&ctx)?;
//!
//! for node in order.nodes() {
//!     println!("{}", node);
//! }
//! for warning in &order.diagnostics {
//!     eprintln!("warning: {}", warning);
//! }
//! ```

pub mod context;
pub mod dependency_analyzer;
pub mod discovery;

pub use context::{AnalysisContext, Diagnostic, ParsePolicy, UnresolvedPolicy, DEFAULT_IGNORED_DIRS};
pub use dependency_analyzer::{get_dependency_order, AnalysisError, AnalysisResult, DependencyOrder};
pub use discovery::{discover, DiscoveredManifest, DiscoveredProject, Discovery, ModuleDir};
