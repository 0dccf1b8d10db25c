//! Build sequencing.
//!
//! Groups the projects of an analysis into levels that can each be built in
//! parallel, and writes the result as an MSBuild project for the build
//! runtime to execute. Nothing is executed here.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use buildseq::analysis::{get_dependency_order, AnalysisContext};
//! use buildseq::sequencer::{sequence, write_plan_file, RelationshipProcessing, SequenceOptions};
//!
//! let order = get_dependency_order(&AnalysisContext::new("src"))?;
//! let options = SequenceOptions::default()
//!     .with_modules(["Services"])
//!     .with_relationship(RelationshipProcessing::Downstream);
//!
//! let plan = sequence(&order, &options)?;
//! write_plan_file(Path::new("build.proj"), &plan, &options)?;
//! ```

pub mod msbuild;
pub mod options;
pub mod plan;

pub use msbuild::{write_plan_file, MsBuildWriter};
pub use options::{ComboBuildType, RelationshipProcessing, SequenceOptions};
pub use plan::{sequence, BuildLevel, BuildPlan, PlannedProject, SequenceError, SequenceResult};
