//! Parser module for buildseq.
//!
//! This module reads the two input formats of the dependency analyzer:
//!
//! - **Project files** (`.csproj`, `.vbproj`, `.fsproj`, `.wixproj`) into
//!   [`VisualStudioProject`](crate::reference::VisualStudioProject) values
//! - **Dependency manifests** (`Build/DependencyManifest.xml`) into
//!   [`ExpertModule`] descriptors
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use buildseq::parser::{parse_project_file, parse_manifest_file};
//!
//! let project = parse_project_file(Path::new("Services/Billing/Billing.csproj"), "Services")?;
//! println!("{} -> {}", project.name(), project.assembly_name());
//!
//! let module = parse_manifest_file(
//!     Path::new("Services/Build/DependencyManifest.xml"),
//!     "Services",
//!     Path::new("Services"),
//! )?;
//! println!("{}", module);
//! ```

pub mod manifest;
pub mod project_file;
pub mod types;

pub use manifest::{parse_manifest_file, parse_manifest_str};
pub use project_file::{parse_project_file, parse_project_str, ParseError, ParseResult};
pub use types::{is_manifest_path, ExpertModule, ProjectFileKind, MANIFEST_DIR, MANIFEST_FILE};
