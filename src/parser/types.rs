//! Shared types for project and manifest parsing.

use std::fmt;
use std::path::{Path, PathBuf};

/// Directory (relative to a module root) holding the dependency manifest.
pub const MANIFEST_DIR: &str = "Build";

/// File name of a module dependency manifest.
pub const MANIFEST_FILE: &str = "DependencyManifest.xml";

/// Project type GUID marking an ASP.NET web application.
pub const WEB_APPLICATION_TYPE_GUID: &str = "349c5851-65df-11da-9384-00065b846f21";

/// Project type GUID marking an ASP.NET web site.
pub const WEB_SITE_TYPE_GUID: &str = "e24c65dc-7377-472b-9aba-bc803b73c61a";

/// Kinds of project files recognized during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectFileKind {
    CSharp,
    VisualBasic,
    FSharp,
    Wix,
}

impl ProjectFileKind {
    /// Detects the project kind from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csproj" => Some(ProjectFileKind::CSharp),
            "vbproj" => Some(ProjectFileKind::VisualBasic),
            "fsproj" => Some(ProjectFileKind::FSharp),
            "wixproj" => Some(ProjectFileKind::Wix),
            _ => None,
        }
    }

    /// Detects the project kind of a path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for ProjectFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectFileKind::CSharp => "csproj",
            ProjectFileKind::VisualBasic => "vbproj",
            ProjectFileKind::FSharp => "fsproj",
            ProjectFileKind::Wix => "wixproj",
        };
        write!(f, "{}", s)
    }
}

/// Returns true if `path` ends in `Build/DependencyManifest.xml`.
pub fn is_manifest_path(path: &Path) -> bool {
    let file_matches = path
        .file_name()
        .is_some_and(|f| f.to_string_lossy().eq_ignore_ascii_case(MANIFEST_FILE));
    let dir_matches = path
        .parent()
        .and_then(|p| p.file_name())
        .is_some_and(|d| d.to_string_lossy().eq_ignore_ascii_case(MANIFEST_DIR));
    file_matches && dir_matches
}

/// A module descriptor loaded from its dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpertModule {
    /// Module name (the module directory name).
    pub name: String,
    /// Module root directory.
    pub path: PathBuf,
    /// Names of modules this module depends on, in manifest order.
    pub referenced_modules: Vec<String>,
}

impl ExpertModule {
    /// Creates a module with no references.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            referenced_modules: Vec::new(),
        }
    }

    /// Adds a referenced module unless an equal name (ignoring case) is
    /// already present. Returns true if it was added.
    pub fn add_reference(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty()
            || name.eq_ignore_ascii_case(&self.name)
            || self
                .referenced_modules
                .iter()
                .any(|m| m.eq_ignore_ascii_case(name))
        {
            return false;
        }
        self.referenced_modules.push(name.to_string());
        true
    }

    pub fn has_references(&self) -> bool {
        !self.referenced_modules.is_empty()
    }
}

impl fmt::Display for ExpertModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} referenced modules)",
            self.name,
            self.referenced_modules.len()
        )
    }
}
