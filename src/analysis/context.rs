//! Analysis context and diagnostics.
//!
//! Everything an analysis run needs is carried by an explicit
//! [`AnalysisContext`] passed down the call chain.

use std::fmt;
use std::path::{Path, PathBuf};

/// Directory names never descended into during discovery.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    "bin",
    "obj",
    "packages",
    ".git",
    ".vs",
    "node_modules",
    "TestResults",
];

/// What to do when a project file or manifest fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Abort the whole analysis.
    #[default]
    FailFast,
    /// Log, record a diagnostic and continue without the file.
    SkipInvalid,
}

/// What to do when a project reference cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Keep the dangling edge and report a warning.
    #[default]
    Warn,
    /// Fail the analysis.
    Strict,
}

/// Inputs and policies of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    /// Source roots scanned recursively.
    pub roots: Vec<PathBuf>,
    /// Explicit project or manifest files, in addition to the roots.
    pub files: Vec<PathBuf>,
    pub parse_policy: ParsePolicy,
    pub unresolved_policy: UnresolvedPolicy,
    /// Keep `ModuleRef` and `DirectoryNode` entries in the returned order.
    pub include_directories: bool,
    /// Keep `AssemblyRef` and dangling `ProjectRef` entries in the returned
    /// order.
    pub include_references: bool,
    /// Module names to report on (case-insensitive). Empty means all.
    pub scope: Vec<String>,
    /// Directory names skipped during discovery (case-insensitive).
    pub ignored_dirs: Vec<String>,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            files: Vec::new(),
            parse_policy: ParsePolicy::default(),
            unresolved_policy: UnresolvedPolicy::default(),
            include_directories: true,
            include_references: true,
            scope: Vec::new(),
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl AnalysisContext {
    /// Creates a context scanning a single root.
    ///
    /// # Example
    ///
    /// ```rust
    /// use buildseq::analysis::{AnalysisContext, ParsePolicy};
    ///
    /// let ctx = AnalysisContext::new("src")
    ///     .with_parse_policy(ParsePolicy::SkipInvalid)
    ///     .with_scope(["Services"]);
    ///
    /// assert!(ctx.in_scope("services"));
    /// assert!(!ctx.in_scope("Web"));
    /// ```
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
            ..Self::default()
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.files.push(file.into());
        self
    }

    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }

    pub fn with_unresolved_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.unresolved_policy = policy;
        self
    }

    pub fn with_scope<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = modules.into_iter().map(Into::into).collect();
        self
    }

    /// Drops module and directory nodes from the returned order.
    pub fn without_directories(mut self) -> Self {
        self.include_directories = false;
        self
    }

    /// Drops assembly and dangling project references from the returned
    /// order.
    pub fn without_references(mut self) -> Self {
        self.include_references = false;
        self
    }

    /// True if `module` is within the requested scope.
    pub fn in_scope(&self, module: &str) -> bool {
        self.scope.is_empty() || self.scope.iter().any(|m| m.eq_ignore_ascii_case(module))
    }

    /// True if a directory with this name is skipped during discovery.
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs
            .iter()
            .any(|d| d.eq_ignore_ascii_case(name))
    }
}

/// A non-fatal condition found during analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A project reference matched no loaded project and stays dangling.
    UnresolvedReference { from: String, target: String },
    /// Two projects declare the same GUID; the later one is keyed by its
    /// module-qualified name instead.
    DuplicateProjectGuid {
        guid: String,
        first: PathBuf,
        second: PathBuf,
    },
    /// Two projects ended up with the same identity; the later one was
    /// dropped.
    DuplicateProject { key: String, first: PathBuf, second: PathBuf },
    /// A manifest references a module that was not found under any root;
    /// its `ModuleRef` stays a leaf.
    MissingModule { module: String, referenced: String },
    /// A file failed to parse and was skipped.
    SkippedFile { path: PathBuf, reason: String },
}

impl Diagnostic {
    pub fn label(&self) -> &'static str {
        match self {
            Diagnostic::UnresolvedReference { .. } => "unresolved-reference",
            Diagnostic::DuplicateProjectGuid { .. } => "duplicate-guid",
            Diagnostic::DuplicateProject { .. } => "duplicate-project",
            Diagnostic::MissingModule { .. } => "missing-module",
            Diagnostic::SkippedFile { .. } => "skipped-file",
        }
    }

    pub fn is_unresolved_reference(&self) -> bool {
        matches!(self, Diagnostic::UnresolvedReference { .. })
    }
}

fn show(path: &Path) -> String {
    path.display().to_string()
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedReference { from, target } => {
                write!(f, "{} references {} which was not found", from, target)
            }
            Diagnostic::DuplicateProjectGuid {
                guid,
                first,
                second,
            } => write!(
                f,
                "project GUID {} is used by both {} and {}",
                guid,
                show(first),
                show(second)
            ),
            Diagnostic::DuplicateProject { key, first, second } => write!(
                f,
                "{} and {} share the identity {}; the latter was ignored",
                show(first),
                show(second),
                key
            ),
            Diagnostic::MissingModule { module, referenced } => write!(
                f,
                "module {} references module {} which was not found",
                module, referenced
            ),
            Diagnostic::SkippedFile { path, reason } => {
                write!(f, "skipped {}: {}", show(path), reason)
            }
        }
    }
}
