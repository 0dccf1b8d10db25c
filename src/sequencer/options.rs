//! Scope parameters of a build plan.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Which projects seed the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComboBuildType {
    /// Every project in the selected modules.
    #[default]
    All,
    /// Only projects whose directory contains a changed file.
    Changes,
}

impl FromStr for ComboBuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ComboBuildType::All),
            "changes" => Ok(ComboBuildType::Changes),
            _ => Err(format!(
                "Unknown build type: '{}'. Valid types: all, changes",
                s
            )),
        }
    }
}

impl fmt::Display for ComboBuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComboBuildType::All => write!(f, "all"),
            ComboBuildType::Changes => write!(f, "changes"),
        }
    }
}

/// How the seed set is widened along dependency edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationshipProcessing {
    /// Build the seed projects only.
    #[default]
    None,
    /// Also build every project that depends on a seed project.
    Downstream,
    /// Also build every project a seed project depends on.
    Upstream,
}

impl FromStr for RelationshipProcessing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(RelationshipProcessing::None),
            "downstream" | "dependents" => Ok(RelationshipProcessing::Downstream),
            "upstream" | "dependencies" => Ok(RelationshipProcessing::Upstream),
            _ => Err(format!(
                "Unknown relationship mode: '{}'. Valid modes: none, downstream, upstream",
                s
            )),
        }
    }
}

impl fmt::Display for RelationshipProcessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipProcessing::None => write!(f, "none"),
            RelationshipProcessing::Downstream => write!(f, "downstream"),
            RelationshipProcessing::Upstream => write!(f, "upstream"),
        }
    }
}

/// Parameters of one sequencing run.
///
/// # Example
///
/// ```rust
/// use buildseq::sequencer::{ComboBuildType, RelationshipProcessing, SequenceOptions};
///
/// let options = SequenceOptions::default()
///     .with_modules(["Services"])
///     .with_combo(ComboBuildType::Changes)
///     .with_changed_file("Services/Billing/Invoice.cs")
///     .with_relationship(RelationshipProcessing::Downstream);
///
/// assert!(options.in_scope("services"));
/// assert_eq!(options.configuration, "Release");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOptions {
    /// Modules whose projects seed the plan. Empty means all.
    pub modules: Vec<String>,
    pub combo: ComboBuildType,
    /// Files considered changed under [`ComboBuildType::Changes`]. They are
    /// matched against project directories as given, so they must share
    /// the base of the analysis roots.
    pub changed_files: Vec<PathBuf>,
    pub relationship: RelationshipProcessing,
    pub configuration: String,
    pub platform: String,
    /// MSBuild targets run on every project.
    pub targets: Vec<String>,
    pub stop_on_first_failure: bool,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            combo: ComboBuildType::default(),
            changed_files: Vec::new(),
            relationship: RelationshipProcessing::default(),
            configuration: "Release".to_string(),
            platform: "AnyCPU".to_string(),
            targets: vec!["Build".to_string()],
            stop_on_first_failure: true,
        }
    }
}

impl SequenceOptions {
    pub fn with_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules = modules.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_combo(mut self, combo: ComboBuildType) -> Self {
        self.combo = combo;
        self
    }

    pub fn with_changed_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.changed_files.push(path.into());
        self
    }

    pub fn with_relationship(mut self, relationship: RelationshipProcessing) -> Self {
        self.relationship = relationship;
        self
    }

    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = configuration.into();
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stop_on_first_failure(mut self, stop: bool) -> Self {
        self.stop_on_first_failure = stop;
        self
    }

    /// True if projects of `module` may seed the plan.
    pub fn in_scope(&self, module: &str) -> bool {
        self.modules.is_empty() || self.modules.iter().any(|m| m.eq_ignore_ascii_case(module))
    }

    /// True if a changed file lives under `dir`.
    ///
    /// Relative paths on either side are taken against the current
    /// directory and `.` components are ignored, so `./Core/Data` and
    /// `Core/Data/Repo.cs` match.
    pub fn has_changes_under(&self, dir: &Path) -> bool {
        let dir = comparable(dir);
        self.changed_files
            .iter()
            .any(|f| comparable(f).starts_with(&dir))
    }
}

fn comparable(path: &Path) -> PathBuf {
    let absolute = if path.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    };
    absolute
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
