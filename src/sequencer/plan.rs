//! Grouping of projects into parallel build levels.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::options::{ComboBuildType, RelationshipProcessing, SequenceOptions};
use crate::analysis::DependencyOrder;
use crate::reference::{DependencyRef, NodeKey, VisualStudioProject};

/// Errors that can occur while sequencing a build.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// The module filter names a module the analysis never saw.
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// A change-driven build was requested without any changed files.
    #[error("No changed files given for a change-driven build")]
    NoChangedFiles,

    /// Writing the plan failed.
    #[error("Failed to write build plan: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for sequencer operations.
pub type SequenceResult<T> = Result<T, SequenceError>;

/// A project scheduled in a build plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedProject {
    pub key: NodeKey,
    pub name: String,
    pub module: String,
    pub assembly_name: String,
    pub path: PathBuf,
    pub is_web_project: bool,
}

impl From<&VisualStudioProject> for PlannedProject {
    fn from(project: &VisualStudioProject) -> Self {
        Self {
            key: project.key().clone(),
            name: project.name().to_string(),
            module: project.module().to_string(),
            assembly_name: project.assembly_name().to_string(),
            path: project.path().to_path_buf(),
            is_web_project: project.is_web_project(),
        }
    }
}

/// Projects that can build in parallel once every earlier level is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLevel {
    pub index: usize,
    pub projects: Vec<PlannedProject>,
}

/// Leveled build plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
    pub levels: Vec<BuildLevel>,
    /// Analysis and sequencing warnings carried into the plan output.
    pub warnings: Vec<String>,
}

impl BuildPlan {
    pub fn project_count(&self) -> usize {
        self.levels.iter().map(|l| l.projects.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level index of the project with this name, ignoring case.
    pub fn level_of(&self, name: &str) -> Option<usize> {
        self.levels
            .iter()
            .find(|l| l.projects.iter().any(|p| p.name.eq_ignore_ascii_case(name)))
            .map(|l| l.index)
    }
}

/// Builds a leveled plan from an analysis result.
///
/// Projects in the selected modules seed the plan; under
/// [`ComboBuildType::Changes`] only those with a changed file below their
/// directory do. The relationship mode then widens the seed set along
/// dependency edges. Levels are computed over the whole project graph,
/// passing through module and directory nodes, so a project always lands
/// above every project it depends on. Levels left empty by the selection
/// are dropped and the rest renumbered.
///
/// # Example
///
/// ```ignore
/// use buildseq::analysis::{get_dependency_order, AnalysisContext};
/// use buildseq::sequencer::{sequence, SequenceOptions};
///
/// let order = get_dependency_order(&AnalysisContext::new("src"))?;
/// let plan = sequence(&order, &SequenceOptions::default())?;
/// for level in &plan.levels {
///     println!("level {}: {} projects", level.index, level.projects.len());
/// }
/// ```
pub fn sequence(order: &DependencyOrder, options: &SequenceOptions) -> SequenceResult<BuildPlan> {
    for module in &options.modules {
        if order.module(module).is_none() {
            return Err(SequenceError::UnknownModule(module.clone()));
        }
    }
    if options.combo == ComboBuildType::Changes && options.changed_files.is_empty() {
        return Err(SequenceError::NoChangedFiles);
    }

    let graph = &order.graph;
    let projects: Vec<&VisualStudioProject> = order
        .sorted
        .iter()
        .filter_map(|key| graph.get_node(key))
        .filter_map(DependencyRef::as_project)
        .collect();

    let seeds: Vec<&VisualStudioProject> = projects
        .iter()
        .copied()
        .filter(|p| options.in_scope(p.module()))
        .filter(|p| match options.combo {
            ComboBuildType::All => true,
            ComboBuildType::Changes => p
                .path()
                .parent()
                .is_some_and(|dir| options.has_changes_under(dir)),
        })
        .collect();

    let mut warnings: Vec<String> = order.diagnostics.iter().map(|d| d.to_string()).collect();
    if options.combo == ComboBuildType::Changes && seeds.is_empty() {
        let message = format!(
            "none of the {} changed files lies under a project directory",
            options.changed_files.len()
        );
        warn!("{}", message);
        warnings.push(message);
    }

    let mut selected: HashSet<NodeKey> = seeds.iter().map(|p| p.key().clone()).collect();
    for seed in &seeds {
        let related = match options.relationship {
            RelationshipProcessing::None => continue,
            RelationshipProcessing::Downstream => graph.transitive_dependents(seed.key()),
            RelationshipProcessing::Upstream => graph.transitive_dependencies(seed.key()),
        };
        selected.extend(related);
    }
    debug!(
        "{} seed projects, {} selected after {} processing",
        seeds.len(),
        projects.iter().filter(|p| selected.contains(p.key())).count(),
        options.relationship
    );

    let project_levels = project_levels(order);
    let mut grouped: Vec<Vec<PlannedProject>> = Vec::new();
    for project in projects.iter().filter(|p| selected.contains(p.key())) {
        let level = project_levels.get(project.key()).copied().unwrap_or(0);
        if grouped.len() <= level {
            grouped.resize_with(level + 1, Vec::new);
        }
        grouped[level].push(PlannedProject::from(*project));
    }

    let levels: Vec<BuildLevel> = grouped
        .into_iter()
        .filter(|projects| !projects.is_empty())
        .enumerate()
        .map(|(index, projects)| BuildLevel { index, projects })
        .collect();

    let plan = BuildPlan { levels, warnings };
    info!(
        "planned {} projects in {} levels",
        plan.project_count(),
        plan.levels.len()
    );
    Ok(plan)
}

/// Level of every project, counting only project-to-project distance.
///
/// Walks the full sorted order once. For each node it records how many
/// project levels a dependent must sit above: a project contributes its
/// own level plus one, any other node passes on the maximum of its
/// dependencies.
fn project_levels(order: &DependencyOrder) -> HashMap<NodeKey, usize> {
    let graph = &order.graph;
    let mut floor: HashMap<&NodeKey, usize> = HashMap::with_capacity(order.sorted.len());
    let mut levels = HashMap::new();

    for key in &order.sorted {
        let Some(node) = graph.get_node(key) else {
            continue;
        };
        let above = graph
            .get_dependencies(key)
            .into_iter()
            .filter_map(|dep| floor.get(dep.key()))
            .copied()
            .max()
            .unwrap_or(0);

        match node {
            DependencyRef::VisualStudioProject(_) => {
                levels.insert(key.clone(), above);
                floor.insert(key, above + 1);
            }
            _ => {
                floor.insert(key, above);
            }
        }
    }

    levels
}
