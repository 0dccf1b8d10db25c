//! File discovery under source roots.
//!
//! Walks each root in file-name order so repeated runs over the same tree
//! see files in the same sequence.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::context::AnalysisContext;
use super::dependency_analyzer::{AnalysisError, AnalysisResult};
use crate::parser::{is_manifest_path, ProjectFileKind};

/// A module directory seen during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDir {
    pub name: String,
    pub path: PathBuf,
}

/// A project file and the module it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredProject {
    pub path: PathBuf,
    pub module: String,
}

/// A dependency manifest and the module it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredManifest {
    pub path: PathBuf,
    pub module: ModuleDir,
}

/// Everything found under the analysis roots.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Modules in the order they were first seen.
    pub modules: Vec<ModuleDir>,
    pub projects: Vec<DiscoveredProject>,
    pub manifests: Vec<DiscoveredManifest>,
}

impl Discovery {
    fn note_module(&mut self, module: &ModuleDir) {
        if !self
            .modules
            .iter()
            .any(|m| m.name.eq_ignore_ascii_case(&module.name))
        {
            self.modules.push(module.clone());
        }
    }

    fn add_project(&mut self, path: PathBuf, module: ModuleDir) {
        self.note_module(&module);
        self.projects.push(DiscoveredProject {
            path,
            module: module.name,
        });
    }

    fn add_manifest(&mut self, path: PathBuf, module: ModuleDir) {
        self.note_module(&module);
        self.manifests.push(DiscoveredManifest { path, module });
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.manifests.is_empty()
    }
}

/// Discovers project files and manifests for `ctx`.
///
/// Roots are walked first, in the order given, then explicit files. A file
/// reachable both ways is reported once.
pub fn discover(ctx: &AnalysisContext) -> AnalysisResult<Discovery> {
    let mut discovery = Discovery::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for root in &ctx.roots {
        if !root.is_dir() {
            return Err(AnalysisError::RootNotFound(root.clone()));
        }
        let root_name = root_module_name(root);

        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_ignored_dir(e, ctx))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            classify(&mut discovery, &mut seen, path, Some((root, root_name.as_str())));
        }
    }

    for file in &ctx.files {
        if !file.is_file() {
            return Err(AnalysisError::FileNotFound(file.clone()));
        }
        let root = ctx.roots.iter().find(|r| file.starts_with(r));
        let root_name = root.map(|r| root_module_name(r));
        classify(
            &mut discovery,
            &mut seen,
            file,
            root.zip(root_name.as_deref()),
        );
    }

    debug!(
        "discovered {} modules, {} projects, {} manifests",
        discovery.modules.len(),
        discovery.projects.len(),
        discovery.manifests.len()
    );
    Ok(discovery)
}

fn classify(
    discovery: &mut Discovery,
    seen: &mut HashSet<PathBuf>,
    path: &Path,
    root: Option<(&PathBuf, &str)>,
) {
    let is_project = ProjectFileKind::from_path(path).is_some();
    let is_manifest = is_manifest_path(path);
    if !is_project && !is_manifest {
        return;
    }
    if !seen.insert(path.to_path_buf()) {
        return;
    }

    if is_project {
        let module = match root {
            Some((root, root_name)) => module_under_root(root, root_name, path),
            None => module_of_loose_file(path),
        };
        discovery.add_project(path.to_path_buf(), module);
        return;
    }

    let Some(module_path) = path.parent().and_then(Path::parent) else {
        return;
    };
    let module = match root {
        Some((root, root_name)) if module_path == root.as_path() => ModuleDir {
            name: root_name.to_string(),
            path: root.to_path_buf(),
        },
        Some((root, root_name)) => {
            let expected = module_under_root(root, root_name, path);
            if expected.path != module_path {
                debug!("ignoring nested manifest {}", path.display());
                return;
            }
            expected
        }
        None => ModuleDir {
            name: dir_name(module_path),
            path: module_path.to_path_buf(),
        },
    };
    discovery.add_manifest(path.to_path_buf(), module);
}

/// The module of a file under `root`: its first directory below the root,
/// or the root itself for files directly inside it.
fn module_under_root(root: &Path, root_name: &str, path: &Path) -> ModuleDir {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut components = relative.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(first)), Some(_)) => ModuleDir {
            name: first.to_string_lossy().into_owned(),
            path: root.join(first),
        },
        _ => ModuleDir {
            name: root_name.to_string(),
            path: root.to_path_buf(),
        },
    }
}

/// Module of an explicit project file outside every root: its parent
/// directory.
fn module_of_loose_file(path: &Path) -> ModuleDir {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    ModuleDir {
        name: dir_name(parent),
        path: parent.to_path_buf(),
    }
}

fn root_module_name(root: &Path) -> String {
    dir_name(root)
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            dir.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "root".to_string())
}

/// Check if a directory should be ignored during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry, ctx: &AnalysisContext) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }
    ctx.is_ignored_dir(&entry.file_name().to_string_lossy())
}
