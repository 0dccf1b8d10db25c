//! Builds the build-order graph of a source tree.
//!
//! Files are discovered and parsed in parallel, then funneled into a single
//! thread that registers vertices and edges, resolves project references
//! and sorts the result.

use std::collections::HashMap;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::context::{AnalysisContext, Diagnostic, ParsePolicy, UnresolvedPolicy};
use super::discovery::{discover, Discovery};
use crate::graph::{DependencyGraph, GraphError};
use crate::parser::{parse_manifest_file, parse_project_file, ExpertModule, ParseError};
use crate::reference::{
    DependencyRef, DirectoryNode, ModuleRef, NodeKey, NodeKind, VisualStudioProject,
};

/// Errors that can occur during dependency analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// A source root does not exist or is not a directory.
    #[error("Source root not found: {0}")]
    RootNotFound(PathBuf),

    /// An explicitly listed file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A project file or manifest could not be parsed.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// The graph could not be ordered.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A project reference matched no loaded project and strict mode is on.
    #[error("Unresolved reference: {from} references {target}")]
    UnresolvedReference { from: String, target: String },

    /// The context names neither a root nor a file.
    #[error("No source roots or files given")]
    NoInput,
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// The outcome of a successful analysis.
#[derive(Debug, Clone)]
pub struct DependencyOrder {
    /// The full dependency graph, references resolved.
    pub graph: DependencyGraph,
    /// Reported nodes in dependency order, after scope filtering.
    pub order: Vec<NodeKey>,
    /// Every vertex in dependency order, before filtering.
    pub sorted: Vec<NodeKey>,
    /// Warnings collected along the way.
    pub diagnostics: Vec<Diagnostic>,
    /// Modules in discovery order.
    pub modules: Vec<ExpertModule>,
}

impl DependencyOrder {
    /// Reported nodes in dependency order.
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyRef> + '_ {
        self.order.iter().filter_map(|key| self.graph.get_node(key))
    }

    /// Loaded projects among the reported nodes, in dependency order.
    pub fn projects(&self) -> Vec<&VisualStudioProject> {
        self.nodes().filter_map(DependencyRef::as_project).collect()
    }

    /// Level of every vertex, computed over the unfiltered order.
    pub fn levels(&self) -> HashMap<NodeKey, usize> {
        self.graph.node_levels(&self.sorted)
    }

    /// Looks up a module by name, ignoring case.
    pub fn module(&self, name: &str) -> Option<&ExpertModule> {
        self.modules
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn unresolved_references(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics
            .iter()
            .filter(|d| d.is_unresolved_reference())
    }
}

/// Discovers, parses, links and sorts everything `ctx` points at.
///
/// A cycle aborts the analysis with [`AnalysisError::Graph`] carrying the
/// cycle members. Unresolved project references are kept as dangling
/// vertices and reported as diagnostics, unless the context asks for
/// [`UnresolvedPolicy::Strict`].
///
/// # Example
///
/// ```ignore
/// use buildseq::analysis::{get_dependency_order, AnalysisContext};
///
/// let order = get_dependency_order(&AnalysisContext::new("src"))?;
/// for project in order.projects() {
///     println!("{}", project.name());
/// }
/// ```
pub fn get_dependency_order(ctx: &AnalysisContext) -> AnalysisResult<DependencyOrder> {
    if ctx.roots.is_empty() && ctx.files.is_empty() {
        return Err(AnalysisError::NoInput);
    }

    let discovery = discover(ctx)?;
    let mut diagnostics = Vec::new();

    let modules = load_modules(ctx, &discovery, &mut diagnostics)?;
    let projects = load_projects(ctx, &discovery, &mut diagnostics)?;
    let projects = assign_identities(projects, &mut diagnostics);

    let mut graph = build_graph(&modules, &projects);
    resolve_references(ctx, &mut graph, &projects, &mut diagnostics)?;

    let sorted = graph.sort()?;
    let order = filter_order(ctx, &graph, &sorted);

    info!(
        "ordered {} nodes ({} projects, {} modules), {} reported",
        sorted.len(),
        projects.len(),
        modules.len(),
        order.len()
    );

    Ok(DependencyOrder {
        graph,
        order,
        sorted,
        diagnostics,
        modules,
    })
}

/// Turns a parse failure into an error or a diagnostic, per policy.
fn handle_parse_error(
    ctx: &AnalysisContext,
    path: PathBuf,
    source: ParseError,
    diagnostics: &mut Vec<Diagnostic>,
) -> AnalysisResult<()> {
    match ctx.parse_policy {
        ParsePolicy::FailFast => Err(AnalysisError::Parse { path, source }),
        ParsePolicy::SkipInvalid => {
            warn!("skipping {}: {}", path.display(), source);
            diagnostics.push(Diagnostic::SkippedFile {
                path,
                reason: source.to_string(),
            });
            Ok(())
        }
    }
}

fn load_modules(
    ctx: &AnalysisContext,
    discovery: &Discovery,
    diagnostics: &mut Vec<Diagnostic>,
) -> AnalysisResult<Vec<ExpertModule>> {
    let mut modules: Vec<ExpertModule> = discovery
        .modules
        .iter()
        .map(|m| ExpertModule::new(m.name.clone(), m.path.clone()))
        .collect();

    let parsed: Vec<_> = discovery
        .manifests
        .par_iter()
        .map(|m| {
            (
                m.path.clone(),
                parse_manifest_file(&m.path, &m.module.name, &m.module.path),
            )
        })
        .collect();

    for (path, result) in parsed {
        let manifest = match result {
            Ok(manifest) => manifest,
            Err(e) => {
                handle_parse_error(ctx, path, e, diagnostics)?;
                continue;
            }
        };
        debug!("loaded manifest {}", manifest);

        if let Some(module) = modules
            .iter_mut()
            .find(|m| m.name.eq_ignore_ascii_case(&manifest.name))
        {
            for reference in &manifest.referenced_modules {
                module.add_reference(reference);
            }
        }
    }

    for module in &modules {
        for referenced in &module.referenced_modules {
            if modules.iter().any(|m| m.name.eq_ignore_ascii_case(referenced)) {
                continue;
            }
            warn!(
                "module {} references module {} which was not found",
                module.name, referenced
            );
            diagnostics.push(Diagnostic::MissingModule {
                module: module.name.clone(),
                referenced: referenced.clone(),
            });
        }
    }

    Ok(modules)
}

fn load_projects(
    ctx: &AnalysisContext,
    discovery: &Discovery,
    diagnostics: &mut Vec<Diagnostic>,
) -> AnalysisResult<Vec<VisualStudioProject>> {
    let parsed: Vec<_> = discovery
        .projects
        .par_iter()
        .map(|p| (p.path.clone(), parse_project_file(&p.path, &p.module)))
        .collect();

    let mut projects = Vec::with_capacity(parsed.len());
    for (path, result) in parsed {
        match result {
            Ok(project) => {
                debug!(
                    "loaded {} ({} references) from {}",
                    project.name(),
                    project.references().len(),
                    path.display()
                );
                projects.push(project);
            }
            Err(e) => handle_parse_error(ctx, path, e, diagnostics)?,
        }
    }

    Ok(projects)
}

/// Settles project identities: a reused GUID falls back to the
/// module-qualified key, and a project whose key is still taken is dropped.
fn assign_identities(
    projects: Vec<VisualStudioProject>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<VisualStudioProject> {
    let mut guids: HashMap<String, PathBuf> = HashMap::new();
    let mut keys: HashMap<NodeKey, PathBuf> = HashMap::new();
    let mut kept = Vec::with_capacity(projects.len());

    for mut project in projects {
        if let Some(guid) = project.guid().map(str::to_string) {
            match guids.get(&guid) {
                Some(first) => {
                    warn!(
                        "project GUID {} reused by {}",
                        guid,
                        project.path().display()
                    );
                    diagnostics.push(Diagnostic::DuplicateProjectGuid {
                        guid,
                        first: first.clone(),
                        second: project.path().to_path_buf(),
                    });
                    project.use_qualified_key();
                }
                None => {
                    guids.insert(guid, project.path().to_path_buf());
                }
            }
        }

        if let Some(first) = keys.get(project.key()) {
            warn!("ignoring duplicate project {}", project.path().display());
            diagnostics.push(Diagnostic::DuplicateProject {
                key: project.key().name().to_string(),
                first: first.clone(),
                second: project.path().to_path_buf(),
            });
            continue;
        }
        keys.insert(project.key().clone(), project.path().to_path_buf());
        kept.push(project);
    }

    kept
}

/// Registers modules, directories, projects and their declared references.
fn build_graph(modules: &[ExpertModule], projects: &[VisualStudioProject]) -> DependencyGraph {
    let mut graph = DependencyGraph::with_capacity(
        modules.len() * 2 + projects.len() * 4,
        modules.len() * 2 + projects.len() * 6,
    );

    for module in modules {
        let module_ref = ModuleRef::new(&module.name);
        graph.add_edge(
            module_ref.clone(),
            DirectoryNode::new(&module.name, module.path.clone()),
        );
        for referenced in &module.referenced_modules {
            graph.add_edge(module_ref.clone(), ModuleRef::new(referenced));
        }
    }

    let by_name: HashMap<String, &ExpertModule> = modules
        .iter()
        .map(|m| (m.name.to_lowercase(), m))
        .collect();

    for project in projects {
        let directory = DirectoryNode::new(project.module(), PathBuf::new());
        let project_key = project.key().clone();
        graph.add_edge(directory, project.clone());

        if let Some(module) = by_name.get(&project.module().to_lowercase()) {
            for referenced in &module.referenced_modules {
                let target = ModuleRef::new(referenced);
                let target_key = target.key().clone();
                graph.add_node(target);
                graph.add_edge_between(&project_key, &target_key);
            }
        }

        for reference in project.references() {
            let dependency = DependencyRef::from(reference.clone());
            let dependency_key = dependency.key().clone();
            graph.add_node(dependency);
            graph.add_edge_between(&project_key, &dependency_key);
        }
    }

    graph
}

/// Folds resolvable references into the projects they name.
fn resolve_references(
    ctx: &AnalysisContext,
    graph: &mut DependencyGraph,
    projects: &[VisualStudioProject],
    diagnostics: &mut Vec<Diagnostic>,
) -> AnalysisResult<()> {
    let project_refs: Vec<_> = graph
        .get_nodes_by_kind(NodeKind::ProjectRef)
        .into_iter()
        .filter_map(|n| match n {
            DependencyRef::Project(p) => Some(p.clone()),
            _ => None,
        })
        .collect();

    for mut project_ref in project_refs {
        if project_ref.resolve(projects) {
            if let Some(target) = project_ref.resolved_key().cloned() {
                debug!("resolved {} to {}", project_ref.target_description(), project_ref.name());
                graph.rekey(project_ref.key(), &target)?;
            }
            continue;
        }

        let target = project_ref.target_description();
        let referrers: Vec<String> = graph
            .get_dependents(project_ref.key())
            .into_iter()
            .map(|n| n.name().to_string())
            .collect();

        for from in referrers {
            if ctx.unresolved_policy == UnresolvedPolicy::Strict {
                return Err(AnalysisError::UnresolvedReference { from, target });
            }
            warn!("{} references {} which was not found", from, target);
            diagnostics.push(Diagnostic::UnresolvedReference {
                from,
                target: target.clone(),
            });
        }
    }

    let mut by_assembly: HashMap<String, NodeKey> = HashMap::new();
    for project in projects {
        by_assembly
            .entry(project.assembly_name().to_lowercase())
            .or_insert_with(|| project.key().clone());
    }

    let assembly_keys: Vec<NodeKey> = graph
        .get_nodes_by_kind(NodeKind::AssemblyRef)
        .into_iter()
        .map(|n| n.key().clone())
        .collect();

    for key in assembly_keys {
        if let Some(target) = by_assembly.get(key.name()) {
            debug!("assembly reference {} is built by {}", key.name(), target.name());
            graph.rekey(&key, target)?;
        }
    }

    Ok(())
}

/// Module a node belongs to, when it has one of its own.
fn node_module(node: &DependencyRef) -> Option<&str> {
    match node {
        DependencyRef::Module(m) => Some(m.name()),
        DependencyRef::Directory(d) => Some(d.name()),
        DependencyRef::VisualStudioProject(p) => Some(p.module()),
        DependencyRef::Project(_) | DependencyRef::Assembly(_) => None,
    }
}

fn filter_order(ctx: &AnalysisContext, graph: &DependencyGraph, sorted: &[NodeKey]) -> Vec<NodeKey> {
    sorted
        .iter()
        .filter(|key| {
            let Some(node) = graph.get_node(key) else {
                return false;
            };
            match node {
                DependencyRef::Module(_) | DependencyRef::Directory(_)
                    if !ctx.include_directories =>
                {
                    return false;
                }
                DependencyRef::Project(_) | DependencyRef::Assembly(_)
                    if !ctx.include_references =>
                {
                    return false;
                }
                _ => {}
            }
            match node_module(node) {
                Some(module) => ctx.in_scope(module),
                // References are reported with the projects that use them.
                None => graph
                    .get_dependents(key)
                    .into_iter()
                    .filter_map(node_module)
                    .any(|m| ctx.in_scope(m)),
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const GUID_A: &str = "{A0000000-0000-4000-8000-00000000000A}";
    const GUID_B: &str = "{B0000000-0000-4000-8000-00000000000B}";
    const GUID_C: &str = "{C0000000-0000-4000-8000-00000000000C}";
    const GUID_MISSING: &str = "{DEAD0000-0000-4000-8000-000000000000}";

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project_xml(guid: &str, references: &[(&str, &str)]) -> String {
        let mut xml = String::from(
            r#"<Project ToolsVersion="14.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">"#,
        );
        xml.push_str(&format!(
            "<PropertyGroup><ProjectGuid>{}</ProjectGuid></PropertyGroup><ItemGroup>",
            guid
        ));
        for (include, ref_guid) in references {
            xml.push_str(&format!(
                "<ProjectReference Include=\"{}\"><Project>{}</Project></ProjectReference>",
                include, ref_guid
            ));
        }
        xml.push_str("</ItemGroup></Project>");
        xml
    }

    fn manifest_xml(modules: &[&str]) -> String {
        let mut xml = String::from("<DependencyManifest><ReferencedModules>");
        for m in modules {
            xml.push_str(&format!("<ReferencedModule Name=\"{}\" />", m));
        }
        xml.push_str("</ReferencedModules></DependencyManifest>");
        xml
    }

    fn project_names(order: &DependencyOrder) -> Vec<String> {
        order
            .projects()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// B and C both depend on A; nothing relates B and C.
    fn abc_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "Main/A/A.csproj", &project_xml(GUID_A, &[]));
        write(
            root,
            "Main/B/B.csproj",
            &project_xml(GUID_B, &[("..\\A\\A.csproj", GUID_A)]),
        );
        write(
            root,
            "Main/C/C.csproj",
            &project_xml(GUID_C, &[("..\\A\\A.csproj", GUID_A)]),
        );
        dir
    }

    #[test]
    fn test_shared_dependency_comes_first() {
        let dir = abc_tree();
        let order = get_dependency_order(&AnalysisContext::new(dir.path())).unwrap();

        assert_eq!(project_names(&order), vec!["A", "B", "C"]);
        assert!(order.diagnostics.is_empty());
        assert!(order.graph.get_nodes_by_kind(NodeKind::ProjectRef).is_empty());
    }

    #[test]
    fn test_reference_order_beats_discovery_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "Main/Alpha/Alpha.csproj",
            &project_xml(GUID_A, &[("..\\Zulu\\Zulu.csproj", GUID_B)]),
        );
        write(root, "Main/Zulu/Zulu.csproj", &project_xml(GUID_B, &[]));

        let order = get_dependency_order(&AnalysisContext::new(root)).unwrap();
        assert_eq!(project_names(&order), vec!["Zulu", "Alpha"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "Main/A/A.csproj",
            &project_xml(GUID_A, &[("..\\B\\B.csproj", GUID_B)]),
        );
        write(
            root,
            "Main/B/B.csproj",
            &project_xml(GUID_B, &[("..\\C\\C.csproj", GUID_C)]),
        );
        write(
            root,
            "Main/C/C.csproj",
            &project_xml(GUID_C, &[("..\\A\\A.csproj", GUID_A)]),
        );

        let err = get_dependency_order(&AnalysisContext::new(root)).unwrap_err();
        match err {
            AnalysisError::Graph(GraphError::CycleDetected { cycle }) => {
                let mut nodes = cycle.nodes.clone();
                nodes.sort();
                assert_eq!(nodes, vec![r"Main\A", r"Main\B", r"Main\C"]);
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_guid_stays_dangling() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "Main/P/P.csproj",
            &project_xml(GUID_A, &[("..\\Gone\\Gone.csproj", GUID_MISSING)]),
        );

        let order = get_dependency_order(&AnalysisContext::new(root)).unwrap();

        let dangling = order.graph.unresolved();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].name(), "Gone");

        let warnings: Vec<_> = order.unresolved_references().collect();
        assert_eq!(warnings.len(), 1);
        let text = warnings[0].to_string();
        assert!(text.starts_with("P references"));
        assert!(text.contains("dead0000-0000-4000-8000-000000000000"));
    }

    #[test]
    fn test_unknown_guid_fails_in_strict_mode() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "Main/P/P.csproj",
            &project_xml(GUID_A, &[("..\\Gone\\Gone.csproj", GUID_MISSING)]),
        );

        let ctx = AnalysisContext::new(root).with_unresolved_policy(UnresolvedPolicy::Strict);
        assert!(matches!(
            get_dependency_order(&ctx),
            Err(AnalysisError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn test_same_named_projects_stay_distinct() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let bare = r#"<Project Sdk="Microsoft.NET.Sdk"></Project>"#;
        write(root, "ModuleA/ProjectA/ProjectA.csproj", bare);
        write(root, "ModuleB/ProjectA/ProjectA.csproj", bare);

        let order = get_dependency_order(&AnalysisContext::new(root)).unwrap();

        let projects = order.projects();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].module(), "ModuleA");
        assert_eq!(projects[1].module(), "ModuleB");
        assert_ne!(projects[0].key(), projects[1].key());
    }

    #[test]
    fn test_duplicate_guid_is_kept_apart() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "ModuleA/Copy/Copy.csproj", &project_xml(GUID_A, &[]));
        write(root, "ModuleB/Copy/Copy.csproj", &project_xml(GUID_A, &[]));

        let order = get_dependency_order(&AnalysisContext::new(root)).unwrap();
        assert_eq!(order.projects().len(), 2);
        assert!(order
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::DuplicateProjectGuid { .. })));
    }

    #[test]
    fn test_colliding_identity_is_dropped() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let bare = r#"<Project Sdk="Microsoft.NET.Sdk"></Project>"#;
        write(first.path(), "Core/Lib/Lib.csproj", bare);
        write(second.path(), "Core/Lib/Lib.csproj", bare);

        let ctx = AnalysisContext::new(first.path()).with_root(second.path());
        let order = get_dependency_order(&ctx).unwrap();

        let projects = order.projects();
        assert_eq!(projects.len(), 1);
        assert!(projects[0].path().starts_with(first.path()));

        let dropped: Vec<&Diagnostic> = order
            .diagnostics
            .iter()
            .filter(|d| d.label() == "duplicate-project")
            .collect();
        assert_eq!(dropped.len(), 1);
        match dropped[0] {
            Diagnostic::DuplicateProject { key, second: path, .. } => {
                assert_eq!(key, r"core\lib");
                assert!(path.starts_with(second.path()));
            }
            other => panic!("unexpected diagnostic {:?}", other),
        }
    }

    #[test]
    fn test_missing_referenced_module_is_reported() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "Apps/Build/DependencyManifest.xml",
            &manifest_xml(&["Core", "Ghost"]),
        );
        write(root, "Apps/Shell/Shell.csproj", &project_xml(GUID_A, &[]));
        write(root, "Core/Util/Util.csproj", &project_xml(GUID_B, &[]));

        let order = get_dependency_order(&AnalysisContext::new(root)).unwrap();

        assert_eq!(
            order.diagnostics,
            vec![Diagnostic::MissingModule {
                module: "Apps".to_string(),
                referenced: "Ghost".to_string(),
            }]
        );
        assert_eq!(
            order.diagnostics[0].to_string(),
            "module Apps references module Ghost which was not found"
        );
        assert!(order
            .graph
            .contains(&NodeKey::new(NodeKind::ModuleRef, "Ghost")));
        assert_eq!(project_names(&order), vec!["Util", "Shell"]);
    }

    #[test]
    fn test_module_manifest_orders_modules() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "Apps/Build/DependencyManifest.xml", &manifest_xml(&["Core"]));
        write(root, "Apps/Shell/Shell.csproj", &project_xml(GUID_A, &[]));
        write(root, "Core/Util/Util.csproj", &project_xml(GUID_B, &[]));

        let order = get_dependency_order(&AnalysisContext::new(root)).unwrap();

        assert_eq!(project_names(&order), vec!["Util", "Shell"]);
        let apps = order.module("apps").unwrap();
        assert_eq!(apps.referenced_modules, vec!["Core"]);

        let levels = order.levels();
        let shell = order.projects()[1].key().clone();
        let util = order.projects()[0].key().clone();
        assert!(levels[&shell] > levels[&util]);
    }

    #[test]
    fn test_assembly_reference_to_loaded_project() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "Main/App/App.csproj",
            r#"<Project><PropertyGroup><ProjectGuid>{A0000000-0000-4000-8000-00000000000A}</ProjectGuid></PropertyGroup>
               <ItemGroup><Reference Include="Acme.Lib, Version=1.0.0.0" /></ItemGroup></Project>"#,
        );
        write(
            root,
            "Main/Lib/Lib.csproj",
            r#"<Project><PropertyGroup><AssemblyName>Acme.Lib</AssemblyName></PropertyGroup></Project>"#,
        );

        let order = get_dependency_order(&AnalysisContext::new(root)).unwrap();
        assert_eq!(project_names(&order), vec!["Lib", "App"]);
        assert!(order.graph.get_nodes_by_kind(NodeKind::AssemblyRef).is_empty());
    }

    #[test]
    fn test_parse_policy() {
        let dir = abc_tree();
        write(dir.path(), "Main/Broken/Broken.csproj", "<Project>");

        let err = get_dependency_order(&AnalysisContext::new(dir.path())).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));

        let ctx = AnalysisContext::new(dir.path()).with_parse_policy(ParsePolicy::SkipInvalid);
        let order = get_dependency_order(&ctx).unwrap();
        assert_eq!(project_names(&order), vec!["A", "B", "C"]);
        assert_eq!(order.diagnostics.len(), 1);
        assert_eq!(order.diagnostics[0].label(), "skipped-file");
    }

    #[test]
    fn test_scope_and_filters() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "Apps/Build/DependencyManifest.xml", &manifest_xml(&["Core"]));
        write(root, "Apps/Shell/Shell.csproj", &project_xml(GUID_A, &[]));
        write(root, "Core/Util/Util.csproj", &project_xml(GUID_B, &[]));

        let ctx = AnalysisContext::new(root)
            .with_scope(["Apps"])
            .without_directories();
        let order = get_dependency_order(&ctx).unwrap();

        let kinds: Vec<NodeKind> = order.nodes().map(DependencyRef::kind).collect();
        assert_eq!(kinds, vec![NodeKind::VisualStudioProject]);
        assert_eq!(project_names(&order), vec!["Shell"]);
        assert!(order.sorted.len() > order.order.len());
    }

    #[test]
    fn test_runs_are_deterministic() {
        let dir = abc_tree();
        write(dir.path(), "Other/D/D.csproj", &project_xml(GUID_MISSING, &[]));

        let first = get_dependency_order(&AnalysisContext::new(dir.path())).unwrap();
        let second = get_dependency_order(&AnalysisContext::new(dir.path())).unwrap();
        assert_eq!(first.order, second.order);
    }

    #[test]
    fn test_no_input() {
        assert!(matches!(
            get_dependency_order(&AnalysisContext::default()),
            Err(AnalysisError::NoInput)
        ));
    }
}
