//! Node types participating in the dependency graph.
//!
//! Every vertex is a [`DependencyRef`], a closed set of node kinds that
//! share a name, a kind tag and an immutable identity key.

use std::fmt;
use std::path::{Path, PathBuf};

/// The kind of a graph node.
///
/// Together with the case-folded name this forms the identity of a vertex,
/// so a module and a project that happen to share a name never merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// A module-granularity dependency (one per module directory).
    ModuleRef,
    /// An unresolved project-to-project reference.
    ProjectRef,
    /// A reference to an assembly by simple name.
    AssemblyRef,
    /// Synthetic anchor for a module directory.
    DirectoryNode,
    /// A loaded project file.
    VisualStudioProject,
}

impl NodeKind {
    /// Returns a short label for the node kind.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::ModuleRef => "module",
            NodeKind::ProjectRef => "project-ref",
            NodeKind::AssemblyRef => "assembly",
            NodeKind::DirectoryNode => "directory",
            NodeKind::VisualStudioProject => "project",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::ModuleRef => "ModuleRef",
            NodeKind::ProjectRef => "ProjectRef",
            NodeKind::AssemblyRef => "AssemblyRef",
            NodeKind::DirectoryNode => "DirectoryNode",
            NodeKind::VisualStudioProject => "VisualStudioProject",
        };
        write!(f, "{}", s)
    }
}

/// Immutable identity of a graph vertex.
///
/// The name is case-folded once at construction, which makes equality and
/// hashing case-insensitive without any custom `Eq` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    kind: NodeKind,
    name: String,
}

impl NodeKey {
    /// Creates a key, folding `name` to lowercase.
    ///
    /// # Example
    ///
    /// ```rust
    /// use buildseq::reference::{NodeKey, NodeKind};
    ///
    /// let a = NodeKey::new(NodeKind::AssemblyRef, "System.Core");
    /// let b = NodeKey::new(NodeKind::AssemblyRef, "SYSTEM.CORE");
    /// assert_eq!(a, b);
    /// ```
    pub fn new(kind: NodeKind, name: &str) -> Self {
        Self {
            kind,
            name: name.trim().to_lowercase(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The case-folded identity name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// Normalizes a project GUID: strips braces and whitespace, lowercases.
///
/// Returns `None` for an empty value.
pub fn normalize_guid(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('{').trim_end_matches('}').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// File stem of a path written with either separator, as found in
/// `ProjectReference Include` attributes authored on Windows.
pub fn include_stem(include: &str) -> String {
    let file = include.rsplit(['\\', '/']).next().unwrap_or(include);
    match file.rfind('.') {
        Some(pos) if pos > 0 => file[..pos].to_string(),
        _ => file.to_string(),
    }
}

/// A project-to-project reference as declared in a project file.
///
/// Created unresolved by the parser and resolved later against the full set
/// of loaded projects. Its identity key is fixed at construction and does
/// not follow the display name once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    guid: Option<String>,
    include: String,
    name: String,
    key: NodeKey,
    resolved: Option<NodeKey>,
}

impl ProjectRef {
    /// Creates an unresolved reference.
    ///
    /// `guid` is the `<Project>` child of the `ProjectReference`, `include`
    /// its relative path and `name_hint` the optional `<Name>` child.
    pub fn new(guid: Option<&str>, include: impl Into<String>, name_hint: Option<&str>) -> Self {
        let include = include.into();
        let guid = guid.and_then(normalize_guid);
        let stem = include_stem(&include);
        let key = match &guid {
            Some(g) => NodeKey::new(NodeKind::ProjectRef, g),
            None => NodeKey::new(NodeKind::ProjectRef, &stem),
        };
        let name = name_hint
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or(stem);

        Self {
            guid,
            include,
            name,
            key,
            resolved: None,
        }
    }

    /// Shorthand for a GUID-only reference.
    pub fn from_guid(guid: &str) -> Self {
        Self::new(Some(guid), "", None)
    }

    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    pub fn include(&self) -> &str {
        &self.include
    }

    /// Display name: the name hint (or file stem) until resolved, then the
    /// target's assembly name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Key of the project this reference resolved to.
    pub fn resolved_key(&self) -> Option<&NodeKey> {
        self.resolved.as_ref()
    }

    /// The text used when reporting this reference as unresolved.
    pub fn target_description(&self) -> String {
        match &self.guid {
            Some(g) => format!("{{{}}} ({})", g, self.include),
            None => self.include.clone(),
        }
    }

    /// Resolves the reference against the loaded projects.
    ///
    /// Matches by GUID, or by project file stem when the reference carries
    /// no GUID. On the first successful match the display name becomes the
    /// target's assembly name and `true` is returned. An already resolved
    /// reference, or one with no match, is left untouched and `false` is
    /// returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use buildseq::reference::{ProjectRef, VisualStudioProject};
    ///
    /// let target = VisualStudioProject::new("Core", "Core.csproj", "Libraries")
    ///     .with_guid("{6B8A3C1D-0000-4000-8000-000000000001}")
    ///     .with_assembly_name("Acme.Core");
    ///
    /// let mut r = ProjectRef::from_guid("6b8a3c1d-0000-4000-8000-000000000001");
    /// assert!(r.resolve(std::slice::from_ref(&target)));
    /// assert_eq!(r.name(), "Acme.Core");
    /// assert!(!r.resolve(std::slice::from_ref(&target)));
    /// ```
    pub fn resolve(&mut self, known: &[VisualStudioProject]) -> bool {
        if self.resolved.is_some() {
            return false;
        }

        let found = match &self.guid {
            Some(guid) => known.iter().find(|p| p.guid() == Some(guid.as_str())),
            None => {
                let stem = include_stem(&self.include);
                known
                    .iter()
                    .find(|p| p.file_stem().eq_ignore_ascii_case(&stem))
            }
        };

        match found {
            Some(project) => {
                self.name = project.assembly_name().to_string();
                self.resolved = Some(project.key().clone());
                true
            }
            None => false,
        }
    }
}

/// A reference to an assembly by simple name. Always resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRef {
    name: String,
    key: NodeKey,
}

impl AssemblyRef {
    /// Creates an assembly reference from a `Reference Include` value,
    /// keeping only the simple name before the first comma.
    ///
    /// ```rust
    /// use buildseq::reference::AssemblyRef;
    ///
    /// let r = AssemblyRef::new("Newtonsoft.Json, Version=12.0.0.0, Culture=neutral");
    /// assert_eq!(r.name(), "Newtonsoft.Json");
    /// ```
    pub fn new(include: &str) -> Self {
        let name = include.split(',').next().unwrap_or(include).trim().to_string();
        let key = NodeKey::new(NodeKind::AssemblyRef, &name);
        Self { name, key }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }
}

/// A module-level dependency. Refers to its module by name only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    name: String,
    key: NodeKey,
}

impl ModuleRef {
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        let key = NodeKey::new(NodeKind::ModuleRef, &name);
        Self { name, key }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }
}

/// Synthetic node standing for a module directory.
///
/// A directory node depends on every project inside the module, so it
/// completes once the whole directory is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    name: String,
    path: PathBuf,
    key: NodeKey,
}

impl DirectoryNode {
    pub fn new(name: &str, path: impl Into<PathBuf>) -> Self {
        let name = name.trim().to_string();
        let key = NodeKey::new(NodeKind::DirectoryNode, &name);
        Self {
            name,
            path: path.into(),
            key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }
}

/// Declared reference of a project, as parsed from its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectReference {
    Project(ProjectRef),
    Assembly(AssemblyRef),
}

/// A loaded project file.
///
/// Identity uses the project GUID when the file declares one and falls back
/// to the module-qualified project name otherwise, which keeps same-named
/// projects in different modules apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualStudioProject {
    name: String,
    guid: Option<String>,
    assembly_name: String,
    output_type: String,
    is_web_project: bool,
    path: PathBuf,
    module: String,
    references: Vec<ProjectReference>,
    key: NodeKey,
}

impl VisualStudioProject {
    /// Creates a project with no GUID, assembly name equal to `name` and no
    /// references.
    pub fn new(name: &str, path: impl Into<PathBuf>, module: &str) -> Self {
        let mut project = Self {
            name: name.to_string(),
            guid: None,
            assembly_name: name.to_string(),
            output_type: "Library".to_string(),
            is_web_project: false,
            path: path.into(),
            module: module.to_string(),
            references: Vec::new(),
            key: NodeKey::new(NodeKind::VisualStudioProject, name),
        };
        project.rekey();
        project
    }

    pub fn with_guid(mut self, guid: &str) -> Self {
        self.guid = normalize_guid(guid);
        self.rekey();
        self
    }

    pub fn with_assembly_name(mut self, assembly_name: &str) -> Self {
        self.assembly_name = assembly_name.to_string();
        self
    }

    pub fn with_output_type(mut self, output_type: &str) -> Self {
        self.output_type = output_type.to_string();
        self
    }

    pub fn with_web_project(mut self, is_web_project: bool) -> Self {
        self.is_web_project = is_web_project;
        self
    }

    pub fn with_reference(mut self, reference: ProjectReference) -> Self {
        self.references.push(reference);
        self
    }

    /// Switches identity to the module-qualified name even when a GUID is
    /// present. Used when two loaded projects share a GUID.
    pub fn use_qualified_key(&mut self) {
        self.key = NodeKey::new(NodeKind::VisualStudioProject, &self.qualified_name());
    }

    fn rekey(&mut self) {
        self.key = match &self.guid {
            Some(g) => NodeKey::new(NodeKind::VisualStudioProject, g),
            None => NodeKey::new(NodeKind::VisualStudioProject, &self.qualified_name()),
        };
    }

    /// `<module>\<name>`
    pub fn qualified_name(&self) -> String {
        format!("{}\\{}", self.module, self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    pub fn assembly_name(&self) -> &str {
        &self.assembly_name
    }

    pub fn output_type(&self) -> &str {
        &self.output_type
    }

    pub fn is_web_project(&self) -> bool {
        self.is_web_project
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the project without extension.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn references(&self) -> &[ProjectReference] {
        &self.references
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }
}

/// Any participant of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyRef {
    Module(ModuleRef),
    Project(ProjectRef),
    Assembly(AssemblyRef),
    Directory(DirectoryNode),
    VisualStudioProject(VisualStudioProject),
}

impl DependencyRef {
    pub fn kind(&self) -> NodeKind {
        match self {
            DependencyRef::Module(_) => NodeKind::ModuleRef,
            DependencyRef::Project(_) => NodeKind::ProjectRef,
            DependencyRef::Assembly(_) => NodeKind::AssemblyRef,
            DependencyRef::Directory(_) => NodeKind::DirectoryNode,
            DependencyRef::VisualStudioProject(_) => NodeKind::VisualStudioProject,
        }
    }

    /// Human-readable name. For a loaded project this is the project name,
    /// not its identity key.
    pub fn name(&self) -> &str {
        match self {
            DependencyRef::Module(m) => m.name(),
            DependencyRef::Project(p) => p.name(),
            DependencyRef::Assembly(a) => a.name(),
            DependencyRef::Directory(d) => d.name(),
            DependencyRef::VisualStudioProject(p) => p.name(),
        }
    }

    pub fn key(&self) -> &NodeKey {
        match self {
            DependencyRef::Module(m) => m.key(),
            DependencyRef::Project(p) => p.key(),
            DependencyRef::Assembly(a) => a.key(),
            DependencyRef::Directory(d) => d.key(),
            DependencyRef::VisualStudioProject(p) => p.key(),
        }
    }

    /// `ProjectRef` is the only kind that can be unresolved.
    pub fn is_resolved(&self) -> bool {
        match self {
            DependencyRef::Project(p) => p.is_resolved(),
            _ => true,
        }
    }

    pub fn as_project(&self) -> Option<&VisualStudioProject> {
        match self {
            DependencyRef::VisualStudioProject(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.name())
    }
}

impl From<ModuleRef> for DependencyRef {
    fn from(m: ModuleRef) -> Self {
        DependencyRef::Module(m)
    }
}

impl From<ProjectRef> for DependencyRef {
    fn from(p: ProjectRef) -> Self {
        DependencyRef::Project(p)
    }
}

impl From<AssemblyRef> for DependencyRef {
    fn from(a: AssemblyRef) -> Self {
        DependencyRef::Assembly(a)
    }
}

impl From<DirectoryNode> for DependencyRef {
    fn from(d: DirectoryNode) -> Self {
        DependencyRef::Directory(d)
    }
}

impl From<VisualStudioProject> for DependencyRef {
    fn from(p: VisualStudioProject) -> Self {
        DependencyRef::VisualStudioProject(p)
    }
}

impl From<ProjectReference> for DependencyRef {
    fn from(r: ProjectReference) -> Self {
        match r {
            ProjectReference::Project(p) => DependencyRef::Project(p),
            ProjectReference::Assembly(a) => DependencyRef::Assembly(a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUID_A: &str = "{A0000000-0000-4000-8000-00000000000A}";

    fn core_project() -> VisualStudioProject {
        VisualStudioProject::new("Core", "Libraries/Core/Core.csproj", "Libraries")
            .with_guid(GUID_A)
            .with_assembly_name("Acme.Core")
    }

    #[test]
    fn test_node_kind_display() {
        assert_eq!(NodeKind::ModuleRef.to_string(), "ModuleRef");
        assert_eq!(NodeKind::ProjectRef.to_string(), "ProjectRef");
        assert_eq!(NodeKind::AssemblyRef.to_string(), "AssemblyRef");
        assert_eq!(NodeKind::DirectoryNode.to_string(), "DirectoryNode");
        assert_eq!(
            NodeKind::VisualStudioProject.to_string(),
            "VisualStudioProject"
        );
    }

    #[test]
    fn test_node_key_case_insensitive() {
        let a = NodeKey::new(NodeKind::ModuleRef, "Libraries.Core");
        let b = NodeKey::new(NodeKind::ModuleRef, "libraries.core");
        assert_eq!(a, b);
        assert_eq!(a.name(), "libraries.core");
    }

    #[test]
    fn test_node_key_kind_disambiguates() {
        let module = NodeKey::new(NodeKind::ModuleRef, "Core");
        let assembly = NodeKey::new(NodeKind::AssemblyRef, "Core");
        assert_ne!(module, assembly);
    }

    #[test]
    fn test_normalize_guid() {
        assert_eq!(
            normalize_guid(GUID_A).as_deref(),
            Some("a0000000-0000-4000-8000-00000000000a")
        );
        assert_eq!(normalize_guid("  {}  "), None);
        assert_eq!(normalize_guid(""), None);
    }

    #[test]
    fn test_include_stem() {
        assert_eq!(include_stem(r"..\Core\Core.csproj"), "Core");
        assert_eq!(include_stem("../Web/Acme.Web.csproj"), "Acme.Web");
        assert_eq!(include_stem("NoExtension"), "NoExtension");
    }

    #[test]
    fn test_project_ref_resolve() {
        let known = vec![core_project()];
        let mut r = ProjectRef::new(Some(GUID_A), r"..\Core\Core.csproj", Some("Core"));
        assert!(!r.is_resolved());
        assert_eq!(r.name(), "Core");

        assert!(r.resolve(&known));
        assert!(r.is_resolved());
        assert_eq!(r.name(), "Acme.Core");
        assert_eq!(r.resolved_key(), Some(known[0].key()));
    }

    #[test]
    fn test_project_ref_resolve_is_idempotent() {
        let known = vec![core_project()];
        let mut r = ProjectRef::from_guid(GUID_A);
        assert!(r.resolve(&known));
        let after_first = r.clone();

        assert!(!r.resolve(&known));
        assert_eq!(r, after_first);
    }

    #[test]
    fn test_project_ref_key_is_stable_across_resolution() {
        let known = vec![core_project()];
        let mut r = ProjectRef::from_guid(GUID_A);
        let before = r.key().clone();
        r.resolve(&known);
        assert_eq!(r.key(), &before);
    }

    #[test]
    fn test_project_ref_unmatched() {
        let known = vec![core_project()];
        let mut r = ProjectRef::from_guid("{B0000000-0000-4000-8000-00000000000B}");
        assert!(!r.resolve(&known));
        assert!(!r.is_resolved());
        assert_eq!(r.name(), "");
    }

    #[test]
    fn test_project_ref_without_guid_matches_file_stem() {
        let known = vec![core_project()];
        let mut r = ProjectRef::new(None, "../Core/core.csproj", None);
        assert_eq!(r.key().name(), "core");
        assert!(r.resolve(&known));
        assert_eq!(r.name(), "Acme.Core");
    }

    #[test]
    fn test_assembly_ref_strips_strong_name() {
        let r = AssemblyRef::new("System.Web.Mvc, Version=5.2.3.0, PublicKeyToken=31bf3856ad364e35");
        assert_eq!(r.name(), "System.Web.Mvc");
        assert_eq!(r.key().kind(), NodeKind::AssemblyRef);
    }

    #[test]
    fn test_project_identity_prefers_guid() {
        let p = core_project();
        assert_eq!(p.key().name(), "a0000000-0000-4000-8000-00000000000a");

        let no_guid = VisualStudioProject::new("Core", "Other/Core/Core.csproj", "Other");
        assert_eq!(no_guid.key().name(), r"other\core");
    }

    #[test]
    fn test_same_named_projects_in_different_modules() {
        let a = VisualStudioProject::new("ProjectA", "ModuleA/ProjectA.csproj", "ModuleA");
        let b = VisualStudioProject::new("ProjectA", "ModuleB/ProjectA.csproj", "ModuleB");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_use_qualified_key() {
        let mut p = core_project();
        p.use_qualified_key();
        assert_eq!(p.key().name(), r"libraries\core");
        assert_eq!(p.guid(), Some("a0000000-0000-4000-8000-00000000000a"));
    }

    #[test]
    fn test_dependency_ref_display() {
        let r: DependencyRef = AssemblyRef::new("System.Xml").into();
        assert_eq!(r.to_string(), "AssemblyRef: System.Xml");

        let m: DependencyRef = ModuleRef::new("Libraries.Core").into();
        assert_eq!(m.to_string(), "ModuleRef: Libraries.Core");
    }

    #[test]
    fn test_dependency_ref_is_resolved() {
        let unresolved: DependencyRef = ProjectRef::from_guid(GUID_A).into();
        assert!(!unresolved.is_resolved());

        let assembly: DependencyRef = AssemblyRef::new("System").into();
        assert!(assembly.is_resolved());
    }
}
