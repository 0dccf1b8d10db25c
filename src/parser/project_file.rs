//! Parser for MSBuild project files (`.csproj`, `.vbproj`, ...).
//!
//! Only the parts that matter for build ordering are read: identity
//! (GUID, assembly name), the web-project flag and declared references.
//! MSBuild evaluation (conditions, imports, properties) is not performed.

use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};

use super::types::{WEB_APPLICATION_TYPE_GUID, WEB_SITE_TYPE_GUID};
use crate::reference::{AssemblyRef, ProjectRef, ProjectReference, VisualStudioProject};

/// Errors that can occur while parsing project files and manifests.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not well-formed XML.
    #[error("Failed to parse XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The XML is well-formed but is not a usable project file.
    #[error("Invalid project file: {0}")]
    InvalidProject(String),

    /// The XML is well-formed but is not a usable dependency manifest.
    #[error("Invalid dependency manifest: {0}")]
    InvalidManifest(String),
}

/// Result type alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a project file from disk.
///
/// `module` is the module the project belongs to; it takes part in the
/// project's identity when the file declares no GUID.
pub fn parse_project_file(path: &Path, module: &str) -> ParseResult<VisualStudioProject> {
    let content = fs::read_to_string(path)?;
    parse_project_str(&content, path, module)
}

/// Parses project file content.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use buildseq::parser::parse_project_str;
///
/// let xml = r#"<Project xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
///   <PropertyGroup>
///     <ProjectGuid>{11111111-1111-4111-8111-111111111111}</ProjectGuid>
///     <AssemblyName>Acme.Web</AssemblyName>
///   </PropertyGroup>
///   <ItemGroup>
///     <Reference Include="System.Web, Version=4.0.0.0" />
///   </ItemGroup>
/// </Project>"#;
///
/// let project = parse_project_str(xml, Path::new("Web/Web.csproj"), "Web").unwrap();
/// assert_eq!(project.name(), "Web");
/// assert_eq!(project.assembly_name(), "Acme.Web");
/// assert_eq!(project.references().len(), 1);
/// ```
pub fn parse_project_str(
    content: &str,
    path: &Path,
    module: &str,
) -> ParseResult<VisualStudioProject> {
    let content = content.trim_start_matches('\u{feff}');
    let doc = Document::parse(content)?;
    let root = doc.root_element();

    if !root.has_tag_name("Project") {
        return Err(ParseError::InvalidProject(format!(
            "{}: root element is <{}>, expected <Project>",
            path.display(),
            root.tag_name().name()
        )));
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ParseError::InvalidProject(format!("{}: path has no file name", path.display()))
        })?;

    let mut project = VisualStudioProject::new(&name, path, module);

    if let Some(guid) = descendant_text(root, "ProjectGuid") {
        project = project.with_guid(guid);
    }
    if let Some(assembly_name) = descendant_text(root, "AssemblyName") {
        project = project.with_assembly_name(assembly_name);
    }
    if let Some(output_type) = descendant_text(root, "OutputType") {
        project = project.with_output_type(output_type);
    }
    if let Some(type_guids) = descendant_text(root, "ProjectTypeGuids") {
        let type_guids = type_guids.to_lowercase();
        project = project.with_web_project(
            type_guids.contains(WEB_APPLICATION_TYPE_GUID) || type_guids.contains(WEB_SITE_TYPE_GUID),
        );
    }

    for reference in root
        .descendants()
        .filter(|n| n.has_tag_name("ProjectReference"))
    {
        let include = reference.attribute("Include").ok_or_else(|| {
            ParseError::InvalidProject(format!(
                "{}: <ProjectReference> without an Include attribute",
                path.display()
            ))
        })?;
        let project_ref = ProjectRef::new(
            child_text(reference, "Project"),
            include,
            child_text(reference, "Name"),
        );
        project = project.with_reference(ProjectReference::Project(project_ref));
    }

    for reference in root.descendants().filter(|n| n.has_tag_name("Reference")) {
        let Some(include) = reference.attribute("Include") else {
            continue;
        };
        let assembly = AssemblyRef::new(include);
        if assembly.name().is_empty() {
            continue;
        }
        project = project.with_reference(ProjectReference::Assembly(assembly));
    }

    Ok(project)
}

/// Trimmed text of the first descendant element with the given local name.
fn descendant_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.descendants()
        .filter(|n| n.has_tag_name(tag))
        .find_map(|n| n.text().map(str::trim).filter(|t| !t.is_empty()))
}

/// Trimmed text of the first direct child element with the given local name.
fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .filter(|n| n.has_tag_name(tag))
        .find_map(|n| n.text().map(str::trim).filter(|t| !t.is_empty()))
}
