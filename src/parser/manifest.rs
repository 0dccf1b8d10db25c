//! Parser for module dependency manifests (`Build/DependencyManifest.xml`).
//!
//! ```xml
//! <DependencyManifest>
//!   <ReferencedModules>
//!     <ReferencedModule Name="Libraries" />
//!   </ReferencedModules>
//! </DependencyManifest>
//! ```

use std::fs;
use std::path::Path;

use roxmltree::Document;

use super::project_file::{ParseError, ParseResult};
use super::types::ExpertModule;

/// Parses the manifest of the module rooted at `module_path`.
pub fn parse_manifest_file(
    manifest_path: &Path,
    module_name: &str,
    module_path: &Path,
) -> ParseResult<ExpertModule> {
    let content = fs::read_to_string(manifest_path)?;
    parse_manifest_str(&content, module_name, module_path)
}

/// Parses manifest content into an [`ExpertModule`].
///
/// Repeated module names collapse case-insensitively; the first spelling
/// wins. A module referencing itself is ignored.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use buildseq::parser::parse_manifest_str;
///
/// let xml = r#"<DependencyManifest>
///   <ReferencedModules>
///     <ReferencedModule Name="Libraries" />
///     <ReferencedModule Name="Framework" />
///   </ReferencedModules>
/// </DependencyManifest>"#;
///
/// let module = parse_manifest_str(xml, "Services", Path::new("Services")).unwrap();
/// assert_eq!(module.referenced_modules, vec!["Libraries", "Framework"]);
/// ```
pub fn parse_manifest_str(
    content: &str,
    module_name: &str,
    module_path: &Path,
) -> ParseResult<ExpertModule> {
    let content = content.trim_start_matches('\u{feff}');
    let doc = Document::parse(content)?;
    let root = doc.root_element();

    if !root.has_tag_name("DependencyManifest") {
        return Err(ParseError::InvalidManifest(format!(
            "{}: root element is <{}>, expected <DependencyManifest>",
            module_name,
            root.tag_name().name()
        )));
    }

    let mut module = ExpertModule::new(module_name, module_path);

    for node in root
        .descendants()
        .filter(|n| n.has_tag_name("ReferencedModule"))
    {
        let name = node.attribute("Name").ok_or_else(|| {
            ParseError::InvalidManifest(format!(
                "{}: <ReferencedModule> without a Name attribute",
                module_name
            ))
        })?;
        module.add_reference(name);
    }

    Ok(module)
}
