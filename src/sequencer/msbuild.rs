//! MSBuild project emission for build plans.
//!
//! The generated file has one item group and one target per level. Each
//! level target builds its items with `BuildInParallel` and depends on the
//! previous level, and a `Run` target chains them all.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use super::options::SequenceOptions;
use super::plan::{BuildLevel, BuildPlan, SequenceResult};

const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// Writes a [`BuildPlan`] as an MSBuild project.
pub struct MsBuildWriter<'a> {
    options: &'a SequenceOptions,
}

impl<'a> MsBuildWriter<'a> {
    pub fn new(options: &'a SequenceOptions) -> Self {
        Self { options }
    }

    /// Writes the project for `plan`. The output depends only on the plan
    /// and the options.
    pub fn write<W: Write>(&self, plan: &BuildPlan, writer: &mut W) -> io::Result<()> {
        writeln!(writer, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
        writeln!(
            writer,
            r#"<Project ToolsVersion="14.0" DefaultTargets="Run" xmlns="{}">"#,
            MSBUILD_NAMESPACE
        )?;

        for warning in &plan.warnings {
            writeln!(writer, "  <!-- warning: {} -->", comment_text(warning))?;
        }

        writeln!(writer, "  <PropertyGroup>")?;
        writeln!(
            writer,
            "    <Configuration Condition=\"'$(Configuration)' == ''\">{}</Configuration>",
            escape(&self.options.configuration)
        )?;
        writeln!(
            writer,
            "    <Platform Condition=\"'$(Platform)' == ''\">{}</Platform>",
            escape(&self.options.platform)
        )?;
        writeln!(writer, "  </PropertyGroup>")?;

        for level in &plan.levels {
            self.write_items(level, writer)?;
        }
        for level in &plan.levels {
            self.write_target(level, writer)?;
        }

        let all: Vec<String> = plan.levels.iter().map(|l| level_name(l.index)).collect();
        if all.is_empty() {
            writeln!(writer, r#"  <Target Name="Run" />"#)?;
        } else {
            writeln!(
                writer,
                r#"  <Target Name="Run" DependsOnTargets="{}" />"#,
                all.join(";")
            )?;
        }

        writeln!(writer, "</Project>")
    }

    fn write_items<W: Write>(&self, level: &BuildLevel, writer: &mut W) -> io::Result<()> {
        let name = level_name(level.index);
        writeln!(writer, "  <ItemGroup>")?;
        for project in &level.projects {
            writeln!(
                writer,
                r#"    <{} Include="{}">"#,
                name,
                escape(&project.path.display().to_string())
            )?;
            writeln!(writer, "      <ProjectName>{}</ProjectName>", escape(&project.name))?;
            writeln!(writer, "      <Module>{}</Module>", escape(&project.module))?;
            writeln!(
                writer,
                "      <AssemblyName>{}</AssemblyName>",
                escape(&project.assembly_name)
            )?;
            writeln!(
                writer,
                "      <IsWebProject>{}</IsWebProject>",
                project.is_web_project
            )?;
            writeln!(writer, "    </{}>", name)?;
        }
        writeln!(writer, "  </ItemGroup>")
    }

    fn write_target<W: Write>(&self, level: &BuildLevel, writer: &mut W) -> io::Result<()> {
        let name = level_name(level.index);
        if level.index == 0 {
            writeln!(writer, r#"  <Target Name="{}">"#, name)?;
        } else {
            writeln!(
                writer,
                r#"  <Target Name="{}" DependsOnTargets="{}">"#,
                name,
                level_name(level.index - 1)
            )?;
        }
        writeln!(
            writer,
            r#"    <MSBuild Projects="@({})" BuildInParallel="true" StopOnFirstFailure="{}" Targets="{}" Properties="Configuration=$(Configuration);Platform=$(Platform)" />"#,
            name,
            self.options.stop_on_first_failure,
            escape(&self.options.targets.join(";"))
        )?;
        writeln!(writer, "  </Target>")
    }

    /// Renders the project to a string.
    pub fn render(&self, plan: &BuildPlan) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write(plan, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Saves the MSBuild project for `plan` at `path`.
pub fn write_plan_file(path: &Path, plan: &BuildPlan, options: &SequenceOptions) -> SequenceResult<()> {
    let content = MsBuildWriter::new(options).render(plan)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    info!("wrote build plan to {}", path.display());
    Ok(())
}

fn level_name(index: usize) -> String {
    format!("Level{}", index)
}

/// Escapes text for use in XML content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// XML comments may not contain `--`.
fn comment_text(text: &str) -> String {
    let mut out = text.to_string();
    while out.contains("--") {
        out = out.replace("--", "- -");
    }
    out
}
