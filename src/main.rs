use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use buildseq::analysis::{
    get_dependency_order, AnalysisContext, DependencyOrder, ParsePolicy, UnresolvedPolicy,
};
use buildseq::export::{dump_graph, export, ExportData, ExportFormat};
use buildseq::logger::init_logger;
use buildseq::sequencer::{
    sequence, write_plan_file, ComboBuildType, RelationshipProcessing, SequenceOptions,
};

#[derive(Parser)]
#[command(name = "buildseq")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Dependency ordering and parallel build sequencing for .NET source trees", long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs and policies shared by every analysis command.
#[derive(Args)]
struct SourceArgs {
    /// Source roots to scan (defaults to the current directory)
    roots: Vec<PathBuf>,

    /// Explicit project or manifest file, in addition to the roots
    #[arg(short, long = "file")]
    files: Vec<PathBuf>,

    /// Skip files that fail to parse instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Fail on project references that match no loaded project
    #[arg(long)]
    strict: bool,
}

impl SourceArgs {
    fn context(&self) -> AnalysisContext {
        let mut ctx = AnalysisContext::default();
        ctx.roots = if self.roots.is_empty() && self.files.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.roots.clone()
        };
        ctx.files = self.files.clone();
        if self.skip_invalid {
            ctx = ctx.with_parse_policy(ParsePolicy::SkipInvalid);
        }
        if self.strict {
            ctx = ctx.with_unresolved_policy(UnresolvedPolicy::Strict);
        }
        ctx
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dependency order of a source tree
    Order {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format: text, json, csv or markdown
        #[arg(long, default_value = "text")]
        format: ExportFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report only projects, leaving out modules, directories and references
        #[arg(long)]
        projects_only: bool,

        /// Report only nodes of these modules
        #[arg(short, long = "module")]
        modules: Vec<String>,
    },
    /// Write a leveled MSBuild project for parallel builds
    Plan {
        #[command(flatten)]
        source: SourceArgs,

        /// Path of the generated MSBuild project
        #[arg(short, long)]
        output: PathBuf,

        /// Seed the plan with projects of these modules only
        #[arg(short, long = "module")]
        modules: Vec<String>,

        /// Which projects seed the plan: all or changes
        #[arg(long, default_value = "all")]
        combo: ComboBuildType,

        /// A changed file, used with --combo changes
        #[arg(long = "changed-file")]
        changed_files: Vec<PathBuf>,

        /// Widen the seed set: none, downstream or upstream
        #[arg(long, default_value = "none")]
        relationship: RelationshipProcessing,

        /// Build configuration
        #[arg(long, default_value = "Release")]
        configuration: String,

        /// Build platform
        #[arg(long, default_value = "AnyCPU")]
        platform: String,

        /// MSBuild target to run on every project (repeatable)
        #[arg(long = "target")]
        targets: Vec<String>,

        /// Keep building other projects of a level after a failure
        #[arg(long)]
        continue_on_error: bool,
    },
    /// Dump the dependency graph depth-first, one line per node
    Dump {
        #[command(flatten)]
        source: SourceArgs,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indent each node by its depth
        #[arg(long)]
        indent: bool,
    },
    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet, cli.no_color);

    match cli.command {
        Commands::Order {
            source,
            format,
            output,
            projects_only,
            modules,
        } => {
            let mut ctx = source.context().with_scope(modules);
            if projects_only {
                ctx = ctx.without_directories().without_references();
            }
            let order = analyze(&ctx)?;
            let data = ExportData::new(&order);
            let mut writer = open_output(output.as_deref())?;
            export(format, &data, &mut writer).context("Failed to write dependency order")?;
            writer.flush()?;
        }
        Commands::Plan {
            source,
            output,
            modules,
            combo,
            changed_files,
            relationship,
            configuration,
            platform,
            targets,
            continue_on_error,
        } => {
            let order = analyze(&source.context())?;
            let mut options = SequenceOptions::default()
                .with_modules(modules)
                .with_combo(combo)
                .with_relationship(relationship)
                .with_configuration(configuration)
                .with_platform(platform)
                .with_stop_on_first_failure(!continue_on_error);
            options.changed_files = changed_files;
            if !targets.is_empty() {
                options = options.with_targets(targets);
            }

            let plan = sequence(&order, &options).context("Failed to sequence the build")?;
            write_plan_file(&output, &plan, &options)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "{} projects in {} levels -> {}",
                plan.project_count(),
                plan.levels.len(),
                output.display()
            );
        }
        Commands::Dump {
            source,
            output,
            indent,
        } => {
            let order = analyze(&source.context())?;
            let writer = open_output(output.as_deref())?;
            let mut writer =
                dump_graph(&order.graph, writer, indent).context("Failed to dump graph")?;
            writer.flush()?;
        }
        Commands::Version => {
            println!("buildseq v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn analyze(ctx: &AnalysisContext) -> Result<DependencyOrder> {
    get_dependency_order(ctx).context("Dependency analysis failed")
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
