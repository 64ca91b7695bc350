use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pbxproj_patch::config::Plan;
use pbxproj_patch::driver::{self, RunOptions};
use pbxproj_patch::pbxproj::{self, anchor, GroupIndex, Identifier};

#[derive(Parser)]
#[command(name = "pbxpatch")]
#[command(about = "Add source files to an Xcode project without opening Xcode")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the files listed in a plan to the project
    Apply {
        /// Plan file (JSON)
        plan: PathBuf,

        /// project.pbxproj to patch, overriding the plan
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Directory file paths are relative to, overriding the plan
        #[arg(short, long)]
        source_root: Option<PathBuf>,

        /// File name to skip (repeatable)
        #[arg(long = "skip", value_name = "NAME")]
        skip: Vec<String>,

        /// Skip files the project already references
        #[arg(long)]
        skip_existing: bool,

        /// Print the patched project instead of writing it
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the identifier generated for each key (e.g. fileref_Models/Bias.swift)
    Id {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Render the project's group tree
    Tree {
        project: PathBuf,

        /// Group to start from instead of the main group
        #[arg(long)]
        root: Option<Identifier>,
    },
    /// Report unreachable groups and dangling references
    Check { project: PathBuf },
}

/// Initialize tracing on stderr; stdout carries documents and reports.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "pbxproj_patch=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_project(path: &PathBuf) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Apply {
            plan,
            project,
            source_root,
            skip,
            skip_existing,
            dry_run,
            json,
        } => {
            let mut loaded = Plan::load(&plan)?;
            if project.is_some() {
                loaded.project = project;
            }
            if source_root.is_some() {
                loaded.source_root = source_root;
            }
            loaded.skip.extend(skip);
            loaded.skip_existing |= skip_existing;

            let outcome = driver::run(&loaded, &RunOptions { dry_run })?;
            let report = &outcome.report;

            if json {
                println!("{}", serde_json::to_string_pretty(report)?);
            } else if dry_run {
                print!("{}", outcome.document);
            } else {
                println!("Updated {}", outcome.project.display());
                println!("  {} file references", report.references_added);
                println!("  {} build files", report.build_files_added);
                println!("  {} source phase entries", report.phase_entries_added);
                println!("  {} new groups", report.groups_created);
                println!("  {} children added to existing groups", report.group_children_added);
                for skipped in &report.skipped {
                    println!("  skipped {} ({:?})", skipped.name, skipped.reason);
                }
                for miss in &report.anchor_misses {
                    println!("  not found: {}", miss);
                }
            }
        }
        Commands::Id { keys } => {
            for key in keys {
                println!("{}  {}", Identifier::generate(&key), key);
            }
        }
        Commands::Tree { project, root } => {
            let document = read_project(&project)?;
            let root = root
                .or_else(|| anchor::find_main_group(&document))
                .context("No mainGroup in project; pass --root")?;
            let index = GroupIndex::scan(&document);
            print!("{}", pbxproj::render_tree(&index, &root));
        }
        Commands::Check { project } => {
            let document = read_project(&project)?;
            let report = pbxproj::check(&document);

            match &report.main_group {
                Some(root) => println!("main group: {}", root),
                None => println!("main group: not found"),
            }
            for group in &report.unreachable_groups {
                println!("unreachable group: {}", group);
            }
            for (group, child) in &report.dangling_children {
                println!("dangling child: {} in group {}", child, group);
            }
            for file_ref in &report.dangling_file_refs {
                println!("dangling fileRef: {}", file_ref);
            }
            for id in &report.duplicate_ids {
                println!("duplicate identifier: {}", id);
            }

            if !report.is_clean() {
                std::process::exit(1);
            }
            println!("ok");
        }
    }

    Ok(())
}
