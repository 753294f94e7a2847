// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};
use survey_cascade_core::ancestry::{build_chain, picker_levels};
use survey_cascade_core::hierarchy::load_rows;
use survey_cascade_core::{
    Answer, CascadeResolver, HierarchyStore, NodeId, ResolverConfig, Settings,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Hierarchy rows (.json or .csv)
    #[arg(long, env = "CASCADE_HIERARCHY", global = true)]
    hierarchy: Option<PathBuf>,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, env = "CASCADE_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the selects for a stored answer
    Resolve(ResolveArgs),
    /// Apply one selection and print the value to store
    Select {
        #[command(flatten)]
        resolve: ResolveArgs,
        /// Level being changed (0-based)
        #[arg(long)]
        level: usize,
        /// New node id; omit to clear the level
        #[arg(long)]
        value: Option<NodeId>,
    },
    /// Ancestor chain and picker selects for a node
    Chain { leaf: NodeId },
    /// The single root node
    Root,
    /// Children of a node (roots when omitted)
    Children { parent: Option<NodeId> },
    /// Length of a geotrace in meters
    Geotrace { points: String },
    /// Area and perimeter of a geoshape
    Geoshape { points: String },
}

#[derive(Args)]
struct ResolveArgs {
    /// Stored answer: JSON (null, id, name or array) or a bare name
    #[arg(long, default_value = "null")]
    answer: String,

    /// Restrict options to one entity type
    #[arg(long)]
    entity_type: Option<String>,

    /// Question whose answer the cascade branches from
    #[arg(long, requires = "parent_answer")]
    parent_question: Option<String>,

    /// Answer to the parent question, same format as --answer
    #[arg(long, requires = "parent_question")]
    parent_answer: Option<String>,
}

impl ResolveArgs {
    fn resolver_config(&self, settings: &Settings) -> ResolverConfig {
        let mut config = settings.resolver_config();
        if let Some(entity) = &self.entity_type {
            config.required_entity_type = Some(entity.clone());
        }
        if let (Some(question), Some(answer)) = (&self.parent_question, &self.parent_answer) {
            config = config.with_parent_source(question, parse_answer(answer));
        }
        config
    }
}

/// JSON when it parses, otherwise the raw text as a legacy name.
fn parse_answer(raw: &str) -> Answer {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        log::debug!("[Cli] Answer {:?} is not JSON ({}); reading it as a name", raw, e);
        Answer::from(raw.trim())
    })
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Logging unavailable: {}", e);
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = path.map_or_else(Settings::config_path, Path::to_path_buf);
    log::debug!("[Cli] Settings file: {}", path.display());
    Settings::load(&path).with_context(|| format!("Failed to load settings from {:?}", path))
}

fn hierarchy_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    if let Some(path) = &cli.hierarchy {
        return Ok(path.clone());
    }
    let path = settings.hierarchy_path.clone().ok_or_else(|| {
        anyhow::anyhow!("No hierarchy file. Pass --hierarchy or set hierarchy_path in settings.")
    })?;
    log::debug!("[Cli] Using hierarchy_path from settings: {}", path.display());
    Ok(path)
}

fn load_store(path: &Path) -> Result<HierarchyStore> {
    let rows = load_rows(path)
        .with_context(|| format!("Failed to read hierarchy rows from {}", path.display()))?;
    let store = HierarchyStore::from_rows(rows);
    log::info!("[Cli] Loaded {} hierarchy nodes from {}", store.len(), path.display());
    Ok(store)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    let settings = load_settings(cli.settings.as_deref())?;

    let open_store =
        || -> Result<HierarchyStore> { load_store(&hierarchy_path(&cli, &settings)?) };

    match &cli.command {
        Commands::Resolve(args) => {
            let store = open_store()?;
            let config = args.resolver_config(&settings);
            let levels =
                CascadeResolver::new(&store, &config).initialize(&parse_answer(&args.answer));
            print_json(&levels)?;
        }
        Commands::Select {
            resolve,
            level,
            value,
        } => {
            let store = open_store()?;
            let config = resolve.resolver_config(&settings);
            let resolver = CascadeResolver::new(&store, &config);
            let levels = resolver.initialize(&parse_answer(&resolve.answer));
            let advance = resolver.advance(&levels, *level, *value)?;
            print_json(&advance)?;
        }
        Commands::Chain { leaf } => {
            let store = open_store()?;
            let chain = build_chain(&store, *leaf)?;
            let levels = picker_levels(&store, &chain);
            print_json(&serde_json::json!({ "chain": chain, "levels": levels }))?;
        }
        Commands::Root => {
            let store = open_store()?;
            print_json(store.find_root()?)?;
        }
        Commands::Children { parent } => {
            let store = open_store()?;
            print_json(&store.children_of(*parent))?;
        }
        Commands::Geotrace { points } => {
            let points = survey_cascade_geo::parse_points(points)?;
            print_json(&serde_json::json!({
                "points": points.len(),
                "distance": survey_cascade_geo::distance(&points),
            }))?;
        }
        Commands::Geoshape { points } => {
            let points = survey_cascade_geo::parse_points(points)?;
            print_json(&survey_cascade_geo::area_and_perimeter(&points))?;
        }
    }

    Ok(())
}
