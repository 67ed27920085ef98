use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::Level;

use depth_images::{
    DirectoryContext, FallbackChain, LocationContext, LocationError, PathResolver, ResolverConfig,
    SiteLayout,
};

/// Rewrite image references for the directory depth of the page that displays them.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON configuration file; defaults to depth_images.config.json in the working directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log resolution details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved form of each path, one per line.
    Resolve {
        /// URL or path of the page displaying the images.
        #[arg(long)]
        page: String,
        /// Image references as written in the markup.
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Print a JSON plan with the resolved path and fallback sources of each path.
    Plan {
        /// URL or path of the page displaying the images.
        #[arg(long)]
        page: String,
        /// Image references as written in the markup.
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[derive(Debug, Serialize)]
struct PlanEntry {
    declared: String,
    context: DirectoryContext,
    resolved: String,
    fallbacks: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let layout = load_layout(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Command::Resolve { page, paths } => {
            for resolved in resolve_paths(&layout, &page, &paths)? {
                println!("{resolved}");
            }
        }
        Command::Plan { page, paths } => {
            let plan = build_plan(&layout, &page, &paths)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("failed to serialise plan")?
            );
        }
    }

    Ok(())
}

fn load_layout(config: Option<&Path>, search_dir: &Path) -> Result<SiteLayout> {
    let config = match config {
        Some(path) => ResolverConfig::from_path(path)?,
        None => ResolverConfig::discover(search_dir),
    };
    Ok(config.into_layout())
}

/// Classify the page, treating pages without a directory path as served from the root.
fn page_context(layout: &SiteLayout, page: &str) -> Result<LocationContext> {
    match LocationContext::from_url(page, layout) {
        Ok(context) => Ok(context),
        Err(err @ LocationError::Opaque { .. }) => {
            tracing::warn!("{err}; resolving as a root page");
            Ok(LocationContext::root())
        }
        Err(err) => Err(err.into()),
    }
}

fn resolve_paths(layout: &SiteLayout, page: &str, paths: &[String]) -> Result<Vec<String>> {
    let context = page_context(layout, page)?;
    let resolver = PathResolver::new(layout.clone());
    Ok(paths
        .iter()
        .map(|path| resolver.resolve(path, &context))
        .collect())
}

fn build_plan(layout: &SiteLayout, page: &str, paths: &[String]) -> Result<Vec<PlanEntry>> {
    let context = page_context(layout, page)?;
    let resolver = PathResolver::new(layout.clone());
    Ok(paths
        .iter()
        .map(|declared| {
            let resolved = resolver.resolve(declared, &context);
            let fallbacks = FallbackChain::new(layout, declared, &resolved).remaining();
            PlanEntry {
                declared: declared.clone(),
                context: context.directory(),
                resolved,
                fallbacks,
            }
        })
        .collect())
}
