//! addaat: derive stream-network topology items for a line coverage's arc
//! attribute table and write them back in place.

mod config;
mod pipeline;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use aat_catalog::InfoCatalog;
use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::AddaatConfig;
use pipeline::Request;

#[derive(Parser)]
#[command(
    name = "addaat",
    version,
    about = "Add contributing area and stream orders to an arc attribute table"
)]
struct Cli {
    /// Coverage name (its table is <COVER>.AAT in the workspace catalog)
    cover: Option<String>,
    /// Directory holding info/ and the coverage (default: current directory)
    #[arg(short, long)]
    workspace: Option<PathBuf>,
    /// Configuration file (default: addaat.toml found from the workspace upward)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Square metres per local cell, overriding the configuration
    #[arg(long)]
    cell_area: Option<f64>,
    /// Compute and report without rewriting the table
    #[arg(long)]
    dry_run: bool,
    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let Some(cover) = cli.cover.clone() else {
        // No cover: usage only.
        if let Err(e) = print_usage(&mut std::io::stdout().lock()) {
            eprintln!("error: writing usage: {e}");
            process::exit(1);
        }
        return;
    };

    init_logging(cli.verbose);

    if let Err(e) = run(&cli, cover) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn print_usage<W: Write>(out: &mut W) -> io::Result<()> {
    Cli::command().write_help(out)?;
    writeln!(out)?;
    out.flush()
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, cover: String) -> Result<()> {
    let workspace = match &cli.workspace {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let config = load_config(&workspace, cli.config.as_deref())?;

    let cell_area = cli.cell_area.unwrap_or(config.network.cell_area);
    config::check_cell_area(cell_area)?;

    let request = Request {
        cover,
        cell_area,
        fields: config.fields,
        dry_run: cli.dry_run,
    };
    let catalog = InfoCatalog::new(&workspace);
    let summary = pipeline::execute(&catalog, &request)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

/// Explicit `--config` must exist; otherwise search upward, falling back to
/// defaults.
fn load_config(workspace: &Path, explicit: Option<&Path>) -> Result<AddaatConfig> {
    if let Some(path) = explicit {
        return AddaatConfig::load(path);
    }
    match AddaatConfig::find_and_load(workspace)? {
        Some((config, path)) => {
            debug!(path = %path.display(), "loaded configuration");
            Ok(config)
        }
        None => Ok(AddaatConfig::default()),
    }
}
