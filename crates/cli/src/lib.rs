use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flora_dataset::DatasetHandle;
use flora_protocol::serialize_json;
use flora_search::{TraitFilter, TraitTaxonomy};
use serde::Serialize;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

pub mod command;
pub mod config;
pub mod http_api;
pub mod render;
pub mod report;

pub use command::{execute, CommandAction, CommandOutcome, CommandRequest, CommandResponse};
pub use http_api::router;

use command::{FindPayload, GroupsPayload, SpeciesSelectionPayload, ValuesPayload};
use config::DatasetFlags;

pub(crate) fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "flora")]
#[command(about = "Browse, filter and compare plant species traits", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Trait table (CSV, or TSV by extension). Env: FLORA_DATA
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Field delimiter: a single character or `tab`. Env: FLORA_DELIMITER
    #[arg(long, global = true)]
    delimiter: Option<String>,

    /// Column holding the species name. Env: FLORA_SPECIES_COLUMN
    #[arg(long, global = true)]
    species_column: Option<String>,

    /// Extra cell text read as missing (repeatable)
    #[arg(long = "na-value", global = true, value_name = "TOKEN")]
    na_values: Vec<String>,

    /// Config file (default: ./flora.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// View Traits: every grouped trait recorded for the selected species
    View(ViewArgs),

    /// Find Flowers by Trait: species matching every trait filter
    Find(FindArgs),

    /// Compare Traits: all columns of the selected species side by side
    Compare(CompareArgs),

    /// List species names
    Species(ListArgs),

    /// List trait groups
    Groups(GroupsArgs),

    /// List the values a trait can be filtered by
    Values(ValuesArgs),

    /// Execute a JSON Command API request
    Command(CommandArgs),

    /// Serve Command API over HTTP (POST /command)
    ServeHttp(ServeArgs),
}

impl Commands {
    fn emits_json(&self) -> bool {
        match self {
            Commands::View(args) => args.output.json,
            Commands::Find(args) => args.output.json,
            Commands::Compare(args) => args.output.json,
            Commands::Species(args) => args.output.json,
            Commands::Groups(args) => args.output.json,
            Commands::Values(args) => args.output.json,
            Commands::Command(_) => true,
            Commands::ServeHttp(_) => false,
        }
    }
}

#[derive(Args, Clone, Default)]
struct OutputArgs {
    /// Print the Command API response instead of a table
    #[arg(long)]
    json: bool,

    /// Also write a Markdown report of the page
    #[arg(long, value_name = "PATH")]
    out_md: Option<PathBuf>,
}

#[derive(Args)]
struct ViewArgs {
    /// Species to show
    species: Vec<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct FindArgs {
    /// Trait group to pick traits from (repeatable; inferred from --where when omitted)
    #[arg(long = "group", value_name = "GROUP")]
    groups: Vec<String>,

    /// Trait filter (repeatable; several values for one trait match any of them)
    #[arg(long = "where", value_name = "TRAIT=VALUE")]
    filters: Vec<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct CompareArgs {
    /// Species to compare
    species: Vec<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct ListArgs {
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct GroupsArgs {
    /// Show the member traits present in the table
    #[arg(long)]
    traits: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct ValuesArgs {
    /// Trait column name
    #[arg(value_name = "TRAIT")]
    trait_name: String,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct CommandArgs {
    /// Inline JSON request (mutually exclusive with --file)
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,

    /// Path to file containing the JSON request
    #[arg(long)]
    file: Option<PathBuf>,

    /// Pretty-print JSON response
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:7700
    #[arg(long, default_value = "127.0.0.1:7700")]
    bind: String,
}

/// One page invocation: what to run and how to title its report.
struct PageSpec {
    title: &'static str,
    action: CommandAction,
    payload: serde_json::Value,
    group_traits: bool,
}

impl PageSpec {
    fn new(title: &'static str, action: CommandAction, payload: &impl Serialize) -> Result<Self> {
        Ok(Self {
            title,
            action,
            payload: serde_json::to_value(payload)?,
            group_traits: false,
        })
    }
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    if cli.command.emits_json() {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let cwd = env::current_dir().context("Failed to resolve working directory")?;
    let file_config = config::load_config_file(cli.config.as_deref(), &cwd)?;
    let flags = DatasetFlags {
        data: cli.data.clone(),
        delimiter: cli.delimiter.clone(),
        species_column: cli.species_column.clone(),
        na_values: cli.na_values.clone(),
    };
    let options =
        config::resolve_load_options(&flags, |key| env::var(key).ok(), file_config.as_ref())?;
    log::debug!("Dataset options: {options:?}");
    let dataset = Arc::new(DatasetHandle::new(options));

    match cli.command {
        Commands::View(args) => {
            let payload = SpeciesSelectionPayload {
                species: args.species,
            };
            let spec = PageSpec::new("View Traits", CommandAction::View, &payload)?;
            run_page(&dataset, spec, &args.output)
        }
        Commands::Find(args) => {
            let payload = find_payload(args.groups, &args.filters)?;
            let spec = PageSpec::new("Find Flowers by Trait", CommandAction::Find, &payload)?;
            run_page(&dataset, spec, &args.output)
        }
        Commands::Compare(args) => {
            let payload = SpeciesSelectionPayload {
                species: args.species,
            };
            let spec = PageSpec::new("Compare Traits", CommandAction::Compare, &payload)?;
            run_page(&dataset, spec, &args.output)
        }
        Commands::Species(args) => {
            let spec = PageSpec::new("Species", CommandAction::Species, &serde_json::json!({}))?;
            run_page(&dataset, spec, &args.output)
        }
        Commands::Groups(args) => {
            let mut spec =
                PageSpec::new("Trait Groups", CommandAction::Groups, &GroupsPayload::default())?;
            spec.group_traits = args.traits;
            run_page(&dataset, spec, &args.output)
        }
        Commands::Values(args) => {
            let payload = ValuesPayload {
                trait_name: args.trait_name,
            };
            let spec = PageSpec::new("Trait Values", CommandAction::Values, &payload)?;
            run_page(&dataset, spec, &args.output)
        }
        Commands::Command(args) => run_command(args, &dataset),
        Commands::ServeHttp(args) => http_api::serve_http(&args.bind, dataset).await,
    }
}

/// `TRAIT=VALUE` pairs into a find request. Without explicit groups, the
/// groups owning the filtered traits are selected.
fn find_payload(groups: Vec<String>, raw_filters: &[String]) -> Result<FindPayload> {
    let mut filters = Vec::with_capacity(raw_filters.len());
    for raw in raw_filters {
        let (trait_name, value) = raw
            .split_once('=')
            .with_context(|| format!("Expected TRAIT=VALUE, got {raw:?}"))?;
        filters.push(TraitFilter::new(trait_name.trim(), [value.trim()]));
    }

    let groups = if groups.is_empty() {
        TraitTaxonomy::builtin()
            .groups_owning(filters.iter().map(|filter| filter.trait_name.as_str()))
    } else {
        groups
    };
    Ok(FindPayload { groups, filters })
}

fn run_page(dataset: &DatasetHandle, spec: PageSpec, output: &OutputArgs) -> Result<()> {
    let started = Instant::now();
    let outcome = command::run_action(spec.action, spec.payload, dataset);

    if let (Some(path), Ok(outcome)) = (&output.out_md, &outcome) {
        write_report(path, dataset, spec.title, outcome)?;
    }

    if output.json {
        let response = command::respond(spec.action, &outcome, started);
        print_stdout(&serialize_json(&response)?)?;
        if response.is_error() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let text = match outcome? {
        CommandOutcome::Page(page) => render::render_page(&page, spec.group_traits),
        CommandOutcome::Advisory(advisory) => render::render_advisory(&advisory),
    };
    print_stdout(text.trim_end())
}

fn write_report(
    path: &Path,
    dataset: &DatasetHandle,
    title: &str,
    outcome: &CommandOutcome,
) -> Result<()> {
    let (page, advisory) = match outcome {
        CommandOutcome::Page(page) => (Some(page), None),
        CommandOutcome::Advisory(advisory) => (None, Some(advisory)),
    };
    let md = report::render_page_report(&dataset.options().path, title, page, advisory);
    fs::write(path, md).with_context(|| format!("Failed to write report {}", path.display()))?;
    log::info!("Report written to {}", path.display());
    Ok(())
}

fn run_command(args: CommandArgs, dataset: &DatasetHandle) -> Result<()> {
    let raw = read_payload(&args)?;
    let request: CommandRequest =
        serde_json::from_str(&raw).context("Invalid JSON passed to --json/--file")?;

    let response = command::execute(request, dataset);

    let output = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serialize_json(&response)?
    };
    print_stdout(&output)?;

    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

fn read_payload(args: &CommandArgs) -> Result<String> {
    if let Some(raw) = &args.json {
        return Ok(raw.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read JSON from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Command request is empty. Provide --json, --file, or pipe JSON via stdin.");
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn find_payload_infers_groups_from_filters() {
        let payload = find_payload(
            Vec::new(),
            &[
                "ploidy=2n".to_string(),
                "plant_height = 1-2 m".to_string(),
                "flower_colour=Red".to_string(),
            ],
        )
        .unwrap();
        assert_eq!(payload.groups, ["Botany", "Descriptive"]);
        assert_eq!(payload.filters[1].trait_name, "plant_height");
        assert_eq!(payload.filters[1].values, ["1-2 m"]);
    }

    #[test]
    fn find_payload_keeps_explicit_groups() {
        let payload = find_payload(vec!["Flower".to_string()], &[]).unwrap();
        assert_eq!(payload.groups, ["Flower"]);
        assert!(payload.filters.is_empty());
    }

    #[test]
    fn find_payload_rejects_missing_equals() {
        assert!(find_payload(Vec::new(), &["flower_colour".to_string()]).is_err());
    }
}
