//! loadsplit CLI - slack-priority task allocation
//!
//! Reads tasks and resources, runs the allocator and writes the schedule.

mod config;
mod input;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use loadsplit_core::{Allocator, Renderer, Resource, Task, Time};
use loadsplit_render::{DelimitedRenderer, TextRenderer, TimeFormat};
use loadsplit_solver::{collect_input_errors, SlackBalancer};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{FileConfig, OutputFormat};

#[derive(Parser)]
#[command(name = "loadsplit")]
#[command(author, version, about = "Slack-priority task allocator", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (defaults to ./loadsplit.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Task file (JSON array or delimited text)
    #[arg(short, long, value_name = "FILE", requires = "resources")]
    tasks: Option<PathBuf>,

    /// Resource file (JSON array or delimited text)
    #[arg(short, long, value_name = "FILE", requires = "tasks")]
    resources: Option<PathBuf>,

    /// Combined JSON file with `tasks` and `resources`
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["tasks", "resources"])]
    input: Option<PathBuf>,

    /// Separator of delimited input files
    #[arg(long, default_value_t = ';')]
    input_separator: char,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate tasks to resources and write the schedule
    Allocate {
        #[command(flatten)]
        input: InputArgs,

        /// Rebalancing passes (0 keeps the greedy assignment)
        #[arg(short = 'k', long, env = "LOADSPLIT_ITERATIONS")]
        iterations: Option<usize>,

        /// Length of a calendar day in time units
        #[arg(long)]
        day_length: Option<Time>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Field separator of delimited output
        #[arg(long)]
        separator: Option<char>,

        /// Calendar time of time zero, e.g. 2025-01-06T08:00:00
        #[arg(long)]
        origin: Option<NaiveDateTime>,

        /// List rebalancing moves in text output
        #[arg(long)]
        show_moves: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate input without allocating
    Check {
        #[command(flatten)]
        input: InputArgs,

        /// Length of a calendar day in time units
        #[arg(long)]
        day_length: Option<Time>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = FileConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Allocate {
            input,
            iterations,
            day_length,
            format,
            separator,
            origin,
            show_moves,
            output,
        } => {
            let mut allocator = file_config.allocator;
            if let Some(iterations) = iterations {
                allocator.rebalancing_iterations = iterations;
            }
            if let Some(day_length) = day_length {
                allocator.day_length = day_length;
            }

            let (tasks, resources) = load_input(&input)?;
            info!(
                tasks = tasks.len(),
                resources = resources.len(),
                iterations = allocator.rebalancing_iterations,
                "allocating"
            );

            let allocation = SlackBalancer::with_config(allocator)
                .allocate(&tasks, &resources)
                .context("allocation failed")?;

            let time_format = match origin.or(file_config.output.origin) {
                Some(origin) => TimeFormat::Anchored(origin),
                None => TimeFormat::Units,
            };
            let rendered = match format.unwrap_or(file_config.output.format) {
                OutputFormat::Delimited => DelimitedRenderer::new()
                    .separator(separator.unwrap_or(file_config.output.separator))
                    .time_format(time_format)
                    .render(&allocation)?,
                OutputFormat::Text => {
                    let mut renderer = TextRenderer::new().time_format(time_format);
                    if show_moves {
                        renderer = renderer.with_moves();
                    }
                    renderer.render(&allocation)?
                }
                OutputFormat::Json => {
                    let mut json = serde_json::to_string_pretty(&allocation)?;
                    json.push('\n');
                    json
                }
            };

            write_output(output.as_deref(), &rendered)?;
        }

        Commands::Check { input, day_length } => {
            let mut allocator = file_config.allocator;
            if let Some(day_length) = day_length {
                allocator.day_length = day_length;
            }

            let (tasks, resources) = load_input(&input)?;
            let errors = collect_input_errors(&tasks, &resources, &allocator);
            if !errors.is_empty() {
                for err in &errors {
                    eprintln!("error: {}", err);
                }
                bail!("{} input error(s)", errors.len());
            }

            println!(
                "OK: {} tasks, {} resources",
                tasks.len(),
                resources.len()
            );
        }
    }

    Ok(())
}

fn load_input(args: &InputArgs) -> Result<(Vec<Task>, Vec<Resource>)> {
    if let Some(path) = &args.input {
        debug!(path = %path.display(), "reading combined input");
        let bundle = input::read_bundle(path)?;
        return Ok((bundle.tasks, bundle.resources));
    }

    match (&args.tasks, &args.resources) {
        (Some(tasks), Some(resources)) => {
            debug!(
                tasks = %tasks.display(),
                resources = %resources.display(),
                "reading input files"
            );
            Ok((
                input::read_tasks(tasks, args.input_separator)?,
                input::read_resources(resources, args.input_separator)?,
            ))
        }
        _ => bail!("either --input or both --tasks and --resources are required"),
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "schedule written");
        }
        None => print!("{}", content),
    }
    Ok(())
}
