//! kvskew CLI entry point

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use kvskew::config::cli::Cli;
use kvskew::config::cli_convert::build_run_config;
use kvskew::config::toml::{parse_toml_file, FileDefaults};
use kvskew::config::validator::validate_config;
use kvskew::config::RunConfig;
use kvskew::output::{json, text};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
            let _ = e.print();
            return code;
        }
    };

    init_tracing(cli.flags().debug);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the default level
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let flags = cli.flags();

    let defaults = match &flags.config {
        Some(path) => parse_toml_file(path)?,
        None => FileDefaults::default(),
    };

    let config = build_run_config(&cli.command, &defaults)?;

    if flags.dry_run {
        validate_config(&config).context("Configuration validation failed")?;
        print_configuration(&config);
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    print_configuration(&config);
    println!();

    // Validated by the coordinator before the backend is opened
    let report = kvskew::coordinator::run(&config)?;

    text::print_results(&report);

    if let Some(path) = &config.output.json {
        json::write_json_output(&report, path)?;
        println!("JSON report written to {}", path.display());
    }

    Ok(())
}

fn print_configuration(config: &RunConfig) {
    let workload = &config.workload;

    println!("kvskew v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Configuration:");
    println!("  Database:    {} ({} backend)", config.db_path.display(), config.backend);
    println!("  Mode:        {}", workload.mode);
    println!("  Policy:      {}", workload.policy);
    println!("  Keys:        {}", workload.num_keys);
    println!("  Operations:  {}", workload.ops());
    if config.partitions.hot.is_some() {
        println!(
            "  Hot range:   [{}, {}] at {}%",
            workload.hot_start, workload.hot_end, workload.hot_ratio
        );
    }
    println!("  Value size:  {} bytes", workload.value_size);
    if !workload.key_prefix.is_empty() {
        println!("  Key prefix:  {}", workload.key_prefix);
    }
    match config.runtime.seed {
        Some(seed) => println!("  Seed:        {}", seed),
        None => println!("  Seed:        random"),
    }
    println!("  On error:    {:?}", config.runtime.error_policy);
    println!("  [default]    {}", config.partitions.default);
    if let Some(hot) = &config.partitions.hot {
        println!("  [hot]        {}", hot);
    }
}
