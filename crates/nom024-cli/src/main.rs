//! `nom024` command-line entry point.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

use nom024_cli::cli::{Cli, Command};
use nom024_cli::commands::{
    run_catalogs, run_diagnosis, run_geo, run_lookup, run_municipalities, run_policy, run_search,
};
use nom024_cli::logging::{LogConfig, init_logging};
use nom024_cli::summary::print_catalog_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let catalog_dir = cli.catalog_dir.as_deref();
    let exit_code = match &cli.command {
        Command::Catalogs => exit_with(run_catalogs(catalog_dir), |(stats, report)| {
            print_catalog_summary(stats, report);
            report.failed_mandatory().is_empty()
        }),
        Command::Lookup(args) => exit_with(run_lookup(catalog_dir, args), |entry| {
            print_json(entry) && entry.is_some()
        }),
        Command::Search(args) => exit_with(run_search(catalog_dir, args), print_json),
        Command::Municipalities(args) => {
            exit_with(run_municipalities(catalog_dir, args), print_json)
        }
        Command::Geo(args) => exit_with(run_geo(catalog_dir, args), |validation| {
            print_json(validation) && validation.valid
        }),
        Command::Diagnosis(args) => exit_with(run_diagnosis(catalog_dir, args), |report| {
            print_json(report) && report.ok()
        }),
        Command::Policy(args) => exit_with(run_policy(catalog_dir, args), |report| {
            print_json(report) && report.ok()
        }),
    };
    std::process::exit(exit_code);
}

/// 0 when the command ran and `report` judged its output acceptable.
fn exit_with<T>(result: anyhow::Result<T>, report: impl FnOnce(&T) -> bool) -> i32 {
    match result {
        Ok(value) => {
            if report(&value) {
                0
            } else {
                1
            }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            true
        }
        Err(error) => {
            eprintln!("error: failed to render output: {error}");
            false
        }
    }
}

/// An explicit `--log-level` wins over `-v/-q`; with neither, `RUST_LOG` may
/// override the default level.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let explicit = cli.log_level.map(LevelFilter::from);
    LogConfig {
        level_filter: explicit.unwrap_or_else(|| cli.verbosity.tracing_level_filter()),
        use_env_filter: explicit.is_none() && !cli.verbosity.is_present(),
        with_ansi: match cli.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
        },
        format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
    }
}
