//! CLI argument definitions for `nom024`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use nom024_model::CatalogType;
use tracing::level_filters::LevelFilter;

use crate::logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "nom024",
    version,
    about = "NOM-024 catalog lookups and compliance validation",
    long_about = "Load the NOM-024 reference catalogs and validate clinical data against them.\n\n\
                  Validation commands print a JSON result and exit with status 1 when\n\
                  the input is rejected."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Catalog directory (default: $NOM024_CATALOG_DIR, then ./catalogs at the workspace root).
    #[arg(long = "catalog-dir", value_name = "DIR", global = true)]
    pub catalog_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load every configured catalog and print per-catalog status.
    Catalogs,

    /// Look up one code in a catalog.
    Lookup(LookupArgs),

    /// Case-insensitive substring search over codes and descriptions.
    Search(SearchArgs),

    /// List the municipalities of a state.
    Municipalities(MunicipalitiesArgs),

    /// Validate a geography payload.
    Geo(GeoArgs),

    /// Validate diagnoses against sex and age restrictions.
    Diagnosis(DiagnosisArgs),

    /// Resolve the regulatory policy for a provider.
    Policy(PolicyArgs),
}

#[derive(Args)]
pub struct LookupArgs {
    /// Catalog dataset name (e.g. CIE10) or key (e.g. diagnoses).
    #[arg(value_name = "CATALOG")]
    pub catalog: CatalogType,

    #[arg(value_name = "CODE")]
    pub code: String,
}

#[derive(Args)]
pub struct SearchArgs {
    #[arg(value_name = "CATALOG")]
    pub catalog: CatalogType,

    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of hits (default 20, capped at 100).
    #[arg(long = "limit")]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct MunicipalitiesArgs {
    #[arg(value_name = "STATE")]
    pub state: String,
}

#[derive(Args)]
pub struct GeoArgs {
    /// State code (or NE/00 when not applicable).
    #[arg(long = "entidad")]
    pub entidad: Option<String>,

    #[arg(long = "municipio")]
    pub municipio: Option<String>,

    #[arg(long = "localidad")]
    pub localidad: Option<String>,

    /// Five-digit postal code.
    #[arg(long = "cp")]
    pub codigo_postal: Option<String>,
}

#[derive(Args)]
pub struct DiagnosisArgs {
    /// Principal diagnosis code.
    #[arg(long = "principal")]
    pub principal: Option<String>,

    /// Complementary diagnosis codes.
    #[arg(long = "complementary", num_args = 1..)]
    pub complementary: Vec<String>,

    /// Patient sex (F/M, H, FEMENINO, MASCULINO...).
    #[arg(long = "sex")]
    pub sex: Option<String>,

    /// Birth date (YYYY-MM-DD).
    #[arg(long = "birth-date")]
    pub birth_date: Option<String>,

    /// Encounter date (YYYY-MM-DD, default today).
    #[arg(long = "encounter-date")]
    pub encounter_date: Option<String>,

    /// Where restriction rules come from.
    #[arg(long = "strategy", value_enum, default_value = "layered")]
    pub strategy: StrategyArg,
}

#[derive(Args)]
pub struct PolicyArgs {
    #[arg(value_name = "PROVIDER")]
    pub provider: String,

    /// Provider directory (TOML with [[providers]] tables).
    #[arg(long = "providers", value_name = "FILE")]
    pub providers: PathBuf,

    /// Document draft (JSON) to check against the resolved policy.
    #[arg(long = "draft", value_name = "FILE")]
    pub draft: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Built-in prefix table only.
    Static,
    /// CIE-10 catalog restriction columns only.
    Catalog,
    /// Catalog first, then the built-in table.
    Layered,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
