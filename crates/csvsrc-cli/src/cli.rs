//! CLI argument definitions for csvsrc.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use csvsrc_model::{FailurePolicy, HeaderPolicy};

use csvsrc_cli::config::SourceOverrides;

#[derive(Parser)]
#[command(
    name = "csvsrc",
    version,
    about = "Browse and query delimited text files as tables",
    long_about = "Discover CSV, TSV and gzip-compressed delimited files matched by path globs,\n\
                  infer a text schema for each, and stream their rows."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub source: SourceArgs,

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
}

/// Connection options; flags override values from `--config`.
#[derive(Args)]
pub struct SourceArgs {
    /// TOML connection file.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Path or glob pattern to load (repeatable; replaces the file's paths).
    #[arg(long = "path", value_name = "GLOB", global = true)]
    pub paths: Vec<String>,

    /// Field separator (first character is used).
    #[arg(long = "separator", value_name = "CHAR", global = true)]
    pub separator: Option<String>,

    /// Comment marker (first character is used; empty disables comments).
    #[arg(long = "comment", value_name = "CHAR", global = true)]
    pub comment: Option<String>,

    /// Header row handling.
    #[arg(long = "header", value_enum, global = true)]
    pub header: Option<HeaderArg>,

    /// What to do when a file cannot be loaded.
    #[arg(long = "on-error", value_enum, global = true)]
    pub on_error: Option<OnErrorArg>,
}

impl SourceArgs {
    pub fn overrides(&self) -> SourceOverrides {
        SourceOverrides {
            paths: self.paths.clone(),
            separator: self.separator.clone(),
            comment: self.comment.clone(),
            header: self.header.map(|h| match h {
                HeaderArg::Auto => HeaderPolicy::Auto,
                HeaderArg::On => HeaderPolicy::On,
                HeaderArg::Off => HeaderPolicy::Off,
            }),
            on_error: self.on_error.map(|p| match p {
                OnErrorArg::Skip => FailurePolicy::Skip,
                OnErrorArg::Abort => FailurePolicy::Abort,
            }),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List discovered tables.
    Tables,

    /// Show the columns of one table.
    Describe(DescribeArgs),

    /// Stream the rows of one table.
    Query(QueryArgs),
}

#[derive(Parser)]
pub struct DescribeArgs {
    /// Table name as shown by `tables`.
    #[arg(value_name = "TABLE")]
    pub table: String,
}

#[derive(Parser)]
pub struct QueryArgs {
    /// Table name as shown by `tables`.
    #[arg(value_name = "TABLE")]
    pub table: String,

    /// Stop after this many rows.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,

    /// Row output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: RowFormatArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum HeaderArg {
    Auto,
    On,
    Off,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OnErrorArg {
    Skip,
    Abort,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RowFormatArg {
    Table,
    Jsonl,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
