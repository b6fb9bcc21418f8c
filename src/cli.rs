use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

pub const DEFAULT_INPUT: &str = "public/data/raw/Ringkasan Saham-20260115.xlsx";
pub const DEFAULT_FEED: &str = "public/data/stocks.json";

/// Converts the IDX daily stock summary into a JSON feed and renders it.
#[derive(Debug, Parser)]
#[command(name = "stock-feed", version)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read the spreadsheet and overwrite the JSON feed.
    Extract(ExtractArgs),
    /// Print the first rows of the spreadsheet as JSON.
    Inspect(InspectArgs),
    /// Load the feed and print the dashboard.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct SheetArgs {
    #[arg(long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Sheet name; the first sheet when omitted.
    #[arg(long)]
    pub sheet: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    #[arg(long, default_value = DEFAULT_FEED)]
    pub output: PathBuf,

    /// Timestamp for rows without a trading date (RFC 3339). Defaults to now.
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,

    /// Fail unless the header row matches the expected column names.
    #[arg(long)]
    pub strict_headers: bool,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    #[arg(long, default_value_t = 5)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(long, default_value = DEFAULT_FEED)]
    pub feed: PathBuf,

    /// Case-insensitive match on stock code or name.
    #[arg(long, default_value = "")]
    pub search: String,
}
