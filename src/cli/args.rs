//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    brand::BrandArgs, check::CheckArgs, completions::CompletionsArgs, init::InitArgs,
    item::ItemCommands, pack::PackCommands, tag::TagCommands,
};

#[derive(Parser)]
#[command(name = "gear")]
#[command(author, version, about = "Backpacking gear inventory")]
#[command(
    long_about = "Catalogue backpacking gear under a Top / Middle / Base tag hierarchy, assemble packs and weigh them."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Project root (default: auto-detect by finding .gear/)
    #[arg(long, global = true, env = "GEAR_PROJECT")]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new gear project
    Init(InitArgs),

    /// Gear item management
    #[command(subcommand)]
    Item(ItemCommands),

    /// Tag hierarchy management
    #[command(subcommand)]
    Tag(TagCommands),

    /// Pack assembly and weight analysis
    #[command(subcommand)]
    Pack(PackCommands),

    /// Look up a brand's web domain
    Brand(BrandArgs),

    /// Verify every item's tag path exists in the hierarchy
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Replace `Auto` with the command's natural format
    pub fn or(self, fallback: OutputFormat) -> OutputFormat {
        match self {
            OutputFormat::Auto => fallback,
            f => f,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["gear", "-vv", "check"]).unwrap();
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn test_format_or() {
        assert_eq!(OutputFormat::Auto.or(OutputFormat::Tsv), OutputFormat::Tsv);
        assert_eq!(OutputFormat::Json.or(OutputFormat::Tsv), OutputFormat::Json);
    }
}
