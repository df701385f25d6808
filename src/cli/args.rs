//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Count top-level domains in dated hostname logs
#[derive(Parser, Debug)]
#[command(name = "tldtally")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: $XDG_CONFIG_HOME/tldtally/tldtally.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the share of each TLD among observations in range
    Count {
        #[command(flatten)]
        tally: TallyArgs,

        /// Print line counters after the report
        #[arg(short, long)]
        summary: bool,
    },

    /// Show the balanced tree built from the observations
    Tree {
        #[command(flatten)]
        tally: TallyArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Date range, inputs and extraction overrides shared by tally commands.
#[derive(Args, Debug)]
pub struct TallyArgs {
    /// First day counted, inclusive (day/month/year)
    pub begin: String,

    /// Last day counted, inclusive (day/month/year)
    pub end: String,

    /// Log files with `<day/month/year> <hostname>` lines (default: stdin)
    #[arg(value_hint = ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Separator before the top-level domain
    #[arg(long)]
    pub separator: Option<char>,

    /// Count hostnames without a separator as their own TLD instead of skipping them
    #[arg(long)]
    pub whole_hostname: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
}
