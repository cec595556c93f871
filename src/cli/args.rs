//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Family trees from flat genealogy snapshots: group, build, search
#[derive(Parser, Debug)]
#[command(name = "famtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d -d -d)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Family snapshot (.json or .toml); overrides `data_file`
    #[arg(short, long, global = true, env = "FAMTREE_FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List families in the snapshot
    Families,

    /// Build a family tree, optionally filtered by a search term
    Tree {
        /// Family id or name
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        family: Option<String>,

        /// Build every family
        #[arg(short, long)]
        all: bool,

        /// Keep only branches leading to names containing TERM
        #[arg(short, long, value_name = "TERM")]
        search: Option<String>,

        /// Output format (default from config)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show snapshot statistics
    Stats,

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

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}
