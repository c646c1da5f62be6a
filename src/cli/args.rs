//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::SelectorKind;

/// Antibiotic therapy advisor for urinary tract infections
#[derive(Parser, Debug)]
#[command(name = "uti-advisor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (overrides the global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Decision tree file (.toml or .json) instead of the embedded one
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub tree: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Answer picker (overrides the configured one)
    #[arg(long, global = true, value_enum)]
    pub selector: Option<SelectorKind>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer the questionnaire and show the recommendation
    Consult {
        /// Answers in order (skips the interactive prompts they cover)
        #[arg(short, long, value_delimiter = ',')]
        answers: Vec<String>,
        /// Write the highlighted tree as SVG
        #[arg(long, value_hint = ValueHint::FilePath)]
        svg: Option<PathBuf>,
        /// Print the consultation as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Do not print the highlighted tree
        #[arg(long)]
        no_graph: bool,
    },

    /// Show the decision tree
    Tree {
        /// Restrict to one clinical situation
        #[arg(short, long)]
        situation: Option<String>,
    },

    /// List the clinical situations
    Situations,

    /// Print the laid-out graph as JSON
    Layout {
        /// Restrict to one clinical situation
        #[arg(short, long, conflicts_with = "answers")]
        situation: Option<String>,
        /// Highlight the path of these answers
        #[arg(short, long, value_delimiter = ',')]
        answers: Vec<String>,
    },

    /// Write the highlighted tree for a set of answers as SVG
    Render {
        /// Answers in order
        #[arg(short, long, value_delimiter = ',', required = true)]
        answers: Vec<String>,
        /// Output file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Check a decision tree file
    Validate {
        /// Tree file (.toml or .json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
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

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create config template
    Init {
        /// Target file (default: global config path)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
