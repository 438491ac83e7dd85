//! Defines the command-line arguments and subcommands for sutra-fmt.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "sutra-fmt",
    version,
    about = "A rule-based, width-aware formatter for s-expressions."
)]
pub struct FmtArgs {
    /// Log formatting decisions to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Format files or directories; with no paths, format stdin to stdout.
    Format {
        /// Files or directories to format.
        paths: Vec<PathBuf>,
        #[command(flatten)]
        layout: LayoutOptions,
        /// Rewrite files in place instead of printing them.
        #[arg(long)]
        write: bool,
    },
    /// Show what formatting would change; exits with status 1 if anything would.
    Check {
        /// Files or directories to check.
        paths: Vec<PathBuf>,
        #[command(flatten)]
        layout: LayoutOptions,
    },
    /// Show the tree the reader builds for a file.
    Tree {
        /// The path to the file to read.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// List the default formatting rules in dispatch order.
    ListRules,
}

/// Options that override the discovered configuration.
#[derive(Debug, Clone, Default, Args)]
pub struct LayoutOptions {
    /// Page width in columns.
    #[arg(short, long)]
    pub width: Option<usize>,
    /// Configuration file to use instead of searching for `.sutrafmt.json`.
    #[arg(long)]
    pub config: Option<PathBuf>,
}
