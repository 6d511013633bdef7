use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelkeep")]
#[command(author, version, about = "Personal media-library discovery and matching tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan library roots, match discovered files, and persist the catalog
    Scan {
        /// Directories to scan (overrides configured roots)
        roots: Vec<PathBuf>,

        /// Library name to file results under
        #[arg(long, default_value = "default")]
        library: String,

        /// Discover and parse only; skip provider matching
        #[arg(long)]
        no_match: bool,
    },

    /// Re-run provider matching for unresolved catalog items
    Match {
        /// Library name
        #[arg(long, default_value = "default")]
        library: String,
    },

    /// Show catalog match counts for a library
    Status {
        /// Library name
        #[arg(long, default_value = "default")]
        library: String,
    },

    /// Delete expired provider cache entries
    SweepCache,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
