//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for roundtable.

use clap::{Parser, Subcommand};

/// Roundtable - multi-persona discussion turn-taking engine
///
/// Decides who speaks next in a simulated discussion, what kind of
/// contribution it is, and how the utterance is phrased.
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Roundtable - multi-persona discussion turn-taking engine", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors (command output on stdout is unaffected)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate a discussion with the scripted generator
    Simulate {
        /// Discussion topic
        #[arg(short, long)]
        topic: String,

        /// Number of turns to run
        #[arg(short = 'n', long, default_value = "10")]
        turns: u32,

        /// Seed for reproducible runs (overrides config)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Path to configuration file
        #[arg(short, long, env = "ROUNDTABLE_CONFIG")]
        config: Option<String>,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Print the transcript and analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a recorded discussion history (JSON array of messages)
    Analyze {
        /// History file
        #[arg(long)]
        history: String,

        /// Path to configuration file
        #[arg(short, long, env = "ROUNDTABLE_CONFIG")]
        config: Option<String>,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect persona catalogs and trigger tables
    Catalog {
        #[command(subcommand)]
        subcommand: CatalogSubcommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version information
    Version,
}

/// Catalog file overrides
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// Persona catalog (TOML)
    #[arg(long)]
    pub personas: Option<String>,

    /// Trigger table (TOML)
    #[arg(long)]
    pub triggers: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CatalogSubcommand {
    /// List personas and the roles they use
    List {
        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// Validate a catalog against a trigger table
    Validate {
        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// List the known persona roles
    Roles,
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
