//! Command-line interface of the `tld_reconciler` binary.

pub mod commands;
pub mod table;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub use commands::run;

#[derive(Parser, Debug)]
#[command(name = "tld_reconciler")]
#[command(about = "Reconciles IANA TLD data and groups delegated TLDs by RDAP service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./config/tld_reconciler.toml when present)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose logging (use -v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download changed IANA sources and rebuild the unified dataset
    Update {
        /// Ignore cached metadata and download every source
        #[arg(long)]
        force: bool,
    },

    /// Count TLDs per source, category and encoding
    Analyze {
        #[arg(long)]
        json: bool,
    },

    /// Compare a source against delegated root zone database entries
    Compare {
        #[arg(value_enum)]
        source: CompareTarget,

        #[arg(long)]
        json: bool,
    },

    /// Build the unified dataset from the stored sources
    Build {
        /// Write the dataset here instead of the data directory
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Check curated supplemental data against the stored sources
    Check,

    /// TLD counts per manager, with aliased managers folded together
    Managers {
        #[arg(long)]
        json: bool,
    },

    /// Show one TLD and its RDAP servers (ASCII or Unicode label)
    Lookup { tld: String },

    /// Serve the JSON API
    Serve {
        /// Overrides server.host from the configuration
        #[arg(long)]
        host: Option<String>,

        /// Overrides server.port from the configuration
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareTarget {
    Bootstrap,
    TldList,
}

impl Commands {
    /// Default log level when no -v flag is given
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Commands::Serve { .. } | Commands::Update { .. } => "info",
            _ => "warn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compare() {
        let cli = Cli::parse_from(["tld_reconciler", "-vv", "compare", "tld-list", "--json"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Compare { source, json } => {
                assert_eq!(source, CompareTarget::TldList);
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["tld_reconciler", "serve", "--port", "9000", "--config", "x.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Commands::Serve { host: None, port: Some(9000) }));
        assert_eq!(cli.command.default_log_level(), "info");
    }

    #[test]
    fn test_rejects_unknown_compare_target() {
        assert!(Cli::try_parse_from(["tld_reconciler", "compare", "whois"]).is_err());
    }
}
