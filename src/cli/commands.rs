//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Fetch the ticker reference catalog into a file or a warehouse table
#[derive(Parser, Debug)]
#[command(name = "ticker-ingest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Destination for fetched records
    #[arg(short, long, value_enum, default_value = "file")]
    pub sink: SinkKind,

    /// .env file to load before reading the environment
    #[arg(short, long)]
    pub env_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Where records are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SinkKind {
    /// Append to a CSV file
    File,
    /// Insert into a warehouse table
    Warehouse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ticker-ingest"]);
        assert_eq!(cli.sink, SinkKind::File);
        assert!(cli.env_file.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_warehouse_sink() {
        let cli = Cli::parse_from(["ticker-ingest", "--sink", "warehouse", "-e", "prod.env", "-v"]);
        assert_eq!(cli.sink, SinkKind::Warehouse);
        assert_eq!(cli.env_file, Some(PathBuf::from("prod.env")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_unknown_sink_rejected() {
        assert!(Cli::try_parse_from(["ticker-ingest", "--sink", "s3"]).is_err());
    }
}
