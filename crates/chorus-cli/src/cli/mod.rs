use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `chorus` binary.
#[derive(Debug, Parser)]
#[command(name = "chorus", version, about = "chorus - music catalog audit log and user timelines")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, csv (defaults to history.default_format)
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra TOML config file, layered below environment variables
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path, overriding database.path
    #[arg(short, long, global = true)]
    pub database: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            config: self.config.clone(),
            database: self.database.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chorus_config::HistoryFormat;
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn history_parses_window() {
        let cli = Cli::try_parse_from([
            "chorus",
            "history",
            "--user",
            "7",
            "--from",
            "2026-03-01",
            "--to",
            "2026-03-02T12:00:00Z",
        ])
        .expect("cli should parse");

        let Commands::History(args) = cli.command else {
            panic!("expected history");
        };
        assert_eq!(args.user, 7);
        assert_eq!(args.from.as_deref(), Some("2026-03-01"));
        assert_eq!(args.to.as_deref(), Some("2026-03-02T12:00:00Z"));
    }

    #[test]
    fn export_parses_window() {
        let cli = Cli::try_parse_from([
            "chorus", "export", "--user", "7", "--from", "2026-03-01", "--out", "ana.tar.gz",
        ])
        .expect("cli should parse");

        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.from.as_deref(), Some("2026-03-01"));
        assert_eq!(args.to, None);
        assert_eq!(args.out, Some(PathBuf::from("ana.tar.gz")));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "chorus", "replay", "--table", "song", "--record", "3", "--format", "csv", "--quiet",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, Some(OutputFormat::Csv));
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Replay(_)));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["chorus", "--format", "xml", "history", "--user", "1"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_format_falls_back_to_config() {
        let cli = Cli::try_parse_from(["chorus", "history", "--user", "1"]).expect("cli should parse");
        let flags = cli.global_flags();
        assert_eq!(flags.format_or(HistoryFormat::Table), OutputFormat::Table);
    }
}
