use std::path::PathBuf;

use chorus_config::HistoryFormat;
use clap::ValueEnum;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
}

impl From<HistoryFormat> for OutputFormat {
    fn from(format: HistoryFormat) -> Self {
        match format {
            HistoryFormat::Json => Self::Json,
            HistoryFormat::Table => Self::Table,
            HistoryFormat::Csv => Self::Csv,
        }
    }
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    /// `None` means "use `history.default_format` from config".
    pub format: Option<OutputFormat>,
    pub quiet: bool,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub database: Option<String>,
}

impl GlobalFlags {
    /// The output format after applying the configured default.
    #[must_use]
    pub fn format_or(&self, configured: HistoryFormat) -> OutputFormat {
        self.format.unwrap_or_else(|| configured.into())
    }
}
