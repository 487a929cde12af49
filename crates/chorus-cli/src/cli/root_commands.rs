use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Root commands for the `chorus` CLI.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Reconstruct a user's activity timeline from the audit log.
    History(HistoryArgs),
    /// Query raw audit records.
    Audit(AuditArgs),
    /// Rebuild one row's field state purely from its audit records.
    Replay(ReplayArgs),
    /// Bundle a user's timeline and catalog data into a .tar.gz archive.
    Export(ExportArgs),
}

/// Arguments for `chorus history`.
#[derive(Clone, Debug, Args)]
pub struct HistoryArgs {
    /// User id.
    #[arg(long)]
    pub user: i64,
    /// Window start, inclusive (RFC 3339 or YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<String>,
    /// Window end, inclusive (RFC 3339 or YYYY-MM-DD; a bare date covers the whole day).
    #[arg(long)]
    pub to: Option<String>,
}

/// Arguments for `chorus audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// Audit table, e.g. song or playlist_song.
    #[arg(long)]
    pub table: Option<String>,
    #[arg(long)]
    pub record: Option<i64>,
    #[arg(long)]
    pub column: Option<String>,
    /// creation, update or deletion.
    #[arg(long)]
    pub polarity: Option<String>,
    #[arg(long)]
    pub from: Option<String>,
    #[arg(long)]
    pub to: Option<String>,
    /// Max rows to return.
    #[arg(short, long)]
    pub limit: Option<u32>,
}

/// Arguments for `chorus replay`.
#[derive(Clone, Debug, Args)]
pub struct ReplayArgs {
    #[arg(long)]
    pub table: String,
    #[arg(long)]
    pub record: i64,
}

/// Arguments for `chorus export`.
#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    /// User id.
    #[arg(long)]
    pub user: i64,
    /// Limit the events history to records at or after this instant.
    #[arg(long)]
    pub from: Option<String>,
    /// Limit the events history to records at or before this instant.
    #[arg(long)]
    pub to: Option<String>,
    /// Archive path. Defaults to `<export.output_dir>/chorus-user-<id>.tar.gz`.
    #[arg(long)]
    pub out: Option<PathBuf>,
}
