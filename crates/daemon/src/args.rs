pub use clap::Parser;

use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "fileshare")]
#[command(version, about = "Share a directory and a text note over HTTP")]
pub struct Args {
    /// Port to listen on (defaults to 8000)
    #[arg(value_name = "PORT", env = "FILESHARE_PORT")]
    pub port: Option<u16>,

    /// Address to bind (defaults to 0.0.0.0)
    #[arg(long, env = "FILESHARE_BIND")]
    pub bind: Option<IpAddr>,

    /// Directory exposed for listing, download and upload (defaults to ./shared)
    #[arg(long, env = "FILESHARE_SHARED_DIR")]
    pub shared_dir: Option<PathBuf>,

    /// File holding the shared note (defaults to ./note.txt)
    #[arg(long, env = "FILESHARE_NOTE_FILE")]
    pub note_file: Option<PathBuf>,

    /// File holding the last change timestamp (defaults to ./last_change.txt)
    #[arg(long, env = "FILESHARE_LAST_CHANGE_FILE")]
    pub last_change_file: Option<PathBuf>,

    /// Optional TOML config file; flags and environment take precedence over it
    #[arg(long, env = "FILESHARE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory for daily rolling log files (stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}
