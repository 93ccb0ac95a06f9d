use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::args::Args;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SHARED_DIR: &str = "shared";
pub const DEFAULT_NOTE_FILE: &str = "note.txt";
pub const DEFAULT_LAST_CHANGE_FILE: &str = "last_change.txt";
/// 2 GiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

/// On-disk config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub port: Option<u16>,
    pub bind: Option<IpAddr>,
    pub shared_dir: Option<PathBuf>,
    pub note_file: Option<PathBuf>,
    pub last_change_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    /// Extra exact file names to hide
    pub hidden_names: Vec<String>,
    /// Extra file name prefixes to hide
    pub hidden_prefixes: Vec<String>,
    pub max_upload_bytes: Option<usize>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }
}

/// Fully resolved service configuration. All paths are absolute.
#[derive(Debug, Clone)]
pub struct Config {
    // http server
    pub listen_addr: SocketAddr,
    /// Upper bound on a request body, uploads included
    pub max_upload_bytes: usize,

    // storage
    /// The shared root. Created at startup if missing.
    pub shared_dir: PathBuf,
    pub note_file: PathBuf,
    pub last_change_file: PathBuf,
    pub hidden_names: Vec<String>,
    pub hidden_prefixes: Vec<String>,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Build the config from parsed arguments, reading the config file they
    /// point at, if any. Relative paths resolve against the working directory.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        Self::from_parts(args, file, &cwd)
    }

    /// Merge arguments over a config file over the defaults.
    pub fn from_parts(args: &Args, file: ConfigFile, base_dir: &Path) -> Result<Self, ConfigError> {
        let absolute = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        };

        let port = args.port.or(file.port).unwrap_or(DEFAULT_PORT);
        let bind = args
            .bind
            .or(file.bind)
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let log_level = match args.log_level.as_ref().or(file.log_level.as_ref()) {
            Some(level) => tracing::Level::from_str(level)
                .map_err(|_| ConfigError::LogLevel(level.clone()))?,
            None => tracing::Level::INFO,
        };

        Ok(Self {
            listen_addr: SocketAddr::new(bind, port),
            max_upload_bytes: file.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            shared_dir: absolute(
                args.shared_dir
                    .clone()
                    .or(file.shared_dir)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SHARED_DIR)),
            ),
            note_file: absolute(
                args.note_file
                    .clone()
                    .or(file.note_file)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_NOTE_FILE)),
            ),
            last_change_file: absolute(
                args.last_change_file
                    .clone()
                    .or(file.last_change_file)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LAST_CHANGE_FILE)),
            ),
            hidden_names: file.hidden_names,
            hidden_prefixes: file.hidden_prefixes,
            log_level,
            log_dir: args.log_dir.clone().or(file.log_dir).map(absolute),
        })
    }

    /// Defaults laid out under `dir`. Used by tests and embedders.
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            shared_dir: dir.join(DEFAULT_SHARED_DIR),
            note_file: dir.join(DEFAULT_NOTE_FILE),
            last_change_file: dir.join(DEFAULT_LAST_CHANGE_FILE),
            hidden_names: Vec::new(),
            hidden_prefixes: Vec::new(),
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid log level: {0}")]
    LogLevel(String),
    #[error("could not determine working directory: {0}")]
    CurrentDir(std::io::Error),
}
