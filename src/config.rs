//! Export configuration
//!
//! All settings are read once at startup and passed explicitly to each
//! stage. Expected environment variables:
//! - DB_NAME, DB_USER: database name and user (required)
//! - DB_PASSWORD: database password (optional)
//! - DB_HOST, DB_PORT: database address (defaults `localhost`, `5432`)
//! - DB_TABLE: table to export (default `users`, may be `schema.table`)
//! - FTP_HOST, FTP_USER, FTP_DIRECTORY: FTP server, user and target directory (required)
//! - FTP_PASSWD: FTP password (optional)
//! - FTP_PORT: FTP control port (default `21`)
//! - JSON_FILE: local export file (default `saved_data/pg_data.json`)

use eyre::{Context, Result, eyre};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_TABLE: &str = "users";
pub const DEFAULT_FTP_PORT: u16 = 21;
pub const DEFAULT_EXPORT_FILE: &str = "saved_data/pg_data.json";

/// Connection parameters for the source database
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub table: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("table", &self.table)
            .finish()
    }
}

/// Connection parameters for the FTP server
#[derive(Clone, PartialEq, Eq)]
pub struct FtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub directory: String,
}

impl FtpConfig {
    /// `host:port` address of the control connection
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for FtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("directory", &self.directory)
            .finish()
    }
}

/// Complete, immutable configuration of one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ftp: FtpConfig,
    pub export_file: PathBuf,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    /// Returns an error naming the variable if a required one is missing or a
    /// port is not a valid number
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| eyre!("{} environment variable not set", key))
        };
        let port = |key: &str, default: u16| -> Result<u16> {
            match get(key) {
                Some(value) => value
                    .parse()
                    .with_context(|| format!("Invalid {}: {}", key, value)),
                None => Ok(default),
            }
        };

        let database = DatabaseConfig {
            host: get("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            port: port("DB_PORT", DEFAULT_DB_PORT)?,
            dbname: required("DB_NAME")?,
            user: required("DB_USER")?,
            password: get("DB_PASSWORD").unwrap_or_default(),
            table: get("DB_TABLE").unwrap_or_else(|| DEFAULT_DB_TABLE.to_string()),
        };

        let ftp = FtpConfig {
            host: required("FTP_HOST")?,
            port: port("FTP_PORT", DEFAULT_FTP_PORT)?,
            user: required("FTP_USER")?,
            password: get("FTP_PASSWD").unwrap_or_default(),
            directory: required("FTP_DIRECTORY")?,
        };

        let export_file = get("JSON_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));

        Ok(Self {
            database,
            ftp,
            export_file,
        })
    }

    /// Replace the export file path
    pub fn with_export_file(mut self, path: impl AsRef<Path>) -> Self {
        self.export_file = path.as_ref().to_path_buf();
        self
    }
}

/// Source variables from a dotenv file without overriding ones already set
///
/// Returns `false` if the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed
pub fn load_dotenv(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to load env file: {}", path.display())),
    }
}
