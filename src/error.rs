use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Config(ConfigError),
    Fetch(FetchError),
    Snapshot(SnapshotError),
}

#[derive(Debug)]
pub enum ConfigError {
    HomeDirNotFound,
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    InvalidFormat {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        field: String,
        reason: String,
    },
}

#[derive(Debug)]
pub enum FetchError {
    /// Credential missing or rejected.
    Auth,
    RateLimited,
    Network(reqwest::Error),
    InvalidResponse { status: u16, body: String },
    Cancelled,
}

#[derive(Debug)]
pub enum SnapshotError {
    NotFound { path: PathBuf },
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {e}"),
            Error::Fetch(e) => write!(f, "Fetch error: {e}"),
            Error::Snapshot(e) => write!(f, "Snapshot error: {e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HomeDirNotFound => write!(f, "Home directory not found"),
            ConfigError::ReadFailed { path, source } => {
                write!(f, "Failed to read config file '{}': {source}", path.display())
            }
            ConfigError::InvalidFormat { path, source } => {
                write!(f, "Invalid config file '{}': {source}", path.display())
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{field}': {reason}")
            }
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Auth => write!(f, "Invalid or missing GitHub credentials"),
            FetchError::RateLimited => write!(f, "Rate limited by GitHub API"),
            FetchError::Network(e) => write!(f, "Network error: {e}"),
            FetchError::InvalidResponse { status, body } => {
                write!(f, "Invalid API response (status {status}): {body}")
            }
            FetchError::Cancelled => write!(f, "Fetch cancelled"),
        }
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::NotFound { path } => {
                write!(f, "Snapshot '{}' not found", path.display())
            }
            SnapshotError::Io { path, source } => {
                write!(f, "I/O error on '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {}
impl std::error::Error for ConfigError {}
impl std::error::Error for FetchError {}
impl std::error::Error for SnapshotError {}

impl SnapshotError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            SnapshotError::NotFound { path }
        } else {
            SnapshotError::Io { path, source }
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Error::Fetch(err)
    }
}

impl From<SnapshotError> for Error {
    fn from(err: SnapshotError) -> Self {
        Error::Snapshot(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
