use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::args::Args;
use crate::error::ConfigError;
use crate::followers::github::GITHUB_API_BASE;
use crate::followers::FetchOptions;

pub const DEFAULT_USER: &str = "hitzhangjie";
pub const CONFIG_FILE: &str = "config.toml";
/// Checked in order, the first non-blank value wins.
pub const TOKEN_VARS: [&str; 2] = ["GITHUB_ACCESS_TOKEN", "GITHUB_TOKEN"];

const MAX_PAGE_SIZE: u32 = 100;

/// Optional `config.toml` in the snapshot directory.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub user: Option<String>,
    pub keep: Option<usize>,
    pub page_size: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub network_retries: Option<u32>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub user: String,
    /// Empty when no credential was found; rejected when the client is built.
    pub token: String,
    pub dir: PathBuf,
    pub api_base: String,
    pub fetch: FetchOptions,
    pub keep: Option<usize>,
    pub record: bool,
    pub list: bool,
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Merge CLI flags over the environment over `config.toml` over defaults.
    pub fn resolve<F>(args: &Args, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = match &args.dir {
            Some(dir) => dir.clone(),
            None => default_dir()?,
        };
        let file = load_file(&dir.join(CONFIG_FILE))?;
        let defaults = FetchOptions::default();

        let token = TOKEN_VARS
            .iter()
            .filter_map(|key| env(key))
            .find(|value| !value.trim().is_empty())
            .unwrap_or_default();

        let page_size = args.page_size.or(file.page_size).unwrap_or(defaults.page_size);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "page_size".to_string(),
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
            });
        }

        let keep = args.keep.or(file.keep);
        if keep == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "keep".to_string(),
                reason: "must keep at least one snapshot".to_string(),
            });
        }

        let user = args
            .user
            .clone()
            .or(file.user)
            .unwrap_or_else(|| DEFAULT_USER.to_string());
        if user.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        let retry_delay = args
            .retry_delay_ms
            .or(file.retry_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_delay);

        Ok(Self {
            user,
            token,
            dir,
            api_base: file.api_base.unwrap_or_else(|| GITHUB_API_BASE.to_string()),
            fetch: FetchOptions {
                page_size,
                retry_delay,
                network_retries: args
                    .network_retries
                    .or(file.network_retries)
                    .unwrap_or(defaults.network_retries),
            },
            keep,
            record: !args.no_record,
            list: args.list,
        })
    }
}

/// `~/.config/gh-followers`
pub fn default_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".config").join("gh-followers"))
        .ok_or(ConfigError::HomeDirNotFound)
}

/// A missing file is not an error, it just yields the defaults.
pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => toml::from_str(&data).map_err(|source| ConfigError::InvalidFormat {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(source) => Err(ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args_in(dir: &TempDir) -> Args {
        Args {
            dir: Some(dir.path().to_path_buf()),
            ..Args::default()
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::resolve(&args_in(&dir), no_env).unwrap();

        assert_eq!(config.user, DEFAULT_USER);
        assert_eq!(config.token, "");
        assert_eq!(config.dir, dir.path());
        assert_eq!(config.api_base, GITHUB_API_BASE);
        assert_eq!(config.fetch.page_size, 10);
        assert_eq!(config.fetch.retry_delay, Duration::from_secs(1));
        assert_eq!(config.fetch.network_retries, 2);
        assert_eq!(config.keep, None);
        assert!(config.record);
        assert!(!config.list);
    }

    #[test]
    fn test_token_from_env() {
        let dir = TempDir::new().unwrap();
        let config = Config::resolve(&args_in(&dir), |key| match key {
            "GITHUB_ACCESS_TOKEN" => Some("ghp_primary".to_string()),
            "GITHUB_TOKEN" => Some("ghp_fallback".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.token, "ghp_primary");
    }

    #[test]
    fn test_token_falls_back_past_blank() {
        let dir = TempDir::new().unwrap();
        let config = Config::resolve(&args_in(&dir), |key| match key {
            "GITHUB_ACCESS_TOKEN" => Some("  ".to_string()),
            "GITHUB_TOKEN" => Some("ghp_fallback".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.token, "ghp_fallback");
    }

    #[test]
    fn test_file_then_flags() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
user = "octocat"
keep = 5
page_size = 50
retry_delay_ms = 250
api_base = "https://ghe.example.com/api/v3"
"#,
        )
        .unwrap();

        let config = Config::resolve(&args_in(&dir), no_env).unwrap();
        assert_eq!(config.user, "octocat");
        assert_eq!(config.keep, Some(5));
        assert_eq!(config.fetch.page_size, 50);
        assert_eq!(config.fetch.retry_delay, Duration::from_millis(250));
        assert_eq!(config.api_base, "https://ghe.example.com/api/v3");

        let args = Args {
            user: Some("torvalds".to_string()),
            keep: Some(3),
            no_record: true,
            ..args_in(&dir)
        };
        let config = Config::resolve(&args, no_env).unwrap();
        assert_eq!(config.user, "torvalds");
        assert_eq!(config.keep, Some(3));
        assert_eq!(config.fetch.page_size, 50);
        assert!(!config.record);
    }

    #[test]
    fn test_invalid_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "colour = \"blue\"\n").unwrap();

        let result = Config::resolve(&args_in(&dir), no_env);
        assert!(matches!(result, Err(ConfigError::InvalidFormat { .. })));
    }

    #[test]
    fn test_rejects_zero_keep() {
        let dir = TempDir::new().unwrap();
        let args = Args {
            keep: Some(0),
            ..args_in(&dir)
        };
        let result = Config::resolve(&args, no_env);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "keep"
        ));
    }

    #[test]
    fn test_rejects_page_size_out_of_range() {
        let dir = TempDir::new().unwrap();
        for page_size in [0, 101] {
            let args = Args {
                page_size: Some(page_size),
                ..args_in(&dir)
            };
            let result = Config::resolve(&args, no_env);
            assert!(matches!(
                result,
                Err(ConfigError::InvalidValue { ref field, .. }) if field == "page_size"
            ));
        }
    }

    #[test]
    fn test_load_file_missing_is_default() {
        let dir = TempDir::new().unwrap();
        let file = load_file(&dir.path().join(CONFIG_FILE)).unwrap();
        assert!(file.user.is_none());
        assert!(file.keep.is_none());
    }
}
