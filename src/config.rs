use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// GitHub API constants
// =============================================================================

/// Default GitHub GraphQL endpoint
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

/// Connect timeout for API requests in milliseconds (5 seconds)
pub const CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Read timeout for API requests in milliseconds (15 seconds)
pub const READ_TIMEOUT_MS: u64 = 15_000;

/// Environment variables checked for an API token, in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["PUBLIC_PAT", "GITHUB_TOKEN"];

/// Environment variable overriding the GraphQL endpoint
pub const ENDPOINT_ENV_VAR: &str = "CHECK_WORKFLOW_ENDPOINT";

// =============================================================================
// Workflow constants
// =============================================================================

/// Directory holding workflow definitions, relative to the repository root
pub const DEFAULT_WORKFLOW_ROOT: &str = ".github/workflows";

/// Git expression resolving to a repository's default branch
pub const DEFAULT_REMOTE_REF: &str = "HEAD";

/// Maximum number of release lookups in flight at once
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Configuration file structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub github: GitHubConfig,
    pub check: CheckConfig,
    pub logging: LoggingConfig,
}

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    pub endpoint: String,
    pub token: Option<String>,
    /// Connect timeout in milliseconds
    pub connect_timeout: u64,
    /// Read timeout in milliseconds
    pub read_timeout: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GRAPHQL_ENDPOINT.to_string(),
            token: None,
            connect_timeout: CONNECT_TIMEOUT_MS,
            read_timeout: READ_TIMEOUT_MS,
        }
    }
}

/// Evaluation configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckConfig {
    pub fetch_concurrency: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by RUST_LOG
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Config {
    /// Load configuration from `path`, or from the default location when absent,
    /// then apply environment overrides.
    ///
    /// A missing file at the default location is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = config_path();
                if default_path.is_file() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        Ok(config.with_env(|name| std::env::var(name).ok()))
    }

    /// Read a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay values from environment variables
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(token) = TOKEN_ENV_VARS.iter().find_map(|name| non_empty(name)) {
            self.github.token = Some(token);
        }
        if let Some(endpoint) = non_empty(ENDPOINT_ENV_VAR) {
            self.github.endpoint = endpoint;
        }

        self
    }
}

/// Returns the path to the config directory for check-workflow.
/// Uses $XDG_CONFIG_HOME/check-workflow if XDG_CONFIG_HOME is set,
/// otherwise falls back to the platform config directory,
/// or ./check-workflow if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::config_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, platform_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .map(PathBuf::from)
        .or(platform_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("check-workflow")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "check": {
                "fetchConcurrency": 8
            }
        }))
        .unwrap();

        assert_eq!(result.check.fetch_concurrency, 8);
        assert_eq!(result.github, GitHubConfig::default());
        assert_eq!(result.logging, LoggingConfig::default());
    }

    #[test]
    fn config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "github": {
                "endpoint": "https://github.example.com/api/graphql",
                "token": "secret",
                "connectTimeout": 1000,
                "readTimeout": 2000
            },
            "check": { "fetchConcurrency": 1 },
            "logging": { "level": "debug", "format": "json" }
        }))
        .unwrap();

        assert_eq!(
            result,
            Config {
                github: GitHubConfig {
                    endpoint: "https://github.example.com/api/graphql".to_string(),
                    token: Some("secret".to_string()),
                    connect_timeout: 1000,
                    read_timeout: 2000,
                },
                check: CheckConfig {
                    fetch_concurrency: 1
                },
                logging: LoggingConfig {
                    level: "debug".to_string(),
                    format: LogFormat::Json,
                },
            }
        );
    }

    #[test]
    fn with_env_prefers_first_token_variable_and_overrides_endpoint() {
        let env = HashMap::from([
            ("PUBLIC_PAT", "pat"),
            ("GITHUB_TOKEN", "gh"),
            ("CHECK_WORKFLOW_ENDPOINT", "http://localhost/graphql"),
        ]);

        let config = Config::default().with_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.github.token, Some("pat".to_string()));
        assert_eq!(config.github.endpoint, "http://localhost/graphql");
    }

    #[test]
    fn with_env_ignores_empty_values() {
        let env = HashMap::from([("PUBLIC_PAT", ""), ("GITHUB_TOKEN", "gh")]);

        let config = Config::default().with_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.github.token, Some("gh".to_string()));
        assert_eq!(config.github.endpoint, DEFAULT_GRAPHQL_ENDPOINT);
    }

    #[test]
    fn from_file_reports_parse_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn config_dir_with_env_uses_xdg_config_home_when_set() {
        let path = config_dir_with_env(
            Some("/tmp/test-config".to_string()),
            Some(PathBuf::from("/home/user/.config")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-config/check-workflow"));
    }

    #[test]
    fn config_dir_with_env_falls_back_to_platform_dir() {
        let path = config_dir_with_env(None, Some(PathBuf::from("/home/user/.config")));

        assert_eq!(path, PathBuf::from("/home/user/.config/check-workflow"));
    }

    #[test]
    fn config_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = config_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./check-workflow"));
    }
}
