//! Configuration loading
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment handling both come from clap (`env` feature),
//! so [`CliArgs`] already holds tiers 1 and 2 when [`ServerConfig::resolve`]
//! merges in the TOML file and the defaults.

use crate::{Error, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5780";
pub const DEFAULT_DB_HOST: &str = "127.0.0.1";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_DB_USER: &str = "root";
pub const DEFAULT_DB_NAME: &str = "main";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const CROSSREF_BASE_URL: &str = "https://api.crossref.org";
pub const SEMANTIC_SCHOLAR_BASE_URL: &str = "https://api.semanticscholar.org";
pub const SCOPUS_BASE_URL: &str = "https://api.elsevier.com";
pub const WEB_OF_SCIENCE_BASE_URL: &str = "https://api.clarivate.com";
pub const SERPAPI_BASE_URL: &str = "https://serpapi.com";

/// Command-line arguments (each also readable from its environment variable)
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "campus-web", version, about = "Faculty management web service")]
pub struct CliArgs {
    /// Path to TOML config file
    #[arg(long, env = "CAMPUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on (host:port)
    #[arg(long, env = "CAMPUS_BIND")]
    pub bind: Option<String>,

    /// MySQL host
    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    /// MySQL port
    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<u16>,

    /// MySQL user
    #[arg(long, env = "DB_USERNAME")]
    pub db_user: Option<String>,

    /// MySQL password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// MySQL database name
    #[arg(long, env = "DB_DATABASE")]
    pub db_name: Option<String>,

    /// Connection pool size
    #[arg(long, env = "DB_MAX_CONNECTIONS")]
    pub db_max_connections: Option<u32>,

    /// Shared secret required in X-Api-Secret (unset disables the check)
    #[arg(long, env = "CAMPUS_SHARED_SECRET", hide_env_values = true)]
    pub shared_secret: Option<String>,

    /// Contact address sent to Crossref (polite pool)
    #[arg(long, env = "CROSSREF_MAILTO")]
    pub crossref_mailto: Option<String>,

    #[arg(long, env = "SEMANTIC_SCHOLAR_API_KEY", hide_env_values = true)]
    pub semantic_scholar_api_key: Option<String>,

    #[arg(long, env = "SCOPUS_API_KEY", hide_env_values = true)]
    pub scopus_api_key: Option<String>,

    #[arg(long, env = "WOS_API_KEY", hide_env_values = true)]
    pub wos_api_key: Option<String>,

    #[arg(long, env = "SERPAPI_API_KEY", hide_env_values = true)]
    pub serpapi_api_key: Option<String>,

    /// Log filter (trace, debug, info, warn, error or an EnvFilter directive)
    #[arg(long, env = "CAMPUS_LOG")]
    pub log_level: Option<String>,
}

/// TOML config file contents. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub database: TomlDatabase,
    pub sources: TomlSources,
    pub auth: TomlAuth,
    pub logging: TomlLogging,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlDatabase {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlSources {
    pub crossref_mailto: Option<String>,
    pub semantic_scholar_api_key: Option<String>,
    pub scopus_api_key: Option<String>,
    pub web_of_science_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub crossref_base_url: Option<String>,
    pub semantic_scholar_base_url: Option<String>,
    pub scopus_base_url: Option<String>,
    pub web_of_science_base_url: Option<String>,
    pub serpapi_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlAuth {
    pub shared_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlLogging {
    pub level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database: DatabaseConfig,
    pub sources: SourceConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// MySQL connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub max_connections: u32,
}

/// External bibliographic source settings
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub crossref_base_url: String,
    pub semantic_scholar_base_url: String,
    pub scopus_base_url: String,
    pub web_of_science_base_url: String,
    pub serpapi_base_url: String,
    pub crossref_mailto: Option<String>,
    pub semantic_scholar_api_key: Option<String>,
    pub scopus_api_key: Option<String>,
    pub web_of_science_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthConfig {
    pub shared_secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

/// Database settings as reported by the diagnostics endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RedactedDatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: &'static str,
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.to_string(),
            password: None,
            database: DEFAULT_DB_NAME.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            crossref_base_url: CROSSREF_BASE_URL.to_string(),
            semantic_scholar_base_url: SEMANTIC_SCHOLAR_BASE_URL.to_string(),
            scopus_base_url: SCOPUS_BASE_URL.to_string(),
            web_of_science_base_url: WEB_OF_SCIENCE_BASE_URL.to_string(),
            serpapi_base_url: SERPAPI_BASE_URL.to_string(),
            crossref_mailto: None,
            semantic_scholar_api_key: None,
            scopus_api_key: None,
            web_of_science_api_key: None,
            serpapi_api_key: None,
            timeout_secs: DEFAULT_SOURCE_TIMEOUT_SECS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database: DatabaseConfig::default(),
            sources: SourceConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DatabaseConfig {
    /// `mysql://` URL with percent-encoded credentials
    pub fn connection_url(&self) -> String {
        let user = urlencoding::encode(&self.user);
        match &self.password {
            Some(password) => format!(
                "mysql://{}:{}@{}:{}/{}",
                user,
                urlencoding::encode(password),
                self.host,
                self.port,
                self.database
            ),
            None => format!(
                "mysql://{}@{}:{}/{}",
                user, self.host, self.port, self.database
            ),
        }
    }

    /// Summary safe to return over HTTP (password reported as SET/NOT_SET, empty counts as unset)
    pub fn redacted(&self) -> RedactedDatabaseConfig {
        RedactedDatabaseConfig {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: if self.password.as_deref().is_some_and(|p| !p.is_empty()) {
                "SET"
            } else {
                "NOT_SET"
            },
            database: self.database.clone(),
        }
    }
}

impl ServerConfig {
    /// Merge command-line/environment values, the TOML file and compiled defaults
    ///
    /// An explicitly requested config file must exist; the default location
    /// is optional and a missing file only produces a log line.
    pub fn resolve(cli: &CliArgs) -> Result<Self> {
        let toml_config = match &cli.config {
            Some(path) => {
                info!("Loading config file {}", path.display());
                TomlConfig::load(path)?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    info!("Loading config file {}", path.display());
                    TomlConfig::load(&path)?
                }
                _ => {
                    warn!("No config file found, using command line, environment and defaults");
                    TomlConfig::default()
                }
            },
        };

        Ok(Self::merge(cli, toml_config))
    }

    /// Combine already-loaded sources without touching the filesystem
    pub fn merge(cli: &CliArgs, toml_config: TomlConfig) -> Self {
        let TomlConfig {
            bind_addr,
            database,
            sources,
            auth,
            logging,
        } = toml_config;

        let db_defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            host: pick(&cli.db_host, database.host).unwrap_or(db_defaults.host),
            port: cli.db_port.or(database.port).unwrap_or(db_defaults.port),
            user: pick(&cli.db_user, database.user).unwrap_or(db_defaults.user),
            // An empty password is a real value, unlike empty API keys
            password: cli.db_password.clone().or(database.password),
            database: pick(&cli.db_name, database.database).unwrap_or(db_defaults.database),
            max_connections: cli
                .db_max_connections
                .or(database.max_connections)
                .filter(|n| *n > 0)
                .unwrap_or(db_defaults.max_connections),
        };

        let source_defaults = SourceConfig::default();
        let sources = SourceConfig {
            crossref_base_url: non_blank(sources.crossref_base_url)
                .unwrap_or(source_defaults.crossref_base_url),
            semantic_scholar_base_url: non_blank(sources.semantic_scholar_base_url)
                .unwrap_or(source_defaults.semantic_scholar_base_url),
            scopus_base_url: non_blank(sources.scopus_base_url)
                .unwrap_or(source_defaults.scopus_base_url),
            web_of_science_base_url: non_blank(sources.web_of_science_base_url)
                .unwrap_or(source_defaults.web_of_science_base_url),
            serpapi_base_url: non_blank(sources.serpapi_base_url)
                .unwrap_or(source_defaults.serpapi_base_url),
            crossref_mailto: pick(&cli.crossref_mailto, sources.crossref_mailto),
            semantic_scholar_api_key: pick(
                &cli.semantic_scholar_api_key,
                sources.semantic_scholar_api_key,
            ),
            scopus_api_key: pick(&cli.scopus_api_key, sources.scopus_api_key),
            web_of_science_api_key: pick(&cli.wos_api_key, sources.web_of_science_api_key),
            serpapi_api_key: pick(&cli.serpapi_api_key, sources.serpapi_api_key),
            timeout_secs: sources
                .timeout_secs
                .filter(|s| *s > 0)
                .unwrap_or(source_defaults.timeout_secs),
        };

        let config = Self {
            bind_addr: pick(&cli.bind, bind_addr).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database,
            sources,
            auth: AuthConfig {
                shared_secret: pick(&cli.shared_secret, auth.shared_secret),
            },
            logging: LoggingConfig {
                level: pick(&cli.log_level, logging.level)
                    .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
        };

        if config.auth.shared_secret.is_none() {
            warn!("No shared secret configured: API secret check disabled");
        }

        config
    }
}

/// Default config file location: `<config_dir>/campus/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("campus").join("config.toml"))
}

/// First non-blank value of the higher-priority source, then the lower one
fn pick(higher: &Option<String>, lower: Option<String>) -> Option<String> {
    non_blank(higher.clone()).or_else(|| non_blank(lower))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
