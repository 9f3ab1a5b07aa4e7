use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::logging;

pub const DEFAULT_BASE_URL: &str = "https://prod.vansahnode.app";
pub const TOKEN_ENV: &str = "VANSAH_TOKEN";

/// Connection settings and run context shared by every call a client makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub(crate) base_url: String,
    pub(crate) auth_token: String,
    pub(crate) sprint_name: Option<String>,
    pub(crate) environment_name: Option<String>,
    pub(crate) release_name: Option<String>,
    pub(crate) jira_issue_key: Option<String>,
    pub(crate) test_folder_id: Option<String>,
    pub(crate) timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: String::new(),
            sprint_name: None,
            environment_name: None,
            release_name: None,
            jira_issue_key: None,
            test_folder_id: None,
            timeout: Duration::from_secs(default_timeout_secs()),
        }
    }
}

impl ClientConfig {
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            ..Self::default()
        }
    }

    pub fn set_vansah_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.base_url = url.into();
        self
    }

    pub fn set_vansah_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.auth_token = token.into();
        self
    }

    pub fn set_sprint_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.sprint_name = Some(name.into());
        self
    }

    pub fn set_environment_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.environment_name = Some(name.into());
        self
    }

    pub fn set_release_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.release_name = Some(name.into());
        self
    }

    pub fn set_jira_issue_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.jira_issue_key = Some(key.into());
        self
    }

    pub fn set_test_folders_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.test_folder_id = Some(id.into());
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        !self.auth_token.trim().is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub vansah: VansahConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct VansahConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for VansahConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContextConfig {
    pub sprint_name: Option<String>,
    pub release_name: Option<String>,
    pub environment_name: Option<String>,
    pub jira_issue_key: Option<String>,
    pub test_folder_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Default)]
pub struct AppConfigOverrides {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub sprint_name: Option<String>,
    pub release_name: Option<String>,
    pub environment_name: Option<String>,
    pub jira_issue_key: Option<String>,
    pub test_folder_id: Option<String>,
    pub timeout_secs: Option<u64>,
    pub logging_debug: Option<bool>,
}

impl AppConfigOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            base_url: get("VANSAH_URL"),
            api_token: get(TOKEN_ENV),
            sprint_name: get("VANSAH_SPRINT_NAME"),
            release_name: get("VANSAH_RELEASE_NAME"),
            environment_name: get("VANSAH_ENVIRONMENT_NAME"),
            jira_issue_key: get("VANSAH_JIRA_ISSUE_KEY"),
            test_folder_id: get("VANSAH_TEST_FOLDER_ID"),
            timeout_secs: get("VANSAH_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok()),
            logging_debug: get("VANSAH_DEBUG").map(|v| logging::parse_flag(&v)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("VANSAH_TOKEN is not set. Please configure it in your environment, .env file or config.toml")]
    MissingCredential,
    #[error("failed to resolve config path: HOME is not set and XDG_CONFIG_HOME is unset")]
    MissingHomeDirectory,
    #[error("failed to read config file at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse TOML config at {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Builds a client config the way a test suite bootstraps itself: `.env` is
/// loaded, the config file is read if one exists, and environment variables
/// win over file values. Fails when no auth token is available.
pub fn from_env() -> Result<ClientConfig, ConfigError> {
    let _ = dotenvy::dotenv();
    resolve_from_process_env()
}

fn resolve_from_process_env() -> Result<ClientConfig, ConfigError> {
    let mut cfg = load_optional()?;
    cfg.apply_overrides(&AppConfigOverrides::from_env())?;
    if cfg.logging.debug {
        logging::enable_debug();
    }
    cfg.into_client_config()
}

/// Reads the config file at the default location, falling back to defaults
/// when it does not exist.
pub fn load_optional() -> Result<AppConfig, ConfigError> {
    let path = match resolve_config_path() {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDirectory) => {
            logging::debug("no config directory available; using defaults");
            return Ok(AppConfig::default());
        }
        Err(err) => return Err(err),
    };
    if !path.exists() {
        logging::debug(format!("no config file at {}; using defaults", path.display()));
        return Ok(AppConfig::default());
    }
    load_from(&path)
}

pub fn load_from(path: &std::path::Path) -> Result<AppConfig, ConfigError> {
    let path = path.to_path_buf();
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
        path: path.clone(),
        source,
    })?;

    let cfg = toml::from_str::<AppConfig>(&raw).map_err(|source| ConfigError::ParseFailed {
        path: path.clone(),
        source,
    })?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn resolve_config_path() -> Result<PathBuf, ConfigError> {
    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME");
    let home = std::env::var_os("HOME");
    resolve_config_path_from_env(xdg_config_home, home)
}

fn resolve_config_path_from_env(
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = xdg_config_home.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(dir).join("vansah").join("config.toml"));
    }

    let home = home
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("vansah")
        .join("config.toml"))
}

impl AppConfig {
    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) -> Result<(), ConfigError> {
        if let Some(value) = &overrides.base_url {
            self.vansah.base_url = value.clone();
        }
        if let Some(value) = &overrides.api_token {
            self.vansah.api_token = Some(value.clone());
        }
        if let Some(value) = &overrides.sprint_name {
            self.context.sprint_name = Some(value.clone());
        }
        if let Some(value) = &overrides.release_name {
            self.context.release_name = Some(value.clone());
        }
        if let Some(value) = &overrides.environment_name {
            self.context.environment_name = Some(value.clone());
        }
        if let Some(value) = &overrides.jira_issue_key {
            self.context.jira_issue_key = Some(value.clone());
        }
        if let Some(value) = &overrides.test_folder_id {
            self.context.test_folder_id = Some(value.clone());
        }
        if let Some(value) = overrides.timeout_secs {
            self.http.timeout_secs = value;
        }
        if let Some(value) = overrides.logging_debug {
            self.logging.debug = value;
        }

        self.validate()
    }

    /// Converts into the per-client holder. The token is the one value that
    /// must be present.
    pub fn into_client_config(self) -> Result<ClientConfig, ConfigError> {
        let token = self
            .vansah
            .api_token
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingCredential)?;

        let mut client = ClientConfig::new(token);
        client
            .set_vansah_url(self.vansah.base_url)
            .set_timeout(Duration::from_secs(self.http.timeout_secs));
        if let Some(value) = self.context.sprint_name {
            client.set_sprint_name(value);
        }
        if let Some(value) = self.context.release_name {
            client.set_release_name(value);
        }
        if let Some(value) = self.context.environment_name {
            client.set_environment_name(value);
        }
        if let Some(value) = self.context.jira_issue_key {
            client.set_jira_issue_key(value);
        }
        if let Some(value) = self.context.test_folder_id {
            client.set_test_folders_id(value);
        }
        Ok(client)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.vansah.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "vansah.base_url must not be empty".into(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be > 0".into()));
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}
