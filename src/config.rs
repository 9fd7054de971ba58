//! Provisioning configuration.
//!
//! Every value the workflow would otherwise hard-code lives here with a
//! documented default, so a bare run reproduces the stock registration and
//! a TOML file can override any subset of it.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::api::constants::{DEFAULT_GRAPH_BASE_URL, DEFAULT_GRAPH_SCOPE};

/// Environment variable overriding `graph.base_url`
pub const GRAPH_URL_ENV: &str = "AUTH_INIT_GRAPH_URL";
/// Environment variable overriding `auth.tenant_id`
pub const TENANT_ID_ENV: &str = "AUTH_INIT_TENANT_ID";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `--appid` value meaning "no identifier"
    pub no_id_sentinel: String,
    pub graph: GraphSettings,
    pub application: ApplicationSettings,
    pub secret: SecretSettings,
    pub auth: AuthSettings,
    pub env_store: EnvStoreSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            no_id_sentinel: "no-id".to_string(),
            graph: GraphSettings::default(),
            application: ApplicationSettings::default(),
            secret: SecretSettings::default(),
            auth: AuthSettings::default(),
            env_store: EnvStoreSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub base_url: String,
    pub scope: String,
    /// Connect timeout for create and addPassword calls
    pub connect_timeout_secs: u64,
    /// Per-read timeout for create and addPassword calls
    pub read_timeout_secs: u64,
    /// Total timeout for the existence check. Unset leaves it unbounded.
    pub probe_timeout_secs: Option<u64>,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            scope: DEFAULT_GRAPH_SCOPE.to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 10,
            probe_timeout_secs: None,
        }
    }
}

impl GraphSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub display_name: String,
    pub sign_in_audience: String,
    pub redirect_uri: String,
    pub enable_id_token_issuance: bool,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            display_name: "WebApp".to_string(),
            sign_in_audience: "AzureADMyOrg".to_string(),
            redirect_uri: "http://localhost:5000/.auth/login/aad/callback".to_string(),
            enable_id_token_issuance: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretSettings {
    pub display_name: String,
    pub lifetime_days: u32,
}

impl Default for SecretSettings {
    fn default() -> Self {
        Self {
            display_name: "DefaultClientSecret".to_string(),
            lifetime_days: 180,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub tenant_id: Option<String>,
    pub azd_program: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            tenant_id: None,
            azd_program: "azd".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvStoreSettings {
    pub program: String,
    /// Arguments placed before NAME VALUE
    pub args: Vec<String>,
}

impl Default for EnvStoreSettings {
    fn default() -> Self {
        Self {
            program: "azd".to_string(),
            args: vec!["env".to_string(), "set".to_string()],
        }
    }
}

impl Config {
    /// Default location: `<config_dir>/auth-init/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("auth-init").join("config.toml"))
    }

    /// Load from an explicit path, else the default path if present, else defaults.
    /// Environment overrides are applied afterwards.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from: {:?}", path);
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(GRAPH_URL_ENV).filter(|v| !v.is_empty()) {
            debug!("{} overrides graph.base_url", GRAPH_URL_ENV);
            self.graph.base_url = url;
        }
        if let Some(tenant) = lookup(TENANT_ID_ENV).filter(|v| !v.is_empty()) {
            debug!("{} overrides auth.tenant_id", TENANT_ID_ENV);
            self.auth.tenant_id = Some(tenant);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graph.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("graph.base_url must not be empty".into()));
        }
        if self.secret.lifetime_days == 0 {
            return Err(ConfigError::Invalid(
                "secret.lifetime_days must be positive".into(),
            ));
        }
        if self.env_store.program.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "env_store.program must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the caller-supplied identifier: empty or sentinel means absent.
    pub fn requested_app_id<'a>(&self, app_id: Option<&'a str>) -> Option<&'a str> {
        app_id.filter(|id| !id.is_empty() && *id != self.no_id_sentinel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_stock_registration() {
        let config = Config::default();
        assert_eq!(config.no_id_sentinel, "no-id");
        assert_eq!(config.graph.base_url, "https://graph.microsoft.com/v1.0");
        assert_eq!(config.graph.scope, "https://graph.microsoft.com/.default");
        assert_eq!(config.graph.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.graph.read_timeout(), Duration::from_secs(10));
        assert_eq!(config.graph.probe_timeout(), None);
        assert_eq!(config.secret.lifetime_days, 180);
        assert_eq!(config.env_store.args, vec!["env", "set"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [graph]
            base_url = "http://localhost:8080/v1.0"
            probe_timeout_secs = 5

            [secret]
            lifetime_days = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.graph.base_url, "http://localhost:8080/v1.0");
        assert_eq!(config.graph.probe_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.graph.scope, "https://graph.microsoft.com/.default");
        assert_eq!(config.secret.lifetime_days, 30);
        assert_eq!(config.secret.display_name, "DefaultClientSecret");
        assert_eq!(config.application, ApplicationSettings::default());
    }

    #[test]
    fn env_overrides_apply_when_non_empty() {
        let vars: HashMap<&str, &str> = [
            (GRAPH_URL_ENV, "http://127.0.0.1:9999"),
            (TENANT_ID_ENV, ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.graph.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.auth.tenant_id, None);
    }

    #[test]
    fn validation_rejects_nonsense() {
        let mut config = Config::default();
        config.secret.lifetime_days = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.graph.base_url = "  ".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.env_store.program = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn requested_app_id_filters_sentinel_and_empty() {
        let config = Config::default();
        assert_eq!(config.requested_app_id(None), None);
        assert_eq!(config.requested_app_id(Some("")), None);
        assert_eq!(config.requested_app_id(Some("no-id")), None);
        assert_eq!(config.requested_app_id(Some("existing-id")), Some("existing-id"));
    }

    #[test]
    fn from_file_reports_path_on_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "no_id_sentinel = [").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            Config::load(Some(missing.as_path())),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn from_file_reads_sentinel() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "no_id_sentinel = \"none\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.no_id_sentinel, "none");
        assert_eq!(config.requested_app_id(Some("no-id")), Some("no-id"));
    }
}
