use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::UgsError;

/// File name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".ugs-badge.toml";

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "UGS_BADGE_CONFIG";

/// Environment variable overriding `[server].api_url`.
pub const API_URL_ENV: &str = "UGS_API_URL";

/// Environment variable overriding `[server].credential_id`.
pub const CREDENTIAL_ID_ENV: &str = "UGS_CREDENTIAL_ID";

/// Process-wide defaults loaded from `.ugs-badge.toml`.
///
/// Supports layered resolution: CLI flags > env vars > config file > defaults.
/// Per-invocation flags are applied later, by the notifier.
///
/// # Examples
///
/// ```
/// use ugs_core::UgsConfig;
///
/// let config = UgsConfig::default();
/// assert!(config.server.api_url.is_none());
/// assert!(config.proxy.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UgsConfig {
    /// Metadata server defaults.
    #[serde(default)]
    pub server: ServerConfig,
    /// Local secret store: credential id to secret.
    #[serde(default)]
    pub credentials: HashMap<String, String>,
    /// Outbound proxy. When absent the standard proxy environment is used.
    pub proxy: Option<ProxyConfig>,
}

impl UgsConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`UgsError::FileNotFound`] if the file does not exist,
    /// [`UgsError::Io`] if it cannot be read, or [`UgsError::Toml`] if the
    /// content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, UgsError> {
        if !path.exists() {
            return Err(UgsError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`UgsError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use ugs_core::UgsConfig;
    ///
    /// let toml = r#"
    /// [server]
    /// api_url = "http://ugs.example.com"
    /// "#;
    /// let config = UgsConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.server.api_url.as_deref(), Some("http://ugs.example.com"));
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, UgsError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Locate and load the config file.
    ///
    /// An explicit path (from `--config` or `UGS_BADGE_CONFIG`) must exist.
    /// Without one, `.ugs-badge.toml` in `dir` is used if present, and the
    /// built-in defaults otherwise. Returns the path that was loaded, if any.
    pub fn discover(
        explicit: Option<&Path>,
        dir: &Path,
    ) -> Result<(Self, Option<PathBuf>), UgsError> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        let default_path = dir.join(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Ok((Self::from_file(&default_path)?, Some(default_path)))
        } else {
            Ok((Self::default(), None))
        }
    }

    /// Apply `UGS_API_URL` and `UGS_CREDENTIAL_ID` on top of the file values.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`. Empty values are
    /// ignored so they never hide a value from the file.
    ///
    /// # Examples
    ///
    /// ```
    /// use ugs_core::UgsConfig;
    ///
    /// let config = UgsConfig::default().with_env_overrides(|key| match key {
    ///     "UGS_API_URL" => Some("http://from-env".into()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.server.api_url.as_deref(), Some("http://from-env"));
    /// ```
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.api_url = Some(url);
        }
        if let Some(id) = lookup(CREDENTIAL_ID_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.credential_id = Some(id);
        }
        self
    }
}

/// Metadata server defaults, overridable per invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the metadata server, e.g. `http://ugs.example.com/`.
    pub api_url: Option<String>,
    /// Id of the credential used for Basic authentication.
    pub credential_id: Option<String>,
}

/// Outbound HTTP proxy.
///
/// # Examples
///
/// ```
/// use ugs_core::UgsConfig;
///
/// let toml = r#"
/// [proxy]
/// host = "proxy.example.com"
/// port = 3128
/// no_proxy = ["localhost", "*.internal"]
/// username = 'CORP\builder'
/// password = "hunter2"
/// "#;
/// let proxy = UgsConfig::from_toml(toml).unwrap().proxy.unwrap();
/// assert_eq!(proxy.port, 3128);
/// assert_eq!(proxy.no_proxy.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy host name.
    pub host: String,
    /// Proxy port (default: 8080).
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    /// Hosts that bypass the proxy. `*.example.com` style wildcards allowed.
    #[serde(default)]
    pub no_proxy: Vec<String>,
    /// Proxy user. `DOMAIN\user` selects domain credentials.
    pub username: Option<String>,
    /// Proxy password.
    pub password: Option<String>,
}

fn default_proxy_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_empty() {
        let config = UgsConfig::default();
        assert!(config.server.api_url.is_none());
        assert!(config.server.credential_id.is_none());
        assert!(config.credentials.is_empty());
        assert!(config.proxy.is_none());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = UgsConfig::from_toml("").unwrap();
        assert!(config.server.api_url.is_none());
        assert!(config.proxy.is_none());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[server]
api_url = "http://ugs.example.com/"
credential_id = "ugs-token"

[credentials]
ugs-token = "alice:secret"

[proxy]
host = "proxy.example.com"
no_proxy = ["localhost"]
username = "builder"
"#;
        let config = UgsConfig::from_toml(toml).unwrap();
        assert_eq!(
            config.server.api_url.as_deref(),
            Some("http://ugs.example.com/")
        );
        assert_eq!(config.server.credential_id.as_deref(), Some("ugs-token"));
        assert_eq!(config.credentials["ugs-token"], "alice:secret");

        let proxy = config.proxy.unwrap();
        assert_eq!(proxy.host, "proxy.example.com");
        assert_eq!(proxy.port, 8080);
        assert_eq!(proxy.username.as_deref(), Some("builder"));
        assert!(proxy.password.is_none());
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = UgsConfig::from_toml("{{invalid}}");
        assert!(matches!(result, Err(UgsError::Toml(_))));
    }

    #[test]
    fn proxy_requires_host() {
        let result = UgsConfig::from_toml("[proxy]\nport = 3128\n");
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let config = UgsConfig::from_toml(
            "[server]\napi_url = \"http://file\"\ncredential_id = \"file-cred\"\n",
        )
        .unwrap()
        .with_env_overrides(|key| match key {
            API_URL_ENV => Some("http://env".into()),
            CREDENTIAL_ID_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.server.api_url.as_deref(), Some("http://env"));
        assert_eq!(config.server.credential_id.as_deref(), Some("file-cred"));
    }

    #[test]
    fn discover_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, path) = UgsConfig::discover(None, dir.path()).unwrap();
        assert!(path.is_none());
        assert!(config.server.api_url.is_none());
    }

    #[test]
    fn discover_reads_default_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[server]\napi_url = \"http://ugs\"\n",
        )
        .unwrap();
        let (config, path) = UgsConfig::discover(None, dir.path()).unwrap();
        assert_eq!(path, Some(dir.path().join(DEFAULT_CONFIG_FILE)));
        assert_eq!(config.server.api_url.as_deref(), Some("http://ugs"));
    }

    #[test]
    fn discover_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let result = UgsConfig::discover(Some(&missing), dir.path());
        assert!(matches!(result, Err(UgsError::FileNotFound(_))));
    }
}
