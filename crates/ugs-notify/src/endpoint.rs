//! Endpoint resolution.
//!
//! The endpoint is built by plain concatenation: the base URL gets exactly one
//! trailing `/` and then `api/build`. Userinfo embedded in the base URL is not
//! extracted for authentication; use a credential id for that.

use ugs_core::{non_empty, ServerConfig, UgsError};

/// Path of the badge endpoint, relative to the server base URL.
pub const BUILD_PATH: &str = "api/build";

/// Server settings after per-invocation values have been applied.
///
/// # Examples
///
/// ```
/// use ugs_core::ServerConfig;
/// use ugs_notify::endpoint::{EndpointConfig, EndpointOverrides};
///
/// let defaults = ServerConfig {
///     api_url: Some("http://ugs.example.com".into()),
///     credential_id: Some("shared".into()),
/// };
/// let overrides = EndpointOverrides {
///     credential_id: Some("per-job".into()),
///     ..Default::default()
/// };
/// let config = EndpointConfig::resolve(&overrides, &defaults).unwrap();
/// assert_eq!(config.base_url, "http://ugs.example.com");
/// assert_eq!(config.credential_id.as_deref(), Some("per-job"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Server base URL, never empty.
    pub base_url: String,
    /// Credential used for Basic authentication, if any.
    pub credential_id: Option<String>,
    /// Whether a rejected or failed post is fatal.
    pub fail_on_error: bool,
}

/// Per-invocation values that take precedence over [`ServerConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointOverrides {
    pub api_url: Option<String>,
    pub credential_id: Option<String>,
    pub fail_on_error: bool,
}

impl EndpointConfig {
    /// Merge per-invocation overrides with the process-wide defaults.
    ///
    /// # Errors
    ///
    /// Returns [`UgsError::Config`] when neither layer provides a base URL.
    pub fn resolve(
        overrides: &EndpointOverrides,
        defaults: &ServerConfig,
    ) -> Result<Self, UgsError> {
        let base_url = non_empty(&overrides.api_url)
            .or_else(|| non_empty(&defaults.api_url))
            .ok_or_else(|| {
                UgsError::Config(
                    "neither the config file nor the command line specifies an api url".into(),
                )
            })?;
        let credential_id = non_empty(&overrides.credential_id)
            .or_else(|| non_empty(&defaults.credential_id))
            .map(str::to_string);

        Ok(Self {
            base_url: base_url.to_string(),
            credential_id,
            fail_on_error: overrides.fail_on_error,
        })
    }

    /// The full URL the badge is posted to.
    pub fn endpoint_url(&self) -> Result<String, UgsError> {
        endpoint_url(&self.base_url)
    }
}

/// Append `api/build` to `base_url`, adding a `/` only when missing.
///
/// # Errors
///
/// Returns [`UgsError::Config`] if the result is not an absolute `http` or
/// `https` URL.
///
/// # Examples
///
/// ```
/// use ugs_notify::endpoint::endpoint_url;
///
/// assert_eq!(endpoint_url("http://host/base").unwrap(), "http://host/base/api/build");
/// assert_eq!(endpoint_url("http://host/base/").unwrap(), "http://host/base/api/build");
/// ```
pub fn endpoint_url(base_url: &str) -> Result<String, UgsError> {
    let base_url = base_url.trim();
    let separator = if base_url.ends_with('/') { "" } else { "/" };
    let endpoint = format!("{base_url}{separator}{BUILD_PATH}");

    let parsed = reqwest::Url::parse(&endpoint)
        .map_err(|e| UgsError::Config(format!("invalid api url {base_url:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UgsError::Config(format!(
            "api url {base_url:?} must use http or https"
        )));
    }
    Ok(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ServerConfig {
        ServerConfig {
            api_url: Some("http://default.example.com".into()),
            credential_id: Some("default-cred".into()),
        }
    }

    #[test]
    fn appends_separator_when_missing() {
        assert_eq!(
            endpoint_url("http://host/base").unwrap(),
            "http://host/base/api/build"
        );
    }

    #[test]
    fn does_not_double_trailing_slash() {
        assert_eq!(
            endpoint_url("http://host/base/").unwrap(),
            "http://host/base/api/build"
        );
    }

    #[test]
    fn bare_host_gets_root_path() {
        assert_eq!(
            endpoint_url("https://ugs.example.com").unwrap(),
            "https://ugs.example.com/api/build"
        );
    }

    #[test]
    fn rejects_relative_url() {
        let err = endpoint_url("ugs.example.com").unwrap_err();
        assert!(matches!(err, UgsError::Config(_)));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = endpoint_url("ftp://ugs.example.com").unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn override_wins_over_default() {
        let overrides = EndpointOverrides {
            api_url: Some("http://override".into()),
            credential_id: Some("override-cred".into()),
            fail_on_error: true,
        };
        let config = EndpointConfig::resolve(&overrides, &defaults()).unwrap();
        assert_eq!(config.base_url, "http://override");
        assert_eq!(config.credential_id.as_deref(), Some("override-cred"));
        assert!(config.fail_on_error);
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = EndpointConfig::resolve(&EndpointOverrides::default(), &defaults()).unwrap();
        assert_eq!(config.base_url, "http://default.example.com");
        assert_eq!(config.credential_id.as_deref(), Some("default-cred"));
        assert!(!config.fail_on_error);
    }

    #[test]
    fn empty_override_does_not_hide_default() {
        let overrides = EndpointOverrides {
            api_url: Some(String::new()),
            ..Default::default()
        };
        let config = EndpointConfig::resolve(&overrides, &defaults()).unwrap();
        assert_eq!(config.base_url, "http://default.example.com");
    }

    #[test]
    fn missing_api_url_is_config_error() {
        let err =
            EndpointConfig::resolve(&EndpointOverrides::default(), &ServerConfig::default())
                .unwrap_err();
        assert!(matches!(err, UgsError::Config(_)));
        assert!(err.to_string().contains("api url"));
    }

    #[test]
    fn no_credential_anywhere() {
        let defaults = ServerConfig {
            api_url: Some("http://ugs".into()),
            credential_id: None,
        };
        let config = EndpointConfig::resolve(&EndpointOverrides::default(), &defaults).unwrap();
        assert!(config.credential_id.is_none());
    }
}
