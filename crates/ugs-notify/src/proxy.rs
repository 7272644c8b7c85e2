//! Outbound proxy route and credentials.

use ugs_core::{ProxyConfig, UgsError};

/// Credentials presented to the proxy.
///
/// # Examples
///
/// ```
/// use ugs_notify::proxy::ProxyCredentials;
///
/// let creds = ProxyCredentials::from_parts(r"CORP\builder", "pw").unwrap();
/// assert_eq!(
///     creds,
///     ProxyCredentials::Domain {
///         domain: "CORP".into(),
///         user: "builder".into(),
///         password: "pw".into(),
///     }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyCredentials {
    /// Plain username and password.
    Basic { username: String, password: String },
    /// Windows domain account, from a `DOMAIN\user` username.
    Domain {
        domain: String,
        user: String,
        password: String,
    },
}

impl ProxyCredentials {
    /// Build credentials from a configured username and password.
    ///
    /// Returns `None` when the username is blank. The username is split at
    /// the first `\` into domain and user.
    pub fn from_parts(username: &str, password: &str) -> Option<Self> {
        if username.trim().is_empty() {
            return None;
        }
        let creds = match username.split_once('\\') {
            Some((domain, user)) => ProxyCredentials::Domain {
                domain: domain.to_string(),
                user: user.to_string(),
                password: password.to_string(),
            },
            None => ProxyCredentials::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
        };
        Some(creds)
    }

    /// Credentials from a [`ProxyConfig`]; a missing password is empty.
    pub fn from_config(config: &ProxyConfig) -> Option<Self> {
        let username = config.username.as_deref()?;
        Self::from_parts(username, config.password.as_deref().unwrap_or(""))
    }

    /// Username and password as sent in the `Proxy-Authorization` header.
    ///
    /// There is no NTLM handshake in the HTTP stack, so domain accounts go
    /// out as Basic credentials in `DOMAIN\user` form.
    pub fn basic_pair(&self) -> (String, &str) {
        match self {
            ProxyCredentials::Basic { username, password } => {
                (username.clone(), password.as_str())
            }
            ProxyCredentials::Domain {
                domain,
                user,
                password,
            } => (format!("{domain}\\{user}"), password.as_str()),
        }
    }
}

/// Convert configured exclusions to the comma-separated form `reqwest`
/// understands. `*.example.com` becomes `.example.com` (a suffix match).
///
/// # Examples
///
/// ```
/// use ugs_notify::proxy::no_proxy_list;
///
/// let list = no_proxy_list(&["localhost".into(), "*.internal".into(), " ".into()]);
/// assert_eq!(list, "localhost,.internal");
/// ```
pub fn no_proxy_list(patterns: &[String]) -> String {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| match p {
            "*" => p,
            _ => p.strip_prefix('*').unwrap_or(p),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the `reqwest` proxy for `config`.
///
/// # Errors
///
/// Returns [`UgsError::Config`] if the host is blank or does not form a
/// valid proxy URL.
pub fn build_proxy(config: &ProxyConfig) -> Result<reqwest::Proxy, UgsError> {
    let host = config.host.trim();
    if host.is_empty() {
        return Err(UgsError::Config("proxy host is empty".into()));
    }
    let proxy_url = format!("http://{host}:{}", config.port);
    let mut proxy = reqwest::Proxy::all(&proxy_url)
        .map_err(|e| UgsError::Config(format!("invalid proxy {proxy_url}: {e}")))?;

    let exclusions = no_proxy_list(&config.no_proxy);
    if !exclusions.is_empty() {
        proxy = proxy.no_proxy(reqwest::NoProxy::from_string(&exclusions));
    }

    if let Some(creds) = ProxyCredentials::from_config(config) {
        if let ProxyCredentials::Domain { domain, .. } = &creds {
            tracing::debug!(%domain, "presenting domain proxy credentials as basic auth");
        }
        let (username, password) = creds.basic_pair();
        proxy = proxy.basic_auth(&username, password);
    }

    Ok(proxy)
}
