//! Credential lookup and the Basic `Authorization` header.

use std::collections::HashMap;

use base64::Engine;
use ugs_core::UgsError;

/// Resolves an opaque credential id to its secret.
///
/// The secret is either `user:password` or pre-encoded token material; it is
/// base64-encoded as is.
pub trait CredentialStore: Send + Sync {
    /// Return the secret for `id`, or `None` if the store does not know it.
    fn secret(&self, id: &str) -> Option<String>;
}

impl CredentialStore for HashMap<String, String> {
    fn secret(&self, id: &str) -> Option<String> {
        self.get(id).cloned()
    }
}

/// Secrets from `UGS_CREDENTIAL_<ID>` variables, falling back to the
/// `[credentials]` table of the config file.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use ugs_notify::auth::{CredentialStore, EnvCredentials};
///
/// let table = HashMap::from([("ugs-token".to_string(), "alice:secret".to_string())]);
/// let store = EnvCredentials::with_lookup(table, |key: &str| {
///     (key == "UGS_CREDENTIAL_OTHER").then(|| "bob:pw".to_string())
/// });
/// assert_eq!(store.secret("ugs-token").as_deref(), Some("alice:secret"));
/// assert_eq!(store.secret("other").as_deref(), Some("bob:pw"));
/// assert!(store.secret("missing").is_none());
/// ```
pub struct EnvCredentials<F = fn(&str) -> Option<String>> {
    table: HashMap<String, String>,
    lookup: F,
}

impl EnvCredentials {
    /// Read variables from the process environment.
    pub fn new(table: HashMap<String, String>) -> Self {
        Self {
            table,
            lookup: |key| std::env::var(key).ok(),
        }
    }
}

impl<F> EnvCredentials<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Read variables through `lookup` instead of the process environment.
    pub fn with_lookup(table: HashMap<String, String>, lookup: F) -> Self {
        Self { table, lookup }
    }
}

impl<F> CredentialStore for EnvCredentials<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn secret(&self, id: &str) -> Option<String> {
        (self.lookup)(&env_var_name(id))
            .filter(|s| !s.is_empty())
            .or_else(|| self.table.get(id).cloned())
    }
}

/// `UGS_CREDENTIAL_` followed by the id upper-cased, with every character
/// outside `[A-Z0-9]` replaced by `_`.
///
/// # Examples
///
/// ```
/// use ugs_notify::auth::env_var_name;
///
/// assert_eq!(env_var_name("ugs-token.prod"), "UGS_CREDENTIAL_UGS_TOKEN_PROD");
/// ```
pub fn env_var_name(id: &str) -> String {
    let suffix: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("UGS_CREDENTIAL_{suffix}")
}

/// Look up `id` in `store`.
///
/// # Errors
///
/// Returns [`UgsError::Config`] if the store has no secret for `id`.
pub fn resolve_secret(store: &dyn CredentialStore, id: &str) -> Result<String, UgsError> {
    store
        .secret(id)
        .ok_or_else(|| UgsError::Config(format!("could not find a credential with id {id}")))
}

/// `Basic <base64(secret)>`, encoding the UTF-8 bytes of the secret.
///
/// # Examples
///
/// ```
/// use ugs_notify::auth::basic_authorization;
///
/// assert_eq!(basic_authorization("alice:secret"), "Basic YWxpY2U6c2VjcmV0");
/// ```
pub fn basic_authorization(secret: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(secret.as_bytes());
    format!("Basic {encoded}")
}
