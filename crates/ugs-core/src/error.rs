use std::path::PathBuf;

/// Errors that can occur while posting a badge.
///
/// Library crates use this type directly; the binary crate reports it through
/// `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use ugs_core::UgsError;
///
/// let err = UgsError::Config("no badge name specified".into());
/// assert!(err.to_string().contains("no badge name specified"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum UgsError {
    /// Missing or invalid configuration. Raised before any network traffic.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(ugs::config),
        help("check the command line flags and your .ugs-badge.toml")
    )]
    Config(String),

    /// The metadata server answered with a status other than 200.
    #[error("{}", rejection_message(.status, .body))]
    #[diagnostic(code(ugs::rejected))]
    Rejected {
        /// HTTP status code returned by the server.
        status: u16,
        /// Response body, or `(null)` when the server sent none.
        body: String,
    },

    /// Network failure while talking to the metadata server.
    #[error("posting to UGS failed: {0}")]
    #[diagnostic(
        code(ugs::transport),
        help("is the metadata server reachable from this machine? check the proxy settings")
    )]
    Transport(String),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(ugs::io))]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(ugs::serialization))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(ugs::toml))]
    Toml(#[from] toml::de::Error),

    /// An explicitly requested file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(ugs::file_not_found))]
    FileNotFound(PathBuf),
}

fn rejection_message(status: &u16, body: &str) -> String {
    if body.is_empty() {
        format!("posting to UGS failed with status {status}")
    } else {
        format!("posting to UGS failed with status {status}: {body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: UgsError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = UgsError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn rejection_includes_status_and_body() {
        let err = UgsError::Rejected {
            status: 500,
            body: "database offline".into(),
        };
        assert_eq!(
            err.to_string(),
            "posting to UGS failed with status 500: database offline"
        );
    }

    #[test]
    fn rejection_without_body_shows_status_only() {
        let err = UgsError::Rejected {
            status: 403,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "posting to UGS failed with status 403");
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = UgsError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert!(err.to_string().contains("/tmp/missing.toml"));
    }
}
