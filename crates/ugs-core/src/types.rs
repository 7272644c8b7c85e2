use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UgsError;

/// Build outcome shown as a badge in Unreal Game Sync.
///
/// Each variant has a display label and a small integer code. The code is
/// what the metadata server expects in the `Result` field of the payload.
///
/// # Examples
///
/// ```
/// use ugs_core::BadgeResult;
///
/// let r: BadgeResult = "success".parse().unwrap();
/// assert_eq!(r, BadgeResult::Success);
/// assert_eq!(r.code(), 3);
/// assert_eq!(r.to_string(), "Success");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeResult {
    /// The build has started.
    Starting,
    /// The build failed.
    Failure,
    /// The build succeeded with warnings.
    Warning,
    /// The build succeeded.
    Success,
    /// The build was skipped.
    Skipped,
}

impl BadgeResult {
    /// All results in wire-code order.
    pub const ALL: [BadgeResult; 5] = [
        BadgeResult::Starting,
        BadgeResult::Failure,
        BadgeResult::Warning,
        BadgeResult::Success,
        BadgeResult::Skipped,
    ];

    /// Integer code sent to the metadata server.
    pub fn code(self) -> u8 {
        match self {
            BadgeResult::Starting => 0,
            BadgeResult::Failure => 1,
            BadgeResult::Warning => 2,
            BadgeResult::Success => 3,
            BadgeResult::Skipped => 4,
        }
    }

    /// Human-readable label, as shown by UGS.
    pub fn label(self) -> &'static str {
        match self {
            BadgeResult::Starting => "Starting",
            BadgeResult::Failure => "Failure",
            BadgeResult::Warning => "Warning",
            BadgeResult::Success => "Success",
            BadgeResult::Skipped => "Skipped",
        }
    }
}

impl fmt::Display for BadgeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BadgeResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "starting" => Ok(BadgeResult::Starting),
            "failure" => Ok(BadgeResult::Failure),
            "warning" => Ok(BadgeResult::Warning),
            "success" => Ok(BadgeResult::Success),
            "skipped" => Ok(BadgeResult::Skipped),
            other => Err(format!(
                "unknown badge result: {other} (expected starting, failure, warning, success or skipped)"
            )),
        }
    }
}

/// Per-invocation values exactly as the caller supplied them.
///
/// Nothing here is validated yet. Empty strings count as missing, so a
/// pipeline that expands an unset variable to `""` gets the same error as one
/// that omitted the flag. Use [`BadgeRequest::try_from`] to validate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeParams {
    /// UGS project path, e.g. `//UE5/Main/Samples/Game`.
    pub project: Option<String>,
    /// Changelist the badge is attached to. At most [`MAX_CHANGELIST`].
    pub changelist: u32,
    /// Build outcome.
    pub result: Option<BadgeResult>,
    /// Badge name shown in UGS (the "build type").
    pub name: Option<String>,
    /// Link opened when the badge is clicked.
    pub url: Option<String>,
}

/// A validated badge, ready to be posted.
///
/// Immutable once built. Every string field is guaranteed non-blank and is
/// kept exactly as the caller wrote it.
///
/// # Examples
///
/// ```
/// use ugs_core::{BadgeParams, BadgeRequest, BadgeResult};
///
/// let params = BadgeParams {
///     project: Some("//UE5/Main/Game".into()),
///     changelist: 1234,
///     result: Some(BadgeResult::Success),
///     name: Some("Editor".into()),
///     url: Some("https://ci.example.com/job/42".into()),
/// };
/// let request = BadgeRequest::try_from(&params).unwrap();
/// assert_eq!(request.changelist(), 1234);
///
/// let missing = BadgeParams { name: None, ..params };
/// assert!(BadgeRequest::try_from(&missing).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeRequest {
    project: String,
    changelist: u32,
    result: BadgeResult,
    name: String,
    url: String,
}

impl BadgeRequest {
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn changelist(&self) -> u32 {
        self.changelist
    }

    pub fn result(&self) -> BadgeResult {
        self.result
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TryFrom<&BadgeParams> for BadgeRequest {
    type Error = UgsError;

    /// Checked in the order name, result, url, project, changelist.
    fn try_from(params: &BadgeParams) -> Result<Self, Self::Error> {
        let name = present(&params.name)
            .ok_or_else(|| UgsError::Config("no badge name specified".into()))?;
        let result = params
            .result
            .ok_or_else(|| UgsError::Config("no badge result specified".into()))?;
        let url = present(&params.url)
            .ok_or_else(|| UgsError::Config("no badge url specified".into()))?;
        let project = present(&params.project)
            .ok_or_else(|| UgsError::Config("no badge project specified".into()))?;
        if params.changelist > MAX_CHANGELIST {
            return Err(UgsError::Config(format!(
                "changelist {} is out of range (maximum {MAX_CHANGELIST})",
                params.changelist
            )));
        }

        Ok(Self {
            project: project.to_string(),
            changelist: params.changelist,
            result,
            name: name.to_string(),
            url: url.to_string(),
        })
    }
}

/// Largest changelist the metadata server stores (a signed 32-bit column).
pub const MAX_CHANGELIST: u32 = i32::MAX as u32;

/// Returns the trimmed value, or `None` if it is missing or blank.
///
/// Used for settings such as the api url and credential id, where surrounding
/// whitespace is never meaningful.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Returns the value untouched, or `None` if it is missing or blank.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use ugs_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> BadgeParams {
        BadgeParams {
            project: Some("//UE5/Main/Game".into()),
            changelist: 98765,
            result: Some(BadgeResult::Warning),
            name: Some("Editor Win64".into()),
            url: Some("https://ci.example.com/job/7".into()),
        }
    }

    #[test]
    fn codes_follow_documented_order() {
        let codes: Vec<u8> = BadgeResult::ALL.iter().map(|r| r.code()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn labels_are_capitalized() {
        assert_eq!(BadgeResult::Starting.to_string(), "Starting");
        assert_eq!(BadgeResult::Skipped.to_string(), "Skipped");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("FAILURE".parse::<BadgeResult>(), Ok(BadgeResult::Failure));
        assert_eq!(" Skipped ".parse::<BadgeResult>(), Ok(BadgeResult::Skipped));
        assert!("broken".parse::<BadgeResult>().is_err());
    }

    #[test]
    fn valid_params_build_request() {
        let request = BadgeRequest::try_from(&params()).unwrap();
        assert_eq!(request.project(), "//UE5/Main/Game");
        assert_eq!(request.changelist(), 98765);
        assert_eq!(request.result(), BadgeResult::Warning);
        assert_eq!(request.name(), "Editor Win64");
        assert_eq!(request.url(), "https://ci.example.com/job/7");
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let p = BadgeParams {
            project: Some("   ".into()),
            ..params()
        };
        let err = BadgeRequest::try_from(&p).unwrap_err();
        assert!(err.to_string().contains("no badge project specified"));
    }

    #[test]
    fn each_missing_field_is_reported() {
        let cases = [
            (BadgeParams { name: None, ..params() }, "name"),
            (BadgeParams { result: None, ..params() }, "result"),
            (BadgeParams { url: None, ..params() }, "url"),
            (BadgeParams { project: None, ..params() }, "project"),
        ];
        for (p, field) in cases {
            let err = BadgeRequest::try_from(&p).unwrap_err();
            assert!(matches!(err, UgsError::Config(_)));
            assert!(
                err.to_string().contains(&format!("no badge {field} specified")),
                "unexpected message for {field}: {err}"
            );
        }
    }

    #[test]
    fn badge_fields_keep_surrounding_whitespace() {
        let p = BadgeParams {
            name: Some(" Editor ".into()),
            project: Some(" //UE5/Main/Game".into()),
            ..params()
        };
        let request = BadgeRequest::try_from(&p).unwrap();
        assert_eq!(request.name(), " Editor ");
        assert_eq!(request.project(), " //UE5/Main/Game");
    }

    #[test]
    fn non_empty_trims_settings() {
        assert_eq!(non_empty(&Some("  http://ugs/ ".into())), Some("http://ugs/"));
        assert_eq!(non_empty(&Some("   ".into())), None);
        assert_eq!(non_empty(&None), None);
    }

    #[test]
    fn changelist_above_server_limit_is_rejected() {
        let at_limit = BadgeParams {
            changelist: MAX_CHANGELIST,
            ..params()
        };
        assert!(BadgeRequest::try_from(&at_limit).is_ok());

        let over = BadgeParams {
            changelist: MAX_CHANGELIST + 1,
            ..params()
        };
        let err = BadgeRequest::try_from(&over).unwrap_err();
        assert!(matches!(err, UgsError::Config(_)));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn name_is_checked_before_project() {
        let p = BadgeParams {
            name: None,
            project: None,
            ..params()
        };
        let err = BadgeRequest::try_from(&p).unwrap_err();
        assert!(err.to_string().contains("name"));
    }
}
