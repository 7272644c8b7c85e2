use serde::Serialize;
use ugs_core::BadgeRequest;

/// JSON body accepted by the metadata server's `api/build` endpoint.
///
/// # Examples
///
/// ```
/// use ugs_core::{BadgeParams, BadgeRequest, BadgeResult};
/// use ugs_notify::payload::BadgePayload;
///
/// let request = BadgeRequest::try_from(&BadgeParams {
///     project: Some("//UE5/Main/Game".into()),
///     changelist: 42,
///     result: Some(BadgeResult::Failure),
///     name: Some("Cook".into()),
///     url: Some("https://ci/job/1".into()),
/// })
/// .unwrap();
/// let json = serde_json::to_value(BadgePayload::from(&request)).unwrap();
/// assert_eq!(json["Result"], 1);
/// assert_eq!(json["BuildType"], "Cook");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BadgePayload<'a> {
    pub change_number: u32,
    pub build_type: &'a str,
    pub result: u8,
    pub url: &'a str,
    pub project: &'a str,
}

impl<'a> From<&'a BadgeRequest> for BadgePayload<'a> {
    fn from(request: &'a BadgeRequest) -> Self {
        Self {
            change_number: request.changelist(),
            build_type: request.name(),
            result: request.result().code(),
            url: request.url(),
            project: request.project(),
        }
    }
}

impl BadgePayload<'_> {
    /// Serialize to the exact bytes sent on the wire.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
