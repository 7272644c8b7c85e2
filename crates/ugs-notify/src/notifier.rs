use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use ugs_core::{BadgeParams, BadgeRequest, ServerConfig, UgsError};

use crate::auth::{basic_authorization, resolve_secret, CredentialStore};
use crate::endpoint::{EndpointConfig, EndpointOverrides};
use crate::log::BuildLog;
use crate::payload::BadgePayload;
use crate::transport::{OutboundPost, Transport};

/// Body shown in messages when the server sent none.
pub const NULL_BODY: &str = "(null)";

/// Everything one invocation supplies: the badge and the endpoint overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostBadge {
    pub badge: BadgeParams,
    pub endpoint: EndpointOverrides,
}

/// How a post ended when it did not abort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PostOutcome {
    /// The server answered 200.
    Posted { endpoint: String, status: u16 },
    /// The post was rejected or failed, and `fail_on_error` was off.
    Unsuccessful {
        endpoint: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        reason: String,
    },
}

impl PostOutcome {
    pub fn is_posted(&self) -> bool {
        matches!(self, PostOutcome::Posted { .. })
    }
}

impl fmt::Display for PostOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostOutcome::Posted { endpoint, status } => {
                write!(f, "Posted badge to {endpoint} (HTTP {status})")
            }
            PostOutcome::Unsuccessful {
                endpoint, reason, ..
            } => write!(f, "Badge was not posted to {endpoint}: {reason}"),
        }
    }
}

/// Posts build badges to a UGS metadata server.
///
/// One call to [`post`](Self::post) is one badge: validate, resolve the
/// endpoint and credential, send a single POST, and interpret the answer.
/// Nothing is retried.
///
/// # Examples
///
/// ```no_run
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use ugs_core::{BadgeParams, BadgeResult, ServerConfig};
/// use ugs_notify::log::ConsoleLog;
/// use ugs_notify::notifier::{BadgeNotifier, PostBadge};
/// use ugs_notify::transport::HttpTransport;
///
/// # async fn run() -> Result<(), ugs_core::UgsError> {
/// let defaults = ServerConfig {
///     api_url: Some("http://ugs.example.com".into()),
///     credential_id: None,
/// };
/// let notifier = BadgeNotifier::new(
///     HttpTransport::new(None)?,
///     defaults,
///     Arc::new(HashMap::<String, String>::new()),
///     Arc::new(ConsoleLog),
/// );
/// let step = PostBadge {
///     badge: BadgeParams {
///         project: Some("//UE5/Main/Game".into()),
///         changelist: 1234,
///         result: Some(BadgeResult::Success),
///         name: Some("Editor".into()),
///         url: Some("https://ci.example.com/job/1".into()),
///     },
///     ..Default::default()
/// };
/// let outcome = notifier.post(&step).await?;
/// println!("{outcome}");
/// # Ok(())
/// # }
/// ```
pub struct BadgeNotifier<T> {
    transport: T,
    defaults: ServerConfig,
    credentials: Arc<dyn CredentialStore>,
    log: Arc<dyn BuildLog>,
}

impl<T: Transport> BadgeNotifier<T> {
    pub fn new(
        transport: T,
        defaults: ServerConfig,
        credentials: Arc<dyn CredentialStore>,
        log: Arc<dyn BuildLog>,
    ) -> Self {
        Self {
            transport,
            defaults,
            credentials,
            log,
        }
    }

    /// Post one badge.
    ///
    /// # Errors
    ///
    /// - [`UgsError::Config`] for a missing api url, badge field, or unknown
    ///   credential id. Always raised before any request is sent.
    /// - [`UgsError::Rejected`] for a non-200 answer, and
    ///   [`UgsError::Transport`] for a network failure, but only when
    ///   `fail_on_error` is set. Otherwise these end as
    ///   [`PostOutcome::Unsuccessful`].
    pub async fn post(&self, step: &PostBadge) -> Result<PostOutcome, UgsError> {
        let config = EndpointConfig::resolve(&step.endpoint, &self.defaults)?;
        let request = BadgeRequest::try_from(&step.badge)?;
        let endpoint = config.endpoint_url()?;
        let credential = match &config.credential_id {
            Some(id) => Some((id.as_str(), resolve_secret(self.credentials.as_ref(), id)?)),
            None => None,
        };

        self.log.info(&format!(
            "Posting UGS badge to {endpoint}: changelist {}, name {}, result {}, url {}, project {}",
            request.changelist(),
            request.name(),
            request.result(),
            request.url(),
            request.project(),
        ));

        let body = BadgePayload::from(&request).to_json()?;
        let authorization = match &credential {
            Some((id, secret)) => {
                self.log.info(&format!("Posting with credential {id}"));
                Some(basic_authorization(secret))
            }
            None => {
                self.log.info("Posting without authentication");
                None
            }
        };

        let outbound = OutboundPost {
            url: endpoint.clone(),
            authorization,
            body,
        };

        match self.transport.post(outbound).await {
            Ok(response) if response.status == 200 => {
                tracing::debug!(%endpoint, "posting succeeded");
                Ok(PostOutcome::Posted {
                    endpoint,
                    status: response.status,
                })
            }
            Ok(response) => {
                let status = response.status;
                let body = response.body.unwrap_or_else(|| NULL_BODY.to_string());
                tracing::warn!(%endpoint, status, %body, "posting to UGS metadata server failed");

                if config.fail_on_error {
                    return Err(UgsError::Rejected { status, body });
                }
                self.log.error(&format!("Posting to UGS failed: {body}"));
                self.log.error("Failed to post UGS badge");
                Ok(PostOutcome::Unsuccessful {
                    endpoint,
                    status: Some(status),
                    reason: UgsError::Rejected { status, body }.to_string(),
                })
            }
            Err(err) => {
                tracing::warn!(%endpoint, error = %err, "error posting to UGS metadata server");
                if config.fail_on_error {
                    return Err(err);
                }
                let reason = err.to_string();
                self.log.error(&reason);
                Ok(PostOutcome::Unsuccessful {
                    endpoint,
                    status: None,
                    reason,
                })
            }
        }
    }
}
