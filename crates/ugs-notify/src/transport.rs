//! The single outbound HTTP request.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use ugs_core::{ProxyConfig, UgsError};

use crate::proxy::build_proxy;

/// Applied separately to connecting and to every socket read.
pub const TIMEOUT: Duration = Duration::from_secs(60);

/// `Content-Type` of the badge payload.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A fully prepared POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPost {
    /// Absolute endpoint URL.
    pub url: String,
    /// Value of the `Authorization` header, if the post is authenticated.
    pub authorization: Option<String>,
    /// JSON body.
    pub body: String,
}

/// Status and body of the server's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// `None` when the response carried no body at all.
    pub body: Option<String>,
}

/// Sends one POST and returns the response.
///
/// Implementations make exactly one attempt and never retry.
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`UgsError::Transport`] when no response could be obtained.
    fn post(
        &self,
        request: OutboundPost,
    ) -> impl Future<Output = Result<TransportResponse, UgsError>> + Send;
}

/// `reqwest`-backed transport.
///
/// A fresh client is built for every post and dropped before `post` returns,
/// so no connection outlives the call whichever way it ends. Without a
/// configured proxy the standard `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY`
/// environment applies.
///
/// # Examples
///
/// ```
/// use ugs_notify::transport::HttpTransport;
///
/// let transport = HttpTransport::new(None).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    route: Route,
}

#[derive(Debug, Clone, Default)]
enum Route {
    /// Proxy from the environment, if any.
    #[default]
    System,
    Proxy(reqwest::Proxy),
    Direct,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`UgsError::Config`] if the proxy settings are invalid.
    pub fn new(proxy: Option<&ProxyConfig>) -> Result<Self, UgsError> {
        let route = match proxy {
            Some(config) => Route::Proxy(build_proxy(config)?),
            None => Route::System,
        };
        Ok(Self { route })
    }

    /// Connect straight to the server, ignoring the proxy environment.
    pub fn direct() -> Self {
        Self {
            route: Route::Direct,
        }
    }

    fn client(&self) -> Result<reqwest::Client, UgsError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("ugs-badge/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(TIMEOUT)
            .read_timeout(TIMEOUT)
            .pool_max_idle_per_host(0);
        match &self.route {
            Route::System => {}
            Route::Proxy(proxy) => builder = builder.proxy(proxy.clone()),
            Route::Direct => builder = builder.no_proxy(),
        }
        builder
            .build()
            .map_err(|e| UgsError::Transport(format!("failed to create HTTP client: {e}")))
    }
}

impl Transport for HttpTransport {
    async fn post(&self, request: OutboundPost) -> Result<TransportResponse, UgsError> {
        let client = self.client()?;

        let mut builder = client
            .post(&request.url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(request.body);
        if let Some(authorization) = &request.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| UgsError::Transport(error_chain(&e)))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            UgsError::Transport(format!("failed to read response: {}", error_chain(&e)))
        })?;

        tracing::debug!(url = %request.url, "connection released");
        Ok(TransportResponse {
            status,
            body: Some(body),
        })
    }
}

/// `reqwest` hides the useful part ("connection refused") in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
