// Lamp API HTTP client
//
// Wraps `reqwest::Client` with URL construction, in-flight registration,
// cancellation, and one-shot error classification. All endpoint modules
// (device, monitor, control, lamp, user, dashboard) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::{Error, ErrorKind};
use crate::inflight::InflightRegistry;
use crate::transport::TransportConfig;

/// One outbound call: method, path relative to the base URL, query pairs,
/// optional JSON body, and an optional caller-owned cancellation token.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub cancel: Option<CancellationToken>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            cancel: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Tie this request to a caller token in addition to the registry.
    #[must_use]
    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// HTTP client for the lamp backend and the dashboard server.
///
/// Every request is registered in the shared [`InflightRegistry`] for its
/// whole lifetime, so [`ApiClient::cancel_all`] abandons everything that is
/// still outstanding. Two clients built over the same registry cancel
/// together.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    inflight: InflightRegistry,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `http://lamp.local:5000/api`.
    pub fn new(
        base_url: Url,
        transport: &TransportConfig,
        inflight: InflightRegistry,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, transport.timeout, inflight))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        timeout: Duration,
        inflight: InflightRegistry,
    ) -> Self {
        Self {
            http,
            base_url,
            timeout,
            inflight,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn inflight(&self) -> &InflightRegistry {
        &self.inflight
    }

    /// Cancel every outstanding request sharing this client's registry.
    pub fn cancel_all(&self, reason: &str) -> usize {
        self.inflight.cancel_all(reason)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}{path}`, with exactly one slash between them.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Request::get(path)).await
    }

    pub(crate) async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let request = query
            .iter()
            .fold(Request::get(path), |req, (k, v)| req.query(*k, v));
        self.request(request).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        self.request(Request::post(path).json(body)?).await
    }

    /// POST with no body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Request::post(path)).await
    }

    /// Dispatch a request and decode the response body.
    ///
    /// The outcome is classified once and logged once: cancellations at
    /// debug, timeouts at warn, everything else at error.
    pub async fn request<T: DeserializeOwned>(&self, request: Request) -> Result<T, Error> {
        let guard = self.inflight.register();
        let caller = request.cancel.clone().unwrap_or_default();

        let result = tokio::select! {
            biased;
            () = guard.cancelled() => Err(Error::Canceled { reason: guard.reason() }),
            () = caller.cancelled() => Err(Error::Canceled { reason: "caller canceled".into() }),
            body = self.dispatch(&request) => body.and_then(|text| decode(&text)),
        };
        drop(guard);

        if let Err(ref e) = result {
            self.log_failure(&request, e);
        }
        result
    }

    async fn dispatch(&self, request: &Request) -> Result<String, Error> {
        let url = self.url(&request.path)?;
        debug!(method = %request.method, %url, "dispatching request");

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .timeout(self.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| self.classify(request, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.classify(request, e))?;
        trace!(status = status.as_u16(), len = body.len(), "response received");

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                path: request.path.clone(),
                body,
            });
        }
        Ok(body)
    }

    fn classify(&self, request: &Request, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                path: request.path.clone(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            Error::Transport(err)
        }
    }

    fn log_failure(&self, request: &Request, err: &Error) {
        let path = request.path.as_str();
        match err.kind() {
            ErrorKind::Canceled => debug!(path, error = %err, "request canceled"),
            ErrorKind::Timeout => warn!(
                path,
                timeout_ms = self.timeout.as_millis(),
                "request timed out"
            ),
            ErrorKind::Other => error!(path, error = %err, "request failed"),
        }
    }
}

/// Decode a response body; an empty body decodes as JSON `null`.
fn decode<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(|e| {
        let end = text.char_indices().nth(200).map_or(text.len(), |(i, _)| i);
        let preview = &text[..end];
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: text.to_owned(),
        }
    })
}
