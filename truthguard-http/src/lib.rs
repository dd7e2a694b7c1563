//! Minimal HTTP client for the analysis service, with safe logging.
//!
//! - JSON and multipart POST helpers anchored to a base URL
//! - Explicit per-client and per-request timeouts (never unbounded)
//! - Single attempt per call: failures are reported, not retried
//! - Optional *raw* request/response logging via `TRUTHGUARD_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), truthguard_http::HttpError> {
//! let client = truthguard_http::HttpClient::new("http://127.0.0.1:8000/analyze")?;
//! let got: serde_json::Value = client
//!     .post_json("text", &serde_json::json!({ "text": "hello" }), Default::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`).

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

pub use reqwest::StatusCode as HttpStatus;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "TRUTHGUARD_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: &RequestBody) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    match body {
        RequestBody::Empty => {}
        RequestBody::Json(bytes) => {
            let mut s = String::from_utf8_lossy(bytes).to_string();
            if s.len() > RAW_MAX_BODY {
                truncate_at_char_boundary(&mut s, RAW_MAX_BODY);
                s.push_str("...");
            }
            parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
        }
        RequestBody::Multipart { field, file } => {
            parts.push(format!(
                "-F '{}=@{};type={}' # ({} bytes)",
                field,
                file.file_name,
                file.mime,
                file.bytes.len()
            ));
        }
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") || key.eq_ignore_ascii_case("cookie") {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status for errors that carried one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Request Options
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use truthguard_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    pub timeout: Option<Duration>,
    pub headers: Option<HeaderMap>,
}

/// An in-memory file attached to a multipart request.
#[derive(Clone, Debug)]
pub struct FilePart {
    pub file_name: String,
    pub mime: String,
    pub bytes: Bytes,
}

enum RequestBody<'a> {
    Empty,
    Json(Vec<u8>),
    Multipart { field: &'a str, file: &'a FilePart },
}

impl RequestBody<'_> {
    fn kind(&self) -> &'static str {
        match self {
            RequestBody::Empty => "none",
            RequestBody::Json(_) => "json",
            RequestBody::Multipart { .. } => "multipart",
        }
    }
}

// ==============================
// Client
// ==============================

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// The base is treated as a directory, so relative paths are appended to
    /// it rather than replacing its last segment.
    ///
    /// ```no_run
    /// use truthguard_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("http://127.0.0.1:8000/analyze")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(30));
    /// assert_eq!(client.base().as_str(), "http://127.0.0.1:8000/analyze/");
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(HttpError::Url(format!("{base} cannot be used as a base URL")));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(30),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use truthguard_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("http://127.0.0.1:8000/analyze")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` against the base URL.
    pub fn url_for(&self, path: &str) -> Result<Url, HttpError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = serde_json::to_vec(body).map_err(|e| HttpError::Build(e.to_string()))?;
        let resp = self
            .execute(Method::POST, path, RequestBody::Json(bytes), opts)
            .await?;
        decode_json(resp)
    }

    /// POST a single file as `multipart/form-data` and decode a JSON response.
    pub async fn post_multipart<T>(
        &self,
        path: &str,
        field: &str,
        file: &FilePart,
        opts: RequestOpts,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let resp = self
            .execute(Method::POST, path, RequestBody::Multipart { field, file }, opts)
            .await?;
        decode_json(resp)
    }

    /// GET `path` and report the status without decoding the body.
    pub async fn probe(&self, path: &str, opts: RequestOpts) -> Result<StatusCode, HttpError> {
        match self.execute(Method::GET, path, RequestBody::Empty, opts).await {
            Ok(resp) => Ok(resp.status),
            Err(HttpError::Api { status, .. }) => Ok(status),
            Err(e) => Err(e),
        }
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: RequestBody<'_>,
        opts: RequestOpts,
    ) -> Result<RawResponse, HttpError> {
        let url = self.url_for(path)?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let req_id = format!("r{}", Uuid::new_v4().simple());

        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout);
        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }
        rb = match &body {
            RequestBody::Empty => rb,
            RequestBody::Json(bytes) => rb
                .header(CONTENT_TYPE, "application/json")
                .body(bytes.clone()),
            RequestBody::Multipart { field, file } => {
                let part = Part::stream_with_length(
                    reqwest::Body::from(file.bytes.clone()),
                    file.bytes.len() as u64,
                )
                .file_name(file.file_name.clone())
                .mime_str(&file.mime)
                .map_err(|e| HttpError::Build(format!("invalid mime type {}: {e}", file.mime)))?;
                rb.multipart(Form::new().part(field.to_string(), part))
            }
        };

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=timeout.as_millis() as u64,
            body_kind=body.kind(),
            "http.request.start"
        );

        if raw_enabled() {
            let empty = HeaderMap::new();
            let curl = make_curl(&method, &url, opts.headers.as_ref().unwrap_or(&empty), &body);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = rb.send().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, message=%err, "http.network_error.send");
            classify_reqwest(err, timeout)
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, message=%err, "http.network_error.body");
            classify_reqwest(err, timeout)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let server_req_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%server_req_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target: "http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

        if status.is_success() {
            return Ok(RawResponse {
                req_id,
                status,
                bytes,
            });
        }

        let message = extract_error_message(&bytes);
        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%server_req_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id: server_req_id,
        })
    }
}

struct RawResponse {
    req_id: String,
    status: StatusCode,
    bytes: Bytes,
}

fn decode_json<T: DeserializeOwned>(resp: RawResponse) -> Result<T, HttpError> {
    serde_json::from_slice::<T>(&resp.bytes).map_err(|e| {
        let snippet = snip_body(&resp.bytes);
        tracing::warn!(
            req_id=%resp.req_id,
            serde_line=%e.line(),
            serde_col=%e.column(),
            serde_err=%e,
            body_snippet=%snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(e.to_string(), snippet)
    })
}

fn classify_reqwest(err: reqwest::Error, timeout: Duration) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(timeout)
    } else if err.is_builder() {
        HttpError::Build(err.to_string())
    } else {
        HttpError::Network(err.to_string())
    }
}

// ==============================
// Helpers
// ==============================

/// Pull a human-readable message out of an error body.
///
/// Understands FastAPI's `{"detail": "..."}` and validation arrays
/// (`{"detail": [{"msg": "..."}]}`), plus the generic `message` / `error`
/// shapes; anything else falls back to a body snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct DetailList {
        detail: Vec<DetailItem>,
    }
    #[derive(Deserialize)]
    struct DetailItem {
        #[serde(default)]
        msg: String,
    }

    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(list) = serde_json::from_slice::<DetailList>(body) {
        let msgs: Vec<String> = list
            .detail
            .into_iter()
            .map(|d| d.msg)
            .filter(|m| !m.is_empty())
            .collect();
        if !msgs.is_empty() {
            return msgs.join("; ");
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        truncate_at_char_boundary(&mut snip, SNIPPET_MAX);
        snip.push_str("...");
    }
    snip
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    let mut cut = max.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}
