//! Minimal JSON-over-HTTP client with safe logging.
//!
//! - Request options: pre-encoded query string, timeout
//! - Non-success responses are turned into [`HttpError::Api`] with the
//!   server-provided `error` message, or the status reason when there is none
//! - Optional *raw* request/response logging via `OPENSHELF_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), openshelf_http::HttpError> {
//! let client = openshelf_http::HttpClient::new("https://openlibrary.org")?;
//! let got: serde_json::Value = client
//!     .get_json("search.json", openshelf_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `OPENSHELF_HTTP_RAW=1`.

use reqwest::{Client, Method};
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;
use std::borrow::Cow;
use std::env;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

pub use reqwest::{StatusCode, Url};

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "OPENSHELF_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;

const USER_AGENT: &str = concat!("openshelf/", env!("CARGO_PKG_VERSION"));

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a curl command that replays the request.
fn make_curl(method: &Method, url: &Url) -> String {
    format!(
        "curl -X{method} -H 'User-Agent: {USER_AGENT}' '{}'",
        url.as_str().replace('\'', "%27")
    )
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
    #[error("decode error: {0}")]
    Decode(String),
    #[error("server returned error {status}: {message}")]
    Api { status: StatusCode, message: String },
}

// ==============================
// Request Options
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// `query` is taken verbatim: callers that care about parameter order or
/// a particular percent-encoding build the string themselves.
///
/// ```
/// use openshelf_http::RequestOpts;
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     query: Some(Cow::Borrowed("q=dune&limit=5")),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub query: Option<Cow<'a, str>>,
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
    /// A base without a trailing slash is treated as a directory, so
    /// `https://host/api` + `search.json` resolves to `https://host/api/search.json`.
    ///
    /// ```no_run
    /// use openshelf_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://openlibrary.org")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use openshelf_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://openlibrary.org")?
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

    /// Resolve `path` against the base and attach the pre-encoded query.
    pub fn resolve(&self, path: &str, opts: &RequestOpts<'_>) -> Result<Url, HttpError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;
        match opts.query.as_deref() {
            Some(q) if !q.is_empty() => url.set_query(Some(q)),
            _ => url.set_query(None),
        }
        Ok(url)
    }

    /// GET JSON with per-request options (query/timeout).
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json_internal(Method::GET, path, opts).await
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn request_json_internal<T>(
        &self,
        method: Method,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self.resolve(path, &opts)?;

        // ----- Build request -----
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout);

        let req_id = Uuid::new_v4().simple().to_string();

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query=%url.query().unwrap_or(""),
            timeout_ms=timeout.as_millis() as u64,
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&method, &url);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = std::time::Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.send");
            HttpError::Network(message)
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
            HttpError::Network(message)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let req_hdr_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%req_hdr_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?headers,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snippet,
            "http.response.body_snippet"
        );

        // ----- Success path -----
        if status.is_success() {
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                tracing::warn!(
                    req_id=%req_id,
                    serde_line=%e.line(),
                    serde_col=%e.column(),
                    serde_err=%e.to_string(),
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string())
            });
        }

        // ----- Non-success -----
        // Error bodies are expected to be JSON; anything else is a decode failure.
        let message = match extract_error_message(&bytes) {
            Ok(Some(message)) => message,
            Ok(None) => status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
            Err(e) => {
                tracing::warn!(
                    req_id=%req_id,
                    %status,
                    serde_err=%e.to_string(),
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                return Err(HttpError::Decode(e.to_string()));
            }
        };

        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%req_hdr_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api { status, message })
    }
}

// ==============================
// Helpers
// ==============================

/// Pull a human-readable message out of a JSON error body.
///
/// Any non-empty `error` value counts: strings are used as-is, objects with a
/// string `message` yield that message, other values are rendered as text.
/// `null`, `false`, `0` and `""` carry no message and give `Ok(None)`.
/// A literal `null` body has no fields to read and is rejected.
fn extract_error_message(body: &[u8]) -> Result<Option<String>, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;
    if value.is_null() {
        return Err(serde_json::Error::custom("error body is null"));
    }
    let message = match value.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Object(obj)) => match obj.get("message") {
            Some(Value::String(m)) => Some(m.clone()),
            _ => Some(Value::Object(obj.clone()).to_string()),
        },
        Some(other) => Some(other.to_string()),
    };
    Ok(message.filter(|m| !m.is_empty()))
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_plain_string() {
        let got = extract_error_message(br#"{"error": "service unavailable"}"#).unwrap();
        assert_eq!(got.as_deref(), Some("service unavailable"));
    }

    #[test]
    fn error_message_from_nested_object() {
        let got = extract_error_message(br#"{"error": {"message": "bad query"}}"#).unwrap();
        assert_eq!(got.as_deref(), Some("bad query"));
    }

    #[test]
    fn error_message_absent_or_empty() {
        assert_eq!(extract_error_message(br#"{"detail": "x"}"#).unwrap(), None);
        for falsy in [r#"{"error": ""}"#, r#"{"error": null}"#, r#"{"error": false}"#, r#"{"error": 0}"#] {
            assert_eq!(extract_error_message(falsy.as_bytes()).unwrap(), None, "{falsy}");
        }
        assert_eq!(extract_error_message(b"[1, 2]").unwrap(), None);
        assert_eq!(extract_error_message(br#""oops""#).unwrap(), None);
    }

    #[test]
    fn error_message_from_other_values() {
        let got = |body: &str| extract_error_message(body.as_bytes()).unwrap();
        assert_eq!(got(r#"{"error": 429}"#).as_deref(), Some("429"));
        assert_eq!(got(r#"{"error": true}"#).as_deref(), Some("true"));
        assert_eq!(got(r#"{"error": {"code": 7}}"#).as_deref(), Some(r#"{"code":7}"#));
    }

    #[test]
    fn error_message_rejects_non_json() {
        assert!(extract_error_message(b"<html>Bad Gateway</html>").is_err());
        assert!(extract_error_message(b"").is_err());
    }

    #[test]
    fn null_error_body_is_rejected() {
        let err = extract_error_message(b"null").unwrap_err();
        assert!(err.to_string().contains("error body is null"));
    }

    #[test]
    fn snip_body_truncates_on_char_boundary() {
        let long = "é".repeat(400);
        let snip = snip_body(long.as_bytes());
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= SNIPPET_MAX + 3);

        assert_eq!(snip_body(b"short"), "short");
    }

    #[test]
    fn curl_replays_the_url() {
        let url = Url::parse("https://openlibrary.org/search.json?q=dune").unwrap();
        let curl = make_curl(&Method::GET, &url);
        assert!(curl.starts_with("curl -XGET -H 'User-Agent: openshelf/"));
        assert!(curl.ends_with("'https://openlibrary.org/search.json?q=dune'"));
    }

    #[test]
    fn resolve_keeps_query_verbatim() {
        let client = HttpClient::new("https://openlibrary.org").unwrap();
        let opts = RequestOpts {
            query: Some(Cow::Borrowed("q=the%20hobbit+first_publish_year%3A%5B1950%20TO%20%2A%5D&limit=5")),
            ..Default::default()
        };
        let url = client.resolve("search.json", &opts).unwrap();
        assert_eq!(
            url.as_str(),
            "https://openlibrary.org/search.json?q=the%20hobbit+first_publish_year%3A%5B1950%20TO%20%2A%5D&limit=5"
        );
    }

    #[test]
    fn base_without_trailing_slash_is_a_directory() {
        let client = HttpClient::new("http://127.0.0.1:9000/mirror").unwrap();
        let url = client
            .resolve("search.json", &RequestOpts::default())
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/mirror/search.json");
    }

    #[test]
    fn invalid_base_is_rejected() {
        assert!(matches!(HttpClient::new("not a url"), Err(HttpError::Url(_))));
    }
}
