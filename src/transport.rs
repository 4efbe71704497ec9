//! The pooled HTTP transport.
//!
//! [`Transport`] owns the `reqwest` connection pool and performs exactly one
//! request/response exchange per [`Transport::execute`] call. It knows nothing
//! about retries or status codes; it only reports what came back.

use crate::metadata::PreparedRequest;
use crate::{Config, Error, Result};
use http::{HeaderMap, HeaderValue, Method, StatusCode};

/// A response read in full, before its status is interpreted.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The whole body as text (empty for bodiless responses).
    pub body: String,
}

impl RawResponse {
    /// Returns `true` for 429 and 5xx, the statuses worth another attempt.
    pub fn is_retryable(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS || self.status.is_server_error()
    }
}

/// Pooled, keep-alive HTTP transport with the static Puxbay headers installed.
#[derive(Debug, Clone)]
pub struct Transport {
    http_client: reqwest::Client,
}

impl Transport {
    /// Builds the connection pool described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a header value is not valid ASCII or
    /// the TLS backend cannot be initialised.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .default_headers(default_headers(config)?)
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .pool_max_idle_per_host(config.max_idle_connections())
            .pool_idle_timeout(config.keep_alive())
            .tcp_keepalive(config.keep_alive())
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| {
                Error::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { http_client })
    }

    /// Sends one request and reads the full response body.
    ///
    /// Connect, DNS, timeout and body-read failures all surface as [`Error::Network`].
    pub async fn execute(&self, request: &PreparedRequest) -> Result<RawResponse> {
        let mut builder = self
            .http_client
            .request(request.method.clone(), request.url.clone());

        builder = match &request.body {
            Some(json) => builder.body(json.clone()),
            None if request.method == Method::GET || request.method == Method::DELETE => builder,
            // other verbs always carry a (possibly empty) payload
            None => builder
                .header(http::header::CONTENT_LENGTH, 0)
                .body(Vec::new()),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn default_headers(config: &Config) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let mut api_key = header_value(config.api_key())?;
    api_key.set_sensitive(true);
    headers.insert("x-api-key", api_key);
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(http::header::USER_AGENT, header_value(config.user_agent())?);
    headers.insert(
        http::header::ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate"),
    );
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::try_from(value)
        .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))
}
