//! The request pipeline.
//!
//! [`Client`] turns a method, an endpoint and an optional body into a typed
//! value: it resolves the URL, serializes the body, runs the attempt loop of
//! [`RetryPolicy`] over the pooled [`Transport`], maps non-2xx responses to
//! [`Error`] kinds and deserializes the rest.

use crate::{
    metadata::RequestMetadata,
    retry::{Attempted, Cancellation, RetryPolicy},
    transport::{RawResponse, Transport},
    Config, Error, Response, Result,
};
use http::Method;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// An async client for the Puxbay API.
///
/// The client is cheap to clone; clones share one connection pool. Build it once
/// at startup and pass it around.
///
/// # Examples
///
/// ```no_run
/// use puxbay::{Client, Config, ListParams};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), puxbay::Error> {
/// let config = Config::builder("pb_live_abc123")
///     .timeout(Duration::from_secs(10))
///     .max_retries(2)
///     .build()?;
/// let client = Client::new(config)?;
///
/// let page = client.products().list(&ListParams::page(1).page_size(50)).await?;
/// for product in &page.results {
///     println!("{} ({:?})", product.name, product.price);
/// }
///
/// client.shutdown();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: Config,
    transport: Mutex<Option<Transport>>,
    retry_policy: RetryPolicy,
    shutdown: watch::Sender<bool>,
}

impl Client {
    /// Creates a client and its connection pool from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let transport = Transport::new(&config)?;
        let retry_policy = RetryPolicy::from_config(&config);
        let (shutdown, _) = watch::channel(false);

        tracing::debug!(
            base_url = %config.base_url(),
            max_retries = config.max_retries(),
            timeout_ms = config.timeout().as_millis(),
            "Created Puxbay client"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                transport: Mutex::new(Some(transport)),
                retry_policy,
                shutdown,
            }),
        })
    }

    /// Creates a client with default settings for the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiKey`] if the key does not start with `pb_`.
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(Config::builder(api_key).build()?)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Releases the connection pool and interrupts calls waiting between retries.
    ///
    /// Calls sleeping in backoff fail with [`Error::Interrupted`]; later calls fail
    /// the same way without touching the network. A request already on the wire
    /// runs to completion (bounded by the timeout), after which its pooled
    /// connection is closed. Calling `shutdown` twice is harmless.
    pub fn shutdown(&self) {
        self.inner.shutdown.send_replace(true);
        if self.inner.transport.lock().take().is_some() {
            tracing::info!("Puxbay client shut down, connection pool released");
        }
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    /// Makes a typed request and returns the response with its metadata.
    ///
    /// An empty 2xx body is read as JSON `null`, so `Res` types that accept null
    /// (`Option<T>`, `serde_json::Value`) succeed without content. Callers that
    /// expect no content at all should use [`call_no_content`](Self::call_no_content),
    /// which never parses the body.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use puxbay::{Client, metadata::RequestMetadata, models::Product, Paginated};
    /// use http::Method;
    ///
    /// # async fn example(client: Client) -> Result<(), puxbay::Error> {
    /// let metadata = RequestMetadata::new(Method::GET, "products/")
    ///     .with_query_param("search", "widget");
    ///
    /// let response = client.call::<(), Paginated<Product>>(metadata, None).await?;
    /// println!("{} matches in {:?}", response.data.count, response.latency);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<Req, Res>(
        &self,
        metadata: RequestMetadata,
        body: Option<&Req>,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let (attempted, latency) = self.execute(&metadata, body).await?;
        parse_response(attempted, latency)
    }

    /// Makes a request whose response body, if any, is discarded.
    ///
    /// Non-2xx statuses still fail with the mapped [`Error`].
    pub async fn call_no_content<Req>(
        &self,
        metadata: RequestMetadata,
        body: Option<&Req>,
    ) -> Result<Response<()>>
    where
        Req: Serialize + ?Sized,
    {
        let (attempted, latency) = self.execute(&metadata, body).await?;
        let Attempted { response, attempts } = attempted;
        let RawResponse {
            status,
            headers,
            body,
        } = check_status(response, latency, attempts)?;
        Ok(Response::new((), body, status, headers, latency, attempts))
    }

    /// Makes a request and returns only the deserialized body.
    ///
    /// This is the form every resource accessor uses.
    pub async fn request<Req, Res>(
        &self,
        method: Method,
        endpoint: impl Into<String>,
        body: Option<&Req>,
    ) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(method, endpoint);
        Ok(self.call(metadata, body).await?.data)
    }

    /// Makes a GET request to the specified endpoint.
    pub async fn get<Res>(&self, endpoint: impl Into<String>) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::GET, endpoint);
        self.call::<(), Res>(metadata, None).await
    }

    /// Makes a POST request with a JSON body.
    pub async fn post<Req, Res>(
        &self,
        endpoint: impl Into<String>,
        body: &Req,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::POST, endpoint);
        self.call(metadata, Some(body)).await
    }

    /// Makes a PUT request with a JSON body.
    pub async fn put<Req, Res>(
        &self,
        endpoint: impl Into<String>,
        body: &Req,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::PUT, endpoint);
        self.call(metadata, Some(body)).await
    }

    /// Makes a PATCH request with a JSON body.
    pub async fn patch<Req, Res>(
        &self,
        endpoint: impl Into<String>,
        body: &Req,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::PATCH, endpoint);
        self.call(metadata, Some(body)).await
    }

    /// Makes a DELETE request. Whatever body comes back is discarded.
    pub async fn delete(&self, endpoint: impl Into<String>) -> Result<Response<()>> {
        let metadata = RequestMetadata::new(Method::DELETE, endpoint);
        self.call_no_content::<()>(metadata, None).await
    }

    fn transport(&self) -> Result<Transport> {
        self.inner
            .transport
            .lock()
            .clone()
            .ok_or_else(|| Error::Interrupted("client has been shut down".to_string()))
    }

    /// Resolves the request and runs it through the retry loop.
    async fn execute<Req>(
        &self,
        metadata: &RequestMetadata,
        body: Option<&Req>,
    ) -> Result<(Attempted, Duration)>
    where
        Req: Serialize + ?Sized,
    {
        let start_time = Instant::now();
        let prepared = metadata.prepare(self.inner.config.base_url(), body)?;
        let transport = self.transport()?;
        let mut cancel = Cancellation::new(self.inner.shutdown.subscribe());

        let attempted = self
            .inner
            .retry_policy
            .run(&prepared.method, &mut cancel, |attempt| {
                tracing::debug!(
                    method = %prepared.method,
                    url = %prepared.url,
                    attempt = attempt,
                    "Executing HTTP request"
                );
                transport.execute(&prepared)
            })
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    error = %e,
                    method = %metadata.method,
                    path = %metadata.path,
                    "Request failed"
                );
            })?;

        Ok((attempted, start_time.elapsed()))
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

/// Logs the final response and turns a non-2xx status into its typed error.
fn check_status(response: RawResponse, latency: Duration, attempts: u32) -> Result<RawResponse> {
    let status = response.status;

    tracing::info!(
        status = status.as_u16(),
        latency_ms = latency.as_millis(),
        attempts = attempts,
        "Received HTTP response"
    );

    if status.is_success() {
        return Ok(response);
    }

    if status.is_client_error() {
        tracing::error!(
            status = status.as_u16(),
            response = %response.body,
            "Client error (4xx)"
        );
    } else if status.is_server_error() {
        tracing::warn!(
            status = status.as_u16(),
            response = %response.body,
            "Server error (5xx)"
        );
    }

    Err(Error::from_response(status, &response.headers, response.body))
}

fn parse_response<Res>(attempted: Attempted, latency: Duration) -> Result<Response<Res>>
where
    Res: DeserializeOwned,
{
    let Attempted { response, attempts } = attempted;
    let RawResponse {
        status,
        headers,
        body,
    } = check_status(response, latency, attempts)?;

    let text = if body.trim().is_empty() { "null" } else { body.as_str() };

    match serde_json::from_str::<Res>(text) {
        Ok(data) => Ok(Response::new(data, body, status, headers, latency, attempts)),
        Err(e) => {
            tracing::error!(
                error = %e,
                raw_response = %body,
                "Failed to deserialize response"
            );

            Err(Error::DeserializationFailed {
                raw_response: body,
                serde_error: e.to_string(),
                status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    fn attempted(code: u16, body: &str) -> Attempted {
        Attempted {
            response: RawResponse {
                status: StatusCode::from_u16(code).unwrap(),
                headers: HeaderMap::new(),
                body: body.to_string(),
            },
            attempts: 1,
        }
    }

    #[test]
    fn test_parse_success() {
        let response =
            parse_response::<Item>(attempted(200, r#"{"id":"p1"}"#), Duration::ZERO).unwrap();
        assert_eq!(response.data, Item { id: "p1".into() });
        assert_eq!(response.attempts, 1);
    }

    #[test]
    fn test_empty_body_is_no_content() {
        for code in [200, 201, 204] {
            let unit = parse_response::<()>(attempted(code, ""), Duration::ZERO).unwrap();
            assert_eq!(unit.status.as_u16(), code);

            let option =
                parse_response::<Option<Item>>(attempted(code, "  \n"), Duration::ZERO).unwrap();
            assert_eq!(option.data, None);
        }
    }

    #[test]
    fn test_empty_body_for_struct_is_deserialization_error() {
        let result = parse_response::<Item>(attempted(200, ""), Duration::ZERO);
        assert!(matches!(result, Err(Error::DeserializationFailed { .. })));
    }

    #[test]
    fn test_malformed_body_keeps_raw_text() {
        match parse_response::<Item>(attempted(200, "not json"), Duration::ZERO) {
            Err(Error::DeserializationFailed {
                raw_response,
                status,
                ..
            }) => {
                assert_eq!(raw_response, "not json");
                assert_eq!(status, StatusCode::OK);
            }
            other => panic!("Expected DeserializationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_error_status_wins_over_body() {
        let result = parse_response::<Item>(
            attempted(404, r#"{"detail":"Product not found"}"#),
            Duration::ZERO,
        );
        match result {
            Err(e @ Error::NotFound { .. }) => assert_eq!(e.message(), "Product not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let client = Client::from_api_key("pb_test_key").unwrap();
        assert!(!client.is_shut_down());

        client.shutdown();
        client.shutdown();

        assert!(client.is_shut_down());
        assert!(matches!(client.transport(), Err(Error::Interrupted(_))));
    }
}
