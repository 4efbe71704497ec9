//! Successful responses together with their transport metadata.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A deserialized 2xx response plus what it took to get it.
///
/// Resource accessors return only [`data`](Self::data); [`Client::call`](crate::Client::call)
/// and the verb helpers return the whole `Response` for callers that want
/// latency, retry count or headers.
///
/// # Examples
///
/// ```no_run
/// use puxbay::{Client, models::Product};
///
/// # async fn example(client: Client) -> Result<(), puxbay::Error> {
/// let response = client.get::<Product>("products/p1/").await?;
///
/// println!("{} took {:?}", response.name, response.latency);
/// if response.was_retried() {
///     println!("needed {} attempts", response.attempts);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The deserialized response data.
    pub data: T,

    /// The raw response body as received.
    pub raw_body: String,

    /// The HTTP status code of the final attempt.
    pub status: StatusCode,

    /// The response headers of the final attempt.
    pub headers: HeaderMap,

    /// Time from the first attempt to the final response, backoff sleeps included.
    pub latency: Duration,

    /// Attempts made, `1` when the first try succeeded.
    pub attempts: u32,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: u32,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Maps the response data, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use puxbay::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     vec![1, 2, 3],
    ///     "[1,2,3]".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(40),
    ///     1,
    /// );
    ///
    /// let len = response.map(|v| v.len());
    /// assert_eq!(len.data, 3);
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Drops the metadata and returns the data.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Returns `true` if more than one attempt was needed.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value as text, if present and valid ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// The server-assigned request id (`X-Request-ID`), useful in support tickets.
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
