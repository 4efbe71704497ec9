//! Request description and URL assembly.

use crate::{Error, Result};
use http::Method;
use serde::Serialize;
use url::Url;

/// Method, endpoint and query of one API call.
///
/// The endpoint is relative to the configured base URL, e.g. `products/` or
/// `products/p1/stock-adjustment/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMetadata {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The endpoint path, relative to the base URL.
    pub path: String,

    /// Query parameters, in the order they are appended.
    pub query_params: Vec<(String, String)>,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query_params: Vec::new(),
        }
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.push((key.into(), value.to_string()));
        self
    }

    /// Adds multiple query parameters to the request.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query_params.extend(params);
        self
    }

    /// Resolves the full URL: base URL, a single `/`, then the endpoint, then the
    /// URL-encoded query.
    ///
    /// # Examples
    ///
    /// ```
    /// use puxbay::metadata::RequestMetadata;
    /// use http::Method;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://api.puxbay.com/api/v1").unwrap();
    /// let url = RequestMetadata::new(Method::GET, "products/")
    ///     .with_query_param("page", 2)
    ///     .url(&base)
    ///     .unwrap();
    ///
    /// assert_eq!(url.as_str(), "https://api.puxbay.com/api/v1/products/?page=2");
    /// ```
    pub fn url(&self, base_url: &Url) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            base_url.as_str().trim_end_matches('/'),
            self.path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)?;

        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Resolves the URL and serializes the body, producing what the transport sends.
    pub fn prepare<Req>(&self, base_url: &Url, body: Option<&Req>) -> Result<PreparedRequest>
    where
        Req: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| Error::SerializationFailed(e.to_string()))?;

        Ok(PreparedRequest {
            method: self.method.clone(),
            url: self.url(base_url)?,
            body,
        })
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new(Method::GET, "")
    }
}

/// A fully resolved request. Reused unchanged by every retry attempt.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute URL.
    pub url: Url,
    /// The JSON payload, if the caller supplied a body.
    pub body: Option<Vec<u8>>,
}
