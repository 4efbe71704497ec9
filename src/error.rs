//! Error types for Puxbay API calls.
//!
//! Every failure a call can produce is a variant of [`Error`]. Failures that come
//! from the API itself (a non-2xx status) or from the network also belong to one
//! of the seven [`ErrorKind`] categories, which is what most callers match on.

use crate::rate_limit::RateLimitInfo;
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

/// Prefix every Puxbay API key starts with.
pub const API_KEY_PREFIX: &str = "pb_";

/// Message used when an error body carries neither `detail` nor `message`.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// The closed taxonomy of client-visible failure categories.
///
/// | HTTP status        | kind             |
/// |--------------------|------------------|
/// | 401                | `Authentication` |
/// | 429                | `RateLimited`    |
/// | 400                | `Validation`     |
/// | 404                | `NotFound`       |
/// | 500 and above      | `Server`         |
/// | any other non-2xx  | `Unknown`        |
/// | no response at all | `Network`        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The API key was rejected.
    Authentication,
    /// Too many requests in the current window.
    RateLimited,
    /// The request body or parameters were invalid.
    Validation,
    /// The addressed entity does not exist.
    NotFound,
    /// The server failed to handle the request.
    Server,
    /// No response was received (connect failure, DNS failure, timeout, interrupted backoff).
    Network,
    /// Any other non-2xx status.
    Unknown,
}

impl ErrorKind {
    /// Classifies a non-2xx status code.
    ///
    /// # Examples
    ///
    /// ```
    /// use puxbay::ErrorKind;
    /// use http::StatusCode;
    ///
    /// assert_eq!(ErrorKind::from_status(StatusCode::NOT_FOUND), ErrorKind::NotFound);
    /// assert_eq!(ErrorKind::from_status(StatusCode::BAD_GATEWAY), ErrorKind::Server);
    /// assert_eq!(ErrorKind::from_status(StatusCode::CONFLICT), ErrorKind::Unknown);
    /// ```
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 => ErrorKind::Authentication,
            429 => ErrorKind::RateLimited,
            400 => ErrorKind::Validation,
            404 => ErrorKind::NotFound,
            s if s >= 500 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        }
    }
}

/// The main error type for Puxbay API calls.
///
/// # Examples
///
/// ```no_run
/// use puxbay::{Client, Config, Error, ErrorKind};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new(Config::builder("pb_live_123").build()?)?;
///
/// match client.products().get("p1").await {
///     Ok(product) => println!("{}", product.name),
///     Err(e) if e.kind() == Some(ErrorKind::NotFound) => println!("gone: {}", e.message()),
///     Err(Error::DeserializationFailed { raw_response, .. }) => eprintln!("bad body: {raw_response}"),
///     Err(e) => return Err(e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The server returned 401.
    #[error("Authentication failed (status {status}): {message}")]
    Authentication {
        /// The HTTP status code
        status: StatusCode,
        /// Message taken from the error body
        message: String,
        /// The raw response body
        raw_response: String,
    },

    /// The server returned 429.
    ///
    /// `rate_limit_info` holds whatever `Retry-After` / `X-RateLimit-*` headers came
    /// with the response. The retry policy does not consult it; it is exposed so
    /// callers can schedule their own follow-up.
    #[error("Rate limit exceeded (status {status}): {message}")]
    RateLimited {
        /// The HTTP status code
        status: StatusCode,
        /// Message taken from the error body
        message: String,
        /// The raw response body
        raw_response: String,
        /// Parsed rate limit headers
        rate_limit_info: RateLimitInfo,
    },

    /// The server returned 400.
    #[error("Validation failed (status {status}): {message}")]
    Validation {
        /// The HTTP status code
        status: StatusCode,
        /// Message taken from the error body
        message: String,
        /// The raw response body
        raw_response: String,
    },

    /// The server returned 404.
    #[error("Not found (status {status}): {message}")]
    NotFound {
        /// The HTTP status code
        status: StatusCode,
        /// Message taken from the error body
        message: String,
        /// The raw response body
        raw_response: String,
    },

    /// The server returned a 5xx status.
    #[error("Server error (status {status}): {message}")]
    Server {
        /// The HTTP status code
        status: StatusCode,
        /// Message taken from the error body
        message: String,
        /// The raw response body
        raw_response: String,
    },

    /// The server returned a non-2xx status with no dedicated kind.
    #[error("API error (status {status}): {message}")]
    Unknown {
        /// The HTTP status code
        status: StatusCode,
        /// Message taken from the error body
        message: String,
        /// The raw response body
        raw_response: String,
    },

    /// A network-level error occurred (connect failure, DNS failure, read/write timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The call was aborted while waiting between retries, or issued after shutdown.
    ///
    /// Classified as [`ErrorKind::Network`] with status code 0.
    #[error("Request interrupted: {0}")]
    Interrupted(String),

    /// A 2xx response body did not match the expected type. Never retried.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The request body could not be serialized to JSON.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// The API key does not start with [`API_KEY_PREFIX`].
    #[error("Invalid API key format: must start with 'pb_'")]
    InvalidApiKey,

    /// The base URL or an endpoint could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

/// Extracts the human-readable message from an API error body.
///
/// `detail` wins over `message`; a body that is not JSON, or has neither field,
/// yields [`UNKNOWN_ERROR_MESSAGE`].
pub(crate) fn extract_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|e| {
            e.detail
                .filter(|d| !d.is_empty())
                .or(e.message.filter(|m| !m.is_empty()))
        })
        .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())
}

impl Error {
    /// Builds the typed error for a non-2xx response.
    pub(crate) fn from_response(status: StatusCode, headers: &HeaderMap, raw_response: String) -> Self {
        let message = extract_message(&raw_response);
        match ErrorKind::from_status(status) {
            ErrorKind::Authentication => Error::Authentication {
                status,
                message,
                raw_response,
            },
            ErrorKind::RateLimited => Error::RateLimited {
                status,
                message,
                raw_response,
                rate_limit_info: RateLimitInfo::from_headers(headers),
            },
            ErrorKind::Validation => Error::Validation {
                status,
                message,
                raw_response,
            },
            ErrorKind::NotFound => Error::NotFound {
                status,
                message,
                raw_response,
            },
            ErrorKind::Server => Error::Server {
                status,
                message,
                raw_response,
            },
            ErrorKind::Network | ErrorKind::Unknown => Error::Unknown {
                status,
                message,
                raw_response,
            },
        }
    }

    /// Returns the taxonomy entry for API and network failures.
    ///
    /// Local failures (bad configuration, serialization, a 2xx body that does not
    /// parse) have no kind and return `None`.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Authentication { .. } => Some(ErrorKind::Authentication),
            Error::RateLimited { .. } => Some(ErrorKind::RateLimited),
            Error::Validation { .. } => Some(ErrorKind::Validation),
            Error::NotFound { .. } => Some(ErrorKind::NotFound),
            Error::Server { .. } => Some(ErrorKind::Server),
            Error::Unknown { .. } => Some(ErrorKind::Unknown),
            Error::Network(_) | Error::Interrupted(_) => Some(ErrorKind::Network),
            Error::DeserializationFailed { .. }
            | Error::SerializationFailed(_)
            | Error::InvalidApiKey
            | Error::InvalidUrl(_)
            | Error::Configuration(_) => None,
        }
    }

    /// Returns the HTTP status code, or 0 when no response was received.
    pub fn status_code(&self) -> u16 {
        self.status().map(|s| s.as_u16()).unwrap_or(0)
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Authentication { status, .. }
            | Error::RateLimited { status, .. }
            | Error::Validation { status, .. }
            | Error::NotFound { status, .. }
            | Error::Server { status, .. }
            | Error::Unknown { status, .. }
            | Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the human-readable message.
    ///
    /// For API errors this is the `detail`/`message` field of the error body;
    /// for everything else it is the error's display text.
    pub fn message(&self) -> String {
        match self {
            Error::Authentication { message, .. }
            | Error::RateLimited { message, .. }
            | Error::Validation { message, .. }
            | Error::NotFound { message, .. }
            | Error::Server { message, .. }
            | Error::Unknown { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Authentication { raw_response, .. }
            | Error::RateLimited { raw_response, .. }
            | Error::Validation { raw_response, .. }
            | Error::NotFound { raw_response, .. }
            | Error::Server { raw_response, .. }
            | Error::Unknown { raw_response, .. }
            | Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns rate limit information for `RateLimited` errors.
    pub fn rate_limit_info(&self) -> Option<&RateLimitInfo> {
        match self {
            Error::RateLimited {
                rate_limit_info, ..
            } => Some(rate_limit_info),
            _ => None,
        }
    }

    /// Returns `true` for the kinds the retry policy re-issues:
    /// rate limiting, server errors and network failures.
    ///
    /// An `Interrupted` call is not retryable; it was cancelled on purpose.
    ///
    /// # Examples
    ///
    /// ```
    /// use puxbay::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::Server {
    ///     status: StatusCode::SERVICE_UNAVAILABLE,
    ///     message: "maintenance".to_string(),
    ///     raw_response: String::new(),
    /// };
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::Validation {
    ///     status: StatusCode::BAD_REQUEST,
    ///     message: "name is required".to_string(),
    ///     raw_response: String::new(),
    /// };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::RateLimited { .. } | Error::Server { .. } | Error::Network(_)
        )
    }
}

/// A specialized `Result` type for Puxbay API calls.
pub type Result<T> = std::result::Result<T, Error>;
