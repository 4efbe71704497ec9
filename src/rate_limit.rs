//! Rate limit headers attached to 429 responses.
//!
//! The Puxbay API throttles per API key and announces the wait on throttled
//! responses. The values are parsed into [`RateLimitInfo`] and exposed on
//! [`Error::RateLimited`](crate::Error::RateLimited); the retry schedule itself
//! stays on the fixed exponential backoff.

use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Rate limit data carried by a throttled response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// How long the server asked us to wait (`Retry-After`, seconds or HTTP date).
    pub retry_after: Option<Duration>,

    /// When the current window resets (`X-RateLimit-Reset` / `RateLimit-Reset`, Unix seconds).
    pub reset_at: Option<SystemTime>,

    /// Request quota of the window (`X-RateLimit-Limit`).
    pub limit: Option<u64>,

    /// Requests left in the window (`X-RateLimit-Remaining`).
    pub remaining: Option<u64>,
}

impl RateLimitInfo {
    /// Parses the rate limit headers of a response. Missing or malformed
    /// headers leave the matching field `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use puxbay::rate_limit::RateLimitInfo;
    /// use http::HeaderMap;
    /// use std::time::Duration;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("retry-after", "30".parse().unwrap());
    /// headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
    ///
    /// let info = RateLimitInfo::from_headers(&headers);
    /// assert_eq!(info.retry_after, Some(Duration::from_secs(30)));
    /// assert_eq!(info.remaining, Some(0));
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            retry_after: header_str(headers, "retry-after").and_then(parse_retry_after),
            reset_at: header_str(headers, "x-ratelimit-reset")
                .or_else(|| header_str(headers, "ratelimit-reset"))
                .and_then(|v| v.trim().parse::<u64>().ok())
                .and_then(|secs| UNIX_EPOCH.checked_add(Duration::from_secs(secs))),
            limit: header_str(headers, "x-ratelimit-limit").and_then(|v| v.trim().parse().ok()),
            remaining: header_str(headers, "x-ratelimit-remaining")
                .and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Returns how long to wait before the quota is available again, capped at `max_wait`.
    ///
    /// `Retry-After` wins; otherwise the time until `reset_at`. `None` when the
    /// response carried neither, or the reset time is already in the past.
    pub fn suggested_wait(&self, max_wait: Duration) -> Option<Duration> {
        if let Some(retry_after) = self.retry_after {
            return Some(retry_after.min(max_wait));
        }

        self.reset_at
            .and_then(|reset_at| reset_at.duration_since(SystemTime::now()).ok())
            .map(|until_reset| until_reset.min(max_wait))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    // HTTP-date form; a date in the past means "now"
    let at = httpdate::parse_http_date(value).ok()?;
    Some(at.duration_since(SystemTime::now()).unwrap_or(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("60"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.retry_after, Some(Duration::from_secs(60)));
        assert_eq!(info.reset_at, None);
    }

    #[test]
    fn test_retry_after_http_date() {
        let mut headers = HeaderMap::new();
        let at = SystemTime::now() + Duration::from_secs(90);
        headers.insert(
            "retry-after",
            HeaderValue::from_str(&httpdate::fmt_http_date(at)).unwrap(),
        );

        let wait = RateLimitInfo::from_headers(&headers).retry_after.unwrap();
        // HTTP dates have one-second resolution
        assert!(wait <= Duration::from_secs(90));
        assert!(wait >= Duration::from_secs(88));
    }

    #[test]
    fn test_retry_after_date_in_past() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "retry-after",
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.retry_after, Some(Duration::ZERO));
    }

    #[test]
    fn test_window_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("1000"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("ratelimit-reset", HeaderValue::from_static("1700000000"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.limit, Some(1000));
        assert_eq!(info.remaining, Some(0));
        assert_eq!(
            info.reset_at,
            Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        );
    }

    #[test]
    fn test_unrepresentable_reset_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-ratelimit-reset",
            HeaderValue::from_static("18446744073709551615"),
        );
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.reset_at, None);
        assert_eq!(info.remaining, Some(0));
    }

    #[test]
    fn test_malformed_headers_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("soon"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("-1"));

        assert_eq!(RateLimitInfo::from_headers(&headers), RateLimitInfo::default());
    }

    #[test]
    fn test_suggested_wait_is_capped() {
        let info = RateLimitInfo {
            retry_after: Some(Duration::from_secs(600)),
            ..Default::default()
        };
        assert_eq!(
            info.suggested_wait(Duration::from_secs(60)),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_suggested_wait_from_reset() {
        let info = RateLimitInfo {
            reset_at: Some(SystemTime::now() + Duration::from_secs(5)),
            ..Default::default()
        };
        let wait = info.suggested_wait(Duration::from_secs(60)).unwrap();
        assert!(wait <= Duration::from_secs(5));

        let expired = RateLimitInfo {
            reset_at: Some(UNIX_EPOCH),
            ..Default::default()
        };
        assert_eq!(expired.suggested_wait(Duration::from_secs(60)), None);
    }
}
