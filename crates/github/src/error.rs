//! GitHub client error types.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Snapshot of the `x-ratelimit-*` headers on a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    /// Unix seconds at which the quota resets.
    pub reset: Option<i64>,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        }

        Self {
            limit: header(headers, "x-ratelimit-limit"),
            remaining: header(headers, "x-ratelimit-remaining"),
            reset: header(headers, "x-ratelimit-reset"),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        self.reset
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}

#[derive(Debug, Error)]
pub enum GithubError {
    /// Non-success HTTP status from the API. `message` is GitHub's own
    /// `message` field when the body carried one.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        rate_limit: RateLimit,
    },

    /// Could not reach the API at all (DNS, connection refused, timeout).
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GithubError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::Network(e.to_string())
        } else if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Http(e)
        }
    }
}

impl GithubError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// A 403 that is not a rate limit: the token lacks access.
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403) && !self.is_rate_limited()
    }

    /// A 403 whose remaining quota reads zero.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Api { status: 403, rate_limit, .. } => rate_limit.is_exhausted(),
            _ => false,
        }
    }

    pub fn rate_limit_reset(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Api { rate_limit, .. } => rate_limit.reset_at(),
            _ => None,
        }
    }
}
