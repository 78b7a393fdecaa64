//! HTTP client for the homework review API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::error::ErrorKind;

/// Source of raw homework status answers.
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetches the statuses changed since the `from_date` Unix timestamp.
    async fn fetch(&self, from_date: i64) -> Result<Value, FetchError>;
}

/// Errors that can occur while requesting the review API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport failure requesting '{endpoint}' with params {{from_date: {from_date}}}: {source}")]
    Transport {
        endpoint: String,
        from_date: i64,
        #[source]
        source: reqwest::Error,
    },

    #[error(
        "Endpoint '{endpoint}' with params {{from_date: {from_date}}} is unavailable. \
         status_code: {status}, reason: {reason}, text: {body}"
    )]
    BadStatus {
        endpoint: String,
        from_date: i64,
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Request to '{endpoint}' with params {{from_date: {from_date}}} failed: {source}")]
    Request {
        endpoint: String,
        from_date: i64,
        #[source]
        source: reqwest::Error,
    },

    #[error("Answer of '{endpoint}' is not valid JSON: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Returns the kind of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::BadStatus { .. } => ErrorKind::BadStatus,
            Self::Request { .. } => ErrorKind::Request,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Returns the HTTP status code for [`FetchError::BadStatus`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::BadStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Review API client authenticated with an OAuth token.
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl ApiClient {
    /// Creates a client for `endpoint` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    fn classify(&self, from_date: i64, source: reqwest::Error) -> FetchError {
        let endpoint = self.endpoint.clone();
        if source.is_timeout() || source.is_connect() {
            FetchError::Transport {
                endpoint,
                from_date,
                source,
            }
        } else {
            FetchError::Request {
                endpoint,
                from_date,
                source,
            }
        }
    }
}

#[async_trait]
impl HomeworkSource for ApiClient {
    #[instrument(skip(self))]
    async fn fetch(&self, from_date: i64) -> Result<Value, FetchError> {
        info!(
            "Requesting endpoint '{}' with params {{from_date: {}}}",
            self.endpoint, from_date
        );

        let response = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| self.classify(from_date, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let reason = status.canonical_reason().unwrap_or("Unknown").to_owned();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::BadStatus {
                endpoint: self.endpoint.clone(),
                from_date,
                status: status.as_u16(),
                reason,
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(from_date, e))?;
        debug!("Received {} bytes from review API", body.len());

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            endpoint: self.endpoint.clone(),
            source,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
