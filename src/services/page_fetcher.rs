use std::{error::Error as StdError, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{} for url: {url}", status_line(.status))]
    Status { status: StatusCode, url: String },
    #[error("gave up on {url} after {attempts} attempts answered with {status}")]
    RetriesExhausted {
        status: StatusCode,
        url: String,
        attempts: u32,
    },
    #[error("Invalid URL '{0}': not a string")]
    InvalidUrl(String),
    #[error("{0}")]
    Transport(Box<dyn StdError + Send + Sync>),
}

fn status_line(status: &StatusCode) -> String {
    let kind = if status.is_server_error() {
        "Server"
    } else {
        "Client"
    };
    format!(
        "{} {} Error: {}",
        status.as_u16(),
        kind,
        status.canonical_reason().unwrap_or("Unknown")
    )
}

pub struct PageResponse {
    pub status: StatusCode,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<PageResponse, FetchError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.into()))?;

        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<PageResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.into()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.into()))?;

        Ok(PageResponse { status, body })
    }
}

/// Which status means "come back later", how long to wait, and an optional
/// cap on attempts. `max_attempts: None` keeps retrying forever.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub retry_status: StatusCode,
    pub wait: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            retry_status: StatusCode::NOT_ACCEPTABLE,
            wait: Duration::from_secs(120),
            max_attempts: None,
        }
    }
}

pub struct PageFetcher<T = HttpTransport> {
    transport: T,
    retry: RetryPolicy,
}

impl<T: Transport> PageFetcher<T> {
    pub fn new(transport: T, retry: RetryPolicy) -> Self {
        PageFetcher { transport, retry }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempts: u32 = 0;

        loop {
            let response = self.transport.get(url).await?;
            attempts += 1;

            if response.status != self.retry.retry_status {
                if response.status.is_client_error() || response.status.is_server_error() {
                    return Err(FetchError::Status {
                        status: response.status,
                        url: url.to_string(),
                    });
                }
                return Ok(response.body);
            }

            if self
                .retry
                .max_attempts
                .is_some_and(|max_attempts| attempts >= max_attempts)
            {
                return Err(FetchError::RetriesExhausted {
                    status: response.status,
                    url: url.to_string(),
                    attempts,
                });
            }

            log::warn!(
                "⚠️ Got {} for {}. Waiting {}s before retrying...",
                response.status,
                url,
                self.retry.wait.as_secs()
            );
            tokio::time::sleep(self.retry.wait).await;
        }
    }
}
