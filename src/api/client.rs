//! HTTP implementation of [`AskClient`].

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::AskClient;
use super::error::{AskError, Result};
use super::types::{AskRequest, AskResponse};

/// Default backend used during local development.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";

/// Client for the retrieval backend's `/ask` endpoint.
///
/// One attempt per call, no retry. Any timeout comes from the transport
/// unless one is set with [`HttpAskClient::with_timeout`].
///
/// # Example
///
/// ```rust,no_run
/// use mattgpt::api::{AskClient, HttpAskClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpAskClient::new("http://localhost:3001")?;
/// let resp = client.ask("How did Matt scale engineering teams?").await?;
/// println!("{} ({} sources)", resp.answer, resp.sources.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpAskClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpAskClient {
    /// Create a client for the backend rooted at `base_url`.
    ///
    /// The endpoint is `{base_url}/ask`. Path prefixes such as an API gateway
    /// stage (`https://host/prod`) are kept.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let endpoint = ask_endpoint(base_url.as_ref())?;
        Ok(Self { endpoint, http })
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, http)
    }

    /// Full URL of the `/ask` endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AskClient for HttpAskClient {
    async fn ask(&self, query: &str) -> Result<AskResponse> {
        tracing::debug!(
            name: "backend.ask.request",
            endpoint = %self.endpoint,
            query_length = query.len(),
            "Sending question to backend"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&AskRequest { query })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: AskResponse = serde_json::from_str(&body)?;

        tracing::debug!(
            name: "backend.ask.response",
            status = status.as_u16(),
            source_count = parsed.sources.len(),
            is_nonsense = parsed.is_nonsense,
            "Backend answered"
        );

        Ok(parsed)
    }
}

fn ask_endpoint(base_url: &str) -> Result<Url> {
    let base = base_url.trim().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/ask"))?)
}
