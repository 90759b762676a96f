//! Client for the metadata service (`POST /api/info`).

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::model::{ErrorBody, InfoRequest, MetadataResponse};

const INFO_PATH: &str = "api/info";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not reach the metadata service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("metadata request failed with status {status}{}", detail_suffix(.message))]
    Status { status: u16, message: Option<String> },

    #[error("malformed metadata response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid service URL: {0}")]
    Url(#[from] url::ParseError),
}

fn detail_suffix(message: &Option<String>) -> String {
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl ApiError {
    /// Error text supplied by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// The remote service that resolves a media URL into its formats
#[async_trait]
pub trait MetadataService: Send + Sync {
    async fn fetch_info(&self, url: &str) -> Result<MetadataResponse, ApiError>;
}

pub struct HttpMetadataService {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpMetadataService {
    /// `base` is the service root, e.g. `http://127.0.0.1:5050/`
    pub fn new(base: &Url) -> Result<Self, ApiError> {
        Self::with_client(reqwest::Client::new(), base)
    }

    pub fn with_client(client: reqwest::Client, base: &Url) -> Result<Self, ApiError> {
        Ok(Self {
            client,
            endpoint: base.join(INFO_PATH)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl MetadataService for HttpMetadataService {
    async fn fetch_info(&self, url: &str) -> Result<MetadataResponse, ApiError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&InfoRequest { url })
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "metadata response");

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.error);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
