use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::Serialize;
use thiserror::Error;

use crate::core::{ResponseError, RiskResponse};

/// Failure of a single scoring request. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// DNS, refused connection, timeout, or a body that could not be read.
    #[error("Connection error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status. The body is kept verbatim.
    #[error("Backend error {status_code}: {body}")]
    Backend { status_code: u16, body: String },

    /// A 2xx answer that does not carry the required fields.
    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] ResponseError),
}

/// Source of risk profiles. The HTTP client is the production implementation.
pub trait RiskService: Send + Sync {
    fn fetch(&self, identifier: &str) -> Result<RiskResponse, ClientError>;
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    wallet_address: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpRiskClient {
    client: Client,
    endpoint: reqwest::Url,
}

impl HttpRiskClient {
    /// `timeout = None` leaves the request unbounded.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = reqwest::Url::parse(endpoint.trim())
            .with_context(|| format!("invalid service endpoint: {endpoint}"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(anyhow!(
                "unsupported endpoint scheme `{}` (expected http or https)",
                endpoint.scheme()
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("walletrisk/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

impl RiskService for HttpRiskClient {
    fn fetch(&self, identifier: &str) -> Result<RiskResponse, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, wallet = identifier, "sending risk request");

        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&PredictRequest {
                wallet_address: identifier,
            })
            .send()
            .map_err(transport_error)?;

        let status = resp.status();
        let body = resp.text().map_err(transport_error)?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "risk response received");

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "scoring service returned an error status");
            return Err(ClientError::Backend {
                status_code: status.as_u16(),
                body,
            });
        }

        RiskResponse::from_json(&body).map_err(|reason| {
            tracing::warn!(%reason, "scoring service returned a malformed body");
            ClientError::from(reason)
        })
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    let mut msg = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        let cause_s = cause.to_string();
        if !msg.contains(&cause_s) {
            msg.push_str(": ");
            msg.push_str(&cause_s);
        }
        source = std::error::Error::source(cause);
    }
    tracing::warn!(error = %msg, "risk request failed");
    ClientError::Transport(msg)
}
