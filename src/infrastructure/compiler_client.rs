//! Reqwest-backed client for the external compiler API.
//!
//! Performs exactly one POST per call. Transport failures and undecodable
//! bodies are reported as distinct [`DomainError`] kinds; nothing is retried.

use crate::domain::compile::{CompileOutcome, CompileRequest};
use crate::domain::error::DomainError;
use crate::domain::repository::Compiler;
use crate::infrastructure::config::CompilerConfig;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    code: &'a str,
    language: &'a str,
}

/// Body returned by the compiler API. Only `output` and `error` are required.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "timeStamp", default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub status: Option<i64>,
    pub output: String,
    pub error: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

impl From<ApiResponse> for CompileOutcome {
    fn from(response: ApiResponse) -> Self {
        if response.error.is_empty() {
            CompileOutcome::success(response.output)
        } else {
            CompileOutcome::failure(response.error)
        }
    }
}

pub struct HttpCompiler {
    client: Client,
    endpoint: Url,
}

impl HttpCompiler {
    /// The client-wide timeout is the deadline for the whole round trip.
    pub fn new(config: &CompilerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl Compiler for HttpCompiler {
    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, language = %request.language))]
    async fn forward(&self, request: &CompileRequest) -> Result<CompileOutcome> {
        let body = ApiRequest {
            code: &request.code,
            language: &request.language,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, timeout = e.is_timeout(), "Failed to send request to compiler API");
                DomainError::UpstreamUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Compiler API answered with non-success status");
        }
        info!(status = %status, "Request to compiler API sent");

        let bytes = response.bytes().await.map_err(|e| {
            error!(error = %e, "Failed to read compiler API response body");
            DomainError::UpstreamUnavailable(e.to_string())
        })?;

        let decoded = parse_response(&bytes)?;
        debug!(
            upstream_status = ?decoded.status,
            upstream_language = ?decoded.language,
            upstream_timestamp = ?decoded.timestamp,
            has_error = !decoded.error.is_empty(),
            "Compiler API response decoded"
        );

        Ok(decoded.into())
    }
}

fn parse_response(body: &[u8]) -> Result<ApiResponse, DomainError> {
    serde_json::from_slice(body).map_err(|e| {
        error!(error = %e, "Failed to decode compiler API response");
        DomainError::UpstreamProtocolError(format!("invalid compiler API payload: {}", e))
    })
}
