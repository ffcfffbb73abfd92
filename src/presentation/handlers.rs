use crate::application::auth_service::CredentialStore;
use crate::application::compile_service::CompileProxy;
use crate::domain::compile::{CompileOutcome, CompileRequest};
use crate::domain::error::{DomainError, FieldError};
use crate::presentation::middleware::RequestId;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

// Shared state: compile proxy and credential store
pub struct AppState {
    pub compile_proxy: CompileProxy,
    pub credentials: CredentialStore,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

/// Client-facing error. Messages are fixed; detail goes to the log.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request")]
    Validation(Vec<FieldError>),
    #[error("failed to decode request")]
    Decode(String),
    #[error("failed to send request")]
    UpstreamUnavailable(String),
    #[error("failed to decode api response")]
    UpstreamProtocol(String),
    #[error("user with this mail already exists")]
    DuplicateUser,
    #[error("user not found")]
    UserNotFound,
    #[error("database error: {0}")]
    Database(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            // Decode, upstream, duplicate-mail and store failures all surface as 500
            ApiError::Decode(_)
            | ApiError::UpstreamUnavailable(_)
            | ApiError::UpstreamProtocol(_)
            | ApiError::DuplicateUser
            | ApiError::Database(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        match self {
            ApiError::Validation(fields) => {
                warn!(error = %error_msg, status = %status, fields = ?fields, "Validation error")
            }
            ApiError::UserNotFound => {
                warn!(error = %error_msg, status = %status, "User not found")
            }
            ApiError::DuplicateUser => {
                warn!(error = %error_msg, status = %status, "Duplicate user")
            }
            ApiError::Decode(detail)
            | ApiError::UpstreamUnavailable(detail)
            | ApiError::UpstreamProtocol(detail) => {
                error!(error = %error_msg, detail = %detail, status = %status, "Request failed")
            }
            ApiError::Database(_) => {
                error!(error = %error_msg, status = %status, "Database error")
            }
            ApiError::Internal(_) => {
                error!(error = %error_msg, status = %status, "Internal error")
            }
        }

        let details = match self {
            ApiError::Validation(fields) => Some(serde_json::json!({ "fields": fields })),
            _ => None,
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_msg,
            details,
        })
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidInput(fields) => ApiError::Validation(fields),
            DomainError::UpstreamUnavailable(msg) => ApiError::UpstreamUnavailable(msg),
            DomainError::UpstreamProtocolError(msg) => ApiError::UpstreamProtocol(msg),
            DomainError::DuplicateUser => ApiError::DuplicateUser,
            DomainError::UserNotFound => ApiError::UserNotFound,
            DomainError::StoreUnavailable(msg) => ApiError::Database(msg),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(domain) => ApiError::from(domain),
            Err(other) => ApiError::Internal(other.to_string()),
        }
    }
}

/// Turns body decode failures into the same 500 the rest of the API uses.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(ToString::to_string)
        .unwrap_or_default();
    warn!(request_id = %request_id, error = %err, "Failed to decode request body");
    ApiError::Decode(err.to_string()).into()
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub success: u8,
    pub result: String,
}

impl From<CompileOutcome> for RunResponse {
    fn from(outcome: CompileOutcome) -> Self {
        RunResponse {
            success: u8::from(outcome.succeeded),
            result: outcome.output,
        }
    }
}

/// Always 200 once the compiler answered; `success` tells the two cases apart.
#[instrument(skip(state, request_id, req), fields(request_id = %request_id))]
pub async fn run(
    state: web::Data<AppState>,
    request_id: RequestId,
    req: web::Json<CompileRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = req.into_inner();
    info!(
        language = %request.language,
        code_len = request.code.len(),
        "Request body decoded"
    );

    let outcome = state.compile_proxy.run(request).await?;

    Ok(HttpResponse::Ok().json(RunResponse::from(outcome)))
}
