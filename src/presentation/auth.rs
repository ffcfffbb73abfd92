use crate::domain::user::{LoginRequest, RegisterRequest, UserView};
use crate::presentation::handlers::{ApiError, AppState};
use crate::presentation::middleware::RequestId;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultResponse<T> {
    pub result: T,
}

#[instrument(skip(state, request_id, req), fields(request_id = %request_id))]
pub async fn register(
    state: web::Data<AppState>,
    request_id: RequestId,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(request = ?req, "Registration request received");

    state.credentials.register(req.into_inner()).await.map_err(|e| {
        error!(error = %e, "Failed to register user");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Created().json(ResultResponse { result: true }))
}

#[instrument(skip(state, request_id, req), fields(request_id = %request_id))]
pub async fn login(
    state: web::Data<AppState>,
    request_id: RequestId,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(mail = %req.mail, "Login request received");

    let verified = state
        .credentials
        .verify_login(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to verify login");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(ResultResponse { result: verified }))
}

#[instrument(skip(state, request_id), fields(request_id = %request_id))]
pub async fn list_users(
    state: web::Data<AppState>,
    request_id: RequestId,
) -> Result<HttpResponse, ApiError> {
    let users = state.credentials.list_users().await.map_err(|e| {
        error!(error = %e, "Failed to list users");
        ApiError::from(e)
    })?;

    info!(count = users.len(), "Users listed");
    let result: Vec<UserView> = users.into_iter().map(UserView::from).collect();
    Ok(HttpResponse::Ok().json(ResultResponse { result }))
}
