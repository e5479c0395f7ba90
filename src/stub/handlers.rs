//! Handlers backed by the simulated service.
//!
//! Status codes follow what `HttpOtpClient` expects from the real API: a rejected
//! code is a 401 carrying the regular verdict body, an accepted resend is a 202.

use crate::{
    otp::{mask_email, valid_email},
    service::{
        simulated::SimulatedOtpService, CredentialService, IssuanceService, LoginRequest,
        LoginResponse, ResendRequest, ResendResponse, ServiceError, VerificationService,
        VerifyRequest, VerifyResponse,
    },
    GIT_COMMIT_HASH,
};
use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub message: String,
}

/// Login body as sent on the wire.
#[derive(ToSchema, Deserialize)]
pub struct LoginBody {
    username: String,
    password: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
        .into_response()
}

fn unavailable(err: &ServiceError) -> Response {
    error!("Simulated service failed: {err}");
    error_response(StatusCode::SERVICE_UNAVAILABLE, "Service unavailable")
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Stub is up", body = Health)
    ),
    tag = "health"
)]
pub async fn health() -> impl IntoResponse {
    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&format!("{}:{}:{}", health.name, health.version, short_hash)) {
        Ok(value) => {
            headers.insert("X-App", value);
        }
        Err(err) => error!("Failed to build X-App header: {err}"),
    }

    (StatusCode::OK, headers, Json(health))
}

/// Check a one-time code.
#[utoipa::path(
    post,
    path = "/v1/otp/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Code accepted", body = VerifyResponse),
        (status = 400, description = "Malformed request", body = ErrorBody),
        (status = 401, description = "Code rejected", body = VerifyResponse),
        (status = 503, description = "Service unavailable", body = ErrorBody)
    ),
    tag = "otp"
)]
pub async fn verify(
    service: Extension<Arc<SimulatedOtpService>>,
    payload: Option<Json<VerifyRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    if !valid_email(&request.email) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid email");
    }

    match service.verify(&request).await {
        Ok(verdict) if verdict.verified => {
            info!(email = %mask_email(&request.email), "code accepted");
            (StatusCode::OK, Json(verdict)).into_response()
        }
        Ok(verdict) => {
            debug!(email = %mask_email(&request.email), "code rejected");
            (StatusCode::UNAUTHORIZED, Json(verdict)).into_response()
        }
        Err(err) => unavailable(&err),
    }
}

/// Dispatch a new code to the address.
#[utoipa::path(
    post,
    path = "/v1/otp/resend",
    request_body = ResendRequest,
    responses(
        (status = 202, description = "New code dispatched", body = ResendResponse),
        (status = 400, description = "Invalid email", body = ErrorBody),
        (status = 503, description = "Service unavailable", body = ErrorBody)
    ),
    tag = "otp"
)]
pub async fn resend(
    service: Extension<Arc<SimulatedOtpService>>,
    payload: Option<Json<ResendRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    if !valid_email(&request.email) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid email");
    }

    match service.resend(&request).await {
        Ok(ack) => (StatusCode::ACCEPTED, Json(ack)).into_response(),
        Err(err) => unavailable(&err),
    }
}

/// Check credentials and return the address to verify.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Malformed request", body = ErrorBody),
        (status = 401, description = "Credentials rejected", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn login(
    service: Extension<Arc<SimulatedOtpService>>,
    payload: Option<Json<LoginBody>>,
) -> Response {
    let Some(Json(body)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let request = LoginRequest {
        username: body.username,
        password: SecretString::from(body.password),
    };

    match service.login(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(ServiceError::Http { status, message }) => error_response(
            StatusCode::from_u16(status).unwrap_or(StatusCode::UNAUTHORIZED),
            message,
        ),
        Err(err) => unavailable(&err),
    }
}
