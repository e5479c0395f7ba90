use super::handlers::{self, ErrorBody, Health, LoginBody};
use crate::service::{LoginResponse, ResendRequest, ResendResponse, VerifyRequest, VerifyResponse};
use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::verify, handlers::resend, handlers::login),
    components(schemas(
        Health,
        ErrorBody,
        LoginBody,
        LoginResponse,
        ResendRequest,
        ResendResponse,
        VerifyRequest,
        VerifyResponse
    )),
    tags(
        (name = "otp", description = "One-time code verification"),
        (name = "auth", description = "Credential check"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Document with the package metadata as `info`.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = Some(env!("CARGO_PKG_DESCRIPTION").to_string());
    doc
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}
