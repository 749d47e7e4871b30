//! Admin authentication middleware.
//!
//! Guards the `/api/admin/*` routes. When auth is disabled in config every
//! request passes; otherwise an `Authorization: Bearer <api_key>` header
//! matching `auth.api_key` is required.

use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

/// Check a raw `Authorization` header value against the auth config.
pub fn is_authorized(auth: &aq_core::config::AuthConfig, authorization: Option<&str>) -> bool {
    if !auth.enabled {
        return true;
    }
    // Enabled without a key locks the admin routes.
    let Some(ref api_key) = auth.api_key else {
        return false;
    };
    authorization
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token.trim() == api_key.as_str())
}

/// Reject admin requests without a valid API key.
pub async fn admin_middleware(
    State(ctx): State<AppContext>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if is_authorized(&ctx.config.auth, authorization) {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rejected admin request");
    let mut err = AppError::new(aq_core::Error::Unauthorized("admin API key required".into()));
    if let Some(RequestId(id)) = request.extensions().get::<RequestId>() {
        err = err.with_request_id(id.clone());
    }
    err.into_response()
}
