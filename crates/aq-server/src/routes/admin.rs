//! Operator route handlers.

use aq_core::{FeatureName, UserId};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResetParams {
    /// Only reset this feature; omit to reset every feature.
    pub feature: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ResetResponse {
    pub user_id: i64,
    /// `None` when every feature was reset.
    pub feature: Option<String>,
    pub reference_date: String,
}

/// DELETE /api/admin/users/:user_id/usage
///
/// Delete today's usage records for a user. Past days are kept.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{user_id}/usage",
    params(("user_id" = i64, Path, description = "User ID"), ResetParams),
    responses(
        (status = 200, description = "Today's usage reset", body = ResetResponse),
        (status = 401, description = "Missing or wrong admin API key"),
        (status = 500, description = "Storage unavailable")
    )
)]
pub async fn reset_usage(
    State(ctx): State<AppContext>,
    Path(user_id): Path<i64>,
    Query(params): Query<ResetParams>,
) -> Result<Json<ResetResponse>, AppError> {
    let user_id = UserId::new(user_id);
    let feature = params.feature.map(FeatureName::new).transpose()?;

    if !ctx
        .tracker
        .reset_usage(user_id, feature.as_ref().map(FeatureName::as_str))
    {
        return Err(aq_core::Error::Internal("usage reset failed".into()).into());
    }

    Ok(Json(ResetResponse {
        user_id: user_id.get(),
        feature: feature.map(String::from),
        reference_date: ctx.tracker.current_reference_date().to_string(),
    }))
}
