//! Per-user feature usage route handlers.

use std::collections::BTreeMap;

use aq_core::{FeatureName, UserId};
use aq_usage::{is_unlimited, UsageStats, UsageStatus};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::AppError;

/// Longest history window served by the stats route.
pub const MAX_STATS_DAYS: u32 = 365;

// ---------------------------------------------------------------------------
// Request / response schemas
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsParams {
    /// Number of reference days to report, today included.
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    7
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UsageStatusResponse {
    pub user_id: i64,
    pub feature: String,
    pub reference_date: String,
    pub used_today: i64,
    pub daily_limit: i64,
    /// Absent when the feature is unlimited.
    pub remaining: Option<i64>,
    pub can_use: bool,
}

impl UsageStatusResponse {
    fn from_status(user_id: UserId, status: UsageStatus) -> Self {
        Self {
            user_id: user_id.get(),
            feature: status.feature,
            reference_date: status.reference_date.to_string(),
            used_today: status.used_today,
            daily_limit: status.daily_limit,
            remaining: status.remaining,
            can_use: status.can_use,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UsageSummaryResponse {
    pub user_id: i64,
    pub reference_date: String,
    pub timezone: String,
    pub features: Vec<UsageStatusResponse>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ConsumeResponse {
    /// Whether the use fit within today's allowance.
    pub allowed: bool,
    /// Whether the use was stored. A tracking outage leaves this `false`
    /// while still allowing the use.
    pub recorded: bool,
    pub status: UsageStatusResponse,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DailyUsageEntry {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UsageStatsResponse {
    pub user_id: i64,
    pub feature: String,
    pub days: u32,
    pub daily: Vec<DailyUsageEntry>,
    pub total: i64,
}

impl UsageStatsResponse {
    fn from_stats(user_id: UserId, stats: UsageStats) -> Self {
        Self {
            user_id: user_id.get(),
            feature: stats.feature,
            days: stats.days,
            daily: stats
                .daily
                .into_iter()
                .map(|d| DailyUsageEntry {
                    date: d.date.to_string(),
                    count: d.count,
                })
                .collect(),
            total: stats.total,
        }
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// GET /api/users/:user_id/usage
///
/// Today's usage for every configured feature plus any other feature the
/// user touched today.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/usage",
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Today's usage per feature", body = UsageSummaryResponse)
    )
)]
pub async fn usage_summary(
    State(ctx): State<AppContext>,
    Path(user_id): Path<i64>,
) -> Json<UsageSummaryResponse> {
    let user_id = UserId::new(user_id);
    let reference_date = ctx.tracker.current_reference_date();

    let mut counts: BTreeMap<String, i64> = ctx
        .config
        .usage
        .features
        .keys()
        .map(|name| (name.clone(), 0))
        .collect();
    for fc in ctx.tracker.usage_summary(user_id) {
        counts.insert(fc.feature, fc.count);
    }

    let features = counts
        .into_iter()
        .map(|(feature, used_today)| {
            let daily_limit = ctx.limit_for(&feature);
            let unlimited = is_unlimited(daily_limit);
            UsageStatusResponse {
                user_id: user_id.get(),
                reference_date: reference_date.to_string(),
                used_today,
                daily_limit,
                remaining: (!unlimited).then(|| daily_limit.saturating_sub(used_today).max(0)),
                can_use: unlimited || used_today < daily_limit,
                feature,
            }
        })
        .collect();

    Json(UsageSummaryResponse {
        user_id: user_id.get(),
        reference_date: reference_date.to_string(),
        timezone: ctx.tracker.clock().zone().name().to_string(),
        features,
    })
}

/// GET /api/users/:user_id/usage/:feature
///
/// Current standing of one feature against its daily limit.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/usage/{feature}",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("feature" = String, Path, description = "Feature key"),
    ),
    responses(
        (status = 200, description = "Usage status", body = UsageStatusResponse),
        (status = 400, description = "Invalid feature name")
    )
)]
pub async fn usage_status(
    State(ctx): State<AppContext>,
    Path((user_id, feature)): Path<(i64, String)>,
) -> Result<Json<UsageStatusResponse>, AppError> {
    let user_id = UserId::new(user_id);
    let feature = FeatureName::new(feature)?;
    let status = ctx
        .tracker
        .status(user_id, feature.as_str(), ctx.limit_for(feature.as_str()));
    Ok(Json(UsageStatusResponse::from_status(user_id, status)))
}

/// POST /api/users/:user_id/usage/:feature
///
/// Consume one use: 429 once today's allowance is spent, otherwise record
/// the use and return the updated standing.
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/usage/{feature}",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("feature" = String, Path, description = "Feature key"),
    ),
    responses(
        (status = 200, description = "Use allowed", body = ConsumeResponse),
        (status = 429, description = "Daily limit reached", body = ConsumeResponse),
        (status = 400, description = "Invalid feature name")
    )
)]
pub async fn consume_usage(
    State(ctx): State<AppContext>,
    Path((user_id, feature)): Path<(i64, String)>,
) -> Result<(StatusCode, Json<ConsumeResponse>), AppError> {
    let user_id = UserId::new(user_id);
    let feature = FeatureName::new(feature)?;
    let daily_limit = ctx.limit_for(feature.as_str());

    if !ctx.tracker.can_use(user_id, feature.as_str(), daily_limit) {
        tracing::info!(%user_id, %feature, daily_limit, "Daily limit reached");
        let status = ctx.tracker.status(user_id, feature.as_str(), daily_limit);
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            Json(ConsumeResponse {
                allowed: false,
                recorded: false,
                status: UsageStatusResponse::from_status(user_id, status),
            }),
        ));
    }

    let recorded = ctx.tracker.record_usage(user_id, feature.as_str());
    let status = ctx.tracker.status(user_id, feature.as_str(), daily_limit);
    Ok((
        StatusCode::OK,
        Json(ConsumeResponse {
            allowed: true,
            recorded,
            status: UsageStatusResponse::from_status(user_id, status),
        }),
    ))
}

/// GET /api/users/:user_id/usage/:feature/stats
///
/// Usage history for the last `days` reference days, newest first.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/usage/{feature}/stats",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("feature" = String, Path, description = "Feature key"),
        StatsParams,
    ),
    responses(
        (status = 200, description = "Usage history", body = UsageStatsResponse),
        (status = 400, description = "Invalid feature name or day count")
    )
)]
pub async fn usage_stats(
    State(ctx): State<AppContext>,
    Path((user_id, feature)): Path<(i64, String)>,
    Query(params): Query<StatsParams>,
) -> Result<Json<UsageStatsResponse>, AppError> {
    let user_id = UserId::new(user_id);
    let feature = FeatureName::new(feature)?;
    if params.days == 0 || params.days > MAX_STATS_DAYS {
        return Err(aq_core::Error::Validation(format!(
            "days must be between 1 and {MAX_STATS_DAYS}"
        ))
        .into());
    }

    let stats = ctx.tracker.usage_stats(user_id, feature.as_str(), params.days);
    Ok(Json(UsageStatsResponse::from_stats(user_id, stats)))
}
