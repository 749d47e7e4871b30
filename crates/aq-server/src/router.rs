//! Axum router construction.
//!
//! Builds the application router with the usage routes, the admin routes
//! behind the API-key guard, and the shared middleware stack.

use axum::middleware;
use axum::routing::{delete, get};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::context::AppContext;
use crate::middleware::admin::admin_middleware;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::usage::usage_summary,
        routes::usage::usage_status,
        routes::usage::consume_usage,
        routes::usage::usage_stats,
        routes::admin::reset_usage,
    ),
    components(schemas(
        routes::usage::UsageStatusResponse,
        routes::usage::UsageSummaryResponse,
        routes::usage::ConsumeResponse,
        routes::usage::DailyUsageEntry,
        routes::usage::UsageStatsResponse,
        routes::admin::ResetResponse,
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_routes = Router::new()
        .route(
            "/admin/users/{user_id}/usage",
            delete(routes::admin::reset_usage),
        )
        .route_layer(middleware::from_fn_with_state(
            ctx.clone(),
            admin_middleware,
        ));

    let api_routes = Router::new()
        .route("/users/{user_id}/usage", get(routes::usage::usage_summary))
        .route(
            "/users/{user_id}/usage/{feature}",
            get(routes::usage::usage_status).post(routes::usage::consume_usage),
        )
        .route(
            "/users/{user_id}/usage/{feature}/stats",
            get(routes::usage::usage_stats),
        )
        .route("/openapi.json", get(openapi_json))
        .merge(admin_routes);

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ctx)
}
