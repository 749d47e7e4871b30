//! Liveness probe.

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
