// Router assembly for the summary API
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    cost_data, ec2_action, ec2_summary, health_check, iam_summary, s3_summary,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/cost-data", get(cost_data))
        .route("/api/ec2-summary", get(ec2_summary))
        .route("/api/s3-summary", get(s3_summary))
        .route("/api/iam-summary", get(iam_summary))
        .route("/api/ec2-action", post(ec2_action))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
