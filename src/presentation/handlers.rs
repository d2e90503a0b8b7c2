// HTTP request handlers
use crate::domain::resources::{ActionRequest, Granularity, InstanceAction};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct CostQuery {
    pub granularity: Option<String>,
}

#[derive(Deserialize)]
pub struct ActionBody {
    pub action: Option<String>,
    pub instance_id: Option<String>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Cost time series; granularity defaults to DAILY
pub async fn cost_data(
    Query(query): Query<CostQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let raw = query.granularity.unwrap_or_else(|| "DAILY".to_string());

    match raw.parse::<Granularity>() {
        Ok(granularity) => Json(state.inventory_service.cost_data(granularity).await).into_response(),
        Err(e) => {
            tracing::warn!("Rejecting cost-data request: {}", e);
            error_response(StatusCode::BAD_REQUEST, "Invalid granularity")
        }
    }
}

pub async fn ec2_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.inventory_service.ec2_summary().await)
}

pub async fn s3_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.inventory_service.s3_summary().await)
}

pub async fn iam_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.inventory_service.iam_summary().await)
}

/// Start or stop one instance
pub async fn ec2_action(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ActionBody>,
) -> Response {
    let action = body.action.filter(|a| !a.is_empty());
    let instance_id = body.instance_id.filter(|id| !id.is_empty());

    let (Some(action), Some(instance_id)) = (action, instance_id) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing action or instance_id");
    };

    let Ok(action) = action.parse::<InstanceAction>() else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid action");
    };

    let response = state
        .inventory_service
        .perform_action(&ActionRequest::new(action, instance_id))
        .await;

    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response)).into_response()
}
