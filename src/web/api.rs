use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;

use crate::TripPlannerError;
use crate::models::TripRequest;
use crate::planner::{PlannerState, TripPlanner};

#[derive(Serialize)]
pub struct ApiHealth {
    pub status: &'static str,
    pub version: &'static str,
    pub planner: PlannerState,
}

pub fn router() -> Router<Arc<TripPlanner>> {
    Router::new()
        .route("/plan", post(create_plan))
        .route("/health", get(health))
}

async fn create_plan(
    State(planner): State<Arc<TripPlanner>>,
    Json(request): Json<TripRequest>,
) -> Response {
    match planner.submit(request).await {
        Ok(plan) => Json(plan).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn health(State(planner): State<Arc<TripPlanner>>) -> Json<ApiHealth> {
    Json(ApiHealth {
        status: "ok",
        version: crate::VERSION,
        planner: planner.state(),
    })
}

fn error_response(err: &TripPlannerError) -> Response {
    let status = match err {
        TripPlannerError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TripPlannerError::Api { .. } | TripPlannerError::Messaging { .. } => {
            StatusCode::BAD_GATEWAY
        }
        TripPlannerError::Config { .. }
        | TripPlannerError::Io { .. }
        | TripPlannerError::General { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.user_message() }))).into_response()
}
