//! HTTP front end: the trip form, the result page and a small JSON API

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Form, Router,
    extract::State,
    response::Html,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::planner::{self, TripForm, TripPlanner};

pub mod api;
pub mod page;

use page::Banner;

/// Router with the page routes at `/` and the JSON API under `/api`
pub fn router(planner: Arc<TripPlanner>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/plan", post(plan))
        .nest("/api", api::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(planner)
}

pub async fn run(config: &ServerConfig, planner: Arc<TripPlanner>) -> Result<()> {
    let app = router(planner);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Web server running at http://localhost:{}", config.port);
    axum::serve(listener, app)
        .await
        .with_context(|| "Web server terminated unexpectedly")?;
    Ok(())
}

async fn index() -> Html<String> {
    let form = TripForm::with_defaults(planner::today());
    Html(page::render(&form, None, None))
}

async fn plan(State(planner): State<Arc<TripPlanner>>, Form(form): Form<TripForm>) -> Html<String> {
    let request = match form.clone().into_request(planner::today()) {
        Ok(request) => request,
        Err(e) => {
            let banner = Banner::Error(e.user_message());
            return Html(page::render(&form, Some(&banner), None));
        }
    };

    match planner.submit(request).await {
        Ok(plan) => {
            let banner = page::dispatch_banner(&plan);
            Html(page::render(&TripForm::from(&plan.request), Some(&banner), Some(&plan)))
        }
        Err(e) => {
            warn!("Submission failed: {}", e);
            let banner = Banner::Error(e.user_message());
            Html(page::render(&form, Some(&banner), None))
        }
    }
}
