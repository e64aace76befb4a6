//! HTTP API served to the dashboard.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | POST | `/api/analyze/{draft_id}` | run an analysis |
//! | GET | `/api/drafts` | list drafts |
//! | GET | `/api/drafts/{id}/analysis` | latest counts, comments and run |
//! | GET | `/api/health` | liveness probe |

pub mod error;
pub mod handlers;

pub use error::{ApiError, ApiResult};
pub use handlers::DraftAnalysisView;

use crate::analyzer::Analyzer;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// State shared by all handlers
pub struct AppState {
    pub analyzer: Analyzer,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/drafts", get(handlers::list_drafts))
        .route("/api/drafts/{id}/analysis", get(handlers::draft_analysis))
        .route("/api/analyze/{draft_id}", post(handlers::analyze_draft))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
