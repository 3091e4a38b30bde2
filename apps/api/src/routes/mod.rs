pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::drafts::handlers as drafts;
use crate::export::handlers as export;
use crate::photos::handlers as photos;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume form
        .route("/api/v1/resume/blank", get(resume::handle_blank_form))
        .route("/api/v1/resume/education", post(resume::handle_add_education))
        .route("/api/v1/resume/validate", post(resume::handle_validate))
        .route("/api/v1/resume/progress", post(resume::handle_progress))
        .route("/api/v1/resume/preview", post(resume::handle_preview))
        .route("/api/v1/skills", post(resume::handle_skills))
        // Drafts
        .route(
            "/api/v1/drafts/:session_id",
            put(drafts::handle_save_draft)
                .get(drafts::handle_get_draft)
                .delete(drafts::handle_clear_draft),
        )
        // Photos
        .route("/api/v1/photos", post(photos::handle_upload_photo))
        .route("/api/v1/photos/:id", get(photos::handle_get_photo))
        // Export
        .route("/api/v1/export", post(export::handle_export))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
