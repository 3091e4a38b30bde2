use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::drafts::{load_fresh, Draft};
use crate::errors::AppError;
use crate::resume::ResumeForm;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SaveDraftRequest {
    pub form: ResumeForm,
}

/// PUT /api/v1/drafts/:session_id
pub async fn handle_save_draft(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SaveDraftRequest>,
) -> Result<Json<Draft>, AppError> {
    let draft = Draft {
        form: req.form,
        saved_at: Utc::now(),
    };
    state.drafts.save(session_id, &draft).await?;
    Ok(Json(draft))
}

/// GET /api/v1/drafts/:session_id
pub async fn handle_get_draft(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Draft>, AppError> {
    load_fresh(
        state.drafts.as_ref(),
        session_id,
        state.config.draft_ttl(),
        Utc::now(),
    )
    .await?
    .map(Json)
    .ok_or_else(|| AppError::NotFound(format!("No saved draft for session {session_id}")))
}

/// DELETE /api/v1/drafts/:session_id
pub async fn handle_clear_draft(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.drafts.clear(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
