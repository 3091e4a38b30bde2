use axum::{response::Html, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::photos::photo_url;
use crate::resume::preview::{build_resume_html, render_document};
use crate::resume::progress::{compute_progress, summary_counter, CharacterCount, Progress};
use crate::resume::skills::{SkillEvent, SkillSet};
use crate::resume::validation::{validate_form, ValidationReport};
use crate::resume::ResumeForm;

#[derive(Serialize)]
pub struct ProgressResponse {
    pub progress: Progress,
    pub summary: CharacterCount,
}

/// GET /api/v1/resume/blank
/// The starting form: empty fields and the default education rows.
pub async fn handle_blank_form() -> Json<ResumeForm> {
    Json(ResumeForm::blank())
}

/// POST /api/v1/resume/education
/// Returns the form with one more "Additional Education" row.
pub async fn handle_add_education(Json(mut form): Json<ResumeForm>) -> Json<ResumeForm> {
    form.add_education();
    Json(form)
}

/// POST /api/v1/resume/validate
pub async fn handle_validate(Json(form): Json<ResumeForm>) -> Json<ValidationReport> {
    Json(validate_form(&form))
}

/// POST /api/v1/resume/progress
pub async fn handle_progress(Json(form): Json<ResumeForm>) -> Json<ProgressResponse> {
    Json(ProgressResponse {
        progress: compute_progress(&form),
        summary: summary_counter(&form.summary),
    })
}

/// POST /api/v1/resume/preview
/// Returns the printable HTML document. Invalid forms are rejected with the
/// full validation report.
pub async fn handle_preview(Json(form): Json<ResumeForm>) -> Result<Html<String>, AppError> {
    let report = validate_form(&form);
    if !report.valid {
        return Err(AppError::UnprocessableEntity(
            serde_json::to_string(&report).unwrap_or_default(),
        ));
    }

    let photo = form.photo_id.map(photo_url);
    let sheet = build_resume_html(&form, photo.as_deref());
    let title = format!("{} - Resume", form.display_name());
    Ok(Html(render_document(&title, &sheet)))
}

#[derive(Deserialize)]
pub struct SkillsRequest {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub input: String,
    pub event: SkillEvent,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
    pub input: String,
    pub hidden_value: String,
}

/// POST /api/v1/skills
/// Applies one tag-input event and returns the new tags and input text.
pub async fn handle_skills(Json(req): Json<SkillsRequest>) -> Json<SkillsResponse> {
    Json(apply_skill_event(req))
}

fn apply_skill_event(req: SkillsRequest) -> SkillsResponse {
    let mut set = SkillSet::new(req.skills);
    let input = match req.event {
        SkillEvent::Input => set.on_input(&req.input),
        SkillEvent::Commit => set.on_commit(&req.input),
        SkillEvent::Backspace => {
            set.on_backspace(&req.input);
            req.input
        }
        SkillEvent::Remove { index } => {
            set.remove(index);
            req.input
        }
    };
    let hidden_value = set.hidden_value();
    SkillsResponse {
        skills: set.into_vec(),
        input,
        hidden_value,
    }
}
