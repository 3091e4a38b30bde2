use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{export_capture, ExportError, ExportFormat, ExportedFile, PageSize};
use crate::resume::progress::compute_progress;
use crate::resume::ResumeForm;
use crate::state::AppState;

/// Parsed multipart fields of an export request.
#[derive(Debug, Default)]
struct ExportRequest {
    image: Option<Bytes>,
    format: Option<String>,
    name: Option<String>,
    page_size: Option<String>,
    session_id: Option<String>,
    form: Option<String>,
}

async fn read_export_request(mut multipart: Multipart) -> Result<ExportRequest, AppError> {
    let mut req = ExportRequest::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "image" => req.image = Some(field.bytes().await?),
            "format" => req.format = Some(field.text().await?),
            "name" => req.name = Some(field.text().await?),
            "page_size" => req.page_size = Some(field.text().await?),
            "session_id" => req.session_id = Some(field.text().await?),
            "form" => req.form = Some(field.text().await?),
            other => warn!("Ignoring unknown export field '{other}'"),
        }
    }
    Ok(req)
}

/// POST /api/v1/export
/// Multipart: `image` (captured preview), `format`, `name`, `page_size`,
/// `session_id`, `form`.
pub async fn handle_export(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let req = read_export_request(multipart).await?;

    let capture = req
        .image
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("Missing 'image' field".to_string()))?;
    let format: ExportFormat = req.format.as_deref().unwrap_or("pdf").parse()?;
    let page_size = match req.page_size.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.parse::<PageSize>().map_err(AppError::Validation)?,
        _ => state.config.default_page_size,
    };
    let session_id = match req.session_id.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Some(
            Uuid::parse_str(s)
                .map_err(|e| AppError::Validation(format!("Invalid session_id: {e}")))?,
        ),
        _ => None,
    };

    let mut name = req.name.unwrap_or_default();
    if let Some(form_json) = req.form {
        let form: ResumeForm = serde_json::from_str(&form_json)
            .map_err(|e| AppError::Validation(format!("Invalid form JSON: {e}")))?;
        let progress = compute_progress(&form);
        if !progress.can_download {
            return Err(AppError::UnprocessableEntity(format!(
                "Please complete all required fields before downloading ({}% complete)",
                progress.percentage
            )));
        }
        if name.trim().is_empty() {
            name = form.name.clone();
        }
    }

    let rasterizer = state.rasterizer.clone();
    let options = state.raster.clone();
    let now = Utc::now();
    let file: ExportedFile = tokio::task::spawn_blocking(move || -> Result<ExportedFile, ExportError> {
        let image = rasterizer.rasterize(&capture, &options)?;
        export_capture(&image, format, page_size, &name, now)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}")))??;

    info!(
        "Exported {} ({} page(s), {} bytes)",
        file.filename,
        file.page_count,
        file.bytes.len()
    );

    if let Some(session_id) = session_id {
        state.drafts.clear(session_id).await?;
    }

    Ok(file_response(file, format))
}

fn file_response(file: ExportedFile, format: ExportFormat) -> Response {
    let ascii_name: String = file
        .filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && *c != '"')
        .collect();
    let disposition = format!("attachment; filename=\"{ascii_name}\"");
    let mut response = (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response();

    if format == ExportFormat::Pdf {
        response
            .headers_mut()
            .insert("x-page-count", header::HeaderValue::from(file.page_count));
    }
    response
}
