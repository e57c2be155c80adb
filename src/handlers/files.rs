// src/handlers/files.rs

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    context::RequestContext,
    error::AppError,
    models::{attachment::Attachment, thread::generate_id},
    state::AppState,
};

/// Accepts a multipart upload with a single `file` field.
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        let attachment = Attachment {
            id: generate_id("att"),
            name,
            mime_type,
            size: bytes.len(),
            created_at: chrono::Utc::now(),
        };
        state
            .attachments
            .save_attachment(&ctx, &attachment, bytes.to_vec())
            .await?;
        tracing::info!("Stored attachment {} ({} bytes)", attachment.id, attachment.size);

        return Ok((StatusCode::CREATED, Json(attachment)));
    }

    Err(AppError::BadRequest("Missing 'file' field".to_string()))
}

pub async fn get_file(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let attachment = state.attachments.load_attachment(&ctx, &id).await?;
    Ok(Json(attachment))
}

pub async fn delete_file(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.attachments.load_attachment(&ctx, &id).await?;
    state.attachments.delete_attachment(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
