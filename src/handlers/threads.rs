// src/handlers/threads.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    context::RequestContext,
    error::AppError,
    models::thread::{CreateThreadRequest, PageQuery, ThreadMetadata, UserMessageRequest, generate_id},
    state::AppState,
};

/// Lists the caller's threads, oldest first unless `order=desc`.
pub async fn list_threads(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.threads.load_threads(&ctx, &query).await?;
    Ok(Json(page))
}

pub async fn create_thread(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<CreateThreadRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut thread = ThreadMetadata::new(generate_id("thr"));
    thread.title = payload.title.filter(|t| !t.trim().is_empty());

    state.threads.save_thread(&ctx, &thread).await?;
    tracing::info!("Created thread {} for {}", thread.id, ctx.partition());

    Ok((StatusCode::CREATED, Json(thread)))
}

pub async fn get_thread(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let thread = state.threads.load_thread(&ctx, &id).await?;
    Ok(Json(thread))
}

pub async fn delete_thread(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.threads.load_thread(&ctx, &id).await?;
    state.threads.delete_thread(&ctx, &id).await?;
    tracing::info!("Deleted thread {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Visible items of a thread. Hidden context is dropped after paging, so a
/// page may hold fewer than `limit` items.
pub async fn list_items(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.threads.load_thread(&ctx, &id).await?;
    let mut page = state.threads.load_thread_items(&ctx, &id, &query).await?;
    page.data.retain(|item| !item.is_hidden());
    Ok(Json(page))
}

/// Records a user message and returns it along with the assistant's reply items.
pub async fn post_message(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(payload): Json<UserMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.text.trim().is_empty() && payload.attachments.is_empty() {
        return Err(AppError::BadRequest("Message must have text or attachments".to_string()));
    }

    let thread = state.threads.load_thread(&ctx, &id).await?;
    let items = state.assistant.respond_to(&ctx, thread, payload).await?;
    Ok(Json(items))
}
