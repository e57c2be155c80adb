// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    assistant::{AgentContext, tools::DEFAULT_QUESTION_LIMIT},
    context::RequestContext,
    error::AppError,
    models::{
        question::{CreateQuestionsRequest, QuestionsResult},
        thread::ThreadItem,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct QuestionsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ShowQuestionRequest {
    /// 0-based position in the thread's question set.
    pub index: i64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShowQuestionResponse {
    pub status: String,
    pub items: Vec<ThreadItem>,
}

/// Default bank questions, first `limit` (default 5).
pub async fn get_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let questions = state
        .bank
        .get_questions(Some(query.limit.unwrap_or(DEFAULT_QUESTION_LIMIT)));
    Ok(Json(QuestionsResult::from(questions)))
}

/// Stores a generated question set as the thread's current quiz.
pub async fn create_questions(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(payload): Json<CreateQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let thread = state.threads.load_thread(&ctx, &id).await?;
    let mut run = AgentContext::new(ctx, thread);
    let result = state.tools.create_questions(&mut run, payload).await?;
    Ok(Json(result))
}

/// Appends question `index` of the thread's quiz as a widget item.
pub async fn show_question(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(payload): Json<ShowQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let thread = state.threads.load_thread(&ctx, &id).await?;
    let mut run = AgentContext::new(ctx, thread);
    let status = state
        .tools
        .show_question(&mut run, payload.index, payload.message.as_deref())
        .await?;

    Ok(Json(ShowQuestionResponse {
        status,
        items: run.emitted,
    }))
}
