// src/handlers/actions.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{context::RequestContext, error::AppError, models::action::Action, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: Action,
    /// Id of the widget item the action came from.
    #[serde(default)]
    pub sender_id: Option<String>,
}

/// Dispatches a widget action.
///
/// Always answers 200 once the thread exists; actions that cannot be applied
/// come back as `{"outcome": "ignored"}`.
pub async fn handle_action(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(payload): Json<ActionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let thread = state.threads.load_thread(&ctx, &id).await?;
    let outcome = state
        .engine
        .handle_action(&ctx, &thread, &payload.action, payload.sender_id.as_deref())
        .await;
    Ok(Json(outcome))
}
