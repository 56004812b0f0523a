use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::routes::guard::Admin;
use crate::state::AppState;
use crate::store::chats;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub user_id: i64,
    pub limit: Option<i64>,
}

/// GET /api/v1/chat_history
pub async fn handle_get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Value>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    let history = chats::fetch_history(&state.db, params.user_id, limit).await?;
    Ok(Json(json!({ "history": history })))
}

/// DELETE /api/v1/chat_history
pub async fn handle_delete_history(
    _admin: Admin,
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Value>, AppError> {
    let deleted = chats::delete_chat_by_user(&state.db, params.user_id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}
