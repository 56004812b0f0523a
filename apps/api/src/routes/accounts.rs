use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::user::UserSummary;
use crate::routes::guard::Admin;
use crate::state::AppState;
use crate::store::users;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/v1/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user_id = users::create_user(&state.db, &req.username, &req.password).await?;
    Ok((StatusCode::CREATED, Json(json!({ "user_id": user_id }))))
}

/// POST /api/v1/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<Value>, AppError> {
    let user = users::authenticate_user(&state.db, &req.username, &req.password).await?;
    Ok(Json(json!({ "user": UserSummary::from(&user) })))
}

/// GET /api/v1/admin/users
pub async fn handle_list_users(
    _admin: Admin,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let users = users::list_users(&state.db).await?;
    Ok(Json(json!({ "users": users })))
}

#[derive(Deserialize)]
pub struct DeleteUsersRequest {
    pub ids: Vec<i64>,
}

/// DELETE /api/v1/admin/users
pub async fn handle_delete_users(
    _admin: Admin,
    State(state): State<AppState>,
    Json(req): Json<DeleteUsersRequest>,
) -> Result<Json<Value>, AppError> {
    if req.ids.is_empty() {
        return Err(AppError::Validation("ids must not be empty".to_string()));
    }
    let deleted = users::delete_users(&state.db, &req.ids).await?;
    Ok(Json(json!({ "deleted": deleted })))
}
