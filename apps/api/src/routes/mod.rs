pub mod accounts;
pub mod assistant;
pub mod guard;
pub mod health;
pub mod history;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Capabilities
        .route(
            "/api/v1/process_text",
            post(assistant::handle_process_text),
        )
        .route("/api/v1/ppt/outline", post(assistant::handle_create_outline))
        .route(
            "/api/v1/ppt/outline_by_doc",
            post(assistant::handle_create_outline_by_doc),
        )
        .route(
            "/api/v1/ppt/from_outline",
            post(assistant::handle_generate_from_outline),
        )
        .route("/api/v1/ppt/templates", get(assistant::handle_list_templates))
        // Accounts
        .route("/api/v1/register", post(accounts::handle_register))
        .route("/api/v1/login", post(accounts::handle_login))
        .route(
            "/api/v1/admin/users",
            get(accounts::handle_list_users).delete(accounts::handle_delete_users),
        )
        // History
        .route(
            "/api/v1/chat_history",
            get(history::handle_get_history).delete(history::handle_delete_history),
        )
        .with_state(state)
}
