use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Extractor for destructive and admin routes. Rejects the request unless the
/// `x-admin-token` header matches the configured token; with no token
/// configured every such request is rejected.
pub struct Admin;

#[async_trait]
impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let Some(expected) = state.admin_token.as_deref() else {
            warn!("Admin route called but ADMIN_TOKEN is not configured");
            return Err(AppError::Unauthorized);
        };
        let presented = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .map(|v| v.as_bytes())
            .unwrap_or_default();

        if bool::from(presented.ct_eq(expected.as_bytes())) {
            Ok(Admin)
        } else {
            Err(AppError::Unauthorized)
        }
    }
}
