use axum::{
    extract::{Query, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::services::ppt::{DocumentSource, OutlineOptions, PptOptions, TemplateQuery};
use crate::services::Artifact;
use crate::state::AppState;
use crate::store::{chats, users};

#[derive(Deserialize)]
pub struct ProcessTextRequest {
    pub user_id: i64,
    pub text: String,
    /// Capability function code; absent means plain chat.
    pub function: Option<i64>,
}

#[derive(Serialize)]
pub struct ProcessTextResponse {
    pub result: String,
    pub capability: &'static str,
    pub artifact: Artifact,
}

fn require_text(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    Ok(())
}

/// POST /api/v1/process_text
pub async fn handle_process_text(
    State(state): State<AppState>,
    Json(req): Json<ProcessTextRequest>,
) -> Result<Json<ProcessTextResponse>, AppError> {
    require_text(&req.text)?;
    // Resolve before the user lookup so an unknown code never costs a query.
    state.registry.resolve(req.function)?;
    if users::find_user(&state.db, req.user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", req.user_id)));
    }

    let (capability, artifact) = state.registry.dispatch(req.function, &req.text).await?;
    chats::save_chat(
        &state.db,
        req.user_id,
        &req.text,
        artifact.as_str(),
        capability.name(),
    )
    .await?;
    info!("Served {} for user {}", capability.name(), req.user_id);

    Ok(Json(ProcessTextResponse {
        result: artifact.as_str().to_string(),
        capability: capability.name(),
        artifact,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Deck generation extras
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct OutlineRequest {
    pub text: String,
    #[serde(flatten)]
    pub options: OutlineOptions,
}

/// POST /api/v1/ppt/outline
pub async fn handle_create_outline(
    State(state): State<AppState>,
    Json(req): Json<OutlineRequest>,
) -> Result<Json<Value>, AppError> {
    require_text(&req.text)?;
    let outline = state.ppt.create_outline(&req.text, &req.options).await?;
    Ok(Json(outline))
}

#[derive(Deserialize)]
pub struct OutlineByDocRequest {
    #[serde(default)]
    pub text: String,
    pub file_name: String,
    /// Link to a document the vendor fetches itself.
    pub file_url: Option<String>,
    /// Document content, base64-encoded, forwarded as a multipart upload.
    pub file_base64: Option<String>,
    #[serde(flatten)]
    pub options: OutlineOptions,
}

impl OutlineByDocRequest {
    fn document(self) -> Result<(String, DocumentSource, OutlineOptions), AppError> {
        if self.file_name.trim().is_empty() {
            return Err(AppError::Validation("file_name is required".to_string()));
        }
        let document = match (self.file_url, self.file_base64) {
            (Some(url), None) if !url.trim().is_empty() => DocumentSource::Remote {
                file_name: self.file_name,
                url,
            },
            (None, Some(encoded)) => {
                let bytes = STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| AppError::Validation(format!("file_base64 is not valid base64: {e}")))?;
                if bytes.is_empty() {
                    return Err(AppError::Validation("document is empty".to_string()));
                }
                DocumentSource::Upload {
                    file_name: self.file_name,
                    bytes: Bytes::from(bytes),
                }
            }
            _ => {
                return Err(AppError::Validation(
                    "exactly one of file_url or file_base64 is required".to_string(),
                ))
            }
        };
        Ok((self.text, document, self.options))
    }
}

/// POST /api/v1/ppt/outline_by_doc
pub async fn handle_create_outline_by_doc(
    State(state): State<AppState>,
    Json(req): Json<OutlineByDocRequest>,
) -> Result<Json<Value>, AppError> {
    let (text, document, options) = req.document()?;
    let outline = state
        .ppt
        .create_outline_by_doc(&text, document, &options)
        .await?;
    Ok(Json(outline))
}

#[derive(Deserialize)]
pub struct FromOutlineRequest {
    pub text: String,
    pub outline: Value,
    #[serde(default)]
    pub options: PptOptions,
}

/// POST /api/v1/ppt/from_outline
pub async fn handle_generate_from_outline(
    State(state): State<AppState>,
    Json(req): Json<FromOutlineRequest>,
) -> Result<Json<Value>, AppError> {
    if !req.outline.is_object() {
        return Err(AppError::Validation("outline must be an object".to_string()));
    }
    let artifact = state
        .ppt
        .generate_from_outline(&req.text, &req.outline, &req.options)
        .await?;
    Ok(Json(json!({ "result": artifact.as_str() })))
}

/// GET /api/v1/ppt/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.ppt.list_templates(&query).await?))
}
