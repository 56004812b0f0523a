use std::sync::Arc;

use sqlx::SqlitePool;

use crate::services::ppt::DocumentGenerationFacade;
use crate::services::registry::CapabilityRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Function code → capability facade, built once at startup.
    pub registry: Arc<CapabilityRegistry>,
    /// Outline and template endpoints bypass the registry and talk to the
    /// deck facade directly.
    pub ppt: Arc<DocumentGenerationFacade>,
    /// Token required by the admin and delete routes; `None` disables them.
    pub admin_token: Option<Arc<str>>,
}
