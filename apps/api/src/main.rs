mod config;
mod db;
mod errors;
mod models;
mod routes;
mod services;
mod state;
mod store;
mod vendor;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::services::chat::ChatFacade;
use crate::services::image::ImageFacade;
use crate::services::ppt::DocumentGenerationFacade;
use crate::services::registry::CapabilityRegistry;
use crate::services::resume::ResumeFacade;
use crate::state::AppState;
use crate::vendor::direct::DirectClient;
use crate::vendor::job::JobClient;
use crate::vendor::polling::PollingEngine;
use crate::vendor::{HttpTransport, VendorTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting assistant API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite
    let db = create_pool(&config.database_url).await?;

    // Vendor facades share one HTTP client
    let transport: Arc<dyn VendorTransport> =
        Arc::new(HttpTransport::new(config.http_timeout).context("Failed to build HTTP client")?);
    let ppt = build_ppt(&config, transport.clone())?;
    let registry = build_registry(&config, transport, ppt.clone())?;
    info!(
        "Vendor facades initialized (poll every {}s, timeout {}s)",
        config.poll.interval.as_secs(),
        config.poll.timeout.as_secs()
    );

    let state = AppState {
        db,
        registry: Arc::new(registry),
        ppt,
        admin_token: config.admin_token.as_deref().map(Arc::from),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_ppt(
    config: &Config,
    transport: Arc<dyn VendorTransport>,
) -> Result<Arc<DocumentGenerationFacade>> {
    let jobs = JobClient::new(transport, config.ppt_vendor.clone(), &config.ppt_api_base_url)
        .context("Invalid PPT_API_BASE_URL")?;
    Ok(Arc::new(DocumentGenerationFacade::new(
        jobs,
        PollingEngine::new(config.poll),
    )))
}

/// Wires every capability to its facade.
fn build_registry(
    config: &Config,
    transport: Arc<dyn VendorTransport>,
    ppt: Arc<DocumentGenerationFacade>,
) -> Result<CapabilityRegistry> {
    let direct = |url: &str, name: &str| {
        DirectClient::new(transport.clone(), config.vendor.clone(), url)
            .with_context(|| format!("Invalid {name}"))
    };

    let chat = ChatFacade::new(direct(&config.chat_api_url, "CHAT_API_URL")?, &config.chat_domain);
    let resume = ResumeFacade::new(direct(&config.resume_api_url, "RESUME_API_URL")?);
    let image = ImageFacade::new(direct(&config.image_api_url, "IMAGE_API_URL")?);

    Ok(CapabilityRegistry::standard(
        Arc::new(chat),
        ppt,
        Arc::new(resume),
        Arc::new(image),
    ))
}
