mod config;
mod drafts;
mod errors;
mod export;
mod photos;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, S3Config};
use crate::drafts::{DraftStore, MemoryDraftStore, RedisDraftStore};
use crate::photos::{MemoryPhotoStore, PhotoStore, S3PhotoStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
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

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    let drafts: Arc<dyn DraftStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).context("Invalid REDIS_URL")?;
            info!("Draft store: Redis");
            Arc::new(RedisDraftStore::new(client, config.draft_ttl()))
        }
        None => {
            warn!("REDIS_URL not set; drafts are kept in memory");
            Arc::new(MemoryDraftStore::new(config.draft_ttl()))
        }
    };

    let photos: Arc<dyn PhotoStore> = match &config.s3 {
        Some(s3) => {
            let client = build_s3_client(s3).await;
            info!("Photo store: S3 bucket '{}'", s3.bucket);
            Arc::new(S3PhotoStore::new(client, s3.bucket.clone()))
        }
        None => {
            warn!("S3 not configured; photos are kept in memory");
            Arc::new(MemoryPhotoStore::default())
        }
    };

    info!(
        "Export defaults: page {:?}, raster scale {}, background {}",
        config.default_page_size, config.raster_scale, config.raster_background
    );

    let state = AppState::new(config.clone(), drafts, photos);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(s3: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &s3.access_key_id,
        &s3.secret_access_key,
        None,
        None,
        "resume-api-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&s3.endpoint)
        .load()
        .await;

    let s3_client_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(s3_client_config)
}
