//! bucketfs - files and folders over a flat object store
//!
//! - `store`: object store backends (S3, memory)
//! - `cache`: presigned link cache
//! - `fs`: listing, recursive aggregation and deletion engines
//! - `commands`, `server`: HTTP boundary
//! - `config`: environment configuration

pub mod cache;
pub mod commands;
pub mod config;
pub mod fs;
pub mod server;
pub mod store;

use crate::cache::LinkCache;
use crate::commands::AppState;
use crate::config::{AppConfig, StoreBackend};
use crate::fs::Explorer;
use crate::store::{MemoryStore, ObjectStore, S3Store};
use log::{info, warn};
use std::sync::Arc;

pub type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Build the object store selected by `config`.
pub async fn connect_store(config: &AppConfig) -> Arc<dyn ObjectStore> {
    match config.backend {
        StoreBackend::S3 => {
            let store = S3Store::connect(&config.s3_config()).await;
            info!("object store: s3 bucket {}", store.bucket());
            Arc::new(store)
        }
        StoreBackend::Memory => {
            warn!(
                "object store: in-memory bucket {}, contents are lost on exit",
                config.bucket
            );
            Arc::new(MemoryStore::new(config.bucket.clone()))
        }
    }
}

pub async fn run() -> AppResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let store = connect_store(&config).await;

    let links = Arc::new(LinkCache::new(config.link_cache_max_entries));
    let _sweeper = cache::spawn_sweeper(&links, config.link_cache_sweep_interval);

    let explorer = Arc::new(Explorer::new(store, links, config.link_ttl));
    let app = server::router(
        AppState::new(explorer, config.page_size),
        config.max_upload_bytes,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("bucketfs listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
