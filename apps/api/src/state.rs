use std::sync::Arc;

use crate::config::Config;
use crate::drafts::DraftStore;
use crate::export::raster::{CaptureDecoder, RasterOptions, Rasterizer};
use crate::photos::PhotoStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Redis-backed when `REDIS_URL` is set, in-process otherwise.
    pub drafts: Arc<dyn DraftStore>,
    /// S3-backed when S3 is configured, in-process otherwise.
    pub photos: Arc<dyn PhotoStore>,
    pub rasterizer: Arc<dyn Rasterizer>,
    pub raster: RasterOptions,
}

impl AppState {
    pub fn new(
        config: Config,
        drafts: Arc<dyn DraftStore>,
        photos: Arc<dyn PhotoStore>,
    ) -> Self {
        let raster = RasterOptions {
            scale: config.raster_scale,
            background: config.raster_background.clone(),
        };
        Self {
            config,
            drafts,
            photos,
            rasterizer: Arc::new(CaptureDecoder),
            raster,
        }
    }

    /// State backed entirely by in-process stores.
    #[cfg(test)]
    pub(crate) fn in_memory(config: Config) -> Self {
        use crate::drafts::MemoryDraftStore;
        use crate::photos::MemoryPhotoStore;

        let drafts = Arc::new(MemoryDraftStore::new(config.draft_ttl()));
        Self::new(
            config,
            drafts,
            Arc::new(MemoryPhotoStore::default()),
        )
    }
}
