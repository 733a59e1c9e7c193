pub mod handlers;
pub mod response;

use crate::adapters::{Catalog, LocalAssetStore};
use crate::core::tryon::TryOnEngine;
use crate::core::ImageModel;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TryOnEngine<LocalAssetStore>>,
    pub store: LocalAssetStore,
    pub catalog: Catalog,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        store: LocalAssetStore,
        model: Arc<dyn ImageModel>,
        catalog: Catalog,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            engine: Arc::new(TryOnEngine::new(store.clone(), model)),
            store,
            catalog,
            max_upload_bytes,
        }
    }
}

// multipart framing on top of the file itself
const UPLOAD_BODY_SLACK: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes.saturating_add(UPLOAD_BODY_SLACK);

    Router::new()
        .route("/healthz", get(handlers::healthz_handler))
        .route("/api/tryon", post(handlers::tryon_handler))
        .route("/api/garments", get(handlers::garments_handler))
        .route("/api/register", post(handlers::register_handler))
        .route(
            "/api/upload",
            post(handlers::upload_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
