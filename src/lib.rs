pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ServerConfig;

pub use adapters::{Catalog, GeminiClient, LocalAssetStore};
pub use core::tryon::TryOnEngine;
pub use http::{build_router, AppState};
pub use utils::error::{Result, TryOnError};
