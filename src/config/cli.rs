use crate::config::toml_config::ServerConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "virtual-tryon")]
#[command(about = "Virtual try-on API server")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Address to listen on, e.g. 127.0.0.1:3000")]
    pub bind: Option<String>,

    #[arg(long, help = "Public asset directory (uploads and garments)")]
    pub asset_root: Option<String>,

    #[arg(long, help = "SQLite database URL for the garment catalog")]
    pub database_url: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// File values first, then command-line overrides, then `GEMINI_API_KEY`.
    pub fn load(&self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(root) = &self.asset_root {
            config.assets.root = root.clone();
        }
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }

        config.apply_env();
        Ok(config)
    }
}
