use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use virtual_tryon::utils::{logger, validation::Validate};
use virtual_tryon::{build_router, AppState, Catalog, CliConfig, GeminiClient, LocalAssetStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.server.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting virtual-tryon server");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let model = GeminiClient::new(config.gemini_settings()?)?;
    let store = LocalAssetStore::new(&config.assets.root, config.assets.max_image_bytes as u64);
    let catalog = Catalog::connect(&config.database.url)
        .await
        .with_context(|| format!("failed to open catalog database {}", config.database.url))?;

    tracing::info!("📁 Serving assets from {}", store.root().display());
    tracing::info!(
        "🤖 Image model {} (timeout {}s)",
        config.model.model,
        config.model.timeout_seconds
    );

    let state = AppState::new(
        store,
        Arc::new(model),
        catalog,
        config.server.max_upload_bytes,
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!("📡 Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("✅ Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
