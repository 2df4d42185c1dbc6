use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::json;

use explorer_relay::api::{self, AppState};
use explorer_relay::cli::{Cli, Commands};
use explorer_relay::config::Config;
use explorer_relay::indexer::types::LatestHeightData;
use explorer_relay::indexer::{queries, HttpIndexer, IndexerClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    let transport = HttpIndexer::new(config.indexer_url.clone(), config.upstream_timeout())
        .context("failed to build indexer client")?;
    let indexer = IndexerClient::new(Arc::new(transport), config.upstream_timeout());

    match cli.command {
        Commands::Serve { addr } => {
            let bind = addr.unwrap_or_else(|| config.http_bind_addr.clone());
            tracing::info!(indexer = %config.indexer_url, "starting relay");
            let state = AppState {
                indexer,
                settings: config.relay_settings(),
            };
            api::run_http_server(&bind, state).await?;
        }
        Commands::Ping => {
            let height: LatestHeightData = indexer
                .query(&queries::LATEST_HEIGHT, json!({}))
                .await
                .with_context(|| format!("indexer at {} did not answer", config.indexer_url))?;
            println!("latest block: {}", height.latest_height);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
