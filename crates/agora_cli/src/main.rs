use agora_chat::ChatOrchestrator;
use agora_core::AgoraConfig;
use agora_gateway::GatewayServer;
use agora_mcp::{ConnectionManager, McpConnector};
use agora_store::SqliteInteractionLog;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "agora.toml")]
    config: String,

    /// Path to the interaction log database (overrides config)
    #[arg(long, env = "AGORA_DB")]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = AgoraConfig::load_or_default(&args.config);

    let db_path = args.db.unwrap_or_else(|| config.storage.db_path.clone());
    info!("Opening interaction log at {}", db_path);
    let log = Arc::new(SqliteInteractionLog::new(&db_path).await?);

    let manager = Arc::new(ConnectionManager::new(
        config.mcp.server_path.clone(),
        Arc::new(McpConnector),
    ));
    let orchestrator = Arc::new(ChatOrchestrator::new(manager.clone(), log));

    let server = GatewayServer::new(
        orchestrator,
        manager,
        &config.server.host,
        config.server.port,
        &config.server.api_mount,
    );
    let handle = server.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    handle.abort();
    Ok(())
}
