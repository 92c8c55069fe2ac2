//! Emblem gateway - payment callbacks that mint Lupul și Corbul emblems

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emblem_gateway::{
    config::{Args, LogFormat},
    db::MongoClient,
    ledger::{EmblemLedger, MemoryLedger, MongoLedger},
    server::{self, AppState},
    services::{LogNotifier, MintNotifier, WebhookNotifier},
};

/// Units per emblem type in the dev-mode memory ledger
const DEV_STOCK: i64 = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("emblem_gateway={},info", args.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    match args.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let account = args.service_account.resolve();
    let db_name = args.database_name();

    info!("======================================");
    info!("  Emblem Gateway - Lupul și Corbul");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("Database: {}", db_name);
    info!(
        "Service account: {}",
        account
            .as_ref()
            .map(|a| a.project_id.as_str())
            .unwrap_or("none")
    );
    info!("Strict status codes: {}", args.strict_status_codes);
    info!("======================================");

    let ledger: Arc<dyn EmblemLedger> =
        match MongoClient::new(&args.mongodb_uri, &db_name, account.as_ref()).await {
            Ok(client) => {
                info!("MongoDB connected successfully");
                Arc::new(MongoLedger::new(client).await?)
            }
            Err(e) if args.dev_mode => {
                warn!(
                    "MongoDB connection failed (dev mode, using in-memory ledger): {}",
                    e
                );
                Arc::new(MemoryLedger::with_stock(DEV_STOCK))
            }
            Err(e) => {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        };

    let notifier: Arc<dyn MintNotifier> = match args.mint_notification_url {
        Some(ref url) => {
            info!("Mint notifications posted to {}", url);
            Arc::new(WebhookNotifier::new(url.clone(), args.request_timeout())?)
        }
        None => {
            info!("No MINT_NOTIFICATION_URL - mint notifications are logged only");
            Arc::new(LogNotifier)
        }
    };

    let state = AppState::new(args, ledger, notifier)?;
    server::run(Arc::new(state)).await?;

    Ok(())
}
