use std::sync::Arc;

use org_hierarchy::config::Config;
use org_hierarchy::db::{create_pool, PgSubtreeRetriever};
use org_hierarchy::routes::{router, AppState};
use org_hierarchy::services::{HierarchyService, TreeAssembler};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "org_hierarchy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (.env is optional)
    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: DATABASE_URL: {}", e))?;

    tracing::info!("Starting org-hierarchy server...");

    let pool = create_pool(&config)?;
    tracing::info!(
        "Database pool ready: max_connections={}, active_status={}",
        config.db_max_connections,
        config.active_status
    );

    let retriever = PgSubtreeRetriever::new(pool, config.retriever_config());
    let hierarchy = HierarchyService::new(Arc::new(retriever), TreeAssembler::new(config.max_depth));
    let app = router(AppState { hierarchy });

    let listener = tokio::net::TcpListener::bind(config.server_addr()).await?;
    tracing::info!("Listening on {}", config.server_addr());
    axum::serve(listener, app).await?;

    Ok(())
}
