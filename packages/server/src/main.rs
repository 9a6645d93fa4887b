use std::sync::Arc;

use tracing::{Level, info};

use server::config::AppConfig;
use server::database::init_db;
use server::reset::ResetCodeStore;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;
    let db = init_db(&config.database).await?;

    let reset_codes = Arc::new(ResetCodeStore::new(config.auth.reset_code_ttl_minutes));
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        config,
        reset_codes,
    };

    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
