mod app;
mod config;
mod error;
mod extractors;
mod paging;
mod state;
mod users;

use crate::config::AppConfig;
use crate::state::AppState;

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "user_crud=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = config.listen_addr();
    tracing::info!(
        store = ?config.store,
        error_mode = ?config.error_mode,
        update_mode = ?config.update_mode,
        "configuration loaded"
    );

    let state = AppState::init(config).await?;
    let app = app::build_app(state);
    app::serve(app, &addr).await
}
