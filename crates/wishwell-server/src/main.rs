mod api;
mod middleware;

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use wishwell_extract::{ExtractConfig, Extractor};

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::{AuthState, SessionStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = wishwell_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = wishwell_db::PoolConfig::from_app_config(&config);
    let pool = wishwell_db::connect_pool(&config.database_url, pool_config).await?;
    wishwell_db::run_migrations(&pool).await?;

    let extractor = Extractor::new(ExtractConfig::from_app_config(&config))?;
    let auth = AuthState::from_app_config(&config);
    let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));

    let app = build_app(
        AppState {
            pool,
            extractor,
            auth,
            sessions,
        },
        default_rate_limit_state(),
    );

    tracing::info!(addr = %config.bind_addr, env = %config.env, "starting server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
