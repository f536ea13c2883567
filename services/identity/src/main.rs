//! warden-identity 服务入口

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use warden_bootstrap::{Infrastructure, init_runtime, shutdown_signal};
use warden_config::AppConfig;
use warden_identity::api::http::{AppState, HealthProbe, router};
use warden_identity::application::services::AuthService;
use warden_identity::domain::repositories::{AdminGrantRepository, UserRepository};
use warden_identity::domain::services::{SessionManager, SessionPolicy};
use warden_identity::infrastructure::persistence::{
    PostgresAdminGrantRepository, PostgresUserRepository, migrations,
};
use warden_ports::CachePort;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config_dir = std::env::var("WARDEN_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let config = AppConfig::load(&config_dir).context("Failed to load configuration")?;
    init_runtime(&config);

    let metrics_handle = warden_telemetry::init_metrics()?;

    let infra = Arc::new(
        Infrastructure::from_config(config)
            .await
            .context("Failed to initialize infrastructure")?,
    );
    infra
        .run_migrations(&migrations())
        .await
        .context("Failed to run migrations")?;

    let config = infra.config();
    let pool = infra.postgres_pool();

    // 组装 Repositories 与会话存储
    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));
    let grants: Arc<dyn AdminGrantRepository> =
        Arc::new(PostgresAdminGrantRepository::new(pool));
    let cache: Arc<dyn CachePort> = Arc::new(infra.redis_cache());

    let sessions = SessionManager::new(
        cache,
        SessionPolicy::new(
            config.session.key_prefix.clone(),
            Duration::from_secs(config.jwt.refresh_expires_in),
        ),
    );
    let auth = Arc::new(AuthService::new(
        users,
        grants,
        sessions,
        infra.token_service(),
    ));

    let health: Arc<dyn HealthProbe> = infra.clone();
    let state = AppState::new(auth, health).with_metrics(metrics_handle);

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Starting warden-identity");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
