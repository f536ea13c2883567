//! 基础设施资源管理
//!
//! 启动时建立 PostgreSQL / Redis 连接并构建令牌服务，请求路径上共享使用

use std::sync::Arc;

use redis::aio::ConnectionManager;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;
use warden_adapter_postgres::{Migration, MigrationManager, PostgresConfig, create_pool};
use warden_adapter_redis::{RedisCache, create_connection_manager};
use warden_auth_core::TokenService;
use warden_common::{RetryConfig, with_retry};
use warden_config::AppConfig;
use warden_errors::{AppError, AppResult};
use warden_telemetry::HealthStatus;

/// 基础设施资源容器
pub struct Infrastructure {
    config: AppConfig,
    postgres_pool: PgPool,
    redis_conn: ConnectionManager,
    token_service: Arc<TokenService>,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（连接失败时指数退避重试）
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        Self::from_config_with_retry(config, RetryConfig::default()).await
    }

    pub async fn from_config_with_retry(
        config: AppConfig,
        retry_config: RetryConfig,
    ) -> AppResult<Self> {
        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections);
        let postgres_pool = with_retry(&retry_config, "PostgreSQL connection", || {
            let cfg = pg_config.clone();
            async move { create_pool(&cfg).await }
        })
        .await?;
        info!(
            max_connections = config.database.max_connections,
            "PostgreSQL connection pool created"
        );

        let redis_url = config.redis.url.clone();
        let redis_conn = with_retry(&retry_config, "Redis connection", || {
            let url = redis_url.expose_secret().clone();
            async move { create_connection_manager(&url).await }
        })
        .await?;
        info!("Redis connection created");

        let access_ttl = i64::try_from(config.jwt.expires_in).map_err(|_| {
            AppError::internal(format!(
                "jwt.expires_in out of range: {}",
                config.jwt.expires_in
            ))
        })?;
        let token_service = Arc::new(TokenService::new(
            config.jwt.secret.expose_secret(),
            access_ttl,
            config.jwt.issuer.clone(),
        ));

        Ok(Self {
            config,
            postgres_pool,
            redis_conn,
            token_service,
        })
    }

    /// 应用服务自带的迁移
    pub async fn run_migrations(&self, migrations: &[Migration]) -> AppResult<()> {
        let applied = MigrationManager::new(self.postgres_pool.clone())
            .migrate(migrations)
            .await?;
        info!(applied = applied.len(), "Database migrations up to date");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    /// 获取 Redis 缓存（实现 CachePort）
    pub fn redis_cache(&self) -> RedisCache {
        RedisCache::new(self.redis_conn.clone())
    }

    pub fn token_service(&self) -> Arc<TokenService> {
        self.token_service.clone()
    }

    /// 检查 PostgreSQL 与 Redis 是否可用
    pub async fn health(&self) -> HealthStatus {
        let mut status = HealthStatus::new();

        match warden_adapter_postgres::check_connection(&self.postgres_pool).await {
            Ok(()) => status.add_check("postgres", true, None),
            Err(e) => status.add_check("postgres", false, Some(e.to_string())),
        }

        let mut conn = self.redis_conn.clone();
        match warden_adapter_redis::check_connection(&mut conn).await {
            Ok(()) => status.add_check("redis", true, None),
            Err(e) => status.add_check("redis", false, Some(e.to_string())),
        }

        status
    }
}
