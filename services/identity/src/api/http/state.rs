//! 路由共享状态

use std::sync::Arc;

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use warden_bootstrap::Infrastructure;
use warden_telemetry::HealthStatus;

use crate::application::services::AuthService;

/// 依赖健康检查
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self) -> HealthStatus;
}

#[async_trait]
impl HealthProbe for Infrastructure {
    async fn check(&self) -> HealthStatus {
        self.health().await
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub health: Arc<dyn HealthProbe>,
    /// 未安装 Prometheus recorder 时为空，`/metrics` 返回 404
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, health: Arc<dyn HealthProbe>) -> Self {
        Self {
            auth,
            health,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
