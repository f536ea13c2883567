//! Redis 连接

use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use warden_errors::{AppError, AppResult};

fn unavailable(stage: &str, err: RedisError) -> AppError {
    AppError::external_service(format!("Redis {stage}: {err}"))
}

/// 打开会话存储连接
///
/// 返回的 `ConnectionManager` 断线后自动重连，clone 后可跨请求共享
pub async fn create_connection_manager(url: &str) -> AppResult<ConnectionManager> {
    let client = Client::open(url).map_err(|e| unavailable("client rejected url", e))?;
    ConnectionManager::new(client)
        .await
        .map_err(|e| unavailable("connect failed", e))
}

/// 发送 PING 并确认应答为 PONG
pub async fn check_connection(conn: &mut ConnectionManager) -> AppResult<()> {
    let reply: String = redis::cmd("PING")
        .query_async(conn)
        .await
        .map_err(|e| unavailable("ping failed", e))?;

    if reply.eq_ignore_ascii_case("PONG") {
        Ok(())
    } else {
        Err(AppError::external_service(format!(
            "Redis ping returned unexpected reply: {reply}"
        )))
    }
}
