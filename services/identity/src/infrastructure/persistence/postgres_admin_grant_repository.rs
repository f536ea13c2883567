//! PostgreSQL 管理员授权 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use warden_adapter_postgres::map_sqlx_error;
use warden_common::UserId;
use warden_errors::{AppError, AppResult};

use crate::domain::repositories::AdminGrantRepository;
use crate::domain::user::AdminGrant;

pub struct PostgresAdminGrantRepository {
    pool: PgPool,
}

impl PostgresAdminGrantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminGrantRepository for PostgresAdminGrantRepository {
    async fn find_latest(&self) -> AppResult<Option<AdminGrant>> {
        let row = sqlx::query_as::<_, AdminGrantRow>(
            r#"
            SELECT id, user_id, granted_by, is_bootstrap, created_at
            FROM admin_grants
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find admin grant: {}", e)))?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, user_id: UserId, granted_by: UserId) -> AppResult<AdminGrant> {
        let row = sqlx::query_as::<_, AdminGrantRow>(
            r#"
            INSERT INTO admin_grants (user_id, granted_by)
            VALUES ($1, $2)
            RETURNING id, user_id, granted_by, is_bootstrap, created_at
            "#,
        )
        .bind(user_id.0)
        .bind(granted_by.0)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}

#[derive(sqlx::FromRow)]
struct AdminGrantRow {
    id: i64,
    user_id: Option<i64>,
    granted_by: Option<i64>,
    is_bootstrap: bool,
    created_at: DateTime<Utc>,
}

impl From<AdminGrantRow> for AdminGrant {
    fn from(row: AdminGrantRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id.map(UserId::new),
            granted_by: row.granted_by.map(UserId::new),
            is_bootstrap: row.is_bootstrap,
            created_at: row.created_at,
        }
    }
}
