//! PostgreSQL 用户 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use warden_adapter_postgres::map_sqlx_error;
use warden_common::UserId;
use warden_errors::{AppError, AppResult};

use crate::domain::repositories::UserRepository;
use crate::domain::user::{NewUser, User};
use crate::domain::value_objects::{Email, HashedPassword};

/// 有效管理员标志：建号时的自举标志或存在授权记录
const SELECT_USER: &str = r#"
    SELECT u.id, u.email, u.display_name, u.password_hash,
           (u.is_admin OR EXISTS (SELECT 1 FROM admin_grants g WHERE g.user_id = u.id)) AS is_admin,
           u.created_at
    FROM users u
"#;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.id = $1", SELECT_USER))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to find user: {}", e)))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.email = $1", SELECT_USER))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to find user: {}", e)))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn create(&self, new_user: &NewUser, claim_admin: bool) -> AppResult<User> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        let mut row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, display_name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, display_name, password_hash, is_admin, created_at
            "#,
        )
        .bind(new_user.email.as_str())
        .bind(&new_user.display_name)
        .bind(new_user.password_hash.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if claim_admin {
            // 唯一索引保证只有一个事务能写入自举授权，其余插入为空操作
            let claimed: Option<i64> = sqlx::query_scalar(
                r#"
                INSERT INTO admin_grants (user_id, is_bootstrap)
                VALUES ($1, TRUE)
                ON CONFLICT DO NOTHING
                RETURNING id
                "#,
            )
            .bind(row.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

            if claimed.is_some() {
                sqlx::query("UPDATE users SET is_admin = TRUE WHERE id = $1")
                    .bind(row.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;
                row.is_admin = true;
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit user: {}", e)))?;

        row.into_user()
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    display_name: String,
    password_hash: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AppResult<User> {
        let email = Email::new(self.email)
            .map_err(|e| AppError::internal(format!("Stored email is invalid: {}", e)))?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            display_name: self.display_name,
            password_hash: HashedPassword::from_hash(self.password_hash),
            is_admin: self.is_admin,
            created_at: self.created_at,
        })
    }
}
