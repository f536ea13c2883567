//! 内嵌迁移

use warden_adapter_postgres::Migration;

pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "create_users",
            include_str!("migrations/0001_create_users.sql"),
        ),
        Migration::new(
            2,
            "create_admin_grants",
            include_str!("migrations/0002_create_admin_grants.sql"),
        ),
        Migration::new(
            3,
            "keep_grant_history",
            include_str!("migrations/0003_keep_grant_history.sql"),
        ),
    ]
}
