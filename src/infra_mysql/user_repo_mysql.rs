use super::util::{is_dup_key, store_error};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

// Binary collations: ids and usernames match byte for byte, the same as the
// in-memory repo. The server default (`*_ai_ci`) would fold case and accents.
const CREATE_USER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    user_id VARCHAR(64) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL PRIMARY KEY,
    username VARCHAR(32) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL UNIQUE,
    created_at DATETIME(6) NOT NULL
)
"#;

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    /// Creates the `user` table when it does not exist yet.
    pub async fn migrate(&self) -> Result<(), UserError> {
        sqlx::query(CREATE_USER_TABLE)
            .execute(&self.pool)
            .await
            .map_err(store_error("create user table"))?;
        Ok(())
    }
}

fn user_from_row(row: &MySqlRow) -> Result<User, UserError> {
    let user_id: String = row
        .try_get("user_id")
        .map_err(store_error("decode user_id"))?;
    let username: String = row
        .try_get("username")
        .map_err(store_error("decode username"))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(store_error("decode created_at"))?;

    Ok(User {
        id: UserId(user_id),
        username,
        created_at,
    })
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query("SELECT user_id, username, created_at FROM user WHERE user_id = ?")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("query user by id"))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        let row = sqlx::query("SELECT user_id, username, created_at FROM user WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("query user by username"))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert(&self, user: &User) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
INSERT INTO user (user_id, username, created_at)
VALUES (?, ?, ?)
"#,
        )
        .bind(user.id.as_str())
        .bind(&user.username)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_dup_key(&e) => Err(UserError::UsernameTaken),
            Err(e) => Err(store_error("insert user")(e)),
        }
    }

    async fn count(&self) -> Result<u64, UserError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM user"#)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error("count users"))?;

        Ok(count.max(0) as u64)
    }
}
