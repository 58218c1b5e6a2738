//! User repository

use openmusic_core::generate_id;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;

/// Public user record (never carries the password hash)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub fullname: String,
}

/// Stored credentials for login
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: String,
    pub password: String,
}

pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user. A taken username surfaces as `DbError::Conflict`.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        fullname: &str,
    ) -> Result<String, DbError> {
        let (id,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO users (id, username, password, fullname)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(generate_id("user"))
        .bind(username)
        .bind(password_hash)
        .bind(fullname)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_write(e, "user"))?;

        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<User, DbError> {
        sqlx::query_as::<_, User>("SELECT id, username, fullname FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    pub async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DbError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(credentials)
    }

    pub async fn verify(&self, id: &str) -> Result<(), DbError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        if exists {
            Ok(())
        } else {
            Err(DbError::not_found("user", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_username_is_conflict() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();
        let repo = UserRepo::new(&pool);

        let username = generate_id("dup");
        repo.create(&username, "hash", "First").await.unwrap();
        let err = repo.create(&username, "hash", "Second").await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { resource: "user", .. }));

        let creds = repo.find_credentials(&username).await.unwrap().unwrap();
        assert_eq!(creds.password, "hash");
    }
}
