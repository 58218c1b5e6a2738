//! Refresh token store

use sqlx::PgPool;

use super::DbError;

pub struct AuthenticationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AuthenticationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, refresh_token: &str) -> Result<(), DbError> {
        sqlx::query("INSERT INTO authentications (token) VALUES ($1)")
            .bind(refresh_token)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::from_write(e, "refresh token"))?;
        Ok(())
    }

    /// Fail with `NotFound` unless the token was issued and not revoked.
    pub async fn verify(&self, refresh_token: &str) -> Result<(), DbError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authentications WHERE token = $1)")
                .bind(refresh_token)
                .fetch_one(self.pool)
                .await?;

        if exists {
            Ok(())
        } else {
            Err(DbError::not_found("refresh token", "<redacted>"))
        }
    }

    pub async fn delete(&self, refresh_token: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM authentications WHERE token = $1")
            .bind(refresh_token)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("refresh token", "<redacted>"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenManager;
    use std::time::Duration;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn logout_revokes_only_its_own_session() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();
        let repo = AuthenticationRepo::new(&pool);

        let tokens = TokenManager::new("access", "refresh", Duration::from_secs(60));
        let laptop = tokens.generate_refresh_token("user-sessions").unwrap();
        let phone = tokens.generate_refresh_token("user-sessions").unwrap();
        repo.add(&laptop).await.unwrap();
        repo.add(&phone).await.unwrap();

        repo.delete(&laptop).await.unwrap();
        assert!(repo.verify(&laptop).await.unwrap_err().is_not_found());
        repo.verify(&phone).await.unwrap();

        let err = repo.add(&phone).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        repo.delete(&phone).await.unwrap();
    }
}
