//! Password hashing
//!
//! bcrypt is CPU-bound, so both directions run under `spawn_blocking`.

use super::AuthError;

const HASH_COST: u32 = 10;

pub async fn hash_password(password: String) -> Result<String, AuthError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST)).await??;
    Ok(hash)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("secret".into()).await.unwrap();
        assert_ne!(hash, "secret");
        assert!(verify_password("secret".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_error() {
        let err = verify_password("secret".into(), "not-a-hash".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Hash(_)));
    }
}
