//! JWT access and refresh tokens
//!
//! Access tokens expire after the configured age. Refresh tokens carry no
//! expiry; they stay valid until deleted from the `authentications` table.
//! Every token carries a random `jti`, so two logins never share a token.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: String,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default)]
    pub jti: String,
}

impl Claims {
    fn issue(user_id: &str, exp_after: Option<Duration>) -> Self {
        let iat = Utc::now().timestamp();
        Self {
            id: user_id.to_string(),
            iat,
            exp: exp_after.map(|age| iat.saturating_add(seconds(age))),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Whole seconds of `age`, clamped to the range a JWT timestamp can hold.
fn seconds(age: Duration) -> i64 {
    i64::try_from(age.as_secs()).unwrap_or(i64::MAX)
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

pub struct TokenManager {
    access: KeyPair,
    refresh: KeyPair,
    access_age: Duration,
}

impl TokenManager {
    pub fn new(access_key: &str, refresh_key: &str, access_age: Duration) -> Self {
        Self {
            access: KeyPair::from_secret(access_key),
            refresh: KeyPair::from_secret(refresh_key),
            access_age,
        }
    }

    pub fn generate_access_token(&self, user_id: &str) -> Result<String, AuthError> {
        let claims = Claims::issue(user_id, Some(self.access_age));
        Ok(encode(&Header::default(), &claims, &self.access.encoding)?)
    }

    pub fn generate_refresh_token(&self, user_id: &str) -> Result<String, AuthError> {
        let claims = Claims::issue(user_id, None);
        Ok(encode(&Header::default(), &claims, &self.refresh.encoding)?)
    }

    /// User id from a valid, unexpired access token.
    pub fn verify_access_token(&self, token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.access.decoding, &validation)?;
        Ok(data.claims.id)
    }

    /// User id from a refresh token signed with the refresh key.
    pub fn verify_refresh_token(&self, token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.refresh.decoding, &validation)?;
        Ok(data.claims.id)
    }
}
