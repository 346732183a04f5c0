use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Role;
use crate::config;

pub mod password;

/// Session token claims. The role travels as its integer id; privileged
/// paths re-fetch the live role from the store rather than trusting this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub role: i32,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, username: String, email: String, role: Role) -> Self {
        let now = Utc::now();
        let ttl_days = config::config().security.session_ttl_days;
        let exp = (now + Duration::days(ttl_days)).timestamp();

        Self {
            sub: user_id,
            username,
            email,
            role: role as i32,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn role(&self) -> Option<Role> {
        Role::from_i32(self.role)
    }
}

#[derive(Debug)]
pub enum TokenError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::TokenGeneration(msg) => write!(f, "token generation error: {}", msg),
            TokenError::InvalidSecret => write!(f, "invalid session secret"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Sign a session token for the given claims.
pub fn issue_token(claims: &Claims) -> Result<String, TokenError> {
    let secret = &config::config().security.session_secret;

    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| TokenError::TokenGeneration(e.to_string()))
}

/// Verify a session token. Expired, tampered, or malformed tokens all come
/// back as `None`; callers treat that identically to "no token provided".
pub fn verify_token(token: &str) -> Option<Claims> {
    let secret = &config::config().security.session_secret;

    if secret.is_empty() {
        return None;
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "casey".to_string(),
            "casey@example.com".to_string(),
            Role::Author,
        )
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let claims = sample_claims();
        let token = issue_token(&claims).unwrap();

        let decoded = verify_token(&token).expect("token should verify");
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.username, "casey");
        assert_eq!(decoded.role(), Some(Role::Author));
    }

    #[test]
    fn tampered_token_fails_verification() {
        let token = issue_token(&sample_claims()).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        assert!(verify_token(&tampered).is_none());
    }

    #[test]
    fn expired_token_fails_verification() {
        let mut claims = sample_claims();
        claims.exp = (Utc::now() - Duration::days(1)).timestamp();
        claims.iat = (Utc::now() - Duration::days(8)).timestamp();
        let token = issue_token(&claims).unwrap();

        assert!(verify_token(&token).is_none());
    }

    #[test]
    fn garbage_token_fails_verification() {
        assert!(verify_token("not-a-token").is_none());
        assert!(verify_token("").is_none());
    }
}
