use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::{
    model::role::Role,
    models::{Claims, TokenType},
};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

fn build_claims(user_id: u64, username: String, role: Role, token_type: TokenType, ttl: usize) -> Claims {
    let iat = now();
    Claims {
        user_id,
        sub: username,
        role,
        iat,
        exp: iat + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    }
}

/// HS256 with the server secret.
fn sign(claims: &Claims, secret: &str) -> Result<String, Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn generate_access_token(
    user_id: u64,
    username: String,
    role: Role,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    let claims = build_claims(user_id, username, role, TokenType::Access, ttl);
    sign(&claims, secret)
}

/// The `jti` is random per token so it can be revoked later.
pub fn generate_refresh_token(
    user_id: u64,
    username: String,
    role: Role,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = build_claims(user_id, username, role, TokenType::Refresh, ttl);
    let token = sign(&claims, secret)?;

    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn access_token_round_trips() {
        let token = generate_access_token(42, "budi".into(), Role::Admin, SECRET, 900).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "budi");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn refresh_tokens_get_distinct_ids() {
        let (_, first) = generate_refresh_token(1, "budi".into(), Role::Employee, SECRET, 604_800).unwrap();
        let (_, second) = generate_refresh_token(1, "budi".into(), Role::Employee, SECRET, 604_800).unwrap();

        assert_ne!(first.jti, second.jti);
        assert_eq!(first.token_type, TokenType::Refresh);
        assert_eq!(first.exp - first.iat, 604_800);
    }

    #[test]
    fn rejects_foreign_signature() {
        let token = generate_access_token(1, "budi".into(), Role::Employee, SECRET, 900).unwrap();
        assert!(verify_token(&token, "another-secret").is_err());
        assert!(verify_token("not-a-token", SECRET).is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        let mut claims = build_claims(1, "budi".into(), Role::Employee, TokenType::Access, 0);
        claims.iat -= 3600;
        claims.exp = claims.iat + 60;
        let token = sign(&claims, SECRET).unwrap();

        assert!(verify_token(&token, SECRET).is_err());
    }
}
