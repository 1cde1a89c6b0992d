use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::Claims;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

pub fn generate_access_token(
    user_id: u64,
    username: String,
    role: u8,
    secret: &str,
    ttl: usize,
) -> String {
    let claims = Claims {
        user_id,
        sub: username,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_with_the_right_secret() {
        let token = generate_access_token(3, "direction".into(), 1, "s3cret", 600);
        let claims = verify_token(&token, "s3cret").unwrap();
        assert_eq!(claims.user_id, 3);
        assert_eq!(claims.sub, "direction");
        assert_eq!(claims.role, 1);
    }

    #[test]
    fn token_is_rejected_with_a_wrong_secret() {
        let token = generate_access_token(3, "direction".into(), 1, "s3cret", 600);
        assert!(verify_token(&token, "other").is_err());
    }
}
