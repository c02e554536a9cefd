//! JWT token service

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::model::Claims;

/// Encode an HS256 token for the given user
pub fn encode_jwt_token(
    user_id: i32,
    role: &str,
    secret_key: &str,
    expire_seconds: i64,
) -> jsonwebtoken::errors::Result<String> {
    let exp = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(expire_seconds))
        .unwrap_or_else(chrono::Utc::now)
        .timestamp();

    let claims = Claims {
        user_id,
        role: role.to_string(),
        exp,
    };

    let encoding_key = EncodingKey::from_secret(secret_key.as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
}

/// Decode and validate a token. Only HS256 is accepted; expiry is enforced
/// without leeway.
pub fn decode_jwt_token(
    token: &str,
    secret_key: &str,
) -> jsonwebtoken::errors::Result<jsonwebtoken::TokenData<Claims>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    let decoding_key = DecodingKey::from_secret(secret_key.as_bytes());
    decode::<Claims>(token, &decoding_key, &validation)
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::errors::ErrorKind;

    use super::*;

    const SECRET: &str = "hive-secret";

    #[test]
    fn test_encode_decode() {
        let token = encode_jwt_token(7, "MANAGER", SECRET, 3600).unwrap();
        let data = decode_jwt_token(&token, SECRET).unwrap();

        assert_eq!(data.claims.user_id, 7);
        assert_eq!(data.claims.role, "MANAGER");
        assert_eq!(data.header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_expiry_is_24h_ahead() {
        let now = chrono::Utc::now().timestamp();
        let token = encode_jwt_token(1, "WORKER", SECRET, 86_400).unwrap();
        let claims = decode_jwt_token(&token, SECRET).unwrap().claims;

        assert!((claims.exp - (now + 86_400)).abs() <= 1);
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = encode_jwt_token(1, "WORKER", SECRET, -120).unwrap();
        let err = decode_jwt_token(&token, SECRET).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = encode_jwt_token(1, "WORKER", SECRET, 60).unwrap();
        assert!(decode_jwt_token(&token, "other").is_err());
    }

    #[test]
    fn test_non_hmac_algorithm_rejected() {
        let claims = Claims {
            user_id: 1,
            role: "ADMIN".to_string(),
            exp: chrono::Utc::now().timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = decode_jwt_token(&token, SECRET).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidAlgorithm));
    }
}
