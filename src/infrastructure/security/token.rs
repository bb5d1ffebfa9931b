use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::error::{AppError, Result, TokenErrorKind};

const MAX_TOKEN_LEN: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Session,
    PasswordReset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub kind: TokenKind,
    /// Unix seconds.
    pub exp: i64,
    pub jti: String,
}

/// HS256 JWTs for sessions and password resets.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, subject: &str, kind: TokenKind, ttl_secs: i64) -> Result<String> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            kind,
            exp: chrono::Utc::now().timestamp() + ttl_secs,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// An expired signature maps to `Expired`; every other failure,
    /// including a token of the wrong kind, is `Invalid`.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenClaims> {
        let invalid = || AppError::TokenError(TokenErrorKind::Invalid);
        if token.len() > MAX_TOKEN_LEN {
            return Err(invalid());
        }
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenError(TokenErrorKind::Expired),
                _ => invalid(),
            })?;
        if data.claims.kind != expected {
            return Err(invalid());
        }
        Ok(data.claims)
    }
}

/// Hex SHA-256 of a token, the form in which reset tokens are stored.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
