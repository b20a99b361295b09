//! Connection Authentication
//!
//! Token verification for WebSocket connections. Identity issuance lives in an
//! external user-management service; this side only validates the tokens it
//! minted.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::shared::error::AppError;

/// Identity extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

/// Token verification seam.
///
/// The session handler depends on this trait so tests can substitute a
/// verifier that accepts canned tokens.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AuthenticatedUser, AppError>;
}

/// JWT claims issued by the user-management service.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    name: String,
    #[allow(dead_code)]
    exp: usize,
}

/// HS256 JWT verifier sharing a secret with the token issuer.
#[derive(Clone)]
pub struct JwtVerifier {
    secret: String,
}

impl JwtVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        let id = token_data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".into()))?;

        Ok(AuthenticatedUser {
            id,
            username: token_data.claims.name,
        })
    }
}
