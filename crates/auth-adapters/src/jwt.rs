//! HS256 access tokens.

use std::time::Duration;

use chrono::Utc;
use domains::errors::{DomainError, Result};
use domains::models::{IssuedToken, Principal, Role};
use domains::ports::TokenIssuer;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const MIN_SECRET_LEN: usize = 32;

/// Payload carried in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
}

impl Claims {
    fn principal(self) -> Principal {
        Principal {
            user_id: self.sub,
            username: self.username,
            role: self.role,
        }
    }
}

#[derive(Clone)]
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl JwtIssuer {
    /// Fails when the secret is shorter than [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(DomainError::Validation(format!(
                "jwt secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            ttl,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| DomainError::Internal(format!("failed to sign token: {e}")))
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, principal: &Principal) -> Result<IssuedToken> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: principal.user_id.clone(),
            username: principal.username.clone(),
            role: principal.role,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };
        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_in: self.ttl.as_secs(),
        })
    }

    fn verify(&self, token: &str) -> Result<Principal> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims.principal()),
            Err(err) => {
                let reason = match err.kind() {
                    ErrorKind::ExpiredSignature => "token expired",
                    ErrorKind::InvalidSignature => "invalid signature",
                    ErrorKind::InvalidIssuer => "invalid issuer",
                    _ => "invalid token",
                };
                tracing::debug!(error = %err, "access token rejected");
                Err(DomainError::Unauthorized(reason.into()))
            }
        }
    }
}
