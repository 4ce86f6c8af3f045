//! JWT access and refresh tokens (HS256)

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::User;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub token_type: TokenType,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// A freshly issued access/refresh pair
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Signing keys and token lifetimes
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, access_minutes: i64, refresh_days: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl: Duration::minutes(access_minutes),
            refresh_ttl: Duration::days(refresh_days),
        }
    }

    /// Sign a single token for the user
    pub fn issue(
        &self,
        user: &User,
        token_type: TokenType,
        now: DateTime<Utc>,
    ) -> Result<(String, Claims), DomainError> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user.id.0,
            token_type,
            jti: generate_jti(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            tenant_id: user.tenant_id.map(|t| t.0),
            is_superuser: user.is_superuser,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::Internal(format!("Failed to sign token: {}", e)))?;

        Ok((token, claims))
    }

    pub fn issue_pair(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, DomainError> {
        let (access, _) = self.issue(user, TokenType::Access, now)?;
        let (refresh, _) = self.issue(user, TokenType::Refresh, now)?;
        Ok(TokenPair { access, refresh })
    }

    /// Check signature, expiry and token type
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, DomainError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "jwt decode failed");
                DomainError::Unauthorized("Token is invalid or expired".to_string())
            })?
            .claims;

        if claims.token_type != expected {
            return Err(DomainError::Unauthorized(
                "Token has wrong type".to_string(),
            ));
        }

        Ok(claims)
    }
}

fn generate_jti() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_user;

    fn keys() -> JwtKeys {
        JwtKeys::new("test-secret", 60, 1)
    }

    #[test]
    fn issue_and_verify_access_token() {
        let user = test_user();
        let (token, issued) = keys().issue(&user, TokenType::Access, Utc::now()).unwrap();

        let claims = keys().verify(&token, TokenType::Access).unwrap();

        assert_eq!(claims.sub, user.id.0);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.tenant_id, user.tenant_id.map(|t| t.0));
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn refresh_token_lives_one_day() {
        let (_, claims) = keys()
            .issue(&test_user(), TokenType::Refresh, Utc::now())
            .unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn wrong_type_rejected() {
        let pair = keys().issue_pair(&test_user(), Utc::now()).unwrap();

        assert!(keys().verify(&pair.refresh, TokenType::Access).is_err());
        assert!(keys().verify(&pair.access, TokenType::Refresh).is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let issued_at = Utc::now() - Duration::hours(2);
        let (token, _) = keys()
            .issue(&test_user(), TokenType::Access, issued_at)
            .unwrap();

        let err = keys().verify(&token, TokenType::Access).unwrap_err();
        assert!(err.to_string().contains("invalid or expired"));
    }

    #[test]
    fn foreign_signature_rejected() {
        let (token, _) = JwtKeys::new("other-secret", 60, 1)
            .issue(&test_user(), TokenType::Access, Utc::now())
            .unwrap();

        assert!(keys().verify(&token, TokenType::Access).is_err());
    }

    #[test]
    fn jti_is_unique() {
        let user = test_user();
        let (_, a) = keys().issue(&user, TokenType::Access, Utc::now()).unwrap();
        let (_, b) = keys().issue(&user, TokenType::Access, Utc::now()).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
