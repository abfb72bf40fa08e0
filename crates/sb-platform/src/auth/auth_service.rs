//! Authentication Service
//!
//! HS256 session tokens carrying the user id and role.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::shared::error::{PlatformError, Result};
use crate::user::entity::{Role, User};

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "userId")]
    pub user_id: String,

    pub role: Role,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Token signing configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret_key: String,
    pub issuer: String,
    pub expiry_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret_key: "development-secret-change-in-production".to_string(),
            issuer: "shiftboard".to_string(),
            expiry_secs: 3600, // 1 hour
        }
    }
}

impl From<&sb_config::AuthConfig> for TokenConfig {
    fn from(config: &sb_config::AuthConfig) -> Self {
        let defaults = Self::default();
        Self {
            secret_key: if config.jwt_secret.is_empty() {
                defaults.secret_key
            } else {
                config.jwt_secret.clone()
            },
            issuer: config.issuer.clone(),
            expiry_secs: config.token_expiry_secs,
        }
    }
}

pub struct AuthService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        info!(issuer = %config.issuer, expiry_secs = config.expiry_secs, "AuthService initialized with HS256");

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a session token for a user
    pub fn generate_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.expiry_secs);

        let claims = SessionClaims {
            user_id: user.id.clone(),
            role: user.role,
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PlatformError::internal(format!("Failed to encode JWT: {}", e)))
    }

    /// Validate a session token and extract its claims
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    PlatformError::unauthorized("Token expired")
                }
                _ => PlatformError::unauthorized("Invalid token"),
            })
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(TokenConfig::default())
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = service();
        let user = User::new("coordinator1", "hash", Role::Coordinator);

        let token = service.generate_token(&user).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.role, Role::Coordinator);
        assert_eq!(claims.iss, "shiftboard");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = service();
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            user_id: "u1".to_string(),
            role: Role::Volunteer,
            iss: "shiftboard".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &service.encoding_key).unwrap();

        let err = service.validate_token(&token).unwrap_err();
        assert_eq!(err.to_string(), "Token expired");
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let other = AuthService::new(TokenConfig {
            secret_key: "another-secret".to_string(),
            ..TokenConfig::default()
        });
        let user = User::new("v", "hash", Role::Volunteer);
        let token = other.generate_token(&user).unwrap();

        assert!(matches!(
            service().validate_token(&token),
            Err(PlatformError::Unauthorized { .. })
        ));
        assert!(service().validate_token("not.a.jwt").is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let other = AuthService::new(TokenConfig {
            issuer: "elsewhere".to_string(),
            ..TokenConfig::default()
        });
        let token = other.generate_token(&User::new("v", "hash", Role::Volunteer)).unwrap();
        assert!(service().validate_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("bearer abc123"), None);
        assert_eq!(extract_bearer_token("Basic abc123"), None);
    }
}
