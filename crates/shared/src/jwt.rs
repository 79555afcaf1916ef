//! Session token utilities.
//!
//! Access and refresh tokens are JWTs. Deployments either share an HMAC
//! secret (HS256) or sign with an RSA key pair (RS256); the algorithm follows
//! from the key material handed to [`JwtConfig`].

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Claims carried by every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    /// Account email at issue time
    pub email: String,
    /// Account role at issue time (PARTICIPANT, ORGANIZER or ADMIN)
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    /// Token id, hashed into the session row for revocation
    pub jti: String,
    pub token_type: TokenType,
}

/// Type of JWT token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Subject of a token being issued.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub account_id: Uuid,
    pub email: &'a str,
    pub role: &'a str,
}

/// A freshly signed token together with its id.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_in: i64,
}

/// Signing and validation settings for session tokens.
#[derive(Clone)]
pub struct JwtConfig {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
    /// Clock skew tolerance applied to `exp`
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("refresh_token_expiry_secs", &self.refresh_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Shortest HMAC secret accepted for HS256 signing.
pub const MIN_SECRET_LEN: usize = 32;

impl JwtConfig {
    /// Creates an HS256 configuration from a shared secret.
    pub fn from_secret(
        secret: &str,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::InvalidKey(format!(
                "HMAC secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry_secs,
            refresh_token_expiry_secs,
            leeway_secs,
        })
    }

    /// Creates an RS256 configuration from a PEM encoded key pair.
    pub fn from_rsa_pem(
        private_key_pem: &str,
        public_key_pem: &str,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        let private_key = normalize_pem(private_key_pem);
        let public_key = normalize_pem(public_key_pem);

        let encoding_key = EncodingKey::from_rsa_pem(private_key.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid private key: {}", e)))?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            algorithm: Algorithm::RS256,
            encoding_key,
            decoding_key,
            access_token_expiry_secs,
            refresh_token_expiry_secs,
            leeway_secs,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn generate_access_token(&self, subject: TokenSubject<'_>) -> Result<IssuedToken, JwtError> {
        self.generate_token(subject, TokenType::Access, self.access_token_expiry_secs)
    }

    pub fn generate_refresh_token(
        &self,
        subject: TokenSubject<'_>,
    ) -> Result<IssuedToken, JwtError> {
        self.generate_token(subject, TokenType::Refresh, self.refresh_token_expiry_secs)
    }

    fn generate_token(
        &self,
        subject: TokenSubject<'_>,
        token_type: TokenType,
        expiry_secs: i64,
    ) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: subject.account_id.to_string(),
            email: subject.email.to_string(),
            role: subject.role.to_string(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
            token_type,
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_in: expiry_secs,
        })
    }

    /// Validates signature and expiry and returns the claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TokenType::Access)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TokenType::Refresh)
    }

    fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(JwtError::InvalidToken);
        }
        Ok(claims)
    }
}

/// Extracts the account id from validated claims.
pub fn extract_account_id(claims: &Claims) -> Result<Uuid, JwtError> {
    Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidToken)
}

/// Environment files often carry PEM keys on one line with literal `\n`.
fn normalize_pem(key: &str) -> String {
    key.trim_matches('"')
        .trim_matches('\'')
        .replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration as StdDuration;

    const SECRET: &str = "test_secret_key_for_jwt_testing_12345";

    fn create_test_config() -> JwtConfig {
        JwtConfig::from_secret(SECRET, 900, 604800, 0).unwrap()
    }

    fn subject(id: Uuid) -> TokenSubject<'static> {
        TokenSubject {
            account_id: id,
            email: "ada@college.edu",
            role: "PARTICIPANT",
        }
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = JwtConfig::from_secret("short", 900, 604800, 0);
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_invalid_rsa_pem_rejected() {
        let result = JwtConfig::from_rsa_pem("not-a-key", "not-a-key", 900, 604800, 30);
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_access_token_round_trip_carries_identity() {
        let config = create_test_config();
        let id = Uuid::new_v4();

        let issued = config.generate_access_token(subject(id)).unwrap();
        let claims = config.validate_access_token(&issued.token).unwrap();

        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.email, "ada@college.edu");
        assert_eq!(claims.role, "PARTICIPANT");
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(issued.expires_in, 900);
        assert_eq!(extract_account_id(&claims).unwrap(), id);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let config = create_test_config();
        let id = Uuid::new_v4();

        let access = config.generate_access_token(subject(id)).unwrap();
        let refresh = config.generate_refresh_token(subject(id)).unwrap();

        assert!(matches!(
            config.validate_refresh_token(&access.token),
            Err(JwtError::InvalidToken)
        ));
        assert!(matches!(
            config.validate_access_token(&refresh.token),
            Err(JwtError::InvalidToken)
        ));
        assert!(config.validate_refresh_token(&refresh.token).is_ok());
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let config = create_test_config();
        let other =
            JwtConfig::from_secret("another_secret_key_for_jwt_testing_999", 900, 604800, 0)
                .unwrap();

        let issued = other.generate_access_token(subject(Uuid::new_v4())).unwrap();
        assert!(matches!(
            config.validate_access_token(&issued.token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let mut config = create_test_config();
        config.access_token_expiry_secs = 1;

        let issued = config.generate_access_token(subject(Uuid::new_v4())).unwrap();
        sleep(StdDuration::from_secs(2));

        let result = config.validate_access_token(&issued.token);
        assert!(
            matches!(result, Err(JwtError::TokenExpired)),
            "Expected TokenExpired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_malformed_token() {
        let config = create_test_config();
        assert!(config.validate_token("not_a_jwt").is_err());
    }

    #[test]
    fn test_unique_jti_per_token() {
        let config = create_test_config();
        let id = Uuid::new_v4();

        let first = config.generate_access_token(subject(id)).unwrap();
        let second = config.generate_access_token(subject(id)).unwrap();

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_normalize_pem_expands_escaped_newlines() {
        let raw = "\"-----BEGIN KEY-----\\nabc\\n-----END KEY-----\"";
        assert_eq!(
            normalize_pem(raw),
            "-----BEGIN KEY-----\nabc\n-----END KEY-----"
        );
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", create_test_config());
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(SECRET));
    }
}
