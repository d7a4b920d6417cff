// crates/pcbook-core/src/token.rs
//
// Signed, time-limited access tokens.
//
// Token text: `hex(claims_json).hex(ed25519_signature)`. The signature
// covers the hex-encoded claims exactly as they appear in the token.
// Verification is a pure function of the token, the secret, and the clock;
// the server keeps no session table.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::SecretKeypair;
use crate::error::CatalogError;
use crate::user::User;

/// Longest lifetime a token manager accepts: ten years.
pub const MAX_TOKEN_DURATION_DAYS: i64 = 3650;

/// The decoded payload of a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Subject: the username the token was issued to.
    pub sub: String,
    /// Role used for access checks.
    pub role: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds. Always greater than `iat`.
    pub exp: i64,
}

/// Issues and verifies access tokens with a fixed lifetime.
pub struct TokenManager {
    keypair: SecretKeypair,
    duration: Duration,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("duration", &self.duration)
            .finish()
    }
}

impl TokenManager {
    /// Create a token manager signing with `secret`.
    ///
    /// The lifetime must be at least one second so that `exp > iat` holds,
    /// and at most `MAX_TOKEN_DURATION_DAYS` so the expiry stays representable.
    pub fn new(secret: &str, duration: Duration) -> Result<Self, CatalogError> {
        if duration < Duration::seconds(1) {
            return Err(CatalogError::InvalidArgument(format!(
                "token duration must be at least one second, got {}",
                duration
            )));
        }
        if duration > Duration::days(MAX_TOKEN_DURATION_DAYS) {
            return Err(CatalogError::InvalidArgument(format!(
                "token duration must be at most {} days, got {}",
                MAX_TOKEN_DURATION_DAYS, duration
            )));
        }
        Ok(Self {
            keypair: SecretKeypair::from_secret(secret)?,
            duration,
        })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Issue a token for a stored user.
    pub fn generate(&self, user: &User) -> Result<String, CatalogError> {
        self.issue(&user.username, &user.role)
    }

    /// Issue a token for `subject` with `role`, valid from now.
    pub fn issue(&self, subject: &str, role: &str) -> Result<String, CatalogError> {
        self.issue_at(subject, role, Utc::now())
    }

    /// Issue a token as if the clock read `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<String, CatalogError> {
        let claims = UserClaims {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.duration)
                .ok_or_else(|| CatalogError::Token("token expiry out of range".to_string()))?
                .timestamp(),
        };
        let payload = hex::encode(serde_json::to_vec(&claims)?);
        let signature = self.keypair.sign(payload.as_bytes());
        Ok(format!("{}.{}", payload, hex::encode(signature)))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<UserClaims, CatalogError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the clock read `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserClaims, CatalogError> {
        let (payload, signature_hex) = token
            .split_once('.')
            .ok_or_else(|| CatalogError::Token("malformed token".to_string()))?;
        let signature = hex::decode(signature_hex)
            .map_err(|e| CatalogError::Token(format!("malformed signature: {}", e)))?;

        self.keypair
            .verify(payload.as_bytes(), &signature)
            .map_err(|_| CatalogError::Token("invalid token signature".to_string()))?;

        let claims_json = hex::decode(payload)
            .map_err(|e| CatalogError::Token(format!("malformed claims: {}", e)))?;
        let claims: UserClaims = serde_json::from_slice(&claims_json)
            .map_err(|e| CatalogError::Token(format!("malformed claims: {}", e)))?;

        if claims.exp <= now.timestamp() {
            return Err(CatalogError::Token("token has expired".to_string()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> TokenManager {
        TokenManager::new("secret", Duration::minutes(15)).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = manager();
        let token = tokens.issue("admin1", "admin").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin1");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = manager();
        let issued = Utc::now() - Duration::minutes(20);
        let token = tokens.issue_at("admin1", "admin", issued).unwrap();
        let err = tokens.verify(&token).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let tokens = manager();
        let now = Utc::now();
        let token = tokens.issue_at("user1", "user", now).unwrap();
        let at_expiry = now + Duration::minutes(15);
        assert!(tokens.verify_at(&token, at_expiry).is_err());
        assert!(tokens.verify_at(&token, at_expiry - Duration::seconds(1)).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = manager().issue("admin1", "admin").unwrap();
        let other = TokenManager::new("another secret", Duration::minutes(15)).unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let tokens = manager();
        let token = tokens.issue("user1", "user").unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let forged_claims = UserClaims {
            sub: "user1".to_string(),
            role: "admin".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 900,
        };
        let forged_payload = hex::encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}", forged_payload, signature);
        assert!(tokens.verify(&forged).is_err());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let tokens = manager();
        assert!(tokens.verify("").is_err());
        assert!(tokens.verify("no-dot").is_err());
        assert!(tokens.verify("abc.xyz").is_err());
        assert!(tokens.verify("abcd.").is_err());
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(TokenManager::new("secret", Duration::zero()).is_err());
        assert!(TokenManager::new("secret", Duration::seconds(-5)).is_err());
    }

    #[test]
    fn test_huge_duration_rejected() {
        let err = TokenManager::new("secret", Duration::seconds(10_000_000_000_000)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
        assert!(TokenManager::new("secret", Duration::days(MAX_TOKEN_DURATION_DAYS)).is_ok());
    }

    #[test]
    fn test_expiry_overflow_is_an_error() {
        let tokens = TokenManager::new("secret", Duration::days(MAX_TOKEN_DURATION_DAYS)).unwrap();
        let end_of_time = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        let err = tokens.issue_at("admin1", "admin", end_of_time).unwrap_err();
        assert!(matches!(err, CatalogError::Token(_)));
    }

    #[test]
    fn test_generate_for_user() {
        let tokens = manager();
        let user = User::new("admin1", "secret", "admin").unwrap();
        let claims = tokens.verify(&tokens.generate(&user).unwrap()).unwrap();
        assert_eq!(claims.sub, "admin1");
        assert_eq!(claims.role, "admin");
    }
}
