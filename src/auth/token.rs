use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use std::fmt;
use thiserror::Error;

use super::claims::{Principal, ServiceClaims, SessionClaims, SESSION_KIND};

/// Service tokens live exactly this long
pub const SERVICE_TOKEN_TTL_SECS: i64 = 15 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("JWT signing secret is not configured")]
    MissingSecret,

    #[error("service name is required")]
    MissingService,

    #[error("token has expired")]
    Expired,

    #[error("token was issued for '{found}', not '{expected}'")]
    WrongService { expected: String, found: String },

    #[error("token is not a session token")]
    NotSession,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token generation failed: {0}")]
    Generation(String),
}

/// A freshly minted service token together with the claims it encodes
pub struct IssuedToken {
    pub token: String,
    pub claims: ServiceClaims,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"<REDACTED>")
            .field("claims", &self.claims)
            .finish()
    }
}

/// Mints HS256 service tokens for an authenticated principal
#[derive(Clone)]
pub struct ServiceTokenIssuer {
    key: EncodingKey,
}

impl ServiceTokenIssuer {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        Ok(Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn issue(&self, principal: &Principal, service: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(principal, service, Utc::now().timestamp())
    }

    /// Mint a token as if the current time were `now` (unix seconds)
    pub fn issue_at(&self, principal: &Principal, service: &str, now: i64) -> Result<IssuedToken, TokenError> {
        let service = service.trim();
        if service.is_empty() {
            return Err(TokenError::MissingService);
        }

        let claims = ServiceClaims {
            user_id: principal.user_id,
            email: principal.email.clone(),
            roles: principal.roles.clone(),
            service: service.to_string(),
            iat: now,
            exp: now + SERVICE_TOKEN_TTL_SECS,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| TokenError::Generation(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }
}

/// Signs session tokens the way the external credential layer does.
/// Used by the CLI for local development and by tests.
#[derive(Clone)]
pub struct SessionSigner {
    key: EncodingKey,
}

impl SessionSigner {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        Ok(Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn sign_at(&self, principal: &Principal, ttl_secs: i64, now: i64) -> Result<String, TokenError> {
        let claims = SessionClaims {
            user_id: principal.user_id,
            email: principal.email.clone(),
            roles: principal.roles.clone(),
            kind: SESSION_KIND.to_string(),
            iat: now,
            exp: now + ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    pub fn sign(&self, principal: &Principal, ttl_secs: i64) -> Result<String, TokenError> {
        self.sign_at(principal, ttl_secs, Utc::now().timestamp())
    }
}

/// Verifies service and session tokens against the shared HS256 secret
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    leeway_secs: i64,
}

impl TokenVerifier {
    pub fn new(secret: &str, leeway_secs: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            leeway_secs: leeway_secs as i64,
        })
    }

    pub fn verify_service_token(&self, token: &str, expected_service: &str) -> Result<ServiceClaims, TokenError> {
        self.verify_service_token_at(token, expected_service, Utc::now().timestamp())
    }

    pub fn verify_service_token_at(
        &self,
        token: &str,
        expected_service: &str,
        now: i64,
    ) -> Result<ServiceClaims, TokenError> {
        let claims: ServiceClaims = self.decode_at(token, |c: &ServiceClaims| c.exp, now)?;

        if claims.service != expected_service {
            return Err(TokenError::WrongService {
                expected: expected_service.to_string(),
                found: claims.service,
            });
        }

        Ok(claims)
    }

    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_session_at(token, Utc::now().timestamp())
    }

    pub fn verify_session_at(&self, token: &str, now: i64) -> Result<SessionClaims, TokenError> {
        let claims: SessionClaims = self.decode_at(token, |c: &SessionClaims| c.exp, now)?;
        if claims.kind != SESSION_KIND {
            return Err(TokenError::NotSession);
        }
        Ok(claims)
    }

    /// Signature is checked by jsonwebtoken; expiry is checked here so the
    /// clock can be injected
    fn decode_at<T, F>(&self, token: &str, exp: F, now: i64) -> Result<T, TokenError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> i64,
    {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<T>(token, &self.key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })?;

        if now >= exp(&data.claims) + self.leeway_secs {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::Role;

    const SECRET: &str = "test-jwt-secret";
    const NOW: i64 = 1_760_000_000;

    fn principal() -> Principal {
        Principal::new(42, "ada@example.com", [Role::Quoting, Role::Admin])
    }

    fn issuer() -> ServiceTokenIssuer {
        ServiceTokenIssuer::new(SECRET).unwrap()
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(SECRET, 0).unwrap()
    }

    #[test]
    fn decoded_claims_match_issued_claims() {
        let issued = issuer().issue_at(&principal(), "quoting-service", NOW).unwrap();
        let claims = verifier()
            .verify_service_token_at(&issued.token, "quoting-service", NOW)
            .unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.roles, principal().roles);
        assert_eq!(claims.service, "quoting-service");
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn issue_uses_current_clock() {
        let before = Utc::now().timestamp();
        let issued = issuer().issue(&principal(), "customer-service").unwrap();
        let after = Utc::now().timestamp();
        assert!(issued.claims.iat >= before && issued.claims.iat <= after);
        assert_eq!(issued.claims.exp, issued.claims.iat + SERVICE_TOKEN_TTL_SECS);
    }

    #[test]
    fn accepted_one_second_before_expiry_rejected_after() {
        let issued = issuer().issue_at(&principal(), "quoting-service", NOW).unwrap();
        let exp = issued.claims.exp;

        assert!(verifier()
            .verify_service_token_at(&issued.token, "quoting-service", exp - 1)
            .is_ok());
        assert_eq!(
            verifier().verify_service_token_at(&issued.token, "quoting-service", exp + 1),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn leeway_extends_acceptance() {
        let issued = issuer().issue_at(&principal(), "quoting-service", NOW).unwrap();
        let lenient = TokenVerifier::new(SECRET, 30).unwrap();
        assert!(lenient
            .verify_service_token_at(&issued.token, "quoting-service", issued.claims.exp + 10)
            .is_ok());
    }

    #[test]
    fn empty_service_is_rejected() {
        assert_eq!(
            issuer().issue_at(&principal(), "  ", NOW).unwrap_err(),
            TokenError::MissingService
        );
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        assert!(matches!(ServiceTokenIssuer::new(""), Err(TokenError::MissingSecret)));
        assert!(matches!(TokenVerifier::new("", 0), Err(TokenError::MissingSecret)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issued = issuer().issue_at(&principal(), "quoting-service", NOW).unwrap();
        let other = TokenVerifier::new("another-secret", 0).unwrap();
        assert!(matches!(
            other.verify_service_token_at(&issued.token, "quoting-service", NOW),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn token_for_another_service_is_rejected() {
        let issued = issuer().issue_at(&principal(), "quoting-service", NOW).unwrap();
        assert!(matches!(
            verifier().verify_service_token_at(&issued.token, "customer-service", NOW),
            Err(TokenError::WrongService { .. })
        ));
    }

    #[test]
    fn session_and_service_tokens_are_not_interchangeable() {
        let session = SessionSigner::new(SECRET).unwrap().sign_at(&principal(), 3600, NOW).unwrap();
        let service = issuer().issue_at(&principal(), "users", NOW).unwrap();

        assert!(verifier().verify_session_at(&session, NOW).is_ok());
        assert!(verifier().verify_session_at(&service.token, NOW).is_err());
        assert!(verifier().verify_service_token_at(&session, "users", NOW).is_err());
    }
}
