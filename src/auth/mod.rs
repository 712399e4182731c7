//! Cross-service authentication: roles, service tokens, session tokens and
//! the shared internal-service key.

pub mod claims;
pub mod roles;
pub mod service_key;
pub mod token;

pub use claims::{Principal, ServiceClaims, SessionClaims};
pub use roles::{Role, RoleRequirement, RoleSet};
pub use service_key::{ServiceKey, SERVICE_KEY_HEADER};
pub use token::{IssuedToken, ServiceTokenIssuer, SessionSigner, TokenError, TokenVerifier, SERVICE_TOKEN_TTL_SECS};
