use serde::{Deserialize, Serialize};

use super::roles::{Role, RoleSet};

/// Claims of a cross-service bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceClaims {
    pub user_id: i32,
    pub email: String,
    pub roles: RoleSet,
    /// Wire name of the service this token was minted for
    pub service: String,
    pub iat: i64,
    pub exp: i64,
}

pub const SESSION_KIND: &str = "session";

/// Claims of a browser session token minted by the credential layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: i32,
    pub email: String,
    pub roles: RoleSet,
    pub kind: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller identity, inserted into request extensions by the
/// session and service-token middleware
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: i32,
    pub email: String,
    pub roles: RoleSet,
}

impl Principal {
    pub fn new(user_id: i32, email: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            user_id,
            email: email.into(),
            roles: roles.into_iter().collect(),
        }
    }
}

impl From<ServiceClaims> for Principal {
    fn from(claims: ServiceClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            roles: claims.roles,
        }
    }
}

impl From<SessionClaims> for Principal {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            roles: claims.roles,
        }
    }
}
