use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Role, RoleSet};
use crate::database::validation::{email, required_text, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A user joined with the contents of `user_roles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: RoleSet,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub roles: RoleSet,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl CreateUser {
    pub fn validate(self) -> Result<NewUser, ValidationError> {
        Ok(NewUser {
            email: email("email", self.email)?,
            name: required_text("name", self.name)?,
            roles: self.roles.into_iter().collect(),
        })
    }
}
