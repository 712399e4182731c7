use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Platform roles. A user may hold several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Quoting,
    CustomerService,
    BenefitDesigner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Quoting => "quoting",
            Role::CustomerService => "customer_service",
            Role::BenefitDesigner => "benefit_designer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quoting" => Ok(Role::Quoting),
            "customer_service" => Ok(Role::CustomerService),
            "benefit_designer" => Ok(Role::BenefitDesigner),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

pub type RoleSet = BTreeSet<Role>;

/// Roles a route demands. Holding any one of them is enough.
#[derive(Debug, Clone, Copy)]
pub struct RoleRequirement(pub &'static [Role]);

impl RoleRequirement {
    pub fn is_satisfied_by(&self, held: &RoleSet) -> bool {
        self.0.iter().any(|role| held.contains(role))
    }
}

impl fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Role::as_str).collect();
        write!(f, "{}", names.join(" | "))
    }
}

pub const CUSTOMER_WRITERS: RoleRequirement = RoleRequirement(&[Role::CustomerService, Role::Admin]);
pub const QUOTING_WRITERS: RoleRequirement = RoleRequirement(&[Role::Quoting, Role::Admin]);
pub const TEMPLATE_WRITERS: RoleRequirement = RoleRequirement(&[Role::BenefitDesigner, Role::Admin]);
pub const ADMINS: RoleRequirement = RoleRequirement(&[Role::Admin]);
