/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The platform services. One binary serves exactly one of them, chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    #[serde(rename = "users")]
    Users,
    #[serde(rename = "customer-service")]
    CustomerService,
    #[serde(rename = "quoting-service")]
    Quoting,
    #[serde(rename = "benefit-designer-service")]
    BenefitDesigner,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Users,
        ServiceKind::CustomerService,
        ServiceKind::Quoting,
        ServiceKind::BenefitDesigner,
    ];

    /// Wire name, as carried in the `service` claim of a service token
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Users => "users",
            ServiceKind::CustomerService => "customer-service",
            ServiceKind::Quoting => "quoting-service",
            ServiceKind::BenefitDesigner => "benefit-designer-service",
        }
    }

    /// Port used when neither PORT nor SERVICE_PORT is set
    pub fn default_port(&self) -> u16 {
        match self {
            ServiceKind::Users => 3000,
            ServiceKind::CustomerService => 3001,
            ServiceKind::Quoting => 3002,
            ServiceKind::BenefitDesigner => 3003,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown service '{0}'")]
pub struct UnknownService(pub String);

impl FromStr for ServiceKind {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Short aliases are accepted for CLI convenience
        match s.trim() {
            "users" | "auth" => Ok(ServiceKind::Users),
            "customer-service" | "customer" => Ok(ServiceKind::CustomerService),
            "quoting-service" | "quoting" => Ok(ServiceKind::Quoting),
            "benefit-designer-service" | "benefit-designer" => Ok(ServiceKind::BenefitDesigner),
            other => Err(UnknownService(other.to_string())),
        }
    }
}

/// Plan shape shared by quotes and benefit templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Individual,
    Group,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Individual => "individual",
            PlanType::Group => "group",
        }
    }

    /// Parse the two recognised plan types; anything else is `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "individual" => Some(PlanType::Individual),
            "group" => Some(PlanType::Group),
            _ => None,
        }
    }
}
