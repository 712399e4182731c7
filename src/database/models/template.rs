use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::table::{Entity, Filter};
use crate::database::validation::{optional_text, positive, required, required_text, ValidationError};
use crate::types::PlanType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    Draft,
    Active,
    Archived,
}

impl TemplateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStatus::Draft => "draft",
            TemplateStatus::Active => "active",
            TemplateStatus::Archived => "archived",
        }
    }
}

/// A versioned benefit plan template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: i32,
    pub name: String,
    pub plan_type: PlanType,
    pub status: TemplateStatus,
    pub version: i32,
    pub deductible: Option<Decimal>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTemplate {
    pub name: String,
    pub plan_type: PlanType,
    pub status: TemplateStatus,
    pub version: i32,
    pub deductible: Option<Decimal>,
    pub description: Option<String>,
}

impl Entity for Template {
    type New = NewTemplate;
    const TABLE: &'static str = "templates";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["name", "plan_type", "status", "version", "deductible", "description"];
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTemplate {
    pub name: Option<String>,
    pub plan_type: Option<PlanType>,
    pub status: Option<TemplateStatus>,
    pub version: Option<i32>,
    pub deductible: Option<Decimal>,
    pub description: Option<String>,
}

impl CreateTemplate {
    pub fn validate(self) -> Result<NewTemplate, ValidationError> {
        Ok(NewTemplate {
            name: required_text("name", self.name)?,
            plan_type: required("plan_type", self.plan_type)?,
            status: self.status.unwrap_or(TemplateStatus::Draft),
            version: positive("version", self.version.unwrap_or(1))?,
            deductible: self.deductible,
            description: optional_text(self.description),
        })
    }
}

/// Query accepted by `GET /api/templates`
#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    #[serde(rename = "type")]
    pub plan_type: Option<String>,
    pub status: Option<String>,
    pub latest: Option<String>,
}

impl TemplateQuery {
    pub fn into_filter(self) -> Result<Filter, ValidationError> {
        let mut filter = Filter::all();

        if let Some(plan_type) = self.plan_type.filter(|s| !s.is_empty()) {
            let plan_type = PlanType::parse(&plan_type).ok_or_else(|| ValidationError::Invalid {
                field: "type",
                reason: "must be 'individual' or 'group'".to_string(),
            })?;
            filter = filter.eq("plan_type", plan_type.as_str());
        }

        if let Some(status) = self.status.filter(|s| !s.is_empty()) {
            let status: TemplateStatus = serde_json::from_value(serde_json::Value::String(status)).map_err(|_| {
                ValidationError::Invalid {
                    field: "status",
                    reason: "must be one of draft, active, archived".to_string(),
                }
            })?;
            filter = filter.eq("status", status.as_str());
        }

        if matches!(self.latest.as_deref(), Some("true") | Some("1")) {
            filter = filter.latest("name", "version");
        }

        Ok(filter)
    }
}
