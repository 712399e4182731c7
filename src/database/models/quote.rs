use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::table::Entity;
use crate::database::validation::{required, ValidationError};
use crate::types::PlanType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i32,
    pub plan_type: PlanType,
    pub template_id: i32,
    pub applicant_id: Option<i32>,
    pub group_id: Option<i32>,
    pub premium: Decimal,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewQuote {
    pub plan_type: PlanType,
    pub template_id: i32,
    pub applicant_id: Option<i32>,
    pub group_id: Option<i32>,
    pub premium: Decimal,
    pub status: QuoteStatus,
}

impl Entity for Quote {
    type New = NewQuote;
    const TABLE: &'static str = "quotes";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["plan_type", "template_id", "applicant_id", "group_id", "premium", "status"];
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateQuote {
    pub plan_type: Option<PlanType>,
    pub template_id: Option<i32>,
    pub applicant_id: Option<i32>,
    pub group_id: Option<i32>,
    pub premium: Option<Decimal>,
    pub status: Option<QuoteStatus>,
}

impl CreateQuote {
    /// Individual quotes name an applicant, group quotes name a group
    pub fn validate(self) -> Result<NewQuote, ValidationError> {
        let plan_type = required("plan_type", self.plan_type)?;
        let template_id = required("template_id", self.template_id)?;

        let (applicant_id, group_id) = match plan_type {
            PlanType::Individual => (Some(required("applicant_id", self.applicant_id)?), None),
            PlanType::Group => (None, Some(required("group_id", self.group_id)?)),
        };

        let premium = required("premium", self.premium)?;
        if premium.is_sign_negative() {
            return Err(ValidationError::Invalid {
                field: "premium",
                reason: "must not be negative".to_string(),
            });
        }

        Ok(NewQuote {
            plan_type,
            template_id,
            applicant_id,
            group_id,
            premium,
            status: self.status.unwrap_or(QuoteStatus::Draft),
        })
    }
}
