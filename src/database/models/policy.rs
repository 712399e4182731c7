use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::table::Entity;
use crate::database::validation::{positive, required, required_text, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyStatus {
    Active,
    Lapsed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualPolicy {
    pub id: i32,
    pub customer_id: i32,
    pub policy_number: String,
    pub template_id: i32,
    pub premium: Decimal,
    pub status: PolicyStatus,
    pub effective_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewIndividualPolicy {
    pub customer_id: i32,
    pub policy_number: String,
    pub template_id: i32,
    pub premium: Decimal,
    pub status: PolicyStatus,
    pub effective_date: NaiveDate,
}

impl Entity for IndividualPolicy {
    type New = NewIndividualPolicy;
    const TABLE: &'static str = "individual_policies";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["customer_id", "policy_number", "template_id", "premium", "status", "effective_date"];
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateIndividualPolicy {
    pub customer_id: Option<i32>,
    pub policy_number: Option<String>,
    pub template_id: Option<i32>,
    pub premium: Option<Decimal>,
    pub status: Option<PolicyStatus>,
    pub effective_date: Option<NaiveDate>,
}

impl CreateIndividualPolicy {
    pub fn validate(self) -> Result<NewIndividualPolicy, ValidationError> {
        Ok(NewIndividualPolicy {
            customer_id: required("customer_id", self.customer_id)?,
            policy_number: required_text("policy_number", self.policy_number)?,
            template_id: required("template_id", self.template_id)?,
            premium: non_negative("premium", required("premium", self.premium)?)?,
            status: self.status.unwrap_or(PolicyStatus::Active),
            effective_date: required("effective_date", self.effective_date)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPolicy {
    pub id: i32,
    pub group_name: String,
    pub policy_number: String,
    pub template_id: i32,
    pub premium: Decimal,
    pub employee_count: i32,
    pub status: PolicyStatus,
    pub effective_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGroupPolicy {
    pub group_name: String,
    pub policy_number: String,
    pub template_id: i32,
    pub premium: Decimal,
    pub employee_count: i32,
    pub status: PolicyStatus,
    pub effective_date: NaiveDate,
}

impl Entity for GroupPolicy {
    type New = NewGroupPolicy;
    const TABLE: &'static str = "group_policies";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "group_name",
        "policy_number",
        "template_id",
        "premium",
        "employee_count",
        "status",
        "effective_date",
    ];
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateGroupPolicy {
    pub group_name: Option<String>,
    pub policy_number: Option<String>,
    pub template_id: Option<i32>,
    pub premium: Option<Decimal>,
    pub employee_count: Option<i32>,
    pub status: Option<PolicyStatus>,
    pub effective_date: Option<NaiveDate>,
}

impl CreateGroupPolicy {
    pub fn validate(self) -> Result<NewGroupPolicy, ValidationError> {
        Ok(NewGroupPolicy {
            group_name: required_text("group_name", self.group_name)?,
            policy_number: required_text("policy_number", self.policy_number)?,
            template_id: required("template_id", self.template_id)?,
            premium: non_negative("premium", required("premium", self.premium)?)?,
            employee_count: positive("employee_count", required("employee_count", self.employee_count)?)?,
            status: self.status.unwrap_or(PolicyStatus::Active),
            effective_date: required("effective_date", self.effective_date)?,
        })
    }
}

fn non_negative(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::Invalid {
            field,
            reason: "must not be negative".to_string(),
        });
    }
    Ok(value)
}

/// Both policy tables, as returned by `GET /api/policies`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyBook {
    pub individual: Vec<IndividualPolicy>,
    pub group: Vec<GroupPolicy>,
}
