use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::database::table::Entity;
use crate::database::validation::{email, required_text, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewApplicant {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl Entity for Applicant {
    type New = NewApplicant;
    const TABLE: &'static str = "applicants";
    const INSERT_COLUMNS: &'static [&'static str] = &["first_name", "last_name", "email", "date_of_birth"];
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateApplicant {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl CreateApplicant {
    pub fn validate(self) -> Result<NewApplicant, ValidationError> {
        Ok(NewApplicant {
            first_name: required_text("first_name", self.first_name)?,
            last_name: required_text("last_name", self.last_name)?,
            email: email("email", self.email)?,
            date_of_birth: self.date_of_birth,
        })
    }
}
