use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::table::Entity;
use crate::database::validation::{optional_text, positive, required, required_text, ValidationError};

/// An employer group being quoted for group coverage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i32,
    pub name: String,
    pub employer_ein: Option<String>,
    pub employee_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGroup {
    pub name: String,
    pub employer_ein: Option<String>,
    pub employee_count: i32,
}

impl Entity for Group {
    type New = NewGroup;
    const TABLE: &'static str = "groups";
    const INSERT_COLUMNS: &'static [&'static str] = &["name", "employer_ein", "employee_count"];
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateGroup {
    pub name: Option<String>,
    pub employer_ein: Option<String>,
    pub employee_count: Option<i32>,
}

impl CreateGroup {
    pub fn validate(self) -> Result<NewGroup, ValidationError> {
        Ok(NewGroup {
            name: required_text("name", self.name)?,
            employer_ein: optional_text(self.employer_ein),
            employee_count: positive("employee_count", required("employee_count", self.employee_count)?)?,
        })
    }
}
