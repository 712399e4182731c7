use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::database::table::Entity;
use crate::database::validation::{email, optional_text, required_text, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl Entity for Customer {
    type New = NewCustomer;
    const TABLE: &'static str = "customers";
    const INSERT_COLUMNS: &'static [&'static str] = &["first_name", "last_name", "email", "phone", "date_of_birth"];
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateCustomer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl CreateCustomer {
    pub fn validate(self) -> Result<NewCustomer, ValidationError> {
        Ok(NewCustomer {
            first_name: required_text("first_name", self.first_name)?,
            last_name: required_text("last_name", self.last_name)?,
            email: email("email", self.email)?,
            phone: optional_text(self.phone),
            date_of_birth: self.date_of_birth,
        })
    }
}
