use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A submission that passed validation: trimmed, HTML-escaped, phone normalized.
/// Optional fields are empty strings, never absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanedApplication {
    pub first_name: String,
    pub last_name: String,
    pub patronymic: String,
    pub birth_date: NaiveDate,
    pub email: String,
    pub phone: String,
    pub marital_status: String,
    pub about: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: String,
    pub email: String,
    pub phone: String,
    pub marital_status: String,
    pub about_request: String,
    pub birthdate: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRow {
    /// The cleaned values this row was inserted from.
    pub fn to_cleaned(&self) -> CleanedApplication {
        CleanedApplication {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            patronymic: self.patronymic.clone(),
            birth_date: self.birthdate,
            email: self.email.clone(),
            phone: self.phone.clone(),
            marital_status: self.marital_status.clone(),
            about: self.about_request.clone(),
        }
    }
}
