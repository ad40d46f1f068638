use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::{Months, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::application::messages;
use crate::application::models::CleanedApplication;
use crate::application::rules::{
    Field, ABOUT_MAX_LENGTH, EMAIL_MAX_LENGTH, MARITAL_STATUSES, MARITAL_STATUS_MAX_LENGTH,
    MAX_AGE_YEARS, MIN_AGE_YEARS, NAME_MAX_LENGTH, PHONE_MAX_LENGTH,
};
use crate::application::sanitize::{char_len, normalize_phone, sanitize};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
    )
    .expect("email regex is valid")
});

/// Country codes accepted for the phone field with the number of digits that
/// must follow each one.
pub const PHONE_COUNTRY_CODES: &[(&str, usize)] = &[("+375", 9), ("+7", 10)];

/// Why a single field was rejected. Carries the data a message needs;
/// the text itself lives in `messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    Required,
    TooLong { max: usize },
    InvalidDate,
    TooOld { earliest: NaiveDate },
    TooYoung { min_age: u32 },
    InvalidEmail,
    PhonePrefix,
    PhoneDigits { country_code: &'static str, digits: usize },
    NotAllowed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    #[serde(flatten)]
    pub violation: Violation,
}

impl FieldError {
    pub fn message(&self) -> String {
        messages::violation_message(self.field, &self.violation)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Validates and sanitizes a raw submission.
///
/// Every field is checked independently; the error list holds at most one entry
/// per field, in form order. Missing keys count as empty strings. `today` anchors
/// the age window.
pub fn validate_application(
    raw: &HashMap<String, String>,
    today: NaiveDate,
) -> Result<CleanedApplication, Vec<FieldError>> {
    let value = |field: Field| raw.get(field.form_key()).map(String::as_str).unwrap_or("");
    let mut errors = Vec::new();

    let first_name = collect(
        Field::FirstName,
        required_text(value(Field::FirstName), NAME_MAX_LENGTH),
        &mut errors,
    );
    let last_name = collect(
        Field::LastName,
        required_text(value(Field::LastName), NAME_MAX_LENGTH),
        &mut errors,
    );
    let patronymic = collect(
        Field::Patronymic,
        optional_text(value(Field::Patronymic), NAME_MAX_LENGTH),
        &mut errors,
    );
    let birth_date = collect(
        Field::BirthDate,
        validate_birth_date(value(Field::BirthDate), today),
        &mut errors,
    );
    let email = collect(Field::Email, validate_email(value(Field::Email)), &mut errors);
    let phone = collect(Field::Phone, validate_phone(value(Field::Phone)), &mut errors);
    let marital_status = collect(
        Field::MaritalStatus,
        validate_marital_status(value(Field::MaritalStatus)),
        &mut errors,
    );
    let about = collect(
        Field::About,
        optional_text(value(Field::About), ABOUT_MAX_LENGTH),
        &mut errors,
    );

    match (
        first_name,
        last_name,
        patronymic,
        birth_date,
        email,
        phone,
        marital_status,
        about,
    ) {
        (
            Some(first_name),
            Some(last_name),
            Some(patronymic),
            Some(birth_date),
            Some(email),
            Some(phone),
            Some(marital_status),
            Some(about),
        ) if errors.is_empty() => Ok(CleanedApplication {
            first_name,
            last_name,
            patronymic,
            birth_date,
            email,
            phone,
            marital_status,
            about,
        }),
        _ => Err(errors),
    }
}

fn collect<T>(
    field: Field,
    result: Result<T, Violation>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(violation) => {
            errors.push(FieldError { field, violation });
            None
        }
    }
}

fn required_text(raw: &str, max: usize) -> Result<String, Violation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Violation::Required);
    }
    if char_len(trimmed) > max {
        return Err(Violation::TooLong { max });
    }
    Ok(sanitize(trimmed))
}

fn optional_text(raw: &str, max: usize) -> Result<String, Violation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if char_len(trimmed) > max {
        return Err(Violation::TooLong { max });
    }
    Ok(sanitize(trimmed))
}

/// Earliest and latest birth dates that fall inside the accepted age window,
/// both inclusive.
pub fn birth_date_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let earliest = today
        .checked_sub_months(Months::new(12 * MAX_AGE_YEARS))
        .unwrap_or(NaiveDate::MIN);
    let latest = today
        .checked_sub_months(Months::new(12 * MIN_AGE_YEARS))
        .unwrap_or(NaiveDate::MIN);
    (earliest, latest)
}

/// Parses a strict `YYYY-MM-DD` calendar date; `2023-02-30` is rejected.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let well_formed = [(year, 4), (month, 2), (day, 2)]
        .iter()
        .all(|(part, len)| part.len() == *len && part.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return None;
    }

    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn validate_birth_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, Violation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Violation::Required);
    }

    let date = parse_calendar_date(trimmed).ok_or(Violation::InvalidDate)?;
    let (earliest, latest) = birth_date_window(today);
    if date < earliest {
        return Err(Violation::TooOld { earliest });
    }
    if date > latest {
        return Err(Violation::TooYoung {
            min_age: MIN_AGE_YEARS,
        });
    }
    Ok(date)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

fn validate_email(raw: &str) -> Result<String, Violation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if !is_valid_email(trimmed) {
        return Err(Violation::InvalidEmail);
    }
    if char_len(trimmed) > EMAIL_MAX_LENGTH {
        return Err(Violation::TooLong {
            max: EMAIL_MAX_LENGTH,
        });
    }
    Ok(sanitize(trimmed))
}

/// Checks a normalized phone number against the accepted country codes.
pub fn check_phone_digits(normalized: &str) -> Result<(), Violation> {
    let (country_code, digits) = PHONE_COUNTRY_CODES
        .iter()
        .find(|(code, _)| normalized.starts_with(code))
        .copied()
        .ok_or(Violation::PhonePrefix)?;

    let rest = &normalized[country_code.len()..];
    if rest.len() != digits || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Violation::PhoneDigits {
            country_code,
            digits,
        });
    }
    Ok(())
}

fn validate_phone(raw: &str) -> Result<String, Violation> {
    if raw.trim().is_empty() {
        return Err(Violation::Required);
    }

    let normalized = normalize_phone(raw);
    check_phone_digits(&normalized)?;
    if char_len(raw) > PHONE_MAX_LENGTH {
        return Err(Violation::TooLong {
            max: PHONE_MAX_LENGTH,
        });
    }
    Ok(normalized)
}

fn validate_marital_status(raw: &str) -> Result<String, Violation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Violation::Required);
    }
    if char_len(trimmed) > MARITAL_STATUS_MAX_LENGTH {
        return Err(Violation::TooLong {
            max: MARITAL_STATUS_MAX_LENGTH,
        });
    }
    if !MARITAL_STATUSES.contains(&trimmed) {
        return Err(Violation::NotAllowed);
    }
    Ok(sanitize(trimmed))
}
