use chrono::{DateTime, Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;
use crate::models::submission::{AGE_OF_MAJORITY, Guardian, Submission, SubmissionForm};

/// `local@domain.tld` shape, nothing stricter.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Exact years elapsed: the birthday has to have been reached this year.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Turns a raw form into a [`Submission`], or says what is wrong with it.
pub fn validate(
    form: SubmissionForm,
    today: NaiveDate,
    received_at: DateTime<Utc>,
) -> Result<Submission, ValidationError> {
    let first_name = required(form.first_name, "first_name")?;
    let last_name = required(form.last_name, "last_name")?;
    let birth_date_raw = required(form.birth_date, "birth_date")?;
    let email = required(form.email, "email")?;
    let phone = required(form.phone, "phone")?;

    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail("email"));
    }

    let birth_date = parse_date(&birth_date_raw, "birth_date")?;
    if birth_date > today {
        return Err(ValidationError::BirthDateInFuture);
    }
    let cancellation_date = optional(form.cancellation_date)
        .map(|raw| parse_date(&raw, "cancellation_date"))
        .transpose()?;

    let age = age_on(birth_date, today);

    let guardian_email = optional(form.guardian_email);
    if let Some(address) = &guardian_email {
        if !is_valid_email(address) {
            return Err(ValidationError::InvalidEmail("guardian_email"));
        }
    }
    let guardian = optional(form.guardian_name).map(|name| Guardian {
        name,
        email: guardian_email,
    });
    if age < AGE_OF_MAJORITY && guardian.is_none() {
        return Err(ValidationError::GuardianRequired);
    }

    Ok(Submission {
        first_name,
        last_name,
        birth_date,
        email,
        phone,
        remark: optional(form.remark),
        guardian,
        cancellation_date,
        age,
        received_at,
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    optional(value).ok_or(ValidationError::MissingField(field))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(raw: &str, field: &'static str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}
