use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

pub const AGE_OF_MAJORITY: u32 = 18;

/// Raw cancellation form as posted by the browser. Every field is optional
/// here so that missing and blank values are reported the same way.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SubmissionForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub remark: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_email: Option<String>,
    pub cancellation_date: Option<String>,
}

/// A validated cancellation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: String,
    pub phone: String,
    pub remark: Option<String>,
    pub guardian: Option<Guardian>,
    pub cancellation_date: Option<NaiveDate>,
    /// Exact years elapsed between `birth_date` and the intake date.
    pub age: u32,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Guardian {
    pub name: String,
    pub email: Option<String>,
}

impl Submission {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_minor(&self) -> bool {
        self.age < AGE_OF_MAJORITY
    }
}
