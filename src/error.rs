use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::models::response::ApiResponse;

/// Intake rejected before any credential was minted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field missing: {0}")]
    MissingField(&'static str),
    #[error("invalid email address in {0}")]
    InvalidEmail(&'static str),
    #[error("invalid date in {field}: {value}")]
    InvalidDate { field: &'static str, value: String },
    #[error("birth date lies in the future")]
    BirthDateInFuture,
    #[error("guardian required for members under 18")]
    GuardianRequired,
}

/// Why a presented credential was not accepted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("credential not found")]
    NotFound,
    #[error("credential expired")]
    Expired,
    #[error("too many attempts")]
    AttemptsExhausted,
    #[error("wrong code, {remaining} attempts remaining")]
    WrongCode { remaining: u32 },
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("mail transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail api rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Verification(#[from] VerificationFailure),
    #[error("notification failed: {0}")]
    Notifier(#[from] NotifierError),
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::MissingField(_) => "Required fields are missing.".to_string(),
            ValidationError::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            ValidationError::InvalidDate { .. } => {
                "Please enter dates in the format YYYY-MM-DD.".to_string()
            }
            ValidationError::BirthDateInFuture => {
                "The birth date must not lie in the future.".to_string()
            }
            ValidationError::GuardianRequired => {
                "A parent or guardian must be named for members under 18.".to_string()
            }
        }
    }
}

impl VerificationFailure {
    // NotFound, Expired and AttemptsExhausted share one text so a caller
    // cannot tell which of them applies.
    pub fn user_message(&self) -> String {
        match self {
            VerificationFailure::WrongCode { remaining } => format!(
                "The code is incorrect. {} attempt(s) remaining.",
                remaining
            ),
            _ => "This link or code is invalid or has expired. Please submit the form again."
                .to_string(),
        }
    }
}

impl WorkflowError {
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::Validation(e) => e.user_message(),
            WorkflowError::Verification(e) => e.user_message(),
            WorkflowError::Notifier(_) => {
                "The email could not be sent. Please try again later.".to_string()
            }
        }
    }
}

impl ResponseError for WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::Validation(_) | WorkflowError::Verification(_) => {
                StatusCode::BAD_REQUEST
            }
            WorkflowError::Notifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::failed(self.user_message()))
    }
}
