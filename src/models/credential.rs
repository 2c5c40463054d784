use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Which kind of secret is mailed to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Random UUID delivered as a confirmation link.
    Token,
    /// Six digit code typed back into the form.
    Code,
}

impl std::str::FromStr for CredentialKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(CredentialKind::Token),
            "code" => Ok(CredentialKind::Code),
            other => Err(format!("unknown credential kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    pub kind: CredentialKind,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// What a submitter hands back to prove control of their address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Token(String),
    Code { email: String, code: String },
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

/// Body of `POST /verify-code`. Codes are only six digits, so a pending code
/// is looked up by the address it was mailed to and then compared; `email`
/// must be the address given in the form (case and surrounding whitespace
/// are ignored). Wrong codes count against that request's attempt limit.
#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub email: String,
    pub code: String,
}

impl From<TokenQuery> for Presentation {
    fn from(query: TokenQuery) -> Self {
        Presentation::Token(query.token)
    }
}

impl From<CodeRequest> for Presentation {
    fn from(request: CodeRequest) -> Self {
        Presentation::Code {
            email: request.email,
            code: request.code,
        }
    }
}
