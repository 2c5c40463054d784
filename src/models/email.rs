use serde::Serialize;

/// A message handed to a [`crate::mail::Notifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Request body of the HTTP email API.
#[derive(Serialize)]
pub struct SendMailRequest<'a> {
    pub from: &'a str,
    pub to: &'a [String],
    #[serde(skip_serializing_if = "no_recipients")]
    pub cc: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<&'a str>,
    pub subject: &'a str,
    pub text: &'a str,
    pub html: &'a str,
}

fn no_recipients(list: &&[String]) -> bool {
    list.is_empty()
}
