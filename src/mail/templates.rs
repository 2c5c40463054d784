use chrono::{DateTime, Local, NaiveDate, Utc};
use std::fmt::Write;
use url::Url;

use crate::models::credential::{CredentialKind, IssuedCredential};
use crate::models::email::OutgoingMail;
use crate::models::submission::Submission;

const DATE_FORMAT: &str = "%d.%m.%Y";
const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Builds the text and HTML bodies of every mail the service sends.
#[derive(Debug, Clone)]
pub struct MailComposer {
    organization: String,
    admin_email: String,
    verify_url: Url,
}

impl MailComposer {
    pub fn new(organization: String, admin_email: String, verify_url: Url) -> Self {
        MailComposer {
            organization,
            admin_email,
            verify_url,
        }
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// Mail asking the submitter to confirm, carrying either a link or a code.
    pub fn credential_request(
        &self,
        submission: &Submission,
        issued: &IssuedCredential,
        lifetime_minutes: i64,
    ) -> OutgoingMail {
        let greeting = format!("Dear {},", submission.full_name());
        let closing = format!("Kind regards\n{}", self.organization);

        let (instruction_text, instruction_html) = match issued.kind {
            CredentialKind::Token => {
                let mut link = self.verify_url.clone();
                link.query_pairs_mut().append_pair("token", &issued.value);
                (
                    format!(
                        "please confirm the cancellation of your membership using the link below:\n{}",
                        link
                    ),
                    format!(
                        "<p>please confirm the cancellation of your membership using the link below:</p>\
                         <p><a href=\"{0}\">{0}</a></p>",
                        escape_html(link.as_str())
                    ),
                )
            }
            CredentialKind::Code => (
                format!(
                    "please confirm the cancellation of your membership by entering this code:\n\n    {}",
                    issued.value
                ),
                format!(
                    "<p>please confirm the cancellation of your membership by entering this code:</p>\
                     <p style=\"font-size:1.5em;letter-spacing:0.2em\"><strong>{}</strong></p>",
                    escape_html(&issued.value)
                ),
            ),
        };

        let validity = format!("This request is valid for {} minutes.", lifetime_minutes);

        OutgoingMail {
            to: vec![submission.email.clone()],
            cc: Vec::new(),
            reply_to: Some(self.admin_email.clone()),
            subject: "Please confirm your membership cancellation".to_string(),
            text: format!("{greeting}\n\n{instruction_text}\n\n{validity}\n\n{closing}"),
            html: format!(
                "<p>{}</p>{}<p>{}</p><p>Kind regards<br>{}</p>",
                escape_html(&greeting),
                instruction_html,
                validity,
                escape_html(&self.organization)
            ),
        }
    }

    /// Heads-up for the office that a request arrived and awaits confirmation.
    pub fn pending_notice(&self, submission: &Submission) -> OutgoingMail {
        let details = Details::of(submission);
        OutgoingMail {
            to: vec![self.admin_email.clone()],
            cc: Vec::new(),
            reply_to: Some(submission.email.clone()),
            subject: "New membership cancellation (awaiting confirmation)".to_string(),
            text: format!(
                "A membership cancellation was submitted:\n\n{}\nStatus: awaiting confirmation",
                details.text()
            ),
            html: format!(
                "<p>A membership cancellation was submitted:</p>{}<p>Status: awaiting confirmation</p>",
                details.html()
            ),
        }
    }

    /// Final confirmation, sent to the member with the office in CC.
    pub fn confirmation(
        &self,
        submission: &Submission,
        confirmed_at: DateTime<Utc>,
    ) -> OutgoingMail {
        let details = Details::of(submission);
        let confirmed = confirmed_at
            .with_timezone(&Local)
            .format(DATE_TIME_FORMAT)
            .to_string();

        OutgoingMail {
            to: vec![submission.email.clone()],
            cc: vec![self.admin_email.clone()],
            reply_to: Some(self.admin_email.clone()),
            subject: "Membership cancellation confirmed".to_string(),
            text: format!(
                "Dear {},\n\nyour membership cancellation has been confirmed.\n\n{}\nConfirmed on: {}\n\nKind regards\n{}",
                submission.full_name(),
                details.text(),
                confirmed,
                self.organization
            ),
            html: format!(
                "<p>Dear {},</p><p>your membership cancellation has been confirmed.</p>{}\
                 <p>Confirmed on: {}</p><p>Kind regards<br>{}</p>",
                escape_html(&submission.full_name()),
                details.html(),
                confirmed,
                escape_html(&self.organization)
            ),
        }
    }
}

/// Label/value rows describing a submission; optional sections only appear
/// when they apply. The guardian section is for minors only.
struct Details {
    rows: Vec<(&'static str, String)>,
}

impl Details {
    fn of(submission: &Submission) -> Self {
        let mut rows = vec![
            ("Name", submission.full_name()),
            (
                "Birth date",
                format!("{} (age {})", date(submission.birth_date), submission.age),
            ),
            ("Email", submission.email.clone()),
            ("Phone", submission.phone.clone()),
        ];
        if let Some(end) = submission.cancellation_date {
            rows.push(("Cancellation date", date(end)));
        }
        if let Some(remark) = &submission.remark {
            rows.push(("Remark", remark.clone()));
        }
        if let Some(guardian) = submission.guardian.as_ref().filter(|_| submission.is_minor()) {
            rows.push(("Parent/guardian", guardian.name.clone()));
            if let Some(email) = &guardian.email {
                rows.push(("Parent/guardian email", email.clone()));
            }
        }
        Details { rows }
    }

    fn text(&self) -> String {
        let mut out = String::new();
        for (label, value) in &self.rows {
            let _ = writeln!(out, "{}: {}", label, value);
        }
        out
    }

    fn html(&self) -> String {
        let mut out = String::from("<table>");
        for (label, value) in &self.rows {
            let _ = write!(
                out,
                "<tr><th align=\"left\">{}</th><td>{}</td></tr>",
                label,
                escape_html(value)
            );
        }
        out.push_str("</table>");
        out
    }
}

fn date(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
