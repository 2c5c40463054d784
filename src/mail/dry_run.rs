use async_trait::async_trait;
use tracing::info;

use super::Notifier;
use crate::error::NotifierError;
use crate::models::email::OutgoingMail;

/// Writes mails to the log instead of delivering them. Used when no mail API
/// is configured, e.g. during local development.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Notifier for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifierError> {
        info!(
            to = ?mail.to,
            cc = ?mail.cc,
            subject = %mail.subject,
            "mail not delivered (no MAIL_API_URL configured):\n{}",
            mail.text
        );
        Ok(())
    }
}
