pub mod dry_run;
pub mod http;
pub mod templates;

use async_trait::async_trait;

use crate::error::NotifierError;
use crate::models::email::OutgoingMail;

pub use dry_run::LogMailer;
pub use http::HttpMailer;
pub use templates::MailComposer;

/// Outbound mail transport. Callers invoke it at most once per event and
/// never retry a failed send.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifierError>;
}

#[cfg(test)]
pub use recording::RecordingNotifier;
