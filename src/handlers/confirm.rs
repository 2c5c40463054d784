use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::Workflow;
use crate::error::WorkflowError;
use crate::models::credential::Presentation;
use crate::models::submission::Submission;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmReceipt {
    pub submission: Submission,
    pub confirmed_at: DateTime<Utc>,
}

impl Workflow {
    /// Redeems the credential and sends the single confirmation mail.
    ///
    /// The credential is consumed before the mail goes out. If delivery then
    /// fails the confirmation mail is lost for good; that is logged and
    /// reported, never retried.
    pub async fn confirm(
        &self,
        presentation: Presentation,
    ) -> Result<ConfirmReceipt, WorkflowError> {
        let submission = match self.store.redeem(&presentation) {
            Ok(submission) => submission,
            Err(failure) => {
                info!("verification refused: {}", failure);
                return Err(failure.into());
            }
        };

        let confirmed_at = self.clock.now();
        let mail = self.composer.confirmation(&submission, confirmed_at);
        if let Err(e) = self.notifier.send(&mail).await {
            error!(
                "cancellation for {} confirmed but the confirmation mail was lost: {}",
                submission.email, e
            );
            return Err(e.into());
        }

        info!(age = submission.age, "cancellation confirmed");
        Ok(ConfirmReceipt {
            submission,
            confirmed_at,
        })
    }
}
