use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::Workflow;
use super::validation::validate;
use crate::error::WorkflowError;
use crate::models::credential::CredentialKind;
use crate::models::submission::SubmissionForm;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeReceipt {
    pub kind: CredentialKind,
    pub expires_at: DateTime<Utc>,
}

impl Workflow {
    /// Validates the form, issues a credential and mails it to the submitter.
    ///
    /// Returns only after the mail API has answered, so a failed delivery is
    /// reported to the caller instead of being lost.
    pub async fn intake(&self, form: SubmissionForm) -> Result<IntakeReceipt, WorkflowError> {
        let submission = validate(form, self.clock.today(), self.clock.now())?;

        let config = self.store.config();
        let issued = self.store.issue(submission.clone());
        info!(
            kind = ?issued.kind,
            age = submission.age,
            minor = submission.is_minor(),
            "cancellation received, credential issued"
        );

        let request = self.composer.credential_request(
            &submission,
            &issued,
            config.lifetime.num_minutes(),
        );
        if let Err(e) = self.notifier.send(&request).await {
            // the credential stays until the sweep drops it; nobody can redeem it
            error!("failed to mail credential to {}: {}", submission.email, e);
            return Err(e.into());
        }

        if self.notify_admin_on_intake {
            let notice = self.composer.pending_notice(&submission);
            if let Err(e) = self.notifier.send(&notice).await {
                warn!(
                    "failed to notify {} about a pending cancellation: {}",
                    self.composer.admin_email(),
                    e
                );
            }
        }

        Ok(IntakeReceipt {
            kind: issued.kind,
            expires_at: issued.expires_at,
        })
    }
}
