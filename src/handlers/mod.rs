//! Cancellation workflow: intake of the form and confirmation of the
//! credential mailed back to the submitter.

pub mod confirm;
pub mod intake;
pub mod validation;

use std::sync::Arc;

use crate::clock::Clock;
use crate::mail::{MailComposer, Notifier};
use crate::store::CredentialStore;

/// Everything a request needs, shared across workers as `web::Data`.
pub struct Workflow {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    composer: MailComposer,
    notify_admin_on_intake: bool,
}

impl Workflow {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        composer: MailComposer,
        notify_admin_on_intake: bool,
    ) -> Self {
        Workflow {
            store,
            notifier,
            clock,
            composer,
            notify_admin_on_intake,
        }
    }
}
