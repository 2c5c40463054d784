//! Outstanding verification credentials.
//!
//! The [`CredentialStore`] trait is the only way the rest of the service
//! touches pending credentials. Every method is atomic with respect to the
//! others, so a credential can be redeemed at most once no matter how many
//! requests present it concurrently.

pub mod memory;
pub mod sweeper;

use chrono::{DateTime, Duration, Utc};

use crate::error::VerificationFailure;
use crate::models::credential::{CredentialKind, IssuedCredential, Presentation};
use crate::models::submission::Submission;

pub use memory::MemoryCredentialStore;
pub use sweeper::spawn_sweeper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub kind: CredentialKind,
    /// How long an issued credential stays redeemable.
    pub lifetime: Duration,
    /// Code mode only; the attempt after this many is refused.
    pub max_attempts: u32,
}

pub trait CredentialStore: Send + Sync {
    fn config(&self) -> StoreConfig;

    /// Mints a credential bound to a snapshot of `submission`.
    fn issue(&self, submission: Submission) -> IssuedCredential;

    /// Consumes the credential and hands back its submission.
    ///
    /// The entry is gone before this returns `Ok`, so nothing that happens
    /// afterwards can make the same credential succeed twice.
    fn redeem(&self, presentation: &Presentation) -> Result<Submission, VerificationFailure>;

    /// Drops every entry older than the lifetime window and returns how many
    /// were removed.
    fn sweep(&self, now: DateTime<Utc>) -> usize;

    fn len(&self) -> usize;

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
