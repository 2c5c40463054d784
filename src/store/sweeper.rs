use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::info;

use super::CredentialStore;
use crate::clock::Clock;

/// Periodically drops expired credentials. Redemption checks expiry on its
/// own, so this only reclaims memory. The task lives until the process exits.
pub fn spawn_sweeper(
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    every: Duration,
) -> JoinHandle<()> {
    info!("sweeping credentials every {:?}", every);

    tokio::spawn(async move {
        let mut ticker = interval(every);
        loop {
            ticker.tick().await;
            store.sweep(clock.now());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::VerificationFailure;
    use crate::models::credential::{CredentialKind, Presentation};
    use crate::models::submission::Submission;
    use crate::store::{MemoryCredentialStore, StoreConfig};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn submission() -> Submission {
        Submission {
            first_name: "Jonas".to_string(),
            last_name: "Weber".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1985, 11, 30).unwrap(),
            email: "jonas@example.org".to_string(),
            phone: "0621 123456".to_string(),
            remark: None,
            guardian: None,
            cancellation_date: None,
            age: 39,
            received_at: Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn background_sweep_reclaims_expired_credentials() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap(),
        ));
        let store = Arc::new(MemoryCredentialStore::new(
            StoreConfig {
                kind: CredentialKind::Token,
                lifetime: chrono::Duration::minutes(10),
                max_attempts: 5,
            },
            clock.clone(),
        ));
        let issued = store.issue(submission());

        let handle = spawn_sweeper(store.clone(), clock.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.len(), 1);

        clock.advance(chrono::Duration::minutes(11));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(store.is_empty());
        assert_eq!(
            store.redeem(&Presentation::Token(issued.value)),
            Err(VerificationFailure::NotFound)
        );

        handle.abort();
    }
}
