use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use uuid::Uuid;

use super::{CredentialStore, StoreConfig};
use crate::clock::Clock;
use crate::error::VerificationFailure;
use crate::models::credential::{CredentialKind, IssuedCredential, Presentation};
use crate::models::submission::Submission;

struct PendingEntry {
    /// The code the submitter must type; `None` for tokens, where the map key
    /// is the secret itself.
    code: Option<String>,
    submission: Submission,
    created_at: DateTime<Utc>,
    attempts: u32,
}

/// Process-local store. Tokens are keyed by the token; codes are keyed by the
/// submitter's normalized email so attempts accumulate per pending request.
pub struct MemoryCredentialStore {
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, PendingEntry>>,
}

impl MemoryCredentialStore {
    pub fn new(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        MemoryCredentialStore {
            config,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // No operation leaves the map half-updated, so a poisoned lock is still
    // safe to use.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, PendingEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup_key(&self, presentation: &Presentation) -> Option<String> {
        match (self.config.kind, presentation) {
            (CredentialKind::Token, Presentation::Token(token)) => Some(token.trim().to_string()),
            (CredentialKind::Code, Presentation::Code { email, .. }) => {
                Some(normalize_email(email))
            }
            _ => None,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn random_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32))
}

impl CredentialStore for MemoryCredentialStore {
    fn config(&self) -> StoreConfig {
        self.config
    }

    fn issue(&self, submission: Submission) -> IssuedCredential {
        let created_at = self.clock.now();
        let mut entries = self.entries();

        let (key, value, code) = match self.config.kind {
            CredentialKind::Token => {
                let token = loop {
                    let candidate = Uuid::new_v4().to_string();
                    if !entries.contains_key(&candidate) {
                        break candidate;
                    }
                };
                (token.clone(), token, None)
            }
            CredentialKind::Code => {
                let code = random_code();
                (normalize_email(&submission.email), code.clone(), Some(code))
            }
        };

        let replaced = entries.insert(
            key,
            PendingEntry {
                code,
                submission,
                created_at,
                attempts: 0,
            },
        );
        if replaced.is_some() {
            warn!("replaced an outstanding code for a repeated submission");
        }

        IssuedCredential {
            kind: self.config.kind,
            value,
            expires_at: created_at + self.config.lifetime,
        }
    }

    fn redeem(&self, presentation: &Presentation) -> Result<Submission, VerificationFailure> {
        let key = self
            .lookup_key(presentation)
            .ok_or(VerificationFailure::NotFound)?;
        let now = self.clock.now();
        let mut entries = self.entries();

        let entry = entries
            .get_mut(&key)
            .ok_or(VerificationFailure::NotFound)?;

        if now - entry.created_at > self.config.lifetime {
            entries.remove(&key);
            return Err(VerificationFailure::Expired);
        }

        if let Presentation::Code { code, .. } = presentation {
            entry.attempts += 1;
            if entry.attempts > self.config.max_attempts {
                entries.remove(&key);
                return Err(VerificationFailure::AttemptsExhausted);
            }
            if entry.code.as_deref() != Some(code.trim()) {
                return Err(VerificationFailure::WrongCode {
                    remaining: self.config.max_attempts - entry.attempts,
                });
            }
        }

        entries
            .remove(&key)
            .map(|entry| entry.submission)
            .ok_or(VerificationFailure::NotFound)
    }

    fn sweep(&self, now: DateTime<Utc>) -> usize {
        let lifetime = self.config.lifetime;
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.created_at <= lifetime);
        let removed = before - entries.len();
        if removed > 0 {
            info!(removed, remaining = entries.len(), "swept expired credentials");
        }
        removed
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, NaiveDate, TimeZone};
    use std::sync::Barrier;
    use std::thread;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap(),
        ))
    }

    fn submission(email: &str) -> Submission {
        Submission {
            first_name: "Lena".to_string(),
            last_name: "Hofmann".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 3, 2).unwrap(),
            email: email.to_string(),
            phone: "+49 170 1234567".to_string(),
            remark: None,
            guardian: None,
            cancellation_date: None,
            age: 35,
            received_at: Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap(),
        }
    }

    fn store(kind: CredentialKind, clock: Arc<ManualClock>) -> MemoryCredentialStore {
        MemoryCredentialStore::new(
            StoreConfig {
                kind,
                lifetime: Duration::minutes(30),
                max_attempts: 5,
            },
            clock,
        )
    }

    fn code_for(issued: &IssuedCredential, email: &str) -> Presentation {
        Presentation::Code {
            email: email.to_string(),
            code: issued.value.clone(),
        }
    }

    #[test]
    fn token_redeems_exactly_once() {
        let store = store(CredentialKind::Token, clock());
        let issued = store.issue(submission("lena@example.org"));
        assert!(Uuid::parse_str(&issued.value).is_ok());

        let token = Presentation::Token(issued.value.clone());
        let redeemed = store.redeem(&token).unwrap();
        assert_eq!(redeemed.email, "lena@example.org");
        assert_eq!(store.redeem(&token), Err(VerificationFailure::NotFound));
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_token_is_not_found() {
        let store = store(CredentialKind::Token, clock());
        store.issue(submission("lena@example.org"));
        let result = store.redeem(&Presentation::Token(Uuid::new_v4().to_string()));
        assert_eq!(result, Err(VerificationFailure::NotFound));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn expired_token_is_removed() {
        let clock = clock();
        let store = store(CredentialKind::Token, clock.clone());
        let issued = store.issue(submission("lena@example.org"));
        assert_eq!(issued.expires_at, clock.now() + Duration::minutes(30));

        clock.advance(Duration::minutes(30) + Duration::seconds(1));
        let token = Presentation::Token(issued.value);
        assert_eq!(store.redeem(&token), Err(VerificationFailure::Expired));
        assert_eq!(store.redeem(&token), Err(VerificationFailure::NotFound));
    }

    #[test]
    fn token_is_still_valid_at_the_edge_of_the_window() {
        let clock = clock();
        let store = store(CredentialKind::Token, clock.clone());
        let issued = store.issue(submission("lena@example.org"));

        clock.advance(Duration::minutes(30));
        assert!(store.redeem(&Presentation::Token(issued.value)).is_ok());
    }

    #[test]
    fn code_is_six_digits() {
        let store = store(CredentialKind::Code, clock());
        for i in 0..50 {
            let issued = store.issue(submission(&format!("m{}@example.org", i)));
            assert_eq!(issued.value.len(), 6);
            assert!(issued.value.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn code_matches_email_case_insensitively() {
        let store = store(CredentialKind::Code, clock());
        let issued = store.issue(submission("Lena@Example.org"));
        let result = store.redeem(&code_for(&issued, " lena@example.ORG "));
        assert!(result.is_ok());
    }

    #[test]
    fn wrong_code_keeps_entry_and_counts_down() {
        let store = store(CredentialKind::Code, clock());
        let issued = store.issue(submission("lena@example.org"));
        let wrong = wrong_code(&issued.value);

        let attempt = Presentation::Code {
            email: "lena@example.org".to_string(),
            code: wrong,
        };
        assert_eq!(
            store.redeem(&attempt),
            Err(VerificationFailure::WrongCode { remaining: 4 })
        );
        assert_eq!(store.len(), 1);
        assert!(store.redeem(&code_for(&issued, "lena@example.org")).is_ok());
    }

    #[test]
    fn sixth_attempt_exhausts_the_code() {
        let store = store(CredentialKind::Code, clock());
        let issued = store.issue(submission("lena@example.org"));
        let attempt = Presentation::Code {
            email: "lena@example.org".to_string(),
            code: wrong_code(&issued.value),
        };

        for remaining in (0..5).rev() {
            assert_eq!(
                store.redeem(&attempt),
                Err(VerificationFailure::WrongCode { remaining })
            );
        }
        // even the right code is refused once the limit is hit
        let right = code_for(&issued, "lena@example.org");
        assert_eq!(
            store.redeem(&right),
            Err(VerificationFailure::AttemptsExhausted)
        );
        assert_eq!(store.redeem(&right), Err(VerificationFailure::NotFound));
        assert!(store.is_empty());
    }

    #[test]
    fn resubmission_replaces_outstanding_code() {
        let store = store(CredentialKind::Code, clock());
        let first = store.issue(submission("lena@example.org"));
        let mut second = store.issue(submission("lena@example.org"));
        while second.value == first.value {
            second = store.issue(submission("lena@example.org"));
        }
        assert_eq!(store.len(), 1);

        assert!(matches!(
            store.redeem(&code_for(&first, "lena@example.org")),
            Err(VerificationFailure::WrongCode { .. })
        ));
        assert!(store.redeem(&code_for(&second, "lena@example.org")).is_ok());
    }

    #[test]
    fn presentation_of_the_other_kind_is_not_found() {
        let store = store(CredentialKind::Code, clock());
        store.issue(submission("lena@example.org"));
        let result = store.redeem(&Presentation::Token("lena@example.org".to_string()));
        assert_eq!(result, Err(VerificationFailure::NotFound));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sweep_removes_only_stale_entries() {
        let clock = clock();
        let store = store(CredentialKind::Token, clock.clone());
        let stale = store.issue(submission("old@example.org"));
        clock.advance(Duration::minutes(20));
        let fresh = store.issue(submission("new@example.org"));
        clock.advance(Duration::minutes(11));

        assert_eq!(store.sweep(clock.now()), 1);
        assert_eq!(
            store.redeem(&Presentation::Token(stale.value)),
            Err(VerificationFailure::NotFound)
        );
        assert!(store.redeem(&Presentation::Token(fresh.value)).is_ok());
    }

    #[test]
    fn concurrent_redeem_has_a_single_winner() {
        const CONTENDERS: usize = 8;

        for _ in 0..100 {
            let store = store(CredentialKind::Token, clock());
            let token = Presentation::Token(store.issue(submission("lena@example.org")).value);
            let barrier = Barrier::new(CONTENDERS);

            let results: Vec<_> = thread::scope(|scope| {
                let handles: Vec<_> = (0..CONTENDERS)
                    .map(|_| {
                        scope.spawn(|| {
                            barrier.wait();
                            store.redeem(&token)
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            let winners = results.iter().filter(|r| r.is_ok()).count();
            assert_eq!(winners, 1);
            assert!(
                results
                    .iter()
                    .filter_map(|r| r.as_ref().err())
                    .all(|e| *e == VerificationFailure::NotFound)
            );
        }
    }

    #[test]
    fn concurrent_code_attempts_never_exceed_the_limit() {
        let store = store(CredentialKind::Code, clock());
        let issued = store.issue(submission("lena@example.org"));
        let wrong = Presentation::Code {
            email: "lena@example.org".to_string(),
            code: wrong_code(&issued.value),
        };
        let barrier = Barrier::new(10);

        let results: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..10)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        store.redeem(&wrong)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let wrong_count = results
            .iter()
            .filter(|r| matches!(r, Err(VerificationFailure::WrongCode { .. })))
            .count();
        let exhausted = results
            .iter()
            .filter(|r| **r == Err(VerificationFailure::AttemptsExhausted))
            .count();
        assert_eq!(wrong_count, 5);
        assert_eq!(exhausted, 1);
        assert!(store.is_empty());
    }

    fn wrong_code(code: &str) -> String {
        let n: u32 = code.parse().unwrap();
        format!("{:06}", (n + 1) % 1_000_000)
    }
}
