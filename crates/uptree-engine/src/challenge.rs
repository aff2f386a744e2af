//! Challenge-code collaborator.
//!
//! Login flows present a short numeric challenge per session and require it
//! back on submit. The core only needs issue/verify semantics; rendering the
//! code to a human is the caller's problem.

use std::collections::HashMap;
use std::sync::Mutex;

use rand::Rng;

/// Issue and verify one-shot numeric challenges keyed by session.
pub trait ChallengeProvider: Send + Sync {
    /// Issue a fresh four-digit code for `session`, replacing any prior one.
    fn issue(&self, session: &str) -> u16;

    /// Verify and consume the code for `session`. A second verify with the
    /// same value fails — codes are one-shot.
    fn verify(&self, session: &str, value: u16) -> bool;
}

/// In-memory provider: a mutex-guarded map of outstanding codes.
#[derive(Default)]
pub struct InMemoryChallenges {
    outstanding: Mutex<HashMap<String, u16>>,
}

impl InMemoryChallenges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChallengeProvider for InMemoryChallenges {
    fn issue(&self, session: &str) -> u16 {
        let code = rand::thread_rng().gen_range(1000..=9999);
        if let Ok(mut map) = self.outstanding.lock() {
            map.insert(session.to_owned(), code);
        }
        code
    }

    fn verify(&self, session: &str, value: u16) -> bool {
        let Ok(mut map) = self.outstanding.lock() else {
            return false;
        };
        match map.get(session) {
            Some(expected) if *expected == value => {
                map.remove(session);
                true
            }
            _ => false,
        }
    }
}
