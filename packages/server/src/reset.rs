use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;

/// A pending forgot-password exchange for one email address.
#[derive(Clone)]
struct ResetEntry {
    code: String,
    /// Set once the code has been checked via the validate endpoint.
    /// A code validates successfully at most once.
    validated: bool,
    expires_at: DateTime<Utc>,
}

/// Process-lifetime store of forgot-password codes, keyed by email.
///
/// Entries are lost on restart (deliberate: this is not a durable store) and
/// expire after the configured TTL. Regenerating a code for an email replaces
/// any previous entry.
pub struct ResetCodeStore {
    entries: DashMap<String, ResetEntry>,
    ttl: Duration,
}

impl ResetCodeStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Generate and store a fresh 6-digit code for `email`, returning it.
    pub fn generate(&self, email: &str) -> String {
        let code = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
        self.entries.insert(
            email.to_owned(),
            ResetEntry {
                code: code.clone(),
                validated: false,
                expires_at: Utc::now() + self.ttl,
            },
        );
        code
    }

    /// Check `code` against the entry for `email` and mark it validated.
    ///
    /// Returns `false` for an unknown email, a wrong code, an expired entry,
    /// or a code that has already been validated.
    pub fn validate(&self, email: &str, code: &str) -> bool {
        match self.entries.get_mut(email) {
            Some(mut entry) => {
                if entry.expires_at < Utc::now() {
                    drop(entry);
                    self.entries.remove(email);
                    return false;
                }
                if entry.validated || entry.code != code {
                    return false;
                }
                entry.validated = true;
                true
            }
            None => false,
        }
    }

    /// Consume a validated entry by its code, returning the email it belongs
    /// to. Used by the final reset-password step; the entry is removed so a
    /// code can reset a password at most once.
    pub fn consume(&self, code: &str) -> Option<String> {
        let email = self.entries.iter().find_map(|entry| {
            (entry.validated && entry.code == code && entry.expires_at >= Utc::now())
                .then(|| entry.key().clone())
        })?;
        self.entries.remove(&email);
        Some(email)
    }
}
