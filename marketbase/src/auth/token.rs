use super::clock::Clock;
use super::error::AuthError;
use super::models::PendingVerification;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::sync::Arc;

/// Verification links stay valid for one hour unless configured otherwise.
pub const DEFAULT_VERIFICATION_TTL_SECS: i64 = 3600;

const TOKEN_BYTES: usize = 32;

/// Generate a cryptographically secure random token (32 bytes, hex encoded)
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes[..]);

    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Issues single-use email verification tokens.
#[derive(Clone)]
pub struct TokenService {
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { ttl, clock }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// New token expiring `ttl` from now.
    pub fn issue(&self) -> Result<PendingVerification, AuthError> {
        let now = self.clock.now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            AuthError::ExpiryOutOfRange(format!("{} + {}s", now, self.ttl.num_seconds()))
        })?;

        Ok(PendingVerification {
            token: generate_token(),
            expires_at,
        })
    }

    /// A token is still usable at exactly its expiry instant.
    pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now > expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;

    #[test]
    fn test_generate_token() {
        let token1 = generate_token();
        let token2 = generate_token();

        // 32 bytes as hex
        assert_eq!(token1.len(), 64);
        assert_ne!(token1, token2);
        assert!(token1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_issue_sets_expiry_from_clock() {
        let start = Utc::now();
        let clock = Arc::new(ManualClock::new(start));
        let tokens = TokenService::new(Duration::seconds(DEFAULT_VERIFICATION_TTL_SECS), clock);

        let pending = tokens.issue().unwrap();

        assert_eq!(pending.expires_at, start + Duration::hours(1));
        assert_eq!(pending.token.len(), 64);
    }

    #[test]
    fn test_issue_rejects_expiry_past_max_datetime() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let tokens = TokenService::new(Duration::days(365 * 1_000_000), clock);

        let err = tokens.issue().unwrap_err();

        assert!(matches!(err, AuthError::ExpiryOutOfRange(_)));
    }

    #[test]
    fn test_is_expired_boundaries() {
        let expiry = Utc::now();

        assert!(!TokenService::is_expired(expiry, expiry - Duration::seconds(1)));
        assert!(!TokenService::is_expired(expiry, expiry));
        assert!(TokenService::is_expired(expiry, expiry + Duration::seconds(1)));
    }
}
