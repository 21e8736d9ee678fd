use super::models::{Role, SellerId};
use super::token::generate_token;
use chrono::{DateTime, Duration, Utc};

/// Opaque handle a client presents to prove its session, a secure random string
pub type SessionHandle = String;

/// What a session handle is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    pub handle: SessionHandle,
    pub seller_id: SellerId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionBinding {
    pub fn new(handle: SessionHandle, seller_id: SellerId, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            handle,
            seller_id,
            role,
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Remaining lifetime, zero once expired
    pub fn remaining_ttl(&self) -> Duration {
        (self.expires_at - Utc::now()).max(Duration::zero())
    }
}

/// Generate a fresh session handle
pub fn generate_session_handle() -> SessionHandle {
    generate_token()
}
