use super::models::{Role, SellerId};
use super::session::{SessionBinding, SessionHandle};
use super::session_store::SessionBinder;
use async_trait::async_trait;
use moka::future::Cache;
use shared::Result;
use std::time::Duration;
use tracing::warn;

/// Longest binding lifetime accepted, well inside moka's own limit
const MAX_SESSION_TTL: Duration = Duration::from_secs(100 * 365 * 86_400);

/// Moka-based in-memory session mechanism, local to one process
pub struct MokaSessionRepository {
    bindings: Cache<SessionHandle, SessionBinding>,
    ttl: chrono::Duration,
}

impl MokaSessionRepository {
    /// Create a session repository with optional capacity and the lifetime of each binding
    pub fn new(max_sessions: Option<u64>, ttl: Duration) -> Self {
        let mut builder = Cache::builder();
        let ttl = if ttl > MAX_SESSION_TTL {
            warn!(
                requested_secs = ttl.as_secs(),
                "session ttl clamped to {}s",
                MAX_SESSION_TTL.as_secs()
            );
            MAX_SESSION_TTL
        } else {
            ttl
        };

        if let Some(capacity) = max_sessions {
            builder = builder.max_capacity(capacity);
        }
        if !ttl.is_zero() {
            builder = builder.time_to_live(ttl);
        }

        Self {
            bindings: builder.build(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero()),
        }
    }

    /// Unbounded, 24 hour sessions
    pub fn with_defaults() -> Self {
        Self::new(None, Duration::from_secs(86_400))
    }
}

#[async_trait]
impl SessionBinder for MokaSessionRepository {
    async fn bind(
        &self,
        handle: &SessionHandle,
        seller_id: &SellerId,
        role: Role,
    ) -> Result<SessionBinding> {
        let binding = SessionBinding::new(handle.clone(), seller_id.clone(), role, self.ttl);
        self.bindings.insert(handle.clone(), binding.clone()).await;
        Ok(binding)
    }

    async fn unbind(&self, handle: &SessionHandle) -> Result<bool> {
        Ok(self.bindings.remove(handle).await.is_some())
    }

    async fn binding(&self, handle: &SessionHandle) -> Result<Option<SessionBinding>> {
        let Some(binding) = self.bindings.get(handle).await else {
            return Ok(None);
        };

        if binding.is_expired() {
            self.bindings.invalidate(handle).await;
            return Ok(None);
        }

        Ok(Some(binding))
    }
}
