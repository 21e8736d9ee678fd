use super::error::AuthError;
use super::models::{Role, Seller};
use super::repository::SellerRepository;
use super::session::SessionHandle;
use super::session_store::SessionBinder;
use std::sync::Arc;
use tracing::debug;

/// Role check in front of protected operations. Never mutates anything.
#[derive(Clone)]
pub struct AccessGate {
    sellers: Arc<dyn SellerRepository>,
    sessions: Arc<dyn SessionBinder>,
}

impl AccessGate {
    pub fn new(sellers: Arc<dyn SellerRepository>, sessions: Arc<dyn SessionBinder>) -> Self {
        Self { sellers, sessions }
    }

    /// Resolve the session to its seller and allow it only if the seller's current role
    /// is one of `permitted`.
    pub async fn require_role(
        &self,
        session: Option<&SessionHandle>,
        permitted: &[Role],
    ) -> Result<Seller, AuthError> {
        let handle = session.ok_or(AuthError::Unauthenticated)?;

        let seller_id = self
            .sessions
            .current_seller_id(handle)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        let seller = self
            .sellers
            .find_by_id(&seller_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !permitted.contains(&seller.role) {
            debug!(seller_id = %seller.seller_id, role = %seller.role, "role not permitted");
            return Err(AuthError::Forbidden);
        }

        Ok(seller)
    }
}
