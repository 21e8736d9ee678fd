use super::models::{Role, SellerId};
use super::session::{SessionBinding, SessionHandle};
use async_trait::async_trait;
use shared::Result;

/// External session mechanism: binds client handles to an authenticated seller
#[async_trait]
pub trait SessionBinder: Send + Sync {
    /// Bind `handle` to the seller and role, replacing any previous binding
    async fn bind(
        &self,
        handle: &SessionHandle,
        seller_id: &SellerId,
        role: Role,
    ) -> Result<SessionBinding>;

    /// Drop the binding. Returns `false` if the handle was not bound
    async fn unbind(&self, handle: &SessionHandle) -> Result<bool>;

    /// Current live binding for a handle
    async fn binding(&self, handle: &SessionHandle) -> Result<Option<SessionBinding>>;

    /// Seller id bound to a handle, if any
    async fn current_seller_id(&self, handle: &SessionHandle) -> Result<Option<SellerId>> {
        Ok(self.binding(handle).await?.map(|binding| binding.seller_id))
    }
}
