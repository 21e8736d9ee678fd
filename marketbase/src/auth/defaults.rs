use super::auth_service::AuthService;
use super::error::AuthError;
use super::models::{Role, SellerId};
use super::repository::SellerField;
use tracing::info;

/// Create the default admin seller unless its email is already registered.
///
/// Returns the id of the newly created admin, or `None` if nothing was created.
pub async fn ensure_default_admin(
    auth: &AuthService,
    email: &str,
    phone_number: &str,
    password: &str,
) -> Result<Option<SellerId>, AuthError> {
    if let Some(existing) = auth
        .sellers()
        .find_by_field(SellerField::Email, email.trim())
        .await?
    {
        info!(seller_id = %existing.seller_id, "default admin already present");
        return Ok(None);
    }

    match auth
        .provision(email, phone_number, password, Role::Admin)
        .await
    {
        Ok(seller_id) => {
            info!(seller_id = %seller_id, "created default admin");
            Ok(Some(seller_id))
        }
        // Another instance seeded it between the probe and the insert
        Err(AuthError::DuplicateEmail) => Ok(None),
        Err(e) => Err(e),
    }
}
