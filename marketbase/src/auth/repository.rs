use super::error::AuthError;
use super::models::{Seller, SellerId};
use async_trait::async_trait;

/// Indexed seller fields that can be looked up directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellerField {
    SellerId,
    Email,
    VerificationToken,
}

/// Durable seller records. Implementations must enforce uniqueness of the seller id
/// and the email address inside `insert_unique`, atomically with the write.
#[async_trait]
pub trait SellerRepository: Send + Sync {
    /// Find a seller by one of its indexed fields
    async fn find_by_field(
        &self,
        field: SellerField,
        value: &str,
    ) -> Result<Option<Seller>, AuthError>;

    /// Insert a new seller, failing with `AuthError::DuplicateKey` when the id or email
    /// is already taken
    async fn insert_unique(&self, seller: Seller) -> Result<Seller, AuthError>;

    /// Replace an existing seller record (last writer wins)
    async fn update(&self, seller: Seller) -> Result<Seller, AuthError>;

    /// Find a seller whose id matches and whose email or phone number equals
    /// `email_or_phone`
    async fn find_by_id_and_contact(
        &self,
        seller_id: &SellerId,
        email_or_phone: &str,
    ) -> Result<Option<Seller>, AuthError> {
        Ok(self
            .find_by_field(SellerField::SellerId, seller_id.as_str())
            .await?
            .filter(|seller| seller.matches_contact(email_or_phone)))
    }

    async fn find_by_id(&self, seller_id: &SellerId) -> Result<Option<Seller>, AuthError> {
        self.find_by_field(SellerField::SellerId, seller_id.as_str())
            .await
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self
            .find_by_field(SellerField::Email, email)
            .await?
            .is_some())
    }
}
