use super::error::{AuthError, UniqueField};
use super::models::Seller;
use super::repository::{SellerField, SellerRepository};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// In-process seller store for tests and throwaway runs.
///
/// `insert_unique` holds the email index entry while it claims the id entry, so two
/// racing inserts can never both commit the same id or email. Lock order is always
/// email index first, then records.
#[derive(Default)]
pub struct MemorySellerRepository {
    sellers: DashMap<String, Seller>,
    by_email: DashMap<String, String>,
    by_token: DashMap<String, String>,
}

impl MemorySellerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sellers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sellers.is_empty()
    }

    fn load(&self, seller_id: &str) -> Option<Seller> {
        self.sellers.get(seller_id).map(|seller| seller.value().clone())
    }
}

#[async_trait]
impl SellerRepository for MemorySellerRepository {
    async fn find_by_field(
        &self,
        field: SellerField,
        value: &str,
    ) -> Result<Option<Seller>, AuthError> {
        let seller = match field {
            SellerField::SellerId => self.load(value),
            SellerField::Email => {
                let id = self.by_email.get(value).map(|id| id.value().clone());
                id.and_then(|id| self.load(&id))
                    .filter(|seller| seller.email == value)
            }
            SellerField::VerificationToken => {
                let id = self.by_token.get(value).map(|id| id.value().clone());
                id.and_then(|id| self.load(&id))
                    .filter(|seller| seller.verification_token() == Some(value))
            }
        };
        Ok(seller)
    }

    async fn insert_unique(&self, seller: Seller) -> Result<Seller, AuthError> {
        let id = seller.seller_id.as_str().to_string();

        let email_slot = match self.by_email.entry(seller.email.clone()) {
            Entry::Occupied(_) => return Err(AuthError::DuplicateKey(UniqueField::Email)),
            Entry::Vacant(slot) => slot,
        };
        match self.sellers.entry(id.clone()) {
            Entry::Occupied(_) => return Err(AuthError::DuplicateKey(UniqueField::SellerId)),
            Entry::Vacant(slot) => {
                slot.insert(seller.clone());
            }
        }
        email_slot.insert(id.clone());

        if let Some(token) = seller.verification_token() {
            self.by_token.insert(token.to_string(), id);
        }
        Ok(seller)
    }

    async fn update(&self, seller: Seller) -> Result<Seller, AuthError> {
        let id = seller.seller_id.as_str().to_string();

        let previous = match self.sellers.get_mut(&id) {
            Some(mut slot) => std::mem::replace(slot.value_mut(), seller.clone()),
            None => return Err(AuthError::NotFound),
        };

        if previous.email != seller.email {
            self.by_email.remove(&previous.email);
            self.by_email.insert(seller.email.clone(), id.clone());
        }
        if previous.verification_token() != seller.verification_token() {
            if let Some(old) = previous.verification_token() {
                self.by_token.remove(old);
            }
            if let Some(new) = seller.verification_token() {
                self.by_token.insert(new.to_string(), id);
            }
        }
        Ok(seller)
    }
}
