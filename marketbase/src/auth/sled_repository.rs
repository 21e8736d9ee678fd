use super::error::{AuthError, UniqueField};
use super::models::Seller;
use super::repository::{SellerField, SellerRepository};
use async_trait::async_trait;
use sled::transaction::{ConflictableTransactionError, TransactionError, Transactional};
use sled::{Db, Tree};
use std::path::Path;

const SELLERS_TREE: &str = "sellers";
const SELLERS_BY_EMAIL_TREE: &str = "sellers_by_email";
const SELLERS_BY_TOKEN_TREE: &str = "sellers_by_token";

/// Sled-backed seller store.
///
/// Records live in `sellers` keyed by seller id, with two secondary indexes mapping
/// email and pending verification token back to the id. Every write touches all three
/// trees in one transaction, so the uniqueness checks and the insert commit together.
#[derive(Clone)]
pub struct SledSellerRepository {
    _db: Db,
    sellers: Tree,
    by_email: Tree,
    by_token: Tree,
}

impl SledSellerRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
        let db = sled::open(path)?;
        let sellers = db.open_tree(SELLERS_TREE)?;
        let by_email = db.open_tree(SELLERS_BY_EMAIL_TREE)?;
        let by_token = db.open_tree(SELLERS_BY_TOKEN_TREE)?;
        Ok(Self {
            _db: db,
            sellers,
            by_email,
            by_token,
        })
    }

    fn load(&self, seller_id: &[u8]) -> Result<Option<Seller>, AuthError> {
        match self.sellers.get(seller_id)? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }
}

fn abort<T>(err: AuthError) -> Result<T, ConflictableTransactionError<AuthError>> {
    Err(ConflictableTransactionError::Abort(err))
}

fn map_transaction_error(err: TransactionError<AuthError>) -> AuthError {
    match err {
        TransactionError::Abort(err) => err,
        TransactionError::Storage(err) => err.into(),
    }
}

#[async_trait]
impl SellerRepository for SledSellerRepository {
    async fn find_by_field(
        &self,
        field: SellerField,
        value: &str,
    ) -> Result<Option<Seller>, AuthError> {
        let index = match field {
            SellerField::SellerId => return self.load(value.as_bytes()),
            SellerField::Email => &self.by_email,
            SellerField::VerificationToken => &self.by_token,
        };

        let Some(seller_id) = index.get(value.as_bytes())? else {
            return Ok(None);
        };

        // Indexes are written in the same transaction as the record, but a reader can
        // still land between two commits. Re-check the field on the loaded record.
        Ok(self.load(&seller_id)?.filter(|seller| match field {
            SellerField::Email => seller.email == value,
            SellerField::VerificationToken => seller.verification_token() == Some(value),
            SellerField::SellerId => true,
        }))
    }

    async fn insert_unique(&self, seller: Seller) -> Result<Seller, AuthError> {
        let seller_json = serde_json::to_vec(&seller)?;
        let id = seller.seller_id.as_str().as_bytes();
        let email = seller.email.as_bytes();
        let token = seller.verification_token();

        (&self.sellers, &self.by_email, &self.by_token)
            .transaction(|(sellers, by_email, by_token)| {
                if sellers.get(id)?.is_some() {
                    return abort(AuthError::DuplicateKey(UniqueField::SellerId));
                }
                if by_email.get(email)?.is_some() {
                    return abort(AuthError::DuplicateKey(UniqueField::Email));
                }

                sellers.insert(id, seller_json.as_slice())?;
                by_email.insert(email, id)?;
                if let Some(token) = token {
                    by_token.insert(token.as_bytes(), id)?;
                }
                Ok(())
            })
            .map_err(map_transaction_error)?;

        Ok(seller)
    }

    async fn update(&self, seller: Seller) -> Result<Seller, AuthError> {
        let seller_json = serde_json::to_vec(&seller)?;
        let id = seller.seller_id.as_str().as_bytes();

        (&self.sellers, &self.by_email, &self.by_token)
            .transaction(|(sellers, by_email, by_token)| {
                let Some(existing) = sellers.get(id)? else {
                    return abort(AuthError::NotFound);
                };
                let existing: Seller = match serde_json::from_slice(&existing) {
                    Ok(existing) => existing,
                    Err(e) => return abort(e.into()),
                };

                if existing.email != seller.email {
                    if by_email.get(seller.email.as_bytes())?.is_some() {
                        return abort(AuthError::DuplicateKey(UniqueField::Email));
                    }
                    by_email.remove(existing.email.as_bytes())?;
                    by_email.insert(seller.email.as_bytes(), id)?;
                }

                if existing.verification_token() != seller.verification_token() {
                    if let Some(old) = existing.verification_token() {
                        by_token.remove(old.as_bytes())?;
                    }
                    if let Some(new) = seller.verification_token() {
                        by_token.insert(new.as_bytes(), id)?;
                    }
                }

                sellers.insert(id, seller_json.as_slice())?;
                Ok(())
            })
            .map_err(map_transaction_error)?;

        Ok(seller)
    }
}
