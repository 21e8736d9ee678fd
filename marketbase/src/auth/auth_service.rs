use super::allocator::{Allocation, SellerIdAllocator};
use super::clock::{Clock, SystemClock};
use super::error::{AuthError, UniqueField};
use super::models::{Role, Seller, SellerId, SessionState};
use super::notifier::Notifier;
use super::password::{hash_password, verify_password};
use super::repository::{SellerField, SellerRepository};
use super::session::{SessionBinding, SessionHandle, generate_session_handle};
use super::session_store::SessionBinder;
use super::token::{DEFAULT_VERIFICATION_TTL_SECS, TokenService};
use super::validation::{require, validate_email};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Argon2 hashes in flight at once. Each one holds about 19 MiB.
pub const DEFAULT_MAX_CONCURRENT_HASHES: usize = 8;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub seller_id: SellerId,
    pub role: Role,
    pub session: SessionBinding,
}

/// Seller lifecycle: signup, email verification, login and logout.
pub struct AuthService {
    sellers: Arc<dyn SellerRepository>,
    sessions: Arc<dyn SessionBinder>,
    notifier: Arc<dyn Notifier>,
    allocator: SellerIdAllocator,
    tokens: TokenService,
    clock: Arc<dyn Clock>,
    notify_timeout: Duration,
    hash_permits: Arc<Semaphore>,
}

impl AuthService {
    pub fn new(
        sellers: Arc<dyn SellerRepository>,
        sessions: Arc<dyn SessionBinder>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            sellers,
            sessions,
            notifier,
            allocator: SellerIdAllocator::default(),
            tokens: TokenService::new(
                chrono::Duration::seconds(DEFAULT_VERIFICATION_TTL_SECS),
                clock.clone(),
            ),
            clock,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            hash_permits: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_HASHES)),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.tokens = TokenService::new(self.tokens.ttl(), clock.clone());
        self.clock = clock;
        self
    }

    pub fn with_allocator(mut self, allocator: SellerIdAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_verification_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.tokens = TokenService::new(ttl, self.clock.clone());
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_hashes(mut self, permits: usize) -> Self {
        self.hash_permits = Arc::new(Semaphore::new(permits.max(1)));
        self
    }

    pub fn sellers(&self) -> &Arc<dyn SellerRepository> {
        &self.sellers
    }

    pub fn sessions(&self) -> &Arc<dyn SessionBinder> {
        &self.sessions
    }

    /// Register a new, unverified seller and mail out the verification link.
    ///
    /// Returns as soon as the record is committed; the mail is sent in the background.
    pub async fn signup(
        &self,
        email: &str,
        phone_number: &str,
        password: &str,
    ) -> Result<SellerId, AuthError> {
        let email = validate_email(email)?;
        let phone_number = require("phoneNumber", phone_number)?;
        require("password", password)?;

        if self.sellers.email_exists(email).await? {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash(password).await?;
        let verification = self.tokens.issue()?;
        let now = self.clock.now();

        let outcome = self
            .allocator
            .allocate(self.sellers.as_ref(), |seller_id| {
                Seller::new(
                    seller_id,
                    email.to_string(),
                    phone_number.to_string(),
                    password_hash.clone(),
                    verification.clone(),
                    now,
                )
            })
            .await;

        let seller = match outcome {
            Ok(Allocation::Allocated(seller)) => seller,
            Ok(Allocation::Exhausted { attempts }) => {
                error!(attempts, "could not allocate a seller id");
                return Err(AuthError::AllocationExhausted { attempts });
            }
            Err(AuthError::DuplicateKey(UniqueField::Email)) => {
                return Err(AuthError::DuplicateEmail);
            }
            Err(e) => return Err(e),
        };

        info!(seller_id = %seller.seller_id, "seller signed up");
        self.dispatch_verification_email(
            seller.email.clone(),
            seller.seller_id.clone(),
            verification.token,
        );

        Ok(seller.seller_id)
    }

    /// Redeem a verification token. Tokens are single use.
    pub async fn verify_email(&self, token: &str) -> Result<Seller, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let mut seller = self
            .sellers
            .find_by_field(SellerField::VerificationToken, token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let expires_at = seller
            .verification_token_expiry()
            .ok_or(AuthError::InvalidToken)?;
        let now = self.clock.now();
        if TokenService::is_expired(expires_at, now) {
            debug!(seller_id = %seller.seller_id, "verification token expired");
            return Err(AuthError::TokenExpired);
        }

        seller.mark_email_verified(now);
        let seller = self.sellers.update(seller).await?;

        info!(seller_id = %seller.seller_id, "email verified");
        Ok(seller)
    }

    /// Issue a fresh verification token for an unverified seller, replacing the old one.
    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let email = require("email", email)?;

        let mut seller = self
            .sellers
            .find_by_field(SellerField::Email, email)
            .await?
            .ok_or(AuthError::NotFound)?;

        if seller.email_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let verification = self.tokens.issue()?;
        seller.rotate_verification(verification.clone(), self.clock.now());
        let seller = self.sellers.update(seller).await?;

        info!(seller_id = %seller.seller_id, "verification token reissued");
        self.dispatch_verification_email(seller.email, seller.seller_id, verification.token);
        Ok(())
    }

    /// Check credentials, mark the seller logged in and bind a new session handle.
    ///
    /// An unknown id and a contact that does not belong to the id fail the same way.
    pub async fn login(
        &self,
        seller_id: &str,
        email_or_phone: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let seller_id = require("sellerId", seller_id)?;
        let email_or_phone = require("emailOrPhone", email_or_phone)?;
        require("password", password)?;

        let seller_id = SellerId::parse(seller_id).map_err(|_| AuthError::InvalidCredentials)?;
        let mut seller = self
            .sellers
            .find_by_id_and_contact(&seller_id, email_or_phone)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !seller.is_verified() {
            return Err(AuthError::NotVerified);
        }

        if !self.verify(password, &seller.password_hash).await? {
            debug!(seller_id = %seller.seller_id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        seller.log_in(self.clock.now());
        let seller = self.sellers.update(seller).await?;

        let handle = generate_session_handle();
        let session = self
            .sessions
            .bind(&handle, &seller.seller_id, seller.role)
            .await?;

        info!(seller_id = %seller.seller_id, role = %seller.role, "seller logged in");
        Ok(LoginOutcome {
            seller_id: seller.seller_id,
            role: seller.role,
            session,
        })
    }

    /// Mark the seller logged out, then drop the session handle if it is bound to them.
    pub async fn logout(
        &self,
        seller_id: &str,
        session: Option<&SessionHandle>,
    ) -> Result<SessionState, AuthError> {
        let seller_id = require("sellerId", seller_id)?;
        let seller_id = SellerId::parse(seller_id).map_err(|_| AuthError::NotFound)?;

        let mut seller = self
            .sellers
            .find_by_id(&seller_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        seller.log_out(self.clock.now());
        let seller = self.sellers.update(seller).await?;
        info!(seller_id = %seller.seller_id, "seller logged out");

        if let Some(handle) = session {
            self.invalidate_session(handle, &seller.seller_id).await?;
        }

        Ok(seller.session_state)
    }

    /// Existence and session-state probe.
    pub async fn verify_seller_id(&self, seller_id: &str) -> Result<SessionState, AuthError> {
        let seller_id = require("sellerId", seller_id)?;
        let seller_id = SellerId::parse(seller_id).map_err(|_| AuthError::InvalidSellerId)?;

        let seller = self
            .sellers
            .find_by_id(&seller_id)
            .await?
            .ok_or(AuthError::InvalidSellerId)?;

        Ok(seller.session_state)
    }

    pub async fn find_seller(&self, seller_id: &str) -> Result<Seller, AuthError> {
        let seller_id = SellerId::parse(seller_id.trim()).map_err(|_| AuthError::NotFound)?;
        self.sellers
            .find_by_id(&seller_id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Create an already verified seller with the given role, skipping the mail round trip.
    pub async fn provision(
        &self,
        email: &str,
        phone_number: &str,
        password: &str,
        role: Role,
    ) -> Result<SellerId, AuthError> {
        let email = validate_email(email)?;
        require("password", password)?;

        let password_hash = self.hash(password).await?;
        let verification = self.tokens.issue()?;
        let now = self.clock.now();

        let outcome = self
            .allocator
            .allocate(self.sellers.as_ref(), |seller_id| {
                let mut seller = Seller::new(
                    seller_id,
                    email.to_string(),
                    phone_number.trim().to_string(),
                    password_hash.clone(),
                    verification.clone(),
                    now,
                );
                seller.role = role;
                seller.mark_email_verified(now);
                seller
            })
            .await;

        match outcome {
            Ok(Allocation::Allocated(seller)) => {
                info!(seller_id = %seller.seller_id, role = %role, "seller provisioned");
                Ok(seller.seller_id)
            }
            Ok(Allocation::Exhausted { attempts }) => {
                Err(AuthError::AllocationExhausted { attempts })
            }
            Err(AuthError::DuplicateKey(UniqueField::Email)) => Err(AuthError::DuplicateEmail),
            Err(e) => Err(e),
        }
    }

    async fn invalidate_session(
        &self,
        handle: &SessionHandle,
        seller_id: &SellerId,
    ) -> Result<(), AuthError> {
        let binding = self
            .sessions
            .binding(handle)
            .await
            .map_err(|e| AuthError::SessionInvalidation(e.to_string()))?;

        match binding {
            Some(binding) if &binding.seller_id == seller_id => {
                self.sessions
                    .unbind(handle)
                    .await
                    .map_err(|e| AuthError::SessionInvalidation(e.to_string()))?;
                debug!(seller_id = %seller_id, "session unbound");
            }
            Some(binding) => {
                warn!(
                    seller_id = %seller_id,
                    bound_to = %binding.seller_id,
                    "session handle belongs to another seller, left bound"
                );
            }
            None => debug!(seller_id = %seller_id, "no live session to unbind"),
        }
        Ok(())
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let _permit = self
            .hash_permits
            .acquire()
            .await
            .map_err(|e| AuthError::TaskError(e.to_string()))?;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hash_password(&password)).await?
    }

    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        let _permit = self
            .hash_permits
            .acquire()
            .await
            .map_err(|e| AuthError::TaskError(e.to_string()))?;
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || verify_password(&password, &password_hash)).await?
    }

    fn dispatch_verification_email(&self, email: String, seller_id: SellerId, token: String) {
        let notifier = self.notifier.clone();
        let timeout = self.notify_timeout;

        tokio::spawn(async move {
            let send = notifier.send_verification_email(&email, &seller_id, &token);
            match tokio::time::timeout(timeout, send).await {
                Ok(Ok(())) => debug!(seller_id = %seller_id, "verification email sent"),
                Ok(Err(e)) => {
                    error!(seller_id = %seller_id, error = %e, "error sending verification email")
                }
                Err(_) => {
                    error!(seller_id = %seller_id, ?timeout, "verification email timed out")
                }
            }
        });
    }
}
