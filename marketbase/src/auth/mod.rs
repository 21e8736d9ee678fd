// Public API
pub mod access;
pub mod allocator;
pub mod auth_service;
pub mod clock;
pub mod defaults;
pub mod error;
pub mod memory_repository;
pub mod models;
pub mod moka_session_repository;
pub mod notifier;
pub mod password;
pub mod repository;
pub mod session;
pub mod session_store;
pub mod sled_repository;
pub mod token;
pub mod validation;

// Re-export commonly used types
pub use access::AccessGate;
pub use allocator::{Allocation, IdCandidates, PoolCandidates, RandomCandidates, SellerIdAllocator};
pub use auth_service::{AuthService, LoginOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, ErrorKind, UniqueField};
pub use memory_repository::MemorySellerRepository;
pub use models::{PendingVerification, Role, Seller, SellerId, SessionState};
pub use moka_session_repository::MokaSessionRepository;
pub use notifier::{LogNotifier, Notifier, NotifyError, SmtpNotifier, VerificationEmail};
pub use repository::{SellerField, SellerRepository};
pub use session::{SessionBinding, SessionHandle, generate_session_handle};
pub use session_store::SessionBinder;
pub use sled_repository::SledSellerRepository;
pub use token::{TokenService, generate_token};
