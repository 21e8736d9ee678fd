pub mod auth;
pub mod health;
pub mod sellers;

pub use auth::{login, logout, resend_verification_email, signup, verify_email, verify_seller};
pub use health::health_check;
pub use sellers::{current_seller, get_seller};
