pub mod authentication;
pub mod authorization;

pub use authentication::{extract_bearer_token, session_handle};
pub use authorization::{require_roles, role_layer};
