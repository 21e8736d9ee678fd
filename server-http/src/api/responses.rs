use chrono::{DateTime, Utc};
use marketbase::auth::{Role, Seller, SellerId, SessionState};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub seller_id: SellerId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub seller_id: SellerId,
    pub role: Role,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Logout and seller-id probe both answer with the seller's session state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStateResponse {
    pub success: bool,
    pub message: String,
    pub logged_in: SessionState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerResponse {
    pub seller_id: SellerId,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub logged_in: SessionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Seller> for SellerResponse {
    fn from(seller: Seller) -> Self {
        Self {
            seller_id: seller.seller_id,
            email: seller.email,
            phone_number: seller.phone_number,
            role: seller.role,
            email_verified: seller.email_verified,
            phone_verified: seller.phone_verified,
            logged_in: seller.session_state,
            created_at: seller.created_at,
            updated_at: seller.updated_at,
        }
    }
}

// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
