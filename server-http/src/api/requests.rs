use serde::Deserialize;

// Missing fields deserialize as empty strings so the auth service reports them
// as validation errors rather than axum rejecting the body.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email_id: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub seller_id: String,
    #[serde(default)]
    pub email_or_phone: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerIdRequest {
    #[serde(default)]
    pub seller_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    #[serde(default)]
    pub token: String,
}
