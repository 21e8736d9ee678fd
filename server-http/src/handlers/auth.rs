use crate::api::{
    LoginRequest, LoginResponse, MessageResponse, ResendVerificationRequest, SellerIdRequest,
    SessionStateResponse, SignupRequest, SignupResponse, VerifyEmailQuery,
};
use crate::error::ApiError;
use crate::middleware::session_handle;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};
use tracing::info;

/// POST /admin/seller/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let seller_id = state
        .auth_service
        .signup(&req.email_id, &req.phone_number, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Seller registered successfully. Please check mail to verify account"
                .to_string(),
            seller_id,
        }),
    ))
}

/// POST /admin/login
///
/// Returns the session token to present as `Authorization: Bearer <token>`.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state
        .auth_service
        .login(&req.seller_id, &req.email_or_phone, &req.password)
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        seller_id: outcome.seller_id,
        role: outcome.role,
        token: outcome.session.handle,
        expires_at: outcome.session.expires_at,
    }))
}

/// POST /admin/logout
///
/// The session named by the Bearer token, if any, is dropped along with the logout.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SellerIdRequest>,
) -> Result<Json<SessionStateResponse>, ApiError> {
    let handle = session_handle(&headers);

    let logged_in = state
        .auth_service
        .logout(&req.seller_id, handle.as_ref())
        .await?;

    Ok(Json(SessionStateResponse {
        success: true,
        message: "Seller logged out successfully".to_string(),
        logged_in,
    }))
}

/// POST /admin/verify-seller
pub async fn verify_seller(
    State(state): State<AppState>,
    Json(req): Json<SellerIdRequest>,
) -> Result<Json<SessionStateResponse>, ApiError> {
    let logged_in = state.auth_service.verify_seller_id(&req.seller_id).await?;

    Ok(Json(SessionStateResponse {
        success: true,
        message: "Valid seller ID".to_string(),
        logged_in,
    }))
}

/// GET /admin/verify-email?token=...
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let seller = state.auth_service.verify_email(&query.token).await?;
    info!(seller_id = %seller.seller_id, "verification link redeemed");

    Ok(Json(MessageResponse::new("Email verified successfully")))
}

/// POST /admin/resend-verification-email
pub async fn resend_verification_email(
    State(state): State<AppState>,
    Json(req): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.resend_verification(&req.email).await?;

    Ok(Json(MessageResponse::new("Verification email sent")))
}
