use crate::api::SellerResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use marketbase::auth::Seller;
use tracing::info;

/// GET /admin/seller/me - Profile of the seller behind the session
pub async fn current_seller(Extension(seller): Extension<Seller>) -> Json<SellerResponse> {
    Json(seller.into())
}

/// GET /admin/sellers/{seller_id} - Admin lookup of any seller
pub async fn get_seller(
    State(state): State<AppState>,
    Extension(admin): Extension<Seller>,
    Path(seller_id): Path<String>,
) -> Result<Json<SellerResponse>, ApiError> {
    info!(seller_id = %seller_id, requested_by = %admin.seller_id, "GET_SELLER");

    let seller = state.auth_service.find_seller(&seller_id).await?;
    Ok(Json(seller.into()))
}
