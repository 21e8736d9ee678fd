use super::authentication::session_handle;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use marketbase::auth::Role;
use std::future::Future;
use std::pin::Pin;

/// Admit the request only if its session belongs to a seller holding one of `permitted`.
///
/// The resolved `Seller` is attached to the request extensions for the handler.
pub async fn require_roles(
    permitted: &'static [Role],
    state: AppState,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let handle = session_handle(request.headers());

    let seller = state
        .access_gate
        .require_role(handle.as_ref(), permitted)
        .await?;

    request.extensions_mut().insert(seller);
    Ok(next.run(request).await)
}

/// Middleware factory for requiring one of a set of roles
pub fn role_layer(
    permitted: &'static [Role],
) -> impl Fn(
    State<AppState>,
    Request,
    Next,
) -> Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send>>
+ Clone {
    move |State(state): State<AppState>, request: Request, next: Next| {
        Box::pin(async move { require_roles(permitted, state, request, next).await })
    }
}
