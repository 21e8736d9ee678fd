use crate::handlers;
use crate::middleware::role_layer;
use crate::state::AppState;
use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn_with_state,
    routing::{get, post},
};
use marketbase::auth::Role;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

const ANY_SELLER: &[Role] = &[Role::Seller, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Build and configure the application router
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let seller_routes: Router<AppState> = Router::new()
        .route("/admin/seller/me", get(handlers::current_seller))
        .route_layer(from_fn_with_state(state.clone(), role_layer(ANY_SELLER)));

    let admin_routes: Router<AppState> = Router::new()
        .route("/admin/sellers/{seller_id}", get(handlers::get_seller))
        .route_layer(from_fn_with_state(state.clone(), role_layer(ADMIN_ONLY)));

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Seller lifecycle
        .route("/admin/seller/signup", post(handlers::signup))
        .route("/admin/login", post(handlers::login))
        .route("/admin/logout", post(handlers::logout))
        .route("/admin/verify-seller", post(handlers::verify_seller))
        .route("/admin/verify-email", get(handlers::verify_email))
        .route(
            "/admin/resend-verification-email",
            post(handlers::resend_verification_email),
        )
        // Role gated
        .merge(seller_routes)
        .merge(admin_routes)
        // Middleware
        .layer(cors_layer(allowed_origins))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
