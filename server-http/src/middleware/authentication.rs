use axum::http::{HeaderMap, header};
use marketbase::auth::SessionHandle;

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<SessionHandle> {
    // Authorization: Bearer <token>
    let parts: Vec<&str> = auth_header.split_whitespace().collect();

    if parts.len() != 2 || parts[0] != "Bearer" {
        return None;
    }

    Some(parts[1].to_string())
}

/// Session handle presented with the request, if any
pub fn session_handle(headers: &HeaderMap) -> Option<SessionHandle> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
}
