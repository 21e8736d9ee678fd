use crate::api::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use marketbase::auth::{AuthError, ErrorKind};
use tracing::error;

/// Auth failure on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

/// HTTP status for an auth failure
pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::NotVerified => StatusCode::UNAUTHORIZED,
        AuthError::InvalidSellerId => StatusCode::NOT_FOUND,
        AuthError::AlreadyVerified => StatusCode::BAD_REQUEST,
        _ => match err.kind() {
            ErrorKind::Validation | ErrorKind::Authentication => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Dependency => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);

        // Dependency detail stays in the logs
        let message = match &self.0 {
            AuthError::SessionInvalidation(_) => {
                error!(error = %self.0, "session invalidation failed");
                "Seller logged out but the session could not be invalidated".to_string()
            }
            err if err.kind() == ErrorKind::Dependency => {
                error!(error = %err, "request failed");
                "Internal server error".to_string()
            }
            err => err.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketbase::auth::UniqueField;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (AuthError::InvalidToken, StatusCode::BAD_REQUEST),
            (AuthError::TokenExpired, StatusCode::BAD_REQUEST),
            (AuthError::NotVerified, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidSellerId, StatusCode::NOT_FOUND),
            (AuthError::NotFound, StatusCode::NOT_FOUND),
            (AuthError::DuplicateEmail, StatusCode::CONFLICT),
            (
                AuthError::DuplicateKey(UniqueField::SellerId),
                StatusCode::CONFLICT,
            ),
            (AuthError::AlreadyVerified, StatusCode::BAD_REQUEST),
            (AuthError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AuthError::Forbidden, StatusCode::FORBIDDEN),
            (
                AuthError::StorageError("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(status_for(&err), status, "{err}");
        }
    }

    #[tokio::test]
    async fn test_dependency_detail_not_leaked() {
        let response = ApiError(AuthError::StorageError("/var/lib/secret".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("secret"));
        assert!(text.contains("Internal server error"));
    }
}
