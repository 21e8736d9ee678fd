use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use marketbase::auth::{
    AuthService, MemorySellerRepository, MokaSessionRepository, Notifier, NotifyError, Role,
    SellerId,
};
use serde_json::{Value, json};
use server_http::{AppState, build_router};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;

struct Outbox {
    sent: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl Notifier for Outbox {
    async fn send_verification_email(
        &self,
        _email: &str,
        _seller_id: &SellerId,
        token: &str,
    ) -> Result<(), NotifyError> {
        let _ = self.sent.send(token.to_string());
        Ok(())
    }
}

struct TestApp {
    router: Router,
    auth: Arc<AuthService>,
    tokens: mpsc::UnboundedReceiver<String>,
}

impl TestApp {
    fn new() -> Self {
        let (tx, tokens) = mpsc::unbounded_channel();
        let auth = Arc::new(AuthService::new(
            Arc::new(MemorySellerRepository::new()),
            Arc::new(MokaSessionRepository::with_defaults()),
            Arc::new(Outbox { sent: tx }),
        ));
        let router = build_router(AppState::new(auth.clone()), &["*".to_string()]);

        Self {
            router,
            auth,
            tokens,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    async fn post(&self, uri: &str, body: Value, bearer: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn get(&self, uri: &str, bearer: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn next_token(&mut self) -> String {
        tokio::time::timeout(std::time::Duration::from_secs(5), self.tokens.recv())
            .await
            .expect("verification mail was not sent")
            .expect("outbox closed")
    }

    /// Sign up, verify and log in; returns (seller id, bearer token)
    async fn logged_in_seller(&mut self, email: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/admin/seller/signup",
                json!({"phoneNumber": "5550001", "emailId": email, "password": "p1"}),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let seller_id = body["sellerId"].as_str().unwrap().to_string();

        let token = self.next_token().await;
        let (status, _) = self
            .get(&format!("/admin/verify-email?token={token}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self
            .post(
                "/admin/login",
                json!({"sellerId": seller_id, "emailOrPhone": email, "password": "p1"}),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        (seller_id, body["token"].as_str().unwrap().to_string())
    }
}

#[tokio::test]
async fn health_check() {
    let app = TestApp::new();
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OK");
}

#[tokio::test]
async fn full_seller_lifecycle() {
    let mut app = TestApp::new();

    let (status, body) = app
        .post(
            "/admin/seller/signup",
            json!({"phoneNumber": "5550001", "emailId": "a@x.com", "password": "p1"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let seller_id = body["sellerId"].as_str().unwrap().to_string();
    assert!(seller_id.starts_with("MBSLR"));
    assert_eq!(seller_id.len(), 10);

    // Not verified yet
    let (status, body) = app
        .post(
            "/admin/login",
            json!({"sellerId": seller_id, "emailOrPhone": "a@x.com", "password": "p1"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Account not verified");

    let token = app.next_token().await;
    let (status, body) = app.get("/admin/verify-email?token=wrong", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid verification token");

    let (status, body) = app
        .get(&format!("/admin/verify-email?token={token}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email verified successfully");

    let (status, body) = app
        .post(
            "/admin/login",
            json!({"sellerId": seller_id, "emailOrPhone": "5550001", "password": "p1"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["role"], "seller");
    let bearer = body["token"].as_str().unwrap().to_string();

    let (status, body) = app
        .post("/admin/verify-seller", json!({"sellerId": seller_id}), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loggedIn"], "loggedin");

    let (status, body) = app.get("/admin/seller/me", Some(&bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sellerId"], seller_id.as_str());
    assert_eq!(body["emailVerified"], true);

    let (status, body) = app
        .post("/admin/logout", json!({"sellerId": seller_id}), Some(&bearer))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loggedIn"], "loggedout");

    // The session is gone
    let (status, _) = app.get("/admin/seller/me", Some(&bearer)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_rejects_missing_fields_and_duplicates() {
    let app = TestApp::new();

    let (status, _) = app
        .post("/admin/seller/signup", json!({"emailId": "a@x.com"}), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({"phoneNumber": "1", "emailId": "a@x.com", "password": "p1"});
    let (status, _) = app.post("/admin/seller/signup", body.clone(), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/admin/seller/signup", body, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Seller already exists");
}

#[tokio::test]
async fn login_failures_share_status_and_message() {
    let mut app = TestApp::new();
    let (seller_id, _) = app.logged_in_seller("a@x.com").await;

    let (wrong_contact_status, wrong_contact) = app
        .post(
            "/admin/login",
            json!({"sellerId": seller_id, "emailOrPhone": "b@x.com", "password": "p1"}),
            None,
        )
        .await;
    let (wrong_id_status, wrong_id) = app
        .post(
            "/admin/login",
            json!({"sellerId": "MBSLR00000", "emailOrPhone": "a@x.com", "password": "p1"}),
            None,
        )
        .await;

    assert_eq!(wrong_contact_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_contact_status, wrong_id_status);
    assert_eq!(wrong_contact, wrong_id);
}

#[tokio::test]
async fn verify_seller_unknown_id() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/admin/verify-seller", json!({"sellerId": "MBSLR12345"}), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid seller ID");

    let (status, _) = app.post("/admin/verify-seller", json!({}), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resend_verification_email() {
    let mut app = TestApp::new();

    let (status, _) = app
        .post(
            "/admin/resend-verification-email",
            json!({"email": "nobody@x.com"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.post(
        "/admin/seller/signup",
        json!({"phoneNumber": "1", "emailId": "a@x.com", "password": "p1"}),
        None,
    )
    .await;
    let first = app.next_token().await;

    let (status, body) = app
        .post(
            "/admin/resend-verification-email",
            json!({"email": "a@x.com"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Verification email sent");

    let second = app.next_token().await;
    assert_ne!(first, second);

    let (status, _) = app
        .get(&format!("/admin/verify-email?token={second}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/admin/resend-verification-email",
            json!({"email": "a@x.com"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email is already verified");
}

#[tokio::test]
async fn role_gated_routes() {
    let mut app = TestApp::new();
    let (seller_id, seller_bearer) = app.logged_in_seller("a@x.com").await;

    let admin_id = app
        .auth
        .provision("admin@x.com", "", "root", Role::Admin)
        .await
        .unwrap();
    let (status, body) = app
        .post(
            "/admin/login",
            json!({"sellerId": admin_id.as_str(), "emailOrPhone": "admin@x.com", "password": "root"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
    let admin_bearer = body["token"].as_str().unwrap().to_string();

    let lookup = format!("/admin/sellers/{seller_id}");

    let (status, body) = app.get(&lookup, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, body) = app.get(&lookup, Some(&seller_bearer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden: Insufficient permissions");

    let (status, body) = app.get(&lookup, Some(&admin_bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sellerId"], seller_id.as_str());
    assert_eq!(body["loggedIn"], "loggedin");

    // Admins pass the seller-or-admin gate too
    let (status, body) = app.get("/admin/seller/me", Some(&admin_bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    let (status, _) = app.get("/admin/sellers/MBSLR00000", Some(&admin_bearer)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
