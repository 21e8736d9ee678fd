use marketbase::auth::{AccessGate, AuthService};
use std::sync::Arc;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub access_gate: AccessGate,
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>) -> Self {
        let access_gate = AccessGate::new(
            auth_service.sellers().clone(),
            auth_service.sessions().clone(),
        );

        Self {
            auth_service,
            access_gate,
        }
    }
}
