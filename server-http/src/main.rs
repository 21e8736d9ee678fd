use marketbase::auth::{
    AuthService, LogNotifier, MokaSessionRepository, Notifier, RandomCandidates, SellerIdAllocator,
    SledSellerRepository, SmtpNotifier, defaults::ensure_default_admin,
};
use server_http::{AppState, build_router};
use shared::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if exists) before reading RUST_LOG
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Marketbase HTTP Server...");

    match dotenv {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    // Load configuration from environment variables
    let config = Config::from_env();

    info!("Initializing seller identity service...");
    let auth_service = Arc::new(init_auth_service(&config));

    if let Some(admin) = &config.admin {
        if let Err(e) = ensure_default_admin(
            &auth_service,
            &admin.email,
            &admin.phone_number,
            &admin.password,
        )
        .await
        {
            error!(error = %e, "Failed to seed default admin");
        }
    }

    let state = AppState::new(auth_service);
    let router = build_router(state, &config.allowed_origins);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind HTTP listener");

    info!("HTTP Server listening on http://{}", address);

    // Graceful shutdown handler
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server error");

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}

fn init_auth_service(config: &Config) -> AuthService {
    let base_path = std::path::Path::new(&config.data_dir);

    if let Err(e) = std::fs::create_dir_all(base_path) {
        warn!("Failed to create data directory {}: {}", config.data_dir, e);
    }

    let sellers = Arc::new(
        SledSellerRepository::new(base_path.join("sellers.sled"))
            .expect("Failed to initialize seller repository"),
    );

    let sessions = Arc::new(MokaSessionRepository::new(
        None, // No max sessions limit
        Duration::from_secs(config.session_ttl_secs),
    ));

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => match SmtpNotifier::new(
            &smtp.host,
            &smtp.username,
            &smtp.password,
            &smtp.from,
            config.public_base_url.clone(),
        ) {
            Ok(notifier) => {
                info!(host = %smtp.host, "Sending verification mail through SMTP");
                Arc::new(notifier)
            }
            Err(e) => {
                warn!(error = %e, "Invalid SMTP settings, verification mail will only be logged");
                Arc::new(LogNotifier::new(config.public_base_url.clone()))
            }
        },
        None => {
            info!("No SMTP settings, verification mail will only be logged");
            Arc::new(LogNotifier::new(config.public_base_url.clone()))
        }
    };

    AuthService::new(sellers, sessions, notifier)
        .with_allocator(SellerIdAllocator::new(
            config.allocator_max_attempts,
            Arc::new(RandomCandidates),
        ))
        .with_verification_ttl(chrono::Duration::seconds(
            config.verification_ttl_secs as i64,
        ))
        .with_notify_timeout(Duration::from_secs(config.notify_timeout_secs))
        .with_max_concurrent_hashes(config.max_concurrent_hashes)
}
