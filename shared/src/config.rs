use tracing::warn;

/// SMTP relay settings. Only present when every `MARKETBASE_SMTP_*` variable is set.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// Seller account seeded with the `admin` role at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub data_dir: String,
    pub public_base_url: String,
    pub verification_ttl_secs: u64,
    pub session_ttl_secs: u64,
    pub allocator_max_attempts: u32,
    pub notify_timeout_secs: u64,
    pub max_concurrent_hashes: usize,
    pub allowed_origins: Vec<String>,
    pub admin: Option<AdminSeed>,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 5000;
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:5000";
    const DEFAULT_VERIFICATION_TTL_SECS: u64 = 3600;
    const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
    const DEFAULT_ALLOCATOR_MAX_ATTEMPTS: u32 = 32;
    const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_MAX_CONCURRENT_HASHES: usize = 8;
    /// Upper bound for verification and session lifetimes (ten years)
    pub const MAX_TTL_SECS: u64 = 10 * 365 * 86_400;

    pub fn from_env() -> Self {
        Self {
            host: std::env::var("MARKETBASE_HOST")
                .unwrap_or_else(|_| Self::DEFAULT_HOST.to_string()),
            http_port: parse_or("MARKETBASE_HTTP_PORT", Self::DEFAULT_HTTP_PORT),
            data_dir: std::env::var("MARKETBASE_DATA_DIR")
                .unwrap_or_else(|_| Self::DEFAULT_DATA_DIR.to_string()),
            public_base_url: std::env::var("MARKETBASE_PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| Self::DEFAULT_PUBLIC_BASE_URL.to_string()),
            verification_ttl_secs: parse_bounded(
                "MARKETBASE_VERIFICATION_TTL_SECS",
                Self::DEFAULT_VERIFICATION_TTL_SECS,
                Self::MAX_TTL_SECS,
            ),
            session_ttl_secs: parse_bounded(
                "MARKETBASE_SESSION_TTL_SECS",
                Self::DEFAULT_SESSION_TTL_SECS,
                Self::MAX_TTL_SECS,
            ),
            allocator_max_attempts: parse_or(
                "MARKETBASE_ALLOCATOR_MAX_ATTEMPTS",
                Self::DEFAULT_ALLOCATOR_MAX_ATTEMPTS,
            ),
            notify_timeout_secs: parse_or(
                "MARKETBASE_NOTIFY_TIMEOUT_SECS",
                Self::DEFAULT_NOTIFY_TIMEOUT_SECS,
            ),
            max_concurrent_hashes: parse_or(
                "MARKETBASE_MAX_CONCURRENT_HASHES",
                Self::DEFAULT_MAX_CONCURRENT_HASHES,
            ),
            allowed_origins: std::env::var("MARKETBASE_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            admin: admin_from_env(),
            smtp: smtp_from_env(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

fn parse_or<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("{} has an invalid value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn parse_bounded(key: &str, default: u64, max: u64) -> u64 {
    let value = parse_or(key, default);
    if value > max {
        warn!("{} is above the limit of {}, using default", key, max);
        return default;
    }
    value
}

fn admin_from_env() -> Option<AdminSeed> {
    let email = std::env::var("MARKETBASE_ADMIN_EMAIL").ok()?;
    let password = match std::env::var("MARKETBASE_ADMIN_PASSWORD") {
        Ok(password) => password,
        Err(_) => {
            warn!("MARKETBASE_ADMIN_EMAIL is set without MARKETBASE_ADMIN_PASSWORD, skipping admin seed");
            return None;
        }
    };
    Some(AdminSeed {
        email,
        phone_number: std::env::var("MARKETBASE_ADMIN_PHONE").unwrap_or_default(),
        password,
    })
}

fn smtp_from_env() -> Option<SmtpConfig> {
    Some(SmtpConfig {
        host: std::env::var("MARKETBASE_SMTP_HOST").ok()?,
        username: std::env::var("MARKETBASE_SMTP_USERNAME").ok()?,
        password: std::env::var("MARKETBASE_SMTP_PASSWORD").ok()?,
        from: std::env::var("MARKETBASE_SMTP_FROM").ok()?,
    })
}
