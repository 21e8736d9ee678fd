use super::error::AuthError;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Marketplace seller identifier, `MBSLR` followed by five digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SellerId(String);

impl SellerId {
    pub const PREFIX: &'static str = "MBSLR";
    pub const MIN_NUMBER: u32 = 10_000;
    pub const MAX_NUMBER: u32 = 99_999;

    /// Build an id from its numeric part. Returns `None` outside the five digit range.
    pub fn from_number(number: u32) -> Option<Self> {
        (Self::MIN_NUMBER..=Self::MAX_NUMBER)
            .contains(&number)
            .then(|| Self(format!("{}{}", Self::PREFIX, number)))
    }

    /// Uniformly random id over the full five digit range.
    pub fn random() -> Self {
        let number = rand::rng().random_range(Self::MIN_NUMBER..=Self::MAX_NUMBER);
        Self(format!("{}{}", Self::PREFIX, number))
    }

    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let digits = raw
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| AuthError::validation("seller id must start with MBSLR"))?;
        if digits.len() != 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuthError::validation(
                "seller id must end with five decimal digits",
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SellerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SellerId {
    type Error = AuthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SellerId> for String {
    fn from(id: SellerId) -> Self {
        id.0
    }
}

/// Permission tier. `Seller` is the base tier every signup receives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Durable shadow of the external session binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::LoggedOut => "loggedout",
            SessionState::LoggedIn => "loggedin",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionState {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loggedout" => Ok(SessionState::LoggedOut),
            "loggedin" => Ok(SessionState::LoggedIn),
            other => Err(AuthError::validation(format!(
                "unknown session state '{other}'"
            ))),
        }
    }
}

/// Outstanding email verification. Token and expiry only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingVerification {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seller {
    pub seller_id: SellerId,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub role: Role,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub verification: Option<PendingVerification>,
    pub session_state: SessionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Seller {
    /// A freshly signed up seller: base tier, unverified, logged out.
    pub fn new(
        seller_id: SellerId,
        email: String,
        phone_number: String,
        password_hash: String,
        verification: PendingVerification,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            seller_id,
            email,
            phone_number,
            password_hash,
            role: Role::default(),
            email_verified: false,
            phone_verified: false,
            verification: Some(verification),
            session_state: SessionState::LoggedOut,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn verification_token(&self) -> Option<&str> {
        self.verification.as_ref().map(|v| v.token.as_str())
    }

    pub fn verification_token_expiry(&self) -> Option<DateTime<Utc>> {
        self.verification.as_ref().map(|v| v.expires_at)
    }

    pub fn is_verified(&self) -> bool {
        self.email_verified || self.phone_verified
    }

    pub fn matches_contact(&self, email_or_phone: &str) -> bool {
        self.email == email_or_phone
            || (!self.phone_number.is_empty() && self.phone_number == email_or_phone)
    }

    pub fn mark_email_verified(&mut self, now: DateTime<Utc>) {
        self.email_verified = true;
        self.verification = None;
        self.updated_at = now;
    }

    pub fn rotate_verification(&mut self, verification: PendingVerification, now: DateTime<Utc>) {
        self.verification = Some(verification);
        self.updated_at = now;
    }

    pub fn log_in(&mut self, now: DateTime<Utc>) {
        self.session_state = SessionState::LoggedIn;
        self.updated_at = now;
    }

    pub fn log_out(&mut self, now: DateTime<Utc>) {
        self.session_state = SessionState::LoggedOut;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending(now: DateTime<Utc>) -> PendingVerification {
        PendingVerification {
            token: "tok".to_string(),
            expires_at: now + Duration::hours(1),
        }
    }

    fn seller(now: DateTime<Utc>) -> Seller {
        Seller::new(
            SellerId::from_number(12345).unwrap(),
            "a@x.com".to_string(),
            "555-0100".to_string(),
            "hash".to_string(),
            pending(now),
            now,
        )
    }

    #[test]
    fn test_seller_id_format() {
        assert_eq!(SellerId::from_number(10000).unwrap().as_str(), "MBSLR10000");
        assert!(SellerId::from_number(9999).is_none());
        assert!(SellerId::from_number(100000).is_none());

        assert!(SellerId::parse("MBSLR54321").is_ok());
        assert!(SellerId::parse("MBSLR5432").is_err());
        assert!(SellerId::parse("MBSLR5432a").is_err());
        assert!(SellerId::parse("XXSLR54321").is_err());
    }

    #[test]
    fn test_seller_id_serde_rejects_malformed() {
        let id: SellerId = serde_json::from_str("\"MBSLR11111\"").unwrap();
        assert_eq!(id.as_str(), "MBSLR11111");
        assert!(serde_json::from_str::<SellerId>("\"bogus\"").is_err());
    }

    #[test]
    fn test_session_state_is_closed() {
        assert_eq!("loggedin".parse::<SessionState>().unwrap(), SessionState::LoggedIn);
        assert_eq!("loggedout".parse::<SessionState>().unwrap(), SessionState::LoggedOut);
        assert!("online".parse::<SessionState>().is_err());
        assert!(serde_json::from_str::<SessionState>("\"LoggedIn\"").is_err());
        assert_eq!(
            serde_json::to_string(&SessionState::LoggedIn).unwrap(),
            "\"loggedin\""
        );
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Seller);
    }

    #[test]
    fn test_new_seller_defaults() {
        let now = Utc::now();
        let seller = seller(now);

        assert_eq!(seller.role, Role::Seller);
        assert!(!seller.is_verified());
        assert_eq!(seller.session_state, SessionState::LoggedOut);
        assert_eq!(seller.verification_token(), Some("tok"));
        assert_eq!(seller.verification_token_expiry(), Some(now + Duration::hours(1)));
    }

    #[test]
    fn test_verification_clears_token_and_expiry_together() {
        let now = Utc::now();
        let mut seller = seller(now);

        seller.mark_email_verified(now);

        assert!(seller.email_verified);
        assert!(seller.verification_token().is_none());
        assert!(seller.verification_token_expiry().is_none());
    }

    #[test]
    fn test_matches_contact() {
        let seller = seller(Utc::now());
        assert!(seller.matches_contact("a@x.com"));
        assert!(seller.matches_contact("555-0100"));
        assert!(!seller.matches_contact("b@x.com"));
        assert!(!seller.matches_contact(""));
    }

    #[test]
    fn test_explicit_session_transitions() {
        let now = Utc::now();
        let mut seller = seller(now);

        seller.log_in(now);
        assert_eq!(seller.session_state, SessionState::LoggedIn);
        seller.log_out(now);
        assert_eq!(seller.session_state, SessionState::LoggedOut);
    }
}
