//! Outbound verification mail.
//!
//! The auth service only ever talks to the [`Notifier`] trait and never waits on it:
//! sends run on a spawned task and their failures are logged, not returned.
//! [`LogNotifier`] is the local default; [`SmtpNotifier`] relays through an SMTP server.

use super::models::SellerId;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the verification mail for a new or pending seller
    async fn send_verification_email(
        &self,
        email: &str,
        seller_id: &SellerId,
        token: &str,
    ) -> Result<(), NotifyError>;
}

/// Rendered verification mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationEmail {
    pub to: String,
    pub subject: String,
    pub link: String,
    pub html: String,
}

impl VerificationEmail {
    pub const SUBJECT: &'static str = "Verify Your Email";

    pub fn compose(public_base_url: &str, email: &str, seller_id: &SellerId, token: &str) -> Self {
        let link = format!(
            "{}/admin/verify-email?token={}",
            public_base_url.trim_end_matches('/'),
            token
        );
        let html = format!(
            r#"<div>
  <h2>Welcome Aboard Seller</h2>
  <h3>Use your new unique ID to log in, but first verify your email</h3>
  <h3>Unique ID : {seller_id}</h3>
  <p>Please click the link below to verify your email:</p>
  <a href="{link}">Verify Email with link {link}</a>
</div>"#
        );

        Self {
            to: email.to_string(),
            subject: Self::SUBJECT.to_string(),
            link,
            html,
        }
    }

    /// The link with its token masked, safe to write to logs
    pub fn redacted_link(&self) -> String {
        match self.link.split_once("token=") {
            Some((base, _)) => format!("{base}token=<redacted>"),
            None => self.link.clone(),
        }
    }
}

/// Logs the mail instead of sending it.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    public_base_url: String,
}

impl LogNotifier {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification_email(
        &self,
        email: &str,
        seller_id: &SellerId,
        token: &str,
    ) -> Result<(), NotifyError> {
        let message = VerificationEmail::compose(&self.public_base_url, email, seller_id, token);
        info!(
            to_email = %message.to,
            seller_id = %seller_id,
            link = %message.redacted_link(),
            "verification email (log only)"
        );
        Ok(())
    }
}

/// Sends verification mail through an authenticated SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    public_base_url: String,
}

impl SmtpNotifier {
    pub fn new(
        host: &str,
        username: &str,
        password: &str,
        from: &str,
        public_base_url: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Address(e.to_string()))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(Self {
            transport,
            from,
            public_base_url: public_base_url.into(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_verification_email(
        &self,
        email: &str,
        seller_id: &SellerId,
        token: &str,
    ) -> Result<(), NotifyError> {
        let rendered = VerificationEmail::compose(&self.public_base_url, email, seller_id, token);
        let to = rendered
            .to
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Address(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(rendered.subject)
            .header(ContentType::TEXT_HTML)
            .body(rendered.html)
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_embeds_id_and_link() {
        let seller_id = SellerId::from_number(12345).unwrap();
        let mail =
            VerificationEmail::compose("http://localhost:5000/", "a@x.com", &seller_id, "abc");

        assert_eq!(mail.to, "a@x.com");
        assert_eq!(mail.subject, "Verify Your Email");
        assert_eq!(mail.link, "http://localhost:5000/admin/verify-email?token=abc");
        assert!(mail.html.contains("MBSLR12345"));
        assert!(mail.html.contains(&mail.link));
    }

    #[test]
    fn test_redacted_link_hides_token() {
        let seller_id = SellerId::from_number(12345).unwrap();
        let token = "0f1e2d3c4b5a69788796a5b4c3d2e1f0";
        let mail =
            VerificationEmail::compose("https://sell.example.com", "a@x.com", &seller_id, token);

        let redacted = mail.redacted_link();
        assert!(!redacted.contains(token));
        assert_eq!(
            redacted,
            "https://sell.example.com/admin/verify-email?token=<redacted>"
        );
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notifier = LogNotifier::new("http://localhost:5000");
        let seller_id = SellerId::from_number(12345).unwrap();

        assert!(
            notifier
                .send_verification_email("a@x.com", &seller_id, "abc")
                .await
                .is_ok()
        );
    }

    #[test]
    fn test_smtp_notifier_rejects_bad_sender() {
        let result = SmtpNotifier::new("smtp.example.com", "u", "p", "not an address", "http://x");
        assert!(matches!(result, Err(NotifyError::Address(_))));
    }
}
