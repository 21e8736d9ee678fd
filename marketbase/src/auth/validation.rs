use super::error::AuthError;

/// Reject missing or blank input
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::validation(format!("{field} is required")));
    }
    Ok(value)
}

/// Shape check only: one `@`, something on both sides, no whitespace.
/// Ownership is proven by the verification mail, not here.
pub fn validate_email(email: &str) -> Result<&str, AuthError> {
    let email = require("email", email)?;

    let mut parts = email.split('@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    let well_formed = parts.next().is_none()
        && !local.is_empty()
        && !domain.is_empty()
        && !email.chars().any(char::is_whitespace);

    if !well_formed {
        return Err(AuthError::validation("email is malformed"));
    }
    Ok(email)
}
