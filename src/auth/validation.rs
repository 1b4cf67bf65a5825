use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::password::PASSWORD_MIN_LEN;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".into());
    }
    if !is_valid_email(email) {
        return Err("Please enter a valid email address".into());
    }
    Ok(())
}

pub fn validate_otp(otp: &str) -> Result<(), String> {
    if otp.is_empty() {
        return Err("Verification code is required".into());
    }
    if otp.len() != 6 || !otp.bytes().all(|b| b.is_ascii_digit()) {
        return Err("Enter the 6-digit code".into());
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name is required".into());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".into());
    }
    if password.len() < PASSWORD_MIN_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        ));
    }
    Ok(())
}

/// Validate every signup field, collecting failures per field instead of
/// stopping at the first, so a form can highlight all of them at once.
/// Inputs are expected pre-normalized (email lowercased, fields trimmed).
pub fn validate_signup(
    email: &str,
    otp: &str,
    name: &str,
    password: &str,
) -> BTreeMap<&'static str, String> {
    let mut errors = BTreeMap::new();
    if let Err(e) = validate_email(email) {
        errors.insert("email", e);
    }
    if let Err(e) = validate_otp(otp) {
        errors.insert("otp", e);
    }
    if let Err(e) = validate_name(name) {
        errors.insert("name", e);
    }
    if let Err(e) = validate_password(password) {
        errors.insert("password", e);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("alice@x.com"));
        assert!(is_valid_email("a.b+tag@sub.domain.io"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@x"));
        assert!(!is_valid_email("alice @x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn otp_must_be_exactly_six_digits() {
        assert!(validate_otp("000000").is_ok());
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp("").is_err());
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("1234567").is_err());
        assert!(validate_otp("12345a").is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn signup_collects_every_offending_field() {
        let errors = validate_signup("not-an-email", "12", "", "abc");
        assert_eq!(errors.len(), 4);
        assert_eq!(errors["email"], "Please enter a valid email address");
        assert_eq!(errors["otp"], "Enter the 6-digit code");
        assert_eq!(errors["name"], "Name is required");
        assert_eq!(errors["password"], "Password must be at least 6 characters");
    }

    #[test]
    fn signup_with_valid_fields_collects_nothing() {
        let errors = validate_signup("alice@x.com", "042137", "Alice", "secret1");
        assert!(errors.is_empty());
    }
}
