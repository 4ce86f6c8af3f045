//! Field validators for user and address input
//!
//! Each validator returns `DomainError::Validation` with a message naming
//! the offending field.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::entities::NewAddress;
use crate::error::DomainError;

const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 50;
const PASSWORD_MIN_LEN: usize = 8;
const NAME_FORBIDDEN: &str = "0123456789!@#$%^&*(),.?\":{}|<>";

/// A short list of passwords that are refused outright
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "letmein1",
    "welcome1",
    "admin123",
    "abc12345",
    "football",
    "baseball",
    "sunshine",
    "princess",
    "azerty123",
    "motdepasse",
];

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
            .expect("email regex compiles")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?1?\d{9,15}$").expect("phone regex compiles"))
}

fn zip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9]{3,10}(-[A-Z0-9]{4})?$").expect("zip regex compiles")
    })
}

fn invalid(msg: impl Into<String>) -> DomainError {
    DomainError::Validation(msg.into())
}

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.is_empty() {
        return Err(invalid("The Email must be set"));
    }
    if email.len() > 254 || !email_regex().is_match(email) {
        return Err(invalid("Enter a valid email address."));
    }
    Ok(())
}

/// First and last names: 2 to 50 characters, no digits or punctuation
pub fn validate_name(field: &str, value: &str) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len < NAME_MIN_LEN || len > NAME_MAX_LEN {
        return Err(invalid(format!(
            "{} must be between {} and {} characters",
            field, NAME_MIN_LEN, NAME_MAX_LEN
        )));
    }
    if value.chars().any(|c| NAME_FORBIDDEN.contains(c)) {
        return Err(invalid(format!(
            "{} cannot contain numbers or special characters.",
            field
        )));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), DomainError> {
    if !phone.starts_with('+') {
        return Err(invalid("Phone number must start with \"+\""));
    }
    if !phone_regex().is_match(phone) {
        return Err(invalid(
            "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed.",
        ));
    }
    Ok(())
}

pub fn validate_zip_code(zip: &str) -> Result<(), DomainError> {
    if !zip_regex().is_match(zip) {
        return Err(invalid("Invalid postal code format."));
    }
    if zip.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid("ZIP code cannot contain only letters."));
    }
    Ok(())
}

/// Two-letter uppercase country code
pub fn validate_country(country: &str) -> Result<(), DomainError> {
    if country.len() == 2 && country.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(invalid("Invalid country code."))
    }
}

fn validate_min_len(field: &str, value: &str, min: usize) -> Result<(), DomainError> {
    if value.trim().chars().count() < min {
        return Err(invalid(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }
    Ok(())
}

pub fn validate_address(address: &NewAddress) -> Result<(), DomainError> {
    validate_country(&address.country)?;
    validate_min_len("state", &address.state, 2)?;
    validate_min_len("city", &address.city, 2)?;
    validate_min_len("address_line1", &address.address_line1, 5)?;
    validate_zip_code(&address.zip_code)?;

    if !address.address_line2.is_empty() && address.address_line2 == address.address_line1 {
        return Err(invalid(
            "Address line 2 cannot be the same as Address line 1",
        ));
    }
    Ok(())
}

/// Password strength rules.
///
/// `attributes` holds the user's own values (email, names); a password that
/// contains one of them, or is contained in one, is refused.
pub fn validate_password(password: &str, attributes: &[&str]) -> Result<(), DomainError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(invalid(format!(
            "This password is too short. It must contain at least {} characters.",
            PASSWORD_MIN_LEN
        )));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("This password is entirely numeric."));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err(invalid("This password is too common."));
    }

    for attribute in attributes {
        let attribute = attribute.to_lowercase();
        let local = attribute.split('@').next().unwrap_or(&attribute);
        if local.chars().count() < 3 {
            continue;
        }
        if lowered.contains(local) || local.contains(lowered.as_str()) {
            return Err(invalid(
                "The password is too similar to your personal information.",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> NewAddress {
        NewAddress {
            country: "FR".to_string(),
            state: "IDF".to_string(),
            city: "Paris".to_string(),
            address_line1: "12 rue de Rivoli".to_string(),
            address_line2: String::new(),
            zip_code: "75001".to_string(),
        }
    }

    #[test]
    fn emails() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+tag@sub.example.co").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("alice@localhost").is_err());
        assert!(validate_email("alice@@example.com").is_err());
    }

    #[test]
    fn names() {
        assert!(validate_name("first_name", "Alice").is_ok());
        assert!(validate_name("first_name", "Jean-Luc").is_ok());
        assert!(validate_name("first_name", "Zoé").is_ok());
        assert!(validate_name("first_name", "A").is_err());
        assert!(validate_name("first_name", "R2D2").is_err());
        assert!(validate_name("last_name", "O'Brien!").is_err());
        assert!(validate_name("last_name", &"x".repeat(51)).is_err());
    }

    #[test]
    fn phones() {
        assert!(validate_phone("+33123456789").is_ok());
        assert!(validate_phone("33123456789").is_err());
        assert!(validate_phone("+123").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
    }

    #[test]
    fn zip_codes() {
        assert!(validate_zip_code("75001").is_ok());
        assert!(validate_zip_code("12345-6789").is_ok());
        assert!(validate_zip_code("sw1a1aa").is_ok());
        assert!(validate_zip_code("ab").is_err());
        assert!(validate_zip_code("ABCDE").is_err());
        assert!(validate_zip_code("75 001").is_err());
    }

    #[test]
    fn countries() {
        assert!(validate_country("US").is_ok());
        assert!(validate_country("us").is_err());
        assert!(validate_country("USA").is_err());
    }

    #[test]
    fn full_address_validation() {
        assert!(validate_address(&address()).is_ok());

        let mut short_line = address();
        short_line.address_line1 = "1 A".to_string();
        assert!(validate_address(&short_line).is_err());

        let mut duplicate = address();
        duplicate.address_line2 = duplicate.address_line1.clone();
        let err = validate_address(&duplicate).unwrap_err();
        assert!(err.to_string().contains("Address line 2"));
    }

    #[test]
    fn passwords() {
        assert!(validate_password("c0rrect-h0rse", &[]).is_ok());
        assert!(validate_password("short1", &[]).is_err());
        assert!(validate_password("1234567890", &[]).is_err());
        assert!(validate_password("Password123", &[]).is_err());
    }

    #[test]
    fn password_similar_to_attributes() {
        let err = validate_password("alicewonder", &["alice@example.com", "Alice", "Martin"])
            .unwrap_err();
        assert!(err.to_string().contains("similar"));

        // Two-letter attributes are ignored
        assert!(validate_password("bo-strong-pass", &["Bo"]).is_ok());
    }
}
