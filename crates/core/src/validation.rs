//! Input validation shared by the sign-up and profile endpoints.

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum length for short free-text fields (names, schools, titles).
pub const MAX_SHORT_TEXT: usize = 200;

/// Maximum length for long free-text fields (descriptions, comments).
pub const MAX_LONG_TEXT: usize = 2000;

/// Largest money value a `NUMERIC(12, 2)` column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Decimal places kept for money.
pub const MONEY_SCALE: u32 = 2;

/// A field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("{0} must be a positive number")]
    NotPositive(&'static str),
    #[error("{0} must be a valid http(s) URL")]
    InvalidUrl(&'static str),
    #[error("{0} must have at most two decimal places and be below 10,000,000,000")]
    InvalidAmount(&'static str),
}

/// Check a new password and its confirmation.
///
/// # Errors
///
/// Returns `PasswordTooShort` or `PasswordMismatch`.
pub fn validate_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Trim a required field and enforce a maximum length.
///
/// # Errors
///
/// Returns `Required` if blank, `TooLong` past `max` characters.
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional field; blank becomes `None`.
///
/// # Errors
///
/// Returns `TooLong` past `max` characters.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        Some(v) => Ok(Some(v.to_owned())),
    }
}

/// Check that a quantity is at least one.
///
/// # Errors
///
/// Returns `NotPositive` otherwise.
pub const fn positive_quantity(field: &'static str, value: i32) -> Result<i32, ValidationError> {
    if value < 1 {
        Err(ValidationError::NotPositive(field))
    } else {
        Ok(value)
    }
}

/// Check a money value fits the database column: two decimal places at
/// most and no more than [`MAX_AMOUNT`].
///
/// # Errors
///
/// Returns `InvalidAmount` otherwise. Sign is left to the caller.
pub fn money(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value.normalize().scale() > MONEY_SCALE || value.abs() > MAX_AMOUNT {
        return Err(ValidationError::InvalidAmount(field));
    }
    Ok(value)
}

/// Parse a user-supplied link (e.g. an Amazon wishlist) and store its
/// normalised form.
///
/// # Errors
///
/// Returns `InvalidUrl` unless the value parses as an `http` or `https` URL
/// with a host.
pub fn optional_link(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    let Some(link) = optional_text(field, value, MAX_SHORT_TEXT * 4)? else {
        return Ok(None);
    };
    let url = Url::parse(&link).map_err(|_| ValidationError::InvalidUrl(field))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::InvalidUrl(field));
    }
    Ok(Some(url.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_rules() {
        assert_eq!(
            validate_password("abc", "abc"),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_password("abcdef", "abcdeg"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(validate_password("abcdef", "abcdef"), Ok(()));
    }

    #[test]
    fn test_required_text() {
        assert_eq!(
            required_text("school", "   ", 10),
            Err(ValidationError::Required("school"))
        );
        assert_eq!(required_text("school", " St. John's ", 20), Ok("St. John's".to_owned()));
        assert!(matches!(
            required_text("school", "abcdefghijk", 10),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(optional_text("grade", Some("  "), 10), Ok(None));
        assert_eq!(optional_text("grade", None, 10), Ok(None));
        assert_eq!(optional_text("grade", Some(" 3 "), 10), Ok(Some("3".to_owned())));
    }

    #[test]
    fn test_positive_quantity() {
        assert_eq!(positive_quantity("quantity", 1), Ok(1));
        assert_eq!(
            positive_quantity("quantity", 0),
            Err(ValidationError::NotPositive("quantity"))
        );
    }

    #[test]
    fn test_optional_link() {
        assert_eq!(
            optional_link("link", Some("https://www.amazon.com/hz/wishlist/ls/ABC")),
            Ok(Some("https://www.amazon.com/hz/wishlist/ls/ABC".to_owned()))
        );
        assert_eq!(optional_link("link", Some("")), Ok(None));
        assert_eq!(
            optional_link("link", Some("amazon.com/list")),
            Err(ValidationError::InvalidUrl("link"))
        );
        assert_eq!(
            optional_link("link", Some("https://")),
            Err(ValidationError::InvalidUrl("link"))
        );
        assert_eq!(
            optional_link("link", Some("ftp://files.example.com/list")),
            Err(ValidationError::InvalidUrl("link"))
        );
    }

    #[test]
    fn test_optional_link_rejects_malformed_hosts() {
        for raw in ["https://[", "http://%%%", "https://a:b:c:d", "https://exa mple.com"] {
            assert_eq!(
                optional_link("link", Some(raw)),
                Err(ValidationError::InvalidUrl("link")),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_optional_link_normalises() {
        assert_eq!(
            optional_link("link", Some(" HTTPS://Example.COM ")),
            Ok(Some("https://example.com/".to_owned()))
        );
    }

    #[test]
    fn test_money_bounds() {
        assert_eq!(money("price", Decimal::new(1999, 2)), Ok(Decimal::new(1999, 2)));
        assert_eq!(money("price", Decimal::new(1500, 3)), Ok(Decimal::new(1500, 3)));
        assert_eq!(money("price", MAX_AMOUNT), Ok(MAX_AMOUNT));
        assert_eq!(
            money("price", Decimal::new(1, 3)),
            Err(ValidationError::InvalidAmount("price"))
        );
        assert_eq!(
            money("price", Decimal::new(100_000_000_000, 0)),
            Err(ValidationError::InvalidAmount("price"))
        );
    }
}
