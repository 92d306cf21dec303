/// Field validation helpers
///
/// Identity formats (email, mobile number) are checked with regexes shared by
/// signup, bulk import and profile updates. Range checks on profile records are
/// declared with `validator` derives; `describe` flattens their errors into a
/// single message with dotted field paths.
use crate::error::{PortalError, PortalResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use validator::{ValidationErrors, ValidationErrorsKind};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref MOBILE_RE: Regex = Regex::new(r"^[6-9][0-9]{9}$").unwrap();
}

/// Minimum password length for self-chosen passwords
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Check an email address shape
pub fn validate_email(email: &str) -> PortalResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(PortalError::Validation(format!(
            "Please enter a valid email address: {}",
            email
        )))
    }
}

/// Check a 10-digit mobile number
pub fn validate_mobile(mobile: &str) -> PortalResult<()> {
    if MOBILE_RE.is_match(mobile) {
        Ok(())
    } else {
        Err(PortalError::Validation(
            "Please enter a valid 10-digit mobile number".to_string(),
        ))
    }
}

/// Check a self-chosen password
pub fn validate_password_strength(password: &str) -> PortalResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PortalError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Render validation errors as `path: code` pairs, sorted for stable output
pub fn describe(errors: &ValidationErrors) -> String {
    let mut out = BTreeSet::new();
    collect(errors, "", &mut out);
    out.into_iter().collect::<Vec<_>>().join("; ")
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut BTreeSet<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let detail = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.insert(format!("{}: {}", path, detail));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last@college.edu.in").is_ok());

        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("spaces in@x.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_mobile_numbers() {
        assert!(validate_mobile("9876543210").is_ok());
        assert!(validate_mobile("6000000000").is_ok());

        // Must start with 6-9
        assert!(validate_mobile("5876543210").is_err());
        // Exactly ten digits
        assert!(validate_mobile("987654321").is_err());
        assert!(validate_mobile("98765432100").is_err());
        assert!(validate_mobile("98765abcde").is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("secret").is_ok());
        assert!(validate_password_strength("short").is_err());
    }
}
