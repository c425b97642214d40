//! Field-level validation shared by every request type.

use std::collections::HashMap;

use thiserror::Error;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 128;
pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 50;
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Rejected request with one message per offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: HashMap<String, String>,
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut validator = Validator::new();
        validator.error(field, message);
        Self::from_errors(validator.errors)
    }

    fn from_errors(errors: Vec<(String, String)>) -> Self {
        let message = match errors.first() {
            Some((field, message)) => format!("{}: {}", field, message),
            None => "Validation failed".to_string(),
        };
        Self {
            message,
            field_errors: errors.into_iter().collect(),
        }
    }
}

/// Collects the first error per field, in the order fields were checked.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<(String, String)>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        let field = field.into();
        if !self.errors.iter().any(|(existing, _)| *existing == field) {
            self.errors.push((field, message.into()));
        }
        self
    }

    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.error(field, message);
        }
        self
    }

    /// Record the outcome of a rule function.
    pub fn rule(&mut self, field: impl Into<String>, outcome: Result<(), String>) -> &mut Self {
        if let Err(message) = outcome {
            self.error(field, message);
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::from_errors(self.errors))
        }
    }
}

pub fn length_between(value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len < min {
        if min == 1 {
            return Err("must not be empty".to_string());
        }
        return Err(format!("must be at least {} characters", min));
    }
    if len > max {
        return Err(format!("must be at most {} characters", max));
    }
    Ok(())
}

pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("must not be empty".to_string());
    }
    if email.len() > EMAIL_MAX_LENGTH {
        return Err(format!("must be at most {} characters", EMAIL_MAX_LENGTH));
    }
    if email.chars().any(char::is_whitespace) {
        return Err("must be a valid email".to_string());
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err("must be a valid email".to_string()),
    };

    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });

    if local.is_empty() || !domain_ok {
        return Err("must be a valid email".to_string());
    }
    Ok(())
}

pub fn validate_password_strength(password: &str) -> Result<(), String> {
    length_between(password, PASSWORD_MIN_LENGTH, PASSWORD_MAX_LENGTH)?;

    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if !(has_lower && has_upper && has_digit && has_symbol) {
        return Err(
            "must contain at least one lowercase letter, one uppercase letter, one number and one special character"
                .to_string(),
        );
    }
    Ok(())
}

pub fn validate_http_url(value: &str) -> Result<(), String> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err("must be a valid http(s) URL".to_string()),
    }
}

pub fn validate_positive_amount(value: f64) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err("must be a positive number".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(validate_email_format("a@x.com").is_ok());
        assert!(validate_email_format("first.last+tag@sub.example.org").is_ok());
        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("no-at-sign.com").is_err());
        assert!(validate_email_format("a@b@c.com").is_err());
        assert!(validate_email_format("a@localhost").is_err());
        assert!(validate_email_format("a@x..com").is_err());
        assert!(validate_email_format("a b@x.com").is_err());
        assert!(validate_email_format("@x.com").is_err());
    }

    #[test]
    fn password_strength() {
        assert!(validate_password_strength("Abc12345!").is_ok());
        assert!(validate_password_strength("Ab1!").is_err());
        assert!(validate_password_strength("abc12345!").is_err());
        assert!(validate_password_strength("ABC12345!").is_err());
        assert!(validate_password_strength("Abcdefgh!").is_err());
        assert!(validate_password_strength("Abc123456").is_err());
    }

    #[test]
    fn http_urls_only() {
        assert!(validate_http_url("https://cdn.example.com/pen.png").is_ok());
        assert!(validate_http_url("ftp://example.com/pen.png").is_err());
        assert!(validate_http_url("not a url").is_err());
    }

    #[test]
    fn validator_keeps_first_error_per_field_in_order() {
        let mut v = Validator::new();
        v.check(false, "price", "must be a positive number")
            .check(false, "price", "second message")
            .rule("name", length_between("", 1, 10));

        let err = v.finish().unwrap_err();
        assert_eq!(err.message, "price: must be a positive number");
        assert_eq!(err.field_errors.len(), 2);
        assert_eq!(err.field_errors["name"], "must not be empty");
    }

    #[test]
    fn empty_validator_passes() {
        assert!(Validator::new().finish().is_ok());
    }
}
