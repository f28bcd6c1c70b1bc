//! Email rule primitives

use once_cell::sync::Lazy;
use regex::Regex;

use crate::RuleResult;

/// Email shape accepted by the registration form.
pub static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

/// Validates basic email format
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn email(value: &str, message: &str) -> RuleResult {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(message.to_string())
    }
}
