//! Cross-field equality primitives

use crate::RuleResult;

/// Fails when the two field values differ.
///
/// An absent value only equals another absent value.
pub fn equals_field(value: Option<&str>, other: Option<&str>, message: &str) -> RuleResult {
    if value == other {
        Ok(())
    } else {
        Err(message.to_string())
    }
}
