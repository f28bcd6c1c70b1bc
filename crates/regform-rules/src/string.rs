//! String rule primitives

use regex::Regex;

use crate::RuleResult;

/// Fails when the value is absent or the empty string.
pub fn required(value: Option<&str>, message: &str) -> RuleResult {
    match value {
        Some(s) if !s.is_empty() => Ok(()),
        _ => Err(message.to_string()),
    }
}

/// Fails when the value has fewer than `min` characters.
///
/// Length is counted in characters, not bytes, so Cyrillic names and
/// passwords are measured the way the user typed them.
pub fn min_length(s: &str, min: usize, message: &str) -> RuleResult {
    if s.chars().count() >= min {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

pub fn max_length(s: &str, max: usize, message: &str) -> RuleResult {
    if s.chars().count() <= max {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

/// Fails when `pattern` finds no match in the value.
///
/// Anchoring is the pattern's business: `^...$` for whole-value shapes,
/// an unanchored class such as `[A-Z]` for "contains at least one".
pub fn pattern(s: &str, pattern: &Regex, message: &str) -> RuleResult {
    if pattern.is_match(s) {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

/// Enum/choice restriction
pub fn one_of<S: AsRef<str>>(s: &str, allowed: &[S], message: &str) -> RuleResult {
    if allowed.iter().any(|a| a.as_ref() == s) {
        Ok(())
    } else {
        Err(message.to_string())
    }
}
