//! Phone rule primitives
//!
//! Masked phone inputs arrive as text such as `+7 (912) 345-67-__`. The value
//! is first canonicalized with [`strip_mask`], which removes formatting but
//! keeps mask placeholders, and only then checked with [`phone_format`]. A
//! placeholder that survives canonicalization means the user has not finished
//! typing, which is reported separately from a wrongly shaped number.

use crate::RuleResult;

/// Formatting characters a phone mask inserts between digits.
const MASK_SEPARATORS: &[char] = &[' ', '-', '(', ')', '.', '\u{a0}'];

/// Accepted shape of a canonical phone number: `+` followed by digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneShape {
    pub min_digits: usize,
    pub max_digits: usize,
    /// Characters the input mask shows for unfilled positions.
    pub placeholders: Vec<char>,
}

impl Default for PhoneShape {
    fn default() -> Self {
        Self {
            min_digits: 7,
            max_digits: 15,
            placeholders: vec!['_'],
        }
    }
}

/// Removes mask formatting from a raw phone input.
///
/// Placeholders are kept on purpose: they are the signal that the mask is
/// only partially filled.
pub fn strip_mask(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !MASK_SEPARATORS.contains(c))
        .collect()
}

/// True when a mask placeholder is still present in the value.
pub fn has_placeholder(value: &str, shape: &PhoneShape) -> bool {
    value.chars().any(|c| shape.placeholders.contains(&c))
}

/// Validates a canonical phone number against `shape`.
pub fn phone_format(
    value: &str,
    shape: &PhoneShape,
    incomplete_message: &str,
    format_message: &str,
) -> RuleResult {
    if has_placeholder(value, shape) {
        return Err(incomplete_message.to_string());
    }

    let digits = match value.strip_prefix('+') {
        Some(rest) => rest,
        None => return Err(format_message.to_string()),
    };

    let well_formed = digits.chars().all(|c| c.is_ascii_digit())
        && (shape.min_digits..=shape.max_digits).contains(&digits.len());

    if well_formed {
        Ok(())
    } else {
        Err(format_message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const INCOMPLETE: &str = "incomplete number";
    const FORMAT: &str = "bad format";

    fn fixed_twelve() -> PhoneShape {
        PhoneShape {
            min_digits: 12,
            max_digits: 12,
            ..PhoneShape::default()
        }
    }

    #[test]
    fn test_strip_mask() {
        assert_eq!(strip_mask(" +7 (912) 345-67-89 "), "+79123456789");
        assert_eq!(strip_mask("+7 (912) ___-__-__"), "+7912_______");
        assert_eq!(strip_mask(""), "");
    }

    #[rstest]
    #[case("+1234567890__", Err(INCOMPLETE))]
    #[case("+1_", Err(INCOMPLETE))]
    #[case("+123456789012", Ok(()))]
    #[case("+1234567", Ok(()))]
    #[case("+123456", Err(FORMAT))]
    #[case("+1234567890123456", Err(FORMAT))]
    #[case("123456789012", Err(FORMAT))]
    #[case("+12345abc9012", Err(FORMAT))]
    fn test_default_shape(#[case] input: &str, #[case] expected: Result<(), &str>) {
        let result = phone_format(input, &PhoneShape::default(), INCOMPLETE, FORMAT);
        assert_eq!(result, expected.map_err(str::to_string));
    }

    #[test]
    fn test_fixed_digit_count() {
        let shape = fixed_twelve();
        assert!(phone_format("+123456789012", &shape, INCOMPLETE, FORMAT).is_ok());
        assert_eq!(
            phone_format("+12345678901", &shape, INCOMPLETE, FORMAT),
            Err(FORMAT.to_string())
        );
    }

    #[test]
    fn test_custom_placeholder() {
        let shape = PhoneShape {
            placeholders: vec!['_', '#'],
            ..PhoneShape::default()
        };
        assert_eq!(
            phone_format("+12345####", &shape, INCOMPLETE, FORMAT),
            Err(INCOMPLETE.to_string())
        );
    }
}
