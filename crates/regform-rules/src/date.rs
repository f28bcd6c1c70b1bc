//! Date coercion and rule primitives

use chrono::{DateTime, NaiveDate};

use crate::RuleResult;

/// Formats accepted when none are configured.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"];

/// Parses a raw calendar value into a date.
///
/// Each format in `formats` is tried in order. RFC 3339 timestamps, which is
/// what date pickers usually serialize, are accepted as well and truncated to
/// their calendar date.
pub fn parse_date<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<NaiveDate> {
    let raw = raw.trim();

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt.as_ref()).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Fails when no date is present.
pub fn date_required(value: Option<NaiveDate>, message: &str) -> RuleResult {
    match value {
        Some(_) => Ok(()),
        None => Err(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_configured_formats() {
        assert_eq!(parse_date("1990-05-17", DEFAULT_DATE_FORMATS), Some(ymd(1990, 5, 17)));
        assert_eq!(parse_date("17.05.1990", DEFAULT_DATE_FORMATS), Some(ymd(1990, 5, 17)));
        assert_eq!(parse_date("17/05/1990", DEFAULT_DATE_FORMATS), Some(ymd(1990, 5, 17)));
        assert_eq!(parse_date(" 1990-05-17 ", DEFAULT_DATE_FORMATS), Some(ymd(1990, 5, 17)));
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(
            parse_date("1990-05-17T09:30:00.000Z", DEFAULT_DATE_FORMATS),
            Some(ymd(1990, 5, 17))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_date("", DEFAULT_DATE_FORMATS), None);
        assert_eq!(parse_date("yesterday", DEFAULT_DATE_FORMATS), None);
        assert_eq!(parse_date("1990-02-30", DEFAULT_DATE_FORMATS), None);
        assert_eq!(parse_date("17.05.1990", &["%Y-%m-%d"]), None);
    }

    #[test]
    fn test_date_required() {
        assert!(date_required(Some(ymd(2000, 1, 1)), "pick").is_ok());
        assert_eq!(date_required(None, "pick"), Err("pick".to_string()));
    }
}
