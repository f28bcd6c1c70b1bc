// File: src/result.rs
// Purpose: Immutable outcome of one validation pass

use indexmap::IndexMap;

use crate::value::CanonicalRecord;

/// Snapshot of a single validation run.
///
/// Holds at most one message per field (the first failure). The canonical
/// record is only present when there are no errors, so a caller can never
/// hand an invalid record to the presentation layer by accident.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    field_errors: IndexMap<String, String>,
    canonical: Option<CanonicalRecord>,
}

impl ValidationResult {
    pub(crate) fn new(field_errors: IndexMap<String, String>, canonical: CanonicalRecord) -> Self {
        let canonical = field_errors.is_empty().then_some(canonical);
        Self {
            field_errors,
            canonical,
        }
    }

    /// True iff no field has an error.
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// Per-field messages in schema order.
    pub fn field_errors(&self) -> &IndexMap<String, String> {
        &self.field_errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    pub fn error_count(&self) -> usize {
        self.field_errors.len()
    }

    /// The coerced record, present iff the result is valid.
    pub fn canonical(&self) -> Option<&CanonicalRecord> {
        self.canonical.as_ref()
    }

    pub fn into_canonical(self) -> Option<CanonicalRecord> {
        self.canonical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    fn record() -> CanonicalRecord {
        let mut record = CanonicalRecord::new();
        record.insert("name".into(), FieldValue::Text("Ivan".into()));
        record
    }

    #[test]
    fn test_valid_result_carries_record() {
        let result = ValidationResult::new(IndexMap::new(), record());
        assert!(result.is_valid());
        assert_eq!(result.error_count(), 0);
        assert_eq!(result.canonical(), Some(&record()));
    }

    #[test]
    fn test_invalid_result_drops_record() {
        let mut errors = IndexMap::new();
        errors.insert("email".to_string(), "Enter a valid email".to_string());
        let result = ValidationResult::new(errors, record());
        assert!(!result.is_valid());
        assert_eq!(result.error("email"), Some("Enter a valid email"));
        assert!(result.canonical().is_none());
    }
}
