// File: src/engine.rs
// Purpose: Two-phase validation of a raw record against a schema
//
// Phase 1 coerces and checks every field on its own; phase 2 runs the
// cross-field rules, but only when phase 1 left no errors at all.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::field::FieldDescriptor;
use crate::result::ValidationResult;
use crate::rule::{CrossFieldRule, RuleContext};
use crate::schema::Schema;
use crate::value::{FieldValue, RawRecord, RawValue};

static EMPTY: RawValue = RawValue::Missing;

/// Validates `record` against `schema`.
///
/// Deterministic and side-effect free apart from logging. Fields absent from
/// `record` are treated as missing; keys the schema does not know are ignored.
pub fn validate(schema: &Schema, record: &RawRecord) -> ValidationResult {
    validate_with_external(schema, record, &HashMap::new())
}

/// Like [`validate`], with field errors decided elsewhere (resolved async
/// checks) counted as field-level failures. A field's own rule failure takes
/// precedence over its external error.
pub fn validate_with_external(
    schema: &Schema,
    record: &RawRecord,
    external: &HashMap<String, String>,
) -> ValidationResult {
    let pass = Pass::new(schema, record);
    let mut errors: IndexMap<String, String> = IndexMap::new();

    for field in schema.fields() {
        let error = pass
            .own_error(field)
            .or_else(|| external.get(field.name()).cloned());
        if let Some(message) = error {
            errors.insert(field.name().to_string(), message);
        }
    }

    if errors.is_empty() {
        for rule in schema.cross_field_rules() {
            if let Err(message) = pass.cross_check(rule) {
                // never overwrite: the first message for a field stays
                errors.entry(rule.attach_to().to_string()).or_insert(message);
            }
        }
    }

    for key in record.keys().filter(|key| !schema.contains(key)) {
        debug!("Ignoring unknown field in record: {}", key);
    }

    debug!(
        "Validation pass: {} fields, {} errors",
        schema.len(),
        errors.len()
    );

    // order errors by declaration, not by discovery
    let mut ordered = IndexMap::with_capacity(errors.len());
    for name in schema.field_names() {
        if let Some(message) = errors.swap_remove(name) {
            ordered.insert(name.to_string(), message);
        }
    }

    ValidationResult::new(ordered, pass.into_values())
}

/// Error currently owed by a single field, for live per-field feedback.
///
/// The field's own transform and rules come first. If they pass, the
/// cross-field rules attached to it are evaluated, but only those whose
/// dependencies all pass their own rules, so a half-typed password never
/// produces a "passwords do not match" message on its confirmation.
///
/// Returns `None` for fields the schema does not know.
pub fn validate_field(schema: &Schema, field: &str, record: &RawRecord) -> Option<String> {
    let descriptor = schema.field(field)?;
    let pass = Pass::new(schema, record);

    if let Some(message) = pass.own_error(descriptor) {
        return Some(message);
    }

    schema
        .rules_attached_to(field)
        .filter(|rule| pass.dependencies_pass(rule))
        .find_map(|rule| pass.cross_check(rule).err())
}

/// Coerced value of one field, or `None` if it is unknown or fails to coerce.
pub fn coerce_field(schema: &Schema, field: &str, record: &RawRecord) -> Option<FieldValue> {
    schema.field(field)?.coerce(raw_value(record, field)).ok()
}

fn raw_value<'a>(record: &'a RawRecord, field: &str) -> &'a RawValue {
    record.get(field).unwrap_or(&EMPTY)
}

/// Coerced values and transform failures for one record.
struct Pass<'s> {
    schema: &'s Schema,
    values: IndexMap<String, FieldValue>,
    transform_errors: IndexMap<String, String>,
}

impl<'s> Pass<'s> {
    fn new(schema: &'s Schema, record: &RawRecord) -> Self {
        let mut values = IndexMap::with_capacity(schema.len());
        let mut transform_errors = IndexMap::new();

        for field in schema.fields() {
            let value = match field.coerce(raw_value(record, field.name())) {
                Ok(value) => value,
                Err(message) => {
                    transform_errors.insert(field.name().to_string(), message);
                    FieldValue::Missing
                }
            };
            values.insert(field.name().to_string(), value);
        }

        Self {
            schema,
            values,
            transform_errors,
        }
    }

    fn context(&self) -> RuleContext<'_> {
        RuleContext::new(&self.values)
    }

    /// Transform failure, else the first failing rule.
    fn own_error(&self, field: &FieldDescriptor) -> Option<String> {
        if let Some(message) = self.transform_errors.get(field.name()) {
            return Some(message.clone());
        }

        let ctx = self.context();
        let value = ctx.get(field.name());
        field
            .rules()
            .iter()
            .find_map(|rule| rule.check(value, &ctx).err())
    }

    fn dependencies_pass(&self, rule: &CrossFieldRule) -> bool {
        rule.depends_on().iter().all(|dep| {
            self.schema
                .field(dep)
                .map_or(true, |field| self.own_error(field).is_none())
        })
    }

    fn cross_check(&self, rule: &CrossFieldRule) -> Result<(), String> {
        rule.check(&self.context())
    }

    fn into_values(self) -> IndexMap<String, FieldValue> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Transform;
    use crate::rule::Rule;
    use crate::value::FieldKind;
    use pretty_assertions::assert_eq;

    fn password_schema() -> Schema {
        Schema::builder()
            .field(
                FieldDescriptor::new("password", FieldKind::Password)
                    .rule(Rule::required("Password is required"))
                    .rule(Rule::min_length(6, "Too short")),
            )
            .field(
                FieldDescriptor::new("confirm", FieldKind::Password)
                    .rule(Rule::required("Confirm your password"))
                    .rule(Rule::min_length(6, "Too short")),
            )
            .cross_field(CrossFieldRule::equals_field("confirm", "password", "Passwords do not match"))
            .build()
            .unwrap()
    }

    fn record(pairs: &[(&str, Option<&str>)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), RawValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let result = validate(&password_schema(), &record(&[("password", Some("")), ("confirm", Some(""))]));
        assert_eq!(result.error("password"), Some("Password is required"));
        assert_eq!(result.error("confirm"), Some("Confirm your password"));
    }

    #[test]
    fn test_cross_field_runs_after_fields_pass() {
        let result = validate(
            &password_schema(),
            &record(&[("password", Some("Secret1")), ("confirm", Some("Secret2"))]),
        );
        assert_eq!(result.field_errors().len(), 1);
        assert_eq!(result.error("confirm"), Some("Passwords do not match"));
        assert!(result.canonical().is_none());
    }

    #[test]
    fn test_cross_field_skipped_while_a_field_fails() {
        let result = validate(
            &password_schema(),
            &record(&[("password", Some("abc")), ("confirm", Some("Secret2"))]),
        );
        assert_eq!(result.error("password"), Some("Too short"));
        assert_eq!(result.error("confirm"), None);
    }

    #[test]
    fn test_cross_field_does_not_overwrite() {
        let schema = Schema::builder()
            .field(FieldDescriptor::new("a", FieldKind::Text))
            .field(FieldDescriptor::new("b", FieldKind::Text))
            .cross_field(CrossFieldRule::new("first", ["a", "b"], "b", |_| Err("first".into())))
            .cross_field(CrossFieldRule::new("second", ["a", "b"], "b", |_| Err("second".into())))
            .build()
            .unwrap();

        let result = validate(&schema, &RawRecord::new());
        assert_eq!(result.error("b"), Some("first"));
    }

    #[test]
    fn test_errors_follow_declaration_order() {
        let schema = Schema::builder()
            .field(FieldDescriptor::new("z", FieldKind::Text).rule(Rule::required("z")))
            .field(FieldDescriptor::new("a", FieldKind::Text).rule(Rule::required("a")))
            .build()
            .unwrap();
        let result = validate(&schema, &record(&[("a", None), ("z", None)]));
        assert_eq!(result.field_errors().keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn test_transform_error_reported_instead_of_rules() {
        let schema = Schema::builder()
            .field(
                FieldDescriptor::new("birthday", FieldKind::Date)
                    .transform(Transform::date(vec!["%Y-%m-%d".into()], "Enter a valid date"))
                    .rule(Rule::date_required("Select your date of birth")),
            )
            .build()
            .unwrap();

        let garbage = validate(&schema, &record(&[("birthday", Some("next tuesday"))]));
        assert_eq!(garbage.error("birthday"), Some("Enter a valid date"));

        let missing = validate(&schema, &record(&[("birthday", None)]));
        assert_eq!(missing.error("birthday"), Some("Select your date of birth"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let result = validate(
            &password_schema(),
            &record(&[
                ("password", Some("Secret1")),
                ("confirm", Some("Secret1")),
                ("nickname", Some("ivan")),
            ]),
        );
        assert!(result.is_valid());
        let canonical = result.canonical().unwrap();
        assert_eq!(canonical.keys().collect::<Vec<_>>(), vec!["password", "confirm"]);
    }

    #[test]
    fn test_validate_field_live_feedback() {
        let schema = password_schema();

        let typing = record(&[("password", Some("Sec")), ("confirm", Some("Secret1"))]);
        assert_eq!(validate_field(&schema, "password", &typing), Some("Too short".to_string()));
        // dependency still failing: no mismatch message yet
        assert_eq!(validate_field(&schema, "confirm", &typing), None);

        let mismatch = record(&[("password", Some("Secret2")), ("confirm", Some("Secret1"))]);
        assert_eq!(
            validate_field(&schema, "confirm", &mismatch),
            Some("Passwords do not match".to_string())
        );
        assert_eq!(validate_field(&schema, "password", &mismatch), None);
        assert_eq!(validate_field(&schema, "unknown", &mismatch), None);
    }

    #[test]
    fn test_external_errors_block_cross_field_phase() {
        let rec = record(&[("password", Some("Secret1")), ("confirm", Some("Secret2"))]);
        let mut external = HashMap::new();
        external.insert("password".to_string(), "Password was leaked".to_string());

        let result = validate_with_external(&password_schema(), &rec, &external);
        assert_eq!(result.error("password"), Some("Password was leaked"));
        assert_eq!(result.error("confirm"), None);

        // own rule failures win over external ones
        let short = record(&[("password", Some("abc")), ("confirm", Some("abc"))]);
        let result = validate_with_external(&password_schema(), &short, &external);
        assert_eq!(result.error("password"), Some("Too short"));
    }

    #[test]
    fn test_coerce_field() {
        let schema = password_schema();
        let rec = record(&[("password", Some("Secret1"))]);
        assert_eq!(
            coerce_field(&schema, "password", &rec),
            Some(FieldValue::Password("Secret1".into()))
        );
        assert_eq!(coerce_field(&schema, "confirm", &rec), Some(FieldValue::Missing));
        assert_eq!(coerce_field(&schema, "nope", &rec), None);
    }
}
